use taskpack_core::models::{CoreError, CoreErrorKind, PackageStage, TaskDescriptor};
use taskpack_core::validation::{DescriptorField, validate_task};

fn valid_descriptor() -> TaskDescriptor {
    TaskDescriptor::from_json(
        r#"{
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "name": "SampleTask",
            "friendlyName": "Sample Task",
            "instanceNameFormat": "Sample $(x)"
        }"#,
    )
    .expect("fixture should parse")
}

#[test]
fn accepts_a_complete_descriptor() {
    validate_task("SampleTask", &valid_descriptor()).expect("descriptor should validate");
}

#[test]
fn each_missing_required_field_is_named() {
    let cases = [
        (DescriptorField::Id, "id"),
        (DescriptorField::Name, "name"),
        (DescriptorField::FriendlyName, "friendlyName"),
        (DescriptorField::InstanceNameFormat, "instanceNameFormat"),
    ];

    for (field, json_key) in cases {
        let mut descriptor = valid_descriptor();
        descriptor.remove(json_key);

        let failure = validate_task("SampleFolder", &descriptor)
            .expect_err("missing field should fail validation");

        assert_eq!(
            failure.fields().collect::<Vec<_>>(),
            vec![field],
            "only {json_key} should be reported"
        );
        assert!(failure.to_string().contains(json_key));
    }
}

#[test]
fn rejects_non_uuid_id() {
    let mut descriptor = valid_descriptor();
    descriptor.set("id", "not-a-guid");

    let failure = validate_task("SampleTask", &descriptor).expect_err("id should be rejected");
    assert!(failure.has_field(DescriptorField::Id));
    assert_eq!(failure.violations.len(), 1);
}

#[test]
fn rejects_non_alphanumeric_name() {
    let mut descriptor = valid_descriptor();
    descriptor.set("name", "Sample-Task");

    let failure = validate_task("SampleTask", &descriptor).expect_err("name should be rejected");
    assert!(failure.has_field(DescriptorField::Name));
}

#[test]
fn friendly_name_length_boundaries() {
    let mut at_limit = valid_descriptor();
    at_limit.set("friendlyName", "x".repeat(40));
    validate_task("SampleTask", &at_limit).expect("40 chars should be accepted");

    let mut too_long = valid_descriptor();
    too_long.set("friendlyName", "x".repeat(41));
    let failure = validate_task("SampleTask", &too_long).expect_err("41 chars should fail");
    assert!(failure.has_field(DescriptorField::FriendlyName));
    assert!(failure.to_string().contains("40 chars"));

    let mut empty = valid_descriptor();
    empty.set("friendlyName", "");
    let failure = validate_task("SampleTask", &empty).expect_err("empty should fail");
    assert!(failure.has_field(DescriptorField::FriendlyName));
}

#[test]
fn friendly_name_length_counts_characters_not_bytes() {
    let mut descriptor = valid_descriptor();
    descriptor.set("friendlyName", "é".repeat(40));
    validate_task("SampleTask", &descriptor).expect("40 two-byte chars should be accepted");
}

#[test]
fn non_string_fields_count_as_missing() {
    let mut descriptor = valid_descriptor();
    descriptor.set("instanceNameFormat", 5);

    let failure = validate_task("SampleTask", &descriptor).expect_err("number should fail");
    assert_eq!(
        failure.fields().collect::<Vec<_>>(),
        vec![DescriptorField::InstanceNameFormat]
    );
}

#[test]
fn all_violations_are_reported_together() {
    let failure = validate_task("LegacyFolder", &TaskDescriptor::default())
        .expect_err("empty descriptor should fail");

    assert_eq!(
        failure.fields().collect::<Vec<_>>(),
        vec![
            DescriptorField::Id,
            DescriptorField::Name,
            DescriptorField::FriendlyName,
            DescriptorField::InstanceNameFormat,
        ]
    );
}

#[test]
fn failure_is_labelled_by_name_then_folder() {
    let mut unnamed = valid_descriptor();
    unnamed.remove("name");
    let failure = validate_task("LegacyFolder", &unnamed).expect_err("name is required");
    assert_eq!(failure.label, "LegacyFolder");

    let mut bad_id = valid_descriptor();
    bad_id.remove("id");
    let failure = validate_task("LegacyFolder", &bad_id).expect_err("id is required");
    assert_eq!(failure.label, "SampleTask");
}

#[test]
fn converts_into_a_validation_core_error() {
    let failure = validate_task("LegacyFolder", &TaskDescriptor::default())
        .expect_err("empty descriptor should fail");

    let error: CoreError = failure.into();
    assert_eq!(error.kind, CoreErrorKind::Validation);
    assert_eq!(error.stage, Some(PackageStage::Validating));
    assert_eq!(error.subject.as_deref(), Some("LegacyFolder"));
    assert!(error.to_string().starts_with("Validation: LegacyFolder: id"));
}
