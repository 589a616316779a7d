use taskpack_core::layout::resources_path;
use taskpack_core::models::{RESOURCE_REF_PREFIX, TaskDescriptor};
use taskpack_core::strings::{externalize, localize_module, write_task_localization};

const FULL_TASK: &str = r#"{
    "id": "5bfb729a-a7c8-4a78-a7c3-8d717bb7c13c",
    "name": "CopyFiles",
    "friendlyName": "Copy files",
    "description": "Copy files from a source folder to a target folder",
    "helpMarkDown": "[More information](https://example.invalid/copy)",
    "category": "Utility",
    "groups": [
        { "name": "advanced", "displayName": "Advanced", "isExpanded": false },
        { "displayName": "Unnamed group" }
    ],
    "inputs": [
        { "name": "SourceFolder", "type": "filePath", "label": "Source Folder", "helpMarkDown": "Folder to copy from" },
        { "name": "Contents", "type": "multiLine", "label": "Contents to copy" },
        { "label": "Orphan input", "helpMarkDown": "No name" }
    ],
    "instanceNameFormat": "Copy Files to: $(TargetFolder)",
    "execution": { "Node10": { "target": "copyfiles.js" } },
    "messages": {
        "FoundNFiles": "found %d files",
        "TargetFolder": "Target folder: %s"
    }
}"#;

fn full_task() -> TaskDescriptor {
    TaskDescriptor::from_json(FULL_TASK).expect("fixture should parse")
}

#[test]
fn sample_task_externalizes_required_fields() {
    let descriptor = TaskDescriptor::from_json(
        r#"{
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "name": "SampleTask",
            "friendlyName": "Sample Task",
            "instanceNameFormat": "Sample $(x)"
        }"#,
    )
    .expect("descriptor should parse");

    let (rewritten, table) = externalize(descriptor).expect("externalize should succeed");

    assert_eq!(table.get("loc.friendlyName"), Some("Sample Task"));
    assert_eq!(table.get("loc.instanceNameFormat"), Some("Sample $(x)"));
    assert_eq!(rewritten.friendly_name(), Some("ms-resource:loc.friendlyName"));
    assert_eq!(
        rewritten.instance_name_format(),
        Some("ms-resource:loc.instanceNameFormat")
    );
    assert_eq!(rewritten.id(), Some("123e4567-e89b-12d3-a456-426614174000"));
}

#[test]
fn every_named_field_maps_to_exactly_one_key() {
    let (rewritten, table) = externalize(full_task()).expect("externalize should succeed");

    assert_eq!(
        table.keys().collect::<Vec<_>>(),
        vec![
            "loc.friendlyName",
            "loc.helpMarkDown",
            "loc.description",
            "loc.instanceNameFormat",
            "loc.group.displayName.advanced",
            "loc.input.label.SourceFolder",
            "loc.input.help.SourceFolder",
            "loc.input.label.Contents",
            "loc.messages.FoundNFiles",
            "loc.messages.TargetFolder",
        ]
    );
    assert_eq!(table.get("loc.group.displayName.advanced"), Some("Advanced"));
    assert_eq!(table.get("loc.input.help.SourceFolder"), Some("Folder to copy from"));
    assert_eq!(table.get("loc.messages.FoundNFiles"), Some("found %d files"));

    // Each key is referenced by exactly one rewritten field.
    let rendered = rewritten.to_pretty_json().expect("descriptor should render");
    for key in table.keys() {
        let token = format!("\"{RESOURCE_REF_PREFIX}{key}\"");
        assert_eq!(rendered.matches(&token).count(), 1, "{key} should be referenced once");
    }

    // No literal survives in a rewritten field.
    for (_, literal) in table.iter() {
        let quoted = serde_json::to_string(literal).expect("literal should render");
        assert!(!rendered.contains(&quoted), "{literal} should not remain");
    }
}

#[test]
fn unnamed_groups_and_inputs_are_left_untouched() {
    let (rewritten, table) = externalize(full_task()).expect("externalize should succeed");

    let groups: Vec<_> = rewritten.groups().collect();
    assert_eq!(groups[1]["displayName"], "Unnamed group");

    let inputs: Vec<_> = rewritten.inputs().collect();
    assert_eq!(inputs[2]["label"], "Orphan input");
    assert_eq!(inputs[2]["helpMarkDown"], "No name");

    assert!(table.iter().all(|(_, value)| value != "Orphan input"));
}

#[test]
fn non_localizable_fields_are_preserved() {
    let (rewritten, _) = externalize(full_task()).expect("externalize should succeed");

    assert_eq!(rewritten.text("category"), Some("Utility"));
    assert!(rewritten.declares_runtime("Node10"));
    let inputs: Vec<_> = rewritten.inputs().collect();
    assert_eq!(inputs[0]["type"], "filePath");
    let groups: Vec<_> = rewritten.groups().collect();
    assert_eq!(groups[0]["isExpanded"], false);
}

#[test]
fn rewritten_descriptor_keeps_authored_key_order() {
    let descriptor = TaskDescriptor::from_json(
        r#"{
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "name": "SampleTask",
            "category": "Utility",
            "version": { "Major": 1, "Minor": 0, "Patch": 0 },
            "friendlyName": "Sample Task",
            "instanceNameFormat": "Sample $(x)",
            "inputs": [
                { "name": "target", "type": "string", "label": "Target", "required": true }
            ],
            "execution": { "Node10": { "target": "index.js" } },
            "author": "Build team"
        }"#,
    )
    .expect("descriptor should parse");
    let before: Vec<String> = descriptor.keys().map(str::to_string).collect();

    let (rewritten, _) = externalize(descriptor).expect("externalize should succeed");

    assert_eq!(rewritten.keys().collect::<Vec<_>>(), before);

    let rendered: serde_json::Value = serde_json::from_str(
        &rewritten.to_pretty_json().expect("descriptor should render"),
    )
    .expect("rendered descriptor should parse");
    let top_level: Vec<_> = rendered
        .as_object()
        .expect("descriptor is an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(top_level, before);

    let input_keys: Vec<_> = rendered["inputs"][0]
        .as_object()
        .expect("input is an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(input_keys, vec!["name", "type", "label", "required"]);
    assert_eq!(rendered["inputs"][0]["label"], "ms-resource:loc.input.label.target");
}

#[test]
fn non_string_literal_is_rejected() {
    let descriptor =
        TaskDescriptor::from_json(r#"{ "name": "SampleTask", "friendlyName": 12 }"#)
            .expect("descriptor should parse");

    let error = externalize(descriptor).expect_err("numeric friendlyName should fail");
    assert_eq!(error.kind, taskpack_core::models::CoreErrorKind::Validation);
    assert!(error.message.contains("friendlyName"));
}

#[test]
fn identical_descriptors_produce_identical_tables() {
    let (_, first) = externalize(full_task()).expect("first run should succeed");
    let (_, second) = externalize(full_task()).expect("second run should succeed");

    assert_eq!(first, second);
    assert_eq!(
        first.to_pretty_json().expect("table should render"),
        second.to_pretty_json().expect("table should render")
    );
}

#[tokio::test]
async fn localization_is_written_to_package_and_mirrored_to_source() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let package_dir = temp.path().join("_build").join("CopyFiles");
    let source_dir = temp.path().join("Tasks").join("CopyFiles");
    tokio::fs::create_dir_all(&source_dir)
        .await
        .expect("source dir should be created");

    let (rewritten, table) = externalize(full_task()).expect("externalize should succeed");
    let outputs = write_task_localization(&rewritten, &table, &package_dir, &source_dir)
        .await
        .expect("localization should be written");

    assert_eq!(outputs.resources, resources_path(&package_dir));
    assert_eq!(outputs.task_loc, package_dir.join("task.loc.json"));
    assert_eq!(outputs.source_resources, resources_path(&source_dir));
    assert_eq!(outputs.source_task_loc, source_dir.join("task.loc.json"));

    let resources = tokio::fs::read_to_string(&outputs.resources)
        .await
        .expect("resources should exist");
    let mirrored = tokio::fs::read_to_string(&outputs.source_resources)
        .await
        .expect("mirrored resources should exist");
    assert_eq!(resources, mirrored);

    let parsed: serde_json::Value =
        serde_json::from_str(&resources).expect("resources should be JSON");
    assert_eq!(parsed["loc.friendlyName"], "Copy files");
    assert!(resources.contains("\n  \"loc.friendlyName\""));

    let task_loc = tokio::fs::read_to_string(&outputs.source_task_loc)
        .await
        .expect("mirrored task.loc.json should exist");
    let task_loc: serde_json::Value =
        serde_json::from_str(&task_loc).expect("task.loc.json should be JSON");
    assert_eq!(task_loc["friendlyName"], "ms-resource:loc.friendlyName");
    assert_eq!(
        task_loc["messages"]["FoundNFiles"],
        "ms-resource:loc.messages.FoundNFiles"
    );
}

#[tokio::test]
async fn shared_module_gets_only_a_resource_file() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let module_dir = temp.path().join("Common").join("TelemetryHelper");
    tokio::fs::create_dir_all(&module_dir)
        .await
        .expect("module dir should be created");
    let module_json = module_dir.join("module.json");
    let original = r#"{ "messages": { "Sent": "Telemetry sent" } }"#;
    tokio::fs::write(&module_json, original)
        .await
        .expect("module.json should be written");

    let resources = localize_module(&module_json)
        .await
        .expect("module should localize");

    assert_eq!(resources, resources_path(&module_dir));
    let contents = tokio::fs::read_to_string(&resources)
        .await
        .expect("resources should exist");
    let parsed: serde_json::Value =
        serde_json::from_str(&contents).expect("resources should be JSON");
    assert_eq!(parsed, serde_json::json!({ "loc.messages.Sent": "Telemetry sent" }));

    let untouched = tokio::fs::read_to_string(&module_json)
        .await
        .expect("module.json should remain");
    assert_eq!(untouched, original);
    assert!(!module_dir.join("task.loc.json").exists());
}

#[tokio::test]
async fn malformed_module_reports_its_path() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let module_json = temp.path().join("module.json");
    tokio::fs::write(&module_json, "{ not json")
        .await
        .expect("module.json should be written");

    let error = localize_module(&module_json)
        .await
        .expect_err("malformed module should fail");

    assert_eq!(error.kind, taskpack_core::models::CoreErrorKind::Parse);
    assert!(error.message.contains("module.json"));
}
