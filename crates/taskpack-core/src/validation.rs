use std::fmt::{Display, Formatter};

use uuid::Uuid;

use crate::models::descriptor::non_empty;
use crate::models::{CoreError, CoreErrorKind, PackageStage, TaskDescriptor};

pub const FRIENDLY_NAME_MAX_CHARS: usize = 40;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DescriptorField {
    Id,
    Name,
    FriendlyName,
    InstanceNameFormat,
}

impl DescriptorField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::FriendlyName => "friendlyName",
            Self::InstanceNameFormat => "instanceNameFormat",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldViolation {
    pub field: DescriptorField,
    pub reason: &'static str,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationFailure {
    pub label: String,
    pub violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    pub fn fields(&self) -> impl Iterator<Item = DescriptorField> + '_ {
        self.violations.iter().map(|violation| violation.field)
    }

    pub fn has_field(&self, field: DescriptorField) -> bool {
        self.fields().any(|candidate| candidate == field)
    }

    fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|violation| format!("{} {}", violation.field.as_str(), violation.reason))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.summary())
    }
}

impl std::error::Error for ValidationFailure {}

impl From<ValidationFailure> for CoreError {
    fn from(failure: ValidationFailure) -> Self {
        let message = failure.summary();
        CoreError {
            subject: Some(failure.label),
            stage: Some(PackageStage::Validating),
            kind: CoreErrorKind::Validation,
            message,
        }
    }
}

/// Checks the required descriptor fields, reporting all violations at once.
pub fn validate_task(
    folder_name: &str,
    descriptor: &TaskDescriptor,
) -> Result<(), ValidationFailure> {
    let mut violations = Vec::new();

    if !non_empty(descriptor.id()).is_some_and(is_uuid) {
        violations.push(FieldViolation {
            field: DescriptorField::Id,
            reason: "is a required guid",
        });
    }

    if !non_empty(descriptor.name()).is_some_and(is_alphanumeric) {
        violations.push(FieldViolation {
            field: DescriptorField::Name,
            reason: "is a required alphanumeric string",
        });
    }

    let friendly_name_len = descriptor
        .friendly_name()
        .map(|value| value.chars().count())
        .unwrap_or(0);
    if !(1..=FRIENDLY_NAME_MAX_CHARS).contains(&friendly_name_len) {
        violations.push(FieldViolation {
            field: DescriptorField::FriendlyName,
            reason: "is a required string of 1 to 40 chars",
        });
    }

    if non_empty(descriptor.instance_name_format()).is_none() {
        violations.push(FieldViolation {
            field: DescriptorField::InstanceNameFormat,
            reason: "is required",
        });
    }

    if violations.is_empty() {
        return Ok(());
    }

    Err(ValidationFailure {
        label: descriptor.display_label(folder_name),
        violations,
    })
}

// Hyphenated 8-4-4-4-12 form only; braced, urn and simple forms are rejected.
fn is_uuid(value: &str) -> bool {
    value.len() == 36 && Uuid::try_parse(value).is_ok()
}

fn is_alphanumeric(value: &str) -> bool {
    value.chars().all(|ch| ch.is_ascii_alphanumeric())
}
