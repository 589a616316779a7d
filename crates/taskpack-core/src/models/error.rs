use thiserror::Error;

use crate::models::PackageStage;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CoreErrorKind {
    Validation,
    Parse,
    Configuration,
    Io,
    ExternalTool,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{kind:?}: {}", describe(.subject.as_deref(), .message))]
pub struct CoreError {
    pub subject: Option<String>,
    pub stage: Option<PackageStage>,
    pub kind: CoreErrorKind,
    pub message: String,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            subject: None,
            stage: None,
            kind,
            message: message.into(),
        }
    }

    pub fn io(path: &std::path::Path, action: &str, error: std::io::Error) -> Self {
        Self::new(
            CoreErrorKind::Io,
            format!("could not {action}: {} - {error}", path.display()),
        )
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn stage(mut self, stage: PackageStage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Fills in subject and stage only where the error does not carry them yet.
    pub fn attribute(self, subject: &str, stage: PackageStage) -> Self {
        Self {
            subject: self.subject.or_else(|| Some(subject.to_string())),
            stage: self.stage.or(Some(stage)),
            kind: self.kind,
            message: self.message,
        }
    }
}

fn describe(subject: Option<&str>, message: &str) -> String {
    match subject {
        Some(subject) => format!("{subject}: {message}"),
        None => message.to_string(),
    }
}
