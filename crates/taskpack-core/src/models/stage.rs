use std::fmt::{Display, Formatter};

/// Per-item packaging progress. Any stage may end in `Failed`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PackageStage {
    Pending,
    Validating,
    Copying,
    Linking,
    Externalizing,
    Done,
    Failed,
}

impl PackageStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validating => "validating",
            Self::Copying => "copying",
            Self::Linking => "linking",
            Self::Externalizing => "externalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn advance(self) -> Self {
        match self {
            Self::Pending => Self::Validating,
            Self::Validating => Self::Copying,
            Self::Copying => Self::Linking,
            Self::Linking => Self::Externalizing,
            Self::Externalizing => Self::Done,
            Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }
}

impl Display for PackageStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
