use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum InstallState {
    #[default]
    Installed,
    Pending,
    Installing,
}

impl InstallState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Pending => "pending",
            Self::Installing => "installing",
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Installed => 0,
            Self::Pending => 1,
            Self::Installing => 2,
        }
    }

    pub fn is_steady(self) -> bool {
        self == Self::Installed
    }
}

impl From<InstallState> for u8 {
    fn from(value: InstallState) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for InstallState {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Installed),
            1 => Ok(Self::Pending),
            2 => Ok(Self::Installing),
            _ => Err(anyhow!("unknown installState code: {value}")),
        }
    }
}

/// Coarse position of an app in the update lifecycle. `Available` is the only
/// non-zero value that may be committed; the others exist only while an update
/// operation is in flight.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum UpdateState {
    #[default]
    Idle,
    Checking,
    Available,
    Downloading,
    Applying,
}

impl UpdateState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Available => "available",
            Self::Downloading => "downloading",
            Self::Applying => "applying",
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Checking => 1,
            Self::Available => 2,
            Self::Downloading => 3,
            Self::Applying => 4,
        }
    }

    pub fn is_committable(self) -> bool {
        matches!(self, Self::Idle | Self::Available)
    }
}

impl From<UpdateState> for u8 {
    fn from(value: UpdateState) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for UpdateState {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Idle),
            1 => Ok(Self::Checking),
            2 => Ok(Self::Available),
            3 => Ok(Self::Downloading),
            4 => Ok(Self::Applying),
            _ => Err(anyhow!("unknown updateState code: {value}")),
        }
    }
}

/// Fine-grained progress of the operation currently in flight.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum AppStatus {
    #[default]
    Idle,
    Fetching,
    Downloading,
    Verifying,
    Applying,
}

impl AppStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Downloading => "downloading",
            Self::Verifying => "verifying",
            Self::Applying => "applying",
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Fetching => 1,
            Self::Downloading => 2,
            Self::Verifying => 3,
            Self::Applying => 4,
        }
    }
}

impl From<AppStatus> for u8 {
    fn from(value: AppStatus) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for AppStatus {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Idle),
            1 => Ok(Self::Fetching),
            2 => Ok(Self::Downloading),
            3 => Ok(Self::Verifying),
            4 => Ok(Self::Applying),
            _ => Err(anyhow!("unknown status code: {value}")),
        }
    }
}
