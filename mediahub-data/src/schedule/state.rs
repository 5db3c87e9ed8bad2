use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Schedule-download progress for a conference.
///
/// Persisted in the `schedule_state` column and only ever moved forward
/// through `not_present -> new -> downloading -> downloaded`. A new URL
/// re-enters the cycle at `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleState {
    NotPresent,
    New,
    Downloading,
    Downloaded,
}

impl ScheduleState {
    /// Initial value for every freshly created conference.
    pub fn initial() -> Self {
        ScheduleState::NotPresent
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleState::NotPresent => "not_present",
            ScheduleState::New => "new",
            ScheduleState::Downloading => "downloading",
            ScheduleState::Downloaded => "downloaded",
        }
    }
}

impl std::fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScheduleState {
    type Err = DataError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not_present" => Ok(ScheduleState::NotPresent),
            "new" => Ok(ScheduleState::New),
            "downloading" => Ok(ScheduleState::Downloading),
            "downloaded" => Ok(ScheduleState::Downloaded),
            _ => Err(DataError::InvalidState(s.to_string())),
        }
    }
}
