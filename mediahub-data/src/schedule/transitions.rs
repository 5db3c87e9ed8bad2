use crate::error::{DataError, Result};
use crate::schedule::state::ScheduleState;

/// Events that drive the schedule state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleEvent {
    /// The schedule URL was (re)assigned. Valid from any state.
    UrlChanged,
    /// Begin the download. Only valid from `new`.
    StartDownload,
    /// The fetch completed successfully. Only valid from `downloading`.
    FinishDownload,
}

impl std::fmt::Display for ScheduleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleEvent::UrlChanged => write!(f, "url_changed"),
            ScheduleEvent::StartDownload => write!(f, "start_download"),
            ScheduleEvent::FinishDownload => write!(f, "finish_download"),
        }
    }
}

/// Side effects the caller must execute after persisting a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Immediately fire a follow-up event against the same record.
    Fire(ScheduleEvent),
    /// Hand the conference id to the download queue. Skipped by the
    /// driver when the record has no schedule URL; the state still
    /// reports `downloading` in that case.
    EnqueueDownload,
}

/// Result of a single transition: the state to persist and the effects
/// to run afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: ScheduleState,
    pub effects: Vec<Effect>,
}

/// Apply one event to a state. Pure: persistence and effect execution
/// are the caller's job.
pub fn apply(from: ScheduleState, event: ScheduleEvent) -> Result<Transition> {
    match event {
        ScheduleEvent::UrlChanged => Ok(Transition {
            next: ScheduleState::New,
            effects: vec![Effect::Fire(ScheduleEvent::StartDownload)],
        }),
        ScheduleEvent::StartDownload => match from {
            ScheduleState::New => Ok(Transition {
                next: ScheduleState::Downloading,
                effects: vec![Effect::EnqueueDownload],
            }),
            _ => Err(invalid(from, ScheduleState::Downloading)),
        },
        ScheduleEvent::FinishDownload => match from {
            ScheduleState::Downloading => Ok(Transition {
                next: ScheduleState::Downloaded,
                effects: vec![],
            }),
            _ => Err(invalid(from, ScheduleState::Downloaded)),
        },
    }
}

fn invalid(from: ScheduleState, to: ScheduleState) -> DataError {
    DataError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}
