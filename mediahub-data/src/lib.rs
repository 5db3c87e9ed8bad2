//! mediahub-data
//!
//! Shared data layer for the mediahub conference media backend: the
//! Conference record, its schedule-download state machine, SQLite
//! persistence, attached-directory storage mapping, and configuration.
//! Used by the mediahub-web server and its background download worker.

pub mod compiler;
pub mod conference;
pub mod config;
pub mod db;
pub mod error;
pub mod schedule;
pub mod storage;

pub use compiler::{CompileMode, Compiler, CommandCompiler, NoopCompiler};
pub use conference::{Conference, NewConference, ValidationResult};
pub use config::Config;
pub use error::{DataError, Result};
pub use schedule::{DownloadQueue, ScheduleEvent, ScheduleState};
