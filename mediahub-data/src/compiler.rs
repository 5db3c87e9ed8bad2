use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::CompilerConfig;
use crate::error::{DataError, Result};

/// Static-site compile variants offered by the external generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    Full,
    Fast,
}

impl std::fmt::Display for CompileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileMode::Full => write!(f, "full"),
            CompileMode::Fast => write!(f, "fast"),
        }
    }
}

impl std::str::FromStr for CompileMode {
    type Err = DataError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(CompileMode::Full),
            "fast" => Ok(CompileMode::Fast),
            _ => Err(DataError::InvalidCompileMode(s.to_string())),
        }
    }
}

/// External static-site compiler collaborator. Injected so tests and
/// unconfigured deployments can bypass the shell-out entirely.
pub trait Compiler: Send + Sync {
    fn run(&self, mode: CompileMode) -> Result<()>;
}

/// Shells out to the configured compile executables and waits for them.
pub struct CommandCompiler {
    full_command: Option<PathBuf>,
    fast_command: Option<PathBuf>,
}

impl CommandCompiler {
    pub fn new(full_command: Option<PathBuf>, fast_command: Option<PathBuf>) -> Self {
        Self {
            full_command,
            fast_command,
        }
    }
}

impl Compiler for CommandCompiler {
    fn run(&self, mode: CompileMode) -> Result<()> {
        let command = match mode {
            CompileMode::Full => {
                info!("compiling static website");
                self.full_command.as_ref()
            }
            CompileMode::Fast => {
                info!("fast compiling static website");
                self.fast_command.as_ref()
            }
        };

        let Some(command) = command else {
            debug!(mode = %mode, "no compile command configured, skipping");
            return Ok(());
        };

        let output = Command::new(command)
            .output()
            .map_err(|e| DataError::CompileSpawn {
                command: command.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DataError::CompileFailed {
                command: command.display().to_string(),
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(())
    }
}

/// Compiler that does nothing. Used in tests and when no commands are
/// configured.
pub struct NoopCompiler;

impl Compiler for NoopCompiler {
    fn run(&self, mode: CompileMode) -> Result<()> {
        debug!(mode = %mode, "noop compiler invoked");
        Ok(())
    }
}

/// Pick the compiler for a deployment: command-backed when any command
/// is configured, no-op otherwise.
pub fn from_config(config: &CompilerConfig) -> Arc<dyn Compiler> {
    if config.full_command.is_some() || config.fast_command.is_some() {
        Arc::new(CommandCompiler::new(
            config.full_command.clone(),
            config.fast_command.clone(),
        ))
    } else {
        Arc::new(NoopCompiler)
    }
}
