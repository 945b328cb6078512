use std::fmt;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::platform::ExitCode;

/// Pipeline stage names used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReadLeft,
    ReadRight,
    IndexLeft,
    IndexRight,
    Match,
    UnpairedLeft,
    UnpairedRight,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ReadLeft => "reading file 1",
            Stage::ReadRight => "reading file 2",
            Stage::IndexLeft => "indexing file 1",
            Stage::IndexRight => "indexing file 2",
            Stage::Match => "matching",
            Stage::UnpairedLeft => "writing unpaired lines of file 1",
            Stage::UnpairedRight => "writing unpaired lines of file 2",
        };
        f.write_str(name)
    }
}

/// Every way a join invocation can end early. All variants are terminal.
#[derive(Debug, Error)]
pub enum JoinError {
    /// Wrong number of inputs; nothing was processed
    #[error("{0}")]
    Operand(String),

    /// Invalid option combination detected before any input was opened
    #[error("{0}")]
    Config(String),

    /// An input could not be opened or read
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Writing to the output sink failed
    #[error("write error: {0}")]
    Output(#[source] io::Error),

    /// Cancellation observed at a checkpoint; output written so far is kept
    #[error("interrupted while {stage}")]
    Cancelled { stage: Stage },
}

impl JoinError {
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        JoinError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn io_at(path: &Path, source: io::Error) -> Self {
        Self::io(path.display().to_string(), source)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, JoinError::Cancelled { .. })
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            JoinError::Operand(_) | JoinError::Config(_) => ExitCode::InvalidUsage,
            JoinError::Io { .. } | JoinError::Output(_) => ExitCode::GeneralError,
            JoinError::Cancelled { .. } => ExitCode::SignalInt,
        }
    }
}

/// Render a diagnostic line for the error sink
pub fn diagnostic(error: &JoinError) -> String {
    crate::config::format_error_message(&error.to_string())
}

/// Write the diagnostic for `error` to `sink`. Failures to write the
/// diagnostic itself are ignored; the error is still returned to the caller.
pub fn report<W: io::Write>(sink: &mut W, error: &JoinError) {
    let _ = writeln!(sink, "{}", diagnostic(error));
}
