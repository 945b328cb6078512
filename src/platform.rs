use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::cancel::CancellationToken;

// Cross-platform signal handling
#[cfg(unix)]
use signal_hook::{consts::SIGINT, consts::SIGPIPE, consts::SIGTERM, iterator::Signals};

#[cfg(windows)]
use signal_hook::{consts::SIGINT, flag};

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    SignalInt = 130,  // 128 + SIGINT (2)
    SignalPipe = 141, // 128 + SIGPIPE (13)
    SignalTerm = 143, // 128 + SIGTERM (15)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Set when the cancellation was requested by SIGTERM rather than SIGINT
pub static TERMINATED_BY_SIGTERM: AtomicBool = AtomicBool::new(false);

/// Exit status for a run that stopped at a cancellation checkpoint
pub fn cancellation_exit_code() -> ExitCode {
    if TERMINATED_BY_SIGTERM.load(Ordering::Relaxed) {
        ExitCode::SignalTerm
    } else {
        ExitCode::SignalInt
    }
}

/// Listens for termination signals and turns the first one into a
/// cooperative cancellation. A second signal exits immediately.
pub struct SignalHandler {
    _handle: thread::JoinHandle<()>,
}

impl SignalHandler {
    pub fn new(token: CancellationToken) -> io::Result<Self> {
        #[cfg(unix)]
        {
            let mut signals = Signals::new([SIGINT, SIGPIPE, SIGTERM])?;

            let handle = thread::spawn(move || {
                let mut shutdown_count = 0;
                for sig in signals.forever() {
                    match sig {
                        SIGINT | SIGTERM => {
                            if sig == SIGTERM {
                                TERMINATED_BY_SIGTERM.store(true, Ordering::Relaxed);
                            }
                            token.cancel();
                            shutdown_count += 1;
                            if shutdown_count > 1 {
                                exit_code_for_signal(sig).exit();
                            }
                        }
                        SIGPIPE => {
                            // Downstream reader went away; nothing left to write to
                            ExitCode::SignalPipe.exit();
                        }
                        _ => {}
                    }
                }
            });

            Ok(SignalHandler { _handle: handle })
        }

        #[cfg(windows)]
        {
            let interrupted = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
            flag::register(SIGINT, std::sync::Arc::clone(&interrupted))?;

            let handle = thread::spawn(move || {
                let mut shutdown_count = 0;
                loop {
                    thread::sleep(std::time::Duration::from_millis(100));
                    if interrupted.swap(false, Ordering::Relaxed) {
                        token.cancel();
                        shutdown_count += 1;
                        if shutdown_count > 1 {
                            ExitCode::SignalInt.exit();
                        }
                    }
                }
            });

            Ok(SignalHandler { _handle: handle })
        }
    }
}

#[cfg(unix)]
fn exit_code_for_signal(sig: i32) -> ExitCode {
    match sig {
        SIGTERM => ExitCode::SignalTerm,
        SIGPIPE => ExitCode::SignalPipe,
        _ => ExitCode::SignalInt,
    }
}

/// Cross-platform broken pipe detection
pub fn is_broken_pipe(e: &io::Error) -> bool {
    #[cfg(unix)]
    {
        e.kind() == io::ErrorKind::BrokenPipe
    }
    #[cfg(windows)]
    {
        e.kind() == io::ErrorKind::BrokenPipe
            || e.raw_os_error() == Some(232) // ERROR_NO_DATA "The pipe is being closed"
            || e.raw_os_error() == Some(109) // ERROR_BROKEN_PIPE "The pipe has been ended"
    }
}

/// Stdout wrapper that exits quietly when the reading end of a pipe closes
pub struct SafeStdout {
    stdout: io::Stdout,
}

impl SafeStdout {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for SafeStdout {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for SafeStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stdout.write(buf) {
            Err(e) if is_broken_pipe(&e) => ExitCode::SignalPipe.exit(),
            other => other,
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stdout.flush() {
            Err(e) if is_broken_pipe(&e) => ExitCode::SignalPipe.exit(),
            other => other,
        }
    }
}

/// Safe wrapper for writing diagnostics to stderr
pub struct SafeStderr {
    stderr: io::Stderr,
}

impl SafeStderr {
    pub fn new() -> Self {
        Self {
            stderr: io::stderr(),
        }
    }

    /// Write a line to stderr. If stderr itself is gone there is nowhere
    /// left to complain, so the line is dropped.
    pub fn writeln(&mut self, data: &str) {
        let _ = writeln!(self.stderr, "{}", data);
    }
}

impl Default for SafeStderr {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for SafeStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stderr.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stderr.flush()
    }
}

/// Create a helpful error message for file creation failures
fn create_helpful_error_message(path: &Path, error: &io::Error) -> String {
    let base_msg = format!("cannot create output file '{}': {}", path.display(), error);

    let suggestion = match error.kind() {
        io::ErrorKind::PermissionDenied => {
            if path.parent().is_some_and(|p| !p.as_os_str().is_empty() && !p.exists()) {
                "parent directory does not exist, create it first"
            } else {
                "check file permissions or choose a writable location"
            }
        }
        io::ErrorKind::NotFound => "parent directory does not exist, create it first",
        _ if path.is_dir() => "path points to a directory, specify a filename instead",
        _ => return base_msg,
    };

    format!("{} ({})", base_msg, suggestion)
}

/// Output file sink; created (or truncated) up front so a bad path fails
/// before any input is read
pub struct SafeFileOut {
    file: File,
}

impl SafeFileOut {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        File::create(path)
            .map(|file| Self { file })
            .map_err(|e| create_helpful_error_message(path, &e))
    }
}

impl Write for SafeFileOut {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
