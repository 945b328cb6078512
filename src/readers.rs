use std::fmt;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use crate::cancel::{CancellationToken, Checkpoint, Progress};
use crate::decompression::{maybe_decompress, DecompressionReader};
use crate::error_handling::JoinError;

/// Buffered, possibly decompressed input
pub type InputReader = Box<dyn BufRead + Send>;

/// Where one side of the join is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// "-" means standard input, anything else is a path
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self, InputSource::Stdin)
    }

    /// Open the source. The returned reader owns the file handle, so the
    /// handle is released whenever the reader is dropped.
    pub fn open(&self) -> Result<InputReader, JoinError> {
        match self {
            InputSource::Stdin => {
                let reader = maybe_decompress(io::stdin()).map_err(|e| JoinError::io("-", e))?;
                Ok(Box::new(BufReader::new(reader)))
            }
            InputSource::File(path) => {
                let reader = DecompressionReader::new(path).map_err(|e| JoinError::io_at(path, e))?;
                Ok(Box::new(reader))
            }
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => f.write_str("-"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Lazy sequence of newline-delimited lines without their terminators.
///
/// Lines are raw bytes; nothing is decoded, so input that is not UTF-8 passes
/// through unchanged. A trailing `\r` is stripped together with the `\n`.
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(self.buf.clone()))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read every line of `reader`, polling `token` every `batch` lines.
///
/// Cancellation yields the lines read so far; a read failure is an error.
pub fn read_lines<R: BufRead>(
    reader: R,
    token: &CancellationToken,
    batch: usize,
) -> io::Result<Progress<Vec<Vec<u8>>>> {
    let mut checkpoint = Checkpoint::new(token, batch);
    let mut lines = Vec::new();

    for line in LineSource::new(reader) {
        if checkpoint.tick() {
            return Ok(Progress::Cancelled(lines));
        }
        lines.push(line?);
    }

    // A cancel that arrived during the final batch, or while the read was blocked
    if token.is_cancelled() {
        return Ok(Progress::Cancelled(lines));
    }

    Ok(Progress::Done(lines))
}
