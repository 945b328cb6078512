pub mod whitespace;

pub use whitespace::WhitespaceParser;

use crate::cancel::{CancellationToken, Checkpoint, Progress};
use crate::record::Record;

/// Turns one input line into its fields
pub trait RecordParser: Send + Sync {
    fn split(&self, line: &[u8]) -> Vec<Vec<u8>>;
}

/// Parse lines into records, dropping lines without fields.
///
/// Positions are assigned densely over the kept records so they can index
/// per-side match tables directly.
pub fn parse_records<P: RecordParser + ?Sized>(
    parser: &P,
    lines: &[Vec<u8>],
    token: &CancellationToken,
    batch: usize,
) -> Progress<Vec<Record>> {
    let mut checkpoint = Checkpoint::new(token, batch);
    let mut records = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        if checkpoint.tick() {
            return Progress::Cancelled(records);
        }
        let fields = parser.split(line);
        if fields.is_empty() {
            continue;
        }
        records.push(Record::new(records.len(), idx + 1, fields));
    }

    Progress::Done(records)
}
