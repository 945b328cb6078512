//! Strictly sequential join pipeline.
//!
//! read file 1, read file 2, index file 1, index file 2, match, unpaired
//! file 1, unpaired file 2. Each stage completes before the next starts and
//! the cancellation token is checked at every transition.

use std::io::{BufRead, Write};
use std::time::Instant;

use crate::cancel::{CancellationToken, Progress};
use crate::config::{InputConfig, JoinOptions};
use crate::error_handling::{report, JoinError, Stage};
use crate::index::{FieldIndex, KeyNormalizer};
use crate::join::{IndexedSide, JoinExecutor};
use crate::parsers::{parse_records, RecordParser, WhitespaceParser};
use crate::readers::read_lines;
use crate::record::{Record, Side};
use crate::stats::JoinStats;

/// Diagnostic sink with verbosity control. Errors are always written;
/// progress notes only in verbose mode.
pub struct Diagnostics<E: Write> {
    sink: E,
    verbose: bool,
}

impl<E: Write> Diagnostics<E> {
    pub fn new(sink: E, verbose: bool) -> Self {
        Self { sink, verbose }
    }

    pub fn note(&mut self, message: &str) {
        if self.verbose {
            let _ = writeln!(
                self.sink,
                "{}",
                crate::config::format_error_message(message)
            );
        }
    }

    pub fn error(&mut self, error: &JoinError) {
        report(&mut self.sink, error);
    }

    pub fn into_inner(self) -> E {
        self.sink
    }
}

/// One side's input stream and the name used for it in diagnostics
pub struct NamedInput<R> {
    pub name: String,
    pub reader: R,
}

impl<R: BufRead> NamedInput<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }
}

/// Drives one invocation over already-materialized or streaming inputs
pub struct JoinPipeline<'a> {
    options: &'a JoinOptions,
    token: &'a CancellationToken,
    parser: Box<dyn RecordParser>,
}

impl<'a> JoinPipeline<'a> {
    pub fn new(options: &'a JoinOptions, token: &'a CancellationToken) -> Self {
        Self {
            options,
            token,
            parser: Box::new(WhitespaceParser::new()),
        }
    }

    /// Read both inputs, then join them into `out`.
    ///
    /// Every error is written to `diag` before it is returned.
    pub fn run<L, R, W, E>(
        &self,
        left: NamedInput<L>,
        right: NamedInput<R>,
        out: &mut W,
        diag: &mut Diagnostics<E>,
    ) -> Result<JoinStats, JoinError>
    where
        L: BufRead,
        R: BufRead,
        W: Write,
        E: Write,
    {
        let started = Instant::now();
        let mut stats = JoinStats::new();

        let result = self.read_and_join(left, right, out, &mut stats, diag);

        stats.processing_time = started.elapsed();
        finish(result.map(|_| stats), diag)
    }

    /// Like `run`, but opens each configured source right before reading it
    /// and releases it as soon as its lines are in memory.
    pub fn run_sources<W: Write, E: Write>(
        &self,
        input: &InputConfig,
        out: &mut W,
        diag: &mut Diagnostics<E>,
    ) -> Result<JoinStats, JoinError> {
        let started = Instant::now();
        let mut stats = JoinStats::new();

        let result = self.open_and_join(input, out, &mut stats, diag);

        stats.processing_time = started.elapsed();
        finish(result.map(|_| stats), diag)
    }

    fn open_and_join<W: Write, E: Write>(
        &self,
        input: &InputConfig,
        out: &mut W,
        stats: &mut JoinStats,
        diag: &mut Diagnostics<E>,
    ) -> Result<(), JoinError> {
        self.options.validate()?;
        // Each reader is dropped inside read_side, before the next source opens
        let left = NamedInput::new(input.left.to_string(), input.left.open()?);
        let left_lines = self.read_side(Side::Left, left, stats, diag)?;
        let right = NamedInput::new(input.right.to_string(), input.right.open()?);
        let right_lines = self.read_side(Side::Right, right, stats, diag)?;
        self.join_lines(&left_lines, &right_lines, out, stats, diag)
    }

    fn read_and_join<L, R, W, E>(
        &self,
        left: NamedInput<L>,
        right: NamedInput<R>,
        out: &mut W,
        stats: &mut JoinStats,
        diag: &mut Diagnostics<E>,
    ) -> Result<(), JoinError>
    where
        L: BufRead,
        R: BufRead,
        W: Write,
        E: Write,
    {
        self.options.validate()?;
        let left_lines = self.read_side(Side::Left, left, stats, diag)?;
        let right_lines = self.read_side(Side::Right, right, stats, diag)?;
        self.join_lines(&left_lines, &right_lines, out, stats, diag)
    }

    fn ensure_running(&self, stage: Stage) -> Result<(), JoinError> {
        if self.token.is_cancelled() {
            return Err(JoinError::Cancelled { stage });
        }
        Ok(())
    }

    fn read_side<R: BufRead, E: Write>(
        &self,
        side: Side,
        input: NamedInput<R>,
        stats: &mut JoinStats,
        diag: &mut Diagnostics<E>,
    ) -> Result<Vec<Vec<u8>>, JoinError> {
        let stage = match side {
            Side::Left => Stage::ReadLeft,
            Side::Right => Stage::ReadRight,
        };
        self.ensure_running(stage)?;

        let NamedInput { name, reader } = input;
        let lines = read_lines(reader, self.token, self.options.record_batch)
            .map_err(|e| JoinError::io(name.clone(), e))?;
        let lines = cancelled_at(lines, stage)?;

        match side {
            Side::Left => stats.left_lines = lines.len(),
            Side::Right => stats.right_lines = lines.len(),
        }
        diag.note(&format!("read {} lines from {} ({})", lines.len(), side, name));
        Ok(lines)
    }

    fn join_lines<W: Write, E: Write>(
        &self,
        left_lines: &[Vec<u8>],
        right_lines: &[Vec<u8>],
        out: &mut W,
        stats: &mut JoinStats,
        diag: &mut Diagnostics<E>,
    ) -> Result<(), JoinError> {
        let normalizer = KeyNormalizer::new(self.options.ignore_case, self.options.missing_field);

        let left_records = self.parse_side(left_lines, Stage::IndexLeft)?;
        let left_index = self.index_side(Side::Left, &left_records, &normalizer, stats, diag)?;

        let right_records = self.parse_side(right_lines, Stage::IndexRight)?;
        let right_index = self.index_side(Side::Right, &right_records, &normalizer, stats, diag)?;

        if self.options.check_order {
            diag.note("--check-order has no effect; inputs are never required to be sorted");
        }

        let executor = JoinExecutor::new(self.options, self.token);
        let matches = executor.execute(
            IndexedSide {
                records: &left_records,
                index: &left_index,
            },
            IndexedSide {
                records: &right_records,
                index: &right_index,
            },
            out,
            stats,
        )?;
        out.flush().map_err(JoinError::Output)?;

        diag.note(&format!(
            "wrote {} rows ({} joined over {} shared keys, {} + {} records matched)",
            stats.rows_written(),
            stats.joined_rows,
            stats.shared_keys,
            matches.matched_count(Side::Left),
            matches.matched_count(Side::Right),
        ));
        Ok(())
    }

    fn parse_side(&self, lines: &[Vec<u8>], stage: Stage) -> Result<Vec<Record>, JoinError> {
        self.ensure_running(stage)?;
        cancelled_at(
            parse_records(self.parser.as_ref(), lines, self.token, self.options.record_batch),
            stage,
        )
    }

    fn index_side<E: Write>(
        &self,
        side: Side,
        records: &[Record],
        normalizer: &KeyNormalizer,
        stats: &mut JoinStats,
        diag: &mut Diagnostics<E>,
    ) -> Result<FieldIndex, JoinError> {
        let (stage, field) = match side {
            Side::Left => (Stage::IndexLeft, self.options.left_field),
            Side::Right => (Stage::IndexRight, self.options.right_field),
        };
        let index = cancelled_at(
            FieldIndex::build(records, field, normalizer, self.token, self.options.record_batch),
            stage,
        )?;

        match side {
            Side::Left => {
                stats.left_records = records.len();
                stats.left_keys = index.key_count();
            }
            Side::Right => {
                stats.right_records = records.len();
                stats.right_keys = index.key_count();
            }
        }
        stats.records_without_key += index.excluded().len();

        diag.note(&format!(
            "{}: {} records, {} distinct keys on field {}",
            side,
            records.len(),
            index.key_count(),
            field
        ));
        if !index.excluded().is_empty() {
            diag.note(&format!(
                "{}: {} records have no field {} and were excluded",
                side,
                index.excluded().len(),
                field
            ));
        }
        Ok(index)
    }
}

fn cancelled_at<T>(progress: Progress<T>, stage: Stage) -> Result<T, JoinError> {
    match progress {
        Progress::Done(value) => Ok(value),
        Progress::Cancelled(_) => Err(JoinError::Cancelled { stage }),
    }
}

fn finish<T, E: Write>(
    result: Result<T, JoinError>,
    diag: &mut Diagnostics<E>,
) -> Result<T, JoinError> {
    if let Err(e) = &result {
        diag.error(e);
    }
    result
}

/// Join two inputs with `options`, writing rows to `out` and diagnostics to
/// `diag`. Returns the run's counters, or the error that stopped it.
pub fn run_join<L, R, W, E>(
    options: &JoinOptions,
    left: NamedInput<L>,
    right: NamedInput<R>,
    out: &mut W,
    diag: &mut Diagnostics<E>,
    token: &CancellationToken,
) -> Result<JoinStats, JoinError>
where
    L: BufRead,
    R: BufRead,
    W: Write,
    E: Write,
{
    JoinPipeline::new(options, token).run(left, right, out, diag)
}
