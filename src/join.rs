//! Matching and unpaired accounting over two built indexes.
//!
//! Phase 1 walks the keys of file 1 in first-seen order and writes the m×n
//! product of every shared bucket. Phase 2 walks each side in input order and
//! writes the records that never matched. Match state is tracked per record
//! position, never by field content.

use std::io::Write;

use crate::cancel::{CancellationToken, Checkpoint};
use crate::config::{JoinOptions, UnpairedStrategy};
use crate::error_handling::{JoinError, Stage};
use crate::formatters::RecordFormatter;
use crate::index::FieldIndex;
use crate::record::{Record, Side};
use crate::stats::JoinStats;

/// One side's records together with its key index
#[derive(Debug, Clone, Copy)]
pub struct IndexedSide<'a> {
    pub records: &'a [Record],
    pub index: &'a FieldIndex,
}

/// Per-record match state for both sides, addressed by record position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    left: Vec<bool>,
    right: Vec<bool>,
}

impl MatchSet {
    pub fn new(left_len: usize, right_len: usize) -> Self {
        Self {
            left: vec![false; left_len],
            right: vec![false; right_len],
        }
    }

    fn side(&self, side: Side) -> &[bool] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn mark(&mut self, side: Side, position: usize) {
        let slots = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        if let Some(slot) = slots.get_mut(position) {
            *slot = true;
        }
    }

    pub fn is_matched(&self, side: Side, position: usize) -> bool {
        self.side(side).get(position).copied().unwrap_or(false)
    }

    pub fn matched_count(&self, side: Side) -> usize {
        self.side(side).iter().filter(|m| **m).count()
    }
}

/// Drives both join phases and writes rows to an output sink
pub struct JoinExecutor<'a> {
    options: &'a JoinOptions,
    formatter: RecordFormatter,
    token: &'a CancellationToken,
}

impl<'a> JoinExecutor<'a> {
    pub fn new(options: &'a JoinOptions, token: &'a CancellationToken) -> Self {
        Self {
            options,
            formatter: RecordFormatter::new(
                options.left_field,
                options.right_field,
                options.empty_placeholder.clone(),
            ),
            token,
        }
    }

    /// Run both phases. Rows already written stay written when this returns
    /// `JoinError::Cancelled` or `JoinError::Output`.
    pub fn execute<W: Write>(
        &self,
        left: IndexedSide<'_>,
        right: IndexedSide<'_>,
        out: &mut W,
        stats: &mut JoinStats,
    ) -> Result<MatchSet, JoinError> {
        let mut matches = MatchSet::new(left.records.len(), right.records.len());

        self.checkpoint(Stage::Match)?;
        self.match_phase(left, right, &mut matches, out, stats)?;

        let unpaired = self.options.unpaired;
        // Immediate mode already wrote file 1's unpaired records during matching
        if unpaired.left && self.options.unpaired_strategy == UnpairedStrategy::Deferred {
            self.checkpoint(Stage::UnpairedLeft)?;
            stats.unpaired_left +=
                self.unpaired_phase(Side::Left, left, &matches, Stage::UnpairedLeft, out)?;
        }
        if unpaired.right {
            self.checkpoint(Stage::UnpairedRight)?;
            stats.unpaired_right +=
                self.unpaired_phase(Side::Right, right, &matches, Stage::UnpairedRight, out)?;
        }

        Ok(matches)
    }

    fn checkpoint(&self, stage: Stage) -> Result<(), JoinError> {
        if self.token.is_cancelled() {
            return Err(JoinError::Cancelled { stage });
        }
        Ok(())
    }

    fn match_phase<W: Write>(
        &self,
        left: IndexedSide<'_>,
        right: IndexedSide<'_>,
        matches: &mut MatchSet,
        out: &mut W,
        stats: &mut JoinStats,
    ) -> Result<(), JoinError> {
        let emit_immediately = self.options.unpaired.left
            && self.options.unpaired_strategy == UnpairedStrategy::Immediate;
        let cancelled = || JoinError::Cancelled { stage: Stage::Match };
        let mut keys = Checkpoint::new(self.token, self.options.key_batch);
        // A single key can fan out into m×n rows, so rows are polled too
        let mut rows = Checkpoint::new(self.token, self.options.record_batch);

        for (key, left_positions) in left.index.iter() {
            if keys.tick() {
                return Err(cancelled());
            }

            match right.index.get(key) {
                Some(right_positions) => {
                    stats.shared_keys += 1;
                    for &lp in left_positions {
                        let left_record = &left.records[lp];
                        for &rp in right_positions {
                            if rows.tick() {
                                return Err(cancelled());
                            }
                            let line = self.formatter.format_joined(left_record, &right.records[rp]);
                            write_row(out, line)?;
                            stats.joined_rows += 1;
                            matches.mark(Side::Right, rp);
                        }
                        matches.mark(Side::Left, lp);
                    }
                }
                None if emit_immediately => {
                    for &lp in left_positions {
                        if rows.tick() {
                            return Err(cancelled());
                        }
                        write_row(out, self.formatter.format_unpaired(&left.records[lp]))?;
                        stats.unpaired_left += 1;
                    }
                }
                None => {}
            }
        }

        Ok(())
    }

    /// Write every record of `side` that did not match, in input order.
    /// Records excluded from the index for lacking the join field are skipped.
    fn unpaired_phase<W: Write>(
        &self,
        side: Side,
        input: IndexedSide<'_>,
        matches: &MatchSet,
        stage: Stage,
        out: &mut W,
    ) -> Result<usize, JoinError> {
        let mut excluded = vec![false; input.records.len()];
        for &position in input.index.excluded() {
            if let Some(slot) = excluded.get_mut(position) {
                *slot = true;
            }
        }

        let mut checkpoint = Checkpoint::new(self.token, self.options.record_batch);
        let mut written = 0;
        for record in input.records {
            if checkpoint.tick() {
                return Err(JoinError::Cancelled { stage });
            }
            if matches.is_matched(side, record.position) || excluded[record.position] {
                continue;
            }
            write_row(out, self.formatter.format_unpaired(record))?;
            written += 1;
        }

        Ok(written)
    }
}

fn write_row<W: Write>(out: &mut W, mut line: Vec<u8>) -> Result<(), JoinError> {
    line.push(b'\n');
    out.write_all(&line).map_err(JoinError::Output)
}
