//! Join key derivation and per-side key indexes.

use bstr::ByteSlice;
use indexmap::IndexMap;

use crate::cancel::{CancellationToken, Checkpoint, Progress};
use crate::config::MissingFieldPolicy;
use crate::record::Record;

/// Derives comparison keys. Both sides of a join must share one normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyNormalizer {
    pub ignore_case: bool,
    pub missing_field: MissingFieldPolicy,
}

impl KeyNormalizer {
    pub fn new(ignore_case: bool, missing_field: MissingFieldPolicy) -> Self {
        Self {
            ignore_case,
            missing_field,
        }
    }

    /// Key for `record` at 1-indexed `field`.
    ///
    /// A record too short for `field` gets the empty key under
    /// `MissingFieldPolicy::EmptyKey` and no key at all under `Exclude`.
    pub fn key(&self, record: &Record, field: usize) -> Option<Vec<u8>> {
        let raw = match (record.field(field), self.missing_field) {
            (Some(value), _) => value,
            (None, MissingFieldPolicy::EmptyKey) => b"".as_slice(),
            (None, MissingFieldPolicy::Exclude) => return None,
        };
        Some(self.normalize(raw))
    }

    /// Case folding lowercases the UTF-8 parts of `raw` and leaves any
    /// invalid bytes as they are, so keys that differ in those bytes stay apart.
    pub fn normalize(&self, raw: &[u8]) -> Vec<u8> {
        if self.ignore_case {
            raw.to_lowercase()
        } else {
            raw.to_vec()
        }
    }
}

/// Key to record positions for one side.
///
/// Buckets iterate in first-seen key order and hold positions in input order,
/// so building twice from the same records yields the same index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldIndex {
    buckets: IndexMap<Vec<u8>, Vec<usize>>,
    /// Records left out because they had no key (`MissingFieldPolicy::Exclude`)
    excluded: Vec<usize>,
}

impl FieldIndex {
    pub fn build(
        records: &[Record],
        field: usize,
        normalizer: &KeyNormalizer,
        token: &CancellationToken,
        batch: usize,
    ) -> Progress<Self> {
        let mut checkpoint = Checkpoint::new(token, batch);
        let mut index = FieldIndex::default();

        for record in records {
            if checkpoint.tick() {
                return Progress::Cancelled(index);
            }
            match normalizer.key(record, field) {
                Some(key) => index.buckets.entry(key).or_default().push(record.position),
                None => index.excluded.push(record.position),
            }
        }

        Progress::Done(index)
    }

    pub fn get(&self, key: &[u8]) -> Option<&[usize]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Buckets in first-seen key order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[usize])> {
        self.buckets
            .iter()
            .map(|(key, positions)| (key.as_slice(), positions.as_slice()))
    }

    pub fn key_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn excluded(&self) -> &[usize] {
        &self.excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[&str]) -> Vec<Record> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let fields = row.split_whitespace().map(|f| f.as_bytes().to_vec()).collect();
                Record::new(i, i + 1, fields)
            })
            .collect()
    }

    fn build(rows: &[Record], field: usize, normalizer: KeyNormalizer) -> FieldIndex {
        FieldIndex::build(rows, field, &normalizer, &CancellationToken::new(), 1000).into_inner()
    }

    #[test]
    fn test_key_within_range_is_verbatim() {
        let rec = &records(&["1 Alice"])[0];
        let normalizer = KeyNormalizer::default();
        assert_eq!(normalizer.key(rec, 2), Some(b"Alice".to_vec()));
    }

    #[test]
    fn test_missing_field_policies() {
        let rec = &records(&["only"])[0];
        let empty = KeyNormalizer::new(false, MissingFieldPolicy::EmptyKey);
        let exclude = KeyNormalizer::new(false, MissingFieldPolicy::Exclude);
        assert_eq!(empty.key(rec, 3), Some(Vec::new()));
        assert_eq!(exclude.key(rec, 3), None);
    }

    #[test]
    fn test_ignore_case_folds_key() {
        let rec = &records(&["ABC x"])[0];
        let folded = KeyNormalizer::new(true, MissingFieldPolicy::EmptyKey);
        assert_eq!(folded.key(rec, 1), Some(b"abc".to_vec()));
        assert_eq!(KeyNormalizer::default().key(rec, 1), Some(b"ABC".to_vec()));
    }

    #[test]
    fn test_case_folding_keeps_invalid_bytes_distinct() {
        let folded = KeyNormalizer::new(true, MissingFieldPolicy::EmptyKey);
        assert_eq!(folded.normalize(b"CAF\xe9"), b"caf\xe9".to_vec());
        assert_ne!(folded.normalize(b"caf\xe9"), folded.normalize(b"caf\xe8"));
        assert_eq!(folded.normalize("ÉCOLE".as_bytes()), "école".as_bytes().to_vec());
    }

    #[test]
    fn test_buckets_keep_first_seen_order() {
        let rows = records(&["b 1", "a 2", "b 3", "c 4", "a 5"]);
        let index = build(&rows, 1, KeyNormalizer::default());

        let keys: Vec<&[u8]> = index.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&b"b"[..], b"a", b"c"]);
        assert_eq!(index.get(b"b"), Some(&[0, 2][..]));
        assert_eq!(index.get(b"a"), Some(&[1, 4][..]));
        assert_eq!(index.key_count(), 3);
    }

    #[test]
    fn test_build_is_deterministic() {
        let rows = records(&["x 1", "y 2", "x 3", "", "z"]);
        let first = build(&rows, 2, KeyNormalizer::default());
        let second = build(&rows, 2, KeyNormalizer::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_records_share_empty_bucket() {
        let rows = records(&["k1 v", "solo", "other"]);
        let index = build(&rows, 2, KeyNormalizer::default());
        assert_eq!(index.get(b""), Some(&[1, 2][..]));
        assert!(index.excluded().is_empty());
    }

    #[test]
    fn test_excluded_records_are_tracked() {
        let rows = records(&["k1 v", "solo"]);
        let normalizer = KeyNormalizer::new(false, MissingFieldPolicy::Exclude);
        let index = build(&rows, 2, normalizer);
        assert!(index.get(b"").is_none());
        assert_eq!(index.excluded(), &[1]);
    }

    #[test]
    fn test_cancelled_build_returns_partial_index() {
        let rows = records(&["a", "b", "c"]);
        let token = CancellationToken::new();
        token.cancel();
        let result = FieldIndex::build(&rows, 1, &KeyNormalizer::default(), &token, 10);
        assert!(result.is_cancelled());
        assert_eq!(result.into_inner().key_count(), 0);
    }
}
