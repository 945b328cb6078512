use crate::record::Record;

const SEPARATOR: u8 = b' ';

/// Renders joined and unpaired records as output lines, byte for byte
#[derive(Debug, Clone)]
pub struct RecordFormatter {
    left_field: usize,
    right_field: usize,
    empty_placeholder: Option<Vec<u8>>,
}

impl RecordFormatter {
    pub fn new(left_field: usize, right_field: usize, empty_placeholder: Option<String>) -> Self {
        Self {
            left_field,
            right_field,
            empty_placeholder: empty_placeholder
                .filter(|p| !p.is_empty())
                .map(String::into_bytes),
        }
    }

    /// Key, then the left record without its join field, then the right
    /// record without its join field.
    ///
    /// The key is the left record's own field value, not its case-folded
    /// form. An empty key (the record lacked the field) renders as the
    /// placeholder when one is configured.
    pub fn format_joined(&self, left: &Record, right: &Record) -> Vec<u8> {
        let key = left.field(self.left_field).unwrap_or_default();
        let key = match &self.empty_placeholder {
            Some(placeholder) if key.is_empty() => placeholder.as_slice(),
            _ => key,
        };

        let mut parts: Vec<&[u8]> = Vec::with_capacity(left.len() + right.len());
        parts.push(key);
        parts.extend(without_field(left, self.left_field));
        parts.extend(without_field(right, self.right_field));
        parts.join(&SEPARATOR)
    }

    /// The record's fields re-joined with single spaces. The placeholder never
    /// applies here.
    pub fn format_unpaired(&self, record: &Record) -> Vec<u8> {
        record.fields().join(&SEPARATOR)
    }
}

fn without_field(record: &Record, field: usize) -> impl Iterator<Item = &[u8]> {
    record
        .fields()
        .iter()
        .enumerate()
        .filter(move |(idx, _)| idx + 1 != field)
        .map(|(_, value)| value.as_slice())
}
