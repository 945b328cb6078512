use std::fmt;

/// Which input a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// 1-based file number as used on the command line (`-a 1`, `-2 FIELD`)
    pub fn file_number(self) -> usize {
        match self {
            Side::Left => 1,
            Side::Right => 2,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {}", self.file_number())
    }
}

/// One parsed input line.
///
/// `position` is the record's index among the records of its own side and is
/// its identity: two records with identical fields are still distinct. Fields
/// are the input's bytes, undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub position: usize,
    /// 1-based line number in the input, blank lines included
    pub line_number: usize,
    fields: Vec<Vec<u8>>,
}

impl Record {
    pub fn new(position: usize, line_number: usize, fields: Vec<Vec<u8>>) -> Self {
        Self {
            position,
            line_number,
            fields,
        }
    }

    pub fn fields(&self) -> &[Vec<u8>] {
        &self.fields
    }

    /// Field at a 1-indexed position
    pub fn field(&self, position: usize) -> Option<&[u8]> {
        position
            .checked_sub(1)
            .and_then(|idx| self.fields.get(idx))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> Record {
        Record::new(0, 1, fields.iter().map(|f| f.as_bytes().to_vec()).collect())
    }

    #[test]
    fn test_field_is_one_indexed() {
        let rec = record(&["1", "Alice"]);
        assert_eq!(rec.field(1), Some(&b"1"[..]));
        assert_eq!(rec.field(2), Some(&b"Alice"[..]));
        assert_eq!(rec.field(3), None);
        assert_eq!(rec.field(0), None);
    }

    #[test]
    fn test_identity_is_positional() {
        let a = Record::new(0, 1, vec![b"x".to_vec()]);
        let b = Record::new(1, 2, vec![b"x".to_vec()]);
        assert_eq!(a.fields(), b.fields());
        assert_ne!(a, b);
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Left.to_string(), "file 1");
        assert_eq!(Side::Right.file_number(), 2);
    }
}
