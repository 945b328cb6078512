use std::time::Duration;

use serde::Serialize;

/// Counters collected over one join invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct JoinStats {
    pub left_lines: usize,
    pub right_lines: usize,
    pub left_records: usize,
    pub right_records: usize,
    pub left_keys: usize,
    pub right_keys: usize,
    pub shared_keys: usize,
    pub joined_rows: usize,
    pub unpaired_left: usize,
    pub unpaired_right: usize,
    /// Records dropped for lacking the join field (exclude policy only)
    pub records_without_key: usize,
    #[serde(serialize_with = "serialize_millis", rename = "processing_time_ms")]
    pub processing_time: Duration,
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

impl JoinStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows_written(&self) -> usize {
        self.joined_rows + self.unpaired_left + self.unpaired_right
    }

    /// One-line human-readable summary
    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Lines read: {} + {}; Records: {} + {}; Keys: {} shared of {} + {}; Rows: {} joined, {} unpaired (file 1), {} unpaired (file 2)",
            self.left_lines,
            self.right_lines,
            self.left_records,
            self.right_records,
            self.shared_keys,
            self.left_keys,
            self.right_keys,
            self.joined_rows,
            self.unpaired_left,
            self.unpaired_right,
        );

        if self.records_without_key > 0 {
            output.push_str(&format!(", {} without key", self.records_without_key));
        }

        let processing_time_ms = self.processing_time.as_millis();
        output.push_str(&format!(" in {}ms", processing_time_ms));

        let lines = self.left_lines + self.right_lines;
        if processing_time_ms > 0 && lines > 0 {
            let lines_per_sec = (lines as f64 * 1000.0) / processing_time_ms as f64;
            output.push_str(&format!(" ({:.0} lines/s)", lines_per_sec));
        }

        output
    }

    pub fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
