use clap::ValueEnum;

use crate::cancel::{DEFAULT_KEY_BATCH, DEFAULT_RECORD_BATCH};
use crate::cli::Cli;
use crate::error_handling::JoinError;
use crate::readers::InputSource;

/// Prefix for every diagnostic line
pub const DIAGNOSTIC_PREFIX: &str = "join: ";

/// Main configuration struct for a join invocation
#[derive(Debug, Clone)]
pub struct JoinConfig {
    pub input: InputConfig,
    pub join: JoinOptions,
    pub output: OutputConfig,
}

/// The two inputs, in command-line order
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub left: InputSource,
    pub right: InputSource,
}

/// Engine options; everything the join itself depends on
#[derive(Debug, Clone)]
pub struct JoinOptions {
    /// 1-indexed join field of file 1
    pub left_field: usize,
    /// 1-indexed join field of file 2
    pub right_field: usize,
    pub ignore_case: bool,
    pub unpaired: UnpairedSides,
    pub unpaired_strategy: UnpairedStrategy,
    pub missing_field: MissingFieldPolicy,
    /// Accepted for compatibility; inputs are never checked for sortedness
    pub check_order: bool,
    /// Stands in for an empty join key in joined rows
    pub empty_placeholder: Option<String>,
    pub record_batch: usize,
    pub key_batch: usize,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            left_field: 1,
            right_field: 1,
            ignore_case: false,
            unpaired: UnpairedSides::default(),
            unpaired_strategy: UnpairedStrategy::default(),
            missing_field: MissingFieldPolicy::default(),
            check_order: false,
            empty_placeholder: None,
            record_batch: DEFAULT_RECORD_BATCH,
            key_batch: DEFAULT_KEY_BATCH,
        }
    }
}

impl JoinOptions {
    /// Join fields are 1-indexed; field 0 names nothing.
    pub fn validate(&self) -> Result<(), JoinError> {
        if self.left_field == 0 || self.right_field == 0 {
            return Err(JoinError::Config("invalid field number: '0'".to_string()));
        }
        Ok(())
    }
}

/// Which sides report records that found no partner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpairedSides {
    pub left: bool,
    pub right: bool,
}

impl UnpairedSides {
    pub fn both() -> Self {
        Self {
            left: true,
            right: true,
        }
    }
}

/// When unpaired records of file 1 are written
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnpairedStrategy {
    /// After all joined rows, in input order
    #[default]
    Deferred,
    /// As soon as the matching phase finds their key has no partner
    Immediate,
}

/// What to do with a record that has fewer fields than the join field
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingFieldPolicy {
    /// Join it under the empty key
    #[default]
    EmptyKey,
    /// Leave it out of the join and of unpaired output
    Exclude,
}

/// Stats rendering
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsFormat {
    Table,
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub output_file: Option<String>,
    pub stats: Option<StatsFormat>,
    pub verbose: u8,
    pub quiet: bool,
}

impl JoinConfig {
    /// Build configuration from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Result<Self, JoinError> {
        let (left, right) = match cli.files.as_slice() {
            [] => return Err(JoinError::Operand("missing operand".to_string())),
            [only] => {
                return Err(JoinError::Operand(format!(
                    "missing operand after '{}'",
                    only
                )))
            }
            [left, right] => (InputSource::parse(left), InputSource::parse(right)),
            [_, _, extra, ..] => {
                return Err(JoinError::Operand(format!("extra operand '{}'", extra)))
            }
        };

        if left.is_stdin() && right.is_stdin() {
            return Err(JoinError::Config(
                "both files cannot be standard input".to_string(),
            ));
        }

        let mut unpaired = UnpairedSides::default();
        for file_number in &cli.unpaired {
            match file_number {
                1 => unpaired.left = true,
                2 => unpaired.right = true,
                other => {
                    return Err(JoinError::Config(format!(
                        "invalid file number: '{}'",
                        other
                    )))
                }
            }
        }
        if cli.outer {
            unpaired = UnpairedSides::both();
        }

        let join = JoinOptions {
            left_field: cli.field1.or(cli.join_field).unwrap_or(1),
            right_field: cli.field2.or(cli.join_field).unwrap_or(1),
            ignore_case: cli.ignore_case,
            unpaired,
            unpaired_strategy: cli.unpaired_mode,
            missing_field: cli.missing_field,
            check_order: cli.check_order && !cli.nocheck_order,
            empty_placeholder: cli.empty.clone(),
            ..JoinOptions::default()
        };
        join.validate()?;

        Ok(Self {
            input: InputConfig { left, right },
            join,
            output: OutputConfig {
                output_file: cli.output_file.clone(),
                stats: cli.stats,
                verbose: cli.verbose,
                quiet: cli.quiet,
            },
        })
    }

    pub fn format_error_message(&self, message: &str) -> String {
        format_error_message(message)
    }

    /// Verbose notes are suppressed by --quiet
    pub fn is_verbose(&self) -> bool {
        self.output.verbose > 0 && !self.output.quiet
    }
}

/// Prefix a diagnostic with the command name
pub fn format_error_message(message: &str) -> String {
    format!("{}{}", DIAGNOSTIC_PREFIX, message)
}
