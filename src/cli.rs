// Command-line interface definitions

use clap::Parser;

use crate::config::{MissingFieldPolicy, StatsFormat, UnpairedStrategy};

#[derive(Parser, Debug)]
#[command(name = "fieldjoin")]
#[command(about = "Join lines of two files on a common field")]
#[command(
    long_about = "Join lines of two files on a common field\n\nFor each pair of input lines with identical join fields, write a line to\nstandard output. The default join field is the first, delimited by blanks.\nInputs do not need to be sorted. When FILE1 or FILE2 (not both) is -, read\nstandard input. Gzip and zstd compressed inputs are decompressed on the fly.\n\nEXAMPLES:\n  fieldjoin names.txt scores.txt\n  fieldjoin -a 1 names.txt scores.txt\n  fieldjoin -1 2 -2 1 --outer left.txt right.txt\n  cat left.txt | fieldjoin -i - right.txt"
)]
#[command(author)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// FILE1 and FILE2 ("-" reads standard input)
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Join on this FIELD of file 1
    #[arg(short = '1', value_name = "FIELD", help_heading = "Join Options")]
    pub field1: Option<usize>,

    /// Join on this FIELD of file 2
    #[arg(short = '2', value_name = "FIELD", help_heading = "Join Options")]
    pub field2: Option<usize>,

    /// Equivalent to '-1 FIELD -2 FIELD'
    #[arg(short = 'j', value_name = "FIELD", help_heading = "Join Options")]
    pub join_field: Option<usize>,

    /// Ignore differences in case when comparing fields
    #[arg(short = 'i', long = "ignore-case", help_heading = "Join Options")]
    pub ignore_case: bool,

    /// How to treat lines shorter than the join field
    #[arg(
        long = "missing-field",
        value_enum,
        default_value = "empty-key",
        help_heading = "Join Options"
    )]
    pub missing_field: MissingFieldPolicy,

    /// Accepted for compatibility; inputs are not required to be sorted
    #[arg(long = "check-order", help_heading = "Join Options")]
    pub check_order: bool,

    /// Do not check that the input is correctly sorted (the default)
    #[arg(long = "nocheck-order", help_heading = "Join Options", overrides_with = "check_order")]
    pub nocheck_order: bool,

    /// Also print unpairable lines from file FILENUM (1 or 2); may be repeated
    #[arg(
        short = 'a',
        value_name = "FILENUM",
        value_parser = clap::value_parser!(u8).range(1..=2),
        help_heading = "Output Options"
    )]
    pub unpaired: Vec<u8>,

    /// Print unpairable lines from both files (same as '-a 1 -a 2')
    #[arg(long = "outer", help_heading = "Output Options")]
    pub outer: bool,

    /// When to print unpairable lines from file 1
    #[arg(
        long = "unpaired-mode",
        value_enum,
        default_value = "deferred",
        help_heading = "Output Options"
    )]
    pub unpaired_mode: UnpairedStrategy,

    /// Replace an empty join field in joined lines with EMPTY
    #[arg(short = 'e', long = "empty", value_name = "EMPTY", help_heading = "Output Options")]
    pub empty: Option<String>,

    /// Write output to a file instead of stdout
    #[arg(long = "output-file", value_name = "PATH", help_heading = "Output Options")]
    pub output_file: Option<String>,

    /// Show join statistics on stderr. Use -s for table, or --stats=FORMAT.
    #[arg(
        short = 's',
        long = "stats",
        value_enum,
        value_name = "FORMAT",
        require_equals = true,
        num_args = 0..=1,
        default_missing_value = "table",
        help_heading = "Diagnostics"
    )]
    pub stats: Option<StatsFormat>,

    /// Report progress of each stage on stderr
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Diagnostics")]
    pub verbose: u8,

    /// Suppress everything on stderr except errors
    #[arg(short = 'q', long = "quiet", help_heading = "Diagnostics")]
    pub quiet: bool,

    /// Use alias from configuration file
    #[arg(long = "alias", value_name = "NAME", help_heading = "Configuration Options")]
    pub alias: Vec<String>,

    /// Specify custom configuration file path
    #[arg(long = "config-file", value_name = "PATH", help_heading = "Configuration Options")]
    pub config_file: Option<String>,

    /// Show configuration file locations and active defaults, then exit
    #[arg(long = "show-config", help_heading = "Configuration Options")]
    pub show_config: bool,

    /// Ignore configuration files
    #[arg(long = "ignore-config", help_heading = "Configuration Options")]
    pub ignore_config: bool,
}
