use clap::{CommandFactory, FromArgMatches};
use std::io::{BufWriter, Write};

use fieldjoin::cancel::CancellationToken;
use fieldjoin::cli::Cli;
use fieldjoin::config::{format_error_message, JoinConfig, StatsFormat};
use fieldjoin::config_file::ConfigFile;
use fieldjoin::error_handling::JoinError;
use fieldjoin::pipeline::{Diagnostics, JoinPipeline};
use fieldjoin::platform::{
    cancellation_exit_code, ExitCode, SafeFileOut, SafeStderr, SafeStdout, SignalHandler,
};
use fieldjoin::stats::JoinStats;

fn main() {
    let token = CancellationToken::new();

    // Initialize signal handling early
    let _signal_handler = match SignalHandler::new(token.clone()) {
        Ok(handler) => handler,
        Err(e) => {
            eprintln!(
                "{}",
                format_error_message(&format!("failed to initialize signal handling: {}", e))
            );
            ExitCode::GeneralError.exit();
        }
    };

    let mut stderr = SafeStderr::new();

    let cli = process_args_with_config(&mut stderr);

    let config = match JoinConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            stderr.writeln(&format_error_message(&e.to_string()));
            if matches!(e, JoinError::Operand(_)) {
                stderr.writeln("Try 'fieldjoin --help' for more information.");
            }
            e.exit_code().exit();
        }
    };

    let result = if let Some(ref path) = config.output.output_file {
        let file_output = match SafeFileOut::new(path) {
            Ok(file) => file,
            Err(message) => {
                stderr.writeln(&config.format_error_message(&message));
                ExitCode::GeneralError.exit();
            }
        };
        run(&config, file_output, &token)
    } else {
        run(&config, SafeStdout::new(), &token)
    };

    match result {
        Ok(stats) => {
            print_stats(&config, &stats, &mut stderr);
            ExitCode::Success.exit();
        }
        Err(e) if e.is_cancelled() => {
            if config.output.stats.is_some() && !config.output.quiet {
                stderr.writeln(&config.format_error_message("processing interrupted"));
            }
            cancellation_exit_code().exit();
        }
        // Already reported on the diagnostic stream by the pipeline
        Err(e) => e.exit_code().exit(),
    }
}

fn run<W: Write>(
    config: &JoinConfig,
    output: W,
    token: &CancellationToken,
) -> Result<JoinStats, JoinError> {
    let mut out = BufWriter::new(output);
    let mut diag = Diagnostics::new(SafeStderr::new(), config.is_verbose());
    JoinPipeline::new(&config.join, token).run_sources(&config.input, &mut out, &mut diag)
}

fn print_stats(config: &JoinConfig, stats: &JoinStats, stderr: &mut SafeStderr) {
    if config.output.quiet {
        return;
    }
    match config.output.stats {
        Some(StatsFormat::Table) => stderr.writeln(&config.format_error_message(&stats.format_stats())),
        Some(StatsFormat::Json) => stderr.writeln(&stats.format_json()),
        None => {}
    }
}

/// Extract --config-file argument from raw args
fn extract_config_file_arg(args: &[String]) -> Option<String> {
    args.iter().enumerate().find_map(|(i, arg)| {
        if arg == "--config-file" {
            args.get(i + 1).cloned()
        } else {
            arg.strip_prefix("--config-file=").map(str::to_string)
        }
    })
}

fn process_args_with_config(stderr: &mut SafeStderr) -> Cli {
    let raw_args: Vec<String> = std::env::args().collect();

    if raw_args.iter().any(|arg| arg == "--show-config") {
        print!("{}", ConfigFile::render_show_config());
        ExitCode::Success.exit();
    }

    let config_file_path = extract_config_file_arg(&raw_args);
    let ignore_config = raw_args.iter().any(|arg| arg == "--ignore-config");

    let processed_args = if ignore_config {
        raw_args
    } else {
        let loaded = ConfigFile::load_with_custom_path(config_file_path.as_deref())
            .and_then(|config_file| config_file.process_args(raw_args));
        match loaded {
            Ok(processed) => processed,
            Err(e) => {
                stderr.writeln(&format_error_message(&format!("config error: {:#}", e)));
                ExitCode::InvalidUsage.exit();
            }
        }
    };

    // clap reports its own usage errors and exits with status 2
    let matches = Cli::command().get_matches_from(processed_args);
    match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    }
}
