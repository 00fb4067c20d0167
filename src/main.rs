mod cli;
mod error;
mod facts;
mod mode;
mod parse;
mod probes;
mod report;
mod rules;
mod settings;

use crate::error::CheckError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const QC_FAIL: i32 = 1;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pipecheck={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<i32, CheckError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        cli::Commands::Check(cmd) => {
            if !cmd.log.exists() {
                return Err(CheckError::PathNotFound(cmd.log.display().to_string()));
            }

            let strictness = if cmd.lenient {
                facts::Strictness::Lenient
            } else {
                facts::Strictness::Strict
            };
            let facts = parse::parse_log_file(&cmd.log)?;
            let context = mode::resolve(&facts)?;
            let evaluation = rules::evaluate(&facts, &context, strictness)?;

            let format = match cmd.format {
                cli::ReportFormat::Text => report::OutputFormat::Text,
                cli::ReportFormat::Json => report::OutputFormat::Json,
            };
            for line in report::render(&facts, &context, &evaluation, strictness, format)? {
                match line.channel {
                    report::Channel::Out => println!("{}", line.text),
                    report::Channel::Err => eprintln!("{}", line.text),
                }
            }

            if evaluation.passed() {
                Ok(exit_code::SUCCESS)
            } else {
                Ok(exit_code::QC_FAIL)
            }
        }
        cli::Commands::Probe(cmd) => {
            if !cmd.run_dir.exists() {
                return Err(CheckError::PathNotFound(cmd.run_dir.display().to_string()));
            }

            let outcomes = probes::run_probes(&cmd.run_dir);
            for outcome in &outcomes {
                if outcome.passed {
                    println!("[OK] {}: {}", outcome.name, outcome.detail);
                } else {
                    eprintln!("[FAIL] {}: {}", outcome.name, outcome.detail);
                }
            }

            let failed = outcomes.iter().filter(|outcome| !outcome.passed).count();
            let summary = format!(
                "PROBE RESULT for {} (fails:{}) = {}",
                cmd.run_dir.display(),
                failed,
                if failed == 0 { "OK" } else { "FAIL" }
            );
            if failed == 0 {
                println!("{summary}");
                Ok(exit_code::SUCCESS)
            } else {
                eprintln!("{summary}");
                Ok(exit_code::QC_FAIL)
            }
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
