//! scopekit CLI - run and verify scoped-block scenarios
//!
//! Prints scenario transcripts and checks them against their pinned output.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scopekit::config::RunConfig;
use scopekit::console::{stdout_header, write_stdout};
use scopekit::oracle::{format_diff, DiffOptions, DiffResult, TranscriptOracle, Verdict};
use scopekit::scenarios::{self, Scenario, ScenarioReport};

/// scopekit - executable model of scoped resource management
#[derive(Parser)]
#[command(name = "scopekit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON run configuration (flags override it)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available scenarios
    List,

    /// Run scenarios and print their transcripts
    Run {
        /// Scenario name (all scenarios when omitted)
        name: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: String,

        /// Disable coloured headers
        #[arg(long, default_value = "false")]
        no_color: bool,

        /// Also write the reports as JSON to this file
        #[arg(long)]
        report: Option<String>,
    },

    /// Verify scenario transcripts against their pinned output
    Verify {
        /// Scenario name (all scenarios when omitted)
        name: Option<String>,

        /// Compare trailing whitespace too
        #[arg(long, default_value = "false")]
        strict: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&str>) -> RunConfig {
    match path {
        Some(path) => RunConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error: cannot load config '{path}': {e}");
            std::process::exit(2);
        }),
        None => RunConfig::default(),
    }
}

fn select(name: Option<&str>) -> Vec<&'static Scenario> {
    match name {
        Some(name) => match scenarios::find(name) {
            Ok(scenario) => vec![scenario],
            Err(e) => {
                eprintln!("Error: {e}");
                eprintln!("Use `scopekit list` to see available scenarios");
                std::process::exit(2);
            }
        },
        None => scenarios::catalog().iter().collect(),
    }
}

fn run_all(selected: &[&Scenario], config: &RunConfig, text: bool) -> Vec<ScenarioReport> {
    let mut reports = Vec::new();

    for scenario in selected {
        if text {
            write_stdout(&stdout_header(scenario.name, config.color));
        }
        match scenario.run(config) {
            Ok(report) => {
                if text {
                    if let Some(escaped) = &report.observation.escaped {
                        write_stdout(&format!("!! escaped: {escaped}"));
                    }
                }
                reports.push(report);
            }
            Err(e) => {
                eprintln!("Error in {}: {e}", scenario.name);
                std::process::exit(1);
            }
        }
    }

    reports
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let base = load_config(cli.config.as_deref());

    match cli.command {
        Commands::List => {
            println!("Available scenarios:");
            for scenario in scenarios::catalog() {
                println!("  {:<28} {}", scenario.name, scenario.description);
            }
        }

        Commands::Run {
            name,
            output,
            no_color,
            report,
        } => {
            let selected = select(name.as_deref());
            let text = output != "json";
            let color = base.color && !no_color;
            let config = base.with_echo(text).with_color(color);

            let reports = run_all(&selected, &config, text);

            if !text {
                match serde_json::to_string_pretty(&reports) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        std::process::exit(1);
                    }
                }
            }

            if let Some(path) = report {
                let written = serde_json::to_string_pretty(&reports)
                    .map_err(|e| e.to_string())
                    .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
                match written {
                    Ok(()) => eprintln!("Wrote: {path}"),
                    Err(e) => {
                        eprintln!("Error: cannot write report '{path}': {e}");
                        std::process::exit(1);
                    }
                }
            }
        }

        Commands::Verify { name, strict } => {
            let selected = select(name.as_deref());
            let diff = if strict {
                DiffOptions::strict()
            } else {
                base.diff.clone()
            };
            let oracle = TranscriptOracle::with_config(base.with_echo(false).with_diff_options(diff));

            let mut failures = 0usize;
            for scenario in &selected {
                match oracle.verify(scenario) {
                    Ok(result) => match result.verdict {
                        Verdict::Pass => println!("PASS  {}", result.scenario),
                        Verdict::Mismatch { differences } => {
                            failures += 1;
                            println!("FAIL  {}", result.scenario);
                            let diff = DiffResult {
                                matches: false,
                                differences,
                            };
                            for line in format_diff(&diff).lines() {
                                println!("      {line}");
                            }
                        }
                    },
                    Err(e) => {
                        failures += 1;
                        println!("ERROR {}: {e}", scenario.name);
                    }
                }
            }

            println!();
            println!(
                "{} passed, {} failed",
                selected.len() - failures,
                failures
            );
            if failures > 0 {
                std::process::exit(1);
            }
        }
    }
}
