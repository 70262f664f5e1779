//! # Calculator Toolbox CLI
//!
//! Command-line front end for `calc_core`: both calculators, the unit and
//! currency converters and the age calculator.
//!
//! ```text
//! calc_cli keys 5 + 3 =              # standard calculator
//! calc_cli eval "2+3*4"              # expression calculator
//! calc_cli repl --mode expression    # interactive
//! calc_cli unit 0 celsius fahrenheit
//! calc_cli currency 100 USD EUR
//! calc_cli age 2000-01-01
//! ```

mod keys;
mod repl;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use calc_core::config::{load_config, save_config, ToolboxConfig};
use calc_core::errors::CalcError;
use calc_core::expression::{display_tag, evaluate};
use calc_core::format::format_number;
use calc_core::{compute_age, CalculatorState};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::keys::{expand_keys, standard_key};
use crate::repl::Mode;

#[derive(Parser)]
#[command(name = "calc_cli")]
#[command(version)]
#[command(about = "Calculators, unit and currency converters, age calculator")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file with unit tables and exchange rates
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Press keys on the standard calculator and print the display
    Keys {
        /// Keys, e.g. `5 + 3 =` or `9 sqrt`
        #[arg(required = true, allow_hyphen_values = true)]
        keys: Vec<String>,

        /// Print the display after every key
        #[arg(long)]
        steps: bool,
    },

    /// Evaluate an expression
    Eval {
        /// Expression text, e.g. `(2+3)*4`
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },

    /// Interactive calculator
    Repl {
        #[arg(long, value_enum, default_value = "standard")]
        mode: Mode,
    },

    /// Convert between units of one table
    Unit {
        #[arg(allow_hyphen_values = true)]
        value: String,
        from: String,
        to: String,
    },

    /// Convert between currencies
    Currency {
        amount: String,
        from: String,
        to: String,
    },

    /// Age and days until the next birthday
    Age {
        /// Birth date (YYYY-MM-DD)
        birth: String,

        /// Reference date (YYYY-MM-DD), defaults to the local date
        #[arg(long)]
        today: Option<String>,
    },

    /// List unit tables or currencies
    List {
        #[arg(value_enum, default_value = "units")]
        what: ListKind,
    },

    /// Write the built-in configuration to a file
    InitConfig {
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListKind {
    Units,
    Currencies,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => ToolboxConfig::default(),
    };

    match cli.command {
        Commands::Keys { keys, steps } => run_keys(&keys, steps, cli.json),
        Commands::Eval { expression } => run_eval(&expression, cli.json),
        Commands::Repl { mode } => {
            repl::run(mode, io::stdin().lock(), io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Unit { value, from, to } => {
            let outcome = config.convert_unit(&value, &from, &to);
            report(outcome, cli.json, |e| match e {
                CalcError::LookupMiss { .. } => "Unknown unit or units from different tables".to_string(),
                _ => "Invalid value".to_string(),
            })
        }
        Commands::Currency { amount, from, to } => {
            let outcome = config.convert_currency(&amount, &from, &to);
            report(outcome, cli.json, |e| match e {
                CalcError::LookupMiss { .. } => "Conversion not available".to_string(),
                _ => "Invalid amount".to_string(),
            })
        }
        Commands::Age { birth, today } => run_age(&birth, today.as_deref(), cli.json),
        Commands::List { what } => run_list(&config, what, cli.json),
        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
            }
            save_config(&ToolboxConfig::default(), &path)?;
            info!(path = %path.display(), "wrote default configuration");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "calc_cli=debug,calc_core=debug"
    } else {
        "calc_cli=info,calc_core=warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

/// Print a conversion outcome; `message` turns a failure into the user-facing line.
fn report(outcome: Result<String, CalcError>, as_json: bool, message: impl Fn(&CalcError) -> String) -> Result<ExitCode> {
    match outcome {
        Ok(text) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&json!({ "result": text }))?);
            } else {
                println!("{}", text);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            debug!(code = e.error_code(), error = %e, "conversion failed");
            if as_json {
                println!("{}", serde_json::to_string_pretty(&json!({ "error": e, "message": message(&e) }))?);
            } else {
                println!("{}", message(&e));
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_keys(words: &[String], steps: bool, as_json: bool) -> Result<ExitCode> {
    let mut state = CalculatorState::new();
    let mut memory = None;

    for word in words {
        for token in expand_keys(word, standard_key)? {
            memory = state.press(token).or(memory);
            if steps && !as_json {
                println!("{:>6}  {}", token.to_string(), state.display());
            }
        }
    }

    if as_json {
        let value = json!({
            "display": state.display(),
            "memory": state.memory(),
            "clear_label": state.clear_label(),
            "error": state.is_error(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if !steps {
        println!("{}", state.display());
    }
    if let Some(register) = memory {
        if !as_json {
            println!("M = {}", format_number(register));
        }
    }

    Ok(if state.is_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn run_eval(expression: &str, as_json: bool) -> Result<ExitCode> {
    match evaluate(expression) {
        Ok(value) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&json!({ "expression": expression, "result": value }))?);
            } else {
                println!("{}", format_number(value));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&json!({ "expression": expression, "error": e }))?);
            } else {
                println!("{}", display_tag(&e));
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_age(birth: &str, today: Option<&str>, as_json: bool) -> Result<ExitCode> {
    let today = match today {
        Some(text) => calc_core::age::parse_date("today", text)?,
        None => Local::now().date_naive(),
    };
    let birth: NaiveDate = match calc_core::age::parse_date("birth_date", birth) {
        Ok(date) => date,
        Err(e) => return report(Err(e), as_json, |_| "Please enter a valid date.".to_string()),
    };

    match compute_age(birth, today) {
        Ok(age) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&age)?);
            } else {
                println!("Your Age: {}", age);
                println!("Next Birthday: {} days until your next birthday!", age.days_until_next_birthday);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => report(Err(e), as_json, |_| "Please enter a valid date.".to_string()),
    }
}

fn run_list(config: &ToolboxConfig, what: ListKind, as_json: bool) -> Result<ExitCode> {
    match (what, as_json) {
        (ListKind::Units, true) => println!("{}", serde_json::to_string_pretty(&config.unit_tables)?),
        (ListKind::Currencies, true) => println!("{}", serde_json::to_string_pretty(&config.currency)?),
        (ListKind::Units, false) => {
            for table in &config.unit_tables {
                println!("{} (base: {})", table.category, table.base);
                for unit in &table.units {
                    println!("  {:<24} {:<28} {}", unit.key, unit.name, unit.label());
                }
            }
        }
        (ListKind::Currencies, false) => {
            for code in config.currency.currencies() {
                println!("{}", code);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
