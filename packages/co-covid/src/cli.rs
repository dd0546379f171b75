//! Command-line interface for the connector.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;

use crate::config::{parse_datetime, Settings};
use crate::context::FileContext;
use crate::error::Result;
use crate::fetch::Connector;
use crate::prompt::TerminalPrompter;
use crate::register::register;
use crate::reshape::PairingStrategy;

/// Colorado county COVID-19 statistics connector.
#[derive(Parser)]
#[command(name = "co-covid")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactively select FIPS codes and write the pipe configuration.
    Register {
        /// Write the configuration JSON to this file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch case and death counts for a registered configuration.
    Fetch {
        /// Configuration JSON written by `register`
        #[arg(short, long)]
        config: PathBuf,

        /// Lower date bound (default: --last-sync)
        #[arg(short, long, value_parser = parse_date_arg)]
        begin: Option<NaiveDateTime>,

        /// Upper date bound (default: unbounded)
        #[arg(short, long, value_parser = parse_date_arg)]
        end: Option<NaiveDateTime>,

        /// Timestamp of the newest row already synced
        #[arg(long, value_parser = parse_date_arg)]
        last_sync: Option<NaiveDateTime>,

        /// How Cases and Deaths records are matched
        #[arg(long, value_enum, default_value_t = PairingArg::Keyed)]
        pairing: PairingArg,

        /// Print request parameters, raw response and records to stderr
        #[arg(long)]
        debug: bool,
    },
}

/// `--pairing` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PairingArg {
    /// Join Cases and Deaths on (county, date)
    Keyed,
    /// Take cases from the record after each Deaths record
    Adjacent,
}

impl From<PairingArg> for PairingStrategy {
    fn from(arg: PairingArg) -> Self {
        match arg {
            PairingArg::Keyed => Self::Keyed,
            PairingArg::Adjacent => Self::Adjacent,
        }
    }
}

fn parse_date_arg(text: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_datetime(text).map_err(|e| e.to_string())
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Register { output } => register_command(output.as_deref()),
        Commands::Fetch {
            config,
            begin,
            end,
            last_sync,
            pairing,
            debug,
        } => fetch_command(&config, begin, end, last_sync, pairing.into(), debug),
    }
}

/// Execute the register command.
fn register_command(output: Option<&Path>) -> Result<()> {
    let config = register(&mut TerminalPrompter)?;
    let json = serde_json::to_string_pretty(&config)?;

    match output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))?;
            eprintln!(
                "{} {}",
                style("Saved to:").green().bold(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Execute the fetch command.
fn fetch_command(
    config: &Path,
    begin: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    last_sync: Option<NaiveDateTime>,
    pairing: PairingStrategy,
    debug: bool,
) -> Result<()> {
    let ctx = FileContext::load(config)?
        .with_sync_time(last_sync)
        .with_debug(debug);

    let connector = Connector::new(Settings::from_env()?.with_pairing(pairing))?;
    let records = connector.fetch(&ctx, begin, end)?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    eprintln!(
        "{} {} rows",
        style("Fetched").green().bold(),
        style(records.len()).cyan()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_register() {
        let cli = Cli::parse_from(["co-covid", "register"]);

        let Commands::Register { output } = cli.command else {
            panic!("expected register command");
        };
        assert!(output.is_none());
    }

    #[test]
    fn test_cli_parse_fetch_defaults() {
        let cli = Cli::parse_from(["co-covid", "fetch", "--config", "pipe.json"]);

        let Commands::Fetch {
            config,
            begin,
            end,
            last_sync,
            pairing,
            debug,
        } = cli.command
        else {
            panic!("expected fetch command");
        };
        assert_eq!(config, PathBuf::from("pipe.json"));
        assert!(begin.is_none());
        assert!(end.is_none());
        assert!(last_sync.is_none());
        assert_eq!(PairingStrategy::from(pairing), PairingStrategy::Keyed);
        assert!(!debug);
    }

    #[test]
    fn test_cli_parse_fetch_with_window() {
        let cli = Cli::parse_from([
            "co-covid",
            "fetch",
            "-c",
            "pipe.json",
            "--begin",
            "2021-03-01",
            "--end",
            "03/31/2021",
            "--pairing",
            "adjacent",
            "--debug",
        ]);

        let Commands::Fetch {
            begin,
            end,
            pairing,
            debug,
            ..
        } = cli.command
        else {
            panic!("expected fetch command");
        };
        assert_eq!(begin, Some(parse_datetime("2021-03-01").unwrap()));
        assert_eq!(end, Some(parse_datetime("2021-03-31").unwrap()));
        assert_eq!(PairingStrategy::from(pairing), PairingStrategy::Adjacent);
        assert!(debug);
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        let result = Cli::try_parse_from(["co-covid", "fetch", "-c", "p.json", "--begin", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_pairing() {
        let result =
            Cli::try_parse_from(["co-covid", "fetch", "-c", "p.json", "--pairing", "zip"]);
        assert!(result.is_err());
    }
}
