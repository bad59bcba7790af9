//! Administrative CLI for document counters.
//!
//! Usage:
//!   numbering show [SEQUENCE]             - Print current counter values
//!   numbering next SEQUENCE               - Issue and print the next code
//!   numbering seed SEQUENCE [--start N]   - Initialize a counter
//!
//! Configuration comes from `config/` and `VAREJO__*` variables, see
//! `AppConfig::load`.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use varejo_core::document::DocumentKind;
use varejo_core::numbering::{NumberingScheme, SeedOutcome, SequenceKind};
use varejo_db::{CounterRepository, DocumentRepository, connect_with};
use varejo_shared::AppConfig;
use varejo_shared::config::LoggingConfig;

#[derive(Parser, Debug)]
#[command(name = "numbering")]
#[command(about = "Inspect and initialize document counters")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print current counter values without incrementing them.
    Show {
        /// Counter name, e.g. `contas_pagar`. All counters when omitted.
        #[arg(value_parser = parse_sequence)]
        sequence: Option<SequenceKind>,
    },
    /// Increment a counter and print the resulting document code.
    Next {
        /// Counter name.
        #[arg(value_parser = parse_sequence)]
        sequence: SequenceKind,
    },
    /// Initialize a counter unless it already exists.
    ///
    /// Payable and receivable counters are seeded from the highest stored
    /// document number; other counters need `--start`.
    Seed {
        /// Counter name.
        #[arg(value_parser = parse_sequence)]
        sequence: SequenceKind,
        /// Explicit initial value; the next issued number is `start + 1`.
        #[arg(long)]
        start: Option<u64>,
    },
}

fn parse_sequence(name: &str) -> Result<SequenceKind, String> {
    SequenceKind::parse(name).ok_or_else(|| {
        let known: Vec<_> = SequenceKind::ALL.iter().map(|k| k.counter_name()).collect();
        format!("unknown counter {name:?}, expected one of: {}", known.join(", "))
    })
}

/// Document table backing a sequence, if any.
fn document_kind(sequence: SequenceKind) -> Option<DocumentKind> {
    [DocumentKind::Payable, DocumentKind::Receivable]
        .into_iter()
        .find(|kind| kind.sequence() == sequence)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let counters = CounterRepository::new(db.clone());
    let documents = DocumentRepository::with_config(db, config.numbering.clone(), &config.ledger);

    match cli.command {
        Command::Show { sequence } => {
            let sequences = sequence.map_or_else(|| SequenceKind::ALL.to_vec(), |s| vec![s]);
            for sequence in sequences {
                let scheme = NumberingScheme::from_config(sequence, &config.numbering);
                match counters.current(sequence.counter_name()).await? {
                    Some(seq) => {
                        let last = scheme.render(u64::try_from(seq)?);
                        println!("{sequence:<16} {seq:>10}  last issued {last}");
                    }
                    None => println!("{sequence:<16} {:>10}  not initialized", "-"),
                }
            }
        }
        Command::Next { sequence } => {
            let scheme = NumberingScheme::from_config(sequence, &config.numbering);
            println!("{}", counters.issue(&scheme).await?);
        }
        Command::Seed { sequence, start } => {
            let outcome = match (start, document_kind(sequence)) {
                (Some(start), _) => counters.seed_value(sequence.counter_name(), start).await?,
                (None, Some(kind)) => documents.seed_counter(kind).await?,
                (None, None) => bail!("{sequence} has no stored documents to scan; pass --start"),
            };
            match outcome {
                SeedOutcome::Seeded(seq) => println!("{sequence}: seeded at {seq}"),
                SeedOutcome::AlreadyInitialized(seq) => {
                    println!("{sequence}: already initialized at {seq}, left unchanged");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_seed_with_start() {
        let cli = Cli::try_parse_from(["numbering", "seed", "vendas", "--start", "41"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Seed {
                sequence: SequenceKind::Sale,
                start: Some(41)
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_counter() {
        assert!(Cli::try_parse_from(["numbering", "next", "estoque"]).is_err());
    }

    #[test]
    fn test_document_kind_mapping() {
        assert_eq!(
            document_kind(SequenceKind::Receivable),
            Some(DocumentKind::Receivable)
        );
        assert_eq!(document_kind(SequenceKind::Invoice), None);
    }
}
