//! Command-line front end for the shared beer pot.
//!
//! Each invocation loads the pot from the configured store, runs one command
//! through the pot manager and exits.

mod commands;
mod config;
mod logging;

use std::{fs::File, path::PathBuf, sync::Arc, time::Instant};

use anyhow::Error;
use beer_pot::{
    Participants, PotError, PotManager, Side, TransactionEdit, clock,
    interchange::{self, InterchangeError},
    store::{JsonFileStore, LedgerStore, PgLedgerStore},
};
use commands::{BetArgs, Command, EditArgs, TransferArgs};
use config::AppConfig;
use log::{error, info};
use pico_args::Arguments;

const HELP: &str = "\
Keep the shared beer pot of two friends

USAGE:
  pot_cli [OPTIONS] COMMAND

COMMANDS:
  status                                       Pot balance, per-person totals, settlement hint
  history                                      All entries, oldest first
  bet [--wrong NAME]... [--stake AMOUNT] [--comment TEXT]
                                               Every NAME given pays the stake into the pot
  buy AMOUNT --payer NAME [--comment TEXT]     Pay beer out of the pot
  transfer AMOUNT --from NAME [--to NAME] [--comment TEXT]
                                               Move equity between the two
  settle                                       Book the suggested settlement transfer
  edit INDEX bet|buy|transfer ...              Replace an entry (same arguments as above)
  delete INDEX                                 Remove an entry
  reset --yes                                  Clear the history and the pot
  export [FILE]                                Write the history as CSV
  import FILE                                  Replace the history with a CSV export

OPTIONS:
  --data-dir   DIR         Directory of wette_pot.json  [default: env APP_DIR or ./data]
  --db-url     URL         Use PostgreSQL instead of the JSON file  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  POT_FIRST_PARTICIPANT    First name  [default: Sven]
  POT_SECOND_PARTICIPANT   Second name  [default: Sevi]
  POT_DEFAULT_STAKE        Stake per loser  [default: 5.00]
  STORE_TIMEOUT_SECS       Load/save timeout  [default: 5]
  RUST_LOG                 Log filter  [default: info,sqlx=warn]
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let data_dir: Option<PathBuf> = pargs.opt_value_from_str("--data-dir")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    let command = match commands::parse(pargs) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("Error: {err}\n");
            eprint!("{HELP}");
            std::process::exit(2);
        }
    };

    logging::init();

    let config = AppConfig::from_env(data_dir, database_url)?;
    config.validate()?;

    let store: Arc<dyn LedgerStore> = match &config.database {
        Some(database) => {
            info!("Connecting to database...");
            let store = PgLedgerStore::connect(database, config.store_timeout).await?;
            store.health_check().await?;
            Arc::new(store)
        }
        None => Arc::new(
            JsonFileStore::in_dir(&config.data_dir).with_timeout(config.store_timeout),
        ),
    };
    let manager = PotManager::open(store, config.participants.clone()).await;
    info!("Pot loaded from {}", manager.store_description());

    let name = command.name();
    let mutation = command.is_mutation();
    let started = Instant::now();
    let result = run(&manager, &config, command).await;
    if mutation {
        logging::log_store_operation(
            name,
            &manager.store_description(),
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
    }

    if let Err(err) = result {
        error!("{name} failed: {err}");
        eprintln!("Fehler: {}", err.client_message());
        std::process::exit(1);
    }

    Ok(())
}

/// Execute one command against the pot and print its outcome
async fn run(manager: &PotManager, config: &AppConfig, command: Command) -> Result<(), PotError> {
    let participants = manager.participants();

    match command {
        Command::Status => print_status(manager).await,
        Command::History => print_history(manager).await,
        Command::Bet(args) => {
            let (first_correct, second_correct) = correctness(participants, &args)?;
            let stake = args.stake.unwrap_or(config.default_stake);
            let receipt = manager
                .record_bet(first_correct, second_correct, &args.comment, stake)
                .await?;
            println!("{}", receipt.message);
        }
        Command::Buy(args) => {
            let payer = participants.side_of(&args.payer)?;
            let receipt = manager
                .record_purchase(args.amount, payer, &args.comment)
                .await?;
            println!("{}", receipt.message);
        }
        Command::Transfer(args) => {
            let (payer, receiver) = transfer_sides(participants, &args)?;
            let receipt = manager
                .record_transfer(args.amount, payer, receiver, &args.comment)
                .await?;
            println!("{}", receipt.message);
        }
        Command::Settle => {
            let receipt = manager.settle().await?;
            println!("{}", receipt.message);
        }
        Command::Edit { index, args } => {
            let edit = match args {
                EditArgs::Bet(args) => {
                    let (first_correct, second_correct) = correctness(participants, &args)?;
                    let stake = match args.stake {
                        Some(stake) => stake,
                        None => manager
                            .infer_stake(index)
                            .await?
                            .unwrap_or(config.default_stake),
                    };
                    TransactionEdit::Bet {
                        first_wrong: !first_correct,
                        second_wrong: !second_correct,
                        stake,
                        comment: args.comment,
                    }
                }
                EditArgs::Purchase(args) => TransactionEdit::Purchase {
                    amount: args.amount,
                    payer: participants.side_of(&args.payer)?,
                    comment: args.comment,
                },
                EditArgs::Transfer(args) => {
                    let (payer, receiver) = transfer_sides(participants, &args)?;
                    TransactionEdit::Transfer {
                        amount: args.amount,
                        payer,
                        receiver,
                        comment: args.comment,
                    }
                }
            };
            let receipt = manager.edit_transaction(index, edit).await?;
            println!("{}", receipt.message);
        }
        Command::Delete { index } => {
            let receipt = manager.delete_transaction(index).await?;
            println!("{}", receipt.message);
        }
        Command::Reset => {
            let receipt = manager.reset().await?;
            println!("{}", receipt.message);
        }
        Command::Export { path } => {
            let csv = manager.export_csv().await?;
            let path = path
                .unwrap_or_else(|| PathBuf::from(interchange::export_file_name(&clock::now())));
            std::fs::write(&path, csv).map_err(InterchangeError::Io)?;
            println!("Verlauf exportiert nach {}", path.display());
        }
        Command::Import { path } => {
            let file = File::open(&path).map_err(InterchangeError::Io)?;
            let receipt = manager.import_csv(file).await?;
            println!("{}", receipt.message);
        }
    }

    Ok(())
}

/// Bet outcome from the `--wrong` names, as (first correct, second correct)
fn correctness(participants: &Participants, args: &BetArgs) -> Result<(bool, bool), PotError> {
    let mut first_correct = true;
    let mut second_correct = true;
    for name in &args.wrong {
        match participants.side_of(name)? {
            Side::First => first_correct = false,
            Side::Second => second_correct = false,
        }
    }
    Ok((first_correct, second_correct))
}

/// Payer and receiver of a transfer; receiver defaults to the other participant
fn transfer_sides(
    participants: &Participants,
    args: &TransferArgs,
) -> Result<(Side, Side), PotError> {
    let payer = participants.side_of(&args.from)?;
    let receiver = match &args.to {
        Some(name) => participants.side_of(name)?,
        None => payer.other(),
    };
    Ok((payer, receiver))
}

async fn print_status(manager: &PotManager) {
    let participants = manager.participants();
    let totals = manager.person_totals().await;

    println!("Pot: {}", manager.balance().await.chf());
    for side in Side::BOTH {
        println!("  {}: {}", participants.name(side), totals.get(side).chf());
    }
    println!("{}", manager.last_reset_label().await);

    if let Some(settlement) = manager.suggest_settlement().await {
        println!(
            "Ausgleich empfohlen: {} → {} {} (pot_cli settle)",
            participants.name(settlement.payer),
            participants.name(settlement.receiver),
            settlement.amount.chf()
        );
    }
}

async fn print_history(manager: &PotManager) {
    let rows = manager.history_rows().await;
    if rows.is_empty() {
        println!("Noch keine Einträge.");
        return;
    }

    for row in rows {
        println!(
            "{:>4}  {}  {:<9} {:>9}  {}  {}",
            row.index, row.time, row.kind_label, row.amount, row.summary, row.comment
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beer_pot::{Money, store::MemoryStore};

    fn bet(wrong: &[&str]) -> BetArgs {
        BetArgs {
            wrong: wrong.iter().map(|s| s.to_string()).collect(),
            stake: None,
            comment: String::new(),
        }
    }

    #[test]
    fn test_correctness_from_names() {
        let participants = Participants::default();
        assert_eq!(correctness(&participants, &bet(&[])).unwrap(), (true, true));
        assert_eq!(
            correctness(&participants, &bet(&["Sevi"])).unwrap(),
            (true, false)
        );
        assert_eq!(
            correctness(&participants, &bet(&["Sven", "Sevi"])).unwrap(),
            (false, false)
        );
        assert!(matches!(
            correctness(&participants, &bet(&["Hans"])),
            Err(PotError::Ledger(_))
        ));
    }

    #[test]
    fn test_transfer_defaults_to_other_participant() {
        let args = TransferArgs {
            amount: Money::from_cents(100),
            from: "Sevi".to_string(),
            to: None,
            comment: String::new(),
        };
        assert_eq!(
            transfer_sides(&Participants::default(), &args).unwrap(),
            (Side::Second, Side::First)
        );
    }

    #[tokio::test]
    async fn test_edit_bet_keeps_stored_stake() {
        let manager =
            PotManager::open(Arc::new(MemoryStore::new()), Participants::default()).await;
        let config = AppConfig {
            data_dir: PathBuf::from("./data"),
            database: None,
            participants: Participants::default(),
            default_stake: Money::from_cents(500),
            store_timeout: std::time::Duration::from_secs(5),
        };

        run(
            &manager,
            &config,
            Command::Bet(BetArgs {
                stake: Some(Money::from_cents(200)),
                ..bet(&["Sven"])
            }),
        )
        .await
        .unwrap();
        assert_eq!(manager.balance().await, Money::from_cents(200));

        run(
            &manager,
            &config,
            Command::Edit {
                index: 0,
                args: EditArgs::Bet(bet(&["Sven", "Sevi"])),
            },
        )
        .await
        .unwrap();
        assert_eq!(manager.balance().await, Money::from_cents(400));
    }
}
