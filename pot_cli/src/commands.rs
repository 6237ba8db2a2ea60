//! Command-line verbs and their arguments.

use beer_pot::Money;
use pico_args::Arguments;
use std::{fmt, path::PathBuf};

/// Errors that can occur while parsing the command line.
#[derive(Debug)]
pub enum ParseError {
    /// No command given.
    MissingCommand,
    /// Command word not recognized.
    UnrecognizedCommand(String),
    /// Amount is not a decimal number.
    InvalidAmount(String),
    /// History index is not a non-negative whole number.
    InvalidIndex(String),
    /// Required argument or option missing.
    MissingArgument(&'static str),
    /// `reset` without `--yes`.
    ResetNotConfirmed,
    /// Arguments left over after the command was parsed.
    UnexpectedArgument(String),
    /// Option value could not be read.
    Args(pico_args::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommand => write!(f, "no command given"),
            Self::UnrecognizedCommand(command) => {
                write!(f, "unrecognized command: {command}")
            }
            Self::InvalidAmount(value) => write!(
                f,
                "invalid amount: '{value}' (use a number like 5 or 3,50)"
            ),
            Self::InvalidIndex(value) => write!(
                f,
                "invalid index: '{value}' (see the first column of `history`)"
            ),
            Self::MissingArgument(name) => write!(f, "missing argument: {name}"),
            Self::ResetNotConfirmed => {
                write!(f, "reset clears the whole history; confirm with --yes")
            }
            Self::UnexpectedArgument(arg) => write!(f, "unexpected argument: {arg}"),
            Self::Args(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<pico_args::Error> for ParseError {
    fn from(err: pico_args::Error) -> Self {
        Self::Args(err)
    }
}

/// Who was wrong and how much each loser pays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetArgs {
    /// Names given with `--wrong`; empty when both were right
    pub wrong: Vec<String>,
    /// `None` uses the configured default stake
    pub stake: Option<Money>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseArgs {
    pub amount: Money,
    pub payer: String,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferArgs {
    pub amount: Money,
    pub from: String,
    /// `None` means the other participant
    pub to: Option<String>,
    pub comment: String,
}

/// Replacement for an existing history entry, by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditArgs {
    Bet(BetArgs),
    Purchase(PurchaseArgs),
    Transfer(TransferArgs),
}

/// One invocation of the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    History,
    Bet(BetArgs),
    Buy(PurchaseArgs),
    Transfer(TransferArgs),
    Settle,
    Edit { index: usize, args: EditArgs },
    Delete { index: usize },
    Reset,
    Export { path: Option<PathBuf> },
    Import { path: PathBuf },
}

impl Command {
    /// Command word, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::Status => "status",
            Command::History => "history",
            Command::Bet(_) => "bet",
            Command::Buy(_) => "buy",
            Command::Transfer(_) => "transfer",
            Command::Settle => "settle",
            Command::Edit { .. } => "edit",
            Command::Delete { .. } => "delete",
            Command::Reset => "reset",
            Command::Export { .. } => "export",
            Command::Import { .. } => "import",
        }
    }

    /// Whether the command changes the pot
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Command::Status | Command::History | Command::Export { .. }
        )
    }
}

/// Parse the command and its arguments.
///
/// Global options must already be consumed from `args`. Every argument
/// must be used; leftovers are an error.
///
/// # Arguments
///
/// * `args` - Remaining command-line arguments
///
/// # Returns
///
/// * `Ok(Command)` - Parsed command
/// * `Err(ParseError)` - Parse error with descriptive message
pub fn parse(mut args: Arguments) -> Result<Command, ParseError> {
    let word = args.subcommand()?.ok_or(ParseError::MissingCommand)?;

    let command = match word.as_str() {
        "status" => Command::Status,
        "history" => Command::History,
        "bet" => Command::Bet(parse_bet(&mut args)?),
        "buy" => Command::Buy(parse_purchase(&mut args)?),
        "transfer" => Command::Transfer(parse_transfer(&mut args)?),
        "settle" => Command::Settle,
        "edit" => parse_edit(&mut args)?,
        "delete" => Command::Delete {
            index: parse_index(&mut args)?,
        },
        "reset" => {
            if !args.contains("--yes") {
                return Err(ParseError::ResetNotConfirmed);
            }
            Command::Reset
        }
        "export" => Command::Export {
            path: args.opt_free_from_str()?,
        },
        "import" => Command::Import {
            path: args
                .opt_free_from_str()?
                .ok_or(ParseError::MissingArgument("FILE"))?,
        },
        _ => return Err(ParseError::UnrecognizedCommand(word)),
    };

    if let Some(extra) = args.finish().first() {
        return Err(ParseError::UnexpectedArgument(
            extra.to_string_lossy().into_owned(),
        ));
    }
    Ok(command)
}

/// Parse "bet [--wrong NAME]... [--stake AMOUNT] [--comment TEXT]"
fn parse_bet(args: &mut Arguments) -> Result<BetArgs, ParseError> {
    let wrong: Vec<String> = args.values_from_str("--wrong")?;
    let stake = args
        .opt_value_from_str::<_, String>("--stake")?
        .map(|raw| parse_amount(&raw))
        .transpose()?;
    Ok(BetArgs {
        wrong,
        stake,
        comment: parse_comment(args)?,
    })
}

/// Parse "buy AMOUNT --payer NAME [--comment TEXT]"
fn parse_purchase(args: &mut Arguments) -> Result<PurchaseArgs, ParseError> {
    let payer = args
        .opt_value_from_str("--payer")?
        .ok_or(ParseError::MissingArgument("--payer"))?;
    let comment = parse_comment(args)?;
    Ok(PurchaseArgs {
        amount: parse_free_amount(args)?,
        payer,
        comment,
    })
}

/// Parse "transfer AMOUNT --from NAME [--to NAME] [--comment TEXT]"
fn parse_transfer(args: &mut Arguments) -> Result<TransferArgs, ParseError> {
    let from = args
        .opt_value_from_str("--from")?
        .ok_or(ParseError::MissingArgument("--from"))?;
    let to = args.opt_value_from_str("--to")?;
    let comment = parse_comment(args)?;
    Ok(TransferArgs {
        amount: parse_free_amount(args)?,
        from,
        to,
        comment,
    })
}

/// Parse "edit INDEX KIND ..."
fn parse_edit(args: &mut Arguments) -> Result<Command, ParseError> {
    let index = parse_index(args)?;
    let kind = args
        .subcommand()?
        .ok_or(ParseError::MissingArgument("KIND (bet, buy or transfer)"))?;
    let args = match kind.as_str() {
        "bet" => EditArgs::Bet(parse_bet(args)?),
        "buy" => EditArgs::Purchase(parse_purchase(args)?),
        "transfer" => EditArgs::Transfer(parse_transfer(args)?),
        _ => return Err(ParseError::UnrecognizedCommand(format!("edit {kind}"))),
    };
    Ok(Command::Edit { index, args })
}

fn parse_index(args: &mut Arguments) -> Result<usize, ParseError> {
    let raw: String = args
        .opt_free_from_str()?
        .ok_or(ParseError::MissingArgument("INDEX"))?;
    raw.trim()
        .parse()
        .map_err(|_| ParseError::InvalidIndex(raw))
}

fn parse_comment(args: &mut Arguments) -> Result<String, ParseError> {
    Ok(args
        .opt_value_from_str::<_, String>("--comment")?
        .unwrap_or_default())
}

fn parse_free_amount(args: &mut Arguments) -> Result<Money, ParseError> {
    let raw: String = args
        .opt_free_from_str()?
        .ok_or(ParseError::MissingArgument("AMOUNT"))?;
    parse_amount(&raw)
}

/// Sign is checked by the ledger, not here
fn parse_amount(raw: &str) -> Result<Money, ParseError> {
    Money::parse_input(raw).map_err(|_| ParseError::InvalidAmount(raw.to_string()))
}
