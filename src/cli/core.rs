//! Core CLI dispatch, error reporting, and argument parsing helpers.

use std::{collections::HashMap, env, io};

use chrono::NaiveDate;
use strsim::levenshtein;
use uuid::Uuid;

use crate::{
    config::ConfigManager,
    core::{
        clock::{Clock, FixedClock, SystemClock},
        errors::{ScheduleError, SubtrackError},
    },
    domain::AccountId,
    storage::JsonStorage,
};

pub use crate::cli::shell_context::{CliMode, ShellContext};
pub use crate::core::errors::CliError;

use super::commands;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

/// Pins the shell's notion of "today"; used by scripted runs.
pub const TODAY_ENV: &str = "SUBTRACK_TODAY";
/// Account the shell acts for until `account <id>` switches it.
pub const ACCOUNT_ENV: &str = "SUBTRACK_ACCOUNT";
const DEFAULT_ACCOUNT: AccountId = AccountId(1);
const MAX_SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let storage = JsonStorage::new_default()?;
        let config_manager = ConfigManager::with_base_dir(storage.base_dir().to_path_buf())?;
        let config = config_manager.load()?;

        Ok(ShellContext {
            mode,
            registry,
            storage,
            clock: clock_from_env(),
            config_manager,
            config,
            account: account_from_env()?,
            last_command: None,
            running: true,
        })
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        format!("subtrack[{}]> ", self.account)
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn format_amount(&self, amount: f64) -> String {
        format!("{amount:.2} {}", self.config.currency)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = closest_command(self.registry.names(), input) {
            output::info(format!("Suggestion: `{best}`?"));
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
        Ok(())
    }
}

fn clock_from_env() -> Box<dyn Clock> {
    match env::var(TODAY_ENV) {
        Ok(raw) => match parse_date(raw.trim()) {
            Ok(date) => Box::new(FixedClock::new(date)),
            Err(err) => {
                tracing::warn!(value = %raw, error = %err, "ignoring {TODAY_ENV}");
                Box::new(SystemClock)
            }
        },
        Err(_) => Box::new(SystemClock),
    }
}

fn account_from_env() -> Result<AccountId, CliError> {
    match env::var(ACCOUNT_ENV) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CliError::Input(format!("{ACCOUNT_ENV} must be a numeric account id"))),
        Err(_) => Ok(DEFAULT_ACCOUNT),
    }
}

pub(crate) fn closest_command<'a>(
    names: impl Iterator<Item = &'a str>,
    input: &str,
) -> Option<&'a str> {
    let needle = input.to_lowercase();
    names
        .map(|name| (levenshtein(name, &needle), name))
        .min_by_key(|(distance, _)| *distance)
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .map(|(_, name)| name)
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{input}` (use YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    input
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid amount `{input}`")))
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

/// Positional arguments plus `--flag value` options.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    options: HashMap<String, &'a str>,
}

impl<'a> ParsedArgs<'a> {
    pub fn parse(args: &[&'a str], allowed: &[&str]) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            match arg.strip_prefix("--") {
                Some(flag) => {
                    let flag = flag.to_ascii_lowercase();
                    if !allowed.contains(&flag.as_str()) {
                        return Err(CommandError::InvalidArguments(format!(
                            "unknown option `--{flag}`"
                        )));
                    }
                    let value = iter.next().ok_or_else(|| {
                        CommandError::InvalidArguments(format!("option `--{flag}` needs a value"))
                    })?;
                    parsed.options.insert(flag, value);
                }
                None => parsed.positional.push(arg),
            }
        }
        Ok(parsed)
    }

    pub fn option(&self, flag: &str) -> Option<&'a str> {
        self.options.get(flag).copied()
    }

    pub fn date(&self, flag: &str) -> Result<Option<NaiveDate>, CommandError> {
        self.option(flag).map(parse_date).transpose()
    }

    pub fn amount(&self, flag: &str) -> Result<Option<f64>, CommandError> {
        self.option(flag).map(parse_amount).transpose()
    }

    pub fn parsed<T: std::str::FromStr>(&self, flag: &str) -> Result<Option<T>, CommandError>
    where
        T::Err: Into<CommandError>,
    {
        self.option(flag)
            .map(|raw| raw.parse::<T>().map_err(Into::into))
            .transpose()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] SubtrackError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ScheduleError> for CommandError {
    fn from(err: ScheduleError) -> Self {
        CommandError::Core(err.into())
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_are_limited_to_close_names() {
        let names = ["subscribe", "report", "channels"];
        assert_eq!(
            closest_command(names.iter().copied(), "subscrbe"),
            Some("subscribe")
        );
        assert_eq!(closest_command(names.iter().copied(), "zzzzzzzzzz"), None);
    }

    #[test]
    fn options_are_split_from_positionals() {
        let args = ["Netflix", "15.99", "--cadence", "weekly"];
        let parsed = ParsedArgs::parse(&args, &["cadence", "day"]).unwrap();
        assert_eq!(parsed.positional, vec!["Netflix", "15.99"]);
        assert_eq!(parsed.option("cadence"), Some("weekly"));
        assert!(ParsedArgs::parse(&["--bogus", "1"], &["cadence"]).is_err());
        assert!(ParsedArgs::parse(&["--cadence"], &["cadence"]).is_err());
    }

    #[test]
    fn dates_and_amounts_are_validated() {
        assert!(parse_date("2025-02-30").is_err());
        assert_eq!(
            parse_date("2025-02-28").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert!(parse_amount("NaN").is_err());
        assert_eq!(parse_amount("9.5").unwrap(), 9.5);
    }
}
