//! Shared runtime state for CLI interactions and command execution.

use crate::{
    config::{Config, ConfigManager},
    core::clock::Clock,
    domain::AccountId,
    storage::JsonStorage,
};

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub storage: JsonStorage,
    pub clock: Box<dyn Clock>,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub account: AccountId,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, account: {}, last_command: {:?} }}",
            self.running, self.account, self.last_command
        )
    }
}
