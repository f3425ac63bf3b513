use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const CONFIG_USAGE: &str = "config [show | backup [note] | backups | restore <name>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "config",
            "Show the configuration or manage its backups",
            CONFIG_USAGE,
            cmd_config,
        ),
        CommandEntry::new(
            "config-set",
            "Change a configuration value",
            "config-set <currency|include_paused|report_year|backup_retention> <value>",
            cmd_config_set,
        ),
    ]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {
            show_config(context);
            Ok(())
        }
        ["backup", note @ ..] => {
            let note = (!note.is_empty()).then(|| note.join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            output::success(format!("Configuration backed up as `{name}`."));
            Ok(())
        }
        ["backups"] => {
            let backups = context.config_manager.list_backups()?;
            if backups.is_empty() {
                output::info("No configuration backups.");
            }
            for name in backups {
                output::info(format!("  {name}"));
            }
            Ok(())
        }
        ["restore", name] => {
            context.config = context.config_manager.restore(name)?;
            output::success(format!("Configuration restored from `{name}`."));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(format!("usage: {CONFIG_USAGE}"))),
    }
}

fn cmd_config_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let &[key, value] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: config-set <key> <value>".into(),
        ));
    };
    context.config.set(&key.to_ascii_lowercase(), value)?;
    context.persist_config()?;
    output::success(format!("Set {key} = {value}."));
    Ok(())
}

fn show_config(context: &ShellContext) {
    let config = &context.config;
    output::section("Configuration");
    output::info(format!("  currency         : {}", config.currency));
    output::info(format!("  include_paused   : {}", config.include_paused));
    output::info(format!(
        "  report_year      : {}",
        config
            .report_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "current".into())
    ));
    output::info(format!("  backup_retention : {}", config.backup_retention));
    output::info(format!(
        "  file             : {}",
        context.config_manager.path().display()
    ));
}
