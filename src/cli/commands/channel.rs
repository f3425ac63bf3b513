use crate::cli::core::{short_id, CommandError, CommandResult, ParsedArgs, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::ChannelService;
use crate::domain::SubscriptionChannel;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "channel-add",
            "Register a channel that can be subscribed to",
            "channel-add <name> <url> <description> <image_url> [--type <kind>]",
            cmd_channel_add,
        ),
        CommandEntry::new("channels", "List registered channels", "channels", cmd_channels),
    ]
}

fn cmd_channel_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["type"])?;
    let &[name, url, description, image_url] = parsed.positional.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: channel-add <name> <url> <description> <image_url> [--type <kind>]".into(),
        ));
    };

    let mut channel = SubscriptionChannel::new(name, url, description, image_url);
    if let Some(kind) = parsed.option("type") {
        channel = channel.with_type(kind);
    }
    let channel = ChannelService::add(&context.storage, channel)?;
    output::success(format!(
        "Channel `{}` added ({}).",
        channel.name,
        short_id(channel.id)
    ));
    Ok(())
}

fn cmd_channels(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let channels = ChannelService::list(&context.storage)?;
    if channels.is_empty() {
        output::info("No channels registered. Use `channel-add` first.");
        return Ok(());
    }
    output::section("Channels");
    let rows: Vec<Vec<String>> = channels
        .iter()
        .map(|channel| {
            vec![
                short_id(channel.id),
                channel.name.clone(),
                channel.channel_type.clone().unwrap_or_else(|| "-".into()),
                channel.status.to_string(),
                channel.url.clone(),
            ]
        })
        .collect();
    output::table(&["ID", "NAME", "TYPE", "STATUS", "URL"], &rows);
    Ok(())
}
