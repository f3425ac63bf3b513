use uuid::Uuid;

use crate::cli::core::{
    parse_amount, short_id, CommandError, CommandResult, ParsedArgs, ShellContext,
};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{BillingService, ChannelService, SubscriptionService};
use crate::domain::{
    Displayable, DueType, EventKind, Identifiable, NamedEntity, SubscriptionChannel,
    SubscriptionDraft, SubscriptionFilter, SubscriptionRecord, SubscriptionStatus,
};
use crate::storage::SubscriptionStore;

const SUBSCRIBE_USAGE: &str = "subscribe <channel> <monthly_bill> [--cadence daily|weekly|monthly|yearly] [--day <1-31>] [--start <date>] [--end <date>] [--next <date>] [--remind <date>] [--status <status>]";
const LIST_USAGE: &str = "list [--status <status>] [--min <cost>] [--max <cost>] [--start-from <date>] [--start-to <date>] [--due-from <date>] [--due-to <date>] [--sort <field>] [--order asc|desc]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "subscribe",
            "Subscribe the current account to a channel",
            SUBSCRIBE_USAGE,
            cmd_subscribe,
        ),
        CommandEntry::new(
            "list",
            "List the current account's subscriptions",
            LIST_USAGE,
            cmd_list,
        ),
        CommandEntry::new(
            "set-status",
            "Change a subscription's status",
            "set-status <subscription> <active|inactive|paused|cancelled>",
            cmd_set_status,
        ),
        CommandEntry::new(
            "advance",
            "Roll passed due dates forward to the next billing date",
            "advance",
            cmd_advance,
        ),
        CommandEntry::new(
            "history",
            "Show the current account's subscription events",
            "history",
            cmd_history,
        ),
    ]
}

fn cmd_subscribe(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &["cadence", "day", "start", "end", "next", "remind", "status"],
    )?;
    let &[channel_ref, bill] = parsed.positional.as_slice() else {
        return Err(CommandError::InvalidArguments(format!("usage: {SUBSCRIBE_USAGE}")));
    };

    let channel = resolve_channel(context, channel_ref)?;
    let due_type = parsed
        .parsed::<DueType>("cadence")?
        .unwrap_or(DueType::Monthly);
    let due_day = match parsed.option("day") {
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
            CommandError::InvalidArguments(format!("invalid day of month `{raw}`"))
        })?),
        None if due_type.requires_day_of_month() => Some(1),
        None => None,
    };

    let mut draft = SubscriptionDraft::new(channel.id, parse_amount(bill)?).cadence(due_type, due_day);
    if let Some(start) = parsed.date("start")? {
        draft = draft.starting(start);
    }
    if let Some(end) = parsed.date("end")? {
        draft = draft.ending(end);
    }
    if let Some(next) = parsed.date("next")? {
        draft = draft.next_due(next);
    }
    if let Some(status) = parsed.parsed::<SubscriptionStatus>("status")? {
        draft = draft.with_status(status);
    }
    draft.reminder_date = parsed.date("remind")?;

    let record =
        SubscriptionService::create(&context.storage, context.account, draft, context.clock.as_ref())?;
    output::success(format!(
        "Subscribed to `{}` ({}): {} {}, next due {}.",
        channel.name,
        short_id(record.id),
        context.format_amount(record.monthly_bill),
        record.due_type,
        record.next_due_date
    ));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &[
            "status",
            "min",
            "max",
            "start-from",
            "start-to",
            "due-from",
            "due-to",
            "sort",
            "order",
        ],
    )?;
    if !parsed.positional.is_empty() {
        return Err(CommandError::InvalidArguments(format!("usage: {LIST_USAGE}")));
    }
    let filter = SubscriptionFilter {
        status: parsed.parsed("status")?,
        min_cost: parsed.amount("min")?,
        max_cost: parsed.amount("max")?,
        start_date_from: parsed.date("start-from")?,
        start_date_to: parsed.date("start-to")?,
        next_due_date_from: parsed.date("due-from")?,
        next_due_date_to: parsed.date("due-to")?,
        sort_by: parsed.parsed("sort")?,
        sort_order: parsed.parsed("order")?,
    };

    let records = SubscriptionService::list(&context.storage, context.account, Some(&filter))?;
    if records.is_empty() {
        output::info(format!("No subscriptions for account {}.", context.account));
        return Ok(());
    }

    output::section(format!("Subscriptions for account {}", context.account));
    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        rows.push(vec![
            short_id(record.id),
            channel_label(context, record.channel_id),
            record.due_type.to_string(),
            record
                .due_day_of_month
                .map(|day| day.to_string())
                .unwrap_or_else(|| "-".into()),
            context.format_amount(record.monthly_bill),
            record.next_due_date.to_string(),
            record.status.to_string(),
        ]);
    }
    output::table(
        &["ID", "CHANNEL", "CADENCE", "DAY", "BILL", "NEXT DUE", "STATUS"],
        &rows,
    );
    Ok(())
}

fn cmd_set_status(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let &[reference, raw_status] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: set-status <subscription> <active|inactive|paused|cancelled>".into(),
        ));
    };
    let status: SubscriptionStatus = raw_status.parse()?;
    let record = resolve_subscription(context, reference)?;
    let updated =
        SubscriptionService::set_status(&context.storage, context.account, record.id, status)?;
    output::success(format!(
        "Subscription {} is now {}: {}.",
        short_id(updated.id),
        updated.status,
        updated.display_label()
    ));
    Ok(())
}

fn cmd_advance(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let outcome =
        BillingService::advance_due_dates(&context.storage, context.account, context.clock.as_ref())?;
    for advanced in &outcome.advanced {
        output::info(format!(
            "  {}  {} -> {}",
            short_id(advanced.subscription_id),
            advanced.from,
            advanced.to
        ));
    }
    for skipped in &outcome.skipped {
        output::warning(format!(
            "Skipped {}: {}",
            short_id(skipped.subscription_id),
            skipped.reason
        ));
    }
    output::success(format!("Advanced {} due date(s).", outcome.advanced.len()));
    Ok(())
}

fn cmd_history(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let events = context.storage.events_for_account(context.account)?;
    if events.is_empty() {
        output::info("No events recorded.");
        return Ok(());
    }
    output::section(format!("History for account {}", context.account));
    for event in events {
        let detail = match event.kind {
            EventKind::Created => "created".to_string(),
            EventKind::DueDateAdvanced { from, to } => format!("due date {from} -> {to}"),
            EventKind::StatusChanged { from, to } => format!("status {from} -> {to}"),
        };
        output::info(format!(
            "  {}  {}  {}",
            event.created_at.format("%Y-%m-%d %H:%M"),
            short_id(event.subscription_id),
            detail
        ));
    }
    Ok(())
}

/// Accepts a full id, an id prefix as printed by `channels`, or a name.
fn resolve_channel(
    context: &ShellContext,
    reference: &str,
) -> Result<SubscriptionChannel, CommandError> {
    if let Ok(id) = Uuid::parse_str(reference) {
        return Ok(ChannelService::get(&context.storage, id)?);
    }
    if let Ok(channel) = ChannelService::find_by_name(&context.storage, reference) {
        return Ok(channel);
    }
    by_id_prefix(ChannelService::list(&context.storage)?, reference, "channel")
}

/// Resolves a full id or an id prefix among the current account's subscriptions.
fn resolve_subscription(
    context: &ShellContext,
    reference: &str,
) -> Result<SubscriptionRecord, CommandError> {
    if let Ok(id) = Uuid::parse_str(reference) {
        return Ok(SubscriptionService::get(&context.storage, id)?);
    }
    let records = SubscriptionService::list(&context.storage, context.account, None)?;
    by_id_prefix(records, reference, "subscription")
}

fn by_id_prefix<T: Identifiable>(
    items: Vec<T>,
    reference: &str,
    kind: &str,
) -> Result<T, CommandError> {
    let needle = reference.trim().to_ascii_lowercase();
    let mut matches: Vec<T> = items
        .into_iter()
        .filter(|item| !needle.is_empty() && item.id().simple().to_string().starts_with(&needle))
        .collect();
    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(CommandError::InvalidArguments(format!(
            "no {kind} matches `{reference}`"
        ))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{reference}` matches more than one {kind}"
        ))),
    }
}

fn channel_label(context: &ShellContext, channel_id: Uuid) -> String {
    ChannelService::get(&context.storage, channel_id)
        .map(|channel| channel.name().to_string())
        .unwrap_or_else(|_| short_id(channel_id))
}
