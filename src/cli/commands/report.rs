use chrono::Datelike;

use crate::cli::core::{parse_date, short_id, CommandError, CommandResult, ParsedArgs, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::due_date::compute_next_due_date;
use crate::core::services::ReportService;
use crate::domain::{DueType, DueWindow, DueWindowReport, SkippedRecord};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "report",
            "Show the twelve-month spend breakdown",
            "report [year]",
            cmd_report,
        ),
        CommandEntry::new(
            "due",
            "Show subscriptions due this month or in a date range",
            "due [<from> <to>]",
            cmd_due,
        ),
        CommandEntry::new(
            "next-due",
            "Compute the next due date for a schedule",
            "next-due <daily|weekly|monthly|yearly> [--day <1-31>] [--ref <date>] [--now <date>]",
            cmd_next_due,
        ),
    ]
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let year = match args {
        [] => context
            .config
            .report_year
            .unwrap_or_else(|| context.today().year()),
        [raw] => raw
            .parse::<i32>()
            .map_err(|_| CommandError::InvalidArguments(format!("invalid year `{raw}`")))?,
        _ => return Err(CommandError::InvalidArguments("usage: report [year]".into())),
    };

    let totals = ReportService::monthly_report(
        &context.storage,
        context.account,
        year,
        context.config.report_policy(),
    )?;
    output::section(format!("Monthly spend for {year}"));
    let rows: Vec<Vec<String>> = totals
        .months
        .iter()
        .map(|datum| vec![datum.month.clone(), context.format_amount(datum.cost)])
        .collect();
    output::table(&["MONTH", "COST"], &rows);
    output::info(format!("Total: {}", context.format_amount(totals.total)));
    report_skipped(&totals.skipped);
    Ok(())
}

fn cmd_due(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let policy = context.config.report_policy();
    let report = match args {
        [] => ReportService::current_month(
            &context.storage,
            context.account,
            policy,
            context.clock.as_ref(),
        )?,
        [from, to] => {
            let window = DueWindow::new(parse_date(from)?, parse_date(to)?)?;
            ReportService::due_in_window(&context.storage, context.account, window, policy)?
        }
        _ => return Err(CommandError::InvalidArguments("usage: due [<from> <to>]".into())),
    };
    print_due(context, &report);
    Ok(())
}

fn print_due(context: &ShellContext, report: &DueWindowReport) {
    output::section(format!("Due {}", report.window));
    if report.subscriptions.is_empty() {
        output::info("Nothing due in this window.");
    } else {
        let rows: Vec<Vec<String>> = report
            .subscriptions
            .iter()
            .map(|item| {
                vec![
                    short_id(item.subscription_id),
                    item.next_due_date.to_string(),
                    format!("{} {}", item.month, item.year),
                    context.format_amount(item.cost),
                    item.status.to_string(),
                ]
            })
            .collect();
        output::table(&["ID", "DUE", "MONTH", "COST", "STATUS"], &rows);
    }
    output::info(format!("Total due: {}", context.format_amount(report.total_cost)));
    report_skipped(&report.skipped);
}

fn cmd_next_due(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["day", "ref", "now"])?;
    let &[cadence] = parsed.positional.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: next-due <daily|weekly|monthly|yearly> [--day <1-31>] [--ref <date>] [--now <date>]"
                .into(),
        ));
    };
    let due_type: DueType = cadence.parse()?;
    let due_day = parsed
        .option("day")
        .map(|raw| {
            raw.parse::<u32>().map_err(|_| {
                CommandError::InvalidArguments(format!("invalid day of month `{raw}`"))
            })
        })
        .transpose()?;
    let now = parsed.date("now")?.unwrap_or_else(|| context.today());
    let next = compute_next_due_date(due_type, due_day, parsed.date("ref")?, now)?;
    output::info(format!("Next {due_type} due date after {now}: {next}"));
    Ok(())
}

fn report_skipped(skipped: &[SkippedRecord]) {
    for record in skipped {
        output::warning(format!(
            "Skipped {}: {}",
            short_id(record.subscription_id),
            record.reason
        ));
    }
}
