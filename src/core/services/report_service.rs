use crate::core::aggregator::{aggregate_monthly_totals, subscriptions_due_in_window};
use crate::core::clock::Clock;
use crate::domain::{AccountId, DueWindow, DueWindowReport, MonthlyTotals, ReportPolicy};
use crate::storage::{AccountSubscriptions, SubscriptionStore};

use super::ServiceResult;

pub struct ReportService;

impl ReportService {
    /// Twelve-month spend breakdown for `year`.
    pub fn monthly_report(
        store: &dyn SubscriptionStore,
        account: AccountId,
        year: i32,
        policy: ReportPolicy,
    ) -> ServiceResult<MonthlyTotals> {
        let loaded = Self::reportable(store, account, policy)?;
        let mut totals = aggregate_monthly_totals(&loaded.records, year);
        totals.skipped.extend(loaded.unreadable);
        tracing::info!(%account, year, total = totals.total, "monthly report built");
        Ok(totals)
    }

    pub fn due_in_window(
        store: &dyn SubscriptionStore,
        account: AccountId,
        window: DueWindow,
        policy: ReportPolicy,
    ) -> ServiceResult<DueWindowReport> {
        let loaded = Self::reportable(store, account, policy)?;
        let mut report = subscriptions_due_in_window(&loaded.records, window);
        report.skipped.extend(loaded.unreadable);
        Ok(report)
    }

    /// Subscriptions due between the first and last day of the current month.
    pub fn current_month(
        store: &dyn SubscriptionStore,
        account: AccountId,
        policy: ReportPolicy,
        clock: &dyn Clock,
    ) -> ServiceResult<DueWindowReport> {
        Self::due_in_window(
            store,
            account,
            DueWindow::month_containing(clock.today()),
            policy,
        )
    }

    /// Records the policy projects. Unreadable entries are always carried so
    /// the report can list them as skipped.
    fn reportable(
        store: &dyn SubscriptionStore,
        account: AccountId,
        policy: ReportPolicy,
    ) -> ServiceResult<AccountSubscriptions> {
        let mut loaded = store.load_account_subscriptions(account)?;
        loaded
            .records
            .retain(|record| policy.includes(record.status));
        Ok(loaded)
    }
}
