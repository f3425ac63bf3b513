use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::due_date::advance_after;
use crate::domain::{
    AccountId, EventKind, SkippedRecord, SubscriptionEvent, SubscriptionFilter, SubscriptionStatus,
};
use crate::storage::{RecordChange, SubscriptionStore};

use super::ServiceResult;

/// A due date moved forward by [`BillingService::advance_due_dates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedDueDate {
    pub subscription_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceOutcome {
    pub advanced: Vec<AdvancedDueDate>,
    pub skipped: Vec<SkippedRecord>,
}

pub struct BillingService;

impl BillingService {
    /// Rolls every active subscription whose due date has passed to its next
    /// due date strictly after today.
    ///
    /// Records whose schedule cannot be evaluated are reported and left untouched.
    /// Each record moves together with its audit event; a storage failure stops
    /// the run with earlier records already advanced.
    pub fn advance_due_dates(
        store: &dyn SubscriptionStore,
        account: AccountId,
        clock: &dyn Clock,
    ) -> ServiceResult<AdvanceOutcome> {
        let today = clock.today();
        let filter = SubscriptionFilter {
            next_due_date_to: Some(today),
            ..SubscriptionFilter::with_status(SubscriptionStatus::Active)
        };
        let loaded = store.load_account_subscriptions(account)?;
        let mut due = loaded.records;
        filter.apply(&mut due);

        let mut outcome = AdvanceOutcome {
            skipped: loaded.unreadable,
            ..AdvanceOutcome::default()
        };
        for record in due {
            if record.end_date.is_some_and(|end| end < today) {
                continue;
            }
            let next = match advance_after(&record, today) {
                Ok(next) => next,
                Err(err) => {
                    tracing::warn!(subscription = %record.id, error = %err, "cannot advance due date");
                    outcome.skipped.push(SkippedRecord {
                        subscription_id: record.id,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            store.apply_with_event(
                RecordChange::NextDueDate(record.id, next),
                &SubscriptionEvent::new(
                    record.id,
                    account,
                    EventKind::DueDateAdvanced {
                        from: record.next_due_date,
                        to: next,
                    },
                ),
            )?;
            outcome.advanced.push(AdvancedDueDate {
                subscription_id: record.id,
                from: record.next_due_date,
                to: next,
            });
        }

        tracing::info!(
            %account,
            advanced = outcome.advanced.len(),
            skipped = outcome.skipped.len(),
            "advanced due dates"
        );
        Ok(outcome)
    }
}
