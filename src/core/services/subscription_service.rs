use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::due_date::{compute_next_due_date, validate_day_of_month};
use crate::core::errors::SubtrackError;
use crate::domain::{
    AccountId, EventKind, SubscriptionDraft, SubscriptionEvent, SubscriptionFilter,
    SubscriptionRecord, SubscriptionStatus,
};
use crate::storage::{RecordChange, SubscriptionStore};

use super::ServiceResult;

pub struct SubscriptionService;

impl SubscriptionService {
    /// Validates `draft`, fills in the first due date when absent, and persists it.
    ///
    /// A second subscription to the same channel for `account` is a `Conflict`.
    pub fn create(
        store: &dyn SubscriptionStore,
        account: AccountId,
        draft: SubscriptionDraft,
        clock: &dyn Clock,
    ) -> ServiceResult<SubscriptionRecord> {
        if !draft.monthly_bill.is_finite() || draft.monthly_bill <= 0.0 {
            return Err(SubtrackError::InvalidInput(
                "monthly_bill must be a positive amount".into(),
            ));
        }
        let due_day = validate_day_of_month(draft.due_type, draft.due_day_of_month)?;
        if store.channel(draft.channel_id)?.is_none() {
            return Err(SubtrackError::ChannelNotFound(draft.channel_id.to_string()));
        }

        let today = clock.today();
        let start_date = draft.start_date.unwrap_or(today);
        if let Some(end) = draft.end_date {
            if end < start_date {
                return Err(SubtrackError::InvalidInput(
                    "end_date cannot be before start_date".into(),
                ));
            }
        }

        let next_due_date = match draft.next_due_date {
            Some(date) => date,
            None => first_due_date(&draft, due_day, start_date, today)?,
        };

        let mut record = SubscriptionRecord::new(
            account,
            draft.channel_id,
            start_date,
            draft.due_type,
            due_day.or(draft.due_day_of_month),
            next_due_date,
            draft.monthly_bill,
        )
        .with_status(draft.status);
        record.end_date = draft.end_date;
        record.reminder_date = draft.reminder_date;

        // The store rejects a second record for the same channel and account.
        store.apply_with_event(
            RecordChange::Insert(record.clone()),
            &SubscriptionEvent::new(record.id, account, EventKind::Created),
        )?;
        tracing::info!(
            subscription = %record.id,
            %account,
            due_type = %record.due_type,
            next_due = %record.next_due_date,
            "subscription created"
        );
        Ok(record)
    }

    pub fn get(store: &dyn SubscriptionStore, id: Uuid) -> ServiceResult<SubscriptionRecord> {
        store
            .subscription(id)?
            .ok_or(SubtrackError::SubscriptionNotFound(id))
    }

    pub fn list(
        store: &dyn SubscriptionStore,
        account: AccountId,
        filter: Option<&SubscriptionFilter>,
    ) -> ServiceResult<Vec<SubscriptionRecord>> {
        if let Some(filter) = filter {
            filter.validate()?;
        }
        store.fetch_subscriptions_for_account(account, filter)
    }

    /// Changes the status of a subscription owned by `account`.
    pub fn set_status(
        store: &dyn SubscriptionStore,
        account: AccountId,
        id: Uuid,
        status: SubscriptionStatus,
    ) -> ServiceResult<SubscriptionRecord> {
        let mut record = Self::get(store, id)?;
        if record.account_id != account {
            return Err(SubtrackError::SubscriptionNotFound(id));
        }
        if record.status == status {
            return Ok(record);
        }
        let previous = record.status;
        store.apply_with_event(
            RecordChange::Status(id, status),
            &SubscriptionEvent::new(
                id,
                account,
                EventKind::StatusChanged {
                    from: previous,
                    to: status,
                },
            ),
        )?;
        tracing::info!(subscription = %id, from = %previous, to = %status, "status changed");
        record.status = status;
        Ok(record)
    }
}

/// First billing date on or after the start date and strictly after today.
///
/// Weekly schedules are anchored on the start date and yearly schedules bill
/// in the start month.
fn first_due_date(
    draft: &SubscriptionDraft,
    due_day: Option<u32>,
    start_date: NaiveDate,
    today: NaiveDate,
) -> ServiceResult<NaiveDate> {
    let evaluated_at = start_date.pred_opt().map_or(today, |eve| eve.max(today));
    Ok(compute_next_due_date(
        draft.due_type,
        due_day,
        Some(start_date),
        evaluated_at,
    )?)
}
