pub mod account;
pub mod channel;
pub mod common;
pub mod event;
pub mod filter;
pub mod report;
pub mod subscription;

pub use account::AccountId;
pub use channel::{ChannelStatus, SubscriptionChannel};
pub use common::{Billable, Displayable, Identifiable, NamedEntity};
pub use event::{EventKind, SubscriptionEvent};
pub use filter::{SortField, SortOrder, SubscriptionFilter};
pub use report::{
    DueLineItem, DueWindow, DueWindowReport, MonthOfYear, MonthlyDatum, MonthlyTotals,
    ReportPolicy, SkippedRecord,
};
pub use subscription::{DueType, SubscriptionDraft, SubscriptionRecord, SubscriptionStatus};
