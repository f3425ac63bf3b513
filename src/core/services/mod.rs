pub mod billing_service;
pub mod channel_service;
pub mod report_service;
pub mod subscription_service;

pub use billing_service::{AdvanceOutcome, AdvancedDueDate, BillingService};
pub use channel_service::ChannelService;
pub use report_service::ReportService;
pub use subscription_service::SubscriptionService;

use crate::core::errors::SubtrackError;

pub type ServiceResult<T> = Result<T, SubtrackError>;
