//! Subscription channels: the providers a subscription is paid to.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A provider such as a streaming service or a software vendor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionChannel {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub description: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub status: ChannelStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionChannel {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            url: url.into(),
            description: description.into(),
            image_url: image_url.into(),
            channel_type: None,
            status: ChannelStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_type(mut self, channel_type: impl Into<String>) -> Self {
        self.channel_type = Some(channel_type.into());
        self
    }
}

impl Identifiable for SubscriptionChannel {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for SubscriptionChannel {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for SubscriptionChannel {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.status)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChannelStatus::Active => "active",
            ChannelStatus::Inactive => "inactive",
        };
        f.write_str(label)
    }
}
