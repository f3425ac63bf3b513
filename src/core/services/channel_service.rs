use uuid::Uuid;

use crate::core::errors::SubtrackError;
use crate::domain::SubscriptionChannel;
use crate::storage::SubscriptionStore;

use super::ServiceResult;

pub struct ChannelService;

impl ChannelService {
    pub fn add(store: &dyn SubscriptionStore, channel: SubscriptionChannel) -> ServiceResult<SubscriptionChannel> {
        Self::require("name", &channel.name)?;
        Self::require("url", &channel.url)?;
        Self::require("description", &channel.description)?;
        Self::require("image_url", &channel.image_url)?;
        if store.channel_by_name(&channel.name)?.is_some() {
            return Err(SubtrackError::Conflict(format!(
                "Channel `{}` already exists",
                channel.name.trim()
            )));
        }
        store.insert_channel(&channel)?;
        tracing::info!(channel = %channel.id, name = %channel.name, "channel added");
        Ok(channel)
    }

    pub fn get(store: &dyn SubscriptionStore, id: Uuid) -> ServiceResult<SubscriptionChannel> {
        store
            .channel(id)?
            .ok_or_else(|| SubtrackError::ChannelNotFound(id.to_string()))
    }

    pub fn find_by_name(store: &dyn SubscriptionStore, name: &str) -> ServiceResult<SubscriptionChannel> {
        store
            .channel_by_name(name)?
            .ok_or_else(|| SubtrackError::ChannelNotFound(name.trim().to_string()))
    }

    pub fn list(store: &dyn SubscriptionStore) -> ServiceResult<Vec<SubscriptionChannel>> {
        store.list_channels()
    }

    fn require(field: &str, value: &str) -> ServiceResult<()> {
        if value.trim().is_empty() {
            Err(SubtrackError::InvalidInput(format!("{field} is required")))
        } else {
            Ok(())
        }
    }
}
