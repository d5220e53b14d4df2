use async_trait::async_trait;
use game::{Announcement, Notifier};
use log::error;
use twilight_model::id::{marker::ChannelMarker, Id};

/// Posts announcements as regular channel messages through the Discord REST API.
pub struct Discord(twilight_http::Client);

impl Discord {
    pub fn new(token: String) -> Self {
        Self(twilight_http::Client::new(token))
    }
}

#[async_trait]
impl Notifier for Discord {
    async fn post(&self, channel: &str, announcement: Announcement) {
        let Ok(id) = channel.parse::<Id<ChannelMarker>>() else {
            error!("cannot post to malformed channel {channel}");
            return;
        };

        let content = announcement.to_string();
        let request = match self.0.create_message(id).content(&content) {
            Ok(request) => request,
            Err(err) => {
                error!("announcement for channel {channel} was rejected: {err}");
                return;
            }
        };

        if let Err(err) = request.await {
            error!("failed to post to channel {channel}: {err}");
        }
    }
}
