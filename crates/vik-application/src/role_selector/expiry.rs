use crate::cache::ExpireHandler;
use async_trait::async_trait;
use std::sync::Arc;
use vik_core::error::Result;
use vik_core::ids::MessageId;
use vik_core::message::MessageService;
use vik_core::session::Session;

/// Deletes the editor message of a session leaving the cache.
pub struct SessionExpiry {
    messages: Arc<dyn MessageService>,
}

impl SessionExpiry {
    pub fn new(messages: Arc<dyn MessageService>) -> Self {
        Self { messages }
    }
}

#[async_trait]
impl ExpireHandler<MessageId, Session> for SessionExpiry {
    async fn expire(&self, message: MessageId, session: Session) -> Result<()> {
        tracing::debug!(
            message_id = %message,
            kind = session.kind(),
            group = %session.group_name(),
            "editor session expired"
        );
        self.messages.delete(message).await
    }
}
