//! Message service that records effects instead of delivering them.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use vik_core::error::{Result, VikError};
use vik_core::ids::{ChannelId, InteractionId, MessageId};
use vik_core::message::{MessageService, Modal, OutboundMessage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEffect {
    Reply {
        interaction: InteractionId,
        id: MessageId,
        message: OutboundMessage,
    },
    Send {
        channel: ChannelId,
        id: MessageId,
        message: OutboundMessage,
    },
    Edit {
        id: MessageId,
        update: OutboundMessage,
    },
    Delete {
        id: MessageId,
    },
    Modal {
        interaction: InteractionId,
        modal: Modal,
    },
    Suggest {
        interaction: InteractionId,
        choices: Vec<String>,
    },
}

/// Dry-run message sink. Hands out increasing message ids and keeps every
/// effect in order. Replies, edits and deletes can be made to fail.
pub struct RecordingMessageService {
    next_id: AtomicU64,
    effects: Mutex<Vec<MessageEffect>>,
    fail_replies: AtomicBool,
    fail_edits: AtomicBool,
    fail_deletes: AtomicBool,
}

impl Default for RecordingMessageService {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            effects: Mutex::new(Vec::new()),
            fail_replies: AtomicBool::new(false),
            fail_edits: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }
}

impl RecordingMessageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_replies(&self, fail: bool) {
        self.fail_replies.store(fail, Ordering::SeqCst);
    }

    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn effects(&self) -> Vec<MessageEffect> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn deleted(&self) -> Vec<MessageId> {
        self.lock()
            .iter()
            .filter_map(|effect| match effect {
                MessageEffect::Delete { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn edits_of(&self, message: MessageId) -> Vec<OutboundMessage> {
        self.lock()
            .iter()
            .filter_map(|effect| match effect {
                MessageEffect::Edit { id, update } if *id == message => Some(update.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent interaction reply with its message id.
    pub fn last_reply(&self) -> Option<(MessageId, OutboundMessage)> {
        self.lock().iter().rev().find_map(|effect| match effect {
            MessageEffect::Reply { id, message, .. } => Some((*id, message.clone())),
            _ => None,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MessageEffect>> {
        self.effects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocate(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl MessageService for RecordingMessageService {
    async fn reply(
        &self,
        interaction: InteractionId,
        message: OutboundMessage,
    ) -> Result<MessageId> {
        if self.fail_replies.load(Ordering::SeqCst) {
            return Err(VikError::external(format!("reply to {} refused", interaction)));
        }
        let id = self.allocate();
        self.lock().push(MessageEffect::Reply {
            interaction,
            id,
            message,
        });
        Ok(id)
    }

    async fn send(&self, channel: ChannelId, message: OutboundMessage) -> Result<MessageId> {
        let id = self.allocate();
        self.lock().push(MessageEffect::Send {
            channel,
            id,
            message,
        });
        Ok(id)
    }

    async fn edit(&self, message: MessageId, update: OutboundMessage) -> Result<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(VikError::external(format!("edit of {} refused", message)));
        }
        self.lock().push(MessageEffect::Edit {
            id: message,
            update,
        });
        Ok(())
    }

    async fn delete(&self, message: MessageId) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(VikError::external(format!("delete of {} refused", message)));
        }
        self.lock().push(MessageEffect::Delete { id: message });
        Ok(())
    }

    async fn show_modal(&self, interaction: InteractionId, modal: Modal) -> Result<()> {
        self.lock().push(MessageEffect::Modal { interaction, modal });
        Ok(())
    }

    async fn suggest(&self, interaction: InteractionId, choices: Vec<String>) -> Result<()> {
        self.lock().push(MessageEffect::Suggest {
            interaction,
            choices,
        });
        Ok(())
    }
}
