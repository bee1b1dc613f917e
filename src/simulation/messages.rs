//! Player-facing news messages raised by the station simulation

use super::types::{CargoId, CompanyId, StationId};

/// Kind of message posted to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    CargoNowAccepted,
    CargoNoLongerAccepted,
}

/// A posted message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageType,
    pub company: CompanyId,
    pub station: StationId,
    pub cargo: CargoId,
}

/// Receives messages; posting never fails
pub trait MessageSink {
    fn post(&mut self, kind: MessageType, company: CompanyId, station: StationId, cargo: CargoId);
}

/// Queue of messages waiting to be shown
#[derive(Debug, Clone, Default)]
pub struct MessageManager {
    messages: Vec<Message>,
}

impl MessageManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Take every queued message, oldest first
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
}

impl MessageSink for MessageManager {
    fn post(&mut self, kind: MessageType, company: CompanyId, station: StationId, cargo: CargoId) {
        self.messages.push(Message {
            kind,
            company,
            station,
            cargo,
        });
    }
}
