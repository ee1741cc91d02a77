//! UI-agnostic message types
//!
//! These don't depend on any terminal or widget library, so the same model
//! can back the TUI and the one-shot CLI commands.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
}

/// A chat message. Immutable once it is in a panel's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub top_anchor_id: Option<String>,
    pub score: Option<f64>,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text.into(), None, None)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text.into(), None, None)
    }

    pub fn assistant_with_reference(
        text: impl Into<String>,
        top_anchor_id: Option<String>,
        score: Option<f64>,
    ) -> Self {
        Self::new(Sender::Assistant, text.into(), top_anchor_id, score)
    }

    fn new(sender: Sender, text: String, top_anchor_id: Option<String>, score: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            top_anchor_id,
            score,
            sender,
            timestamp: Local::now(),
        }
    }

    /// Anchor to link to, if any. An empty anchor counts as none.
    pub fn reference_anchor(&self) -> Option<&str> {
        self.top_anchor_id.as_deref().filter(|anchor| !anchor.is_empty())
    }

    /// Score to show next to the message. A score of exactly zero is
    /// indistinguishable from "no score" and is hidden.
    pub fn display_score(&self) -> Option<f64> {
        self.score.filter(|score| *score != 0.0 && !score.is_nan())
    }

    /// `HH:MM` in local time
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Identifies one request started by a panel. A completion only lands if
/// its ticket is still the one the panel is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Per-panel generation counter handing out tickets
#[derive(Debug, Default)]
pub(crate) struct TicketCounter {
    next: u64,
}

impl TicketCounter {
    pub(crate) fn issue(&mut self) -> RequestTicket {
        self.next += 1;
        RequestTicket(self.next)
    }
}
