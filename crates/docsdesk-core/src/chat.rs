//! Chat panel state: the message list and the `Idle -> Sending -> Idle` cycle.

use crate::api::AskResponse;
use crate::error::ApiError;
use crate::state::{Message, RequestTicket, TicketCounter};

pub const GREETING: &str = "Hello! I'm here to help. Ask me anything!";
pub const NO_ANSWER_FALLBACK: &str = "Sorry, I couldn't process your request.";
pub const FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

/// A question accepted by [`ChatPanel::begin_send`] that still has to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAsk {
    pub ticket: RequestTicket,
    pub query: String,
}

#[derive(Debug)]
pub struct ChatPanel {
    messages: Vec<Message>,
    sending: Option<RequestTicket>,
    tickets: TicketCounter,
    revision: u64,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPanel {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            sending: None,
            tickets: TicketCounter::default(),
            revision: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_sending(&self) -> bool {
        self.sending.is_some()
    }

    /// Bumped on every append; views compare it to know when to follow the tail.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Newest message carrying a reference anchor
    pub fn latest_reference(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(Message::reference_anchor)
    }

    /// Accept `input` as a question. Appends the user message and enters
    /// `Sending`. Returns `None` (and changes nothing) for blank input or
    /// while a previous question is still in flight.
    pub fn begin_send(&mut self, input: &str) -> Option<PendingAsk> {
        if input.trim().is_empty() || self.is_sending() {
            return None;
        }

        let ticket = self.tickets.issue();
        self.push(Message::user(input));
        self.sending = Some(ticket);

        Some(PendingAsk {
            ticket,
            query: input.to_string(),
        })
    }

    /// Land the outcome of the request identified by `ticket`. Returns `false`
    /// when the ticket is stale and the result was dropped.
    pub fn finish_send(
        &mut self,
        ticket: RequestTicket,
        result: Result<AskResponse, ApiError>,
    ) -> bool {
        if self.sending != Some(ticket) {
            tracing::debug!(ticket = ticket.get(), "dropping stale answer");
            return false;
        }

        let message = match result {
            Ok(response) => answer_message(response),
            Err(err) => {
                tracing::error!(ticket = ticket.get(), error = %err, "get-answer failed");
                Message::assistant(FAILURE_MESSAGE)
            }
        };

        self.push(message);
        self.sending = None;
        true
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.revision += 1;
    }
}

/// Build the assistant reply for a successful `/get-answer` round trip.
pub fn answer_message(response: AskResponse) -> Message {
    let text = response
        .answer
        .filter(|answer| !answer.is_empty())
        .unwrap_or_else(|| NO_ANSWER_FALLBACK.to_string());

    Message::assistant_with_reference(text, response.top_anchor_id, response.score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Sender;

    fn hi_response() -> AskResponse {
        AskResponse {
            answer: Some("Hi".to_string()),
            top_anchor_id: Some("abc".to_string()),
            score: Some(0.9),
        }
    }

    #[test]
    fn test_starts_with_greeting() {
        let panel = ChatPanel::new();
        assert_eq!(panel.messages().len(), 1);
        assert_eq!(panel.messages()[0].text, GREETING);
        assert_eq!(panel.messages()[0].sender, Sender::Assistant);
        assert!(!panel.is_sending());
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut panel = ChatPanel::new();
        assert!(panel.begin_send("").is_none());
        assert!(panel.begin_send("   \n\t ").is_none());
        assert_eq!(panel.messages().len(), 1);
        assert!(!panel.is_sending());
        assert_eq!(panel.revision(), 0);
    }

    #[test]
    fn test_send_appends_user_message_immediately() {
        let mut panel = ChatPanel::new();
        let pending = panel.begin_send("  How do tickets work? ").unwrap();

        assert_eq!(pending.query, "  How do tickets work? ");
        assert_eq!(panel.messages().len(), 2);
        assert_eq!(panel.messages()[1].sender, Sender::User);
        assert!(panel.is_sending());
    }

    #[test]
    fn test_success_round_trip() {
        let mut panel = ChatPanel::new();
        let pending = panel.begin_send("hello").unwrap();

        assert!(panel.finish_send(pending.ticket, Ok(hi_response())));
        assert_eq!(panel.messages().len(), 3);
        assert!(!panel.is_sending());

        let reply = panel.messages().last().unwrap();
        assert_eq!(reply.sender, Sender::Assistant);
        assert_eq!(reply.text, "Hi");
        assert_eq!(reply.reference_anchor(), Some("abc"));
        assert_eq!(reply.display_score(), Some(0.9));
    }

    #[test]
    fn test_failure_round_trip() {
        let mut panel = ChatPanel::new();
        let pending = panel.begin_send("hello").unwrap();
        let err = ApiError::Status { status: 502, body: String::new() };

        assert!(panel.finish_send(pending.ticket, Err(err)));
        assert_eq!(panel.messages().len(), 3);

        let reply = panel.messages().last().unwrap();
        assert_eq!(reply.text, FAILURE_MESSAGE);
        assert!(reply.reference_anchor().is_none());
        assert!(reply.display_score().is_none());
        assert!(!panel.is_sending());
    }

    #[test]
    fn test_each_send_adds_two_messages() {
        let mut panel = ChatPanel::new();
        for i in 0..3 {
            let pending = panel.begin_send(&format!("question {i}")).unwrap();
            let result = if i % 2 == 0 {
                Ok(hi_response())
            } else {
                Err(ApiError::Task("cancelled".to_string()))
            };
            panel.finish_send(pending.ticket, result);
            assert_eq!(panel.messages().len(), 1 + 2 * (i + 1));
        }
    }

    #[test]
    fn test_second_send_while_sending_is_refused() {
        let mut panel = ChatPanel::new();
        let first = panel.begin_send("one").unwrap();
        assert!(panel.begin_send("two").is_none());
        assert_eq!(panel.messages().len(), 2);

        panel.finish_send(first.ticket, Ok(hi_response()));
        assert!(panel.begin_send("two").is_some());
    }

    #[test]
    fn test_stale_ticket_is_dropped() {
        let mut panel = ChatPanel::new();
        let first = panel.begin_send("one").unwrap();
        panel.finish_send(first.ticket, Ok(hi_response()));
        let _second = panel.begin_send("two").unwrap();

        assert!(!panel.finish_send(first.ticket, Ok(hi_response())));
        assert_eq!(panel.messages().len(), 4);
        assert!(panel.is_sending());
    }

    #[test]
    fn test_empty_answer_falls_back() {
        let msg = answer_message(AskResponse {
            answer: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(msg.text, NO_ANSWER_FALLBACK);

        let msg = answer_message(AskResponse::default());
        assert_eq!(msg.text, NO_ANSWER_FALLBACK);
    }

    #[test]
    fn test_zero_score_not_displayed() {
        let msg = answer_message(AskResponse {
            answer: Some("Hi".to_string()),
            top_anchor_id: Some("abc".to_string()),
            score: Some(0.0),
        });
        assert_eq!(msg.score, Some(0.0));
        assert!(msg.display_score().is_none());
    }

    #[test]
    fn test_latest_reference() {
        let mut panel = ChatPanel::new();
        assert!(panel.latest_reference().is_none());

        let pending = panel.begin_send("one").unwrap();
        panel.finish_send(pending.ticket, Ok(hi_response()));
        let pending = panel.begin_send("two").unwrap();
        panel.finish_send(pending.ticket, Ok(AskResponse::default()));

        assert_eq!(panel.latest_reference(), Some("abc"));
    }

    #[test]
    fn test_revision_tracks_appends() {
        let mut panel = ChatPanel::new();
        let pending = panel.begin_send("hello").unwrap();
        assert_eq!(panel.revision(), 1);
        panel.finish_send(pending.ticket, Ok(hi_response()));
        assert_eq!(panel.revision(), 2);
    }
}
