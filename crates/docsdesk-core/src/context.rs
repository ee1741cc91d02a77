//! Context panel state: one ingestion request at a time and its last outcome.

use crate::api::IngestResponse;
use crate::error::ApiError;
use crate::state::{RequestTicket, TicketCounter};

pub const SUCCESS_FALLBACK: &str = "Context provided successfully!";
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOutcome {
    Success(String),
    Failure(String),
}

impl ContextOutcome {
    pub fn from_result(result: Result<IngestResponse, ApiError>) -> Self {
        match result {
            Ok(response) => Self::Success(
                response
                    .message
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| SUCCESS_FALLBACK.to_string()),
            ),
            Err(err) => {
                let text = err.to_string();
                if text.is_empty() {
                    Self::Failure(UNKNOWN_ERROR.to_string())
                } else {
                    Self::Failure(text)
                }
            }
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Failure(text) => text,
        }
    }
}

#[derive(Debug, Default)]
pub struct ContextPanel {
    in_flight: Option<RequestTicket>,
    outcome: Option<ContextOutcome>,
    tickets: TicketCounter,
}

impl ContextPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn outcome(&self) -> Option<&ContextOutcome> {
        self.outcome.as_ref()
    }

    pub fn success_text(&self) -> Option<&str> {
        match &self.outcome {
            Some(ContextOutcome::Success(text)) => Some(text),
            _ => None,
        }
    }

    pub fn error_text(&self) -> Option<&str> {
        match &self.outcome {
            Some(ContextOutcome::Failure(text)) => Some(text),
            _ => None,
        }
    }

    /// Start an ingestion request. Clears the previous outcome. Returns
    /// `None` while a request is already in flight.
    pub fn begin(&mut self) -> Option<RequestTicket> {
        if self.is_in_flight() {
            return None;
        }

        let ticket = self.tickets.issue();
        self.outcome = None;
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Land the outcome for `ticket`. Stale tickets are dropped and return `false`.
    pub fn finish(
        &mut self,
        ticket: RequestTicket,
        result: Result<IngestResponse, ApiError>,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            tracing::debug!(ticket = ticket.get(), "dropping stale ingestion result");
            return false;
        }

        if let Err(err) = &result {
            tracing::error!(ticket = ticket.get(), error = %err, "ingest-data failed");
        }

        self.outcome = Some(ContextOutcome::from_result(result));
        self.in_flight = None;
        true
    }
}
