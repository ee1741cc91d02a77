pub mod api;
pub mod chat;
pub mod config;
pub mod context;
pub mod error;
pub mod state;

// Re-export main types for convenience
pub use api::{AskRequest, AskResponse, BackendClient, IngestResponse};
pub use chat::{ChatPanel, PendingAsk};
pub use config::{Config, ConfigOverrides};
pub use context::{ContextOutcome, ContextPanel};
pub use error::ApiError;
pub use state::{Message, RequestTicket, Sender};
