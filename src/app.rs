use ratatui::layout::Rect;
use tokio::task::{JoinError, JoinHandle};
use docsdesk_core::{
    ApiError, AskResponse, BackendClient, ChatPanel, Config, ContextPanel, IngestResponse,
    RequestTicket,
};
use crate::input::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Ask,
    Context,
}

impl Tab {
    pub fn all() -> [Tab; 2] {
        [Tab::Ask, Tab::Context]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Ask => "Ask Questions",
            Tab::Context => "Provide Context",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Ask => 0,
            Tab::Context => 1,
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::Ask => Tab::Context,
            Tab::Context => Tab::Ask,
        }
    }
}

/// A spawned backend call and the ticket its panel is waiting on
struct InFlight<T> {
    ticket: RequestTicket,
    handle: JoinHandle<Result<T, ApiError>>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub tab: Tab,
    pub config: Config,

    // Ask tab
    pub chat: ChatPanel,
    pub input: TextInput,

    // Provide Context tab
    pub context: ContextPanel,

    client: BackendClient,
    ask_task: Option<InFlight<AskResponse>>,
    ingest_task: Option<InFlight<IngestResponse>>,

    // Animation state, 0-2
    pub animation_frame: u8,

    // Chat scroll state (updated during render)
    pub chat_scroll: u16,
    pub follow_tail: bool,
    pub chat_height: u16,
    pub chat_total_lines: u16,
    seen_revision: u64,

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = BackendClient::from_config(&config)?;
        tracing::info!(backend = %client.base_url(), "backend client ready");

        Ok(Self {
            should_quit: false,
            tab: Tab::default(),
            config,

            chat: ChatPanel::new(),
            input: TextInput::default(),

            context: ContextPanel::new(),

            client,
            ask_task: None,
            ingest_task: None,

            animation_frame: 0,

            chat_scroll: 0,
            follow_tail: true,
            chat_height: 0,
            chat_total_lines: 0,
            seen_revision: 0,

            chat_area: None,
        })
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    /// Send the current input as a question. Returns whether a request was started.
    pub fn submit_question(&mut self) -> bool {
        let Some(pending) = self.chat.begin_send(self.input.value()) else {
            return false;
        };
        self.input.clear();

        tracing::info!(ticket = pending.ticket.get(), "sending question");
        let client = self.client.clone();
        let query = pending.query;
        self.ask_task = Some(InFlight {
            ticket: pending.ticket,
            handle: tokio::spawn(async move { client.ask(&query).await }),
        });
        true
    }

    /// Trigger the ingestion endpoint. Returns whether a request was started.
    pub fn provide_context(&mut self) -> bool {
        let Some(ticket) = self.context.begin() else {
            return false;
        };

        tracing::info!(ticket = ticket.get(), "requesting ingestion");
        let client = self.client.clone();
        self.ingest_task = Some(InFlight {
            ticket,
            handle: tokio::spawn(async move { client.ingest().await }),
        });
        true
    }

    /// Land results of any finished requests without blocking on running ones
    pub async fn collect_finished(&mut self) {
        if self.ask_task.as_ref().is_some_and(|t| t.handle.is_finished()) {
            if let Some(task) = self.ask_task.take() {
                let result = flatten(task.handle.await);
                self.chat.finish_send(task.ticket, result);
            }
        }

        if self.ingest_task.as_ref().is_some_and(|t| t.handle.is_finished()) {
            if let Some(task) = self.ingest_task.take() {
                let result = flatten(task.handle.await);
                self.context.finish(task.ticket, result);
            }
        }
    }

    /// Abort outstanding requests so nothing lands after the UI is gone
    pub fn shutdown(&mut self) {
        if let Some(task) = self.ask_task.take() {
            tracing::debug!(ticket = task.ticket.get(), "aborting question");
            task.handle.abort();
        }
        if let Some(task) = self.ingest_task.take() {
            tracing::debug!(ticket = task.ticket.get(), "aborting ingestion");
            task.handle.abort();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.chat.is_sending() || self.context.is_in_flight()
    }

    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn reference_url(&self, anchor: &str) -> String {
        self.config.reference_url(anchor)
    }

    pub fn latest_reference_url(&self) -> Option<String> {
        self.chat.latest_reference().map(|anchor| self.reference_url(anchor))
    }

    /// Called by the renderer once it knows how tall the history is.
    /// Follows the newest message whenever the list has changed.
    pub fn sync_chat_scroll(&mut self, total_lines: u16, visible_height: u16) {
        self.chat_total_lines = total_lines;
        self.chat_height = visible_height;

        if self.chat.revision() != self.seen_revision {
            self.seen_revision = self.chat.revision();
            self.follow_tail = true;
        }

        let max_scroll = self.max_chat_scroll();
        self.chat_scroll = if self.follow_tail {
            max_scroll
        } else {
            self.chat_scroll.min(max_scroll)
        };
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max_scroll = self.max_chat_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
        if self.chat_scroll >= max_scroll {
            self.follow_tail = true;
        }
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }

    fn max_chat_scroll(&self) -> u16 {
        self.chat_total_lines.saturating_sub(self.chat_height)
    }

    #[cfg(test)]
    pub async fn wait_for_requests(&mut self) {
        if let Some(task) = self.ask_task.take() {
            let result = flatten(task.handle.await);
            self.chat.finish_send(task.ticket, result);
        }
        if let Some(task) = self.ingest_task.take() {
            let result = flatten(task.handle.await);
            self.context.finish(task.ticket, result);
        }
    }
}

fn flatten<T>(joined: Result<Result<T, ApiError>, JoinError>) -> Result<T, ApiError> {
    joined.unwrap_or_else(|err| Err(ApiError::Task(err.to_string())))
}
