use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::debug;
use trendspotter_core::{
    ChatClient, ChatView, ExchangeError, Outbound, Reply, Resolution, Ticket,
};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub view: ChatView,
    pub client: ChatClient,

    // Chat scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Chat panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(client: ChatClient, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            view: ChatView::new(),
            client,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            animation_frame: 0,
            events,
        }
    }

    /// Submit the pending input and start the exchange for it.
    pub fn send_input(&mut self) {
        match self.view.submit() {
            Ok(outbound) => {
                self.animation_frame = 0;
                // Scroll to bottom so "Thinking..." is visible
                self.scroll_to_bottom();
                self.dispatch(outbound);
            }
            Err(reason) => debug!(%reason, "submission ignored"),
        }
    }

    /// Run the exchange on its own task; the result comes back as [`AppEvent::Reply`].
    fn dispatch(&self, outbound: Outbound) {
        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.send(&outbound.messages).await;
            let _ = events.send(AppEvent::Reply {
                ticket: outbound.ticket,
                result,
            });
        });
    }

    pub fn apply_reply(&mut self, ticket: Ticket, result: Result<Reply, ExchangeError>) {
        if self.view.resolve(ticket, result) != Resolution::Stale {
            self.scroll_to_bottom();
        }
    }

    /// Throw the conversation away and start over.
    pub fn new_chat(&mut self) {
        self.view.reset();
        self.chat_scroll = 0;
        self.animation_frame = 0;
        self.input_mode = InputMode::Editing;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.view.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.total_chat_lines().saturating_sub(self.visible_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_to_bottom(&mut self) {
        let total_lines = self.total_chat_lines();
        let visible_height = self.visible_height();

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Estimate of rendered chat lines, matching the layout in `ui`.
    fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.view.messages() {
            total_lines = total_lines.saturating_add(1); // Role line
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 {
                    1
                } else {
                    char_count.div_ceil(wrap_width)
                };
                total_lines = total_lines.saturating_add(u16::try_from(wrapped).unwrap_or(u16::MAX));
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.view.is_sending() {
            total_lines = total_lines.saturating_add(2); // Role line + "Thinking..."
        }

        total_lines
    }
}
