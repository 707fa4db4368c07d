pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod state;
pub mod view;

// Re-export main types for convenience
pub use client::{ChatClient, Reply};
pub use config::{Config, DEFAULT_ENDPOINT};
pub use error::{ExchangeError, Rejected};
pub use input::InputBuffer;
pub use state::{Message, Role};
pub use view::{ChatView, Outbound, Phase, Resolution, Ticket, FALLBACK_REPLY};
