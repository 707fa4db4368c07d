//! Conversation state machine behind the chat view
//!
//! The view cycles between [`Phase::Idle`] and [`Phase::Sending`]. A
//! successful [`ChatView::submit`] hands the caller an [`Outbound`] to send;
//! whatever comes back is fed to [`ChatView::resolve`] with the same
//! [`Ticket`]. Tickets from before a [`ChatView::reset`] no longer match and
//! their replies are dropped.

use tracing::{debug, warn};

use crate::client::Reply;
use crate::error::{ExchangeError, Rejected};
use crate::input::InputBuffer;
use crate::state::Message;

/// Shown in place of a reply whenever the exchange fails, whatever the cause.
pub const FALLBACK_REPLY: &str = "Oops! Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Sending,
}

/// Identifies one outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    seq: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A request the caller must issue exactly once.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub ticket: Ticket,
    /// The conversation as it stood right after the user message was appended.
    pub messages: Vec<Message>,
}

/// What [`ChatView::resolve`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Replied,
    Failed,
    /// The ticket belongs to a request that no longer matters.
    Stale,
}

#[derive(Debug, Default)]
pub struct ChatView {
    messages: Vec<Message>,
    input: InputBuffer,
    generation: u64,
    next_seq: u64,
    in_flight: Option<Ticket>,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight.is_some() {
            Phase::Sending
        } else {
            Phase::Idle
        }
    }

    pub fn is_sending(&self) -> bool {
        self.phase() == Phase::Sending
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    /// Submit the pending input.
    ///
    /// Blank input and submissions while a request is in flight are refused
    /// and leave everything untouched, including the input buffer.
    pub fn submit(&mut self) -> Result<Outbound, Rejected> {
        if self.input.text().trim().is_empty() {
            return Err(Rejected::EmptyInput);
        }
        if self.is_sending() {
            return Err(Rejected::AlreadySending);
        }

        let text = self.input.take();
        self.messages.push(Message::user(text));

        let ticket = Ticket {
            generation: self.generation,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.in_flight = Some(ticket);
        debug!(generation = ticket.generation, seq = ticket.seq, "idle -> sending");

        Ok(Outbound {
            ticket,
            messages: self.messages.clone(),
        })
    }

    /// Apply the outcome of the request identified by `ticket`.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<Reply, ExchangeError>) -> Resolution {
        if self.in_flight != Some(ticket) {
            warn!(
                generation = ticket.generation,
                seq = ticket.seq,
                current_generation = self.generation,
                "discarding reply for a stale request"
            );
            return Resolution::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(reply) => {
                self.messages.push(Message::new(reply.role, reply.content));
                debug!("sending -> idle (reply)");
                Resolution::Replied
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                self.messages.push(Message::assistant(FALLBACK_REPLY));
                debug!("sending -> idle (failure)");
                Resolution::Failed
            }
        }
    }

    /// Start a new chat. Any request still in flight keeps running but its
    /// reply will be discarded.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.input.clear();
        if self.in_flight.take().is_some() {
            debug!(generation = self.generation, "reset while sending");
        }
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Role;

    fn view_with_input(text: &str) -> ChatView {
        let mut view = ChatView::new();
        view.input_mut().set(text);
        view
    }

    fn reply(content: &str) -> Result<Reply, ExchangeError> {
        Ok(Reply {
            role: Role::Assistant,
            content: content.to_string(),
        })
    }

    fn malformed_reply() -> Result<Reply, ExchangeError> {
        Err(ExchangeError::Decode(
            serde_json::from_str::<Reply>("not json").unwrap_err(),
        ))
    }

    #[test]
    fn test_submit_appends_user_message_and_sends() {
        let mut view = view_with_input("hello");

        let outbound = view.submit().unwrap();

        assert_eq!(view.phase(), Phase::Sending);
        assert!(view.input().is_empty());
        assert_eq!(view.messages().len(), 1);
        assert_eq!(view.messages()[0].role, Role::User);
        assert_eq!(view.messages()[0].content, "hello");
        assert_eq!(outbound.messages, view.messages());
    }

    #[test]
    fn test_successful_reply_returns_to_idle() {
        let mut view = view_with_input("hello");
        let outbound = view.submit().unwrap();

        let resolution = view.resolve(outbound.ticket, reply("hi there"));

        assert_eq!(resolution, Resolution::Replied);
        assert_eq!(view.phase(), Phase::Idle);
        let contents: Vec<_> = view
            .messages()
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            contents,
            vec![(Role::User, "hello"), (Role::Assistant, "hi there")]
        );
    }

    #[test]
    fn test_failure_appends_fallback() {
        let mut view = view_with_input("hello");
        let outbound = view.submit().unwrap();

        let resolution = view.resolve(outbound.ticket, malformed_reply());

        assert_eq!(resolution, Resolution::Failed);
        assert_eq!(view.phase(), Phase::Idle);
        let last = view.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, FALLBACK_REPLY);
        assert_eq!(view.messages().len(), 2);
    }

    #[test]
    fn test_blank_input_is_rejected() {
        for text in ["", "  ", "\t\n "] {
            let mut view = view_with_input(text);

            assert_eq!(view.submit().unwrap_err(), Rejected::EmptyInput);
            assert!(view.messages().is_empty());
            assert_eq!(view.phase(), Phase::Idle);
        }
    }

    #[test]
    fn test_content_is_kept_as_typed() {
        let mut view = view_with_input("  padded  ");
        view.submit().unwrap();
        assert_eq!(view.messages()[0].content, "  padded  ");
    }

    #[test]
    fn test_submit_while_sending_is_rejected() {
        let mut view = view_with_input("first");
        let outbound = view.submit().unwrap();

        view.input_mut().set("second");
        assert_eq!(view.submit().unwrap_err(), Rejected::AlreadySending);
        assert_eq!(view.messages().len(), 1);
        assert_eq!(view.input().text(), "second");

        view.resolve(outbound.ticket, reply("ok"));
        assert!(view.submit().is_ok());
        assert_eq!(view.messages().len(), 3);
    }

    #[test]
    fn test_outbound_carries_full_history() {
        let mut view = view_with_input("one");
        let first = view.submit().unwrap();
        view.resolve(first.ticket, reply("two"));

        view.input_mut().set("three");
        let second = view.submit().unwrap();

        let contents: Vec<_> = second.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_ne!(first.ticket, second.ticket);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut view = view_with_input("hello");
        let outbound = view.submit().unwrap();
        view.resolve(outbound.ticket, reply("hi"));
        view.input_mut().set("draft");

        view.reset();

        assert!(view.messages().is_empty());
        assert!(view.input().is_empty());
        assert_eq!(view.phase(), Phase::Idle);
    }

    #[test]
    fn test_late_reply_after_reset_is_discarded() {
        let mut view = view_with_input("hello");
        let stale = view.submit().unwrap();

        view.reset();
        assert!(view.messages().is_empty());
        assert_eq!(view.phase(), Phase::Idle);

        assert_eq!(view.resolve(stale.ticket, reply("late")), Resolution::Stale);
        assert!(view.messages().is_empty());
        assert_eq!(view.phase(), Phase::Idle);
    }

    #[test]
    fn test_stale_reply_does_not_resolve_new_request() {
        let mut view = view_with_input("old");
        let stale = view.submit().unwrap();
        view.reset();

        view.input_mut().set("new");
        let fresh = view.submit().unwrap();
        assert!(fresh.ticket.generation() > stale.ticket.generation());

        assert_eq!(view.resolve(stale.ticket, reply("late")), Resolution::Stale);
        assert_eq!(view.phase(), Phase::Sending);

        assert_eq!(view.resolve(fresh.ticket, reply("fresh")), Resolution::Replied);
        let contents: Vec<_> = view.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["new", "fresh"]);
    }

    #[test]
    fn test_message_ids_are_unique() {
        let mut view = ChatView::new();
        for i in 0..5 {
            view.input_mut().set(format!("msg {i}"));
            let outbound = view.submit().unwrap();
            view.resolve(outbound.ticket, reply("ok"));
        }

        let mut ids: Vec<_> = view.messages().iter().map(|m| m.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
