// Copyright 2025 Cowboy AI, LLC.

//! The pull-enumeration state machine:
//!
//! ```text
//!             Open*(params)
//!    idle ────────────────▶ open ──Pull*──▶ open
//!                             │                │
//!                             │EndOfSequence   │timeout/reset/close
//!                             ▼                ▼
//!                           closed ◀──Close── open
//! ```

use crate::error::{WbemError, WbemResult};

/// The lifecycle state of an enumeration context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerationState {
    /// No context has been opened yet.
    Idle,
    /// The server holds a live enumeration context.
    Open,
    /// Terminal: either `EndOfSequence` was reached or the context was
    /// explicitly closed. No further `Pull*`/`Close*` is valid.
    Closed,
}

/// A handle to a server-held enumeration context. The Engine preserves the
/// exact byte string the server returned as the context; this type treats
/// it as opaque.
#[derive(Debug, Clone)]
pub struct EnumerationContext {
    context: String,
    state: EnumerationState,
}

impl EnumerationContext {
    /// A context that has not been opened.
    pub fn idle() -> Self {
        Self {
            context: String::new(),
            state: EnumerationState::Idle,
        }
    }

    /// Transition from `idle` to `open` after a successful `Open*` call.
    pub fn opened(context: String) -> Self {
        Self {
            context,
            state: EnumerationState::Open,
        }
    }

    /// The current state.
    pub fn state(&self) -> EnumerationState {
        self.state
    }

    /// The opaque context string, valid only while `state() == Open`.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Apply a `Pull*` reply: remains `open` unless `end_of_sequence`, in
    /// which case it moves to `closed`. Fails locally (no transport call)
    /// if the context isn't currently open.
    pub fn advance(&mut self, new_context: Option<String>, end_of_sequence: bool) -> WbemResult<()> {
        self.require_open("Pull*")?;
        if end_of_sequence {
            self.state = EnumerationState::Closed;
            self.context.clear();
        } else if let Some(ctx) = new_context {
            self.context = ctx;
        }
        Ok(())
    }

    /// Apply a `CloseEnumeration` call: moves `open` to `closed`. Fails
    /// locally if the context isn't currently open.
    pub fn close(&mut self) -> WbemResult<()> {
        self.require_open("CloseEnumeration")?;
        self.state = EnumerationState::Closed;
        self.context.clear();
        Ok(())
    }

    fn require_open(&self, op: &str) -> WbemResult<()> {
        if self.state != EnumerationState::Open {
            return Err(WbemError::model(format!(
                "{op} is only valid on an open enumeration context (current state: {:?})",
                self.state
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_sequence_moves_to_closed() {
        let mut ctx = EnumerationContext::opened("ctx-1".to_string());
        ctx.advance(None, true).unwrap();
        assert_eq!(ctx.state(), EnumerationState::Closed);
    }

    #[test]
    fn pull_after_closed_fails_locally() {
        let mut ctx = EnumerationContext::opened("ctx-1".to_string());
        ctx.advance(None, true).unwrap();
        assert!(ctx.advance(None, false).is_err());
        assert!(ctx.close().is_err());
    }

    #[test]
    fn pull_without_end_of_sequence_stays_open_and_updates_context() {
        let mut ctx = EnumerationContext::opened("ctx-1".to_string());
        ctx.advance(Some("ctx-2".to_string()), false).unwrap();
        assert_eq!(ctx.state(), EnumerationState::Open);
        assert_eq!(ctx.context(), "ctx-2");
    }

    #[test]
    fn close_while_idle_fails_locally() {
        let mut ctx = EnumerationContext::idle();
        assert!(ctx.close().is_err());
    }
}
