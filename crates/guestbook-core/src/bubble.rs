//! Per-bubble lifecycle.
//!
//! ```text
//! Entering --(reveal delay + fade-in)--> Idle --(click)--> Dismissing --(fade-out)--> removed
//! ```
//!
//! Times are offsets on the caller's page clock, so the machine is driven
//! entirely by the `now` values passed in.

use crate::entry::Entry;
use crate::layout::Placement;
use std::time::Duration;

/// Fade-in length once a bubble is revealed.
pub const ENTER_DURATION: Duration = Duration::from_millis(600);
/// Fade-out length before a dismissed bubble is removed.
pub const DISMISS_DURATION: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleState {
    /// Waiting for its reveal slot or fading in. Not clickable.
    Entering { settles_at: Duration },
    /// Floating and clickable.
    Idle,
    /// Fading out. Terminal.
    Dismissing { removed_at: Duration },
}

#[derive(Debug, Clone)]
pub struct Bubble {
    entry: Entry,
    placement: Placement,
    state: BubbleState,
    reveal_at: Duration,
    revealed: bool,
}

impl Bubble {
    pub fn new(entry: Entry, placement: Placement, now: Duration) -> Self {
        let reveal_at = now + placement.reveal_delay();
        Self {
            entry,
            placement,
            state: BubbleState::Entering {
                settles_at: reveal_at + ENTER_DURATION,
            },
            reveal_at,
            revealed: reveal_at <= now,
        }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn state(&self) -> BubbleState {
        self.state
    }

    /// Whether the bubble has reached its reveal time and should be drawn.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.state, BubbleState::Idle)
    }

    /// Applies any transitions due by `now`. Returns `false` once the bubble
    /// has finished fading out and should be dropped.
    pub fn advance(&mut self, now: Duration) -> bool {
        if now >= self.reveal_at {
            self.revealed = true;
        }
        match self.state {
            BubbleState::Entering { settles_at } if now >= settles_at => {
                self.state = BubbleState::Idle;
                true
            }
            BubbleState::Dismissing { removed_at } => now < removed_at,
            _ => true,
        }
    }

    /// Starts the fade-out. Ignored unless the bubble is idle.
    pub fn dismiss(&mut self, now: Duration) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.state = BubbleState::Dismissing {
            removed_at: now + DISMISS_DURATION,
        };
        true
    }

    pub(crate) fn shift_up(&mut self, by: f64) {
        self.placement.y -= by;
    }
}
