//! The live set of bubbles on screen.

use super::{MAX_BUBBLES, Viewport, compute_layout, place_new_entry};
use crate::bubble::Bubble;
use crate::entry::Entry;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Bubbles currently displayed, newest first.
///
/// Holds at most one bubble per entry id and at most [`MAX_BUBBLES`].
#[derive(Debug, Clone, Default)]
pub struct BubbleBoard {
    bubbles: Vec<Bubble>,
}

impl BubbleBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every bubble and lays `entries` out from scratch.
    pub fn rebuild<R: Rng + ?Sized>(
        &mut self,
        entries: &[Entry],
        viewport: &Viewport,
        header_bottom: Option<f64>,
        now: Duration,
        rng: &mut R,
    ) {
        let placements = compute_layout(entries, viewport, header_bottom, rng);
        self.bubbles = placements
            .into_iter()
            .filter_map(|placement| {
                let entry = entries.iter().find(|e| e.id == placement.entry_id)?;
                Some(Bubble::new(entry.clone(), placement, now))
            })
            .collect();
        debug!(bubbles = self.bubbles.len(), "board rebuilt");
    }

    /// Adds one new entry at the bottom row and scrolls the rest up.
    ///
    /// Returns `false` without changes if the entry is already on the board.
    /// When the board is full the topmost bubble is evicted first.
    pub fn insert<R: Rng + ?Sized>(
        &mut self,
        entry: &Entry,
        viewport: &Viewport,
        header_bottom: Option<f64>,
        now: Duration,
        rng: &mut R,
    ) -> bool {
        if self.contains(&entry.id) {
            return false;
        }

        if self.bubbles.len() >= MAX_BUBBLES {
            self.evict_topmost();
        }

        let total = self.bubbles.len() + 1;
        let (placement, row_height) = place_new_entry(entry, total, viewport, header_bottom, rng);
        for bubble in &mut self.bubbles {
            bubble.shift_up(row_height);
        }
        self.bubbles.insert(0, Bubble::new(entry.clone(), placement, now));
        true
    }

    fn evict_topmost(&mut self) {
        let topmost = self
            .bubbles
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.placement().y.total_cmp(&b.placement().y))
            .map(|(i, _)| i);
        if let Some(index) = topmost {
            let evicted = self.bubbles.remove(index);
            debug!(entry_id = %evicted.entry().id, "evicted topmost bubble");
        }
    }

    /// Starts dismissing the bubble for `entry_id`. Returns whether a bubble
    /// accepted the click.
    pub fn dismiss(&mut self, entry_id: &str, now: Duration) -> bool {
        self.bubbles
            .iter_mut()
            .find(|b| b.entry().id == entry_id)
            .is_some_and(|b| b.dismiss(now))
    }

    /// Runs lifecycle transitions and drops bubbles that finished fading out.
    pub fn advance(&mut self, now: Duration) {
        self.bubbles.retain_mut(|bubble| bubble.advance(now));
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn contains(&self, entry_id: &str) -> bool {
        self.bubbles.iter().any(|b| b.entry().id == entry_id)
    }
}
