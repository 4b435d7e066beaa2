//! Bubble layout engine.
//!
//! Maps up to [`MAX_BUBBLES`] entries onto screen positions in a fixed row
//! pattern. Row 0 holds the newest entries and is drawn at the bottom of the
//! content area; later rows stack upwards. Position noise, colour and
//! animation timing come from the caller's RNG.
//!
//! - [`compute_layout`]: full rebuild from an ordered entry list
//! - [`BubbleBoard`]: the live set, with incremental insertion and dismissal

mod board;
mod rows;

pub use board::BubbleBoard;
pub use rows::{MAX_BUBBLES, ROW_PATTERN, row_layout, slot_of};

use crate::entry::Entry;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

pub const BUBBLE_WIDTH: f64 = 360.0;
pub const BUBBLE_HEIGHT: f64 = 280.0;
pub const MIN_GAP_X: f64 = 35.0;
pub const MAX_GAP_X: f64 = 85.0;
/// The header is never treated as reaching lower than this.
pub const HEADER_MAX_HEIGHT: f64 = 200.0;
/// Header bottom assumed when the page has no header.
pub const HEADER_FALLBACK_BOTTOM: f64 = 150.0;
pub const START_Y_PADDING: f64 = 25.0;
pub const MIN_ROW_HEIGHT: f64 = BUBBLE_HEIGHT + 30.0;
/// Gap left between the last row and the bottom of the content area.
pub const CONTENT_BOTTOM_MARGIN: f64 = 50.0;
/// Fraction of the viewport height used when the content bottom is unknown.
pub const FALLBACK_CONTENT_RATIO: f64 = 0.6;
pub const SIDE_MARGIN: f64 = 40.0;
pub const MIN_ROW_START_X: f64 = 30.0;

/// Delay between successive bubbles appearing during a rebuild.
pub const REVEAL_STAGGER: Duration = Duration::from_millis(120);

/// Background and border colour of one bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorPair {
    pub bg: &'static str,
    pub border: &'static str,
}

pub const PALETTE: [ColorPair; 6] = [
    ColorPair {
        bg: "rgba(144, 238, 144, 0.75)",
        border: "rgba(50, 205, 50, 0.7)",
    },
    ColorPair {
        bg: "rgba(152, 251, 152, 0.75)",
        border: "rgba(124, 252, 0, 0.7)",
    },
    ColorPair {
        bg: "rgba(173, 255, 47, 0.75)",
        border: "rgba(154, 205, 50, 0.7)",
    },
    ColorPair {
        bg: "rgba(127, 255, 0, 0.75)",
        border: "rgba(50, 205, 50, 0.7)",
    },
    ColorPair {
        bg: "rgba(154, 205, 50, 0.75)",
        border: "rgba(124, 252, 0, 0.7)",
    },
    ColorPair {
        bg: "rgba(50, 205, 50, 0.75)",
        border: "rgba(34, 139, 34, 0.7)",
    },
];

/// Measurements of the page the bubbles are drawn into, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Bottom edge of the content section, if the page has one.
    pub content_bottom: Option<f64>,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            content_bottom: None,
        }
    }

    pub fn with_content_bottom(mut self, bottom: f64) -> Self {
        self.content_bottom = Some(bottom);
        self
    }
}

/// Vertical band and usable width derived from a [`Viewport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub start_y: f64,
    pub end_y: f64,
    pub width: f64,
    pub available_width: f64,
}

impl Frame {
    pub fn new(viewport: &Viewport, header_bottom: Option<f64>) -> Self {
        let header = header_bottom.map_or(HEADER_FALLBACK_BOTTOM, |b| b.min(HEADER_MAX_HEIGHT));
        let end_y = viewport.content_bottom.map_or(
            viewport.height * FALLBACK_CONTENT_RATIO,
            |bottom| bottom - CONTENT_BOTTOM_MARGIN,
        );
        Self {
            start_y: header + START_Y_PADDING,
            end_y,
            width: viewport.width.max(0.0),
            available_width: viewport.width - SIDE_MARGIN,
        }
    }

    pub fn row_height(&self, rows: usize) -> f64 {
        let span = self.end_y - self.start_y;
        MIN_ROW_HEIGHT.max(span / rows.max(1) as f64)
    }

    /// Left edge of `column` in a row holding `in_row` bubbles, before jitter.
    ///
    /// Odd rows are pushed right by half a gap so columns zigzag.
    pub fn column_x(&self, in_row: usize, row: usize, column: usize) -> f64 {
        let n = in_row.max(1) as f64;
        let usable = self
            .available_width
            .max(n * BUBBLE_WIDTH + MIN_GAP_X * (n - 1.0));
        let raw_gap = if in_row > 1 {
            (usable - BUBBLE_WIDTH * n) / (n - 1.0)
        } else {
            0.0
        };
        let gap = raw_gap.clamp(MIN_GAP_X, MAX_GAP_X);
        let content_width = n * BUBBLE_WIDTH + (n - 1.0) * gap;
        let start = MIN_ROW_START_X.max((self.width - content_width) / 2.0);
        let zigzag = if row % 2 == 1 { gap / 2.0 } else { 0.0 };
        start + zigzag + column as f64 * (BUBBLE_WIDTH + gap)
    }

    /// Keeps a bubble from hanging past the bottom of the band, but never
    /// lifts it above its own row.
    pub fn clamp_y(&self, y: f64, base_y: f64) -> f64 {
        let max_y = self.end_y - BUBBLE_HEIGHT;
        if y > max_y { base_y.max(max_y) } else { y }
    }

    pub fn clamp_x(&self, x: f64) -> f64 {
        x.clamp(0.0, self.width)
    }
}

/// Computed geometry and styling for one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub entry_id: String,
    /// Logical row; 0 is the newest and drawn lowest.
    pub row: usize,
    pub column: usize,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub color: ColorPair,
    /// CSS `max-width` in pixels.
    pub max_width: u32,
    /// Float-loop animation delay in seconds.
    pub animation_delay: f64,
    /// Float-loop animation duration in seconds.
    pub animation_duration: f64,
    /// Time after the layout pass at which the bubble appears, in ms.
    pub reveal_delay_ms: u64,
}

impl Placement {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

/// Randomization envelope for one placement mode.
struct Jitter {
    x: f64,
    y_cap: f64,
    y_floor: f64,
}

impl Jitter {
    fn x<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(-self.x..self.x)
    }

    fn y<R: Rng + ?Sized>(&self, row_height: f64, rng: &mut R) -> f64 {
        let spread = ((row_height - BUBBLE_HEIGHT) * 0.25).min(self.y_cap);
        rng.gen_range(0.0..1.0) * spread.max(self.y_floor)
    }
}

const REBUILD_JITTER: Jitter = Jitter {
    x: 6.0,
    y_cap: 40.0,
    y_floor: 14.0,
};

const INSERT_JITTER: Jitter = Jitter {
    x: 8.0,
    y_cap: 35.0,
    y_floor: 10.0,
};

fn rebuild_max_width(chars: usize) -> u32 {
    match chars {
        n if n > 120 => 400,
        n if n > 60 => 380,
        _ => 340,
    }
}

fn insert_max_width(chars: usize) -> u32 {
    match chars {
        n if n > 100 => 320,
        n if n > 50 => 300,
        _ => 250,
    }
}

fn pick_color<R: Rng + ?Sized>(rng: &mut R) -> ColorPair {
    PALETTE.choose(rng).copied().unwrap_or(PALETTE[0])
}

/// Lays out the first [`MAX_BUBBLES`] entries from scratch.
///
/// Entries are taken in order (newest first). A repeated id is skipped so
/// each entry appears at most once. Returns placements in input order.
pub fn compute_layout<R: Rng + ?Sized>(
    entries: &[Entry],
    viewport: &Viewport,
    header_bottom: Option<f64>,
    rng: &mut R,
) -> Vec<Placement> {
    let mut seen = HashSet::new();
    let selected: Vec<&Entry> = entries
        .iter()
        .take(MAX_BUBBLES)
        .filter(|entry| seen.insert(entry.id.as_str()))
        .collect();

    let layout = row_layout(selected.len());
    if layout.is_empty() {
        return Vec::new();
    }

    let frame = Frame::new(viewport, header_bottom);
    let rows = layout.len();
    let row_height = frame.row_height(rows);

    selected
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let (row, column) = slot_of(&layout, index)?;
            let visual_row = rows - 1 - row;
            let base_y = frame.start_y + visual_row as f64 * row_height;
            let y = frame.clamp_y(base_y + REBUILD_JITTER.y(row_height, rng), base_y);
            let x = frame.column_x(layout[row], row, column) + REBUILD_JITTER.x(rng);

            Some(Placement {
                entry_id: entry.id.clone(),
                row,
                column,
                x: frame.clamp_x(x),
                y,
                scale: 1.0,
                color: pick_color(rng),
                max_width: rebuild_max_width(entry.answer_chars()),
                animation_delay: index as f64 * 0.1,
                animation_duration: 6.0,
                reveal_delay_ms: REVEAL_STAGGER.as_millis() as u64 * index as u64,
            })
        })
        .collect()
}

/// Places a newly arrived entry at the first slot of the bottom row, for a
/// board that will hold `total` bubbles once it is added.
///
/// Returns the placement and the row height used, which is how far every
/// bubble already on screen must move up.
pub fn place_new_entry<R: Rng + ?Sized>(
    entry: &Entry,
    total: usize,
    viewport: &Viewport,
    header_bottom: Option<f64>,
    rng: &mut R,
) -> (Placement, f64) {
    let frame = Frame::new(viewport, header_bottom);
    let layout = row_layout(total.clamp(1, MAX_BUBBLES));
    let rows = layout.len();
    let row_height = frame.row_height(rows);

    let base_y = frame.start_y + (rows - 1) as f64 * row_height;
    let y = frame.clamp_y(base_y + INSERT_JITTER.y(row_height, rng), base_y);
    let x = frame.column_x(layout[0], 0, 0) + INSERT_JITTER.x(rng);

    let placement = Placement {
        entry_id: entry.id.clone(),
        row: 0,
        column: 0,
        x: frame.clamp_x(x),
        y,
        scale: 0.9 + rng.gen_range(0.0..0.25),
        color: pick_color(rng),
        max_width: insert_max_width(entry.answer_chars()),
        animation_delay: rng.gen_range(0.0..1.5),
        animation_duration: 5.0 + rng.gen_range(0.0..2.0),
        reveal_delay_ms: 0,
    };
    (placement, row_height)
}
