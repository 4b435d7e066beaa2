//! Row pattern and slot assignment.

/// Bubbles per row, from the bottom row upwards.
pub const ROW_PATTERN: [usize; 5] = [2, 3, 2, 3, 2];

/// Most bubbles shown at once.
pub const MAX_BUBBLES: usize = {
    let mut sum = 0;
    let mut i = 0;
    while i < ROW_PATTERN.len() {
        sum += ROW_PATTERN[i];
        i += 1;
    }
    sum
};

/// Splits `total` bubbles into rows following [`ROW_PATTERN`].
///
/// Only rows that receive at least one bubble are returned; anything beyond
/// [`MAX_BUBBLES`] is dropped.
pub fn row_layout(total: usize) -> Vec<usize> {
    let mut remaining = total;
    ROW_PATTERN
        .iter()
        .map_while(|&capacity| {
            if remaining == 0 {
                return None;
            }
            let count = capacity.min(remaining);
            remaining -= count;
            Some(count)
        })
        .collect()
}

/// Returns the `(row, column)` of the bubble at `index` in fill order.
pub fn slot_of(layout: &[usize], index: usize) -> Option<(usize, usize)> {
    let mut start = 0;
    for (row, &count) in layout.iter().enumerate() {
        if index < start + count {
            return Some((row, index - start));
        }
        start += count;
    }
    None
}
