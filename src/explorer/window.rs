use std::ops::Range;

pub const DEFAULT_OVERSCAN: usize = 5;

/// Row extents for a windowed list: one shared extent, or a measured extent
/// per row (kept as prefix sums so offsets are O(log n) lookups).
#[derive(Debug, Clone)]
pub enum RowExtents {
    Uniform { count: usize, extent: f32 },
    Variable { starts: Vec<f32>, total: f32 },
}

impl RowExtents {
    pub fn uniform(count: usize, extent: f32) -> Self {
        Self::Uniform { count, extent }
    }

    pub fn variable(extents: &[f32]) -> Self {
        let mut starts = Vec::with_capacity(extents.len());
        let mut total = 0.0;
        for extent in extents {
            starts.push(total);
            total += extent.max(0.0);
        }
        Self::Variable { starts, total }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Uniform { count, .. } => *count,
            Self::Variable { starts, .. } => starts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total(&self) -> f32 {
        match self {
            Self::Uniform { count, extent } => *count as f32 * extent,
            Self::Variable { total, .. } => *total,
        }
    }

    /// Leading edge of row `index`; `index == len()` yields the total extent.
    pub fn offset_of(&self, index: usize) -> f32 {
        match self {
            Self::Uniform { count, extent } => index.min(*count) as f32 * extent,
            Self::Variable { starts, total } => {
                starts.get(index).copied().unwrap_or(*total)
            }
        }
    }

    /// Index of the row covering `offset` (clamped to the last row).
    fn index_at(&self, offset: f32) -> usize {
        match self {
            Self::Uniform { count, extent } => {
                if *count == 0 || *extent <= 0.0 {
                    0
                } else {
                    ((offset / extent) as usize).min(count - 1)
                }
            }
            Self::Variable { starts, .. } => starts
                .partition_point(|&start| start <= offset)
                .saturating_sub(1),
        }
    }
}

/// The minimal contiguous slice of rows to materialize. Rows outside `range`
/// are represented only by the `leading`/`trailing` spacer extents.
#[derive(Debug, Clone, PartialEq)]
pub struct RowWindow {
    pub range: Range<usize>,
    pub total_extent: f32,
    pub leading: f32,
    pub trailing: f32,
}

impl RowWindow {
    fn empty() -> Self {
        Self {
            range: 0..0,
            total_extent: 0.0,
            leading: 0.0,
            trailing: 0.0,
        }
    }
}

/// Computes the row range overlapping `[scroll_offset, scroll_offset +
/// viewport_extent]`, expanded by `overscan` rows on each side.
pub fn window(
    extents: &RowExtents,
    scroll_offset: f32,
    viewport_extent: f32,
    overscan: usize,
) -> RowWindow {
    let count = extents.len();
    if count == 0 {
        return RowWindow::empty();
    }

    let total = extents.total();
    let max_offset = (total - viewport_extent).max(0.0);
    let offset = scroll_offset.clamp(0.0, max_offset);

    let first = extents.index_at(offset);
    let last = extents.index_at(offset + viewport_extent.max(0.0));

    let start = first.saturating_sub(overscan);
    let end = (last + overscan + 1).min(count);

    RowWindow {
        leading: extents.offset_of(start),
        trailing: total - extents.offset_of(end),
        range: start..end,
        total_extent: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_yields_empty_window() {
        let window = window(&RowExtents::uniform(0, 24.0), 0.0, 600.0, DEFAULT_OVERSCAN);
        assert_eq!(window.range, 0..0);
        assert_eq!(window.total_extent, 0.0);
    }

    #[test]
    fn covers_every_row_overlapping_the_viewport() {
        let extents = RowExtents::uniform(1000, 20.0);
        let win = window(&extents, 400.0, 200.0, 0);

        // Rows 20..=29 overlap [400, 600).
        assert_eq!(win.range, 20..31);
        assert_eq!(win.leading, 400.0);
        assert_eq!(win.total_extent, 20_000.0);
    }

    #[test]
    fn overscan_expands_and_clamps_at_both_ends() {
        let extents = RowExtents::uniform(100, 10.0);

        let top = window(&extents, 0.0, 50.0, 5);
        assert_eq!(top.range.start, 0);
        assert_eq!(top.range.end, 11);

        let bottom = window(&extents, 950.0, 50.0, 5);
        assert_eq!(bottom.range.end, 100);
        assert_eq!(bottom.range.start, 90);
        assert_eq!(bottom.trailing, 0.0);
    }

    #[test]
    fn excludes_rows_outside_the_padded_range() {
        let extents = RowExtents::uniform(10_000, 24.0);
        let win = window(&extents, 120_000.0, 720.0, DEFAULT_OVERSCAN);

        assert!(win.range.len() <= 720 / 24 + 2 * DEFAULT_OVERSCAN + 2);
        assert!(win.range.start > 0);
        assert!(win.range.end < 10_000);

        // Spacers plus materialized rows account for the full extent.
        let materialized = win.range.len() as f32 * 24.0;
        assert_eq!(win.leading + materialized + win.trailing, win.total_extent);
    }

    #[test]
    fn scroll_past_the_end_is_clamped() {
        let extents = RowExtents::uniform(10, 30.0);
        let win = window(&extents, 1e9, 100.0, 0);
        assert_eq!(win.range.end, 10);
        assert!(win.range.start < 10);
    }

    #[test]
    fn variable_extents_use_measured_offsets() {
        let extents = RowExtents::variable(&[10.0, 40.0, 10.0, 10.0, 30.0]);
        assert_eq!(extents.total(), 100.0);
        assert_eq!(extents.offset_of(2), 50.0);
        assert_eq!(extents.offset_of(5), 100.0);

        // Viewport [45, 65) overlaps rows 1..=3.
        let win = window(&extents, 45.0, 20.0, 0);
        assert_eq!(win.range, 1..4);
        assert_eq!(win.leading, 10.0);
        assert_eq!(win.trailing, 30.0);
    }

    #[test]
    fn offset_of_matches_window_leading_for_any_start() {
        let extents = RowExtents::variable(&[5.0, 15.0, 25.0, 5.0, 50.0]);
        for overscan in [0, 1, DEFAULT_OVERSCAN] {
            let win = window(&extents, 30.0, 40.0, overscan);
            assert_eq!(win.leading, extents.offset_of(win.range.start));
        }
    }
}
