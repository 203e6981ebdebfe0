//! Spatial index over (join-time, score), bucketed on both axes.
//!
//! The time axis is a cyclic ring of `x_count` buckets, each covering
//! `x_group_len` seconds; a fixed-size ring is enough to cover the
//! configured matching window because callers never span more than one
//! full revolution. The score axis is bounded and does not wrap: scores
//! outside `[0, y_count * y_group_len)` simply do not occur.

use std::ops::ControlFlow;

/// Bucketed (time, score) index storing player ids by reference.
///
/// Cells are unordered bags; identity-based removal is O(cell size) via
/// swap-with-last, matching the reference enumeration/removal contract.
#[derive(Debug, Clone)]
pub struct TimeScoreGrid {
    x_count: i64,
    y_count: i64,
    x_group_len: i64,
    y_group_len: i64,
    cells: Vec<Vec<String>>,
}

impl TimeScoreGrid {
    pub fn new(x_count: i64, y_count: i64, x_group_len: i64, y_group_len: i64) -> Self {
        let cell_count = (x_count * y_count).max(0) as usize;
        Self {
            x_count,
            y_count,
            x_group_len,
            y_group_len,
            cells: vec![Vec::new(); cell_count],
        }
    }

    fn cell_index(&self, bx: i64, by: i64) -> usize {
        (bx * self.y_count + by) as usize
    }

    /// Appends `item` to the cell covering `(x, y)`.
    pub fn add(&mut self, x: i64, y: i64, item: impl Into<String>) {
        let bx = (x / self.x_group_len).rem_euclid(self.x_count);
        let by = y / self.y_group_len;
        if by < 0 || by >= self.y_count {
            return;
        }
        let idx = self.cell_index(bx, by);
        self.cells[idx].push(item.into());
    }

    /// Removes `item` from the cell covering `(x, y)` by identity; a
    /// no-op if it isn't present there.
    pub fn del(&mut self, x: i64, y: i64, item: &str) {
        let bx = (x / self.x_group_len).rem_euclid(self.x_count);
        let by = y / self.y_group_len;
        if by < 0 || by >= self.y_count {
            return;
        }
        let idx = self.cell_index(bx, by);
        let cell = &mut self.cells[idx];
        if let Some(pos) = cell.iter().position(|id| id == item) {
            cell.swap_remove(pos);
        }
    }

    /// Walks cells in the matching policy's order, invoking `visit` for
    /// every stored item until it signals `ControlFlow::Break`.
    ///
    /// Order: the time axis advances from `start_x` to `end_x` (wrapping
    /// modulo `x_count`); at each time bucket the score axis is explored
    /// outward from the bucket containing `mid_y` (center, then -1, +1,
    /// -2, +2, ... up to `y_radius`), skipping out-of-range indices
    /// without wrapping; within a cell, items are visited in insertion
    /// order.
    pub fn enumerate<F>(&self, start_x: i64, end_x: i64, mid_y: i64, y_radius: i64, mut visit: F)
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        if self.x_count == 0 || self.y_count == 0 {
            return;
        }
        let start_bx = (start_x / self.x_group_len).rem_euclid(self.x_count);
        let end_bx = (end_x / self.x_group_len).rem_euclid(self.x_count);
        let span = (end_bx - start_bx).rem_euclid(self.x_count) + 1;
        let span = span.min(self.x_count);

        let mid_by = mid_y / self.y_group_len;
        let radius_by = (y_radius / self.y_group_len).max(0);

        for step in 0..span {
            let bx = (start_bx + step).rem_euclid(self.x_count);

            for by in Self::score_offsets(mid_by, radius_by, self.y_count) {
                let idx = self.cell_index(bx, by);
                for item in &self.cells[idx] {
                    if visit(item).is_break() {
                        return;
                    }
                }
            }
        }
    }

    /// Center-outward bucket order: `mid`, `mid-1`, `mid+1`, `mid-2`, ...
    fn score_offsets(mid_by: i64, radius_by: i64, y_count: i64) -> Vec<i64> {
        let mut order = Vec::with_capacity((radius_by as usize) * 2 + 1);
        if mid_by >= 0 && mid_by < y_count {
            order.push(mid_by);
        }
        for j in 1..=radius_by {
            let lo = mid_by - j;
            let hi = mid_by + j;
            if lo >= 0 && lo < y_count {
                order.push(lo);
            }
            if hi >= 0 && hi < y_count {
                order.push(hi);
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(grid: &TimeScoreGrid, sx: i64, ex: i64, mid: i64, radius: i64) -> Vec<String> {
        let mut out = Vec::new();
        grid.enumerate(sx, ex, mid, radius, |id| {
            out.push(id.to_string());
            ControlFlow::Continue(())
        });
        out
    }

    #[test]
    fn add_and_enumerate_center_outward() {
        let mut grid = TimeScoreGrid::new(4, 10, 3, 10);
        grid.add(0, 100, "center");
        grid.add(0, 90, "minus_one");
        grid.add(0, 110, "plus_one");
        grid.add(0, 80, "minus_two");

        let order = collect(&grid, 0, 0, 100, 25);
        assert_eq!(order, vec!["center", "minus_one", "plus_one", "minus_two"]);
    }

    #[test]
    fn del_removes_by_identity() {
        let mut grid = TimeScoreGrid::new(4, 10, 3, 10);
        grid.add(0, 100, "a");
        grid.add(0, 100, "b");
        grid.del(0, 100, "a");
        assert_eq!(collect(&grid, 0, 0, 100, 0), vec!["b"]);
    }

    #[test]
    fn del_missing_item_is_noop() {
        let mut grid = TimeScoreGrid::new(4, 10, 3, 10);
        grid.add(0, 100, "a");
        grid.del(0, 100, "nonexistent");
        assert_eq!(collect(&grid, 0, 0, 100, 0), vec!["a"]);
    }

    #[test]
    fn time_axis_wraps_modulo_x_count() {
        let mut grid = TimeScoreGrid::new(4, 10, 3, 10);
        // x_count=4, x_group_len=3 => ring covers 12 time units.
        grid.add(11, 100, "wrapped");
        let order = collect(&grid, 9, 2, 100, 0);
        assert_eq!(order, vec!["wrapped"]);
    }

    #[test]
    fn score_axis_does_not_wrap() {
        let mut grid = TimeScoreGrid::new(4, 10, 3, 10);
        grid.add(0, 5, "low_edge");
        // radius would reach negative bucket indices; they're skipped, not wrapped.
        let order = collect(&grid, 0, 0, 5, 50);
        assert_eq!(order, vec!["low_edge"]);
    }
}
