//! Uniform grid spatial hash
//!
//! Space is divided into square cells of `cell_size` world units. A key is
//! stored in every cell its bounds touch, so a query only needs to look at
//! the cells covered by the query rectangle.
//!
//! Work per call is bounded by the number of occupied cells rather than by
//! the area being covered. Keys whose bounds span more than
//! [`MAX_CELLS_PER_KEY`] cells are kept in a separate list that every query
//! reports, and queries covering more cells than are occupied scan the
//! occupied cells instead of the range.

use std::collections::{HashMap, HashSet};

use super::spatial_query::{ProxyKey, SpatialQuery};
use crate::foundation::math::{Rect, Vec2};

type CellCoord = (i32, i32);

/// Keys spanning more cells than this are not written into the grid
pub const MAX_CELLS_PER_KEY: i64 = 256;

/// Spatial hash over fixed-size square cells
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<CellCoord, Vec<ProxyKey>>,
    oversized: HashSet<ProxyKey>,
    members: HashSet<ProxyKey>,
}

/// Inclusive block of cells
#[derive(Debug, Clone, Copy)]
struct CellRange {
    min: CellCoord,
    max: CellCoord,
}

impl CellRange {
    fn cell_count(self) -> i64 {
        let width = i64::from(self.max.0) - i64::from(self.min.0) + 1;
        let height = i64::from(self.max.1) - i64::from(self.min.1) + 1;
        width.saturating_mul(height)
    }

    fn contains(self, (x, y): CellCoord) -> bool {
        x >= self.min.0 && x <= self.max.0 && y >= self.min.1 && y <= self.max.1
    }

    fn cells(self) -> impl Iterator<Item = CellCoord> {
        (self.min.0..=self.max.0)
            .flat_map(move |x| (self.min.1..=self.max.1).map(move |y| (x, y)))
    }
}

/// Deduplicating result list
#[derive(Default)]
struct Collector {
    seen: HashSet<ProxyKey>,
    results: Vec<ProxyKey>,
}

impl Collector {
    fn extend<'a>(&mut self, keys: impl IntoIterator<Item = &'a ProxyKey>) {
        for &key in keys {
            if self.seen.insert(key) {
                self.results.push(key);
            }
        }
    }
}

impl SpatialHash {
    /// Create an empty spatial hash
    ///
    /// `cell_size` should be validated by the caller (see `SceneConfig::validate`).
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            oversized: HashSet::new(),
            members: HashSet::new(),
        }
    }

    /// Cell side length in world units
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of keys too large to be stored per cell
    pub fn oversized_count(&self) -> usize {
        self.oversized.len()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_coord(&self, point: Vec2) -> CellCoord {
        (
            (point.x * self.inv_cell_size).floor() as i32,
            (point.y * self.inv_cell_size).floor() as i32,
        )
    }

    /// World rectangle of a single cell
    #[allow(clippy::cast_precision_loss)]
    fn cell_rect(&self, (x, y): CellCoord) -> Rect {
        Rect::new(
            x as f32 * self.cell_size,
            y as f32 * self.cell_size,
            self.cell_size,
            self.cell_size,
        )
    }

    /// Inclusive cell range covered by `rect`
    fn cell_range(&self, rect: &Rect) -> CellRange {
        CellRange {
            min: self.cell_coord(rect.min()),
            max: self.cell_coord(rect.max()),
        }
    }

    fn occupied_cells(&self) -> i64 {
        i64::try_from(self.cells.len()).unwrap_or(i64::MAX)
    }

    /// Collect keys from every occupied cell accepted by `keep`
    fn scan_cells(&self, out: &mut Collector, keep: impl Fn(CellCoord) -> bool) {
        for (&coord, keys) in &self.cells {
            if keep(coord) {
                out.extend(keys);
            }
        }
    }

    fn visit(&self, out: &mut Collector, coord: CellCoord) {
        if let Some(keys) = self.cells.get(&coord) {
            out.extend(keys);
        }
    }

    /// Visit the cells crossed by `from -> to`, stepping one cell boundary
    /// at a time
    ///
    /// When the segment passes exactly through a cell corner, both cells
    /// touching that corner are visited as well.
    #[allow(clippy::cast_precision_loss)]
    fn walk_segment(&self, out: &mut Collector, from: Vec2, to: Vec2) {
        let (start, end) = (self.cell_coord(from), self.cell_coord(to));
        let dir = to - from;
        let step_x = step_sign(dir.x);
        let step_y = step_sign(dir.y);

        // Segment parameter at which the next vertical/horizontal boundary is crossed
        let first_boundary = |cell: i32, step: i32, origin: f32, delta: f32| {
            if step == 0 {
                return (f32::INFINITY, f32::INFINITY);
            }
            let edge = if step > 0 { cell + 1 } else { cell };
            let t_max = (edge as f32 * self.cell_size - origin) / delta;
            (t_max, self.cell_size / delta.abs())
        };
        let (mut t_max_x, t_delta_x) = first_boundary(start.0, step_x, from.x, dir.x);
        let (mut t_max_y, t_delta_y) = first_boundary(start.1, step_y, from.y, dir.y);

        let (mut x, mut y) = start;
        self.visit(out, (x, y));

        loop {
            let x_done = x == end.0;
            let y_done = y == end.1;
            if x_done && y_done {
                break;
            }

            if y_done || (!x_done && t_max_x < t_max_y) {
                x += step_x;
                t_max_x += t_delta_x;
            } else if x_done || t_max_y < t_max_x {
                y += step_y;
                t_max_y += t_delta_y;
            } else {
                self.visit(out, (x + step_x, y));
                self.visit(out, (x, y + step_y));
                x += step_x;
                y += step_y;
                t_max_x += t_delta_x;
                t_max_y += t_delta_y;
            }
            self.visit(out, (x, y));
        }
    }
}

fn step_sign(delta: f32) -> i32 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

impl SpatialQuery for SpatialHash {
    fn insert(&mut self, key: ProxyKey, bounds: Rect) {
        self.members.insert(key);

        let range = self.cell_range(&bounds);
        if range.cell_count() > MAX_CELLS_PER_KEY {
            self.oversized.insert(key);
            return;
        }

        for coord in range.cells() {
            let cell = self.cells.entry(coord).or_default();
            if !cell.contains(&key) {
                cell.push(key);
            }
        }
    }

    fn remove(&mut self, key: ProxyKey, bounds: Rect) {
        self.members.remove(&key);
        self.oversized.remove(&key);

        let range = self.cell_range(&bounds);
        if range.cell_count() > MAX_CELLS_PER_KEY {
            return;
        }

        for coord in range.cells() {
            if let Some(cell) = self.cells.get_mut(&coord) {
                cell.retain(|&k| k != key);
                if cell.is_empty() {
                    self.cells.remove(&coord);
                }
            }
        }
    }

    fn query_rect(&self, rect: &Rect) -> Vec<ProxyKey> {
        let range = self.cell_range(rect);
        let mut out = Collector::default();

        if range.cell_count() > self.occupied_cells() {
            self.scan_cells(&mut out, |coord| range.contains(coord));
        } else {
            for coord in range.cells() {
                self.visit(&mut out, coord);
            }
        }
        out.extend(&self.oversized);

        out.results
    }

    fn query_segment(&self, from: Vec2, to: Vec2) -> Vec<ProxyKey> {
        let (start, end) = (self.cell_coord(from), self.cell_coord(to));
        let crossed = (i64::from(end.0) - i64::from(start.0)).abs()
            + (i64::from(end.1) - i64::from(start.1)).abs()
            + 1;
        let mut out = Collector::default();

        if crossed > self.occupied_cells() {
            self.scan_cells(&mut out, |coord| {
                self.cell_rect(coord).segment_entry(from, to).is_some()
            });
        } else {
            self.walk_segment(&mut out, from, to);
        }
        out.extend(&self.oversized);

        out.results
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.oversized.clear();
        self.members.clear();
    }

    fn entity_count(&self) -> usize {
        self.members.len()
    }
}
