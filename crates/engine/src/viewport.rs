//! Viewport windowing: the visible W×H slice of the terrain grid around the
//! player, clamped so the window never runs past the world edge.

use crate::world::{Coord, Region};

/// Client default window, 31×19 tiles.
pub const VIEW_W: i64 = 31;
pub const VIEW_H: i64 = 19;

/// One visible cell, carrying its global coordinate and terrain symbol.
/// Settlement/POI markers are overlaid by the caller via the spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportCell {
    pub x: i64,
    pub y: i64,
    pub symbol: char,
}

/// A computed window over a region. Pure read; recomputed on every position
/// change.
#[derive(Debug, Clone, Copy)]
pub struct Viewport<'a> {
    region: &'a Region,
    pub start_x: i64,
    pub start_y: i64,
    pub width: i64,
    pub height: i64,
}

impl<'a> Viewport<'a> {
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.start_x
            && x < self.start_x + self.width
            && y >= self.start_y
            && y < self.start_y + self.height
    }

    /// Row-major cells, produced lazily.
    pub fn cells(&self) -> impl Iterator<Item = ViewportCell> + 'a {
        let Viewport {
            region,
            start_x,
            start_y,
            width,
            height,
        } = *self;
        (0..height).flat_map(move |row| {
            (0..width).map(move |col| {
                let x = start_x + col;
                let y = start_y + row;
                ViewportCell {
                    x,
                    y,
                    symbol: region.symbol_at(x, y),
                }
            })
        })
    }
}

fn clamp(n: i64, min: i64, max: i64) -> i64 {
    n.max(min).min(max)
}

/// Center the window on the player where possible; at the edges the origin is
/// clamped into [0, world − window].
pub fn compute_viewport(pos: Coord, region: &Region, width: i64, height: i64) -> Viewport<'_> {
    let start_x = clamp(pos.x - width / 2, 0, (region.width - width).max(0));
    let start_y = clamp(pos.y - height / 2, 0, (region.height - height).max(0));
    Viewport {
        region,
        start_x,
        start_y,
        width,
        height,
    }
}
