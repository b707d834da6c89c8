// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interval placement of doors, windows and vents along a wall.
//!
//! An item occupies `[pos - width/2, pos + width/2]` measured from the wall's
//! start node. Items must stay clear of both wall ends by
//! `thickness/2 + edge_margin` and keep `min_gap` between each other.
//! Placement never fails loudly: a request that cannot be satisfied yields
//! `None` and the caller decides whether to drop the gesture.

use crate::config::PlacementConfig;
use crate::error::{Error, Result};
use crate::graph::{ItemKind, WallGraph, WallItem};
use crate::keys::WallKey;

/// Slack for comparing interval widths computed along different paths.
const FIT_EPSILON: f64 = 1e-9;

/// A free or usable stretch of a wall, in distance from the start node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    /// Distance from `x` to the span (0 inside).
    pub fn distance_to(&self, x: f64) -> f64 {
        if x < self.start {
            self.start - x
        } else if x > self.end {
            x - self.end
        } else {
            0.0
        }
    }
}

/// Outcome of re-placing the items of one wall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Refit {
    /// Items that no longer fit and were removed.
    pub dropped: usize,
    /// Items kept with a different position or width.
    pub adjusted: usize,
}

impl Refit {
    pub fn is_noop(&self) -> bool {
        self.dropped == 0 && self.adjusted == 0
    }
}

/// A request to put an item centred at `pos`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub pos: f64,
    pub width: f64,
    /// When set, the width is never shrunk to fit.
    pub fixed_width: bool,
}

impl From<&WallItem> for PlacementRequest {
    fn from(item: &WallItem) -> Self {
        Self {
            pos: item.pos,
            width: item.width,
            fixed_width: item.fixed_width,
        }
    }
}

/// Where an item ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pos: f64,
    pub width: f64,
}

/// Which end of a wall stayed put while its length changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    /// The start node stayed put; positions are kept as they are.
    Start,
    /// The end node stayed put; positions follow the moved start node.
    End,
}

/// The part of a wall an item may occupy, or `None` if nothing fits.
pub fn usable_span(length: f64, thickness: f64, config: &PlacementConfig) -> Option<Span> {
    let margin = thickness / 2.0 + config.edge_margin;
    let span = Span {
        start: margin,
        end: length - margin,
    };
    (span.len() > 0.0 && span.len().is_finite()).then_some(span)
}

/// Maximal free spans of a wall given the intervals already occupied.
///
/// Each occupied interval is widened by half the minimum gap; the side of a
/// free span that touches an item gives up the other half, so an item placed
/// in the span keeps the full gap to its neighbour. Wall ends only impose the
/// edge margin.
pub fn free_spans(
    length: f64,
    thickness: f64,
    occupied: &[(f64, f64)],
    config: &PlacementConfig,
) -> Vec<Span> {
    let Some(usable) = usable_span(length, thickness, config) else {
        return Vec::new();
    };
    let half_gap = config.min_gap.max(0.0) / 2.0;

    let mut blocked: Vec<(f64, f64)> = occupied
        .iter()
        .map(|&(lo, hi)| (lo - half_gap, hi + half_gap))
        .collect();
    blocked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut spans = Vec::new();
    let mut cursor = usable.start;
    let mut after_item = false;

    for (lo, hi) in blocked {
        if hi <= cursor {
            continue;
        }
        if lo >= usable.end {
            break;
        }
        let start = if after_item { cursor + half_gap } else { cursor };
        let end = lo - half_gap;
        if end > start {
            spans.push(Span { start, end });
        }
        cursor = hi;
        after_item = true;
    }

    let start = if after_item { cursor + half_gap } else { cursor };
    if usable.end > start {
        spans.push(Span {
            start,
            end: usable.end,
        });
    }

    spans
}

/// Finds the nearest legal placement for an item on a wall.
///
/// `others` are the items already on the wall (not including the one being
/// placed). The free span containing the requested centre is used, or the
/// nearest one if the centre is blocked; ties go to the span nearer the
/// wall's start. Returns `None` when the item cannot be fitted.
pub fn place(
    length: f64,
    thickness: f64,
    others: &[WallItem],
    request: &PlacementRequest,
    config: &PlacementConfig,
) -> Option<Placement> {
    if !(request.width > 0.0 && request.width.is_finite() && request.pos.is_finite()) {
        return None;
    }

    let occupied: Vec<(f64, f64)> = others.iter().map(WallItem::interval).collect();
    let spans = free_spans(length, thickness, &occupied, config);

    let span = spans
        .iter()
        .copied()
        .min_by(|a, b| a.distance_to(request.pos).total_cmp(&b.distance_to(request.pos)))?;

    if request.width <= span.len() + FIT_EPSILON {
        let half = request.width / 2.0;
        let lo = span.start + half;
        let hi = (span.end - half).max(lo);
        return Some(Placement {
            pos: request.pos.clamp(lo, hi),
            width: request.width,
        });
    }

    if !request.fixed_width && span.len() >= config.min_item_width {
        // Same bounds as the fit branch, so a shrunk item re-places to itself.
        let width = span.len();
        return Some(Placement {
            pos: span.start + width / 2.0,
            width,
        });
    }

    None
}

/// Re-places every item against the ones already accepted, in `pos` order.
///
/// Items that still fit keep their position (clamped if needed); the rest
/// are removed.
pub fn refit(
    items: &mut Vec<WallItem>,
    length: f64,
    thickness: f64,
    config: &PlacementConfig,
) -> Refit {
    items.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    let before = items.len();
    let mut adjusted = 0;

    let mut accepted: Vec<WallItem> = Vec::with_capacity(before);
    for item in items.drain(..) {
        if let Some(p) = place(length, thickness, &accepted, &PlacementRequest::from(&item), config) {
            if p.pos != item.pos || p.width != item.width {
                adjusted += 1;
            }
            accepted.push(WallItem {
                pos: p.pos,
                width: p.width,
                ..item
            });
        }
    }
    accepted.sort_by(|a, b| a.pos.total_cmp(&b.pos));

    *items = accepted;
    Refit {
        dropped: before - items.len(),
        adjusted,
    }
}

/// Shifts item positions after a wall changed length so that each keeps its
/// distance from the stationary endpoint.
pub fn shift_for_resize(
    items: &mut [WallItem],
    old_length: f64,
    new_length: f64,
    anchor: ResizeAnchor,
) {
    if anchor == ResizeAnchor::End {
        let delta = new_length - old_length;
        for item in items.iter_mut() {
            item.pos += delta;
        }
    }
}

impl WallGraph {
    fn wall_dims(&self, wall: WallKey) -> Result<(f64, f64)> {
        let thickness = self
            .walls
            .get(wall)
            .ok_or(Error::WallNotFound(wall))?
            .thickness;
        let length = self.wall_length(wall).ok_or(Error::WallNotFound(wall))?;
        Ok((length, thickness))
    }

    /// Places a new item on a wall.
    ///
    /// Returns `Ok(None)` when the wall has no room for it.
    pub fn place_item(
        &mut self,
        wall: WallKey,
        kind: ItemKind,
        request: &PlacementRequest,
        config: &PlacementConfig,
    ) -> Result<Option<WallItem>> {
        let (length, thickness) = self.wall_dims(wall)?;
        let target = &mut self.walls[wall];

        let Some(p) = place(length, thickness, &target.items, request, config) else {
            tracing::debug!(?wall, %kind, pos = request.pos, width = request.width, "placement refused");
            return Ok(None);
        };

        let item = WallItem {
            kind,
            pos: p.pos,
            width: p.width,
            fixed_width: request.fixed_width,
        };
        target.items.push(item);
        target.sort_items();
        Ok(Some(item))
    }

    /// Drags an existing item towards `pos`.
    ///
    /// Returns `Ok(None)` and leaves the item untouched when it cannot be
    /// placed near the requested position.
    pub fn move_item(
        &mut self,
        wall: WallKey,
        index: usize,
        pos: f64,
        config: &PlacementConfig,
    ) -> Result<Option<WallItem>> {
        let (length, thickness) = self.wall_dims(wall)?;
        let target = &mut self.walls[wall];
        if index >= target.items.len() {
            return Err(Error::ItemNotFound { wall, index });
        }

        let item = target.items.remove(index);
        let request = PlacementRequest {
            pos,
            ..PlacementRequest::from(&item)
        };
        let moved = place(length, thickness, &target.items, &request, config).map(|p| WallItem {
            pos: p.pos,
            width: p.width,
            ..item
        });

        target.items.push(moved.unwrap_or(item));
        target.sort_items();
        Ok(moved)
    }

    /// Removes an item from a wall.
    pub fn remove_item(&mut self, wall: WallKey, index: usize) -> Result<WallItem> {
        let target = self.walls.get_mut(wall).ok_or(Error::WallNotFound(wall))?;
        if index >= target.items.len() {
            return Err(Error::ItemNotFound { wall, index });
        }
        Ok(target.items.remove(index))
    }

    /// Re-clamps a wall's items after its length changed from `old_length`.
    ///
    /// Returns the number of items that no longer fit and were removed.
    pub fn resize_wall_items(
        &mut self,
        wall: WallKey,
        old_length: f64,
        anchor: ResizeAnchor,
        config: &PlacementConfig,
    ) -> Result<usize> {
        let (length, thickness) = self.wall_dims(wall)?;
        let items = &mut self.walls[wall].items;
        shift_for_resize(items, old_length, length, anchor);
        Ok(refit(items, length, thickness, config).dropped)
    }

    /// Changes a wall's thickness and refits its items to the new usable span.
    ///
    /// Non-positive thickness is rejected with `Ok(None)`; otherwise returns
    /// the number of items that no longer fit and were removed.
    pub fn set_wall_thickness(
        &mut self,
        wall: WallKey,
        thickness: f64,
        config: &PlacementConfig,
    ) -> Result<Option<usize>> {
        let (length, _) = self.wall_dims(wall)?;
        if !(thickness > 0.0 && thickness.is_finite()) {
            return Ok(None);
        }
        let target = &mut self.walls[wall];
        target.thickness = thickness;
        Ok(Some(refit(&mut target.items, length, thickness, config).dropped))
    }
}
