//! Catchment flag grid and catchment region calculation
//!
//! The workspace is one byte per tile where each bit is an independent flag.
//! It is scratch state: a search resets the bits it uses before flagging, and
//! two searches must never share a flag bit at the same time.

use log::trace;

use super::objects::ObjectManager;
use super::station::Station;
use super::tile::{StationElement, StationType, TileMap};
use super::types::{MapPos, MapPos3, TilePos, TileRect, CATCHMENT_SIZE};

/// Bit index used inside the catchment workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatchmentFlag(u8);

impl CatchmentFlag {
    /// Highlight shown by the station window
    pub const DISPLAY: CatchmentFlag = CatchmentFlag(0);
    /// Tiles still to be visited by the acceptance scan
    pub const ACCEPTANCE: CatchmentFlag = CatchmentFlag(1);

    pub fn new(bit: u8) -> Option<Self> {
        (bit < 8).then_some(Self(bit))
    }

    pub fn bit(self) -> u8 {
        self.0
    }

    fn mask(self) -> u8 {
        1 << self.0
    }
}

/// Per-tile flag bytes covering a whole map.
///
/// Single tile accessors do not clamp; coordinates outside the map panic.
#[derive(Debug, Clone)]
pub struct CatchmentWorkspace {
    columns: i32,
    rows: i32,
    flags: Vec<u8>,
}

impl CatchmentWorkspace {
    pub fn new(columns: i32, rows: i32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            flags: vec![0; columns as usize * rows as usize],
        }
    }

    pub fn for_map(map: &TileMap) -> Self {
        Self::new(map.columns(), map.rows())
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    fn index(&self, x: i32, y: i32) -> usize {
        debug_assert!(x >= 0 && x < self.columns && y >= 0 && y < self.rows);
        (y * self.columns + x) as usize
    }

    pub fn has(&self, x: i32, y: i32, flag: CatchmentFlag) -> bool {
        self.flags[self.index(x, y)] & flag.mask() != 0
    }

    pub fn set(&mut self, x: i32, y: i32, flag: CatchmentFlag) {
        let index = self.index(x, y);
        self.flags[index] |= flag.mask();
    }

    pub fn reset(&mut self, x: i32, y: i32, flag: CatchmentFlag) {
        let index = self.index(x, y);
        self.flags[index] &= !flag.mask();
    }

    /// Set `flag` on a `width` x `height` block starting at (x, y)
    pub fn set_region(&mut self, x: i32, y: i32, width: i32, height: i32, flag: CatchmentFlag) {
        for ty in y..y + height {
            for tx in x..x + width {
                self.set(tx, ty, flag);
            }
        }
    }

    /// Clear `flag` on a `width` x `height` block starting at (x, y)
    pub fn reset_region(&mut self, x: i32, y: i32, width: i32, height: i32, flag: CatchmentFlag) {
        for ty in y..y + height {
            for tx in x..x + width {
                self.reset(tx, ty, flag);
            }
        }
    }

    /// Clear `flag` everywhere
    pub fn reset_all(&mut self, flag: CatchmentFlag) {
        self.reset_region(0, 0, self.columns, self.rows, flag);
    }

    /// Tiles carrying `flag`, row by row
    pub fn flagged_tiles(&self, flag: CatchmentFlag) -> Vec<TilePos> {
        let mut tiles = Vec::new();
        for y in 0..self.rows {
            for x in 0..self.columns {
                if self.has(x, y, flag) {
                    tiles.push(TilePos::new(x, y));
                }
            }
        }
        tiles
    }
}

/// Clamp a region into the workspace and flag it; returns what was flagged
pub fn set_catchment_region(
    workspace: &mut CatchmentWorkspace,
    region: TileRect,
    flag: CatchmentFlag,
) -> TileRect {
    let max_x = workspace.columns() - 1;
    let max_y = workspace.rows() - 1;
    let clamped = TileRect::new(
        TilePos::new(region.min.x.clamp(0, max_x), region.min.y.clamp(0, max_y)),
        TilePos::new(region.max.x.clamp(0, max_x), region.max.y.clamp(0, max_y)),
    );

    workspace.set_region(
        clamped.min.x,
        clamped.min.y,
        clamped.width(),
        clamped.height(),
        flag,
    );
    clamped
}

fn with_margin(min: TilePos, max: TilePos) -> TileRect {
    TileRect::new(
        min.offset(-CATCHMENT_SIZE, -CATCHMENT_SIZE),
        max.offset(CATCHMENT_SIZE, CATCHMENT_SIZE),
    )
}

/// Unclamped catchment of one station part.
///
/// Returns `None` for an airport whose object definition is missing.
pub fn station_part_catchment(
    element: &StationElement,
    pos: MapPos3,
    objects: &ObjectManager,
) -> Option<TileRect> {
    let origin = TilePos::from(pos.xy());
    match element.station_type {
        StationType::Airport => {
            let airport = objects.airport(element.object_id)?;
            let mut min = MapPos::new(airport.min_x, airport.min_y).rotate(element.rotation) + pos.xy();
            let mut max = MapPos::new(airport.max_x, airport.max_y).rotate(element.rotation) + pos.xy();
            if min.x > max.x {
                std::mem::swap(&mut min.x, &mut max.x);
            }
            if min.y > max.y {
                std::mem::swap(&mut min.y, &mut max.y);
            }
            Some(with_margin(min.into(), max.into()))
        }
        // Docks are always 2x2
        StationType::Docks => Some(with_margin(origin, origin.offset(1, 1))),
        StationType::Train | StationType::Road => Some(with_margin(origin, origin)),
    }
}

/// Catchment around a bare location, used when previewing a placement
pub fn location_catchment(pos: MapPos) -> TileRect {
    let tile = TilePos::from(pos);
    with_margin(tile, tile)
}

/// Clear `flag` over the map and flag the catchment of every part of
/// `station`. Returns the bounds of everything flagged, if anything was.
pub fn flag_station_catchment(
    workspace: &mut CatchmentWorkspace,
    station: Option<&Station>,
    map: &TileMap,
    objects: &ObjectManager,
    flag: CatchmentFlag,
) -> Option<TileRect> {
    workspace.reset_all(flag);

    let station = station?;
    let mut bounds: Option<TileRect> = None;
    for &tile in station.tiles() {
        let pos = MapPos3::new(tile.x, tile.y, tile.z & !3);
        let Some(element) = map.station_element(pos) else {
            continue;
        };
        let Some(region) = station_part_catchment(element, pos, objects) else {
            continue;
        };

        let flagged = set_catchment_region(workspace, region, flag);
        trace!(
            "Station {:?} part at {:?} flags {:?}",
            station.id,
            pos,
            flagged
        );
        bounds = Some(match bounds {
            Some(bounds) => bounds.union(&flagged),
            None => flagged,
        });
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_outside_map_collapses_to_border() {
        let mut workspace = CatchmentWorkspace::new(16, 16);
        let region = TileRect::new(TilePos::new(-20, -20), TilePos::new(-10, -10));
        let flagged = set_catchment_region(&mut workspace, region, CatchmentFlag::ACCEPTANCE);
        assert_eq!(flagged, TileRect::new(TilePos::new(0, 0), TilePos::new(0, 0)));
        assert_eq!(
            workspace.flagged_tiles(CatchmentFlag::ACCEPTANCE),
            vec![TilePos::new(0, 0)]
        );
    }

    #[test]
    fn flags_are_independent_bits() {
        let mut workspace = CatchmentWorkspace::new(8, 8);
        workspace.set_region(1, 1, 2, 2, CatchmentFlag::DISPLAY);
        workspace.set(1, 1, CatchmentFlag::ACCEPTANCE);
        workspace.reset_all(CatchmentFlag::DISPLAY);
        assert!(!workspace.has(1, 1, CatchmentFlag::DISPLAY));
        assert!(workspace.has(1, 1, CatchmentFlag::ACCEPTANCE));
    }
}
