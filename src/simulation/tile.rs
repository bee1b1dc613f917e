//! Map tiles and the elements stacked on them

use super::types::{IndustryId, MapPos3, ObjectId, StationId, TilePos, MAP_COLUMNS, MAP_ROWS};

/// Kind of station part placed on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationType {
    Train,
    Road,
    Airport,
    Docks,
}

/// A piece of a station
#[derive(Debug, Clone)]
pub struct StationElement {
    pub station_id: StationId,
    pub station_type: StationType,
    pub object_id: ObjectId,
    /// Quarter turns applied to the part's footprint
    pub rotation: u8,
    /// Set while the part is being demolished
    pub being_removed: bool,
}

/// A tile of an industry
#[derive(Debug, Clone)]
pub struct IndustryElement {
    pub industry_id: IndustryId,
}

/// A tile of a town building
#[derive(Debug, Clone)]
pub struct BuildingElement {
    pub object_id: ObjectId,
    /// Which corner of a 2x2 building this tile is (0..=3)
    pub multi_tile_index: u8,
    /// Building is still a scaffold and does not take part in cargo searches
    pub scaffolding: bool,
    /// Building is linked into the station catchment bookkeeping
    pub station_linked: bool,
}

/// What a tile element is
#[derive(Debug, Clone)]
pub enum ElementKind {
    Surface,
    Industry(IndustryElement),
    Building(BuildingElement),
    Station(StationElement),
    Other,
}

/// One element in a tile's stack
#[derive(Debug, Clone)]
pub struct TileElement {
    pub base_z: u8,
    /// Placement preview that is not really built yet
    pub ghost: bool,
    pub kind: ElementKind,
}

impl TileElement {
    pub fn new(base_z: u8, kind: ElementKind) -> Self {
        Self {
            base_z,
            ghost: false,
            kind,
        }
    }

    pub fn as_industry(&self) -> Option<&IndustryElement> {
        match &self.kind {
            ElementKind::Industry(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_building(&self) -> Option<&BuildingElement> {
        match &self.kind {
            ElementKind::Building(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_station(&self) -> Option<&StationElement> {
        match &self.kind {
            ElementKind::Station(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_station_mut(&mut self) -> Option<&mut StationElement> {
        match &mut self.kind {
            ElementKind::Station(el) => Some(el),
            _ => None,
        }
    }
}

/// Tile grid holding an ordered element stack per tile
#[derive(Debug, Clone)]
pub struct TileMap {
    columns: i32,
    rows: i32,
    tiles: Vec<Vec<TileElement>>,
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(MAP_COLUMNS, MAP_ROWS)
    }
}

impl TileMap {
    pub fn new(columns: i32, rows: i32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            tiles: vec![Vec::new(); columns as usize * rows as usize],
        }
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.columns && pos.y < self.rows
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        if self.contains(pos) {
            Some((pos.y * self.columns + pos.x) as usize)
        } else {
            None
        }
    }

    /// Elements on a tile, bottom first; empty outside the map
    pub fn get(&self, pos: TilePos) -> &[TileElement] {
        match self.index(pos) {
            Some(index) => &self.tiles[index],
            None => &[],
        }
    }

    pub fn get_mut(&mut self, pos: TilePos) -> Option<&mut Vec<TileElement>> {
        let index = self.index(pos)?;
        Some(&mut self.tiles[index])
    }

    /// Push an element on top of a tile; returns false outside the map
    pub fn insert(&mut self, pos: TilePos, element: TileElement) -> bool {
        match self.get_mut(pos) {
            Some(tile) => {
                tile.push(element);
                true
            }
            None => false,
        }
    }

    /// Station element a station part refers to.
    ///
    /// The first station element at the part's level wins; if it is being
    /// removed the part is treated as missing.
    pub fn station_element(&self, pos: MapPos3) -> Option<&StationElement> {
        let base_z = pos.base_z();
        for element in self.get(pos.xy().into()) {
            let Some(station) = element.as_station() else {
                continue;
            };
            if element.base_z != base_z {
                continue;
            }
            if station.being_removed {
                return None;
            }
            return Some(station);
        }
        None
    }

    /// Drop every station element at the part's level
    pub fn remove_station_elements(&mut self, pos: MapPos3) {
        let base_z = pos.base_z();
        if let Some(tile) = self.get_mut(pos.xy().into()) {
            tile.retain(|el| !(el.as_station().is_some() && el.base_z == base_z));
        }
    }
}
