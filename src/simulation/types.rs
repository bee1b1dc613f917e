//! Core types for the station simulation
//!
//! Identifiers, coordinates and the fixed limits shared by every module.

/// Side length of one tile in world units
pub const TILE_SIZE: i32 = 32;

/// Default number of tile columns on a map
pub const MAP_COLUMNS: i32 = 384;

/// Default number of tile rows on a map
pub const MAP_ROWS: i32 = 384;

/// Largest map side accepted from a scenario
pub const MAX_MAP_SIZE: i32 = MAP_COLUMNS * 4;

/// Number of cargo types a station keeps statistics for
pub const MAX_CARGO_STATS: usize = 32;

/// Maximum number of stations in the world
pub const MAX_STATIONS: usize = 1024;

/// Maximum number of parts a single station can own
pub const MAX_STATION_TILES: usize = 80;

/// Maximum number of industries in the world
pub const MAX_INDUSTRIES: usize = 128;

/// Tiles of margin added around a station part footprint
pub const CATCHMENT_SIZE: i32 = 4;

/// Lowest possible cargo rating
pub const MIN_CARGO_RATING: u8 = 0;

/// Highest possible cargo rating
pub const MAX_CARGO_RATING: u8 = 200;

/// Cargo bitmask with every cargo type set
pub const ALL_CARGO: u32 = !0;

/// A cargo type id, always below [`MAX_CARGO_STATS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CargoId(u8);

impl CargoId {
    /// Returns `None` when the id does not fit the cargo tables
    pub fn new(id: u8) -> Option<Self> {
        if (id as usize) < MAX_CARGO_STATS {
            Some(Self(id))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Single bit for this cargo inside a cargo bitmask
    pub fn mask(self) -> u32 {
        1 << self.0
    }

    pub fn all() -> impl Iterator<Item = CargoId> {
        (0..MAX_CARGO_STATS as u8).map(CargoId)
    }
}

/// A wrapper type for station IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(pub u16);

impl StationId {
    /// Sentinel used for "no station"
    pub const NULL: StationId = StationId(u16::MAX);

    /// Resolves a station table index, falling back to [`StationId::NULL`]
    /// for indices past the end of the table
    pub fn from_index(index: usize) -> Self {
        if index >= MAX_STATIONS {
            Self::NULL
        } else {
            Self(index as u16)
        }
    }

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A wrapper type for industry IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndustryId(pub u8);

impl IndustryId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A wrapper type for company IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompanyId(pub u8);

/// Index of an object definition inside its object table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u16);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A position in world units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapPos {
    pub x: i32,
    pub y: i32,
}

impl MapPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rotate around the origin in quarter turns (only the low two bits count)
    pub fn rotate(self, rotation: u8) -> MapPos {
        match rotation & 3 {
            0 => self,
            1 => MapPos::new(self.y, -self.x),
            2 => MapPos::new(-self.x, -self.y),
            _ => MapPos::new(-self.y, self.x),
        }
    }
}

impl std::ops::Add for MapPos {
    type Output = MapPos;

    fn add(self, other: MapPos) -> MapPos {
        MapPos::new(self.x + other.x, self.y + other.y)
    }
}

impl From<TilePos> for MapPos {
    fn from(tile: TilePos) -> Self {
        MapPos::new(tile.x * TILE_SIZE, tile.y * TILE_SIZE)
    }
}

/// A world position with a height, as recorded for station parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapPos3 {
    pub x: i32,
    pub y: i32,
    /// Height in small units; four of them make one element level
    pub z: i32,
}

impl MapPos3 {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn xy(&self) -> MapPos {
        MapPos::new(self.x, self.y)
    }

    /// Element level the position refers to
    pub fn base_z(&self) -> u8 {
        (self.z / 4).clamp(0, u8::MAX as i32) as u8
    }
}

/// A position in tile units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> TilePos {
        TilePos::new(self.x + dx, self.y + dy)
    }
}

impl From<MapPos> for TilePos {
    fn from(pos: MapPos) -> Self {
        TilePos::new(pos.x.div_euclid(TILE_SIZE), pos.y.div_euclid(TILE_SIZE))
    }
}

/// Inclusive rectangle of tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub min: TilePos,
    pub max: TilePos,
}

impl TileRect {
    pub fn new(min: TilePos, max: TilePos) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &TileRect) -> TileRect {
        TileRect::new(
            TilePos::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            TilePos::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }
}
