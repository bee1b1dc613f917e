//! Static object definitions
//!
//! Industries, buildings, airports, road stations and cargo are all described
//! by read-only object records. Tile elements refer to them by [`ObjectId`];
//! a lookup for an unknown id yields `None` and the caller skips that element.

use anyhow::{Context, Result};

use super::types::{CargoId, ObjectId};

/// Describes a kind of cargo
#[derive(Debug, Clone)]
pub struct CargoObject {
    pub name: String,
    pub unit_singular: String,
    pub unit_plural: String,
}

/// Describes an industry type
#[derive(Debug, Clone)]
pub struct IndustryObject {
    pub name: String,
    /// Cargo the industry accepts
    pub required_cargo: [Option<CargoId>; 3],
    /// Cargo the industry produces
    pub produced_cargo: [Option<CargoId>; 2],
    /// Footprint in tiles (width, height)
    pub footprint: (u8, u8),
}

/// Building occupies a 2x2 tile footprint
pub const BUILDING_LARGE_TILE: u32 = 1 << 0;

/// Describes a town building type
#[derive(Debug, Clone)]
pub struct BuildingObject {
    pub name: String,
    pub flags: u32,
    /// Cargo generated by the building
    pub produced_cargo: [Option<CargoId>; 2],
    /// Acceptance score added for each produced cargo slot
    pub produced_score: [u8; 2],
    /// Whether the produced slot also counts as produced near a station
    pub produced_near_station: [bool; 2],
    /// Cargo the building takes in
    pub required_cargo: [Option<CargoId>; 2],
    /// Acceptance score added for each required cargo slot
    pub required_score: [u8; 2],
}

impl BuildingObject {
    pub fn is_large_tile(&self) -> bool {
        self.flags & BUILDING_LARGE_TILE != 0
    }
}

/// Describes an airport layout; bounds are in world units relative to the
/// airport origin, before rotation
#[derive(Debug, Clone)]
pub struct AirportObject {
    pub name: String,
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

/// Road station serves passengers
pub const ROAD_STATION_PASSENGER: u32 = 1 << 0;
/// Road station serves freight
pub const ROAD_STATION_FREIGHT: u32 = 1 << 1;

/// Describes a road stop type
#[derive(Debug, Clone)]
pub struct RoadStationObject {
    pub name: String,
    pub flags: u32,
    /// Cargo the passenger/freight distinction is made against
    pub cargo: CargoId,
}

impl RoadStationObject {
    pub fn is_passenger(&self) -> bool {
        self.flags & ROAD_STATION_PASSENGER != 0
    }

    pub fn is_freight(&self) -> bool {
        self.flags & ROAD_STATION_FREIGHT != 0
    }
}

/// Owns every loaded object definition
#[derive(Debug, Clone, Default)]
pub struct ObjectManager {
    cargo: Vec<CargoObject>,
    industries: Vec<IndustryObject>,
    buildings: Vec<BuildingObject>,
    airports: Vec<AirportObject>,
    road_stations: Vec<RoadStationObject>,
}

fn next_object_id(len: usize, kind: &str) -> Result<ObjectId> {
    let id = u16::try_from(len).with_context(|| format!("Too many {kind} objects"))?;
    Ok(ObjectId(id))
}

impl ObjectManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cargo object; its object id doubles as its cargo id
    pub fn add_cargo(&mut self, object: CargoObject) -> Result<CargoId> {
        let id = u8::try_from(self.cargo.len())
            .ok()
            .and_then(CargoId::new)
            .context("Cargo table is full")?;
        self.cargo.push(object);
        Ok(id)
    }

    pub fn add_industry(&mut self, object: IndustryObject) -> Result<ObjectId> {
        let id = next_object_id(self.industries.len(), "industry")?;
        self.industries.push(object);
        Ok(id)
    }

    pub fn add_building(&mut self, object: BuildingObject) -> Result<ObjectId> {
        let id = next_object_id(self.buildings.len(), "building")?;
        self.buildings.push(object);
        Ok(id)
    }

    pub fn add_airport(&mut self, object: AirportObject) -> Result<ObjectId> {
        let id = next_object_id(self.airports.len(), "airport")?;
        self.airports.push(object);
        Ok(id)
    }

    pub fn add_road_station(&mut self, object: RoadStationObject) -> Result<ObjectId> {
        let id = next_object_id(self.road_stations.len(), "road station")?;
        self.road_stations.push(object);
        Ok(id)
    }

    pub fn cargo(&self, id: CargoId) -> Option<&CargoObject> {
        self.cargo.get(id.index())
    }

    pub fn cargo_count(&self) -> usize {
        self.cargo.len()
    }

    pub fn industry(&self, id: ObjectId) -> Option<&IndustryObject> {
        self.industries.get(id.index())
    }

    pub fn building(&self, id: ObjectId) -> Option<&BuildingObject> {
        self.buildings.get(id.index())
    }

    pub fn airport(&self, id: ObjectId) -> Option<&AirportObject> {
        self.airports.get(id.index())
    }

    pub fn road_station(&self, id: ObjectId) -> Option<&RoadStationObject> {
        self.road_stations.get(id.index())
    }
}
