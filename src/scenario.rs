//! Scenario files
//!
//! A scenario is a JSON document describing the map, the object definitions
//! and what is placed on the map. Object references are indices into the
//! scenario's own object lists.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::warn;
use serde::Deserialize;

use crate::simulation::{
    AirportObject, BuildingObject, CargoId, CargoObject, CompanyId, Companies, IndustryObject,
    ObjectId, RoadStationObject, SimWorld, StationId, StationPart, TilePos, BUILDING_LARGE_TILE,
    MAP_COLUMNS, MAP_ROWS, MAX_MAP_SIZE, ROAD_STATION_FREIGHT, ROAD_STATION_PASSENGER,
};

fn default_columns() -> i32 {
    MAP_COLUMNS
}

fn default_rows() -> i32 {
    MAP_ROWS
}

fn default_footprint() -> u8 {
    1
}

/// Whole scenario document
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_columns")]
    pub columns: i32,
    #[serde(default = "default_rows")]
    pub rows: i32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub controlling_company: u8,
    /// Companies besides the controlling one that are played by humans
    #[serde(default)]
    pub human_companies: Vec<u8>,
    #[serde(default)]
    pub cargo: Vec<CargoDef>,
    #[serde(default)]
    pub industry_types: Vec<IndustryDef>,
    #[serde(default)]
    pub building_types: Vec<BuildingDef>,
    #[serde(default)]
    pub airport_types: Vec<AirportDef>,
    #[serde(default)]
    pub road_station_types: Vec<RoadStationDef>,
    #[serde(default)]
    pub industries: Vec<Placement>,
    #[serde(default)]
    pub buildings: Vec<Placement>,
    #[serde(default)]
    pub stations: Vec<StationDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CargoDef {
    pub name: String,
    pub singular: String,
    pub plural: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndustryDef {
    pub name: String,
    #[serde(default)]
    pub required: Vec<u8>,
    #[serde(default)]
    pub produced: Vec<u8>,
    #[serde(default = "default_footprint")]
    pub width: u8,
    #[serde(default = "default_footprint")]
    pub height: u8,
}

/// One cargo slot of a building
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotDef {
    pub cargo: u8,
    pub score: u8,
    #[serde(default)]
    pub near_station: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingDef {
    pub name: String,
    #[serde(default)]
    pub large: bool,
    #[serde(default)]
    pub produced: Vec<SlotDef>,
    #[serde(default)]
    pub required: Vec<SlotDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AirportDef {
    pub name: String,
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadStationKind {
    Passenger,
    Freight,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoadStationDef {
    pub name: String,
    pub kind: RoadStationKind,
    pub cargo: u8,
}

/// An object placed with its top-left tile at (x, y)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Placement {
    #[serde(rename = "type")]
    pub object: u16,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartDef {
    Train {
        x: i32,
        y: i32,
        #[serde(default)]
        z: u8,
    },
    Road {
        object: u16,
        x: i32,
        y: i32,
        #[serde(default)]
        z: u8,
    },
    Airport {
        object: u16,
        #[serde(default)]
        rotation: u8,
        x: i32,
        y: i32,
        #[serde(default)]
        z: u8,
    },
    Docks {
        x: i32,
        y: i32,
        #[serde(default)]
        z: u8,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitingDef {
    pub cargo: u8,
    pub quantity: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationDef {
    pub owner: u8,
    #[serde(default)]
    pub flags: u16,
    #[serde(default)]
    pub parts: Vec<PartDef>,
    #[serde(default)]
    pub waiting: Vec<WaitingDef>,
}

fn cargo_id(id: u8) -> Result<CargoId> {
    CargoId::new(id).with_context(|| format!("Cargo id {} is out of range", id))
}

/// Fill a fixed number of cargo slots from a list
fn cargo_slots<const N: usize>(ids: &[u8], what: &str) -> Result<[Option<CargoId>; N]> {
    if ids.len() > N {
        bail!("{} lists {} cargo types, at most {} allowed", what, ids.len(), N);
    }
    let mut slots = [None; N];
    for (slot, id) in slots.iter_mut().zip(ids) {
        *slot = Some(cargo_id(*id)?);
    }
    Ok(slots)
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid scenario JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Build a world from the scenario; `seed` overrides the scenario's seed
    pub fn build_world(&self, seed: Option<u64>) -> Result<SimWorld> {
        for (side, size) in [("columns", self.columns), ("rows", self.rows)] {
            if !(1..=MAX_MAP_SIZE).contains(&size) {
                bail!("Map {} {} is outside 1..={}", side, size, MAX_MAP_SIZE);
            }
        }

        let mut world = SimWorld::with_map_size(self.columns, self.rows, seed.or(self.seed));

        let mut companies = Companies::new(CompanyId(self.controlling_company));
        for company in &self.human_companies {
            companies.add_human(CompanyId(*company));
        }
        world.companies = companies;

        for cargo in &self.cargo {
            world.objects.add_cargo(CargoObject {
                name: cargo.name.clone(),
                unit_singular: cargo.singular.clone(),
                unit_plural: cargo.plural.clone(),
            })?;
        }

        for industry in &self.industry_types {
            world.objects.add_industry(IndustryObject {
                name: industry.name.clone(),
                required_cargo: cargo_slots(&industry.required, &industry.name)?,
                produced_cargo: cargo_slots(&industry.produced, &industry.name)?,
                footprint: (industry.width, industry.height),
            })?;
        }

        for building in &self.building_types {
            let mut object = BuildingObject {
                name: building.name.clone(),
                flags: if building.large { BUILDING_LARGE_TILE } else { 0 },
                produced_cargo: [None; 2],
                produced_score: [0; 2],
                produced_near_station: [false; 2],
                required_cargo: [None; 2],
                required_score: [0; 2],
            };
            if building.produced.len() > 2 || building.required.len() > 2 {
                bail!("{} has more than two cargo slots", building.name);
            }
            for (slot, def) in building.produced.iter().enumerate() {
                object.produced_cargo[slot] = Some(cargo_id(def.cargo)?);
                object.produced_score[slot] = def.score;
                object.produced_near_station[slot] = def.near_station;
            }
            for (slot, def) in building.required.iter().enumerate() {
                object.required_cargo[slot] = Some(cargo_id(def.cargo)?);
                object.required_score[slot] = def.score;
            }
            world.objects.add_building(object)?;
        }

        for airport in &self.airport_types {
            world.objects.add_airport(AirportObject {
                name: airport.name.clone(),
                min_x: airport.min_x,
                min_y: airport.min_y,
                max_x: airport.max_x,
                max_y: airport.max_y,
            })?;
        }

        for road_station in &self.road_station_types {
            world.objects.add_road_station(RoadStationObject {
                name: road_station.name.clone(),
                flags: match road_station.kind {
                    RoadStationKind::Passenger => ROAD_STATION_PASSENGER,
                    RoadStationKind::Freight => ROAD_STATION_FREIGHT,
                },
                cargo: cargo_id(road_station.cargo)?,
            })?;
        }

        for placement in &self.industries {
            world
                .add_industry(ObjectId(placement.object), TilePos::new(placement.x, placement.y))
                .with_context(|| format!("Placing industry at ({}, {})", placement.x, placement.y))?;
        }

        for placement in &self.buildings {
            world
                .add_building(ObjectId(placement.object), TilePos::new(placement.x, placement.y))
                .with_context(|| format!("Placing building at ({}, {})", placement.x, placement.y))?;
        }

        for (index, def) in self.stations.iter().enumerate() {
            self.build_station(&mut world, def)
                .with_context(|| format!("Building station #{}", index))?;
        }

        Ok(world)
    }

    fn build_station(&self, world: &mut SimWorld, def: &StationDef) -> Result<StationId> {
        let id = world.add_station(CompanyId(def.owner))?;

        for part in &def.parts {
            let (part, x, y, z) = match *part {
                PartDef::Train { x, y, z } => (StationPart::Train, x, y, z),
                PartDef::Docks { x, y, z } => (StationPart::Docks, x, y, z),
                PartDef::Road { object, x, y, z } => (
                    StationPart::Road {
                        object: ObjectId(object),
                    },
                    x,
                    y,
                    z,
                ),
                PartDef::Airport {
                    object,
                    rotation,
                    x,
                    y,
                    z,
                } => (
                    StationPart::Airport {
                        object: ObjectId(object),
                        rotation,
                    },
                    x,
                    y,
                    z,
                ),
            };
            world.add_station_part(id, part, TilePos::new(x, y), z)?;
        }

        let station = world.station_mut(id).context("Station vanished")?;
        station.flags = def.flags;
        for waiting in &def.waiting {
            let cargo = cargo_id(waiting.cargo)?;
            if cargo.index() >= self.cargo.len() {
                warn!(
                    "Station {:?} has waiting cargo {} with no cargo definition",
                    id, waiting.cargo
                );
            }
            station.add_waiting_cargo(cargo, waiting.quantity, id);
        }
        Ok(id)
    }
}
