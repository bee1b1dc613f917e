//! Standalone station simulation module
//!
//! This module contains the station cargo acceptance and rating logic. It
//! has no dependency on any rendering or input layer; windows, news messages
//! and randomness are reached through small traits so the logic can be run
//! and tested headless.

mod cargo_search;
mod catchment;
mod company;
mod industry;
mod messages;
mod objects;
mod rng;
mod station;
mod tile;
mod types;
mod window;
mod world;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
#[allow(unused_imports)]
pub use cargo_search::{
    compute_accepted_cargo, CargoSearchState, CatchmentPreview, SearchContext,
    ACCEPTANCE_THRESHOLD, INDUSTRY_REQUIRED_SCORE,
};
#[allow(unused_imports)]
pub use catchment::{
    flag_station_catchment, location_catchment, set_catchment_region, station_part_catchment,
    CatchmentFlag, CatchmentWorkspace,
};
#[allow(unused_imports)]
pub use company::Companies;
#[allow(unused_imports)]
pub use industry::{Industry, IndustryManager};
#[allow(unused_imports)]
pub use messages::{Message, MessageManager, MessageSink, MessageType};
#[allow(unused_imports)]
pub use objects::{
    AirportObject, BuildingObject, CargoObject, IndustryObject, ObjectManager, RoadStationObject,
    BUILDING_LARGE_TILE, ROAD_STATION_FREIGHT, ROAD_STATION_PASSENGER,
};
#[allow(unused_imports)]
pub use rng::{RandomSource, SimRng};
#[allow(unused_imports)]
pub use station::{
    CargoStat, Station, GOOD_CARGO_RATING, INITIAL_CARGO_RATING, POOR_CARGO_RATING,
    STATION_FLAG_DROPOFF, STATION_FLAG_PICKUP,
};
#[allow(unused_imports)]
pub use tile::{
    BuildingElement, ElementKind, IndustryElement, StationElement, StationType, TileElement,
    TileMap,
};
#[allow(unused_imports)]
pub use types::{
    CargoId, CompanyId, IndustryId, MapPos, MapPos3, ObjectId, StationId, TilePos, TileRect,
    ALL_CARGO, CATCHMENT_SIZE, MAP_COLUMNS, MAP_ROWS, MAX_CARGO_RATING, MAX_CARGO_STATS,
    MAX_MAP_SIZE,
    MAX_INDUSTRIES, MAX_STATIONS, MAX_STATION_TILES, MIN_CARGO_RATING, TILE_SIZE,
};
#[allow(unused_imports)]
pub use window::{Invalidation, StationInvalidation, StationTab, WindowManager};
pub use world::{SimWorld, StationPart};
