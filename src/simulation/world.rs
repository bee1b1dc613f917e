//! Main simulation world that ties everything together
//!
//! Owns the map, object definitions, stations and the shared catchment
//! workspace, and exposes the station operations keyed by [`StationId`].

use anyhow::{bail, Context, Result};
use log::{debug, warn};

use super::cargo_search::{compute_accepted_cargo, CargoSearchState, CatchmentPreview, SearchContext};
use super::catchment::{flag_station_catchment, CatchmentFlag, CatchmentWorkspace};
use super::company::Companies;
use super::industry::IndustryManager;
use super::messages::MessageManager;
use super::objects::{
    AirportObject, BuildingObject, CargoObject, IndustryObject, ObjectManager, RoadStationObject,
    BUILDING_LARGE_TILE, ROAD_STATION_FREIGHT, ROAD_STATION_PASSENGER,
};
use super::rng::SimRng;
use super::station::Station;
use super::tile::{
    BuildingElement, ElementKind, IndustryElement, StationElement, StationType, TileElement,
    TileMap,
};
use super::types::{
    CargoId, CompanyId, IndustryId, MapPos, MapPos3, ObjectId, StationId, TilePos, TileRect,
    MAP_COLUMNS, MAP_ROWS, MAX_STATIONS,
};
use super::window::WindowManager;

/// Corners of a 2x2 building in multi-tile index order
const LARGE_BUILDING_TILES: [(i32, i32); 4] = [(0, 0), (0, 1), (1, 1), (1, 0)];

/// Kind of part to add to a station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationPart {
    Train,
    Road { object: ObjectId },
    Airport { object: ObjectId, rotation: u8 },
    Docks,
}

/// The main simulation world
pub struct SimWorld {
    pub map: TileMap,
    pub objects: ObjectManager,
    pub industries: IndustryManager,
    pub companies: Companies,

    /// Station table indexed by station id
    stations: Vec<Option<Station>>,

    /// Scratch flags shared by every catchment search
    workspace: CatchmentWorkspace,

    rng: SimRng,

    /// Messages posted for the player
    pub messages: MessageManager,

    /// Open windows and pending redraws
    pub windows: WindowManager,

    /// Number of completed ticks
    pub ticks: u64,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(columns: i32, rows: i32, rng: SimRng) -> Self {
        let map = TileMap::new(columns, rows);
        let workspace = CatchmentWorkspace::for_map(&map);
        Self {
            map,
            objects: ObjectManager::new(),
            industries: IndustryManager::new(),
            companies: Companies::default(),
            stations: Vec::new(),
            workspace,
            rng,
            messages: MessageManager::new(),
            windows: WindowManager::new(),
            ticks: 0,
        }
    }

    pub fn new() -> Self {
        Self::new_internal(MAP_COLUMNS, MAP_ROWS, SimRng::from_entropy())
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(seed: u64) -> Self {
        Self::new_internal(MAP_COLUMNS, MAP_ROWS, SimRng::from_seed(seed))
    }

    /// Create a world with a custom map size
    pub fn with_map_size(columns: i32, rows: i32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SimRng::from_seed(seed),
            None => SimRng::from_entropy(),
        };
        Self::new_internal(columns, rows, rng)
    }

    /// Read access to the catchment flags left by the last search
    pub fn workspace(&self) -> &CatchmentWorkspace {
        &self.workspace
    }

    /// Add an empty station owned by `owner`
    pub fn add_station(&mut self, owner: CompanyId) -> Result<StationId> {
        let index = match self.stations.iter().position(Option::is_none) {
            Some(index) => index,
            None => {
                self.stations.push(None);
                self.stations.len() - 1
            }
        };
        let id = StationId::from_index(index);
        if id.is_null() {
            self.stations.truncate(MAX_STATIONS);
            bail!("Station table is full");
        }
        self.stations[index] = Some(Station::new(id, owner));
        debug!("Created station {:?} for company {:?}", id, owner);
        Ok(id)
    }

    pub fn remove_station(&mut self, id: StationId) {
        let Some(station) = self.stations.get_mut(id.index()).and_then(Option::take) else {
            return;
        };
        for &pos in station.tiles() {
            self.map.remove_station_elements(pos);
        }
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.index()).and_then(Option::as_ref)
    }

    pub fn station_mut(&mut self, id: StationId) -> Option<&mut Station> {
        self.stations.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter().flatten()
    }

    /// Build a station part on `tile` at element level `base_z`
    pub fn add_station_part(
        &mut self,
        station_id: StationId,
        part: StationPart,
        tile: TilePos,
        base_z: u8,
    ) -> Result<()> {
        if !self.map.contains(tile) {
            bail!("Station part at {:?} is outside the map", tile);
        }
        let (station_type, object_id, rotation) = match part {
            StationPart::Train => (StationType::Train, ObjectId(0), 0),
            StationPart::Docks => (StationType::Docks, ObjectId(0), 0),
            StationPart::Road { object } => {
                self.objects
                    .road_station(object)
                    .with_context(|| format!("Unknown road station object {:?}", object))?;
                (StationType::Road, object, 0)
            }
            StationPart::Airport { object, rotation } => {
                self.objects
                    .airport(object)
                    .with_context(|| format!("Unknown airport object {:?}", object))?;
                (StationType::Airport, object, rotation & 3)
            }
        };

        let from = MapPos::from(tile);
        let pos = MapPos3::new(from.x, from.y, base_z as i32 * 4);
        let station = self
            .stations
            .get_mut(station_id.index())
            .and_then(Option::as_mut)
            .context("Station not found")?;
        station.add_tile(pos)?;

        let element = TileElement::new(
            base_z,
            ElementKind::Station(StationElement {
                station_id,
                station_type,
                object_id,
                rotation,
                being_removed: false,
            }),
        );
        self.map.insert(tile, element);
        Ok(())
    }

    /// Demolish a station part, leaving the rest of the station in place
    pub fn remove_station_part(&mut self, station_id: StationId, tile: TilePos, base_z: u8) {
        let from = MapPos::from(tile);
        let pos = MapPos3::new(from.x, from.y, base_z as i32 * 4);
        self.map.remove_station_elements(pos);
        if let Some(station) = self.station_mut(station_id) {
            station.remove_tile(pos);
        }
    }

    /// Place a finished industry with its top-left tile at `origin`
    pub fn add_industry(&mut self, object_id: ObjectId, origin: TilePos) -> Result<IndustryId> {
        let object = self
            .objects
            .industry(object_id)
            .with_context(|| format!("Unknown industry object {:?}", object_id))?;
        let (width, height) = object.footprint;
        let (width, height) = (width.max(1) as i32, height.max(1) as i32);

        let tiles: Vec<TilePos> = (0..height)
            .flat_map(|dy| (0..width).map(move |dx| origin.offset(dx, dy)))
            .collect();
        if let Some(outside) = tiles.iter().find(|tile| !self.map.contains(**tile)) {
            bail!("Industry tile {:?} is outside the map", outside);
        }

        let id = self.industries.add(object_id, origin)?;
        for tile in tiles {
            let element = TileElement::new(0, ElementKind::Industry(IndustryElement { industry_id: id }));
            self.map.insert(tile, element);
        }
        Ok(id)
    }

    /// Place a town building; large buildings take the 2x2 block from `origin`
    pub fn add_building(&mut self, object_id: ObjectId, origin: TilePos) -> Result<()> {
        let object = self
            .objects
            .building(object_id)
            .with_context(|| format!("Unknown building object {:?}", object_id))?;
        let corners: &[(i32, i32)] = if object.is_large_tile() {
            &LARGE_BUILDING_TILES
        } else {
            &LARGE_BUILDING_TILES[..1]
        };

        if let Some(outside) = corners
            .iter()
            .map(|(dx, dy)| origin.offset(*dx, *dy))
            .find(|tile| !self.map.contains(*tile))
        {
            bail!("Building tile {:?} is outside the map", outside);
        }

        for (index, (dx, dy)) in corners.iter().enumerate() {
            let element = TileElement::new(
                0,
                ElementKind::Building(BuildingElement {
                    object_id,
                    multi_tile_index: index as u8,
                    scaffolding: false,
                    station_linked: true,
                }),
            );
            self.map.insert(origin.offset(*dx, *dy), element);
        }
        Ok(())
    }

    /// Run a full acceptance search; `StationId::NULL` or an unknown id
    /// searches without a station
    pub fn search_cargo(
        &mut self,
        station_id: StationId,
        preview: Option<CatchmentPreview>,
    ) -> (u32, CargoSearchState) {
        let station = self.stations.get(station_id.index()).and_then(Option::as_ref);
        let ctx = SearchContext {
            map: &self.map,
            objects: &self.objects,
            industries: &self.industries,
        };
        let mut search = CargoSearchState::new();
        let accepted = compute_accepted_cargo(&mut search, &mut self.workspace, ctx, station, preview);
        (accepted, search)
    }

    /// Bitmask of cargo the station's catchment accepts
    pub fn compute_accepted_cargo(&mut self, station_id: StationId) -> u32 {
        self.search_cargo(station_id, None).0
    }

    /// Bitmask of cargo that would be accepted with an extra part at `location`
    pub fn preview_accepted_cargo(
        &mut self,
        station_id: StationId,
        location: MapPos,
        filter: u32,
    ) -> u32 {
        self.search_cargo(station_id, Some(CatchmentPreview { location, filter }))
            .0
    }

    /// Flag the station's catchment with `flag` for highlighting
    pub fn set_catchment_display(
        &mut self,
        station_id: StationId,
        flag: CatchmentFlag,
    ) -> Option<TileRect> {
        let station = self.stations.get(station_id.index()).and_then(Option::as_ref);
        flag_station_catchment(&mut self.workspace, station, &self.map, &self.objects, flag)
    }

    /// Tiles currently carrying `flag`
    pub fn catchment_tiles(&self, flag: CatchmentFlag) -> Vec<TilePos> {
        self.workspace.flagged_tiles(flag)
    }

    /// Recompute acceptance for a station and report what changed
    pub fn update_cargo_acceptance(&mut self, station_id: StationId) -> Option<u32> {
        let Self {
            map,
            objects,
            industries,
            companies,
            stations,
            workspace,
            messages,
            windows,
            ..
        } = self;
        let station = stations.get_mut(station_id.index()).and_then(Option::as_mut)?;
        let ctx = SearchContext {
            map,
            objects,
            industries,
        };
        Some(station.update_cargo_acceptance(workspace, ctx, companies, messages, windows))
    }

    /// Per-tick cargo ageing and rating update; true when a cargo is well served
    pub fn update_cargo_rating_and_decay(&mut self, station_id: StationId) -> bool {
        let Self {
            companies,
            stations,
            rng,
            windows,
            ..
        } = self;
        match stations.get_mut(station_id.index()).and_then(Option::as_mut) {
            Some(station) => station.update_cargo(companies, rng, windows),
            None => false,
        }
    }

    /// Main simulation tick; returns the stations with a well-served cargo
    pub fn tick(&mut self) -> Vec<StationId> {
        self.ticks += 1;

        let ids: Vec<StationId> = self.stations().map(|station| station.id).collect();
        let mut well_served = Vec::new();
        for id in ids {
            self.update_cargo_acceptance(id);
            if self.update_cargo_rating_and_decay(id) {
                well_served.push(id);
            }
        }
        well_served
    }

    /// Create a default test world with a town, some industries and stations
    pub fn create_test_world() -> Self {
        Self::build_test_world(SimWorld::with_map_size(64, 64, None))
    }

    /// Create a default test world with a seeded RNG for reproducible simulations
    pub fn create_test_world_with_seed(seed: u64) -> Self {
        Self::build_test_world(SimWorld::with_map_size(64, 64, Some(seed)))
    }

    /// Internal helper to build the test world structure
    pub fn build_test_world(mut world: SimWorld) -> Self {
        if let Err(err) = world.populate_test_world() {
            warn!("Test world incomplete: {:#}", err);
        }
        world
    }

    fn populate_test_world(&mut self) -> Result<()> {
        let cargo = |objects: &mut ObjectManager, name: &str, singular: &str, plural: &str| {
            objects.add_cargo(CargoObject {
                name: name.to_string(),
                unit_singular: singular.to_string(),
                unit_plural: plural.to_string(),
            })
        };
        let passengers = cargo(&mut self.objects, "Passengers", "passenger", "passengers")?;
        let mail = cargo(&mut self.objects, "Mail", "bag of mail", "bags of mail")?;
        let coal = cargo(&mut self.objects, "Coal", "tonne of coal", "tonnes of coal")?;
        let steel = cargo(&mut self.objects, "Steel", "tonne of steel", "tonnes of steel")?;
        let goods = cargo(&mut self.objects, "Goods", "crate of goods", "crates of goods")?;

        let coal_mine = self.objects.add_industry(IndustryObject {
            name: "Coal Mine".to_string(),
            required_cargo: [None; 3],
            produced_cargo: [Some(coal), None],
            footprint: (2, 2),
        })?;
        let steel_mill = self.objects.add_industry(IndustryObject {
            name: "Steel Mill".to_string(),
            required_cargo: [Some(coal), None, None],
            produced_cargo: [Some(steel), None],
            footprint: (3, 2),
        })?;
        let goods_factory = self.objects.add_industry(IndustryObject {
            name: "Goods Factory".to_string(),
            required_cargo: [Some(steel), None, None],
            produced_cargo: [Some(goods), None],
            footprint: (2, 2),
        })?;

        let house = self.objects.add_building(BuildingObject {
            name: "House".to_string(),
            flags: 0,
            produced_cargo: [Some(passengers), Some(mail)],
            produced_score: [4, 2],
            produced_near_station: [true, true],
            required_cargo: [None, None],
            required_score: [0, 0],
        })?;
        let office = self.objects.add_building(BuildingObject {
            name: "Office Block".to_string(),
            flags: BUILDING_LARGE_TILE,
            produced_cargo: [Some(passengers), Some(mail)],
            produced_score: [8, 8],
            produced_near_station: [true, true],
            required_cargo: [Some(goods), None],
            required_score: [4, 0],
        })?;

        let bus_stop = self.objects.add_road_station(RoadStationObject {
            name: "Bus Stop".to_string(),
            flags: ROAD_STATION_PASSENGER,
            cargo: passengers,
        })?;
        let truck_stop = self.objects.add_road_station(RoadStationObject {
            name: "Truck Stop".to_string(),
            flags: ROAD_STATION_FREIGHT,
            cargo: passengers,
        })?;
        let airport = self.objects.add_airport(AirportObject {
            name: "Small Airport".to_string(),
            min_x: -32,
            min_y: -32,
            max_x: 96,
            max_y: 64,
        })?;

        // Town in the middle of the map
        for (x, y) in [(28, 28), (30, 28), (28, 30), (33, 29)] {
            self.add_building(house, TilePos::new(x, y))?;
        }
        self.add_building(office, TilePos::new(30, 30))?;
        self.add_building(office, TilePos::new(26, 31))?;

        self.add_industry(coal_mine, TilePos::new(8, 10))?;
        self.add_industry(steel_mill, TilePos::new(14, 12))?;
        self.add_industry(goods_factory, TilePos::new(44, 40))?;

        let player = self.companies.controlling();
        let rival = CompanyId(1);

        let town_stop = self.add_station(player)?;
        self.add_station_part(town_stop, StationPart::Road { object: bus_stop }, TilePos::new(29, 29), 0)?;

        let mill_stop = self.add_station(player)?;
        self.add_station_part(mill_stop, StationPart::Road { object: truck_stop }, TilePos::new(13, 11), 0)?;

        let mine_station = self.add_station(rival)?;
        for x in 10..13 {
            self.add_station_part(mine_station, StationPart::Train, TilePos::new(x, 9), 0)?;
        }

        let harbour = self.add_station(player)?;
        self.add_station_part(harbour, StationPart::Docks, TilePos::new(46, 45), 0)?;

        let airfield = self.add_station(player)?;
        self.add_station_part(
            airfield,
            StationPart::Airport {
                object: airport,
                rotation: 1,
            },
            TilePos::new(36, 24),
            0,
        )?;

        let waiting = [
            (town_stop, passengers, 180),
            (town_stop, mail, 20),
            (mill_stop, steel, 450),
            (mine_station, coal, 900),
            (airfield, passengers, 60),
        ];
        for (station_id, cargo_id, amount) in waiting {
            if let Some(station) = self.station_mut(station_id) {
                station.add_waiting_cargo(cargo_id, amount, station_id);
            }
        }
        if let Some(station) = self.station_mut(town_stop) {
            station.record_pickup(passengers, 20, 0);
        }
        Ok(())
    }

    fn cargo_name(&self, cargo: CargoId) -> String {
        self.objects
            .cargo(cargo)
            .map(|object| object.name.clone())
            .unwrap_or_else(|| format!("cargo {}", cargo.index()))
    }

    fn describe_mask(&self, mask: u32) -> String {
        let names: Vec<String> = CargoId::all()
            .filter(|cargo| cargo.index() < self.objects.cargo_count() && mask & cargo.mask() != 0)
            .map(|cargo| self.cargo_name(cargo))
            .collect();
        if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        }
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Station Simulation Summary ===");
        println!("Tick: {}", self.ticks);
        println!(
            "Map: {}x{}, Industries: {}, Stations: {}",
            self.map.columns(),
            self.map.rows(),
            self.industries.len(),
            self.stations().count()
        );
        println!();

        println!("--- Stations ---");
        for station in self.stations() {
            println!(
                "  Station {:?} (company {:?}, {} parts): accepts {}",
                station.id.0,
                station.owner.0,
                station.tiles().len(),
                self.describe_mask(station.accepted_cargo())
            );
            println!("    {}", station.status_string(&self.objects));
            for cargo in CargoId::all() {
                let stat = station.cargo(cargo);
                if stat.is_empty() {
                    continue;
                }
                println!(
                    "    {}: waiting={}, rating={}, age={}",
                    self.cargo_name(cargo),
                    stat.quantity,
                    stat.rating,
                    stat.age
                );
            }
        }
        println!();
    }

    /// Draw the occupied part of the map in the terminal
    pub fn draw_map(&self) {
        let mut bounds: Option<TileRect> = None;
        for y in 0..self.map.rows() {
            for x in 0..self.map.columns() {
                let pos = TilePos::new(x, y);
                if self.map.get(pos).is_empty() && !self.workspace.has(x, y, CatchmentFlag::DISPLAY) {
                    continue;
                }
                let tile = TileRect::new(pos, pos);
                bounds = Some(match bounds {
                    Some(bounds) => bounds.union(&tile),
                    None => tile,
                });
            }
        }
        let Some(bounds) = bounds else {
            println!("(empty map)");
            return;
        };

        println!("\n=== World Map ===");
        println!("Legend: S=Station, I=Industry, B=Building, +=Catchment, .=Empty");
        println!();
        for y in bounds.min.y..=bounds.max.y {
            let line: String = (bounds.min.x..=bounds.max.x)
                .map(|x| {
                    let pos = TilePos::new(x, y);
                    let elements = self.map.get(pos);
                    if elements.iter().any(|el| el.as_station().is_some()) {
                        'S'
                    } else if elements.iter().any(|el| el.as_industry().is_some()) {
                        'I'
                    } else if elements.iter().any(|el| el.as_building().is_some()) {
                        'B'
                    } else if self.workspace.has(x, y, CatchmentFlag::DISPLAY) {
                        '+'
                    } else {
                        '.'
                    }
                })
                .collect();
            println!("{}", line);
        }
        println!();
    }
}
