//! Cargo acceptance search
//!
//! Walks every tile inside a station's catchment and scores the cargo that
//! nearby industries and buildings take in. A cargo type counts as accepted
//! once its score reaches [`ACCEPTANCE_THRESHOLD`].

use log::trace;

use super::catchment::{
    flag_station_catchment, location_catchment, set_catchment_region, CatchmentFlag,
    CatchmentWorkspace,
};
use super::industry::IndustryManager;
use super::objects::ObjectManager;
use super::station::Station;
use super::tile::{BuildingElement, ElementKind, IndustryElement, StationType, TileMap};
use super::types::{CargoId, IndustryId, MapPos, TilePos, ALL_CARGO, MAX_CARGO_STATS};

/// Score a cargo type needs before the station accepts it
pub const ACCEPTANCE_THRESHOLD: u32 = 8;

/// Score an industry adds for each cargo it requires
pub const INDUSTRY_REQUIRED_SCORE: u32 = 8;

/// Tile offsets from a 2x2 building's origin, indexed by its multi-tile index
const LARGE_BUILDING_OFFSETS: [(i32, i32); 4] = [(0, 0), (0, 1), (1, 1), (1, 0)];

/// Read-only world data a search needs
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub map: &'a TileMap,
    pub objects: &'a ObjectManager,
    pub industries: &'a IndustryManager,
}

/// Extra location to include in a search, as when previewing a new part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchmentPreview {
    pub location: MapPos,
    /// Cargo types the previewed part is interested in
    pub filter: u32,
}

/// Scores gathered during one acceptance search
#[derive(Debug, Clone)]
pub struct CargoSearchState {
    filter: u32,
    scores: [u32; MAX_CARGO_STATS],
    produced_cargo: u32,
    industries: [Option<IndustryId>; MAX_CARGO_STATS],
}

impl Default for CargoSearchState {
    fn default() -> Self {
        Self::new()
    }
}

impl CargoSearchState {
    pub fn new() -> Self {
        Self {
            filter: 0,
            scores: [0; MAX_CARGO_STATS],
            produced_cargo: 0,
            industries: [None; MAX_CARGO_STATS],
        }
    }

    pub fn filter(&self) -> u32 {
        self.filter
    }

    pub fn set_filter(&mut self, filter: u32) {
        self.filter = filter;
    }

    fn passes_filter(&self, cargo: CargoId) -> bool {
        self.filter & cargo.mask() != 0
    }

    pub fn score(&self, cargo: CargoId) -> u32 {
        self.scores[cargo.index()]
    }

    pub fn add_score(&mut self, cargo: CargoId, value: u32) {
        let score = &mut self.scores[cargo.index()];
        *score = score.saturating_add(value);
    }

    pub fn reset_scores(&mut self) {
        self.scores = [0; MAX_CARGO_STATS];
    }

    /// Bitmask of cargo produced inside the catchment
    pub fn produced_cargo(&self) -> u32 {
        self.produced_cargo
    }

    pub fn add_produced_cargo(&mut self, cargo: CargoId) {
        self.produced_cargo |= cargo.mask();
    }

    pub fn reset_produced_cargo(&mut self) {
        self.produced_cargo = 0;
    }

    /// Industry last found requiring `cargo`
    pub fn industry(&self, cargo: CargoId) -> Option<IndustryId> {
        self.industries[cargo.index()]
    }

    pub fn set_industry(&mut self, cargo: CargoId, industry: IndustryId) {
        self.industries[cargo.index()] = Some(industry);
    }

    pub fn reset_industries(&mut self) {
        self.industries = [None; MAX_CARGO_STATS];
    }

    /// Bitmask of cargo whose score reached the acceptance threshold
    pub fn accepted_cargo(&self) -> u32 {
        CargoId::all()
            .filter(|cargo| self.score(*cargo) >= ACCEPTANCE_THRESHOLD)
            .fold(0, |mask, cargo| mask | cargo.mask())
    }
}

/// Compute which cargo a station accepts.
///
/// `station` may be `None` to search only around `preview`. The search
/// leaves its scores, produced cargo and industry attribution in `state`;
/// the only other thing touched is the [`CatchmentFlag::ACCEPTANCE`] bit of
/// `workspace`.
pub fn compute_accepted_cargo(
    state: &mut CargoSearchState,
    workspace: &mut CatchmentWorkspace,
    ctx: SearchContext<'_>,
    station: Option<&Station>,
    preview: Option<CatchmentPreview>,
) -> u32 {
    state.set_filter(preview.map_or(0, |preview| preview.filter));
    state.reset_industries();

    let mut bounds = flag_station_catchment(
        workspace,
        station,
        ctx.map,
        ctx.objects,
        CatchmentFlag::ACCEPTANCE,
    );

    if let Some(preview) = preview {
        let region = location_catchment(preview.location);
        let flagged = set_catchment_region(workspace, region, CatchmentFlag::ACCEPTANCE);
        bounds = Some(match bounds {
            Some(bounds) => bounds.union(&flagged),
            None => flagged,
        });
    }

    state.reset_scores();
    state.reset_produced_cargo();

    if let Some(station) = station {
        apply_station_filter(state, station, ctx);
    }

    if state.filter() == 0 {
        state.set_filter(ALL_CARGO);
    }

    if let Some(bounds) = bounds {
        for y in bounds.min.y..=bounds.max.y {
            for x in bounds.min.x..=bounds.max.x {
                if workspace.has(x, y, CatchmentFlag::ACCEPTANCE) {
                    scan_tile(state, workspace, ctx, TilePos::new(x, y));
                }
            }
        }
    }

    state.accepted_cargo()
}

/// Widen the search filter according to the station's parts.
///
/// Passenger road stops add their cargo bit. Freight road stops add the
/// complement of their cargo bit. Any other part opens the filter fully.
fn apply_station_filter(state: &mut CargoSearchState, station: &Station, ctx: SearchContext<'_>) {
    for &pos in station.tiles() {
        let Some(element) = ctx.map.station_element(pos) else {
            continue;
        };

        if element.station_type != StationType::Road {
            state.set_filter(ALL_CARGO);
            continue;
        }

        let Some(object) = ctx.objects.road_station(element.object_id) else {
            continue;
        };
        if object.is_passenger() {
            state.set_filter(state.filter() | object.cargo.mask());
        } else if object.is_freight() {
            state.set_filter(state.filter() | !object.cargo.mask());
        }
    }
}

fn scan_tile(
    state: &mut CargoSearchState,
    workspace: &mut CatchmentWorkspace,
    ctx: SearchContext<'_>,
    pos: TilePos,
) {
    for element in ctx.map.get(pos) {
        if element.ghost {
            continue;
        }
        match &element.kind {
            ElementKind::Industry(industry) => score_industry(state, ctx, industry),
            ElementKind::Building(building) => {
                score_building(state, workspace, ctx, building, pos)
            }
            _ => continue,
        }
    }
}

fn score_industry(state: &mut CargoSearchState, ctx: SearchContext<'_>, element: &IndustryElement) {
    let Some(industry) = ctx.industries.get(element.industry_id) else {
        return;
    };
    if industry.is_under_construction() {
        return;
    }
    let Some(object) = industry.object(ctx.objects) else {
        return;
    };

    for cargo in object.required_cargo.iter().flatten() {
        if state.passes_filter(*cargo) {
            state.add_score(*cargo, INDUSTRY_REQUIRED_SCORE);
            state.set_industry(*cargo, industry.id);
        }
    }

    for cargo in object.produced_cargo.iter().flatten() {
        if state.passes_filter(*cargo) {
            state.add_produced_cargo(*cargo);
        }
    }
}

fn score_building(
    state: &mut CargoSearchState,
    workspace: &mut CatchmentWorkspace,
    ctx: SearchContext<'_>,
    element: &BuildingElement,
    pos: TilePos,
) {
    if element.scaffolding || !element.station_linked {
        return;
    }
    let Some(object) = ctx.objects.building(element.object_id) else {
        return;
    };

    for slot in 0..2 {
        let Some(cargo) = object.produced_cargo[slot] else {
            continue;
        };
        if state.passes_filter(cargo) {
            state.add_score(cargo, object.produced_score[slot] as u32);
            if object.produced_near_station[slot] {
                state.add_produced_cargo(cargo);
            }
        }
    }

    for slot in 0..2 {
        let Some(cargo) = object.required_cargo[slot] else {
            continue;
        };
        if state.passes_filter(cargo) {
            state.add_score(cargo, object.required_score[slot] as u32);
        }
    }

    // Count 2x2 buildings once by dropping the rest of the footprint from the search
    if object.is_large_tile() {
        let (dx, dy) = LARGE_BUILDING_OFFSETS[(element.multi_tile_index & 3) as usize];
        let origin = pos.offset(-dx, -dy);
        trace!("Large building at {:?} counted from {:?}", origin, pos);
        for (ox, oy) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            let tile = origin.offset(ox, oy);
            if tile.x >= 0 && tile.y >= 0 && tile.x < workspace.columns() && tile.y < workspace.rows()
            {
                workspace.reset(tile.x, tile.y, CatchmentFlag::ACCEPTANCE);
            }
        }
    }
}
