//! Stations and their per-cargo statistics
//!
//! Two periodic updates live here. [`Station::update_cargo_acceptance`]
//! reruns the catchment search and reports acceptance changes, and
//! [`Station::update_cargo`] ages waiting cargo and moves its rating.

use anyhow::{bail, Result};
use log::debug;

use super::cargo_search::{compute_accepted_cargo, CargoSearchState, SearchContext};
use super::catchment::CatchmentWorkspace;
use super::company::Companies;
use super::messages::{MessageSink, MessageType};
use super::objects::ObjectManager;
use super::rng::RandomSource;
use super::window::StationInvalidation;
use super::types::{
    CargoId, CompanyId, IndustryId, MapPos3, StationId, MAX_CARGO_RATING, MAX_CARGO_STATS,
    MAX_STATION_TILES, MIN_CARGO_RATING,
};

/// Station had cargo picked up recently
pub const STATION_FLAG_PICKUP: u16 = 1 << 7;
/// Station had cargo dropped off recently
pub const STATION_FLAG_DROPOFF: u16 = 1 << 8;

/// Rating a cargo starts at when it first shows up at a station
pub const INITIAL_CARGO_RATING: u8 = 175;

/// Rating at or above which a cargo counts as well served
pub const GOOD_CARGO_RATING: u8 = 100;

/// Rating at or below which large piles of cargo start to spoil
pub const POOR_CARGO_RATING: u8 = 50;

/// Rating given to unserviced stations of computer-run companies
const UNSERVICED_AI_RATING: i32 = 120;

/// Largest rating change applied in a single update
const MAX_RATING_STEP: i32 = 2;

/// Draw an amount of lost cargo, kept inside `low..=high`
fn roll(rng: &mut impl RandomSource, low: i32, high: i32) -> u16 {
    rng.rand_next(low, high).clamp(low, high) as u16
}

/// Statistics a station keeps for one cargo type
#[derive(Debug, Clone)]
pub struct CargoStat {
    /// Units waiting to be picked up
    pub quantity: u16,
    /// Station the waiting cargo came from; `NULL` while the stat is unused
    pub origin: StationId,
    pub accepted: bool,
    /// Updates since a vehicle last loaded this cargo
    pub age: u8,
    /// Updates the waiting cargo has been travelling
    pub enroute_age: u8,
    pub rating: u8,
    /// Top speed of the last vehicle that loaded here
    pub vehicle_speed: u8,
    /// Age in years of the last vehicle that loaded here
    pub vehicle_age: u8,
    /// Industry that last showed up as wanting this cargo
    pub industry: Option<IndustryId>,
}

impl Default for CargoStat {
    fn default() -> Self {
        Self {
            quantity: 0,
            origin: StationId::NULL,
            accepted: false,
            age: 0,
            enroute_age: 0,
            rating: INITIAL_CARGO_RATING,
            vehicle_speed: 0,
            vehicle_age: u8::MAX,
            industry: None,
        }
    }
}

impl CargoStat {
    /// A stat is in use once cargo has arrived from somewhere
    pub fn is_empty(&self) -> bool {
        self.origin.is_null()
    }
}

/// A station in the simulation
#[derive(Debug, Clone)]
pub struct Station {
    pub id: StationId,
    pub owner: CompanyId,
    pub flags: u16,
    /// Saturating counters advanced on every cargo update
    pub age_counters: [u8; 2],
    tiles: Vec<MapPos3>,
    cargo_stats: [CargoStat; MAX_CARGO_STATS],
}

impl Station {
    pub fn new(id: StationId, owner: CompanyId) -> Self {
        Self {
            id,
            owner,
            flags: 0,
            age_counters: [0; 2],
            tiles: Vec::new(),
            cargo_stats: std::array::from_fn(|_| CargoStat::default()),
        }
    }

    /// Positions of the station's parts
    pub fn tiles(&self) -> &[MapPos3] {
        &self.tiles
    }

    pub fn add_tile(&mut self, pos: MapPos3) -> Result<()> {
        if self.tiles.len() >= MAX_STATION_TILES {
            bail!("Station {:?} already has {} parts", self.id, MAX_STATION_TILES);
        }
        self.tiles.push(pos);
        Ok(())
    }

    pub fn remove_tile(&mut self, pos: MapPos3) {
        self.tiles.retain(|tile| *tile != pos);
    }

    pub fn cargo(&self, cargo: CargoId) -> &CargoStat {
        &self.cargo_stats[cargo.index()]
    }

    pub fn cargo_mut(&mut self, cargo: CargoId) -> &mut CargoStat {
        &mut self.cargo_stats[cargo.index()]
    }

    /// Bitmask of cargo currently marked as accepted
    pub fn accepted_cargo(&self) -> u32 {
        CargoId::all()
            .filter(|cargo| self.cargo(*cargo).accepted)
            .fold(0, |mask, cargo| mask | cargo.mask())
    }

    /// Add waiting cargo that arrived from `origin`
    pub fn add_waiting_cargo(&mut self, cargo: CargoId, amount: u16, origin: StationId) {
        let stat = self.cargo_mut(cargo);
        stat.quantity = stat.quantity.saturating_add(amount);
        stat.origin = origin;
    }

    /// A vehicle loaded `cargo` here
    pub fn record_pickup(&mut self, cargo: CargoId, vehicle_speed: u8, vehicle_age: u8) {
        let stat = self.cargo_mut(cargo);
        stat.age = 0;
        stat.vehicle_speed = vehicle_speed;
        stat.vehicle_age = vehicle_age;
        self.flags |= STATION_FLAG_PICKUP;
    }

    /// Rerun the catchment search and store the result per cargo.
    ///
    /// The owner hears about every cargo that flipped when it is the
    /// controlling company; the station window is redrawn on any change.
    pub fn update_cargo_acceptance(
        &mut self,
        workspace: &mut CatchmentWorkspace,
        ctx: SearchContext<'_>,
        companies: &Companies,
        messages: &mut impl MessageSink,
        ui: &mut impl StationInvalidation,
    ) -> u32 {
        let mut search = CargoSearchState::new();
        let current = compute_accepted_cargo(&mut search, workspace, ctx, Some(self), None);

        let mut original = 0;
        for cargo in CargoId::all() {
            let stat = self.cargo_mut(cargo);
            stat.industry = search.industry(cargo);
            if stat.accepted {
                original |= cargo.mask();
            }
            stat.accepted = current & cargo.mask() != 0;
        }

        if original != current {
            debug!(
                "Station {:?} acceptance changed {:#010x} -> {:#010x}",
                self.id, original, current
            );
            if self.owner == companies.controlling() {
                self.alert_cargo_acceptance_change(original, current, messages);
            }
            self.invalidate_window(ui);
        }
        current
    }

    /// Post a message for every cargo whose acceptance flipped
    pub fn alert_cargo_acceptance_change(
        &self,
        old_accepted: u32,
        new_accepted: u32,
        messages: &mut impl MessageSink,
    ) {
        for cargo in CargoId::all() {
            let before = old_accepted & cargo.mask() != 0;
            let now = new_accepted & cargo.mask() != 0;
            if before && !now {
                messages.post(MessageType::CargoNoLongerAccepted, self.owner, self.id, cargo);
            } else if !before && now {
                messages.post(MessageType::CargoNowAccepted, self.owner, self.id, cargo);
            }
        }
    }

    /// Age waiting cargo, move ratings and let neglected cargo dwindle.
    ///
    /// Returns true when at least one cargo has a good rating.
    pub fn update_cargo(
        &mut self,
        companies: &Companies,
        rng: &mut impl RandomSource,
        ui: &mut impl StationInvalidation,
    ) -> bool {
        let mut good_rating = false;
        let mut quantity_updated = false;

        for counter in &mut self.age_counters {
            *counter = counter.saturating_add(1);
        }

        for index in 0..MAX_CARGO_STATS {
            if self.cargo_stats[index].is_empty() {
                continue;
            }

            let id = self.id;
            let stat = &mut self.cargo_stats[index];
            if stat.quantity != 0 && stat.origin != id {
                stat.enroute_age = stat.enroute_age.saturating_add(1);
            }
            stat.age = stat.age.saturating_add(1);

            let target = self.calculate_cargo_rating(&self.cargo_stats[index], companies) as i32;
            let stat = &mut self.cargo_stats[index];
            let delta = (target - stat.rating as i32).clamp(-MAX_RATING_STEP, MAX_RATING_STEP);
            stat.rating = (stat.rating as i32 + delta) as u8;

            if stat.rating <= POOR_CARGO_RATING {
                if stat.quantity >= 400 {
                    stat.quantity = stat.quantity.saturating_sub(roll(rng, 1, 32));
                    quantity_updated = true;
                } else if stat.quantity >= 200 {
                    stat.quantity = stat.quantity.saturating_sub(roll(rng, 1, 8));
                    quantity_updated = true;
                }
            }

            if stat.rating >= GOOD_CARGO_RATING {
                good_rating = true;
            }

            if stat.rating <= GOOD_CARGO_RATING
                && stat.quantity != 0
                && stat.rating as i32 <= rng.rand_next(0, 127)
            {
                stat.quantity = stat.quantity.saturating_sub(roll(rng, 1, 4));
                quantity_updated = true;
            }
        }

        if let Some(tab) = ui.station_window_tab(self.id) {
            if tab.shows_cargo() || quantity_updated {
                ui.invalidate_station_window(self.id);
            }
        }

        good_rating
    }

    /// Rating `cargo` is heading towards, in `0..=200`
    pub fn calculate_cargo_rating(&self, cargo: &CargoStat, companies: &Companies) -> u8 {
        let mut rating: i32 = 0;

        // Fresh cargo
        if cargo.age <= 45 {
            rating += 40;
            if cargo.age <= 30 {
                rating += 45;
                if cargo.age <= 15 {
                    rating += 45;
                    if cargo.age <= 7 {
                        rating += 35;
                    }
                }
            }
        }

        // Piles of waiting cargo
        rating -= 130;
        if cargo.quantity <= 1000 {
            rating += 30;
            if cargo.quantity <= 500 {
                rating += 30;
                if cargo.quantity <= 300 {
                    rating += 30;
                    if cargo.quantity <= 200 {
                        rating += 20;
                        if cargo.quantity <= 100 {
                            rating += 20;
                        }
                    }
                }
            }
        }

        if self.flags & (STATION_FLAG_PICKUP | STATION_FLAG_DROPOFF) == 0
            && !companies.is_human(self.owner)
        {
            rating = UNSERVICED_AI_RATING;
        }

        let speed = cargo.vehicle_speed.min(250) as i32;
        if speed < 35 {
            rating += speed / 4;
        }

        if cargo.vehicle_age < 4 {
            rating += 10;
            if cargo.vehicle_age < 2 {
                rating += 10;
                if cargo.vehicle_age < 1 {
                    rating += 13;
                }
            }
        }

        rating.clamp(MIN_CARGO_RATING as i32, MAX_CARGO_RATING as i32) as u8
    }

    /// Describe waiting cargo, e.g. "12 passengers, 1 bag of mail waiting"
    pub fn status_string(&self, objects: &ObjectManager) -> String {
        let parts: Vec<String> = CargoId::all()
            .filter_map(|cargo| {
                let quantity = self.cargo(cargo).quantity;
                if quantity == 0 {
                    return None;
                }
                let unit = match objects.cargo(cargo) {
                    Some(object) if quantity == 1 => object.unit_singular.as_str(),
                    Some(object) => object.unit_plural.as_str(),
                    None => "units",
                };
                Some(format!("{} {}", quantity, unit))
            })
            .collect();

        if parts.is_empty() {
            "Nothing waiting".to_string()
        } else {
            format!("{} waiting", parts.join(", "))
        }
    }

    /// Redraw the station's label in the viewports
    pub fn invalidate(&self, ui: &mut impl StationInvalidation) {
        ui.invalidate_viewport(self.id);
    }

    /// Redraw the station's window
    pub fn invalidate_window(&self, ui: &mut impl StationInvalidation) {
        ui.invalidate_station_window(self.id);
    }
}
