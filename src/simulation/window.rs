//! Redraw requests for station windows and viewports

use std::collections::HashMap;

use super::types::StationId;

/// Tab shown by an open station window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationTab {
    Overview,
    Cargo,
    CargoRatings,
}

impl StationTab {
    /// Whether the tab shows waiting cargo or ratings
    pub fn shows_cargo(self) -> bool {
        matches!(self, StationTab::Cargo | StationTab::CargoRatings)
    }
}

/// A redraw request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    StationWindow(StationId),
    Viewport(StationId),
}

/// Receives redraw requests; requests never fail
pub trait StationInvalidation {
    /// Tab of the open window for `station`, if one is open
    fn station_window_tab(&self, station: StationId) -> Option<StationTab>;
    fn invalidate_station_window(&mut self, station: StationId);
    fn invalidate_viewport(&mut self, station: StationId);
}

/// Tracks open station windows and collects redraw requests
#[derive(Debug, Clone, Default)]
pub struct WindowManager {
    station_windows: HashMap<StationId, StationTab>,
    invalidations: Vec<Invalidation>,
}

impl WindowManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_station_window(&mut self, station: StationId, tab: StationTab) {
        self.station_windows.insert(station, tab);
    }

    pub fn close_station_window(&mut self, station: StationId) {
        self.station_windows.remove(&station);
    }

    pub fn invalidations(&self) -> &[Invalidation] {
        &self.invalidations
    }

    pub fn drain(&mut self) -> Vec<Invalidation> {
        std::mem::take(&mut self.invalidations)
    }
}

impl StationInvalidation for WindowManager {
    fn station_window_tab(&self, station: StationId) -> Option<StationTab> {
        self.station_windows.get(&station).copied()
    }

    fn invalidate_station_window(&mut self, station: StationId) {
        self.invalidations.push(Invalidation::StationWindow(station));
    }

    fn invalidate_viewport(&mut self, station: StationId) {
        self.invalidations.push(Invalidation::Viewport(station));
    }
}
