//! Station Simulation Library
//!
//! Station cargo acceptance, catchment areas and cargo ratings for a
//! transport simulation, runnable headless from a scenario file.

pub mod scenario;
pub mod simulation;
