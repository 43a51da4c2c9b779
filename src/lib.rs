//! Collision Dashboard - NYC Motor Vehicle Collisions
//!
//! Loads the collision CSV once, then answers three questions about it:
//! where people were injured, when during an hour crashes happen, and which
//! streets are most dangerous for pedestrians, cyclists and motorists.

pub mod charts;
pub mod cli;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod report;
