//! State observers for a coupled two-tank hydraulic system.
//!
//! The measurable quantity is the height of tank 1 and the control input is
//! the pump voltage; an observer reconstructs both tank heights by
//! integrating a plant model with fixed-step explicit Euler and correcting
//! every step with the gain-weighted innovation.

pub mod error;
pub mod linsystheory;
pub mod models;
pub mod observers;

pub use crate::error::ObserverError;
pub use crate::models::{LinearSystem, PlantModel, TankParams, TankSystem, GRAVITY};
pub use crate::observers::luenberger::{LinearTankObserver, LuenbergerObserver, TankObserver};
pub use crate::observers::observer::Observer;
