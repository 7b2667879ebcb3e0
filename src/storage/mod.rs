//! # Plate Storage
//!
//! Physical layout state for a run: the [`Plate`] grid and the
//! [`PlateRegistry`] that owns every plate by name.
//!
//! The registry is an ordinary owned value passed by `&mut` to whoever
//! allocates wells. There is no global plate state.

pub mod plate;
pub mod registry;

pub use plate::{Line, Plate};
pub use registry::{Placement, PlateRegistry, find_across, place};
