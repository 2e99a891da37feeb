//! Geographic sunrise/sunset calculations.
//!
//! The `solar` module defines the position provider seam used by the tracker
//! and the default provider implementation.

pub mod solar;

pub use solar::{PositionProvider, SolarCalculator, Twilight};
