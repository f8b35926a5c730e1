//! Instruments and azimuth conventions.

pub mod azimuth;
pub mod instrument;

pub use azimuth::*;
pub use instrument::*;
