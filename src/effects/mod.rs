//! Per-frame effects and the tagged transform selector.

pub mod distort;
pub mod overlay;
pub mod transform;
