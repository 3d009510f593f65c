//! Pure geometry for the division diagram. No imaging dependency.

pub mod grid;
