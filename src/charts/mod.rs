//! Chart rendering: division diagrams and election results.
//!
//! Charts are built as SVG documents and rasterized to PNG with `usvg`/`resvg`.

pub mod division;
pub mod election;
pub mod svg;
