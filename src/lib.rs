//! magikd is an image-manipulation service.
//!
//! It decodes still or animated images, runs a per-frame effect over every frame and re-encodes
//! the result. It also renders two kinds of charts, division diagrams and election results.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: `bytes -> FrameSource` (every frame of GIF/APNG/animated WebP, one frame otherwise)
//! 2. **Transform**: `FrameSource + TransformSpec -> FrameSequence` (frame limit checked first,
//!    frames optionally processed in parallel, order preserved)
//! 3. **Assemble**: `FrameSequence -> EncodedImage` (still image, or a looping GIF)
//!
//! Effects reach pixels only through [`ImagingBackend`], so the pipeline can be driven with any
//! implementation of the primitives. [`CpuImaging`] is the built-in one.
//!
//! The HTTP service ([`service::http`]) and the `magikd` binary are thin adapters over these
//! functions.
#![forbid(unsafe_code)]

pub mod charts;
pub mod effects;
pub mod encode;
pub mod foundation;
pub mod frames;
pub mod imaging;
pub mod layout;
pub mod service;

pub use charts::division::{DivisionInput, PartyInfo, render_division};
pub use charts::election::{Candidate, ElectionInput, PieSlice, pie_slices, render_election};
pub use charts::svg::SvgRasterizer;
pub use effects::distort::{DistortParams, distort};
pub use effects::overlay::{OverlayParams, PreparedOverlay, pride_flag_template, pride_overlay};
pub use effects::transform::{FrameTransform, TransformSpec};
pub use encode::assembler::{EncodedImage, assemble, output_name, resolve_format};
pub use foundation::core::{BoxSize, Rgb8};
pub use foundation::error::{MagikdError, MagikdResult};
pub use frames::frame::Frame;
pub use frames::pipeline::{
    FrameSequence, MAX_FRAMES, PipelineOpts, check_frame_limit, process, transform_bytes,
    transform_source,
};
pub use frames::source::FrameSource;
pub use imaging::backend::{CpuImaging, ImagingBackend};
pub use layout::grid::{
    DiagramGeometry, DivisionLayout, GridCell, GridItem, GridPosition, ROW_CAPACITY,
    layout_division, layout_grid,
};
pub use service::config::ServiceConfig;
pub use service::fetch::{FsSourceFetcher, SourceFetcher};
pub use service::http::{AppState, Effect, router, serve};
