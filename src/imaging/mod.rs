//! Pixel primitives: resizing, seam carving, opacity and compositing.

/// Backend trait and the CPU implementation.
pub mod backend;
/// Straight/premultiplied RGBA8 compositing helpers.
pub mod composite;
/// Seam carving (content-aware resize).
pub mod seam;
