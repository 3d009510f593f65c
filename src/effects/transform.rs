use std::sync::Arc;

use image::RgbaImage;

use crate::{
    effects::{
        distort::{DistortParams, distort},
        overlay::{OverlayParams, PreparedOverlay, pride_overlay},
    },
    foundation::error::MagikdResult,
    frames::frame::Frame,
    imaging::backend::ImagingBackend,
};

/// A per-frame transform: `frame -> frame'`, no state carried between frames.
pub trait FrameTransform: Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, frame: &Frame, imaging: &dyn ImagingBackend) -> MagikdResult<Frame>;
}

/// The effects a request can select, each with its own parameters.
#[derive(Clone, Debug)]
pub enum TransformSpec {
    Distort(DistortParams),
    PrideOverlay(Arc<PreparedOverlay>),
}

impl TransformSpec {
    pub fn distort(params: DistortParams) -> Self {
        Self::Distort(params)
    }

    /// Prepare the overlay once; every frame of the request shares it.
    pub fn pride(
        template: &RgbaImage,
        params: OverlayParams,
        imaging: &dyn ImagingBackend,
    ) -> MagikdResult<Self> {
        Ok(Self::PrideOverlay(PreparedOverlay::prepare(
            template, params, imaging,
        )?))
    }
}

impl FrameTransform for TransformSpec {
    fn name(&self) -> &'static str {
        match self {
            Self::Distort(_) => "distort",
            Self::PrideOverlay(_) => "pride",
        }
    }

    fn apply(&self, frame: &Frame, imaging: &dyn ImagingBackend) -> MagikdResult<Frame> {
        match self {
            Self::Distort(params) => distort(frame, params, imaging),
            Self::PrideOverlay(overlay) => pride_overlay(frame, overlay, imaging),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transform.rs"]
mod tests;
