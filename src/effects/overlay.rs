use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::{
    foundation::core::BoxSize,
    foundation::error::{MagikdError, MagikdResult},
    frames::frame::Frame,
    imaging::backend::ImagingBackend,
};

const FLAG_STRIPES: [[u8; 3]; 6] = [
    [0xe4, 0x03, 0x03],
    [0xff, 0x8c, 0x00],
    [0xff, 0xed, 0x00],
    [0x00, 0x80, 0x26],
    [0x24, 0x40, 0x8e],
    [0x73, 0x29, 0x82],
];

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    pub bounds: BoxSize,
    pub opacity: f32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            bounds: BoxSize::default(),
            opacity: 0.6,
        }
    }
}

/// Overlay resized to the box and faded to its opacity.
///
/// Built once per request and shared read-only by every frame.
#[derive(Debug)]
pub struct PreparedOverlay {
    image: RgbaImage,
    params: OverlayParams,
}

impl PreparedOverlay {
    #[tracing::instrument(skip(template, imaging))]
    pub fn prepare(
        template: &RgbaImage,
        params: OverlayParams,
        imaging: &dyn ImagingBackend,
    ) -> MagikdResult<Arc<Self>> {
        if !(0.0..=1.0).contains(&params.opacity) {
            return Err(MagikdError::invalid_input(format!(
                "overlay opacity {} must be within [0, 1]",
                params.opacity
            )));
        }
        let bounds = params.bounds.validated()?;
        let sized = imaging.resize_exact(template, bounds.width, bounds.height)?;
        let image = imaging.scale_opacity(&sized, params.opacity)?;
        Ok(Arc::new(Self { image, params }))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn params(&self) -> OverlayParams {
        self.params
    }
}

/// Six horizontal stripes, used when no overlay image is configured.
pub fn pride_flag_template(width: u32, height: u32) -> RgbaImage {
    let stripes = FLAG_STRIPES.len() as u32;
    RgbaImage::from_fn(width, height, |_, y| {
        let idx = (y * stripes / height.max(1)).min(stripes - 1) as usize;
        let [r, g, b] = FLAG_STRIPES[idx];
        Rgba([r, g, b, 255])
    })
}

pub fn pride_overlay(
    frame: &Frame,
    overlay: &PreparedOverlay,
    imaging: &dyn ImagingBackend,
) -> MagikdResult<Frame> {
    let fitted = imaging.resize_to_fit(frame.image(), overlay.params.bounds)?;
    let composed = imaging.composite_over(&fitted, &overlay.image, 0, 0)?;
    Ok(frame.with_image(composed))
}
