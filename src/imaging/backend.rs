use image::{RgbaImage, imageops::FilterType};

use crate::{
    foundation::core::BoxSize,
    foundation::error::{MagikdError, MagikdResult},
    imaging::{composite, seam},
};

/// Pixel primitives the transforms are built from.
///
/// Every method returns a new image; inputs are never modified. Implementations are shared across
/// the worker threads of one request, hence `Send + Sync`.
pub trait ImagingBackend: Send + Sync {
    fn resize_exact(&self, image: &RgbaImage, width: u32, height: u32)
    -> MagikdResult<RgbaImage>;

    /// Content-aware resize to `width x height`; `delta_x` bounds the seam step per row.
    fn liquid_rescale(
        &self,
        image: &RgbaImage,
        width: u32,
        height: u32,
        delta_x: u32,
    ) -> MagikdResult<RgbaImage>;

    fn scale_opacity(&self, image: &RgbaImage, opacity: f32) -> MagikdResult<RgbaImage>;

    /// `overlay` drawn over `base` with its origin at `(x, y)`; the result has `base`'s size.
    fn composite_over(
        &self,
        base: &RgbaImage,
        overlay: &RgbaImage,
        x: i64,
        y: i64,
    ) -> MagikdResult<RgbaImage>;

    /// Aspect-preserving resize into `bounds` (shrink or grow).
    fn resize_to_fit(&self, image: &RgbaImage, bounds: BoxSize) -> MagikdResult<RgbaImage> {
        let (w, h) = bounds.validated()?.fit(image.width(), image.height());
        self.resize_exact(image, w, h)
    }
}

/// CPU implementation on top of `image::imageops` and the in-crate seam carver.
#[derive(Clone, Copy, Debug)]
pub struct CpuImaging {
    pub filter: FilterType,
}

impl Default for CpuImaging {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl CpuImaging {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl ImagingBackend for CpuImaging {
    fn resize_exact(
        &self,
        image: &RgbaImage,
        width: u32,
        height: u32,
    ) -> MagikdResult<RgbaImage> {
        if width == 0 || height == 0 {
            return Err(MagikdError::processing(format!(
                "resize target {width}x{height} must be non-zero"
            )));
        }
        if image.dimensions() == (width, height) {
            return Ok(image.clone());
        }
        Ok(image::imageops::resize(image, width, height, self.filter))
    }

    fn liquid_rescale(
        &self,
        image: &RgbaImage,
        width: u32,
        height: u32,
        delta_x: u32,
    ) -> MagikdResult<RgbaImage> {
        seam::liquid_rescale(image, width, height, delta_x)
    }

    fn scale_opacity(&self, image: &RgbaImage, opacity: f32) -> MagikdResult<RgbaImage> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(MagikdError::processing(format!(
                "opacity {opacity} must be within [0, 1]"
            )));
        }
        Ok(composite::scale_alpha(image, opacity))
    }

    fn composite_over(
        &self,
        base: &RgbaImage,
        overlay: &RgbaImage,
        x: i64,
        y: i64,
    ) -> MagikdResult<RgbaImage> {
        let mut out = base.clone();
        composite::over_at(&mut out, overlay, x, y);
        Ok(out)
    }
}
