use crate::{
    foundation::core::{BoxSize, scale_dim},
    foundation::error::MagikdResult,
    frames::frame::Frame,
    imaging::backend::ImagingBackend,
};

/// Parameters of the "distort" effect.
///
/// The frame is box-fitted, seam-carved down by `shrink`, then seam-carved back up by `grow` with
/// a looser seam step. With the defaults the result is 0.75x the box-fitted size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DistortParams {
    pub bounds: BoxSize,
    pub shrink: f64,
    pub grow: f64,
    pub shrink_delta_x: u32,
    pub grow_delta_x: u32,
}

impl Default for DistortParams {
    fn default() -> Self {
        Self {
            bounds: BoxSize::default(),
            shrink: 0.5,
            grow: 1.5,
            shrink_delta_x: 1,
            grow_delta_x: 2,
        }
    }
}

impl DistortParams {
    pub fn with_bounds(bounds: BoxSize) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Output size for a `width x height` input, assuming the primitives hit their targets.
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        let (w, h) = self.bounds.fit(width, height);
        let (w, h) = (scale_dim(w, self.shrink), scale_dim(h, self.shrink));
        (scale_dim(w, self.grow), scale_dim(h, self.grow))
    }
}

pub fn distort(
    frame: &Frame,
    params: &DistortParams,
    imaging: &dyn ImagingBackend,
) -> MagikdResult<Frame> {
    let fitted = imaging.resize_to_fit(frame.image(), params.bounds)?;

    let shrunk = imaging.liquid_rescale(
        &fitted,
        scale_dim(fitted.width(), params.shrink),
        scale_dim(fitted.height(), params.shrink),
        params.shrink_delta_x,
    )?;

    let grown = imaging.liquid_rescale(
        &shrunk,
        scale_dim(shrunk.width(), params.grow),
        scale_dim(shrunk.height(), params.grow),
        params.grow_delta_x,
    )?;

    Ok(frame.with_image(grown))
}
