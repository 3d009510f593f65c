use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    effects::{distort::DistortParams, overlay::OverlayParams},
    foundation::{
        core::BoxSize,
        error::{MagikdError, MagikdResult},
    },
    frames::pipeline::{MAX_FRAMES, PipelineOpts},
};

/// Runtime settings of the HTTP service and the offline commands.
///
/// Every field has a default, so an empty JSON object is a complete configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    pub max_frames: usize,
    pub box_width: u32,
    pub box_height: u32,
    pub overlay_opacity: f32,
    /// Overlay template image. The built-in flag is used when unset.
    pub overlay_path: Option<PathBuf>,
    /// Directory `img=` references are resolved against.
    pub source_root: PathBuf,
    pub parallel_frames: bool,
    pub threads: Option<usize>,
    pub fonts_dir: Option<PathBuf>,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            max_frames: MAX_FRAMES,
            box_width: 800,
            box_height: 800,
            overlay_opacity: 0.6,
            overlay_path: None,
            source_root: PathBuf::from("."),
            parallel_frames: true,
            threads: None,
            fonts_dir: None,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ServiceConfig {
    pub fn from_json(s: &str) -> MagikdResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> MagikdResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> MagikdResult<()> {
        if self.max_frames == 0 {
            return Err(MagikdError::invalid_input("config 'max_frames' must be >= 1"));
        }
        BoxSize::new(self.box_width, self.box_height)?;
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(MagikdError::invalid_input(
                "config 'overlay_opacity' must be within [0, 1]",
            ));
        }
        if self.threads == Some(0) {
            return Err(MagikdError::invalid_input(
                "config 'threads' must be >= 1 when set",
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(MagikdError::invalid_input(
                "config 'max_body_bytes' must be >= 1",
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn bounds(&self) -> MagikdResult<BoxSize> {
        BoxSize::new(self.box_width, self.box_height)
    }

    /// Pipeline options, with the dedicated rayon pool built when `threads` is set.
    ///
    /// Call once per process and share the result; every call builds a new pool.
    pub fn pipeline_opts(&self) -> MagikdResult<PipelineOpts> {
        PipelineOpts {
            max_frames: self.max_frames,
            parallel: self.parallel_frames,
            pool: None,
        }
        .with_threads(self.threads)
    }

    pub fn distort_params(&self) -> MagikdResult<DistortParams> {
        Ok(DistortParams::with_bounds(self.bounds()?))
    }

    pub fn overlay_params(&self) -> MagikdResult<OverlayParams> {
        Ok(OverlayParams {
            bounds: self.bounds()?,
            opacity: self.overlay_opacity,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/config.rs"]
mod tests;
