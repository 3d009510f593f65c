use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    effects::transform::FrameTransform,
    encode::assembler::{EncodedImage, assemble, resolve_format},
    foundation::error::{MagikdError, MagikdResult},
    frames::{frame::Frame, source::FrameSource},
    imaging::backend::ImagingBackend,
};

/// Hard cap on frames a single request may process.
pub const MAX_FRAMES: usize = 60;

/// Ordered, non-empty output of the pipeline.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>) -> MagikdResult<Self> {
        if frames.is_empty() {
            return Err(MagikdError::processing("frame sequence must be non-empty"));
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

#[derive(Clone, Debug)]
pub struct PipelineOpts {
    pub max_frames: usize,
    /// Transform frames on a rayon pool. Output order is unaffected.
    pub parallel: bool,
    /// Dedicated pool for parallel mode; `None` uses the global pool.
    pub pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            max_frames: MAX_FRAMES,
            parallel: false,
            pool: None,
        }
    }
}

impl PipelineOpts {
    /// Build the dedicated pool for `threads` workers, if set. Clones share the pool.
    pub fn with_threads(mut self, threads: Option<usize>) -> MagikdResult<Self> {
        self.pool = threads.map(build_thread_pool).transpose()?.map(Arc::new);
        Ok(self)
    }

    pub fn threads(&self) -> Option<usize> {
        self.pool.as_ref().map(|p| p.current_num_threads())
    }
}

/// Reject sources with more than `max` frames.
pub fn check_frame_limit(frames: usize, max: usize) -> MagikdResult<()> {
    if frames > max {
        return Err(MagikdError::frame_limit(frames, max));
    }
    Ok(())
}

/// Apply `transform` to every frame of `source`, in order.
///
/// The frame limit is checked before any transform runs. A failure on any frame fails the whole
/// sequence; partial output is never returned.
#[tracing::instrument(
    skip(source, transform, imaging),
    fields(frames = source.frame_count(), transform = transform.name())
)]
pub fn process(
    source: &FrameSource,
    transform: &dyn FrameTransform,
    imaging: &dyn ImagingBackend,
    opts: &PipelineOpts,
) -> MagikdResult<FrameSequence> {
    check_frame_limit(source.frame_count(), opts.max_frames)?;

    let frames = if opts.parallel && source.is_animated() {
        let work = || {
            source
                .frames()
                .par_iter()
                .map(|frame| transform.apply(frame, imaging))
                .collect::<MagikdResult<Vec<_>>>()
        };
        match &opts.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    } else {
        source
            .frames()
            .iter()
            .map(|frame| transform.apply(frame, imaging))
            .collect::<MagikdResult<Vec<_>>>()
    }?;

    tracing::debug!(frames = frames.len(), "transformed sequence");
    FrameSequence::new(frames)
}

/// Decode, transform and re-encode in one call.
///
/// `format_hint` is any reference whose apparent extension picks the output format (a URL, a
/// file name); the source container format is the fallback.
pub fn transform_bytes(
    bytes: &[u8],
    format_hint: Option<&str>,
    transform: &dyn FrameTransform,
    imaging: &dyn ImagingBackend,
    opts: &PipelineOpts,
) -> MagikdResult<EncodedImage> {
    let source = FrameSource::decode_bounded(bytes, opts.max_frames)?;
    transform_source(&source, format_hint, transform, imaging, opts)
}

/// [`process`] followed by output assembly in the resolved format.
pub fn transform_source(
    source: &FrameSource,
    format_hint: Option<&str>,
    transform: &dyn FrameTransform,
    imaging: &dyn ImagingBackend,
    opts: &PipelineOpts,
) -> MagikdResult<EncodedImage> {
    let sequence = process(source, transform, imaging, opts)?;
    let format = resolve_format(format_hint, source.format());
    assemble(&sequence, format)
}

fn build_thread_pool(threads: usize) -> MagikdResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(MagikdError::invalid_input(
            "pipeline 'threads' must be >= 1 when set",
        ));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| MagikdError::processing(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/frames/pipeline.rs"]
mod tests;
