use std::io::Cursor;

use image::{
    AnimationDecoder, ImageFormat,
    codecs::{gif::GifDecoder, png::PngDecoder, webp::WebPDecoder},
};

use crate::{
    foundation::error::{MagikdError, MagikdResult},
    frames::frame::Frame,
};

/// A decoded source image: one frame for stills, every composed frame for animations.
#[derive(Clone, Debug)]
pub struct FrameSource {
    frames: Vec<Frame>,
    format: Option<ImageFormat>,
}

impl FrameSource {
    pub fn from_frames(frames: Vec<Frame>) -> MagikdResult<Self> {
        if frames.is_empty() {
            return Err(MagikdError::invalid_input("image has no frames"));
        }
        Ok(Self {
            frames,
            format: None,
        })
    }

    /// Decode every frame of `bytes`.
    pub fn decode(bytes: &[u8]) -> MagikdResult<Self> {
        Self::decode_bounded(bytes, usize::MAX)
    }

    /// Decode at most `max_frames + 1` frames.
    ///
    /// An animation longer than `max_frames` still reports more frames than the limit, so the
    /// pipeline guard rejects it, but the tail is never decoded.
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn decode_bounded(bytes: &[u8], max_frames: usize) -> MagikdResult<Self> {
        if bytes.is_empty() {
            return Err(MagikdError::invalid_input("source image is empty"));
        }
        let format = image::guess_format(bytes)
            .map_err(|e| MagikdError::invalid_input(format!("unrecognized image format: {e}")))?;
        let cap = max_frames.saturating_add(1);

        let frames = match format {
            ImageFormat::Gif => {
                let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(decode_err)?;
                collect_frames(decoder, cap)?
            }
            ImageFormat::Png => {
                let decoder = PngDecoder::new(Cursor::new(bytes)).map_err(decode_err)?;
                if decoder.is_apng().map_err(decode_err)? {
                    collect_frames(decoder.apng().map_err(decode_err)?, cap)?
                } else {
                    vec![decode_still(bytes, format)?]
                }
            }
            ImageFormat::WebP => {
                let decoder = WebPDecoder::new(Cursor::new(bytes)).map_err(decode_err)?;
                if decoder.has_animation() {
                    collect_frames(decoder, cap)?
                } else {
                    vec![decode_still(bytes, format)?]
                }
            }
            _ => vec![decode_still(bytes, format)?],
        };

        tracing::debug!(?format, frames = frames.len(), "decoded source");
        let mut source = Self::from_frames(frames)?;
        source.format = Some(format);
        Ok(source)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// Container format the bytes were decoded from, when known.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Width and height of the first frame.
    pub fn dimensions(&self) -> (u32, u32) {
        self.frames[0].dimensions()
    }
}

fn collect_frames<'a, D: AnimationDecoder<'a>>(
    decoder: D,
    cap: usize,
) -> MagikdResult<Vec<Frame>> {
    decoder
        .into_frames()
        .take(cap)
        .map(|frame| {
            let frame = frame.map_err(decode_err)?;
            let delay = frame.delay();
            Ok(Frame::with_delay(frame.into_buffer(), delay))
        })
        .collect()
}

fn decode_still(bytes: &[u8], format: ImageFormat) -> MagikdResult<Frame> {
    let img = image::load_from_memory_with_format(bytes, format).map_err(decode_err)?;
    Ok(Frame::new(img.to_rgba8()))
}

fn decode_err(e: image::ImageError) -> MagikdError {
    MagikdError::invalid_input(format!("could not decode image: {e}"))
}

#[cfg(test)]
#[path = "../../tests/unit/frames/source.rs"]
mod tests;
