//! Output encoding and attachment naming.
//!
//! The requested format only binds single-frame output. An animated sequence is always written as
//! a looping GIF, whatever was requested; callers read the real format from
//! [`EncodedImage::format`] and name the result with [`output_name`] so the extension matches.

use std::io::Cursor;

use anyhow::Context;
use image::{DynamicImage, ImageFormat, codecs::gif::GifEncoder, codecs::gif::Repeat};

use crate::{
    foundation::error::{MagikdError, MagikdResult},
    frames::pipeline::FrameSequence,
};

/// Output format when neither the request nor the source says otherwise.
pub const DEFAULT_FORMAT: ImageFormat = ImageFormat::Png;

/// Formats the assembler writes. Anything else falls back to [`DEFAULT_FORMAT`].
pub const OUTPUT_FORMATS: [ImageFormat; 6] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

#[derive(Clone, Debug)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub frames: usize,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn extension(&self) -> &'static str {
        extension_for(self.format)
    }
}

fn extension_for(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("png")
}

fn is_supported(format: ImageFormat) -> bool {
    OUTPUT_FORMATS.contains(&format)
}

fn can_animate(format: ImageFormat) -> bool {
    format == ImageFormat::Gif
}

/// The apparent extension of a reference: last path segment, query and fragment stripped.
pub fn hint_extension(reference: &str) -> Option<String> {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    let path = &reference[..end];
    let segment = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Writable format named by the reference's extension, if any.
pub fn format_from_hint(reference: &str) -> Option<ImageFormat> {
    let ext = hint_extension(reference)?;
    ImageFormat::from_extension(&ext).filter(|f| is_supported(*f))
}

/// Hint first, then the source's own format, then [`DEFAULT_FORMAT`].
pub fn resolve_format(hint: Option<&str>, source: Option<ImageFormat>) -> ImageFormat {
    hint.and_then(format_from_hint)
        .or(source.filter(|f| is_supported(*f)))
        .unwrap_or(DEFAULT_FORMAT)
}

/// `<stem>.<ext>`, reusing the hint's spelling of the extension when it names `format`.
pub fn output_name(stem: &str, hint: Option<&str>, format: ImageFormat) -> String {
    let ext = hint
        .and_then(hint_extension)
        .filter(|ext| ImageFormat::from_extension(ext) == Some(format))
        .unwrap_or_else(|| extension_for(format).to_string());
    format!("{stem}.{ext}")
}

/// Encode the sequence as one image.
///
/// One frame is written as a still in `format`. More than one is always a looping GIF, and the
/// returned [`EncodedImage::format`] says so.
#[tracing::instrument(skip(frames), fields(frames = frames.len()))]
pub fn assemble(frames: &FrameSequence, format: ImageFormat) -> MagikdResult<EncodedImage> {
    let format = if is_supported(format) {
        format
    } else {
        DEFAULT_FORMAT
    };

    if frames.is_animated() {
        if !can_animate(format) {
            tracing::debug!(?format, "format cannot animate, writing gif");
        }
        return encode_gif_animation(frames);
    }

    let frame = &frames.frames()[0];
    let img = DynamicImage::ImageRgba8(frame.image().clone());
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .with_context(|| format!("encode {format:?}"))
        .map_err(|e| MagikdError::processing(format!("{e:#}")))?;

    Ok(EncodedImage {
        bytes,
        format,
        frames: 1,
    })
}

fn encode_gif_animation(frames: &FrameSequence) -> MagikdResult<EncodedImage> {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| MagikdError::processing(format!("gif repeat: {e}")))?;
        encoder
            .encode_frames(frames.frames().iter().map(|f| {
                image::Frame::from_parts(f.image().clone(), 0, 0, f.delay())
            }))
            .map_err(|e| MagikdError::processing(format!("encode gif animation: {e}")))?;
    }

    Ok(EncodedImage {
        bytes,
        format: ImageFormat::Gif,
        frames: frames.len(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/assembler.rs"]
mod tests;
