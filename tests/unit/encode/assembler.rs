use image::{Delay, Rgba, RgbaImage};

use super::*;
use crate::frames::{frame::Frame, source::FrameSource};

fn sequence(n: usize, w: u32, h: u32) -> FrameSequence {
    let frames = (0..n)
        .map(|i| {
            Frame::with_delay(
                RgbaImage::from_pixel(w, h, Rgba([(i * 40) as u8, 90, 200, 255])),
                Delay::from_numer_denom_ms(50, 1),
            )
        })
        .collect();
    FrameSequence::new(frames).unwrap()
}

#[test]
fn hint_extension_strips_query_and_fragment() {
    assert_eq!(
        hint_extension("https://cdn.test/a/cat.GIF?size=2#top").as_deref(),
        Some("gif")
    );
    assert_eq!(hint_extension("photo.jpeg").as_deref(), Some("jpeg"));
    assert_eq!(hint_extension("https://cdn.test/a/"), None);
    assert_eq!(hint_extension("noext"), None);
    assert_eq!(hint_extension(".hidden"), None);
    assert_eq!(hint_extension("https://cdn.test/v1.2/img?fmt=png"), None);
}

#[test]
fn resolve_format_prefers_hint_then_source_then_default() {
    assert_eq!(
        resolve_format(Some("x/pic.jpg?x=1"), Some(ImageFormat::Png)),
        ImageFormat::Jpeg
    );
    assert_eq!(
        resolve_format(Some("x/pic"), Some(ImageFormat::Gif)),
        ImageFormat::Gif
    );
    assert_eq!(
        resolve_format(Some("x/pic.svg"), Some(ImageFormat::WebP)),
        ImageFormat::WebP
    );
    assert_eq!(resolve_format(None, Some(ImageFormat::Ico)), DEFAULT_FORMAT);
    assert_eq!(resolve_format(None, None), ImageFormat::Png);
}

#[test]
fn output_name_mirrors_the_hint_extension() {
    assert_eq!(
        output_name("distorted", Some("a.jpeg?q=1"), ImageFormat::Jpeg),
        "distorted.jpeg"
    );
    assert_eq!(
        output_name("distorted", Some("a.jpg"), ImageFormat::Gif),
        "distorted.gif"
    );
    assert_eq!(output_name("pride", None, ImageFormat::Png), "pride.png");
}

#[test]
fn single_frame_is_written_as_still() {
    let out = assemble(&sequence(1, 5, 3), ImageFormat::Png).unwrap();
    assert_eq!(out.format, ImageFormat::Png);
    assert_eq!(out.frames, 1);
    assert_eq!(out.mime_type(), "image/png");

    let back = FrameSource::decode(&out.bytes).unwrap();
    assert_eq!(back.frame_count(), 1);
    assert_eq!(back.dimensions(), (5, 3));
}

#[test]
fn jpeg_output_drops_alpha_and_decodes() {
    let out = assemble(&sequence(1, 8, 8), ImageFormat::Jpeg).unwrap();
    assert_eq!(out.extension(), "jpg");
    let back = FrameSource::decode(&out.bytes).unwrap();
    assert_eq!(back.format(), Some(ImageFormat::Jpeg));
    assert_eq!(back.dimensions(), (8, 8));
}

#[test]
fn multiple_frames_become_a_gif_animation() {
    let out = assemble(&sequence(4, 6, 6), ImageFormat::Png).unwrap();
    assert_eq!(out.format, ImageFormat::Gif);
    assert_eq!(out.frames, 4);
    assert_eq!(output_name("distorted", Some("cat.png"), out.format), "distorted.gif");

    let back = FrameSource::decode(&out.bytes).unwrap();
    assert_eq!(back.frame_count(), 4);
    for frame in back.frames() {
        assert_eq!(frame.dimensions(), (6, 6));
        assert_eq!(frame.delay().numer_denom_ms(), (50, 1));
    }
}
