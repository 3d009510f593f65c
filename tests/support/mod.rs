#![allow(dead_code)]

use std::{
    io::Cursor,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use image::{
    Delay, ImageFormat, Rgba, RgbaImage,
    codecs::gif::GifEncoder,
    imageops::{self, FilterType},
};
use magikd::{
    AppState, CpuImaging, FsSourceFetcher, ImagingBackend, MagikdResult, ServiceConfig,
    SvgRasterizer, pride_flag_template,
};

/// Counts every primitive call and fakes seam carving with a nearest-neighbour resize.
#[derive(Default)]
pub struct RecordingImaging {
    pub resize_exact: AtomicUsize,
    pub liquid_rescale: AtomicUsize,
    pub scale_opacity: AtomicUsize,
    pub composite_over: AtomicUsize,
    /// Address of every overlay buffer handed to `composite_over`.
    pub overlay_buffers: Mutex<Vec<usize>>,
}

impl RecordingImaging {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        Self::count(&self.resize_exact)
            + Self::count(&self.liquid_rescale)
            + Self::count(&self.scale_opacity)
            + Self::count(&self.composite_over)
    }
}

impl ImagingBackend for RecordingImaging {
    fn resize_exact(&self, image: &RgbaImage, width: u32, height: u32) -> MagikdResult<RgbaImage> {
        self.resize_exact.fetch_add(1, Ordering::SeqCst);
        Ok(imageops::resize(image, width, height, FilterType::Nearest))
    }

    fn liquid_rescale(
        &self,
        image: &RgbaImage,
        width: u32,
        height: u32,
        _delta_x: u32,
    ) -> MagikdResult<RgbaImage> {
        self.liquid_rescale.fetch_add(1, Ordering::SeqCst);
        Ok(imageops::resize(image, width, height, FilterType::Nearest))
    }

    fn scale_opacity(&self, image: &RgbaImage, opacity: f32) -> MagikdResult<RgbaImage> {
        self.scale_opacity.fetch_add(1, Ordering::SeqCst);
        CpuImaging::default().scale_opacity(image, opacity)
    }

    fn composite_over(
        &self,
        base: &RgbaImage,
        overlay: &RgbaImage,
        x: i64,
        y: i64,
    ) -> MagikdResult<RgbaImage> {
        self.composite_over.fetch_add(1, Ordering::SeqCst);
        self.overlay_buffers
            .lock()
            .unwrap()
            .push(overlay.as_raw().as_ptr() as usize);
        CpuImaging::default().composite_over(base, overlay, x, y)
    }
}

/// GIF whose frame `i` is filled with `colors[i % colors.len()]`.
pub fn gif_bytes(frames: usize, w: u32, h: u32, colors: &[[u8; 3]]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut buf);
        for i in 0..frames {
            let [r, g, b] = colors[i % colors.len()];
            let img = RgbaImage::from_pixel(w, h, Rgba([r, g, b, 255]));
            enc.encode_frame(image::Frame::from_parts(
                img,
                0,
                0,
                Delay::from_numer_denom_ms(60, 1),
            ))
            .unwrap();
        }
    }
    buf
}

pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(w, h, |x, y| {
        Rgba([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8, 255])
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Service state over `imaging` with a small box, the built-in flag and no fonts.
pub fn test_state(imaging: Arc<dyn ImagingBackend>, root: &std::path::Path, side: u32) -> AppState {
    let config = ServiceConfig {
        box_width: side,
        box_height: side,
        source_root: root.to_path_buf(),
        ..ServiceConfig::default()
    };
    AppState::new(
        config,
        imaging,
        pride_flag_template(side, side),
        SvgRasterizer::without_fonts(),
        Arc::new(FsSourceFetcher::new(root).unwrap()),
    )
    .unwrap()
}
