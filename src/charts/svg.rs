use std::{path::Path, sync::Arc};

use anyhow::Context;
use image::{ImageFormat, RgbaImage};

use crate::{
    encode::assembler::{EncodedImage, assemble},
    foundation::error::{MagikdError, MagikdResult},
    frames::{frame::Frame, pipeline::FrameSequence},
    imaging::composite::unpremultiply_rgba8_in_place,
};

/// Largest chart canvas side we agree to allocate.
const MAX_DIM: u32 = 8_192;

/// Rasterizes chart SVG with a font database loaded once and shared.
#[derive(Clone)]
pub struct SvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for SvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRasterizer")
            .field("faces", &self.font_count())
            .finish()
    }
}

impl SvgRasterizer {
    /// System fonts plus every `ttf`/`otf`/`ttc` file in `fonts_dir`.
    pub fn new(fonts_dir: Option<&Path>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = fonts_dir {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "loaded chart fonts");
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// No fonts at all. Text nodes are dropped; shapes still render.
    pub fn without_fonts() -> Self {
        Self {
            fontdb: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    pub fn font_count(&self) -> usize {
        self.fontdb.len()
    }

    pub fn rasterize(&self, svg: &str) -> MagikdResult<RgbaImage> {
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            font_resolver: make_font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &opts)
            .with_context(|| "parse chart svg")
            .map_err(|e| MagikdError::processing(format!("{e:#}")))?;

        let size = tree.size();
        let width = (size.width().ceil() as u32).max(1);
        let height = (size.height().ceil() as u32).max(1);
        if width > MAX_DIM || height > MAX_DIM {
            return Err(MagikdError::invalid_input(format!(
                "chart too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
            )));
        }

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| MagikdError::processing("failed to allocate chart pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::default(),
            &mut pixmap.as_mut(),
        );

        let mut data = pixmap.take();
        unpremultiply_rgba8_in_place(&mut data);
        RgbaImage::from_raw(width, height, data)
            .ok_or_else(|| MagikdError::processing("chart pixmap size mismatch"))
    }

    pub fn render_png(&self, svg: &str) -> MagikdResult<EncodedImage> {
        let image = self.rasterize(svg)?;
        assemble(
            &FrameSequence::new(vec![Frame::new(image)])?,
            ImageFormat::Png,
        )
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        if matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc") {
            if let Err(e) = db.load_font_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "skipping font");
            }
        }
    }
}

/// Requested families first, then any generic face, then whatever is loaded.
fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

/// Escape text for use in SVG character data and attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/charts/svg.rs"]
mod tests;
