use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::{
    charts::svg::{SvgRasterizer, escape_xml},
    encode::assembler::EncodedImage,
    foundation::{core::Rgb8, error::MagikdResult},
    layout::grid::{DiagramGeometry, DivisionLayout, GridItem, layout_division},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PartyInfo {
    pub name: String,
    pub color: Rgb8,
}

/// A recorded division: member id to dot color for each lobby, plus the party legend.
///
/// Maps keep the order of the JSON document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DivisionInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub aye: IndexMap<String, Rgb8>,
    #[serde(default)]
    pub no: IndexMap<String, Rgb8>,
    #[serde(default)]
    pub party: IndexMap<String, PartyInfo>,
}

impl DivisionInput {
    pub fn from_json(bytes: &[u8]) -> MagikdResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn layout(&self, geometry: &DiagramGeometry) -> DivisionLayout {
        let items = |m: &IndexMap<String, Rgb8>| -> Vec<GridItem> {
            m.iter()
                .map(|(id, color)| GridItem::new(id.clone(), *color))
                .collect()
        };
        let legend: Vec<(String, Rgb8)> = self
            .party
            .values()
            .map(|p| (p.name.clone(), p.color))
            .collect();

        layout_division(
            self.title.as_deref(),
            &items(&self.aye),
            &items(&self.no),
            &legend,
            geometry,
        )
    }
}

pub fn division_svg(layout: &DivisionLayout) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = layout.width,
        h = layout.height,
    );
    let _ = writeln!(
        s,
        r##"<rect width="{}" height="{}" fill="#ffffff"/>"##,
        layout.width, layout.height
    );

    if let Some(title) = &layout.title {
        let _ = writeln!(
            s,
            r#"<text x="{}" y="{}" font-size="24" font-weight="bold">{}</text>"#,
            layout.title_origin.x,
            layout.title_origin.y,
            escape_xml(title)
        );
    }

    for (heading, origin, dots) in [
        ("Ayes", layout.aye_heading, &layout.aye),
        ("Noes", layout.no_heading, &layout.no),
    ] {
        let _ = writeln!(
            s,
            r#"<text x="{}" y="{}" font-size="16">{heading}: {}</text>"#,
            origin.x,
            origin.y,
            dots.len()
        );
        for dot in dots {
            let _ = writeln!(
                s,
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}"><title>{}</title></circle>"#,
                dot.center.x,
                dot.center.y,
                dot.radius,
                dot.color,
                escape_xml(&dot.label)
            );
        }
    }

    for entry in &layout.legend {
        let _ = writeln!(
            s,
            r##"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="#333333" stroke-width="0.5"/>"##,
            entry.swatch.x0,
            entry.swatch.y0,
            entry.swatch.width(),
            entry.swatch.height(),
            entry.color
        );
        let _ = writeln!(
            s,
            r#"<text x="{}" y="{}" font-size="14">{}</text>"#,
            entry.text_origin.x,
            entry.text_origin.y,
            escape_xml(&entry.name)
        );
    }

    s.push_str("</svg>\n");
    s
}

#[tracing::instrument(skip_all, fields(aye = input.aye.len(), no = input.no.len()))]
pub fn render_division(
    input: &DivisionInput,
    rasterizer: &SvgRasterizer,
) -> MagikdResult<EncodedImage> {
    let layout = input.layout(&DiagramGeometry::default());
    rasterizer.render_png(&division_svg(&layout))
}

#[cfg(test)]
#[path = "../../tests/unit/charts/division.rs"]
mod tests;
