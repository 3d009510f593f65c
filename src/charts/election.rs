use std::{f64::consts::PI, fmt::Write as _};

use kurbo::{CircleSegment, Point, Shape};

use crate::{
    charts::svg::{SvgRasterizer, escape_xml},
    encode::assembler::EncodedImage,
    foundation::{
        core::Rgb8,
        error::{MagikdError, MagikdResult},
    },
};

pub const NON_VOTER_LABEL: &str = "Did not vote";
const NON_VOTER_COLOR: Rgb8 = Rgb8::new(211, 211, 211);

/// Slice colors for candidates that do not bring their own.
const PALETTE: [Rgb8; 8] = [
    Rgb8::new(0xe4, 0x1a, 0x1c),
    Rgb8::new(0x37, 0x7e, 0xb8),
    Rgb8::new(0x4d, 0xaf, 0x4a),
    Rgb8::new(0x98, 0x4e, 0xa3),
    Rgb8::new(0xff, 0x7f, 0x00),
    Rgb8::new(0xa6, 0x56, 0x28),
    Rgb8::new(0xf7, 0x81, 0xbf),
    Rgb8::new(0x99, 0x99, 0x99),
];

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candidate {
    pub name: String,
    #[serde(default)]
    pub party_name: String,
    pub votes: u64,
    #[serde(default)]
    pub vote_share: f64,
    #[serde(default)]
    pub vote_share_change: Option<f64>,
    #[serde(default)]
    pub color: Option<Rgb8>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElectionInput {
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub electorate: u64,
    #[serde(default)]
    pub turnout: u64,
    #[serde(default)]
    pub include_non_voters: bool,
    /// Render a results table instead of a pie.
    #[serde(default)]
    pub table: bool,
    #[serde(default)]
    pub title: Option<String>,
}

impl ElectionInput {
    pub fn from_json(bytes: &[u8]) -> MagikdResult<Self> {
        let input: Self = serde_json::from_slice(bytes)?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> MagikdResult<()> {
        if self.candidates.is_empty() {
            return Err(MagikdError::invalid_input("election has no candidates"));
        }
        if self.include_non_voters && self.turnout > self.electorate {
            return Err(MagikdError::invalid_input(format!(
                "turnout {} exceeds electorate {}",
                self.turnout, self.electorate
            )));
        }
        for c in &self.candidates {
            let change_ok = c.vote_share_change.is_none_or(f64::is_finite);
            if !c.vote_share.is_finite() || !change_ok {
                return Err(MagikdError::invalid_input(format!(
                    "candidate '{}' has a non-numeric vote share",
                    c.name
                )));
            }
        }
        if self.total_votes() == 0 {
            return Err(MagikdError::invalid_input("election has no votes"));
        }
        Ok(())
    }

    pub fn non_voters(&self) -> u64 {
        if self.include_non_voters {
            self.electorate.saturating_sub(self.turnout)
        } else {
            0
        }
    }

    /// Votes across every pie slice, non-voters included when requested.
    pub fn total_votes(&self) -> u64 {
        self.candidates
            .iter()
            .map(|c| c.votes)
            .fold(0u64, u64::saturating_add)
            .saturating_add(self.non_voters())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub votes: u64,
    pub fraction: f64,
    /// Radians, clockwise from twelve o'clock.
    pub start_angle: f64,
    pub sweep: f64,
    pub color: Rgb8,
}

/// One slice per candidate in input order, then the non-voter slice if requested.
pub fn pie_slices(input: &ElectionInput) -> MagikdResult<Vec<PieSlice>> {
    input.validate()?;
    let total = input.total_votes() as f64;

    let mut entries: Vec<(String, u64, Rgb8)> = input
        .candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let color = c.color.unwrap_or(PALETTE[i % PALETTE.len()]);
            (c.name.clone(), c.votes, color)
        })
        .collect();
    if input.include_non_voters {
        entries.push((NON_VOTER_LABEL.to_string(), input.non_voters(), NON_VOTER_COLOR));
    }

    let mut angle = -PI / 2.0;
    Ok(entries
        .into_iter()
        .map(|(label, votes, color)| {
            let fraction = votes as f64 / total;
            let slice = PieSlice {
                label,
                votes,
                fraction,
                start_angle: angle,
                sweep: fraction * 2.0 * PI,
                color,
            };
            angle += slice.sweep;
            slice
        })
        .collect())
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn svg_open(s: &mut String, width: f64, height: f64) {
    let _ = writeln!(
        s,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif"><rect width="{width}" height="{height}" fill="#ffffff"/>"##
    );
}

fn svg_title(s: &mut String, title: Option<&str>) {
    if let Some(t) = title {
        let _ = writeln!(
            s,
            r#"<text x="40" y="44" font-size="24" font-weight="bold">{}</text>"#,
            escape_xml(t)
        );
    }
}

pub fn pie_svg(input: &ElectionInput) -> MagikdResult<String> {
    const CENTER: Point = Point::new(260.0, 300.0);
    const RADIUS: f64 = 200.0;
    const LEGEND_X: f64 = 500.0;
    const LEGEND_TOP: f64 = 100.0;
    const LEGEND_ROW: f64 = 28.0;

    let slices = pie_slices(input)?;
    let width = 960.0;
    let height = (LEGEND_TOP + slices.len() as f64 * LEGEND_ROW + 40.0).max(540.0);

    let mut s = String::new();
    svg_open(&mut s, width, height);
    svg_title(&mut s, input.title.as_deref());

    for slice in slices.iter().filter(|sl| sl.votes > 0) {
        let path = CircleSegment::new(CENTER, RADIUS, 0.0, slice.start_angle, slice.sweep)
            .to_path(0.1)
            .to_svg();
        let _ = writeln!(
            s,
            r##"<path d="{path}" fill="{}" stroke="#ffffff" stroke-width="1"/>"##,
            slice.color
        );
        if slice.fraction >= 0.05 {
            let mid = slice.start_angle + slice.sweep / 2.0;
            let at = CENTER + kurbo::Vec2::from_angle(mid) * (RADIUS * 0.65);
            let _ = writeln!(
                s,
                r##"<text x="{:.1}" y="{:.1}" font-size="14" text-anchor="middle" fill="#000000">{:.1}%</text>"##,
                at.x,
                at.y,
                slice.fraction * 100.0
            );
        }
    }

    for (i, slice) in slices.iter().enumerate() {
        let y = LEGEND_TOP + i as f64 * LEGEND_ROW;
        let _ = writeln!(
            s,
            r#"<rect x="{LEGEND_X}" y="{y}" width="18" height="18" fill="{}"/>"#,
            slice.color
        );
        let party = input
            .candidates
            .get(i)
            .map(|c| c.party_name.as_str())
            .filter(|p| !p.is_empty());
        let label = match party {
            Some(p) => format!("{} ({p})", slice.label),
            None => slice.label.clone(),
        };
        let _ = writeln!(
            s,
            r#"<text x="{}" y="{}" font-size="14">{}: {} votes, {:.1}%</text>"#,
            LEGEND_X + 26.0,
            y + 14.0,
            escape_xml(&label),
            group_thousands(slice.votes),
            slice.fraction * 100.0
        );
    }

    s.push_str("</svg>\n");
    Ok(s)
}

fn format_change(change: Option<f64>) -> String {
    match change {
        Some(c) if c >= 0.0 => format!("+{c:.1}"),
        Some(c) => format!("{c:.1}"),
        None => String::new(),
    }
}

pub fn table_svg(input: &ElectionInput) -> MagikdResult<String> {
    const LEFT: f64 = 40.0;
    const TOP: f64 = 80.0;
    const ROW: f64 = 32.0;
    const COLUMNS: [(&str, f64); 5] = [
        ("Candidate", 0.0),
        ("Party", 240.0),
        ("Votes", 460.0),
        ("Share %", 580.0),
        ("Change ±%", 680.0),
    ];

    input.validate()?;
    let width = 840.0;
    let footer_rows = if input.electorate > 0 { 2.0 } else { 0.0 };
    let height = TOP + (input.candidates.len() as f64 + 1.0 + footer_rows) * ROW + 40.0;

    let mut s = String::new();
    svg_open(&mut s, width, height);
    svg_title(&mut s, input.title.as_deref());

    let _ = writeln!(
        s,
        r##"<rect x="{}" y="{TOP}" width="{}" height="{ROW}" fill="#e8e8e8"/>"##,
        LEFT - 8.0,
        width - 2.0 * LEFT + 16.0
    );
    for (name, dx) in COLUMNS {
        let _ = writeln!(
            s,
            r#"<text x="{}" y="{}" font-size="14" font-weight="bold">{name}</text>"#,
            LEFT + dx,
            TOP + 21.0
        );
    }

    for (i, c) in input.candidates.iter().enumerate() {
        let y = TOP + (i as f64 + 1.0) * ROW;
        let color = c.color.unwrap_or(PALETTE[i % PALETTE.len()]);
        let _ = writeln!(
            s,
            r#"<rect x="{}" y="{}" width="4" height="{}" fill="{color}"/>"#,
            LEFT - 8.0,
            y + 4.0,
            ROW - 8.0
        );
        let cells = [
            escape_xml(&c.name),
            escape_xml(&c.party_name),
            group_thousands(c.votes),
            format!("{:.1}", c.vote_share),
            format_change(c.vote_share_change),
        ];
        for ((_, dx), cell) in COLUMNS.iter().zip(cells) {
            let _ = writeln!(
                s,
                r#"<text x="{}" y="{}" font-size="14">{cell}</text>"#,
                LEFT + dx,
                y + 21.0
            );
        }
    }

    if input.electorate > 0 {
        let y = TOP + (input.candidates.len() as f64 + 1.0) * ROW;
        let pct = input.turnout as f64 / input.electorate as f64 * 100.0;
        let footer = [
            format!("Electorate: {}", group_thousands(input.electorate)),
            format!("Turnout: {} ({pct:.1}%)", group_thousands(input.turnout)),
        ];
        for (k, line) in footer.iter().enumerate() {
            let _ = writeln!(
                s,
                r#"<text x="{LEFT}" y="{}" font-size="14" font-style="italic">{line}</text>"#,
                y + k as f64 * ROW + 21.0
            );
        }
    }

    s.push_str("</svg>\n");
    Ok(s)
}

#[tracing::instrument(skip_all, fields(candidates = input.candidates.len(), table = input.table))]
pub fn render_election(
    input: &ElectionInput,
    rasterizer: &SvgRasterizer,
) -> MagikdResult<EncodedImage> {
    let svg = if input.table {
        table_svg(input)?
    } else {
        pie_svg(input)?
    };
    rasterizer.render_png(&svg)
}

#[cfg(test)]
#[path = "../../tests/unit/charts/election.rs"]
mod tests;
