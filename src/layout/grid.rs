use kurbo::{Point, Rect, Vec2};

use crate::foundation::core::Rgb8;

/// Dots per column before the grid wraps to the next column.
pub const ROW_CAPACITY: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridItem {
    pub label: String,
    pub color: Rgb8,
}

impl GridItem {
    pub fn new(label: impl Into<String>, color: Rgb8) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPosition {
    pub column: usize,
    pub row: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridCell {
    pub label: String,
    pub color: Rgb8,
    pub position: GridPosition,
}

/// Column-major position of the `index`-th item.
pub fn grid_position(index: usize, row_capacity: usize) -> GridPosition {
    let cap = row_capacity.max(1);
    GridPosition {
        column: index / cap,
        row: index % cap,
    }
}

pub fn column_count(items: usize, row_capacity: usize) -> usize {
    items.div_ceil(row_capacity.max(1))
}

/// Assign grid positions in insertion order. A capacity of 0 is treated as 1.
pub fn layout_grid(items: &[GridItem], row_capacity: usize) -> Vec<GridCell> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| GridCell {
            label: item.label.clone(),
            color: item.color,
            position: grid_position(i, row_capacity),
        })
        .collect()
}

/// Fixed placement constants of the division diagram, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiagramGeometry {
    pub row_capacity: usize,
    pub dot_radius: f64,
    /// Distance between neighbouring dot origins, both across and down.
    pub pitch: f64,
    pub title_origin: Point,
    pub aye_origin: Point,
    pub no_origin: Point,
    /// Offset of a grid heading above its origin.
    pub heading_offset: f64,
    /// Horizontal gap between the widest grid and the legend.
    pub legend_gap: f64,
    pub legend_row_height: f64,
    pub legend_swatch: f64,
    /// Space reserved for legend text.
    pub legend_text_width: f64,
    pub margin: f64,
    pub min_width: f64,
}

impl Default for DiagramGeometry {
    fn default() -> Self {
        Self {
            row_capacity: ROW_CAPACITY,
            dot_radius: 8.0,
            pitch: 20.0,
            title_origin: Point::new(40.0, 40.0),
            aye_origin: Point::new(40.0, 90.0),
            no_origin: Point::new(40.0, 350.0),
            heading_offset: 12.0,
            legend_gap: 40.0,
            legend_row_height: 24.0,
            legend_swatch: 16.0,
            legend_text_width: 220.0,
            margin: 40.0,
            min_width: 480.0,
        }
    }
}

impl DiagramGeometry {
    /// Vertical extent of a full column.
    pub fn grid_height(&self) -> f64 {
        self.row_capacity.max(1) as f64 * self.pitch
    }

    pub fn grid_width(&self, items: usize) -> f64 {
        column_count(items, self.row_capacity) as f64 * self.pitch
    }

    fn dot_center(&self, origin: Point, position: GridPosition) -> Point {
        origin
            + Vec2::new(
                position.column as f64 * self.pitch + self.dot_radius,
                position.row as f64 * self.pitch + self.dot_radius,
            )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedDot {
    pub label: String,
    pub color: Rgb8,
    pub position: GridPosition,
    pub center: Point,
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub color: Rgb8,
    pub swatch: Rect,
    /// Baseline-left of the entry's text.
    pub text_origin: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DivisionLayout {
    pub title: Option<String>,
    pub title_origin: Point,
    pub aye_heading: Point,
    pub no_heading: Point,
    pub aye: Vec<PlacedDot>,
    pub no: Vec<PlacedDot>,
    pub legend: Vec<LegendEntry>,
    pub width: f64,
    pub height: f64,
}

fn place(items: &[GridItem], origin: Point, geometry: &DiagramGeometry) -> Vec<PlacedDot> {
    layout_grid(items, geometry.row_capacity)
        .into_iter()
        .map(|cell| PlacedDot {
            center: geometry.dot_center(origin, cell.position),
            radius: geometry.dot_radius,
            label: cell.label,
            color: cell.color,
            position: cell.position,
        })
        .collect()
}

/// Place both grids, the legend and the title.
///
/// The legend is a vertical list starting level with the aye grid, to the right of whichever grid
/// is wider. The canvas grows to fit every element.
pub fn layout_division(
    title: Option<&str>,
    aye: &[GridItem],
    no: &[GridItem],
    legend: &[(String, Rgb8)],
    geometry: &DiagramGeometry,
) -> DivisionLayout {
    let aye_dots = place(aye, geometry.aye_origin, geometry);
    let no_dots = place(no, geometry.no_origin, geometry);

    let grids_right = (geometry.aye_origin.x + geometry.grid_width(aye.len()))
        .max(geometry.no_origin.x + geometry.grid_width(no.len()));
    let legend_x = grids_right + geometry.legend_gap;
    let legend_top = geometry.aye_origin.y;

    let legend_entries: Vec<LegendEntry> = legend
        .iter()
        .enumerate()
        .map(|(i, (name, color))| {
            let y = legend_top + i as f64 * geometry.legend_row_height;
            let swatch = Rect::new(
                legend_x,
                y,
                legend_x + geometry.legend_swatch,
                y + geometry.legend_swatch,
            );
            LegendEntry {
                name: name.clone(),
                color: *color,
                swatch,
                text_origin: Point::new(swatch.x1 + 8.0, swatch.y1 - 3.0),
            }
        })
        .collect();

    let legend_bottom = legend_top + legend.len() as f64 * geometry.legend_row_height;
    let grids_bottom = (geometry.aye_origin.y + geometry.grid_height())
        .max(geometry.no_origin.y + geometry.grid_height());

    let width = (legend_x + geometry.legend_text_width + geometry.margin).max(geometry.min_width);
    let height = grids_bottom.max(legend_bottom) + geometry.margin;

    DivisionLayout {
        title: title.map(str::to_owned),
        title_origin: geometry.title_origin,
        aye_heading: geometry.aye_origin - Vec2::new(0.0, geometry.heading_offset),
        no_heading: geometry.no_origin - Vec2::new(0.0, geometry.heading_offset),
        aye: aye_dots,
        no: no_dots,
        legend: legend_entries,
        width: width.ceil(),
        height: height.ceil(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
