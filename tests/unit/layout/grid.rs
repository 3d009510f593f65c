use super::*;

fn items(n: usize) -> Vec<GridItem> {
    (0..n)
        .map(|i| GridItem::new(format!("m{i}"), Rgb8::new(i as u8, 0, 0)))
        .collect()
}

#[test]
fn twenty_three_items_fill_three_columns() {
    let cells = layout_grid(&items(23), ROW_CAPACITY);
    assert_eq!(cells.len(), 23);
    assert_eq!(column_count(23, ROW_CAPACITY), 3);

    let per_column: Vec<usize> = (0..3)
        .map(|c| cells.iter().filter(|cell| cell.position.column == c).count())
        .collect();
    assert_eq!(per_column, vec![10, 10, 3]);
}

#[test]
fn positions_are_column_major() {
    assert_eq!(grid_position(15, 10), GridPosition { column: 1, row: 5 });
    assert_eq!(grid_position(0, 10), GridPosition { column: 0, row: 0 });
    assert_eq!(grid_position(9, 10), GridPosition { column: 0, row: 9 });
    assert_eq!(grid_position(10, 10), GridPosition { column: 1, row: 0 });
}

#[test]
fn insertion_order_is_kept() {
    let cells = layout_grid(&items(12), ROW_CAPACITY);
    let labels: Vec<&str> = cells.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels[0], "m0");
    assert_eq!(labels[11], "m11");
    assert_eq!(cells[11].position, GridPosition { column: 1, row: 1 });
}

#[test]
fn empty_input_yields_no_cells() {
    assert!(layout_grid(&[], ROW_CAPACITY).is_empty());
    assert_eq!(column_count(0, ROW_CAPACITY), 0);
}

#[test]
fn zero_capacity_behaves_like_one() {
    let cells = layout_grid(&items(3), 0);
    assert_eq!(cells[2].position, GridPosition { column: 2, row: 0 });
}

#[test]
fn division_places_dots_from_region_origins() {
    let geometry = DiagramGeometry::default();
    let legend = vec![
        ("Red".to_string(), Rgb8::new(255, 0, 0)),
        ("Blue".to_string(), Rgb8::new(0, 0, 255)),
    ];
    let layout = layout_division(Some("Vote"), &items(23), &items(16), &legend, &geometry);

    assert_eq!(layout.aye.len(), 23);
    assert_eq!(layout.no.len(), 16);
    assert_eq!(layout.aye[0].center, Point::new(48.0, 98.0));
    assert_eq!(layout.no[15].center, Point::new(68.0, 458.0));
    assert_eq!(layout.aye[22].position, GridPosition { column: 2, row: 2 });

    // Legend sits right of the wider (aye) grid, one fixed row per entry.
    assert_eq!(layout.legend[0].swatch.x0, 140.0);
    assert_eq!(layout.legend[0].swatch.y0, 90.0);
    assert_eq!(layout.legend[1].swatch.y0, 114.0);

    assert_eq!(layout.width, 480.0);
    assert_eq!(layout.height, 590.0);
    assert_eq!(layout.title.as_deref(), Some("Vote"));
}

#[test]
fn empty_division_still_has_a_canvas() {
    let layout = layout_division(None, &[], &[], &[], &DiagramGeometry::default());
    assert!(layout.aye.is_empty() && layout.no.is_empty() && layout.legend.is_empty());
    assert!(layout.width > 0.0 && layout.height > 0.0);
}
