mod common;

use common::{approx, lines, texts};
use report_canvas::{Color, Error, FontSize, LineStyle, Rect, ReportCanvas, TextStyle};

#[test]
fn regions_past_the_page_edges_are_rejected() {
    let mut canvas = ReportCanvas::new();
    for rect in [
        Rect::new(0.8, 0.1, 0.3, 0.1),
        Rect::new(0.1, 0.95, 0.2, 0.1),
    ] {
        match canvas.add_region(rect) {
            Err(Error::LayoutViolation { rect: rejected }) => assert_eq!(rejected, rect),
            other => panic!("expected LayoutViolation, got {other:?}"),
        }
    }
    // Touching the edge exactly is allowed
    canvas.add_region(Rect::new(0.7, 0.0, 0.3, 1.0)).unwrap();
}

#[test]
fn add_regions_splits_into_equal_columns() {
    let mut canvas = ReportCanvas::new();
    let first = canvas.add_region(Rect::new(0.0, 0.0, 0.1, 0.1)).unwrap();
    assert_eq!(first.index(), 0);
    let ids = canvas.add_regions(Rect::new(0.1, 0.2, 0.8, 0.3), 4).unwrap();
    assert_eq!(ids.len(), 4);
    let indices: Vec<usize> = ids.iter().map(|id| id.index()).collect();
    assert_eq!(indices, [1, 2, 3, 4]);
    for (i, id) in ids.iter().enumerate() {
        let rect = canvas.region_rect(*id).unwrap();
        assert!(approx(rect.width, 0.2));
        assert!(approx(rect.left, 0.1 + 0.2 * i as f32));
        assert!(approx(rect.bottom, 0.2));
        assert!(approx(rect.height, 0.3));
    }
    assert!(matches!(
        canvas.add_regions(Rect::new(0.5, 0.2, 0.6, 0.3), 2),
        Err(Error::LayoutViolation { .. })
    ));
}

#[test]
fn region_relative_drawing_maps_to_page() {
    let mut canvas = ReportCanvas::new();
    let id = canvas.add_region(Rect::new(0.2, 0.4, 0.5, 0.2)).unwrap();
    canvas
        .region_text(id, 0.5, 0.5, "mid", &TextStyle::default())
        .unwrap();
    canvas
        .region_line(id, 1.0, 0.0, 1.0, &LineStyle::default())
        .unwrap();

    let text = &texts(&canvas)[0];
    assert!(approx(text.x, 0.45));
    assert!(approx(text.y, 0.5));

    let line = &lines(&canvas)[0];
    assert!(approx(line.y, 0.6));
    assert!(approx(line.x_start, 0.2));
    assert!(approx(line.x_end, 0.7));
}

#[test]
fn regions_from_another_canvas_are_unknown() {
    let mut other = ReportCanvas::new();
    other.add_region(Rect::new(0.1, 0.1, 0.1, 0.1)).unwrap();
    let foreign = other.add_region(Rect::new(0.2, 0.2, 0.1, 0.1)).unwrap();

    let mut canvas = ReportCanvas::new();
    canvas.add_region(Rect::new(0.1, 0.1, 0.1, 0.1)).unwrap();
    assert!(matches!(canvas.region_rect(foreign), Err(Error::UnknownRegion(1))));
    assert!(matches!(
        canvas.region_text(foreign, 0.0, 0.0, "x", &TextStyle::default()),
        Err(Error::UnknownRegion(1))
    ));
    assert!(texts(&canvas).is_empty());
}

#[test]
fn placed_text_keeps_resolved_style() {
    let size: FontSize = "large".parse().unwrap();
    let mut canvas = ReportCanvas::new();
    canvas
        .place_text(
            0.1,
            0.2,
            "a\nb\nc",
            &TextStyle::sized(size).bold().colored(Color::rgb(0.2, 0.4, 0.6)),
        )
        .unwrap();
    let text = &texts(&canvas)[0];
    assert!(approx(text.font_size, 12.0));
    assert!(text.bold);
    assert_eq!(text.color, Color::rgb(0.2, 0.4, 0.6));
    assert_eq!(text.line_spacing, 1.2);
    assert_eq!(text.text, "a\nb\nc");
}
