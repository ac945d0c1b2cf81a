mod common;

use common::{approx, output_dir, texts, write_png};
use report_canvas::{
    Color, Error, FontSize, FooterEntry, FooterImage, FooterPosition, FooterSpec, FooterText,
    HAlign, ReportCanvas,
};

fn images(canvas: &ReportCanvas) -> Vec<report_canvas::ImageItem> {
    canvas
        .primitives()
        .unwrap()
        .iter()
        .filter_map(|p| p.as_image().cloned())
        .collect()
}

#[test]
fn text_zones_anchor_by_position() {
    let spec = FooterSpec::new()
        .with(FooterPosition::Left, FooterEntry::Text(FooterText::new("Dept. of Medicine")))
        .with(FooterPosition::Center, FooterEntry::Text(FooterText::new("Confidential")))
        .with(FooterPosition::Right, FooterEntry::Text(FooterText::new("Page 1\nof 1")));
    let mut canvas = ReportCanvas::new();
    canvas.set_footer(&spec, None).unwrap();

    let items = texts(&canvas);
    assert_eq!(items.len(), 3);
    let expected = [(0.075, HAlign::Left), (0.5, HAlign::Center), (0.925, HAlign::Right)];
    for (item, (x, align)) in items.iter().zip(expected) {
        assert!(approx(item.x, x), "{} at {}", item.text, item.x);
        assert_eq!(item.align, align);
        assert!(approx(item.y, 0.05));
        assert!(approx(item.font_size, FontSize::XSmall.points()));
        assert_eq!(item.line_spacing, 1.5);
        assert_eq!(item.color, Color::BLACK);
    }
}

#[test]
fn text_options_override_defaults() {
    let text = FooterText {
        content: "Printed 2024-05-01".into(),
        color: Some(Color::gray(0.5)),
        font_size: Some(FontSize::Points(9.0)),
        line_spacing: Some(1.0),
    };
    let spec = FooterSpec::new().with(FooterPosition::Center, FooterEntry::Text(text));
    let mut canvas = ReportCanvas::new();
    canvas.set_footer(&spec, Some(0.03)).unwrap();

    let item = &texts(&canvas)[0];
    assert_eq!(item.color, Color::gray(0.5));
    assert_eq!(item.font_size, 9.0);
    assert_eq!(item.line_spacing, 1.0);
    assert!(approx(item.y, 0.03));
}

#[test]
fn image_width_preserves_aspect_ratio() {
    let dir = output_dir("footer_aspect");
    let logo = dir.join("logo_300x100.png");
    write_png(&logo, 300, 100);

    for height in [0.02, 0.04, 0.08] {
        let spec = FooterSpec::new().with(
            FooterPosition::Left,
            FooterEntry::Image(FooterImage::new(&logo).with_height(height)),
        );
        let mut canvas = ReportCanvas::new();
        canvas.set_footer(&spec, None).unwrap();

        let placed = images(&canvas);
        assert_eq!(placed.len(), 1);
        let rect = placed[0].rect;
        assert!(approx(rect.height, height));
        assert!(approx(rect.width, height * 300.0 / 100.0));
        assert!(approx(rect.left, 0.075));
        assert!(approx(rect.bottom, 0.05 - 0.008));
    }
}

#[test]
fn image_zones_and_default_height() {
    let dir = output_dir("footer_zones");
    let logo = dir.join("logo_200x100.png");
    write_png(&logo, 200, 100);

    let spec = FooterSpec::new()
        .with(FooterPosition::Center, FooterEntry::Image(FooterImage::new(&logo)))
        .with(FooterPosition::Right, FooterEntry::Image(FooterImage::new(&logo)));
    let mut canvas = ReportCanvas::new();
    canvas.set_footer(&spec, None).unwrap();

    let height = (1.0 - 0.075 - 0.05) / 15.0;
    let width = 2.0 * height;
    let placed = images(&canvas);
    assert_eq!(placed.len(), 2);
    assert!(approx(placed[0].rect.height, height));
    assert!(approx(placed[0].rect.left, 0.5 - width / 2.0));
    assert!(approx(placed[1].rect.left, 1.0 - 0.075 - width));
    assert_ne!(placed[0].region, placed[1].region);
    assert_eq!(canvas.region_rect(placed[1].region).unwrap(), placed[1].rect);
}

#[test]
fn missing_image_names_the_path() {
    let spec = FooterSpec::new()
        .with(FooterPosition::Left, FooterEntry::Text(FooterText::new("kept")))
        .with(
            FooterPosition::Right,
            FooterEntry::Image(FooterImage::new("tests/output/does-not-exist.png")),
        );
    let mut canvas = ReportCanvas::new();
    let err = canvas.set_footer(&spec, None).unwrap_err();
    match &err {
        Error::MissingAsset { path, .. } => assert!(path.ends_with("does-not-exist.png")),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("does-not-exist.png"));
    // Zones drawn before the failure stay on the page
    assert_eq!(texts(&canvas).len(), 1);
}

#[test]
fn empty_footer_draws_nothing() {
    let spec = FooterSpec::new();
    assert!(spec.is_empty());
    let mut canvas = ReportCanvas::new();
    canvas.set_footer(&spec, None).unwrap();
    assert!(canvas.primitives().unwrap().is_empty());

    let spec = spec.with(FooterPosition::Center, FooterEntry::Text(FooterText::new("x")));
    assert!(!spec.is_empty());
}

#[test]
fn image_without_source_is_invalid() {
    let spec = FooterSpec::new().with(FooterPosition::Left, FooterEntry::Image(FooterImage::new("")));
    let mut canvas = ReportCanvas::new();
    assert!(matches!(canvas.set_footer(&spec, None), Err(Error::InvalidSpec(_))));
}

#[test]
fn non_image_file_is_a_missing_asset() {
    let dir = output_dir("footer_not_image");
    let bogus = dir.join("notes.png");
    std::fs::write(&bogus, b"definitely not a png").unwrap();
    let spec = FooterSpec::new().with(FooterPosition::Left, FooterEntry::Image(FooterImage::new(&bogus)));
    let mut canvas = ReportCanvas::new();
    assert!(matches!(
        canvas.set_footer(&spec, None),
        Err(Error::MissingAsset { .. })
    ));
}
