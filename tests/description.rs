mod common;

use common::{count, output_dir, texts, write_png};
use report_canvas::{Error, FooterEntry, FooterPosition, ReportCanvas, ReportDescription};

const REPORT: &str = r#"{
  "page": { "title": "Lab results" },
  "title": { "y": 0.9, "title": "Report", "subtitle": "Q3" },
  "demographics": [{ "region": [0.075, 0.82, 0.85, 0.05],
                     "fields": { "Zeta": "last", "Alpha": 1, "Mid": 2.5 } }],
  "tables": [{ "region": [0.075, 0.5, 0.85, 0.3], "rowheader": false,
               "data": { "2024": { "Visits": 15 }, "2023": { "Visits": 12 } } }],
  "texts": [{ "x": 0.5, "y": 0.4, "text": "note", "style": { "fontsize": "small", "ha": "center" } }],
  "lines": [{ "y": 0.35, "xmin": 0.1, "xmax": 0.9 }],
  "footer": { "left": { "type": "text", "content": "Dept. of Medicine" } }
}"#;

#[test]
fn json_keys_keep_document_order() {
    let description = ReportDescription::from_json(REPORT).unwrap();
    let fields: Vec<_> = description.demographics[0].fields.iter().collect();
    assert_eq!(fields, [("Zeta", "last"), ("Alpha", "1"), ("Mid", "2.5")]);

    let columns: Vec<_> = description.tables[0]
        .data
        .columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(columns, ["2024", "2023"]);
    assert!(!description.tables[0].row_header);
}

#[test]
fn description_renders_every_element() {
    let description = ReportDescription::from_json(REPORT).unwrap();
    let mut canvas = ReportCanvas::with_setup(description.page.clone());
    description.render_into(&mut canvas).unwrap();

    let items = texts(&canvas);
    // title 2 + demographics 6 + table 2 headers + 2 cells + text 1 + footer 1
    assert_eq!(items.len(), 14);
    assert_eq!(items[0].text, "Report");
    assert_eq!(items.last().unwrap().text, "Dept. of Medicine");
}

#[test]
fn unknown_footer_type_is_invalid() {
    let json = r#"{ "footer": { "left": { "type": "video", "src": "a.mp4" } } }"#;
    assert!(matches!(
        ReportDescription::from_json(json),
        Err(Error::InvalidSpec(_))
    ));
}

#[test]
fn regions_are_only_accepted_as_region() {
    // `pos` is not accepted in place of `region`
    let json = r#"{ "tables": [{ "pos": [0.075, 0.8, 0.85, 0.3], "data": {} }] }"#;
    let err = ReportDescription::from_json(json).unwrap_err();
    assert!(matches!(err, Error::InvalidSpec(_)));
    assert!(err.to_string().contains("pos"));
}

#[test]
fn unknown_font_size_keyword_is_invalid() {
    let json = r#"{ "texts": [{ "x": 0.1, "y": 0.1, "text": "t", "style": { "size": "huge" } }] }"#;
    let err = ReportDescription::from_json(json).unwrap_err();
    assert!(matches!(err, Error::InvalidSpec(_)));
    assert!(err.to_string().contains("huge"));
}

#[test]
fn file_renders_with_relative_footer_image() {
    let dir = output_dir("description_file");
    write_png(&dir.join("logo.png"), 90, 30);
    let input = dir.join("report.json");
    std::fs::write(
        &input,
        r#"{ "title": { "y": 0.9, "title": "From file" },
             "footer": { "center": { "type": "img", "src": "logo.png", "height": 0.03 } } }"#,
    )
    .unwrap();

    let description = ReportDescription::from_path(&input).unwrap();
    match description.footer.as_ref().and_then(|f| f.get(FooterPosition::Center)) {
        Some(FooterEntry::Image(image)) => assert_eq!(image.source, dir.join("logo.png")),
        other => panic!("unexpected footer entry {other:?}"),
    }

    let output = dir.join("report.pdf");
    let written = report_canvas::render_description_file(&input, &output).unwrap();
    let bytes = std::fs::read(written).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(count(&bytes, "/Subtype /Image"), 1);
}

#[test]
fn missing_description_file_is_io_error() {
    let err = ReportDescription::from_path(std::path::Path::new("tests/output/nope.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_string().contains("nope.json"));
}
