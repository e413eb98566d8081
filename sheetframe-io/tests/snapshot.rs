use sheetframe_core::document::{LabelSize, SheetDocument, ViewKind};
use sheetframe_core::geometry::{Point, Vector};
use sheetframe_io::{DocumentLoader, DocumentSaver, IoError, JsonSnapshot};

fn sample_document() -> SheetDocument {
    let mut doc = SheetDocument::new();
    let sheet = doc.add_sheet("Floor Plans", "A101");
    doc.add_frame(sheet, Some(Point::planar(2.75, 0.0)), 2.75, 1.95, 0.0, "A1");
    doc.add_frame(sheet, None, 1.0, 1.0, 0.3, "Legacy");
    let view = doc.add_view(
        "Level 1",
        ViewKind::Drawing,
        1.2,
        0.8,
        Some(LabelSize {
            width: 1.0,
            height: 0.2,
        }),
    );
    let placement = doc
        .place_view(view, sheet, Point::planar(1.0, 1.0), None)
        .expect("place");
    doc.set_label_offset(placement, Vector::planar(0.1, -0.5));
    doc.add_view("Legend", ViewKind::Legend, 0.5, 0.5, None);
    doc
}

#[test]
fn snapshot_round_trip_preserves_document() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("sheet.json");
    let doc = sample_document();

    JsonSnapshot::pretty().save(&doc, &path).expect("保存快照失败");
    let loaded = JsonSnapshot::new().load(&path).expect("读取快照失败");
    assert_eq!(loaded, doc);

    let sheet = loaded.sheets().next().expect("sheet").id;
    let items = loaded.items_on(sheet);
    assert_eq!(items.len(), 1);
    let offset = items[0].label_offset().expect("label offset");
    assert!((offset.x() - 0.1).abs() < 1e-12);
    assert_eq!(loaded.frames_on(sheet).filter(|f| f.anchor.is_none()).count(), 1);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = JsonSnapshot::new()
        .load(&dir.path().join("absent.json"))
        .unwrap_err();
    assert!(matches!(err, IoError::ReadError { .. }));
}
