//! Integration test: save, reload, compare

use docx_words::{
    BlockContent, Border, BorderWidth, Color, Document, Image, Indentation, NumberingKind,
    NumberingRef, Paragraph, Run, Shape, ShapeKind, Table,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// PNG signature followed by filler, `len` bytes in total
fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend((0..len.saturating_sub(data.len())).map(|i| (i % 251) as u8));
    data
}

fn reload(doc: &mut Document) -> Document {
    let bytes = doc.to_bytes().expect("save to bytes");
    Document::from_bytes(&bytes).expect("reopen")
}

fn save_and_open(doc: &mut Document) -> Document {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("round_trip.docx");
    doc.save(&path).expect("save");
    Document::open(&path).expect("open")
}

#[test]
fn test_left_indent_survives_save() {
    let mut doc = Document::new();
    doc.append(Paragraph::with_text("indented").with_indentation(Indentation::left(2.0)))
        .unwrap();

    let reloaded = save_and_open(&mut doc);
    let ind = reloaded.paragraph(0).unwrap().indentation();
    assert_eq!(ind.left, 2.0);
    assert_eq!(ind.right, 0.0);
    assert_eq!(ind.first_line, 0.0);
    assert_eq!(ind.hanging, 0.0);
}

#[test]
fn test_table_cell_text_survives_save() {
    let mut doc = Document::new();
    let id = doc.append(Table::new(5, 3).unwrap()).unwrap();

    let mut table: Table = doc.get(id).unwrap();
    table.cell_mut(1, 0).unwrap().set_text("X");
    doc.update(&table).unwrap();

    let reloaded = save_and_open(&mut doc);
    let table = reloaded.table(0).unwrap();
    let cell = table.row(1).unwrap().cell(0).unwrap();
    assert_eq!(cell.paragraph(0).unwrap().text(), "X");

    assert_eq!(table.row_count(), 5);
    assert!(table.rows().all(|r| r.cell_count() == 3));
    let total: usize = table.rows().map(|r| r.cell_count()).sum();
    assert_eq!(total, 15);
}

#[test]
fn test_image_bytes_and_size_survive_save() {
    let data = png_bytes(1234);
    let mut doc = Document::new();
    doc.append(Image::new(data.clone(), 300, 350)).unwrap();

    let reloaded = save_and_open(&mut doc);
    assert_eq!(reloaded.image_count(), 1);
    let image = reloaded.image(0).unwrap();
    assert_eq!(image.height(), 300);
    assert_eq!(image.width(), 350);
    assert_eq!(image.data().len(), data.len());
    assert_eq!(image.data(), &data[..]);
}

#[test]
fn test_border_size_zero_means_absent() {
    let mut doc = Document::new();
    let border = Border::new(BorderWidth::Single, Color::BLUE, 4);
    doc.append(Paragraph::with_text("boxed").with_border(border))
        .unwrap();

    let mut reloaded = reload(&mut doc);
    let mut para = reloaded.paragraph(0).unwrap();
    assert_eq!(para.border(), Some(border));

    para.set_border(Border::new(BorderWidth::Single, Color::BLUE, 0));
    reloaded.update(&para).unwrap();

    let again = reload(&mut reloaded);
    assert_eq!(again.paragraph(0).unwrap().border(), None);
}

#[test]
fn test_shared_numbering_definition() {
    let mut doc = Document::new();
    for text in ["one", "two", "three"] {
        let numbering = NumberingRef::new(7, 1, NumberingKind::Alphabetic).unwrap();
        doc.append(Paragraph::with_text(text).with_numbering(numbering))
            .unwrap();
    }

    let reloaded = reload(&mut doc);
    assert_eq!(reloaded.numbering().definition_count(), 1);
    assert_eq!(reloaded.numbering().level_count(7), 1);
    for para in reloaded.paragraphs() {
        assert!(para.is_alphabetic());
        assert_eq!(para.numbering_id(), Some(7));
        assert_eq!(para.numbering_level(), Some(1));
    }
}

#[test]
fn test_model_built_body_round_trips() {
    let mut doc = Document::new();
    doc.append(
        Paragraph::with_text("Title")
            .with_style("Title")
            .with_alignment(docx_words::Alignment::Center),
    )
    .unwrap();
    doc.append(
        Paragraph::new()
            .with_run(Run::new("bold ").with_bold())
            .with_run(Run::new("and red").with_color(Color::RED).with_font("Arial", 14.0)),
    )
    .unwrap();
    doc.append(
        Paragraph::with_text("ii")
            .with_numbering(NumberingRef::new(2, 2, NumberingKind::Roman).unwrap()),
    )
    .unwrap();
    doc.append(Table::new(2, 2).unwrap().with_style("TableGrid"))
        .unwrap();
    doc.append(Image::new(png_bytes(64), 20, 40)).unwrap();
    doc.append(Shape::new(10, 20, 100, 50, ShapeKind::Hexagon))
        .unwrap();

    let reloaded = reload(&mut doc);
    assert_eq!(reloaded.elements(), doc.elements());

    let kinds: Vec<_> = reloaded
        .elements()
        .iter()
        .map(|b| match b {
            BlockContent::Paragraph(_) => "p",
            BlockContent::Table(_) => "tbl",
            BlockContent::Image(_) => "image",
            BlockContent::Shape(_) => "shape",
            BlockContent::Unknown(_) => "unknown",
        })
        .collect();
    assert_eq!(kinds, ["p", "p", "p", "tbl", "image", "shape"]);
}

#[test]
fn test_repeated_save_is_stable() {
    let mut doc = Document::new();
    doc.append(Paragraph::with_text("stable")).unwrap();
    doc.append(Image::new(png_bytes(32), 5, 5)).unwrap();
    doc.append(Shape::new(0, 0, 8, 8, ShapeKind::Ellipse)).unwrap();

    let first_bytes = doc.to_bytes().unwrap();
    let mut first = Document::from_bytes(&first_bytes).unwrap();
    let main_xml = |doc: &Document| {
        doc.package()
            .main_document_part()
            .unwrap()
            .data()
            .to_vec()
    };
    let before = main_xml(&first);

    let mut second = reload(&mut first);
    assert_eq!(second.elements(), first.elements());
    assert_eq!(main_xml(&second), before);

    let third = reload(&mut second);
    assert_eq!(third.elements(), first.elements());
    assert_eq!(third.package().parts().count(), first.package().parts().count());
}

#[test]
fn test_save_after_save() {
    let dir = TempDir::new().unwrap();
    let mut doc = Document::new();
    doc.append(Paragraph::with_text("first")).unwrap();
    doc.save(dir.path().join("a.docx")).unwrap();
    assert!(!doc.is_modified());

    doc.append(Paragraph::with_text("second")).unwrap();
    assert!(doc.is_modified());
    doc.save(dir.path().join("b.docx")).unwrap();

    let a = Document::open(dir.path().join("a.docx")).unwrap();
    let b = Document::open(dir.path().join("b.docx")).unwrap();
    assert_eq!(a.text(), "first");
    assert_eq!(b.text(), "first\nsecond");
}
