//! Integration test: Document API

use docx_words::opc::Compression;
use docx_words::{
    Alignment, Document, ErrorKind, Image, ImageFormat, Indentation, NumberingKind, NumberingRef,
    Paragraph, Run, SaveOptions, Shape, ShapeKind, Table,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_new_document_catalogs() {
    init_logging();
    let doc = Document::new();

    let styles = doc.styles();
    assert!(styles.paragraph_styles().contains(&"Normal"));
    assert!(styles.paragraph_styles().contains(&"Heading1"));
    assert!(styles.table_styles().contains(&"TableGrid"));
    assert!(!styles.table_fonts().is_empty());
    assert!(!styles.theme_fonts().is_empty());
    assert_eq!(styles.style_name("Heading1"), Some("heading 1"));

    assert_eq!(doc.paragraph_count(), 0);
    assert_eq!(doc.text(), "");
}

#[test]
fn test_paragraph_text_follows_runs() {
    let mut para = Paragraph::new();
    assert_eq!(para.text(), "");
    para.add_run(Run::new("Hello"));
    para.add_run(Run::new(", "));
    para.add_run(Run::new("World").with_italic());
    assert_eq!(para.text(), "Hello, World");
    assert_eq!(para.style(), "Normal");

    para.set_text("replaced");
    assert_eq!(para.text(), "replaced");
    assert!(!para.runs().next().unwrap().italic());
}

#[test]
fn test_reads_are_detached_copies() {
    let mut doc = Document::new();
    let id = doc.append(Paragraph::with_text("original")).unwrap();

    let mut copy: Paragraph = doc.get(id).unwrap();
    copy.set_text("changed");
    assert_eq!(doc.paragraph(0).unwrap().text(), "original");

    doc.update(&copy).unwrap();
    assert_eq!(doc.paragraph(0).unwrap().text(), "changed");
    assert_eq!(doc.paragraph_count(), 1);
}

#[test]
fn test_append_keeps_order() {
    let mut doc = Document::new();
    doc.append(Paragraph::with_text("a")).unwrap();
    doc.append(Table::new(1, 2).unwrap()).unwrap();
    doc.append(Paragraph::with_text("b")).unwrap();
    doc.append(Shape::new(0, 0, 10, 10, ShapeKind::Triangle))
        .unwrap();

    assert_eq!(doc.elements().len(), 4);
    assert_eq!(doc.paragraph_count(), 2);
    assert_eq!(doc.table_count(), 1);
    assert_eq!(doc.shape_count(), 1);
    assert_eq!(doc.paragraph(1).unwrap().text(), "b");
    assert_eq!(doc.text(), "a\n\t\nb");
}

#[test]
fn test_appending_a_copy_adds_a_new_element() {
    let mut doc = Document::new();
    let first = doc.append(Paragraph::with_text("twin")).unwrap();
    let copy: Paragraph = doc.get(first).unwrap();
    let second = doc.append(copy).unwrap();

    assert_ne!(first, second);
    assert_eq!(doc.paragraph_count(), 2);

    let mut p: Paragraph = doc.get(second).unwrap();
    p.set_text("second");
    doc.update(&p).unwrap();
    assert_eq!(doc.paragraph(0).unwrap().text(), "twin");
    assert_eq!(doc.paragraph(1).unwrap().text(), "second");
}

#[test]
fn test_update_unknown_element() {
    let mut doc = Document::new();
    let err = doc.update(&Paragraph::with_text("stray")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownElement);

    let mut other = Document::new();
    let id = other.append(Table::new(1, 1).unwrap()).unwrap();
    let table: Table = other.get(id).unwrap();
    let err = doc.update(&table).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownElement);
    assert!(!doc.is_modified());
}

#[test]
fn test_get_with_wrong_kind() {
    let mut doc = Document::new();
    let id = doc.append(Paragraph::with_text("p")).unwrap();
    assert!(doc.get::<Table>(id).is_none());
    assert!(doc.get::<Paragraph>(id).is_some());
}

#[test]
fn test_table_dimensions_are_fixed() {
    let table = Table::new(4, 6).unwrap();
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.column_count(), 6);
    assert!(table.rows().all(|r| r.cell_count() == 6));
    assert_eq!(table.column_width(), Some(1560));

    let err = Table::new(0, 3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = Table::new(3, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_table_style_and_width_update() {
    let mut doc = Document::new();
    let id = doc.append(Table::new(2, 2).unwrap()).unwrap();

    let mut table: Table = doc.get(id).unwrap();
    table.set_style("TableGrid");
    table.set_column_width(2000);
    doc.update(&table).unwrap();

    let bytes = doc.to_bytes().unwrap();
    let reloaded = Document::from_bytes(&bytes).unwrap();
    let table = reloaded.table(0).unwrap();
    assert_eq!(table.style(), Some("TableGrid"));
    assert_eq!(table.column_width(), Some(2000));
    assert!(table
        .rows()
        .flat_map(|r| r.cells())
        .all(|c| c.width() == Some(2000)));
}

#[test]
fn test_formatting_round_trip() {
    let mut doc = Document::new();
    let id = doc
        .append(
            Paragraph::with_text("centered")
                .with_alignment(Alignment::Center)
                .with_style("Heading1"),
        )
        .unwrap();

    let mut para: Paragraph = doc.get(id).unwrap();
    para.set_indentation(Indentation {
        left: 1.0,
        right: 0.5,
        first_line: 0.25,
        hanging: 0.0,
    });
    doc.update(&para).unwrap();

    let reloaded = Document::from_bytes(&doc.to_bytes().unwrap()).unwrap();
    let para = reloaded.paragraph(0).unwrap();
    assert_eq!(para.alignment(), Alignment::Center);
    assert_eq!(para.style(), "Heading1");
    assert_eq!(para.indentation().left, 1.0);
    assert_eq!(para.indentation().right, 0.5);
    assert_eq!(para.indentation().first_line, 0.25);
}

#[test]
fn test_numbering_kinds_per_level() {
    let mut doc = Document::new();
    let kinds = [
        (1, NumberingKind::Numeric),
        (2, NumberingKind::Alphabetic),
        (3, NumberingKind::Roman),
    ];
    for (level, kind) in kinds {
        let numbering = NumberingRef::new(1, level, kind).unwrap();
        doc.append(Paragraph::with_text("item").with_numbering(numbering))
            .unwrap();
    }

    let reloaded = Document::from_bytes(&doc.to_bytes().unwrap()).unwrap();
    let paras = reloaded.paragraphs();
    assert!(paras[0].is_numbered());
    assert!(paras[1].is_alphabetic());
    assert!(paras[2].is_roman());
    assert_eq!(reloaded.numbering().definition_count(), 1);
    assert_eq!(reloaded.numbering().level_count(1), 3);

    let err = NumberingRef::new(1, 10, NumberingKind::Numeric).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_numbering_in_table_cells() {
    let mut doc = Document::new();
    let mut table = Table::new(1, 1).unwrap();
    let numbering = NumberingRef::new(4, 1, NumberingKind::Roman).unwrap();
    table
        .cell_mut(0, 0)
        .unwrap()
        .add_paragraph(Paragraph::with_text("in cell").with_numbering(numbering));
    doc.append(table).unwrap();
    assert_eq!(doc.numbering().kind_of(4, 1), Some(NumberingKind::Roman));

    let reloaded = Document::from_bytes(&doc.to_bytes().unwrap()).unwrap();
    let table = reloaded.table(0).unwrap();
    let para = table.cell(0, 0).unwrap().paragraph(1).unwrap();
    assert!(para.is_roman());
}

#[test]
fn test_image_replace_data() {
    let mut doc = Document::new();
    let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    doc.append(Image::new(png.to_vec(), 10, 20)).unwrap();
    let mut doc = Document::from_bytes(&doc.to_bytes().unwrap()).unwrap();

    let mut image = doc.image(0).unwrap();
    assert_eq!(image.format(), Some(ImageFormat::Png));
    image.set_data(JPEG.to_vec());
    image.set_width(40);
    doc.update(&image).unwrap();

    let reloaded = Document::from_bytes(&doc.to_bytes().unwrap()).unwrap();
    let image = reloaded.image(0).unwrap();
    assert_eq!(image.format(), Some(ImageFormat::Jpeg));
    assert_eq!(image.data(), JPEG);
    assert_eq!((image.height(), image.width()), (10, 40));

    let media: Vec<_> = reloaded
        .package()
        .parts()
        .filter(|p| p.uri().as_str().starts_with("/word/media/"))
        .map(|p| p.uri().to_string())
        .collect();
    assert_eq!(media, ["/word/media/image1.jpeg"]);
}

#[test]
fn test_image_moved_between_documents() {
    let mut source = Document::new();
    source.append(Image::new(JPEG.to_vec(), 3, 3)).unwrap();
    let source = Document::from_bytes(&source.to_bytes().unwrap()).unwrap();

    let mut target = Document::new();
    target.append(Paragraph::with_text("before")).unwrap();
    target.append(source.image(0).unwrap()).unwrap();

    let reloaded = Document::from_bytes(&target.to_bytes().unwrap()).unwrap();
    assert_eq!(reloaded.image(0).unwrap().data(), JPEG);
}

#[test]
fn test_shape_update() {
    let mut doc = Document::new();
    let id = doc
        .append(Shape::new(100, 100, 400, 400, ShapeKind::Hexagon))
        .unwrap();

    let mut shape: Shape = doc.get(id).unwrap();
    shape.kind = ShapeKind::Diamond;
    shape.x = 250;
    doc.update(&shape).unwrap();

    let reloaded = Document::from_bytes(&doc.to_bytes().unwrap()).unwrap();
    let shape = reloaded.shape(0).unwrap();
    assert_eq!(shape.kind, ShapeKind::Diamond);
    assert_eq!((shape.x, shape.y, shape.width, shape.height), (250, 100, 400, 400));
}

#[test]
fn test_open_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Document::open(dir.path().join("missing.docx")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_open_garbage() {
    let err = Document::from_bytes(b"definitely not a zip archive").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptArchive);
}

#[test]
fn test_save_with_stored_compression() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stored.docx");

    let mut doc = Document::new();
    doc.append(Paragraph::with_text("uncompressed")).unwrap();
    let options = SaveOptions {
        compression: Compression::Stored,
    };
    doc.save_with(&path, &options).unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let entry = archive.by_name("word/document.xml").unwrap();
    assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
    drop(entry);

    assert_eq!(Document::open(&path).unwrap().text(), "uncompressed");
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|name| name != "stored.docx")
        .collect();
    assert!(leftovers.is_empty(), "{:?}", leftovers);
}

#[test]
fn test_failed_save_keeps_destination() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keep.docx");
    std::fs::write(&path, b"previous").unwrap();

    let mut doc = Document::new();
    let err = doc.save(dir.path().join("no_such_dir").join("x.docx"));
    assert_eq!(err.unwrap_err().kind(), ErrorKind::Io);
    assert_eq!(std::fs::read(&path).unwrap(), b"previous");
}
