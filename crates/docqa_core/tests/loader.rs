use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use docqa_core::error::codes;
use docqa_core::ingest::{detect_file_kind, load_files, write_combined_text, FileKind};
use docqa_core::workspace::{stage_uploads, UploadedFile};

#[test]
fn loads_text_files_in_order_and_writes_combined_text() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("B.TXT");
    fs::write(&a, "First file.\r\nSecond line.").unwrap();
    fs::write(&b, "\u{feff}Other file.").unwrap();
    let combined = tmp.path().join("out").join("combined_ingest.txt");

    let docs = load_files(&[b.clone(), a.clone()]).expect("load");
    assert!(!combined.exists());
    write_combined_text(&docs, &combined).expect("combined");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].source_id, "B.TXT");
    assert_eq!(docs[0].text, "Other file.");
    assert_eq!(docs[1].source_id, "a.txt");
    assert_eq!(docs[1].text, "First file.\nSecond line.");

    let written = fs::read_to_string(&combined).unwrap();
    assert_eq!(written, "Other file.\n\nFirst file.\nSecond line.");
}

#[test]
fn combined_text_is_overwritten_each_ingestion() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a.txt");
    let combined = tmp.path().join("combined_ingest.txt");
    fs::write(&a, "old").unwrap();
    write_combined_text(&load_files(&[a.clone()]).unwrap(), &combined).unwrap();
    fs::write(&a, "new").unwrap();
    write_combined_text(&load_files(&[a]).unwrap(), &combined).unwrap();
    assert_eq!(fs::read_to_string(&combined).unwrap(), "new");
}

#[test]
fn unsupported_extension_fails_whole_batch_before_reading() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a.txt");
    fs::write(&a, "fine").unwrap();
    let bad = tmp.path().join("report.docx");

    let err = load_files(&[a, bad]).expect_err("should fail");
    assert_eq!(err.code, codes::UNSUPPORTED_FILE_TYPE);
    assert!(err.details.unwrap_or_default().contains("report.docx"));
}

#[test]
fn missing_file_and_invalid_pdf_fail_the_batch() {
    let tmp = tempdir().unwrap();

    let missing = tmp.path().join("missing.txt");
    let err = load_files(&[missing]).expect_err("missing");
    assert_eq!(err.code, codes::LOADER_READ_FAILED);

    let pdf = tmp.path().join("broken.pdf");
    fs::write(&pdf, b"this is not a pdf").unwrap();
    let err = load_files(&[pdf]).expect_err("broken pdf");
    assert_eq!(err.code, codes::LOADER_PDF_FAILED);
}

#[test]
fn detects_kind_case_insensitively() {
    assert_eq!(detect_file_kind("x/Doc.PDF".as_ref()).unwrap(), FileKind::Pdf);
    assert_eq!(detect_file_kind("notes.txt".as_ref()).unwrap(), FileKind::Text);
    assert!(detect_file_kind("noext".as_ref()).is_err());
    assert!(detect_file_kind("archive.txt.gz".as_ref()).is_err());
}

#[test]
fn stages_uploads_under_final_path_component() {
    let tmp = tempdir().unwrap();
    let uploads = tmp.path().join("uploads");
    let paths = stage_uploads(
        &uploads,
        &[
            UploadedFile::new("../sky.txt", "The sky is blue."),
            UploadedFile::new("nested/dir/notes.txt", "Notes."),
        ],
    )
    .expect("stage");
    assert_eq!(paths, vec![uploads.join("sky.txt"), uploads.join("notes.txt")]);
    assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "The sky is blue.");
}

#[test]
fn staging_rejects_batch_with_bad_entry_without_writing() {
    let tmp = tempdir().unwrap();
    let uploads = tmp.path().join("uploads");

    let err = stage_uploads(
        &uploads,
        &[UploadedFile::new("ok.txt", "x"), UploadedFile::new("", "y")],
    )
    .expect_err("empty name");
    assert_eq!(err.code, codes::UPLOAD_INVALID);
    assert!(!uploads.join("ok.txt").exists());

    let err = stage_uploads(&uploads, &[UploadedFile::new("slides.pptx", "z")]).expect_err("ext");
    assert_eq!(err.code, codes::UNSUPPORTED_FILE_TYPE);

    let err = stage_uploads(&uploads, &[]).expect_err("empty");
    assert_eq!(err.code, codes::EMPTY_INPUT);
}

#[test]
fn uploads_reducing_to_the_same_name_are_rejected() {
    let tmp = tempdir().unwrap();
    let uploads = tmp.path().join("uploads");

    let err = stage_uploads(
        &uploads,
        &[
            UploadedFile::new("a/notes.txt", "The sky is blue."),
            UploadedFile::new("b/notes.txt", "Grass is green."),
        ],
    )
    .expect_err("duplicate name");
    assert_eq!(err.code, codes::UPLOAD_INVALID);
    assert!(err.details.unwrap_or_default().contains("index=1"));
    assert!(!uploads.join("notes.txt").exists());
}

fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn pdf_pages_are_joined_in_order_and_empty_pages_skipped() {
    let tmp = tempdir().unwrap();
    let pdf = tmp.path().join("Notes.PDF");
    write_pdf(&pdf, &["The sky is blue.", "", "Grass is green."]);

    let docs = load_files(&[pdf]).expect("load pdf");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].source_id, "Notes.PDF");
    assert_eq!(docs[0].text, "The sky is blue.\nGrass is green.\n");
}
