//! End-to-end tests for Dispatcher::extract().
//!
//! Office fixtures are zipped in memory and staged through SourceFile, the
//! same way an upload is handled. PDF and external-converter backends are
//! mocked so these tests need neither poppler-utils nor markitdown.

use std::io::{Cursor, Write};
use std::path::Path;

use docmark_core::config::Profile;
use docmark_core::error::DocmarkError;
use docmark_core::extraction::{Converter, PdfBackend};
use docmark_core::{Dispatcher, ErrorKind, ExtractionResult, SourceFile};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

struct MockPdf {
    pages: Vec<&'static str>,
}

impl PdfBackend for MockPdf {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, DocmarkError> {
        if !pdf_bytes.starts_with(b"%PDF") {
            return Err(DocmarkError::Pdf("missing %PDF header".into()));
        }
        Ok(self.pages.iter().map(|p| p.to_string()).collect())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct MockConverter;

impl Converter for MockConverter {
    fn convert(&self, path: &Path) -> Result<Vec<u8>, DocmarkError> {
        let name = path.file_name().unwrap().to_string_lossy();
        Ok(format!("converted {name}\n").into_bytes())
    }

    fn converter_name(&self) -> &str {
        "mock"
    }
}

fn dispatcher(profile: Profile) -> Dispatcher {
    Dispatcher::new(
        profile,
        Box::new(MockPdf {
            pages: vec!["Page one", "Page two"],
        }),
        Box::new(MockConverter),
    )
}

fn zip_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn extract_upload(profile: Profile, file_name: &str, bytes: &[u8]) -> ExtractionResult {
    let source = SourceFile::stage(file_name, bytes).unwrap();
    dispatcher(profile).extract(source.path())
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn docx_fixture() -> Vec<u8> {
    zip_parts(&[(
        "word/document.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Hello</w:t></w:r></w:p>
    <w:p><w:r><w:t>World</w:t></w:r></w:p>
    <w:sectPr/>
  </w:body>
</w:document>"#,
    )])
}

/// A workbook whose sheets appear in the given order. Each sheet body is the
/// inner XML of `sheetData`.
fn xlsx_workbook(sheets: &[(&str, &str)]) -> Vec<u8> {
    let mut overrides = String::new();
    let mut sheet_entries = String::new();
    let mut rels = String::new();
    let mut worksheets = Vec::new();

    for (i, (name, rows)) in sheets.iter().enumerate() {
        let n = i + 1;
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        sheet_entries.push_str(&format!(
            r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
        worksheets.push((
            format!("xl/worksheets/sheet{n}.xml"),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{rows}</sheetData></worksheet>"#
            ),
        ));
    }

    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  {overrides}
</Types>"#
    );
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_entries}</sheets></workbook>"#
    );
    let workbook_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
    );

    let mut parts: Vec<(&str, &str)> = vec![
        ("[Content_Types].xml", content_types.as_str()),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", workbook.as_str()),
        ("xl/_rels/workbook.xml.rels", workbook_rels.as_str()),
    ];
    for (name, xml) in &worksheets {
        parts.push((name.as_str(), xml.as_str()));
    }
    zip_parts(&parts)
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

fn xlsx_fixture() -> Vec<u8> {
    xlsx_workbook(&[(
        "Sheet1",
        r#"<row r="1"><c r="A1" t="inlineStr"><is><t>A</t></is></c><c r="B1" t="inlineStr"><is><t>B</t></is></c></row>
           <row r="2"><c r="A2"><v>1</v></c></row>"#,
    )])
}

fn slide(text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
      <p:grpSpPr/>
      <p:sp>
        <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
        <p:spPr/>
        <p:txBody><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
</p:sld>"#
    )
}

/// Slide 2 is listed before slide 1 in the presentation part.
fn pptx_fixture() -> Vec<u8> {
    let first = slide("Closing");
    let second = slide("Opening");
    zip_parts(&[
        (
            "ppt/presentation.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldIdLst>
    <p:sldId id="256" r:id="rId3"/>
    <p:sldId id="257" r:id="rId2"/>
  </p:sldIdLst>
</p:presentation>"#,
        ),
        (
            "ppt/_rels/presentation.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
</Relationships>"#,
        ),
        ("ppt/slides/slide1.xml", first.as_str()),
        ("ppt/slides/slide2.xml", second.as_str()),
    ])
}

// ---------------------------------------------------------------------------
// Native profile
// ---------------------------------------------------------------------------
#[test]
fn docx_paragraphs_one_per_line() {
    let result = extract_upload(Profile::Native, "letter.docx", &docx_fixture());
    assert_eq!(result, ExtractionResult::success("Hello\nWorld\n"));
}

#[test]
fn xlsx_sheet_is_tab_separated() {
    let result = extract_upload(Profile::Native, "Budget.XLSX", &xlsx_fixture());
    assert_eq!(result.text(), Some("--- Sheet: Sheet1 ---\nA\tB\n1\t\n"));
}

#[test]
fn xlsx_sheets_follow_workbook_order() {
    let bytes = xlsx_workbook(&[
        (
            "Zeta",
            r#"<row r="1"><c r="A1" t="inlineStr"><is><t>last letter</t></is></c></row>"#,
        ),
        (
            "Alpha",
            r#"<row r="1"><c r="A1"><v>1</v></c><c r="B1"><v>2</v></c><c r="C1"><f>A1+B1</f><v>3</v></c></row>"#,
        ),
    ]);
    let result = extract_upload(Profile::Native, "two.xlsx", &bytes);
    assert_eq!(
        result.text(),
        Some("--- Sheet: Zeta ---\nlast letter\n--- Sheet: Alpha ---\n1\t2\t=A1+B1\n")
    );
}

#[test]
fn pptx_follows_presentation_order() {
    let result = extract_upload(Profile::Native, "deck.pptx", &pptx_fixture());
    assert_eq!(result.text(), Some("Opening\nClosing\n"));
}

#[test]
fn html_becomes_markdown() {
    let html = b"<html><head><title>ignored</title></head><body>\
        <h1>Report</h1><p>Some <strong>bold</strong> text.</p>\
        <ul><li>one</li><li>two</li></ul></body></html>";
    let result = extract_upload(Profile::Native, "page.htm", html);
    assert_eq!(
        result.text(),
        Some("# Report\n\nSome **bold** text.\n\n- one\n- two\n")
    );
}

/// Text content of an HTML document with all whitespace removed.
fn text_content(html: &str) -> String {
    scraper::Html::parse_document(html)
        .root_element()
        .text()
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn render_markdown(markdown: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

#[test]
fn html_round_trip_preserves_text_content() {
    let html = "<h1>Quarterly report</h1>\
        <h2>1. Intro</h2>\
        <p># not a heading</p><p>1. not a list</p><p>Use &lt;div&gt; tags</p><p>[x](y)</p>\
        <p>- dash</p><p>+ plus</p><p>&gt; not quoted</p><p>= equals</p><p>!important</p>\
        <p>Some <em>it</em>, <strong>bold</strong>, <del>gone</del> and <code>a_b</code>; 2*3 snake_case.</p>\
        <p>AT&amp;amp;T and C:\\temp<br>second line</p>\
        <ul><li>one<ul><li>nested</li></ul></li><li>see <a href=\"https://example.com\">the [1] site</a></li></ul>\
        <ol start=\"4\"><li>four</li><li>five</li></ol>\
        <blockquote><p>quoted text</p></blockquote>\
        <pre><code class=\"language-rust\">let x = a_b * 2;</code></pre>\
        <table><tr><th>Name</th><th>Qty</th></tr><tr><td>a|b</td><td>2</td></tr></table>\
        <hr><p>end</p>";

    let result = extract_upload(Profile::Native, "report.html", html.as_bytes());
    let markdown = result.text().unwrap();
    let rendered = render_markdown(markdown);

    assert_eq!(text_content(&rendered), text_content(html), "markdown was:\n{markdown}");
    assert_eq!(rendered.matches("<h1>").count(), 1);
    assert_eq!(rendered.matches("<h2>").count(), 1);
    assert_eq!(rendered.matches("<ol").count(), 1);
    assert!(rendered.contains("<a href=\"https://example.com\">"));
    assert!(!rendered.contains("href=\"y\""));
}

#[test]
fn pdf_pages_joined_with_newlines() {
    let result = extract_upload(Profile::Native, "scan.pdf", b"%PDF-1.7\n");
    assert_eq!(result.text(), Some("Page one\nPage two\n"));
}

#[test]
fn corrupt_docx_is_extraction_error() {
    let result = extract_upload(Profile::Native, "broken.docx", b"this is not a zip archive");
    assert_eq!(result.error_kind(), Some(ErrorKind::ExtractionError));
    match result {
        ExtractionResult::Failure { message, .. } => {
            assert!(message.starts_with("Error processing file: "));
            assert!(message.ends_with("Please ensure the file is not corrupted."));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn docx_without_document_part_is_extraction_error() {
    let bytes = zip_parts(&[("word/styles.xml", "<w:styles/>")]);
    let result = extract_upload(Profile::Native, "empty.docx", &bytes);
    assert_eq!(result.error_kind(), Some(ErrorKind::ExtractionError));
}

#[test]
fn corrupt_pdf_and_xlsx_are_extraction_errors() {
    let pdf = extract_upload(Profile::Native, "bad.pdf", b"garbage");
    assert_eq!(pdf.error_kind(), Some(ErrorKind::ExtractionError));

    let xlsx = extract_upload(Profile::Native, "bad.xlsx", b"garbage");
    assert_eq!(xlsx.error_kind(), Some(ErrorKind::ExtractionError));
}

#[test]
fn unknown_extension_is_unsupported() {
    let result = extract_upload(Profile::Native, "notes.xyz", b"anything");
    assert_eq!(
        result,
        ExtractionResult::Failure {
            kind: ErrorKind::UnsupportedFormat,
            message: "Unsupported file type '.xyz'. Please upload a supported file.".into(),
        }
    );
}

#[test]
fn extension_dispatch_ignores_content() {
    // A docx archive named .html is decoded as HTML and fails as binary.
    let result = extract_upload(Profile::Native, "disguised.html", &docx_fixture());
    assert_eq!(result.error_kind(), Some(ErrorKind::ExtractionError));
}

// ---------------------------------------------------------------------------
// Generic profile
// ---------------------------------------------------------------------------
#[test]
fn generic_profile_hands_every_file_to_converter() {
    let image = extract_upload(Profile::Generic, "photo.png", b"\x89PNG");
    assert_eq!(image.text(), Some("converted photo.png\n"));

    let docx = extract_upload(Profile::Generic, "letter.docx", &docx_fixture());
    assert_eq!(docx.text(), Some("converted letter.docx\n"));
}

// ---------------------------------------------------------------------------
// Source file lifecycle
// ---------------------------------------------------------------------------
#[test]
fn staged_file_removed_after_failed_extraction() {
    let source = SourceFile::stage("bad.pdf", b"garbage").unwrap();
    let path = source.path().to_path_buf();
    let result = dispatcher(Profile::Native).extract(&path);
    assert!(!result.is_success());
    assert!(path.exists());

    drop(source);
    assert!(!path.exists());
}

#[test]
fn repeated_extraction_is_deterministic() {
    let source = SourceFile::stage("deck.pptx", &pptx_fixture()).unwrap();
    let d = dispatcher(Profile::Native);
    let first = d.extract(source.path());
    let second = d.extract(source.path());
    assert_eq!(first, second);
}

#[test]
fn concurrent_requests_share_one_dispatcher() {
    let d = dispatcher(Profile::Native);
    let docx = SourceFile::stage("a.docx", &docx_fixture()).unwrap();
    let html = SourceFile::stage("b.html", b"<p>x</p>").unwrap();

    std::thread::scope(|s| {
        let a = s.spawn(|| d.extract(docx.path()));
        let b = s.spawn(|| d.extract(html.path()));
        assert_eq!(a.join().unwrap().text(), Some("Hello\nWorld\n"));
        assert_eq!(b.join().unwrap().text(), Some("x\n"));
    });
}
