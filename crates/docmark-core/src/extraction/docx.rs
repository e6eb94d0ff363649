use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::DocmarkError;
use crate::extraction::ooxml::{xml_error, Package};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the body paragraphs of a Word document, one line per paragraph.
///
/// Every paragraph is followed by `\n`, including the last one.
pub fn extract_text(bytes: Vec<u8>) -> Result<String, DocmarkError> {
    let mut package = Package::from_bytes(bytes)?;
    let xml = package.read_part(DOCUMENT_PART)?;
    let paragraphs = parse_paragraphs(&xml)?;
    debug!(paragraphs = paragraphs.len(), "docx parsed");

    let mut text = String::new();
    for paragraph in &paragraphs {
        text.push_str(paragraph);
        text.push('\n');
    }
    Ok(text)
}

/// Collect the text of each `w:p` that is a direct child of `w:body`.
///
/// Paragraphs inside tables, content controls and text boxes are not body
/// paragraphs and are left out. Within a paragraph, `w:t` contributes its
/// text, `w:tab` a tab and `w:br`/`w:cr` a line break.
pub fn parse_paragraphs(xml: &str) -> Result<Vec<String>, DocmarkError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    // Depth of the w:p currently being collected.
    let mut paragraph_depth = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"p" && current.is_none() && parent_is_body(&stack) {
                    current = Some(String::new());
                    paragraph_depth = stack.len() + 1;
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = e.local_name();
                match (&mut current, name.as_ref()) {
                    (None, b"p") if parent_is_body(&stack) => paragraphs.push(String::new()),
                    (Some(text), b"tab") if in_run(&stack) => text.push('\t'),
                    (Some(text), b"br" | b"cr") if in_run(&stack) => text.push('\n'),
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(text) = current.as_mut() {
                    if stack.last().is_some_and(|n| n == b"t") && !in_text_box(&stack) {
                        let unescaped = t.unescape().map_err(|e| xml_error(DOCUMENT_PART, e))?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if current.is_some() && stack.len() == paragraph_depth {
                    paragraphs.extend(current.take());
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(DOCUMENT_PART, e)),
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn parent_is_body(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|n| n == b"body")
}

fn in_run(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|n| n == b"r") && !in_text_box(stack)
}

fn in_text_box(stack: &[Vec<u8>]) -> bool {
    stack.iter().any(|n| n == b"txbxContent")
}
