use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::DocmarkError;
use crate::extraction::ooxml::{parse_relationships, xml_error, Package};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// A soft line break (`a:br`) inside a paragraph. Paragraph ends are `\n`.
const LINE_BREAK: char = '\u{0b}';

/// Extract the text of every text-bearing shape, slide by slide.
///
/// Each autoshape's text is followed by `\n`; an autoshape without a text
/// body still has (empty) text and yields a blank line. Pictures, tables,
/// connectors and group shapes have no text and are skipped.
pub fn extract_text(bytes: Vec<u8>) -> Result<String, DocmarkError> {
    let mut package = Package::from_bytes(bytes)?;
    let slide_parts = slide_order(&mut package)?;

    let mut text = String::new();
    let mut shapes = 0;
    for part in &slide_parts {
        let xml = package.read_part(part)?;
        for shape_text in parse_shape_texts(&xml, part)? {
            text.push_str(&shape_text);
            text.push('\n');
            shapes += 1;
        }
    }

    debug!(slides = slide_parts.len(), shapes, "pptx parsed");
    Ok(text)
}

/// Slide part names in presentation order.
///
/// The order comes from `p:sldIdLst` in the presentation part. Packages
/// without one fall back to the numeric order of `ppt/slides/slideN.xml`.
fn slide_order(package: &mut Package) -> Result<Vec<String>, DocmarkError> {
    let presentation = package.read_part(PRESENTATION_PART)?;
    let ids = parse_slide_ids(&presentation)?;

    if !ids.is_empty() {
        if let Some(rels_xml) = package.read_optional_part(PRESENTATION_RELS_PART)? {
            let rels = parse_relationships(&rels_xml, PRESENTATION_RELS_PART)?;
            let parts: Vec<String> = ids
                .iter()
                .filter_map(|id| rels.iter().find(|(rel_id, _)| rel_id == id))
                .map(|(_, target)| resolve_target(target))
                .collect();
            if !parts.is_empty() {
                return Ok(parts);
            }
        }
    }

    let mut numbered: Vec<(u32, String)> = package
        .part_names()
        .into_iter()
        .filter_map(|name| slide_number(&name).map(|n| (n, name)))
        .collect();
    numbered.sort();
    Ok(numbered.into_iter().map(|(_, name)| name).collect())
}

fn parse_slide_ids(xml: &str) -> Result<Vec<String>, DocmarkError> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sldId" => {
                for attr in e.attributes().flatten() {
                    // r:id, the relationship id. The bare `id` is the slide id.
                    if attr.key.as_ref() != b"id" && attr.key.local_name().as_ref() == b"id" {
                        let value = attr
                            .unescape_value()
                            .map_err(|err| xml_error(PRESENTATION_PART, err))?;
                        ids.push(value.into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(PRESENTATION_PART, e)),
            _ => {}
        }
    }

    Ok(ids)
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{target}"),
    }
}

fn slide_number(part: &str) -> Option<u32> {
    part.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Text of each top-level `p:sp` shape, in tree order. Shapes without a text
/// body give `""`.
///
/// Paragraphs of a shape are joined with `\n`; `a:br` inside a paragraph
/// becomes a vertical tab.
pub fn parse_shape_texts(xml: &str, part: &str) -> Result<Vec<String>, DocmarkError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut texts = Vec::new();
    let mut shape: Option<ShapeText> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if let Some(s) = shape.as_mut() {
                    match name.as_slice() {
                        b"txBody" => s.has_body = true,
                        b"p" if s.has_body => s.paragraphs.push(String::new()),
                        _ => {}
                    }
                } else if name == b"sp" && stack.last().is_some_and(|n| n == b"spTree") {
                    shape = Some(ShapeText {
                        depth: stack.len() + 1,
                        has_body: false,
                        paragraphs: Vec::new(),
                    });
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                if let Some(s) = shape.as_mut() {
                    match e.local_name().as_ref() {
                        b"txBody" => s.has_body = true,
                        b"p" if s.has_body => s.paragraphs.push(String::new()),
                        b"br" => {
                            if let Some(p) = s.paragraphs.last_mut() {
                                p.push(LINE_BREAK);
                            }
                        }
                        _ => {}
                    }
                } else if e.local_name().as_ref() == b"sp"
                    && stack.last().is_some_and(|n| n == b"spTree")
                {
                    texts.push(String::new());
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(s) = shape.as_mut() {
                    if stack.last().is_some_and(|n| n == b"t") {
                        let unescaped = t.unescape().map_err(|e| xml_error(part, e))?;
                        if let Some(p) = s.paragraphs.last_mut() {
                            p.push_str(&unescaped);
                        }
                    }
                }
            }
            Ok(Event::End(_)) => {
                if shape.as_ref().is_some_and(|s| s.depth == stack.len()) {
                    if let Some(s) = shape.take() {
                        texts.push(s.paragraphs.join("\n"));
                    }
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(part, e)),
            _ => {}
        }
    }

    Ok(texts)
}

struct ShapeText {
    depth: usize,
    has_body: bool,
    paragraphs: Vec<String>,
}
