//! Shared access to Office Open XML packages (docx, pptx).
//!
//! A package is a zip archive of XML parts. Parts are addressed by their
//! archive path, e.g. `word/document.xml`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::DocmarkError;

pub struct Package {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl Package {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Package, DocmarkError> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocmarkError::Archive(e.to_string()))?;
        Ok(Package { archive })
    }

    /// Read a part as UTF-8 text.
    pub fn read_part(&mut self, name: &str) -> Result<String, DocmarkError> {
        let mut file = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => DocmarkError::MissingPart(name.to_string()),
            other => DocmarkError::Archive(other.to_string()),
        })?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| DocmarkError::Archive(format!("{name}: {e}")))?;
        Ok(content)
    }

    pub fn read_optional_part(&mut self, name: &str) -> Result<Option<String>, DocmarkError> {
        match self.read_part(name) {
            Ok(content) => Ok(Some(content)),
            Err(DocmarkError::MissingPart(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(|s| s.to_string()).collect()
    }
}

/// Map of relationship id to target from a `.rels` part.
pub fn parse_relationships(xml: &str, part: &str) -> Result<Vec<(String, String)>, DocmarkError> {
    let mut reader = Reader::from_str(xml);
    let mut rels = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map_err(|err| xml_error(part, err))?
                        .into_owned();
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    rels.push((id, target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(part, e)),
            _ => {}
        }
    }

    Ok(rels)
}

pub fn xml_error(part: &str, err: impl std::fmt::Display) -> DocmarkError {
    DocmarkError::Xml {
        part: part.to_string(),
        reason: err.to_string(),
    }
}
