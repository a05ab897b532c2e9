//! Reading parts and relationships out of an OPC (ZIP) package.

use crate::xml::{self, XmlNode};
use deck_core::{Error, Result};
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Main document part of a presentation package.
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// A relationship from one part to another, with its target resolved to a
/// package path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends in `/{kind}`, e.g. `slideLayout`.
    pub fn is(&self, kind: &str) -> bool {
        self.rel_type
            .rsplit('/')
            .next()
            .is_some_and(|last| last == kind)
    }
}

/// An opened template package.
pub struct Package<R> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Package<R> {
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;
        Ok(Self { archive })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.archive.file_names().any(|name| name == path)
    }

    /// Read a part as UTF-8 text.
    pub fn read_string(&mut self, path: &str) -> Result<String> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }

    /// Read and parse an XML part.
    pub fn read_xml(&mut self, path: &str) -> Result<XmlNode> {
        let content = self.read_string(path)?;
        xml::parse(&content).map_err(|e| match e {
            Error::XmlError(msg) => Error::XmlError(format!("{}: {}", path, msg)),
            other => other,
        })
    }

    /// Uncompressed size of a part, if present.
    pub fn part_size(&mut self, path: &str) -> Option<u64> {
        self.archive.by_name(path).ok().map(|f| f.size())
    }

    /// Relationships of a part. A part without a relationships file has none.
    pub fn relationships(&mut self, part: &str) -> Result<Vec<Relationship>> {
        let path = rels_path(part);
        if !self.contains(&path) {
            return Ok(Vec::new());
        }

        let root = self.read_xml(&path)?;
        Ok(root
            .children_named("Relationship")
            .filter_map(|rel| {
                let id = rel.attr("Id")?.to_string();
                let rel_type = rel.attr("Type").unwrap_or_default().to_string();
                let raw_target = rel.attr("Target")?;
                let external = rel.attr("TargetMode") == Some("External");
                let target = if external {
                    raw_target.to_string()
                } else {
                    resolve_target(part, raw_target)
                };
                Some(Relationship {
                    id,
                    rel_type,
                    target,
                    external,
                })
            })
            .collect())
    }

    /// Slide parts in presentation order.
    ///
    /// `sldIdLst` decides the order; slide relationships it does not list are
    /// appended by the number in their id or file name.
    pub fn slide_order(&mut self, presentation: &XmlNode) -> Result<Vec<String>> {
        let rels = self.relationships(PRESENTATION_PART)?;

        let mut ordered: Vec<String> = presentation
            .child("sldIdLst")
            .into_iter()
            .flat_map(|list| list.children_named("sldId"))
            .filter_map(|sld| sld.attr("r:id"))
            .filter_map(|rid| rels.iter().find(|r| r.id == rid && r.is("slide")))
            .map(|r| r.target.clone())
            .collect();

        let mut unlisted: Vec<(String, Option<usize>)> = rels
            .iter()
            .filter(|r| r.is("slide") && !r.external && !ordered.contains(&r.target))
            .map(|r| {
                let order_num =
                    extract_slide_number(&r.id).or_else(|| extract_slide_number(&r.target));
                (r.target.clone(), order_num)
            })
            .collect();

        unlisted.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        ordered.extend(unlisted.into_iter().map(|(path, _)| path));
        Ok(ordered)
    }
}

/// Path of the relationships part belonging to `part`.
pub fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
pub fn resolve_target(base_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_part.split('/').collect();
    segments.pop();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="/ppt/slides/slide3.xml"/>
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

    fn package(files: &[(&str, &str)]) -> Package<Cursor<Vec<u8>>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in files {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        let cursor = zip.finish().unwrap();
        Package::open(Cursor::new(cursor.into_inner())).unwrap()
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_rels_path() {
        assert_eq!(rels_path("ppt/presentation.xml"), "ppt/_rels/presentation.xml.rels");
        assert_eq!(
            rels_path("ppt/slideMasters/slideMaster1.xml"),
            "ppt/slideMasters/_rels/slideMaster1.xml.rels"
        );
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("ppt/presentation.xml", "slides/slide1.xml"),
            "ppt/slides/slide1.xml"
        );
        assert_eq!(
            resolve_target("ppt/slideMasters/slideMaster1.xml", "../slideLayouts/slideLayout2.xml"),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "./../media/image1.png"),
            "ppt/media/image1.png"
        );
        assert_eq!(resolve_target("ppt/slides/slide1.xml", "/ppt/media/a.png"), "ppt/media/a.png");
    }

    #[test]
    fn test_relationships() {
        let mut pkg = package(&[("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS)]);
        let rels = pkg.relationships(PRESENTATION_PART).unwrap();

        assert_eq!(rels.len(), 5);
        assert!(rels[0].is("slideMaster"));
        assert!(!rels[0].is("slide"));
        assert_eq!(rels[0].target, "ppt/slideMasters/slideMaster1.xml");
        assert!(rels[4].external);
        assert_eq!(rels[4].target, "https://example.com");

        assert!(pkg.relationships("ppt/slides/slide1.xml").unwrap().is_empty());
    }

    #[test]
    fn test_slide_order_follows_sld_id_lst() {
        let mut pkg = package(&[("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS)]);
        let presentation = xml::parse(
            r#"<p:presentation xmlns:p="p" xmlns:r="r">
                 <p:sldIdLst><p:sldId id="256" r:id="rId9"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>
               </p:presentation>"#,
        )
        .unwrap();

        assert_eq!(
            pkg.slide_order(&presentation).unwrap(),
            vec!["ppt/slides/slide2.xml", "ppt/slides/slide1.xml", "ppt/slides/slide3.xml"]
        );
    }

    #[test]
    fn test_slide_order_without_list_sorts_by_number() {
        let mut pkg = package(&[("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS)]);
        let presentation = xml::parse("<p:presentation xmlns:p=\"p\"/>").unwrap();

        assert_eq!(
            pkg.slide_order(&presentation).unwrap(),
            vec!["ppt/slides/slide1.xml", "ppt/slides/slide3.xml", "ppt/slides/slide2.xml"]
        );
    }

    #[test]
    fn test_open_rejects_non_zip() {
        assert!(matches!(
            Package::open(Cursor::new(b"not a zip".to_vec())),
            Err(Error::ZipError(_))
        ));
    }
}
