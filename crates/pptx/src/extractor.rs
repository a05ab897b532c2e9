//! Geometry and theme extraction from a PPTX/POTX template.
//!
//! Only an unreadable package is fatal. Any part that fails to parse is
//! logged and left out, so a damaged theme still yields layouts and a
//! damaged layout still yields the rest.

use crate::package::{Package, Relationship, PRESENTATION_PART};
use crate::xml::XmlNode;
use deck_core::types::{
    color_slot_name, RawFonts, RawImage, RawLayout, RawPlaceholder, RawTheme, Rect,
    DEFAULT_SLIDE_HEIGHT_EMU, DEFAULT_SLIDE_WIDTH_EMU,
};
use deck_core::{Error, RawTemplateData, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Shape elements that can sit directly in a shape tree.
const SHAPE_ELEMENTS: &[&str] = &["sp", "pic", "graphicFrame", "grpSp", "cxnSp", "contentPart"];

/// Map an OOXML placeholder type onto the raw kind vocabulary.
///
/// A placeholder without a type is an object placeholder; unrecognized types
/// map to an empty kind.
fn raw_kind(ph_type: Option<&str>) -> &'static str {
    match ph_type {
        None => "OBJECT",
        Some("title") => "TITLE",
        Some("ctrTitle") => "CENTER_TITLE",
        Some("subTitle") => "SUBTITLE",
        Some("body") => "BODY",
        Some("obj") => "OBJECT",
        Some("pic") => "PICTURE",
        Some("chart") => "CHART",
        Some("tbl") => "TABLE",
        Some("clipArt") => "CLIP_ART",
        Some("dgm") => "ORG_CHART",
        Some("media") => "MEDIA_CLIP",
        Some("sldImg") => "SLIDE_IMAGE",
        Some("dt") => "DATE",
        Some("ftr") => "FOOTER",
        Some("sldNum") => "SLIDE_NUMBER",
        Some("hdr") => "HEADER",
        Some(_) => "",
    }
}

/// Master placeholder type a layout placeholder inherits position from.
fn master_type(ph_type: Option<&str>) -> &str {
    match ph_type {
        Some("title") | Some("ctrTitle") => "title",
        Some("dt") => "dt",
        Some("ftr") => "ftr",
        Some("sldNum") => "sldNum",
        _ => "body",
    }
}

/// A placeholder on a master or layout, before inheritance is applied.
#[derive(Debug, Clone)]
struct PlaceholderInfo {
    ph_type: Option<String>,
    idx: Option<String>,
    rect: Option<Rect>,
}

/// Extracts [`RawTemplateData`] from a presentation package.
pub struct TemplateExtractor;

impl TemplateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract from a template file on disk.
    pub fn extract_file(&self, path: &Path) -> Result<RawTemplateData> {
        let file = File::open(path)
            .map_err(|e| Error::ExtractionError(format!("{}: {}", path.display(), e)))?;
        self.extract(BufReader::new(file))
    }

    /// Extract from any seekable reader over a package.
    ///
    /// A reader that is not a ZIP package, or a package without a
    /// presentation part, fails with [`Error::ExtractionError`].
    pub fn extract<R: Read + Seek>(&self, reader: R) -> Result<RawTemplateData> {
        let mut package =
            Package::open(reader).map_err(|e| Error::ExtractionError(e.to_string()))?;

        if !package.contains(PRESENTATION_PART) {
            return Err(Error::ExtractionError(format!(
                "{} not found; not a presentation package",
                PRESENTATION_PART
            )));
        }
        let presentation = package
            .read_xml(PRESENTATION_PART)
            .map_err(|e| Error::ExtractionError(e.to_string()))?;

        let mut raw = RawTemplateData::default();
        if let Some(size) = presentation.child("sldSz") {
            raw.slide_width_emu = size.attr_i64("cx").unwrap_or(DEFAULT_SLIDE_WIDTH_EMU);
            raw.slide_height_emu = size.attr_i64("cy").unwrap_or(DEFAULT_SLIDE_HEIGHT_EMU);
        }

        let presentation_rels = package.relationships(PRESENTATION_PART).unwrap_or_else(|e| {
            log::warn!("Presentation relationships unreadable: {}", e);
            Vec::new()
        });

        match first_master(&presentation, &presentation_rels) {
            Some(master_part) => {
                self.read_master(&mut package, &master_part, &presentation_rels, &mut raw)
            }
            None => log::warn!("Template has no slide master; no layouts extracted"),
        }

        raw.images = self.read_images(&mut package, &presentation);

        log::info!(
            "Extracted template: {}x{} EMU, {} theme colors, {} layouts, {} images",
            raw.slide_width_emu,
            raw.slide_height_emu,
            raw.theme.colors.len(),
            raw.layouts.len(),
            raw.images.len()
        );

        Ok(raw)
    }

    fn read_master<R: Read + Seek>(
        &self,
        package: &mut Package<R>,
        master_part: &str,
        presentation_rels: &[Relationship],
        raw: &mut RawTemplateData,
    ) {
        let master = match package.read_xml(master_part) {
            Ok(master) => master,
            Err(e) => {
                log::warn!("Slide master unreadable: {}", e);
                return;
            }
        };
        let master_rels = package.relationships(master_part).unwrap_or_else(|e| {
            log::warn!("Slide master relationships unreadable: {}", e);
            Vec::new()
        });

        let theme_part = master_rels
            .iter()
            .chain(presentation_rels)
            .find(|r| r.is("theme"))
            .map(|r| r.target.clone());
        match theme_part {
            Some(part) => match package.read_xml(&part) {
                Ok(theme) => raw.theme = read_theme(&theme),
                Err(e) => log::warn!("Theme unreadable: {}", e),
            },
            None => log::warn!("Template has no theme part"),
        }

        let master_placeholders = placeholders_of(&master);

        let layout_parts: Vec<String> = master
            .child("sldLayoutIdLst")
            .into_iter()
            .flat_map(|list| list.children_named("sldLayoutId"))
            .filter_map(|id| id.attr("r:id"))
            .filter_map(|rid| master_rels.iter().find(|r| r.id == rid))
            .map(|r| r.target.clone())
            .collect();

        for part in layout_parts {
            let index = raw.layouts.len();
            match package.read_xml(&part) {
                Ok(layout) => raw.layouts.push(read_layout(index, &layout, &master_placeholders)),
                Err(e) => log::warn!("Layout {} unreadable, skipped: {}", part, e),
            }
        }
    }

    /// Pictures placed directly on the template's own slides.
    ///
    /// Picture placeholders are layout slots rather than artwork and are left out.
    fn read_images<R: Read + Seek>(
        &self,
        package: &mut Package<R>,
        presentation: &XmlNode,
    ) -> Vec<RawImage> {
        let slides = package.slide_order(presentation).unwrap_or_else(|e| {
            log::warn!("Slide order unreadable: {}", e);
            Vec::new()
        });

        let mut images = Vec::new();
        for (slide_idx, part) in slides.iter().enumerate() {
            let slide = match package.read_xml(part) {
                Ok(slide) => slide,
                Err(e) => {
                    log::warn!("Slide {} unreadable, images skipped: {}", slide_idx + 1, e);
                    continue;
                }
            };
            let rels = package.relationships(part).unwrap_or_default();

            let shapes = slide
                .path(&["cSld", "spTree"])
                .map(|tree| top_level_shapes(tree).collect::<Vec<_>>())
                .unwrap_or_default();

            for (shape_idx, shape) in shapes.into_iter().enumerate() {
                if shape.name != "pic" || placeholder_ph(shape).is_some() {
                    continue;
                }
                let Some(rect) = shape.child("spPr").and_then(xfrm_rect) else {
                    log::warn!("Picture {} on slide {} has no geometry", shape_idx, slide_idx + 1);
                    continue;
                };
                let size_bytes = shape
                    .find("blip")
                    .and_then(|blip| blip.attr("r:embed"))
                    .and_then(|rid| rels.iter().find(|r| r.id == rid && !r.external))
                    .and_then(|r| package.part_size(&r.target))
                    .unwrap_or(0);

                images.push(RawImage {
                    id: format!("img_{}_{}", slide_idx, shape_idx),
                    left: rect.left,
                    top: rect.top,
                    width: rect.width,
                    height: rect.height,
                    size_bytes,
                    source_slide: slide_idx,
                });
            }
        }
        images
    }
}

impl Default for TemplateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// The first slide master listed by the presentation.
fn first_master(presentation: &XmlNode, rels: &[Relationship]) -> Option<String> {
    let listed = presentation
        .child("sldMasterIdLst")
        .and_then(|list| list.child("sldMasterId"))
        .and_then(|id| id.attr("r:id"))
        .and_then(|rid| rels.iter().find(|r| r.id == rid));

    listed
        .or_else(|| rels.iter().find(|r| r.is("slideMaster")))
        .map(|r| r.target.clone())
}

fn read_theme(theme: &XmlNode) -> RawTheme {
    let mut colors = BTreeMap::new();
    if let Some(scheme) = theme.find("clrScheme") {
        for (index, slot) in scheme.children.iter().enumerate() {
            let Some(name) = color_slot_name(index) else {
                continue;
            };
            if let Some(hex) = slot_color(slot) {
                colors.insert(name.to_string(), hex);
            }
        }
    }

    let typeface = |which: &str| {
        theme
            .find("fontScheme")
            .and_then(|scheme| scheme.child(which))
            .and_then(|font| font.child("latin"))
            .and_then(|latin| latin.attr("typeface"))
            .filter(|face| !face.is_empty())
            .map(str::to_string)
    };

    RawTheme {
        colors,
        fonts: RawFonts {
            major: typeface("majorFont"),
            minor: typeface("minorFont"),
        },
    }
}

/// Lower-case `#rrggbb` for a color scheme slot.
fn slot_color(slot: &XmlNode) -> Option<String> {
    let value = if let Some(srgb) = slot.child("srgbClr") {
        srgb.attr("val")?
    } else {
        slot.child("sysClr")?.attr("lastClr")?
    };
    let value = value.trim();
    (value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| format!("#{}", value.to_ascii_lowercase()))
}

fn read_layout(index: usize, layout: &XmlNode, master: &[PlaceholderInfo]) -> RawLayout {
    let name = layout
        .child("cSld")
        .and_then(|c| c.attr("name"))
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Layout {}", index + 1));

    let mut placeholders = Vec::new();
    for ph in placeholders_of(layout) {
        let rect = ph.rect.or_else(|| inherited_rect(&ph, master));
        let Some(rect) = rect else {
            log::warn!(
                "Placeholder {:?} on layout '{}' has no geometry, skipped",
                ph.ph_type.as_deref().unwrap_or("obj"),
                name
            );
            continue;
        };
        placeholders.push(RawPlaceholder {
            kind: raw_kind(ph.ph_type.as_deref()).to_string(),
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
        });
    }

    log::debug!("Layout {} '{}': {} placeholders", index, name, placeholders.len());
    RawLayout {
        index,
        name,
        placeholders,
    }
}

/// Geometry from the master placeholder of the same type, else the same `idx`.
fn inherited_rect(ph: &PlaceholderInfo, master: &[PlaceholderInfo]) -> Option<Rect> {
    let wanted = master_type(ph.ph_type.as_deref());
    master
        .iter()
        .find(|m| m.rect.is_some() && master_type(m.ph_type.as_deref()) == wanted)
        .or_else(|| {
            ph.idx.as_ref().and_then(|idx| {
                master
                    .iter()
                    .find(|m| m.rect.is_some() && m.idx.as_ref() == Some(idx))
            })
        })
        .and_then(|m| m.rect)
}

/// Placeholders in a part's shape tree, in document order.
fn placeholders_of(part: &XmlNode) -> Vec<PlaceholderInfo> {
    let Some(tree) = part.path(&["cSld", "spTree"]) else {
        return Vec::new();
    };

    top_level_shapes(tree)
        .filter_map(|shape| {
            let ph = placeholder_ph(shape)?;
            let rect = match shape.name.as_str() {
                "graphicFrame" => xfrm_rect(shape),
                _ => shape.child("spPr").and_then(xfrm_rect),
            };

            Some(PlaceholderInfo {
                ph_type: ph.attr("type").map(str::to_string),
                idx: ph.attr("idx").map(str::to_string),
                rect,
            })
        })
        .collect()
}

/// The `ph` marker under a shape's non-visual properties, if it is a placeholder.
fn placeholder_ph(shape: &XmlNode) -> Option<&XmlNode> {
    shape
        .children
        .iter()
        .filter(|c| c.name.starts_with("nv"))
        .find_map(|nv| nv.child("nvPr"))
        .and_then(|nv_pr| nv_pr.child("ph"))
}

fn top_level_shapes(tree: &XmlNode) -> impl Iterator<Item = &XmlNode> {
    tree.children
        .iter()
        .filter(|c| SHAPE_ELEMENTS.contains(&c.name.as_str()))
}

/// Offset and extent of an element's `xfrm` child.
fn xfrm_rect(parent: &XmlNode) -> Option<Rect> {
    let xfrm = parent.child("xfrm")?;
    let off = xfrm.child("off")?;
    let ext = xfrm.child("ext")?;
    Some(Rect::new(
        off.attr_i64("x")?,
        off.attr_i64("y")?,
        ext.attr_i64("cx")?,
        ext.attr_i64("cy")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    fn rels(entries: &[(&str, &str, &str)]) -> String {
        let body: String = entries
            .iter()
            .map(|(id, kind, target)| {
                format!(
                    r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
                    id, REL_NS, kind, target
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            body
        )
    }

    fn sp(ph: &str, xfrm: Option<(i64, i64, i64, i64)>) -> String {
        let geometry = xfrm
            .map(|(x, y, cx, cy)| {
                format!(
                    r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
                    x, y, cx, cy
                )
            })
            .unwrap_or_default();
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="ph"/><p:cNvSpPr/><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr>{}</p:spPr></p:sp>"#,
            ph, geometry
        )
    }

    fn part(root: &str, inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:{root} xmlns:a="a" xmlns:p="p" xmlns:r="r">{inner}</p:{root}>"#,
            root = root,
            inner = inner
        )
    }

    fn template_files() -> Vec<(String, Vec<u8>)> {
        let presentation = part(
            "presentation",
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
               <p:sldIdLst><p:sldId id="256" r:id="rId3"/></p:sldIdLst>
               <p:sldSz cx="12192000" cy="6858000"/>"#,
        );
        let presentation_rels = rels(&[
            ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
            ("rId2", "theme", "theme/theme1.xml"),
            ("rId3", "slide", "slides/slide1.xml"),
        ]);

        let master = part(
            "sldMaster",
            &format!(
                r#"<p:cSld><p:spTree><p:nvGrpSpPr/><p:grpSpPr/>{}{}{}</p:spTree></p:cSld>
                   <p:sldLayoutIdLst>
                     <p:sldLayoutId id="2147483650" r:id="rId2"/>
                     <p:sldLayoutId id="2147483649" r:id="rId1"/>
                   </p:sldLayoutIdLst>"#,
                sp(r#"<p:ph type="title"/>"#, Some((838200, 365125, 10515600, 1325563))),
                sp(r#"<p:ph type="body" idx="1"/>"#, Some((838200, 1825625, 10515600, 4351338))),
                sp(r#"<p:ph type="dt" sz="half" idx="10"/>"#, Some((838200, 6356350, 2743200, 365125))),
            ),
        );
        let master_rels = rels(&[
            ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
            ("rId2", "slideLayout", "../slideLayouts/slideLayout2.xml"),
            ("rId3", "theme", "../theme/theme1.xml"),
        ]);

        let title_slide = part(
            "sldLayout",
            &format!(
                r#"<p:cSld name="Title Slide"><p:spTree><p:nvGrpSpPr/><p:grpSpPr/>{}{}</p:spTree></p:cSld>"#,
                sp(r#"<p:ph type="ctrTitle"/>"#, Some((1524000, 1122363, 9144000, 2387600))),
                sp(r#"<p:ph type="subTitle" idx="1"/>"#, Some((1524000, 3602038, 9144000, 1655762))),
            ),
        );
        let title_content = part(
            "sldLayout",
            &format!(
                r#"<p:cSld name="Title and Content"><p:spTree><p:nvGrpSpPr/><p:grpSpPr/>{}{}{}{}</p:spTree></p:cSld>"#,
                sp(r#"<p:ph type="title"/>"#, None),
                sp(r#"<p:ph idx="1"/>"#, None),
                sp(r#"<p:ph type="dt" sz="half" idx="10"/>"#, None),
                sp(r#"<p:ph type="unheardOf" idx="42"/>"#, None),
            ),
        );

        let theme = r#"<?xml version="1.0"?><a:theme xmlns:a="a" name="Office Theme"><a:themeElements>
            <a:clrScheme name="Office">
              <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
              <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
              <a:dk2><a:srgbClr val="44546A"/></a:dk2>
              <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
              <a:accent1><a:srgbClr val="4472C4"/></a:accent1>
              <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
              <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
              <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
              <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
              <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
              <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
              <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
            </a:clrScheme>
            <a:fontScheme name="Office">
              <a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont>
              <a:minorFont><a:latin typeface="Calibri"/></a:minorFont>
            </a:fontScheme>
          </a:themeElements></a:theme>"#;

        let slide = part(
            "sld",
            &format!(
                r#"<p:cSld><p:spTree><p:nvGrpSpPr/><p:grpSpPr/>{}
                  <p:pic>
                    <p:nvPicPr><p:cNvPr id="4" name="Logo"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>
                    <p:blipFill><a:blip r:embed="rId2"/></p:blipFill>
                    <p:spPr><a:xfrm><a:off x="10000000" y="100000"/><a:ext cx="1800000" cy="600000"/></a:xfrm></p:spPr>
                  </p:pic>
                </p:spTree></p:cSld>"#,
                sp(r#"<p:ph type="ctrTitle"/>"#, None),
            ),
        );
        let slide_rels = rels(&[
            ("rId1", "slideLayout", "../slideLayouts/slideLayout2.xml"),
            ("rId2", "image", "../media/image1.png"),
        ]);

        vec![
            ("ppt/presentation.xml".into(), presentation.into_bytes()),
            ("ppt/_rels/presentation.xml.rels".into(), presentation_rels.into_bytes()),
            ("ppt/slideMasters/slideMaster1.xml".into(), master.into_bytes()),
            ("ppt/slideMasters/_rels/slideMaster1.xml.rels".into(), master_rels.into_bytes()),
            ("ppt/slideLayouts/slideLayout1.xml".into(), title_content.into_bytes()),
            ("ppt/slideLayouts/slideLayout2.xml".into(), title_slide.into_bytes()),
            ("ppt/theme/theme1.xml".into(), theme.as_bytes().to_vec()),
            ("ppt/slides/slide1.xml".into(), slide.into_bytes()),
            ("ppt/slides/_rels/slide1.xml.rels".into(), slide_rels.into_bytes()),
            ("ppt/media/image1.png".into(), vec![0u8; 1234]),
        ]
    }

    fn zip_bytes(files: &[(String, Vec<u8>)]) -> Cursor<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in files {
            zip.start_file(name.as_str(), FileOptions::default()).unwrap();
            zip.write_all(body).unwrap();
        }
        Cursor::new(zip.finish().unwrap().into_inner())
    }

    fn extract(files: &[(String, Vec<u8>)]) -> Result<RawTemplateData> {
        TemplateExtractor::new().extract(zip_bytes(files))
    }

    fn pic(name: &str, ph: &str) -> String {
        format!(
            concat!(
                r#"<p:pic><p:nvPicPr><p:cNvPr id="9" name="{}"/><p:cNvPicPr/><p:nvPr>{}</p:nvPr></p:nvPicPr>"#,
                r#"<p:blipFill><a:blip r:embed="rId2"/></p:blipFill>"#,
                r#"<p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="914400"/></a:xfrm></p:spPr></p:pic>"#,
            ),
            name, ph
        )
    }

    /// Insert `shape` at the end of the shape tree of the named part.
    fn add_shape(files: &mut [(String, Vec<u8>)], part_name: &str, shape: &str) {
        for (name, body) in files.iter_mut() {
            if name == part_name {
                let xml = String::from_utf8(body.clone()).unwrap();
                *body = xml
                    .replacen("</p:spTree>", &format!("{}</p:spTree>", shape), 1)
                    .into_bytes();
            }
        }
    }

    #[test]
    fn test_raw_kind() {
        assert_eq!(raw_kind(None), "OBJECT");
        assert_eq!(raw_kind(Some("ctrTitle")), "CENTER_TITLE");
        assert_eq!(raw_kind(Some("sldNum")), "SLIDE_NUMBER");
        assert_eq!(raw_kind(Some("unheardOf")), "");
    }

    #[test]
    fn test_slide_size() {
        let raw = extract(&template_files()).unwrap();
        assert_eq!(raw.slide_width_emu, 12_192_000);
        assert_eq!(raw.slide_height_emu, 6_858_000);
    }

    #[test]
    fn test_theme_colors_and_fonts() {
        let raw = extract(&template_files()).unwrap();
        let colors = &raw.theme.colors;

        assert_eq!(colors.len(), 10);
        assert_eq!(colors["bg1"], "#000000");
        assert_eq!(colors["text1"], "#ffffff");
        assert_eq!(colors["text2"], "#e7e6e6");
        assert_eq!(colors["accent1"], "#4472c4");
        assert_eq!(colors["accent6"], "#70ad47");
        assert_eq!(raw.theme.fonts.major.as_deref(), Some("Calibri Light"));
        assert_eq!(raw.theme.fonts.minor.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_layouts_in_master_order() {
        let raw = extract(&template_files()).unwrap();
        let names: Vec<&str> = raw.layouts.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Title Slide", "Title and Content"]);
        assert_eq!(raw.layouts[1].index, 1);

        let title_slide = &raw.layouts[0].placeholders;
        assert_eq!(title_slide[0].kind, "CENTER_TITLE");
        assert_eq!(title_slide[1].kind, "SUBTITLE");
        assert_eq!(title_slide[1].rect(), Rect::new(1524000, 3602038, 9144000, 1655762));
    }

    #[test]
    fn test_geometry_inherited_from_master() {
        let raw = extract(&template_files()).unwrap();
        let content = &raw.layouts[1].placeholders;

        let kinds: Vec<&str> = content.iter().map(|p| p.kind.as_str()).collect();
        assert_eq!(kinds, vec!["TITLE", "OBJECT", "DATE", ""]);

        assert_eq!(content[0].rect(), Rect::new(838200, 365125, 10515600, 1325563));
        assert_eq!(content[1].rect(), Rect::new(838200, 1825625, 10515600, 4351338));
        assert_eq!(content[2].rect(), Rect::new(838200, 6356350, 2743200, 365125));
        // unknown type falls back to the master body
        assert_eq!(content[3].rect(), content[1].rect());
    }

    #[test]
    fn test_images_from_slides() {
        let raw = extract(&template_files()).unwrap();
        assert_eq!(
            raw.images,
            vec![RawImage {
                id: "img_0_1".into(),
                left: 10_000_000,
                top: 100_000,
                width: 1_800_000,
                height: 600_000,
                size_bytes: 1234,
                source_slide: 0,
            }]
        );
    }

    #[test]
    fn test_picture_placeholders_and_master_art_are_not_images() {
        let mut files = template_files();
        add_shape(
            &mut files,
            "ppt/slides/slide1.xml",
            &pic("Picture Placeholder 3", r#"<p:ph type="pic" idx="1"/>"#),
        );
        add_shape(&mut files, "ppt/slideMasters/slideMaster1.xml", &pic("Master Art", ""));
        add_shape(&mut files, "ppt/slideLayouts/slideLayout2.xml", &pic("Layout Art", ""));

        let raw = extract(&files).unwrap();
        let ids: Vec<&str> = raw.images.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["img_0_1"]);

        // the layout picture is decoration, not a placeholder slot
        assert_eq!(raw.layouts[0].placeholders.len(), 2);
    }

    #[test]
    fn test_broken_theme_is_not_fatal() {
        let mut files = template_files();
        for (name, body) in files.iter_mut() {
            if name == "ppt/theme/theme1.xml" {
                *body = b"<a:theme><a:clrScheme></a:theme>".to_vec();
            }
        }
        let raw = extract(&files).unwrap();
        assert!(raw.theme.colors.is_empty());
        assert_eq!(raw.theme.fonts, RawFonts::default());
        assert_eq!(raw.layouts.len(), 2);
    }

    #[test]
    fn test_missing_slide_size_uses_default() {
        let mut files = template_files();
        files[0].1 = part("presentation", "").into_bytes();
        let raw = extract(&files).unwrap();
        assert_eq!(raw.slide_width_emu, DEFAULT_SLIDE_WIDTH_EMU);
        assert_eq!(raw.slide_height_emu, DEFAULT_SLIDE_HEIGHT_EMU);
        // master found through relationships alone
        assert_eq!(raw.layouts.len(), 2);
    }

    #[test]
    fn test_unreadable_package_is_fatal() {
        let not_zip = TemplateExtractor::new().extract(Cursor::new(b"plain text".to_vec()));
        assert!(matches!(not_zip, Err(Error::ExtractionError(_))));

        let files: Vec<(String, Vec<u8>)> = vec![("docProps/app.xml".into(), b"<x/>".to_vec())];
        assert!(matches!(extract(&files), Err(Error::ExtractionError(_))));
    }

    #[test]
    fn test_missing_template_file_is_extraction_error() {
        let path = std::env::temp_dir().join("deck-pptx-no-such-template.potx");
        match TemplateExtractor::new().extract_file(&path) {
            Err(Error::ExtractionError(msg)) => assert!(msg.contains("no-such-template")),
            other => panic!("expected ExtractionError, got {:?}", other.map(|_| ())),
        }
    }
}
