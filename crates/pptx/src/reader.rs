//! Reads .pptx packages back into a text summary.
//!
//! Used to inspect generated decks: which layout each slide uses, what the
//! layout and the slide say, and the cell text of every table.

use crate::rels;
use deck_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::io::{Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

/// Summary of a whole deck.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeckSummary {
    pub title: Option<String>,
    pub slides: Vec<SlideSummary>,
}

impl DeckSummary {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides drawn on the layout called `name`.
    pub fn slides_on<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SlideSummary> {
        self.slides
            .iter()
            .filter(move |s| s.layout.as_deref() == Some(name))
    }
}

/// Summary of one slide and the layout it is drawn on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SlideSummary {
    /// 1-based position in the deck.
    pub number: usize,
    /// Name of the slide's layout.
    pub layout: Option<String>,
    /// Text boxes of the layout, in drawing order.
    pub layout_texts: Vec<String>,
    /// Whether the layout carries a picture.
    pub layout_has_picture: bool,
    /// Text boxes of the slide itself, in drawing order.
    pub texts: Vec<String>,
    /// Tables as rows of cell texts. Cells covered by a merge are left out.
    pub tables: Vec<Vec<Vec<String>>>,
    /// External hyperlink targets used on the slide.
    pub hyperlinks: Vec<String>,
}

impl SlideSummary {
    /// Rows of the first table, if the slide has one.
    pub fn table(&self) -> Option<&[Vec<String>]> {
        self.tables.first().map(Vec::as_slice)
    }
}

/// Reader for .pptx packages.
pub struct DeckReader;

impl DeckReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a deck from a seekable reader.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<DeckSummary> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut summary = DeckSummary {
            title: self.read_title(&mut archive)?,
            ..Default::default()
        };

        for (idx, slide_path) in self.slide_order(&mut archive)?.iter().enumerate() {
            let slide = self.read_slide(&mut archive, slide_path, idx + 1)?;
            summary.slides.push(slide);
        }

        Ok(summary)
    }

    /// Read a deck from in-memory bytes.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<DeckSummary> {
        self.read(std::io::Cursor::new(bytes))
    }

    fn read_title<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Option<String>> {
        let Some(content) = read_optional(archive, "docProps/core.xml")? else {
            return Ok(None);
        };

        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);
        let mut in_title = false;
        let mut title = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"title" => in_title = true,
                Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"title" => in_title = false,
                Ok(Event::Text(ref e)) if in_title => {
                    title.push_str(&e.unescape().unwrap_or_default());
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlError(format!("Error parsing core properties: {}", e))),
                _ => {}
            }
        }

        Ok(Some(title).filter(|t| !t.is_empty()))
    }

    /// Slide part paths in presentation order.
    ///
    /// Follows `p:sldIdLst` in presentation.xml; falls back to the slide
    /// relationships ordered by number when the list is missing.
    fn slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let relationships = read_relationships(archive, "ppt/presentation.xml")?;
        let content = read_file(archive, "ppt/presentation.xml")?;

        let mut listed = Vec::new();
        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldId" =>
                {
                    if let Some(id) = attribute(e, b"r:id") {
                        listed.push(id);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing presentation: {}", e)));
                }
                _ => {}
            }
        }

        if !listed.is_empty() {
            return listed
                .iter()
                .map(|id| {
                    relationships
                        .iter()
                        .find(|r| &r.id == id)
                        .map(|r| r.path.clone())
                        .ok_or_else(|| Error::XmlError(format!("Slide relationship '{}' not found", id)))
                })
                .collect();
        }

        let mut slides: Vec<(String, Option<usize>)> = relationships
            .into_iter()
            .filter(|r| rels::is_type(&r.rel_type, "slide"))
            .map(|r| {
                let order = extract_slide_number(&r.id).or_else(|| extract_slide_number(&r.path));
                (r.path, order)
            })
            .collect();
        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });
        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    fn read_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        number: usize,
    ) -> Result<SlideSummary> {
        let relationships = read_relationships(archive, slide_path)?;
        let slide = parse_part(&read_file(archive, slide_path)?)?;

        let mut summary = SlideSummary {
            number,
            texts: slide.texts,
            tables: slide.tables,
            ..Default::default()
        };

        for id in &slide.link_ids {
            if let Some(rel) = relationships.iter().find(|r| &r.id == id && r.external) {
                if !summary.hyperlinks.contains(&rel.target) {
                    summary.hyperlinks.push(rel.target.clone());
                }
            }
        }

        if let Some(layout_rel) = relationships
            .iter()
            .find(|r| rels::is_type(&r.rel_type, "slideLayout"))
        {
            let layout = parse_part(&read_file(archive, &layout_rel.path)?)?;
            summary.layout = layout.name;
            summary.layout_texts = layout.texts;
            summary.layout_has_picture = layout.pictures > 0;
        }

        Ok(summary)
    }
}

impl Default for DeckReader {
    fn default() -> Self {
        Self::new()
    }
}

/// A relationship with its target resolved to a package path.
#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    rel_type: String,
    /// Raw target as written in the part.
    target: String,
    /// Package path of internal targets.
    path: String,
    external: bool,
}

/// Relationships of `part`, empty when the part has none.
fn read_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    part: &str,
) -> Result<Vec<Relationship>> {
    let (dir, file) = part.rsplit_once('/').unwrap_or(("", part));
    let rels_path = if dir.is_empty() {
        format!("_rels/{}.rels", file)
    } else {
        format!("{}/_rels/{}.rels", dir, file)
    };
    let Some(content) = read_optional(archive, &rels_path)? else {
        return Ok(Vec::new());
    };

    let mut relationships = Vec::new();
    let mut reader = Reader::from_str(&content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"Relationship" => {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                    path: String::new(),
                    external: false,
                };
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default().to_string();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        b"TargetMode" => rel.external = value == "External",
                        _ => {}
                    }
                }
                if !rel.external {
                    rel.path = resolve_target(dir, &rel.target);
                }
                relationships.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships '{}': {}",
                    rels_path, e
                )));
            }
            _ => {}
        }
    }

    Ok(relationships)
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// What a slide or layout part contains.
#[derive(Debug, Default)]
struct PartContent {
    name: Option<String>,
    texts: Vec<String>,
    tables: Vec<Vec<Vec<String>>>,
    pictures: usize,
    link_ids: Vec<String>,
}

/// Where text currently goes.
#[derive(Debug, Default)]
struct TextTarget {
    text: String,
    skip: bool,
}

impl TextTarget {
    fn start_paragraph(&mut self, first: bool) {
        if !first {
            self.text.push('\n');
        }
    }
}

fn parse_part(xml_content: &str) -> Result<PartContent> {
    let mut part = PartContent::default();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    let mut shape: Option<TextTarget> = None;
    let mut table: Option<Vec<Vec<String>>> = None;
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<TextTarget> = None;
    let mut first_paragraph = true;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"cSld" => part.name = attribute(e, b"name"),
                    b"sp" => shape = Some(TextTarget::default()),
                    b"pic" => part.pictures += 1,
                    b"tbl" => table = Some(Vec::new()),
                    b"tr" => row = Some(Vec::new()),
                    b"tc" => {
                        cell = Some(TextTarget {
                            text: String::new(),
                            skip: attribute(e, b"hMerge").as_deref() == Some("1")
                                || attribute(e, b"vMerge").as_deref() == Some("1"),
                        })
                    }
                    b"txBody" => first_paragraph = true,
                    b"p" => {
                        if let Some(target) = cell.as_mut().or(shape.as_mut()) {
                            target.start_paragraph(first_paragraph);
                        }
                        first_paragraph = false;
                    }
                    b"br" => {
                        if let Some(target) = cell.as_mut().or(shape.as_mut()) {
                            target.text.push('\n');
                        }
                    }
                    b"t" => in_text = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"br" => {
                        if let Some(target) = cell.as_mut().or(shape.as_mut()) {
                            target.text.push('\n');
                        }
                    }
                    b"hlinkClick" => {
                        if let Some(id) = attribute(e, b"r:id") {
                            part.link_ids.push(id);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) if in_text => {
                let text = e.unescape().unwrap_or_default();
                if let Some(target) = cell.as_mut().or(shape.as_mut()) {
                    target.text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"t" => in_text = false,
                    b"sp" => {
                        if let Some(done) = shape.take() {
                            let text = done.text.trim().to_string();
                            if !text.is_empty() {
                                part.texts.push(text);
                            }
                        }
                    }
                    b"tc" => {
                        if let (Some(done), Some(row)) = (cell.take(), row.as_mut()) {
                            if !done.skip {
                                row.push(done.text);
                            }
                        }
                    }
                    b"tr" => {
                        if let (Some(done), Some(table)) = (row.take(), table.as_mut()) {
                            table.push(done);
                        }
                    }
                    b"tbl" => {
                        if let Some(done) = table.take() {
                            part.tables.push(done);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error (continuing): {}", e);
            }
            _ => {}
        }
    }

    Ok(part)
}

/// Value of attribute `key` (qualified name as written), unescaped.
fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

fn read_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    read_optional(archive, path)?
        .ok_or_else(|| Error::ZipError(format!("File not found in archive '{}'", path)))
}

/// Read a file from the ZIP archive, `None` when it does not exist.
fn read_optional<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(Error::ZipError(format!("Failed to open '{}': {}", path, e))),
    };

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(Some(content))
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
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

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("ppt/slides", "../slideLayouts/slideLayout1.xml"),
            "ppt/slideLayouts/slideLayout1.xml"
        );
        assert_eq!(resolve_target("ppt", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("ppt/slides", "/ppt/media/a.png"), "ppt/media/a.png");
        assert_eq!(resolve_target("", "ppt/presentation.xml"), "ppt/presentation.xml");
    }

    #[test]
    fn test_parse_part_tables_and_merges() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p" xmlns:r="r"><p:cSld name="Frame"><p:spTree>
            <p:sp><p:txBody><a:p><a:r><a:t>Hello</a:t></a:r><a:br/><a:r><a:t>world</a:t></a:r></a:p><a:p><a:r><a:t>again</a:t></a:r></a:p></p:txBody></p:sp>
            <p:graphicFrame><a:graphic><a:graphicData><a:tbl>
              <a:tr h="1"><a:tc gridSpan="2"><a:txBody><a:p><a:r><a:t>Top</a:t></a:r></a:p></a:txBody></a:tc><a:tc hMerge="1"><a:txBody><a:p/></a:txBody></a:tc></a:tr>
              <a:tr h="1"><a:tc><a:txBody><a:p><a:r><a:rPr><a:hlinkClick r:id="rId2"/></a:rPr><a:t>A &amp; B</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p><a:r><a:t>x</a:t></a:r></a:p><a:p><a:r><a:t>y</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
            </a:tbl></a:graphicData></a:graphic></p:graphicFrame>
            </p:spTree></p:cSld></p:sld>"#;

        let part = parse_part(xml).unwrap();
        assert_eq!(part.name.as_deref(), Some("Frame"));
        assert_eq!(part.texts, vec!["Hello\nworld\nagain".to_string()]);
        assert_eq!(
            part.tables,
            vec![vec![
                vec!["Top".to_string()],
                vec!["A & B".to_string(), "x\ny".to_string()],
            ]]
        );
        assert_eq!(part.link_ids, vec!["rId2".to_string()]);
    }
}
