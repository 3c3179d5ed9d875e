//! Assembles a composed deck into a .pptx package.
//!
//! Layout of the package:
//! - one slide master and one theme;
//! - one slide layout per frame, holding the frame's shapes (titles,
//!   footer, logo), so every page of a logical slide shares them;
//! - one slide per physical page, referencing its frame's layout;
//! - each distinct logo stored once under `ppt/media`.

use crate::package;
use crate::rels::{self, Relationships};
use crate::shapes::ShapeTree;
use deck_core::asset::LogoImage;
use deck_core::media::{pixel_size, ImageFormat, PixelSize};
use deck_core::layout::{ComposedDeck, Element, FrameId};
use deck_core::{Error, Result};
use std::collections::HashMap;
use std::fmt::{self, Write as FmtWrite};
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes [`ComposedDeck`]s as .pptx packages.
#[derive(Debug, Clone, Copy)]
pub struct DeckWriter {
    compression: CompressionMethod,
}

impl DeckWriter {
    /// Create a writer that deflates every part.
    pub fn new() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }

    /// Store parts without compression.
    pub fn stored(mut self) -> Self {
        self.compression = CompressionMethod::Stored;
        self
    }

    /// Render `deck` into an in-memory .pptx file.
    pub fn write(&self, deck: &ComposedDeck) -> Result<Vec<u8>> {
        let cursor = self.write_to(deck, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Render `deck` into `writer`, returning it once the archive is
    /// finished.
    pub fn write_to<W: Write + Seek>(&self, deck: &ComposedDeck, writer: W) -> Result<W> {
        let parts = build_parts(deck).map_err(|e| Error::XmlError(e.to_string()))?;
        log::debug!(
            "Writing deck '{}': {} layout(s), {} slide(s), {} part(s)",
            deck.title,
            deck.frames.len(),
            deck.slides.len(),
            parts.len()
        );

        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(self.compression);
        for (name, data) in &parts {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", name, e)))?;
            zip.write_all(data)?;
        }
        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }
}

impl Default for DeckWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `deck` with the default writer.
pub fn assemble(deck: &ComposedDeck) -> Result<Vec<u8>> {
    DeckWriter::new().write(deck)
}

/// An image stored in the package.
#[derive(Debug)]
struct MediaEntry {
    file_name: String,
    data: Vec<u8>,
    format: ImageFormat,
    size: Option<PixelSize>,
}

impl MediaEntry {
    fn target(&self) -> String {
        format!("../media/{}", self.file_name)
    }
}

/// Stores each distinct image once, in first-use order.
#[derive(Debug, Default)]
struct MediaStore {
    entries: Vec<(LogoImage, MediaEntry)>,
}

impl MediaStore {
    fn resolve(&mut self, image: &LogoImage) -> &MediaEntry {
        let index = match self.entries.iter().position(|(known, _)| known == image) {
            Some(index) => index,
            None => {
                let entry = self.store(image);
                self.entries.push((image.clone(), entry));
                self.entries.len() - 1
            }
        };
        &self.entries[index].1
    }

    fn store(&self, image: &LogoImage) -> MediaEntry {
        let size = pixel_size(image.format, &image.data);
        if size.is_none() {
            log::debug!("Logo dimensions unreadable, stretching it to its frame");
        }
        MediaEntry {
            file_name: format!("image{}.{}", self.entries.len() + 1, image.format.extension()),
            data: image.data.clone(),
            format: image.format,
            size,
        }
    }

    fn files(&self) -> impl Iterator<Item = &MediaEntry> {
        self.entries.iter().map(|(_, entry)| entry)
    }

    /// Distinct `(extension, mime)` pairs of the stored files.
    fn kinds(&self) -> Vec<(&'static str, &'static str)> {
        let mut kinds: Vec<(&'static str, &'static str)> = Vec::new();
        for entry in self.files() {
            let kind = (entry.format.extension(), entry.format.mime());
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}

fn write_elements(tree: &mut ShapeTree, elements: &[Element], media: &mut MediaStore) -> fmt::Result {
    for element in elements {
        match element {
            Element::Text(text) => tree.text_box(text)?,
            Element::Table(table) => tree.table(table)?,
            Element::Picture(picture) => {
                let entry = media.resolve(&picture.image);
                tree.picture(picture, &entry.target(), entry.size)?;
            }
        }
    }
    Ok(())
}

/// Every part of the package as `(path, bytes)`, in archive order.
fn build_parts(deck: &ComposedDeck) -> std::result::Result<Vec<(String, Vec<u8>)>, PartError> {
    let mut media = MediaStore::default();
    let mut layouts: Vec<(String, Relationships)> = Vec::with_capacity(deck.frames.len());
    let mut layout_of: HashMap<FrameId, usize> = HashMap::new();

    for (i, frame) in deck.frames.iter().enumerate() {
        let mut part_rels = Relationships::new();
        part_rels.add(rels::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
        let mut tree = ShapeTree::new(part_rels);
        write_elements(&mut tree, &frame.elements, &mut media)?;
        let (sp_tree, part_rels) = tree.finish();

        let mut xml = String::with_capacity(sp_tree.len() + 512);
        xml.push_str(package::XML_DECL);
        write!(
            xml,
            r#"<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" preserve="1" userDrawn="1"><p:cSld name="{}">"#,
            package::NS_A,
            package::NS_R,
            package::NS_P,
            quick_xml::escape::escape(frame.name.as_str())
        )?;
        package::write_background(&mut xml, frame.background)?;
        xml.push_str(&sp_tree);
        xml.push_str("</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");

        layout_of.insert(frame.id, i + 1);
        layouts.push((xml, part_rels));
    }

    let mut slides: Vec<(String, Relationships)> = Vec::with_capacity(deck.slides.len());
    for (i, slide) in deck.slides.iter().enumerate() {
        let layout = *layout_of
            .get(&slide.frame)
            .ok_or(PartError::UnknownFrame { slide: i + 1, frame: slide.frame })?;

        let mut part_rels = Relationships::new();
        part_rels.add(rels::SLIDE_LAYOUT, format!("../slideLayouts/slideLayout{}.xml", layout));
        let mut tree = ShapeTree::new(part_rels);
        write_elements(&mut tree, &slide.elements, &mut media)?;
        let (sp_tree, part_rels) = tree.finish();

        let mut xml = String::with_capacity(sp_tree.len() + 512);
        xml.push_str(package::XML_DECL);
        write!(
            xml,
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld>"#,
            package::NS_A,
            package::NS_R,
            package::NS_P
        )?;
        xml.push_str(&sp_tree);
        xml.push_str("</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
        slides.push((xml, part_rels));
    }

    let mut master_rels = Relationships::new();
    let layout_rel_ids: Vec<String> = (1..=layouts.len())
        .map(|i| master_rels.add(rels::SLIDE_LAYOUT, format!("../slideLayouts/slideLayout{}.xml", i)))
        .collect();
    master_rels.add(rels::THEME, "../theme/theme1.xml");

    let mut pres_rels = Relationships::new();
    let master_rel_id = pres_rels.add(rels::SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    let slide_rel_ids: Vec<String> = (1..=slides.len())
        .map(|i| pres_rels.add(rels::SLIDE, format!("slides/slide{}.xml", i)))
        .collect();
    pres_rels.add(rels::PRES_PROPS, "presProps.xml");
    pres_rels.add(rels::VIEW_PROPS, "viewProps.xml");
    pres_rels.add(rels::THEME, "theme/theme1.xml");
    pres_rels.add(rels::TABLE_STYLES, "tableStyles.xml");

    let mut root_rels = Relationships::new();
    root_rels.add(rels::OFFICE_DOCUMENT, "ppt/presentation.xml");
    root_rels.add(rels::CORE_PROPERTIES, "docProps/core.xml");
    root_rels.add(rels::EXTENDED_PROPERTIES, "docProps/app.xml");

    let mut parts: Vec<(String, Vec<u8>)> = Vec::new();
    let mut text = |name: &str, xml: String| parts.push((name.to_string(), xml.into_bytes()));

    text(
        "[Content_Types].xml",
        package::content_types(layouts.len(), slides.len(), &media.kinds())?,
    );
    text("_rels/.rels", root_rels.to_xml()?);
    text("docProps/core.xml", package::core_xml(&deck.title));
    text("docProps/app.xml", package::app_xml(slides.len()));
    text(
        "ppt/presentation.xml",
        package::presentation_xml(&master_rel_id, &slide_rel_ids)?,
    );
    text("ppt/_rels/presentation.xml.rels", pres_rels.to_xml()?);
    text("ppt/presProps.xml", package::pres_props_xml());
    text("ppt/viewProps.xml", package::view_props_xml());
    text("ppt/tableStyles.xml", package::table_styles_xml());
    text("ppt/theme/theme1.xml", package::theme_xml()?);
    text(
        "ppt/slideMasters/slideMaster1.xml",
        package::slide_master_xml(&layout_rel_ids, deck_core::theme::BACKGROUND)?,
    );
    text("ppt/slideMasters/_rels/slideMaster1.xml.rels", master_rels.to_xml()?);

    for (i, (xml, part_rels)) in layouts.into_iter().enumerate() {
        text(&format!("ppt/slideLayouts/slideLayout{}.xml", i + 1), xml);
        text(&format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i + 1), part_rels.to_xml()?);
    }
    for (i, (xml, part_rels)) in slides.into_iter().enumerate() {
        text(&format!("ppt/slides/slide{}.xml", i + 1), xml);
        text(&format!("ppt/slides/_rels/slide{}.xml.rels", i + 1), part_rels.to_xml()?);
    }

    for (_, entry) in media.entries {
        parts.push((format!("ppt/media/{}", entry.file_name), entry.data));
    }

    Ok(parts)
}

/// Failures while generating part XML.
#[derive(Debug)]
enum PartError {
    Format,
    UnknownFrame { slide: usize, frame: FrameId },
}

impl From<fmt::Error> for PartError {
    fn from(_: fmt::Error) -> Self {
        PartError::Format
    }
}

impl fmt::Display for PartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartError::Format => write!(f, "failed to format part XML"),
            PartError::UnknownFrame { slide, frame } => {
                write!(f, "slide {} is drawn on unknown frame {}", slide, frame.0)
            }
        }
    }
}
