//! Package-level parts: content types, presentation, master, theme and
//! document properties.

use deck_core::theme::{self, emu, Color};
use quick_xml::escape::escape;
use std::fmt::{self, Write};

pub(crate) const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_PRES_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
const CT_VIEW_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
const CT_TABLE_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// First ID of the slide master in `sldMasterIdLst`; layout IDs follow it.
const MASTER_ID: u64 = 2_147_483_648;
/// First slide ID in `sldIdLst`.
const FIRST_SLIDE_ID: u32 = 256;

/// `[Content_Types].xml` for a package with `layouts` layouts, `slides`
/// slides and media of the given `(extension, mime)` kinds.
pub fn content_types(layouts: usize, slides: usize, media: &[(&str, &str)]) -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(2048 + (layouts + slides) * 160);
    xml.push_str(XML_DECL);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for (ext, mime) in media {
        write!(xml, r#"<Default Extension="{}" ContentType="{}"/>"#, ext, mime)?;
    }

    let mut part = |name: &str, content_type: &str| {
        write!(xml, r#"<Override PartName="/{}" ContentType="{}"/>"#, name, content_type)
    };
    part("ppt/presentation.xml", CT_PRESENTATION)?;
    part("ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER)?;
    for i in 1..=layouts {
        part(&format!("ppt/slideLayouts/slideLayout{}.xml", i), CT_SLIDE_LAYOUT)?;
    }
    for i in 1..=slides {
        part(&format!("ppt/slides/slide{}.xml", i), CT_SLIDE)?;
    }
    part("ppt/theme/theme1.xml", CT_THEME)?;
    part("ppt/presProps.xml", CT_PRES_PROPS)?;
    part("ppt/viewProps.xml", CT_VIEW_PROPS)?;
    part("ppt/tableStyles.xml", CT_TABLE_STYLES)?;
    part("docProps/core.xml", CT_CORE)?;
    part("docProps/app.xml", CT_APP)?;

    xml.push_str("</Types>");
    Ok(xml)
}

/// `ppt/presentation.xml` with the master and slides in order.
pub fn presentation_xml(master_rel_id: &str, slide_rel_ids: &[String]) -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(1024 + slide_rel_ids.len() * 48);
    xml.push_str(XML_DECL);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    )?;

    xml.push_str("<p:sldMasterIdLst>");
    write!(xml, r#"<p:sldMasterId id="{}" r:id="{}"/>"#, MASTER_ID, master_rel_id)?;
    xml.push_str("</p:sldMasterIdLst>");

    if !slide_rel_ids.is_empty() {
        xml.push_str("<p:sldIdLst>");
        for (i, rel_id) in slide_rel_ids.iter().enumerate() {
            write!(xml, r#"<p:sldId id="{}" r:id="{}"/>"#, FIRST_SLIDE_ID + i as u32, rel_id)?;
        }
        xml.push_str("</p:sldIdLst>");
    }

    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/>"#,
        emu(theme::SLIDE_WIDTH),
        emu(theme::SLIDE_HEIGHT)
    )?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    Ok(xml)
}

/// `ppt/slideMasters/slideMaster1.xml`. The master itself is blank; every
/// frame lives in its own layout.
pub fn slide_master_xml(layout_rel_ids: &[String], background: Color) -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(2048 + layout_rel_ids.len() * 64);
    xml.push_str(XML_DECL);
    write!(xml, r#"<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#, NS_A, NS_R, NS_P)?;
    xml.push_str("<p:cSld>");
    write_background(&mut xml, background)?;
    xml.push_str("<p:spTree>");
    write_group_header(&mut xml);
    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    );

    xml.push_str("<p:sldLayoutIdLst>");
    for (i, rel_id) in layout_rel_ids.iter().enumerate() {
        write!(
            xml,
            r#"<p:sldLayoutId id="{}" r:id="{}"/>"#,
            MASTER_ID + 1 + i as u64,
            rel_id
        )?;
    }
    xml.push_str("</p:sldLayoutIdLst>");

    xml.push_str("<p:txStyles>");
    for style in ["titleStyle", "bodyStyle", "otherStyle"] {
        write!(
            xml,
            r#"<p:{0}><a:lvl1pPr><a:defRPr lang="en-US"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:{0}>"#,
            style
        )?;
    }
    xml.push_str("</p:txStyles>");
    xml.push_str("</p:sldMaster>");
    Ok(xml)
}

/// `<p:bg>` with a solid fill.
pub(crate) fn write_background(xml: &mut String, color: Color) -> fmt::Result {
    write!(
        xml,
        r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
        color
    )
}

/// The fixed non-visual header every `<p:spTree>` starts with.
pub(crate) fn write_group_header(xml: &mut String) {
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    );
}

/// `ppt/theme/theme1.xml`, built around the report palette.
pub fn theme_xml() -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    write!(xml, r#"<a:theme xmlns:a="{}" name="Report">"#, NS_A)?;
    xml.push_str("<a:themeElements>");

    xml.push_str(r#"<a:clrScheme name="Report">"#);
    write!(xml, r#"<a:dk1><a:srgbClr val="{}"/></a:dk1>"#, theme::TEXT)?;
    write!(xml, r#"<a:lt1><a:srgbClr val="{}"/></a:lt1>"#, theme::BACKGROUND)?;
    write!(xml, r#"<a:dk2><a:srgbClr val="{}"/></a:dk2>"#, theme::HEADER_BG)?;
    write!(xml, r#"<a:lt2><a:srgbClr val="{}"/></a:lt2>"#, theme::ROW_FILL_ODD_INDEX)?;
    let accents = [
        theme::HEADER_BG,
        theme::ACCENT_RED,
        Color(0x9BBB59),
        Color(0x8064A2),
        Color(0x4BACC6),
        Color(0xF79646),
    ];
    for (i, color) in accents.iter().enumerate() {
        write!(xml, r#"<a:accent{0}><a:srgbClr val="{1}"/></a:accent{0}>"#, i + 1, color)?;
    }
    xml.push_str(r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink>"#);
    xml.push_str(r#"<a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#);
    xml.push_str("</a:clrScheme>");

    xml.push_str(r#"<a:fontScheme name="Report">"#);
    for kind in ["majorFont", "minorFont"] {
        write!(
            xml,
            r#"<a:{0}><a:latin typeface="Arial"/><a:ea typeface=""/><a:cs typeface=""/></a:{0}>"#,
            kind
        )?;
    }
    xml.push_str("</a:fontScheme>");

    xml.push_str(r#"<a:fmtScheme name="Report">"#);
    xml.push_str("<a:fillStyleLst>");
    for _ in 0..3 {
        xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
    }
    xml.push_str("</a:fillStyleLst>");
    xml.push_str("<a:lnStyleLst>");
    for width in [6350, 12700, 19050] {
        write!(
            xml,
            r#"<a:ln w="{}"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
            width
        )?;
    }
    xml.push_str("</a:lnStyleLst>");
    xml.push_str("<a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst>");
    xml.push_str("<a:bgFillStyleLst>");
    for _ in 0..3 {
        xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
    }
    xml.push_str("</a:bgFillStyleLst>");
    xml.push_str("</a:fmtScheme>");

    xml.push_str("</a:themeElements>");
    xml.push_str("</a:theme>");
    Ok(xml)
}

pub fn pres_props_xml() -> String {
    format!(
        r#"{}<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        XML_DECL, NS_A, NS_R, NS_P
    )
}

pub fn view_props_xml() -> String {
    format!(
        r#"{}<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:normalViewPr/><p:gridSpacing cx="76200" cy="76200"/></p:viewPr>"#,
        XML_DECL, NS_A, NS_R, NS_P
    )
}

pub fn table_styles_xml() -> String {
    format!(
        r#"{}<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
        XML_DECL, NS_A
    )
}

/// `docProps/core.xml` carrying the report title.
pub fn core_xml(title: &str) -> String {
    format!(
        r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>report-deck</dc:creator></cp:coreProperties>"#,
        XML_DECL,
        escape(title)
    )
}

/// `docProps/app.xml`.
pub fn app_xml(slides: usize) -> String {
    format!(
        r#"{}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>report-deck</Application><Slides>{}</Slides></Properties>"#,
        XML_DECL, slides
    )
}
