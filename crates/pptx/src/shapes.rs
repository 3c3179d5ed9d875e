//! DrawingML for the elements of a frame or a page.

use crate::package;
use crate::rels::{self, Relationships};
use deck_core::media::PixelSize;
use deck_core::layout::{Cell, Paragraph, Picture, Sizing, Table, TableRow, TextBox, TextStyle};
use deck_core::theme::{emu, table as table_theme, Align, Color, Rect, VAlign};
use quick_xml::escape::escape;
use std::fmt::{self, Write};

const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";
const BULLET_CHAR: &str = "\u{2022}";
const EMU_PER_POINT: f64 = 12_700.0;

/// Builds the `<p:spTree>` of one part together with the part's
/// relationships.
#[derive(Debug)]
pub struct ShapeTree {
    xml: String,
    next_id: u32,
    rels: Relationships,
}

impl ShapeTree {
    /// Start a tree for a part whose relationships are `rels` so far.
    pub fn new(rels: Relationships) -> Self {
        let mut xml = String::with_capacity(8192);
        xml.push_str("<p:spTree>");
        package::write_group_header(&mut xml);
        Self { xml, next_id: 2, rels }
    }

    fn shape_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Close the tree, returning its XML and the part relationships.
    pub fn finish(mut self) -> (String, Relationships) {
        self.xml.push_str("</p:spTree>");
        (self.xml, self.rels)
    }

    pub fn text_box(&mut self, text: &TextBox) -> fmt::Result {
        let id = self.shape_id();
        write!(
            self.xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Text {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            id, id
        )?;
        self.xml.push_str("<p:spPr>");
        write_xfrm(&mut self.xml, text.rect)?;
        self.xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/>"#);
        self.xml.push_str("</p:spPr>");

        write!(
            self.xml,
            r#"<p:txBody><a:bodyPr wrap="square" lIns="91440" tIns="45720" rIns="91440" bIns="45720" rtlCol="0" anchor="{}"><a:noAutofit/></a:bodyPr><a:lstStyle/>"#,
            valign_attr(text.style.valign)
        )?;
        self.paragraphs(&text.paragraphs, &text.style)?;
        self.xml.push_str("</p:txBody></p:sp>");
        Ok(())
    }

    /// A picture whose media part is `target` (relative to the part).
    /// `size` is the image's pixel size, used for [`Sizing::Contain`].
    pub fn picture(&mut self, picture: &Picture, target: &str, size: Option<PixelSize>) -> fmt::Result {
        let rel_id = self.rels.add(rels::IMAGE, target);
        let id = self.shape_id();
        let rect = match (picture.sizing, size) {
            (Sizing::Contain, Some(size)) => fit_contain(picture.rect, size),
            _ => picture.rect,
        };

        write!(
            self.xml,
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}" descr="{}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
            id,
            id,
            escape(picture.description.as_str())
        )?;
        write!(
            self.xml,
            r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            rel_id
        )?;
        self.xml.push_str("<p:spPr>");
        write_xfrm(&mut self.xml, rect)?;
        self.xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
        Ok(())
    }

    pub fn table(&mut self, table: &Table) -> fmt::Result {
        let id = self.shape_id();
        write!(
            self.xml,
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Table {}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>"#,
            id, id
        )?;
        write!(
            self.xml,
            r#"<p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm>"#,
            emu(table.x),
            emu(table.y),
            emu(table.width()),
            emu(table.height())
        )?;
        write!(self.xml, r#"<a:graphic><a:graphicData uri="{}"><a:tbl>"#, TABLE_URI)?;
        self.xml.push_str(r#"<a:tblPr firstRow="1" bandRow="1"/>"#);

        self.xml.push_str("<a:tblGrid>");
        for width in &table.col_widths {
            write!(self.xml, r#"<a:gridCol w="{}"/>"#, emu(*width))?;
        }
        self.xml.push_str("</a:tblGrid>");

        for row in &table.rows {
            self.table_row(row, table.border, table.border_pt)?;
        }

        self.xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
        Ok(())
    }

    fn table_row(&mut self, row: &TableRow, border: Color, border_pt: f64) -> fmt::Result {
        write!(self.xml, r#"<a:tr h="{}">"#, emu(row.height))?;
        for cell in &row.cells {
            self.table_cell(cell, border, border_pt)?;
            // Cells covered by a horizontal span
            for _ in 1..cell.col_span {
                self.xml.push_str(
                    r#"<a:tc hMerge="1"><a:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></a:txBody><a:tcPr/></a:tc>"#,
                );
            }
        }
        self.xml.push_str("</a:tr>");
        Ok(())
    }

    fn table_cell(&mut self, cell: &Cell, border: Color, border_pt: f64) -> fmt::Result {
        if cell.col_span > 1 {
            write!(self.xml, r#"<a:tc gridSpan="{}">"#, cell.col_span)?;
        } else {
            self.xml.push_str("<a:tc>");
        }
        self.xml.push_str("<a:txBody><a:bodyPr/><a:lstStyle/>");
        self.paragraphs(&cell.paragraphs, &cell.style)?;
        self.xml.push_str("</a:txBody>");

        let margin_x = emu(table_theme::CELL_MARGIN_X);
        let margin_y = emu(table_theme::CELL_MARGIN_Y);
        write!(
            self.xml,
            r#"<a:tcPr marL="{0}" marR="{0}" marT="{1}" marB="{1}" anchor="{2}">"#,
            margin_x,
            margin_y,
            valign_attr(cell.style.valign)
        )?;
        let width = (border_pt * EMU_PER_POINT).round() as i64;
        for side in ["lnL", "lnR", "lnT", "lnB"] {
            write!(
                self.xml,
                r#"<a:{0} w="{1}" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:srgbClr val="{2}"/></a:solidFill><a:prstDash val="solid"/></a:{0}>"#,
                side, width, border
            )?;
        }
        write!(self.xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, cell.fill)?;
        self.xml.push_str("</a:tcPr></a:tc>");
        Ok(())
    }

    fn paragraphs(&mut self, paragraphs: &[Paragraph], style: &TextStyle) -> fmt::Result {
        if paragraphs.is_empty() {
            return self.paragraph(&Paragraph::plain(vec![String::new()]), style);
        }
        for paragraph in paragraphs {
            self.paragraph(paragraph, style)?;
        }
        Ok(())
    }

    fn paragraph(&mut self, paragraph: &Paragraph, style: &TextStyle) -> fmt::Result {
        let algn = align_attr(style.align);
        if paragraph.bullet {
            let indent = emu(table_theme::BULLET_INDENT);
            write!(
                self.xml,
                r#"<a:p><a:pPr marL="{0}" indent="-{0}" algn="{1}"><a:buFont typeface="Arial"/><a:buChar char="{2}"/></a:pPr>"#,
                indent, algn, BULLET_CHAR
            )?;
        } else {
            write!(self.xml, r#"<a:p><a:pPr algn="{}"><a:buNone/></a:pPr>"#, algn)?;
        }

        let link = paragraph
            .hyperlink
            .as_deref()
            .map(|url| self.rels.add_external(rels::HYPERLINK, url));

        for (i, line) in paragraph.lines.iter().enumerate() {
            if i > 0 {
                self.xml.push_str("<a:br>");
                write_run_props(&mut self.xml, "a:rPr", style, None)?;
                self.xml.push_str("</a:br>");
            }
            if line.is_empty() {
                continue;
            }
            self.xml.push_str("<a:r>");
            write_run_props(&mut self.xml, "a:rPr", style, link.as_deref())?;
            write!(self.xml, "<a:t>{}</a:t></a:r>", escape(line.as_str()))?;
        }

        write_run_props(&mut self.xml, "a:endParaRPr", style, None)?;
        self.xml.push_str("</a:p>");
        Ok(())
    }
}

fn write_run_props(xml: &mut String, tag: &str, style: &TextStyle, link: Option<&str>) -> fmt::Result {
    write!(
        xml,
        r#"<{} lang="en-US" sz="{}" b="{}" dirty="0">"#,
        tag,
        (style.font_size * 100.0).round() as u32,
        if style.bold { 1 } else { 0 }
    )?;
    write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, style.color)?;
    if let Some(rel_id) = link {
        write!(xml, r#"<a:hlinkClick r:id="{}"/>"#, rel_id)?;
    }
    write!(xml, "</{}>", tag)
}

fn write_xfrm(xml: &mut String, rect: Rect) -> fmt::Result {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(rect.x),
        emu(rect.y),
        emu(rect.w),
        emu(rect.h)
    )
}

fn align_attr(align: Align) -> &'static str {
    match align {
        Align::Left => "l",
        Align::Center => "ctr",
        Align::Justify => "just",
    }
}

fn valign_attr(valign: VAlign) -> &'static str {
    match valign {
        VAlign::Top => "t",
        VAlign::Middle => "ctr",
    }
}

/// Largest rect with the image's aspect ratio that fits in `bounds`,
/// centered in it.
pub fn fit_contain(bounds: Rect, size: PixelSize) -> Rect {
    if size.width == 0 || size.height == 0 || bounds.w <= 0.0 || bounds.h <= 0.0 {
        return bounds;
    }
    let image_ratio = size.width as f64 / size.height as f64;
    let box_ratio = bounds.w / bounds.h;

    let (w, h) = if image_ratio > box_ratio {
        (bounds.w, bounds.w / image_ratio)
    } else {
        (bounds.h * image_ratio, bounds.h)
    };
    Rect::new(bounds.x + (bounds.w - w) / 2.0, bounds.y + (bounds.h - h) / 2.0, w, h)
}
