//! Dynamic OPC part bodies: presentation, per-slide shapes, notes, rels.

use std::borrow::Cow;
use std::collections::BTreeSet;

use quick_xml::escape::escape;

use crate::compose::{ImageRegion, LayoutPlan, TextRegion, SLIDE_HEIGHT, SLIDE_WIDTH};
use crate::pptx::boilerplate::*;

fn esc(raw: &str) -> Cow<'_, str> {
    escape(raw)
}

pub(crate) fn content_types(slide_count: usize, media_exts: &BTreeSet<String>) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(&format!("<Types xmlns=\"{NS_CT}\">"));
    xml.push_str(&format!(
        "<Default Extension=\"rels\" ContentType=\"{CT_RELS}\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>"
    ));
    for ext in media_exts {
        let mime = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            _ => "application/octet-stream",
        };
        xml.push_str(&format!(
            "<Default Extension=\"{ext}\" ContentType=\"{mime}\"/>"
        ));
    }
    xml.push_str(&format!(
        "<Override PartName=\"/ppt/presentation.xml\" ContentType=\"{CT_PRESENTATION}\"/>\
<Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"{CT_SLIDE_MASTER}\"/>\
<Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"{CT_SLIDE_LAYOUT}\"/>\
<Override PartName=\"/ppt/notesMasters/notesMaster1.xml\" ContentType=\"{CT_NOTES_MASTER}\"/>\
<Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"{CT_THEME}\"/>\
<Override PartName=\"/docProps/core.xml\" ContentType=\"{CT_CORE_PROPS}\"/>"
    ));
    for index in 1..=slide_count {
        xml.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{index}.xml\" ContentType=\"{CT_SLIDE}\"/>\
<Override PartName=\"/ppt/notesSlides/notesSlide{index}.xml\" ContentType=\"{CT_NOTES_SLIDE}\"/>"
        ));
    }
    xml.push_str("</Types>");
    xml
}

pub(crate) fn core_props(timestamp: &str) -> String {
    format!(
        "{XML_DECL}<cp:coreProperties \
xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
xmlns:dcterms=\"http://purl.org/dc/terms/\" \
xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
<dc:creator>deck</dc:creator><cp:lastModifiedBy>deck</cp:lastModifiedBy>\
<dcterms:created xsi:type=\"dcterms:W3CDTF\">{timestamp}</dcterms:created>\
<dcterms:modified xsi:type=\"dcterms:W3CDTF\">{timestamp}</dcterms:modified>\
</cp:coreProperties>"
    )
}

pub(crate) fn presentation(slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for index in 1..=slide_count {
        let id = 255 + index;
        let rid = index + 2;
        slide_ids.push_str(&format!("<p:sldId id=\"{id}\" r:id=\"rId{rid}\"/>"));
    }
    format!(
        "{XML_DECL}<p:presentation xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\">\
<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
<p:notesMasterIdLst><p:notesMasterId r:id=\"rId2\"/></p:notesMasterIdLst>\
<p:sldIdLst>{slide_ids}</p:sldIdLst>\
<p:sldSz cx=\"{SLIDE_WIDTH}\" cy=\"{SLIDE_HEIGHT}\"/>\
<p:notesSz cx=\"6858000\" cy=\"9144000\"/>\
</p:presentation>"
    )
}

pub(crate) fn presentation_rels(slide_count: usize) -> String {
    let mut rels = String::new();
    rels.push_str(XML_DECL);
    rels.push_str(&format!("<Relationships xmlns=\"{NS_REL}\">"));
    rels.push_str(&format!(
        "<Relationship Id=\"rId1\" Type=\"{REL_SLIDE_MASTER}\" \
Target=\"slideMasters/slideMaster1.xml\"/>\
<Relationship Id=\"rId2\" Type=\"{REL_NOTES_MASTER}\" \
Target=\"notesMasters/notesMaster1.xml\"/>"
    ));
    for index in 1..=slide_count {
        let rid = index + 2;
        rels.push_str(&format!(
            "<Relationship Id=\"rId{rid}\" Type=\"{REL_SLIDE}\" Target=\"slides/slide{index}.xml\"/>"
        ));
    }
    rels.push_str("</Relationships>");
    rels
}

/// Relationships for one slide part. The image relationship is only present
/// for the picture variant; notes are always attached.
pub(crate) fn slide_rels(slide_index: usize, media_name: Option<&str>) -> String {
    let mut rels = String::new();
    rels.push_str(XML_DECL);
    rels.push_str(&format!("<Relationships xmlns=\"{NS_REL}\">"));
    rels.push_str(&format!(
        "<Relationship Id=\"rId1\" Type=\"{REL_SLIDE_LAYOUT}\" \
Target=\"../slideLayouts/slideLayout1.xml\"/>\
<Relationship Id=\"rId2\" Type=\"{REL_NOTES_SLIDE}\" \
Target=\"../notesSlides/notesSlide{slide_index}.xml\"/>"
    ));
    if let Some(name) = media_name {
        rels.push_str(&format!(
            "<Relationship Id=\"rId3\" Type=\"{REL_IMAGE}\" Target=\"../media/{name}\"/>"
        ));
    }
    rels.push_str("</Relationships>");
    rels
}

pub(crate) fn notes_rels(slide_index: usize) -> String {
    format!(
        "{XML_DECL}<Relationships xmlns=\"{NS_REL}\">\
<Relationship Id=\"rId1\" Type=\"{REL_NOTES_MASTER}\" \
Target=\"../notesMasters/notesMaster1.xml\"/>\
<Relationship Id=\"rId2\" Type=\"{REL_SLIDE}\" Target=\"../slides/slide{slide_index}.xml\"/>\
</Relationships>"
    )
}

/// Render one composed slide as its `p:sld` part.
pub(crate) fn slide(plan: &LayoutPlan) -> String {
    let mut shapes = String::new();
    shapes.push_str(&textbox(2, "Title", &plan.title, false));
    shapes.push_str(&textbox(3, "Content", &plan.content, false));
    match &plan.image {
        ImageRegion::Picture { rect, caption, .. } => {
            shapes.push_str(&format!(
                "<p:pic><p:nvPicPr><p:cNvPr id=\"4\" name=\"Generated Image\"/>\
<p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>\
<p:blipFill><a:blip r:embed=\"rId3\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
<p:spPr><a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>\
<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>",
                rect.left, rect.top, rect.width, rect.height
            ));
            if let Some(caption) = caption {
                shapes.push_str(&textbox(5, "Caption", caption, false));
            }
        }
        ImageRegion::Placeholder {
            rect,
            text,
            fill,
            line,
            size,
        } => {
            let body = TextRegion {
                rect: *rect,
                text: text.clone(),
                size: *size,
                bold: true,
                italic: false,
                centered: true,
            };
            shapes.push_str(&format!(
                "<p:sp><p:nvSpPr><p:cNvPr id=\"4\" name=\"Image Placeholder\"/>\
<p:cNvSpPr/><p:nvPr/></p:nvSpPr>\
<p:spPr><a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>\
<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom>\
<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>\
<a:ln><a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill></a:ln></p:spPr>{}</p:sp>",
                rect.left,
                rect.top,
                rect.width,
                rect.height,
                fill.hex(),
                line.hex(),
                text_body(&body, true)
            ));
        }
    }

    format!(
        "{XML_DECL}<p:sld xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\">\
<p:cSld><p:spTree>\
<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>\
<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>\
{shapes}\
</p:spTree></p:cSld>\
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>\
</p:sld>"
    )
}

/// Speaker-notes part: one body placeholder holding the notes text.
pub(crate) fn notes(text: &str) -> String {
    let mut paragraphs = String::new();
    for line in text.split('\n') {
        if line.is_empty() {
            paragraphs.push_str("<a:p><a:endParaRPr lang=\"en-US\"/></a:p>");
        } else {
            paragraphs.push_str(&format!(
                "<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>",
                esc(line)
            ));
        }
    }
    format!(
        "{XML_DECL}<p:notes xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\">\
<p:cSld><p:spTree>\
<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>\
<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>\
<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Notes Placeholder\"/>\
<p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>\
<p:nvPr><p:ph type=\"body\" idx=\"1\"/></p:nvPr></p:nvSpPr>\
<p:spPr/>\
<p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>\
</p:spTree></p:cSld>\
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>\
</p:notes>"
    )
}

fn textbox(id: u32, name: &str, region: &TextRegion, anchor_center: bool) -> String {
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"{name}\"/>\
<p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>\
<p:spPr><a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>\
<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>{}</p:sp>",
        region.rect.left,
        region.rect.top,
        region.rect.width,
        region.rect.height,
        text_body(region, anchor_center)
    )
}

/// Shared `p:txBody` rendering: newline-separated paragraphs, uniform run
/// formatting, word wrap on.
fn text_body(region: &TextRegion, anchor_center: bool) -> String {
    let anchor = if anchor_center { " anchor=\"ctr\"" } else { "" };
    let align = if region.centered {
        "<a:pPr algn=\"ctr\"/>"
    } else {
        ""
    };
    let size = region.size * 100;
    let bold = if region.bold { " b=\"1\"" } else { "" };
    let italic = if region.italic { " i=\"1\"" } else { "" };

    let mut paragraphs = String::new();
    for line in region.text.split('\n') {
        if line.is_empty() {
            paragraphs.push_str(&format!(
                "<a:p>{align}<a:endParaRPr lang=\"en-US\" sz=\"{size}\"{bold}{italic}/></a:p>"
            ));
        } else {
            paragraphs.push_str(&format!(
                "<a:p>{align}<a:r><a:rPr lang=\"en-US\" sz=\"{size}\"{bold}{italic}/>\
<a:t>{}</a:t></a:r></a:p>",
                esc(line)
            ));
        }
    }

    format!("<p:txBody><a:bodyPr wrap=\"square\"{anchor}/><a:lstStyle/>{paragraphs}</p:txBody>")
}
