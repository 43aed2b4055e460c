//! Minimal PPTX (OOXML presentation) writer.
//!
//! Accumulates composed slides, then writes the OPC package: content types,
//! relationship graph, one blank master/layout, a notes master, the theme,
//! and per-slide slide/notes parts plus embedded media.

mod boilerplate;
mod xml;

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::compose::{ImageRegion, LayoutPlan};
use crate::error::Result;

struct SlideParts {
    slide_xml: String,
    slide_rels: String,
    notes_xml: String,
    notes_rels: String,
}

struct Media {
    name: String,
    bytes: Vec<u8>,
}

/// An in-progress deck. Slides keep their insertion order.
#[derive(Default)]
pub struct PptxDeck {
    slides: Vec<SlideParts>,
    media: Vec<Media>,
}

impl PptxDeck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Append one composed slide. Picture variants read the image file here;
    /// a missing file at this point is a deck-level error.
    pub fn add_slide(&mut self, plan: &LayoutPlan) -> Result<()> {
        let slide_index = self.slides.len() + 1;
        let media_name = match &plan.image {
            ImageRegion::Picture { path, .. } => {
                let bytes = std::fs::read(path)?;
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("png")
                    .to_ascii_lowercase();
                let name = format!("image{}.{ext}", self.media.len() + 1);
                self.media.push(Media {
                    name: name.clone(),
                    bytes,
                });
                Some(name)
            }
            ImageRegion::Placeholder { .. } => None,
        };

        self.slides.push(SlideParts {
            slide_xml: xml::slide(plan),
            slide_rels: xml::slide_rels(slide_index, media_name.as_deref()),
            notes_xml: xml::notes(&plan.notes),
            notes_rels: xml::notes_rels(slide_index),
        });
        Ok(())
    }

    /// Write the package to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = std::fs::File::create(path)?;
        let mut archive = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let media_exts: BTreeSet<String> = self
            .media
            .iter()
            .filter_map(|m| m.name.rsplit('.').next())
            .map(str::to_string)
            .collect();

        archive.start_file("[Content_Types].xml", options)?;
        archive.write_all(xml::content_types(self.slides.len(), &media_exts).as_bytes())?;

        archive.start_file("_rels/.rels", options)?;
        archive.write_all(boilerplate::root_rels().as_bytes())?;

        let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        archive.start_file("docProps/core.xml", options)?;
        archive.write_all(xml::core_props(&created).as_bytes())?;

        archive.start_file("ppt/presentation.xml", options)?;
        archive.write_all(xml::presentation(self.slides.len()).as_bytes())?;
        archive.start_file("ppt/_rels/presentation.xml.rels", options)?;
        archive.write_all(xml::presentation_rels(self.slides.len()).as_bytes())?;

        archive.start_file("ppt/slideMasters/slideMaster1.xml", options)?;
        archive.write_all(boilerplate::slide_master().as_bytes())?;
        archive.start_file("ppt/slideMasters/_rels/slideMaster1.xml.rels", options)?;
        archive.write_all(boilerplate::slide_master_rels().as_bytes())?;

        archive.start_file("ppt/slideLayouts/slideLayout1.xml", options)?;
        archive.write_all(boilerplate::slide_layout().as_bytes())?;
        archive.start_file("ppt/slideLayouts/_rels/slideLayout1.xml.rels", options)?;
        archive.write_all(boilerplate::slide_layout_rels().as_bytes())?;

        archive.start_file("ppt/notesMasters/notesMaster1.xml", options)?;
        archive.write_all(boilerplate::notes_master().as_bytes())?;
        archive.start_file("ppt/notesMasters/_rels/notesMaster1.xml.rels", options)?;
        archive.write_all(boilerplate::notes_master_rels().as_bytes())?;

        archive.start_file("ppt/theme/theme1.xml", options)?;
        archive.write_all(boilerplate::theme().as_bytes())?;

        for (i, parts) in self.slides.iter().enumerate() {
            let index = i + 1;
            archive.start_file(format!("ppt/slides/slide{index}.xml"), options)?;
            archive.write_all(parts.slide_xml.as_bytes())?;
            archive.start_file(format!("ppt/slides/_rels/slide{index}.xml.rels"), options)?;
            archive.write_all(parts.slide_rels.as_bytes())?;
            archive.start_file(format!("ppt/notesSlides/notesSlide{index}.xml"), options)?;
            archive.write_all(parts.notes_xml.as_bytes())?;
            archive.start_file(
                format!("ppt/notesSlides/_rels/notesSlide{index}.xml.rels"),
                options,
            )?;
            archive.write_all(parts.notes_rels.as_bytes())?;
        }

        for media in &self.media {
            archive.start_file(format!("ppt/media/{}", media.name), options)?;
            archive.write_all(&media.bytes)?;
        }

        archive.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{compose, GenerationOutcome, RenderConfig};
    use deck_common::SlideRecord;
    use std::io::Read;

    fn record(json: &str) -> SlideRecord {
        serde_json::from_str(json).unwrap()
    }

    fn read_part(path: &Path, name: &str) -> String {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    fn part_names(path: &Path) -> Vec<String> {
        let file = std::fs::File::open(path).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn saves_a_complete_package() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("deck.pptx");

        let mut deck = PptxDeck::new();
        let config = RenderConfig::default();
        for json in [
            r#"{"title":"One","content":["a","b"]}"#,
            r#"{"title":"Two","content":"text","image_prompt":"a cat"}"#,
        ] {
            let plan = compose(&record(json), &config, &GenerationOutcome::Skipped);
            deck.add_slide(&plan).unwrap();
        }
        deck.save(&out).unwrap();

        let names = part_names(&out);
        for required in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/notesMasters/notesMaster1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/notesSlides/notesSlide1.xml",
            "ppt/notesSlides/notesSlide2.xml",
        ] {
            assert!(
                names.iter().any(|n| n == required),
                "missing part {required}"
            );
        }

        let slide1 = read_part(&out, "ppt/slides/slide1.xml");
        assert!(slide1.contains("<a:t>One</a:t>"));
        assert!(slide1.contains("<a:t>• a</a:t>"));
        let notes2 = read_part(&out, "ppt/notesSlides/notesSlide2.xml");
        assert!(notes2.contains("Image Prompt: a cat"));
    }

    #[test]
    fn embeds_generated_images_as_media() {
        let tmp = tempfile::tempdir().unwrap();
        let img = tmp.path().join("slide_1.png");
        std::fs::write(&img, b"fake png bytes").unwrap();
        let out = tmp.path().join("deck.pptx");

        let mut deck = PptxDeck::new();
        let plan = compose(
            &record(r#"{"title":"T","image_prompt":"a cat"}"#),
            &RenderConfig::default(),
            &GenerationOutcome::Succeeded {
                path: img,
                pixel_size: (1600, 900),
            },
        );
        deck.add_slide(&plan).unwrap();
        deck.save(&out).unwrap();

        let names = part_names(&out);
        assert!(names.iter().any(|n| n == "ppt/media/image1.png"));
        let rels = read_part(&out, "ppt/slides/_rels/slide1.xml.rels");
        assert!(rels.contains("Target=\"../media/image1.png\""));
        let types = read_part(&out, "[Content_Types].xml");
        assert!(types.contains("image/png"));
    }

    #[test]
    fn missing_image_file_is_an_error() {
        let mut deck = PptxDeck::new();
        let plan = compose(
            &record("{}"),
            &RenderConfig::default(),
            &GenerationOutcome::Succeeded {
                path: "/nonexistent/img.png".into(),
                pixel_size: (16, 9),
            },
        );
        assert!(deck.add_slide(&plan).is_err());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested/dir/deck.pptx");
        let deck = PptxDeck::new();
        deck.save(&out).unwrap();
        assert!(out.exists());
    }
}
