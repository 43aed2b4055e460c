//! Slide layout and image-fallback resolution.
//!
//! [`compose`] turns one [`SlideRecord`] plus a per-slide
//! [`GenerationOutcome`] into a [`LayoutPlan`]: absolute rectangles and
//! literal text for the four slide regions. It performs no I/O and cannot
//! fail; malformed records normalize to defaults.

use std::path::PathBuf;

use deck_common::{SlideContent, SlideRecord};

/// English Metric Units, the deck-relative coordinate space.
pub type Emu = i64;

pub const EMU_PER_INCH: Emu = 914_400;

/// 16:9 canvas, 13.333 x 7.5 inches.
pub const SLIDE_WIDTH: Emu = 12_192_000;
pub const SLIDE_HEIGHT: Emu = 6_858_000;

// Title band across the top.
const TITLE_RECT: Rect = Rect {
    left: 457_200,        // 0.5"
    top: 274_320,         // 0.3"
    width: 10_972_800,    // 12.0"
    height: 914_400,      // 1.0"
};

// Content column on the left, below the title band.
const CONTENT_RECT: Rect = Rect {
    left: 457_200,        // 0.5"
    top: 1_371_600,       // 1.5"
    width: 5_486_400,     // 6.0"
    height: 4_572_000,    // 5.0"
};

// Image column on the right, same vertical band as the content column.
const IMAGE_LEFT: Emu = 6_400_800; // 7.0"
const IMAGE_TOP: Emu = 1_371_600; // 1.5"
const IMAGE_WIDTH: Emu = 5_303_520; // 5.8"
const PLACEHOLDER_HEIGHT: Emu = 3_657_600; // 4.0"
const CAPTION_GAP: Emu = 91_440; // 0.1"
const CAPTION_HEIGHT: Emu = 457_200; // 0.5"

const BULLET: &str = "• ";
const NOTES_LABEL: &str = "Image Prompt: ";
const DEFAULT_CAPTION: &str = "Generated by Imagen 4.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: Emu,
    pub top: Emu,
    pub width: Emu,
    pub height: Emu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// A positioned run of text with uniform formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRegion {
    pub rect: Rect,
    pub text: String,
    /// Point size; paragraphs in the region all use it.
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub centered: bool,
}

/// The image region is a strict alternative: a generated picture with an
/// optional caption strip, or a styled fallback rectangle. Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRegion {
    Picture {
        rect: Rect,
        path: PathBuf,
        caption: Option<TextRegion>,
    },
    Placeholder {
        rect: Rect,
        text: String,
        fill: Rgb,
        line: Rgb,
        size: u32,
    },
}

/// Layout instructions for one slide, consumed by the deck writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub title: TextRegion,
    pub content: TextRegion,
    pub image: ImageRegion,
    pub notes: String,
}

/// Result of the per-slide image-generation attempt; the sole input to the
/// image-region branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Generation disabled, or the slide has no prompt.
    Skipped,
    /// Bytes written and read back; pixel size from the decoded header.
    Succeeded { path: PathBuf, pixel_size: (u32, u32) },
    /// Remote call, payload decode, or local write failed.
    Failed,
}

/// Global rendering parameters.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub title_size: u32,
    pub content_size: u32,
    pub placeholder_size: u32,
    pub caption_size: u32,
    pub placeholder_fill: Rgb,
    pub placeholder_line: Rgb,
    /// Caption placed under generated pictures; `None` disables captions.
    pub caption: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title_size: 40,
            content_size: 20,
            placeholder_size: 14,
            caption_size: 10,
            placeholder_fill: Rgb(0xEE, 0xEE, 0xEE),
            placeholder_line: Rgb(0x88, 0x88, 0x88),
            caption: Some(DEFAULT_CAPTION.to_string()),
        }
    }
}

/// Produce the layout plan for one slide.
pub fn compose(
    record: &SlideRecord,
    config: &RenderConfig,
    outcome: &GenerationOutcome,
) -> LayoutPlan {
    let title = TextRegion {
        rect: TITLE_RECT,
        text: record.display_title().to_string(),
        size: config.title_size,
        bold: true,
        italic: false,
        centered: false,
    };

    let content = TextRegion {
        rect: CONTENT_RECT,
        text: content_text(&record.content),
        size: config.content_size,
        bold: false,
        italic: false,
        centered: false,
    };

    let image = match outcome {
        GenerationOutcome::Succeeded { path, pixel_size } => {
            picture_region(path.clone(), *pixel_size, config)
        }
        GenerationOutcome::Skipped | GenerationOutcome::Failed => {
            placeholder_region(&record.image_prompt, config)
        }
    };

    LayoutPlan {
        title,
        content,
        image,
        notes: format!("{NOTES_LABEL}{}", record.image_prompt),
    }
}

fn content_text(content: &SlideContent) -> String {
    match content {
        SlideContent::Text(text) => text.clone(),
        SlideContent::Items(items) => items
            .iter()
            .map(|item| format!("{BULLET}{item}"))
            .collect::<Vec<_>>()
            .join("\n"),
        SlideContent::Empty => String::new(),
    }
}

fn picture_region(path: PathBuf, pixel_size: (u32, u32), config: &RenderConfig) -> ImageRegion {
    let (px_width, px_height) = pixel_size;
    // Width-bound placement; height follows the source aspect ratio.
    let height = if px_width == 0 {
        PLACEHOLDER_HEIGHT
    } else {
        IMAGE_WIDTH * Emu::from(px_height) / Emu::from(px_width)
    };
    let rect = Rect {
        left: IMAGE_LEFT,
        top: IMAGE_TOP,
        width: IMAGE_WIDTH,
        height,
    };
    // The caption strip hangs off the image's actual bottom edge, which
    // moves with the aspect ratio.
    let caption = config.caption.as_ref().map(|text| TextRegion {
        rect: Rect {
            left: IMAGE_LEFT,
            top: IMAGE_TOP + height + CAPTION_GAP,
            width: IMAGE_WIDTH,
            height: CAPTION_HEIGHT,
        },
        text: text.clone(),
        size: config.caption_size,
        bold: false,
        italic: true,
        centered: true,
    });
    ImageRegion::Picture { rect, path, caption }
}

fn placeholder_region(image_prompt: &str, config: &RenderConfig) -> ImageRegion {
    let text = if image_prompt.is_empty() {
        "No Image Prompt".to_string()
    } else {
        format!("Image Placeholder\n\nPrompt:\n{image_prompt}")
    };
    ImageRegion::Placeholder {
        rect: Rect {
            left: IMAGE_LEFT,
            top: IMAGE_TOP,
            width: IMAGE_WIDTH,
            height: PLACEHOLDER_HEIGHT,
        },
        text,
        fill: config.placeholder_fill,
        line: config.placeholder_line,
        size: config.placeholder_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> SlideRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn title_falls_back_to_no_title() {
        let plan = compose(
            &record("{}"),
            &RenderConfig::default(),
            &GenerationOutcome::Skipped,
        );
        assert_eq!(plan.title.text, "No Title");
        assert!(plan.title.bold);
        assert_eq!(plan.title.size, 40);
    }

    #[test]
    fn list_content_joins_with_bullets_in_order() {
        let plan = compose(
            &record(r#"{"content":["a","b","c"]}"#),
            &RenderConfig::default(),
            &GenerationOutcome::Skipped,
        );
        assert_eq!(plan.content.text, "• a\n• b\n• c");
        assert_eq!(plan.content.size, 20);
    }

    #[test]
    fn string_content_passes_through_verbatim() {
        let plan = compose(
            &record(r#"{"content":"one\ntwo"}"#),
            &RenderConfig::default(),
            &GenerationOutcome::Skipped,
        );
        assert_eq!(plan.content.text, "one\ntwo");
    }

    #[test]
    fn absent_content_is_empty() {
        let plan = compose(
            &record("{}"),
            &RenderConfig::default(),
            &GenerationOutcome::Skipped,
        );
        assert_eq!(plan.content.text, "");
    }

    #[test]
    fn skipped_without_prompt_yields_no_prompt_placeholder() {
        let plan = compose(
            &record(r#"{"image_prompt":""}"#),
            &RenderConfig::default(),
            &GenerationOutcome::Skipped,
        );
        match plan.image {
            ImageRegion::Placeholder { ref text, fill, line, .. } => {
                assert_eq!(text, "No Image Prompt");
                assert_eq!(fill.hex(), "EEEEEE");
                assert_eq!(line.hex(), "888888");
            }
            ImageRegion::Picture { .. } => panic!("expected placeholder"),
        }
    }

    #[test]
    fn failed_with_prompt_shows_the_prompt() {
        let plan = compose(
            &record(r#"{"image_prompt":"a cat"}"#),
            &RenderConfig::default(),
            &GenerationOutcome::Failed,
        );
        match plan.image {
            ImageRegion::Placeholder { ref text, .. } => {
                assert!(text.contains("Image Placeholder"));
                assert!(text.contains("a cat"));
            }
            ImageRegion::Picture { .. } => panic!("expected placeholder"),
        }
    }

    #[test]
    fn success_yields_picture_with_aspect_scaled_height() {
        let outcome = GenerationOutcome::Succeeded {
            path: PathBuf::from("img.png"),
            pixel_size: (1600, 900),
        };
        let plan = compose(
            &record(r#"{"image_prompt":"a cat"}"#),
            &RenderConfig::default(),
            &outcome,
        );
        match plan.image {
            ImageRegion::Picture { rect, ref caption, .. } => {
                assert_eq!(rect.width, IMAGE_WIDTH);
                assert_eq!(rect.height, IMAGE_WIDTH * 900 / 1600);
                let caption = caption.as_ref().unwrap();
                assert!(caption.italic);
                assert!(caption.centered);
                assert_eq!(caption.rect.top, rect.top + rect.height + CAPTION_GAP);
            }
            ImageRegion::Placeholder { .. } => panic!("expected picture"),
        }
    }

    #[test]
    fn caption_top_tracks_the_aspect_ratio() {
        let squarish = GenerationOutcome::Succeeded {
            path: PathBuf::from("img.png"),
            pixel_size: (1000, 1000),
        };
        let wide = GenerationOutcome::Succeeded {
            path: PathBuf::from("img.png"),
            pixel_size: (2000, 1000),
        };
        let config = RenderConfig::default();
        let rec = record(r#"{"image_prompt":"a cat"}"#);
        let top_of = |outcome| match compose(&rec, &config, &outcome).image {
            ImageRegion::Picture { caption: Some(c), .. } => c.rect.top,
            _ => panic!("expected captioned picture"),
        };
        assert!(top_of(squarish) > top_of(wide));
    }

    #[test]
    fn caption_can_be_disabled() {
        let config = RenderConfig {
            caption: None,
            ..RenderConfig::default()
        };
        let outcome = GenerationOutcome::Succeeded {
            path: PathBuf::from("img.png"),
            pixel_size: (1600, 900),
        };
        let plan = compose(&record("{}"), &config, &outcome);
        assert!(matches!(
            plan.image,
            ImageRegion::Picture { caption: None, .. }
        ));
    }

    #[test]
    fn notes_always_reflect_the_requested_prompt() {
        let rec = record(r#"{"image_prompt":"a cat"}"#);
        let config = RenderConfig::default();
        for outcome in [
            GenerationOutcome::Skipped,
            GenerationOutcome::Failed,
            GenerationOutcome::Succeeded {
                path: PathBuf::from("img.png"),
                pixel_size: (16, 9),
            },
        ] {
            let plan = compose(&rec, &config, &outcome);
            assert_eq!(plan.notes, "Image Prompt: a cat");
        }
        let plan = compose(&record("{}"), &config, &GenerationOutcome::Skipped);
        assert_eq!(plan.notes, "Image Prompt: ");
    }

    #[test]
    fn regions_do_not_overlap() {
        let plan = compose(
            &record(r#"{"title":"T","content":"c","image_prompt":"p"}"#),
            &RenderConfig::default(),
            &GenerationOutcome::Skipped,
        );
        let title = plan.title.rect;
        let content = plan.content.rect;
        let image = match plan.image {
            ImageRegion::Placeholder { rect, .. } => rect,
            ImageRegion::Picture { rect, .. } => rect,
        };
        // Title band sits above both columns.
        assert!(title.top + title.height <= content.top);
        assert!(title.top + title.height <= image.top);
        // Columns are side by side.
        assert!(content.left + content.width <= image.left);
    }
}
