use serde::{Deserialize, Serialize};

/// One slide as it appears in the input JSON.
///
/// Every field is optional; missing fields fall back to neutral defaults
/// instead of rejecting the record. Slide order in the input sequence is the
/// slide's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: SlideContent,
    #[serde(default)]
    pub image_prompt: String,
}

/// Slide body content: either a single text block or a list of bullet items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlideContent {
    Text(String),
    Items(Vec<String>),
    #[default]
    Empty,
}

impl SlideRecord {
    /// Title as rendered, with the fallback for missing or empty titles.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => "No Title",
        }
    }

    /// True when the slide asks for a generated image.
    pub fn has_image_prompt(&self) -> bool {
        !self.image_prompt.is_empty()
    }
}
