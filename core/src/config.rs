use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Whether this run may call the image provider.
///
/// Computed once at startup from configuration plus credential resolution,
/// then passed down explicitly; nothing reads credential state mid-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageGenMode {
    Enabled { api_key: String },
    Disabled,
}

impl ImageGenMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ImageGenMode::Enabled { .. })
    }
}

/// Run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Slide definitions, a JSON array or `{"slides": [...]}` document.
    pub input: PathBuf,
    /// Deck files are written as `<output_base>_<timestamp>.pptx`.
    pub output_base: String,
    /// Directory for generated image files.
    pub images_dir: PathBuf,
    /// Credential file; the last non-empty, non-comment line is the API key.
    pub env_file: PathBuf,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub generate_images: bool,
    pub caption: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("slides.json"),
            output_base: "presentation".to_string(),
            images_dir: PathBuf::from("generated_images"),
            env_file: PathBuf::from(".env"),
            api_key: None,
            model: None,
            base_url: None,
            generate_images: true,
            caption: true,
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }

        if let Ok(model) = std::env::var("DECK_IMAGEN_MODEL") {
            if !model.is_empty() {
                config.model = Some(model);
            }
        }

        if let Ok(url) = std::env::var("DECK_IMAGEN_BASE_URL") {
            if !url.is_empty() {
                config.base_url = Some(url);
            }
        }

        config
    }

    /// Resolve the image-generation mode for this run.
    ///
    /// Missing credentials silently disable generation; they never abort
    /// the run.
    pub fn image_mode(&self) -> ImageGenMode {
        if !self.generate_images {
            return ImageGenMode::Disabled;
        }
        match self.resolve_api_key() {
            Some(api_key) => ImageGenMode::Enabled { api_key },
            None => ImageGenMode::Disabled,
        }
    }

    fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| read_credential_file(&self.env_file))
    }
}

/// Read an API key from a `.env`-style file: the last non-empty line that is
/// not a `#` comment. Returns `None` when the file is missing or holds no
/// usable line.
pub fn read_credential_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .next_back()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn credential_file_takes_last_usable_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# api key for image generation").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "old-key").unwrap();
        writeln!(file, "  new-key  ").unwrap();
        assert_eq!(
            read_credential_file(file.path()),
            Some("new-key".to_string())
        );
    }

    #[test]
    fn credential_file_with_only_comments_yields_none() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here").unwrap();
        assert_eq!(read_credential_file(file.path()), None);
    }

    #[test]
    fn missing_credential_file_yields_none() {
        assert_eq!(read_credential_file(Path::new("/nonexistent/.env")), None);
    }

    #[test]
    fn mode_disabled_when_generation_is_off() {
        let config = Config {
            api_key: Some("key".to_string()),
            generate_images: false,
            ..Config::default()
        };
        assert_eq!(config.image_mode(), ImageGenMode::Disabled);
    }

    #[test]
    fn mode_disabled_without_credentials() {
        let config = Config {
            env_file: PathBuf::from("/nonexistent/.env"),
            ..Config::default()
        };
        assert_eq!(config.image_mode(), ImageGenMode::Disabled);
    }

    #[test]
    fn explicit_key_enables_generation() {
        let config = Config {
            api_key: Some("key".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.image_mode(),
            ImageGenMode::Enabled {
                api_key: "key".to_string()
            }
        );
    }
}
