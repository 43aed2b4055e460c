use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "imagen-4.0-fast-generate-001";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Appended to prompts that do not already describe a card background, so
/// generated images share a consistent slide-friendly look.
const STYLE_SUFFIX: &str = "Landscape flashcard background, rounded corners, \
soft gradient, subtle paper texture, ample white space for text";

/// Errors from the Imagen REST layer.
///
/// Callers are expected to degrade these to a per-slide failure; nothing in
/// here should abort a whole run.
#[derive(Debug, thiserror::Error)]
pub enum ImagenError {
    /// The HTTP request itself failed (connect, timeout, TLS, body decode).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A 2xx response that carries no usable prediction.
    #[error("response contains no image data")]
    MissingPrediction,

    /// The prediction payload is not valid base64.
    #[error("image payload decode failed: {0}")]
    Decode(#[from] base64::DecodeError),
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    instances: Vec<Instance>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u32,
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

/// HTTP client for the Imagen `:predict` endpoint.
pub struct ImagenClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ImagenClient {
    pub fn new(api_key: String) -> Result<Self, ImagenError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Override the API origin (used by tests to point at a local server).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request one 16:9 image for `prompt` and return the raw image bytes.
    ///
    /// Exactly one network call; no retry. Every failure mode comes back as
    /// a typed [`ImagenError`].
    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImagenError> {
        let url = format!(
            "{}/v1beta/models/{}:predict?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateRequest {
            instances: vec![Instance {
                prompt: augment_prompt(prompt),
            }],
            parameters: Parameters {
                sample_count: 1,
                aspect_ratio: "16:9".to_string(),
            },
        };

        tracing::debug!(model = %self.model, "requesting image generation");
        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImagenError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        decode_response(parsed)
    }
}

/// Single explicit decode step: first prediction's `bytesBase64Encoded`,
/// base64-decoded. Anything else is a failure.
fn decode_response(response: GenerateResponse) -> Result<Vec<u8>, ImagenError> {
    let encoded = response
        .predictions
        .into_iter()
        .next()
        .and_then(|p| p.bytes_base64_encoded)
        .ok_or(ImagenError::MissingPrediction)?;
    Ok(BASE64.decode(encoded)?)
}

fn augment_prompt(prompt: &str) -> String {
    if prompt.contains("flashcard") || prompt.contains("card background") {
        prompt.to_string()
    } else {
        format!("{prompt}, {STYLE_SUFFIX}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_once(response: tiny_http::Response<std::io::Cursor<Vec<u8>>>) -> String {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let _ = request.respond(response);
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn request_body_matches_api_contract() {
        let body = GenerateRequest {
            instances: vec![Instance {
                prompt: "a cat, flashcard".to_string(),
            }],
            parameters: Parameters {
                sample_count: 1,
                aspect_ratio: "16:9".to_string(),
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "instances": [{"prompt": "a cat, flashcard"}],
                "parameters": {"sampleCount": 1, "aspectRatio": "16:9"}
            })
        );
    }

    #[test]
    fn augment_skips_prompts_that_already_describe_a_card() {
        assert_eq!(augment_prompt("a flashcard of a dog"), "a flashcard of a dog");
        assert!(augment_prompt("a dog").ends_with(STYLE_SUFFIX));
    }

    #[test]
    fn decode_takes_first_prediction() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"predictions":[{"bytesBase64Encoded":"aGVsbG8="}]}"#,
        )
        .unwrap();
        assert_eq!(decode_response(response).unwrap(), b"hello");
    }

    #[test]
    fn decode_rejects_empty_predictions() {
        let response: GenerateResponse = serde_json::from_str(r#"{"predictions":[]}"#).unwrap();
        assert!(matches!(
            decode_response(response),
            Err(ImagenError::MissingPrediction)
        ));

        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            decode_response(response),
            Err(ImagenError::MissingPrediction)
        ));
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"predictions":[{"bytesBase64Encoded":"not base64!!"}]}"#,
        )
        .unwrap();
        assert!(matches!(decode_response(response), Err(ImagenError::Decode(_))));
    }

    #[tokio::test]
    async fn generate_returns_bytes_on_success() {
        let payload =
            r#"{"predictions":[{"bytesBase64Encoded":"aGVsbG8="}]}"#.as_bytes().to_vec();
        let response = tiny_http::Response::from_data(payload).with_status_code(200);
        let base_url = serve_once(response);

        let client = ImagenClient::new("test-key".to_string())
            .unwrap()
            .with_base_url(base_url);
        let bytes = client.generate("a cat").await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn generate_surfaces_server_errors() {
        let response = tiny_http::Response::from_data(b"boom".to_vec()).with_status_code(500);
        let base_url = serve_once(response);

        let client = ImagenClient::new("test-key".to_string())
            .unwrap()
            .with_base_url(base_url);
        match client.generate("a cat").await {
            Err(ImagenError::Api { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_surfaces_connection_failures() {
        // Port 1 is reserved; nothing listens there.
        let client = ImagenClient::new("test-key".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:1".to_string());
        assert!(matches!(
            client.generate("a cat").await,
            Err(ImagenError::Request(_))
        ));
    }
}
