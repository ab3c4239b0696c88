//! Image generation client
//!
//! The image service is URL-addressed: the prompt and options form a GET
//! URL that serves the rendered image. `generate` requests the URL once so
//! a broken prompt or unreachable service fails here instead of when the
//! user opens the link.

use crate::config::ImageConfig;
use crate::error::CoreError;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

/// AI image generation service
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Render `prompt` and return a URL serving the image.
    async fn generate(&self, prompt: &str) -> Result<String, CoreError>;
}

/// Client for a Pollinations-style image endpoint
pub struct PollinationsImage {
    client: reqwest::Client,
    config: ImageConfig,
}

impl PollinationsImage {
    pub fn new(config: ImageConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    fn build_url(&self, prompt: &str) -> Result<Url, CoreError> {
        let mut url = Url::parse(&self.config.endpoint).map_err(|e| CoreError::ImageService {
            message: format!("invalid image endpoint: {}", e),
        })?;

        url.path_segments_mut()
            .map_err(|_| CoreError::ImageService {
                message: "image endpoint cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push("prompt")
            .push(prompt);

        url.query_pairs_mut()
            .append_pair("width", &self.config.width.to_string())
            .append_pair("height", &self.config.height.to_string())
            .append_pair("seed", &self.config.seed.to_string())
            .append_pair("model", &self.config.model)
            .append_pair("nologo", &self.config.nologo.to_string())
            .append_pair("enhance", &self.config.enhance.to_string());

        Ok(url)
    }
}

#[async_trait]
impl ImageService for PollinationsImage {
    async fn generate(&self, prompt: &str) -> Result<String, CoreError> {
        let url = self.build_url(prompt)?;
        tracing::debug!(url = %url, "Requesting image");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CoreError::ImageService {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CoreError::ImageService {
                message: format!("image endpoint returned {}", response.status()),
            });
        }

        Ok(url.to_string())
    }
}
