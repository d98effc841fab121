//! Pl@ntNet Identification Provider
//!
//! Secondary provider. Uploads the image as multipart form data and reads
//! ranked species with their genus, family and common names. Pl@ntNet has
//! no care data.

use std::time::Duration;

use async_trait::async_trait;
use flora_domain::constants::PROVIDER_PLANT_NET;
use flora_domain::ports::IdentificationProvider;
use flora_domain::value_objects::{
    IdentificationOptions, IdentificationPayload, PlantSuggestion, ProviderFailure,
    ProviderResult, Taxonomy,
};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::helpers::{constructor, extension_for, sniff_mime};
use crate::constants::{PLANT_NET_DEFAULT_BASE_URL, PLANT_NET_DEFAULT_PROJECT};
use crate::utils::{HttpResponseUtils, JsonValueExt};

/// Pl@ntNet identification provider
pub struct PlantNetProvider {
    api_key: String,
    base_url: String,
    project: String,
    http_client: Client,
}

impl PlantNetProvider {
    pub fn new(api_key: &str, base_url: Option<&str>, http_client: Client) -> Self {
        Self {
            api_key: constructor::validate_api_key(api_key),
            base_url: constructor::get_effective_url(base_url, PLANT_NET_DEFAULT_BASE_URL),
            project: PLANT_NET_DEFAULT_PROJECT.to_string(),
            http_client,
        }
    }

    /// Query a specific flora project instead of `all`
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn form(image: &[u8]) -> Result<Form, ProviderFailure> {
        let mime = sniff_mime(image);
        let part = Part::bytes(image.to_vec())
            .file_name(format!("upload.{}", extension_for(mime)))
            .mime_str(mime)
            .map_err(|e| ProviderFailure::invalid_input(format!("Unsupported image type: {e}")))?;
        Ok(Form::new().part("images", part).text("organs", "auto"))
    }

    /// Normalize a Pl@ntNet identification response
    pub fn parse_response(body: &Value) -> Result<IdentificationPayload, ProviderFailure> {
        let results = body["results"]
            .as_array()
            .ok_or_else(|| ProviderFailure::server_error("Pl@ntNet response has no results array"))?;

        let suggestions: Vec<PlantSuggestion> = results.iter().filter_map(parse_result).collect();

        Ok(IdentificationPayload {
            plant_detected: !suggestions.is_empty(),
            suggestions,
            ..IdentificationPayload::default()
        })
    }
}

fn parse_result(item: &Value) -> Option<PlantSuggestion> {
    let species = &item["species"];
    let name = species["scientificNameWithoutAuthor"]
        .text()
        .or_else(|| species["scientificName"].text())?;

    let mut suggestion = PlantSuggestion::new(name, item["score"].as_f64().unwrap_or(0.0));
    suggestion.common_names = species["commonNames"].string_list();
    suggestion.taxonomy = Taxonomy {
        family: species["family"]["scientificNameWithoutAuthor"].text(),
        genus: species["genus"]["scientificNameWithoutAuthor"].text(),
        order: None,
    };
    Some(suggestion)
}

#[async_trait]
impl IdentificationProvider for PlantNetProvider {
    async fn identify(
        &self,
        image: &[u8],
        _options: &IdentificationOptions,
        timeout: Duration,
    ) -> ProviderResult {
        let form = Self::form(image)?;

        let response = self
            .http_client
            .post(format!("{}/identify/{}", self.base_url, self.project))
            .query(&[("api-key", self.api_key.as_str()), ("include-related-images", "false")])
            .timeout(timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| HttpResponseUtils::classify_transport(&e, "Pl@ntNet", timeout))?;

        let body = HttpResponseUtils::check_and_parse(response, "Pl@ntNet").await?;
        Self::parse_response(&body)
    }

    fn provider_name(&self) -> &str {
        PROVIDER_PLANT_NET
    }
}

impl std::fmt::Debug for PlantNetProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlantNetProvider")
            .field("base_url", &self.base_url)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}
