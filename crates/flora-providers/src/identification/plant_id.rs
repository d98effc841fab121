//! Plant.id Identification Provider
//!
//! Primary provider. Uploads the image as base64 JSON and reads species
//! suggestions, care details and, when requested, health assessment.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use flora_domain::constants::PROVIDER_PLANT_ID;
use flora_domain::ports::IdentificationProvider;
use flora_domain::value_objects::{
    CareAttributes, DiseaseFlag, IdentificationOption, IdentificationOptions,
    IdentificationPayload, PlantSuggestion, ProviderFailure, ProviderResult, Taxonomy,
};
use reqwest::Client;
use serde_json::{Value, json};

use super::helpers::{constructor, sniff_mime};
use crate::constants::{
    CONTENT_TYPE_JSON, PLANT_ID_API_KEY_HEADER, PLANT_ID_DEFAULT_BASE_URL, PLANT_ID_DETAILS,
};
use crate::utils::{HttpResponseUtils, JsonValueExt};

/// Plant.id identification provider
///
/// ```rust,no_run
/// use flora_providers::identification::PlantIdProvider;
/// use reqwest::Client;
///
/// let provider = PlantIdProvider::new("api-key", None, Client::new());
/// ```
pub struct PlantIdProvider {
    api_key: String,
    base_url: String,
    http_client: Client,
}

impl PlantIdProvider {
    pub fn new(api_key: &str, base_url: Option<&str>, http_client: Client) -> Self {
        Self {
            api_key: constructor::validate_api_key(api_key),
            base_url: constructor::get_effective_url(base_url, PLANT_ID_DEFAULT_BASE_URL),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_body(image: &[u8], options: &IdentificationOptions) -> Value {
        let encoded = format!("data:{};base64,{}", sniff_mime(image), BASE64.encode(image));
        let mut body = json!({
            "images": [encoded],
            "similar_images": options.contains(IdentificationOption::SimilarImages),
        });
        if options.contains(IdentificationOption::DiseaseDetection) {
            body["health"] = json!("all");
        }
        body
    }

    /// Normalize a Plant.id identification response
    pub fn parse_response(body: &Value) -> Result<IdentificationPayload, ProviderFailure> {
        let result = body
            .get("result")
            .filter(|r| r.is_object())
            .ok_or_else(|| ProviderFailure::server_error("Plant.id response has no result object"))?;

        let suggestions: Vec<PlantSuggestion> = result["classification"]["suggestions"]
            .as_array()
            .map(|items| items.iter().filter_map(parse_suggestion).collect())
            .unwrap_or_default();

        let plant_detected = result["is_plant"]["binary"]
            .as_bool()
            .unwrap_or(!suggestions.is_empty());

        let care = result["classification"]["suggestions"]
            .get(0)
            .map(|top| parse_care(&top["details"]))
            .unwrap_or_default();

        let diseases = result["disease"]["suggestions"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|d| {
                        Some(DiseaseFlag {
                            name: d["name"].text()?,
                            probability: d["probability"].as_f64().unwrap_or(0.0),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(IdentificationPayload {
            plant_detected,
            suggestions,
            care,
            diseases,
        })
    }
}

fn parse_suggestion(item: &Value) -> Option<PlantSuggestion> {
    let mut suggestion = PlantSuggestion::new(
        item["name"].text()?,
        item["probability"].as_f64().unwrap_or(0.0),
    );
    let details = &item["details"];
    suggestion.common_names = details["common_names"].string_list();
    suggestion.taxonomy = Taxonomy {
        family: details["taxonomy"]["family"].text(),
        genus: details["taxonomy"]["genus"].text(),
        order: details["taxonomy"]["order"].text(),
    };
    Some(suggestion)
}

fn parse_care(details: &Value) -> CareAttributes {
    CareAttributes {
        watering: details["watering"].display_text(),
        light: details["best_light_condition"].display_text(),
        soil: details["best_soil_type"].display_text(),
        temperature: details["temperature"].display_text(),
        toxicity: details["toxicity"].display_text(),
        description: details["description"].display_text(),
    }
}

#[async_trait]
impl IdentificationProvider for PlantIdProvider {
    async fn identify(
        &self,
        image: &[u8],
        options: &IdentificationOptions,
        timeout: Duration,
    ) -> ProviderResult {
        let response = self
            .http_client
            .post(format!("{}/identification", self.base_url))
            .query(&[("details", PLANT_ID_DETAILS)])
            .header(PLANT_ID_API_KEY_HEADER, &self.api_key)
            .header("Content-Type", CONTENT_TYPE_JSON)
            .timeout(timeout)
            .json(&Self::request_body(image, options))
            .send()
            .await
            .map_err(|e| HttpResponseUtils::classify_transport(&e, "Plant.id", timeout))?;

        let body = HttpResponseUtils::check_and_parse(response, "Plant.id").await?;
        Self::parse_response(&body)
    }

    fn provider_name(&self) -> &str {
        PROVIDER_PLANT_ID
    }
}

impl std::fmt::Debug for PlantIdProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlantIdProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
