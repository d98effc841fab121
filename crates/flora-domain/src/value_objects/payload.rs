//! Normalized provider payloads
//!
//! Every adapter maps its provider's wire format onto these types so that the
//! merge step never sees provider-specific structures.

use serde::{Deserialize, Serialize};

/// Taxonomic ranks above species
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub family: Option<String>,
    pub genus: Option<String>,
    pub order: Option<String>,
}

impl Taxonomy {
    /// Fill ranks that are missing here from `other`
    pub fn supplement_from(&mut self, other: &Taxonomy) {
        fill(&mut self.family, &other.family);
        fill(&mut self.genus, &other.genus);
        fill(&mut self.order, &other.order);
    }

    pub fn is_empty(&self) -> bool {
        self.family.is_none() && self.genus.is_none() && self.order.is_none()
    }
}

/// One candidate species returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSuggestion {
    /// Scientific (binomial) name
    pub scientific_name: String,
    /// Common names, in provider order
    #[serde(default)]
    pub common_names: Vec<String>,
    /// Provider confidence in `[0.0, 1.0]`
    pub confidence: f64,
    #[serde(default)]
    pub taxonomy: Taxonomy,
}

impl PlantSuggestion {
    pub fn new(scientific_name: impl Into<String>, confidence: f64) -> Self {
        Self {
            scientific_name: scientific_name.into(),
            common_names: Vec::new(),
            confidence: confidence.clamp(0.0, 1.0),
            taxonomy: Taxonomy::default(),
        }
    }

    /// Whether two suggestions name the same species (case-insensitive)
    pub fn same_species(&self, other: &PlantSuggestion) -> bool {
        self.scientific_name
            .trim()
            .eq_ignore_ascii_case(other.scientific_name.trim())
    }
}

/// Care attributes for the identified plant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareAttributes {
    pub watering: Option<String>,
    pub light: Option<String>,
    pub soil: Option<String>,
    pub temperature: Option<String>,
    pub toxicity: Option<String>,
    pub description: Option<String>,
}

impl CareAttributes {
    /// Fill attributes that are missing here from `other`; never overwrites
    pub fn supplement_from(&mut self, other: &CareAttributes) {
        fill(&mut self.watering, &other.watering);
        fill(&mut self.light, &other.light);
        fill(&mut self.soil, &other.soil);
        fill(&mut self.temperature, &other.temperature);
        fill(&mut self.toxicity, &other.toxicity);
        fill(&mut self.description, &other.description);
    }

    pub fn is_empty(&self) -> bool {
        self.watering.is_none()
            && self.light.is_none()
            && self.soil.is_none()
            && self.temperature.is_none()
            && self.toxicity.is_none()
            && self.description.is_none()
    }
}

/// Disease or health issue flagged by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseFlag {
    pub name: String,
    pub probability: f64,
}

/// Successful, normalized provider outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentificationPayload {
    /// Whether the provider believes the image shows a plant at all
    pub plant_detected: bool,
    /// Candidate species, best first
    #[serde(default)]
    pub suggestions: Vec<PlantSuggestion>,
    #[serde(default)]
    pub care: CareAttributes,
    #[serde(default)]
    pub diseases: Vec<DiseaseFlag>,
}

impl IdentificationPayload {
    /// Highest ranked suggestion, if any
    pub fn top_suggestion(&self) -> Option<&PlantSuggestion> {
        self.suggestions.first()
    }
}

fn fill(target: &mut Option<String>, source: &Option<String>) {
    if target.as_deref().is_none_or(|v| v.trim().is_empty()) {
        if let Some(value) = source.as_deref().filter(|v| !v.trim().is_empty()) {
            *target = Some(value.to_string());
        }
    }
}
