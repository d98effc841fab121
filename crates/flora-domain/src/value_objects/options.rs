//! Identification options
//!
//! The option set is part of the content key, so it is kept ordered and
//! duplicate-free by construction.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A single identification option requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentificationOption {
    /// Ask providers for disease / health assessment
    DiseaseDetection,
    /// Ask providers for care attributes (watering, light, soil, ...)
    CareDetails,
    /// Ask providers for similar reference images
    SimilarImages,
    /// Ask providers for extended taxonomy
    TaxonomyDetails,
}

impl IdentificationOption {
    /// Stable name used in content keys and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiseaseDetection => "disease_detection",
            Self::CareDetails => "care_details",
            Self::SimilarImages => "similar_images",
            Self::TaxonomyDetails => "taxonomy_details",
        }
    }
}

impl fmt::Display for IdentificationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentificationOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "disease_detection" | "diseases" | "health" => Ok(Self::DiseaseDetection),
            "care_details" | "care" => Ok(Self::CareDetails),
            "similar_images" => Ok(Self::SimilarImages),
            "taxonomy_details" | "taxonomy" => Ok(Self::TaxonomyDetails),
            other => Err(Error::invalid_argument(format!(
                "Unknown identification option: {other}"
            ))),
        }
    }
}

/// Ordered set of identification options
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentificationOptions(BTreeSet<IdentificationOption>);

impl IdentificationOptions {
    /// Empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option (builder style)
    pub fn with(mut self, option: IdentificationOption) -> Self {
        self.0.insert(option);
        self
    }

    /// Whether the option was requested
    pub fn contains(&self, option: IdentificationOption) -> bool {
        self.0.contains(&option)
    }

    /// Options in canonical (sorted) order
    pub fn iter(&self) -> impl Iterator<Item = IdentificationOption> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<IdentificationOption> for IdentificationOptions {
    fn from_iter<I: IntoIterator<Item = IdentificationOption>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
