//! Merge policy
//!
//! Combines the two provider outcomes into one [`MergedIdentification`].
//! The primary provider's identification is authoritative. The secondary
//! only fills gaps: care attributes and, for the species both agree on,
//! taxonomy ranks and common names.

use std::time::Duration;

use flora_domain::error::{Error, Result};
use flora_domain::value_objects::{
    Completeness, ContentKey, IdentificationPayload, MergedIdentification, PlantSuggestion,
    ProviderFailureReport, ProviderResult, ProviderRole, SourceReport,
};

/// Outcome of one provider branch
#[derive(Debug, Clone)]
pub struct BranchOutcome {
    pub provider: String,
    pub role: ProviderRole,
    pub result: ProviderResult,
    pub elapsed: Duration,
}

impl BranchOutcome {
    pub fn new(
        provider: impl Into<String>,
        role: ProviderRole,
        result: ProviderResult,
        elapsed: Duration,
    ) -> Self {
        Self {
            provider: provider.into(),
            role,
            result,
            elapsed,
        }
    }

    fn report(&self) -> SourceReport {
        SourceReport {
            provider: self.provider.clone(),
            role: self.role,
            failure: self.result.as_ref().err().cloned(),
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Merge the primary and secondary outcomes
///
/// Fails with [`Error::TotalFailure`] only when neither provider produced a
/// payload.
pub fn merge(
    content_key: &ContentKey,
    primary: BranchOutcome,
    secondary: BranchOutcome,
) -> Result<MergedIdentification> {
    let sources = vec![primary.report(), secondary.report()];

    match (primary.result, secondary.result) {
        (Ok(mut authoritative), supplement) => {
            if let Ok(supplement) = &supplement {
                supplement_payload(&mut authoritative, supplement);
            }
            Ok(MergedIdentification::from_payload(
                content_key.clone(),
                authoritative,
                Completeness::Complete,
                sources,
            ))
        }
        (Err(_), Ok(fallback)) => Ok(MergedIdentification::from_payload(
            content_key.clone(),
            fallback,
            Completeness::Partial,
            sources,
        )),
        (Err(primary_failure), Err(secondary_failure)) => {
            let failures = vec![
                ProviderFailureReport {
                    provider: primary.provider,
                    role: primary.role,
                    failure: primary_failure,
                },
                ProviderFailureReport {
                    provider: secondary.provider,
                    role: secondary.role,
                    failure: secondary_failure,
                },
            ];
            Err(Error::total_failure(failures))
        }
    }
}

fn supplement_payload(target: &mut IdentificationPayload, source: &IdentificationPayload) {
    target.care.supplement_from(&source.care);

    let Some(top) = target.suggestions.first_mut() else {
        return;
    };
    if let Some(matching) = source.suggestions.iter().find(|s| s.same_species(top)) {
        supplement_suggestion(top, matching);
    }
}

fn supplement_suggestion(target: &mut PlantSuggestion, source: &PlantSuggestion) {
    target.taxonomy.supplement_from(&source.taxonomy);
    for name in &source.common_names {
        let known = target
            .common_names
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(name));
        if !known && !name.trim().is_empty() {
            target.common_names.push(name.clone());
        }
    }
}
