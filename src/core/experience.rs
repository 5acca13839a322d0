use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::core::normalizer::{normalize, KeyPhrase, NormalizedToken, Normalizer};
use crate::models::domain::{ExperienceEntry, RequiredExperience};
use crate::models::report::{Category, CategoryScore};

/// One position reduced to what the scorer compares
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedExperience {
    pub role: NormalizedToken,
    pub organization: NormalizedToken,
    pub months: u32,
    /// Alias-expanded words of the role and organization
    pub words: BTreeSet<String>,
}

impl NormalizedExperience {
    pub fn new(normalizer: &Normalizer, role: &str, organization: &str, months: u32) -> Self {
        let mut words = normalizer.text_words(role);
        words.extend(normalizer.text_words(organization));

        Self {
            role: normalizer.normalize(role),
            organization: normalizer.normalize(organization),
            months,
            words,
        }
    }

    /// Whether a domain's words all appear in this position's role or organization
    fn covers(&self, domain: &KeyPhrase) -> bool {
        domain.is_within(&self.words)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequiredExperience {
    pub min_months: u32,
    pub domains: BTreeSet<KeyPhrase>,
}

impl NormalizedRequiredExperience {
    pub fn new<S: AsRef<str>>(normalizer: &Normalizer, min_months: u32, domains: &[S]) -> Self {
        Self {
            min_months,
            domains: normalizer.key_phrases(domains),
        }
    }
}

/// Resolve tenures to months, measuring ongoing positions up to `as_of`
pub fn normalize_experience(
    normalizer: &Normalizer,
    entries: &[ExperienceEntry],
    as_of: DateTime<Utc>,
) -> Vec<NormalizedExperience> {
    entries
        .iter()
        .map(|entry| {
            NormalizedExperience::new(
                normalizer,
                &entry.role,
                &entry.organization,
                entry.tenure.months(as_of),
            )
        })
        .collect()
}

pub fn normalize_required_experience(
    normalizer: &Normalizer,
    required: &RequiredExperience,
) -> NormalizedRequiredExperience {
    NormalizedRequiredExperience::new(normalizer, required.min_months, &required.domains)
}

/// Requirement item standing for the minimum duration
pub fn duration_token(months: u32) -> NormalizedToken {
    normalize(&format!("{months} months"))
}

/// Score total relevant experience against the required minimum
///
/// When the requirement names domains, only positions covering at least one
/// of them count towards the total. Domain relevance gates eligibility
/// before duration is considered, so a profile with no relevant positions
/// scores 0 however long its unrelated history is.
pub fn score_experience(
    profile_experience: &[NormalizedExperience],
    required: &NormalizedRequiredExperience,
) -> CategoryScore {
    let mut matched = BTreeSet::new();
    let mut missing = BTreeSet::new();

    for domain in &required.domains {
        if profile_experience.iter().any(|e| e.covers(domain)) {
            matched.insert(domain.token.clone());
        } else {
            missing.insert(domain.token.clone());
        }
    }

    let eligible_months: u64 = profile_experience
        .iter()
        .filter(|e| required.domains.is_empty() || required.domains.iter().any(|d| e.covers(d)))
        .map(|e| e.months as u64)
        .sum();

    if required.min_months == 0 {
        return CategoryScore::new(Category::Experience, 1.0, matched, missing);
    }

    let duration = duration_token(required.min_months);
    if eligible_months >= required.min_months as u64 {
        matched.insert(duration);
    } else {
        missing.insert(duration);
    }

    let raw = (eligible_months as f64 / required.min_months as f64).min(1.0);
    CategoryScore::new(Category::Experience, raw, matched, missing)
}
