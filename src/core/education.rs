use serde::Serialize;
use std::collections::BTreeSet;

use crate::core::normalizer::{normalize, KeyPhrase, NormalizedToken, Normalizer};
use crate::models::domain::{EducationEntry, RequiredEducation};
use crate::models::report::{Category, CategoryScore};

/// Multiplier applied when a field of study is required but not matched
pub const FIELD_MISMATCH_FACTOR: f64 = 0.5;

/// Ordinal ranking of education levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DegreeLevel {
    None = 0,
    Secondary = 1,
    Associate = 2,
    Bachelor = 3,
    Master = 4,
    Doctorate = 5,
}

const DOCTORATE_WORDS: &[&str] = &["phd", "dphil", "doctorate", "doctoral", "doctor", "edd"];
const MASTER_WORDS: &[&str] = &[
    "master", "masters", "msc", "ms", "ma", "mba", "meng", "mphil", "mtech", "mres", "mfa",
    "llm", "mpa", "mph",
];
const BACHELOR_WORDS: &[&str] = &[
    "bachelor", "bachelors", "bsc", "bs", "ba", "beng", "btech", "bba", "bcom", "bfa", "llb",
    "undergraduate",
];
const ASSOCIATE_WORDS: &[&str] = &["associate", "associates", "aa", "aas"];
const SECONDARY_WORDS: &[&str] = &["diploma", "ged", "a-levels", "hsc", "ssc"];
const SECONDARY_PHRASES: &[&[&str]] = &[&["high", "school"], &["secondary", "school"]];

impl DegreeLevel {
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DegreeLevel::None => "none",
            DegreeLevel::Secondary => "secondary",
            DegreeLevel::Associate => "associate",
            DegreeLevel::Bachelor => "bachelor",
            DegreeLevel::Master => "master",
            DegreeLevel::Doctorate => "doctorate",
        }
    }

    /// Classify a normalized degree phrase by its highest level keyword
    pub fn classify(degree: &NormalizedToken) -> DegreeLevel {
        let words: Vec<&str> = degree.words().collect();
        let has_any = |vocabulary: &[&str]| words.iter().any(|w| vocabulary.contains(w));

        if has_any(DOCTORATE_WORDS) {
            DegreeLevel::Doctorate
        } else if has_any(MASTER_WORDS) {
            DegreeLevel::Master
        } else if has_any(BACHELOR_WORDS) {
            DegreeLevel::Bachelor
        } else if has_any(ASSOCIATE_WORDS) {
            DegreeLevel::Associate
        } else if has_any(SECONDARY_WORDS)
            || SECONDARY_PHRASES
                .iter()
                .any(|phrase| words.windows(phrase.len()).any(|w| w == *phrase))
        {
            DegreeLevel::Secondary
        } else {
            DegreeLevel::None
        }
    }

    fn token(&self) -> NormalizedToken {
        normalize(self.as_str())
    }
}

/// One education entry reduced to what the scorer compares
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEducation {
    pub level: DegreeLevel,
    pub field: NormalizedToken,
    /// Alias-expanded words of the field of study
    pub field_words: BTreeSet<String>,
}

impl NormalizedEducation {
    pub fn new(normalizer: &Normalizer, degree: &str, field: &str) -> Self {
        Self {
            level: DegreeLevel::classify(&normalizer.normalize(degree)),
            field: normalizer.normalize(field),
            field_words: normalizer.text_words(field),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequiredEducation {
    pub level: DegreeLevel,
    /// Acceptable fields of study; any one of them satisfies the requirement
    pub fields: BTreeSet<KeyPhrase>,
}

impl NormalizedRequiredEducation {
    pub fn new<S: AsRef<str>>(normalizer: &Normalizer, degree: &str, fields: &[S]) -> Self {
        Self {
            level: DegreeLevel::classify(&normalizer.normalize(degree)),
            fields: normalizer.key_phrases(fields),
        }
    }
}

pub fn normalize_education(
    normalizer: &Normalizer,
    entries: &[EducationEntry],
) -> Vec<NormalizedEducation> {
    entries
        .iter()
        .map(|entry| NormalizedEducation::new(normalizer, &entry.degree, &entry.field))
        .collect()
}

pub fn normalize_required_education(
    normalizer: &Normalizer,
    required: &RequiredEducation,
) -> NormalizedRequiredEducation {
    NormalizedRequiredEducation::new(normalizer, &required.degree, &required.fields)
}

/// Score the profile's highest degree against the minimum required degree
///
/// Under-qualification earns partial credit `profile / required` on the
/// ordinal scale. A required field of study is an independent multiplier:
/// 1.0 when matched or unspecified, [`FIELD_MISMATCH_FACTOR`] otherwise.
/// Among entries sharing the highest level, the first whose field matches
/// is the one compared.
pub fn score_education(
    profile_education: &[NormalizedEducation],
    required: &NormalizedRequiredEducation,
) -> CategoryScore {
    let highest = profile_education
        .iter()
        .map(|e| e.level)
        .max()
        .unwrap_or(DegreeLevel::None);

    // A required field matches when all of its words appear in the entry's field
    let matching_fields = |entry: &NormalizedEducation| -> BTreeSet<NormalizedToken> {
        required
            .fields
            .iter()
            .filter(|f| f.is_within(&entry.field_words))
            .map(|f| f.token.clone())
            .collect()
    };

    let candidates: Vec<&NormalizedEducation> = profile_education
        .iter()
        .filter(|e| e.level == highest)
        .collect();
    let selected = candidates
        .iter()
        .copied()
        .find(|e| !matching_fields(*e).is_empty())
        .or_else(|| candidates.first().copied());

    let mut matched = BTreeSet::new();
    let mut missing = BTreeSet::new();

    let ordinal_score = if required.level == DegreeLevel::None {
        1.0
    } else if highest >= required.level {
        matched.insert(required.level.token());
        1.0
    } else {
        missing.insert(required.level.token());
        highest.ordinal() as f64 / required.level.ordinal() as f64
    };

    let field_factor = if required.fields.is_empty() {
        1.0
    } else {
        let fields = selected.map(matching_fields).unwrap_or_default();
        if fields.is_empty() {
            missing.extend(required.fields.iter().map(|f| f.token.clone()));
            FIELD_MISMATCH_FACTOR
        } else {
            matched.extend(fields);
            1.0
        }
    };

    let raw = (ordinal_score * field_factor).clamp(0.0, 1.0);
    CategoryScore::new(Category::Education, raw, matched, missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(degree: &str, field: &str) -> NormalizedEducation {
        NormalizedEducation::new(&Normalizer::without_aliases(), degree, field)
    }

    fn requirement(degree: &str, fields: &[&str]) -> NormalizedRequiredEducation {
        NormalizedRequiredEducation::new(&Normalizer::without_aliases(), degree, fields)
    }

    #[test]
    fn test_classify_degrees() {
        let classify = |s: &str| DegreeLevel::classify(&normalize(s));
        assert_eq!(classify("Ph.D. in Physics"), DegreeLevel::Doctorate);
        assert_eq!(classify("M.Sc."), DegreeLevel::Master);
        assert_eq!(classify("Master's degree"), DegreeLevel::Master);
        assert_eq!(classify("B.S. Computer Science"), DegreeLevel::Bachelor);
        assert_eq!(classify("Bachelor of Engineering"), DegreeLevel::Bachelor);
        assert_eq!(classify("Associate of Arts"), DegreeLevel::Associate);
        assert_eq!(classify("High School Diploma"), DegreeLevel::Secondary);
        assert_eq!(classify("Bootcamp certificate"), DegreeLevel::None);
        assert_eq!(classify(""), DegreeLevel::None);
    }

    #[test]
    fn test_highest_keyword_wins() {
        let level = DegreeLevel::classify(&normalize("Integrated Bachelor and Master (BS-MS)"));
        assert_eq!(level, DegreeLevel::Master);
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(DegreeLevel::Bachelor.ordinal(), 3);
        assert_eq!(DegreeLevel::Master.ordinal(), 4);
        assert!(DegreeLevel::Doctorate > DegreeLevel::Master);
    }

    #[test]
    fn test_under_qualified_gets_partial_credit() {
        let score = score_education(&[entry("Bachelor", "History")], &requirement("Master", &[]));

        assert!((score.raw - 0.75).abs() < 1e-9);
        assert!(score.missing.contains(&normalize("master")));
        assert!(score.matched.is_empty());
    }

    #[test]
    fn test_over_qualified_is_full_score() {
        let score = score_education(&[entry("PhD", "Biology")], &requirement("Bachelor", &[]));

        assert_eq!(score.raw, 1.0);
        assert!(score.matched.contains(&normalize("bachelor")));
    }

    #[test]
    fn test_no_degree_requirement() {
        let score = score_education(&[], &requirement("", &[]));

        assert_eq!(score.raw, 1.0);
        assert!(score.matched.is_empty() && score.missing.is_empty());
    }

    #[test]
    fn test_no_education_against_requirement() {
        let score = score_education(&[], &requirement("Bachelor", &[]));

        assert_eq!(score.raw, 0.0);
    }

    #[test]
    fn test_field_mismatch_halves_score() {
        let score = score_education(
            &[entry("Master", "Fine Arts")],
            &requirement("Master", &["Computer Science"]),
        );

        assert!((score.raw - 0.5).abs() < 1e-9);
        assert!(score.missing.contains(&normalize("computer science")));
    }

    #[test]
    fn test_field_match_by_word_subset() {
        let score = score_education(
            &[entry("BSc", "Computer Science and Engineering")],
            &requirement("Bachelor", &["computer science", "mathematics"]),
        );

        assert_eq!(score.raw, 1.0);
        assert!(score.matched.contains(&normalize("computer science")));
        assert!(!score.missing.contains(&normalize("mathematics")));
    }

    #[test]
    fn test_tie_break_prefers_first_field_match_at_highest_level() {
        let profile = [
            entry("Master", "Fine Arts"),
            entry("MSc", "Statistics"),
            entry("Bachelor", "Computer Science"),
        ];
        let score = score_education(&profile, &requirement("Master", &["statistics", "computer science"]));

        assert_eq!(score.raw, 1.0);
        assert!(score.matched.contains(&normalize("statistics")));
    }

    #[test]
    fn test_lower_degree_field_match_is_not_used() {
        let profile = [entry("Master", "Fine Arts"), entry("Bachelor", "Computer Science")];
        let score = score_education(&profile, &requirement("Master", &["computer science"]));

        assert!((score.raw - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_partial_credit_and_field_multiplier_combine() {
        let score = score_education(
            &[entry("Bachelor", "History")],
            &requirement("Master", &["physics"]),
        );

        assert!((score.raw - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_aliased_field_matches_abbreviation_in_profile() {
        let aliases = crate::core::normalizer::AliasTable::from_groups(vec![(
            "computer science".to_string(),
            vec!["cs".to_string()],
        )])
        .unwrap();
        let normalizer = Normalizer::new(std::sync::Arc::new(aliases));

        let profile = [NormalizedEducation::new(&normalizer, "BSc", "CS and Mathematics")];
        let required = NormalizedRequiredEducation::new(&normalizer, "Bachelor", &["CS"]);
        let score = score_education(&profile, &required);

        assert_eq!(score.raw, 1.0);
        assert!(score.matched.contains(&normalize("computer science")));
    }
}
