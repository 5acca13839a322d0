use std::collections::BTreeSet;

use crate::core::normalizer::NormalizedToken;
use crate::models::report::{Category, CategoryScore};

/// Score skill coverage as the fraction of required skills the profile lists
///
/// Matching is exact on normalized tokens; alias resolution in the normalizer
/// is the only source of fuzziness. An empty requirement set is vacuously
/// satisfied.
pub fn score_skills(
    profile_skills: &BTreeSet<NormalizedToken>,
    required_skills: &BTreeSet<NormalizedToken>,
) -> CategoryScore {
    if required_skills.is_empty() {
        return CategoryScore::vacuous(Category::Skills);
    }

    let (matched, missing): (BTreeSet<_>, BTreeSet<_>) = required_skills
        .iter()
        .cloned()
        .partition(|skill| profile_skills.contains(skill));

    let raw = matched.len() as f64 / required_skills.len() as f64;

    CategoryScore::new(Category::Skills, raw.min(1.0), matched, missing)
}
