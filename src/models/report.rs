use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::core::normalizer::NormalizedToken;

/// The three scored dimensions of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Skills,
    Education,
    Experience,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Skills, Category::Education, Category::Experience];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Skills => "skills",
            Category::Education => "education",
            Category::Experience => "experience",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score for a single category plus the requirement items it was judged on
///
/// `matched` and `missing` are disjoint and both drawn from the requirement's
/// normalized items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: Category,
    pub raw: f64,
    pub matched: BTreeSet<NormalizedToken>,
    pub missing: BTreeSet<NormalizedToken>,
}

impl CategoryScore {
    pub fn new(
        category: Category,
        raw: f64,
        matched: BTreeSet<NormalizedToken>,
        missing: BTreeSet<NormalizedToken>,
    ) -> Self {
        Self {
            category,
            raw,
            matched,
            missing,
        }
    }

    /// Score for a category with nothing required of it
    pub fn vacuous(category: Category) -> Self {
        Self::new(category, 1.0, BTreeSet::new(), BTreeSet::new())
    }
}

/// Fixed category weights of the scoring policy
///
/// Skills dominate because they are the most direct evidence of fit; the
/// weights are not user-configurable so that every report is comparable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub skills: f64,
    pub education: f64,
    pub experience: f64,
}

impl ScoringWeights {
    pub const POLICY: ScoringWeights = ScoringWeights {
        skills: 0.70,
        education: 0.20,
        experience: 0.10,
    };

    pub fn for_category(&self, category: Category) -> f64 {
        match category {
            Category::Skills => self.skills,
            Category::Education => self.education,
            Category::Experience => self.experience,
        }
    }

    pub fn sum(&self) -> f64 {
        self.skills + self.education + self.experience
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::POLICY
    }
}

/// Outcome of one CV / job description comparison
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub final_score: f64,
    pub skills: CategoryScore,
    pub education: CategoryScore,
    pub experience: CategoryScore,
    pub generated_at: DateTime<Utc>,
    pub cv_document_id: String,
    pub job_document_id: String,
}

impl MatchResult {
    /// Final score on a 0-100 scale
    pub fn percentage(&self) -> u8 {
        (self.final_score * 100.0).round().clamp(0.0, 100.0) as u8
    }

    pub fn interpretation(&self) -> Interpretation {
        Interpretation::from_percentage(self.percentage())
    }

    pub fn category(&self, category: Category) -> &CategoryScore {
        match category {
            Category::Skills => &self.skills,
            Category::Education => &self.education,
            Category::Experience => &self.experience,
        }
    }
}

/// Human-facing verdict band for a final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpretation {
    Excellent,
    Good,
    Moderate,
    Low,
}

impl Interpretation {
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            80.. => Interpretation::Excellent,
            60..=79 => Interpretation::Good,
            40..=59 => Interpretation::Moderate,
            _ => Interpretation::Low,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Interpretation::Excellent => "Excellent match. Highly suitable candidate.",
            Interpretation::Good => "Good match. Suitable candidate with room for growth.",
            Interpretation::Moderate => "Moderate match. Some key requirements may be missing.",
            Interpretation::Low => "Low match. Significant gaps present.",
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary())
    }
}
