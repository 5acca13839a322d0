use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::core::error::{MatchError, RecordKind};

// ---------------------------------------------------------------------------
// Raw shapes, as produced by the AI extraction step
// ---------------------------------------------------------------------------

/// Candidate record exactly as the extraction collaborator returned it.
///
/// Every field is optional here so that an absent key can be reported as
/// [`MatchError::MalformedInput`] instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProfile {
    pub name: Option<String>,
    pub skills: Option<Vec<String>>,
    pub education: Option<Vec<RawEducation>>,
    pub experience: Option<Vec<RawExperience>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEducation {
    pub degree: Option<String>,
    pub field: Option<String>,
    pub institution: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExperience {
    pub role: Option<String>,
    pub organization: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration_months: Option<u32>,
}

/// Job description record exactly as the extraction collaborator returned it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRequirement {
    pub required_skills: Option<Vec<String>>,
    pub required_education: Option<RawRequiredEducation>,
    pub required_experience: Option<RawRequiredExperience>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRequiredEducation {
    pub degree: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRequiredExperience {
    pub months: Option<u32>,
    pub description: Option<String>,
    #[serde(default)]
    pub domains: Vec<String>,
}

// ---------------------------------------------------------------------------
// Validated, immutable records
// ---------------------------------------------------------------------------

/// Candidate data extracted from a CV
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedProfile {
    pub name: String,
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationEntry {
    pub degree: String,
    pub field: String,
    pub institution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub organization: String,
    pub tenure: Tenure,
}

/// How long a position lasted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenure {
    Months(u32),
    /// `end: None` is an ongoing position
    Range { start: YearMonth, end: Option<YearMonth> },
}

impl Tenure {
    /// Whole months covered, resolving ongoing positions against `as_of`
    pub fn months(&self, as_of: DateTime<Utc>) -> u32 {
        match *self {
            Tenure::Months(months) => months,
            Tenure::Range { start, end } => {
                let end = end.unwrap_or_else(|| YearMonth::from_datetime(as_of));
                end.months_since(start)
            }
        }
    }
}

/// Calendar month, the resolution experience is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// Accepts `YYYY`, `YYYY-MM` and `YYYY-MM-DD`
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(Self {
                year: date.year(),
                month: date.month(),
            });
        }

        let mut parts = raw.splitn(2, '-');
        let year = parts.next()?.parse::<i32>().ok()?;
        if !(1000..=9999).contains(&year) {
            return None;
        }
        let month = match parts.next() {
            Some(m) => m.parse::<u32>().ok()?,
            None => 1,
        };
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    pub fn months_since(&self, start: YearMonth) -> u32 {
        (self.index() - start.index()).max(0) as u32
    }
}

/// Requirements extracted from a job description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRequirement {
    pub required_skills: Vec<String>,
    pub education: RequiredEducation,
    pub experience: RequiredExperience,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredEducation {
    /// Minimum degree phrase; empty means no degree requirement
    pub degree: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredExperience {
    pub min_months: u32,
    pub domains: Vec<String>,
}

// ---------------------------------------------------------------------------
// Boundary validation
// ---------------------------------------------------------------------------

fn missing(record: RecordKind, field: impl Into<String>) -> MatchError {
    MatchError::MalformedInput {
        record,
        field: field.into(),
        detail: "is missing".to_string(),
    }
}

fn invalid(record: RecordKind, field: impl Into<String>, detail: String) -> MatchError {
    MatchError::MalformedInput {
        record,
        field: field.into(),
        detail,
    }
}

impl TryFrom<RawProfile> for ExtractedProfile {
    type Error = MatchError;

    fn try_from(raw: RawProfile) -> Result<Self, Self::Error> {
        const RECORD: RecordKind = RecordKind::Profile;

        let name = raw.name.ok_or_else(|| missing(RECORD, "name"))?;
        let skills = raw.skills.ok_or_else(|| missing(RECORD, "skills"))?;

        let education = raw
            .education
            .ok_or_else(|| missing(RECORD, "education"))?
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                Ok(EducationEntry {
                    degree: entry
                        .degree
                        .ok_or_else(|| missing(RECORD, format!("education[{i}].degree")))?,
                    field: entry
                        .field
                        .ok_or_else(|| missing(RECORD, format!("education[{i}].field")))?,
                    institution: entry
                        .institution
                        .ok_or_else(|| missing(RECORD, format!("education[{i}].institution")))?,
                })
            })
            .collect::<Result<Vec<_>, MatchError>>()?;

        let experience = raw
            .experience
            .ok_or_else(|| missing(RECORD, "experience"))?
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let role = entry
                    .role
                    .ok_or_else(|| missing(RECORD, format!("experience[{i}].role")))?;
                let organization = entry
                    .organization
                    .ok_or_else(|| missing(RECORD, format!("experience[{i}].organization")))?;
                let tenure = parse_tenure(i, entry.duration_months, entry.start, entry.end)?;
                Ok(ExperienceEntry {
                    role,
                    organization,
                    tenure,
                })
            })
            .collect::<Result<Vec<_>, MatchError>>()?;

        Ok(Self {
            name,
            skills,
            education,
            experience,
        })
    }
}

fn parse_tenure(
    index: usize,
    duration_months: Option<u32>,
    start: Option<String>,
    end: Option<String>,
) -> Result<Tenure, MatchError> {
    const RECORD: RecordKind = RecordKind::Profile;

    if let Some(months) = duration_months {
        return Ok(Tenure::Months(months));
    }

    let start_raw =
        start.ok_or_else(|| missing(RECORD, format!("experience[{index}].duration_months")))?;
    // Present but blank: the position is undated and contributes no time
    if start_raw.trim().is_empty() {
        return Ok(Tenure::Months(0));
    }
    let start = YearMonth::parse(&start_raw).ok_or_else(|| {
        invalid(
            RECORD,
            format!("experience[{index}].start"),
            format!("has unparseable date '{start_raw}'"),
        )
    })?;

    let end = match end.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(e) if is_ongoing(e) => None,
        Some(e) => Some(YearMonth::parse(e).ok_or_else(|| {
            invalid(
                RECORD,
                format!("experience[{index}].end"),
                format!("has unparseable date '{e}'"),
            )
        })?),
    };

    Ok(Tenure::Range { start, end })
}

fn is_ongoing(end: &str) -> bool {
    matches!(
        end.to_lowercase().as_str(),
        "present" | "current" | "now" | "ongoing"
    )
}

impl TryFrom<RawRequirement> for ExtractedRequirement {
    type Error = MatchError;

    fn try_from(raw: RawRequirement) -> Result<Self, Self::Error> {
        const RECORD: RecordKind = RecordKind::Requirement;

        let required_skills = raw
            .required_skills
            .ok_or_else(|| missing(RECORD, "required_skills"))?;

        let education = raw
            .required_education
            .ok_or_else(|| missing(RECORD, "required_education"))?;
        let education = RequiredEducation {
            degree: education
                .degree
                .ok_or_else(|| missing(RECORD, "required_education.degree"))?,
            fields: education.fields,
        };

        let experience = raw
            .required_experience
            .ok_or_else(|| missing(RECORD, "required_experience"))?;
        let min_months = match (experience.months, experience.description.as_deref()) {
            (Some(months), _) => months,
            (None, Some(text)) => parse_months_from_text(text),
            (None, None) => return Err(missing(RECORD, "required_experience.months")),
        };

        Ok(Self {
            required_skills,
            education,
            experience: RequiredExperience {
                min_months,
                domains: experience.domains,
            },
        })
    }
}

/// Reads a duration such as "3+ years", "1.5 years", "2-yr" or "18 months"
/// from free text.
///
/// Text without a recognizable duration ("entry level", "fresh graduates")
/// means no minimum.
pub fn parse_months_from_text(text: &str) -> u32 {
    static YEARS: OnceLock<Regex> = OnceLock::new();
    static MONTHS: OnceLock<Regex> = OnceLock::new();

    let years = YEARS.get_or_init(|| {
        Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*\+?\s*[-\s]?(?:years?|yrs?)\b")
            .expect("valid years regex")
    });
    let months = MONTHS.get_or_init(|| {
        Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*\+?\s*[-\s]?(?:months?|mos?)\b")
            .expect("valid months regex")
    });

    let amount = |re: &Regex| -> Option<f64> {
        re.captures(text).and_then(|c| c[1].parse::<f64>().ok())
    };

    if let Some(n) = amount(years) {
        return whole_months(n * 12.0);
    }
    amount(months).map(whole_months).unwrap_or(0)
}

fn whole_months(months: f64) -> u32 {
    months.round().clamp(0.0, u32::MAX as f64) as u32
}
