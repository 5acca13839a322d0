use std::collections::BTreeSet;
use std::fmt::Write;

use crate::core::normalizer::NormalizedToken;
use crate::models::report::{Category, MatchResult, ScoringWeights};

const RULE: &str = "------------------------------------------------------------";

/// Render a match result as a plain-text report
pub fn render_text(result: &MatchResult) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, result);
    out
}

fn write_report(out: &mut String, result: &MatchResult) -> std::fmt::Result {
    writeln!(out, "CV and Job Description Match Report")?;
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "Generated on: {}",
        result.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "CV document:  {}", result.cv_document_id)?;
    writeln!(out, "Job document: {}", result.job_document_id)?;
    writeln!(out)?;
    writeln!(out, "Overall Match Score: {}/100", result.percentage())?;
    writeln!(out, "Interpretation: {}", result.interpretation())?;
    writeln!(out)?;

    writeln!(out, "Score Breakdown")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "{:<12} {:>8} {:>8}  {}", "Category", "Score", "Weight", "Details")?;
    for category in Category::ALL {
        let score = result.category(category);
        let weight = ScoringWeights::POLICY.for_category(category);
        let total = score.matched.len() + score.missing.len();
        writeln!(
            out,
            "{:<12} {:>7.1}% {:>7.0}%  {}/{} requirements met",
            title(category),
            score.raw * 100.0,
            weight * 100.0,
            score.matched.len(),
            total,
        )?;
    }

    for category in Category::ALL {
        let score = result.category(category);
        writeln!(out)?;
        writeln!(out, "{}", title(category))?;
        write_items(out, "Matched", &score.matched)?;
        write_items(out, "Missing", &score.missing)?;
    }

    Ok(())
}

fn write_items(
    out: &mut String,
    label: &str,
    items: &BTreeSet<NormalizedToken>,
) -> std::fmt::Result {
    if items.is_empty() {
        return writeln!(out, "  {label}: none");
    }
    writeln!(out, "  {label}:")?;
    for item in items {
        writeln!(out, "    - {item}")?;
    }
    Ok(())
}

fn title(category: Category) -> &'static str {
    match category {
        Category::Skills => "Skills",
        Category::Education => "Education",
        Category::Experience => "Experience",
    }
}
