//! Prompt templates for the extraction model.
//!
//! The JSON shapes here are the schema contract with `RawProfile` and
//! `RawRequirement`; change them together.

pub const PROFILE_PROMPT: &str = r#"Analyze the following CV and extract information in JSON format.

Return ONLY a valid JSON object with exactly these fields:
{
  "name": "candidate's full name",
  "skills": ["skill1", "skill2"],
  "education": [
    {"degree": "degree name", "field": "field of study", "institution": "institution name"}
  ],
  "experience": [
    {"role": "job title", "organization": "employer", "start": "YYYY-MM", "end": "YYYY-MM or present", "duration_months": null}
  ]
}

Rules:
- Return ONLY the JSON object, no additional text.
- Always include every key. Use an empty string or empty array when the information is absent.
- Skills should include technical skills, soft skills, tools and technologies, one per entry.
- When dates are unknown but a duration is stated, set "duration_months" and omit "start" and "end".

CV Text:
"#;

pub const REQUIREMENT_PROMPT: &str = r#"Analyze the following job description and extract information in JSON format.

Return ONLY a valid JSON object with exactly these fields:
{
  "required_skills": ["skill1", "skill2"],
  "required_education": {"degree": "minimum degree or empty string", "fields": ["acceptable field of study"]},
  "required_experience": {"months": null, "description": "X years of experience or description", "domains": ["domain keyword"]}
}

Rules:
- Return ONLY the JSON object, no additional text.
- Always include every key. Use an empty string or empty array when the information is absent.
- Include both technical and soft skills in required_skills, one per entry.
- Set "months" only when the minimum experience is stated as a number.

Job Description:
"#;

pub fn profile_prompt(cv_text: &str) -> String {
    format!("{PROFILE_PROMPT}{cv_text}")
}

pub fn requirement_prompt(job_text: &str) -> String {
    format!("{REQUIREMENT_PROMPT}{job_text}")
}
