//! Scholarship suggestions. Every query field is optional; blanks are
//! replaced by neutral wording in the prompt.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::normalize::ReplyShape;
use crate::llm_client::prompts::{fill, format_amount, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{generate_json, GenerationRequest};
use crate::profile::sanitizer::{lenient_text, parse_integer, parse_real};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipQuery {
    #[serde(default, deserialize_with = "lenient_text")]
    pub course: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub college: String,
    #[serde(default)]
    pub cgpa: Option<Value>,
    #[serde(default)]
    pub family_income: Option<Value>,
    /// General, SC, ST, OBC, ...
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct ScholarshipResponse {
    pub scholarships: Value,
}

const SCHOLARSHIP_PROMPT_TEMPLATE: &str = r#"You are an expert on Indian scholarships and financial aid for students. Based on the student profile below, recommend relevant scholarships they can apply for.

STUDENT PROFILE:
- Course: {course}
- College: {college}
- CGPA: {cgpa}
- Family Income: ₹{family_income} per year
- Category: {category}

TASK:
List scholarships that match this profile. Include both government and private scholarships.
Consider:
1. Merit-based scholarships (if CGPA is good)
2. Need-based scholarships (based on family income)
3. Category-specific scholarships (if applicable)
4. Course-specific scholarships
5. State and central government schemes
6. Corporate/private scholarships

OUTPUT FORMAT:
Return ONLY a JSON array with 8-12 scholarship options. Each object must include:

[
  {
    "name": "Scholarship Name",
    "provider": "Organization/Government Body",
    "amount": "Award amount or range",
    "eligibility": "Key eligibility criteria",
    "deadline": "Application deadline or period",
    "category": "Merit/Need-based/Category-specific/Course-specific",
    "link": "Official website or application link",
    "description": "Brief description (2-3 sentences)"
  }
]

Include real, well-known scholarships in India. Focus on currently active schemes.
{json_only}"#;

pub fn build_prompt(query: &ScholarshipQuery) -> String {
    let cgpa = parse_real(query.cgpa.as_ref())
        .filter(|v| *v > 0.0)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "Not specified".to_string());
    let family_income = parse_integer(query.family_income.as_ref())
        .filter(|v| *v > 0)
        .map(|v| v as u64)
        .unwrap_or(0);

    fill(
        SCHOLARSHIP_PROMPT_TEMPLATE,
        &[
            ("course", or_default(&query.course, "Any course")),
            ("college", or_default(&query.college, "Any college")),
            ("cgpa", cgpa.as_str()),
            ("family_income", format_amount(family_income).as_str()),
            ("category", or_default(&query.category, "General")),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// POST /scholarships
pub async fn handle_find_scholarships(
    State(state): State<AppState>,
    Json(query): Json<ScholarshipQuery>,
) -> Result<Json<ScholarshipResponse>, AppError> {
    info!(course = %query.course, category = %query.category, "Finding scholarships");

    let request = GenerationRequest::text(build_prompt(&query));
    let scholarships =
        generate_json(state.llm.as_ref(), &request, ReplyShape::List { limit: None }).await?;

    Ok(Json(ScholarshipResponse { scholarships }))
}
