//! Axum route handler for the Recommendation API.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::normalize::ReplyShape;
use crate::llm_client::{generate_json, GenerationRequest};
use crate::profile::sanitizer::{sanitize, RawStudentProfile};
use crate::recommendations::prompts::{build_prompt, TOP_N};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Value,
}

/// POST /recommend
///
/// Never rejects a profile for bad numbers: the sanitizer substitutes
/// defaults. Returns at most `TOP_N` recommendations, fewer if the model
/// sends fewer.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(raw): Json<RawStudentProfile>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let profile = sanitize(&raw);
    info!(
        cgpa = profile.cgpa,
        loan_amount = profile.loan_amount,
        family_income = profile.family_income,
        lti = profile.lti,
        "Scoring loan recommendations"
    );

    let request = GenerationRequest::text(build_prompt(&raw, &profile));
    let recommendations = generate_json(
        state.llm.as_ref(),
        &request,
        ReplyShape::List { limit: Some(TOP_N) },
    )
    .await?;

    Ok(Json(RecommendationResponse { recommendations }))
}
