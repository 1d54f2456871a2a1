//! Nearest-branch lookup, answered by the model with Google Search grounding.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::normalize::ReplyShape;
use crate::llm_client::prompts::{fill, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{generate_json, GenerationRequest};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UserCoords {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub bank: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NearestBranchRequest {
    pub user_coords: UserCoords,
    pub branches: Vec<Branch>,
}

const NEAREST_BRANCH_PROMPT_TEMPLATE: &str = r#"Find the nearest physical bank branch for each of the following banks: {banks}.
The user is located at Latitude: {lat}, Longitude: {lng}.

For each bank, use Google Search to find the exact address and coordinates of the nearest branch.

Return the result as a strict JSON object with a single key "nearest_branches" containing a list of objects.
Each object must have:
- "bank": The name of the bank
- "name": The branch name (e.g., "SBI MG Road Branch")
- "lat": Latitude (number)
- "lng": Longitude (number)
- "address": Full address

Example Output:
{
  "nearest_branches": [
    { "bank": "SBI", "name": "SBI Indiranagar", "lat": 12.97, "lng": 77.64, "address": "..." }
  ]
}

{json_only}"#;

impl NearestBranchRequest {
    /// Checks coordinates are on the globe and returns the non-blank bank
    /// names, in request order.
    pub fn validate(&self) -> Result<Vec<&str>, AppError> {
        let UserCoords { lat, lng } = self.user_coords;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::Validation(format!(
                "user_coords.lat must be between -90 and 90, got {lat}"
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::Validation(format!(
                "user_coords.lng must be between -180 and 180, got {lng}"
            )));
        }

        let banks: Vec<&str> = self
            .branches
            .iter()
            .map(|b| b.bank.trim())
            .filter(|b| !b.is_empty())
            .collect();
        if banks.is_empty() {
            return Err(AppError::Validation(
                "branches must name at least one bank".to_string(),
            ));
        }
        Ok(banks)
    }
}

pub fn build_prompt(banks: &[&str], coords: UserCoords) -> String {
    fill(
        NEAREST_BRANCH_PROMPT_TEMPLATE,
        &[
            ("banks", banks.join(", ").as_str()),
            ("lat", coords.lat.to_string().as_str()),
            ("lng", coords.lng.to_string().as_str()),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

/// POST /nearest-branches
///
/// Returns the model's object as-is (normally `{"nearest_branches": [...]}`).
pub async fn handle_nearest_branches(
    State(state): State<AppState>,
    Json(request): Json<NearestBranchRequest>,
) -> Result<Json<Value>, AppError> {
    let banks = request.validate()?;
    info!(bank_count = banks.len(), "Looking up nearest branches");

    let generation =
        GenerationRequest::text(build_prompt(&banks, request.user_coords)).with_web_search();
    let branches =
        generate_json(state.llm.as_ref(), &generation, ReplyShape::Structured).await?;

    Ok(Json(branches))
}
