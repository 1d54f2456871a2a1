//! Loan catalog API.

use axum::Json;
use serde::Serialize;

pub mod catalog;

use catalog::{LoanProduct, LOAN_PRODUCTS};

#[derive(Debug, Serialize)]
pub struct LoanCatalogResponse {
    pub loans: &'static [LoanProduct],
}

/// GET /loans
pub async fn handle_list_loans() -> Json<LoanCatalogResponse> {
    Json(LoanCatalogResponse {
        loans: LOAN_PRODUCTS,
    })
}
