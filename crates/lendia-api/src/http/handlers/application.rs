//! Application lookup and catalog HTTP handlers.
//!
//! Endpoints:
//! - GET /api/v1/applications/{id}         - One persisted application
//! - GET /api/v1/applications?loan_type=x  - List persisted applications
//! - GET /api/v1/loan-types                - Catalog of available products

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lendia_types::application::StoredApplication;
use lendia_types::loan::LoanType;

use crate::http::error::AppError;
use crate::state::AppState;

/// Query parameters for application listing.
#[derive(Debug, Deserialize)]
pub struct ApplicationListQuery {
    pub loan_type: Option<String>,
}

/// Response body for GET /loan-types.
#[derive(Debug, Serialize)]
pub struct LoanTypesResponse {
    pub available_types: Vec<LoanType>,
    pub descriptions: Vec<LoanTypeDescription>,
}

#[derive(Debug, Serialize)]
pub struct LoanTypeDescription {
    pub loan_type: LoanType,
    pub description: &'static str,
}

/// Parse a UUID path parameter, returning 400 on invalid format.
fn parse_uuid(raw: &str) -> Result<Uuid, AppError> {
    raw.parse::<Uuid>()
        .map_err(|_| AppError::BadRequest(format!("Invalid UUID: {raw}")))
}

/// GET /api/v1/applications/{id} - fetch one persisted application.
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredApplication>, AppError> {
    let id = parse_uuid(&id)?;
    let application = state.desk.get_application(id).await?;
    Ok(Json(application))
}

/// GET /api/v1/applications - list persisted applications.
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<Json<Vec<StoredApplication>>, AppError> {
    let filter = match query.loan_type.as_deref() {
        Some(raw) => Some(
            raw.parse::<LoanType>()
                .map_err(AppError::BadRequest)?,
        ),
        None => None,
    };
    let applications = state.desk.list_applications(filter).await?;
    Ok(Json(applications))
}

/// GET /api/v1/loan-types - product catalog for the chat UI.
pub async fn loan_types(State(state): State<AppState>) -> Json<LoanTypesResponse> {
    let available_types = state.desk.loan_types();
    let descriptions = available_types
        .iter()
        .map(|&loan_type| LoanTypeDescription {
            loan_type,
            description: loan_type.description(),
        })
        .collect();
    Json(LoanTypesResponse {
        available_types,
        descriptions,
    })
}
