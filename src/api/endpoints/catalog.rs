//! `GET /api/catalog?q=`: stateless grouped search over the catalog.

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CatalogQuery};
use crate::models::Symptom;

#[derive(Serialize)]
pub struct CatalogGroup {
    pub category: String,
    pub symptoms: Vec<Symptom>,
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub query: String,
    pub total: usize,
    pub groups: Vec<CatalogGroup>,
}

pub async fn search(
    State(ctx): State<ApiContext>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let groups: Vec<CatalogGroup> = ctx
        .core
        .catalog()
        .search(&query.q)
        .into_iter()
        .map(|g| CatalogGroup {
            category: g.category.to_string(),
            symptoms: g.symptoms.into_iter().cloned().collect(),
        })
        .collect();
    let total = groups.iter().map(|g| g.symptoms.len()).sum();

    Ok(Json(CatalogResponse {
        query: query.q,
        total,
        groups,
    }))
}
