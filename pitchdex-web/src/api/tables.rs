//! Review and author tables, served to DataTables

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::debug;

use crate::datatables::{Table, TableParams, TableResponse};
use crate::db::{self, Page};
use crate::error::ApiResult;
use crate::AppState;

fn respond(params: &TableParams, page: Page) -> Json<TableResponse> {
    Json(TableResponse {
        echo: params.echo,
        total_records: page.total,
        total_display_records: page.matching,
        rows: page.rows,
    })
}

/// GET /api/reviews
pub async fn get_reviews(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<TableResponse>> {
    let params = TableParams::parse(Table::Reviews, &query)?;
    debug!("Reviews query: {:?}", params);
    let page = db::query_reviews(&state.db, &params).await?;
    Ok(respond(&params, page))
}

/// GET /api/authors
pub async fn get_authors(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<TableResponse>> {
    let params = TableParams::parse(Table::Authors, &query)?;
    debug!("Authors query: {:?}", params);
    let page = db::query_authors(&state.db, &params).await?;
    Ok(respond(&params, page))
}
