// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use axum::{extract::State, routing::get, Json, Router};
use sampledash_core::{AggregationRow, Dimension};
use tracing::debug;

use crate::api::{ApiError, AppState};

/// Routes mounted under `/api/stats`
pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/count_by_type", get(count_by_type))
        .route("/count_by_tag", get(count_by_tag))
        .route("/upload_timeline", get(upload_timeline))
        .route("/count_by_user", get(count_by_user))
}

/// Run one aggregation on the blocking pool.
async fn aggregate(state: AppState, dimension: Dimension) -> Result<Json<Vec<AggregationRow>>, ApiError> {
    debug!("Aggregating {}", dimension);

    let store = state.store.clone();
    let rows = tokio::task::spawn_blocking(move || store.aggregate(dimension))
        .await
        .map_err(crate::store::QueryError::from)??;

    Ok(Json(rows))
}

/// GET /api/stats/count_by_type
pub async fn count_by_type(
    State(state): State<AppState>,
) -> Result<Json<Vec<AggregationRow>>, ApiError> {
    aggregate(state, Dimension::FileType).await
}

/// GET /api/stats/count_by_tag
pub async fn count_by_tag(
    State(state): State<AppState>,
) -> Result<Json<Vec<AggregationRow>>, ApiError> {
    aggregate(state, Dimension::Tag).await
}

/// GET /api/stats/upload_timeline
pub async fn upload_timeline(
    State(state): State<AppState>,
) -> Result<Json<Vec<AggregationRow>>, ApiError> {
    aggregate(state, Dimension::Date).await
}

/// GET /api/stats/count_by_user
pub async fn count_by_user(
    State(state): State<AppState>,
) -> Result<Json<Vec<AggregationRow>>, ApiError> {
    aggregate(state, Dimension::User).await
}
