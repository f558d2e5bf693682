use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::daily_reports::handlers::submit_daily_report;
use crate::features::daily_reports::services::ReportSubmissionService;

/// Create routes for the daily reports feature
pub fn routes(service: Arc<ReportSubmissionService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/daily-report",
            post(submit_daily_report).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .with_state(service)
}
