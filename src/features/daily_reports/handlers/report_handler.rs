use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::ReportForm;
use crate::features::daily_reports::dtos::SubmitReportFormDoc;
use crate::features::daily_reports::services::ReportSubmissionService;
use crate::shared::types::SubmissionResponse;

/// Submit a daily site report
///
/// Accepts multipart/form-data with the report text fields and 3 to 10
/// `photos` parts. Validation failures write nothing. A failure after the
/// report row exists is rolled back before the error is returned.
#[utoipa::path(
    post,
    path = "/api/daily-report",
    tag = "daily-reports",
    request_body(
        content = SubmitReportFormDoc,
        content_type = "multipart/form-data",
        description = "Daily report form with 3 to 10 photos",
    ),
    responses(
        (status = 200, description = "Report stored; check emailSent for the notification", body = SubmissionResponse),
        (status = 400, description = "Validation error", body = SubmissionResponse),
        (status = 404, description = "Unknown organisation or site", body = SubmissionResponse),
        (status = 413, description = "Request body too large", body = SubmissionResponse),
        (status = 500, description = "Report could not be stored", body = SubmissionResponse)
    )
)]
pub async fn submit_daily_report(
    State(service): State<Arc<ReportSubmissionService>>,
    ReportForm(form): ReportForm,
) -> Result<Json<SubmissionResponse>, AppError> {
    debug!(
        "Received daily report for org '{}' with {} photo part(s)",
        form.org_slug,
        form.photos.len()
    );

    let report = service.validate(form)?;
    let outcome = service.submit_detached(report).await?;
    debug!(
        "Report {} stored with {} photo(s)",
        outcome.report_id, outcome.photo_count
    );

    Ok(Json(SubmissionResponse::success(
        outcome.report_id,
        outcome.notification.sent,
        outcome.notification.error,
    )))
}
