use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;
use std::collections::HashSet;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::daily_reports::dtos::{fields, PhotoUpload, SubmitReportForm};

/// Multipart extractor for the daily report form.
///
/// Reads every part into a [`SubmitReportForm`]. Unknown parts are skipped;
/// for repeated text parts the first value wins, even when it is empty.
/// A body over the route's `DefaultBodyLimit` is rejected with 413.
pub struct ReportForm(pub SubmitReportForm);

impl<S> FromRequest<S> for ReportForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await.map_err(|e| {
            debug!("Rejected non-multipart body: {}", e);
            AppError::BadRequest(format!("Expected multipart/form-data: {}", e))
        })?;

        let mut form = SubmitReportForm::default();
        let mut seen = HashSet::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error("Failed to read multipart data", e))?
        {
            let field_name = field.name().unwrap_or("").to_string();

            let target = match field_name.as_str() {
                fields::PHOTOS => {
                    form.photos.push(read_photo(field).await?);
                    continue;
                }
                fields::ORG_SLUG => &mut form.org_slug,
                fields::CREW_NAME => &mut form.crew_name,
                fields::SITE_NUMBER => &mut form.site_number,
                fields::SUMMARY => &mut form.summary,
                fields::FINISHED_PLAN => &mut form.finished_plan,
                fields::NOT_FINISHED_WHY => &mut form.not_finished_why,
                fields::CATCHUP_PLAN => &mut form.catchup_plan,
                fields::SITE_LEFT_CLEAN => &mut form.site_left_clean,
                fields::SITE_LEFT_CLEAN_NOTES => &mut form.site_left_clean_notes,
                _ => {
                    debug!("Ignoring unknown field: {}", field_name);
                    continue;
                }
            };

            let text = field
                .text()
                .await
                .map_err(|e| multipart_error(&format!("Failed to read {} field", field_name), e))?;
            if seen.insert(field_name) {
                *target = text;
            }
        }

        Ok(ReportForm(form))
    }
}

async fn read_photo(field: Field<'_>) -> Result<PhotoUpload, AppError> {
    let file_name = field.file_name().map(|s| s.to_string());
    let content_type = field.content_type().map(|s| s.to_string());

    let data = field
        .bytes()
        .await
        .map_err(|e| multipart_error("Failed to read photo data", e))?;

    Ok(PhotoUpload {
        file_name,
        content_type,
        data: data.to_vec(),
    })
}

fn multipart_error(context: &str, e: MultipartError) -> AppError {
    debug!("{}: {}", context, e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge("Request body too large".to_string());
    }
    AppError::BadRequest(format!("{}: {}", context, e))
}
