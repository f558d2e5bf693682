use utoipa::{Modify, OpenApi};

use crate::features::daily_reports::{dtos as daily_reports_dtos, handlers as daily_reports_handlers};
use crate::shared::types::SubmissionResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Daily reports (public)
        daily_reports_handlers::submit_daily_report,
    ),
    components(
        schemas(
            // Shared
            SubmissionResponse,
            // Daily reports
            daily_reports_dtos::SubmitReportFormDoc,
        )
    ),
    tags(
        (name = "daily-reports", description = "Daily site report submission"),
    ),
    info(
        title = "Site Report API",
        version = "0.1.0",
        description = "API documentation for daily site reports",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

/// OpenAPI document with the configured title, version and description
pub fn build_openapi(modifier: &SwaggerInfoModifier) -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();
    modifier.modify(&mut openapi);
    openapi
}
