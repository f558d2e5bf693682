use serde::Serialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::core::config::{CleanlinessField, ReportConfig};
use crate::core::error::{AppError, Result};
use crate::shared::constants::{MAX_PHOTOS, MIN_PHOTOS, TOKEN_FALSE, TOKEN_TRUE};

/// Multipart field names of the submission form
pub mod fields {
    pub const ORG_SLUG: &str = "orgSlug";
    pub const CREW_NAME: &str = "crewName";
    pub const SITE_NUMBER: &str = "siteNumber";
    pub const SUMMARY: &str = "summary";
    pub const FINISHED_PLAN: &str = "finishedPlan";
    pub const NOT_FINISHED_WHY: &str = "notFinishedWhy";
    pub const CATCHUP_PLAN: &str = "catchupPlan";
    pub const SITE_LEFT_CLEAN: &str = "siteLeftClean";
    pub const SITE_LEFT_CLEAN_NOTES: &str = "siteLeftCleanNotes";
    pub const PHOTOS: &str = "photos";
}

/// One binary part of the `photos` field, as received
#[derive(Debug, Clone, Default)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Raw submission as read from the multipart body.
///
/// Missing text fields are empty strings. Only the four unconditional text
/// fields carry derive rules; the remaining rules depend on other fields.
#[derive(Debug, Clone, Default, Validate)]
pub struct SubmitReportForm {
    #[validate(length(min = 1, message = "Organisation is required"))]
    pub org_slug: String,
    #[validate(length(min = 1, message = "Crew name is required"))]
    pub crew_name: String,
    #[validate(length(min = 1, message = "Site Number / Name is required"))]
    pub site_number: String,
    #[validate(length(min = 1, message = "Today's summary is required"))]
    pub summary: String,
    pub finished_plan: String,
    pub not_finished_why: String,
    pub catchup_plan: String,
    pub site_left_clean: String,
    pub site_left_clean_notes: String,
    pub photos: Vec<PhotoUpload>,
}

/// Order in which missing required fields are reported
const REQUIRED_FIELD_ORDER: [&str; 4] = ["org_slug", "crew_name", "site_number", "summary"];

/// Whether the crew finished the day's plan; the explanation only exists when not
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanProgress {
    Finished,
    NotFinished { why: String, catchup_plan: String },
}

/// The "site left clean" answer in the deployment's representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanliness {
    Toggle(bool),
    Notes(String),
}

/// A submission that passed every validation rule
#[derive(Debug, Clone)]
pub struct ValidatedReport {
    pub org_slug: String,
    pub crew_name: String,
    pub site_number: String,
    pub summary: String,
    pub progress: PlanProgress,
    pub cleanliness: Cleanliness,
    /// Non-empty photos in submission order, between the configured bounds
    pub photos: Vec<PhotoUpload>,
}

impl PlanProgress {
    pub fn is_finished(&self) -> bool {
        matches!(self, PlanProgress::Finished)
    }
}

impl Cleanliness {
    /// Values for the `site_left_clean` and `site_left_clean_notes` columns
    pub fn to_columns(&self) -> (Option<bool>, String) {
        match self {
            Cleanliness::Toggle(clean) => (Some(*clean), yes_no(*clean).to_string()),
            Cleanliness::Notes(notes) => (None, notes.clone()),
        }
    }

    /// Human-readable answer for notifications
    pub fn describe(&self) -> String {
        match self {
            Cleanliness::Toggle(clean) => yes_no(*clean).to_string(),
            Cleanliness::Notes(notes) => notes.clone(),
        }
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Parses a literal boolean token.
///
/// `Ok(None)` means the field was absent; an unrecognised token is an error.
fn parse_token(raw: &str, invalid_message: &str) -> Result<Option<bool>> {
    match raw {
        "" => Ok(None),
        TOKEN_TRUE => Ok(Some(true)),
        TOKEN_FALSE => Ok(Some(false)),
        _ => Err(AppError::Validation(invalid_message.to_string())),
    }
}

fn require(value: String, message: &str) -> Result<String> {
    if value.is_empty() {
        Err(AppError::Validation(message.to_string()))
    } else {
        Ok(value)
    }
}

fn first_required_field_error(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    REQUIRED_FIELD_ORDER
        .iter()
        .find_map(|field| {
            field_errors
                .get(*field)
                .and_then(|errs| errs.first())
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| errors.to_string())
}

impl SubmitReportForm {
    /// Trim every text field, as the form does before sending
    fn trimmed(mut self) -> Self {
        for field in [
            &mut self.org_slug,
            &mut self.crew_name,
            &mut self.site_number,
            &mut self.summary,
            &mut self.finished_plan,
            &mut self.not_finished_why,
            &mut self.catchup_plan,
            &mut self.site_left_clean,
            &mut self.site_left_clean_notes,
        ] {
            *field = field.trim().to_string();
        }
        self
    }

    /// Applies the submission rules in order, stopping at the first failure.
    pub fn into_validated(self, config: &ReportConfig) -> Result<ValidatedReport> {
        let form = self.trimmed();

        form.validate()
            .map_err(|e| AppError::Validation(first_required_field_error(&e)))?;

        let finished = parse_token(
            &form.finished_plan,
            "Finished plan must be either \"true\" or \"false\"",
        )?
        .ok_or_else(|| {
            AppError::Validation(
                "Please indicate if you finished everything planned today".to_string(),
            )
        })?;

        // Stale explanation text from the client is discarded when finished
        let progress = if finished {
            PlanProgress::Finished
        } else {
            PlanProgress::NotFinished {
                why: require(
                    form.not_finished_why,
                    "Please explain what was not finished and why",
                )?,
                catchup_plan: require(
                    form.catchup_plan,
                    "Please provide a plan to make up the lost time",
                )?,
            }
        };

        let cleanliness = match config.cleanliness_field {
            CleanlinessField::Toggle => {
                let clean = parse_token(
                    &form.site_left_clean,
                    "Site left clean must be either \"true\" or \"false\"",
                )?
                .ok_or_else(|| {
                    AppError::Validation(
                        "Please indicate if the site was left clean / tools in site box / materials under cover"
                            .to_string(),
                    )
                })?;
                Cleanliness::Toggle(clean)
            }
            CleanlinessField::Notes => Cleanliness::Notes(require(
                form.site_left_clean_notes,
                "Please describe how the site was left",
            )?),
        };

        let photos: Vec<PhotoUpload> = form
            .photos
            .into_iter()
            .filter(|p| !p.data.is_empty())
            .collect();

        if !(MIN_PHOTOS..=MAX_PHOTOS).contains(&photos.len()) {
            return Err(AppError::Validation(format!(
                "Must upload between {} and {} photos",
                MIN_PHOTOS, MAX_PHOTOS
            )));
        }

        Ok(ValidatedReport {
            org_slug: form.org_slug,
            crew_name: form.crew_name,
            site_number: form.site_number,
            summary: form.summary,
            progress,
            cleanliness,
            photos,
        })
    }
}

/// Daily report submission form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler reads the multipart body through `ReportForm`.
#[derive(Debug, Serialize, ToSchema)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportFormDoc {
    /// Organisation slug
    #[schema(example = "madebymobbs")]
    pub org_slug: String,
    /// Crew name
    pub crew_name: String,
    /// Site number or name
    pub site_number: String,
    /// Summary of the day's work
    pub summary: String,
    /// "true" or "false"
    #[schema(example = "true")]
    pub finished_plan: String,
    /// Required when finishedPlan is "false"
    pub not_finished_why: Option<String>,
    /// Required when finishedPlan is "false"
    pub catchup_plan: Option<String>,
    /// "true" or "false" (toggle deployments)
    pub site_left_clean: Option<String>,
    /// Free text (notes deployments)
    pub site_left_clean_notes: Option<String>,
    /// Between 3 and 10 images
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub photos: Vec<String>,
}
