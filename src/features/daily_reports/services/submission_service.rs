use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::config::{ReportConfig, SiteLookup};
use crate::core::error::{AppError, Result};
use crate::features::daily_reports::dtos::{
    PhotoUpload, PlanProgress, SubmitReportForm, ValidatedReport,
};
use crate::features::daily_reports::models::{CreateDailyReport, CreateReportPhoto, Organisation, Site};
use super::notification::DailyReportEmail;
use super::ReportStore;
use crate::modules::notifier::Notifier;
use crate::modules::storage::BlobStore;
use crate::shared::constants::{FALLBACK_PHOTO_CONTENT_TYPE, SIGNED_URL_TTL_SECS, UPLOAD_CONCURRENCY};
use crate::shared::validation::photo_extension;

pub const MSG_INVALID_ORGANISATION: &str = "Invalid organisation";
pub const MSG_INVALID_SITE: &str = "Invalid site";
pub const MSG_REPORT_CREATE_FAILED: &str = "Failed to create report";
pub const MSG_UPLOAD_FAILED: &str = "Failed to upload all photos. Please try again.";
pub const MSG_PHOTO_RECORDS_FAILED: &str = "Failed to save photo records. Please try again.";
pub const MSG_NOTIFIER_NOT_CONFIGURED: &str = "Notification email is not configured";

/// Where a submission is in its write sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Received,
    Validated,
    OrgResolved,
    ReportCreated,
    PhotosUploaded,
    PhotosLinked,
    Notified,
    NotifyFailed,
    Succeeded,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionStage::Received => "received",
            SubmissionStage::Validated => "validated",
            SubmissionStage::OrgResolved => "org_resolved",
            SubmissionStage::ReportCreated => "report_created",
            SubmissionStage::PhotosUploaded => "photos_uploaded",
            SubmissionStage::PhotosLinked => "photos_linked",
            SubmissionStage::Notified => "notified",
            SubmissionStage::NotifyFailed => "notify_failed",
            SubmissionStage::Succeeded => "succeeded",
        };
        f.write_str(name)
    }
}

/// Whether the notification email went out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub sent: bool,
    pub error: Option<String>,
}

impl NotificationOutcome {
    fn sent() -> Self {
        Self {
            sent: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            sent: false,
            error: Some(error.into()),
        }
    }
}

/// A submission that reached the succeeded state
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub report_id: Uuid,
    /// Photo rows actually linked to the report
    pub photo_count: usize,
    pub notification: NotificationOutcome,
}

/// Static settings for the submission flow
#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    pub reports: ReportConfig,
    pub from_email: String,
    pub notify_email: String,
}

/// A photo that landed in the blob store
#[derive(Debug, Clone)]
struct UploadedPhoto {
    position: usize,
    key: String,
}

/// Validates daily report submissions and runs the create / upload / link /
/// notify sequence, compensating in reverse order when a write step fails.
pub struct ReportSubmissionService {
    store: Arc<dyn ReportStore>,
    blobs: Arc<dyn BlobStore>,
    notifier: Option<Arc<dyn Notifier>>,
    settings: SubmissionSettings,
}

impl ReportSubmissionService {
    pub fn new(
        store: Arc<dyn ReportStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Option<Arc<dyn Notifier>>,
        settings: SubmissionSettings,
    ) -> Self {
        Self {
            store,
            blobs,
            notifier,
            settings,
        }
    }

    /// Applies the form rules; no store is touched.
    pub fn validate(&self, form: SubmitReportForm) -> Result<ValidatedReport> {
        let report = form.into_validated(&self.settings.reports)?;
        debug!(
            stage = %SubmissionStage::Validated,
            photos = report.photos.len(),
            "Submission validated"
        );
        Ok(report)
    }

    /// Runs [`Self::submit`] on its own task.
    ///
    /// Dropping the returned future (client gone, request timeout) does not
    /// stop the sequence, so it still completes or rolls back.
    pub async fn submit_detached(self: &Arc<Self>, report: ValidatedReport) -> Result<SubmissionOutcome> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.submit(report).await })
            .await
            .map_err(|e| AppError::Internal(format!("Submission task failed: {}", e)))?
    }

    #[tracing::instrument(skip_all, fields(org_slug = %report.org_slug))]
    pub async fn submit(&self, mut report: ValidatedReport) -> Result<SubmissionOutcome> {
        debug!(stage = %SubmissionStage::Received, "Starting submission");

        let organisation = self.resolve_organisation(&report.org_slug).await?;
        let site = self.resolve_site(&organisation, &report.site_number).await?;
        info!(
            stage = %SubmissionStage::OrgResolved,
            organisation_id = %organisation.id,
            "Organisation resolved"
        );

        let new_report = build_report_row(&organisation, site.as_ref(), &report);
        let created = self.store.insert_report(&new_report).await.map_err(|e| {
            error!("Error creating report: {}", e);
            AppError::Persistence(MSG_REPORT_CREATE_FAILED.to_string())
        })?;
        let report_id = created.id;
        info!(stage = %SubmissionStage::ReportCreated, %report_id, "Report row created");

        let prefix = storage_prefix(&report.org_slug, site.as_ref(), report_id);
        let photos = std::mem::take(&mut report.photos);
        let uploaded = match self.upload_photos(&prefix, photos).await {
            Ok(uploaded) => uploaded,
            Err((uploaded, e)) => {
                error!(%report_id, "Error uploading photo: {}", e);
                self.rollback(report_id, &uploaded, false).await;
                return Err(AppError::Persistence(MSG_UPLOAD_FAILED.to_string()));
            }
        };
        info!(
            stage = %SubmissionStage::PhotosUploaded,
            %report_id,
            count = uploaded.len(),
            "Photos uploaded"
        );

        let rows: Vec<CreateReportPhoto> = uploaded
            .iter()
            .map(|photo| CreateReportPhoto {
                report_id,
                storage_path: photo.key.clone(),
                position: photo.position as i32,
            })
            .collect();

        let linked = match self.store.insert_photos(&rows).await {
            Ok(linked) => linked,
            Err(e) => {
                error!(%report_id, "Error creating photo records: {}", e);
                self.rollback(report_id, &uploaded, true).await;
                return Err(AppError::Persistence(MSG_PHOTO_RECORDS_FAILED.to_string()));
            }
        };
        info!(
            stage = %SubmissionStage::PhotosLinked,
            %report_id,
            count = linked.len(),
            "Photo records created"
        );

        let links = self.sign_links(&uploaded).await;
        let notification = self.notify(&report, report_id, &links, linked.len()).await;

        info!(
            stage = %SubmissionStage::Succeeded,
            %report_id,
            email_sent = notification.sent,
            "Daily report submitted"
        );

        Ok(SubmissionOutcome {
            report_id,
            photo_count: linked.len(),
            notification,
        })
    }

    async fn resolve_organisation(&self, slug: &str) -> Result<Organisation> {
        match self.store.find_organisation_by_slug(slug).await? {
            Some(organisation) => Ok(organisation),
            None => {
                warn!("Org lookup failed: no organisation with slug '{}'", slug);
                Err(AppError::not_found(
                    MSG_INVALID_ORGANISATION,
                    format!("no organisation with slug '{}'", slug),
                ))
            }
        }
    }

    async fn resolve_site(
        &self,
        organisation: &Organisation,
        site_number: &str,
    ) -> Result<Option<Site>> {
        if self.settings.reports.site_lookup == SiteLookup::FreeText {
            return Ok(None);
        }

        match self
            .store
            .find_active_site(organisation.id, site_number)
            .await?
        {
            Some(site) => {
                debug!(
                    site_id = %site.id,
                    organisation_id = %site.organisation_id,
                    "Resolved site '{}'",
                    site.site_number
                );
                Ok(Some(site))
            }
            None => {
                warn!(
                    "Site lookup failed: no active site '{}' for organisation '{}'",
                    site_number, organisation.slug
                );
                Err(AppError::not_found(
                    MSG_INVALID_SITE,
                    format!("no active site '{}'", site_number),
                ))
            }
        }
    }

    /// Uploads every photo, at most [`UPLOAD_CONCURRENCY`] at a time.
    ///
    /// After the first failure no new upload starts, but in-flight ones are
    /// awaited so the returned key list is exactly what landed.
    async fn upload_photos(
        &self,
        prefix: &str,
        photos: Vec<PhotoUpload>,
    ) -> std::result::Result<Vec<UploadedPhoto>, (Vec<UploadedPhoto>, AppError)> {
        let mut pending = photos.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut uploaded = Vec::new();
        let mut failure: Option<AppError> = None;

        loop {
            while failure.is_none() && in_flight.len() < UPLOAD_CONCURRENCY {
                let Some((position, photo)) = pending.next() else {
                    break;
                };
                let key = format!(
                    "{}/{}.{}",
                    prefix,
                    Uuid::new_v4(),
                    photo_extension(photo.file_name.as_deref())
                );
                let content_type = photo
                    .content_type
                    .filter(|ct| !ct.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_PHOTO_CONTENT_TYPE.to_string());
                let blobs = &self.blobs;

                in_flight.push(async move {
                    let result = blobs.upload(&key, photo.data, &content_type).await;
                    (UploadedPhoto { position, key }, result)
                });
            }

            match in_flight.next().await {
                Some((photo, Ok(()))) => uploaded.push(photo),
                Some((photo, Err(e))) => {
                    debug!("Upload of '{}' failed: {}", photo.key, e);
                    failure.get_or_insert(e);
                }
                None => break,
            }
        }

        uploaded.sort_by_key(|photo| photo.position);

        match failure {
            None => Ok(uploaded),
            Some(e) => Err((uploaded, e)),
        }
    }

    /// Best-effort compensation: photo rows, then blobs, then the report row.
    async fn rollback(&self, report_id: Uuid, uploaded: &[UploadedPhoto], photo_rows: bool) {
        if photo_rows {
            if let Err(e) = self.store.delete_photos(report_id).await {
                warn!(%report_id, "Rollback: failed to delete photo records: {}", e);
            }
        }

        if !uploaded.is_empty() {
            let keys: Vec<String> = uploaded.iter().map(|photo| photo.key.clone()).collect();
            if let Err(e) = self.blobs.delete(&keys).await {
                warn!(%report_id, "Rollback: failed to delete uploaded photos: {}", e);
            }
        }

        if let Err(e) = self.store.delete_report(report_id).await {
            warn!(%report_id, "Rollback: failed to delete report: {}", e);
        }

        info!(%report_id, blobs = uploaded.len(), "Submission rolled back");
    }

    /// Signed read links in upload order; photos whose link fails are skipped.
    async fn sign_links(&self, uploaded: &[UploadedPhoto]) -> Vec<String> {
        let results = futures::future::join_all(
            uploaded
                .iter()
                .map(|photo| self.blobs.create_signed_url(&photo.key, SIGNED_URL_TTL_SECS)),
        )
        .await;

        results
            .into_iter()
            .zip(uploaded)
            .filter_map(|(result, photo)| match result {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Could not sign link for '{}': {}", photo.key, e);
                    None
                }
            })
            .collect()
    }

    /// Sends the notification email. Never fails the submission.
    async fn notify(
        &self,
        report: &ValidatedReport,
        report_id: Uuid,
        links: &[String],
        photo_count: usize,
    ) -> NotificationOutcome {
        let Some(notifier) = &self.notifier else {
            warn!(
                stage = %SubmissionStage::NotifyFailed,
                "RESEND_API_KEY not set; skipping notification email"
            );
            return NotificationOutcome::failed(MSG_NOTIFIER_NOT_CONFIGURED);
        };

        let email = DailyReportEmail {
            report_id: report_id.to_string(),
            org_slug: &report.org_slug,
            crew_name: &report.crew_name,
            site_number: &report.site_number,
            summary: &report.summary,
            progress: &report.progress,
            cleanliness: &report.cleanliness,
            photo_links: links,
            photo_count,
        }
        .into_email(&self.settings.from_email, &self.settings.notify_email);

        let email = match email {
            Ok(email) => email,
            Err(e) => {
                error!(stage = %SubmissionStage::NotifyFailed, "Failed to compose notification email: {}", e);
                return NotificationOutcome::failed(describe(&e));
            }
        };

        debug!(
            "Sending notification email to {} from {}",
            self.settings.notify_email, self.settings.from_email
        );

        match AssertUnwindSafe(notifier.send(&email)).catch_unwind().await {
            Ok(Ok(message_id)) => {
                info!(stage = %SubmissionStage::Notified, %message_id, "Notification email sent");
                NotificationOutcome::sent()
            }
            Ok(Err(e)) => {
                error!(stage = %SubmissionStage::NotifyFailed, "Notification email error: {}", e);
                NotificationOutcome::failed(describe(&e))
            }
            Err(_) => {
                error!(stage = %SubmissionStage::NotifyFailed, "Notification email sender panicked");
                NotificationOutcome::failed("Notification email sender failed unexpectedly")
            }
        }
    }
}

/// Message for the `emailError` field
fn describe(e: &AppError) -> String {
    match e {
        AppError::ExternalService(msg) | AppError::Internal(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn build_report_row(
    organisation: &Organisation,
    site: Option<&Site>,
    report: &ValidatedReport,
) -> CreateDailyReport {
    let (not_finished_why, catchup_plan) = match &report.progress {
        PlanProgress::Finished => (None, None),
        PlanProgress::NotFinished { why, catchup_plan } => {
            (Some(why.clone()), Some(catchup_plan.clone()))
        }
    };
    let (site_left_clean, site_left_clean_notes) = report.cleanliness.to_columns();

    CreateDailyReport {
        organisation_id: organisation.id,
        site_id: site.map(|s| s.id),
        site_identifier: report.site_number.clone(),
        crew_name: report.crew_name.clone(),
        summary: report.summary.clone(),
        finished_plan: report.progress.is_finished(),
        not_finished_why,
        catchup_plan,
        site_left_clean,
        site_left_clean_notes,
    }
}

/// `{org}/{report}` or, for registered sites, `{org}/{site}/{report}`
fn storage_prefix(org_slug: &str, site: Option<&Site>, report_id: Uuid) -> String {
    match site {
        Some(site) => format!("{}/{}/{}", org_slug, site.id, report_id),
        None => format!("{}/{}", org_slug, report_id),
    }
}
