//! In-memory stand-ins for the store, blob and notifier seams.

use async_trait::async_trait;
use chrono::Utc;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::daily_reports::dtos::{PhotoUpload, SubmitReportForm};
use crate::features::daily_reports::models::{
    CreateDailyReport, CreateReportPhoto, DailyReport, Organisation, ReportPhoto, Site,
};
use crate::features::daily_reports::services::ReportStore;
use crate::modules::notifier::{Notifier, OutgoingEmail};
use crate::modules::storage::BlobStore;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn photo(name: &str, size: usize) -> PhotoUpload {
    PhotoUpload {
        file_name: Some(name.to_string()),
        content_type: Some("image/jpeg".to_string()),
        data: vec![0xFF; size],
    }
}

/// A form for `madebymobbs` that passes validation when `photos` is in bounds
pub fn report_form(photos: usize) -> SubmitReportForm {
    SubmitReportForm {
        org_slug: "madebymobbs".to_string(),
        crew_name: Name().fake(),
        site_number: "Site 42".to_string(),
        summary: Sentence(3..8).fake(),
        finished_plan: "true".to_string(),
        site_left_clean: "true".to_string(),
        photos: (0..photos)
            .map(|i| photo(&format!("IMG_{:04}.jpg", i), 32))
            .collect(),
        ..Default::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreFailure {
    InsertReport,
    InsertPhotos,
    DeleteReport,
    DeletePhotos,
}

#[derive(Default)]
struct StoreState {
    organisations: Vec<Organisation>,
    sites: Vec<Site>,
    reports: Vec<DailyReport>,
    photos: Vec<ReportPhoto>,
    writes: usize,
    failures: HashSet<StoreFailure>,
}

#[derive(Default)]
pub struct InMemoryReportStore {
    state: Mutex<StoreState>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_organisation(&self, slug: &str) -> Uuid {
        let id = Uuid::new_v4();
        lock(&self.state).organisations.push(Organisation {
            id,
            slug: slug.to_string(),
        });
        id
    }

    pub fn organisation_id(&self, slug: &str) -> Option<Uuid> {
        lock(&self.state)
            .organisations
            .iter()
            .find(|o| o.slug == slug)
            .map(|o| o.id)
    }

    pub fn add_site(&self, organisation_id: Uuid, site_number: &str) -> Uuid {
        let id = Uuid::new_v4();
        lock(&self.state).sites.push(Site {
            id,
            organisation_id,
            site_number: site_number.to_string(),
        });
        id
    }

    pub fn fail_on(&self, failure: StoreFailure) {
        lock(&self.state).failures.insert(failure);
    }

    pub fn reports(&self) -> Vec<DailyReport> {
        lock(&self.state).reports.clone()
    }

    pub fn report(&self, id: Uuid) -> Option<DailyReport> {
        lock(&self.state).reports.iter().find(|r| r.id == id).cloned()
    }

    pub fn all_photos(&self) -> Vec<ReportPhoto> {
        lock(&self.state).photos.clone()
    }

    pub fn photos_for(&self, report_id: Uuid) -> Vec<ReportPhoto> {
        let mut photos: Vec<ReportPhoto> = lock(&self.state)
            .photos
            .iter()
            .filter(|p| p.report_id == report_id)
            .cloned()
            .collect();
        photos.sort_by_key(|p| p.position);
        photos
    }

    /// Inserts and deletes attempted so far, successful or not
    pub fn write_count(&self) -> usize {
        lock(&self.state).writes
    }

    fn check(state: &StoreState, failure: StoreFailure) -> Result<()> {
        if state.failures.contains(&failure) {
            Err(AppError::Internal(format!("injected {:?} failure", failure)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn find_organisation_by_slug(&self, slug: &str) -> Result<Option<Organisation>> {
        Ok(lock(&self.state)
            .organisations
            .iter()
            .find(|o| o.slug == slug)
            .cloned())
    }

    async fn find_active_site(
        &self,
        organisation_id: Uuid,
        site_number: &str,
    ) -> Result<Option<Site>> {
        Ok(lock(&self.state)
            .sites
            .iter()
            .find(|s| s.organisation_id == organisation_id && s.site_number == site_number)
            .cloned())
    }

    async fn insert_report(&self, report: &CreateDailyReport) -> Result<DailyReport> {
        let mut state = lock(&self.state);
        state.writes += 1;
        Self::check(&state, StoreFailure::InsertReport)?;

        let row = DailyReport {
            id: Uuid::new_v4(),
            organisation_id: report.organisation_id,
            site_id: report.site_id,
            site_identifier: report.site_identifier.clone(),
            crew_name: report.crew_name.clone(),
            summary: report.summary.clone(),
            finished_plan: report.finished_plan,
            not_finished_why: report.not_finished_why.clone(),
            catchup_plan: report.catchup_plan.clone(),
            site_left_clean: report.site_left_clean,
            site_left_clean_notes: report.site_left_clean_notes.clone(),
            created_at: Utc::now(),
        };
        state.reports.push(row.clone());
        Ok(row)
    }

    async fn delete_report(&self, report_id: Uuid) -> Result<()> {
        let mut state = lock(&self.state);
        state.writes += 1;
        Self::check(&state, StoreFailure::DeleteReport)?;

        state.reports.retain(|r| r.id != report_id);
        state.photos.retain(|p| p.report_id != report_id);
        Ok(())
    }

    async fn insert_photos(&self, photos: &[CreateReportPhoto]) -> Result<Vec<ReportPhoto>> {
        let mut state = lock(&self.state);
        state.writes += 1;
        Self::check(&state, StoreFailure::InsertPhotos)?;

        let rows: Vec<ReportPhoto> = photos
            .iter()
            .map(|p| ReportPhoto {
                id: Uuid::new_v4(),
                report_id: p.report_id,
                storage_path: p.storage_path.clone(),
                position: p.position,
                created_at: Utc::now(),
            })
            .collect();
        state.photos.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn delete_photos(&self, report_id: Uuid) -> Result<()> {
        let mut state = lock(&self.state);
        state.writes += 1;
        Self::check(&state, StoreFailure::DeletePhotos)?;

        state.photos.retain(|p| p.report_id != report_id);
        Ok(())
    }
}

#[derive(Default)]
struct BlobState {
    objects: BTreeMap<String, (Vec<u8>, String)>,
    upload_calls: usize,
    sign_calls: usize,
    fail_upload_at: Option<usize>,
    fail_sign_at: Option<usize>,
    fail_all_signing: bool,
    fail_deletes: bool,
    upload_delay: Option<Duration>,
}

#[derive(Default)]
pub struct InMemoryBlobStore {
    state: Mutex<BlobState>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `n`-th upload call (1-based)
    pub fn fail_upload_at(&self, n: usize) {
        lock(&self.state).fail_upload_at = Some(n);
    }

    /// Fails the `n`-th signing call (1-based)
    pub fn fail_signing_at(&self, n: usize) {
        lock(&self.state).fail_sign_at = Some(n);
    }

    pub fn fail_all_signing(&self) {
        lock(&self.state).fail_all_signing = true;
    }

    pub fn fail_deletes(&self) {
        lock(&self.state).fail_deletes = true;
    }

    /// Every upload sleeps for `delay` before it completes or fails
    pub fn with_upload_delay(self, delay: Duration) -> Self {
        lock(&self.state).upload_delay = Some(delay);
        self
    }

    pub fn keys(&self) -> Vec<String> {
        lock(&self.state).objects.keys().cloned().collect()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        lock(&self.state)
            .objects
            .get(key)
            .map(|(_, content_type)| content_type.clone())
    }

    pub fn upload_calls(&self) -> usize {
        lock(&self.state).upload_calls
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let (fail, delay) = {
            let mut state = lock(&self.state);
            state.upload_calls += 1;
            (state.fail_upload_at == Some(state.upload_calls), state.upload_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(AppError::Storage(format!("injected upload failure for '{}'", key)));
        }

        let mut state = lock(&self.state);
        if state.objects.contains_key(key) {
            return Err(AppError::Storage(format!(
                "Refusing to overwrite existing file '{}'",
                key
            )));
        }

        state
            .objects
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        let mut state = lock(&self.state);
        if state.fail_deletes {
            return Err(AppError::Storage("injected delete failure".to_string()));
        }

        for key in keys {
            state.objects.remove(key);
        }
        Ok(())
    }

    async fn create_signed_url(&self, key: &str, ttl_secs: u32) -> Result<String> {
        let mut state = lock(&self.state);
        state.sign_calls += 1;

        if state.fail_all_signing || state.fail_sign_at == Some(state.sign_calls) {
            return Err(AppError::Storage(format!("injected signing failure for '{}'", key)));
        }

        Ok(format!(
            "https://blob.test/daily-reports/{}?X-Amz-Expires={}&X-Amz-Signature=test",
            key, ttl_secs
        ))
    }
}

#[derive(Default)]
struct NotifierState {
    sent: Vec<OutgoingEmail>,
    fail_with: Option<String>,
    panic_on_send: bool,
}

#[derive(Default)]
pub struct RecordingNotifier {
    state: Mutex<NotifierState>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, message: &str) {
        lock(&self.state).fail_with = Some(message.to_string());
    }

    pub fn panic_on_send(&self) {
        lock(&self.state).panic_on_send = true;
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        lock(&self.state).sent.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &OutgoingEmail) -> Result<String> {
        let (fail_with, panic_on_send) = {
            let state = lock(&self.state);
            (state.fail_with.clone(), state.panic_on_send)
        };

        if panic_on_send {
            panic!("notifier exploded");
        }
        if let Some(message) = fail_with {
            return Err(AppError::ExternalService(message));
        }

        lock(&self.state).sent.push(email.clone());
        Ok(format!("msg_{}", Uuid::new_v4().simple()))
    }
}
