use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::daily_reports::models::{
    CreateDailyReport, CreateReportPhoto, DailyReport, Organisation, ReportPhoto, Site,
};

/// Row operations the submission flow needs from the relational store.
///
/// No operation spans more than one statement; callers compensate explicitly.
#[async_trait]
pub trait ReportStore: Send + Sync + 'static {
    async fn find_organisation_by_slug(&self, slug: &str) -> Result<Option<Organisation>>;

    async fn find_active_site(&self, organisation_id: Uuid, site_number: &str)
        -> Result<Option<Site>>;

    async fn insert_report(&self, report: &CreateDailyReport) -> Result<DailyReport>;

    async fn delete_report(&self, report_id: Uuid) -> Result<()>;

    /// Inserts every row in one statement, so either all rows land or none do.
    async fn insert_photos(&self, photos: &[CreateReportPhoto]) -> Result<Vec<ReportPhoto>>;

    async fn delete_photos(&self, report_id: Uuid) -> Result<()>;
}

/// Postgres-backed [`ReportStore`]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn find_organisation_by_slug(&self, slug: &str) -> Result<Option<Organisation>> {
        let organisation = sqlx::query_as::<_, Organisation>(
            r#"
            SELECT id, slug FROM organisations
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organisation)
    }

    async fn find_active_site(
        &self,
        organisation_id: Uuid,
        site_number: &str,
    ) -> Result<Option<Site>> {
        let site = sqlx::query_as::<_, Site>(
            r#"
            SELECT id, organisation_id, site_number FROM sites
            WHERE organisation_id = $1 AND site_number = $2 AND is_active = TRUE
            "#,
        )
        .bind(organisation_id)
        .bind(site_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(site)
    }

    async fn insert_report(&self, report: &CreateDailyReport) -> Result<DailyReport> {
        let created = sqlx::query_as::<_, DailyReport>(
            r#"
            INSERT INTO daily_reports (
                organisation_id, site_id, site_identifier, crew_name, summary,
                finished_plan, not_finished_why, catchup_plan,
                site_left_clean, site_left_clean_notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(report.organisation_id)
        .bind(report.site_id)
        .bind(&report.site_identifier)
        .bind(&report.crew_name)
        .bind(&report.summary)
        .bind(report.finished_plan)
        .bind(&report.not_finished_why)
        .bind(&report.catchup_plan)
        .bind(report.site_left_clean)
        .bind(&report.site_left_clean_notes)
        .fetch_one(&self.pool)
        .await?;

        debug!("Daily report row created: id={}", created.id);
        Ok(created)
    }

    async fn delete_report(&self, report_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM daily_reports WHERE id = $1")
            .bind(report_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_photos(&self, photos: &[CreateReportPhoto]) -> Result<Vec<ReportPhoto>> {
        if photos.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO daily_report_photos (report_id, storage_path, position) ");
        builder.push_values(photos, |mut row, photo| {
            row.push_bind(photo.report_id)
                .push_bind(&photo.storage_path)
                .push_bind(photo.position);
        });
        builder.push(" RETURNING *");

        let mut rows = builder
            .build_query_as::<ReportPhoto>()
            .fetch_all(&self.pool)
            .await?;
        rows.sort_by_key(|row| row.position);

        Ok(rows)
    }

    async fn delete_photos(&self, report_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM daily_report_photos WHERE report_id = $1")
            .bind(report_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
