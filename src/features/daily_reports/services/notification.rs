//! Notification email for a newly submitted daily report.
//!
//! The body is rendered from an embedded Jinja template with HTML
//! auto-escaping, so crew-supplied text can never inject markup.

use minijinja::{context, AutoEscape, Environment};
use std::sync::OnceLock;

use crate::core::error::{AppError, Result};
use crate::features::daily_reports::dtos::{Cleanliness, PlanProgress};
use crate::modules::notifier::OutgoingEmail;
use crate::shared::constants::SIGNED_URL_TTL_SECS;

const DAILY_REPORT_TEMPLATE: &str = "daily_report.html";

static EMAIL_ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn environment() -> &'static Environment<'static> {
    EMAIL_ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        if let Err(e) = env.add_template(
            DAILY_REPORT_TEMPLATE,
            include_str!("../../../../templates/emails/daily_report.html"),
        ) {
            tracing::error!("Failed to load email template {}: {}", DAILY_REPORT_TEMPLATE, e);
        }
        env
    })
}

/// Everything the notification email says about one submission
#[derive(Debug)]
pub struct DailyReportEmail<'a> {
    pub report_id: String,
    pub org_slug: &'a str,
    pub crew_name: &'a str,
    pub site_number: &'a str,
    pub summary: &'a str,
    pub progress: &'a PlanProgress,
    pub cleanliness: &'a Cleanliness,
    /// Signed links that could be generated, in upload order
    pub photo_links: &'a [String],
    /// Photos durably stored, whether or not a link exists for them
    pub photo_count: usize,
}

impl DailyReportEmail<'_> {
    pub fn subject(&self) -> String {
        format!("Daily report: {} – {}", self.site_number, self.crew_name)
    }

    pub fn render_html(&self) -> Result<String> {
        let (not_finished_why, catchup_plan) = match self.progress {
            PlanProgress::Finished => (None, None),
            PlanProgress::NotFinished { why, catchup_plan } => {
                (Some(why.as_str()), Some(catchup_plan.as_str()))
            }
        };

        let template = environment()
            .get_template(DAILY_REPORT_TEMPLATE)
            .map_err(|e| AppError::Internal(format!("Email template unavailable: {}", e)))?;

        template
            .render(context! {
                report_id => &self.report_id,
                org_slug => self.org_slug,
                crew_name => self.crew_name,
                site_number => self.site_number,
                summary => self.summary,
                finished => self.progress.is_finished(),
                not_finished_why => not_finished_why,
                catchup_plan => catchup_plan,
                cleanliness => self.cleanliness.describe(),
                photo_links => self.photo_links,
                photo_count => self.photo_count,
                link_expiry_days => SIGNED_URL_TTL_SECS / 86_400,
            })
            .map_err(|e| AppError::Internal(format!("Failed to render email: {}", e)))
    }

    pub fn into_email(self, from: &str, to: &str) -> Result<OutgoingEmail> {
        Ok(OutgoingEmail {
            from: from.to_string(),
            to: vec![to.to_string()],
            subject: self.subject(),
            html: self.render_html()?,
        })
    }
}
