mod notification;
mod report_store;
mod submission_service;

pub use report_store::{PgReportStore, ReportStore};
pub use submission_service::{ReportSubmissionService, SubmissionSettings};
