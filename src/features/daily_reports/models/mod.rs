mod daily_report;
mod organisation;
mod report_photo;
mod site;

pub use daily_report::{CreateDailyReport, DailyReport};
pub use organisation::Organisation;
pub use report_photo::{CreateReportPhoto, ReportPhoto};
pub use site::Site;
