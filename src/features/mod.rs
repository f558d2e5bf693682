pub mod daily_reports;
