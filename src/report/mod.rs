pub mod console;
pub mod junit;
pub mod report_model;

pub use console::format_console_report;
pub use junit::generate_junit_xml;
pub use report_model::{CheckReport, SubmissionResult};
