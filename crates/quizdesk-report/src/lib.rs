//! quizdesk-report: renders scenario run reports for people.

pub mod html;

pub use html::{generate_html, write_html_report};
