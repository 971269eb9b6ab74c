// Export components
pub mod google_calendar;

// Re-export the pieces the chat layer talks to
pub use google_calendar::{DaySummary, SummaryBuilder};
