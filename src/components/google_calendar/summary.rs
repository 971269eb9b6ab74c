use super::client::CalendarClient;
use super::format::format_event;
use super::token::CredentialStore;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use rust_i18n::t;
use std::sync::Arc;
use tracing::info;

use crate::error::BotResult;

/// Reply produced for a "show today" action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaySummary {
    NoEvents,
    Classes(Vec<String>),
}

impl DaySummary {
    /// Final message text
    pub fn render(&self) -> String {
        match self {
            DaySummary::NoEvents => t!("no_classes_today").to_string(),
            DaySummary::Classes(blocks) => {
                let mut message = t!("summary_header").to_string();
                message.push_str("\n\n");
                for block in blocks {
                    message.push_str(block);
                }
                message
            }
        }
    }

    /// Whether the text carries bold markup the chat layer must render
    pub fn is_rich(&self) -> bool {
        matches!(self, DaySummary::Classes(_))
    }
}

/// Runs credentials, query and formatting for one day
pub struct SummaryBuilder {
    credentials: Arc<CredentialStore>,
    calendar: CalendarClient,
    timezone: Tz,
}

impl SummaryBuilder {
    pub fn new(credentials: Arc<CredentialStore>, calendar: CalendarClient, timezone: Tz) -> Self {
        Self {
            credentials,
            calendar,
            timezone,
        }
    }

    /// Summary for the current UTC day
    pub async fn build_today_summary(&self) -> BotResult<DaySummary> {
        self.build_summary_for(Utc::now().date_naive()).await
    }

    pub async fn build_summary_for(&self, day: NaiveDate) -> BotResult<DaySummary> {
        let session = self.credentials.acquire_session().await?;
        let events = self.calendar.fetch_events_for_day(&session, day).await?;
        info!("{} classes on {}", events.len(), day);

        if events.is_empty() {
            return Ok(DaySummary::NoEvents);
        }

        let blocks = events
            .iter()
            .map(|event| format_event(event, &self.timezone))
            .collect();
        Ok(DaySummary::Classes(blocks))
    }
}
