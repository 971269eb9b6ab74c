use super::models::{CalendarEvent, EventsResponse};
use super::time::day_bounds;
use super::token::StoredToken;
use crate::config::Config;
use crate::error::{calendar_query_error, config_error, BotResult};
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Read-only access to one calendar's events
#[derive(Debug, Clone)]
pub struct CalendarClient {
    client: Client,
    api_base: Url,
    calendar_id: String,
}

/// Build the HTTP client shared by the token and calendar calls
pub fn http_client(timeout: Duration) -> BotResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| config_error(&format!("Failed to build HTTP client: {}", e)))
}

impl CalendarClient {
    pub fn new(client: Client, api_base: &str, calendar_id: &str) -> BotResult<Self> {
        // Url::join drops the last segment unless the base ends with a slash
        let api_base = if api_base.ends_with('/') {
            api_base.to_string()
        } else {
            format!("{}/", api_base)
        };
        let api_base = Url::parse(&api_base)
            .map_err(|e| config_error(&format!("Invalid calendar API base: {}", e)))?;

        Ok(Self {
            client,
            api_base,
            calendar_id: calendar_id.to_string(),
        })
    }

    pub fn from_config(config: &Config, client: Client) -> BotResult<Self> {
        Self::new(client, &config.calendar_api_base, &config.google_calendar_id)
    }

    fn events_url(&self) -> BotResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| config_error("Calendar API base cannot be a base URL"))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }

    /// Events overlapping `day` (UTC), recurring events expanded, ordered by start
    pub async fn fetch_events_for_day(
        &self,
        session: &StoredToken,
        day: NaiveDate,
    ) -> BotResult<Vec<CalendarEvent>> {
        let (time_min, time_max) = day_bounds(day);
        let url = self.events_url()?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("timeMin", time_min.clone()),
                ("timeMax", time_max.clone()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("conferenceDataVersion", "1".to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self
                .client
                .get(url.clone())
                .query(&query)
                .bearer_auth(&session.access_token)
                .send()
                .await
                .map_err(|e| calendar_query_error(&format!("Failed to fetch events: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error response".to_string());
                return Err(calendar_query_error(&format!(
                    "Failed to fetch events: HTTP {} - {}",
                    status, error_body
                )));
            }

            let page: EventsResponse = response.json().await.map_err(|e| {
                calendar_query_error(&format!("Failed to parse events response: {}", e))
            })?;

            events.extend(page.items.into_iter().map(CalendarEvent::from));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!("Fetched {} events for {}", events.len(), day);
        Ok(events)
    }
}
