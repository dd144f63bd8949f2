//! Authenticated Twilio REST client
//!
//! Each client instance is bound to one account and sends that account's
//! SID/token as HTTP basic credentials on every request. List endpoints are
//! consumed through lazy pagination streams that follow `next_page_uri`
//! cursors until exhausted; a fresh stream is produced per query and never
//! shared across queries.
//!
//! Only rate-limit responses (429) are retried, honoring the provider's
//! `Retry-After` interval, for at most [`MAX_ATTEMPTS`] total attempts.
//! Authentication failures are never retried.

use crate::wire::{CallsPage, EventsPage, MessagesPage, NumbersPage, Page};
use futures::stream::Stream;
use futures::{StreamExt, TryStreamExt, pin_mut};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use twilens_core::error::{ApiError, ApiErrorKind, Result};
use twilens_core::types::{
    Account, AccountSid, ActivityRecord, AuthToken, CallEvent, DateRange, ISOTimestamp,
    MessageDetail, NumberConfig, OwnedNumber, PhoneNumber,
};

/// Production API root
pub const DEFAULT_API_ROOT: &str = "https://api.twilio.com";

/// REST API version segment
const API_VERSION: &str = "2010-04-01";

/// Records requested per page on search endpoints
const PAGE_SIZE: u32 = 100;

/// Total attempts for a rate-limited request (initial + retries)
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff when the provider sends no Retry-After header
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Both directional result sets for one queried number, not yet deduplicated
#[derive(Debug, Clone, Default)]
pub struct DirectionalResults {
    /// Records where the queried number is the destination
    pub to: Vec<ActivityRecord>,
    /// Records where the queried number is the origin
    pub from: Vec<ActivityRecord>,
}

impl DirectionalResults {
    /// Combined record count across both directions
    pub fn total(&self) -> usize {
        self.to.len() + self.from.len()
    }
}

/// REST client bound to one account's credentials
pub struct TwilioClient {
    http: reqwest::Client,
    api_root: String,
    sid: AccountSid,
    token: AuthToken,
}

impl TwilioClient {
    /// Create a client for the production API
    pub fn new(account: &Account) -> Result<Self> {
        Self::with_api_root(account, DEFAULT_API_ROOT)
    }

    /// Create a client against an alternate API root (used by tests)
    pub fn with_api_root(account: &Account, api_root: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_root: api_root.into(),
            sid: account.sid.clone(),
            token: account.token.clone(),
        })
    }

    fn resource_url(&self, resource: &str) -> String {
        format!(
            "{}/{}/Accounts/{}/{resource}",
            self.api_root, API_VERSION, self.sid
        )
    }

    /// Issue one GET, retrying only on 429 within the attempt budget
    async fn get_with_retry(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<reqwest::Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("GET {url} (attempt {attempt})");

            let mut request = self
                .http
                .get(url)
                .basic_auth(self.sid.as_str(), Some(self.token.secret()));
            if !query.is_empty() {
                request = request.query(query);
            }

            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            match status {
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                    return Err(ApiError::new(
                        ApiErrorKind::Auth,
                        format!("HTTP {status}: credentials rejected"),
                    )
                    .into());
                }
                reqwest::StatusCode::NOT_FOUND => {
                    return Err(
                        ApiError::new(ApiErrorKind::NotFound, format!("HTTP {status}")).into(),
                    );
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(ApiError::new(
                            ApiErrorKind::RateLimited,
                            format!("HTTP 429 after {attempt} attempts"),
                        )
                        .into());
                    }
                    let backoff = retry_after(response.headers()).unwrap_or(DEFAULT_BACKOFF);
                    warn!("rate limited, retrying in {backoff:?}");
                    tokio::time::sleep(backoff).await;
                }
                _ => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ApiError::new(
                        ApiErrorKind::Unknown,
                        format!("HTTP {status}: {body}"),
                    )
                    .into());
                }
            }
        }
    }

    /// GET a URL and decode its JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let response = self.get_with_retry(url, query).await?;
        Ok(response.json().await?)
    }

    /// Lazily yield every raw record of a paginated resource
    ///
    /// The first request carries the query parameters; follow-up pages come
    /// from the provider's `next_page_uri`, which already encodes them.
    fn pages<'a, P>(
        &'a self,
        resource: &str,
        query: Vec<(String, String)>,
    ) -> impl Stream<Item = Result<P::Item>> + 'a
    where
        P: Page + DeserializeOwned,
        <P as Page>::Item: 'a,
    {
        let mut url = self.resource_url(resource);
        async_stream::try_stream! {
            let mut query = Some(query);
            loop {
                let page: P = match query.take() {
                    Some(params) => self.get_json(&url, &params).await?,
                    None => self.get_json(&url, &[]).await?,
                };
                let next = page
                    .next_page_uri()
                    .map(|uri| format!("{}{uri}", self.api_root));
                for item in page.into_items() {
                    yield item;
                }
                match next {
                    Some(next_url) => url = next_url,
                    None => break,
                }
            }
        }
    }

    /// Search calls involving a number over a date range
    ///
    /// Issues one fully-paginated query per direction and returns both raw
    /// result sets; blending and deduplication belong to the aggregator.
    pub async fn search_calls(
        &self,
        number: &PhoneNumber,
        range: &DateRange,
    ) -> Result<DirectionalResults> {
        let to = self
            .collect_records::<CallsPage>("Calls.json", call_query("To", number, range))
            .await?;
        let from = self
            .collect_records::<CallsPage>("Calls.json", call_query("From", number, range))
            .await?;
        debug!(
            "fetched {} to-direction and {} from-direction calls",
            to.len(),
            from.len()
        );
        Ok(DirectionalResults { to, from })
    }

    /// Search messages involving a number over a date range
    pub async fn search_messages(
        &self,
        number: &PhoneNumber,
        range: &DateRange,
    ) -> Result<DirectionalResults> {
        let to = self
            .collect_records::<MessagesPage>("Messages.json", message_query("To", number, range))
            .await?;
        let from = self
            .collect_records::<MessagesPage>("Messages.json", message_query("From", number, range))
            .await?;
        debug!(
            "fetched {} to-direction and {} from-direction messages",
            to.len(),
            from.len()
        );
        Ok(DirectionalResults { to, from })
    }

    async fn collect_records<P>(
        &self,
        resource: &str,
        query: Vec<(String, String)>,
    ) -> Result<Vec<ActivityRecord>>
    where
        P: Page + DeserializeOwned,
        P::Item: IntoRecord,
    {
        let stream = self.pages::<P>(resource, query).filter_map(|result| {
            futures::future::ready(match result {
                Ok(raw) => match raw.into_record() {
                    Some(record) => Some(Ok(record)),
                    None => {
                        warn!("skipping record with unparseable timestamp");
                        None
                    }
                },
                Err(e) => Some(Err(e)),
            })
        });
        pin_mut!(stream);
        stream.try_collect().await
    }

    /// All phone numbers owned by the account
    pub async fn list_numbers(&self) -> Result<Vec<OwnedNumber>> {
        let stream = self.pages::<NumbersPage>("IncomingPhoneNumbers.json", Vec::new());
        pin_mut!(stream);
        stream.try_collect().await
    }

    /// Configuration snapshot for one owned number, by number SID
    pub async fn number_config(&self, number_sid: &str) -> Result<NumberConfig> {
        let url = self.resource_url(&format!("IncomingPhoneNumbers/{number_sid}.json"));
        self.get_json(&url, &[]).await
    }

    /// Event trail for one call, by call SID
    pub async fn call_events(&self, call_sid: &str) -> Result<Vec<CallEvent>> {
        let url = self.resource_url(&format!("Calls/{call_sid}/Events.json"));
        let page: EventsPage = self.get_json(&url, &[]).await?;
        Ok(page.events)
    }

    /// Full detail for one message, by message SID
    pub async fn message_detail(&self, message_sid: &str) -> Result<MessageDetail> {
        let url = self.resource_url(&format!("Messages/{message_sid}.json"));
        self.get_json(&url, &[]).await
    }

    /// Most recent activity involving a number, across both kinds and both
    /// directions
    ///
    /// The provider returns records newest-first, so four single-record
    /// queries are enough to pin down the latest timestamp; `None` means no
    /// activity was ever recorded.
    pub async fn last_activity(&self, number: &PhoneNumber) -> Result<Option<ISOTimestamp>> {
        let mut latest: Option<ISOTimestamp> = None;

        for direction_key in ["To", "From"] {
            let query = head_query(direction_key, number);
            let page: CallsPage = self
                .get_json(&self.resource_url("Calls.json"), &query)
                .await?;
            let head = page
                .into_items()
                .into_iter()
                .next()
                .and_then(|raw| raw.into_record());
            if let Some(record) = head {
                latest = latest.max(Some(record.timestamp));
            }

            let page: MessagesPage = self
                .get_json(&self.resource_url("Messages.json"), &query)
                .await?;
            let head = page
                .into_items()
                .into_iter()
                .next()
                .and_then(|raw| raw.into_record());
            if let Some(record) = head {
                latest = latest.max(Some(record.timestamp));
            }
        }

        Ok(latest)
    }
}

/// Raw wire records that convert into domain activity records
trait IntoRecord {
    fn into_record(self) -> Option<ActivityRecord>;
}

impl IntoRecord for crate::wire::RawCall {
    fn into_record(self) -> Option<ActivityRecord> {
        crate::wire::RawCall::into_record(self)
    }
}

impl IntoRecord for crate::wire::RawMessage {
    fn into_record(self) -> Option<ActivityRecord> {
        crate::wire::RawMessage::into_record(self)
    }
}

fn call_query(
    direction_key: &str,
    number: &PhoneNumber,
    range: &DateRange,
) -> Vec<(String, String)> {
    vec![
        (direction_key.to_string(), number.as_str().to_string()),
        (
            "StartTime>".to_string(),
            range.since.format("%Y-%m-%d").to_string(),
        ),
        (
            "StartTime<".to_string(),
            range.exclusive_end().format("%Y-%m-%d").to_string(),
        ),
        ("PageSize".to_string(), PAGE_SIZE.to_string()),
    ]
}

fn message_query(
    direction_key: &str,
    number: &PhoneNumber,
    range: &DateRange,
) -> Vec<(String, String)> {
    vec![
        (direction_key.to_string(), number.as_str().to_string()),
        (
            "DateSent>".to_string(),
            range.since.format("%Y-%m-%d").to_string(),
        ),
        (
            "DateSent<".to_string(),
            range.exclusive_end().format("%Y-%m-%d").to_string(),
        ),
        ("PageSize".to_string(), PAGE_SIZE.to_string()),
    ]
}

fn head_query(direction_key: &str, number: &PhoneNumber) -> Vec<(String, String)> {
    vec![
        (direction_key.to_string(), number.as_str().to_string()),
        ("PageSize".to_string(), "1".to_string()),
    ]
}

/// Parse a Retry-After header given in whole seconds
fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
