//! HTTP client for the East Money portfolio API.
//!
//! Every endpoint is a GET on the same base URL, selected by the `type` query
//! parameter. Responses are JSON envelopes whose `result` is `"0"` on success.

use crate::config::CrawlerSettings;
use crate::domain::model::{RankEntry, RankType};
use crate::utils::error::{CrawlerError, Result};
use futures_util::future::join_all;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("rank-crawler/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    retry_attempts: u32,
    retry_delay: Duration,
    holdings_timeout: Duration,
}

impl ApiClient {
    pub fn new(settings: &CrawlerSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.request_timeout())
            .pool_max_idle_per_host(30)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            retry_attempts: settings.retry_attempts.max(1),
            retry_delay: settings.retry_delay(),
            holdings_timeout: settings.holdings_timeout(),
        })
    }

    /// Sends the query up to `retry_attempts` times, sleeping `retry_delay`
    /// between failed attempts. Returns the last failure when all attempts fail.
    pub async fn fetch_with_retry(&self, params: &[(&str, String)]) -> Result<Value> {
        let mut last_error = None;

        for attempt in 0..self.retry_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry_delay).await;
            }

            match self.request_once(params, None).await {
                Ok(envelope) => return Ok(envelope),
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Request failed (attempt {}/{}): {}",
                        attempt + 1,
                        self.retry_attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CrawlerError::ApiError {
            message: "no attempt was made".to_string(),
        }))
    }

    async fn request_once(
        &self,
        params: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let mut request = self.client.get(&self.base_url).query(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlerError::HttpStatusError {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let envelope: Value = serde_json::from_str(&text).map_err(|_| CrawlerError::ApiError {
            message: format!(
                "unparseable response: {}",
                text.chars().take(100).collect::<String>()
            ),
        })?;
        check_envelope(envelope)
    }

    /// Fetches one leaderboard page by page until `target` rows are collected,
    /// a page comes back short or empty, or a page fails.
    pub async fn fetch_rank_board(
        &self,
        rank_type: RankType,
        target: usize,
        page_size: usize,
    ) -> Vec<RankEntry> {
        let page_size = page_size.max(1);
        let mut raw_items: Vec<Value> = Vec::new();
        let mut page = 0usize;

        while raw_items.len() < target {
            let count = page_size.min(target - raw_items.len());
            let params = [
                ("type", "rt_get_rank".to_string()),
                ("rankType", rank_type.api_code().to_string()),
                ("recIdx", page.to_string()),
                ("recCnt", count.to_string()),
                ("rankid", "0".to_string()),
            ];

            let items = match self.fetch_with_retry(&params).await {
                Ok(envelope) => data_array(envelope),
                Err(e) => {
                    tracing::warn!("⚠️ {} page {} failed, stopping: {}", rank_type, page, e);
                    break;
                }
            };
            if items.is_empty() {
                break;
            }

            let received = items.len();
            raw_items.extend(items);
            page += 1;

            // 回傳筆數少於請求數代表已到底
            if received < count {
                break;
            }
        }

        raw_items.truncate(target);
        raw_items
            .into_iter()
            .filter_map(|raw| RankEntry::from_raw(raw, 0, rank_type))
            .enumerate()
            .map(|(index, mut entry)| {
                entry.rank = index + 1;
                entry
            })
            .collect()
    }

    /// Fetches every board concurrently; boards with no rows are left out.
    pub async fn fetch_all_boards(
        &self,
        target: usize,
        page_size: usize,
    ) -> Vec<(RankType, Vec<RankEntry>)> {
        let fetches = RankType::ALL.into_iter().map(|rank_type| async move {
            let entries = self.fetch_rank_board(rank_type, target, page_size).await;
            tracing::debug!("📋 {} returned {} rows", rank_type.label(), entries.len());
            (rank_type, entries)
        });

        join_all(fetches)
            .await
            .into_iter()
            .filter(|(_, entries)| !entries.is_empty())
            .collect()
    }

    /// Recent position changes of one portfolio. Single attempt, short timeout.
    pub async fn fetch_hold_changes(&self, portfolio_id: &str, rec_count: usize) -> Result<Vec<Value>> {
        let params = [
            ("type", "rt_hold_change72".to_string()),
            ("zh", portfolio_id.to_string()),
            ("recIdx", "1".to_string()),
            ("recCnt", rec_count.to_string()),
        ];
        let envelope = self.request_once(&params, Some(self.holdings_timeout)).await?;
        Ok(data_array(envelope))
    }

    /// Raw `data` object of a portfolio detail response.
    pub async fn fetch_portfolio_detail(&self, portfolio_id: &str) -> Result<Value> {
        let params = [
            ("type", "rt_zhuhe_detail72".to_string()),
            ("zh", portfolio_id.to_string()),
        ];
        let mut envelope = self.fetch_with_retry(&params).await?;
        match envelope.get_mut("data").map(Value::take) {
            Some(data @ Value::Object(_)) => Ok(data),
            _ => Err(CrawlerError::ApiError {
                message: format!("portfolio {} detail has no data", portfolio_id),
            }),
        }
    }
}

/// `result` may be `"0"` or `0`; anything else carries an upstream `message`.
fn check_envelope(envelope: Value) -> Result<Value> {
    let ok = match envelope.get("result") {
        Some(Value::String(s)) => s == "0",
        Some(Value::Number(n)) => n.as_i64() == Some(0),
        _ => false,
    };
    if ok {
        return Ok(envelope);
    }

    let message = envelope
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_string();
    Err(CrawlerError::ApiError { message })
}

fn data_array(mut envelope: Value) -> Vec<Value> {
    match envelope.get_mut("data").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}
