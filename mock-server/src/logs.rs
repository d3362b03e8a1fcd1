use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::model::RequestLog;
use crate::{paging, AppError, Db, Message, Page};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub mock_api_id: Option<i64>,
    pub method: Option<String>,
    pub status_code: Option<u16>,
    /// ISO-8601, inclusive.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TopApi {
    pub path: String,
    pub method: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Stats {
    pub total_requests: u64,
    pub today_requests: u64,
    pub success_rate: f64,
    pub avg_response_time: f64,
    pub top_apis: Vec<TopApi>,
    pub method_stats: HashMap<String, u64>,
    pub status_stats: HashMap<String, u64>,
}

impl ListParams {
    fn matches(&self, log: &RequestLog) -> bool {
        // 0 and empty strings mean "no filter"
        if let Some(id) = self.mock_api_id.filter(|&id| id != 0) {
            if log.mock_api_id != Some(id) {
                return false;
            }
        }
        if let Some(method) = self.method.as_deref().filter(|m| !m.is_empty()) {
            if log.request_method != method {
                return false;
            }
        }
        if let Some(status) = self.status_code.filter(|&s| s != 0) {
            if log.response_status_code != Some(status) {
                return false;
            }
        }
        if let Some(start) = self.start_date.as_deref().filter(|d| !d.is_empty()) {
            if log.created_at.as_str() < start {
                return false;
            }
        }
        if let Some(end) = self.end_date.as_deref().filter(|d| !d.is_empty()) {
            if log.created_at.as_str() > end {
                return false;
            }
        }
        true
    }
}

/// Newest first.
pub async fn list(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<RequestLog>>, AppError> {
    let (page, size) = paging(params.page, params.size)?;
    let store = db.read().await;
    let matching: Vec<RequestLog> = store
        .logs
        .iter()
        .rev()
        .filter(|l| params.matches(l))
        .cloned()
        .collect();
    Ok(Json(Page::slice(matching, page, size)))
}

pub async fn get(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<RequestLog>, AppError> {
    let store = db.read().await;
    store
        .logs
        .iter()
        .find(|l| l.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Log not found"))
}

pub async fn clear(State(db): State<Db>) -> Json<Message> {
    let mut store = db.write().await;
    let count = store.logs.len();
    store.logs.clear();
    tracing::info!(count, "logs cleared");
    Message::new(format!("Cleared {count} logs"))
}

pub async fn stats(State(db): State<Db>) -> Json<Stats> {
    let store = db.read().await;
    Json(compute_stats(&store.logs, &chrono::Utc::now().format("%Y-%m-%d").to_string()))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate `logs`; `today` is a `YYYY-MM-DD` prefix.
pub fn compute_stats(logs: &[RequestLog], today: &str) -> Stats {
    let total = logs.len() as u64;
    let today_requests = logs.iter().filter(|l| l.created_at.starts_with(today)).count() as u64;
    let success = logs
        .iter()
        .filter(|l| l.response_status_code.is_some_and(|s| (200..300).contains(&s)))
        .count();
    let success_rate = if total > 0 {
        round2(success as f64 / total as f64 * 100.0)
    } else {
        0.0
    };
    let timed: Vec<u64> = logs.iter().filter_map(|l| l.response_time_ms).collect();
    let avg_response_time = if timed.is_empty() {
        0.0
    } else {
        round2(timed.iter().sum::<u64>() as f64 / timed.len() as f64)
    };

    let mut per_api: Vec<((String, String), u64)> = Vec::new();
    let mut method_stats = HashMap::new();
    let mut status_stats = HashMap::new();
    for log in logs {
        let key = (log.request_path.clone(), log.request_method.clone());
        match per_api.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => per_api.push((key, 1)),
        }
        *method_stats.entry(log.request_method.clone()).or_insert(0) += 1;
        if let Some(status) = log.response_status_code {
            *status_stats.entry(status.to_string()).or_insert(0) += 1;
        }
    }
    // stable sort keeps first-seen order among equal counts
    per_api.sort_by(|a, b| b.1.cmp(&a.1));
    let top_apis = per_api
        .into_iter()
        .take(5)
        .map(|((path, method), count)| TopApi { path, method, count })
        .collect();

    Stats {
        total_requests: total,
        today_requests,
        success_rate,
        avg_response_time,
        top_apis,
        method_stats,
        status_stats,
    }
}
