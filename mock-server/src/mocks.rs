use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::model::{MockApi, METHODS};
use crate::{now, paging, AppError, Db, Message, Page};

const NOT_FOUND: &str = "Mock API not found";

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub is_active: Option<bool>,
    pub method: Option<String>,
    pub search: Option<String>,
    /// 0 selects mocks without a category.
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMock {
    pub name: String,
    pub description: Option<String>,
    pub method: String,
    pub path: String,
    #[serde(default = "default_status")]
    pub status_code: u16,
    pub response_headers: Option<HashMap<String, String>>,
    pub response_body: Option<serde_json::Value>,
    pub response_template: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub category_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMock {
    pub name: Option<String>,
    pub description: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub status_code: Option<u16>,
    pub response_headers: Option<HashMap<String, String>>,
    pub response_body: Option<serde_json::Value>,
    pub response_template: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Option<i64>,
}

fn default_status() -> u16 {
    200
}

fn default_active() -> bool {
    true
}

fn check_method(method: &str) -> Result<String, AppError> {
    let upper = method.to_ascii_uppercase();
    if METHODS.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(AppError::unprocessable(format!("unsupported method: {method}")))
    }
}

impl ListParams {
    fn matches(&self, mock: &MockApi) -> bool {
        if self.is_active.is_some_and(|active| mock.is_active != active) {
            return false;
        }
        if let Some(method) = self.method.as_deref().filter(|m| !m.is_empty()) {
            if !mock.method.eq_ignore_ascii_case(method) {
                return false;
            }
        }
        if let Some(term) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !mock.name.contains(term) && !mock.path.contains(term) {
                return false;
            }
        }
        match self.category_id {
            Some(0) => mock.category_id.is_none(),
            Some(id) => mock.category_id == Some(id),
            None => true,
        }
    }
}

pub async fn list(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<MockApi>>, AppError> {
    let (page, size) = paging(params.page, params.size)?;
    let store = db.read().await;
    let matching: Vec<MockApi> = store
        .mocks
        .values()
        .filter(|m| params.matches(m))
        .cloned()
        .collect();
    Ok(Json(Page::slice(matching, page, size)))
}

pub async fn create(
    State(db): State<Db>,
    Json(input): Json<CreateMock>,
) -> Result<Json<MockApi>, AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::unprocessable("name must not be empty"));
    }
    let method = check_method(&input.method)?;
    let mut store = db.write().await;
    if let Some(category_id) = input.category_id {
        if store.active_category(category_id).is_none() {
            return Err(AppError::bad_request(format!("Category {category_id} does not exist")));
        }
    }
    let id = store.next_mock_id();
    let ts = now();
    let mock = MockApi {
        id,
        name: input.name,
        description: input.description,
        method,
        path: input.path,
        status_code: input.status_code,
        response_headers: input.response_headers,
        response_body: input.response_body,
        response_template: input.response_template,
        is_active: input.is_active,
        version: 1,
        category_id: input.category_id,
        created_at: ts.clone(),
        updated_at: ts,
    };
    tracing::info!(id, method = %mock.method, path = %mock.path, "mock created");
    store.mocks.insert(id, mock.clone());
    Ok(Json(mock))
}

pub async fn get(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<MockApi>, AppError> {
    let store = db.read().await;
    store.mocks.get(&id).cloned().map(Json).ok_or_else(|| AppError::not_found(NOT_FOUND))
}

/// Apply the fields present in the body and bump `version`.
pub async fn update(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateMock>,
) -> Result<Json<MockApi>, AppError> {
    let method = input.method.as_deref().map(check_method).transpose()?;
    let mut store = db.write().await;
    let mock = store.mocks.get_mut(&id).ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    if let Some(name) = input.name {
        mock.name = name;
    }
    if let Some(description) = input.description {
        mock.description = Some(description);
    }
    if let Some(method) = method {
        mock.method = method;
    }
    if let Some(path) = input.path {
        mock.path = path;
    }
    if let Some(status_code) = input.status_code {
        mock.status_code = status_code;
    }
    if let Some(headers) = input.response_headers {
        mock.response_headers = Some(headers);
    }
    if let Some(body) = input.response_body {
        mock.response_body = Some(body);
    }
    if let Some(template) = input.response_template {
        mock.response_template = Some(template);
    }
    if let Some(active) = input.is_active {
        mock.is_active = active;
    }
    if let Some(category_id) = input.category_id {
        mock.category_id = Some(category_id);
    }
    mock.version += 1;
    mock.updated_at = now();
    Ok(Json(mock.clone()))
}

pub async fn delete(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Message>, AppError> {
    let mut store = db.write().await;
    store.mocks.remove(&id).ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    tracing::info!(id, "mock deleted");
    Ok(Message::new("Deleted"))
}

pub async fn toggle(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<MockApi>, AppError> {
    let mut store = db.write().await;
    let mock = store.mocks.get_mut(&id).ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    mock.is_active = !mock.is_active;
    mock.updated_at = now();
    Ok(Json(mock.clone()))
}
