use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::model::{Category, CategoryNode, CategoryView};
use crate::{now, AppError, Db, Message};

const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    /// 0 detaches the category from its parent.
    pub parent_id: Option<i64>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Stats {
    pub total_categories: u64,
    pub total_apis: u64,
    pub active_categories: u64,
    pub inactive_categories: u64,
}

#[derive(Debug, Deserialize)]
pub struct BatchUpdate {
    pub category_id: Option<i64>,
    pub mock_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub category_orders: Vec<CategoryOrder>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryOrder {
    pub id: i64,
    pub sort_order: i64,
}

fn check_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::unprocessable(format!(
            "name must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(format!("Category {id} does not exist"))
}

pub async fn list(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Json<Vec<CategoryView>> {
    let store = db.read().await;
    let views = store
        .sorted_active()
        .into_iter()
        .skip(params.skip)
        .take(params.limit)
        .map(|c| store.view(c))
        .collect();
    Json(views)
}

pub async fn tree(State(db): State<Db>) -> Json<Vec<CategoryNode>> {
    Json(db.read().await.tree())
}

pub async fn stats(State(db): State<Db>) -> Json<Stats> {
    let store = db.read().await;
    let total = store.categories.len() as u64;
    let active = store.categories.values().filter(|c| c.is_active).count() as u64;
    Json(Stats {
        total_categories: total,
        total_apis: store.mocks.len() as u64,
        active_categories: active,
        inactive_categories: total - active,
    })
}

pub async fn get(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<CategoryView>, AppError> {
    let store = db.read().await;
    let category = store.active_category(id).ok_or_else(|| not_found(id))?;
    Ok(Json(store.view(category)))
}

pub async fn create(
    State(db): State<Db>,
    Json(input): Json<CreateCategory>,
) -> Result<(StatusCode, Json<CategoryView>), AppError> {
    check_name(&input.name)?;
    let mut store = db.write().await;
    let parent_id = input.parent_id.filter(|&id| id != 0);
    if let Some(parent) = parent_id {
        if store.active_category(parent).is_none() {
            return Err(AppError::bad_request(format!("Parent category {parent} does not exist")));
        }
    }
    let duplicate = store
        .categories
        .values()
        .any(|c| c.is_active && c.parent_id == parent_id && c.name == input.name);
    if duplicate {
        return Err(AppError::bad_request(format!(
            "A category named '{}' already exists at this level",
            input.name
        )));
    }

    let id = store.next_category_id();
    let ts = now();
    let category = Category {
        id,
        name: input.name,
        description: input.description,
        parent_id,
        sort_order: input.sort_order,
        is_active: input.is_active,
        created_at: ts.clone(),
        updated_at: ts,
    };
    tracing::info!(id, name = %category.name, "category created");
    store.categories.insert(id, category.clone());
    Ok((StatusCode::CREATED, Json(store.view(&category))))
}

pub async fn update(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateCategory>,
) -> Result<Json<CategoryView>, AppError> {
    if let Some(name) = &input.name {
        check_name(name)?;
    }
    let mut store = db.write().await;
    if store.active_category(id).is_none() {
        return Err(not_found(id));
    }
    if let Some(parent) = input.parent_id {
        if parent == id {
            return Err(AppError::bad_request("A category cannot be its own parent"));
        }
        if parent != 0 && store.active_category(parent).is_none() {
            return Err(AppError::bad_request(format!("Parent category {parent} does not exist")));
        }
    }

    let category = store.categories.get_mut(&id).ok_or_else(|| not_found(id))?;
    if let Some(name) = input.name {
        category.name = name;
    }
    if let Some(description) = input.description {
        category.description = Some(description);
    }
    if let Some(parent) = input.parent_id {
        category.parent_id = (parent != 0).then_some(parent);
    }
    if let Some(sort_order) = input.sort_order {
        category.sort_order = sort_order;
    }
    if let Some(active) = input.is_active {
        category.is_active = active;
    }
    category.updated_at = now();
    let category = category.clone();
    Ok(Json(store.view(&category)))
}

/// Soft delete. Refused while the category has active children or mocks.
pub async fn delete(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    let mut store = db.write().await;
    if store.active_category(id).is_none() {
        return Err(not_found(id));
    }
    if store
        .categories
        .values()
        .any(|c| c.is_active && c.parent_id == Some(id))
    {
        return Err(AppError::bad_request("Category still has subcategories"));
    }
    let mocks = store.mock_count(id);
    if mocks > 0 {
        return Err(AppError::bad_request(format!(
            "Category still has {mocks} mock APIs, move them first"
        )));
    }
    if let Some(category) = store.categories.get_mut(&id) {
        category.is_active = false;
        category.updated_at = now();
    }
    tracing::info!(id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Move mocks into a category. A null or 0 `category_id` uncategorises them.
pub async fn batch_update_mocks(
    State(db): State<Db>,
    Json(input): Json<BatchUpdate>,
) -> Result<Json<Message>, AppError> {
    let mut store = db.write().await;
    let target = input.category_id.filter(|&id| id != 0);
    if let Some(id) = target {
        if store.active_category(id).is_none() {
            return Err(AppError::bad_request(format!("Category {id} does not exist")));
        }
    }
    let mut updated = 0usize;
    for id in &input.mock_ids {
        if let Some(mock) = store.mocks.get_mut(id) {
            mock.category_id = target;
            updated += 1;
        }
    }
    if updated == 0 {
        return Err(AppError::bad_request("Batch update failed"));
    }
    Ok(Message::new(format!(
        "Updated category of {} mock APIs",
        input.mock_ids.len()
    )))
}

pub async fn sort(State(db): State<Db>, Json(input): Json<SortRequest>) -> Json<Message> {
    let mut store = db.write().await;
    for order in input.category_orders {
        if let Some(category) = store.categories.get_mut(&order.id) {
            category.sort_order = order.sort_order;
        }
    }
    Message::new("Category order updated")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_is_checked() {
        assert!(check_name("").is_err());
        assert!(check_name(&"x".repeat(51)).is_err());
        assert!(check_name("Users").is_ok());
    }

    #[test]
    fn batch_accepts_null_category() {
        let input: BatchUpdate =
            serde_json::from_str(r#"{"category_id":null,"mock_ids":[1,2]}"#).unwrap();
        assert!(input.category_id.is_none());
        assert_eq!(input.mock_ids, vec![1, 2]);
    }

    #[test]
    fn list_params_default_to_first_hundred() {
        let params: ListParams = serde_json::from_str("{}").unwrap();
        assert_eq!((params.skip, params.limit), (0, 100));
    }
}
