use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

pub const METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MockApi {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub method: String,
    pub path: String,
    pub status_code: u16,
    pub response_headers: Option<HashMap<String, String>>,
    pub response_body: Option<serde_json::Value>,
    pub response_template: Option<String>,
    pub is_active: bool,
    pub version: i64,
    pub category_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A category as the API returns it, with derived fields.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CategoryView {
    #[serde(flatten)]
    pub category: Category,
    pub mock_count: u64,
    pub full_path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub view: CategoryView,
    pub children: Vec<CategoryNode>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RequestLog {
    pub id: i64,
    pub mock_api_id: Option<i64>,
    pub request_method: String,
    pub request_path: String,
    pub request_headers: Option<serde_json::Value>,
    pub request_body: Option<serde_json::Value>,
    pub request_params: Option<serde_json::Value>,
    pub response_status_code: Option<u16>,
    pub response_headers: Option<serde_json::Value>,
    pub response_body: Option<serde_json::Value>,
    pub response_time_ms: Option<u64>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
}

/// Everything the server knows. Ids are assigned from 1 and never reused.
#[derive(Debug, Default)]
pub struct Store {
    pub mocks: BTreeMap<i64, MockApi>,
    pub categories: BTreeMap<i64, Category>,
    pub logs: Vec<RequestLog>,
    last_mock_id: i64,
    last_category_id: i64,
    last_log_id: i64,
}

impl Store {
    pub fn next_mock_id(&mut self) -> i64 {
        self.last_mock_id += 1;
        self.last_mock_id
    }

    pub fn next_category_id(&mut self) -> i64 {
        self.last_category_id += 1;
        self.last_category_id
    }

    pub fn next_log_id(&mut self) -> i64 {
        self.last_log_id += 1;
        self.last_log_id
    }

    /// An active category by id. Soft-deleted categories are invisible.
    pub fn active_category(&self, id: i64) -> Option<&Category> {
        self.categories.get(&id).filter(|c| c.is_active)
    }

    pub fn mock_count(&self, category_id: i64) -> u64 {
        self.mocks
            .values()
            .filter(|m| m.category_id == Some(category_id))
            .count() as u64
    }

    /// Ancestor names joined with ` / `, ending with the category itself.
    pub fn full_path(&self, category: &Category) -> String {
        let mut names = vec![category.name.as_str()];
        let mut parent = category.parent_id;
        // bounded by the number of categories in case of a cycle
        for _ in 0..self.categories.len() {
            let Some(c) = parent.and_then(|id| self.categories.get(&id)) else {
                break;
            };
            names.push(c.name.as_str());
            parent = c.parent_id;
        }
        names.reverse();
        names.join(" / ")
    }

    pub fn view(&self, category: &Category) -> CategoryView {
        CategoryView {
            category: category.clone(),
            mock_count: self.mock_count(category.id),
            full_path: self.full_path(category),
        }
    }

    /// Active categories ordered by `sort_order`, then creation.
    pub fn sorted_active(&self) -> Vec<&Category> {
        let mut list: Vec<&Category> = self.categories.values().filter(|c| c.is_active).collect();
        list.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        list
    }

    /// Active categories nested under their parents. Children of inactive
    /// or missing parents are left out.
    pub fn tree(&self) -> Vec<CategoryNode> {
        let sorted = self.sorted_active();
        self.children_of(None, &sorted)
    }

    fn children_of(&self, parent: Option<i64>, sorted: &[&Category]) -> Vec<CategoryNode> {
        sorted
            .iter()
            .filter(|c| c.parent_id == parent)
            .map(|c| CategoryNode {
                view: self.view(c),
                children: self.children_of(Some(c.id), sorted),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(store: &mut Store, name: &str, parent_id: Option<i64>, sort_order: i64) -> i64 {
        let id = store.next_category_id();
        store.categories.insert(
            id,
            Category {
                id,
                name: name.to_string(),
                description: None,
                parent_id,
                sort_order,
                is_active: true,
                created_at: format!("2024-01-01T00:00:{id:02}"),
                updated_at: String::new(),
            },
        );
        id
    }

    #[test]
    fn full_path_joins_ancestors() {
        let mut store = Store::default();
        let root = category(&mut store, "Users", None, 0);
        let admin = category(&mut store, "Admin", Some(root), 0);
        let audit = category(&mut store, "Audit", Some(admin), 0);
        let c = store.categories[&audit].clone();
        assert_eq!(store.full_path(&c), "Users / Admin / Audit");
    }

    #[test]
    fn tree_orders_siblings_by_sort_order() {
        let mut store = Store::default();
        let a = category(&mut store, "A", None, 2);
        category(&mut store, "B", None, 1);
        category(&mut store, "A1", Some(a), 0);
        let tree = store.tree();
        let names: Vec<&str> = tree.iter().map(|n| n.view.category.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(tree[1].children[0].view.full_path, "A / A1");
    }

    #[test]
    fn tree_hides_inactive_subtrees() {
        let mut store = Store::default();
        let a = category(&mut store, "A", None, 0);
        category(&mut store, "A1", Some(a), 0);
        store.categories.get_mut(&a).unwrap().is_active = false;
        assert!(store.tree().is_empty());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut store = Store::default();
        assert_eq!(store.next_mock_id(), 1);
        assert_eq!(store.next_mock_id(), 2);
        assert_eq!(store.next_log_id(), 1);
    }
}
