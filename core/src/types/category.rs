use std::ops::Deref;

use serde::{Deserialize, Serialize};

fn active() -> bool {
    true
}

/// A node of the category hierarchy as returned by the server. `mock_count`
/// and `full_path` are computed server side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub mock_count: u64,
    #[serde(default)]
    pub full_path: String,
}

impl Category {
    /// A node is usable when its id is non-zero. `name` is a required
    /// field, so a node without one never deserializes in the first place.
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// A category together with the subtree it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTree {
    #[serde(flatten)]
    pub category: Category,
    #[serde(default)]
    pub children: Vec<CategoryTree>,
}

impl CategoryTree {
    pub fn leaf(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
        }
    }
}

impl Deref for CategoryTree {
    type Target = Category;

    fn deref(&self) -> &Category {
        &self.category
    }
}

/// One row of a flattened tree: the category and its depth (roots are 0).
#[derive(Debug, Clone, PartialEq)]
pub struct FlatCategory {
    pub level: usize,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CategoryCreate {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            parent_id: None,
            sort_order: None,
            is_active: None,
        }
    }

    pub fn under(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Partial category update. `parent_id = Some(0)` moves the category to the
/// root.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryStats {
    pub total_categories: u64,
    pub total_apis: u64,
    pub active_categories: u64,
    pub inactive_categories: u64,
}

/// Move many mocks into one category; `category_id: None` uncategorises them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchUpdateCategoryRequest {
    pub category_id: Option<i64>,
    pub mock_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryOrder {
    pub id: i64,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySortRequest {
    pub category_orders: Vec<CategoryOrder>,
}

impl CategorySortRequest {
    /// Sibling order taken from the position of each id in `ids`.
    pub fn from_ids(ids: &[i64]) -> Self {
        Self {
            category_orders: ids
                .iter()
                .enumerate()
                .map(|(i, &id)| CategoryOrder {
                    id,
                    sort_order: i as i64,
                })
                .collect(),
        }
    }
}
