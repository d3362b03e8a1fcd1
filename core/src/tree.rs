//! Category tree utilities.
//!
//! The tree arrives from the server as nested JSON. `sanitize_tree` is the
//! only entry point from untrusted data into `CategoryTree` values: a
//! non-array payload becomes an empty tree and any node without an id or a
//! string name is dropped together with its subtree, at every depth.

use serde_json::Value;

use crate::types::{Category, CategoryTree, FlatCategory};

pub fn sanitize_tree(value: Value) -> Vec<CategoryTree> {
    match value {
        Value::Array(nodes) => nodes.into_iter().filter_map(sanitize_node).collect(),
        other => {
            if !other.is_null() {
                tracing::debug!("category tree payload is not an array, using an empty tree");
            }
            Vec::new()
        }
    }
}

fn sanitize_node(value: Value) -> Option<CategoryTree> {
    let Value::Object(mut fields) = value else {
        return None;
    };
    let has_id = fields
        .get("id")
        .and_then(Value::as_i64)
        .is_some_and(|id| id != 0);
    let has_name = fields.get("name").is_some_and(Value::is_string);
    if !has_id || !has_name {
        tracing::debug!(id = ?fields.get("id"), "dropping category node without id or name");
        return None;
    }

    let children = fields.remove("children").map(sanitize_tree).unwrap_or_default();
    match serde_json::from_value::<Category>(Value::Object(fields)) {
        Ok(category) => Some(CategoryTree { category, children }),
        Err(e) => {
            tracing::debug!(error = %e, "dropping malformed category node");
            None
        }
    }
}

/// Pre-order depth-first listing of the tree with each node's depth.
pub fn flatten_categories(tree: &[CategoryTree]) -> Vec<FlatCategory> {
    fn walk(nodes: &[CategoryTree], level: usize, out: &mut Vec<FlatCategory>) {
        for node in nodes.iter().filter(|n| n.is_valid()) {
            out.push(FlatCategory {
                level,
                category: node.category.clone(),
            });
            walk(&node.children, level + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(tree, 0, &mut out);
    out
}

/// First node with `id` in pre-order, if any.
pub fn find_category_by_id(tree: &[CategoryTree], id: i64) -> Option<&CategoryTree> {
    tree.iter().find_map(|node| {
        if node.id == id {
            Some(node)
        } else {
            find_category_by_id(&node.children, id)
        }
    })
}

/// Number of nodes across all depths.
pub fn count_nodes(tree: &[CategoryTree]) -> usize {
    tree.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Vec<CategoryTree> {
        sanitize_tree(json!([
            {"id": 1, "name": "Users", "children": [
                {"id": 3, "name": "Admin", "parent_id": 1, "children": [
                    {"id": 5, "name": "Audit", "parent_id": 3}
                ]},
                {"id": 4, "name": "Guests", "parent_id": 1}
            ]},
            {"id": 2, "name": "Orders"}
        ]))
    }

    #[test]
    fn flatten_is_preorder_with_levels() {
        let flat = flatten_categories(&sample());
        let rows: Vec<(i64, usize)> = flat.iter().map(|f| (f.category.id, f.level)).collect();
        assert_eq!(rows, vec![(1, 0), (3, 1), (5, 2), (4, 1), (2, 0)]);
    }

    #[test]
    fn flatten_length_matches_node_count() {
        let tree = sample();
        assert_eq!(flatten_categories(&tree).len(), count_nodes(&tree));
    }

    #[test]
    fn invalid_nodes_are_dropped_at_every_depth() {
        let tree = sanitize_tree(json!([
            {"id": 1, "name": "Root", "children": [
                {"id": 2, "children": [{"id": 9, "name": "Orphan"}]},
                {"id": 3, "name": "Kept", "children": [{"name": "no id"}]}
            ]},
            {"id": 4, "name": null},
            "garbage"
        ]));
        let ids: Vec<i64> = flatten_categories(&tree).iter().map(|f| f.category.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn flatten_skips_zero_ids_built_in_code() {
        let mut bad = sample()[1].category.clone();
        bad.id = 0;
        let tree = vec![CategoryTree::leaf(bad)];
        assert!(flatten_categories(&tree).is_empty());
    }

    #[test]
    fn non_array_payload_is_empty() {
        assert!(sanitize_tree(json!({"detail": "oops"})).is_empty());
        assert!(sanitize_tree(Value::Null).is_empty());
    }

    #[test]
    fn find_returns_nested_node() {
        let tree = sample();
        let found = find_category_by_id(&tree, 5).unwrap();
        assert_eq!(found.name, "Audit");
        assert!(find_category_by_id(&tree, 42).is_none());
    }

    #[test]
    fn find_prefers_first_preorder_match() {
        let tree = sanitize_tree(json!([
            {"id": 1, "name": "A", "children": [{"id": 7, "name": "first"}]},
            {"id": 7, "name": "second"}
        ]));
        assert_eq!(find_category_by_id(&tree, 7).unwrap().name, "first");
    }
}
