//! Builds the category hierarchy shown in faceted navigation.
//!
//! The catalog stores each category with its full ancestor path
//! (`"Frames > Metal > Titanium"`). [`build_tree`] turns that flat list into a
//! forest, rolling product counts up so every node reports its own products
//! plus everything beneath it.
//!
//! Dirty input never fails the build: a category whose parent path is missing
//! becomes an orphan root at its own level, and duplicate paths produce
//! independent nodes.

use crate::models::category::{CategoryNode, FlatCategory, FlatNode, PATH_DELIMITER};
use crate::services::collation;
use std::collections::HashMap;

struct Slot {
    id: i64,
    name: String,
    product_count: i64,
    level: usize,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Convert a flat, path-annotated list into a sorted forest.
pub fn build_tree(categories: &[FlatCategory]) -> Vec<CategoryNode> {
    let mut ordered: Vec<(&FlatCategory, usize)> =
        categories.iter().map(|c| (c, c.depth())).collect();
    // Stable: equal depths keep input order, which decides duplicate-path parents.
    ordered.sort_by_key(|(_, depth)| *depth);

    let mut slots: Vec<Slot> = Vec::with_capacity(ordered.len());
    let mut roots: Vec<usize> = Vec::new();
    // Full path -> first slot built for it
    let mut by_path: HashMap<String, usize> = HashMap::with_capacity(ordered.len());

    for (category, depth) in ordered {
        let segments = category.segments();
        let idx = slots.len();

        let parent = if depth > 1 {
            let parent_path = segments[..segments.len() - 1].join(PATH_DELIMITER);
            by_path
                .get(&parent_path)
                .copied()
                .filter(|&p| slots[p].level + 1 == depth)
        } else {
            None
        };

        slots.push(Slot {
            id: category.id,
            name: category.name.clone(),
            product_count: category.product_count,
            level: depth,
            parent,
            children: Vec::new(),
        });

        match parent {
            Some(parent_idx) => {
                slots[parent_idx].children.push(idx);
                let mut ancestor = Some(parent_idx);
                while let Some(a) = ancestor {
                    slots[a].product_count =
                        slots[a].product_count.saturating_add(category.product_count);
                    ancestor = slots[a].parent;
                }
            }
            None => {
                if depth > 1 {
                    tracing::debug!(
                        category_id = category.id,
                        path = %category.path,
                        "Parent category not found, keeping as root"
                    );
                }
                roots.push(idx);
            }
        }

        by_path.entry(segments.join(PATH_DELIMITER)).or_insert(idx);
    }

    let mut forest: Vec<CategoryNode> = roots.iter().map(|&r| materialize(&slots, r)).collect();
    sort_by_name(&mut forest);
    forest
}

fn materialize(slots: &[Slot], idx: usize) -> CategoryNode {
    let slot = &slots[idx];
    let mut children: Vec<CategoryNode> =
        slot.children.iter().map(|&c| materialize(slots, c)).collect();
    sort_by_name(&mut children);

    CategoryNode {
        id: slot.id,
        name: slot.name.clone(),
        product_count: slot.product_count,
        level: slot.level,
        children,
    }
}

fn sort_by_name(nodes: &mut [CategoryNode]) {
    nodes.sort_by(|a, b| collation::compare(&a.name, &b.name));
}

/// Pre-order walk of the forest; each parent precedes its own children.
pub fn flatten_tree(nodes: &[CategoryNode]) -> Vec<&CategoryNode> {
    fn walk<'a>(node: &'a CategoryNode, out: &mut Vec<&'a CategoryNode>) {
        out.push(node);
        for child in &node.children {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for node in nodes {
        walk(node, &mut out);
    }
    out
}

/// [`flatten_tree`] without the nested children, suitable for listings.
pub fn flatten_tree_owned(nodes: &[CategoryNode]) -> Vec<FlatNode> {
    flatten_tree(nodes).into_iter().map(FlatNode::from).collect()
}

/// The node's id followed by every descendant id, in pre-order.
pub fn descendant_ids(node: &CategoryNode) -> Vec<i64> {
    flatten_tree(std::slice::from_ref(node))
        .into_iter()
        .map(|n| n.id)
        .collect()
}

/// Locate a node anywhere in the forest by id (first match in pre-order).
pub fn find_node(nodes: &[CategoryNode], id: i64) -> Option<&CategoryNode> {
    flatten_tree(nodes).into_iter().find(|n| n.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: i64, path: &str, count: i64) -> FlatCategory {
        let name = path.rsplit(PATH_DELIMITER).next().unwrap().trim().to_string();
        FlatCategory {
            id,
            name,
            path: path.to_string(),
            product_count: count,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn test_single_root_keeps_count() {
        let tree = build_tree(&[cat(1, "Frames", 4)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].product_count, 4);
        assert_eq!(tree[0].level, 1);
        assert!(tree[0].is_leaf());
    }

    #[test]
    fn test_parent_aggregates_child() {
        let tree = build_tree(&[cat(1, "A", 5), cat(2, "A > B", 3)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "A");
        assert_eq!(tree[0].product_count, 8);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].name, "B");
        assert_eq!(tree[0].children[0].product_count, 3);
        assert_eq!(tree[0].children[0].level, 2);
    }

    #[test]
    fn test_counts_roll_up_through_all_ancestors() {
        let tree = build_tree(&[
            cat(3, "A > B > C", 2),
            cat(1, "A", 1),
            cat(2, "A > B", 0),
        ]);
        let a = &tree[0];
        let b = &a.children[0];
        let c = &b.children[0];
        assert_eq!(c.product_count, 2);
        assert_eq!(b.product_count, 2);
        assert_eq!(a.product_count, 3);
        assert_eq!(c.level, 3);
    }

    #[test]
    fn test_orphan_becomes_root_at_own_level() {
        let tree = build_tree(&[cat(1, "A > B", 2)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "B");
        assert_eq!(tree[0].level, 2);
        assert_eq!(tree[0].product_count, 2);
    }

    #[test]
    fn test_whitespace_in_path_is_trimmed() {
        let tree = build_tree(&[cat(1, "A", 1), cat(2, "A  >  B", 1)]);
        // "A  >  B" still splits on " > " and trims to ["A", "B"]
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
    }

    #[test]
    fn test_duplicate_paths_are_not_merged() {
        let tree = build_tree(&[cat(1, "A", 1), cat(2, "A", 2), cat(3, "A > B", 5)]);
        assert_eq!(tree.len(), 2);
        assert_eq!(flatten_tree(&tree).len(), 3);
        // First-built "A" adopts the child
        let first = tree.iter().find(|n| n.id == 1).unwrap();
        let second = tree.iter().find(|n| n.id == 2).unwrap();
        assert_eq!(first.product_count, 6);
        assert_eq!(second.product_count, 2);
        assert!(second.is_leaf());
    }

    #[test]
    fn test_siblings_sorted_vietnamese() {
        let tree = build_tree(&[
            cat(1, "Kính", 0),
            cat(2, "Kính > Đa tròng", 0),
            cat(3, "Kính > Dây", 0),
            cat(4, "Kính > Áp tròng", 0),
            cat(5, "Gọng", 0),
        ]);
        let roots: Vec<&str> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(roots, vec!["Gọng", "Kính"]);
        let children: Vec<&str> = tree[1].children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(children, vec!["Áp tròng", "Dây", "Đa tròng"]);
    }

    #[test]
    fn test_flatten_is_preorder() {
        let tree = build_tree(&[
            cat(1, "A", 0),
            cat(2, "A > B", 0),
            cat(3, "A > B > C", 0),
            cat(4, "D", 0),
        ]);
        let ids: Vec<i64> = flatten_tree(&tree).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_descendant_ids_include_self_first() {
        let tree = build_tree(&[
            cat(1, "A", 0),
            cat(2, "A > B", 0),
            cat(3, "A > C", 0),
            cat(4, "A > B > D", 0),
        ]);
        let ids = descendant_ids(&tree[0]);
        assert_eq!(ids, vec![1, 2, 4, 3]);
        assert_eq!(ids.len(), tree[0].subtree_size());

        let leaf = find_node(&tree, 3).unwrap();
        assert_eq!(descendant_ids(leaf), vec![3]);
    }

    #[test]
    fn test_find_node_missing() {
        let tree = build_tree(&[cat(1, "A", 0)]);
        assert!(find_node(&tree, 99).is_none());
    }

    #[test]
    fn test_rolled_up_count_saturates() {
        let tree = build_tree(&[cat(1, "A", i64::MAX), cat(2, "A > B", 1)]);
        assert_eq!(tree[0].product_count, i64::MAX);
        assert_eq!(tree[0].children[0].product_count, 1);
    }
}
