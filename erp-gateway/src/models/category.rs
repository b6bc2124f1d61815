use serde::{Deserialize, Serialize};

/// Separator between ancestor names in a category path.
pub const PATH_DELIMITER: &str = " > ";

/// A category as stored by the catalog: ancestry is encoded in `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatCategory {
    pub id: i64,
    pub name: String,
    /// Full ancestor chain, e.g. `"Frames > Metal > Titanium"`.
    pub path: String,
    pub product_count: i64,
}

impl FlatCategory {
    /// Trimmed path segments, root first.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split(PATH_DELIMITER).map(str::trim).collect()
    }

    /// 1-based depth implied by the path.
    pub fn depth(&self) -> usize {
        self.path.matches(PATH_DELIMITER).count() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: i64,
    pub name: String,
    /// Own count plus every descendant's count.
    pub product_count: i64,
    pub level: usize,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in the subtree rooted here, including `self`.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::subtree_size).sum::<usize>()
    }
}

/// A tree node without its children, for flat listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatNode {
    pub id: i64,
    pub name: String,
    pub product_count: i64,
    pub level: usize,
}

impl From<&CategoryNode> for FlatNode {
    fn from(node: &CategoryNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            product_count: node.product_count,
            level: node.level,
        }
    }
}
