use crate::walker::WalkResult;
use log;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    fn new(name: &str, node_type: NodeType) -> Self {
        Self {
            name: name.to_string(),
            node_type,
            children: match node_type {
                NodeType::Directory => Some(Vec::new()),
                NodeType::File => None,
            },
        }
    }
}

/// Nested tree of every retained path, children sorted by name.
pub fn build_tree(walk: &WalkResult) -> Vec<TreeNode> {
    log::debug!("Building tree structure from {} paths...", walk.paths.len());
    let mut root_nodes: Vec<TreeNode> = Vec::new();
    for rel_path in &walk.paths {
        let components: Vec<&str> = rel_path.split('/').filter(|c| !c.is_empty()).collect();
        insert_node(&mut root_nodes, &components, walk.is_dir(rel_path));
    }
    root_nodes
}

fn insert_node(level: &mut Vec<TreeNode>, components: &[&str], is_dir_at_end: bool) {
    let Some((name, rest)) = components.split_first() else {
        return;
    };
    let is_last = rest.is_empty();
    let wanted = if !is_last || is_dir_at_end {
        NodeType::Directory
    } else {
        NodeType::File
    };

    let index = match level.binary_search_by(|node| node.name.as_str().cmp(*name)) {
        Ok(index) => {
            let existing = &mut level[index];
            if wanted == NodeType::Directory && existing.node_type == NodeType::File {
                log::trace!("Promoting tree node {} to directory", name);
                existing.node_type = NodeType::Directory;
                existing.children.get_or_insert_with(Vec::new);
            }
            index
        }
        Err(insertion_point) => {
            level.insert(insertion_point, TreeNode::new(name, wanted));
            insertion_point
        }
    };

    if !is_last {
        if let Some(children) = level[index].children.as_mut() {
            insert_node(children, rest, is_dir_at_end);
        }
    }
}

/// Indented text view of the sorted path list: two spaces per depth level,
/// directories suffixed with `/`.
pub fn tree_lines(walk: &WalkResult) -> Vec<String> {
    walk.paths
        .iter()
        .map(|rel_path| {
            let depth = rel_path.matches('/').count();
            let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
            let suffix = if walk.is_dir(rel_path) { "/" } else { "" };
            format!("{}{}{}", "  ".repeat(depth), name, suffix)
        })
        .collect()
}
