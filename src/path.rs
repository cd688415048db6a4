use crate::error::SgfError;
use crate::tree::{GameNode, TreeCollection, TreeId};

/// Finds the leaf with the most nodes on the way down from `tree`.
///
/// Returns the leaf and that node count. Ties keep the leaf met first, which
/// is the one under the earliest child. Walks with an explicit stack since
/// variations may nest arbitrarily deep.
fn furthest_leaf(trees: &TreeCollection<'_>, tree: TreeId) -> (TreeId, usize) {
    let mut best: Option<(TreeId, usize)> = None;
    let mut pending = vec![(tree, 0usize)];

    while let Some((id, above)) = pending.pop() {
        let current = trees.tree(id);
        let depth = above + current.sequence.len();
        if current.children.is_empty() {
            if best.is_none_or(|(_, best_depth)| depth > best_depth) {
                best = Some((id, depth));
            }
            continue;
        }
        // Reversed so the first child is popped first.
        pending.extend(current.children.iter().rev().map(|&child| (child, depth)));
    }

    best.unwrap_or((tree, 0))
}

/// Selects the main line: the node sequences from the outermost game tree
/// down to the deepest leaf of the collection.
pub fn select_path<'c, 'a>(trees: &'c TreeCollection<'a>) -> Result<Vec<&'c GameNode<'a>>, SgfError> {
    if trees.is_empty() {
        return Err(SgfError::selection("An empty tree collection."));
    }

    let (leaf, depth) = furthest_leaf(trees, TreeCollection::ROOT);

    let mut path = Vec::new();
    let mut cursor = Some(leaf);
    while let Some(id) = cursor {
        if id == TreeCollection::ROOT {
            break;
        }
        path.push(id);
        cursor = trees.tree(id).parent;
    }

    let mut nodes = Vec::with_capacity(depth);
    for &id in path.iter().rev() {
        nodes.extend(trees.tree(id).sequence.iter());
    }
    Ok(nodes)
}
