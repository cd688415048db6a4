//! Structural SGF parsing: text to a forest of game trees.
//!
//! ```text
//! Collection = GameTree { GameTree }
//! GameTree   = "(" Sequence { GameTree } ")"
//! Sequence   = Node { Node }
//! Node       = ";" { Property }
//! Property   = PropIdent PropValue { PropValue }
//! PropValue  = "[" CValueType "]"
//! ```
//!
//! Everything borrows from the input buffer; values are kept raw, escapes
//! included.

use smallvec::SmallVec;

use crate::error::SgfError;
use crate::scanner::{find_first, trimmed_slice};

pub type PropertyValues<'a> = SmallVec<[&'a str; 2]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property<'a> {
    pub id: &'a str,
    pub values: PropertyValues<'a>,
}

impl<'a> Property<'a> {
    fn new(id: &'a str) -> Self {
        Self {
            id,
            values: SmallVec::new(),
        }
    }
}

pub type GameNode<'a> = Vec<Property<'a>>;

/// Index of a tree inside its [`TreeCollection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeId(usize);

#[derive(Debug, Default)]
pub struct GameTree<'a> {
    pub parent: Option<TreeId>,
    pub sequence: Vec<GameNode<'a>>,
    pub children: Vec<TreeId>,
}

impl GameTree<'_> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena of every tree parsed from one buffer. Slot 0 is a synthetic root whose
/// children are the top-level game trees.
#[derive(Debug)]
pub struct TreeCollection<'a> {
    arena: Vec<GameTree<'a>>,
}

impl<'a> TreeCollection<'a> {
    pub const ROOT: TreeId = TreeId(0);

    pub(crate) fn new() -> Self {
        Self {
            arena: vec![GameTree::default()],
        }
    }

    /// Top-level game trees, in input order.
    pub fn roots(&self) -> &[TreeId] {
        &self.arena[Self::ROOT.0].children
    }

    pub fn tree(&self, id: TreeId) -> &GameTree<'a> {
        &self.arena[id.0]
    }

    pub fn len(&self) -> usize {
        self.roots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots().is_empty()
    }

    fn new_child(&mut self, parent: TreeId) -> TreeId {
        let id = TreeId(self.arena.len());
        self.arena.push(GameTree {
            parent: Some(parent),
            ..GameTree::default()
        });
        self.arena[parent.0].children.push(id);
        id
    }

    fn new_node(&mut self, tree: TreeId) -> &mut GameNode<'a> {
        let sequence = &mut self.arena[tree.0].sequence;
        sequence.push(GameNode::new());
        let last = sequence.len() - 1;
        &mut sequence[last]
    }

    fn go_up(&self, tree: TreeId) -> Result<TreeId, SgfError> {
        match self.tree(tree).parent {
            Some(parent) => Ok(parent),
            None => Err(SgfError::structural("Trying to go up past the root tree.")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeState {
    /// Expecting a property identifier or the end of the node.
    NodeStart,
    /// Inside `[`, expecting `]`.
    ValueStart,
    /// After `]`: another value, another property, or the end of the node.
    NextValue,
}

/// Reads the properties of one node starting right after its `;`.
///
/// Returns the position of the byte that ended the node: `;`, `(` or `)`.
pub fn consume_node<'a>(
    text: &'a str,
    start: usize,
    node: &mut GameNode<'a>,
) -> Result<usize, SgfError> {
    let bytes = text.as_bytes();
    let mut state = NodeState::NodeStart;
    let mut cursor = start;

    loop {
        match state {
            NodeState::NodeStart => {
                let p = find_first(text, cursor, b"[;()", true)
                    .ok_or_else(|| SgfError::structural("Reached the end of a node."))?;
                let id = trimmed_slice(text, cursor, p);
                if bytes[p] != b'[' {
                    if !id.is_empty() {
                        return Err(SgfError::structural("Property identifier without a value."));
                    }
                    return Ok(p);
                }
                if id.is_empty() {
                    return Err(SgfError::structural("Missing a property identifier."));
                }
                node.push(Property::new(id));
                state = NodeState::ValueStart;
                cursor = p + 1;
            }
            NodeState::ValueStart => {
                let p = find_first(text, cursor, b"]", true).ok_or_else(|| {
                    SgfError::structural("Missing the end of a property value.")
                })?;
                if let Some(property) = node.last_mut() {
                    property.values.push(&text[cursor..p]);
                }
                state = NodeState::NextValue;
                cursor = p + 1;
            }
            NodeState::NextValue => {
                let p = find_first(text, cursor, b"[;()", true)
                    .ok_or_else(|| SgfError::structural("Missing the end of a node."))?;
                let gap = trimmed_slice(text, cursor, p);
                if bytes[p] == b'[' {
                    if !gap.is_empty() {
                        node.push(Property::new(gap));
                    }
                    state = NodeState::ValueStart;
                    cursor = p + 1;
                } else {
                    if !gap.is_empty() {
                        return Err(SgfError::structural(
                            "Non-empty contents after the end of a value.",
                        ));
                    }
                    return Ok(p);
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TreeState {
    /// Before the first `(`.
    Start,
    /// After `(`, expecting the first `;` of the sequence.
    TreeStart,
    /// After `;`, reading a node.
    NodeStart,
    /// After `)`, expecting a sibling `(`, a closing `)` or the end of input.
    NextTree,
}

/// Parses a whole buffer into a [`TreeCollection`].
///
/// Text after the last complete tree that is not a `(` or `)` ends parsing.
pub fn parse_to_collection(text: &str) -> Result<TreeCollection<'_>, SgfError> {
    let bytes = text.as_bytes();
    let mut trees = TreeCollection::new();
    let mut current = TreeCollection::ROOT;
    let mut state = TreeState::Start;
    let mut cursor = 0;

    loop {
        match state {
            TreeState::Start => {
                let p = find_first(text, cursor, b"(", false)
                    .ok_or_else(|| SgfError::structural("Failed in finding a tree start."))?;
                current = trees.new_child(current);
                state = TreeState::TreeStart;
                cursor = p + 1;
            }
            TreeState::TreeStart => {
                let p = find_first(text, cursor, b";", false)
                    .ok_or_else(|| SgfError::structural("Failed in finding a node start."))?;
                state = TreeState::NodeStart;
                cursor = p + 1;
            }
            TreeState::NodeStart => {
                let node = trees.new_node(current);
                let p = consume_node(text, cursor, node)
                    .map_err(|e| e.context("Error in parsing a node"))?;
                match bytes[p] {
                    b';' => {}
                    b')' => {
                        current = trees.go_up(current)?;
                        state = TreeState::NextTree;
                    }
                    _ => {
                        current = trees.new_child(current);
                        state = TreeState::TreeStart;
                    }
                }
                cursor = p + 1;
            }
            TreeState::NextTree => {
                let Some(p) = find_first(text, cursor, b"()", false) else {
                    break;
                };
                if bytes[p] == b'(' {
                    current = trees.new_child(current);
                    state = TreeState::TreeStart;
                } else {
                    current = trees.go_up(current)?;
                }
                cursor = p + 1;
            }
        }
    }

    if current != TreeCollection::ROOT {
        return Err(SgfError::structural("Parser ends with a bad state."));
    }

    Ok(trees)
}
