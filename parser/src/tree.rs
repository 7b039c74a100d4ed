use std::fmt::{self, Display, Formatter};

use crate::error::SyntaxError;
use crate::instruction::Instruction;

pub mod visitor;

use visitor::{Dumper, Visitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    id: usize,
}

impl NodeId {
    pub fn new(id: usize) -> Self {
        NodeId { id }
    }

    pub fn value(self) -> usize {
        self.id
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub instruction: Instruction,
    pub body: Option<NodeId>,
    pub sibling: Option<NodeId>,
}

/// Rose tree of instructions stored in an arena. The first node is the root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstructionTree {
    nodes: Vec<Node>,
}

impl InstructionTree {
    pub fn new() -> Self {
        InstructionTree::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId::new(0))
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.value())
    }

    pub fn instruction(&self, id: NodeId) -> Option<&Instruction> {
        self.get(id).map(|node| &node.instruction)
    }

    pub fn body(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.body)
    }

    pub fn sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.sibling)
    }

    /// Nodes in declaration order, which is also pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(id, node)| (NodeId::new(id), node))
    }

    /// Number of nested body levels below the top-level chain.
    pub fn depth(&self) -> usize {
        fn chain_depth(tree: &InstructionTree, first: Option<NodeId>) -> usize {
            let mut deepest = 0;
            let mut current = first;
            while let Some(id) = current {
                if let Some(body) = tree.body(id) {
                    deepest = deepest.max(1 + chain_depth(tree, Some(body)));
                }
                current = tree.sibling(id);
            }
            deepest
        }

        chain_depth(self, self.root())
    }

    /// Indented listing, one instruction per line.
    pub fn dump(&self) -> String {
        let mut dumper = Dumper::new();
        // writing into a String cannot fail
        let _ = dumper.visit_tree(self);
        dumper.into_output()
    }

    fn push(&mut self, instruction: Instruction) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node { instruction, body: None, sibling: None });
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SyntaxError> {
        self.nodes.get_mut(id.value()).ok_or_else(|| SyntaxError::internal("dangling node id"))
    }
}

impl Display for InstructionTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dump())
    }
}

/// Insertion point used while the tree is being built. Tracks the path of
/// parents above the last stored node.
#[derive(Debug, Clone, Default)]
pub struct TreeCursor {
    tree: InstructionTree,
    parents: Vec<NodeId>,
    last: Option<NodeId>,
}

impl TreeCursor {
    pub fn new() -> Self {
        TreeCursor::default()
    }

    pub fn tree(&self) -> &InstructionTree {
        &self.tree
    }

    pub fn into_tree(self) -> InstructionTree {
        self.tree
    }

    pub fn last(&self) -> Option<NodeId> {
        self.last
    }

    pub fn level(&self) -> usize {
        self.parents.len()
    }

    /// Stores `instruction` relative to the last node: `1` appends it as the
    /// last node's body, `0` as its sibling and `-k` as the sibling of its
    /// k-th ancestor.
    pub fn insert(&mut self, instruction: Instruction, offset: i32) -> Result<NodeId, SyntaxError> {
        let last = match self.last {
            Some(last) => last,
            None if offset == 0 => {
                let id = self.tree.push(instruction);
                self.last = Some(id);
                return Ok(id);
            },
            None => return Err(SyntaxError::internal("first node stored with a level offset")),
        };

        let id = if offset > 0 {
            if offset > 1 {
                return Err(SyntaxError::internal("body opened twice without a node"));
            }
            let id = self.tree.push(instruction);
            self.tree.node_mut(last)?.body = Some(id);
            self.parents.push(last);
            id
        } else {
            let anchor = self.ancestor(-offset as usize)?;
            self.parents.truncate(self.parents.len() - (-offset as usize));
            let id = self.tree.push(instruction);
            self.tree.node_mut(anchor)?.sibling = Some(id);
            id
        };

        self.last = Some(id);
        Ok(id)
    }

    /// Node an insertion at `offset` would attach to as a sibling.
    pub fn previous_at(&self, offset: i32) -> Option<NodeId> {
        if offset > 0 {
            return None;
        }
        self.ancestor(-offset as usize).ok()
    }

    pub fn instruction_mut(&mut self, id: NodeId) -> Result<&mut Instruction, SyntaxError> {
        self.tree.node_mut(id).map(|node| &mut node.instruction)
    }

    fn ancestor(&self, levels: usize) -> Result<NodeId, SyntaxError> {
        if levels == 0 {
            return self.last.ok_or_else(|| SyntaxError::internal("no node stored yet"));
        }
        if levels > self.parents.len() {
            return Err(SyntaxError::internal("closed more bodies than were opened"));
        }
        Ok(self.parents[self.parents.len() - levels])
    }
}
