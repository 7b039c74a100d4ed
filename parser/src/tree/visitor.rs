use std::fmt::{self, Write};

use crate::instruction::Instruction;
use crate::tree::{InstructionTree, NodeId};

/// Walks an instruction tree in pre-order. Each hook receives the nesting
/// depth of the visited node.
pub trait Visitor: Sized {
    type Err;

    fn visit_tree(&mut self, tree: &InstructionTree) -> Result<(), Self::Err> {
        match tree.root() {
            Some(root) => self.visit_chain(tree, root, 0),
            None => Ok(()),
        }
    }

    fn visit_chain(&mut self, tree: &InstructionTree, first: NodeId, depth: usize) -> Result<(), Self::Err> {
        let mut current = Some(first);
        while let Some(id) = current {
            self.visit_node(tree, id, depth)?;
            current = tree.sibling(id);
        }

        Ok(())
    }

    fn visit_node(&mut self, tree: &InstructionTree, id: NodeId, depth: usize) -> Result<(), Self::Err> {
        if let Some(instruction) = tree.instruction(id) {
            self.visit_instruction(instruction, depth)?;
        }

        match tree.body(id) {
            Some(body) => self.visit_chain(tree, body, depth + 1),
            None => Ok(()),
        }
    }

    fn visit_instruction(&mut self, instruction: &Instruction, depth: usize) -> Result<(), Self::Err>;
}

/// Renders one instruction per line, indented by nesting depth.
#[derive(Debug, Default)]
pub struct Dumper {
    output: String,
}

impl Dumper {
    pub fn new() -> Self {
        Dumper::default()
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

impl Visitor for Dumper {
    type Err = fmt::Error;

    fn visit_instruction(&mut self, instruction: &Instruction, depth: usize) -> Result<(), Self::Err> {
        writeln!(self.output, "{:indent$}{}", "", instruction, indent = depth * 2)
    }
}
