//! Token-driven syntax analysis.
//!
//! The machine is a fixed graph of states. Each token is handed to the
//! current state, which either keeps control or names the next state; the
//! next state is entered with the same token, so chains of transitions can
//! happen without consuming input.

use crate::error::{AnalysisError, SyntaxError};
use crate::expression::{Expression, ExpressionBuilder, Feed};
use crate::instruction::Instruction;
use crate::lexer::{unrecognized, Token, TokenKind};
use crate::tree::{InstructionTree, NodeId, TreeCursor};

pub mod accumulator;
mod states;

#[cfg(test)]
mod tests;

use accumulator::Accumulator;

/// Upper bound on transitions triggered by a single token.
const MAX_HOPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId {
    id: usize,
}

impl StateId {
    pub fn new(id: usize) -> Self {
        StateId { id }
    }

    pub fn value(self) -> usize {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Goto(StateId),
}

pub trait State {
    fn name(&self) -> &'static str;

    /// Called with the token that caused the transition into this state.
    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition, SyntaxError>;

    fn process(&mut self, context: &mut Context, token: &Token) -> Result<Transition, SyntaxError>;

    fn exit(&mut self, _context: &mut Context) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Working,
    Finished,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Block,
    OneLiner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Main,
    If,
    Else,
    While,
    /// A bare `begin ... end` inside a block; it opens no tree level.
    Compound,
}

/// A body that is open while analysis is inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub owner: Owner,
    pub node: Option<NodeId>,
}

/// Analysis state shared by all states of the machine.
#[derive(Debug, Default)]
pub struct Context {
    pub(crate) accumulator: Accumulator,
    cursor: TreeCursor,
    level_offset: i32,
    frames: Vec<Frame>,
    body_owner: Option<(Owner, NodeId)>,
    completed_block: Option<Frame>,
    pending_else: Option<NodeId>,
    statement_done: bool,
    expression: ExpressionBuilder,
    finished: bool,
}

impl Context {
    /// Stores an instruction at the pending level offset.
    pub fn store(&mut self, instruction: Instruction) -> Result<NodeId, SyntaxError> {
        let opens_body = instruction.opens_body();
        let id = self.cursor.insert(instruction, self.level_offset)?;
        self.level_offset = if opens_body { 1 } else { 0 };
        Ok(id)
    }

    /// Collapses the accumulator and stores what it produced.
    pub fn store_accumulated(&mut self) -> Result<Option<NodeId>, SyntaxError> {
        let mut last = None;
        for instruction in self.accumulator.collapse()? {
            last = Some(self.store(instruction)?);
        }
        Ok(last)
    }

    /// Feeds a token to the expression under construction.
    pub fn parse_expression(&mut self, token: &Token) -> Result<Option<Expression>, SyntaxError> {
        match self.expression.feed(token)? {
            Feed::More => Ok(None),
            Feed::Complete(expression) => Ok(Some(expression)),
        }
    }

    pub fn close_section(&mut self) {
        self.level_offset -= 1;
    }

    pub fn await_body(&mut self, owner: Owner, node: NodeId) {
        self.body_owner = Some((owner, node));
    }

    pub fn take_body_owner(&mut self) -> Option<(Owner, NodeId)> {
        self.body_owner.take()
    }

    pub fn open_frame(&mut self, kind: FrameKind, owner: Owner, node: Option<NodeId>) {
        self.frames.push(Frame { kind, owner, node });
    }

    pub fn top_frame(&self) -> Option<Frame> {
        self.frames.last().copied()
    }

    pub fn close_frame(&mut self) -> Option<Frame> {
        let frame = self.frames.pop()?;
        if frame.owner != Owner::Compound {
            self.level_offset -= 1;
        }
        Some(frame)
    }

    /// Closes a block frame whose `end` was just read.
    pub fn end_block(&mut self) -> Option<Frame> {
        let frame = self.close_frame()?;
        self.completed_block = Some(frame);
        self.statement_done = true;
        Some(frame)
    }

    pub fn complete_statement(&mut self) {
        self.statement_done = true;
    }

    pub fn statement_done(&self) -> bool {
        self.statement_done
    }

    /// Runs once a statement has completed and the following token is
    /// known. Closes every one-liner body on top of the frame stack, unless
    /// an `else` follows a body owned by an `if`: that `if` becomes the
    /// partner of the `else`.
    pub fn settle(&mut self, next: &Token) {
        self.statement_done = false;
        self.pending_else = None;

        let mut completed = self.completed_block.take();
        loop {
            if let Some(frame) = completed {
                if frame.owner == Owner::If && next.is(TokenKind::Else) {
                    self.pending_else = frame.node;
                    return;
                }
            }

            match self.top_frame() {
                Some(frame) if frame.kind == FrameKind::OneLiner => completed = self.close_frame(),
                _ => return,
            }
        }
    }

    /// Pairs an `else` with its `if`, returning the `if` node.
    pub fn pair_else(&mut self, token: &Token) -> Result<NodeId, SyntaxError> {
        let node = self.pending_else.take()
            .ok_or(SyntaxError::ElseWithoutIf { position: token.position })?;

        if self.cursor.previous_at(self.level_offset) != Some(node) {
            return Err(SyntaxError::internal("else is not adjacent to its if"));
        }

        match self.cursor.instruction_mut(node)? {
            Instruction::If { paired_else, .. } => *paired_else = true,
            _ => return Err(SyntaxError::internal("else paired with a non-if node")),
        }

        Ok(node)
    }

    pub fn finish_program(&mut self) {
        self.finished = true;
    }

    pub fn tree(&self) -> &InstructionTree {
        self.cursor.tree()
    }
}

/// Builds the state graph. Handles are reserved before states exist so that
/// states can refer to each other in cycles.
#[derive(Default)]
struct GraphBuilder {
    slots: Vec<Option<Box<dyn State>>>,
}

impl GraphBuilder {
    fn reserve(&mut self) -> StateId {
        self.slots.push(None);
        StateId::new(self.slots.len() - 1)
    }

    fn define<S: State + 'static>(&mut self, id: StateId, state: S) {
        self.slots[id.value()] = Some(Box::new(state));
    }

    fn build(self) -> Vec<Box<dyn State>> {
        self.slots.into_iter()
            .enumerate()
            .map(|(id, slot)| slot.unwrap_or_else(|| panic!("state {} was reserved but never defined", id)))
            .collect()
    }
}

/// Consumes tokens one at a time and builds an instruction tree.
pub struct AnalysisMachine {
    states: Vec<Box<dyn State>>,
    current: StateId,
    context: Context,
    status: Status,
    errors: Vec<AnalysisError>,
}

impl AnalysisMachine {
    pub fn new() -> Self {
        let mut graph = GraphBuilder::default();
        let start = states::build_graph(&mut graph);

        AnalysisMachine {
            states: graph.build(),
            current: start,
            context: Context::default(),
            status: Status::Working,
            errors: vec![],
        }
    }

    /// Feeds one token. Errors latch the machine; later tokens are ignored.
    pub fn process(&mut self, token: &Token) -> Status {
        if self.status != Status::Working {
            return self.status;
        }

        if let Some(error) = unrecognized(token) {
            self.fail(error.into());
            return self.status;
        }

        match self.step(token) {
            Ok(()) if self.context.finished => self.status = Status::Finished,
            Ok(()) => {},
            Err(error) => self.fail(error.into()),
        }

        self.status
    }

    fn step(&mut self, token: &Token) -> Result<(), SyntaxError> {
        let mut transition = self.states[self.current.value()].process(&mut self.context, token)?;

        let mut hops = 0;
        while let Transition::Goto(next) = transition {
            hops += 1;
            if hops > MAX_HOPS {
                return Err(SyntaxError::internal("too many transitions for a single token"));
            }

            self.states[self.current.value()].exit(&mut self.context);
            self.current = next;
            transition = self.states[next.value()].enter(&mut self.context, token)?;
        }

        Ok(())
    }

    fn fail(&mut self, error: AnalysisError) {
        self.errors.push(error);
        self.status = Status::Error;
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn errors(&self) -> &[AnalysisError] {
        &self.errors
    }

    pub fn current_state(&self) -> &'static str {
        self.states[self.current.value()].name()
    }

    pub fn tree(&self) -> &InstructionTree {
        self.context.tree()
    }

    /// Drops all analysis state and starts over at the program header.
    pub fn reset(&mut self) {
        *self = AnalysisMachine::new();
    }

    /// Feeds a whole token stream.
    pub fn analyze(&mut self, tokens: &[Token]) -> Status {
        for token in tokens {
            if self.process(token) != Status::Working {
                break;
            }
        }

        self.status
    }

    /// Hands out the finished tree, or the error log. Running out of tokens
    /// before `end.` counts as an error.
    pub fn finish(mut self) -> Result<InstructionTree, Vec<AnalysisError>> {
        match self.status {
            Status::Finished => Ok(self.context.cursor.into_tree()),
            Status::Error => Err(self.errors),
            Status::Working => {
                self.errors.push(SyntaxError::MissingProgramEnd.into());
                Err(self.errors)
            },
        }
    }
}

impl Default for AnalysisMachine {
    fn default() -> Self {
        AnalysisMachine::new()
    }
}
