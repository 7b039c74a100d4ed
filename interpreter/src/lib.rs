use std::cell::RefCell;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use parser::{ErrorKind, EvalError, Expression, Instruction, InstructionTree, Node, NodeId, Value, ValueType};
use thiserror::Error;

pub mod run;
pub mod state;
pub mod world;

use crate::state::{Continuation, ProgramState, VariableTable};
use crate::world::{ReadRequest, RunStatus, World};

const CRASH_PREFIX: &str = "PROGRAM CRASH DETECTED: ";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("NameError: unknown variable '{name}'")]
    UnknownVariable { name: String },
    #[error("NameError: '{name}' is already declared")]
    Redeclaration { name: String },
    #[error("NameError: cannot assign to constant '{name}'")]
    ConstantAssignment { name: String },
    #[error("NameError: else without matching if")]
    ElseWithoutIf,
    #[error("TypeError: cannot store a {found} value in {expected} variable '{name}'")]
    TypeMismatch {
        name: String,
        expected: ValueType,
        found: ValueType,
    },
    #[error("TypeError: read target must be a variable or a string naming one, got {found}")]
    InvalidReadTarget { found: ValueType },
    #[error("RuntimeError: input {text} does not fit an int")]
    InputOverflow { text: String },
    #[error("RuntimeError: malformed instruction tree: {reason}")]
    MalformedTree { reason: &'static str },
    #[error("RuntimeError: input delivered for a read that is not pending")]
    WrongInputRequest,
    #[error("RuntimeError: program asked for more input than was provided")]
    InputExhausted,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            Eval(error) => error.kind(),
            UnknownVariable { .. } | Redeclaration { .. } | ConstantAssignment { .. } | ElseWithoutIf => ErrorKind::Name,
            TypeMismatch { .. } | InvalidReadTarget { .. } => ErrorKind::Type,
            InputOverflow { .. } | MalformedTree { .. } | WrongInputRequest | InputExhausted => ErrorKind::Runtime,
        }
    }
}

type IResult = Result<(), Error>;

/// Where step 2 moved the cursor before the instruction ran.
struct Advance {
    pushed_sibling: bool,
    popped: Option<Option<NodeId>>,
}

/// Walks an instruction tree. Runs until the program finishes, crashes or
/// needs input; input is handed back through `deliver_input`.
pub struct Interpreter {
    world: Rc<RefCell<dyn World>>,
    tree: InstructionTree,
    state: ProgramState,
}

impl Debug for Interpreter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Interpreter {{")?;
        writeln!(f, "    status: {:?}", self.state.status)?;
        writeln!(f, "    variables: {:?}", self.state.variables)?;
        match self.state.cursor {
            Some(node) => writeln!(f, "    {}: {:?}", node, self.tree.instruction(node))?,
            None => writeln!(f, "    no current instruction")?,
        }
        writeln!(f, "}}")
    }
}

impl Interpreter {
    pub fn new(world: Rc<RefCell<dyn World>>, tree: InstructionTree) -> Interpreter {
        let state = ProgramState::new(tree.root());
        Interpreter { world, tree, state }
    }

    fn log(&self, args: fmt::Arguments) {
        self.world.borrow_mut().log(args);
    }

    pub fn status(&self) -> RunStatus {
        self.state.status
    }

    pub fn pending_request(&self) -> Option<&ReadRequest> {
        self.state.pending.as_ref()
    }

    pub fn variables(&self) -> &VariableTable {
        &self.state.variables
    }

    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.state.variables.get(name).map(|variable| &variable.value)
    }

    /// Program output and the crash message, in order.
    pub fn execution_log(&self) -> &[String] {
        self.state.log()
    }

    /// The error that crashed the run.
    pub fn error(&self) -> Option<&Error> {
        self.state.error.as_ref()
    }

    pub fn tree(&self) -> &InstructionTree {
        &self.tree
    }

    /// Steps until the program stops running.
    pub fn run(&mut self) -> RunStatus {
        while self.state.status == RunStatus::Running {
            if let Err(error) = self.interpret_single() {
                self.crash(error);
            }
        }

        self.state.status
    }

    /// Resumes a run suspended on `request`. Input that cannot be stored in
    /// the target variable crashes the run.
    pub fn deliver_input(&mut self, request: &ReadRequest, text: &str) -> Result<RunStatus, Error> {
        if self.state.status != RunStatus::WaitingForInput || self.state.pending.as_ref() != Some(request) {
            return Err(Error::WrongInputRequest);
        }

        self.state.pending = None;
        self.state.status = RunStatus::Running;
        self.log(format_args!("input for {}: {:?}", request.variable, text));

        if let Err(error) = self.bind_input(&request.variable, text) {
            self.crash(error);
            return Ok(self.state.status);
        }

        Ok(self.run())
    }

    fn bind_input(&mut self, name: &str, text: &str) -> IResult {
        let expected = self.state.variables.writable_type(name)?;
        let input = Value::from_input(text);

        let value = match (expected, input) {
            (ValueType::String, _) => Value::String(text.trim().to_owned()),
            (ValueType::Int, Value::Double(double)) => {
                let rounded = double.round();
                if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                    return Err(Error::InputOverflow { text: text.trim().to_owned() });
                }
                Value::Int(rounded as i64)
            },
            (_, input) => input,
        };

        self.state.variables.assign(name, value.clone())?;
        self.log(format_args!("read: {} <- {}", name, value));
        Ok(())
    }

    fn crash(&mut self, error: Error) {
        let message = format!("{}{}", CRASH_PREFIX, error);
        self.log(format_args!("{}", message));
        self.state.append_log(message);
        self.state.error = Some(error);
        self.state.pending = None;
        self.state.status = RunStatus::Crashed;
        self.world.borrow_mut().run_finished(RunStatus::Crashed);
    }

    fn finish(&mut self) {
        self.state.status = RunStatus::Finished;
        self.log(format_args!("finished"));
        self.world.borrow_mut().run_finished(RunStatus::Finished);
    }

    /// Moves the cursor to where execution continues by default: into the
    /// body, to the sibling, or back to the innermost continuation.
    fn advance(&mut self, node: &Node) -> Result<Advance, Error> {
        match (node.body, node.sibling) {
            (Some(body), sibling) => {
                if let Some(sibling) = sibling {
                    self.state.push_continuation(Continuation::Resume(sibling));
                }
                self.state.cursor = Some(body);
                Ok(Advance { pushed_sibling: sibling.is_some(), popped: None })
            },
            (None, Some(sibling)) => {
                self.state.cursor = Some(sibling);
                Ok(Advance { pushed_sibling: false, popped: None })
            },
            (None, None) => {
                let next = self.state.pop_continuation()?;
                self.state.cursor = next;
                Ok(Advance { pushed_sibling: false, popped: Some(next) })
            },
        }
    }

    /// Leaves the body the cursor just descended into.
    fn skip_body(&mut self, node: &Node) -> IResult {
        if node.body.is_some() {
            self.state.cursor = self.state.pop_continuation()?;
        }
        Ok(())
    }

    fn evaluate(&self, expression: &Expression) -> Result<Value, Error> {
        Ok(expression.evaluate(&self.state.variables)?)
    }

    /// Executes one instruction. Does nothing unless the run is `Running`.
    pub fn interpret_single(&mut self) -> IResult {
        if self.state.status != RunStatus::Running {
            return Ok(());
        }

        let current = match self.state.cursor {
            Some(current) => current,
            None => {
                self.finish();
                return Ok(());
            },
        };

        let node = self.tree.get(current)
            .cloned()
            .ok_or(Error::MalformedTree { reason: "cursor points outside the tree" })?;
        let advance = self.advance(&node)?;

        self.log(format_args!("{}: {}", current, node.instruction));
        match &node.instruction {
            Instruction::Program { .. } | Instruction::ConstBlock | Instruction::VarBlock | Instruction::MainBlock => {},
            Instruction::DeclareConst { name, value } => {
                self.state.variables.declare(name, value.clone(), true)?;
            },
            Instruction::DeclareVar { value_type, name } => {
                self.state.variables.declare(name, value_type.default_value(), false)?;
            },
            Instruction::AssignVar { name, expression } => {
                let value = self.evaluate(expression)?;
                self.log(format_args!("assign: {} <- {}", name, &value));
                self.state.variables.assign(name, value)?;
            },
            Instruction::Read { target } => {
                let variable = self.read_target(target)?;
                let value_type = self.state.variables.writable_type(&variable)?;
                let request = ReadRequest { node: current, variable, value_type };

                self.state.pending = Some(request.clone());
                self.state.status = RunStatus::WaitingForInput;
                self.world.borrow_mut().request_input(&request);
            },
            Instruction::Write { arguments } => {
                let mut text = String::new();
                for argument in arguments {
                    text.push_str(&self.evaluate(argument)?.to_string());
                }
                self.state.append_log(text.clone());
                self.world.borrow_mut().output(&text);
            },
            Instruction::If { condition, paired_else } => {
                let taken = self.evaluate(condition)?.is_truthy();
                self.log(format_args!("if: {}", taken));
                if *paired_else {
                    self.state.push_branch(taken);
                }
                if !taken {
                    self.skip_body(&node)?;
                }
            },
            Instruction::Else => {
                let taken = self.state.pop_branch().ok_or(Error::ElseWithoutIf)?;
                if taken {
                    self.skip_body(&node)?;
                }
            },
            Instruction::While { condition } => {
                let taken = self.evaluate(condition)?.is_truthy();
                self.log(format_args!("while: {}", taken));
                if !taken {
                    self.skip_body(&node)?;
                } else if node.body.is_some() {
                    if advance.pushed_sibling {
                        self.state.pop_continuation()?;
                    }
                    self.state.push_continuation(Continuation::Resume(current));
                } else {
                    // empty body: spin on the condition
                    if let Some(popped) = advance.popped {
                        self.state.push_continuation(match popped {
                            Some(node) => Continuation::Resume(node),
                            None => Continuation::Halt,
                        });
                    }
                    self.state.cursor = Some(current);
                }
            },
        }

        Ok(())
    }

    fn read_target(&self, target: &Expression) -> Result<String, Error> {
        if let Some(name) = target.as_variable() {
            return Ok(name.to_owned());
        }

        match self.evaluate(target)? {
            Value::String(name) => Ok(name),
            other => Err(Error::InvalidReadTarget { found: other.value_type() }),
        }
    }
}
