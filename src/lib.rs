use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use interpreter::world::{ReadRequest, RunStatus, World};
use interpreter::{Error, Interpreter};
use parser::{tokenize, AnalysisError, AnalysisMachine, InstructionTree};

pub use interpreter;
pub use parser;

type AnalysisResult = Result<InstructionTree, Vec<AnalysisError>>;

/// Embedding entry point: analyses source text and drives one run of it at
/// a time.
#[derive(Default)]
pub struct Pascalizer {
    machine: AnalysisMachine,
    interpreter: Option<Interpreter>,
}

impl Pascalizer {
    pub fn new() -> Self {
        Pascalizer::default()
    }

    /// Tokenizes and analyses `source` from scratch. Drops any current run.
    pub fn analyze(&mut self, source: &str) -> AnalysisResult {
        self.reset();

        let tokens = tokenize(source).map_err(|e| vec![e.into()])?;
        self.machine.analyze(&tokens);
        mem::take(&mut self.machine).finish()
    }

    /// Analyses `source` and runs it until it finishes, crashes or asks for
    /// input. Nothing runs when the analysis fails.
    pub fn run(&mut self, source: &str, world: Rc<RefCell<dyn World>>) -> Result<RunStatus, Vec<AnalysisError>> {
        let tree = self.analyze(source)?;

        let mut interpreter = Interpreter::new(world, tree);
        let status = interpreter.run();
        self.interpreter = Some(interpreter);
        Ok(status)
    }

    pub fn deliver_input(&mut self, request: &ReadRequest, text: &str) -> Result<RunStatus, Error> {
        match &mut self.interpreter {
            Some(interpreter) => interpreter.deliver_input(request, text),
            None => Err(Error::WrongInputRequest),
        }
    }

    pub fn interpreter(&self) -> Option<&Interpreter> {
        self.interpreter.as_ref()
    }

    pub fn status(&self) -> Option<RunStatus> {
        self.interpreter.as_ref().map(Interpreter::status)
    }

    pub fn reset(&mut self) {
        self.machine.reset();
        self.interpreter = None;
    }
}
