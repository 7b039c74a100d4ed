use std::cell::RefCell;
use std::fmt::{self, Display, Formatter};
use std::io::{self, Write as _};
use std::rc::Rc;

use parser::{NodeId, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    WaitingForInput,
    Finished,
    Crashed,
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use RunStatus::*;
        match self {
            Running => write!(f, "running"),
            WaitingForInput => write!(f, "waiting for input"),
            Finished => write!(f, "finished"),
            Crashed => write!(f, "crashed"),
        }
    }
}

/// Identifies a suspended `Read`. Input must be delivered against the
/// request that is currently pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub node: NodeId,
    pub variable: String,
    pub value_type: ValueType,
}

/// Everything a running program can observe or affect outside itself.
pub trait World {
    fn request_input(&mut self, request: &ReadRequest);
    fn output(&mut self, text: &str);
    fn log(&mut self, message: fmt::Arguments);
    fn run_finished(&mut self, status: RunStatus);
}

pub fn upcast<W: World + 'static>(world: Rc<RefCell<W>>) -> Rc<RefCell<dyn World>> {
    world
}

#[derive(Debug)]
pub struct ConsoleWorld {
    verbose: bool,
}

impl ConsoleWorld {
    pub fn new(verbose: bool) -> ConsoleWorld {
        ConsoleWorld { verbose }
    }
}

impl World for ConsoleWorld {
    fn request_input(&mut self, request: &ReadRequest) {
        print!("{}? ", request.variable);
        let _ = io::stdout().flush();
    }

    fn output(&mut self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    fn log(&mut self, message: fmt::Arguments) {
        if self.verbose {
            eprintln!("{}", message);
        }
    }

    fn run_finished(&mut self, status: RunStatus) {
        if self.verbose {
            eprintln!("run {}", status);
        }
    }
}

/// Scripted world for tests: inputs are queued up front, everything the
/// program does is recorded.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    inputs: Vec<String>,
    outputs: Vec<String>,
    logs: Vec<String>,
    requests: Vec<ReadRequest>,
    finished: Vec<RunStatus>,
}

impl MemoryWorld {
    pub fn new<S: Into<String>>(inputs: Vec<S>) -> MemoryWorld {
        let mut inputs: Vec<String> = inputs.into_iter().map(Into::into).collect();
        inputs.reverse();
        MemoryWorld {
            inputs,
            ..MemoryWorld::default()
        }
    }

    pub fn next_input(&mut self) -> Option<String> {
        self.inputs.pop()
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn output_text(&self) -> String {
        self.outputs.concat()
    }

    pub fn logs(&self) -> impl Iterator<Item = &str> {
        self.logs.iter().map(|s| s.as_str())
    }

    pub fn requests(&self) -> &[ReadRequest] {
        &self.requests
    }

    pub fn finished(&self) -> &[RunStatus] {
        &self.finished
    }
}

impl World for MemoryWorld {
    fn request_input(&mut self, request: &ReadRequest) {
        self.requests.push(request.clone());
    }

    fn output(&mut self, text: &str) {
        self.outputs.push(text.to_owned());
    }

    fn log(&mut self, message: fmt::Arguments) {
        self.logs.push(message.to_string());
    }

    fn run_finished(&mut self, status: RunStatus) {
        self.finished.push(status);
    }
}
