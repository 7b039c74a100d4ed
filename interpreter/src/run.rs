use std::cell::RefCell;
use std::io::{self, BufRead as _};
use std::rc::Rc;

use parser::InstructionTree;

use crate::world::{self, ConsoleWorld, MemoryWorld, RunStatus};
use crate::{Error, Interpreter};

type RunResult = Result<String, Error>;

/// Runs a program against scripted inputs and returns everything it wrote.
pub fn run<S: Into<String>>(tree: InstructionTree, inputs: Vec<S>) -> RunResult {
    run_debug(tree, inputs).0
}

/// Like `run`, also returning the trace the interpreter logged.
pub fn run_debug<S: Into<String>>(tree: InstructionTree, inputs: Vec<S>) -> (RunResult, Vec<String>) {
    let world = Rc::new(RefCell::new(MemoryWorld::new(inputs)));
    let mut interpreter = Interpreter::new(world::upcast(Rc::clone(&world)), tree);
    let result = drive(&mut interpreter, || world.borrow_mut().next_input());
    let logs = world.borrow().logs().map(str::to_owned).collect();

    let result = result.map(|()| world.borrow().output_text());
    (result, logs)
}

/// Runs on the console, reading one line of stdin per input request.
pub fn run_interactive(tree: InstructionTree, verbose: bool) -> io::Result<RunStatus> {
    let world = Rc::new(RefCell::new(ConsoleWorld::new(verbose)));
    let mut interpreter = Interpreter::new(world::upcast(world), tree);

    let mut status = interpreter.run();
    while status == RunStatus::WaitingForInput {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }

        let request = match interpreter.pending_request() {
            Some(request) => request.clone(),
            None => break,
        };
        status = interpreter.deliver_input(&request, &line).unwrap_or(RunStatus::Crashed);
    }

    if status == RunStatus::Crashed {
        if let Some(message) = interpreter.execution_log().last() {
            eprintln!("\n{}", message);
        }
    }
    Ok(status)
}

fn drive<F: FnMut() -> Option<String>>(interpreter: &mut Interpreter, mut next_input: F) -> Result<(), Error> {
    let mut status = interpreter.run();
    while status == RunStatus::WaitingForInput {
        let request = interpreter.pending_request()
            .cloned()
            .ok_or(Error::MalformedTree { reason: "waiting without a pending read" })?;
        let input = next_input().ok_or(Error::InputExhausted)?;
        status = interpreter.deliver_input(&request, &input)?;
    }

    match interpreter.error() {
        Some(error) => Err(error.clone()),
        None => Ok(()),
    }
}
