use std::cell::RefCell;
use std::rc::Rc;

use interpreter::world::{self, MemoryWorld, RunStatus};
use interpreter::Error;
use parser::{AnalysisError, Instruction, SyntaxError};
use pascalizer::Pascalizer;

const ECHO: &str = "
program echo;
var name: string; times: int;
begin
    Read(name);
    Read(times);
    while times > 0 do
    begin
        WriteLn('hello ', name);
        times := times - 1
    end
end.
";

fn memory_world() -> Rc<RefCell<MemoryWorld>> {
    Rc::new(RefCell::new(MemoryWorld::new(Vec::<String>::new())))
}

#[test]
fn analyze_builds_tree() {
    let mut session = Pascalizer::new();
    let tree = session.analyze("program test; begin end.").unwrap();
    assert_eq!(tree.instruction(tree.root().unwrap()), Some(&Instruction::Program { name: "test".to_owned() }));
    assert_eq!(session.status(), None);
}

#[test]
fn analysis_is_repeatable() {
    let mut session = Pascalizer::new();
    let first = session.analyze(ECHO).unwrap();
    let second = session.analyze(ECHO).unwrap();
    assert_eq!(first, second);
}

#[test]
fn analysis_errors_prevent_run() {
    let mut session = Pascalizer::new();
    let world = memory_world();

    let errors = session.run("program broken; begin x := ; end.", world::upcast(Rc::clone(&world))).unwrap_err();
    assert!(matches!(errors[0], AnalysisError::Syntax(_)));
    assert!(session.interpreter().is_none());
    assert!(world.borrow().finished().is_empty());

    let errors = session.analyze("program unfinished; begin").unwrap_err();
    assert_eq!(errors.last(), Some(&AnalysisError::Syntax(SyntaxError::MissingProgramEnd)));

    let errors = session.analyze("program t; begin # end.").unwrap_err();
    assert!(matches!(errors[0], AnalysisError::Lex(_)));
}

#[test]
fn run_with_input() {
    let mut session = Pascalizer::new();
    let world = memory_world();

    let status = session.run(ECHO, world::upcast(Rc::clone(&world))).unwrap();
    assert_eq!(status, RunStatus::WaitingForInput);

    let request = session.interpreter().and_then(|i| i.pending_request()).cloned().unwrap();
    assert_eq!(session.deliver_input(&request, "  Ada "), Ok(RunStatus::WaitingForInput));

    let request = session.interpreter().and_then(|i| i.pending_request()).cloned().unwrap();
    assert_eq!(request.variable, "times");
    assert_eq!(session.deliver_input(&request, "2"), Ok(RunStatus::Finished));

    assert_eq!(world.borrow().output_text(), "hello Ada\nhello Ada\n");
    assert_eq!(world.borrow().finished(), &[RunStatus::Finished]);
    assert_eq!(session.status(), Some(RunStatus::Finished));
}

#[test]
fn reset_drops_run() {
    let mut session = Pascalizer::new();
    let world = memory_world();

    session.run(ECHO, world::upcast(Rc::clone(&world))).unwrap();
    let request = session.interpreter().and_then(|i| i.pending_request()).cloned().unwrap();

    session.reset();
    assert_eq!(session.status(), None);
    assert_eq!(session.deliver_input(&request, "Ada"), Err(Error::WrongInputRequest));
}

#[test]
fn crash_is_reported() {
    let mut session = Pascalizer::new();
    let world = memory_world();

    let status = session.run(ECHO, world::upcast(Rc::clone(&world))).unwrap();
    assert_eq!(status, RunStatus::WaitingForInput);

    let request = session.interpreter().and_then(|i| i.pending_request()).cloned().unwrap();
    session.deliver_input(&request, "Ada").unwrap();
    let request = session.interpreter().and_then(|i| i.pending_request()).cloned().unwrap();

    assert_eq!(session.deliver_input(&request, "many"), Ok(RunStatus::Crashed));
    let log = session.interpreter().map(|i| i.execution_log().to_vec()).unwrap();
    assert!(log[0].starts_with("PROGRAM CRASH DETECTED: TypeError"));
    assert_eq!(world.borrow().finished(), &[RunStatus::Crashed]);
}
