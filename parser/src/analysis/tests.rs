use super::*;
use crate::lexer::{tokenize, LexError};
use crate::value::{Value, ValueType};

fn machine_for(text: &str) -> AnalysisMachine {
    let tokens = tokenize(text).unwrap();
    let mut machine = AnalysisMachine::new();
    machine.analyze(&tokens);
    machine
}

fn analyse(text: &str) -> InstructionTree {
    let machine = machine_for(text);
    match machine.finish() {
        Ok(tree) => tree,
        Err(errors) => panic!("analysis of {:?} failed: {:?}", text, errors),
    }
}

fn program(body: &str) -> String {
    format!("program test;\nvar x, y: int;\nbegin\n{}\nend.", body)
}

fn main_body(text: &str) -> String {
    let dump = analyse(text).dump();
    let mut lines = dump.lines().skip_while(|line| *line != "MainBlock()");
    lines.next();
    lines.map(|line| format!("{}\n", &line[2..])).collect()
}

fn syntax_error(text: &str) -> SyntaxError {
    match machine_for(text).finish() {
        Err(mut errors) => match errors.remove(0) {
            AnalysisError::Syntax(error) => error,
            other => panic!("expected a syntax error, got {:?}", other),
        },
        Ok(tree) => panic!("analysis unexpectedly succeeded:\n{}", tree),
    }
}

#[test]
fn empty_program() {
    let tree = analyse("program test; begin end.");
    let root = tree.root().unwrap();
    assert_eq!(tree.instruction(root), Some(&Instruction::Program { name: "test".to_owned() }));
    assert_eq!(tree.body(root), None);
    assert_eq!(tree.len(), 2);
}

#[test]
fn constant_declaration() {
    let tree = analyse("program test; const X: int = 3; begin end.");
    let marker = tree.sibling(tree.root().unwrap()).unwrap();
    assert_eq!(tree.instruction(marker), Some(&Instruction::ConstBlock));

    let declaration = tree.body(marker).unwrap();
    assert_eq!(
        tree.instruction(declaration),
        Some(&Instruction::DeclareConst { name: "X".to_owned(), value: Value::Int(3) }),
    );
}

#[test]
fn constant_literals() {
    let tree = analyse("program t; const A: double = 2; B: int = -4; C: string = \"s\"; begin end.");
    let constants: Vec<_> = tree.iter()
        .filter_map(|(_, node)| match &node.instruction {
            Instruction::DeclareConst { value, .. } => Some(value.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(constants, vec![Value::Double(2.0), Value::Int(-4), Value::from("s")]);
}

#[test]
fn sections_may_alternate() {
    let dump = analyse("program t; var a: int; const B: int = 1; var c: string; begin end.").dump();
    assert_eq!(dump, "\
Program(t)
VarBlock()
  DeclareVar(int, a)
ConstBlock()
  DeclareConst(B, 1)
VarBlock()
  DeclareVar(string, c)
MainBlock()
");
}

#[test]
fn if_else_one_liners() {
    let body = main_body(&program("if (0) then Write(\"a\") else Write(\"b\")"));
    assert_eq!(body, "\
If([0], paired)
  Write([\"a\"])
Else()
  Write([\"b\"])
");
}

#[test]
fn if_else_blocks() {
    let body = main_body(&program("if (x > 1) then begin x := 1; y := 2 end else begin end; x := 0;"));
    assert_eq!(body, "\
If([x 1 >], paired)
  AssignVar(x, [1])
  AssignVar(y, [2])
Else()
AssignVar(x, [0])
");
}

#[test]
fn if_without_else_is_not_paired() {
    let body = main_body(&program("if x then x := 1; y := 2"));
    assert_eq!(body, "If([x])\n  AssignVar(x, [1])\nAssignVar(y, [2])\n");
}

#[test]
fn dangling_else_binds_to_innermost_if() {
    let body = main_body(&program("if x then if y then x := 1 else x := 2; y := 3"));
    assert_eq!(body, "\
If([x])
  If([y], paired)
    AssignVar(x, [1])
  Else()
    AssignVar(x, [2])
AssignVar(y, [3])
");
}

#[test]
fn nested_one_liners_close_together() {
    let body = main_body(&program("while (x < 3) do if (y) then while y do y := y - 1; x := x + 1;"));
    assert_eq!(body, "\
While([x 3 <])
  If([y])
    While([y])
      AssignVar(y, [y 1 -])
AssignVar(x, [x 1 +])
");
}

#[test]
fn else_if_chain() {
    let body = main_body(&program("if x = 1 then y := 1 else if x = 2 then y := 2 else y := 3"));
    assert_eq!(body, "\
If([x 1 =], paired)
  AssignVar(y, [1])
Else()
  If([x 2 =], paired)
    AssignVar(y, [2])
  Else()
    AssignVar(y, [3])
");
}

#[test]
fn empty_statements() {
    let body = main_body(&program(";; x := 1;; if x then ; y := 2;"));
    assert_eq!(body, "AssignVar(x, [1])\nIf([x])\nAssignVar(y, [2])\n");
}

#[test]
fn compound_block_adds_no_level() {
    let body = main_body(&program("begin x := 1; begin y := 2 end end; x := 3"));
    assert_eq!(body, "AssignVar(x, [1])\nAssignVar(y, [2])\nAssignVar(x, [3])\n");
}

#[test]
fn calls() {
    let body = main_body(&program("Read(x); ReadLn('y'); Write(); write(x, 1 + 2)"));
    assert_eq!(body, "Read([x])\nRead([\"y\"])\nWrite()\nWrite([x], [1 2 +])\n");
}

#[test]
fn variable_declarations() {
    let tree = analyse("program t; var a, b: string; c: real; begin end.");
    let declared: Vec<_> = tree.iter()
        .filter_map(|(_, node)| match &node.instruction {
            Instruction::DeclareVar { value_type, name } => Some((*value_type, name.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(declared, vec![
        (ValueType::String, "a"),
        (ValueType::String, "b"),
        (ValueType::Double, "c"),
    ]);
}

#[test]
fn tree_shape_follows_nesting() {
    let tree = analyse(&program("while x do begin if y then begin while y do y := 0 end end"));
    // MainBlock > While > If > While > AssignVar, plus the header and declarations
    assert_eq!(tree.depth(), 4);
    assert_eq!(tree.len(), 9);
}

#[test]
fn reset_gives_identical_tree() {
    let tokens = tokenize(&program("if x then Write(1) else Write(2); while y do y := y - 1")).unwrap();
    let mut machine = AnalysisMachine::new();
    assert_eq!(machine.analyze(&tokens), Status::Finished);
    let first = machine.tree().clone();

    machine.reset();
    assert_eq!(machine.status(), Status::Working);
    assert!(machine.tree().is_empty());
    assert_eq!(machine.current_state(), "ProgramHeader");

    assert_eq!(machine.analyze(&tokens), Status::Finished);
    assert_eq!(machine.tree(), &first);
}

#[test]
fn tokens_after_end_are_ignored() {
    let tokens = tokenize("program t; begin end. garbage ( ;").unwrap();
    let mut machine = AnalysisMachine::new();
    let statuses: Vec<_> = tokens.iter().map(|token| machine.process(token)).collect();
    assert_eq!(statuses.last(), Some(&Status::Finished));
    assert!(machine.errors().is_empty());
}

#[test]
fn errors_latch() {
    let tokens = tokenize("program t; begin x := ; end.").unwrap();
    let mut machine = AnalysisMachine::new();
    for token in &tokens {
        machine.process(token);
    }
    assert_eq!(machine.status(), Status::Error);
    assert_eq!(machine.errors().len(), 1);
}

#[test]
fn wrong_token_is_lex_error() {
    let errors = machine_for("program t; begin x := 1 ? end.").finish().unwrap_err();
    assert!(matches!(errors[0], AnalysisError::Lex(LexError::UnrecognizedCharacter { .. })));
}

#[test]
fn syntax_errors() {
    assert!(matches!(syntax_error("begin end."), SyntaxError::UnexpectedToken { .. }));
    assert!(matches!(syntax_error("program t begin end."), SyntaxError::UnexpectedToken { .. }));
    assert!(matches!(
        syntax_error("program t; var a: int = 1; begin end."),
        SyntaxError::VariableInitialization { .. }
    ));
    assert!(matches!(
        syntax_error("program t; var a: bool; begin end."),
        SyntaxError::UnknownType { .. }
    ));
    assert!(matches!(
        syntax_error("program t; const A: int = 'x'; begin end."),
        SyntaxError::IncorrectInitialization { .. }
    ));
    assert!(matches!(syntax_error(&program("else x := 1")), SyntaxError::ElseWithoutIf { .. }));
    assert!(matches!(
        syntax_error(&program("while x do x := 1 else x := 2")),
        SyntaxError::ElseWithoutIf { .. }
    ));
    assert!(matches!(syntax_error(&program("x := 1 +")), SyntaxError::MissingOperand { .. }));
    assert!(matches!(syntax_error(&program("print(x)")), SyntaxError::UnknownFunction { .. }));
    assert!(matches!(syntax_error(&program("Read(x, y)")), SyntaxError::ArgumentCount { .. }));
    assert!(matches!(syntax_error(&program("if x do y := 1")), SyntaxError::UnexpectedToken { .. }));
    assert!(matches!(syntax_error(&program("if x then end")), SyntaxError::UnexpectedToken { .. }));
    assert!(matches!(syntax_error("program t; begin x := 1 end"), SyntaxError::UnexpectedToken { .. }));
    assert!(matches!(syntax_error("program t; begin begin end."), SyntaxError::UnexpectedToken { .. }));
}

#[test]
fn missing_program_end() {
    let errors = machine_for("program t; begin x := 1;").finish().unwrap_err();
    assert_eq!(errors, vec![AnalysisError::Syntax(SyntaxError::MissingProgramEnd)]);
}
