use crate::error::SyntaxError;
use crate::instruction::Instruction;
use crate::lexer::{Token, TokenKind};

use super::accumulator::{
    type_from_token, Accumulator, AssignVariable, Branch, BranchKind, ConstantDeclaration, FunctionCall,
    ProgramHeader, VariableDeclaration,
};
use super::{Context, FrameKind, GraphBuilder, Owner, State, StateId, Transition};

type Result<T> = std::result::Result<T, SyntaxError>;

fn expect(token: &Token, kind: TokenKind, expected: &'static str) -> Result<()> {
    if token.is(kind) {
        Ok(())
    } else {
        Err(SyntaxError::unexpected(token, expected))
    }
}

/// Tokens that may directly follow a statement without a separator.
fn ends_statement(token: &Token) -> bool {
    use TokenKind::*;
    match token.kind {
        EndLine | End | Else | ProgramEnd => true,
        _ => false,
    }
}

/// Wires every state of the analysis graph and returns the starting one.
pub(super) fn build_graph(graph: &mut GraphBuilder) -> StateId {
    let header = graph.reserve();
    let const_block = graph.reserve();
    let const_declaration = graph.reserve();
    let var_block = graph.reserve();
    let var_declaration = graph.reserve();
    let exit_to_const = graph.reserve();
    let exit_to_var = graph.reserve();
    let exit_to_main = graph.reserve();
    let main_block = graph.reserve();
    let statement = graph.reserve();
    let name = graph.reserve();
    let assign = graph.reserve();
    let call = graph.reserve();
    let branching = graph.reserve();
    let if_state = graph.reserve();
    let while_state = graph.reserve();
    let else_state = graph.reserve();
    let one_liner = graph.reserve();
    let sub_block = graph.reserve();
    let end_block = graph.reserve();

    let sections = Sections { constants: const_block, variables: var_block, main: main_block };
    let exits = Sections { constants: exit_to_const, variables: exit_to_var, main: exit_to_main };

    graph.define(header, ProgramHeaderState { sections, step: HeaderStep::Keyword });
    graph.define(const_block, SectionBlock { kind: SectionKind::Const, declaration: const_declaration });
    graph.define(const_declaration, ConstDeclarationState { this: const_declaration, exits, step: ConstStep::Colon });
    graph.define(var_block, SectionBlock { kind: SectionKind::Var, declaration: var_declaration });
    graph.define(var_declaration, VarDeclarationState { this: var_declaration, exits, step: VarStep::AfterName });
    graph.define(exit_to_const, BlockExit { target: const_block });
    graph.define(exit_to_var, BlockExit { target: var_block });
    graph.define(exit_to_main, BlockExit { target: main_block });
    graph.define(main_block, MainBlockBegin { statement });
    graph.define(statement, Statement { name, branching, sub_block, end_block, else_state });
    graph.define(name, NameState { assign, call });
    graph.define(assign, VariableAssign { statement });
    graph.define(call, FunctionCallState { statement, step: CallStep::First });
    graph.define(branching, Branching { if_state, while_state });
    graph.define(if_state, Condition { kind: BranchKind::If, one_liner, awaiting_body: false });
    graph.define(while_state, Condition { kind: BranchKind::While, one_liner, awaiting_body: false });
    graph.define(else_state, ElseState { one_liner });
    graph.define(one_liner, OneLiner { statement, sub_block });
    graph.define(sub_block, SubBlockBegin { statement });
    graph.define(end_block, EndBlock { statement });

    header
}

#[derive(Debug, Clone, Copy)]
struct Sections {
    constants: StateId,
    variables: StateId,
    main: StateId,
}

impl Sections {
    fn route(self, token: &Token, expected: &'static str) -> Result<Transition> {
        match token.kind {
            TokenKind::Const => Ok(Transition::Goto(self.constants)),
            TokenKind::Var => Ok(Transition::Goto(self.variables)),
            TokenKind::Begin => Ok(Transition::Goto(self.main)),
            _ => Err(SyntaxError::unexpected(token, expected)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderStep {
    Keyword,
    Name,
    Separator,
    Sections,
}

/// `program <name> ;` followed by the first section keyword.
struct ProgramHeaderState {
    sections: Sections,
    step: HeaderStep,
}

impl State for ProgramHeaderState {
    fn name(&self) -> &'static str {
        "ProgramHeader"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        self.step = HeaderStep::Keyword;
        self.process(context, token)
    }

    fn process(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        match self.step {
            HeaderStep::Keyword => {
                expect(token, TokenKind::Program, "'program'")?;
                context.accumulator = Accumulator::Program(ProgramHeader::default());
                self.step = HeaderStep::Name;
            },
            HeaderStep::Name => {
                expect(token, TokenKind::Name, "a program name")?;
                context.accumulator.program()?.name = Some(token.text.clone());
                self.step = HeaderStep::Separator;
            },
            HeaderStep::Separator => {
                expect(token, TokenKind::EndLine, "';'")?;
                context.store_accumulated()?;
                self.step = HeaderStep::Sections;
            },
            HeaderStep::Sections => return self.sections.route(token, "'const', 'var' or 'begin'"),
        }

        Ok(Transition::Stay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Const,
    Var,
}

/// Stores the section marker; declarations become its body.
struct SectionBlock {
    kind: SectionKind,
    declaration: StateId,
}

impl State for SectionBlock {
    fn name(&self) -> &'static str {
        match self.kind {
            SectionKind::Const => "ConstBlock",
            SectionKind::Var => "VarBlock",
        }
    }

    fn enter(&mut self, context: &mut Context, _token: &Token) -> Result<Transition> {
        let marker = match self.kind {
            SectionKind::Const => Instruction::ConstBlock,
            SectionKind::Var => Instruction::VarBlock,
        };
        context.store(marker)?;
        Ok(Transition::Stay)
    }

    fn process(&mut self, _context: &mut Context, token: &Token) -> Result<Transition> {
        let expected = match self.kind {
            SectionKind::Const => "a constant name",
            SectionKind::Var => "a variable name",
        };
        expect(token, TokenKind::Name, expected)?;
        Ok(Transition::Goto(self.declaration))
    }
}

const AFTER_DECLARATION: &str = "a name, 'const', 'var' or 'begin'";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstStep {
    Colon,
    Type,
    Equals,
    Literal,
    Separator,
    Next,
}

/// `<name> : <type> = [-]<literal> ;`
struct ConstDeclarationState {
    this: StateId,
    exits: Sections,
    step: ConstStep,
}

impl State for ConstDeclarationState {
    fn name(&self) -> &'static str {
        "ConstDeclaration"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        expect(token, TokenKind::Name, "a constant name")?;
        context.accumulator = Accumulator::Constant(ConstantDeclaration::new(&token.text));
        self.step = ConstStep::Colon;
        Ok(Transition::Stay)
    }

    fn process(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        match self.step {
            ConstStep::Colon => {
                expect(token, TokenKind::Colon, "':'")?;
                self.step = ConstStep::Type;
            },
            ConstStep::Type => {
                context.accumulator.constant()?.value_type = Some(type_from_token(token)?);
                self.step = ConstStep::Equals;
            },
            ConstStep::Equals => {
                if !token.is_operator("=") {
                    return Err(SyntaxError::unexpected(token, "'='"));
                }
                self.step = ConstStep::Literal;
            },
            ConstStep::Literal => {
                let constant = context.accumulator.constant()?;
                if token.is_operator("-") && !constant.negative {
                    constant.negative = true;
                } else {
                    constant.set_value(token)?;
                    self.step = ConstStep::Separator;
                }
            },
            ConstStep::Separator => {
                expect(token, TokenKind::EndLine, "';'")?;
                context.store_accumulated()?;
                self.step = ConstStep::Next;
            },
            ConstStep::Next if token.is(TokenKind::Name) => return Ok(Transition::Goto(self.this)),
            ConstStep::Next => return self.exits.route(token, AFTER_DECLARATION),
        }

        Ok(Transition::Stay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarStep {
    AfterName,
    Name,
    Type,
    Separator,
    Next,
}

/// `<name> {, <name>} : <type> ;`
struct VarDeclarationState {
    this: StateId,
    exits: Sections,
    step: VarStep,
}

impl State for VarDeclarationState {
    fn name(&self) -> &'static str {
        "VarDeclaration"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        expect(token, TokenKind::Name, "a variable name")?;
        context.accumulator = Accumulator::Variables(VariableDeclaration {
            names: vec![token.text.clone()],
            value_type: None,
        });
        self.step = VarStep::AfterName;
        Ok(Transition::Stay)
    }

    fn process(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        match self.step {
            VarStep::AfterName => {
                self.step = match token.kind {
                    TokenKind::Comma => VarStep::Name,
                    TokenKind::Colon => VarStep::Type,
                    _ => return Err(SyntaxError::unexpected(token, "',' or ':'")),
                };
            },
            VarStep::Name => {
                expect(token, TokenKind::Name, "a variable name")?;
                context.accumulator.variables()?.names.push(token.text.clone());
                self.step = VarStep::AfterName;
            },
            VarStep::Type => {
                context.accumulator.variables()?.value_type = Some(type_from_token(token)?);
                self.step = VarStep::Separator;
            },
            VarStep::Separator if token.is_operator("=") => {
                let name = context.accumulator.variables()?.names.join(", ");
                return Err(SyntaxError::VariableInitialization { name, position: token.position });
            },
            VarStep::Separator => {
                expect(token, TokenKind::EndLine, "';'")?;
                context.store_accumulated()?;
                self.step = VarStep::Next;
            },
            VarStep::Next if token.is(TokenKind::Name) => return Ok(Transition::Goto(self.this)),
            VarStep::Next => return self.exits.route(token, AFTER_DECLARATION),
        }

        Ok(Transition::Stay)
    }
}

/// Closes the current declaration section and passes the token on.
struct BlockExit {
    target: StateId,
}

impl State for BlockExit {
    fn name(&self) -> &'static str {
        "BlockExit"
    }

    fn enter(&mut self, context: &mut Context, _token: &Token) -> Result<Transition> {
        context.close_section();
        Ok(Transition::Goto(self.target))
    }

    fn process(&mut self, _context: &mut Context, _token: &Token) -> Result<Transition> {
        Err(SyntaxError::internal("block exit kept control"))
    }
}

struct MainBlockBegin {
    statement: StateId,
}

impl State for MainBlockBegin {
    fn name(&self) -> &'static str {
        "MainBlockBegin"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        expect(token, TokenKind::Begin, "'begin'")?;
        let node = context.store(Instruction::MainBlock)?;
        context.open_frame(FrameKind::Block, Owner::Main, Some(node));
        Ok(Transition::Stay)
    }

    fn process(&mut self, _context: &mut Context, _token: &Token) -> Result<Transition> {
        Ok(Transition::Goto(self.statement))
    }
}

/// Start of a statement. Also settles bodies once the previous statement
/// is known to be complete.
struct Statement {
    name: StateId,
    branching: StateId,
    sub_block: StateId,
    end_block: StateId,
    else_state: StateId,
}

impl State for Statement {
    fn name(&self) -> &'static str {
        "Statement"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        // separator of the statement that just completed
        if token.is(TokenKind::EndLine) && context.statement_done() {
            return Ok(Transition::Stay);
        }
        self.process(context, token)
    }

    fn process(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        if context.statement_done() {
            context.settle(token);
        }

        let next = match token.kind {
            TokenKind::Name => self.name,
            TokenKind::If | TokenKind::While => self.branching,
            TokenKind::Begin => self.sub_block,
            TokenKind::End | TokenKind::ProgramEnd => self.end_block,
            TokenKind::Else => self.else_state,
            TokenKind::EndLine => {
                context.complete_statement();
                return Ok(Transition::Stay);
            },
            _ => return Err(SyntaxError::unexpected(token, "a statement")),
        };

        Ok(Transition::Goto(next))
    }
}

/// A statement starting with a name: assignment or call.
struct NameState {
    assign: StateId,
    call: StateId,
}

impl State for NameState {
    fn name(&self) -> &'static str {
        "Name"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        context.accumulator = Accumulator::Statement { name: token.text.clone() };
        Ok(Transition::Stay)
    }

    fn process(&mut self, _context: &mut Context, token: &Token) -> Result<Transition> {
        match token.kind {
            TokenKind::Assign => Ok(Transition::Goto(self.assign)),
            TokenKind::BracketOpen => Ok(Transition::Goto(self.call)),
            _ => Err(SyntaxError::unexpected(token, "':=' or '('")),
        }
    }
}

struct VariableAssign {
    statement: StateId,
}

impl State for VariableAssign {
    fn name(&self) -> &'static str {
        "VariableAssign"
    }

    fn enter(&mut self, context: &mut Context, _token: &Token) -> Result<Transition> {
        let name = context.accumulator.statement_name()?.to_owned();
        context.accumulator = Accumulator::Assign(AssignVariable { name, expression: None });
        Ok(Transition::Stay)
    }

    fn process(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        let expression = match context.parse_expression(token)? {
            Some(expression) => expression,
            None => return Ok(Transition::Stay),
        };

        if !ends_statement(token) {
            return Err(SyntaxError::unexpected(token, "';'"));
        }

        context.accumulator.assign()?.expression = Some(expression);
        context.store_accumulated()?;
        context.complete_statement();
        Ok(Transition::Goto(self.statement))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallStep {
    First,
    Argument,
    Close,
}

/// `<name> ( [<expr> {, <expr>}] )`
struct FunctionCallState {
    statement: StateId,
    step: CallStep,
}

impl State for FunctionCallState {
    fn name(&self) -> &'static str {
        "FunctionCall"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        let name = context.accumulator.statement_name()?.to_owned();
        context.accumulator = Accumulator::Call(FunctionCall::new(&name, token)?);
        self.step = CallStep::First;
        Ok(Transition::Stay)
    }

    fn process(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        if self.step == CallStep::First {
            if token.is(TokenKind::BracketClose) {
                self.step = CallStep::Close;
                return Ok(Transition::Stay);
            }
            self.step = CallStep::Argument;
        }

        if self.step == CallStep::Argument {
            if let Some(argument) = context.parse_expression(token)? {
                context.accumulator.call()?.arguments.push(argument);
                match token.kind {
                    TokenKind::Comma => {},
                    TokenKind::BracketClose => self.step = CallStep::Close,
                    _ => return Err(SyntaxError::unexpected(token, "',' or ')'")),
                }
            }
            return Ok(Transition::Stay);
        }

        if !ends_statement(token) {
            return Err(SyntaxError::unexpected(token, "';'"));
        }

        context.store_accumulated()?;
        context.complete_statement();
        Ok(Transition::Goto(self.statement))
    }
}

struct Branching {
    if_state: StateId,
    while_state: StateId,
}

impl State for Branching {
    fn name(&self) -> &'static str {
        "Branching"
    }

    fn enter(&mut self, _context: &mut Context, token: &Token) -> Result<Transition> {
        match token.kind {
            TokenKind::If => Ok(Transition::Goto(self.if_state)),
            TokenKind::While => Ok(Transition::Goto(self.while_state)),
            _ => Err(SyntaxError::unexpected(token, "'if' or 'while'")),
        }
    }

    fn process(&mut self, _context: &mut Context, _token: &Token) -> Result<Transition> {
        Err(SyntaxError::internal("branching kept control"))
    }
}

/// Condition of an `if` or `while`, up to `then`/`do`.
struct Condition {
    kind: BranchKind,
    one_liner: StateId,
    awaiting_body: bool,
}

impl State for Condition {
    fn name(&self) -> &'static str {
        match self.kind {
            BranchKind::If => "If",
            BranchKind::While => "While",
        }
    }

    fn enter(&mut self, context: &mut Context, _token: &Token) -> Result<Transition> {
        context.accumulator = Accumulator::Branch(Branch { kind: self.kind, condition: None });
        self.awaiting_body = false;
        Ok(Transition::Stay)
    }

    fn process(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        if self.awaiting_body {
            return Ok(Transition::Goto(self.one_liner));
        }

        let condition = match context.parse_expression(token)? {
            Some(condition) => condition,
            None => return Ok(Transition::Stay),
        };

        let owner = match (self.kind, token.kind) {
            (BranchKind::If, TokenKind::Then) => Owner::If,
            (BranchKind::While, TokenKind::Then) | (BranchKind::While, TokenKind::Do) => Owner::While,
            (BranchKind::If, _) => return Err(SyntaxError::unexpected(token, "'then'")),
            (BranchKind::While, _) => return Err(SyntaxError::unexpected(token, "'do'")),
        };

        context.accumulator.branch()?.condition = Some(condition);
        let node = context.store_accumulated()?
            .ok_or_else(|| SyntaxError::internal("branch stored no instruction"))?;
        context.await_body(owner, node);
        self.awaiting_body = true;
        Ok(Transition::Stay)
    }
}

struct ElseState {
    one_liner: StateId,
}

impl State for ElseState {
    fn name(&self) -> &'static str {
        "Else"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        context.pair_else(token)?;
        let node = context.store(Instruction::Else)?;
        context.await_body(Owner::Else, node);
        Ok(Transition::Stay)
    }

    fn process(&mut self, _context: &mut Context, _token: &Token) -> Result<Transition> {
        Ok(Transition::Goto(self.one_liner))
    }
}

/// Decides between a `begin ... end` body and a single-statement body.
struct OneLiner {
    statement: StateId,
    sub_block: StateId,
}

impl State for OneLiner {
    fn name(&self) -> &'static str {
        "OneLiner"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        if token.is(TokenKind::Begin) {
            return Ok(Transition::Goto(self.sub_block));
        }

        let (owner, node) = context.take_body_owner()
            .ok_or_else(|| SyntaxError::internal("one-liner without an owner"))?;
        context.open_frame(FrameKind::OneLiner, owner, Some(node));
        Ok(Transition::Goto(self.statement))
    }

    fn process(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        self.enter(context, token)
    }
}

struct SubBlockBegin {
    statement: StateId,
}

impl State for SubBlockBegin {
    fn name(&self) -> &'static str {
        "SubBlockBegin"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        expect(token, TokenKind::Begin, "'begin'")?;
        match context.take_body_owner() {
            Some((owner, node)) => context.open_frame(FrameKind::Block, owner, Some(node)),
            None => context.open_frame(FrameKind::Block, Owner::Compound, None),
        }
        Ok(Transition::Stay)
    }

    fn process(&mut self, _context: &mut Context, _token: &Token) -> Result<Transition> {
        Ok(Transition::Goto(self.statement))
    }
}

/// `end` closing a block, or `end.` closing the main block.
struct EndBlock {
    statement: StateId,
}

impl State for EndBlock {
    fn name(&self) -> &'static str {
        "EndBlock"
    }

    fn enter(&mut self, context: &mut Context, token: &Token) -> Result<Transition> {
        let frame = context.top_frame().ok_or_else(|| SyntaxError::UnmatchedEnd {
            text: token.text.clone(),
            position: token.position,
        })?;

        if frame.kind == FrameKind::OneLiner {
            return Err(SyntaxError::unexpected(token, "a statement"));
        }

        match (token.kind, frame.owner) {
            (TokenKind::End, Owner::Main) => Err(SyntaxError::unexpected(token, "'end.'")),
            (TokenKind::End, _) => {
                context.end_block();
                Ok(Transition::Stay)
            },
            (TokenKind::ProgramEnd, Owner::Main) => {
                context.close_frame();
                context.finish_program();
                Ok(Transition::Stay)
            },
            (TokenKind::ProgramEnd, _) => Err(SyntaxError::unexpected(token, "'end'")),
            _ => Err(SyntaxError::unexpected(token, "'end'")),
        }
    }

    fn process(&mut self, _context: &mut Context, _token: &Token) -> Result<Transition> {
        Ok(Transition::Goto(self.statement))
    }
}
