use thiserror::Error;

use crate::expression::Operation;
use crate::lexer::{LexError, Position, Token, TokenKind};
use crate::value::ValueType;

/// Error class of a failure raised while evaluating or executing code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Name,
    Runtime,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("TypeError: unsupported operands for {operation}: {left} and {right}")]
    UnsupportedOperands {
        operation: Operation,
        left: ValueType,
        right: ValueType,
    },
    #[error("TypeError: unsupported operand for {operation}: {operand}")]
    UnsupportedOperand {
        operation: Operation,
        operand: ValueType,
    },
    #[error("NameError: unknown variable '{name}'")]
    UnknownVariable { name: String },
    #[error("RuntimeError: division by zero")]
    DivisionByZero,
    #[error("RuntimeError: integer overflow in {operation}")]
    Overflow { operation: Operation },
    #[error("RuntimeError: negative repetition count {count}")]
    NegativeRepetition { count: i64 },
    #[error("RuntimeError: operand stack underflow at {operation}")]
    StackUnderflow { operation: Operation },
    #[error("RuntimeError: expression left {count} values on the stack")]
    UnbalancedExpression { count: usize },
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        use EvalError::*;
        match self {
            UnsupportedOperands { .. } | UnsupportedOperand { .. } => ErrorKind::Type,
            UnknownVariable { .. } => ErrorKind::Name,
            DivisionByZero
            | Overflow { .. }
            | NegativeRepetition { .. }
            | StackUnderflow { .. }
            | UnbalancedExpression { .. } => ErrorKind::Runtime,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("SyntaxError: unexpected {found} '{text}' at {position}, expected {expected}")]
    UnexpectedToken {
        found: TokenKind,
        text: String,
        position: Position,
        expected: &'static str,
    },
    #[error("SyntaxError: unknown type '{name}' at {position}")]
    UnknownType { name: String, position: Position },
    #[error("SyntaxError: invalid literal '{text}' at {position}")]
    InvalidLiteral { text: String, position: Position },
    #[error("SyntaxError: constant '{name}' of type {expected} cannot hold a {found} literal")]
    IncorrectInitialization {
        name: String,
        expected: ValueType,
        found: ValueType,
    },
    #[error("SyntaxError: variable '{name}' cannot be initialized in a var section (at {position})")]
    VariableInitialization { name: String, position: Position },
    #[error("SyntaxError: unknown function '{name}' at {position}")]
    UnknownFunction { name: String, position: Position },
    #[error("SyntaxError: {name} expects {expected} argument(s), got {found}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("SyntaxError: empty expression at {position}")]
    EmptyExpression { position: Position },
    #[error("SyntaxError: missing operand before '{text}' at {position}")]
    MissingOperand { text: String, position: Position },
    #[error("SyntaxError: else without matching if at {position}")]
    ElseWithoutIf { position: Position },
    #[error("SyntaxError: '{text}' closes a block that was never opened (at {position})")]
    UnmatchedEnd { text: String, position: Position },
    #[error("SyntaxError: missing program terminator 'end.'")]
    MissingProgramEnd,
    #[error("SyntaxError: internal analysis error: {message}")]
    Internal { message: &'static str },
}

impl SyntaxError {
    pub fn unexpected(token: &Token, expected: &'static str) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            found: token.kind,
            text: token.to_string(),
            position: token.position,
            expected,
        }
    }

    pub(crate) fn internal(message: &'static str) -> SyntaxError {
        SyntaxError::Internal { message }
    }
}

/// Anything that can stop the analysis machine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}
