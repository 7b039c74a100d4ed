extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod analysis;
pub mod error;
pub mod expression;
pub mod instruction;
pub mod lexer;
pub mod tree;
pub mod value;

use std::fs;
use std::path::Path;

pub use crate::analysis::{AnalysisMachine, Status};
pub use crate::error::{AnalysisError, ErrorKind, EvalError, SyntaxError};
pub use crate::expression::{Environment, Expression, ExpressionElement, Operation};
pub use crate::instruction::Instruction;
pub use crate::lexer::{tokenize, LexError, Position, Token, TokenKind};
pub use crate::tree::{InstructionTree, Node, NodeId};
pub use crate::value::{Value, ValueType};

type TreeResult = Result<InstructionTree, Vec<AnalysisError>>;

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<TreeResult, std::io::Error> {
    let program_text = fs::read_to_string(path)?;
    Ok(parse_program(&program_text))
}

/// Tokenizes and analyses a whole program.
pub fn parse_program(text: &str) -> TreeResult {
    let tokens = tokenize(text).map_err(|e| vec![e.into()])?;

    let mut machine = AnalysisMachine::new();
    machine.analyze(&tokens);
    machine.finish()
}
