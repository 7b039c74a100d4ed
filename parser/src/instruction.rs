use std::fmt::{self, Display, Formatter};

use crate::expression::Expression;
use crate::value::{Value, ValueType};

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Program { name: String },
    ConstBlock,
    VarBlock,
    MainBlock,
    DeclareConst { name: String, value: Value },
    DeclareVar { value_type: ValueType, name: String },
    AssignVar { name: String, expression: Expression },
    /// Target is a bare variable or an expression that yields the variable's name.
    Read { target: Expression },
    Write { arguments: Vec<Expression> },
    If { condition: Expression, paired_else: bool },
    Else,
    While { condition: Expression },
}

impl Instruction {
    /// Whether the next stored instruction becomes this node's body.
    pub fn opens_body(&self) -> bool {
        use Instruction::*;
        match self {
            ConstBlock | VarBlock | MainBlock | If { .. } | Else | While { .. } => true,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        use Instruction::*;
        match self {
            Program { .. } => "Program",
            ConstBlock => "ConstBlock",
            VarBlock => "VarBlock",
            MainBlock => "MainBlock",
            DeclareConst { .. } => "DeclareConst",
            DeclareVar { .. } => "DeclareVar",
            AssignVar { .. } => "AssignVar",
            Read { .. } => "Read",
            Write { .. } => "Write",
            If { .. } => "If",
            Else => "Else",
            While { .. } => "While",
        }
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(text) => format!("\"{}\"", text),
        other => other.to_string(),
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        write!(f, "{}(", self.name())?;
        match self {
            Program { name } => write!(f, "{}", name)?,
            DeclareConst { name, value } => write!(f, "{}, {}", name, literal(value))?,
            DeclareVar { value_type, name } => write!(f, "{}, {}", value_type, name)?,
            AssignVar { name, expression } => write!(f, "{}, [{}]", name, expression)?,
            Read { target } => write!(f, "[{}]", target)?,
            Write { arguments } => {
                let arguments: Vec<_> = arguments.iter()
                    .map(|argument| format!("[{}]", argument))
                    .collect();
                write!(f, "{}", arguments.join(", "))?
            },
            If { condition, paired_else } => {
                write!(f, "[{}]", condition)?;
                if *paired_else {
                    write!(f, ", paired")?;
                }
            },
            While { condition } => write!(f, "[{}]", condition)?,
            ConstBlock | VarBlock | MainBlock | Else => {},
        }
        write!(f, ")")
    }
}
