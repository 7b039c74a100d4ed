use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use crate::error::EvalError;
use crate::value::Value;

mod builder;
pub use builder::{ExpressionBuilder, Feed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    IntDiv,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    More,
    MoreEqual,
    And,
    Or,
    Not,
    Negate,
    Sin,
}

impl Operation {
    /// Binary operator spelled by an operator token.
    pub fn binary(text: &str) -> Option<Operation> {
        use Operation::*;
        let operation = match text.to_ascii_lowercase().as_str() {
            "+" => Add,
            "-" => Subtract,
            "*" => Multiply,
            "/" => Divide,
            "mod" => Mod,
            "div" => IntDiv,
            "=" => Equal,
            "<>" => NotEqual,
            "<" => Less,
            "<=" => LessEqual,
            ">" => More,
            ">=" => MoreEqual,
            "and" => And,
            "or" => Or,
            _ => return None,
        };

        Some(operation)
    }

    /// Built-in function called as `name(argument)`.
    pub fn function(name: &str) -> Option<Operation> {
        match name.to_ascii_lowercase().as_str() {
            "sin" => Some(Operation::Sin),
            _ => None,
        }
    }

    pub fn arity(self) -> usize {
        use Operation::*;
        match self {
            Not | Negate | Sin => 1,
            _ => 2,
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        use Operation::*;
        match self {
            Or => 1,
            And => 2,
            Equal | NotEqual | Less | LessEqual | More | MoreEqual => 3,
            Add | Subtract => 4,
            Multiply | Divide | Mod | IntDiv => 5,
            Not | Negate | Sin => 6,
        }
    }

    pub fn is_prefix(self) -> bool {
        self.arity() == 1
    }

    /// Pops this operation's operands (rightmost on top) and pushes the result.
    pub fn apply(self, stack: &mut Vec<Value>) -> Result<(), EvalError> {
        use Operation::*;
        let underflow = EvalError::StackUnderflow { operation: self };

        let result = if self.arity() == 1 {
            let operand = stack.pop().ok_or(underflow)?;
            match self {
                Not => operand.not(),
                Negate => operand.negate()?,
                Sin => operand.sin()?,
                _ => unreachable!(),
            }
        } else {
            let rhs = stack.pop().ok_or_else(|| underflow.clone())?;
            let lhs = stack.pop().ok_or(underflow)?;
            match self {
                Add => lhs.add(&rhs)?,
                Subtract => lhs.subtract(&rhs)?,
                Multiply => lhs.multiply(&rhs)?,
                Divide => lhs.divide(&rhs)?,
                Mod => lhs.modulo(&rhs)?,
                IntDiv => lhs.int_div(&rhs)?,
                Equal | NotEqual | Less | LessEqual | More | MoreEqual => lhs.compare(&rhs, self)?,
                And => lhs.and(&rhs),
                Or => lhs.or(&rhs),
                Not | Negate | Sin => unreachable!(),
            }
        };

        stack.push(result);
        Ok(())
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use Operation::*;
        let text = match self {
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Mod => "mod",
            IntDiv => "div",
            Equal => "=",
            NotEqual => "<>",
            Less => "<",
            LessEqual => "<=",
            More => ">",
            MoreEqual => ">=",
            And => "and",
            Or => "or",
            Not => "not",
            Negate => "neg",
            Sin => "sin",
        };

        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionElement {
    Literal(Value),
    Variable(String),
    Operation(Operation),
}

impl Display for ExpressionElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionElement::Literal(Value::String(text)) => write!(f, "\"{}\"", text),
            ExpressionElement::Literal(value) => write!(f, "{}", value),
            ExpressionElement::Variable(name) => write!(f, "{}", name),
            ExpressionElement::Operation(operation) => write!(f, "{}", operation),
        }
    }
}

/// Lookup of variable values during evaluation.
pub trait Environment {
    fn value_of(&self, name: &str) -> Option<&Value>;
}

impl Environment for BTreeMap<String, Value> {
    fn value_of(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// An expression in postfix order.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    postfix: Vec<ExpressionElement>,
}

impl Expression {
    pub fn new(postfix: Vec<ExpressionElement>) -> Expression {
        Expression { postfix }
    }

    pub fn literal(value: Value) -> Expression {
        Expression::new(vec![ExpressionElement::Literal(value)])
    }

    pub fn elements(&self) -> &[ExpressionElement] {
        &self.postfix
    }

    /// Name of the variable when the expression is nothing but that variable.
    pub fn as_variable(&self) -> Option<&str> {
        match self.postfix.as_slice() {
            [ExpressionElement::Variable(name)] => Some(name),
            _ => None,
        }
    }

    pub fn evaluate<E: Environment + ?Sized>(&self, environment: &E) -> Result<Value, EvalError> {
        let substituted = self.postfix.iter()
            .map(|element| match element {
                ExpressionElement::Variable(name) => environment.value_of(name)
                    .cloned()
                    .map(ExpressionElement::Literal)
                    .ok_or_else(|| EvalError::UnknownVariable { name: name.clone() }),
                other => Ok(other.clone()),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut stack = Vec::with_capacity(substituted.len());
        for element in substituted {
            match element {
                ExpressionElement::Literal(value) => stack.push(value),
                ExpressionElement::Operation(operation) => operation.apply(&mut stack)?,
                ExpressionElement::Variable(_) => unreachable!("variables substituted above"),
            }
        }

        match (stack.pop(), stack.len()) {
            (Some(value), 0) => Ok(value),
            (None, _) => Err(EvalError::UnbalancedExpression { count: 0 }),
            (Some(_), rest) => Err(EvalError::UnbalancedExpression { count: rest + 1 }),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for element in &self.postfix {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", element)?;
            first = false;
        }

        Ok(())
    }
}
