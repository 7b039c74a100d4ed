use crate::error::SyntaxError;
use crate::expression::Expression;
use crate::instruction::Instruction;
use crate::lexer::{Token, TokenKind};
use crate::value::{Value, ValueType};

#[derive(Debug, Default)]
pub struct ProgramHeader {
    pub name: Option<String>,
}

#[derive(Debug, Default)]
pub struct ConstantDeclaration {
    pub name: String,
    pub value_type: Option<ValueType>,
    pub negative: bool,
    pub value: Option<Value>,
}

#[derive(Debug, Default)]
pub struct VariableDeclaration {
    pub names: Vec<String>,
    pub value_type: Option<ValueType>,
}

#[derive(Debug, Default)]
pub struct AssignVariable {
    pub name: String,
    pub expression: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Write,
    WriteLn,
    Read,
    ReadLn,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Function> {
        match name.to_ascii_lowercase().as_str() {
            "write" => Some(Function::Write),
            "writeln" => Some(Function::WriteLn),
            "read" => Some(Function::Read),
            "readln" => Some(Function::ReadLn),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct FunctionCall {
    pub name: String,
    pub function: Function,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    If,
    While,
}

#[derive(Debug)]
pub struct Branch {
    pub kind: BranchKind,
    pub condition: Option<Expression>,
}

/// Fields collected for the grammar rule being analysed. Only one is alive at
/// a time; starting a new rule drops the previous one.
#[derive(Debug)]
pub enum Accumulator {
    Empty,
    Program(ProgramHeader),
    Constant(ConstantDeclaration),
    Variables(VariableDeclaration),
    Statement { name: String },
    Assign(AssignVariable),
    Call(FunctionCall),
    Branch(Branch),
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator::Empty
    }
}

macro_rules! slot {
    ($method:ident, $variant:ident, $type:ty) => {
        pub fn $method(&mut self) -> Result<&mut $type, SyntaxError> {
            match self {
                Accumulator::$variant(fields) => Ok(fields),
                _ => Err(SyntaxError::internal(concat!("accumulator is not ", stringify!($variant)))),
            }
        }
    };
}

impl Accumulator {
    slot!(program, Program, ProgramHeader);
    slot!(constant, Constant, ConstantDeclaration);
    slot!(variables, Variables, VariableDeclaration);
    slot!(assign, Assign, AssignVariable);
    slot!(call, Call, FunctionCall);
    slot!(branch, Branch, Branch);

    pub fn statement_name(&self) -> Result<&str, SyntaxError> {
        match self {
            Accumulator::Statement { name } => Ok(name),
            _ => Err(SyntaxError::internal("accumulator is not Statement")),
        }
    }

    /// Turns the collected fields into instructions, leaving the slot empty.
    pub fn collapse(&mut self) -> Result<Vec<Instruction>, SyntaxError> {
        let missing = || SyntaxError::internal("accumulator collapsed before it was complete");

        let instructions = match std::mem::take(self) {
            Accumulator::Program(header) => vec![Instruction::Program { name: header.name.ok_or_else(missing)? }],
            Accumulator::Constant(constant) => vec![Instruction::DeclareConst {
                name: constant.name,
                value: constant.value.ok_or_else(missing)?,
            }],
            Accumulator::Variables(variables) => {
                let value_type = variables.value_type.ok_or_else(missing)?;
                variables.names.into_iter()
                    .map(|name| Instruction::DeclareVar { value_type, name })
                    .collect()
            },
            Accumulator::Assign(assign) => vec![Instruction::AssignVar {
                name: assign.name,
                expression: assign.expression.ok_or_else(missing)?,
            }],
            Accumulator::Call(call) => vec![call.collapse()?],
            Accumulator::Branch(branch) => {
                let condition = branch.condition.ok_or_else(missing)?;
                vec![match branch.kind {
                    BranchKind::If => Instruction::If { condition, paired_else: false },
                    BranchKind::While => Instruction::While { condition },
                }]
            },
            Accumulator::Empty | Accumulator::Statement { .. } => return Err(missing()),
        };

        Ok(instructions)
    }
}

pub fn type_from_token(token: &Token) -> Result<ValueType, SyntaxError> {
    if !token.is(TokenKind::Name) {
        return Err(SyntaxError::unexpected(token, "a type name"));
    }

    ValueType::from_name(&token.text).ok_or_else(|| SyntaxError::UnknownType {
        name: token.text.clone(),
        position: token.position,
    })
}

impl ConstantDeclaration {
    pub fn new(name: &str) -> Self {
        ConstantDeclaration {
            name: name.to_owned(),
            ..ConstantDeclaration::default()
        }
    }

    /// Parses the literal and checks it against the declared type. An int
    /// literal widens into a double constant.
    pub fn set_value(&mut self, token: &Token) -> Result<(), SyntaxError> {
        let invalid = || SyntaxError::InvalidLiteral {
            text: token.text.clone(),
            position: token.position,
        };
        let sign = if self.negative { "-" } else { "" };

        let value = match token.kind {
            TokenKind::Int => format!("{}{}", sign, token.text).parse().map(Value::Int).map_err(|_| invalid())?,
            TokenKind::Double => format!("{}{}", sign, token.text).parse().map(Value::Double).map_err(|_| invalid())?,
            TokenKind::Str if !self.negative => Value::String(token.text.clone()),
            _ => return Err(SyntaxError::unexpected(token, "a literal")),
        };

        let expected = self.value_type.ok_or_else(|| SyntaxError::internal("constant type not set"))?;
        let value = match (expected, value) {
            (ValueType::Double, Value::Int(int)) => Value::Double(int as f64),
            (expected, value) if value.value_type() == expected => value,
            (expected, value) => {
                return Err(SyntaxError::IncorrectInitialization {
                    name: self.name.clone(),
                    expected,
                    found: value.value_type(),
                })
            },
        };

        self.value = Some(value);
        Ok(())
    }
}

impl FunctionCall {
    pub fn new(name: &str, token: &Token) -> Result<Self, SyntaxError> {
        let function = Function::from_name(name).ok_or_else(|| SyntaxError::UnknownFunction {
            name: name.to_owned(),
            position: token.position,
        })?;

        Ok(FunctionCall {
            name: name.to_owned(),
            function,
            arguments: vec![],
        })
    }

    fn collapse(self) -> Result<Instruction, SyntaxError> {
        let FunctionCall { name, function, mut arguments } = self;
        match function {
            Function::Write => Ok(Instruction::Write { arguments }),
            Function::WriteLn => {
                arguments.push(Expression::literal(Value::from("\n")));
                Ok(Instruction::Write { arguments })
            },
            Function::Read | Function::ReadLn => {
                if arguments.len() != 1 {
                    return Err(SyntaxError::ArgumentCount { name, expected: 1, found: arguments.len() });
                }
                let target = arguments.remove(0);
                Ok(Instruction::Read { target })
            },
        }
    }
}
