use std::collections::BTreeMap;

use parser::expression::Environment;
use parser::{NodeId, Value, ValueType};

use crate::world::{ReadRequest, RunStatus};
use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub value: Value,
    pub constant: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    variables: BTreeMap<String, Variable>,
}

impl VariableTable {
    pub fn new() -> Self {
        VariableTable::default()
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables.iter().map(|(name, variable)| (name.as_str(), variable))
    }

    pub fn declare(&mut self, name: &str, value: Value, constant: bool) -> Result<(), Error> {
        if self.variables.contains_key(name) {
            return Err(Error::Redeclaration { name: name.to_owned() });
        }

        self.variables.insert(name.to_owned(), Variable { value, constant });
        Ok(())
    }

    /// Type of a variable that may be written to.
    pub fn writable_type(&self, name: &str) -> Result<ValueType, Error> {
        match self.variables.get(name) {
            None => Err(Error::UnknownVariable { name: name.to_owned() }),
            Some(variable) if variable.constant => Err(Error::ConstantAssignment { name: name.to_owned() }),
            Some(variable) => Ok(variable.value.value_type()),
        }
    }

    /// Binds a new value. The value must have the variable's type; an int
    /// widens into a double variable.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), Error> {
        let expected = self.writable_type(name)?;
        let value = match (expected, value) {
            (ValueType::Double, Value::Int(int)) => Value::Double(int as f64),
            (expected, value) if value.value_type() == expected => value,
            (expected, value) => {
                return Err(Error::TypeMismatch {
                    name: name.to_owned(),
                    expected,
                    found: value.value_type(),
                })
            },
        };

        if let Some(variable) = self.variables.get_mut(name) {
            variable.value = value;
        }
        Ok(())
    }
}

impl Environment for VariableTable {
    fn value_of(&self, name: &str) -> Option<&Value> {
        self.variables.get(name).map(|variable| &variable.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Resume(NodeId),
    Halt,
}

/// Everything one run of a program owns.
#[derive(Debug)]
pub struct ProgramState {
    pub variables: VariableTable,
    pub cursor: Option<NodeId>,
    pub status: RunStatus,
    pub pending: Option<ReadRequest>,
    pub error: Option<Error>,
    continuations: Vec<Continuation>,
    branching: Vec<bool>,
    log: Vec<String>,
}

impl ProgramState {
    pub fn new(start: Option<NodeId>) -> Self {
        ProgramState {
            variables: VariableTable::new(),
            cursor: start,
            status: RunStatus::Running,
            pending: None,
            error: None,
            continuations: vec![Continuation::Halt],
            branching: vec![],
            log: vec![],
        }
    }

    pub fn push_continuation(&mut self, continuation: Continuation) {
        self.continuations.push(continuation);
    }

    /// Pops the next place to resume at. `Halt` yields no node.
    pub fn pop_continuation(&mut self) -> Result<Option<NodeId>, Error> {
        match self.continuations.pop() {
            Some(Continuation::Resume(node)) => Ok(Some(node)),
            Some(Continuation::Halt) => Ok(None),
            None => Err(Error::MalformedTree { reason: "continuation stack is empty" }),
        }
    }

    pub fn push_branch(&mut self, taken: bool) {
        self.branching.push(taken);
    }

    pub fn pop_branch(&mut self) -> Option<bool> {
        self.branching.pop()
    }

    pub fn append_log(&mut self, entry: String) {
        self.log.push(entry);
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }
}
