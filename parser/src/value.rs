use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use crate::error::EvalError;
use crate::expression::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Double,
    String,
}

impl ValueType {
    /// Maps a type name from a declaration to its tag.
    pub fn from_name(name: &str) -> Option<ValueType> {
        match name.to_ascii_lowercase().as_str() {
            "int" | "integer" => Some(ValueType::Int),
            "double" | "real" => Some(ValueType::Double),
            "string" => Some(ValueType::String),
            _ => None,
        }
    }

    pub fn default_value(self) -> Value {
        match self {
            ValueType::Int => Value::Int(0),
            ValueType::Double => Value::Double(0.0),
            ValueType::String => Value::String(String::new()),
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => write!(f, "int"),
            ValueType::Double => write!(f, "double"),
            ValueType::String => write!(f, "string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Double(f64),
    String(String),
}

enum Numbers {
    Ints(i64, i64),
    Doubles(f64, f64),
}

fn numbers(left: &Value, right: &Value) -> Option<Numbers> {
    use Value::*;
    match (left, right) {
        (Int(a), Int(b)) => Some(Numbers::Ints(*a, *b)),
        (Int(a), Double(b)) => Some(Numbers::Doubles(*a as f64, *b)),
        (Double(a), Int(b)) => Some(Numbers::Doubles(*a, *b as f64)),
        (Double(a), Double(b)) => Some(Numbers::Doubles(*a, *b)),
        _ => None,
    }
}

/// Longest string a repetition may build, in bytes.
pub const MAX_STRING_LEN: usize = 1 << 24;

fn repeat(text: &str, count: i64) -> Result<Value, EvalError> {
    if count < 0 {
        return Err(EvalError::NegativeRepetition { count });
    }

    match text.len().checked_mul(count as usize) {
        Some(len) if len <= MAX_STRING_LEN => Ok(Value::String(text.repeat(count as usize))),
        _ => Err(EvalError::Overflow { operation: Operation::Multiply }),
    }
}

fn truth(value: bool) -> Value {
    Value::Int(value as i64)
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(value) => *value != 0,
            Value::Double(value) => *value != 0.0,
            Value::String(value) => !value.is_empty(),
        }
    }

    /// Builds a value from free-form text: int if possible, then a finite
    /// double, otherwise the text itself.
    pub fn from_input(text: &str) -> Value {
        let text = text.trim();
        if let Ok(value) = text.parse::<i64>() {
            return Value::Int(value);
        }

        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Value::Double(value),
            _ => Value::String(text.to_owned()),
        }
    }

    fn unsupported(&self, operation: Operation, rhs: &Value) -> EvalError {
        EvalError::UnsupportedOperands {
            operation,
            left: self.value_type(),
            right: rhs.value_type(),
        }
    }

    pub fn add(&self, rhs: &Value) -> Result<Value, EvalError> {
        let operation = Operation::Add;
        if let (Value::String(a), Value::String(b)) = (self, rhs) {
            return Ok(Value::String(format!("{}{}", a, b)));
        }

        match numbers(self, rhs) {
            Some(Numbers::Ints(a, b)) => a.checked_add(b)
                .map(Value::Int)
                .ok_or(EvalError::Overflow { operation }),
            Some(Numbers::Doubles(a, b)) => Ok(Value::Double(a + b)),
            None => Err(self.unsupported(operation, rhs)),
        }
    }

    pub fn subtract(&self, rhs: &Value) -> Result<Value, EvalError> {
        let operation = Operation::Subtract;
        match numbers(self, rhs) {
            Some(Numbers::Ints(a, b)) => a.checked_sub(b)
                .map(Value::Int)
                .ok_or(EvalError::Overflow { operation }),
            Some(Numbers::Doubles(a, b)) => Ok(Value::Double(a - b)),
            None => Err(self.unsupported(operation, rhs)),
        }
    }

    pub fn multiply(&self, rhs: &Value) -> Result<Value, EvalError> {
        let operation = Operation::Multiply;
        match (self, rhs) {
            (Value::Int(count), Value::String(text)) | (Value::String(text), Value::Int(count)) => {
                return repeat(text, *count);
            },
            _ => {},
        }

        match numbers(self, rhs) {
            Some(Numbers::Ints(a, b)) => a.checked_mul(b)
                .map(Value::Int)
                .ok_or(EvalError::Overflow { operation }),
            Some(Numbers::Doubles(a, b)) => Ok(Value::Double(a * b)),
            None => Err(self.unsupported(operation, rhs)),
        }
    }

    pub fn divide(&self, rhs: &Value) -> Result<Value, EvalError> {
        let operation = Operation::Divide;
        match numbers(self, rhs) {
            Some(Numbers::Ints(_, 0)) => Err(EvalError::DivisionByZero),
            Some(Numbers::Ints(a, b)) => a.checked_div(b)
                .map(Value::Int)
                .ok_or(EvalError::Overflow { operation }),
            Some(Numbers::Doubles(a, b)) => Ok(Value::Double(a / b)),
            None => Err(self.unsupported(operation, rhs)),
        }
    }

    pub fn modulo(&self, rhs: &Value) -> Result<Value, EvalError> {
        let operation = Operation::Mod;
        match numbers(self, rhs) {
            Some(Numbers::Ints(_, 0)) => Err(EvalError::DivisionByZero),
            Some(Numbers::Ints(a, b)) => a.checked_rem(b)
                .map(Value::Int)
                .ok_or(EvalError::Overflow { operation }),
            Some(Numbers::Doubles(a, b)) => Ok(Value::Double(a % b)),
            None => Err(self.unsupported(operation, rhs)),
        }
    }

    pub fn int_div(&self, rhs: &Value) -> Result<Value, EvalError> {
        let operation = Operation::IntDiv;
        match numbers(self, rhs) {
            Some(Numbers::Ints(_, 0)) => Err(EvalError::DivisionByZero),
            Some(Numbers::Ints(a, b)) => a.checked_div(b)
                .map(Value::Int)
                .ok_or(EvalError::Overflow { operation }),
            Some(Numbers::Doubles(_, b)) if b == 0.0 => Err(EvalError::DivisionByZero),
            Some(Numbers::Doubles(a, b)) => {
                let quotient = (a / b).trunc();
                if quotient >= i64::MIN as f64 && quotient < i64::MAX as f64 {
                    Ok(Value::Int(quotient as i64))
                } else {
                    Err(EvalError::Overflow { operation })
                }
            },
            None => Err(self.unsupported(operation, rhs)),
        }
    }

    fn ordering(&self, rhs: &Value, operation: Operation) -> Result<Option<Ordering>, EvalError> {
        if let (Value::String(a), Value::String(b)) = (self, rhs) {
            return Ok(Some(a.cmp(b)));
        }

        match numbers(self, rhs) {
            Some(Numbers::Ints(a, b)) => Ok(Some(a.cmp(&b))),
            Some(Numbers::Doubles(a, b)) => Ok(a.partial_cmp(&b)),
            None => Err(self.unsupported(operation, rhs)),
        }
    }

    /// Applies one of the six comparison operations, yielding `Int(0)` or `Int(1)`.
    pub fn compare(&self, rhs: &Value, operation: Operation) -> Result<Value, EvalError> {
        use Ordering::*;
        let ordering = self.ordering(rhs, operation)?;
        let result = match operation {
            Operation::Equal => ordering == Some(Equal),
            Operation::NotEqual => ordering != Some(Equal),
            Operation::Less => ordering == Some(Less),
            Operation::LessEqual => ordering == Some(Less) || ordering == Some(Equal),
            Operation::More => ordering == Some(Greater),
            Operation::MoreEqual => ordering == Some(Greater) || ordering == Some(Equal),
            _ => return Err(self.unsupported(operation, rhs)),
        };

        Ok(truth(result))
    }

    pub fn and(&self, rhs: &Value) -> Value {
        truth(self.is_truthy() && rhs.is_truthy())
    }

    pub fn or(&self, rhs: &Value) -> Value {
        truth(self.is_truthy() || rhs.is_truthy())
    }

    pub fn not(&self) -> Value {
        truth(!self.is_truthy())
    }

    pub fn negate(&self) -> Result<Value, EvalError> {
        let operation = Operation::Negate;
        match self {
            Value::Int(value) => value.checked_neg()
                .map(Value::Int)
                .ok_or(EvalError::Overflow { operation }),
            Value::Double(value) => Ok(Value::Double(-value)),
            Value::String(_) => Err(EvalError::UnsupportedOperand {
                operation,
                operand: self.value_type(),
            }),
        }
    }

    pub fn sin(&self) -> Result<Value, EvalError> {
        match self {
            Value::Int(value) => Ok(Value::Double((*value as f64).sin())),
            Value::Double(value) => Ok(Value::Double(value.sin())),
            Value::String(_) => Err(EvalError::UnsupportedOperand {
                operation: Operation::Sin,
                operand: self.value_type(),
            }),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Double(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn int_arithmetic_stays_int() {
        assert_eq!(Value::Int(3).add(&Value::Int(4)), Ok(Value::Int(7)));
        assert_eq!(Value::Int(3).subtract(&Value::Int(4)), Ok(Value::Int(-1)));
        assert_eq!(Value::Int(3).multiply(&Value::Int(4)), Ok(Value::Int(12)));
    }

    #[test]
    fn int_division_truncates_toward_zero() {
        assert_eq!(Value::Int(7).divide(&Value::Int(2)), Ok(Value::Int(3)));
        assert_eq!(Value::Int(-7).divide(&Value::Int(2)), Ok(Value::Int(-3)));
        assert_eq!(Value::Int(-7).modulo(&Value::Int(2)), Ok(Value::Int(-1)));
        assert_eq!(Value::Int(-7).int_div(&Value::Int(2)), Ok(Value::Int(-3)));
    }

    #[test]
    fn division_by_zero() {
        let error = Value::Int(1).divide(&Value::Int(0)).unwrap_err();
        assert_eq!(error, EvalError::DivisionByZero);
        assert_eq!(error.kind(), ErrorKind::Runtime);
        assert_eq!(Value::Int(1).modulo(&Value::Int(0)), Err(EvalError::DivisionByZero));
        assert_eq!(Value::Double(1.0).int_div(&Value::Int(0)), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn mixed_numbers_promote_to_double() {
        assert_eq!(Value::Int(1).add(&Value::Double(0.5)), Ok(Value::Double(1.5)));
        assert_eq!(Value::Double(3.0).divide(&Value::Int(2)), Ok(Value::Double(1.5)));
        assert_eq!(Value::Double(7.5).int_div(&Value::Int(2)), Ok(Value::Int(3)));
        assert_eq!(
            Value::Double(9_223_372_036_854_775_808.0).int_div(&Value::Int(1)),
            Err(EvalError::Overflow { operation: Operation::IntDiv }),
        );
        assert_eq!(Value::Double(-9_223_372_036_854_775_808.0).int_div(&Value::Int(1)), Ok(Value::Int(i64::MIN)));
        assert_eq!(Value::Double(7.5).modulo(&Value::Int(2)), Ok(Value::Double(1.5)));
    }

    #[test]
    fn strings() {
        assert_eq!(s("ab").add(&s("cd")), Ok(s("abcd")));
        assert_eq!(s("ab").multiply(&Value::Int(3)), Ok(s("ababab")));
        assert_eq!(Value::Int(2).multiply(&s("x")), Ok(s("xx")));
        assert_eq!(Value::Int(0).multiply(&s("x")), Ok(s("")));
        assert_eq!(
            Value::Int(-1).multiply(&s("x")),
            Err(EvalError::NegativeRepetition { count: -1 }),
        );
    }

    #[test]
    fn oversized_repetition_is_an_error() {
        let overflow = Err(EvalError::Overflow { operation: Operation::Multiply });
        assert_eq!(s("abc").multiply(&Value::Int(i64::MAX)), overflow);
        assert_eq!(Value::Int(MAX_STRING_LEN as i64 + 1).multiply(&s("x")), overflow);
        assert_eq!(s("").multiply(&Value::Int(i64::MAX)), Ok(s("")));

        let text = s("x").multiply(&Value::Int(MAX_STRING_LEN as i64)).unwrap();
        assert_eq!(text.to_string().len(), MAX_STRING_LEN);
    }

    #[test]
    fn unsupported_operands() {
        let error = s("a").add(&Value::Int(1)).unwrap_err();
        assert_eq!(error, EvalError::UnsupportedOperands {
            operation: Operation::Add,
            left: ValueType::String,
            right: ValueType::Int,
        });
        assert_eq!(error.kind(), ErrorKind::Type);
        assert!(s("a").subtract(&s("b")).is_err());
        assert!(s("a").multiply(&Value::Double(2.0)).is_err());
        assert!(s("a").sin().is_err());
    }

    #[test]
    fn comparisons() {
        let compare = |a: Value, b: Value, op| a.compare(&b, op).unwrap();
        assert_eq!(compare(Value::Int(1), Value::Int(2), Operation::Less), Value::Int(1));
        assert_eq!(compare(Value::Int(2), Value::Double(2.0), Operation::Equal), Value::Int(1));
        assert_eq!(compare(s("baa"), s("bag"), Operation::More), Value::Int(0));
        assert_eq!(compare(s("baa"), s("bag"), Operation::Less), Value::Int(1));
        assert_eq!(compare(s("bag"), s("bag"), Operation::MoreEqual), Value::Int(1));
        assert_eq!(compare(s("bag"), s("bay"), Operation::LessEqual), Value::Int(1));
        assert_eq!(compare(Value::Double(f64::NAN), Value::Double(1.0), Operation::NotEqual), Value::Int(1));
        assert!(s("1").compare(&Value::Int(1), Operation::Equal).is_err());
    }

    #[test]
    fn logic_uses_truthiness() {
        assert_eq!(Value::Int(2).and(&s("x")), Value::Int(1));
        assert_eq!(Value::Double(0.0).or(&s("")), Value::Int(0));
        assert_eq!(s("").not(), Value::Int(1));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            Value::Int(i64::MAX).add(&Value::Int(1)),
            Err(EvalError::Overflow { operation: Operation::Add }),
        );
        assert!(Value::Int(i64::MIN).negate().is_err());
    }

    #[test]
    fn sin_returns_double() {
        assert_eq!(Value::Int(0).sin(), Ok(Value::Double(0.0)));
    }

    #[test]
    fn input_parsing() {
        assert_eq!(Value::from_input(" 5 "), Value::Int(5));
        assert_eq!(Value::from_input("007"), Value::Int(7));
        assert_eq!(Value::from_input("5.5"), Value::Double(5.5));
        assert_eq!(Value::from_input("abc"), s("abc"));
        assert_eq!(Value::from_input("NaN"), s("NaN"));
        assert_eq!(Value::from_input("5,5"), s("5,5"));
    }

    #[test]
    fn printing() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Double(2.5).to_string(), "2.5");
        assert_eq!(s("text").to_string(), "text");
    }

    #[test]
    fn type_names() {
        assert_eq!(ValueType::from_name("Integer"), Some(ValueType::Int));
        assert_eq!(ValueType::from_name("real"), Some(ValueType::Double));
        assert_eq!(ValueType::from_name("bool"), None);
        assert_eq!(ValueType::String.default_value(), s(""));
    }
}
