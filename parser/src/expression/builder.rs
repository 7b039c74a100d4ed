use crate::error::SyntaxError;
use crate::lexer::{Token, TokenKind};
use crate::value::Value;

use super::{Expression, ExpressionElement, Operation};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Operation(Operation),
    Function(Operation),
    Bracket,
}

/// Result of feeding a single token.
#[derive(Debug, Clone, PartialEq)]
pub enum Feed {
    More,
    /// The fed token terminated the expression; it was not consumed.
    Complete(Expression),
}

/// Builds a postfix expression one token at a time.
#[derive(Debug, Default)]
pub struct ExpressionBuilder {
    output: Vec<ExpressionElement>,
    operators: Vec<Pending>,
    depth: usize,
    operand_seen: bool,
    after_operand: bool,
    awaiting_call: bool,
    last_name: Option<String>,
}

fn is_terminator(token: &Token) -> bool {
    use TokenKind::*;
    match token.kind {
        EndLine | Comma | BracketClose | Then | Do | Else | End | ProgramEnd => true,
        _ => false,
    }
}

fn literal(token: &Token) -> Result<Value, SyntaxError> {
    let invalid = || SyntaxError::InvalidLiteral {
        text: token.text.clone(),
        position: token.position,
    };

    match token.kind {
        TokenKind::Int => token.text.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
        TokenKind::Double => token.text.parse::<f64>().map(Value::Double).map_err(|_| invalid()),
        TokenKind::Str => Ok(Value::String(token.text.clone())),
        _ => Err(invalid()),
    }
}

impl ExpressionBuilder {
    pub fn new() -> ExpressionBuilder {
        ExpressionBuilder::default()
    }

    pub fn feed(&mut self, token: &Token) -> Result<Feed, SyntaxError> {
        if self.awaiting_call {
            return if token.is(TokenKind::BracketOpen) {
                self.awaiting_call = false;
                self.open_bracket();
                Ok(Feed::More)
            } else {
                Err(SyntaxError::unexpected(token, "'(' after function name"))
            };
        }

        let last_name = self.last_name.take();

        if self.after_operand {
            self.feed_after_operand(token, last_name)
        } else {
            self.feed_operand(token)
        }
    }

    fn feed_operand(&mut self, token: &Token) -> Result<Feed, SyntaxError> {
        match token.kind {
            TokenKind::Int | TokenKind::Double | TokenKind::Str => {
                self.push_operand(ExpressionElement::Literal(literal(token)?));
            },
            TokenKind::Name => match Operation::function(&token.text) {
                Some(function) => {
                    self.operators.push(Pending::Function(function));
                    self.awaiting_call = true;
                },
                None => {
                    self.push_operand(ExpressionElement::Variable(token.text.clone()));
                    self.last_name = Some(token.text.clone());
                },
            },
            TokenKind::BracketOpen => self.open_bracket(),
            TokenKind::Operator if token.is_operator("-") => {
                self.operators.push(Pending::Operation(Operation::Negate));
            },
            TokenKind::Operator if token.is_operator("+") => {},
            TokenKind::Operator if token.is_operator("not") => {
                self.operators.push(Pending::Operation(Operation::Not));
            },
            _ if is_terminator(token) && self.is_empty() => {
                return Err(SyntaxError::EmptyExpression { position: token.position });
            },
            _ if is_terminator(token) || token.is(TokenKind::Operator) => {
                return Err(SyntaxError::MissingOperand {
                    text: token.text.clone(),
                    position: token.position,
                });
            },
            _ => return Err(SyntaxError::unexpected(token, "an operand")),
        }

        Ok(Feed::More)
    }

    fn feed_after_operand(&mut self, token: &Token, last_name: Option<String>) -> Result<Feed, SyntaxError> {
        match token.kind {
            TokenKind::Operator => {
                let operation = Operation::binary(&token.text)
                    .ok_or_else(|| SyntaxError::unexpected(token, "a binary operator"))?;
                self.pop_while_binds(operation.precedence());
                self.operators.push(Pending::Operation(operation));
                self.after_operand = false;
            },
            TokenKind::BracketClose if self.depth > 0 => self.close_bracket()?,
            TokenKind::BracketOpen => {
                return Err(match last_name {
                    Some(name) => SyntaxError::UnknownFunction { name, position: token.position },
                    None => SyntaxError::unexpected(token, "an operator"),
                });
            },
            _ if is_terminator(token) => {
                if self.depth > 0 {
                    return Err(SyntaxError::unexpected(token, "')'"));
                }
                return self.finish().map(Feed::Complete);
            },
            _ => return Err(SyntaxError::unexpected(token, "an operator")),
        }

        Ok(Feed::More)
    }

    fn is_empty(&self) -> bool {
        !self.operand_seen && self.operators.is_empty()
    }

    fn push_operand(&mut self, element: ExpressionElement) {
        self.output.push(element);
        self.operand_seen = true;
        self.after_operand = true;
    }

    fn open_bracket(&mut self) {
        self.operators.push(Pending::Bracket);
        self.depth += 1;
    }

    fn close_bracket(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.operators.pop() {
                Some(Pending::Bracket) => break,
                Some(Pending::Operation(operation)) | Some(Pending::Function(operation)) => {
                    self.output.push(ExpressionElement::Operation(operation));
                },
                None => return Err(SyntaxError::internal("bracket depth out of sync")),
            }
        }
        self.depth -= 1;

        if let Some(Pending::Function(function)) = self.operators.last().copied() {
            self.operators.pop();
            self.output.push(ExpressionElement::Operation(function));
        }

        Ok(())
    }

    fn pop_while_binds(&mut self, precedence: u8) {
        while let Some(Pending::Operation(top)) = self.operators.last().copied() {
            if top.precedence() < precedence {
                break;
            }
            self.operators.pop();
            self.output.push(ExpressionElement::Operation(top));
        }
    }

    fn finish(&mut self) -> Result<Expression, SyntaxError> {
        while let Some(pending) = self.operators.pop() {
            match pending {
                Pending::Operation(operation) => self.output.push(ExpressionElement::Operation(operation)),
                _ => return Err(SyntaxError::internal("unclosed bracket at depth 0")),
            }
        }

        let postfix = std::mem::replace(&mut self.output, vec![]);
        *self = ExpressionBuilder::default();
        Ok(Expression::new(postfix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use std::collections::BTreeMap;

    /// Feeds `source` followed by `;` and returns the finished expression.
    fn build(source: &str) -> Result<Expression, SyntaxError> {
        let mut tokens = tokenize(source).unwrap();
        tokens.push(Token::new(TokenKind::EndLine, ";"));

        let mut builder = ExpressionBuilder::new();
        for token in &tokens {
            if let Feed::Complete(expression) = builder.feed(token)? {
                return Ok(expression);
            }
        }

        panic!("expression was never terminated")
    }

    fn postfix(source: &str) -> String {
        build(source).unwrap().to_string()
    }

    fn eval(source: &str) -> Value {
        build(source).unwrap().evaluate(&BTreeMap::new()).unwrap()
    }

    #[test]
    fn conventional_precedence() {
        assert_eq!(postfix("1 + 2 * 3"), "1 2 3 * +");
        assert_eq!(postfix("(1 + 2) * 3"), "1 2 + 3 *");
        assert_eq!(postfix("a < b and c > d or e"), "a b < c d > and e or");
        assert_eq!(eval("2 + 3 * 4 - 1"), Value::Int(13));
        assert_eq!(eval("17 mod 5 * 2"), Value::Int(4));
    }

    #[test]
    fn left_associative() {
        assert_eq!(postfix("8 - 3 - 2"), "8 3 - 2 -");
        assert_eq!(eval("8 - 3 - 2"), Value::Int(3));
        assert_eq!(eval("100 div 10 div 5"), Value::Int(2));
    }

    #[test]
    fn unary_operators() {
        assert_eq!(postfix("-x * 2"), "x neg 2 *");
        assert_eq!(eval("2 * -3"), Value::Int(-6));
        assert_eq!(eval("+4"), Value::Int(4));
        assert_eq!(eval("not 0"), Value::Int(1));
        assert_eq!(eval("- -5"), Value::Int(5));
    }

    #[test]
    fn functions() {
        assert_eq!(postfix("sin(x + 1) * 2"), "x 1 + sin 2 *");
        assert_eq!(eval("sin(0)"), Value::Double(0.0));
    }

    #[test]
    fn unknown_function() {
        match build("foo(1)") {
            Err(SyntaxError::UnknownFunction { name, .. }) => assert_eq!(name, "foo"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn terminator_is_not_consumed() {
        let tokens = tokenize("x + 1, y").unwrap();
        let mut builder = ExpressionBuilder::new();
        assert_eq!(builder.feed(&tokens[0]), Ok(Feed::More));
        assert_eq!(builder.feed(&tokens[1]), Ok(Feed::More));
        assert_eq!(builder.feed(&tokens[2]), Ok(Feed::More));
        match builder.feed(&tokens[3]) {
            Ok(Feed::Complete(expression)) => assert_eq!(expression.to_string(), "x 1 +"),
            other => panic!("unexpected result {:?}", other),
        }

        // the builder starts over after completing
        assert_eq!(builder.feed(&tokens[4]), Ok(Feed::More));
    }

    #[test]
    fn unmatched_close_bracket_terminates() {
        let tokens = tokenize("(a) = 1) then").unwrap();
        let mut builder = ExpressionBuilder::new();
        let mut result = None;
        for token in &tokens {
            if let Feed::Complete(expression) = builder.feed(token).unwrap() {
                result = Some((expression, token.clone()));
                break;
            }
        }
        let (expression, terminator) = result.unwrap();
        assert_eq!(expression.to_string(), "a 1 =");
        assert!(terminator.is(TokenKind::BracketClose));
    }

    #[test]
    fn malformed_sequences() {
        assert!(matches!(build(""), Err(SyntaxError::EmptyExpression { .. })));
        assert!(matches!(build("* 2"), Err(SyntaxError::MissingOperand { .. })));
        assert!(matches!(build("1 +"), Err(SyntaxError::MissingOperand { .. })));
        assert!(matches!(build("1 2"), Err(SyntaxError::UnexpectedToken { .. })));
        assert!(matches!(build("(1 + 2"), Err(SyntaxError::UnexpectedToken { .. })));
        assert!(matches!(build("sin 1"), Err(SyntaxError::UnexpectedToken { .. })));
        assert!(matches!(build("1 not 2"), Err(SyntaxError::UnexpectedToken { .. })));
    }
}
