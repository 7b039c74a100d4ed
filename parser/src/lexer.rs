use std::fmt::{self, Display, Formatter};

use pest::Parser;
use pest::iterators::Pair;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "pascal.pest"]
struct PascalLexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Name,
    Int,
    Double,
    Str,
    Operator,
    Assign,
    BracketOpen,
    BracketClose,
    Comma,
    Colon,
    EndLine,

    Program,
    Const,
    Var,
    Begin,
    End,
    If,
    Then,
    Else,
    While,
    Do,
    ProgramEnd,

    Wrong,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let text = match self {
            Name => "name",
            Int => "int literal",
            Double => "double literal",
            Str => "string literal",
            Operator => "operator",
            Assign => "':='",
            BracketOpen => "'('",
            BracketClose => "')'",
            Comma => "','",
            Colon => "':'",
            EndLine => "';'",
            Program => "'program'",
            Const => "'const'",
            Var => "'var'",
            Begin => "'begin'",
            End => "'end'",
            If => "'if'",
            Then => "'then'",
            Else => "'else'",
            While => "'while'",
            Do => "'do'",
            ProgramEnd => "'end.'",
            Wrong => "unrecognized character",
        };

        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single lexeme. String literals carry their text without the quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, text: S) -> Token {
        Token {
            kind,
            text: text.into(),
            position: Position::default(),
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Token {
        self.position = Position { line, column };
        self
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == TokenKind::Operator && self.text.eq_ignore_ascii_case(text)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Str => write!(f, "\"{}\"", self.text),
            _ => write!(f, "{}", self.text),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("LexError: unrecognized character '{text}' at {position}")]
    UnrecognizedCharacter { text: String, position: Position },
    #[error("LexError: {message}")]
    Grammar { message: String },
}

fn convert(pair: Pair<Rule>) -> Token {
    let (line, column) = pair.as_span().start_pos().line_col();
    let rule = pair.as_rule();

    let kind = match rule {
        Rule::program_end => TokenKind::ProgramEnd,
        Rule::kw_program => TokenKind::Program,
        Rule::kw_const => TokenKind::Const,
        Rule::kw_var => TokenKind::Var,
        Rule::kw_begin => TokenKind::Begin,
        Rule::kw_end => TokenKind::End,
        Rule::kw_if => TokenKind::If,
        Rule::kw_then => TokenKind::Then,
        Rule::kw_else => TokenKind::Else,
        Rule::kw_while => TokenKind::While,
        Rule::kw_do => TokenKind::Do,
        Rule::word_operator | Rule::operator => TokenKind::Operator,
        Rule::double => TokenKind::Double,
        Rule::int => TokenKind::Int,
        Rule::string => TokenKind::Str,
        Rule::assign => TokenKind::Assign,
        Rule::bracket_open => TokenKind::BracketOpen,
        Rule::bracket_close => TokenKind::BracketClose,
        Rule::comma => TokenKind::Comma,
        Rule::colon => TokenKind::Colon,
        Rule::end_line => TokenKind::EndLine,
        Rule::name => TokenKind::Name,
        _ => TokenKind::Wrong,
    };

    let text = match rule {
        Rule::string => pair.into_inner()
            .next()
            .map(|inner| inner.as_str().to_owned())
            .unwrap_or_default(),
        Rule::word_operator => pair.as_str().to_ascii_lowercase(),
        _ => pair.as_str().to_owned(),
    };

    Token::new(kind, text).at(line, column)
}

/// Splits source text into tokens. Unrecognized characters come back as
/// `TokenKind::Wrong` tokens; they only become errors once analysed.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut pairs = PascalLexer::parse(Rule::tokens, text)
        .map_err(|e| LexError::Grammar { message: e.to_string() })?;

    let tokens = match pairs.next() {
        Some(tokens) => tokens.into_inner()
            .filter(|pair| pair.as_rule() != Rule::EOI)
            .map(convert)
            .collect(),
        None => vec![],
    };

    Ok(tokens)
}

/// Lex error carried by a `Wrong` token.
pub fn unrecognized(token: &Token) -> Option<LexError> {
    if !token.is(TokenKind::Wrong) {
        return None;
    }

    Some(LexError::UnrecognizedCharacter {
        text: token.text.clone(),
        position: token.position,
    })
}
