//! Tokenizer and parser for the restricted expression grammar.
//!
//! The grammar is deliberately small:
//!
//! ```text
//! expr     := call | path | literal
//! call     := IDENT '(' ( expr ( ',' expr )* )? ')' segment*
//! path     := IDENT segment*
//! segment  := '.' IDENT | '[' ( NUMBER | STRING ) ']'
//! literal  := STRING | NUMBER | 'true' | 'false' | 'null'
//! ```
//!
//! Identifiers may carry a leading `$` (the response binding is the
//! identifier `$res`). The parser produces an [`Expr`] tree; name resolution
//! happens at evaluation time, mirroring where the error would surface in a
//! dynamically evaluated expression.

use super::ExprError;
use serde_json::{Number, Value};

/// Root of a property path.
#[derive(Debug, Clone, PartialEq)]
pub enum Root {
    /// The last HTTP result, bound as `$res`.
    Response,
    /// Any other bare name. Always an evaluation error - only the utility
    /// namespace (call position) and `$res` are in scope.
    Name(String),
}

/// One step of a property path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object field access: `.key` or `["key"]`.
    Key(String),
    /// Array element access: `[0]`.
    Index(usize),
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value appearing inside an expression (usually a call
    /// argument).
    Literal(Value),
    /// A property path rooted at a name.
    Path { root: Root, segments: Vec<Segment> },
    /// A whitelisted utility call, optionally followed by a path into its
    /// result.
    Call {
        name: String,
        args: Vec<Expr>,
        segments: Vec<Segment>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(Number),
    Str(String),
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

/// Parses `input` into an expression tree.
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(ExprError::Compile(format!(
            "unexpected trailing input after expression: {:?}",
            parser.tokens[parser.pos]
        )));
    }
    Ok(expr)
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '"' | '\'' => {
                let quote = c;
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => {
                            return Err(ExprError::Compile(
                                "unterminated string literal".to_string(),
                            ))
                        }
                        Some('\\') => {
                            match chars.get(i + 1) {
                                Some(&escaped) if matches!(escaped, '\\' | '"' | '\'') => {
                                    text.push(escaped)
                                }
                                Some(&other) => {
                                    text.push('\\');
                                    text.push(other);
                                }
                                None => {
                                    return Err(ExprError::Compile(
                                        "unterminated string literal".to_string(),
                                    ))
                                }
                            }
                            i += 2;
                        }
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            text.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let start = i;
                if c == '-' {
                    i += 1;
                    if !matches!(chars.get(i), Some(d) if d.is_ascii_digit()) {
                        return Err(ExprError::Compile(format!(
                            "unexpected character '-' at offset {}",
                            start
                        )));
                    }
                }
                while matches!(chars.get(i), Some(d) if d.is_ascii_digit()) {
                    i += 1;
                }
                if matches!(chars.get(i), Some('.'))
                    && matches!(chars.get(i + 1), Some(d) if d.is_ascii_digit())
                {
                    i += 1;
                    while matches!(chars.get(i), Some(d) if d.is_ascii_digit()) {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let number = parse_number(&text)?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                i += 1;
                while matches!(chars.get(i), Some(&ch) if ch.is_ascii_alphanumeric() || ch == '_')
                {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(ExprError::Compile(format!(
                    "unexpected character '{}' at offset {}",
                    other, i
                )))
            }
        }
    }

    Ok(tokens)
}

fn parse_number(text: &str) -> Result<Number, ExprError> {
    if let Ok(int) = text.parse::<i64>() {
        return Ok(Number::from(int));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| ExprError::Compile(format!("invalid number literal '{}'", text)))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, context: &str) -> Result<(), ExprError> {
        match self.next() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(ExprError::Compile(format!(
                "expected {:?} {} but found {:?}",
                expected, context, token
            ))),
            None => Err(ExprError::Compile(format!(
                "expected {:?} {} but the expression ended",
                expected, context
            ))),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Some(Token::Str(text)) => Ok(Expr::Literal(Value::String(text))),
            Some(Token::Number(number)) => Ok(Expr::Literal(Value::Number(number))),
            Some(Token::Ident(ident)) => self.parse_named(ident),
            Some(token) => Err(ExprError::Compile(format!(
                "unexpected token {:?}",
                token
            ))),
            None => Err(ExprError::Compile("empty expression".to_string())),
        }
    }

    fn parse_named(&mut self, ident: String) -> Result<Expr, ExprError> {
        // Keyword literals never take arguments or path segments.
        match ident.as_str() {
            "true" => return Ok(Expr::Literal(Value::Bool(true))),
            "false" => return Ok(Expr::Literal(Value::Bool(false))),
            "null" => return Ok(Expr::Literal(Value::Null)),
            _ => {}
        }

        if matches!(self.peek(), Some(Token::LParen)) {
            self.next();
            let mut args = Vec::new();
            if !matches!(self.peek(), Some(Token::RParen)) {
                loop {
                    args.push(self.parse_expr()?);
                    match self.peek() {
                        Some(Token::Comma) => {
                            self.next();
                        }
                        _ => break,
                    }
                }
            }
            self.expect(&Token::RParen, "to close the argument list")?;
            let segments = self.parse_segments()?;
            return Ok(Expr::Call {
                name: ident,
                args,
                segments,
            });
        }

        let root = if ident == "$res" {
            Root::Response
        } else {
            Root::Name(ident)
        };
        let segments = self.parse_segments()?;
        Ok(Expr::Path { root, segments })
    }

    fn parse_segments(&mut self) -> Result<Vec<Segment>, ExprError> {
        let mut segments = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.next();
                    match self.next() {
                        Some(Token::Ident(key)) => segments.push(Segment::Key(key)),
                        Some(token) => {
                            return Err(ExprError::Compile(format!(
                                "expected a property name after '.' but found {:?}",
                                token
                            )))
                        }
                        None => {
                            return Err(ExprError::Compile(
                                "expected a property name after '.'".to_string(),
                            ))
                        }
                    }
                }
                Some(Token::LBracket) => {
                    self.next();
                    let segment = match self.next() {
                        Some(Token::Number(number)) => {
                            let index = number.as_u64().ok_or_else(|| {
                                ExprError::Compile(format!(
                                    "array index must be a non-negative integer, found {}",
                                    number
                                ))
                            })?;
                            Segment::Index(index as usize)
                        }
                        Some(Token::Str(key)) => Segment::Key(key),
                        Some(token) => {
                            return Err(ExprError::Compile(format!(
                                "expected an index or key inside '[]' but found {:?}",
                                token
                            )))
                        }
                        None => {
                            return Err(ExprError::Compile(
                                "expected an index or key inside '[]'".to_string(),
                            ))
                        }
                    };
                    self.expect(&Token::RBracket, "to close the index")?;
                    segments.push(segment);
                }
                _ => break,
            }
        }
        Ok(segments)
    }
}
