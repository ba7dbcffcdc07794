/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Parser for the surface syntax of policies.
//!
//! ## Grammar
//!
//! From loosest to tightest binding:
//!
//! ```text
//! implication := disjunction [ "->" implication ]
//! disjunction := conjunction { "|" conjunction }
//! conjunction := until { "&" until }
//! until       := unary [ "U" until ]
//! unary       := ( "!" | "X" | "[]" | "<>" ) unary | primary
//! primary     := "(" implication ")" | "true" | "false" | "self" | predicate | "@" name | label
//! predicate   := "author" cmp user | "subject" "(" ")" cmp user
//! cmp         := "=" | "!="
//! user        := "user" "(" "'" name "'" ")"
//! ```
//!
//! Inside a quoted name, `\'` stands for `'` and `\\` for `\`. Labels are identifiers made of ASCII
//! letters, digits, and `_` that are not one of the keywords above. Operators may nest at most
//! [`MAX_NESTING`] deep.
//!
//! `false` is read as `!true` and `x != user('Name')` as `!(x = user('Name'))`. `@name` resolves
//! `name` against the [`RefTable`] given to [`parse_with`]; `@3` refers to the table entry with index
//! 3 directly and is only checked when the formula is [compiled](Formula::compile).
//!
//! [`Formula`]'s `Display` implementation is the inverse of this parser.

use std::fmt::{self, Display, Formatter};

use crate::types::{Identity, RefId};

use super::atoms::AtomicProposition;
use super::formula::Formula;
use super::references::RefTable;

/// How deep operators may nest in policy text.
pub const MAX_NESTING: usize = 256;

const KEYWORDS: [&str; 8] = ["true", "false", "self", "author", "subject", "user", "U", "X"];

/// Parse `text` into a formula. References by name are not available.
pub fn parse(text: &str) -> Result<Formula, ParseError> {
    parse_with(text, &RefTable::new())
}

/// Parse `text` into a formula, resolving `@name` against `refs`.
pub fn parse_with(text: &str, refs: &RefTable) -> Result<Formula, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        cursor: 0,
        depth: 0,
        refs,
    };
    let formula = parser.implication()?;
    match parser.peek() {
        None => Ok(formula),
        Some((token, position)) => Err(ParseError::UnexpectedToken {
            found: token.to_string(),
            position,
        }),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Bang,
    NotEq,
    Eq,
    Amp,
    Pipe,
    Arrow,
    Always,
    Eventually,
    LParen,
    RParen,
    Str(String),
    Ident(String),
    Ref(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Bang => f.write_str("!"),
            Token::NotEq => f.write_str("!="),
            Token::Eq => f.write_str("="),
            Token::Amp => f.write_str("&"),
            Token::Pipe => f.write_str("|"),
            Token::Arrow => f.write_str("->"),
            Token::Always => f.write_str("[]"),
            Token::Eventually => f.write_str("<>"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Str(s) => {
                f.write_str("'")?;
                write_escaped(f, s)?;
                f.write_str("'")
            }
            Token::Ident(s) => f.write_str(s),
            Token::Ref(s) => write!(f, "@{}", s),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `label` reads back as a label when it appears in policy text.
pub fn is_label(label: &str) -> bool {
    !label.is_empty() && label.chars().all(is_ident_char) && !KEYWORDS.contains(&label)
}

/// Write `name` so that it can be read back from between single quotes.
pub(crate) fn write_escaped(f: &mut Formatter<'_>, name: &str) -> fmt::Result {
    for c in name.chars() {
        if c == '\'' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    Ok(())
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '!' => {
                if let Some((_, '=')) = chars.peek() {
                    chars.next();
                    Token::NotEq
                } else {
                    Token::Bang
                }
            }
            '=' => Token::Eq,
            '&' => Token::Amp,
            '|' => Token::Pipe,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '-' | '[' | '<' => {
                let expected = match c {
                    '-' => '>',
                    '[' => ']',
                    _ => '>',
                };
                match chars.next() {
                    Some((_, next)) if next == expected => match c {
                        '-' => Token::Arrow,
                        '[' => Token::Always,
                        _ => Token::Eventually,
                    },
                    _ => return Err(ParseError::UnexpectedCharacter { found: c, position }),
                }
            }
            '\'' => {
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\'')) => break,
                        Some((_, '\\')) => match chars.next() {
                            Some((_, escaped @ ('\'' | '\\'))) => literal.push(escaped),
                            Some((position, found)) => {
                                return Err(ParseError::UnexpectedCharacter { found, position })
                            }
                            None => return Err(ParseError::UnexpectedEnd),
                        },
                        Some((_, c)) => literal.push(c),
                        None => return Err(ParseError::UnexpectedEnd),
                    }
                }
                Token::Str(literal)
            }
            '@' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                if name.is_empty() {
                    return Err(ParseError::UnexpectedCharacter { found: '@', position });
                }
                Token::Ref(name)
            }
            c if is_ident_char(c) => {
                let mut ident = String::from(c);
                while let Some(&(_, c)) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    ident.push(c);
                    chars.next();
                }
                Token::Ident(ident)
            }
            c => return Err(ParseError::UnexpectedCharacter { found: c, position }),
        };
        tokens.push((token, position));
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
    depth: usize,
    refs: &'a RefTable,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<(&Token, usize)> {
        self.tokens
            .get(self.cursor)
            .map(|(token, position)| (token, *position))
    }

    fn peek_is(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some((token, _)) if token == expected)
    }

    fn peek_is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some((Token::Ident(ident), _)) if ident == keyword)
    }

    fn advance(&mut self) -> Result<(Token, usize), ParseError> {
        let next = self
            .tokens
            .get(self.cursor)
            .cloned()
            .ok_or(ParseError::UnexpectedEnd)?;
        self.cursor += 1;
        Ok(next)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        let (token, position) = self.advance()?;
        if token == expected {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                found: token.to_string(),
                position,
            })
        }
    }

    /// Go one level deeper into the formula that is being built.
    fn enter(&mut self, position: usize) -> Result<(), ParseError> {
        if self.depth == MAX_NESTING {
            return Err(ParseError::TooDeep { position });
        }
        self.depth += 1;
        Ok(())
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        self.expect(Token::Ident(keyword.to_string()))
    }

    fn implication(&mut self) -> Result<Formula, ParseError> {
        let lhs = self.disjunction()?;
        if self.peek_is(&Token::Arrow) {
            let (_, position) = self.advance()?;
            self.enter(position)?;
            let rhs = self.implication()?;
            self.depth -= 1;
            return Ok(Formula::implies(lhs, rhs));
        }
        Ok(lhs)
    }

    fn disjunction(&mut self) -> Result<Formula, ParseError> {
        let depth = self.depth;
        let mut lhs = self.conjunction()?;
        while self.peek_is(&Token::Pipe) {
            let (_, position) = self.advance()?;
            // Every operand deepens the left spine.
            self.enter(position)?;
            lhs = Formula::or(lhs, self.conjunction()?);
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn conjunction(&mut self) -> Result<Formula, ParseError> {
        let depth = self.depth;
        let mut lhs = self.until()?;
        while self.peek_is(&Token::Amp) {
            let (_, position) = self.advance()?;
            self.enter(position)?;
            lhs = Formula::and(lhs, self.until()?);
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn until(&mut self) -> Result<Formula, ParseError> {
        let lhs = self.unary()?;
        if self.peek_is_keyword("U") {
            let (_, position) = self.advance()?;
            self.enter(position)?;
            let rhs = self.until()?;
            self.depth -= 1;
            return Ok(Formula::until(lhs, rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Formula, ParseError> {
        let operator: fn(Formula) -> Formula = match self.peek() {
            Some((Token::Bang, _)) => |operand| Formula::Not(Box::new(operand)),
            Some((Token::Always, _)) => Formula::always,
            Some((Token::Eventually, _)) => Formula::eventually,
            Some((Token::Ident(ident), _)) if ident == "X" => Formula::next,
            _ => return self.primary(),
        };
        let (_, position) = self.advance()?;
        self.enter(position)?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(operator(operand))
    }

    fn primary(&mut self) -> Result<Formula, ParseError> {
        let (token, position) = self.advance()?;
        match token {
            Token::LParen => {
                self.enter(position)?;
                let inner = self.implication()?;
                self.depth -= 1;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ref(name) => self.reference(name, position),
            Token::Ident(ident) => match ident.as_str() {
                "true" => Ok(Formula::True),
                "false" => Ok(Formula::Not(Box::new(Formula::True))),
                "self" => Ok(Formula::Atom(AtomicProposition::SelfRef)),
                "author" => self.comparison(AtomicProposition::Author),
                "subject" => {
                    self.expect(Token::LParen)?;
                    self.expect(Token::RParen)?;
                    self.comparison(AtomicProposition::Subject)
                }
                "U" | "X" | "user" => Err(ParseError::UnexpectedToken {
                    found: ident,
                    position,
                }),
                _ => Ok(Formula::Atom(AtomicProposition::Named(ident))),
            },
            token => Err(ParseError::UnexpectedToken {
                found: token.to_string(),
                position,
            }),
        }
    }

    fn comparison(
        &mut self,
        predicate: fn(Identity) -> AtomicProposition,
    ) -> Result<Formula, ParseError> {
        let (op, position) = self.advance()?;
        let negated = match op {
            Token::Eq => false,
            Token::NotEq => true,
            token => {
                return Err(ParseError::UnexpectedToken {
                    found: token.to_string(),
                    position,
                })
            }
        };
        self.expect_keyword("user")?;
        self.expect(Token::LParen)?;
        let name = match self.advance()? {
            (Token::Str(name), _) => name,
            (token, position) => {
                return Err(ParseError::UnexpectedToken {
                    found: token.to_string(),
                    position,
                })
            }
        };
        self.expect(Token::RParen)?;

        let atom = Formula::Atom(predicate(Identity::new(name)));
        if negated {
            Ok(Formula::Not(Box::new(atom)))
        } else {
            Ok(atom)
        }
    }

    fn reference(&self, name: String, position: usize) -> Result<Formula, ParseError> {
        if let Ok(index) = name.parse::<usize>() {
            return Ok(Formula::Ref(RefId::new(index)));
        }
        self.refs
            .lookup(&name)
            .map(Formula::Ref)
            .ok_or(ParseError::UnknownReference { name, position })
    }
}

/// Errors that may be encountered when parsing policy text. Positions are byte offsets into the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedCharacter { found: char, position: usize },
    UnexpectedToken { found: String, position: usize },
    UnexpectedEnd,
    UnknownReference { name: String, position: usize },
    /// Operators nest deeper than [`MAX_NESTING`] at `position`.
    TooDeep { position: usize },
    /// `label` is not an identifier, or is a keyword.
    InvalidLabel { label: String },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedCharacter { found, position } => {
                write!(f, "unexpected character '{}' at {}", found, position)
            }
            ParseError::UnexpectedToken { found, position } => {
                write!(f, "unexpected token '{}' at {}", found, position)
            }
            ParseError::UnexpectedEnd => f.write_str("unexpected end of policy"),
            ParseError::UnknownReference { name, position } => {
                write!(f, "unknown reference '@{}' at {}", name, position)
            }
            ParseError::TooDeep { position } => write!(
                f,
                "operators nest more than {} deep at {}",
                MAX_NESTING, position
            ),
            ParseError::InvalidLabel { label } => write!(f, "'{}' cannot be a label", label),
        }
    }
}

impl std::error::Error for ParseError {}
