//! Signature grammar.
//!
//! Parses one overload declaration such as
//! `Tensor (Tensor x, Scalar alpha=1, *, Bool inplace=False) => ScalarAdd`
//! into a return type, a parameter list and an optional native function name.
//!
//! ```text
//! signature := type "(" [param ("," param)*] ")" ["=>" ident]
//! param     := "*" | type ident ["=" default]
//! type      := ident ["[" uint "]"] | "Enum" "[" string ("|" string)* "]"
//! default   := scalar | "[" [scalar ("," scalar)*] "]"
//! scalar    := "None" | "True" | "False" | int | float | string | ident
//! ```

use std::collections::HashSet;
use std::fmt;

use smallvec::SmallVec;
use snafu::{Snafu, ensure};

use crate::types::{DefaultValue, Parameter, TypeDescriptor};

/// Errors produced while parsing a single signature string.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum SignatureError {
    #[snafu(display("unexpected {found} at column {column}, expected {expected}"))]
    Unexpected { found: String, expected: &'static str, column: usize },

    #[snafu(display("unterminated string literal starting at column {column}"))]
    UnterminatedString { column: usize },

    #[snafu(display("unknown type `{token}`"))]
    UnknownType { token: String },

    #[snafu(display("malformed default value `{literal}` for parameter '{param}'"))]
    MalformedDefault { param: String, literal: String },

    #[snafu(display("default `{literal}` is not a valid {ty} value for parameter '{param}'"))]
    DefaultTypeMismatch { param: String, literal: String, ty: String },

    #[snafu(display("parameter '{param}' cannot have type Void"))]
    VoidParameter { param: String },

    #[snafu(display("parameter name '{param}' is reserved for generated code"))]
    ReservedParameter { param: String },

    #[snafu(display("duplicate parameter name '{param}'"))]
    DuplicateParameter { param: String },

    #[snafu(display("keyword-only marker `*` appears more than once"))]
    RepeatedKeywordMarker,

    #[snafu(display("`{token}` cannot take a size, only list types can"))]
    SizedNonList { token: String },

    #[snafu(display("list size must be a positive integer, got `{literal}`"))]
    InvalidListSize { literal: String },

    #[snafu(display("enum type must list at least one value"))]
    EmptyEnum,
}

/// Result of parsing one signature string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSignature {
    pub return_type: TypeDescriptor,
    pub params: SmallVec<[Parameter; 4]>,
    /// Native function name after `=>`, if given.
    pub function: Option<String>,
}

/// Parse a signature string.
pub fn parse_signature(text: &str) -> Result<ParsedSignature, SignatureError> {
    let tokens = tokenize(text)?;
    Parser { tokens, pos: 0 }.signature()
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(String),
    Float(String),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Star,
    Eq,
    Arrow,
    Pipe,
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) => write!(f, "identifier `{s}`"),
            Self::Int(s) | Self::Float(s) => write!(f, "number `{s}`"),
            Self::Str(s) => write!(f, "string \"{s}\""),
            Self::LParen => f.write_str("`(`"),
            Self::RParen => f.write_str("`)`"),
            Self::LBracket => f.write_str("`[`"),
            Self::RBracket => f.write_str("`]`"),
            Self::Comma => f.write_str("`,`"),
            Self::Star => f.write_str("`*`"),
            Self::Eq => f.write_str("`=`"),
            Self::Arrow => f.write_str("`=>`"),
            Self::Pipe => f.write_str("`|`"),
            Self::End => f.write_str("end of signature"),
        }
    }
}

/// Token with its 1-based column.
type Spanned = (Token, usize);

fn tokenize(text: &str) -> Result<Vec<Spanned>, SignatureError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let column = i + 1;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let single = match c {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            ',' => Some(Token::Comma),
            '*' => Some(Token::Star),
            '|' => Some(Token::Pipe),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push((token, column));
            i += 1;
            continue;
        }

        if c == '=' {
            if chars.get(i + 1) == Some(&'>') {
                tokens.push((Token::Arrow, column));
                i += 2;
            } else {
                tokens.push((Token::Eq, column));
                i += 1;
            }
            continue;
        }

        if c == '"' {
            let (value, next) = lex_string(&chars, i)?;
            tokens.push((Token::Str(value), column));
            i = next;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push((Token::Ident(chars[start..i].iter().collect()), column));
            continue;
        }

        let starts_number = c.is_ascii_digit()
            || c == '.'
            || (c == '-' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit() || *n == '.'));
        if starts_number {
            let (token, next) = lex_number(&chars, i);
            tokens.push((token, column));
            i = next;
            continue;
        }

        return UnexpectedSnafu { found: format!("character `{c}`"), expected: "a signature token", column }.fail();
    }

    tokens.push((Token::End, chars.len() + 1));
    Ok(tokens)
}

fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), SignatureError> {
    let mut value = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '"' => return Ok((value, i + 1)),
            '\\' if i + 1 < chars.len() => {
                value.push(match chars[i + 1] {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                i += 2;
            }
            c => {
                value.push(c);
                i += 1;
            }
        }
    }
    UnterminatedStringSnafu { column: start + 1 }.fail()
}

/// Lex a numeric literal. Validation of the digits happens when the literal
/// becomes a default value, so malformed numbers are reported with the
/// parameter they belong to.
fn lex_number(chars: &[char], start: usize) -> (Token, usize) {
    let mut i = start;
    let mut is_float = false;
    if chars[i] == '-' {
        i += 1;
    }
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            i += 1;
        } else if c == '.' {
            is_float = true;
            i += 1;
        } else if c == 'e' || c == 'E' {
            is_float = true;
            i += 1;
            if i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
                i += 1;
            }
        } else if c.is_ascii_alphanumeric() || c == '_' {
            // Swallow trailing garbage such as `1x` into the literal.
            i += 1;
        } else {
            break;
        }
    }
    let text: String = chars[start..i].iter().collect();
    (if is_float { Token::Float(text) } else { Token::Int(text) }, i)
}

/// Identifiers beginning with `__` or `_` plus an uppercase letter belong to
/// the implementation in C++, and generated bodies use them for locals.
fn is_reserved(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('_') && chars.next().is_some_and(|c| c == '_' || c.is_ascii_uppercase())
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    fn next(&mut self) -> Spanned {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn unexpected<T>(&self, expected: &'static str) -> Result<T, SignatureError> {
        let (found, column) = &self.tokens[self.pos];
        UnexpectedSnafu { found: found.to_string(), expected, column: *column }.fail()
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), SignatureError> {
        if *self.peek() == token {
            self.next();
            Ok(())
        } else {
            self.unexpected(expected)
        }
    }

    fn ident(&mut self, expected: &'static str) -> Result<String, SignatureError> {
        match self.peek().clone() {
            Token::Ident(name) => {
                self.next();
                Ok(name)
            }
            _ => self.unexpected(expected),
        }
    }

    fn signature(&mut self) -> Result<ParsedSignature, SignatureError> {
        let return_type = self.type_descriptor()?;
        self.expect(Token::LParen, "`(`")?;

        let mut params: SmallVec<[Parameter; 4]> = SmallVec::new();
        let mut names = HashSet::new();
        let mut keyword_only = false;

        if *self.peek() == Token::RParen {
            self.next();
        } else {
            loop {
                if *self.peek() == Token::Star {
                    ensure!(!keyword_only, RepeatedKeywordMarkerSnafu);
                    self.next();
                    keyword_only = true;
                    self.expect(Token::Comma, "`,` and a parameter after `*`")?;
                    continue;
                }

                let param = self.parameter(keyword_only)?;
                ensure!(names.insert(param.name.clone()), DuplicateParameterSnafu { param: param.name.clone() });
                params.push(param);

                match self.peek() {
                    Token::Comma => {
                        self.next();
                    }
                    Token::RParen => {
                        self.next();
                        break;
                    }
                    _ => return self.unexpected("`,` or `)`"),
                }
            }
        }

        let function = if *self.peek() == Token::Arrow {
            self.next();
            Some(self.ident("native function name after `=>`")?)
        } else {
            None
        };

        if *self.peek() != Token::End {
            return self.unexpected("end of signature");
        }

        Ok(ParsedSignature { return_type, params, function })
    }

    fn type_descriptor(&mut self) -> Result<TypeDescriptor, SignatureError> {
        let token = self.ident("a type")?;

        if token == "Enum" {
            self.expect(Token::LBracket, "`[` after Enum")?;
            let mut variants: SmallVec<[String; 4]> = SmallVec::new();
            loop {
                match self.peek().clone() {
                    Token::Str(value) => {
                        self.next();
                        if !variants.contains(&value) {
                            variants.push(value);
                        }
                    }
                    Token::RBracket if variants.is_empty() => return EmptyEnumSnafu.fail(),
                    _ => return self.unexpected("a quoted enum value"),
                }
                match self.peek() {
                    Token::Pipe => {
                        self.next();
                    }
                    Token::RBracket => {
                        self.next();
                        break;
                    }
                    _ => return self.unexpected("`|` or `]`"),
                }
            }
            return Ok(TypeDescriptor::Enum(variants));
        }

        let mut ty = TypeDescriptor::from_token(&token).ok_or_else(|| SignatureError::UnknownType { token: token.clone() })?;

        if *self.peek() == Token::LBracket {
            self.next();
            let literal = match self.next().0 {
                Token::Int(literal) => literal,
                other => return InvalidListSizeSnafu { literal: other.to_string() }.fail(),
            };
            let size = literal.parse::<usize>().ok().filter(|n| *n > 0);
            let Some(size) = size else {
                return InvalidListSizeSnafu { literal }.fail();
            };
            match &mut ty {
                TypeDescriptor::List { size: slot, .. } => *slot = Some(size),
                _ => return SizedNonListSnafu { token }.fail(),
            }
            self.expect(Token::RBracket, "`]`")?;
        }

        Ok(ty)
    }

    fn parameter(&mut self, keyword_only: bool) -> Result<Parameter, SignatureError> {
        let ty = self.type_descriptor()?;
        let name = self.ident("a parameter name")?;
        ensure!(!ty.is_void(), VoidParameterSnafu { param: name.clone() });
        ensure!(!is_reserved(&name), ReservedParameterSnafu { param: name.clone() });

        let default = if *self.peek() == Token::Eq {
            self.next();
            let default = self.default_value(&name)?;
            ensure!(
                default.fits(&ty),
                DefaultTypeMismatchSnafu { param: name.clone(), literal: default.to_string(), ty: ty.to_string() }
            );
            Some(default)
        } else {
            None
        };

        Ok(Parameter { name, ty, default, keyword_only })
    }

    fn default_value(&mut self, param: &str) -> Result<DefaultValue, SignatureError> {
        if *self.peek() != Token::LBracket {
            return self.scalar_default(param);
        }
        self.next();

        let mut values = Vec::new();
        if *self.peek() == Token::RBracket {
            self.next();
            return Ok(DefaultValue::List(values));
        }
        loop {
            // List defaults are flat; a nested `[` is rejected by `scalar_default`.
            values.push(self.scalar_default(param)?);
            match self.next().0 {
                Token::Comma => continue,
                Token::RBracket => break,
                other => return MalformedDefaultSnafu { param, literal: other.to_string() }.fail(),
            }
        }
        Ok(DefaultValue::List(values))
    }

    fn scalar_default(&mut self, param: &str) -> Result<DefaultValue, SignatureError> {
        let malformed = |literal: String| SignatureError::MalformedDefault { param: param.to_string(), literal };

        match self.next().0 {
            Token::Ident(name) => Ok(match name.as_str() {
                "None" => DefaultValue::None,
                "True" => DefaultValue::Bool(true),
                "False" => DefaultValue::Bool(false),
                _ => DefaultValue::DType(name),
            }),
            Token::Int(literal) => literal.parse::<i64>().map(DefaultValue::Int).map_err(|_| malformed(literal)),
            Token::Float(literal) => match literal.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(DefaultValue::Float(literal)),
                _ => Err(malformed(literal)),
            },
            Token::Str(value) => Ok(DefaultValue::String(value)),
            other => Err(malformed(other.to_string())),
        }
    }
}
