//! Source-language type expressions: `Option[List[UUID]]`, `IO[Unit]`,
//! `Map[String, User]`, `(String, Int) => Boolean`, `T <: A with B`.

use crate::domain::types::{PrimitiveType, Type, TypeParameter};
use thiserror::Error;

const LIST_NAMES: &[&str] = &["Array", "IndexedSeq", "Iterable", "List", "Seq", "Vector"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at column {column} of '{input}'")]
pub struct TypeSyntaxError {
    pub message: String,
    pub input: String,
    /// 1-based.
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Arrow,
    End,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("'{}'", name),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Arrow => "'=>'".to_string(),
            Token::End => "end of input".to_string(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == '$'
}

/// Tokens paired with their 1-based start column.
fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, TypeSyntaxError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let column = i + 1;
        match c {
            c if c.is_whitespace() => i += 1,
            '[' => {
                tokens.push((Token::LBracket, column));
                i += 1;
            }
            ']' => {
                tokens.push((Token::RBracket, column));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, column));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, column));
                i += 1;
            }
            ',' => {
                tokens.push((Token::Comma, column));
                i += 1;
            }
            '=' if chars.get(i + 1) == Some(&'>') => {
                tokens.push((Token::Arrow, column));
                i += 2;
            }
            c if is_ident_char(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                if ident.starts_with('.') || ident.ends_with('.') || ident.contains("..") {
                    return Err(TypeSyntaxError {
                        message: format!("malformed name '{}'", ident),
                        input: input.to_string(),
                        column,
                    });
                }
                tokens.push((Token::Ident(ident), column));
            }
            other => {
                return Err(TypeSyntaxError {
                    message: format!("unexpected character '{}'", other),
                    input: input.to_string(),
                    column,
                })
            }
        }
    }
    tokens.push((Token::End, chars.len() + 1));
    Ok(tokens)
}

struct TypeParser<'a> {
    input: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
    scope: &'a [String],
}

impl<'a> TypeParser<'a> {
    fn new(input: &'a str, scope: &'a [String]) -> Result<Self, TypeSyntaxError> {
        Ok(Self {
            input,
            tokens: tokenize(input)?,
            pos: 0,
            scope,
        })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].0
    }

    fn column(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].1
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> TypeSyntaxError {
        TypeSyntaxError {
            message: message.into(),
            input: self.input.to_string(),
            column: self.column(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), TypeSyntaxError> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {}, found {}",
                expected.describe(),
                self.peek().describe()
            )))
        }
    }

    fn finish(&mut self) -> Result<(), TypeSyntaxError> {
        self.expect(Token::End)
    }

    fn parse_type(&mut self) -> Result<Type, TypeSyntaxError> {
        if *self.peek() == Token::LParen {
            self.advance();
            let mut items = Vec::new();
            if *self.peek() != Token::RParen {
                items = self.parse_list()?;
            }
            self.expect(Token::RParen)?;
            if *self.peek() == Token::Arrow {
                self.advance();
                let ret = self.parse_type()?;
                return Ok(Type::function(items, ret));
            }
            return match items.len() {
                1 => Ok(items.remove(0)),
                0 => Err(self.error("empty parentheses must be followed by '=>'")),
                _ => Err(self.error("tuple types are not supported")),
            };
        }
        let simple = self.parse_simple()?;
        if *self.peek() == Token::Arrow {
            self.advance();
            let ret = self.parse_type()?;
            return Ok(Type::function(vec![simple], ret));
        }
        Ok(simple)
    }

    fn parse_list(&mut self) -> Result<Vec<Type>, TypeSyntaxError> {
        let mut items = vec![self.parse_type()?];
        while *self.peek() == Token::Comma {
            self.advance();
            items.push(self.parse_type()?);
        }
        Ok(items)
    }

    fn parse_simple(&mut self) -> Result<Type, TypeSyntaxError> {
        let name = match self.advance() {
            Token::Ident(name) => name,
            other => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.error(format!("expected a type name, found {}", other.describe())));
            }
        };
        let args = if *self.peek() == Token::LBracket {
            self.advance();
            let args = self.parse_list()?;
            self.expect(Token::RBracket)?;
            args
        } else {
            Vec::new()
        };
        self.resolve(name, args)
    }

    fn resolve(&self, name: String, mut args: Vec<Type>) -> Result<Type, TypeSyntaxError> {
        let arity = |expected: usize| -> Result<(), TypeSyntaxError> {
            if args.len() == expected {
                Ok(())
            } else {
                Err(self.error(format!(
                    "'{}' takes {} type argument(s), found {}",
                    name,
                    expected,
                    args.len()
                )))
            }
        };
        if let Some(primitive) = PrimitiveType::from_name(&name) {
            arity(0)?;
            return Ok(Type::primitive(primitive));
        }
        if self.scope.contains(&name) {
            arity(0)?;
            return Ok(Type::parameter(name));
        }
        match name.as_str() {
            "Option" => {
                arity(1)?;
                Ok(args.remove(0).make_nullable())
            }
            "Set" => {
                arity(1)?;
                Ok(Type::set(args.remove(0)))
            }
            "Map" => {
                arity(2)?;
                let value = args.remove(1);
                Ok(Type::map(args.remove(0), value))
            }
            n if LIST_NAMES.contains(&n) => {
                arity(1)?;
                Ok(Type::list(args.remove(0)))
            }
            _ => Ok(Type::generic(name, args)),
        }
    }
}

/// Parses a type expression. Names listed in `type_params` resolve to type
/// parameters; everything else unknown is a named type.
pub fn parse_type(input: &str, type_params: &[String]) -> Result<Type, TypeSyntaxError> {
    let mut parser = TypeParser::new(input, type_params)?;
    let ty = parser.parse_type()?;
    parser.finish()?;
    Ok(ty)
}

/// Parses a type-parameter declaration: `T`, `+T`, `T <: Bound` or
/// `T <: A with B`. Bounds may mention any name in `scope`.
pub fn parse_type_parameter(input: &str, scope: &[String]) -> Result<TypeParameter, TypeSyntaxError> {
    let (head, bounds) = match input.split_once("<:") {
        Some((head, bounds)) => (head, Some(bounds)),
        None => (input, None),
    };
    let name = head.trim().trim_start_matches(['+', '-']).trim();
    let valid_name = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !valid_name {
        return Err(TypeSyntaxError {
            message: "expected a type parameter name".to_string(),
            input: input.to_string(),
            column: 1,
        });
    }
    let Some(bounds) = bounds else {
        return Ok(TypeParameter::new(name));
    };
    let offset = input.len() - bounds.len();
    let bounds = bounds
        .split(" with ")
        .map(|bound| {
            parse_type(bound, scope).map_err(|e| TypeSyntaxError {
                input: input.to_string(),
                column: e.column + offset,
                ..e
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TypeParameter::with_bounds(name, bounds))
}

/// Names declared by a list of type-parameter declarations, for use as a
/// parsing scope.
pub fn declared_names(declarations: &[String]) -> Vec<String> {
    declarations
        .iter()
        .map(|d| {
            let head = d.split_once("<:").map_or(d.as_str(), |(head, _)| head);
            head.trim().trim_start_matches(['+', '-']).trim().to_string()
        })
        .collect()
}
