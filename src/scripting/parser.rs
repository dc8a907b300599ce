//! Compiles script text into a list of statements.
//!
//! The language is a flat sequence of calls, one or more per line, optionally separated by `;`:
//!
//! ```text
//! -- pick and place
//! moveParabolic(2.0, 0.5, 1.0)
//! gripObject(); wait(0.5)
//! setJointRotation(0, 45)
//! print("done")
//! ```
//!
//! Everything from `--` to the end of the line is a comment.

use crate::kinematic_traits::{Interpolation, Position};
use crate::scripting::command::{Command, ScriptError, Statement};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    Number(f64),
    Text(String),
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
}

#[derive(Debug, Clone, PartialEq)]
struct Lexeme {
    token: Token,
    line: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Argument {
    Number(f64),
    Text(String),
}

/// The line up to a `--` comment. Dashes inside a string literal do not start one.
fn strip_comment(text: &str) -> &str {
    let mut quote = None;
    let mut previous_dash = false;
    for (index, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '-' && previous_dash => return &text[..index - 1],
            None => {}
        }
        previous_dash = quote.is_none() && c == '-';
    }
    text
}

fn tokenize(source: &str) -> Result<Vec<Lexeme>, ScriptError> {
    let mut lexemes = Vec::new();
    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        let code = strip_comment(text);
        let chars: Vec<char> = code.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let single = match c {
                '(' => Some(Token::OpenParen),
                ')' => Some(Token::CloseParen),
                ',' => Some(Token::Comma),
                ';' => Some(Token::Semicolon),
                _ => None,
            };
            if let Some(token) = single {
                lexemes.push(Lexeme { token, line });
                i += 1;
            } else if c.is_whitespace() {
                i += 1;
            } else if c.is_ascii_alphabetic() || c == '_' {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                lexemes.push(Lexeme { token: Token::Identifier(name), line });
            } else if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' {
                let start = i;
                i += 1;
                while i < chars.len() {
                    let d = chars[i];
                    let exponent_sign = (d == '-' || d == '+') && matches!(chars[i - 1], 'e' | 'E');
                    if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' || exponent_sign {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ScriptError::compile(line, format!("malformed number '{}'", literal)))?;
                lexemes.push(Lexeme { token: Token::Number(value), line });
            } else if c == '"' || c == '\'' {
                let start = i + 1;
                i = start;
                while i < chars.len() && chars[i] != c {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(ScriptError::compile(line, "unfinished string"));
                }
                let value: String = chars[start..i].iter().collect();
                lexemes.push(Lexeme { token: Token::Text(value), line });
                i += 1;
            } else {
                return Err(ScriptError::compile(line, format!("unexpected symbol '{}'", c)));
            }
        }
    }
    Ok(lexemes)
}

struct Parser {
    lexemes: Vec<Lexeme>,
    position: usize,
    last_line: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.position)
    }

    fn next(&mut self) -> Option<Lexeme> {
        let lexeme = self.lexemes.get(self.position).cloned();
        if let Some(l) = &lexeme {
            self.last_line = l.line;
            self.position += 1;
        }
        lexeme
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ScriptError> {
        match self.next() {
            Some(l) if l.token == expected => Ok(()),
            Some(l) => Err(ScriptError::compile(l.line, format!("'{}' expected", what))),
            None => Err(ScriptError::compile(self.last_line, format!("'{}' expected near end of script", what))),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Argument>, ScriptError> {
        self.expect(Token::OpenParen, "(")?;
        let mut arguments = Vec::new();
        if matches!(self.peek(), Some(Lexeme { token: Token::CloseParen, .. })) {
            self.next();
            return Ok(arguments);
        }
        loop {
            match self.next() {
                Some(Lexeme { token: Token::Number(v), .. }) => arguments.push(Argument::Number(v)),
                Some(Lexeme { token: Token::Text(s), .. }) => arguments.push(Argument::Text(s)),
                Some(l) => return Err(ScriptError::compile(l.line, "argument expected")),
                None => return Err(ScriptError::compile(self.last_line, "argument expected near end of script")),
            }
            match self.next() {
                Some(Lexeme { token: Token::Comma, .. }) => continue,
                Some(Lexeme { token: Token::CloseParen, .. }) => return Ok(arguments),
                Some(l) => return Err(ScriptError::compile(l.line, "')' expected")),
                None => return Err(ScriptError::compile(self.last_line, "')' expected near end of script")),
            }
        }
    }

    fn statement(&mut self) -> Result<Option<Statement>, ScriptError> {
        while matches!(self.peek(), Some(Lexeme { token: Token::Semicolon, .. })) {
            self.next();
        }
        let Some(lexeme) = self.next() else {
            return Ok(None);
        };
        let line = lexeme.line;
        let Token::Identifier(name) = lexeme.token else {
            return Err(ScriptError::compile(line, "function call expected"));
        };
        let arguments = self.arguments()?;
        let command = build(&name, &arguments, line)?;
        Ok(Some(Statement { command, line }))
    }
}

fn numbers(name: &str, arguments: &[Argument], count: usize, line: usize) -> Result<Vec<f64>, ScriptError> {
    if arguments.len() != count {
        return Err(ScriptError::compile(
            line,
            format!("{} takes {} argument(s), {} given", name, count, arguments.len()),
        ));
    }
    arguments
        .iter()
        .enumerate()
        .map(|(i, a)| match a {
            Argument::Number(v) => Ok(*v),
            Argument::Text(_) => Err(ScriptError::compile(
                line,
                format!("bad argument #{} to {} (number expected)", i + 1, name),
            )),
        })
        .collect()
}

fn build(name: &str, arguments: &[Argument], line: usize) -> Result<Command, ScriptError> {
    let movement = |interpolation: Interpolation| -> Result<Command, ScriptError> {
        let v = numbers(name, arguments, 3, line)?;
        Ok(Command::Move {
            target: Position::new(v[0], v[1], v[2]),
            interpolation,
        })
    };
    match name {
        "setJointRotation" => {
            let v = numbers(name, arguments, 2, line)?;
            if v[0].fract() != 0.0 || !v[0].is_finite() {
                return Err(ScriptError::compile(line, "joint index must be an integer"));
            }
            Ok(Command::SetJointRotation {
                joint: v[0] as i64,
                degrees: v[1],
            })
        }
        "wait" => {
            let v = numbers(name, arguments, 1, line)?;
            Ok(Command::Wait { seconds: v[0] })
        }
        "moveLinear" => movement(Interpolation::Linear),
        "moveParabolic" => movement(Interpolation::Parabolic),
        "moveSpline" => movement(Interpolation::Spline),
        "gripObject" => {
            numbers(name, arguments, 0, line)?;
            Ok(Command::Grip)
        }
        "releaseObject" => {
            numbers(name, arguments, 0, line)?;
            Ok(Command::Release)
        }
        "print" => {
            let text = arguments
                .iter()
                .map(|a| match a {
                    Argument::Number(v) => v.to_string(),
                    Argument::Text(s) => s.clone(),
                })
                .collect::<Vec<_>>()
                .join("\t");
            Ok(Command::Print { text })
        }
        _ => Err(ScriptError::compile(line, format!("unknown function '{}'", name))),
    }
}

/// Compiles the script. The first syntax error stops compilation and is reported with its line.
pub fn parse(source: &str) -> Result<Vec<Statement>, ScriptError> {
    let mut parser = Parser {
        lexemes: tokenize(source)?,
        position: 0,
        last_line: 1,
    };
    let mut statements = Vec::new();
    while let Some(statement) = parser.statement()? {
        statements.push(statement);
    }
    Ok(statements)
}
