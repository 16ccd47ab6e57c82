// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lexer for the repository query language using nom

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1},
    combinator::{map, opt, recognize, value},
    error::{Error, ErrorKind},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Select,
    From,
    Where,
    Order,
    By,
    Asc,
    Desc,
    As,
    Inner,
    Join,
    On,
    And,
    Or,
    Not,
    Is,
    Null,
    Like,
    True,
    False,

    // Names and literals
    Identifier(String),
    /// `[quoted name]`
    Name(String),
    String(String),
    Integer(i64),
    Float(f64),
    /// `$name`
    Variable(String),

    // Operators and delimiters
    Star,
    Comma,
    Dot,
    LeftParen,
    RightParen,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    Whitespace,
    EOF,
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':'
}

/// Map a bare word to its keyword token, case-insensitively
fn keyword(word: &str) -> Token {
    match word.to_ascii_uppercase().as_str() {
        "SELECT" => Token::Select,
        "FROM" => Token::From,
        "WHERE" => Token::Where,
        "ORDER" => Token::Order,
        "BY" => Token::By,
        "ASC" => Token::Asc,
        "DESC" => Token::Desc,
        "AS" => Token::As,
        "INNER" => Token::Inner,
        "JOIN" => Token::Join,
        "ON" => Token::On,
        "AND" => Token::And,
        "OR" => Token::Or,
        "NOT" => Token::Not,
        "IS" => Token::Is,
        "NULL" => Token::Null,
        "LIKE" => Token::Like,
        "TRUE" => Token::True,
        "FALSE" => Token::False,
        _ => Token::Identifier(word.to_string()),
    }
}

fn whitespace(input: &str) -> IResult<&str, Token> {
    value(Token::Whitespace, multispace1)(input)
}

fn word(input: &str) -> IResult<&str, Token> {
    map(
        recognize(pair(
            take_while1(is_identifier_start),
            take_while(is_identifier_char),
        )),
        keyword,
    )(input)
}

fn bracketed_name(input: &str) -> IResult<&str, Token> {
    map(
        delimited(char('['), take_while1(|c| c != ']'), char(']')),
        |name: &str| Token::Name(name.to_string()),
    )(input)
}

fn variable(input: &str) -> IResult<&str, Token> {
    map(
        preceded(char('$'), take_while1(is_identifier_char)),
        |name: &str| Token::Variable(name.to_string()),
    )(input)
}

/// Single or double quoted string; a doubled quote inside stands for itself
fn string_literal(input: &str) -> IResult<&str, Token> {
    let quote = match input.chars().next() {
        Some(c @ ('\'' | '"')) => c,
        _ => return Err(nom::Err::Error(Error::new(input, ErrorKind::Char))),
    };

    let body = &input[1..];
    let mut text = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        if c == quote {
            if matches!(chars.peek(), Some(&(_, next)) if next == quote) {
                text.push(quote);
                chars.next();
                continue;
            }
            return Ok((&body[index + c.len_utf8()..], Token::String(text)));
        }
        text.push(c);
    }

    // Unterminated string
    Err(nom::Err::Failure(Error::new(input, ErrorKind::Char)))
}

fn number(input: &str) -> IResult<&str, Token> {
    let (rest, text) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)?;

    let token = if text.contains('.') {
        text.parse().ok().map(Token::Float)
    } else {
        text.parse().ok().map(Token::Integer)
    };

    token
        .map(|token| (rest, token))
        .ok_or_else(|| nom::Err::Failure(Error::new(input, ErrorKind::Digit)))
}

/// Operators and delimiters; multi-character operators come first
fn symbol(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::NotEqual, tag("<>")),
        value(Token::NotEqual, tag("!=")),
        value(Token::LessEqual, tag("<=")),
        value(Token::GreaterEqual, tag(">=")),
        value(Token::Less, char('<')),
        value(Token::Greater, char('>')),
        value(Token::Equal, char('=')),
        value(Token::Star, char('*')),
        value(Token::Comma, char(',')),
        value(Token::Dot, char('.')),
        value(Token::LeftParen, char('(')),
        value(Token::RightParen, char(')')),
    ))(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((
        whitespace,
        string_literal,
        bracketed_name,
        variable,
        number,
        symbol,
        word,
    ))(input)
}

/// Split a statement into tokens, terminated by `Token::EOF`
pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    while !remaining.is_empty() {
        match token(remaining) {
            Ok((next_remaining, token)) => {
                if next_remaining.len() == remaining.len() {
                    return Err(format!("Lexer made no progress at '{}'", remaining));
                }
                if token != Token::Whitespace {
                    tokens.push(token);
                }
                remaining = next_remaining;
            }
            Err(_) => {
                let snippet: String = remaining.chars().take(20).collect();
                return Err(format!("Unexpected input at '{}'", snippet));
            }
        }
    }

    tokens.push(Token::EOF);
    Ok(tokens)
}
