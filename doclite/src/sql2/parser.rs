// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Parser for the repository query language using nom parsers
//!
//! Works on the token stream produced by the lexer. Grammar:
//!
//! ```text
//! SELECT columns FROM source [WHERE constraint] [ORDER BY ordering {, ordering}]
//! source     := selector { [INNER] JOIN selector ON join_condition }
//! selector   := name [[AS] name]
//! constraint := disjunct { OR disjunct }
//! disjunct   := negation { AND negation }
//! negation   := NOT negation | primary
//! ```

use nom::{
    branch::alt,
    combinator::{map, opt, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use super::ast::*;
use super::lexer::{tokenize, Token};
use crate::node::Value;
use std::collections::HashSet;

/// Parser error type
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("Lexer error: {0}")]
    LexerError(String),
    #[error("Unexpected token: {0:?}")]
    UnexpectedToken(Token),
    #[error("Unexpected end of statement")]
    UnexpectedEnd,
    #[error("Invalid statement: {0}")]
    Invalid(String),
}

/// Parse and validate a query statement
pub fn parse_statement(input: &str) -> Result<Statement, ParserError> {
    let tokens = tokenize(input).map_err(ParserError::LexerError)?;

    let statement = match statement(&tokens) {
        Ok((remaining, statement)) => match remaining.first() {
            Some(Token::EOF) | None => statement,
            Some(token) => return Err(ParserError::UnexpectedToken(token.clone())),
        },
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(match e.input.first() {
                Some(Token::EOF) | None => ParserError::UnexpectedEnd,
                Some(token) => ParserError::UnexpectedToken(token.clone()),
            })
        }
        Err(nom::Err::Incomplete(_)) => return Err(ParserError::UnexpectedEnd),
    };

    validate(&statement)?;
    log::debug!("Parsed statement with selectors {:?}", statement.selector_names());
    Ok(statement)
}

/// Check selector names: unique, declared where referenced, and only left
/// out when the statement has a single selector
fn validate(statement: &Statement) -> Result<(), ParserError> {
    let names = statement.selector_names();
    let mut declared = HashSet::new();
    for name in &names {
        if !declared.insert(name.as_str()) {
            return Err(ParserError::Invalid(format!(
                "selector '{}' is declared twice",
                name
            )));
        }
    }

    let mut referenced = Vec::new();
    if let Columns::List(columns) = &statement.columns {
        referenced.extend(columns.iter().map(|c| c.selector.clone()));
    }
    for join in &statement.source.joins {
        match &join.condition {
            JoinCondition::ChildNode { child, parent } => {
                referenced.push(Some(child.clone()));
                referenced.push(Some(parent.clone()));
            }
            JoinCondition::DescendantNode {
                descendant,
                ancestor,
            } => {
                referenced.push(Some(descendant.clone()));
                referenced.push(Some(ancestor.clone()));
            }
            JoinCondition::SameNode { left, right } => {
                referenced.push(Some(left.clone()));
                referenced.push(Some(right.clone()));
            }
            JoinCondition::Equi {
                left_selector,
                right_selector,
                ..
            } => {
                referenced.push(Some(left_selector.clone()));
                referenced.push(Some(right_selector.clone()));
            }
        }
    }
    if let Some(constraint) = &statement.constraint {
        constraint.referenced_selectors(&mut referenced);
    }
    for ordering in &statement.orderings {
        ordering.operand.referenced_selectors(&mut referenced);
    }

    for selector in referenced {
        match selector {
            Some(name) if !declared.contains(name.as_str()) => {
                return Err(ParserError::Invalid(format!(
                    "selector '{}' is not declared",
                    name
                )));
            }
            None if names.len() > 1 => {
                return Err(ParserError::Invalid(
                    "a selector name is required when joining".to_string(),
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

fn statement(tokens: &[Token]) -> IResult<&[Token], Statement> {
    map(
        tuple((
            expect_token(Token::Select),
            columns,
            expect_token(Token::From),
            source,
            opt(preceded(expect_token(Token::Where), constraint)),
            opt(order_clause),
        )),
        |(_, columns, _, source, constraint, orderings)| Statement {
            columns,
            source,
            constraint,
            orderings: orderings.unwrap_or_default(),
        },
    )(tokens)
}

fn columns(tokens: &[Token]) -> IResult<&[Token], Columns> {
    alt((
        value(Columns::All, expect_token(Token::Star)),
        map(
            separated_list1(expect_token(Token::Comma), column),
            Columns::List,
        ),
    ))(tokens)
}

fn column(tokens: &[Token]) -> IResult<&[Token], Column> {
    map(
        pair(
            alt((
                map(
                    tuple((
                        name,
                        expect_token(Token::Dot),
                        alt((name, value("*".to_string(), expect_token(Token::Star)))),
                    )),
                    |(selector, _, property)| (Some(selector), property),
                ),
                map(name, |property| (None, property)),
            )),
            opt(preceded(expect_token(Token::As), name)),
        ),
        |((selector, property), alias)| Column {
            selector,
            property,
            alias,
        },
    )(tokens)
}

fn source(tokens: &[Token]) -> IResult<&[Token], Source> {
    map(pair(selector_def, many0(join)), |(selector, joins)| Source {
        selector,
        joins,
    })(tokens)
}

fn selector_def(tokens: &[Token]) -> IResult<&[Token], SelectorDef> {
    map(
        pair(name, opt(preceded(opt(expect_token(Token::As)), name))),
        |(node_type, alias)| SelectorDef {
            name: alias.unwrap_or_else(|| node_type.clone()),
            node_type,
        },
    )(tokens)
}

fn join(tokens: &[Token]) -> IResult<&[Token], Join> {
    map(
        tuple((
            opt(expect_token(Token::Inner)),
            expect_token(Token::Join),
            selector_def,
            expect_token(Token::On),
            join_condition,
        )),
        |(_, _, right, _, condition)| Join { right, condition },
    )(tokens)
}

/// `FUNC(first, second)` over two selector names
fn selector_pair<'a>(
    function: &'static str,
) -> impl FnMut(&'a [Token]) -> IResult<&'a [Token], (String, String)> {
    map(
        tuple((
            expect_function(function),
            expect_token(Token::LeftParen),
            name,
            expect_token(Token::Comma),
            name,
            expect_token(Token::RightParen),
        )),
        |(_, _, first, _, second, _)| (first, second),
    )
}

fn join_condition(tokens: &[Token]) -> IResult<&[Token], JoinCondition> {
    alt((
        map(selector_pair("ISCHILDNODE"), |(child, parent)| {
            JoinCondition::ChildNode { child, parent }
        }),
        map(selector_pair("ISDESCENDANTNODE"), |(descendant, ancestor)| {
            JoinCondition::DescendantNode {
                descendant,
                ancestor,
            }
        }),
        map(selector_pair("ISSAMENODE"), |(left, right)| {
            JoinCondition::SameNode { left, right }
        }),
        map(
            tuple((
                qualified_property,
                expect_token(Token::Equal),
                qualified_property,
            )),
            |((left_selector, left_property), _, (right_selector, right_property))| {
                JoinCondition::Equi {
                    left_selector,
                    left_property,
                    right_selector,
                    right_property,
                }
            },
        ),
    ))(tokens)
}

fn qualified_property(tokens: &[Token]) -> IResult<&[Token], (String, String)> {
    map(
        tuple((name, expect_token(Token::Dot), name)),
        |(selector, _, property)| (selector, property),
    )(tokens)
}

fn constraint(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    let (mut remaining, mut left) = conjunction(tokens)?;
    while let Ok((next, right)) = preceded(expect_token(Token::Or), conjunction)(remaining) {
        left = Constraint::Or(Box::new(left), Box::new(right));
        remaining = next;
    }
    Ok((remaining, left))
}

fn conjunction(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    let (mut remaining, mut left) = negation(tokens)?;
    while let Ok((next, right)) = preceded(expect_token(Token::And), negation)(remaining) {
        left = Constraint::And(Box::new(left), Box::new(right));
        remaining = next;
    }
    Ok((remaining, left))
}

fn negation(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    alt((
        map(preceded(expect_token(Token::Not), negation), |inner| {
            Constraint::Not(Box::new(inner))
        }),
        primary_constraint,
    ))(tokens)
}

fn primary_constraint(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    alt((
        delimited(
            expect_token(Token::LeftParen),
            constraint,
            expect_token(Token::RightParen),
        ),
        map(path_constraint("ISCHILDNODE"), |(selector, path)| {
            Constraint::ChildNode { selector, path }
        }),
        map(path_constraint("ISDESCENDANTNODE"), |(selector, path)| {
            Constraint::DescendantNode { selector, path }
        }),
        map(path_constraint("ISSAMENODE"), |(selector, path)| {
            Constraint::SameNode { selector, path }
        }),
        full_text_search,
        property_existence,
        comparison,
    ))(tokens)
}

/// `FUNC([selector,] path)`
fn path_constraint<'a>(
    function: &'static str,
) -> impl FnMut(&'a [Token]) -> IResult<&'a [Token], (Option<String>, Operand)> {
    map(
        tuple((
            expect_function(function),
            expect_token(Token::LeftParen),
            opt(terminated(name, expect_token(Token::Comma))),
            path_operand,
            expect_token(Token::RightParen),
        )),
        |(_, _, selector, path, _)| (selector, path),
    )
}

/// A path given as string literal, bracketed name or variable
fn path_operand(tokens: &[Token]) -> IResult<&[Token], Operand> {
    match tokens.first() {
        Some(Token::String(path)) | Some(Token::Name(path)) => {
            Ok((&tokens[1..], Operand::Literal(Value::String(path.clone()))))
        }
        Some(Token::Variable(variable)) => {
            Ok((&tokens[1..], Operand::Variable(variable.clone())))
        }
        _ => Err(error(tokens)),
    }
}

fn full_text_search(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    map(
        tuple((
            expect_function("CONTAINS"),
            expect_token(Token::LeftParen),
            alt((
                map(
                    tuple((
                        name,
                        expect_token(Token::Dot),
                        alt((map(name, Some), value(None, expect_token(Token::Star)))),
                    )),
                    |(selector, _, property)| (Some(selector), property),
                ),
                map(name, |property| (None, Some(property))),
            )),
            expect_token(Token::Comma),
            alt((static_operand, variable_operand)),
            expect_token(Token::RightParen),
        )),
        |(_, _, (selector, property), _, expression, _)| Constraint::FullTextSearch {
            selector,
            property,
            expression,
        },
    )(tokens)
}

fn property_existence(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    map(
        tuple((
            property_reference,
            expect_token(Token::Is),
            opt(expect_token(Token::Not)),
            expect_token(Token::Null),
        )),
        |((selector, property), _, not, _)| Constraint::PropertyExistence {
            selector,
            property,
            exists: not.is_some(),
        },
    )(tokens)
}

fn comparison(tokens: &[Token]) -> IResult<&[Token], Constraint> {
    map(
        tuple((operand, comparison_operator, operand)),
        |(left, operator, right)| Constraint::Comparison {
            left,
            operator,
            right,
        },
    )(tokens)
}

fn comparison_operator(tokens: &[Token]) -> IResult<&[Token], Operator> {
    alt((
        value(Operator::Equal, expect_token(Token::Equal)),
        value(Operator::NotEqual, expect_token(Token::NotEqual)),
        value(Operator::LessEqual, expect_token(Token::LessEqual)),
        value(Operator::Less, expect_token(Token::Less)),
        value(Operator::GreaterEqual, expect_token(Token::GreaterEqual)),
        value(Operator::Greater, expect_token(Token::Greater)),
        value(Operator::Like, expect_token(Token::Like)),
    ))(tokens)
}

fn operand(tokens: &[Token]) -> IResult<&[Token], Operand> {
    alt((
        variable_operand,
        static_operand,
        map(unary_function("LOWER"), |inner| Operand::Lower(Box::new(inner))),
        map(unary_function("UPPER"), |inner| Operand::Upper(Box::new(inner))),
        map(unary_function("LENGTH"), |inner| {
            Operand::Length(Box::new(inner))
        }),
        map(node_function("LOCALNAME"), Operand::NodeLocalName),
        map(node_function("NAME"), Operand::NodeName),
        property_operand,
    ))(tokens)
}

fn property_operand(tokens: &[Token]) -> IResult<&[Token], Operand> {
    map(property_reference, |(selector, name)| Operand::Property {
        selector,
        name,
    })(tokens)
}

/// `selector.[property]` or a bare `[property]`
fn property_reference(tokens: &[Token]) -> IResult<&[Token], (Option<String>, String)> {
    alt((
        map(qualified_property, |(selector, name)| (Some(selector), name)),
        map(name, |name| (None, name)),
    ))(tokens)
}

fn variable_operand(tokens: &[Token]) -> IResult<&[Token], Operand> {
    match tokens.first() {
        Some(Token::Variable(name)) => Ok((&tokens[1..], Operand::Variable(name.clone()))),
        _ => Err(error(tokens)),
    }
}

fn static_operand(tokens: &[Token]) -> IResult<&[Token], Operand> {
    alt((map(literal, Operand::Literal), cast_literal))(tokens)
}

fn literal(tokens: &[Token]) -> IResult<&[Token], Value> {
    let value = match tokens.first() {
        Some(Token::String(s)) => Value::String(s.clone()),
        Some(Token::Integer(i)) => Value::Long(*i),
        Some(Token::Float(f)) => Value::Double(*f),
        Some(Token::True) => Value::Boolean(true),
        Some(Token::False) => Value::Boolean(false),
        _ => return Err(error(tokens)),
    };
    Ok((&tokens[1..], value))
}

/// `CAST(literal AS type)`
fn cast_literal(tokens: &[Token]) -> IResult<&[Token], Operand> {
    let (remaining, (_, _, literal, _, type_name, _)) = tuple((
        expect_function("CAST"),
        expect_token(Token::LeftParen),
        literal,
        expect_token(Token::As),
        name,
        expect_token(Token::RightParen),
    ))(tokens)?;

    let text = match literal {
        Value::String(s) => s,
        other => other.to_string(),
    };
    let cast = match type_name.to_ascii_uppercase().as_str() {
        "STRING" | "NAME" | "PATH" | "URI" => Some(Value::String(text)),
        "LONG" => text.parse().ok().map(Value::Long),
        "DOUBLE" | "DECIMAL" => text.parse().ok().map(Value::Double),
        "BOOLEAN" => text.parse().ok().map(Value::Boolean),
        "DATE" => chrono::DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|date| Value::Date(date.with_timezone(&chrono::Utc))),
        "REFERENCE" | "WEAKREFERENCE" => Some(Value::Reference(text)),
        _ => None,
    };

    match cast {
        Some(value) => Ok((remaining, Operand::Literal(value))),
        None => Err(nom::Err::Failure(nom::error::Error::new(
            tokens,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

fn unary_function<'a>(
    function: &'static str,
) -> impl FnMut(&'a [Token]) -> IResult<&'a [Token], Operand> {
    map(
        tuple((
            expect_function(function),
            expect_token(Token::LeftParen),
            operand,
            expect_token(Token::RightParen),
        )),
        |(_, _, inner, _)| inner,
    )
}

/// `NAME([selector])` style functions
fn node_function<'a>(
    function: &'static str,
) -> impl FnMut(&'a [Token]) -> IResult<&'a [Token], Option<String>> {
    map(
        tuple((
            expect_function(function),
            expect_token(Token::LeftParen),
            opt(name),
            expect_token(Token::RightParen),
        )),
        |(_, _, selector, _)| selector,
    )
}

fn order_clause(tokens: &[Token]) -> IResult<&[Token], Vec<Ordering>> {
    preceded(
        pair(expect_token(Token::Order), expect_token(Token::By)),
        separated_list1(expect_token(Token::Comma), ordering),
    )(tokens)
}

fn ordering(tokens: &[Token]) -> IResult<&[Token], Ordering> {
    map(
        pair(
            operand,
            opt(alt((
                value(OrderDirection::Ascending, expect_token(Token::Asc)),
                value(OrderDirection::Descending, expect_token(Token::Desc)),
            ))),
        ),
        |(operand, direction)| Ordering {
            operand,
            direction: direction.unwrap_or(OrderDirection::Ascending),
        },
    )(tokens)
}

/// A bare identifier or a `[bracketed name]`
fn name(tokens: &[Token]) -> IResult<&[Token], String> {
    match tokens.first() {
        Some(Token::Identifier(s)) | Some(Token::Name(s)) => Ok((&tokens[1..], s.clone())),
        _ => Err(error(tokens)),
    }
}

fn error(tokens: &[Token]) -> nom::Err<nom::error::Error<&[Token]>> {
    nom::Err::Error(nom::error::Error::new(tokens, nom::error::ErrorKind::Tag))
}

fn expect_token(expected: Token) -> impl Fn(&[Token]) -> IResult<&[Token], Token> {
    move |tokens: &[Token]| {
        if let Some(token) = tokens.first() {
            if std::mem::discriminant(token) == std::mem::discriminant(&expected) {
                return Ok((&tokens[1..], token.clone()));
            }
        }
        Err(error(tokens))
    }
}

/// Match a function name, case-insensitively; it must be followed by `(`
fn expect_function(function: &'static str) -> impl Fn(&[Token]) -> IResult<&[Token], ()> {
    move |tokens: &[Token]| match tokens {
        [Token::Identifier(s), Token::LeftParen, ..] if s.eq_ignore_ascii_case(function) => {
            Ok((&tokens[1..], ()))
        }
        _ => Err(error(tokens)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_select() {
        let statement =
            parse_statement("SELECT * FROM [nt:unstructured] AS page WHERE page.[title] = 'Home'")
                .unwrap();

        assert_eq!(statement.columns, Columns::All);
        assert_eq!(statement.source.selector.node_type, "nt:unstructured");
        assert_eq!(statement.selector_names(), vec!["page"]);
        assert_eq!(
            statement.constraint,
            Some(Constraint::Comparison {
                left: Operand::Property {
                    selector: Some("page".to_string()),
                    name: "title".to_string(),
                },
                operator: Operator::Equal,
                right: Operand::Literal(Value::from("Home")),
            })
        );
    }

    #[test]
    fn test_selector_defaults_to_node_type() {
        let statement = parse_statement("SELECT * FROM [sulu:page]").unwrap();
        assert_eq!(statement.selector_names(), vec!["sulu:page"]);
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let statement = parse_statement("SELECT * FROM [nt:base] WHERE a = 1 OR b = 2 AND c = 3")
            .unwrap();
        match statement.constraint {
            Some(Constraint::Or(_, right)) => {
                assert!(matches!(*right, Constraint::And(_, _)))
            }
            other => panic!("unexpected constraint {:?}", other),
        }
    }

    #[test]
    fn test_join_with_child_node_condition() {
        let statement = parse_statement(
            "SELECT parent.[title], child.[title] AS childTitle \
             FROM [nt:unstructured] AS parent \
             INNER JOIN [nt:unstructured] AS child ON ISCHILDNODE(child, parent) \
             WHERE ISDESCENDANTNODE(parent, '/cmf') ORDER BY child.[title] DESC",
        )
        .unwrap();

        assert_eq!(statement.selector_names(), vec!["parent", "child"]);
        assert_eq!(
            statement.source.joins[0].condition,
            JoinCondition::ChildNode {
                child: "child".to_string(),
                parent: "parent".to_string(),
            }
        );
        assert_eq!(statement.orderings[0].direction, OrderDirection::Descending);
        match &statement.columns {
            Columns::List(columns) => {
                assert_eq!(columns.len(), 2);
                assert_eq!(columns[1].alias.as_deref(), Some("childTitle"));
            }
            Columns::All => panic!("expected column list"),
        }
    }

    #[test]
    fn test_functions_and_existence() {
        let statement = parse_statement(
            "SELECT * FROM [nt:base] AS a \
             WHERE LOWER(a.[title]) LIKE 'h%' AND a.[deleted] IS NULL \
             AND a.[state] IS NOT NULL AND NAME(a) <> 'x' AND CONTAINS(a.*, 'news')",
        )
        .unwrap();

        let mut referenced = Vec::new();
        statement
            .constraint
            .as_ref()
            .unwrap()
            .referenced_selectors(&mut referenced);
        assert_eq!(referenced.len(), 5);
    }

    #[test]
    fn test_variables_are_collected() {
        let statement = parse_statement(
            "SELECT * FROM [nt:base] WHERE [jcr:uuid] = $id OR ISCHILDNODE($parent)",
        )
        .unwrap();
        let names: Vec<String> = statement.variable_names().into_iter().collect();
        assert_eq!(names, vec!["id", "parent"]);
    }

    #[test]
    fn test_cast_literal() {
        let statement = parse_statement(
            "SELECT * FROM [nt:base] WHERE [created] > CAST('2024-01-01T00:00:00Z' AS DATE)",
        )
        .unwrap();
        match statement.constraint {
            Some(Constraint::Comparison {
                right: Operand::Literal(Value::Date(_)),
                ..
            }) => {}
            other => panic!("unexpected constraint {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            parse_statement("SELECT * FROM"),
            Err(ParserError::UnexpectedEnd)
        ));
        assert!(matches!(
            parse_statement("SELECT * FROM [nt:base] WHERE"),
            Err(ParserError::UnexpectedToken(Token::Where))
        ));
        assert!(parse_statement("DELETE FROM x").is_err());
    }

    #[test]
    fn test_undeclared_selector_rejected() {
        assert!(matches!(
            parse_statement("SELECT * FROM [nt:base] AS a WHERE b.[title] = 'x'"),
            Err(ParserError::Invalid(_))
        ));
        assert!(matches!(
            parse_statement(
                "SELECT * FROM [nt:base] AS a JOIN [nt:base] AS b ON ISSAMENODE(a, b) WHERE [title] = 'x'"
            ),
            Err(ParserError::Invalid(_))
        ));
    }
}
