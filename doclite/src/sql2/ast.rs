// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Abstract syntax tree for the repository query language

use crate::node::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A parsed SELECT statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub columns: Columns,
    pub source: Source,
    pub constraint: Option<Constraint>,
    pub orderings: Vec<Ordering>,
}

/// Selected columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Columns {
    /// `SELECT *`
    All,
    List(Vec<Column>),
}

/// A single selected column: `sel.[prop] AS alias`, or `sel.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub selector: Option<String>,
    /// Property name, `*` for every property of the selector
    pub property: String,
    pub alias: Option<String>,
}

/// A node type bound to a selector name: `[nt:unstructured] AS a`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorDef {
    pub node_type: String,
    pub name: String,
}

/// FROM clause: the first selector and the inner joins that follow it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub selector: SelectorDef,
    pub joins: Vec<Join>,
}

/// `[INNER] JOIN right ON condition`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub right: SelectorDef,
    pub condition: JoinCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinCondition {
    /// `ISCHILDNODE(child, parent)`
    ChildNode { child: String, parent: String },
    /// `ISDESCENDANTNODE(descendant, ancestor)`
    DescendantNode {
        descendant: String,
        ancestor: String,
    },
    /// `ISSAMENODE(left, right)`
    SameNode { left: String, right: String },
    /// `left.[p] = right.[q]`
    Equi {
        left_selector: String,
        left_property: String,
        right_selector: String,
        right_property: String,
    },
}

/// WHERE clause constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    And(Box<Constraint>, Box<Constraint>),
    Or(Box<Constraint>, Box<Constraint>),
    Not(Box<Constraint>),
    Comparison {
        left: Operand,
        operator: Operator,
        right: Operand,
    },
    /// `operand IS [NOT] NULL`
    PropertyExistence {
        selector: Option<String>,
        property: String,
        exists: bool,
    },
    /// `ISCHILDNODE([sel,] path)`
    ChildNode {
        selector: Option<String>,
        path: Operand,
    },
    /// `ISDESCENDANTNODE([sel,] path)`
    DescendantNode {
        selector: Option<String>,
        path: Operand,
    },
    /// `ISSAMENODE([sel,] path)`
    SameNode {
        selector: Option<String>,
        path: Operand,
    },
    /// `CONTAINS(sel.[prop] | sel.*, expression)`
    FullTextSearch {
        selector: Option<String>,
        property: Option<String>,
        expression: Operand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Like,
}

/// Dynamic and static operands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Property {
        selector: Option<String>,
        name: String,
    },
    Lower(Box<Operand>),
    Upper(Box<Operand>),
    Length(Box<Operand>),
    /// `NAME([sel])`
    NodeName(Option<String>),
    /// `LOCALNAME([sel])`
    NodeLocalName(Option<String>),
    Literal(Value),
    /// `$name`
    Variable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    pub operand: Operand,
    pub direction: OrderDirection,
}

impl Statement {
    /// Selector names in declaration order
    pub fn selector_names(&self) -> Vec<String> {
        let mut names = vec![self.source.selector.name.clone()];
        names.extend(self.source.joins.iter().map(|j| j.right.name.clone()));
        names
    }

    /// All selector definitions in declaration order
    pub fn selectors(&self) -> Vec<&SelectorDef> {
        let mut selectors = vec![&self.source.selector];
        selectors.extend(self.source.joins.iter().map(|j| &j.right));
        selectors
    }

    /// Names of every `$variable` the statement references
    pub fn variable_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        if let Some(constraint) = &self.constraint {
            constraint.collect_variables(&mut names);
        }
        for ordering in &self.orderings {
            ordering.operand.collect_variables(&mut names);
        }
        names
    }
}

impl Constraint {
    fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            Constraint::And(left, right) | Constraint::Or(left, right) => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Constraint::Not(inner) => inner.collect_variables(names),
            Constraint::Comparison { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Constraint::ChildNode { path, .. }
            | Constraint::DescendantNode { path, .. }
            | Constraint::SameNode { path, .. } => path.collect_variables(names),
            Constraint::FullTextSearch { expression, .. } => expression.collect_variables(names),
            Constraint::PropertyExistence { .. } => {}
        }
    }

    /// Selector names referenced by this constraint; `None` entries stand
    /// for unqualified references
    pub(crate) fn referenced_selectors(&self, out: &mut Vec<Option<String>>) {
        match self {
            Constraint::And(left, right) | Constraint::Or(left, right) => {
                left.referenced_selectors(out);
                right.referenced_selectors(out);
            }
            Constraint::Not(inner) => inner.referenced_selectors(out),
            Constraint::Comparison { left, right, .. } => {
                left.referenced_selectors(out);
                right.referenced_selectors(out);
            }
            Constraint::PropertyExistence { selector, .. }
            | Constraint::ChildNode { selector, .. }
            | Constraint::DescendantNode { selector, .. }
            | Constraint::SameNode { selector, .. }
            | Constraint::FullTextSearch { selector, .. } => out.push(selector.clone()),
        }
    }
}

impl Operand {
    fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            Operand::Variable(name) => {
                names.insert(name.clone());
            }
            Operand::Lower(inner) | Operand::Upper(inner) | Operand::Length(inner) => {
                inner.collect_variables(names)
            }
            _ => {}
        }
    }

    pub(crate) fn referenced_selectors(&self, out: &mut Vec<Option<String>>) {
        match self {
            Operand::Property { selector, .. } => out.push(selector.clone()),
            Operand::NodeName(selector) | Operand::NodeLocalName(selector) => {
                out.push(selector.clone())
            }
            Operand::Lower(inner) | Operand::Upper(inner) | Operand::Length(inner) => {
                inner.referenced_selectors(out)
            }
            Operand::Literal(_) | Operand::Variable(_) => {}
        }
    }
}
