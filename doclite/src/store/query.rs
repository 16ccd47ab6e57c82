// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Native queries over the in-memory node tree
//!
//! Evaluation runs in four steps: selector candidates in document order,
//! inner joins by nested loop, constraint filtering, then a stable sort
//! followed by offset and limit.

use crate::node::{path, Node, Value};
use crate::sql2::ast::*;
use crate::sql2::{parse_statement, LANGUAGE};
use crate::store::error::{StoreError, StoreResult};
use crate::store::native::{NativeQuery, NativeResult, Parameters};
use crate::store::node_tree::NodeTree;
use crate::store::row::Row;
use parking_lot::RwLock;
use regex::Regex;
use std::borrow::Cow;
use std::cmp;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// One node per selector, in selector declaration order
type Tuple = Vec<Arc<Node>>;

/// A parsed statement bound to a node tree
pub struct StoreQuery {
    text: String,
    statement: Arc<Statement>,
    variables: BTreeSet<String>,
    tree: Arc<RwLock<NodeTree>>,
    bindings: Parameters,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl StoreQuery {
    /// Parse a statement against the given tree
    pub fn new(text: &str, tree: Arc<RwLock<NodeTree>>) -> StoreResult<Self> {
        let statement = parse_statement(text)?;
        let variables = statement.variable_names();
        Ok(Self {
            text: text.to_string(),
            statement: Arc::new(statement),
            variables,
            tree,
            bindings: HashMap::new(),
            limit: None,
            offset: None,
        })
    }

    /// The parsed statement
    pub fn parsed(&self) -> &Statement {
        &self.statement
    }

    /// Currently bound values
    pub fn bindings(&self) -> &Parameters {
        &self.bindings
    }
}

impl fmt::Debug for StoreQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreQuery")
            .field("statement", &self.text)
            .field("bindings", &self.bindings)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl NativeQuery for StoreQuery {
    fn statement(&self) -> &str {
        &self.text
    }

    fn language(&self) -> &str {
        LANGUAGE
    }

    fn set_limit(&mut self, limit: usize) {
        self.limit = Some(limit);
    }

    fn set_offset(&mut self, offset: usize) {
        self.offset = Some(offset);
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn offset(&self) -> Option<usize> {
        self.offset
    }

    fn bind_value(&mut self, name: &str, value: Value) -> StoreResult<()> {
        if !self.variables.contains(name) {
            return Err(StoreError::UnknownVariable(name.to_string()));
        }
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }

    fn variable_names(&self) -> Vec<String> {
        self.variables.iter().cloned().collect()
    }

    fn execute(&self) -> StoreResult<Box<dyn NativeResult>> {
        if let Some(missing) = self
            .variables
            .iter()
            .find(|name| !self.bindings.contains_key(*name))
        {
            return Err(StoreError::UnboundVariable(missing.clone()));
        }

        log::debug!(
            "Executing query '{}' (limit {:?}, offset {:?})",
            self.text,
            self.limit,
            self.offset
        );

        Ok(Box::new(StoreQueryResult {
            statement: self.statement.clone(),
            tree: self.tree.clone(),
            bindings: self.bindings.clone(),
            limit: self.limit,
            offset: self.offset,
            rows: None,
        }))
    }
}

/// Result of a store query, evaluated on the first `rows()` call
pub struct StoreQueryResult {
    statement: Arc<Statement>,
    tree: Arc<RwLock<NodeTree>>,
    bindings: Parameters,
    limit: Option<usize>,
    offset: Option<usize>,
    rows: Option<Vec<Row>>,
}

impl StoreQueryResult {
    /// Check if the rows were already evaluated
    pub fn is_evaluated(&self) -> bool {
        self.rows.is_some()
    }
}

impl fmt::Debug for StoreQueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreQueryResult")
            .field("selectors", &self.statement.selector_names())
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("rows", &self.rows.as_ref().map(Vec::len))
            .finish()
    }
}

impl NativeResult for StoreQueryResult {
    fn selector_names(&self) -> Vec<String> {
        self.statement.selector_names()
    }

    fn column_names(&self) -> Vec<String> {
        match &self.statement.columns {
            Columns::All => Vec::new(),
            Columns::List(columns) => columns
                .iter()
                .map(|c| {
                    c.alias
                        .clone()
                        .unwrap_or_else(|| qualify(c.selector.as_deref(), &c.property))
                })
                .collect(),
        }
    }

    fn rows(&mut self) -> StoreResult<Vec<Row>> {
        if self.rows.is_none() {
            let tree = self.tree.read();
            let mut evaluator = Evaluator::new(&self.statement, &self.bindings);
            let rows = evaluator.evaluate(&tree, self.offset, self.limit)?;
            log::debug!("Query produced {} rows", rows.len());
            self.rows = Some(rows);
        }
        Ok(self.rows.clone().unwrap_or_default())
    }
}

fn qualify(selector: Option<&str>, property: &str) -> String {
    match selector {
        Some(selector) => format!("{}.{}", selector, property),
        None => property.to_string(),
    }
}

/// Single values of a property value; arrays are flattened, null is empty
fn flatten(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// String form used by string functions, LIKE and full-text search
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) | Value::Reference(s) => s.clone(),
        Value::Date(date) => date.to_rfc3339(),
        other => other.to_string(),
    }
}

/// Statement evaluator over a locked node tree
struct Evaluator<'a> {
    statement: &'a Statement,
    bindings: &'a Parameters,
    selectors: HashMap<String, usize>,
    like_patterns: HashMap<String, Regex>,
}

impl<'a> Evaluator<'a> {
    fn new(statement: &'a Statement, bindings: &'a Parameters) -> Self {
        let selectors = statement
            .selector_names()
            .into_iter()
            .enumerate()
            .map(|(index, name)| (name, index))
            .collect();
        Self {
            statement,
            bindings,
            selectors,
            like_patterns: HashMap::new(),
        }
    }

    fn evaluate(
        &mut self,
        tree: &NodeTree,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>> {
        let ordered = tree.document_order();
        let candidates = |def: &SelectorDef| -> Vec<Arc<Node>> {
            ordered
                .iter()
                .filter(|node| node.is_node_type(&def.node_type))
                .cloned()
                .collect()
        };

        let statement = self.statement;
        let mut tuples: Vec<Tuple> = candidates(&statement.source.selector)
            .into_iter()
            .map(|node| vec![node])
            .collect();

        for join in &statement.source.joins {
            let right = candidates(&join.right);
            let mut joined = Vec::new();
            for tuple in &tuples {
                for node in &right {
                    let mut candidate = tuple.clone();
                    candidate.push(node.clone());
                    if self.join_matches(&join.condition, &candidate)? {
                        joined.push(candidate);
                    }
                }
            }
            tuples = joined;
        }

        let mut matched = Vec::new();
        for tuple in tuples {
            let score = match &statement.constraint {
                Some(constraint) => {
                    if !self.matches(constraint, &tuple)? {
                        continue;
                    }
                    self.score(constraint, &tuple)?
                }
                None => 0.0,
            };
            matched.push((tuple, score));
        }

        if !statement.orderings.is_empty() {
            let mut keyed = Vec::with_capacity(matched.len());
            for (tuple, score) in matched {
                let mut keys = Vec::with_capacity(statement.orderings.len());
                for ordering in &statement.orderings {
                    keys.push(self.operand_values(&ordering.operand, &tuple)?.into_iter().next());
                }
                keyed.push((keys, tuple, score));
            }
            keyed.sort_by(|a, b| {
                for (index, ordering) in statement.orderings.iter().enumerate() {
                    let order = compare_keys(&a.0[index], &b.0[index]);
                    let order = match ordering.direction {
                        OrderDirection::Ascending => order,
                        OrderDirection::Descending => order.reverse(),
                    };
                    if order != cmp::Ordering::Equal {
                        return order;
                    }
                }
                cmp::Ordering::Equal
            });
            matched = keyed
                .into_iter()
                .map(|(_, tuple, score)| (tuple, score))
                .collect();
        }

        matched
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .map(|(tuple, score)| self.build_row(tuple, score))
            .collect()
    }

    fn build_row(&self, tuple: Tuple, score: f64) -> StoreResult<Row> {
        let mut values = HashMap::new();
        if let Columns::List(columns) = &self.statement.columns {
            for column in columns {
                let node = self.node(&tuple, column.selector.as_deref())?;
                if column.property == "*" {
                    for (name, value) in &node.properties {
                        values.insert(qualify(column.selector.as_deref(), name), value.clone());
                    }
                } else {
                    let key = column
                        .alias
                        .clone()
                        .unwrap_or_else(|| qualify(column.selector.as_deref(), &column.property));
                    let value = node
                        .property_value(&column.property)
                        .map(Cow::into_owned)
                        .unwrap_or(Value::Null);
                    values.insert(key, value);
                }
            }
        }

        let mut row = if tuple.len() == 1 {
            Row::single(tuple[0].clone())
        } else {
            let names = self.statement.selector_names();
            Row::multi(names.into_iter().zip(tuple).collect())
        };
        row.values = values;
        row.score = score;
        Ok(row)
    }

    /// Node of a selector within a tuple; unqualified references mean the
    /// only selector
    fn node<'t>(&self, tuple: &'t Tuple, selector: Option<&str>) -> StoreResult<&'t Arc<Node>> {
        let index = match selector {
            Some(name) => *self
                .selectors
                .get(name)
                .ok_or_else(|| StoreError::UnknownSelector(name.to_string()))?,
            None => 0,
        };
        tuple
            .get(index)
            .ok_or_else(|| StoreError::InvalidQuery(format!("selector index {} out of range", index)))
    }

    fn node_by_name<'t>(&self, tuple: &'t Tuple, selector: &str) -> StoreResult<&'t Arc<Node>> {
        self.node(tuple, Some(selector))
    }

    fn join_matches(&mut self, condition: &JoinCondition, tuple: &Tuple) -> StoreResult<bool> {
        Ok(match condition {
            JoinCondition::ChildNode { child, parent } => {
                let child = self.node_by_name(tuple, child)?;
                let parent = self.node_by_name(tuple, parent)?;
                child.parent_path() == Some(parent.path.as_str())
            }
            JoinCondition::DescendantNode {
                descendant,
                ancestor,
            } => {
                let descendant = self.node_by_name(tuple, descendant)?;
                let ancestor = self.node_by_name(tuple, ancestor)?;
                path::is_descendant_of(&descendant.path, &ancestor.path)
            }
            JoinCondition::SameNode { left, right } => {
                self.node_by_name(tuple, left)?.path == self.node_by_name(tuple, right)?.path
            }
            JoinCondition::Equi {
                left_selector,
                left_property,
                right_selector,
                right_property,
            } => {
                let left = self
                    .node_by_name(tuple, left_selector)?
                    .property_value(left_property)
                    .map(|v| flatten(v.into_owned()))
                    .unwrap_or_default();
                let right = self
                    .node_by_name(tuple, right_selector)?
                    .property_value(right_property)
                    .map(|v| flatten(v.into_owned()))
                    .unwrap_or_default();
                left.iter().any(|l| {
                    right
                        .iter()
                        .any(|r| l.compare(r) == Some(cmp::Ordering::Equal))
                })
            }
        })
    }

    fn matches(&mut self, constraint: &Constraint, tuple: &Tuple) -> StoreResult<bool> {
        match constraint {
            Constraint::And(left, right) => {
                Ok(self.matches(left, tuple)? && self.matches(right, tuple)?)
            }
            Constraint::Or(left, right) => {
                Ok(self.matches(left, tuple)? || self.matches(right, tuple)?)
            }
            Constraint::Not(inner) => Ok(!self.matches(inner, tuple)?),
            Constraint::Comparison {
                left,
                operator,
                right,
            } => {
                let left = self.operand_values(left, tuple)?;
                let right = self.operand_values(right, tuple)?;
                for l in &left {
                    for r in &right {
                        if self.compare(l, *operator, r)? {
                            return Ok(true);
                        }
                    }
                }
                Ok(false)
            }
            Constraint::PropertyExistence {
                selector,
                property,
                exists,
            } => {
                let node = self.node(tuple, selector.as_deref())?;
                let present = node
                    .property_value(property)
                    .map(|v| !v.is_null())
                    .unwrap_or(false);
                Ok(present == *exists)
            }
            Constraint::ChildNode { selector, path } => {
                let target = self.path_argument(path, tuple)?;
                let node = self.node(tuple, selector.as_deref())?;
                Ok(path::is_child_of(&node.path, &target))
            }
            Constraint::DescendantNode { selector, path } => {
                let target = self.path_argument(path, tuple)?;
                let node = self.node(tuple, selector.as_deref())?;
                Ok(path::is_descendant_of(&node.path, &target))
            }
            Constraint::SameNode { selector, path } => {
                let target = self.path_argument(path, tuple)?;
                let node = self.node(tuple, selector.as_deref())?;
                Ok(node.path == target)
            }
            Constraint::FullTextSearch { .. } => Ok(self.full_text_hits(constraint, tuple)? > 0),
        }
    }

    /// Relevance of a matching tuple: full-text hits of every CONTAINS
    /// constraint that holds
    fn score(&mut self, constraint: &Constraint, tuple: &Tuple) -> StoreResult<f64> {
        Ok(match constraint {
            Constraint::And(left, right) | Constraint::Or(left, right) => {
                self.score(left, tuple)? + self.score(right, tuple)?
            }
            Constraint::FullTextSearch { .. } => self.full_text_hits(constraint, tuple)? as f64,
            _ => 0.0,
        })
    }

    /// Number of term occurrences, 0 when the search does not match
    fn full_text_hits(&mut self, constraint: &Constraint, tuple: &Tuple) -> StoreResult<usize> {
        let (selector, property, expression) = match constraint {
            Constraint::FullTextSearch {
                selector,
                property,
                expression,
            } => (selector, property, expression),
            _ => return Ok(0),
        };

        let expression = self
            .operand_values(expression, tuple)?
            .iter()
            .map(text_of)
            .collect::<Vec<_>>()
            .join(" ");
        let node = self.node(tuple, selector.as_deref())?;

        let values: Vec<Value> = match property {
            Some(name) => node
                .property_value(name)
                .map(|v| flatten(v.into_owned()))
                .unwrap_or_default(),
            None => node
                .properties
                .values()
                .flat_map(|v| flatten(v.clone()))
                .filter(|v| matches!(v, Value::String(_)))
                .collect(),
        };
        let text = values
            .iter()
            .map(text_of)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let terms = search_terms(&expression);
        if terms.iter().all(|(_, excluded)| *excluded) {
            return Ok(0);
        }

        let mut hits = 0;
        for (term, excluded) in &terms {
            let count = text.matches(term.as_str()).count();
            match (excluded, count) {
                (true, 0) => {}
                (true, _) => return Ok(0),
                (false, 0) => return Ok(0),
                (false, n) => hits += n,
            }
        }
        Ok(hits)
    }

    fn path_argument(&self, operand: &Operand, tuple: &Tuple) -> StoreResult<String> {
        let value = self
            .operand_values(operand, tuple)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidQuery("path argument is empty".to_string()))?;
        Ok(path::normalize(&text_of(&value))?)
    }

    fn operand_values(&self, operand: &Operand, tuple: &Tuple) -> StoreResult<Vec<Value>> {
        Ok(match operand {
            Operand::Property { selector, name } => self
                .node(tuple, selector.as_deref())?
                .property_value(name)
                .map(|v| flatten(v.into_owned()))
                .unwrap_or_default(),
            Operand::Lower(inner) => self
                .operand_values(inner, tuple)?
                .iter()
                .map(|v| Value::String(text_of(v).to_lowercase()))
                .collect(),
            Operand::Upper(inner) => self
                .operand_values(inner, tuple)?
                .iter()
                .map(|v| Value::String(text_of(v).to_uppercase()))
                .collect(),
            Operand::Length(inner) => self
                .operand_values(inner, tuple)?
                .iter()
                .map(|v| Value::Long(text_of(v).chars().count() as i64))
                .collect(),
            Operand::NodeName(selector) => {
                let node = self.node(tuple, selector.as_deref())?;
                vec![Value::String(node.name().to_string())]
            }
            Operand::NodeLocalName(selector) => {
                let name = self.node(tuple, selector.as_deref())?.name();
                let local = name.rsplit(':').next().unwrap_or(name);
                vec![Value::String(local.to_string())]
            }
            Operand::Literal(value) => flatten(value.clone()),
            Operand::Variable(name) => flatten(
                self.bindings
                    .get(name)
                    .cloned()
                    .ok_or_else(|| StoreError::UnboundVariable(name.clone()))?,
            ),
        })
    }

    fn compare(&mut self, left: &Value, operator: Operator, right: &Value) -> StoreResult<bool> {
        if operator == Operator::Like {
            let pattern = text_of(right);
            let regex = self.like_regex(&pattern)?;
            return Ok(regex.is_match(&text_of(left)));
        }

        let order = match left.compare(right) {
            Some(order) => order,
            None => return Ok(false),
        };
        Ok(match operator {
            Operator::Equal => order == cmp::Ordering::Equal,
            Operator::NotEqual => order != cmp::Ordering::Equal,
            Operator::Less => order == cmp::Ordering::Less,
            Operator::LessEqual => order != cmp::Ordering::Greater,
            Operator::Greater => order == cmp::Ordering::Greater,
            Operator::GreaterEqual => order != cmp::Ordering::Less,
            Operator::Like => false,
        })
    }

    /// Compiled regex for a LIKE pattern: `%` is any run, `_` any character
    fn like_regex(&mut self, pattern: &str) -> StoreResult<&Regex> {
        if !self.like_patterns.contains_key(pattern) {
            let mut expression = String::from("(?s)^");
            for c in pattern.chars() {
                match c {
                    '%' => expression.push_str(".*"),
                    '_' => expression.push('.'),
                    other => expression.push_str(&regex::escape(&other.to_string())),
                }
            }
            expression.push('$');
            let regex =
                Regex::new(&expression).map_err(|e| StoreError::InvalidQuery(e.to_string()))?;
            self.like_patterns.insert(pattern.to_string(), regex);
        }
        self.like_patterns
            .get(pattern)
            .ok_or_else(|| StoreError::InvalidQuery(format!("invalid LIKE pattern '{}'", pattern)))
    }
}

fn compare_keys(a: &Option<Value>, b: &Option<Value>) -> cmp::Ordering {
    match (a, b) {
        (None, None) => cmp::Ordering::Equal,
        (None, Some(_)) => cmp::Ordering::Less,
        (Some(_), None) => cmp::Ordering::Greater,
        (Some(a), Some(b)) => a.sort_order(b),
    }
}

/// Split a full-text expression into lowercased terms; `-term` excludes,
/// double quotes group a phrase, `OR` is ignored
fn search_terms(expression: &str) -> Vec<(String, bool)> {
    let mut terms = Vec::new();
    let mut chars = expression.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        let excluded = match chars.peek() {
            None => break,
            Some('-') => {
                chars.next();
                true
            }
            Some(_) => false,
        };

        let mut term = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                term.push(c);
            }
        } else {
            while let Some(c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                term.push(*c);
                chars.next();
            }
        }

        if !term.is_empty() && term != "OR" {
            terms.push((term.to_lowercase(), excluded));
        }
    }

    terms
}
