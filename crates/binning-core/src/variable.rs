//! Ordered registry of the variables carried by each observation.

use std::collections::HashMap;

/// Names (and optional derivation expressions) of observation variables.
///
/// The position of a variable is fixed when it is first defined and is the
/// position of its value in [`Observation::values`](crate::Observation) and
/// of its slots in every bin vector. Expressions are opaque to the binner;
/// they are evaluated by whoever produces the observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableContext {
    names: Vec<String>,
    expressions: Vec<Option<String>>,
    indices: HashMap<String, usize>,
    valid_mask_expression: Option<String>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a variable and return its index.
    ///
    /// Redefining an existing name replaces its expression and keeps its
    /// index.
    pub fn define_variable(&mut self, name: &str, expression: Option<&str>) -> usize {
        let expression = expression.map(str::to_string);
        if let Some(&index) = self.indices.get(name) {
            self.expressions[index] = expression;
            return index;
        }

        let index = self.names.len();
        self.names.push(name.to_string());
        self.expressions.push(expression);
        self.indices.insert(name.to_string(), index);
        index
    }

    /// Builder form of [`define_variable`](Self::define_variable).
    pub fn with_variable(mut self, name: &str, expression: Option<&str>) -> Self {
        self.define_variable(name, expression);
        self
    }

    /// Builder form of [`set_valid_mask_expression`](Self::set_valid_mask_expression).
    pub fn with_valid_mask_expression(mut self, expression: &str) -> Self {
        self.set_valid_mask_expression(Some(expression));
        self
    }

    pub fn set_valid_mask_expression(&mut self, expression: Option<&str>) {
        self.valid_mask_expression = expression.map(str::to_string);
    }

    pub fn variable_count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Derivation expression of the variable at `index`, if it has one.
    pub fn expression_at(&self, index: usize) -> Option<&str> {
        self.expressions.get(index).and_then(|e| e.as_deref())
    }

    /// Index of a variable, `None` when it is not defined.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    pub fn valid_mask_expression(&self) -> Option<&str> {
        self.valid_mask_expression.as_deref()
    }

    /// Variable names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
