//! Variable interpolation for templated files.
//!
//! Templates use `${variable}` syntax.
//!
//! # Syntax
//!
//! - `${variable_name}` - replaced with variable value
//! - `$${escaped}` - produces literal `${escaped}` in output
//! - `$name` without braces is left untouched, so nginx variables such as
//!   `$host` pass through unchanged
//!
//! # Example
//!
//! ```
//! use erpstack::config::{render, TemplateVars};
//!
//! let mut vars = TemplateVars::new();
//! vars.insert("user", "erp");
//! assert_eq!(render("User=${user}", &vars).unwrap(), "User=erp");
//! ```

use crate::error::{ProvisionError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing `${var}` interpolations.
///
/// Fails when a `${` is never closed.
pub fn parse_interpolation(input: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut current_literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            current_literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                if chars.peek() == Some(&'{') {
                    // $${...} -> literal ${...}
                    chars.next();
                    current_literal.push_str("${");
                    for c in chars.by_ref() {
                        current_literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    current_literal.push('$');
                }
            }
            Some('{') => {
                chars.next();

                if !current_literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
                }

                let mut var_name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    var_name.push(c);
                }

                if !closed {
                    return Err(ProvisionError::Template {
                        message: format!("Unterminated variable: ${{{}", var_name),
                    });
                }

                segments.push(Segment::Variable(var_name.trim().to_string()));
            }
            _ => current_literal.push(c),
        }
    }

    if !current_literal.is_empty() {
        segments.push(Segment::Literal(current_literal));
    }

    Ok(segments)
}

/// Extract all variable names from an interpolated string.
pub fn extract_variables(input: &str) -> Result<BTreeSet<String>> {
    Ok(parse_interpolation(input)?
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Variables available to a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateVars {
    values: BTreeMap<String, String>,
}

impl TemplateVars {
    /// Create an empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Resolve all variables in a template.
///
/// # Errors
///
/// Returns [`ProvisionError::Template`] if any variable is not set.
pub fn render(input: &str, vars: &TemplateVars) -> Result<String> {
    let mut result = String::with_capacity(input.len());

    for segment in parse_interpolation(input)? {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value = vars.get(&name).ok_or_else(|| ProvisionError::Template {
                    message: format!("Unresolved variable: ${{{}}}", name),
                })?;
                result.push_str(value);
            }
        }
    }

    Ok(result)
}
