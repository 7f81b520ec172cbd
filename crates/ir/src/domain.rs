// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Domain model
//!
//! A domain describes the columns of a dataset the way analysis code sees
//! them: each column becomes a [`Variable`] with a kind (continuous,
//! discrete, string, time) and a role (attribute, class variable, meta).
//!
//! String variables cannot be used as features, so [`Domain::from_variables`]
//! places them in the metas; every other variable becomes an attribute.

use serde::{Deserialize, Serialize};

use crate::metadata::DataType;

/// How the values of a variable are interpreted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    /// Real-valued
    Continuous,
    /// Categorical with a closed, ordered set of values
    Discrete { values: Vec<String> },
    /// Free text
    String,
    /// Date and/or time
    Time { has_date: bool, has_time: bool },
}

/// Where a variable sits in the domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    Attribute,
    ClassVar,
    Meta,
}

/// A typed column of a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Column name
    pub name: String,
    /// Interpretation of the values
    pub kind: VariableKind,
    /// Type reported by the database
    pub source_type: DataType,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VariableKind, source_type: DataType) -> Self {
        Self {
            name: name.into(),
            kind,
            source_type,
        }
    }

    pub fn continuous(name: impl Into<String>, source_type: DataType) -> Self {
        Self::new(name, VariableKind::Continuous, source_type)
    }

    pub fn discrete(
        name: impl Into<String>,
        values: Vec<String>,
        source_type: DataType,
    ) -> Self {
        Self::new(name, VariableKind::Discrete { values }, source_type)
    }

    pub fn string(name: impl Into<String>, source_type: DataType) -> Self {
        Self::new(name, VariableKind::String, source_type)
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self.kind, VariableKind::Discrete { .. })
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, VariableKind::String)
    }
}

/// Schema of a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub attributes: Vec<Variable>,
    pub class_vars: Vec<Variable>,
    pub metas: Vec<Variable>,
}

impl Domain {
    pub fn new(attributes: Vec<Variable>, class_vars: Vec<Variable>, metas: Vec<Variable>) -> Self {
        Self {
            attributes,
            class_vars,
            metas,
        }
    }

    /// Build a domain from variables in column order
    pub fn from_variables(variables: impl IntoIterator<Item = Variable>) -> Self {
        let (metas, attributes): (Vec<_>, Vec<_>) =
            variables.into_iter().partition(Variable::is_string);
        Self {
            attributes,
            class_vars: Vec::new(),
            metas,
        }
    }

    /// All variables with their role: attributes, class variables, then metas
    pub fn variables(&self) -> impl Iterator<Item = (ColumnRole, &Variable)> {
        self.attributes
            .iter()
            .map(|v| (ColumnRole::Attribute, v))
            .chain(self.class_vars.iter().map(|v| (ColumnRole::ClassVar, v)))
            .chain(self.metas.iter().map(|v| (ColumnRole::Meta, v)))
    }

    /// Get a variable and its role by name
    pub fn get(&self, name: &str) -> Option<(ColumnRole, &Variable)> {
        self.variables().find(|(_, v)| v.name == name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len() + self.class_vars.len() + self.metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
