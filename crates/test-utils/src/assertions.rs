// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Domain-specific test helpers and custom assertions

use sql_ingest_ir::{ColumnRole, Domain, VariableKind};

/// Custom assertion helpers for inferred domains
pub struct DomainAssertions;

impl DomainAssertions {
    /// Assert that a variable exists with the given role
    pub fn assert_role(domain: &Domain, name: &str, role: ColumnRole) {
        match domain.get(name) {
            Some((found, _)) => {
                assert_eq!(found, role, "Variable '{}' has role {:?}", name, found)
            }
            None => panic!("Variable '{}' not found in {:?}", name, domain),
        }
    }

    /// Assert that a variable is continuous
    pub fn assert_continuous(domain: &Domain, name: &str) {
        let (_, var) = domain
            .get(name)
            .unwrap_or_else(|| panic!("Variable '{}' not found", name));
        assert_eq!(
            var.kind,
            VariableKind::Continuous,
            "Expected '{}' to be continuous",
            name
        );
    }

    /// Assert that a variable is discrete with exactly these values
    pub fn assert_discrete(domain: &Domain, name: &str, values: &[&str]) {
        let (_, var) = domain
            .get(name)
            .unwrap_or_else(|| panic!("Variable '{}' not found", name));
        match &var.kind {
            VariableKind::Discrete { values: found } => {
                assert_eq!(found, values, "Values of '{}' mismatch", name);
            }
            other => panic!("Expected '{}' to be discrete, found {:?}", name, other),
        }
    }

    /// Assert that a variable is free text stored among the metas
    pub fn assert_string_meta(domain: &Domain, name: &str) {
        Self::assert_role(domain, name, ColumnRole::Meta);
        let (_, var) = domain
            .get(name)
            .unwrap_or_else(|| panic!("Variable '{}' not found", name));
        assert!(var.is_string(), "Expected '{}' to be a string", name);
    }

    /// Assert the column names in domain order
    pub fn assert_names(domain: &Domain, expected: &[&str]) {
        let names: Vec<&str> = domain.variables().map(|(_, v)| v.name.as_str()).collect();
        assert_eq!(names, expected, "Domain column names mismatch");
    }
}
