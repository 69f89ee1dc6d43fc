// Copyright 2025 Cowboy AI, LLC.

//! CIM qualifiers and qualifier declarations.

use crate::types::{CIMType, CIMValue};

/// A qualifier attached to a class, property, method, or parameter, e.g.
/// `Key`, `Description`, `Override`.
#[derive(Debug, Clone, PartialEq)]
pub struct CIMQualifier {
    name: String,
    value: Option<CIMValue>,
    type_: CIMType,
    propagated: bool,
}

impl CIMQualifier {
    /// Construct a qualifier.
    pub fn new(name: impl Into<String>, value: Option<CIMValue>, type_: CIMType) -> Self {
        Self {
            name: name.into(),
            value,
            type_,
            propagated: false,
        }
    }

    /// The qualifier name, in original case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The qualifier's value, if any.
    pub fn value(&self) -> Option<&CIMValue> {
        self.value.as_ref()
    }

    /// The qualifier's declared CIM type.
    pub fn type_(&self) -> CIMType {
        self.type_
    }

    /// True if this qualifier was inherited from a superclass rather than
    /// declared directly.
    pub fn propagated(&self) -> bool {
        self.propagated
    }

    /// Builder-style: mark as propagated.
    pub fn propagated_from_superclass(mut self) -> Self {
        self.propagated = true;
        self
    }
}

/// A qualifier declaration (`<QUALIFIER.DECLARATION>`): the type, default
/// value, applicable scopes, and flavors (`OVERRIDABLE`, `TOSUBCLASS`,
/// `TRANSLATABLE`) for a named qualifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CIMQualifierDeclaration {
    name: String,
    type_: CIMType,
    value: Option<CIMValue>,
    is_array: bool,
    /// May be overridden in a subclass.
    pub overridable: bool,
    /// Propagates to subclasses.
    pub to_subclass: bool,
    /// Value is locale-translatable.
    pub translatable: bool,
}

impl CIMQualifierDeclaration {
    /// Construct a declaration with the DMTF default flavor set
    /// (`OVERRIDABLE TOSUBCLASS`, not translatable).
    pub fn new(name: impl Into<String>, type_: CIMType) -> Self {
        Self {
            name: name.into(),
            type_,
            value: None,
            is_array: false,
            overridable: true,
            to_subclass: true,
            translatable: false,
        }
    }

    /// The qualifier name, in original case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared CIM type.
    pub fn type_(&self) -> CIMType {
        self.type_
    }

    /// The default value, if any.
    pub fn value(&self) -> Option<&CIMValue> {
        self.value.as_ref()
    }

    /// Builder-style: set the default value.
    pub fn with_value(mut self, value: CIMValue) -> Self {
        self.is_array = value.is_array();
        self.value = Some(value);
        self
    }

    /// True if the declared type is array-shaped.
    pub fn is_array(&self) -> bool {
        self.is_array
    }
}
