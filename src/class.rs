// Copyright 2025 Cowboy AI, LLC.

//! `CIMClass`, `CIMMethod`, and `CIMParameter`.

use crate::nocase::NocaseMap;
use crate::qualifier::CIMQualifier;
use crate::types::{CIMType, CIMValue};

/// A formal parameter of a [`CIMMethod`].
#[derive(Debug, Clone, PartialEq)]
pub struct CIMParameter {
    name: String,
    type_: CIMType,
    reference_class: Option<String>,
    is_array: bool,
    array_size: Option<u32>,
    qualifiers: NocaseMap<CIMQualifier>,
}

impl CIMParameter {
    /// Construct a scalar parameter.
    pub fn new(name: impl Into<String>, type_: CIMType) -> Self {
        Self {
            name: name.into(),
            type_,
            reference_class: None,
            is_array: false,
            array_size: None,
            qualifiers: NocaseMap::new(),
        }
    }

    /// Builder-style: mark as array-shaped, with an optional fixed size.
    pub fn array(mut self, array_size: Option<u32>) -> Self {
        self.is_array = true;
        self.array_size = array_size;
        self
    }

    /// Builder-style: set the referenced class (for `type_ ==
    /// CIMType::Reference`).
    pub fn with_reference_class(mut self, class: impl Into<String>) -> Self {
        self.reference_class = Some(class.into());
        self
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared CIM type.
    pub fn type_(&self) -> CIMType {
        self.type_
    }

    /// True if array-shaped.
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// The declared array size, if fixed.
    pub fn array_size(&self) -> Option<u32> {
        self.array_size
    }

    /// The referenced class, if `type_() == CIMType::Reference`.
    pub fn reference_class(&self) -> Option<&str> {
        self.reference_class.as_deref()
    }

    /// Qualifiers attached to this parameter.
    pub fn qualifiers(&self) -> &NocaseMap<CIMQualifier> {
        &self.qualifiers
    }
}

/// A CIM-schema-defined method on a class.
#[derive(Debug, Clone, PartialEq)]
pub struct CIMMethod {
    name: String,
    return_type: CIMType,
    parameters: NocaseMap<CIMParameter>,
    qualifiers: NocaseMap<CIMQualifier>,
}

impl CIMMethod {
    /// Construct a method with no parameters yet.
    pub fn new(name: impl Into<String>, return_type: CIMType) -> Self {
        Self {
            name: name.into(),
            return_type,
            parameters: NocaseMap::new(),
            qualifiers: NocaseMap::new(),
        }
    }

    /// Builder-style: add a parameter.
    pub fn with_parameter(mut self, param: CIMParameter) -> Self {
        self.parameters.insert(param.name().to_string(), param);
        self
    }

    /// Builder-style: attach a qualifier.
    pub fn with_qualifier(mut self, q: CIMQualifier) -> Self {
        self.qualifiers.insert(q.name().to_string(), q);
        self
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared return type.
    pub fn return_type(&self) -> CIMType {
        self.return_type
    }

    /// The formal parameters, in declaration order.
    pub fn parameters(&self) -> &NocaseMap<CIMParameter> {
        &self.parameters
    }

    /// Qualifiers attached to this method.
    pub fn qualifiers(&self) -> &NocaseMap<CIMQualifier> {
        &self.qualifiers
    }
}

/// A CIM class definition: properties, methods, qualifiers, and an
/// optional superclass name.
#[derive(Debug, Clone, PartialEq)]
pub struct CIMClass {
    classname: String,
    superclass: Option<String>,
    properties: NocaseMap<crate::instance::CIMProperty>,
    methods: NocaseMap<CIMMethod>,
    qualifiers: NocaseMap<CIMQualifier>,
}

impl CIMClass {
    /// Construct a class with no members yet.
    pub fn new(classname: impl Into<String>) -> Self {
        Self {
            classname: classname.into(),
            superclass: None,
            properties: NocaseMap::new(),
            methods: NocaseMap::new(),
            qualifiers: NocaseMap::new(),
        }
    }

    /// Builder-style: set the superclass.
    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Builder-style: add a property.
    pub fn with_property(mut self, prop: crate::instance::CIMProperty) -> Self {
        self.properties.insert(prop.name().to_string(), prop);
        self
    }

    /// Builder-style: add a method.
    pub fn with_method(mut self, method: CIMMethod) -> Self {
        self.methods.insert(method.name().to_string(), method);
        self
    }

    /// Builder-style: attach a qualifier.
    pub fn with_qualifier(mut self, q: CIMQualifier) -> Self {
        self.qualifiers.insert(q.name().to_string(), q);
        self
    }

    /// The class name, in original case.
    pub fn classname(&self) -> &str {
        &self.classname
    }

    /// The superclass name, if any.
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// The class's own properties (not resolved against the superclass
    /// chain — this crate does not interpret CIM inheritance).
    pub fn properties(&self) -> &NocaseMap<crate::instance::CIMProperty> {
        &self.properties
    }

    /// The class's own methods.
    pub fn methods(&self) -> &NocaseMap<CIMMethod> {
        &self.methods
    }

    /// The class-level qualifiers.
    pub fn qualifiers(&self) -> &NocaseMap<CIMQualifier> {
        &self.qualifiers
    }
}

/// A CIM value, typed scalar or array — re-exported here for convenience
/// when building up class/method/parameter default values.
pub type DefaultValue = CIMValue;
