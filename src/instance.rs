// Copyright 2025 Cowboy AI, LLC.

//! `CIMInstance` and `CIMProperty`.

use crate::error::{WbemError, WbemResult};
use crate::nocase::NocaseMap;
use crate::object_path::CIMInstanceName;
use crate::qualifier::CIMQualifier;
use crate::types::{CIMType, CIMValue};

/// Whether a property's value is, or embeds, another CIM object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedObjectKind {
    /// The value is a plain typed scalar/array, not an embedded object.
    None,
    /// The value is an embedded `CIMInstance`.
    Instance,
    /// The value is an embedded `CIMInstance` or `CIMClass`.
    Object,
}

/// A single named, typed value on a [`CIMInstance`] or [`CIMClass`](crate::class::CIMClass).
#[derive(Debug, Clone, PartialEq)]
pub struct CIMProperty {
    name: String,
    value: Option<CIMValue>,
    type_: CIMType,
    reference_class: Option<String>,
    embedded_object: EmbeddedObjectKind,
    is_array: bool,
    array_size: Option<u32>,
    propagated: bool,
    qualifiers: NocaseMap<CIMQualifier>,
}

impl CIMProperty {
    /// Construct a property. Validates the invariants: `is_array` matches
    /// the value's shape, `reference_class` is set iff `type_` is
    /// `Reference`, and `array_size` is only set when `is_array` is true.
    pub fn new(
        name: impl Into<String>,
        value: Option<CIMValue>,
        type_: CIMType,
    ) -> WbemResult<Self> {
        let is_array = match &value {
            Some(v) => v.is_array(),
            None => false,
        };
        if type_ == CIMType::Reference {
            return Err(WbemError::model(
                "reference-typed properties must be constructed via CIMProperty::new_reference",
            ));
        }
        Ok(Self {
            name: name.into(),
            value,
            type_,
            reference_class: None,
            embedded_object: EmbeddedObjectKind::None,
            is_array,
            array_size: None,
            propagated: false,
            qualifiers: NocaseMap::new(),
        })
    }

    /// Construct a reference-typed property; `reference_class` is
    /// mandatory per the type=reference invariant.
    pub fn new_reference(
        name: impl Into<String>,
        value: Option<CIMValue>,
        reference_class: impl Into<String>,
    ) -> Self {
        let is_array = value.as_ref().map(CIMValue::is_array).unwrap_or(false);
        Self {
            name: name.into(),
            value,
            type_: CIMType::Reference,
            reference_class: Some(reference_class.into()),
            embedded_object: EmbeddedObjectKind::None,
            is_array,
            array_size: None,
            propagated: false,
            qualifiers: NocaseMap::new(),
        }
    }

    /// Builder-style: set the array size (only meaningful when `is_array`).
    pub fn with_array_size(mut self, size: u32) -> WbemResult<Self> {
        if !self.is_array {
            return Err(WbemError::model(
                "array_size may only be set on an array-shaped property",
            ));
        }
        self.array_size = Some(size);
        Ok(self)
    }

    /// Builder-style: mark this property as propagated from a superclass.
    pub fn propagated_from_superclass(mut self) -> Self {
        self.propagated = true;
        self
    }

    /// Builder-style: set the embedded-object kind.
    pub fn with_embedded_object(mut self, kind: EmbeddedObjectKind) -> Self {
        self.embedded_object = kind;
        self
    }

    /// Builder-style: attach a qualifier.
    pub fn with_qualifier(mut self, q: CIMQualifier) -> Self {
        self.qualifiers.insert(q.name().to_string(), q);
        self
    }

    /// The property name, in original case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property's value, if any (`None` represents CIM NULL).
    pub fn value(&self) -> Option<&CIMValue> {
        self.value.as_ref()
    }

    /// The declared CIM type.
    pub fn type_(&self) -> CIMType {
        self.type_
    }

    /// The referenced class name, set iff `type_() == CIMType::Reference`.
    pub fn reference_class(&self) -> Option<&str> {
        self.reference_class.as_deref()
    }

    /// Whether this property's value is an embedded object.
    pub fn embedded_object(&self) -> EmbeddedObjectKind {
        self.embedded_object
    }

    /// True if the value is array-shaped.
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// The declared array size, if set.
    pub fn array_size(&self) -> Option<u32> {
        self.array_size
    }

    /// True if this property's value was inherited rather than set
    /// directly on the instance.
    pub fn propagated(&self) -> bool {
        self.propagated
    }

    /// The qualifiers attached to this property.
    pub fn qualifiers(&self) -> &NocaseMap<CIMQualifier> {
        &self.qualifiers
    }
}

/// A CIM instance: a classname, an ordered set of properties, an optional
/// path, and an ordered set of qualifiers.
///
/// Invariant: when `path` is present, its classname equals the instance's
/// classname, case-insensitively (enforced in [`CIMInstance::with_path`]).
#[derive(Debug, Clone, PartialEq)]
pub struct CIMInstance {
    classname: String,
    properties: NocaseMap<CIMProperty>,
    path: Option<CIMInstanceName>,
    qualifiers: NocaseMap<CIMQualifier>,
}

impl CIMInstance {
    /// Construct an instance with no properties, path, or qualifiers yet.
    pub fn new(classname: impl Into<String>) -> Self {
        Self {
            classname: classname.into(),
            properties: NocaseMap::new(),
            path: None,
            qualifiers: NocaseMap::new(),
        }
    }

    /// Builder-style: add a property.
    pub fn with_property(mut self, prop: CIMProperty) -> Self {
        self.properties.insert(prop.name().to_string(), prop);
        self
    }

    /// Builder-style: attach an object path. Fails the shared invariant
    /// check if the path's classname doesn't match this instance's.
    pub fn with_path(mut self, path: CIMInstanceName) -> WbemResult<Self> {
        if !path.classname().eq_ignore_ascii_case(&self.classname) {
            return Err(WbemError::model(format!(
                "path classname {:?} does not match instance classname {:?}",
                path.classname(),
                self.classname
            )));
        }
        self.path = Some(path);
        Ok(self)
    }

    /// Builder-style: attach a qualifier.
    pub fn with_qualifier(mut self, q: CIMQualifier) -> Self {
        self.qualifiers.insert(q.name().to_string(), q);
        self
    }

    /// The classname, in original case.
    pub fn classname(&self) -> &str {
        &self.classname
    }

    /// The properties, in insertion order, case-insensitively keyed.
    pub fn properties(&self) -> &NocaseMap<CIMProperty> {
        &self.properties
    }

    /// Look up a property by name, case-insensitively.
    pub fn property(&self, name: &str) -> Option<&CIMProperty> {
        self.properties.get(name)
    }

    /// The instance's object path, if attached.
    pub fn path(&self) -> Option<&CIMInstanceName> {
        self.path.as_ref()
    }

    /// The instance-level qualifiers.
    pub fn qualifiers(&self) -> &NocaseMap<CIMQualifier> {
        &self.qualifiers
    }
}

impl std::fmt::Display for CIMInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "instance of {} {{", self.classname)?;
        for (i, (name, prop)) in self.properties.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            match prop.value() {
                Some(v) => write!(f, "{name}={v}")?,
                None => write!(f, "{name}=NULL")?,
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CIMScalar;

    #[test]
    fn path_classname_must_match_instance_classname() {
        let instance = CIMInstance::new("PyWBEM_Person");
        let mismatched = CIMInstanceName::new("OtherClass");
        assert!(instance.with_path(mismatched).is_err());
    }

    #[test]
    fn path_classname_match_is_case_insensitive() {
        let instance = CIMInstance::new("PyWBEM_Person");
        let path = CIMInstanceName::new("pywbem_person");
        assert!(instance.with_path(path).is_ok());
    }

    #[test]
    fn array_size_requires_array_shape() {
        let scalar = CIMProperty::new(
            "Name",
            Some(CIMValue::Scalar(CIMScalar::String("Fritz".into()))),
            CIMType::String,
        )
        .unwrap();
        assert!(scalar.with_array_size(3).is_err());

        let array = CIMProperty::new(
            "Tags",
            Some(CIMValue::Array(vec![CIMScalar::String("a".into())])),
            CIMType::String,
        )
        .unwrap()
        .with_array_size(1)
        .unwrap();
        assert_eq!(array.array_size(), Some(1));
    }

    #[test]
    fn reference_property_requires_reference_class() {
        let prop = CIMProperty::new_reference(
            "Owner",
            Some(CIMValue::Scalar(CIMScalar::Reference(Box::new(
                CIMInstanceName::new("PyWBEM_Person"),
            )))),
            "PyWBEM_Person",
        );
        assert_eq!(prop.reference_class(), Some("PyWBEM_Person"));
        assert_eq!(prop.type_(), CIMType::Reference);
    }
}
