// Copyright 2025 Cowboy AI, LLC.

//! CIM object paths (`CIMInstanceName`) and class paths (`CIMClassName`).

use crate::namespace::Namespace;
use crate::nocase::NocaseMap;
use crate::types::CIMScalar;

/// A reference to a CIM instance: classname, optional host, optional
/// namespace, and an ordered, case-insensitive set of keybindings.
///
/// Equality is case-insensitive on the classname and keybinding names,
/// value-equal on the keybinding values.
#[derive(Debug, Clone)]
pub struct CIMInstanceName {
    classname: String,
    host: Option<String>,
    namespace: Option<Namespace>,
    keybindings: NocaseMap<CIMScalar>,
}

impl CIMInstanceName {
    /// Construct a path with no keybindings yet.
    pub fn new(classname: impl Into<String>) -> Self {
        Self {
            classname: classname.into(),
            host: None,
            namespace: None,
            keybindings: NocaseMap::new(),
        }
    }

    /// Builder-style: set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Builder-style: set the namespace (normalized).
    pub fn with_namespace(mut self, ns: Namespace) -> Self {
        self.namespace = Some(ns);
        self
    }

    /// Builder-style: add a keybinding.
    pub fn with_key(mut self, name: impl Into<String>, value: CIMScalar) -> Self {
        self.keybindings.insert(name, value);
        self
    }

    /// The classname, in its original case.
    pub fn classname(&self) -> &str {
        &self.classname
    }

    /// The host component, if present.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// The namespace component, if present.
    pub fn namespace(&self) -> Option<&Namespace> {
        self.namespace.as_ref()
    }

    /// Set the namespace in place.
    pub fn set_namespace(&mut self, ns: Namespace) {
        self.namespace = Some(ns);
    }

    /// The keybindings, in insertion order, case-insensitively keyed.
    pub fn keybindings(&self) -> &NocaseMap<CIMScalar> {
        &self.keybindings
    }

    /// Look up a keybinding value by name, case-insensitively.
    pub fn key(&self, name: &str) -> Option<&CIMScalar> {
        self.keybindings.get(name)
    }
}

impl PartialEq for CIMInstanceName {
    fn eq(&self, other: &Self) -> bool {
        self.classname.eq_ignore_ascii_case(&other.classname)
            && self.host.as_deref().map(str::to_ascii_lowercase)
                == other.host.as_deref().map(str::to_ascii_lowercase)
            && self.namespace == other.namespace
            && self.keybindings == other.keybindings
    }
}
impl Eq for CIMInstanceName {}

impl std::hash::Hash for CIMInstanceName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.classname.to_ascii_lowercase().hash(state);
        self.host
            .as_deref()
            .map(str::to_ascii_lowercase)
            .hash(state);
        self.namespace.hash(state);
        // Keybindings: hash names case-folded, in insertion order. Two
        // equal-but-differently-ordered maps are not expected here since
        // CIMInstanceName equality is itself order-sensitive on bindings
        // only insofar as NocaseMap equality is; we fold names for the
        // hash to stay consistent with case-insensitive equality.
        for (k, _) in self.keybindings.iter() {
            k.to_ascii_lowercase().hash(state);
        }
    }
}

impl std::fmt::Display for CIMInstanceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(host) = &self.host {
            write!(f, "//{host}/")?;
        }
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}:")?;
        }
        write!(f, "{}.", self.classname)?;
        let mut first = true;
        for (name, value) in self.keybindings.iter() {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            write!(f, "{name}=\"{}\"", value.to_wire_text_or_ref())?;
        }
        Ok(())
    }
}

impl CIMScalar {
    /// Like [`CIMScalar::to_wire_text`], but renders a reference value as
    /// its `Display` form instead of panicking — used only for the
    /// human-readable `Display` impl of a path, not wire encoding.
    fn to_wire_text_or_ref(&self) -> String {
        match self {
            CIMScalar::Reference(r) => r.to_string(),
            other => other.to_wire_text(),
        }
    }
}

/// A reference to a CIM class: classname, optional host, optional
/// namespace. No keybindings — classes are identified by name alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CIMClassName {
    classname: String,
    host: Option<String>,
    namespace: Option<Namespace>,
}

impl CIMClassName {
    /// Construct a class path.
    pub fn new(classname: impl Into<String>) -> Self {
        Self {
            classname: classname.into(),
            host: None,
            namespace: None,
        }
    }

    /// Builder-style: set the namespace.
    pub fn with_namespace(mut self, ns: Namespace) -> Self {
        self.namespace = Some(ns);
        self
    }

    /// The classname, in its original case.
    pub fn classname(&self) -> &str {
        &self.classname
    }

    /// The namespace component, if present.
    pub fn namespace(&self) -> Option<&Namespace> {
        self.namespace.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_case_insensitive_on_classname_and_keys() {
        let a = CIMInstanceName::new("PyWBEM_Person").with_key(
            "Name",
            CIMScalar::String("Fritz".into()),
        );
        let b = CIMInstanceName::new("pywbem_person").with_key(
            "name",
            CIMScalar::String("Fritz".into()),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn differing_key_values_are_not_equal() {
        let a = CIMInstanceName::new("C").with_key("K", CIMScalar::String("x".into()));
        let b = CIMInstanceName::new("C").with_key("K", CIMScalar::String("y".into()));
        assert_ne!(a, b);
    }

    #[test]
    fn reference_typed_keys_nest() {
        let inner = CIMInstanceName::new("Inner").with_key("Id", CIMScalar::Uint32(1));
        let outer = CIMInstanceName::new("Outer")
            .with_key("Ref", CIMScalar::Reference(Box::new(inner.clone())));
        match outer.key("Ref").unwrap() {
            CIMScalar::Reference(r) => assert_eq!(**r, inner),
            _ => panic!("expected reference"),
        }
    }
}
