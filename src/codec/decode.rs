// Copyright 2025 Cowboy AI, LLC.

//! Decode CIM-XML response bytes into typed CIM objects.
//!
//! Decoding happens in two passes: [`parse_tree`] turns the byte stream
//! into a generic, allowlisted element tree (rejecting any element name
//! not in the DTD fragment embedded in [`crate::codec::dtd`]), preserving
//! text verbatim inside leaf elements while discarding insignificant
//! inter-element whitespace; the `interpret_*` functions in this module
//! then walk that tree into the typed shapes each operation expects.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::class::{CIMClass, CIMMethod, CIMParameter};
use crate::error::{CimStatusCode, WbemError, WbemResult};
use crate::instance::{CIMInstance, CIMProperty, EmbeddedObjectKind};
use crate::nocase::NocaseMap;
use crate::object_path::CIMInstanceName;
use crate::qualifier::CIMQualifier;
use crate::types::{CIMScalar, CIMType, CIMValue};

const KNOWN_ELEMENTS: &[&str] = &[
    "CIM", "MESSAGE", "SIMPLEREQ", "SIMPLERSP", "IMETHODCALL", "IMETHODRESPONSE", "METHODCALL",
    "METHODRESPONSE", "LOCALNAMESPACEPATH", "NAMESPACE", "LOCALINSTANCEPATH", "LOCALCLASSPATH",
    "IPARAMVALUE", "PARAMVALUE", "IRETURNVALUE", "RETURNVALUE", "ERROR", "CLASSNAME",
    "INSTANCENAME", "KEYBINDING", "KEYVALUE", "INSTANCE", "CLASS", "PROPERTY", "PROPERTY.ARRAY",
    "PROPERTY.REFERENCE", "METHOD", "PARAMETER", "PARAMETER.REFERENCE", "PARAMETER.ARRAY",
    "QUALIFIER", "QUALIFIER.DECLARATION", "VALUE", "VALUE.ARRAY", "VALUE.REFERENCE",
    "VALUE.NAMEDINSTANCE",
];

#[derive(Debug, Clone)]
struct XmlNode {
    tag: String,
    attrs: HashMap<String, String>,
    children: Vec<XmlNode>,
    text: String,
}

impl XmlNode {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn require_attr(&self, name: &str) -> WbemResult<&str> {
        self.attr(name).ok_or_else(|| WbemError::Parse {
            line: 0,
            column: 0,
            message: format!("<{}> missing required attribute {name}", self.tag),
        })
    }

    fn child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.tag == tag)
    }
}

struct Frame {
    tag: String,
    attrs: HashMap<String, String>,
    children: Vec<XmlNode>,
    text: String,
}

fn line_col(bytes: &[u8], offset: usize) -> (usize, usize) {
    let offset = offset.min(bytes.len());
    let mut line = 1usize;
    let mut col = 1usize;
    for &b in &bytes[..offset] {
        if b == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn parse_tree(bytes: &[u8]) -> WbemResult<XmlNode> {
    // Default reader config already has trim_text = false, which is what we
    // want: whitespace inside a leaf VALUE is significant, so we fold
    // whitespace-only text nodes as insignificant ourselves in `attach`
    // rather than asking the reader to trim unconditionally.
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !KNOWN_ELEMENTS.contains(&tag.as_str()) {
                    let (line, column) = line_col(bytes, pos);
                    return Err(WbemError::Parse {
                        line,
                        column,
                        message: format!("unknown element <{tag}>"),
                    });
                }
                let mut attrs = HashMap::new();
                for a in e.attributes() {
                    let a = a?;
                    let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
                    let value = a.unescape_value()?.into_owned();
                    attrs.insert(key, value);
                }
                stack.push(Frame {
                    tag,
                    attrs,
                    children: Vec::new(),
                    text: String::new(),
                });
            }
            Event::Empty(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !KNOWN_ELEMENTS.contains(&tag.as_str()) {
                    let (line, column) = line_col(bytes, pos);
                    return Err(WbemError::Parse {
                        line,
                        column,
                        message: format!("unknown element <{tag}>"),
                    });
                }
                let mut attrs = HashMap::new();
                for a in e.attributes() {
                    let a = a?;
                    let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
                    let value = a.unescape_value()?.into_owned();
                    attrs.insert(key, value);
                }
                let node = XmlNode {
                    tag,
                    attrs,
                    children: Vec::new(),
                    text: String::new(),
                };
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| WbemError::Parse {
                    line: 0,
                    column: 0,
                    message: "unbalanced closing tag".to_string(),
                })?;
                let text = if frame.children.is_empty() {
                    frame.text
                } else {
                    String::new()
                };
                let node = XmlNode {
                    tag: frame.tag,
                    attrs: frame.attrs,
                    children: frame.children,
                    text,
                };
                attach(&mut stack, &mut root, node);
            }
            Event::Text(e) | Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&e.unescape()?.into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    root.ok_or_else(|| WbemError::Parse {
        line: 0,
        column: 0,
        message: "empty document".to_string(),
    })
}

fn attach(stack: &mut Vec<Frame>, root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

fn parse_bool(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("true")
}

fn decode_value_of_type(type_: CIMType, node: &XmlNode) -> WbemResult<CIMValue> {
    if type_ == CIMType::Reference {
        if let Some(vref) = node.child("VALUE.REFERENCE") {
            return Ok(CIMValue::Scalar(CIMScalar::Reference(Box::new(
                decode_value_reference(vref)?,
            ))));
        }
    }
    if let Some(array) = node.child("VALUE.ARRAY") {
        let items = array
            .children_named("VALUE")
            .map(|v| type_.parse_scalar(&v.text))
            .collect::<WbemResult<Vec<_>>>()?;
        return Ok(CIMValue::Array(items));
    }
    if let Some(value) = node.child("VALUE") {
        return Ok(CIMValue::Scalar(type_.parse_scalar(&value.text)?));
    }
    Err(WbemError::Parse {
        line: 0,
        column: 0,
        message: format!("<{}> has no VALUE/VALUE.ARRAY/VALUE.REFERENCE child", node.tag),
    })
}

fn decode_value_reference(node: &XmlNode) -> WbemResult<CIMInstanceName> {
    if let Some(iname) = node.child("INSTANCENAME") {
        decode_instance_name(iname)
    } else if let Some(cname) = node.child("CLASSNAME") {
        Ok(CIMInstanceName::new(cname.require_attr("NAME")?))
    } else {
        Err(WbemError::Parse {
            line: 0,
            column: 0,
            message: "VALUE.REFERENCE has no INSTANCENAME/CLASSNAME child".to_string(),
        })
    }
}

fn decode_instance_name(node: &XmlNode) -> WbemResult<CIMInstanceName> {
    let classname = node.require_attr("CLASSNAME")?;
    let mut path = CIMInstanceName::new(classname);
    for kb in node.children_named("KEYBINDING") {
        let name = kb.require_attr("NAME")?;
        if let Some(vref) = kb.child("VALUE.REFERENCE") {
            let inner = decode_value_reference(vref)?;
            path = path.with_key(name, CIMScalar::Reference(Box::new(inner)));
        } else if let Some(kv) = kb.child("KEYVALUE") {
            let type_ = match kv.attr("TYPE") {
                Some(t) => CIMType::parse(t)?,
                None => match kv.attr("VALUETYPE") {
                    Some("boolean") => CIMType::Boolean,
                    Some("numeric") => CIMType::Sint64,
                    _ => CIMType::String,
                },
            };
            let scalar = type_.parse_scalar(&kv.text)?;
            path = path.with_key(name, scalar);
        } else {
            return Err(WbemError::Parse {
                line: 0,
                column: 0,
                message: "KEYBINDING has no KEYVALUE/VALUE.REFERENCE child".to_string(),
            });
        }
    }
    Ok(path)
}

fn decode_qualifier(node: &XmlNode) -> WbemResult<CIMQualifier> {
    let name = node.require_attr("NAME")?;
    let type_ = CIMType::parse(node.require_attr("TYPE")?)?;
    let propagated = node.attr("PROPAGATED").map(parse_bool).unwrap_or(false);
    let value = if node.child("VALUE").is_some() || node.child("VALUE.ARRAY").is_some() {
        Some(decode_value_of_type(type_, node)?)
    } else {
        None
    };
    let mut q = CIMQualifier::new(name, value, type_);
    if propagated {
        q = q.propagated_from_superclass();
    }
    Ok(q)
}

fn decode_property(node: &XmlNode) -> WbemResult<CIMProperty> {
    let name = node.require_attr("NAME")?;
    let propagated = node.attr("PROPAGATED").map(parse_bool).unwrap_or(false);
    let embedded = match node.attr("EmbeddedObject") {
        Some("instance") => EmbeddedObjectKind::Instance,
        Some("object") => EmbeddedObjectKind::Object,
        _ => EmbeddedObjectKind::None,
    };

    if node.tag == "PROPERTY.REFERENCE" {
        let reference_class = node.attr("REFERENCECLASS").unwrap_or_default().to_string();
        let value = node
            .child("VALUE.REFERENCE")
            .map(|vref| -> WbemResult<CIMValue> {
                Ok(CIMValue::Scalar(CIMScalar::Reference(Box::new(
                    decode_value_reference(vref)?,
                ))))
            })
            .transpose()?;
        let mut prop = CIMProperty::new_reference(name, value, reference_class);
        if propagated {
            prop = prop.propagated_from_superclass();
        }
        for q in node.children_named("QUALIFIER") {
            prop = prop.with_qualifier(decode_qualifier(q)?);
        }
        return Ok(prop);
    }

    let type_ = CIMType::parse(node.require_attr("TYPE")?)?;
    let has_value = node.child("VALUE").is_some() || node.child("VALUE.ARRAY").is_some();
    let value = if has_value {
        Some(decode_value_of_type(type_, node)?)
    } else {
        None
    };
    let mut prop = CIMProperty::new(name, value, type_)?;
    if let Some(size) = node.attr("ARRAYSIZE") {
        let size: u32 = size.parse().map_err(|_| WbemError::Parse {
            line: 0,
            column: 0,
            message: format!("invalid ARRAYSIZE: {size}"),
        })?;
        prop = prop.with_array_size(size)?;
    }
    if propagated {
        prop = prop.propagated_from_superclass();
    }
    prop = prop.with_embedded_object(embedded);
    for q in node.children_named("QUALIFIER") {
        prop = prop.with_qualifier(decode_qualifier(q)?);
    }
    Ok(prop)
}

fn decode_instance(node: &XmlNode) -> WbemResult<CIMInstance> {
    let classname = node.require_attr("CLASSNAME")?;
    let mut instance = CIMInstance::new(classname);
    for q in node.children_named("QUALIFIER") {
        instance = instance.with_qualifier(decode_qualifier(q)?);
    }
    for p in node
        .children_named("PROPERTY")
        .chain(node.children_named("PROPERTY.ARRAY"))
        .chain(node.children_named("PROPERTY.REFERENCE"))
    {
        instance = instance.with_property(decode_property(p)?);
    }
    Ok(instance)
}

fn decode_parameter(node: &XmlNode) -> WbemResult<CIMParameter> {
    let name = node.require_attr("NAME")?;
    if node.tag == "PARAMETER.REFERENCE" {
        let mut param = CIMParameter::new(name, CIMType::Reference);
        if let Some(class) = node.attr("REFERENCECLASS") {
            param = param.with_reference_class(class);
        }
        return Ok(param);
    }
    let type_ = CIMType::parse(node.require_attr("TYPE")?)?;
    let mut param = CIMParameter::new(name, type_);
    if node.tag == "PARAMETER.ARRAY" {
        let size = node
            .attr("ARRAYSIZE")
            .and_then(|s| s.parse::<u32>().ok());
        param = param.array(size);
    }
    Ok(param)
}

fn decode_method(node: &XmlNode) -> WbemResult<CIMMethod> {
    let name = node.require_attr("NAME")?;
    let return_type = node
        .attr("TYPE")
        .map(CIMType::parse)
        .transpose()?
        .unwrap_or(CIMType::String);
    let mut method = CIMMethod::new(name, return_type);
    for q in node.children_named("QUALIFIER") {
        method = method.with_qualifier(decode_qualifier(q)?);
    }
    for p in node
        .children_named("PARAMETER")
        .chain(node.children_named("PARAMETER.REFERENCE"))
        .chain(node.children_named("PARAMETER.ARRAY"))
    {
        method = method.with_parameter(decode_parameter(p)?);
    }
    Ok(method)
}

fn decode_class(node: &XmlNode) -> WbemResult<CIMClass> {
    let name = node.require_attr("NAME")?;
    let mut class = CIMClass::new(name);
    if let Some(sup) = node.attr("SUPERCLASS") {
        class = class.with_superclass(sup);
    }
    for q in node.children_named("QUALIFIER") {
        class = class.with_qualifier(decode_qualifier(q)?);
    }
    for p in node
        .children_named("PROPERTY")
        .chain(node.children_named("PROPERTY.ARRAY"))
        .chain(node.children_named("PROPERTY.REFERENCE"))
    {
        class = class.with_property(decode_property(p)?);
    }
    for m in node.children_named("METHOD") {
        class = class.with_method(decode_method(m)?);
    }
    Ok(class)
}

/// The decoded shape of an operation's `<IRETURNVALUE>`/`<RETURNVALUE>`
/// payload. The caller (the operation engine) knows which variant to
/// expect for a given intrinsic method.
#[derive(Debug, Clone)]
pub enum ReturnValue {
    /// A list of bare values (e.g. a boolean method-return, or
    /// `ExecQuery` instances wrapped as values).
    Values(Vec<CIMValue>),
    /// A single instance (`GetInstance`, `CreateInstance`'s echoed path
    /// is handled separately as `InstanceNames`).
    Instances(Vec<CIMInstance>),
    /// A list of bare object paths (`EnumerateInstanceNames`,
    /// `AssociatorNames`, `ReferenceNames`, `CreateInstance`).
    InstanceNames(Vec<CIMInstanceName>),
    /// A list of `(path, instance)` pairs (`Associators`, `References`,
    /// the pull-enumeration family).
    NamedInstances(Vec<(CIMInstanceName, CIMInstance)>),
    /// A class or list of classes (`GetClass`, `EnumerateClasses`).
    Classes(Vec<CIMClass>),
}

/// The outcome of decoding a `<SIMPLERSP>`: either a CIM-XML `<ERROR>`
/// (mapped by the caller to [`crate::error::WbemError::Cim`]), or a
/// return value plus any sibling output `<PARAMVALUE>`s (used by the pull
/// enumeration family for `EnumerationContext`/`EndOfSequence`, and by
/// extrinsic method calls for output parameters).
#[derive(Debug, Clone)]
pub struct MethodResponse {
    pub error: Option<(CimStatusCode, String, Vec<CIMInstance>)>,
    pub return_value: Option<ReturnValue>,
    pub output_params: NocaseMap<CIMValue>,
}

fn interpret_ireturn(node: &XmlNode) -> WbemResult<ReturnValue> {
    if let Some(first) = node.children.first() {
        match first.tag.as_str() {
            "INSTANCE" => Ok(ReturnValue::Instances(
                node.children_named("INSTANCE")
                    .map(decode_instance)
                    .collect::<WbemResult<Vec<_>>>()?,
            )),
            "INSTANCENAME" => Ok(ReturnValue::InstanceNames(
                node.children_named("INSTANCENAME")
                    .map(decode_instance_name)
                    .collect::<WbemResult<Vec<_>>>()?,
            )),
            "VALUE.NAMEDINSTANCE" => {
                let mut out = Vec::new();
                for n in node.children_named("VALUE.NAMEDINSTANCE") {
                    let path = n
                        .child("INSTANCENAME")
                        .ok_or_else(|| WbemError::Parse {
                            line: 0,
                            column: 0,
                            message: "VALUE.NAMEDINSTANCE missing INSTANCENAME".to_string(),
                        })
                        .and_then(decode_instance_name)?;
                    let instance = n
                        .child("INSTANCE")
                        .ok_or_else(|| WbemError::Parse {
                            line: 0,
                            column: 0,
                            message: "VALUE.NAMEDINSTANCE missing INSTANCE".to_string(),
                        })
                        .and_then(decode_instance)?;
                    out.push((path, instance));
                }
                Ok(ReturnValue::NamedInstances(out))
            }
            "CLASS" => Ok(ReturnValue::Classes(
                node.children_named("CLASS")
                    .map(decode_class)
                    .collect::<WbemResult<Vec<_>>>()?,
            )),
            "VALUE.REFERENCE" => Ok(ReturnValue::Values(
                node.children_named("VALUE.REFERENCE")
                    .map(|v| decode_value_reference(v).map(|r| CIMValue::Scalar(CIMScalar::Reference(Box::new(r)))))
                    .collect::<WbemResult<Vec<_>>>()?,
            )),
            "VALUE" | "VALUE.ARRAY" => {
                let mut values = Vec::new();
                for v in &node.children {
                    match v.tag.as_str() {
                        "VALUE" => values.push(CIMValue::Scalar(CIMScalar::String(v.text.clone()))),
                        "VALUE.ARRAY" => {
                            let items: Vec<CIMScalar> = v
                                .children_named("VALUE")
                                .map(|vv| CIMScalar::String(vv.text.clone()))
                                .collect();
                            values.push(CIMValue::Array(items));
                        }
                        _ => {}
                    }
                }
                Ok(ReturnValue::Values(values))
            }
            other => Err(WbemError::Parse {
                line: 0,
                column: 0,
                message: format!("unexpected IRETURNVALUE child <{other}>"),
            }),
        }
    } else {
        Ok(ReturnValue::Values(Vec::new()))
    }
}

fn interpret_output_params(node: &XmlNode) -> WbemResult<NocaseMap<CIMValue>> {
    let mut params = NocaseMap::new();
    for pv in node.children_named("PARAMVALUE") {
        let name = pv.require_attr("NAME")?;
        let type_ = pv
            .attr("PARAMTYPE")
            .map(CIMType::parse)
            .transpose()?
            .unwrap_or(CIMType::String);
        if let Some(value_node) = pv.child("VALUE") {
            params.insert(name, CIMValue::Scalar(type_.parse_scalar(&value_node.text)?));
        } else if let Some(vref) = pv.child("VALUE.REFERENCE") {
            params.insert(
                name,
                CIMValue::Scalar(CIMScalar::Reference(Box::new(decode_value_reference(vref)?))),
            );
        }
    }
    Ok(params)
}

/// Parse a full CIM-XML response document into a [`MethodResponse`].
pub fn decode_method_response(bytes: &[u8]) -> WbemResult<MethodResponse> {
    let doc = parse_tree(bytes)?;
    if doc.tag != "CIM" {
        return Err(WbemError::Parse {
            line: 0,
            column: 0,
            message: format!("expected root <CIM>, found <{}>", doc.tag),
        });
    }
    let dtd_version = doc.require_attr("DTDVERSION")?;
    if !dtd_version.starts_with("2.") {
        return Err(WbemError::Version(dtd_version.to_string()));
    }
    let message = doc.child("MESSAGE").ok_or_else(|| WbemError::Parse {
        line: 0,
        column: 0,
        message: "missing MESSAGE".to_string(),
    })?;
    let simplersp = message.child("SIMPLERSP").ok_or_else(|| WbemError::Parse {
        line: 0,
        column: 0,
        message: "missing SIMPLERSP".to_string(),
    })?;
    let response = simplersp
        .child("IMETHODRESPONSE")
        .or_else(|| simplersp.child("METHODRESPONSE"))
        .ok_or_else(|| WbemError::Parse {
            line: 0,
            column: 0,
            message: "SIMPLERSP has neither IMETHODRESPONSE nor METHODRESPONSE".to_string(),
        })?;

    if let Some(err) = response.child("ERROR") {
        let code: u32 = err
            .require_attr("CODE")?
            .parse()
            .map_err(|_| WbemError::Parse {
                line: 0,
                column: 0,
                message: "ERROR CODE is not an integer".to_string(),
            })?;
        let description = err.attr("DESCRIPTION").unwrap_or_default().to_string();
        let instances = err
            .children_named("INSTANCE")
            .map(decode_instance)
            .collect::<WbemResult<Vec<_>>>()?;
        return Ok(MethodResponse {
            error: Some((CimStatusCode(code), description, instances)),
            return_value: None,
            output_params: NocaseMap::new(),
        });
    }

    // Intrinsic replies carry IRETURNVALUE; extrinsic (METHODRESPONSE) replies
    // carry RETURNVALUE instead, per DSP0201's METHODRESPONSE content model.
    let return_value = match response.child("IRETURNVALUE").or_else(|| response.child("RETURNVALUE")) {
        Some(ireturn) => Some(interpret_ireturn(ireturn)?),
        None => None,
    };
    let output_params = interpret_output_params(response)?;

    Ok(MethodResponse {
        error: None,
        return_value,
        output_params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_dtd_version() {
        let xml = br#"<?xml version="1.0"?><CIM CIMVERSION="2.0" DTDVERSION="1.0"><MESSAGE ID="1" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="GetInstance"><IRETURNVALUE/></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#;
        let err = decode_method_response(xml).unwrap_err();
        assert!(matches!(err, WbemError::Version(_)));
    }

    #[test]
    fn decodes_error_element() {
        let xml = br#"<?xml version="1.0"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="1" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="GetInstance"><ERROR CODE="2" DESCRIPTION="Access denied"/></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#;
        let resp = decode_method_response(xml).unwrap();
        let (code, desc, _) = resp.error.unwrap();
        assert_eq!(code.0, 2);
        assert_eq!(desc, "Access denied");
    }

    #[test]
    fn unknown_element_is_rejected() {
        let xml = br#"<?xml version="1.0"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="1" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="GetInstance"><BOGUS/></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#;
        let err = decode_method_response(xml).unwrap_err();
        assert!(matches!(err, WbemError::Parse { .. }));
    }

    #[test]
    fn decodes_instance_with_properties() {
        let xml = br#"<?xml version="1.0"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="1" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="GetInstance"><IRETURNVALUE><INSTANCE CLASSNAME="PyWBEM_Person"><PROPERTY NAME="Name" TYPE="string"><VALUE>Fritz</VALUE></PROPERTY><PROPERTY NAME="Address" TYPE="string"><VALUE>Fritz Town</VALUE></PROPERTY></INSTANCE></IRETURNVALUE></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#;
        let resp = decode_method_response(xml).unwrap();
        match resp.return_value.unwrap() {
            ReturnValue::Instances(instances) => {
                assert_eq!(instances.len(), 1);
                let inst = &instances[0];
                assert_eq!(inst.classname(), "PyWBEM_Person");
                assert_eq!(
                    inst.property("Name").unwrap().value(),
                    Some(&CIMValue::Scalar(CIMScalar::String("Fritz".into())))
                );
                assert!(!inst.property("Name").unwrap().propagated());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parsing_byte_equal_input_twice_yields_equal_results() {
        let xml = br#"<?xml version="1.0"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="1" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="GetInstance"><IRETURNVALUE><INSTANCE CLASSNAME="PyWBEM_Person"><PROPERTY NAME="Name" TYPE="string"><VALUE>Fritz</VALUE></PROPERTY></INSTANCE></IRETURNVALUE></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#;
        let first = decode_method_response(xml).unwrap();
        let second = decode_method_response(xml).unwrap();
        match (first.return_value.unwrap(), second.return_value.unwrap()) {
            (ReturnValue::Instances(a), ReturnValue::Instances(b)) => assert_eq!(a, b),
            other => panic!("unexpected variant pair: {other:?}"),
        }
    }

    #[test]
    fn sibling_order_of_ireturnvalue_and_output_params_does_not_matter() {
        let params_first = br#"<?xml version="1.0"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="1" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="OpenEnumerateInstances"><PARAMVALUE NAME="EndOfSequence" PARAMTYPE="boolean"><VALUE>TRUE</VALUE></PARAMVALUE><IRETURNVALUE/></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#;
        let ireturn_first = br#"<?xml version="1.0"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="1" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="OpenEnumerateInstances"><IRETURNVALUE/><PARAMVALUE NAME="EndOfSequence" PARAMTYPE="boolean"><VALUE>TRUE</VALUE></PARAMVALUE></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#;

        let a = decode_method_response(params_first).unwrap();
        let b = decode_method_response(ireturn_first).unwrap();
        assert_eq!(a.output_params.get("EndOfSequence"), b.output_params.get("EndOfSequence"));
        assert_eq!(
            a.output_params.get("EndOfSequence"),
            Some(&CIMValue::Scalar(CIMScalar::Boolean(true)))
        );
    }

    #[test]
    fn extrinsic_method_response_decodes_returnvalue_not_just_ireturnvalue() {
        let xml = br#"<?xml version="1.0"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="1" PROTOCOLVERSION="1.0"><SIMPLERSP><METHODRESPONSE NAME="RequestStateChange"><RETURNVALUE PARAMTYPE="uint32"><VALUE>0</VALUE></RETURNVALUE></METHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#;
        let resp = decode_method_response(xml).unwrap();
        match resp.return_value.expect("METHODRESPONSE's RETURNVALUE must decode") {
            ReturnValue::Values(values) => {
                assert_eq!(values, vec![CIMValue::Scalar(CIMScalar::String("0".to_string()))]);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn preserves_whitespace_inside_value_text() {
        let xml = br#"<?xml version="1.0"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="1" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="GetInstance"><IRETURNVALUE><INSTANCE CLASSNAME="C"><PROPERTY NAME="P" TYPE="string"><VALUE>  padded  </VALUE></PROPERTY></INSTANCE></IRETURNVALUE></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#;
        let resp = decode_method_response(xml).unwrap();
        match resp.return_value.unwrap() {
            ReturnValue::Instances(instances) => {
                let value = instances[0].property("P").unwrap().value().unwrap();
                assert_eq!(value, &CIMValue::Scalar(CIMScalar::String("  padded  ".into())));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
