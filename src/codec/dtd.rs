// Copyright 2025 Cowboy AI, LLC.

//! The CIM-XML DTD fragment this client relies on (DSP0201 `CIM_DTD_V22`,
//! trimmed to the element set this client emits and parses).
//!
//! Exposed for callers that want to validate a server's response against
//! the DTD out-of-band; the decoder itself does not perform DTD
//! validation, only element/attribute contract checks (see
//! [`crate::codec::decode`]).

/// The embedded DTD fragment text.
pub const CIM_DTD_FRAGMENT: &str = r#"<!--
    CIM-XML DTD fragment (DSP0201 CIM_DTD_V22), trimmed to the elements
    this client's encoder and decoder use.
-->
<!ELEMENT CIM (MESSAGE)>
<!ATTLIST CIM
    CIMVERSION CDATA #REQUIRED
    DTDVERSION CDATA #REQUIRED>

<!ELEMENT MESSAGE (SIMPLEREQ | SIMPLERSP)>
<!ATTLIST MESSAGE
    ID CDATA #REQUIRED
    PROTOCOLVERSION CDATA #REQUIRED>

<!ELEMENT SIMPLEREQ (IMETHODCALL | METHODCALL)>
<!ELEMENT SIMPLERSP (IMETHODRESPONSE | METHODRESPONSE)>

<!ELEMENT IMETHODCALL (LOCALNAMESPACEPATH, IPARAMVALUE*)>
<!ATTLIST IMETHODCALL NAME CDATA #REQUIRED>

<!ELEMENT IMETHODRESPONSE (ERROR | IRETURNVALUE?)>
<!ATTLIST IMETHODRESPONSE NAME CDATA #REQUIRED>

<!ELEMENT METHODCALL ((LOCALINSTANCEPATH | LOCALCLASSPATH), PARAMVALUE*)>
<!ATTLIST METHODCALL NAME CDATA #REQUIRED>

<!ELEMENT METHODRESPONSE (ERROR | (RETURNVALUE?, PARAMVALUE*))>
<!ATTLIST METHODRESPONSE NAME CDATA #REQUIRED>

<!ELEMENT LOCALNAMESPACEPATH (NAMESPACE+)>
<!ELEMENT NAMESPACE EMPTY>
<!ATTLIST NAMESPACE NAME CDATA #REQUIRED>

<!ELEMENT LOCALINSTANCEPATH (LOCALNAMESPACEPATH, INSTANCENAME)>
<!ELEMENT LOCALCLASSPATH (LOCALNAMESPACEPATH, CLASSNAME)>

<!ELEMENT IPARAMVALUE (VALUE | VALUE.ARRAY | VALUE.REFERENCE | INSTANCENAME
    | CLASSNAME | INSTANCE | CLASS | VALUE.NAMEDINSTANCE)?>
<!ATTLIST IPARAMVALUE NAME CDATA #REQUIRED>

<!ELEMENT PARAMVALUE (VALUE | VALUE.ARRAY | VALUE.REFERENCE)?>
<!ATTLIST PARAMVALUE
    NAME CDATA #REQUIRED
    PARAMTYPE CDATA #IMPLIED>

<!ELEMENT IRETURNVALUE (VALUE* | VALUE.ARRAY? | VALUE.REFERENCE* |
    INSTANCENAME* | CLASSNAME* | INSTANCE* | CLASS* | VALUE.NAMEDINSTANCE*)>
<!ELEMENT RETURNVALUE (VALUE | VALUE.REFERENCE)?>

<!ELEMENT ERROR (INSTANCE*)>
<!ATTLIST ERROR
    CODE CDATA #REQUIRED
    DESCRIPTION CDATA #IMPLIED>

<!ELEMENT CLASSNAME EMPTY>
<!ATTLIST CLASSNAME NAME CDATA #REQUIRED>

<!ELEMENT INSTANCENAME (KEYBINDING*)>
<!ATTLIST INSTANCENAME CLASSNAME CDATA #REQUIRED>

<!ELEMENT KEYBINDING (KEYVALUE | VALUE.REFERENCE)>
<!ATTLIST KEYBINDING NAME CDATA #REQUIRED>

<!ELEMENT KEYVALUE (#PCDATA)>
<!ATTLIST KEYVALUE
    VALUETYPE (string | boolean | numeric) "string"
    TYPE CDATA #IMPLIED>

<!ELEMENT INSTANCE (QUALIFIER*, PROPERTY | PROPERTY.ARRAY |
    PROPERTY.REFERENCE)*>
<!ATTLIST INSTANCE
    CLASSNAME CDATA #REQUIRED
    xml:lang CDATA #IMPLIED>

<!ELEMENT CLASS (QUALIFIER*, (PROPERTY | PROPERTY.ARRAY |
    PROPERTY.REFERENCE)*, METHOD*)>
<!ATTLIST CLASS
    NAME CDATA #REQUIRED
    SUPERCLASS CDATA #IMPLIED>

<!ELEMENT PROPERTY (QUALIFIER*, VALUE?)>
<!ATTLIST PROPERTY
    NAME CDATA #REQUIRED
    TYPE CDATA #REQUIRED
    PROPAGATED (true | false) "false"
    EmbeddedObject (object | instance) #IMPLIED>

<!ELEMENT PROPERTY.ARRAY (QUALIFIER*, VALUE.ARRAY?)>
<!ATTLIST PROPERTY.ARRAY
    NAME CDATA #REQUIRED
    TYPE CDATA #REQUIRED
    ARRAYSIZE CDATA #IMPLIED
    PROPAGATED (true | false) "false"
    EmbeddedObject (object | instance) #IMPLIED>

<!ELEMENT PROPERTY.REFERENCE (QUALIFIER*, VALUE.REFERENCE?)>
<!ATTLIST PROPERTY.REFERENCE
    NAME CDATA #REQUIRED
    REFERENCECLASS CDATA #IMPLIED
    PROPAGATED (true | false) "false">

<!ELEMENT METHOD (QUALIFIER*, (PARAMETER | PARAMETER.REFERENCE |
    PARAMETER.ARRAY)*)>
<!ATTLIST METHOD
    NAME CDATA #REQUIRED
    TYPE CDATA #IMPLIED>

<!ELEMENT PARAMETER (QUALIFIER*)>
<!ATTLIST PARAMETER
    NAME CDATA #REQUIRED
    TYPE CDATA #REQUIRED>

<!ELEMENT PARAMETER.REFERENCE (QUALIFIER*)>
<!ATTLIST PARAMETER.REFERENCE
    NAME CDATA #REQUIRED
    REFERENCECLASS CDATA #IMPLIED>

<!ELEMENT PARAMETER.ARRAY (QUALIFIER*)>
<!ATTLIST PARAMETER.ARRAY
    NAME CDATA #REQUIRED
    TYPE CDATA #REQUIRED
    ARRAYSIZE CDATA #IMPLIED>

<!ELEMENT QUALIFIER (VALUE | VALUE.ARRAY)?>
<!ATTLIST QUALIFIER
    NAME CDATA #REQUIRED
    TYPE CDATA #REQUIRED
    PROPAGATED (true | false) "false">

<!ELEMENT QUALIFIER.DECLARATION (VALUE | VALUE.ARRAY)?>
<!ATTLIST QUALIFIER.DECLARATION
    NAME CDATA #REQUIRED
    TYPE CDATA #REQUIRED
    ISARRAY (true | false) "false"
    OVERRIDABLE (true | false) "true"
    TOSUBCLASS (true | false) "true"
    TRANSLATABLE (true | false) "false">

<!ELEMENT VALUE (#PCDATA)>
<!ELEMENT VALUE.ARRAY (VALUE*)>
<!ELEMENT VALUE.REFERENCE (CLASSNAME | INSTANCENAME)>
<!ELEMENT VALUE.NAMEDINSTANCE (INSTANCENAME, INSTANCE)>
"#;

/// The embedded DTD fragment, for callers that want to validate responses
/// out-of-band.
pub fn dtd() -> &'static str {
    CIM_DTD_FRAGMENT
}
