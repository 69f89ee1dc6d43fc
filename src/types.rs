// Copyright 2025 Cowboy AI, LLC.

//! The CIM typed scalar sum and array shape.
//!
//! A [`CIMValue`] carries exactly the type repertoire DSP0201 defines for
//! property, parameter, and qualifier values: a scalar sum type plus an
//! array-of-scalar shape. Integer widths are enforced on decode — see
//! [`CIMType::parse_int`].

use crate::error::{WbemError, WbemResult};
use crate::object_path::CIMInstanceName;
use std::fmt;

/// The CIM type code for a value, as emitted in a `TYPE="..."` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CIMType {
    /// `string`
    String,
    /// `boolean`
    Boolean,
    /// `char16`
    Char16,
    /// `uint8`
    Uint8,
    /// `uint16`
    Uint16,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
    /// `sint8`
    Sint8,
    /// `sint16`
    Sint16,
    /// `sint32`
    Sint32,
    /// `sint64`
    Sint64,
    /// `real32`
    Real32,
    /// `real64`
    Real64,
    /// `datetime`
    Datetime,
    /// `reference`
    Reference,
}

impl CIMType {
    /// The wire-form string for this type code, as used in `TYPE="..."`.
    pub fn as_str(self) -> &'static str {
        match self {
            CIMType::String => "string",
            CIMType::Boolean => "boolean",
            CIMType::Char16 => "char16",
            CIMType::Uint8 => "uint8",
            CIMType::Uint16 => "uint16",
            CIMType::Uint32 => "uint32",
            CIMType::Uint64 => "uint64",
            CIMType::Sint8 => "sint8",
            CIMType::Sint16 => "sint16",
            CIMType::Sint32 => "sint32",
            CIMType::Sint64 => "sint64",
            CIMType::Real32 => "real32",
            CIMType::Real64 => "real64",
            CIMType::Datetime => "datetime",
            CIMType::Reference => "reference",
        }
    }

    /// Parse a wire-form type name. Case-sensitive: DSP0201 defines these
    /// as fixed lowercase tokens.
    pub fn parse(s: &str) -> WbemResult<Self> {
        Ok(match s {
            "string" => CIMType::String,
            "boolean" => CIMType::Boolean,
            "char16" => CIMType::Char16,
            "uint8" => CIMType::Uint8,
            "uint16" => CIMType::Uint16,
            "uint32" => CIMType::Uint32,
            "uint64" => CIMType::Uint64,
            "sint8" => CIMType::Sint8,
            "sint16" => CIMType::Sint16,
            "sint32" => CIMType::Sint32,
            "sint64" => CIMType::Sint64,
            "real32" => CIMType::Real32,
            "real64" => CIMType::Real64,
            "datetime" => CIMType::Datetime,
            "reference" => CIMType::Reference,
            other => {
                return Err(WbemError::Parse {
                    line: 0,
                    column: 0,
                    message: format!("unknown CIM type code: {other}"),
                })
            }
        })
    }

    /// Inclusive `(min, max)` range for integer types, `None` otherwise.
    pub fn int_range(self) -> Option<(i128, i128)> {
        Some(match self {
            CIMType::Uint8 => (0, u8::MAX as i128),
            CIMType::Uint16 => (0, u16::MAX as i128),
            CIMType::Uint32 => (0, u32::MAX as i128),
            CIMType::Uint64 => (0, u64::MAX as i128),
            CIMType::Sint8 => (i8::MIN as i128, i8::MAX as i128),
            CIMType::Sint16 => (i16::MIN as i128, i16::MAX as i128),
            CIMType::Sint32 => (i32::MIN as i128, i32::MAX as i128),
            CIMType::Sint64 => (i64::MIN as i128, i64::MAX as i128),
            _ => return None,
        })
    }

    /// Parse a decimal integer text form for this type, rejecting values
    /// outside the type's declared range.
    pub fn parse_int(self, text: &str) -> WbemResult<i128> {
        let (min, max) = self.int_range().ok_or_else(|| {
            WbemError::Parse {
                line: 0,
                column: 0,
                message: format!("{} is not an integer type", self.as_str()),
            }
        })?;
        let value: i128 = text.trim().parse().map_err(|_| WbemError::Parse {
            line: 0,
            column: 0,
            message: format!("invalid integer literal: {text}"),
        })?;
        if value < min || value > max {
            return Err(WbemError::Parse {
                line: 0,
                column: 0,
                message: format!(
                    "{value} out of range for {} ({min}..={max})",
                    self.as_str()
                ),
            });
        }
        Ok(value)
    }
}

/// A single scalar CIM value. Booleans are emitted as `TRUE`/`FALSE`
/// (uppercase) and accepted case-insensitively on decode.
#[derive(Debug, Clone, PartialEq)]
pub enum CIMScalar {
    /// UTF-8 text.
    String(String),
    /// Boolean.
    Boolean(bool),
    /// A single UTF-16 code unit presented as a `char`.
    Char16(char),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Sint8(i8),
    Sint16(i16),
    Sint32(i32),
    Sint64(i64),
    /// 32-bit float. NaN and ±Infinity text forms round-trip.
    Real32(f32),
    /// 64-bit float. NaN and ±Infinity text forms round-trip.
    Real64(f64),
    /// A CIM datetime (absolute or interval).
    Datetime(CIMDateTime),
    /// A reference-typed value: an object path.
    Reference(Box<CIMInstanceName>),
}

impl CIMScalar {
    /// The [`CIMType`] this scalar carries.
    pub fn cim_type(&self) -> CIMType {
        match self {
            CIMScalar::String(_) => CIMType::String,
            CIMScalar::Boolean(_) => CIMType::Boolean,
            CIMScalar::Char16(_) => CIMType::Char16,
            CIMScalar::Uint8(_) => CIMType::Uint8,
            CIMScalar::Uint16(_) => CIMType::Uint16,
            CIMScalar::Uint32(_) => CIMType::Uint32,
            CIMScalar::Uint64(_) => CIMType::Uint64,
            CIMScalar::Sint8(_) => CIMType::Sint8,
            CIMScalar::Sint16(_) => CIMType::Sint16,
            CIMScalar::Sint32(_) => CIMType::Sint32,
            CIMScalar::Sint64(_) => CIMType::Sint64,
            CIMScalar::Real32(_) => CIMType::Real32,
            CIMScalar::Real64(_) => CIMType::Real64,
            CIMScalar::Datetime(_) => CIMType::Datetime,
            CIMScalar::Reference(_) => CIMType::Reference,
        }
    }

    /// Render this scalar's wire-text form (the text content of a
    /// `<VALUE>` element).
    pub fn to_wire_text(&self) -> String {
        match self {
            CIMScalar::String(s) => s.clone(),
            CIMScalar::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CIMScalar::Char16(c) => c.to_string(),
            CIMScalar::Uint8(v) => v.to_string(),
            CIMScalar::Uint16(v) => v.to_string(),
            CIMScalar::Uint32(v) => v.to_string(),
            CIMScalar::Uint64(v) => v.to_string(),
            CIMScalar::Sint8(v) => v.to_string(),
            CIMScalar::Sint16(v) => v.to_string(),
            CIMScalar::Sint32(v) => v.to_string(),
            CIMScalar::Sint64(v) => v.to_string(),
            CIMScalar::Real32(v) => format_real(*v as f64),
            CIMScalar::Real64(v) => format_real(*v),
            CIMScalar::Datetime(dt) => dt.to_canonical_string(),
            CIMScalar::Reference(_) => {
                unreachable!("reference values are encoded as VALUE.REFERENCE, not VALUE text")
            }
        }
    }
}

fn format_real(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "+Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{v}")
    }
}

fn parse_real(text: &str) -> WbemResult<f64> {
    match text.trim() {
        "NaN" => Ok(f64::NAN),
        "+Infinity" | "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        other => other.parse::<f64>().map_err(|_| WbemError::Parse {
            line: 0,
            column: 0,
            message: format!("invalid real literal: {other}"),
        }),
    }
}

impl CIMType {
    /// Parse `text` (the content of a `<VALUE>` element) as a scalar of
    /// this type. `Reference` values are not parsed by this path — they
    /// arrive structurally, via `<VALUE.REFERENCE>`.
    pub fn parse_scalar(self, text: &str) -> WbemResult<CIMScalar> {
        Ok(match self {
            CIMType::String => CIMScalar::String(text.to_string()),
            CIMType::Boolean => {
                let lower = text.trim().to_ascii_lowercase();
                match lower.as_str() {
                    "true" => CIMScalar::Boolean(true),
                    "false" => CIMScalar::Boolean(false),
                    other => {
                        return Err(WbemError::Parse {
                            line: 0,
                            column: 0,
                            message: format!("invalid boolean literal: {other}"),
                        })
                    }
                }
            }
            CIMType::Char16 => {
                let mut chars = text.chars();
                let c = chars.next().ok_or_else(|| WbemError::Parse {
                    line: 0,
                    column: 0,
                    message: "empty char16 literal".to_string(),
                })?;
                CIMScalar::Char16(c)
            }
            CIMType::Uint8 => CIMScalar::Uint8(self.parse_int(text)? as u8),
            CIMType::Uint16 => CIMScalar::Uint16(self.parse_int(text)? as u16),
            CIMType::Uint32 => CIMScalar::Uint32(self.parse_int(text)? as u32),
            CIMType::Uint64 => CIMScalar::Uint64(self.parse_int(text)? as u64),
            CIMType::Sint8 => CIMScalar::Sint8(self.parse_int(text)? as i8),
            CIMType::Sint16 => CIMScalar::Sint16(self.parse_int(text)? as i16),
            CIMType::Sint32 => CIMScalar::Sint32(self.parse_int(text)? as i32),
            CIMType::Sint64 => CIMScalar::Sint64(self.parse_int(text)? as i64),
            CIMType::Real32 => CIMScalar::Real32(parse_real(text)? as f32),
            CIMType::Real64 => CIMScalar::Real64(parse_real(text)?),
            CIMType::Datetime => CIMScalar::Datetime(CIMDateTime::parse(text)?),
            CIMType::Reference => {
                return Err(WbemError::Parse {
                    line: 0,
                    column: 0,
                    message: "reference values must be decoded from VALUE.REFERENCE".to_string(),
                })
            }
        })
    }
}

/// A CIM value: a single scalar or an array of same-typed scalars.
/// `None` at the top level represents an explicit CIM `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum CIMValue {
    /// A single scalar.
    Scalar(CIMScalar),
    /// An ordered array of scalars, all of the same [`CIMType`].
    Array(Vec<CIMScalar>),
}

impl CIMValue {
    /// The [`CIMType`] this value carries. For an empty array this can't be
    /// inferred from elements; callers track the declared type separately
    /// (see [`crate::instance::CIMProperty::type_`]).
    pub fn element_type(&self) -> Option<CIMType> {
        match self {
            CIMValue::Scalar(s) => Some(s.cim_type()),
            CIMValue::Array(items) => items.first().map(CIMScalar::cim_type),
        }
    }

    /// True if this value is array-shaped.
    pub fn is_array(&self) -> bool {
        matches!(self, CIMValue::Array(_))
    }
}

impl fmt::Display for CIMValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CIMValue::Scalar(s) => write!(f, "{}", s.to_wire_text()),
            CIMValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.to_wire_text())?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A CIM datetime: either an absolute timestamp or a relative interval.
///
/// The canonical string form is exactly 25 ASCII characters, e.g.
/// `20260728143000.123456+060` (absolute) or
/// `00000003000245.123456:000` (interval — note the trailing `:000`
/// sentinel in place of a UTC offset, per DSP0004).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CIMDateTime {
    /// An absolute point in time.
    Absolute {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        microsecond: u32,
        /// UTC offset in minutes, e.g. `-300` for US Eastern Standard Time.
        utc_offset_minutes: i16,
    },
    /// A relative interval.
    Interval {
        days: u32,
        hours: u8,
        minutes: u8,
        seconds: u8,
        microseconds: u32,
    },
}

impl CIMDateTime {
    /// Parse the 25-character DMTF datetime wire form.
    pub fn parse(text: &str) -> WbemResult<Self> {
        let text = text.trim();
        if text.len() != 25 {
            return Err(WbemError::Parse {
                line: 0,
                column: 0,
                message: format!("datetime must be 25 characters, got {}", text.len()),
            });
        }
        let bytes = text.as_bytes();
        let sign = bytes[21] as char;
        if sign == ':' {
            // interval form: dddddddhhmmss.mmmmmm:000
            let days: u32 = text[0..8].trim_start_matches('0').parse().unwrap_or(0);
            let hours: u8 = text[8..10].parse().map_err(|_| parse_err("hours"))?;
            let minutes: u8 = text[10..12].parse().map_err(|_| parse_err("minutes"))?;
            let seconds: u8 = text[12..14].parse().map_err(|_| parse_err("seconds"))?;
            if &text[14..15] != "." {
                return Err(parse_err("decimal point"));
            }
            let microseconds: u32 = text[15..21].parse().map_err(|_| parse_err("microseconds"))?;
            Ok(CIMDateTime::Interval {
                days,
                hours,
                minutes,
                seconds,
                microseconds,
            })
        } else if sign == '+' || sign == '-' {
            let year: u16 = text[0..4].parse().map_err(|_| parse_err("year"))?;
            let month: u8 = text[4..6].parse().map_err(|_| parse_err("month"))?;
            let day: u8 = text[6..8].parse().map_err(|_| parse_err("day"))?;
            let hour: u8 = text[8..10].parse().map_err(|_| parse_err("hour"))?;
            let minute: u8 = text[10..12].parse().map_err(|_| parse_err("minute"))?;
            let second: u8 = text[12..14].parse().map_err(|_| parse_err("second"))?;
            if &text[14..15] != "." {
                return Err(parse_err("decimal point"));
            }
            let microsecond: u32 = text[15..21].parse().map_err(|_| parse_err("microsecond"))?;
            let offset_mag: i16 = text[22..25].parse().map_err(|_| parse_err("utc offset"))?;
            let utc_offset_minutes = if sign == '-' { -offset_mag } else { offset_mag };
            Ok(CIMDateTime::Absolute {
                year,
                month,
                day,
                hour,
                minute,
                second,
                microsecond,
                utc_offset_minutes,
            })
        } else {
            Err(parse_err("sign/offset marker at position 21"))
        }
    }

    /// Render the canonical 25-character wire form.
    pub fn to_canonical_string(self) -> String {
        match self {
            CIMDateTime::Absolute {
                year,
                month,
                day,
                hour,
                minute,
                second,
                microsecond,
                utc_offset_minutes,
            } => {
                let sign = if utc_offset_minutes < 0 { '-' } else { '+' };
                format!(
                    "{year:04}{month:02}{day:02}{hour:02}{minute:02}{second:02}.{microsecond:06}{sign}{:03}",
                    utc_offset_minutes.unsigned_abs()
                )
            }
            CIMDateTime::Interval {
                days,
                hours,
                minutes,
                seconds,
                microseconds,
            } => {
                format!(
                    "{days:08}{hours:02}{minutes:02}{seconds:02}.{microseconds:06}:000"
                )
            }
        }
    }
}

fn parse_err(field: &str) -> WbemError {
    WbemError::Parse {
        line: 0,
        column: 0,
        message: format!("invalid datetime field: {field}"),
    }
}
