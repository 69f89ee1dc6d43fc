// Copyright 2025 Cowboy AI, LLC.

//! CIM-XML encoding and decoding (DSP0201).

pub mod decode;
pub mod dtd;
pub mod encode;

pub use decode::{decode_method_response, MethodResponse, ReturnValue};
pub use dtd::dtd;
pub use encode::{encode_imethod_call, encode_method_call_on_instance, IParam, ParamValue};
