// Copyright 2025 Cowboy AI, LLC.

//! A WBEM/CIM-XML client for talking to CIMOMs over HTTP(S): intrinsic and
//! extrinsic method calls, pull enumeration, per-method statistics, and a
//! recorder/replay mechanism for deterministic testing without a live
//! server.
//!
//! The typed object model ([`CIMInstance`], [`CIMClass`], [`CIMValue`], ...)
//! mirrors DSP0201's representation; [`WbemConnection`] drives DSP0200's
//! transport and operation semantics on top of it.
//!
//! ```no_run
//! # async fn example() -> cim_client::WbemResult<()> {
//! use cim_client::{ConnectionBuilder, WbemConnection, CIMInstanceName};
//!
//! let config = ConnectionBuilder::new("https://cimserver.example.com:5989")?
//!     .credentials("user", "pw")
//!     .default_namespace("root/cimv2")?
//!     .build();
//! let conn = WbemConnection::new(config)?;
//! let path = CIMInstanceName::new("PyWBEM_Person");
//! let instance = conn.get_instance(&path, false, false, false, None).await?;
//! # let _ = instance;
//! # Ok(())
//! # }
//! ```

mod auth;
mod class;
mod codec;
mod config;
mod engine;
mod enumeration;
mod error;
mod instance;
mod namespace;
mod nocase;
mod object_path;
mod qualifier;
mod replay;
mod stats;
mod transport;
mod types;

pub use class::{CIMClass, CIMMethod, CIMParameter};
pub use codec::{MethodResponse, ReturnValue};
pub use config::{ClientConfig, ConnectionBuilder, Credentials};
pub use engine::{EnumerationBatch, EnumerationHandle, MethodResult, WbemConnection};
pub use enumeration::{EnumerationContext, EnumerationState};
pub use error::{CimStatusCode, WbemError, WbemResult};
pub use instance::{CIMInstance, CIMProperty, EmbeddedObjectKind};
pub use namespace::Namespace;
pub use nocase::NocaseMap;
pub use object_path::{CIMClassName, CIMInstanceName};
pub use qualifier::{CIMQualifier, CIMQualifierDeclaration};
pub use replay::{
    load_replay_file, save_replay_file, HttpExchange, NullRecorder, PywbemRequest, PywbemResponse,
    Recorder, ReplayCase, ReplayRecorder, YamlRecorder,
};
pub use stats::{MethodStats, Sample, Statistics};
pub use types::{CIMDateTime, CIMScalar, CIMType, CIMValue};
