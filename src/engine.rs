// Copyright 2025 Cowboy AI, LLC.

//! The operation engine: one typed method per CIM intrinsic operation, a
//! generic entry point for extrinsic method calls, namespace resolution,
//! statistics, the pull-enumeration state machine, and the recorder hooks
//! that make all of it replayable.

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::Instrument;

use crate::class::CIMClass;
use crate::codec::{
    decode_method_response, encode_imethod_call, encode_method_call_on_instance, IParam, ParamValue, ReturnValue,
};
use crate::config::ClientConfig;
use crate::enumeration::EnumerationContext;
use crate::error::{WbemError, WbemResult};
use crate::instance::CIMInstance;
use crate::namespace::Namespace;
use crate::object_path::CIMInstanceName;
use crate::replay::{NullRecorder, Recorder, ReplayCase, ReplayRecorder};
use crate::stats::{Sample, Statistics};
use crate::transport::{self, TransportReply};
use crate::types::{CIMScalar, CIMValue};

/// An opaque handle to a server-held pull-enumeration context. Returned by
/// the `Open*` family, consumed by `PullInstancesWithPath`/`CloseEnumeration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumerationHandle(u64);

struct ConnectionState {
    message_id: u64,
    stats: Statistics,
    enumerations: HashMap<u64, EnumerationContext>,
    next_enumeration_id: u64,
    recorder: Box<dyn Recorder>,
    replay: Option<ReplayRecorder>,
}

/// A stateful connection to a single CIMOM. Not `Sync`-safe to call
/// concurrently from multiple tasks against the same instance — the
/// mutex below serializes operations rather than documenting the
/// invariant alone; callers seeking parallelism should open one
/// connection per task.
pub struct WbemConnection {
    config: ClientConfig,
    http: reqwest::blocking::Client,
    state: Mutex<ConnectionState>,
}

/// A batch of `(path, instance)` pairs plus the pull-enumeration
/// bookkeeping a caller needs to continue or stop.
#[derive(Debug, Clone)]
pub struct EnumerationBatch {
    pub instances: Vec<(CIMInstanceName, CIMInstance)>,
    pub end_of_sequence: bool,
    pub handle: Option<EnumerationHandle>,
}

/// The result of an extrinsic method call: the method's own return value
/// plus any output parameters.
#[derive(Debug, Clone)]
pub struct MethodResult {
    pub return_value: Option<CIMValue>,
    pub output_params: crate::nocase::NocaseMap<CIMValue>,
}

impl WbemConnection {
    /// Open a connection using `config` (built via
    /// [`crate::config::ConnectionBuilder`]).
    pub fn new(config: ClientConfig) -> WbemResult<Self> {
        let http = transport::build_client(&config)?;
        Ok(Self {
            config,
            http,
            state: Mutex::new(ConnectionState {
                message_id: 0,
                stats: Statistics::new(false),
                enumerations: HashMap::new(),
                next_enumeration_id: 0,
                recorder: Box::new(NullRecorder),
                replay: None,
            }),
        })
    }

    /// Replace the connection's recorder (see [`crate::replay`]).
    pub async fn set_recorder(&self, recorder: Box<dyn Recorder>) {
        self.state.lock().await.recorder = recorder;
    }

    /// Wire a canned [`ReplayCase`] into this connection: every subsequent
    /// operation is answered from `case.http_response` instead of going
    /// over the wire, bypassing the transport entirely. Intended for
    /// deterministic test fixtures, not for production use.
    pub async fn enable_replay(&self, case: ReplayCase) {
        self.state.lock().await.replay = Some(ReplayRecorder::new(case));
    }

    /// A snapshot of the per-method statistics table.
    pub async fn statistics(&self) -> HashMap<String, crate::stats::MethodStats> {
        self.state.lock().await.stats.snapshot()
    }

    /// Enable or disable statistics collection at runtime (in addition to
    /// the `ConnectionBuilder::stats_enabled` construction-time default).
    pub async fn set_stats_enabled(&self, enabled: bool) {
        self.state.lock().await.stats = Statistics::new(enabled);
    }

    fn resolve_namespace(&self, op_ns: Option<&Namespace>, path_ns: Option<&Namespace>) -> WbemResult<Namespace> {
        op_ns
            .or(path_ns)
            .or(self.config.default_namespace())
            .cloned()
            .ok_or_else(|| {
                WbemError::model(
                    "no namespace supplied on the operation, the object path, or the connection default",
                )
            })
    }

    async fn call_intrinsic(
        &self,
        method: &str,
        namespace: &Namespace,
        params: Vec<IParam>,
    ) -> WbemResult<ReturnValueWithParams> {
        let mut guard = self.state.lock().await;
        guard.recorder.staged_request(method, namespace.as_str());
        let message_id = guard.message_id.to_string();
        guard.message_id += 1;
        drop(guard);

        let span = tracing::info_span!(
            "cim_operation",
            method = %method,
            namespace = %namespace.as_str(),
            message_id = %message_id,
        );
        async move {
            tracing::debug!("request issued");
            let body = encode_imethod_call(&message_id, method, namespace, &params)?;
            let request_headers = vec![
                ("CIMOperation".to_string(), "MethodCall".to_string()),
                ("CIMMethod".to_string(), method.to_string()),
                ("CIMObject".to_string(), namespace.as_str().to_string()),
            ];
            let canned = {
                let mut guard = self.state.lock().await;
                guard.recorder.staged_http_request(&body, &request_headers);
                guard
                    .replay
                    .as_ref()
                    .map(|r| (r.canned_http_reply(), r.expected_status()))
            };

            let start = Instant::now();
            let reply = match canned {
                Some((reply_body, status)) if (200..300).contains(&status) => Ok(TransportReply {
                    request_len: body.len() as u64,
                    reply_len: reply_body.len() as u64,
                    server_time: None,
                    body: reply_body,
                }),
                Some((_, status)) => Err(WbemError::Http {
                    status,
                    message: "replayed response carried a non-success status".to_string(),
                }),
                None => {
                    let http = self.http.clone();
                    let config = self.config.clone();
                    let method_owned = method.to_string();
                    let cim_object = namespace.as_str().to_string();
                    tokio::task::spawn_blocking(move || {
                        transport::send(&http, &config, &method_owned, &cim_object, body)
                    })
                    .await
                    .map_err(|e| WbemError::Connection(format!("transport task panicked: {e}")))?
                }
            };
            let client_time = start.elapsed();

            let reply = match reply {
                Ok(r) => r,
                Err(e) => {
                    self.record_sample(method, client_time, None, 0, 0, true).await;
                    let mut guard = self.state.lock().await;
                    guard.recorder.staged_reply(Err(&e.to_string()));
                    tracing::error!(error = %e, "operation failed");
                    return Err(e);
                }
            };
            self.finish_intrinsic(method, client_time, reply).await
        }
        .instrument(span)
        .await
    }

    async fn finish_intrinsic(
        &self,
        method: &str,
        client_time: std::time::Duration,
        reply: TransportReply,
    ) -> WbemResult<ReturnValueWithParams> {
        {
            let mut guard = self.state.lock().await;
            guard
                .recorder
                .staged_http_reply(&reply.body, &[("Content-Length".to_string(), reply.reply_len.to_string())]);
        }

        match decode_method_response(&reply.body) {
            Ok(resp) => {
                tracing::debug!("response decoded");
                if let Some((code, description, instances)) = resp.error {
                    self.record_sample(method, client_time, reply.server_time, reply.request_len, reply.reply_len, true)
                        .await;
                    let err = WbemError::Cim { code, description, instances };
                    let mut guard = self.state.lock().await;
                    guard.recorder.staged_reply(Err(&err.to_string()));
                    tracing::error!(error = %err, "operation failed");
                    Err(err)
                } else {
                    self.record_sample(method, client_time, reply.server_time, reply.request_len, reply.reply_len, false)
                        .await;
                    let mut guard = self.state.lock().await;
                    guard.recorder.staged_reply(Ok("ok"));
                    Ok(ReturnValueWithParams {
                        return_value: resp.return_value,
                        output_params: resp.output_params,
                    })
                }
            }
            Err(e) => {
                self.record_sample(method, client_time, reply.server_time, reply.request_len, reply.reply_len, true)
                    .await;
                let mut guard = self.state.lock().await;
                guard.recorder.staged_reply(Err(&e.to_string()));
                tracing::error!(error = %e, "operation failed");
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn record_sample(
        &self,
        method: &str,
        client_time: std::time::Duration,
        server_time: Option<std::time::Duration>,
        request_len: u64,
        reply_len: u64,
        is_exception: bool,
    ) {
        let mut guard = self.state.lock().await;
        guard.stats.record(
            method,
            Sample {
                server_time,
                client_time,
                request_len,
                reply_len,
                is_exception,
            },
        );
    }

    // ---- Intrinsic operations -------------------------------------------------

    /// `GetInstance`.
    pub async fn get_instance(
        &self,
        instance_name: &CIMInstanceName,
        local_only: bool,
        include_qualifiers: bool,
        include_class_origin: bool,
        property_list: Option<&[String]>,
    ) -> WbemResult<CIMInstance> {
        let namespace = self.resolve_namespace(None, instance_name.namespace())?;
        let params = vec![
            IParam::new("InstanceName", ParamValue::InstanceName(instance_name.clone())),
            IParam::new("LocalOnly", ParamValue::Value(CIMScalar::Boolean(local_only))),
            IParam::new(
                "IncludeQualifiers",
                ParamValue::Value(CIMScalar::Boolean(include_qualifiers)),
            ),
            IParam::new(
                "IncludeClassOrigin",
                ParamValue::Value(CIMScalar::Boolean(include_class_origin)),
            ),
            property_list_param(property_list),
        ];
        let result = self.call_intrinsic("GetInstance", &namespace, params).await?;
        match result.return_value {
            Some(ReturnValue::Instances(mut instances)) if !instances.is_empty() => {
                let instance = instances.remove(0);
                // GetInstance replies usually omit a path; the caller already
                // knows it, so attach the resolved one.
                let path = instance_name.clone().with_namespace(namespace.clone());
                Ok(instance.clone().with_path(path).unwrap_or(instance))
            }
            _ => Err(WbemError::model("GetInstance: server did not return an instance")),
        }
    }

    /// `EnumerateInstances`.
    pub async fn enumerate_instances(
        &self,
        classname: &str,
        namespace: Option<&Namespace>,
        deep_inheritance: bool,
        include_qualifiers: bool,
        include_class_origin: bool,
        property_list: Option<&[String]>,
    ) -> WbemResult<Vec<CIMInstance>> {
        let namespace = self.resolve_namespace(namespace, None)?;
        let params = vec![
            IParam::new("ClassName", ParamValue::ClassName(classname.to_string())),
            IParam::new("DeepInheritance", ParamValue::Value(CIMScalar::Boolean(deep_inheritance))),
            IParam::new(
                "IncludeQualifiers",
                ParamValue::Value(CIMScalar::Boolean(include_qualifiers)),
            ),
            IParam::new(
                "IncludeClassOrigin",
                ParamValue::Value(CIMScalar::Boolean(include_class_origin)),
            ),
            property_list_param(property_list),
        ];
        let result = self.call_intrinsic("EnumerateInstances", &namespace, params).await?;
        match result.return_value {
            Some(ReturnValue::Instances(instances)) => Ok(instances),
            None => Ok(Vec::new()),
            _ => Err(WbemError::model("EnumerateInstances: unexpected return shape")),
        }
    }

    /// `EnumerateInstanceNames`.
    pub async fn enumerate_instance_names(
        &self,
        classname: &str,
        namespace: Option<&Namespace>,
    ) -> WbemResult<Vec<CIMInstanceName>> {
        let namespace = self.resolve_namespace(namespace, None)?;
        let params = vec![IParam::new("ClassName", ParamValue::ClassName(classname.to_string()))];
        let result = self
            .call_intrinsic("EnumerateInstanceNames", &namespace, params)
            .await?;
        match result.return_value {
            Some(ReturnValue::InstanceNames(names)) => Ok(names),
            None => Ok(Vec::new()),
            _ => Err(WbemError::model("EnumerateInstanceNames: unexpected return shape")),
        }
    }

    /// `CreateInstance`; returns the path the server assigned.
    pub async fn create_instance(&self, instance: &CIMInstance, namespace: Option<&Namespace>) -> WbemResult<CIMInstanceName> {
        let namespace = self.resolve_namespace(namespace, instance.path().and_then(CIMInstanceName::namespace))?;
        let params = vec![IParam::new("NewInstance", ParamValue::Instance(instance.clone()))];
        let result = self.call_intrinsic("CreateInstance", &namespace, params).await?;
        match result.return_value {
            Some(ReturnValue::InstanceNames(mut names)) if !names.is_empty() => Ok(names.remove(0)),
            _ => Err(WbemError::model("CreateInstance: server did not return a path")),
        }
    }

    /// `ModifyInstance`.
    pub async fn modify_instance(
        &self,
        instance: &CIMInstance,
        include_qualifiers: bool,
        property_list: Option<&[String]>,
    ) -> WbemResult<()> {
        let path_ns = instance.path().and_then(CIMInstanceName::namespace);
        let namespace = self.resolve_namespace(None, path_ns)?;
        let params = vec![
            IParam::new("ModifiedInstance", ParamValue::Instance(instance.clone())),
            IParam::new(
                "IncludeQualifiers",
                ParamValue::Value(CIMScalar::Boolean(include_qualifiers)),
            ),
            property_list_param(property_list),
        ];
        self.call_intrinsic("ModifyInstance", &namespace, params).await?;
        Ok(())
    }

    /// `DeleteInstance`.
    pub async fn delete_instance(&self, instance_name: &CIMInstanceName) -> WbemResult<()> {
        let namespace = self.resolve_namespace(None, instance_name.namespace())?;
        let params = vec![IParam::new(
            "InstanceName",
            ParamValue::InstanceName(instance_name.clone()),
        )];
        self.call_intrinsic("DeleteInstance", &namespace, params).await?;
        Ok(())
    }

    /// `GetClass`.
    pub async fn get_class(&self, classname: &str, namespace: Option<&Namespace>) -> WbemResult<CIMClass> {
        let namespace = self.resolve_namespace(namespace, None)?;
        let params = vec![IParam::new("ClassName", ParamValue::ClassName(classname.to_string()))];
        let result = self.call_intrinsic("GetClass", &namespace, params).await?;
        match result.return_value {
            Some(ReturnValue::Classes(mut classes)) if !classes.is_empty() => Ok(classes.remove(0)),
            _ => Err(WbemError::model("GetClass: server did not return a class")),
        }
    }

    /// `EnumerateClasses`.
    pub async fn enumerate_classes(
        &self,
        classname: Option<&str>,
        namespace: Option<&Namespace>,
        deep_inheritance: bool,
    ) -> WbemResult<Vec<CIMClass>> {
        let namespace = self.resolve_namespace(namespace, None)?;
        let params = vec![
            match classname {
                Some(c) => IParam::new("ClassName", ParamValue::ClassName(c.to_string())),
                None => IParam::absent("ClassName"),
            },
            IParam::new("DeepInheritance", ParamValue::Value(CIMScalar::Boolean(deep_inheritance))),
        ];
        let result = self.call_intrinsic("EnumerateClasses", &namespace, params).await?;
        match result.return_value {
            Some(ReturnValue::Classes(classes)) => Ok(classes),
            None => Ok(Vec::new()),
            _ => Err(WbemError::model("EnumerateClasses: unexpected return shape")),
        }
    }

    /// `Associators`.
    pub async fn associators(
        &self,
        object_name: &CIMInstanceName,
        assoc_class: Option<&str>,
        result_class: Option<&str>,
        role: Option<&str>,
        result_role: Option<&str>,
    ) -> WbemResult<Vec<(CIMInstanceName, CIMInstance)>> {
        self.association_query("Associators", object_name, assoc_class, result_class, role, result_role)
            .await
    }

    /// `References`.
    pub async fn references(
        &self,
        object_name: &CIMInstanceName,
        result_class: Option<&str>,
        role: Option<&str>,
    ) -> WbemResult<Vec<(CIMInstanceName, CIMInstance)>> {
        self.association_query("References", object_name, None, result_class, role, None)
            .await
    }

    /// `AssociatorNames`.
    pub async fn associator_names(
        &self,
        object_name: &CIMInstanceName,
        assoc_class: Option<&str>,
        result_class: Option<&str>,
        role: Option<&str>,
        result_role: Option<&str>,
    ) -> WbemResult<Vec<CIMInstanceName>> {
        let namespace = self.resolve_namespace(None, object_name.namespace())?;
        let params = association_params(object_name, assoc_class, result_class, role, result_role);
        let result = self.call_intrinsic("AssociatorNames", &namespace, params).await?;
        match result.return_value {
            Some(ReturnValue::InstanceNames(names)) => Ok(names),
            None => Ok(Vec::new()),
            _ => Err(WbemError::model("AssociatorNames: unexpected return shape")),
        }
    }

    /// `ReferenceNames`.
    pub async fn reference_names(
        &self,
        object_name: &CIMInstanceName,
        result_class: Option<&str>,
        role: Option<&str>,
    ) -> WbemResult<Vec<CIMInstanceName>> {
        let namespace = self.resolve_namespace(None, object_name.namespace())?;
        let params = association_params(object_name, None, result_class, role, None);
        let result = self.call_intrinsic("ReferenceNames", &namespace, params).await?;
        match result.return_value {
            Some(ReturnValue::InstanceNames(names)) => Ok(names),
            None => Ok(Vec::new()),
            _ => Err(WbemError::model("ReferenceNames: unexpected return shape")),
        }
    }

    async fn association_query(
        &self,
        method: &str,
        object_name: &CIMInstanceName,
        assoc_class: Option<&str>,
        result_class: Option<&str>,
        role: Option<&str>,
        result_role: Option<&str>,
    ) -> WbemResult<Vec<(CIMInstanceName, CIMInstance)>> {
        let namespace = self.resolve_namespace(None, object_name.namespace())?;
        let params = association_params(object_name, assoc_class, result_class, role, result_role);
        let result = self.call_intrinsic(method, &namespace, params).await?;
        match result.return_value {
            Some(ReturnValue::NamedInstances(pairs)) => Ok(pairs),
            None => Ok(Vec::new()),
            _ => Err(WbemError::model(format!("{method}: unexpected return shape"))),
        }
    }

    /// `ExecQuery`.
    pub async fn exec_query(
        &self,
        query_language: &str,
        query: &str,
        namespace: Option<&Namespace>,
    ) -> WbemResult<Vec<CIMInstance>> {
        let namespace = self.resolve_namespace(namespace, None)?;
        let params = vec![
            IParam::new("QueryLanguage", ParamValue::Value(CIMScalar::String(query_language.to_string()))),
            IParam::new("Query", ParamValue::Value(CIMScalar::String(query.to_string()))),
        ];
        let result = self.call_intrinsic("ExecQuery", &namespace, params).await?;
        match result.return_value {
            Some(ReturnValue::Instances(instances)) => Ok(instances),
            None => Ok(Vec::new()),
            _ => Err(WbemError::model("ExecQuery: unexpected return shape")),
        }
    }

    /// `OpenEnumerateInstances`: starts a pull enumeration over instances
    /// of `classname`.
    pub async fn open_enumerate_instances(
        &self,
        classname: &str,
        namespace: Option<&Namespace>,
    ) -> WbemResult<EnumerationBatch> {
        let namespace = self.resolve_namespace(namespace, None)?;
        let params = vec![IParam::new("ClassName", ParamValue::ClassName(classname.to_string()))];
        let result = self.call_intrinsic("OpenEnumerateInstances", &namespace, params).await?;
        self.open_pull_result(result).await
    }

    /// `OpenAssociatorInstances`: starts a pull enumeration over an
    /// association traversal.
    pub async fn open_associator_instances(
        &self,
        object_name: &CIMInstanceName,
        assoc_class: Option<&str>,
        result_class: Option<&str>,
    ) -> WbemResult<EnumerationBatch> {
        let namespace = self.resolve_namespace(None, object_name.namespace())?;
        let params = association_params(object_name, assoc_class, result_class, None, None);
        let result = self
            .call_intrinsic("OpenAssociatorInstances", &namespace, params)
            .await?;
        self.open_pull_result(result).await
    }

    async fn open_pull_result(&self, result: ReturnValueWithParams) -> WbemResult<EnumerationBatch> {
        let end_of_sequence = bool_param(&result.output_params, "EndOfSequence").unwrap_or(true);
        let context = string_param(&result.output_params, "EnumerationContext");
        let instances = match result.return_value {
            Some(ReturnValue::NamedInstances(pairs)) => pairs,
            None => Vec::new(),
            _ => return Err(WbemError::model("Open*: unexpected return shape")),
        };
        let handle = if end_of_sequence {
            None
        } else {
            let ctx = context
                .ok_or_else(|| WbemError::model("Open*: server omitted EnumerationContext for an open enumeration"))?;
            let mut guard = self.state.lock().await;
            let id = guard.next_enumeration_id;
            guard.next_enumeration_id += 1;
            guard.enumerations.insert(id, EnumerationContext::opened(ctx));
            Some(EnumerationHandle(id))
        };
        Ok(EnumerationBatch { instances, end_of_sequence, handle })
    }

    /// `PullInstancesWithPath`. Fails locally, without a transport call,
    /// if `handle`'s context is not open (e.g. already past
    /// `EndOfSequence`).
    pub async fn pull_instances_with_path(
        &self,
        handle: EnumerationHandle,
        namespace: Option<&Namespace>,
        max_object_count: u32,
    ) -> WbemResult<EnumerationBatch> {
        let context = {
            let guard = self.state.lock().await;
            let ctx = guard
                .enumerations
                .get(&handle.0)
                .ok_or_else(|| WbemError::model("unknown enumeration handle"))?;
            if ctx.state() != crate::enumeration::EnumerationState::Open {
                return Err(WbemError::model(format!(
                    "Pull* is only valid on an open enumeration context (current state: {:?})",
                    ctx.state()
                )));
            }
            ctx.context().to_string()
        };

        let namespace = self.resolve_namespace(namespace, None)?;
        let params = vec![
            IParam::new("EnumerationContext", ParamValue::Value(CIMScalar::String(context))),
            IParam::new(
                "MaxObjectCount",
                ParamValue::Value(CIMScalar::Uint32(max_object_count)),
            ),
        ];
        let result = self.call_intrinsic("PullInstancesWithPath", &namespace, params).await?;
        let end_of_sequence = bool_param(&result.output_params, "EndOfSequence").unwrap_or(true);
        let new_context = string_param(&result.output_params, "EnumerationContext");
        let instances = match result.return_value {
            Some(ReturnValue::NamedInstances(pairs)) => pairs,
            None => Vec::new(),
            _ => return Err(WbemError::model("PullInstancesWithPath: unexpected return shape")),
        };

        let mut guard = self.state.lock().await;
        if let Some(ctx) = guard.enumerations.get_mut(&handle.0) {
            ctx.advance(new_context, end_of_sequence)?;
        }
        drop(guard);

        Ok(EnumerationBatch {
            instances,
            end_of_sequence,
            handle: if end_of_sequence { None } else { Some(handle) },
        })
    }

    /// `CloseEnumeration`. Fails locally if the handle is already closed.
    pub async fn close_enumeration(&self, handle: EnumerationHandle, namespace: Option<&Namespace>) -> WbemResult<()> {
        let context = {
            let mut guard = self.state.lock().await;
            let ctx = guard
                .enumerations
                .get_mut(&handle.0)
                .ok_or_else(|| WbemError::model("unknown enumeration handle"))?;
            let context = ctx.context().to_string();
            ctx.close()?;
            context
        };
        let namespace = self.resolve_namespace(namespace, None)?;
        let params = vec![IParam::new(
            "EnumerationContext",
            ParamValue::Value(CIMScalar::String(context)),
        )];
        self.call_intrinsic("CloseEnumeration", &namespace, params).await?;
        Ok(())
    }

    /// Invoke an extrinsic (CIM-schema-defined) method on `instance_path`
    /// with the given in-parameters, returning the method's return value
    /// plus output parameters.
    pub async fn invoke_method(
        &self,
        instance_path: &CIMInstanceName,
        method_name: &str,
        in_params: &[(String, CIMValue)],
    ) -> WbemResult<MethodResult> {
        let namespace = self.resolve_namespace(None, instance_path.namespace())?;
        let mut guard = self.state.lock().await;
        let message_id = guard.message_id.to_string();
        guard.message_id += 1;
        drop(guard);

        let span = tracing::info_span!(
            "cim_operation",
            method = %method_name,
            namespace = %namespace.as_str(),
            message_id = %message_id,
        );
        async move {
            tracing::debug!("request issued");
            let body =
                encode_method_call_on_instance(&message_id, method_name, &namespace, instance_path, in_params)?;
            let http = self.http.clone();
            let config = self.config.clone();
            let method_owned = method_name.to_string();
            let cim_object = instance_path.to_string();
            let start = Instant::now();
            let reply = tokio::task::spawn_blocking(move || {
                transport::send(&http, &config, &method_owned, &cim_object, body)
            })
            .await
            .map_err(|e| WbemError::Connection(format!("transport task panicked: {e}")))??;
            let client_time = start.elapsed();

            let result = self.finish_intrinsic(method_name, client_time, reply).await?;
            Ok(MethodResult {
                return_value: result.return_value.and_then(|rv| match rv {
                    ReturnValue::Values(mut values) if !values.is_empty() => Some(values.remove(0)),
                    _ => None,
                }),
                output_params: result.output_params,
            })
        }
        .instrument(span)
        .await
    }
}

struct ReturnValueWithParams {
    return_value: Option<ReturnValue>,
    output_params: crate::nocase::NocaseMap<CIMValue>,
}

fn property_list_param(list: Option<&[String]>) -> IParam {
    match list {
        Some(items) => IParam::new(
            "PropertyList",
            ParamValue::ValueArray(items.iter().map(|s| CIMScalar::String(s.clone())).collect()),
        ),
        None => IParam::absent("PropertyList"),
    }
}

fn association_params(
    object_name: &CIMInstanceName,
    assoc_class: Option<&str>,
    result_class: Option<&str>,
    role: Option<&str>,
    result_role: Option<&str>,
) -> Vec<IParam> {
    vec![
        IParam::new("ObjectName", ParamValue::InstanceName(object_name.clone())),
        match assoc_class {
            Some(c) => IParam::new("AssocClass", ParamValue::ClassName(c.to_string())),
            None => IParam::absent("AssocClass"),
        },
        match result_class {
            Some(c) => IParam::new("ResultClass", ParamValue::ClassName(c.to_string())),
            None => IParam::absent("ResultClass"),
        },
        match role {
            Some(r) => IParam::new("Role", ParamValue::Value(CIMScalar::String(r.to_string()))),
            None => IParam::absent("Role"),
        },
        match result_role {
            Some(r) => IParam::new("ResultRole", ParamValue::Value(CIMScalar::String(r.to_string()))),
            None => IParam::absent("ResultRole"),
        },
    ]
}

fn bool_param(params: &crate::nocase::NocaseMap<CIMValue>, name: &str) -> Option<bool> {
    match params.get(name) {
        Some(CIMValue::Scalar(CIMScalar::Boolean(b))) => Some(*b),
        _ => None,
    }
}

fn string_param(params: &crate::nocase::NocaseMap<CIMValue>, name: &str) -> Option<String> {
    match params.get(name) {
        Some(CIMValue::Scalar(CIMScalar::String(s))) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn association_params_omit_unset_optional_fields() {
        let object = CIMInstanceName::new("PyWBEM_Person");
        let params = association_params(&object, None, Some("PyWBEM_Knows"), None, None);
        assert!(params.iter().any(|p| p.name == "AssocClass" && p.value.is_none()));
        assert!(params.iter().any(|p| p.name == "ResultClass" && p.value.is_some()));
    }
}
