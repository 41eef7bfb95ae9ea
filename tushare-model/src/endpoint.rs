use crate::envelope::join_fields;
use crate::params::{validate, ParamSpec};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Endpoint
///
/// Adapter between caller options and one provider operation.
/// Most endpoints derive it with `#[derive(Endpoint)]`, endpoints
/// that pick the provider api at runtime implement it by hand.
pub trait Endpoint {
    type Row: DeserializeOwned;

    /// provider `api_name`, may depend on the options
    fn api_name(&self) -> Result<Cow<'static, str>>;

    fn param_specs(&self) -> &'static [ParamSpec];

    fn default_fields(&self) -> &'static [&'static str];

    /// fields chosen by the caller, if any
    fn requested_fields(&self) -> Option<&[String]> {
        None
    }

    /// options keyed by parameter name, as checked by the validator
    fn options(&self) -> Result<Map<String, Value>>;

    /// endpoint level rule, run after the per-parameter checks
    fn check(&self, _options: &Map<String, Value>) -> Result<()> {
        Ok(())
    }

    /// rename or fold options into provider parameters
    fn to_params(&self, options: Map<String, Value>) -> Result<Map<String, Value>> {
        Ok(options)
    }

    /// comma joined field list sent in the envelope
    fn fields(&self) -> String {
        match self.requested_fields() {
            Some(fields) if !fields.is_empty() => join_fields(fields),
            _ => join_fields(self.default_fields()),
        }
    }
}

/// everything needed to build one request envelope
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall {
    pub api_name: String,
    pub params: Map<String, Value>,
    pub fields: String,
}

/// validate the endpoint's options and build its call
///
/// nothing is sent, failures here are always validation errors
pub fn prepare<E: Endpoint + ?Sized>(endpoint: &E) -> Result<PreparedCall> {
    let options = endpoint.options()?;
    validate(endpoint.param_specs(), &options)?;
    endpoint.check(&options)?;
    let api_name = endpoint.api_name()?;
    if api_name.is_empty() {
        return Err(Error::validation("api_name must not be empty"));
    }
    let fields = endpoint.fields();
    let params = endpoint.to_params(options)?;
    Ok(PreparedCall {
        api_name: api_name.into_owned(),
        params,
        fields,
    })
}

/// serialize an option struct into a name keyed map
pub fn options_of<T: Serialize + ?Sized>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(obj) => Ok(obj),
        Value::Null => Ok(Map::new()),
        other => Err(Error::Client(format!("unexpected json value: {}", other))),
    }
}

/// require at least one of the named options
pub(crate) fn require_any(options: &Map<String, Value>, names: &[&str]) -> Result<()> {
    let given = names
        .iter()
        .any(|n| options.get(*n).map_or(false, |v| !v.is_null()));
    if given {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "at least one of {} is required",
            names.join(", ")
        )))
    }
}
