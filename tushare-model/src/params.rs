//! Declarative parameter specs
//!
//! Every endpoint declares its accepted options as a static
//! list of [`ParamSpec`], checked by the single [`validate`]
//! function before anything is sent.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// predicate over a supplied option value
///
/// must be total: values of an unexpected type yield false
pub type Validator = fn(&Value) -> bool;

/// describes one accepted option of an endpoint
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
    /// declared default, only substituted by [`apply_defaults`]
    pub default: Option<&'static str>,
    pub description: &'static str,
    pub validator: Option<Validator>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        ParamSpec {
            name,
            required: true,
            default: None,
            description,
            validator: None,
        }
    }

    pub const fn optional(name: &'static str, description: &'static str) -> Self {
        ParamSpec {
            name,
            required: false,
            default: None,
            description,
            validator: None,
        }
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// check options against the spec list, in declaration order
///
/// null entries count as absent. The first violation is returned.
pub fn validate(specs: &[ParamSpec], options: &Map<String, Value>) -> Result<()> {
    for spec in specs {
        let value = options.get(spec.name).filter(|v| !v.is_null());
        match value {
            None if spec.required => {
                return Err(Error::validation(format!(
                    "parameter {} is required",
                    spec.name
                )));
            }
            None => {}
            Some(v) => {
                if let Some(validator) = spec.validator {
                    if !validator(v) {
                        return Err(Error::validation(format!(
                            "parameter {} failed validation: {}",
                            spec.name, v
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

/// fill absent options from declared defaults
///
/// Never called by the clients; callers opt in explicitly.
pub fn apply_defaults(specs: &[ParamSpec], options: &mut Map<String, Value>) {
    for spec in specs {
        if let Some(default) = spec.default {
            let absent = options.get(spec.name).map_or(true, Value::is_null);
            if absent {
                options.insert(spec.name.to_owned(), Value::String(default.to_owned()));
            }
        }
    }
}

static TRADE_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}$").expect("static regex should compile"));
static DATETIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}( \d{2}:\d{2}:\d{2})?$").expect("static regex should compile"));
static TS_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{6}\.(SH|SZ|BJ)|[A-Z]+\.[A-Z]+)$").expect("static regex should compile"));
static A_SHARE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}\.(SH|SZ)$").expect("static regex should compile"));
static FREQ: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(D|W|M|\d+min)$").expect("static regex should compile"));

fn str_matches(value: &Value, re: &Regex) -> bool {
    value.as_str().map_or(false, |s| re.is_match(s))
}

fn str_in(value: &Value, allowed: &[&str]) -> bool {
    value.as_str().map_or(false, |s| allowed.contains(&s))
}

/// 8 digit date, e.g. 20240101
pub fn is_trade_date(value: &Value) -> bool {
    str_matches(value, &TRADE_DATE)
}

/// 8 digit date, or `YYYY-MM-DD` with an optional `HH:MM:SS` part
pub fn is_datetime(value: &Value) -> bool {
    str_matches(value, &TRADE_DATE) || str_matches(value, &DATETIME)
}

/// single security code, e.g. 600519.SH
pub fn is_ts_code(value: &Value) -> bool {
    str_matches(value, &TS_CODE)
}

/// comma separated list of Shanghai/Shenzhen stock codes
pub fn is_ts_code_list(value: &Value) -> bool {
    match value.as_str() {
        Some(s) if !s.is_empty() => s.split(',').all(|c| A_SHARE_CODE.is_match(c.trim())),
        _ => false,
    }
}

pub fn is_freq(value: &Value) -> bool {
    str_matches(value, &FREQ)
}

pub fn is_asset(value: &Value) -> bool {
    str_in(value, &["E", "I", "C", "FT", "FD", "O", "CB"])
}

pub fn is_adj(value: &Value) -> bool {
    str_in(value, &["qfq", "hfq"])
}

pub fn is_list_status(value: &Value) -> bool {
    str_in(value, &["L", "D", "P"])
}

pub fn is_hs(value: &Value) -> bool {
    str_in(value, &["N", "H", "S"])
}

pub fn is_exchange(value: &Value) -> bool {
    str_in(value, &["SSE", "SZSE", "BSE"])
}

/// array of positive integers
pub fn is_ma_list(value: &Value) -> bool {
    value.as_array().map_or(false, |arr| {
        arr.iter().all(|n| n.as_u64().map_or(false, |n| n > 0))
    })
}

/// array of `tor` / `vr`
pub fn is_factor_list(value: &Value) -> bool {
    value
        .as_array()
        .map_or(false, |arr| arr.iter().all(|f| str_in(f, &["tor", "vr"])))
}
