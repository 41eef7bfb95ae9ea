//! Wire envelopes and columnar decoding
//!
//! Every Tushare call posts the same envelope and receives
//! a table encoded as one field list plus one value array per row.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_derive::*;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::fmt;

/// production endpoint of Tushare Pro
pub const DEFAULT_BASE_URL: &str = "http://api.tushare.pro";

/// one decoded row, keeps the column order of the response
pub type Row = Map<String, Value>;

/// Request
///
/// generic request envelope for all Tushare APIs
#[derive(Serialize)]
pub struct Request<'a> {
    pub api_name: &'a str,
    pub token: &'a str,
    pub params: &'a Map<String, Value>,
    pub fields: &'a str,
}

impl<'a> fmt::Debug for Request<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Request")
            .field("api_name", &self.api_name)
            .field("token", &"[REDACTED]")
            .field("params", &self.params)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Response
///
/// `msg` and `data` are null when the call failed
#[derive(Debug, Deserialize)]
pub struct Response {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl Response {
    /// unwrap the payload, failing on a non-zero code
    pub fn into_data(self) -> Result<ResponseData> {
        if self.code != 0 {
            return Err(Error::Api {
                code: self.code,
                msg: self.msg.unwrap_or_default(),
            });
        }
        match self.data {
            None | Some(Value::Null) => Ok(ResponseData::default()),
            Some(data) => Ok(serde_json::from_value(data)?),
        }
    }
}

/// columnar payload
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    pub fields: Vec<String>,
    pub items: Vec<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

/// parse a response body and unwrap its payload
pub fn consume_body(body: &[u8]) -> Result<ResponseData> {
    let response: Response = serde_json::from_slice(body)?;
    response.into_data()
}

/// join a field list the way the envelope expects it
pub fn join_fields<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}

/// allow-list of fields coerced to floating point on decode
///
/// Matches exact names and name prefixes. Fields not matched are
/// copied through untouched.
#[derive(Debug, Clone, Default)]
pub struct NumericFields {
    names: HashSet<String>,
    prefixes: Vec<String>,
}

const STANDARD_NUMERIC: &[&str] = &[
    "open", "high", "low", "close", "pre_close", "change", "pct_chg", "pct_change", "vol",
    "amount", "adj_factor", "tor", "vr", "turnover_rate", "turnover_rate_f", "volume_ratio",
    "pe", "pe_ttm", "pb", "ps", "ps_ttm", "dv_ratio", "dv_ttm", "total_share", "float_share",
    "free_share", "total_mv", "circ_mv", "open_hfq", "open_qfq", "close_hfq", "close_qfq",
    "high_hfq", "high_qfq", "low_hfq", "low_qfq", "pre_close_hfq", "pre_close_qfq", "macd_dif",
    "macd_dea", "macd", "kdj_k", "kdj_d", "kdj_j", "rsi_6", "rsi_12", "rsi_24", "boll_upper",
    "boll_mid", "boll_lower", "cci", "oi", "settle", "pre_settle", "updays", "downdays",
    "topdays", "lowdays",
];

impl NumericFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// numeric columns of every bundled endpoint, plus moving averages
    pub fn standard() -> Self {
        NumericFields::new()
            .with_fields(STANDARD_NUMERIC.iter().copied())
            .with_prefix("ma_")
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.names.contains(field) || self.prefixes.iter().any(|p| field.starts_with(p.as_str()))
    }
}

/// coerce a raw value to a JSON float
///
/// anything that is not a number or a numeric string becomes null
fn to_float(value: Value) -> Value {
    let f = match value {
        Value::Number(ref n) => n.as_f64(),
        Value::String(ref s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    f.and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// zip every item with the field list
///
/// Either all rows decode or the whole payload is rejected.
pub fn decode_rows(data: ResponseData, numeric: &NumericFields) -> Result<Vec<Row>> {
    let ResponseData { fields, items, .. } = data;
    let coerce: Vec<bool> = fields.iter().map(|f| numeric.contains(f)).collect();
    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        if item.len() != fields.len() {
            return Err(Error::Decode(format!(
                "item {} has {} values, expected {}",
                idx,
                item.len(),
                fields.len()
            )));
        }
        let mut row = Row::with_capacity(fields.len());
        for ((field, value), numeric) in fields.iter().zip(item).zip(&coerce) {
            let value = if *numeric { to_float(value) } else { value };
            row.insert(field.clone(), value);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// convert decoded rows into typed records
pub fn into_typed<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    let mut rs = Vec::with_capacity(rows.len());
    for row in rows {
        let r: T = serde_json::from_value(Value::Object(row))?;
        rs.push(r);
    }
    Ok(rs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(v: Value) -> ResponseData {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_request_serialization() {
        let params = match json!({"ts_code": "600519.SH"}) {
            Value::Object(obj) => obj,
            _ => unreachable!(),
        };
        let req = Request {
            api_name: "daily",
            token: "abc",
            params: &params,
            fields: "ts_code,close",
        };
        assert_eq!(
            json!({
                "api_name": "daily",
                "token": "abc",
                "params": {"ts_code": "600519.SH"},
                "fields": "ts_code,close",
            }),
            serde_json::to_value(&req).unwrap()
        );
        assert!(!format!("{:?}", req).contains("abc"));
    }

    #[test]
    fn test_decode_single_row() {
        let data = data(json!({
            "fields": ["ts_code", "trade_date", "close"],
            "items": [["600519.SH", "20240101", "1680.5"]],
        }));
        let rows = decode_rows(data, &NumericFields::standard()).unwrap();
        assert_eq!(1, rows.len());
        assert_eq!(
            json!({"ts_code": "600519.SH", "trade_date": "20240101", "close": 1680.5}),
            Value::Object(rows[0].clone())
        );
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(vec!["ts_code", "trade_date", "close"], keys);
    }

    #[test]
    fn test_decode_keeps_unknown_fields() {
        let data = data(json!({
            "fields": ["ts_code", "industry", "vol", "ma_5"],
            "items": [["000001.SZ", "银行", 1024, "10.25"], ["000002.SZ", null, null, "n/a"]],
        }));
        let rows = decode_rows(data, &NumericFields::standard()).unwrap();
        assert_eq!(json!("银行"), rows[0]["industry"]);
        assert_eq!(json!(1024.0), rows[0]["vol"]);
        assert_eq!(json!(10.25), rows[0]["ma_5"]);
        assert_eq!(Value::Null, rows[1]["industry"]);
        assert_eq!(Value::Null, rows[1]["vol"]);
        assert_eq!(Value::Null, rows[1]["ma_5"]);
    }

    #[test]
    fn test_decode_empty_allow_list() {
        let data = data(json!({"fields": ["close"], "items": [["1.5"]]}));
        let rows = decode_rows(data, &NumericFields::new()).unwrap();
        assert_eq!(json!("1.5"), rows[0]["close"]);
    }

    #[test]
    fn test_decode_rejects_ragged_items() {
        let data = data(json!({
            "fields": ["ts_code", "close"],
            "items": [["600519.SH", 1.0], ["600519.SH"]],
        }));
        match decode_rows(data, &NumericFields::standard()) {
            Err(Error::Decode(msg)) => assert!(msg.contains("item 1")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_api_error_ignores_data() {
        let body = br#"{"code": -1, "msg": "invalid token", "data": {"fields": ["a"], "items": [[1]]}}"#;
        match consume_body(body) {
            Err(Error::Api { code, msg }) => {
                assert_eq!(-1, code);
                assert_eq!("invalid token", msg);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_api_error_with_malformed_data() {
        for body in &[
            &br#"{"code": -1, "msg": "invalid token", "data": {}}"#[..],
            &br#"{"code": -1, "msg": "invalid token", "data": ""}"#[..],
            &br#"{"code": -1, "msg": "invalid token", "data": {"fields": ["a"], "items": "x"}}"#[..],
        ] {
            match consume_body(body) {
                Err(Error::Api { code, msg }) => {
                    assert_eq!(-1, code);
                    assert_eq!("invalid token", msg);
                }
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    #[test]
    fn test_malformed_data_on_success() {
        let body = br#"{"code": 0, "msg": "", "data": {"fields": ["a"], "items": "x"}}"#;
        assert!(matches!(consume_body(body), Err(Error::Json(_))));
    }

    #[test]
    fn test_null_data_on_success() {
        let body = br#"{"code": 0, "msg": "", "data": null, "request_id": "x"}"#;
        assert_eq!(ResponseData::default(), consume_body(body).unwrap());
    }

    #[test]
    fn test_numeric_fields() {
        let numeric = NumericFields::new().with_fields(vec!["close"]).with_prefix("ema_");
        assert!(numeric.contains("close"));
        assert!(numeric.contains("ema_qfq_5"));
        assert!(!numeric.contains("trade_date"));
        assert_eq!("a,b,c", join_fields(&["a", "b", "c"]));
    }
}
