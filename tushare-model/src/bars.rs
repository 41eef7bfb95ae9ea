//! Bar endpoints
//!
//! `pro_bar` and the kline family resolve the provider api from
//! static tables instead of branching on the options.

use crate::endpoint::{options_of, Endpoint};
use crate::envelope::join_fields;
use crate::params::*;
use crate::{Error, Result};
use serde_derive::*;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// 资产类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetType {
    /// 股票
    #[serde(rename = "E")]
    Stock,
    /// 沪深指数
    #[serde(rename = "I")]
    Index,
    /// 数字货币
    #[serde(rename = "C")]
    Crypto,
    /// 期货
    #[serde(rename = "FT")]
    Future,
    /// 基金
    #[serde(rename = "FD")]
    Fund,
    /// 期权
    #[serde(rename = "O")]
    Options,
    /// 可转债
    #[serde(rename = "CB")]
    Convertible,
}

impl Default for AssetType {
    fn default() -> Self {
        AssetType::Stock
    }
}

/// 复权类型，不设置时为不复权
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustType {
    /// 前复权
    #[serde(rename = "qfq")]
    Forward,
    /// 后复权
    #[serde(rename = "hfq")]
    Backward,
}

/// 数据频度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Freq {
    #[serde(rename = "1min")]
    Min1,
    #[serde(rename = "5min")]
    Min5,
    #[serde(rename = "15min")]
    Min15,
    #[serde(rename = "30min")]
    Min30,
    #[serde(rename = "60min")]
    Min60,
    #[serde(rename = "D")]
    Daily,
    #[serde(rename = "W")]
    Weekly,
    #[serde(rename = "M")]
    Monthly,
}

impl Default for Freq {
    fn default() -> Self {
        Freq::Daily
    }
}

/// grouping of frequencies used to pick the provider api
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreqClass {
    Daily,
    Weekly,
    Monthly,
    Minute,
}

impl Freq {
    pub fn as_str(&self) -> &'static str {
        match self {
            Freq::Min1 => "1min",
            Freq::Min5 => "5min",
            Freq::Min15 => "15min",
            Freq::Min30 => "30min",
            Freq::Min60 => "60min",
            Freq::Daily => "D",
            Freq::Weekly => "W",
            Freq::Monthly => "M",
        }
    }

    pub fn class(&self) -> FreqClass {
        match self {
            Freq::Daily => FreqClass::Daily,
            Freq::Weekly => FreqClass::Weekly,
            Freq::Monthly => FreqClass::Monthly,
            _ => FreqClass::Minute,
        }
    }
}

/// 股票因子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Factor {
    /// 换手率
    #[serde(rename = "tor")]
    TurnoverRate,
    /// 量比
    #[serde(rename = "vr")]
    VolumeRatio,
}

impl Factor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::TurnoverRate => "tor",
            Factor::VolumeRatio => "vr",
        }
    }
}

/// (asset, frequency class) to provider api, `None` matches any frequency
static PRO_BAR_ROUTES: &[(AssetType, Option<FreqClass>, &str)] = &[
    (AssetType::Stock, Some(FreqClass::Daily), "daily"),
    (AssetType::Stock, Some(FreqClass::Weekly), "weekly"),
    (AssetType::Stock, Some(FreqClass::Monthly), "monthly"),
    (AssetType::Stock, Some(FreqClass::Minute), "stk_mins"),
    (AssetType::Index, Some(FreqClass::Daily), "index_daily"),
    (AssetType::Index, Some(FreqClass::Weekly), "index_weekly"),
    (AssetType::Index, Some(FreqClass::Monthly), "index_monthly"),
    (AssetType::Index, Some(FreqClass::Minute), "index_mins"),
    // no weekly or monthly apis, every non daily bar goes to the minute api with `freq`
    (AssetType::Future, Some(FreqClass::Daily), "fut_daily"),
    (AssetType::Future, None, "fut_mins"),
    (AssetType::Fund, Some(FreqClass::Daily), "fund_daily"),
    (AssetType::Fund, None, "fund_mins"),
    (AssetType::Options, None, "opt_daily"),
    (AssetType::Convertible, None, "cb_daily"),
];

/// provider api serving bars of `asset` at `freq`
pub fn route(asset: AssetType, freq: Freq) -> Result<&'static str> {
    let class = freq.class();
    PRO_BAR_ROUTES
        .iter()
        .find(|(a, c, _)| *a == asset && c.map_or(true, |c| c == class))
        .map(|(_, _, api)| *api)
        .ok_or_else(|| {
            Error::validation(format!(
                "unsupported asset/freq combination: {:?}/{}",
                asset,
                freq.as_str()
            ))
        })
}

/// 通用行情
pub static PRO_BAR_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("ts_code", "证券代码").validator(is_ts_code),
    ParamSpec::optional("start_date", "开始日期").validator(is_datetime),
    ParamSpec::optional("end_date", "结束日期").validator(is_datetime),
    ParamSpec::required("asset", "资产类别：E股票 I沪深指数 C数字货币 FT期货 FD基金 O期权 CB可转债")
        .default_value("E")
        .validator(is_asset),
    ParamSpec::optional("adj", "复权类型(只针对股票)：qfq前复权 hfq后复权").validator(is_adj),
    ParamSpec::required("freq", "数据频度：支持分钟(min)/日(D)/周(W)/月(M)K线")
        .default_value("D")
        .validator(is_freq),
    ParamSpec::optional("ma", "均线，支持任意合理int数值").validator(is_ma_list),
    ParamSpec::optional("factors", "股票因子，支持 tor换手率 vr量比").validator(is_factor_list),
    ParamSpec::optional("adjfactor", "复权因子，为true时返回的数据中带复权因子"),
];

pub const PRO_BAR_FIELDS: &[&str] = &[
    "ts_code", "trade_date", "open", "high", "low", "close", "pre_close", "change", "pct_chg",
    "vol", "amount",
];

/// 通用行情接口，整合股票、指数、期货、基金、期权、可转债的行情
///
/// `asset` 和 `freq` 必须给出，[`GetProBar::new`] 设置为股票日线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProBar {
    pub ts_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub asset: AssetType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adj: Option<AdjustType>,
    pub freq: Freq,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factors: Option<Vec<Factor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjfactor: Option<bool>,
    #[serde(skip_serializing)]
    pub fields: Option<Vec<String>>,
}

impl GetProBar {
    pub fn new<S: Into<String>>(ts_code: S) -> Self {
        GetProBar {
            ts_code: ts_code.into(),
            start_date: None,
            end_date: None,
            asset: AssetType::default(),
            adj: None,
            freq: Freq::default(),
            ma: None,
            factors: None,
            adjfactor: None,
            fields: None,
        }
    }
}

impl Endpoint for GetProBar {
    type Row = ProBar;

    fn api_name(&self) -> Result<Cow<'static, str>> {
        route(self.asset, self.freq).map(Cow::Borrowed)
    }

    fn param_specs(&self) -> &'static [ParamSpec] {
        PRO_BAR_PARAMS
    }

    fn default_fields(&self) -> &'static [&'static str] {
        PRO_BAR_FIELDS
    }

    fn requested_fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    fn options(&self) -> Result<Map<String, Value>> {
        options_of(self)
    }

    /// default fields grow with the requested moving averages and factors
    fn fields(&self) -> String {
        if let Some(fields) = self.requested_fields().filter(|f| !f.is_empty()) {
            return join_fields(fields);
        }
        let mut fields: Vec<String> = PRO_BAR_FIELDS.iter().map(|f| (*f).to_owned()).collect();
        if self.freq.class() == FreqClass::Minute {
            fields[1] = "trade_time".to_owned();
        }
        for n in self.ma.iter().flatten() {
            fields.push(format!("ma_{}", n));
        }
        for f in self.factors.iter().flatten() {
            fields.push(f.as_str().to_owned());
        }
        if self.adjfactor == Some(true) {
            fields.push("adj_factor".to_owned());
        }
        join_fields(&fields)
    }

    fn to_params(&self, _options: Map<String, Value>) -> Result<Map<String, Value>> {
        let mut params = Map::new();
        params.insert("ts_code".to_owned(), Value::from(self.ts_code.as_str()));
        if let Some(ref start_date) = self.start_date {
            params.insert("start_date".to_owned(), Value::from(start_date.as_str()));
        }
        if let Some(ref end_date) = self.end_date {
            params.insert("end_date".to_owned(), Value::from(end_date.as_str()));
        }
        params.insert("freq".to_owned(), Value::from(self.freq.as_str()));
        if self.asset == AssetType::Stock {
            if let Some(adj) = self.adj {
                params.insert("adj".to_owned(), serde_json::to_value(adj)?);
            }
        }
        if let Some(ref ma) = self.ma {
            let ma: Vec<String> = ma.iter().map(u32::to_string).collect();
            params.insert("ma".to_owned(), Value::from(ma.join(",")));
        }
        if let Some(ref factors) = self.factors {
            let factors: Vec<&str> = factors.iter().map(Factor::as_str).collect();
            params.insert("factors".to_owned(), Value::from(factors.join(",")));
        }
        if let Some(adjfactor) = self.adjfactor {
            params.insert("adjfactor".to_owned(), Value::from(adjfactor));
        }
        Ok(params)
    }
}

/// 通用行情
/// 均线列 (ma_5, ma_v_5 ...) 保留在 extra 中
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProBar {
    pub ts_code: String,
    pub trade_date: Option<String>,
    pub trade_time: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub pre_close: Option<f64>,
    pub change: Option<f64>,
    pub pct_chg: Option<f64>,
    pub vol: Option<f64>,
    pub amount: Option<f64>,
    pub tor: Option<f64>,
    pub vr: Option<f64>,
    pub adj_factor: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProBar {
    /// moving average of close over `n` bars
    pub fn ma(&self, n: u32) -> Option<f64> {
        self.extra.get(&format!("ma_{}", n)).and_then(Value::as_f64)
    }
}

/// K线周期
///
/// variant order matches the kline table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Min1,
    Min5,
    Min15,
    Min30,
    Min60,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

const DAY_BAR_FIELDS: &[&str] = &[
    "ts_code", "trade_date", "open", "high", "low", "close", "pre_close", "change", "pct_chg",
    "vol", "amount",
];

const MINUTE_BAR_FIELDS: &[&str] = &[
    "ts_code", "trade_time", "open", "high", "low", "close", "vol", "amount",
];

pub static KLINE_DAY_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("ts_code", "股票代码").validator(is_ts_code),
    ParamSpec::optional("trade_date", "交易日期（YYYYMMDD）").validator(is_trade_date),
    ParamSpec::optional("start_date", "开始日期(YYYYMMDD)").validator(is_trade_date),
    ParamSpec::optional("end_date", "结束日期(YYYYMMDD)").validator(is_trade_date),
];

pub static KLINE_MINUTE_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("ts_code", "股票代码").validator(is_ts_code),
    ParamSpec::optional("trade_date", "交易日期（YYYYMMDD）").validator(is_trade_date),
    ParamSpec::optional("start_date", "开始时间").validator(is_datetime),
    ParamSpec::optional("end_date", "结束时间").validator(is_datetime),
];

/// one row of the kline table
#[derive(Debug)]
pub struct KlineConfig {
    pub period: Period,
    pub api_name: &'static str,
    pub freq: Option<&'static str>,
    pub default_fields: &'static [&'static str],
    pub params: &'static [ParamSpec],
}

static KLINE_TABLE: &[KlineConfig] = &[
    KlineConfig { period: Period::Min1, api_name: "stk_mins", freq: Some("1min"), default_fields: MINUTE_BAR_FIELDS, params: KLINE_MINUTE_PARAMS },
    KlineConfig { period: Period::Min5, api_name: "stk_mins", freq: Some("5min"), default_fields: MINUTE_BAR_FIELDS, params: KLINE_MINUTE_PARAMS },
    KlineConfig { period: Period::Min15, api_name: "stk_mins", freq: Some("15min"), default_fields: MINUTE_BAR_FIELDS, params: KLINE_MINUTE_PARAMS },
    KlineConfig { period: Period::Min30, api_name: "stk_mins", freq: Some("30min"), default_fields: MINUTE_BAR_FIELDS, params: KLINE_MINUTE_PARAMS },
    KlineConfig { period: Period::Min60, api_name: "stk_mins", freq: Some("60min"), default_fields: MINUTE_BAR_FIELDS, params: KLINE_MINUTE_PARAMS },
    KlineConfig { period: Period::Daily, api_name: "daily", freq: None, default_fields: DAY_BAR_FIELDS, params: KLINE_DAY_PARAMS },
    KlineConfig { period: Period::Weekly, api_name: "weekly", freq: None, default_fields: DAY_BAR_FIELDS, params: KLINE_DAY_PARAMS },
    KlineConfig { period: Period::Monthly, api_name: "monthly", freq: None, default_fields: DAY_BAR_FIELDS, params: KLINE_DAY_PARAMS },
    KlineConfig { period: Period::Yearly, api_name: "yearly", freq: None, default_fields: DAY_BAR_FIELDS, params: KLINE_DAY_PARAMS },
];

impl Default for Period {
    fn default() -> Self {
        Period::Daily
    }
}

impl Period {
    pub fn config(&self) -> &'static KlineConfig {
        &KLINE_TABLE[*self as usize]
    }

    /// minute period of a minute frequency
    pub fn minutes(freq: Freq) -> Result<Period> {
        match freq {
            Freq::Min1 => Ok(Period::Min1),
            Freq::Min5 => Ok(Period::Min5),
            Freq::Min15 => Ok(Period::Min15),
            Freq::Min30 => Ok(Period::Min30),
            Freq::Min60 => Ok(Period::Min60),
            other => Err(Error::validation(format!(
                "{} is not a minute frequency",
                other.as_str()
            ))),
        }
    }
}

/// 获取K线数据
///
/// 分钟线可以只给交易日期，也可以给出 `YYYY-MM-DD HH:MM:SS` 形式的时间区间
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetKline {
    #[serde(skip)]
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing)]
    pub fields: Option<Vec<String>>,
}

impl GetKline {
    pub fn new(period: Period) -> Self {
        GetKline {
            period,
            ts_code: None,
            trade_date: None,
            start_date: None,
            end_date: None,
            fields: None,
        }
    }

    pub fn ts_code<S: Into<String>>(mut self, ts_code: S) -> Self {
        self.ts_code = Some(ts_code.into());
        self
    }

    pub fn trade_date<S: Into<String>>(mut self, trade_date: S) -> Self {
        self.trade_date = Some(trade_date.into());
        self
    }

    pub fn range<S: Into<String>>(mut self, start_date: S, end_date: S) -> Self {
        self.start_date = Some(start_date.into());
        self.end_date = Some(end_date.into());
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    fn config(&self) -> &'static KlineConfig {
        self.period.config()
    }
}

impl Endpoint for GetKline {
    type Row = KlineBar;

    fn api_name(&self) -> Result<Cow<'static, str>> {
        Ok(Cow::Borrowed(self.config().api_name))
    }

    fn param_specs(&self) -> &'static [ParamSpec] {
        self.config().params
    }

    fn default_fields(&self) -> &'static [&'static str] {
        self.config().default_fields
    }

    fn requested_fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    fn options(&self) -> Result<Map<String, Value>> {
        options_of(self)
    }

    fn to_params(&self, mut options: Map<String, Value>) -> Result<Map<String, Value>> {
        if let Some(freq) = self.config().freq {
            options.insert("freq".to_owned(), Value::from(freq));
        }
        Ok(options)
    }
}

/// K线，日线及以上周期带 trade_date，分钟线带 trade_time
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KlineBar {
    pub ts_code: String,
    pub trade_date: Option<String>,
    pub trade_time: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub pre_close: Option<f64>,
    pub change: Option<f64>,
    pub pct_chg: Option<f64>,
    pub vol: Option<f64>,
    pub amount: Option<f64>,
}
