use crate::endpoint::require_any;
use crate::params::*;
use crate::Result;
use serde_derive::*;
use serde_json::{Map, Value};
use tushare_derive::*;

/// 股票列表
pub static STOCK_BASIC_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("ts_code", "TS股票代码").validator(is_ts_code),
    ParamSpec::optional("name", "股票名称"),
    ParamSpec::optional("exchange", "交易所代码 SSE上交所 SZSE深交所 BSE北交所")
        .validator(is_exchange),
    ParamSpec::optional("market", "市场类别 主板/创业板/科创板/CDR/北交所"),
    ParamSpec::optional("list_status", "上市状态 L上市 D退市 P暂停上市")
        .default_value("L")
        .validator(is_list_status),
    ParamSpec::optional("is_hs", "是否沪深港通标的 N否 H沪股通 S深股通").validator(is_hs),
    ParamSpec::optional("limit", "单次返回数据长度"),
    ParamSpec::optional("offset", "请求数据的开始位移量"),
];

pub const STOCK_BASIC_FIELDS: &[&str] = &["ts_code", "symbol", "name", "area", "industry", "list_date"];

/// 获取基础信息数据，包括股票代码、名称、上市日期、退市日期等
#[derive(Debug, Default, Clone, Serialize, Deserialize, Endpoint)]
#[api_name("stock_basic")]
#[endpoint(row = "StockBasic", params = "STOCK_BASIC_PARAMS", fields = "STOCK_BASIC_FIELDS")]
pub struct GetStockBasic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing)]
    pub fields: Option<Vec<String>>,
}

/// 股票基础信息
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockBasic {
    pub ts_code: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub area: Option<String>,
    pub industry: Option<String>,
    pub fullname: Option<String>,
    pub enname: Option<String>,
    pub cnspell: Option<String>,
    pub market: Option<String>,
    pub exchange: Option<String>,
    pub curr_type: Option<String>,
    pub list_status: Option<String>,
    pub list_date: Option<String>,
    pub delist_date: Option<String>,
    pub is_hs: Option<String>,
    pub act_name: Option<String>,
    pub act_ent_type: Option<String>,
}

/// A股日线行情
pub static DAILY_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("ts_code", "股票代码（支持多个股票同时提取，逗号分隔）")
        .validator(is_ts_code_list),
    ParamSpec::optional("trade_date", "交易日期（YYYYMMDD）").validator(is_trade_date),
    ParamSpec::optional("start_date", "开始日期(YYYYMMDD)").validator(is_trade_date),
    ParamSpec::optional("end_date", "结束日期(YYYYMMDD)").validator(is_trade_date),
];

pub const DAILY_FIELDS: &[&str] = &[
    "ts_code", "trade_date", "open", "high", "low", "close", "pre_close", "change", "pct_chg",
    "vol", "amount",
];

fn require_daily_condition(options: &Map<String, Value>) -> Result<()> {
    require_any(options, &["ts_code", "trade_date", "start_date", "end_date"])
}

/// 获取股票日线行情，未复权，停牌期间不提供数据
///
/// 至少需要提供股票代码、交易日期、开始日期或结束日期之一
#[derive(Debug, Default, Clone, Serialize, Deserialize, Endpoint)]
#[api_name("daily")]
#[endpoint(
    row = "DailyBar",
    params = "DAILY_PARAMS",
    fields = "DAILY_FIELDS",
    check = "require_daily_condition"
)]
pub struct GetDaily {
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

/// 日线行情
/// vol: 成交量（手）
/// amount: 成交额（千元）
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyBar {
    pub ts_code: String,
    pub trade_date: String,
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

/// 股票技术因子
pub static STK_FACTOR_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("ts_code", "股票代码").validator(is_ts_code),
    ParamSpec::optional("trade_date", "交易日期").validator(is_trade_date),
    ParamSpec::optional("start_date", "开始日期").validator(is_trade_date),
    ParamSpec::optional("end_date", "结束日期").validator(is_trade_date),
];

pub const STK_FACTOR_FIELDS: &[&str] = &[
    "ts_code", "trade_date", "close", "open", "high", "low", "pre_close", "change", "pct_change",
    "vol", "amount", "adj_factor", "open_hfq", "open_qfq", "close_hfq", "close_qfq", "high_hfq",
    "high_qfq", "low_hfq", "low_qfq", "pre_close_hfq", "pre_close_qfq", "macd_dif", "macd_dea",
    "macd", "kdj_k", "kdj_d", "kdj_j", "rsi_6", "rsi_12", "rsi_24", "boll_upper", "boll_mid",
    "boll_lower", "cci",
];

/// 获取股票每日技术面因子数据，用于跟踪股票当前走势情况
#[derive(Debug, Default, Clone, Serialize, Deserialize, Endpoint)]
#[api_name("stk_factor")]
#[endpoint(row = "StkFactor", params = "STK_FACTOR_PARAMS", fields = "STK_FACTOR_FIELDS")]
pub struct GetStkFactor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StkFactor {
    pub ts_code: String,
    pub trade_date: String,
    pub close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub pre_close: Option<f64>,
    pub change: Option<f64>,
    pub pct_change: Option<f64>,
    pub vol: Option<f64>,
    pub amount: Option<f64>,
    pub adj_factor: Option<f64>,
    pub open_hfq: Option<f64>,
    pub open_qfq: Option<f64>,
    pub close_hfq: Option<f64>,
    pub close_qfq: Option<f64>,
    pub high_hfq: Option<f64>,
    pub high_qfq: Option<f64>,
    pub low_hfq: Option<f64>,
    pub low_qfq: Option<f64>,
    pub pre_close_hfq: Option<f64>,
    pub pre_close_qfq: Option<f64>,
    pub macd_dif: Option<f64>,
    pub macd_dea: Option<f64>,
    pub macd: Option<f64>,
    pub kdj_k: Option<f64>,
    pub kdj_d: Option<f64>,
    pub kdj_j: Option<f64>,
    pub rsi_6: Option<f64>,
    pub rsi_12: Option<f64>,
    pub rsi_24: Option<f64>,
    pub boll_upper: Option<f64>,
    pub boll_mid: Option<f64>,
    pub boll_lower: Option<f64>,
    pub cci: Option<f64>,
}

/// 股票技术面因子(专业版)
pub static STK_FACTOR_PRO_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("ts_code", "股票代码").validator(is_ts_code),
    ParamSpec::optional("trade_date", "交易日期").validator(is_trade_date),
    ParamSpec::optional("start_date", "开始日期").validator(is_trade_date),
    ParamSpec::optional("end_date", "结束日期").validator(is_trade_date),
];

pub const STK_FACTOR_PRO_FIELDS: &[&str] = DAILY_FIELDS;

/// 获取股票每日技术面因子数据(专业版)
///
/// 技术指标字段数量很多，通过 fields 指定需要的列，
/// 例如 macd_qfq, kdj_k_qfq, rsi_qfq_6
#[derive(Debug, Default, Clone, Serialize, Deserialize, Endpoint)]
#[api_name("stk_factor_pro")]
#[endpoint(
    row = "StkFactorPro",
    params = "STK_FACTOR_PRO_PARAMS",
    fields = "STK_FACTOR_PRO_FIELDS"
)]
pub struct GetStkFactorPro {
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

/// 技术面因子(专业版)
/// 行情与估值列为具名字段，其余技术指标列保留在 indicators 中
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StkFactorPro {
    pub ts_code: String,
    pub trade_date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub pre_close: Option<f64>,
    pub change: Option<f64>,
    pub pct_chg: Option<f64>,
    pub vol: Option<f64>,
    pub amount: Option<f64>,
    pub turnover_rate: Option<f64>,
    pub turnover_rate_f: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub pe: Option<f64>,
    pub pe_ttm: Option<f64>,
    pub pb: Option<f64>,
    pub ps: Option<f64>,
    pub ps_ttm: Option<f64>,
    pub dv_ratio: Option<f64>,
    pub dv_ttm: Option<f64>,
    pub total_share: Option<f64>,
    pub float_share: Option<f64>,
    pub free_share: Option<f64>,
    pub total_mv: Option<f64>,
    pub circ_mv: Option<f64>,
    pub adj_factor: Option<f64>,
    #[serde(flatten)]
    pub indicators: Map<String, Value>,
}

impl StkFactorPro {
    /// numeric value of an indicator column, e.g. `macd_qfq`
    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.indicators.get(name).and_then(Value::as_f64)
    }
}
