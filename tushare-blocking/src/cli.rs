use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::{Map, Value};
use std::fmt;
use tushare_model::*;

pub struct TushareClient {
    http: reqwest::blocking::Client,
    token: String,
    base_url: String,
    numeric: NumericFields,
}

impl fmt::Debug for TushareClient {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TushareClient")
            .field("token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TushareClient {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self::with_config(ClientConfig::new(token))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let base_url = config.resolved_base_url().to_owned();
        TushareClient {
            http: reqwest::blocking::Client::new(),
            token: config.token,
            base_url,
            numeric: NumericFields::standard(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::with_config(ClientConfig::from_env()?))
    }

    pub fn with_numeric_fields(mut self, numeric: NumericFields) -> Self {
        self.numeric = numeric;
        self
    }

    /// post one request and return the raw columnar payload
    pub fn query(&self, api_name: &str, params: &Map<String, Value>, fields: &str) -> Result<ResponseData> {
        let req_body = Request {
            api_name,
            token: &self.token,
            params,
            fields,
        };
        let body = serde_json::to_string(&req_body)?;
        tracing::debug!(api_name, fields = fields.split(',').count(), "tushare request");
        let response = self
            .http
            .post(&self.base_url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .map_err(|e| Error::Client(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(api_name, status = status.as_u16(), "tushare http error");
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().map_err(|e| Error::Client(e.to_string()))?;
        let data = consume_body(&bytes).map_err(|e| {
            if let Error::Api { code, ref msg } = e {
                tracing::warn!(api_name, code, msg = msg.as_str(), "tushare api error");
            }
            e
        })?;
        tracing::debug!(api_name, items = data.items.len(), "tushare response");
        Ok(data)
    }

    pub fn call<S: AsRef<str>>(&self, api_name: &str, params: &Map<String, Value>, fields: &[S]) -> Result<Vec<Row>> {
        let data = self.query(api_name, params, &join_fields(fields))?;
        decode_rows(data, &self.numeric)
    }

    pub fn execute<E: Endpoint>(&self, endpoint: E) -> Result<Vec<E::Row>> {
        let call = prepare(&endpoint)?;
        let data = self.query(&call.api_name, &call.params, &call.fields)?;
        let rows = decode_rows(data, &self.numeric)?;
        into_typed(rows)
    }

    pub fn stock_basic(&self, req: GetStockBasic) -> Result<Vec<StockBasic>> {
        self.execute(req)
    }

    pub fn daily(&self, req: GetDaily) -> Result<Vec<DailyBar>> {
        self.execute(req)
    }

    pub fn kline(&self, req: GetKline) -> Result<Vec<KlineBar>> {
        self.execute(req)
    }

    pub fn weekly(&self, mut req: GetKline) -> Result<Vec<KlineBar>> {
        req.period = Period::Weekly;
        self.execute(req)
    }

    pub fn monthly(&self, mut req: GetKline) -> Result<Vec<KlineBar>> {
        req.period = Period::Monthly;
        self.execute(req)
    }

    pub fn yearly(&self, mut req: GetKline) -> Result<Vec<KlineBar>> {
        req.period = Period::Yearly;
        self.execute(req)
    }

    pub fn minutes(&self, freq: Freq, mut req: GetKline) -> Result<Vec<KlineBar>> {
        req.period = Period::minutes(freq)?;
        self.execute(req)
    }

    pub fn pro_bar(&self, req: GetProBar) -> Result<Vec<ProBar>> {
        self.execute(req)
    }

    pub fn stk_factor(&self, req: GetStkFactor) -> Result<Vec<StkFactor>> {
        self.execute(req)
    }

    pub fn stk_factor_pro(&self, req: GetStkFactorPro) -> Result<Vec<StkFactorPro>> {
        self.execute(req)
    }
}
