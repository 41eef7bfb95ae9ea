pub use tushare_model::*;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// TushareClient
///
/// async client for Tushare Pro API
///
/// token and url are fixed at construction, so a client can be
/// cloned and shared between tasks freely
#[derive(Clone)]
pub struct TushareClient {
    inner: Arc<SharedClient>,
}

struct SharedClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
    numeric: NumericFields,
}

impl fmt::Debug for TushareClient {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TushareClient")
            .field("token", &"[REDACTED]")
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

impl TushareClient {
    /// Create new client against the production url
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self::with_config(ClientConfig::new(token))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    /// Create new client reusing a configured reqwest client
    pub fn with_http_client(http: reqwest::Client, config: ClientConfig) -> Self {
        let base_url = config.resolved_base_url().to_owned();
        TushareClient {
            inner: Arc::new(SharedClient {
                http,
                token: config.token,
                base_url,
                numeric: NumericFields::standard(),
            }),
        }
    }

    /// Create new client from `TUSHARE_TOKEN` and `TUSHARE_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_config(ClientConfig::from_env()?))
    }

    /// Replace the allow-list of fields decoded as numbers
    pub fn with_numeric_fields(self, numeric: NumericFields) -> Self {
        TushareClient {
            inner: Arc::new(SharedClient {
                http: self.inner.http.clone(),
                token: self.inner.token.clone(),
                base_url: self.inner.base_url.clone(),
                numeric,
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Post one request and return the raw columnar payload
    pub async fn query(
        &self,
        api_name: &str,
        params: &Map<String, Value>,
        fields: &str,
    ) -> Result<ResponseData> {
        let req_body = Request {
            api_name,
            token: &self.inner.token,
            params,
            fields,
        };
        let body = serde_json::to_string(&req_body)?;
        tracing::debug!(api_name, fields = fields.split(',').count(), "tushare request");
        let response = self
            .inner
            .http
            .post(&self.inner.base_url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Client(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(api_name, status = status.as_u16(), "tushare http error");
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Client(e.to_string()))?;
        let data = consume_body(&bytes).map_err(|e| {
            if let Error::Api { code, ref msg } = e {
                tracing::warn!(api_name, code, msg = msg.as_str(), "tushare api error");
            }
            e
        })?;
        tracing::debug!(api_name, items = data.items.len(), "tushare response");
        Ok(data)
    }

    /// Post one request and decode it into rows
    pub async fn call<S: AsRef<str>>(
        &self,
        api_name: &str,
        params: &Map<String, Value>,
        fields: &[S],
    ) -> Result<Vec<Row>> {
        let data = self.query(api_name, params, &join_fields(fields)).await?;
        decode_rows(data, &self.inner.numeric)
    }

    /// Validate and execute an endpoint, returning typed rows
    pub async fn execute<E: Endpoint>(&self, endpoint: E) -> Result<Vec<E::Row>> {
        let call = prepare(&endpoint)?;
        let data = self.query(&call.api_name, &call.params, &call.fields).await?;
        let rows = decode_rows(data, &self.inner.numeric)?;
        into_typed(rows)
    }

    /// 股票列表
    pub async fn stock_basic(&self, req: GetStockBasic) -> Result<Vec<StockBasic>> {
        self.execute(req).await
    }

    /// A股日线行情
    pub async fn daily(&self, req: GetDaily) -> Result<Vec<DailyBar>> {
        self.execute(req).await
    }

    /// K线行情，周期由 `req.period` 决定
    pub async fn kline(&self, req: GetKline) -> Result<Vec<KlineBar>> {
        self.execute(req).await
    }

    pub async fn weekly(&self, mut req: GetKline) -> Result<Vec<KlineBar>> {
        req.period = Period::Weekly;
        self.execute(req).await
    }

    pub async fn monthly(&self, mut req: GetKline) -> Result<Vec<KlineBar>> {
        req.period = Period::Monthly;
        self.execute(req).await
    }

    pub async fn yearly(&self, mut req: GetKline) -> Result<Vec<KlineBar>> {
        req.period = Period::Yearly;
        self.execute(req).await
    }

    /// 分钟线，`freq` 必须是分钟频度
    pub async fn minutes(&self, freq: Freq, mut req: GetKline) -> Result<Vec<KlineBar>> {
        req.period = Period::minutes(freq)?;
        self.execute(req).await
    }

    /// 通用行情
    pub async fn pro_bar(&self, req: GetProBar) -> Result<Vec<ProBar>> {
        self.execute(req).await
    }

    /// 股票技术因子
    pub async fn stk_factor(&self, req: GetStkFactor) -> Result<Vec<StkFactor>> {
        self.execute(req).await
    }

    /// 股票技术因子(专业版)
    pub async fn stk_factor_pro(&self, req: GetStkFactorPro) -> Result<Vec<StkFactorPro>> {
        self.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    async fn client(server: &mockito::Server) -> TushareClient {
        TushareClient::with_config(ClientConfig::new("abc").base_url(server.url()))
    }

    #[tokio::test]
    async fn test_daily() {
        let mut server = mockito::Server::new_async().await;
        let response_body = json!({
            "code": 0,
            "msg": "",
            "data": {
                "fields": ["ts_code", "trade_date", "close"],
                "items": [
                    ["600519.SH", "20240102", "1685.01"],
                    ["600519.SH", "20240103", 1694.0],
                ],
            },
        });
        let mock_api = server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "api_name": "daily",
                "token": "abc",
                "params": {"ts_code": "600519.SH", "start_date": "20240101"},
                "fields": "ts_code,trade_date,open,high,low,close,pre_close,change,pct_chg,vol,amount",
            })))
            .with_status(200)
            .with_body(response_body.to_string())
            .create_async()
            .await;

        let client = client(&server).await;
        let bars = client
            .daily(GetDaily {
                ts_code: Some("600519.SH".to_owned()),
                start_date: Some("20240101".to_owned()),
                ..Default::default()
            })
            .await
            .unwrap();
        mock_api.assert_async().await;
        assert_eq!(
            vec![
                DailyBar {
                    ts_code: "600519.SH".to_owned(),
                    trade_date: "20240102".to_owned(),
                    close: Some(1685.01),
                    ..Default::default()
                },
                DailyBar {
                    ts_code: "600519.SH".to_owned(),
                    trade_date: "20240103".to_owned(),
                    close: Some(1694.0),
                    ..Default::default()
                },
            ],
            bars
        );
    }

    #[tokio::test]
    async fn test_call_rows() {
        let mut server = mockito::Server::new_async().await;
        let _mock_api = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                json!({
                    "code": 0,
                    "msg": "",
                    "data": {
                        "fields": ["ts_code", "trade_date", "close"],
                        "items": [["600519.SH", "20240101", "1680.5"]],
                    },
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client(&server).await;
        let rows = client
            .call("daily", &Map::new(), &["ts_code", "trade_date", "close"])
            .await
            .unwrap();
        assert_eq!(1, rows.len());
        assert_eq!(
            json!({"ts_code": "600519.SH", "trade_date": "20240101", "close": 1680.5}),
            Value::Object(rows[0].clone())
        );
    }

    #[tokio::test]
    async fn test_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock_api = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                json!({
                    "code": -1,
                    "msg": "invalid token",
                    "data": {"fields": ["ts_code"], "items": [["600519.SH"]]},
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client(&server).await;
        let result = client.stock_basic(GetStockBasic::default()).await;
        match result {
            Err(Error::Api { code, msg }) => {
                assert_eq!(-1, code);
                assert_eq!("invalid token", msg);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock_api = server
            .mock("POST", "/")
            .with_status(503)
            .with_body("not json at all")
            .create_async()
            .await;

        let client = client(&server).await;
        let result = client.query("daily", &Map::new(), "ts_code").await;
        match result {
            Err(Error::Http { status }) => assert_eq!(503, status),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validation_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock_api = server
            .mock("POST", "/")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let client = client(&server).await;
        let result = client.pro_bar(GetProBar::new("600519")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        let result = client.daily(GetDaily::default()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        mock_api.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_memoization() {
        let mut server = mockito::Server::new_async().await;
        let mock_api = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                json!({
                    "code": 0,
                    "msg": "",
                    "data": {
                        "fields": ["ts_code", "trade_date", "close"],
                        "items": [["000001.SZ", "20240102", 9.21]],
                    },
                })
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let client = client(&server).await;
        let req = GetKline::new(Period::Weekly).ts_code("000001.SZ");
        let first = client.kline(req.clone()).await.unwrap();
        let second = client.kline(req).await.unwrap();
        mock_api.assert_async().await;
        assert_eq!(first, second);
        assert_eq!(Some(9.21), first[0].close);
    }

    #[tokio::test]
    async fn test_pro_bar_routes_minutes() {
        let mut server = mockito::Server::new_async().await;
        let mock_api = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "api_name": "stk_mins",
                "params": {"ts_code": "000001.SZ", "freq": "5min"},
            })))
            .with_status(200)
            .with_body(
                json!({
                    "code": 0,
                    "msg": "",
                    "data": {
                        "fields": ["ts_code", "trade_time", "close"],
                        "items": [["000001.SZ", "2024-01-02 09:35:00", "9.2"]],
                    },
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client(&server).await;
        let mut req = GetProBar::new("000001.SZ");
        req.freq = Freq::Min5;
        let bars = client.pro_bar(req).await.unwrap();
        mock_api.assert_async().await;
        assert_eq!(Some("2024-01-02 09:35:00".to_owned()), bars[0].trade_time);
        assert_eq!(Some(9.2), bars[0].close);
    }

    #[tokio::test]
    async fn test_minutes_rejects_daily_freq() {
        let client = TushareClient::new("abc");
        let result = client.minutes(Freq::Daily, GetKline::new(Period::Daily)).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_custom_numeric_fields() {
        let mut server = mockito::Server::new_async().await;
        let _mock_api = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                json!({
                    "code": 0,
                    "msg": "",
                    "data": {"fields": ["ts_code", "close"], "items": [["600519.SH", "1680.5"]]},
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client(&server).await.with_numeric_fields(NumericFields::new());
        let rows = client.call("daily", &Map::new(), &["ts_code", "close"]).await.unwrap();
        assert_eq!(json!("1680.5"), rows[0]["close"]);
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = TushareClient::new("secret_token_123");
        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("secret_token_123"));
        assert_eq!("http://api.tushare.pro", client.base_url());
    }
}
