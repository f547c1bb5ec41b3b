//! Backend collaborator API client
//!
//! Thin async wrapper over the farm backend: authentication, NASA climate
//! averages, short-term forecast and threshold probability analysis.
//! Every call settles into an [`Envelope`]; transport and HTTP failures
//! become `Envelope::Failure` carrying the backend's `error` message, or a
//! per-endpoint default when the backend gave none.

use crate::config::ApiConfig;
use crate::constants::api::USER_AGENT;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const SIGNUP_FAILED: &str = "Signup failed. Please try again.";
const DEMO_FAILED: &str = "Demo login failed. Please try again.";
const NASA_FAILED: &str = "Failed to fetch NASA data.";
const FORECAST_FAILED: &str = "Failed to fetch forecast data.";
const ANALYSIS_FAILED: &str = "Failed to fetch analysis results.";

/// Outcome of a backend call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Success {
        data: T,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Failure {
        error: String,
    },
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Self {
        Envelope::Success {
            data,
            message: None,
        }
    }

    fn fail(error: impl Into<String>) -> Self {
        Envelope::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Envelope::Success { data, .. } => Ok(data),
            Envelope::Failure { error } => Err(Error::Api(error)),
        }
    }
}

/// A user profile as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Result of a login, demo login or signup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl AuthSession {
    fn from_body(body: &Value) -> Self {
        Self {
            user: body
                .get("user")
                .and_then(|u| serde_json::from_value(u.clone()).ok()),
            token: body
                .get("access_token")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Payload of the NASA climate averages endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ClimateRequest {
    pub month: u32,
    pub day: u32,
    pub year: i32,
    pub latitude: f64,
    pub longitude: f64,
}

impl ClimateRequest {
    pub fn new(coord: Coordinate, date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
            year: date.year(),
            latitude: coord.lat,
            longitude: coord.lon,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub days: u32,
}

/// Weather variables the analysis endpoint understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Temperature,
    Precipitation,
    Humidity,
    WindSpeed,
}

impl Variable {
    pub fn id(&self) -> &'static str {
        match self {
            Variable::Temperature => "temperature",
            Variable::Precipitation => "precipitation",
            Variable::Humidity => "humidity",
            Variable::WindSpeed => "wind_speed",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Variable::Temperature => "°C",
            Variable::Precipitation => "mm",
            Variable::Humidity => "%",
            Variable::WindSpeed => "m/s",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Variable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "temperature" | "temp" => Ok(Variable::Temperature),
            "precipitation" | "rain" => Ok(Variable::Precipitation),
            "humidity" => Ok(Variable::Humidity),
            "wind_speed" | "wind" => Ok(Variable::WindSpeed),
            _ => Err(Error::Api(format!("Unknown variable: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Above,
    Below,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Above => write!(f, "above"),
            Operator::Below => write!(f, "below"),
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "above" | ">" => Ok(Operator::Above),
            "below" | "<" => Ok(Operator::Below),
            _ => Err(Error::Api(format!("Unknown operator: {}", s))),
        }
    }
}

/// A threshold to test a variable against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub variable: Variable,
    pub value: f64,
    pub operator: Operator,
}

impl Threshold {
    /// Wire form used in the analysis query: `"value:operator"`
    pub fn query_value(&self) -> String {
        format!("{}:{}", self.value, self.operator)
    }
}

impl FromStr for Threshold {
    type Err = Error;

    /// Parse `variable:value[:above|below]`, defaulting to `above`
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':').map(str::trim);
        let variable = parts.next().unwrap_or_default().parse()?;
        let value = parts
            .next()
            .ok_or_else(|| Error::Api(format!("Missing threshold value in '{}'", s)))?
            .parse::<f64>()
            .map_err(|_| Error::Api(format!("Invalid threshold value in '{}'", s)))?;
        let operator = match parts.next() {
            Some(op) => op.parse()?,
            None => Operator::Above,
        };

        Ok(Self {
            variable,
            value,
            operator,
        })
    }
}

/// Payload of the threshold analysis endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub month: u32,
    pub day: u32,
    pub year: i32,
    /// variable id → `"value:operator"`
    pub query: BTreeMap<String, String>,
    #[serde(skip)]
    thresholds: Vec<Threshold>,
}

impl AnalysisRequest {
    pub fn new(coord: Coordinate, date: NaiveDate, thresholds: &[Threshold]) -> Self {
        Self {
            latitude: coord.lat,
            longitude: coord.lon,
            month: date.month(),
            day: date.day(),
            year: date.year(),
            query: thresholds
                .iter()
                .map(|t| (t.variable.id().to_string(), t.query_value()))
                .collect(),
            thresholds: thresholds.to_vec(),
        }
    }
}

/// Qualitative bucket of an exceedance probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbabilityLevel {
    Low,
    Medium,
    High,
}

impl ProbabilityLevel {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            70..=u8::MAX => ProbabilityLevel::High,
            40..=69 => ProbabilityLevel::Medium,
            _ => ProbabilityLevel::Low,
        }
    }
}

impl fmt::Display for ProbabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbabilityLevel::Low => write!(f, "low"),
            ProbabilityLevel::Medium => write!(f, "medium"),
            ProbabilityLevel::High => write!(f, "high"),
        }
    }
}

/// Probability that one variable crosses its threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityResult {
    pub variable: String,
    pub probability: u8,
    pub level: ProbabilityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
}

/// Parse `"72%"`, `"72.5 %"` or a bare number into a whole percentage
fn parse_percent(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(number.clamp(0.0, 100.0) as u8)
}

/// Interpret the analysis `data` field, which may be an object or a JSON string
fn parse_probabilities(
    data: &Value,
    thresholds: &[Threshold],
) -> std::result::Result<Vec<ProbabilityResult>, String> {
    let decoded;
    let data = match data {
        Value::String(s) => {
            decoded = serde_json::from_str::<Value>(s)
                .map_err(|e| format!("Malformed analysis data: {}", e))?;
            &decoded
        }
        other => other,
    };

    let map = data
        .as_object()
        .ok_or_else(|| "Analysis data is not an object".to_string())?;
    if let Some(error) = map.get("error").and_then(Value::as_str) {
        return Err(error.to_string());
    }

    Ok(map
        .iter()
        .filter_map(|(variable, value)| {
            let Some(probability) = parse_percent(value) else {
                debug!("Skipping unparseable probability for {}: {}", variable, value);
                return None;
            };
            Some(ProbabilityResult {
                variable: variable.clone(),
                probability,
                level: ProbabilityLevel::from_percent(probability),
                threshold: thresholds
                    .iter()
                    .find(|t| t.variable.id() == variable)
                    .copied(),
            })
        })
        .collect())
}

/// Client for the backend collaborator API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url)
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the JSON body, or the error message to report
    async fn exchange(
        &self,
        request: reqwest::RequestBuilder,
        default_error: &str,
    ) -> std::result::Result<Value, String> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!("Backend request failed: {}", e);
            default_error.to_string()
        })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or(default_error)
                .to_string();
            warn!("Backend returned {}: {}", status, error);
            return Err(error);
        }

        Ok(body)
    }

    async fn post<B: Serialize>(
        &self,
        path: &str,
        payload: &B,
        default_error: &str,
    ) -> std::result::Result<Value, String> {
        self.exchange(self.client.post(self.url(path)).json(payload), default_error)
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Envelope<AuthSession> {
        let payload = serde_json::json!({ "email": email, "password": password });
        let result = self.post("/auth/login", &payload, LOGIN_FAILED).await;
        auth_envelope(result)
    }

    pub async fn signup(&self, form: &SignupForm) -> Envelope<AuthSession> {
        let result = self.post("/auth/signup", form, SIGNUP_FAILED).await;
        auth_envelope(result)
    }

    pub async fn demo_login(&self) -> Envelope<AuthSession> {
        let result = self
            .exchange(self.client.get(self.url("/auth/demo")), DEMO_FAILED)
            .await;
        auth_envelope(result)
    }

    /// Five-year NASA POWER averages around a calendar date
    pub async fn nasa_data(&self, request: &ClimateRequest) -> Envelope<Value> {
        data_envelope(self.post("/dashboard/data", request, NASA_FAILED).await)
    }

    pub async fn forecast(&self, request: &ForecastRequest) -> Envelope<Value> {
        data_envelope(
            self.post("/dashboard/forecast", request, FORECAST_FAILED)
                .await,
        )
    }

    /// Probability of each requested variable crossing its threshold
    pub async fn analysis(&self, request: &AnalysisRequest) -> Envelope<Vec<ProbabilityResult>> {
        let body = match self
            .post("/dashboard/analysis-results", request, ANALYSIS_FAILED)
            .await
        {
            Ok(body) => body,
            Err(error) => return Envelope::fail(error),
        };

        let data = body.get("data").cloned().unwrap_or(body);
        match parse_probabilities(&data, &request.thresholds) {
            Ok(results) => Envelope::ok(results),
            Err(error) => Envelope::fail(error),
        }
    }
}

fn auth_envelope(result: std::result::Result<Value, String>) -> Envelope<AuthSession> {
    match result {
        Ok(body) => Envelope::ok(AuthSession::from_body(&body)),
        Err(error) => Envelope::fail(error),
    }
}

/// Split a `{ data, message }` body into an envelope
fn data_envelope(result: std::result::Result<Value, String>) -> Envelope<Value> {
    match result {
        Ok(mut body) => Envelope::Success {
            data: body.get_mut("data").map(Value::take).unwrap_or(Value::Null),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        Err(error) => Envelope::fail(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::nominatim::tests::serve;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    fn fake_backend() -> Router {
        async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
            if body["password"] == "secret" {
                (
                    StatusCode::OK,
                    Json(json!({
                        "access_token": "tok-123",
                        "user": {"id": 7, "username": "wanjiku", "email": body["email"]}
                    })),
                )
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "Invalid email or password"})),
                )
            }
        }

        async fn demo() -> StatusCode {
            StatusCode::INTERNAL_SERVER_ERROR
        }

        async fn forecast(headers: HeaderMap) -> (StatusCode, Json<Value>) {
            let authorized = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("Bearer tok-123");
            if authorized {
                (
                    StatusCode::OK,
                    Json(json!({"message": "Forecast ready", "data": {"days": [1, 2, 3]}})),
                )
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "Missing token"})),
                )
            }
        }

        async fn analysis(Json(body): Json<Value>) -> Json<Value> {
            if body["query"].as_object().map_or(true, |q| q.is_empty()) {
                return Json(json!({
                    "data": {"error": "No valid parameters selected from user query."}
                }));
            }
            let encoded = json!({"temperature": "72%", "humidity": "41.5%", "wind_speed": "n/a"});
            Json(json!({"data": encoded.to_string()}))
        }

        Router::new()
            .route("/auth/login", post(login))
            .route("/auth/demo", get(demo))
            .route("/dashboard/forecast", post(forecast))
            .route("/dashboard/analysis-results", post(analysis))
    }

    fn nairobi() -> Coordinate {
        Coordinate::new(-1.2921, 36.8219)
    }

    #[test]
    fn test_threshold_parse() {
        let t: Threshold = "temperature:30:above".parse().unwrap();
        assert_eq!(t.variable, Variable::Temperature);
        assert_eq!(t.query_value(), "30:above");

        let t: Threshold = "wind:7.5".parse().unwrap();
        assert_eq!(t.variable, Variable::WindSpeed);
        assert_eq!(t.operator, Operator::Above);
        assert_eq!(t.query_value(), "7.5:above");

        assert!("snow:10".parse::<Threshold>().is_err());
        assert!("humidity".parse::<Threshold>().is_err());
        assert!("humidity:x:below".parse::<Threshold>().is_err());
    }

    #[test]
    fn test_analysis_request_encoding() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 4).unwrap();
        let thresholds = [
            "temperature:30:above".parse().unwrap(),
            "precipitation:5:below".parse().unwrap(),
        ];
        let request = AnalysisRequest::new(nairobi(), date, &thresholds);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["month"], 10);
        assert_eq!(json["day"], 4);
        assert_eq!(json["query"]["temperature"], "30:above");
        assert_eq!(json["query"]["precipitation"], "5:below");
        assert!(json.get("thresholds").is_none());
    }

    #[test]
    fn test_probability_levels() {
        assert_eq!(ProbabilityLevel::from_percent(0), ProbabilityLevel::Low);
        assert_eq!(ProbabilityLevel::from_percent(39), ProbabilityLevel::Low);
        assert_eq!(ProbabilityLevel::from_percent(40), ProbabilityLevel::Medium);
        assert_eq!(ProbabilityLevel::from_percent(69), ProbabilityLevel::Medium);
        assert_eq!(ProbabilityLevel::from_percent(70), ProbabilityLevel::High);
    }

    #[test]
    fn test_parse_probabilities_object() {
        let data = json!({"precipitation": "12%", "humidity": 88});
        let results = parse_probabilities(&data, &[]).unwrap();
        assert_eq!(results.len(), 2);
        let humidity = results.iter().find(|r| r.variable == "humidity").unwrap();
        assert_eq!(humidity.probability, 88);
        assert_eq!(humidity.level, ProbabilityLevel::High);
    }

    #[tokio::test]
    async fn test_login_success() {
        let client = ApiClient::new(serve(fake_backend()).await).unwrap();
        let session = client
            .login("w@farm.ke", "secret")
            .await
            .into_result()
            .unwrap();
        assert_eq!(session.token.as_deref(), Some("tok-123"));
        let user = session.user.unwrap();
        assert_eq!(user.id, Some(7));
        assert_eq!(user.email.as_deref(), Some("w@farm.ke"));
    }

    #[tokio::test]
    async fn test_login_failure_uses_backend_message() {
        let client = ApiClient::new(serve(fake_backend()).await).unwrap();
        let envelope = client.login("w@farm.ke", "wrong").await;
        assert_eq!(
            envelope,
            Envelope::Failure {
                error: "Invalid email or password".into()
            }
        );
    }

    #[tokio::test]
    async fn test_default_error_messages() {
        let client = ApiClient::new(serve(fake_backend()).await).unwrap();
        assert_eq!(
            client.demo_login().await,
            Envelope::Failure {
                error: "Demo login failed. Please try again.".into()
            }
        );

        let unreachable = ApiClient::new("http://127.0.0.1:1").unwrap();
        let request = ClimateRequest::new(nairobi(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(
            unreachable.nasa_data(&request).await,
            Envelope::Failure {
                error: "Failed to fetch NASA data.".into()
            }
        );
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let base = serve(fake_backend()).await;
        let request = ForecastRequest {
            latitude: -1.29,
            longitude: 36.82,
            days: 7,
        };

        let anonymous = ApiClient::new(base.clone()).unwrap();
        assert!(!anonymous.forecast(&request).await.is_success());

        let client = ApiClient::new(base)
            .unwrap()
            .with_token(Some("tok-123".into()));
        match client.forecast(&request).await {
            Envelope::Success { data, message } => {
                assert_eq!(data["days"], json!([1, 2, 3]));
                assert_eq!(message.as_deref(), Some("Forecast ready"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_analysis_parses_string_data() {
        let client = ApiClient::new(serve(fake_backend()).await).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 10, 4).unwrap();
        let thresholds = ["temperature:30:above".parse().unwrap()];
        let request = AnalysisRequest::new(nairobi(), date, &thresholds);

        let results = client.analysis(&request).await.into_result().unwrap();
        assert_eq!(results.len(), 2);

        let temperature = results.iter().find(|r| r.variable == "temperature").unwrap();
        assert_eq!(temperature.probability, 72);
        assert_eq!(temperature.level, ProbabilityLevel::High);
        assert_eq!(temperature.threshold, Some(thresholds[0]));

        let humidity = results.iter().find(|r| r.variable == "humidity").unwrap();
        assert_eq!(humidity.probability, 41);
        assert_eq!(humidity.level, ProbabilityLevel::Medium);
        assert!(humidity.threshold.is_none());
    }

    #[tokio::test]
    async fn test_analysis_error_in_data() {
        let client = ApiClient::new(serve(fake_backend()).await).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 10, 4).unwrap();
        let request = AnalysisRequest::new(nairobi(), date, &[]);

        let envelope = client.analysis(&request).await;
        assert!(matches!(
            envelope.into_result(),
            Err(Error::Api(msg)) if msg.starts_with("No valid parameters")
        ));
    }
}
