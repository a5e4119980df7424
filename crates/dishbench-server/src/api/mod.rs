mod scrape;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use dishbench_core::AppConfig;
use dishbench_scraper::{DishScraper, ScraperError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub scraper: Arc<dyn DishScraper>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "navigation_failed" => StatusCode::GATEWAY_TIMEOUT,
            "transport_failure" | "parse_failure" | "browser_failure" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_scraper_error(request_id: String, error: &ScraperError) -> ApiError {
    let kind = error.kind();
    tracing::error!(request_id = %request_id, kind = %kind, error = %error, "scrape failed");
    ApiError::new(request_id, kind.as_str(), error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
        .expose_headers([HeaderName::from_static("x-request-id")])
}

fn scrape_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/scrape", get(scrape::scrape))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(scrape_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub fn rate_limit_state_from_config(config: &AppConfig) -> RateLimitState {
    RateLimitState::new(config.rate_limit_per_minute, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use dishbench_core::{
        AnalyticsReport, AnalyticsResult, CardRatings, DishQuery, PriceExtreme, TopCard,
    };
    use dishbench_scraper::{DropCounts, ScrapeOutcome};
    use tower::ServiceExt;

    use super::*;

    /// Scraper returning a canned result and recording the last query.
    struct FakeScraper {
        result: fn() -> Result<ScrapeOutcome, ScraperError>,
        calls: AtomicUsize,
        last_query: std::sync::Mutex<Option<DishQuery>>,
    }

    impl FakeScraper {
        fn new(result: fn() -> Result<ScrapeOutcome, ScraperError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
                last_query: std::sync::Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl DishScraper for FakeScraper {
        async fn scrape(&self, query: &DishQuery) -> Result<ScrapeOutcome, ScraperError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().expect("lock") = Some(query.clone());
            (self.result)()
        }
    }

    fn extreme(name: &str, price: i64) -> PriceExtreme {
        PriceExtreme {
            name: name.to_owned(),
            price: Some(price),
            locality: "Karol Bagh".to_owned(),
            delivery_time: "30".to_owned(),
            avg_rating: "4.1".to_owned(),
        }
    }

    fn analyzed() -> Result<ScrapeOutcome, ScraperError> {
        Ok(ScrapeOutcome::Analyzed {
            report: AnalyticsReport {
                analytics: AnalyticsResult {
                    min: extreme("Cheap Eats", 9_900),
                    max: extreme("Fancy Place", 45_000),
                    avg_price: 27_450.0,
                    price_vs_rating: Vec::new(),
                    price_vs_distance: Vec::new(),
                },
                cards: vec![TopCard {
                    name: "Fancy Place".to_owned(),
                    image_url: "https://cdn.example.com/x.png".to_owned(),
                    price: Some(45_000),
                    ratings: CardRatings {
                        rating: "4.8".to_owned(),
                        rating_count: 120,
                        rating_count_v2: 120,
                    },
                }],
            },
            drops: DropCounts {
                not_a_dish: 2,
                ..DropCounts::default()
            },
        })
    }

    fn no_capture() -> Result<ScrapeOutcome, ScraperError> {
        Ok(ScrapeOutcome::NoCapture)
    }

    fn navigation_timeout() -> Result<ScrapeOutcome, ScraperError> {
        Err(ScraperError::NavigationTimeout {
            url: "https://www.swiggy.com/search?query=Biryani".to_owned(),
            timeout_secs: 60,
        })
    }

    fn parse_failure() -> Result<ScrapeOutcome, ScraperError> {
        Err(ScraperError::Deserialize {
            context: "search payload".to_owned(),
            source: serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
        })
    }

    fn app_with(scraper: Arc<FakeScraper>, max_requests: usize) -> Router {
        build_app(
            AppState { scraper },
            RateLimitState::new(max_requests, Duration::from_secs(60)),
        )
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        assert!(response.headers().contains_key("x-request-id"));
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_failure_kinds_map_to_gateway_statuses() {
        let cases = [
            ("navigation_failed", StatusCode::GATEWAY_TIMEOUT),
            ("transport_failure", StatusCode::BAD_GATEWAY),
            ("parse_failure", StatusCode::BAD_GATEWAY),
            ("browser_failure", StatusCode::BAD_GATEWAY),
            ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
            ("something_else", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, expected) in cases {
            let response = ApiError::new("req-1", code, "msg").into_response();
            assert_eq!(response.status(), expected, "code {code}");
        }
    }

    #[tokio::test]
    async fn health_returns_ok_envelope() {
        let (status, json) = get_json(app_with(FakeScraper::new(analyzed), 5), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
        assert!(json["meta"]["request_id"].is_string());
        assert!(json["meta"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn scrape_returns_analytics_and_cards() {
        let scraper = FakeScraper::new(analyzed);
        let (status, json) = get_json(
            app_with(Arc::clone(&scraper), 5),
            "/api/v1/scrape?item=Chole%20Bhature&lat=28.6&long=77.2",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["outcome"], "analyzed");
        assert_eq!(json["data"]["message"], "API response retrieved successfully");
        assert_eq!(json["data"]["analytics"]["min"]["name"], "Cheap Eats");
        assert_eq!(json["data"]["analytics"]["avgPrice"], 27_450.0);
        assert_eq!(json["data"]["cards"][0]["imageId"], "https://cdn.example.com/x.png");
        assert_eq!(json["data"]["cards"][0]["ratings"]["ratingCountV2"], 120);
        assert_eq!(json["data"]["dropped"]["not_a_dish"], 2);

        let query = scraper.last_query.lock().expect("lock").clone().expect("query");
        assert_eq!(query.item, "Chole Bhature");
        assert!((query.latitude - 28.6).abs() < f64::EPSILON);
        assert!((query.longitude - 77.2).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn scrape_applies_defaults_for_missing_params() {
        let scraper = FakeScraper::new(analyzed);
        let (status, _) = get_json(app_with(Arc::clone(&scraper), 5), "/api/v1/scrape?lat=").await;
        assert_eq!(status, StatusCode::OK);
        let query = scraper.last_query.lock().expect("lock").clone().expect("query");
        assert_eq!(query, DishQuery::default());
    }

    #[tokio::test]
    async fn scrape_no_capture_is_success_shaped() {
        let (status, json) =
            get_json(app_with(FakeScraper::new(no_capture), 5), "/api/v1/scrape").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["outcome"], "no_capture");
        assert!(json["data"]["analytics"].is_null());
        assert_eq!(json["data"]["cards"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn scrape_rejects_invalid_coordinates_without_scraping() {
        let scraper = FakeScraper::new(analyzed);
        let (status, json) =
            get_json(app_with(Arc::clone(&scraper), 5), "/api/v1/scrape?lat=north").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scrape_navigation_timeout_maps_to_gateway_timeout() {
        let (status, json) =
            get_json(app_with(FakeScraper::new(navigation_timeout), 5), "/api/v1/scrape").await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["error"]["code"], "navigation_failed");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn scrape_parse_failure_is_distinct_from_transport() {
        let (status, json) =
            get_json(app_with(FakeScraper::new(parse_failure), 5), "/api/v1/scrape").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "parse_failure");
    }

    #[tokio::test]
    async fn scrape_is_rate_limited_but_health_is_not() {
        let app = app_with(FakeScraper::new(no_capture), 1);
        let (status, _) = get_json(app.clone(), "/api/v1/scrape").await;
        assert_eq!(status, StatusCode::OK);
        let (status, json) = get_json(app.clone(), "/api/v1/scrape").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"]["code"], "rate_limited");
        let (status, _) = get_json(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
    }
}
