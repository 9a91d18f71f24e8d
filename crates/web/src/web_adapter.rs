use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use error_stack::Report;
use property_rank_core::{
    adapters::config::dashboard_config::DashboardConfig,
    application::dashboard_service::{DashboardRequest, DashboardService},
    domain::ranking::{RankedRecord, RankingQuery, SortOrder, Summary},
    ports::property_source::FetchError,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, instrument};

use crate::views::{self, SearchForm};

#[derive(Clone)]
pub struct WebState {
    pub service: Arc<DashboardService>,
    pub dashboard: Arc<DashboardConfig>,
}

impl std::fmt::Debug for WebState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebState")
            .field("service", &"<DashboardService>")
            .finish()
    }
}

/// Query string of the ranking page. Everything is optional and parsed
/// leniently: an unknown sort order or year falls back to the default.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    sort: Option<String>,
    zone: Option<String>,
    year: Option<String>,
}

impl SearchParams {
    fn sort_order(&self) -> SortOrder {
        self.sort
            .as_deref()
            .and_then(|sort| SortOrder::from_str(sort).ok())
            .unwrap_or_default()
    }

    fn year(&self) -> Option<i32> {
        parse_year(self.year.as_deref())
    }

    fn request(&self) -> DashboardRequest {
        DashboardRequest {
            query: RankingQuery::new(self.q.clone().unwrap_or_default(), self.sort_order())
                .with_zone(self.zone.clone()),
            year: self.year(),
        }
    }

    fn form(&self) -> SearchForm {
        SearchForm {
            query: self.q.clone().unwrap_or_default(),
            sort: self.sort_order(),
            zone: self.zone.clone().filter(|zone| !zone.is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    year: Option<String>,
}

fn parse_year(year: Option<&str>) -> Option<i32> {
    year.and_then(|year| year.trim().parse().ok())
}

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Serialize)]
struct RankingResponse {
    value_year: Option<i32>,
    zones: Vec<String>,
    years: Vec<i32>,
    summary: Summary,
    records: Vec<RankedRecord>,
}

pub fn router(state: WebState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ranking", get(api_ranking));

    Router::new()
        .route("/", get(ranking_page))
        .route("/unit/:row", get(unit_page))
        .route("/reload", post(reload))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the configuration error on every route until the process is
/// restarted with a working configuration.
pub fn configuration_error_router(message: String) -> Router {
    let message = Arc::new(message);
    Router::new()
        .fallback(move || {
            let message = Arc::clone(&message);
            async move {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    views::configuration_error_page(&message),
                )
            }
        })
        .layer(TraceLayer::new_for_http())
}

fn fetch_failure(state: &WebState, report: Report<FetchError>) -> Response {
    error!("Failed to load property sheet: {:?}", report);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        views::fetch_error_page(&state.dashboard, report.current_context()),
    )
        .into_response()
}

/// GET / - search form, summary and ranked table
#[instrument(skip(state))]
async fn ranking_page(
    State(state): State<WebState>,
    Query(params): Query<SearchParams>,
) -> Response {
    match state.service.ranking(&params.request()).await {
        Ok(page) => views::ranking_page(&state.dashboard, &params.form(), &page).into_response(),
        Err(report) => fetch_failure(&state, report),
    }
}

/// GET /unit/:row - rank history and other-zone comparison for one row
#[instrument(skip(state))]
async fn unit_page(
    State(state): State<WebState>,
    Path(row): Path<usize>,
    Query(params): Query<DetailParams>,
) -> Response {
    match state
        .service
        .unit_detail(row, parse_year(params.year.as_deref()))
        .await
    {
        Ok(Some(detail)) => views::detail_page(&state.dashboard, &detail).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, views::not_found_page(&state.dashboard)).into_response(),
        Err(report) => fetch_failure(&state, report),
    }
}

/// POST /reload - drop cached rows and go back to the ranking
#[instrument(skip(state))]
async fn reload(State(state): State<WebState>) -> Redirect {
    state.service.reload().await;
    Redirect::to("/")
}

/// GET /api/ranking - the ranking page's data as JSON
#[instrument(skip(state))]
async fn api_ranking(
    State(state): State<WebState>,
    Query(params): Query<SearchParams>,
) -> Response {
    match state.service.ranking(&params.request()).await {
        Ok(page) => Json(ApiResponse::ok(RankingResponse {
            value_year: page.selected_year,
            zones: page.zones,
            years: page.years,
            summary: page.view.summary,
            records: page.view.records,
        }))
        .into_response(),
        Err(report) => {
            error!("Failed to load property sheet: {:?}", report);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::<RankingResponse>::failed(
                    report.current_context().to_string(),
                )),
            )
                .into_response()
        }
    }
}

/// GET /api/health
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use error_stack::report;
    use property_rank_core::{
        application::{dashboard_service::DashboardSettings, usage_logger::UsageLogger},
        domain::{property::SheetRows, sheets::row::Row},
        ports::property_source::{PropertySource, SheetLocation},
    };
    use tower::ServiceExt;

    use super::*;

    struct StaticSource(SheetRows);

    #[async_trait::async_trait]
    impl PropertySource for StaticSource {
        async fn fetch(
            &self,
            _location: &SheetLocation,
            _row_cap: Option<u32>,
        ) -> error_stack::Result<SheetRows, FetchError> {
            Ok(self.0.clone())
        }
    }

    struct DeniedSource;

    #[async_trait::async_trait]
    impl PropertySource for DeniedSource {
        async fn fetch(
            &self,
            _location: &SheetLocation,
            _row_cap: Option<u32>,
        ) -> error_stack::Result<SheetRows, FetchError> {
            Err(report!(FetchError::PermissionDenied))
        }
    }

    fn state(source: impl PropertySource + 'static) -> WebState {
        let settings = DashboardSettings {
            location: SheetLocation::new("main", 0),
            row_cap: None,
            header_row: Row::FIRST,
            preferred_year: None,
            value_unit: "억".to_string(),
        };
        WebState {
            service: Arc::new(DashboardService::new(
                Arc::new(source),
                UsageLogger::disabled(),
                settings,
            )),
            dashboard: Arc::new(DashboardConfig::default()),
        }
    }

    fn sample() -> StaticSource {
        let rows = [["id", "value"], ["A", "100"], ["B", "abc"], ["C", "300"]];
        StaticSource(Arc::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        ))
    }

    fn district() -> StaticSource {
        let rows = [
            ["구역", "단지명", "동", "호", "2016", "2017"],
            ["1구역", "현대", "1", "101", "20", "24"],
            ["2구역", "한양", "2", "201", "19", "26"],
        ];
        StaticSource(Arc::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        ))
    }

    async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_ranking_page() {
        let (status, body) = send(router(state(sample())), Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("300억"));
        assert!(body.contains("href=\"/unit/2\""));
    }

    #[tokio::test]
    async fn test_zero_results_message() {
        let (status, body) = send(router(state(sample())), Method::GET, "/?q=zzz").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("에 해당하는 결과가 없습니다"));
    }

    #[tokio::test]
    async fn test_unknown_sort_falls_back() {
        let (status, _) = send(
            router(state(sample())),
            Method::GET,
            "/?sort=bogus&year=abc",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_permission_denied_shows_recoverable_error() {
        let app = router(state(DeniedSource));
        let (status, body) = send(app.clone(), Method::GET, "/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("action=\"/reload\""));

        // The server keeps answering.
        let (status, _) = send(app, Method::GET, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reload_redirects_home() {
        let response = router(state(sample()))
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_api_ranking() {
        let (status, body) = send(router(state(sample())), Method::GET, "/api/ranking").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["summary"]["dropped_count"], 1);
        assert_eq!(json["data"]["records"][0]["identifier"], "C");
        assert_eq!(json["data"]["records"][0]["rank"], 1);
    }

    #[tokio::test]
    async fn test_api_ranking_error() {
        let (status, body) = send(router(state(DeniedSource)), Method::GET, "/api/ranking").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_unit_pages() {
        let app = router(state(sample()));
        let (status, body) = send(app.clone(), Method::GET, "/unit/2").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("300억"));

        let (status, _) = send(app, Method::GET, "/unit/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unit_links_keep_selected_year() {
        let app = router(state(district()));
        let (status, body) = send(app.clone(), Method::GET, "/?year=2016").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("href=\"/unit/0?year=2016\""));
        assert!(!body.contains("href=\"/unit/0\""));

        let (status, body) = send(app, Method::GET, "/unit/0?year=2016").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("2016년 "));
        assert!(body.contains("20억"));
    }

    #[tokio::test]
    async fn test_configuration_error_on_every_route() {
        let app = configuration_error_router("no service account credentials".to_string());
        for uri in ["/", "/api/health", "/unit/1"] {
            let (status, body) = send(app.clone(), Method::GET, uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(body.contains("no service account credentials"));
        }
    }
}
