//! Web 服务器模块

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::error::ExtractError;
use crate::terabox::types::{ExtractionResult, STATUS_KEY};
use crate::AppState;

// 缓存 HTML 模板（避免每次都读取）
static HTML_TEMPLATE: &str = include_str!("../templates/index.html");

#[derive(Debug, Deserialize)]
pub struct ExtractQuery {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
}

/// 首页 - 返回 HTML 表单
pub async fn index_handler() -> Html<&'static str> {
    Html(HTML_TEMPLATE)
}

/// 健康检查端点
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION,
    })
}

/// 解析 API：`GET /api?url=<share_url>`
pub async fn extract_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ExtractQuery>, QueryRejection>,
) -> Response {
    // 查询串解析失败也要返回 JSON
    let query = match query {
        Ok(Query(query)) => query,
        Err(e) => {
            warn!("❌ 查询参数无效: {}", e);
            return failure_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid query string: {}", e.body_text()),
            );
        }
    };

    let Some(url) = query.url.filter(|u| !u.trim().is_empty()) else {
        warn!("❌ 缺少 url 参数");
        return failure_response(StatusCode::BAD_REQUEST, "Missing URL parameter");
    };

    info!("📥 收到解析请求: {}", url);

    // 在独立任务中执行，panic 会以 JoinError 的形式返回
    let task_state = Arc::clone(&state);
    let joined = tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        task_state
            .extractor
            .extract(&task_state.fetcher, &url, &mut rng)
            .await
    })
    .await;

    let result = match joined {
        Ok(result) => result,
        Err(e) => {
            error!("❌ 解析任务异常: {}", e);
            ExtractionResult::Failure(ExtractError::Internal(e.to_string()))
        }
    };

    (status_code(&result), Json(result)).into_response()
}

/// `/api` 只接受 GET
pub async fn method_not_allowed_handler() -> Response {
    let mut resp = failure_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    resp.headers_mut()
        .insert(header::ALLOW, header::HeaderValue::from_static("GET"));
    resp
}

/// 成功 200，可识别的解析失败 400，意外错误 500
pub fn status_code(result: &ExtractionResult) -> StatusCode {
    match result {
        ExtractionResult::Success { .. } => StatusCode::OK,
        ExtractionResult::Failure(e) if e.is_internal() => StatusCode::INTERNAL_SERVER_ERROR,
        ExtractionResult::Failure(_) => StatusCode::BAD_REQUEST,
    }
}

fn failure_response(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({ STATUS_KEY: ExtractionResult::failure_status(message) });
    (status, Json(body)).into_response()
}

/// 创建 Web 路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD]);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route(
            "/api",
            get(extract_handler).fallback(method_not_allowed_handler),
        )
        .with_state(state)
        .layer(cors)
}
