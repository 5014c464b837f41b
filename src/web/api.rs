use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use super::pages::SearchParams;
use super::response::{ApiResponse, ApiResult};
use super::session::WebSession;
use super::AppState;
use crate::auth::{Gate, SessionGate};
use crate::error::ApiError;
use crate::models::{Feedback, Paper};
use crate::pages::dashboard::feedback_notice;
use crate::pages::{DashboardPage, Notice};
use crate::repository::FeedbackRepository;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub paper_id: Uuid,
    pub is_helpful: bool,
}

#[derive(Debug, Serialize)]
pub struct FeedbackRecorded {
    pub feedback: Feedback,
    pub notice: Notice,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "local_token_checks": state.backend.verifies_tokens_locally(),
    }))
}

/// GET /api/papers?q= - the dashboard list as JSON, filtered like the page
pub async fn papers(session: WebSession, Query(params): Query<SearchParams>) -> Response {
    let result: ApiResult<Vec<Paper>> = async {
        let mut page = match DashboardPage::enter(session.client()).await {
            Gate::Redirect(_) => return Err(ApiError::unauthorized("Authentication required")),
            Gate::Admitted(page) => page,
        };
        if let Some(notice) = page.load().await {
            return Err(ApiError::bad_gateway(notice.description));
        }
        page.set_query(params.q);
        Ok(ApiResponse::success(page.visible().into_iter().cloned().collect()))
    }
    .await;

    session.finish(result.into_response(), None)
}

/// POST /api/feedback - record a thumbs up/down for the signed-in user
pub async fn feedback(session: WebSession, Json(request): Json<FeedbackRequest>) -> Response {
    let result: ApiResult<FeedbackRecorded> = async {
        let gated = match SessionGate::enter(session.client()).await {
            Gate::Redirect(_) => return Err(ApiError::unauthorized("Authentication required")),
            Gate::Admitted(gated) => gated,
        };
        let user_id = gated.user_id();
        match FeedbackRepository::new(session.client().clone())
            .submit(user_id, request.paper_id, request.is_helpful)
            .await
        {
            Ok(feedback) => Ok(ApiResponse::success(FeedbackRecorded {
                feedback,
                notice: feedback_notice(true),
            })),
            Err(e) => {
                warn!(%user_id, paper_id = %request.paper_id, "feedback failed: {}", e);
                Err(ApiError::bad_gateway(feedback_notice(false).description))
            }
        }
    }
    .await;

    session.finish(result.into_response(), None)
}
