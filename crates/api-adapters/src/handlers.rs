//! # Board Handlers
//!
//! This module coordinates the flow between HTTP requests and `BoardService`.
//! Bodies are JSON or HTML form posts; missing fields deserialize as empty and
//! are rejected by the service, so every input error comes back as a 400.

use axum::extract::{Path, Query, State};
use axum::Json;
use domains::{ReplyView, ThreadDetail, ThreadSummary, ThreadView, REPORTED};
use serde::Deserialize;
use services::BoardService;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::Payload;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct NewThreadBody {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewReplyBody {
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ThreadRef {
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteThreadBody {
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRef {
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub reply_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteReplyBody {
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub reply_id: Option<String>,
    #[serde(default)]
    pub delete_password: String,
}

fn parse_id(field: &str, raw: Option<&str>) -> ApiResult<Uuid> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{field} is required")))?;
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("{field} is not a valid id")))
}

/// `POST /api/threads/{board}`
pub async fn create_thread(
    State(service): State<BoardService>,
    Path(board): Path<String>,
    Payload(body): Payload<NewThreadBody>,
) -> ApiResult<Json<ThreadView>> {
    let thread = service
        .create_thread(&board, &body.text, &body.delete_password)
        .await?;
    Ok(Json(thread))
}

/// `GET /api/threads/{board}`
pub async fn list_threads(
    State(service): State<BoardService>,
    Path(board): Path<String>,
) -> ApiResult<Json<Vec<ThreadSummary>>> {
    Ok(Json(service.list_recent_threads(&board).await?))
}

/// `DELETE /api/threads/{board}`
pub async fn delete_thread(
    State(service): State<BoardService>,
    Path(board): Path<String>,
    Payload(body): Payload<DeleteThreadBody>,
) -> ApiResult<&'static str> {
    let thread_id = parse_id("thread_id", body.thread_id.as_deref())?;
    let outcome = service
        .delete_thread(&board, thread_id, &body.delete_password)
        .await?;
    Ok(outcome.as_str())
}

/// `PUT /api/threads/{board}`
pub async fn report_thread(
    State(service): State<BoardService>,
    Path(board): Path<String>,
    Payload(body): Payload<ThreadRef>,
) -> ApiResult<&'static str> {
    let thread_id = parse_id("thread_id", body.thread_id.as_deref())?;
    service.report_thread(&board, thread_id).await?;
    Ok(REPORTED)
}

/// `POST /api/replies/{board}`
pub async fn create_reply(
    State(service): State<BoardService>,
    Path(board): Path<String>,
    Payload(body): Payload<NewReplyBody>,
) -> ApiResult<Json<ReplyView>> {
    let thread_id = parse_id("thread_id", body.thread_id.as_deref())?;
    let reply = service
        .add_reply(&board, thread_id, &body.text, &body.delete_password)
        .await?;
    Ok(Json(reply))
}

/// `GET /api/replies/{board}?thread_id=...`
pub async fn get_thread(
    State(service): State<BoardService>,
    Path(board): Path<String>,
    Query(query): Query<ThreadRef>,
) -> ApiResult<Json<ThreadDetail>> {
    let thread_id = parse_id("thread_id", query.thread_id.as_deref())?;
    Ok(Json(service.get_thread(&board, thread_id).await?))
}

/// `DELETE /api/replies/{board}`
pub async fn delete_reply(
    State(service): State<BoardService>,
    Path(board): Path<String>,
    Payload(body): Payload<DeleteReplyBody>,
) -> ApiResult<&'static str> {
    let thread_id = parse_id("thread_id", body.thread_id.as_deref())?;
    let reply_id = parse_id("reply_id", body.reply_id.as_deref())?;
    let outcome = service
        .delete_reply(&board, thread_id, reply_id, &body.delete_password)
        .await?;
    Ok(outcome.as_str())
}

/// `PUT /api/replies/{board}`
pub async fn report_reply(
    State(service): State<BoardService>,
    Path(board): Path<String>,
    Payload(body): Payload<ReplyRef>,
) -> ApiResult<&'static str> {
    let thread_id = parse_id("thread_id", body.thread_id.as_deref())?;
    let reply_id = parse_id("reply_id", body.reply_id.as_deref())?;
    service.report_reply(&board, thread_id, reply_id).await?;
    Ok(REPORTED)
}

pub async fn health() -> &'static str {
    "ok"
}
