//! # 태그 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/tags`      → 전체 태그 목록 (페이지네이션 없음)
//! - `GET /api/tags/{id}` → 태그 조회

use crate::{db, error::AppError, models::*, routes::AppState};
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, AppError> {
    let mut conn = state.pool.acquire().await?;
    let tags = db::list_tags(&mut conn).await?;
    Ok(Json(tags))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Tag>, AppError> {
    let mut conn = state.pool.acquire().await?;
    let tag = db::get_tag(&mut conn, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(tag))
}
