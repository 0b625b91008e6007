//! # 사용자 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST   /api/users`                  → 회원가입
//! - `GET    /api/users`                  → 사용자 목록 (페이지네이션)
//! - `GET    /api/users/{id}`             → 사용자 조회
//! - `GET    /api/users/me`               → 내 정보
//! - `DELETE /api/users/me`               → 계정 삭제 (작성한 레시피와 관계 포함)
//! - `POST   /api/users/set_password`     → 비밀번호 변경
//! - `GET    /api/users/subscriptions`    → 내가 구독한 작성자 목록
//! - `POST   /api/users/{id}/subscribe`   → 구독
//! - `DELETE /api/users/{id}/subscribe`   → 구독 해제
//!
//! 구독 응답은 작성자의 최신 레시피를 `recipes_limit`개까지 포함합니다.

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::{
        auth::{hash_password, verify_password},
        AppState,
    },
    services::{images, pagination::{Page, Pagination}, validation},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use sqlx::SqliteConnection;

/// `POST /users` — 새 계정을 만듭니다.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredUser>), AppError> {
    let Json(req) = body?;
    validation::validate_registration(&req)?;
    let password_hash = hash_password(&req.password)?;

    let mut tx = db::begin_write(&state.pool).await?;
    if db::users::find_by_email(&mut tx, &req.email).await?.is_some() {
        return Err(AppError::Conflict("email: already registered".to_string()));
    }
    if db::users::find_by_username(&mut tx, &req.username).await?.is_some() {
        return Err(AppError::Conflict("username: already taken".to_string()));
    }
    let user = db::users::create_user(&mut tx, &req, &password_hash).await?;
    tx.commit().await?;

    tracing::info!("Registered user {} ({})", user.id, user.username);
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /users?page&limit` — 사용자 목록. 익명도 조회할 수 있습니다.
pub async fn list_users(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Page<UserResponse>>, AppError> {
    let Query(pairs) = query?;
    let pagination = Pagination::from_pairs(&pairs, state.page_size)?;
    let viewer_id = viewer.map(|user| user.user_id);

    let mut conn = state.pool.acquire().await?;
    let count = db::users::count_users(&mut conn).await?;
    pagination.ensure_in_range(count)?;
    let users =
        db::users::list_users(&mut conn, viewer_id, pagination.limit, pagination.offset()).await?;

    Ok(Json(Page::new(users, count, pagination, &uri)))
}

/// `GET /users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let mut conn = state.pool.acquire().await?;
    let user = db::users::get_user_view(&mut conn, id, viewer.map(|user| user.user_id))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user))
}

/// `GET /users/me`
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let mut conn = state.pool.acquire().await?;
    let user = db::users::get_user_view(&mut conn, auth_user.user_id, Some(auth_user.user_id))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user))
}

/// `POST /users/set_password` — 현재 비밀번호를 확인한 뒤 새 비밀번호로 바꿉니다.
pub async fn set_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    body: Result<Json<SetPasswordRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(req) = body?;
    validation::validate_password(&req.new_password)?;

    let mut tx = db::begin_write(&state.pool).await?;
    let user = db::users::find_by_id(&mut tx, auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !verify_password(&req.current_password, &user.password_hash)? {
        return Err(AppError::BadRequest(
            "current_password: incorrect password".to_string(),
        ));
    }
    let password_hash = hash_password(&req.new_password)?;
    db::users::update_password(&mut tx, user.id, &password_hash).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /users/me` — 계정을 삭제합니다.
///
/// 작성한 레시피, 구독 관계, 즐겨찾기, 장바구니가 한 트랜잭션에서 함께 지워지고,
/// 커밋 후 레시피 이미지 파일을 삭제합니다.
pub async fn delete_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    body: Result<Json<DeleteAccountRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(req) = body?;

    let mut tx = db::begin_write(&state.pool).await?;
    let user = db::users::find_by_id(&mut tx, auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !verify_password(&req.current_password, &user.password_hash)? {
        return Err(AppError::BadRequest(
            "current_password: incorrect password".to_string(),
        ));
    }
    let removed_images = db::users::delete_user(&mut tx, user.id).await?;
    tx.commit().await?;

    for image in &removed_images {
        images::remove_image(&state.media_path, image).await;
    }
    tracing::info!(
        "Deleted user {} with {} recipes",
        user.id,
        removed_images.len()
    );
    Ok(StatusCode::NO_CONTENT)
}

/// `recipes_limit`는 0 이상의 정수여야 합니다.
fn checked_recipes_limit(query: &RecipesLimitQuery) -> Result<Option<i64>, AppError> {
    match query.recipes_limit {
        Some(limit) if limit < 0 => Err(AppError::BadRequest(
            "recipes_limit: must be a non-negative integer".to_string(),
        )),
        limit => Ok(limit),
    }
}

/// 작성자 표현에 최신 레시피 목록과 전체 레시피 수를 붙입니다.
async fn subscription_response(
    conn: &mut SqliteConnection,
    user: UserResponse,
    recipes_limit: Option<i64>,
    media_url: &str,
) -> Result<SubscriptionResponse, AppError> {
    let recipes = db::list_author_recipes(conn, user.id, recipes_limit)
        .await?
        .into_iter()
        .map(|recipe| recipe.with_media_url(media_url))
        .collect();
    let recipes_count = db::count_author_recipes(conn, user.id).await?;

    Ok(SubscriptionResponse {
        user,
        recipes,
        recipes_count,
    })
}

/// `GET /users/subscriptions?page&limit&recipes_limit`
pub async fn subscriptions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    OriginalUri(uri): OriginalUri,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
    limit_query: Result<Query<RecipesLimitQuery>, QueryRejection>,
) -> Result<Json<Page<SubscriptionResponse>>, AppError> {
    let Query(pairs) = pairs?;
    let Query(limit_query) = limit_query?;
    let recipes_limit = checked_recipes_limit(&limit_query)?;
    let pagination = Pagination::from_pairs(&pairs, state.page_size)?;

    let mut conn = state.pool.acquire().await?;
    let count = db::count_subscriptions(&mut conn, auth_user.user_id).await?;
    pagination.ensure_in_range(count)?;
    let authors = db::list_subscriptions(
        &mut conn,
        auth_user.user_id,
        pagination.limit,
        pagination.offset(),
    )
    .await?;

    let mut results = Vec::with_capacity(authors.len());
    for author in authors {
        results.push(subscription_response(&mut conn, author, recipes_limit, &state.media_url).await?);
    }

    Ok(Json(Page::new(results, count, pagination, &uri)))
}

fn reject_self_subscription(auth_user: &AuthUser, author_id: i64) -> Result<(), AppError> {
    if auth_user.user_id == author_id {
        return Err(AppError::Conflict(
            "cannot subscribe to yourself".to_string(),
        ));
    }
    Ok(())
}

/// `POST /users/{id}/subscribe?recipes_limit`
pub async fn subscribe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(author_id): Path<i64>,
    limit_query: Result<Query<RecipesLimitQuery>, QueryRejection>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), AppError> {
    let Query(limit_query) = limit_query?;
    let recipes_limit = checked_recipes_limit(&limit_query)?;
    reject_self_subscription(&auth_user, author_id)?;

    let mut tx = db::begin_write(&state.pool).await?;
    if db::users::find_by_id(&mut tx, author_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    if !db::follow(&mut tx, auth_user.user_id, author_id).await? {
        return Err(AppError::Conflict("already subscribed".to_string()));
    }
    let author = db::users::get_user_view(&mut tx, author_id, Some(auth_user.user_id))
        .await?
        .ok_or(AppError::NotFound)?;
    let response = subscription_response(&mut tx, author, recipes_limit, &state.media_url).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// `DELETE /users/{id}/subscribe`
pub async fn unsubscribe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(author_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    reject_self_subscription(&auth_user, author_id)?;

    let mut tx = db::begin_write(&state.pool).await?;
    if db::users::find_by_id(&mut tx, author_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    if !db::unfollow(&mut tx, auth_user.user_id, author_id).await? {
        return Err(AppError::NotFound);
    }
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
