//! # 레시피 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/recipes`                         → 레시피 목록 (필터, 페이지네이션)
//! - `POST   /api/recipes`                         → 레시피 작성
//! - `GET    /api/recipes/{id}`                    → 레시피 조회
//! - `PATCH  /api/recipes/{id}`, `PUT`             → 레시피 수정 (작성자만)
//! - `DELETE /api/recipes/{id}`                    → 레시피 삭제 (작성자만)
//! - `POST   /api/recipes/{id}/favorite`           → 즐겨찾기 추가
//! - `DELETE /api/recipes/{id}/favorite`           → 즐겨찾기 해제
//! - `POST   /api/recipes/{id}/shopping_cart`      → 장바구니 추가
//! - `DELETE /api/recipes/{id}/shopping_cart`      → 장바구니 제거
//! - `GET    /api/recipes/download_shopping_cart`  → 장바구니 재료 합계 텍스트 파일
//!
//! ## 목록 필터
//! - `author=<사용자 ID>`
//! - `tags=<slug>` (여러 번 지정 가능, 하나라도 일치하면 포함)
//! - `is_favorited`, `is_in_shopping_cart` = `1`/`true`/`0`/`false` (익명 요청에서는 무시)
//!
//! ## 이미지 파일과 트랜잭션
//! 이미지는 트랜잭션 시작 전에 디코딩하고, 커밋 전에 파일로 씁니다.
//! 커밋까지 가지 못하면 새로 쓴 파일을 지우고, 커밋에 성공하면 교체된 이전 파일을 지웁니다.

use crate::{
    db::{self, RecipeCollection},
    error::AppError,
    middleware::{auth::AuthUser, permissions::ensure_author},
    models::*,
    routes::AppState,
    services::{
        images,
        pagination::{Page, Pagination},
        shopping_list, validation,
    },
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::{Sqlite, SqliteConnection, Transaction};

/// DB 행을 응답 표현으로 바꿉니다. 작성자, 태그, 재료를 함께 조회합니다.
async fn recipe_response(
    conn: &mut SqliteConnection,
    row: RecipeRow,
    viewer: Option<i64>,
    media_url: &str,
) -> Result<RecipeResponse, AppError> {
    let author = db::users::get_user_view(conn, row.author_id, viewer)
        .await?
        .ok_or_else(|| AppError::Internal(format!("recipe {} has no author", row.id)))?;
    let tags = db::get_recipe_tags(conn, row.id).await?;
    let ingredients = db::get_recipe_ingredients(conn, row.id).await?;

    Ok(RecipeResponse {
        id: row.id,
        tags,
        author,
        ingredients,
        is_favorited: row.is_favorited,
        is_in_shopping_cart: row.is_in_shopping_cart,
        name: row.name,
        image: images::image_url(media_url, &row.image),
        text: row.text,
        cooking_time: row.cooking_time,
    })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(AppError::BadRequest(format!(
            "{key}: expected one of 1, true, 0, false"
        ))),
    }
}

/// 쿼리 문자열의 (키, 값) 목록에서 목록 필터를 만듭니다.
/// 알 수 없는 키(page, limit 등)는 무시합니다.
fn parse_filter(pairs: &[(String, String)]) -> Result<RecipeFilter, AppError> {
    let mut filter = RecipeFilter::default();
    for (key, value) in pairs {
        match key.as_str() {
            "author" => {
                let author = value.parse::<i64>().map_err(|_| {
                    AppError::BadRequest("author: expected a user id".to_string())
                })?;
                filter.author = Some(author);
            }
            "tags" if !value.is_empty() => {
                if !filter.tags.contains(value) {
                    filter.tags.push(value.clone());
                }
            }
            "is_favorited" => filter.is_favorited = Some(parse_flag(key, value)?),
            "is_in_shopping_cart" => filter.is_in_shopping_cart = Some(parse_flag(key, value)?),
            _ => {}
        }
    }
    Ok(filter)
}

/// 태그와 재료 ID가 모두 존재하는지 확인합니다.
async fn ensure_references_exist(
    conn: &mut SqliteConnection,
    tags: &[i64],
    ingredients: &[IngredientAmount],
) -> Result<(), AppError> {
    if let Some(id) = db::first_missing_id(conn, "tags", tags).await? {
        tracing::debug!("Unknown tag {} in recipe write", id);
        return Err(AppError::NotFound);
    }
    let ingredient_ids: Vec<i64> = ingredients.iter().map(|item| item.id).collect();
    if let Some(id) = db::first_missing_id(conn, "ingredients", &ingredient_ids).await? {
        tracing::debug!("Unknown ingredient {} in recipe write", id);
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// 새로 쓴 이미지 파일이 커밋되지 못했으면 지웁니다.
async fn discard_image_on_error<T>(
    result: Result<T, AppError>,
    media_path: &str,
    image_path: Option<&str>,
) -> Result<T, AppError> {
    if result.is_err() {
        if let Some(image_path) = image_path {
            images::remove_image(media_path, image_path).await;
        }
    }
    result
}

/// `GET /recipes` — 필터에 맞는 레시피 목록 (최신순)
pub async fn list_recipes(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Page<RecipeResponse>>, AppError> {
    let Query(pairs) = query?;
    let filter = parse_filter(&pairs)?;
    let pagination = Pagination::from_pairs(&pairs, state.page_size)?;
    let viewer_id = viewer.map(|user| user.user_id);

    let mut conn = state.pool.acquire().await?;
    if let Some(slug) = db::find_unknown_slug(&mut conn, &filter.tags).await? {
        return Err(AppError::BadRequest(format!("tags: unknown tag '{slug}'")));
    }

    let count = db::count_recipes(&mut conn, viewer_id, &filter).await?;
    pagination.ensure_in_range(count)?;
    let rows = db::list_recipes(
        &mut conn,
        viewer_id,
        &filter,
        pagination.limit,
        pagination.offset(),
    )
    .await?;

    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        results.push(recipe_response(&mut conn, row, viewer_id, &state.media_url).await?);
    }

    Ok(Json(Page::new(results, count, pagination, &uri)))
}

/// `GET /recipes/{id}`
pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeResponse>, AppError> {
    let viewer_id = viewer.map(|user| user.user_id);

    let mut conn = state.pool.acquire().await?;
    let row = db::get_recipe(&mut conn, id, viewer_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(
        recipe_response(&mut conn, row, viewer_id, &state.media_url).await?,
    ))
}

/// `POST /recipes` — 요청자를 작성자로 레시피를 만듭니다.
pub async fn create_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    body: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeResponse>), AppError> {
    let Json(req) = body?;
    validation::validate_create_recipe(&req)?;
    let image = images::decode_data_uri(&req.image)?;

    let mut tx = db::begin_write(&state.pool).await?;
    if db::recipe_name_taken(&mut tx, &req.name, None).await? {
        return Err(AppError::Conflict(format!(
            "name: a recipe named '{}' already exists",
            req.name
        )));
    }
    ensure_references_exist(&mut tx, &req.tags, &req.ingredients).await?;

    let image_path = images::save_image(&state.media_path, &image).await?;
    let result = insert_and_commit(tx, &req, auth_user.user_id, &image_path, &state.media_url).await;
    let response = discard_image_on_error(result, &state.media_path, Some(image_path.as_str())).await?;

    tracing::info!(
        "Recipe {} created by user {}",
        response.id,
        auth_user.user_id
    );
    Ok((StatusCode::CREATED, Json(response)))
}

async fn insert_and_commit(
    mut tx: Transaction<'_, Sqlite>,
    req: &CreateRecipeRequest,
    author_id: i64,
    image_path: &str,
    media_url: &str,
) -> Result<RecipeResponse, AppError> {
    let id = db::insert_recipe(&mut tx, author_id, req, image_path).await?;
    db::insert_recipe_associations(&mut tx, id, &req.tags, &req.ingredients).await?;

    let row = db::get_recipe(&mut tx, id, Some(author_id))
        .await?
        .ok_or(AppError::NotFound)?;
    let response = recipe_response(&mut tx, row, Some(author_id), media_url).await?;
    tx.commit().await?;

    Ok(response)
}

/// `PATCH /recipes/{id}`, `PUT /recipes/{id}` — 작성자만 수정할 수 있습니다.
///
/// 태그와 재료는 요청 목록으로 통째로 교체됩니다. 작성자가 아니면
/// 트랜잭션이 롤백되어 아무것도 바뀌지 않습니다.
pub async fn update_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    body: Result<Json<UpdateRecipeRequest>, JsonRejection>,
) -> Result<Json<RecipeResponse>, AppError> {
    let Json(req) = body?;
    validation::validate_update_recipe(&req)?;
    let new_image = req
        .image
        .as_deref()
        .map(images::decode_data_uri)
        .transpose()?;

    let mut tx = db::begin_write(&state.pool).await?;
    let (author_id, old_image) = db::lock_recipe_for_update(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_author(author_id, &auth_user)?;

    if let Some(name) = &req.name {
        if db::recipe_name_taken(&mut tx, name, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "name: a recipe named '{name}' already exists"
            )));
        }
    }
    ensure_references_exist(&mut tx, &req.tags, &req.ingredients).await?;

    let new_image_path = match &new_image {
        Some(image) => Some(images::save_image(&state.media_path, image).await?),
        None => None,
    };
    let result = update_and_commit(
        tx,
        id,
        &req,
        new_image_path.as_deref(),
        auth_user.user_id,
        &state.media_url,
    )
    .await;
    let response =
        discard_image_on_error(result, &state.media_path, new_image_path.as_deref()).await?;

    if new_image_path.is_some() {
        images::remove_image(&state.media_path, &old_image).await;
    }
    tracing::info!("Recipe {} updated", id);
    Ok(Json(response))
}

async fn update_and_commit(
    mut tx: Transaction<'_, Sqlite>,
    id: i64,
    req: &UpdateRecipeRequest,
    image_path: Option<&str>,
    viewer: i64,
    media_url: &str,
) -> Result<RecipeResponse, AppError> {
    db::update_recipe_fields(&mut tx, id, req, image_path).await?;
    db::replace_recipe_associations(&mut tx, id, &req.tags, &req.ingredients).await?;

    let row = db::get_recipe(&mut tx, id, Some(viewer))
        .await?
        .ok_or(AppError::NotFound)?;
    let response = recipe_response(&mut tx, row, Some(viewer), media_url).await?;
    tx.commit().await?;

    Ok(response)
}

/// `DELETE /recipes/{id}` — 작성자만 삭제할 수 있습니다.
pub async fn delete_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = db::begin_write(&state.pool).await?;
    let row = db::get_recipe(&mut tx, id, None)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_author(row.author_id, &auth_user)?;

    let image = db::delete_recipe(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound)?;
    tx.commit().await?;

    images::remove_image(&state.media_path, &image).await;
    tracing::info!("Recipe {} deleted by user {}", id, auth_user.user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// 즐겨찾기/장바구니 추가. 레시피가 없으면 404, 이미 있으면 400.
async fn add_recipe_to(
    state: &AppState,
    user: AuthUser,
    recipe_id: i64,
    collection: RecipeCollection,
) -> Result<(StatusCode, Json<RecipeShort>), AppError> {
    let mut tx = db::begin_write(&state.pool).await?;
    let recipe = db::get_recipe_short(&mut tx, recipe_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !db::add_to_collection(&mut tx, collection, user.user_id, recipe_id).await? {
        return Err(AppError::Conflict(format!(
            "recipe {} is already in {}",
            recipe_id,
            collection.label()
        )));
    }
    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(recipe.with_media_url(&state.media_url)),
    ))
}

/// 즐겨찾기/장바구니 제거. 레시피가 없거나 담겨 있지 않으면 404.
async fn remove_recipe_from(
    state: &AppState,
    user: AuthUser,
    recipe_id: i64,
    collection: RecipeCollection,
) -> Result<StatusCode, AppError> {
    let mut tx = db::begin_write(&state.pool).await?;
    if db::get_recipe_short(&mut tx, recipe_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    if !db::remove_from_collection(&mut tx, collection, user.user_id, recipe_id).await? {
        return Err(AppError::NotFound);
    }
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_favorite(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeShort>), AppError> {
    add_recipe_to(&state, auth_user, id, RecipeCollection::Favorites).await
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    remove_recipe_from(&state, auth_user, id, RecipeCollection::Favorites).await
}

pub async fn add_to_shopping_cart(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeShort>), AppError> {
    add_recipe_to(&state, auth_user, id, RecipeCollection::ShoppingCart).await
}

pub async fn remove_from_shopping_cart(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    remove_recipe_from(&state, auth_user, id, RecipeCollection::ShoppingCart).await
}

/// `GET /recipes/download_shopping_cart` — 장바구니 재료 합계를 텍스트 첨부 파일로 돌려줍니다.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.pool.acquire().await?;
    let items = db::shopping_list_totals(&mut conn, auth_user.user_id).await?;
    let body = shopping_list::render_shopping_list(&items);

    let headers = [
        (
            header::CONTENT_TYPE,
            "text/plain; charset=utf-8".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", shopping_list::FILE_NAME),
        ),
    ];
    Ok((headers, body))
}
