//! # 재료 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/ingredients?name=<접두사>` → 재료 목록 (페이지네이션 없음)
//! - `GET /api/ingredients/{id}`          → 재료 조회
//!
//! 재료는 읽기 전용입니다. 데이터는 `load-data` 명령으로 적재합니다.

use crate::{db, error::AppError, models::*, routes::AppState};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};

/// `GET /ingredients` — `name`이 있으면 이름이 그 문자열로 시작하는 재료만 돌려줍니다.
pub async fn list_ingredients(
    State(state): State<AppState>,
    query: Result<Query<IngredientQuery>, QueryRejection>,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    let Query(query) = query?;
    let prefix = query.name.as_deref().filter(|name| !name.is_empty());

    let mut conn = state.pool.acquire().await?;
    let ingredients = db::list_ingredients(&mut conn, prefix).await?;
    Ok(Json(ingredients))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ingredient>, AppError> {
    let mut conn = state.pool.acquire().await?;
    let ingredient = db::get_ingredient(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(ingredient))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestContext;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn search_by_prefix_and_fetch_one() {
        let ctx = TestContext::new().await;
        ctx.seed_catalog().await;

        let (status, body) = ctx
            .send_json(Method::GET, "/api/ingredients?name=s", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Salt", "Sugar"]);

        let (status, body) = ctx.send_json(Method::GET, "/api/ingredients", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 4);

        let (status, body) = ctx.send_json(Method::GET, "/api/ingredients/2", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["measurement_unit"], "ml");

        let (status, _) = ctx.send_json(Method::GET, "/api/ingredients/99", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
