//! # 레시피 모델 정의
//!
//! ## 구조체 역할
//! - `RecipeRow`: `recipes` 테이블 한 행 + 요청자 기준 플래그 두 개
//! - `RecipeIngredient`: 레시피에 포함된 재료와 수량 (응답용)
//! - `RecipeResponse`: 조회/생성/수정 API가 공통으로 돌려주는 읽기 표현
//! - `RecipeShort`: 즐겨찾기·장바구니·구독 응답에 쓰이는 축약 표현
//! - `CreateRecipeRequest` / `UpdateRecipeRequest`: 쓰기 요청 본문
//!
//! 쓰기 요청과 읽기 응답은 별도의 타입입니다.
//! 어떤 타입을 쓸지는 라우트 테이블이 정하며, 핸들러 안에서 HTTP 메서드로 분기하지 않습니다.

use serde::{Deserialize, Serialize};

use super::{Tag, UserResponse};

/// `recipes` 테이블 한 행과 요청자 기준으로 계산된 플래그.
///
/// 익명 요청이면 두 플래그는 쿼리에서 상수 0으로 선택되므로 항상 false입니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    /// 미디어 디렉토리 기준 상대 경로 (예: "recipes/images/0190....png")
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// 레시피에 포함된 재료 한 줄. `id`는 재료(Ingredient)의 ID입니다.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RecipeIngredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// 레시피 읽기 표현. 쓰기 응답도 이 모양으로 돌려줍니다.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// 공개 이미지 URL (예: "/media/recipes/images/0190....png")
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
}

/// 레시피 축약 표현.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecipeShort {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

impl RecipeShort {
    /// DB에 저장된 상대 경로를 공개 URL로 바꿉니다.
    pub fn with_media_url(mut self, media_url: &str) -> Self {
        self.image = crate::services::images::image_url(media_url, &self.image);
        self
    }
}

/// 쓰기 요청의 재료 항목: 재료 ID와 수량.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmount {
    pub id: i64,
    pub amount: i64,
}

/// `POST /api/recipes` 요청 본문.
#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i64>,
    /// `data:image/<확장자>;base64,<데이터>` 형식의 data URI
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
}

/// `PATCH`/`PUT /api/recipes/:id` 요청 본문.
///
/// 태그와 재료는 필수이며 기존 목록을 통째로 대체합니다.
/// 나머지 필드는 None이면 이전 값을 유지합니다.
#[derive(Debug, Deserialize)]
pub struct UpdateRecipeRequest {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i64>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

/// 레시피 목록 필터. 쿼리 문자열에서 `routes::recipes`가 만들어냅니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    pub author: Option<i64>,
    /// 태그 slug 목록. 하나라도 일치하면 포함됩니다 (OR).
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}
