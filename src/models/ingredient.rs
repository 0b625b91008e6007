//! # 재료 모델 정의

use serde::{Deserialize, Serialize};

/// 재료 엔티티 — DB의 `ingredients` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub id: i64,
    /// 재료 이름 (예: "소금"), 전역에서 유일
    pub name: String,
    /// 측정 단위 (예: "g", "ml", "개")
    pub measurement_unit: String,
}

/// `GET /api/ingredients?name=...` 쿼리 파라미터.
/// `name`은 이름의 앞부분(접두사)으로 검색합니다.
#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

/// `load-data` 명령이 읽는 JSON 파일의 한 항목.
#[derive(Debug, Deserialize)]
pub struct IngredientSeed {
    pub name: String,
    pub measurement_unit: String,
}

/// 장바구니 합계의 한 줄: 같은 이름과 단위의 재료 수량을 모두 더한 값.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}
