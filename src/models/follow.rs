use serde::{Deserialize, Serialize};

use super::{RecipeShort, UserResponse};

/// 구독 목록과 구독 생성 응답에 쓰이는 표현.
///
/// 사용자 필드는 `#[serde(flatten)]`으로 같은 레벨에 펼쳐집니다:
/// `{ "email": ..., "id": ..., "is_subscribed": true, "recipes": [...], "recipes_count": 3 }`
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: i64,
}

/// 구독 관련 엔드포인트의 `recipes_limit` 쿼리 파라미터.
/// 각 작성자의 레시피 목록을 이 개수로 자릅니다.
#[derive(Debug, Default, Deserialize)]
pub struct RecipesLimitQuery {
    pub recipes_limit: Option<i64>,
}
