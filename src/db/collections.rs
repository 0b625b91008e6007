//! # 즐겨찾기·장바구니 쿼리 모듈
//!
//! `favorites`와 `shopping_list`는 모양이 똑같은 (user_id, recipe_id) 관계 테이블입니다.
//! 두 테이블을 `RecipeCollection` 하나로 다루고, 테이블 이름만 바꿔 끼웁니다.

use crate::error::AppError;
use crate::models::ShoppingListItem;
use sqlx::SqliteConnection;

/// 사용자별 레시피 모음의 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeCollection {
    Favorites,
    ShoppingCart,
}

impl RecipeCollection {
    fn table(self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "favorites",
            RecipeCollection::ShoppingCart => "shopping_list",
        }
    }

    /// 에러 메시지에 쓰이는 이름
    pub fn label(self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "favorites",
            RecipeCollection::ShoppingCart => "shopping cart",
        }
    }
}

/// 레시피를 모음에 추가합니다. 이미 있으면 아무것도 하지 않고 false를 반환합니다.
///
/// 존재 확인과 삽입이 `INSERT OR IGNORE` 한 문장이라 두 요청이 동시에 와도
/// 정확히 하나만 true를 받습니다.
pub async fn add_to_collection(
    conn: &mut SqliteConnection,
    collection: RecipeCollection,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool, AppError> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} (user_id, recipe_id) VALUES (?, ?)",
        collection.table()
    );
    let result = sqlx::query(&sql)
        .bind(user_id)
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 레시피를 모음에서 뺍니다. 원래 없었으면 false.
pub async fn remove_from_collection(
    conn: &mut SqliteConnection,
    collection: RecipeCollection,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool, AppError> {
    let sql = format!(
        "DELETE FROM {} WHERE user_id = ? AND recipe_id = ?",
        collection.table()
    );
    let result = sqlx::query(&sql)
        .bind(user_id)
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 장바구니에 담긴 모든 레시피의 재료를 (이름, 단위)별로 합산합니다.
///
/// 내부 ID가 아니라 이름과 단위로 묶으므로 글자가 같은 재료는 하나로 합쳐집니다.
/// 결과는 이름, 단위 순으로 정렬됩니다.
pub async fn shopping_list_totals(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<ShoppingListItem>, AppError> {
    let items = sqlx::query_as::<_, ShoppingListItem>(
        r#"
        SELECT i.name, i.measurement_unit, SUM(ri.amount) AS amount
        FROM shopping_list s
        JOIN recipe_ingredients ri ON ri.recipe_id = s.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE s.user_id = ?
        GROUP BY i.name, i.measurement_unit
        ORDER BY i.name, i.measurement_unit
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}
