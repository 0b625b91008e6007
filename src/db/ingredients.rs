//! # 재료 데이터베이스 쿼리 모듈

use crate::error::AppError;
use crate::models::*;
use sqlx::SqliteConnection;

/// 재료 목록을 ID 순으로 조회합니다.
///
/// `name_prefix`가 있으면 이름이 그 문자열로 시작하는 재료만 반환합니다.
/// SQLite의 `LIKE`는 ASCII 범위에서만 대소문자를 구분하지 않습니다.
pub async fn list_ingredients(
    conn: &mut SqliteConnection,
    name_prefix: Option<&str>,
) -> Result<Vec<Ingredient>, AppError> {
    let ingredients = match name_prefix {
        None => {
            sqlx::query_as::<_, Ingredient>(
                "SELECT id, name, measurement_unit FROM ingredients ORDER BY id",
            )
            .fetch_all(&mut *conn)
            .await?
        }
        Some(prefix) => {
            sqlx::query_as::<_, Ingredient>(
                r#"
                SELECT id, name, measurement_unit
                FROM ingredients
                WHERE name LIKE ? ESCAPE '\'
                ORDER BY id
                "#,
            )
            .bind(format!("{}%", escape_like(prefix)))
            .fetch_all(&mut *conn)
            .await?
        }
    };

    Ok(ingredients)
}

/// LIKE 패턴의 특수문자(`%`, `_`, `\`)를 이스케이프합니다.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub async fn get_ingredient(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Ingredient>, AppError> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        "SELECT id, name, measurement_unit FROM ingredients WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(ingredient)
}

/// 같은 이름의 재료가 없을 때만 추가합니다. 새로 추가되었으면 true.
pub async fn insert_ingredient_if_absent(
    conn: &mut SqliteConnection,
    seed: &IngredientSeed,
) -> Result<bool, AppError> {
    let result =
        sqlx::query("INSERT OR IGNORE INTO ingredients (name, measurement_unit) VALUES (?, ?)")
            .bind(&seed.name)
            .bind(&seed.measurement_unit)
            .execute(&mut *conn)
            .await?;

    Ok(result.rows_affected() > 0)
}
