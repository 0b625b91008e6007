//! # 레시피 데이터베이스 쿼리 모듈
//!
//! ## 요청자 기준 플래그
//! 목록과 상세 조회는 각 레시피에 `is_favorited`, `is_in_shopping_cart`를 붙입니다.
//! - 로그인한 요청자: `EXISTS (SELECT 1 FROM favorites ...)` 서브쿼리로 계산
//! - 익명 요청자: 서브쿼리 없이 상수 `0`을 선택하는 별도의 SELECT 머리
//!
//! ## 쓰기와 삭제
//! - 연관 행(recipe_ingredients, recipe_tags)은 수정 시 모두 지우고 다시 넣습니다.
//! - 외래 키에 ON DELETE CASCADE가 없으므로, 레시피 삭제 시 이 모듈이
//!   `RECIPE_DEPENDENTS`의 모든 테이블에서 관련 행을 직접 지웁니다.
//! - 쓰기 함수는 `begin_write`(`BEGIN IMMEDIATE`) 트랜잭션 안에서 호출되므로
//!   두 수정 요청의 삭제/삽입이 섞이지 않습니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// 레시피를 참조하는 테이블들. 레시피 삭제 시 이 순서대로 관련 행을 지웁니다.
pub const RECIPE_DEPENDENTS: [&str; 4] =
    ["recipe_ingredients", "recipe_tags", "favorites", "shopping_list"];

/// SELECT 절과 FROM 절을 붙입니다. 익명 요청자는 플래그를 상수로 선택합니다.
fn push_recipe_select(qb: &mut QueryBuilder<'_, Sqlite>, viewer: Option<i64>) {
    qb.push("SELECT r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, ");
    match viewer {
        None => {
            qb.push("0 AS is_favorited, 0 AS is_in_shopping_cart");
        }
        Some(user_id) => {
            qb.push("EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
                .push_bind(user_id)
                .push(") AS is_favorited, ")
                .push("EXISTS (SELECT 1 FROM shopping_list s WHERE s.recipe_id = r.id AND s.user_id = ")
                .push_bind(user_id)
                .push(") AS is_in_shopping_cart");
        }
    }
    qb.push(" FROM recipes r");
}

/// WHERE 절을 붙입니다.
///
/// 즐겨찾기/장바구니 필터는 로그인한 요청자에게만 적용되고, 익명 요청에서는 무시됩니다.
fn push_recipe_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    filter: &RecipeFilter,
    viewer: Option<i64>,
) {
    qb.push(" WHERE 1 = 1");

    if let Some(author_id) = filter.author {
        qb.push(" AND r.author_id = ").push_bind(author_id);
    }

    if !filter.tags.is_empty() {
        qb.push(
            " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.recipe_id = r.id AND t.slug IN (",
        );
        let mut separated = qb.separated(", ");
        for slug in &filter.tags {
            separated.push_bind(slug.clone());
        }
        separated.push_unseparated("))");
    }

    if let Some(user_id) = viewer {
        if let Some(wanted) = filter.is_favorited {
            push_membership(qb, "favorites", user_id, wanted);
        }
        if let Some(wanted) = filter.is_in_shopping_cart {
            push_membership(qb, "shopping_list", user_id, wanted);
        }
    }
}

fn push_membership(
    qb: &mut QueryBuilder<'_, Sqlite>,
    table: &'static str,
    user_id: i64,
    wanted: bool,
) {
    qb.push(if wanted { " AND EXISTS (" } else { " AND NOT EXISTS (" })
        .push("SELECT 1 FROM ")
        .push(table)
        .push(" m WHERE m.recipe_id = r.id AND m.user_id = ")
        .push_bind(user_id)
        .push(")");
}

/// 필터에 맞는 레시피 한 페이지를 최신순(pub_date 내림차순, 같으면 id 내림차순)으로 조회합니다.
pub async fn list_recipes(
    conn: &mut SqliteConnection,
    viewer: Option<i64>,
    filter: &RecipeFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<RecipeRow>, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("");
    push_recipe_select(&mut qb, viewer);
    push_recipe_filters(&mut qb, filter, viewer);
    qb.push(" ORDER BY r.pub_date DESC, r.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows = qb.build_query_as::<RecipeRow>().fetch_all(&mut *conn).await?;
    Ok(rows)
}

/// 필터에 맞는 레시피의 전체 개수
pub async fn count_recipes(
    conn: &mut SqliteConnection,
    viewer: Option<i64>,
    filter: &RecipeFilter,
) -> Result<i64, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM recipes r");
    push_recipe_filters(&mut qb, filter, viewer);

    let count = qb.build_query_scalar::<i64>().fetch_one(&mut *conn).await?;
    Ok(count)
}

pub async fn get_recipe(
    conn: &mut SqliteConnection,
    id: i64,
    viewer: Option<i64>,
) -> Result<Option<RecipeRow>, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("");
    push_recipe_select(&mut qb, viewer);
    qb.push(" WHERE r.id = ").push_bind(id);

    let row = qb
        .build_query_as::<RecipeRow>()
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// 레시피의 재료와 수량을 추가된 순서대로 조회합니다.
pub async fn get_recipe_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i64,
) -> Result<Vec<RecipeIngredient>, AppError> {
    let ingredients = sqlx::query_as::<_, RecipeIngredient>(
        r#"
        SELECT i.id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ?
        ORDER BY ri.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ingredients)
}

pub async fn get_recipe_short(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<RecipeShort>, AppError> {
    let recipe = sqlx::query_as::<_, RecipeShort>(
        "SELECT id, name, image, cooking_time FROM recipes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(recipe)
}

/// 작성자의 레시피를 최신순으로 최대 `limit`개 조회합니다. None이면 전부.
pub async fn list_author_recipes(
    conn: &mut SqliteConnection,
    author_id: i64,
    limit: Option<i64>,
) -> Result<Vec<RecipeShort>, AppError> {
    // SQLite에서 LIMIT -1은 "제한 없음"입니다.
    let recipes = sqlx::query_as::<_, RecipeShort>(
        r#"
        SELECT id, name, image, cooking_time
        FROM recipes
        WHERE author_id = ?
        ORDER BY pub_date DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(author_id)
    .bind(limit.unwrap_or(-1))
    .fetch_all(&mut *conn)
    .await?;

    Ok(recipes)
}

pub async fn count_author_recipes(
    conn: &mut SqliteConnection,
    author_id: i64,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// 같은 이름의 다른 레시피가 있는지 확인합니다. 수정 시에는 자기 자신을 제외합니다.
pub async fn recipe_name_taken(
    conn: &mut SqliteConnection,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM recipes WHERE name = ? AND id IS NOT ?)",
    )
    .bind(name)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(taken)
}

/// 레시피 행을 추가하고 새 ID를 반환합니다. `pub_date`는 DB 기본값(현재 시각)입니다.
pub async fn insert_recipe(
    conn: &mut SqliteConnection,
    author_id: i64,
    req: &CreateRecipeRequest,
    image_path: &str,
) -> Result<i64, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO recipes (name, author_id, image, text, cooking_time)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&req.name)
    .bind(author_id)
    .bind(image_path)
    .bind(&req.text)
    .bind(req.cooking_time)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// 수정 트랜잭션의 첫 문장: 버전을 올리고 (작성자 ID, 이미지 경로)를 반환합니다.
/// 레시피가 없으면 None.
pub async fn lock_recipe_for_update(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<(i64, String)>, AppError> {
    let row = sqlx::query_as::<_, (i64, String)>(
        "UPDATE recipes SET version = version + 1 WHERE id = ? RETURNING author_id, image",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// 스칼라 필드를 부분 업데이트합니다. None인 필드는 COALESCE로 기존 값을 유지합니다.
pub async fn update_recipe_fields(
    conn: &mut SqliteConnection,
    id: i64,
    req: &UpdateRecipeRequest,
    image_path: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE recipes
        SET name = COALESCE(?, name),
            image = COALESCE(?, image),
            text = COALESCE(?, text),
            cooking_time = COALESCE(?, cooking_time)
        WHERE id = ?
        "#,
    )
    .bind(req.name.as_deref())
    .bind(image_path)
    .bind(req.text.as_deref())
    .bind(req.cooking_time)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// 태그와 재료 연관 행을 한 번의 INSERT씩으로 추가합니다.
///
/// 호출하는 쪽이 ID 존재 여부와 중복을 미리 검증하지만, 고유 제약 위반이 생기면
/// 에러가 그대로 전파되어 트랜잭션 전체가 롤백됩니다.
pub async fn insert_recipe_associations(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    tags: &[i64],
    ingredients: &[IngredientAmount],
) -> Result<(), AppError> {
    if !tags.is_empty() {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
        qb.push_values(tags, |mut row, tag_id| {
            row.push_bind(recipe_id).push_bind(*tag_id);
        });
        qb.build().execute(&mut *conn).await?;
    }

    if !ingredients.is_empty() {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ",
        );
        qb.push_values(ingredients, |mut row, item| {
            row.push_bind(recipe_id)
                .push_bind(item.id)
                .push_bind(item.amount);
        });
        qb.build().execute(&mut *conn).await?;
    }

    Ok(())
}

/// 기존 연관 행을 모두 지우고 새 목록으로 다시 넣습니다 (병합하지 않음).
pub async fn replace_recipe_associations(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    tags: &[i64],
    ingredients: &[IngredientAmount],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    insert_recipe_associations(conn, recipe_id, tags, ingredients).await
}

/// 레시피와 그것을 참조하는 모든 행을 삭제하고, 삭제된 레시피의 이미지 경로를 반환합니다.
/// 레시피가 없으면 None.
pub async fn delete_recipe(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<String>, AppError> {
    let image = sqlx::query_scalar::<_, String>("SELECT image FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(image) = image else {
        return Ok(None);
    };

    for table in RECIPE_DEPENDENTS {
        // 테이블 이름은 위의 상수에서만 오므로 format!으로 넣어도 안전합니다.
        sqlx::query(&format!("DELETE FROM {table} WHERE recipe_id = ?"))
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }

    sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(Some(image))
}

/// 작성자의 모든 레시피 ID (계정 삭제 시 사용)
pub async fn list_author_recipe_ids(
    conn: &mut SqliteConnection,
    author_id: i64,
) -> Result<Vec<i64>, AppError> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM recipes WHERE author_id = ?")
        .bind(author_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(ids)
}
