//! # 태그 데이터베이스 쿼리 모듈
//!
//! ## 테이블 구조
//! - `tags`: 태그 엔티티 (id, name, color, slug)
//! - `recipe_tags`: 레시피와 태그의 다대다(N:M) 관계 테이블
//!
//! 태그는 API로 생성/수정하지 않고 `load-data` 명령으로만 적재합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// 모든 태그를 ID 순으로 조회합니다.
pub async fn list_tags(conn: &mut SqliteConnection) -> Result<Vec<Tag>, AppError> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;

    Ok(tags)
}

pub async fn get_tag(conn: &mut SqliteConnection, id: i64) -> Result<Option<Tag>, AppError> {
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(tag)
}

/// 특정 레시피에 연결된 태그들을 조회합니다.
///
/// ```sql
/// tags ←── recipe_tags ──→ recipes
/// ```
pub async fn get_recipe_tags(
    conn: &mut SqliteConnection,
    recipe_id: i64,
) -> Result<Vec<Tag>, AppError> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.color, t.slug
        FROM tags t
        JOIN recipe_tags rt ON rt.tag_id = t.id
        WHERE rt.recipe_id = ?
        ORDER BY t.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(tags)
}

/// `slugs` 중 존재하지 않는 태그 slug를 하나 찾습니다. 모두 존재하면 None.
///
/// 레시피 목록의 `tags` 필터는 존재하는 slug만 받기 때문에 사용합니다.
pub async fn find_unknown_slug(
    conn: &mut SqliteConnection,
    slugs: &[String],
) -> Result<Option<String>, AppError> {
    if slugs.is_empty() {
        return Ok(None);
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT slug FROM tags WHERE slug IN (");
    let mut separated = qb.separated(", ");
    for slug in slugs {
        separated.push_bind(slug.clone());
    }
    separated.push_unseparated(")");

    let known: Vec<String> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    Ok(slugs.iter().find(|slug| !known.contains(slug)).cloned())
}

/// 이름, 색상, slug가 모두 겹치지 않을 때만 추가합니다. 새로 추가되었으면 true.
pub async fn insert_tag_if_absent(
    conn: &mut SqliteConnection,
    seed: &TagSeed,
) -> Result<bool, AppError> {
    let result = sqlx::query("INSERT OR IGNORE INTO tags (name, color, slug) VALUES (?, ?, ?)")
        .bind(&seed.name)
        .bind(&seed.color)
        .bind(&seed.slug)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;

    #[tokio::test]
    async fn unknown_slug_is_reported() {
        let ctx = TestContext::new().await;
        ctx.seed_catalog().await;
        let mut conn = ctx.state.pool.acquire().await.unwrap();

        let slugs = vec!["breakfast".to_string(), "lunch".to_string()];
        assert_eq!(find_unknown_slug(&mut conn, &slugs).await.unwrap(), None);

        let slugs = vec!["breakfast".to_string(), "brunch".to_string()];
        assert_eq!(
            find_unknown_slug(&mut conn, &slugs).await.unwrap(),
            Some("brunch".to_string())
        );
    }

    #[tokio::test]
    async fn duplicate_color_is_ignored() {
        let ctx = TestContext::new().await;
        let mut conn = ctx.state.pool.acquire().await.unwrap();
        let first = TagSeed {
            name: "Dinner".to_string(),
            color: "#112233".to_string(),
            slug: "dinner".to_string(),
        };
        let same_color = TagSeed {
            name: "Supper".to_string(),
            color: "#112233".to_string(),
            slug: "supper".to_string(),
        };

        assert!(insert_tag_if_absent(&mut conn, &first).await.unwrap());
        assert!(!insert_tag_if_absent(&mut conn, &same_color).await.unwrap());
        assert_eq!(list_tags(&mut conn).await.unwrap().len(), 1);
    }
}
