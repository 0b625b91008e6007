//! # 참조 데이터 적재 (`load-data` 명령)
//!
//! 재료와 태그를 JSON 파일에서 읽어 DB에 넣습니다.
//!
//! ```json
//! [{ "name": "salt", "measurement_unit": "g" }]
//! [{ "name": "Breakfast", "color": "#E26C2D", "slug": "breakfast" }]
//! ```
//!
//! 이미 있는 항목은 건너뜁니다 (get-or-create). 형식이 잘못된 항목은
//! 경고를 남기고 건너뛰며, 나머지 항목은 계속 적재합니다.
//! 파일 하나는 한 트랜잭션으로 적재됩니다.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;

use crate::db;
use crate::models::{IngredientSeed, TagSeed};
use crate::services::validation;

async fn read_seeds<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// 재료 파일을 적재하고 새로 추가된 항목 수를 반환합니다.
pub async fn load_ingredients(pool: &SqlitePool, path: &Path) -> Result<usize> {
    let seeds: Vec<IngredientSeed> = read_seeds(path).await?;
    let mut tx = db::begin_write(pool).await?;
    let mut inserted = 0;

    for seed in &seeds {
        if let Err(e) = validation::validate_ingredient_seed(seed) {
            tracing::warn!("Skipping ingredient {:?}: {}", seed.name, e);
            continue;
        }
        if db::insert_ingredient_if_absent(&mut tx, seed).await? {
            inserted += 1;
        } else {
            tracing::debug!("Ingredient {:?} already exists", seed.name);
        }
    }

    tx.commit().await?;
    tracing::info!(
        "Loaded {} new ingredients from {} ({} entries)",
        inserted,
        path.display(),
        seeds.len()
    );
    Ok(inserted)
}

/// 태그 파일을 적재하고 새로 추가된 항목 수를 반환합니다.
///
/// 색상(`#RRGGBB`/`#RGB`)과 slug 형식을 넣기 전에 검사합니다.
pub async fn load_tags(pool: &SqlitePool, path: &Path) -> Result<usize> {
    let seeds: Vec<TagSeed> = read_seeds(path).await?;
    let mut tx = db::begin_write(pool).await?;
    let mut inserted = 0;

    for seed in &seeds {
        if let Err(e) = validation::validate_tag_seed(seed) {
            tracing::warn!("Skipping tag {:?}: {}", seed.slug, e);
            continue;
        }
        if db::insert_tag_if_absent(&mut tx, seed).await? {
            inserted += 1;
        } else {
            tracing::debug!("Tag {:?} clashes with an existing tag", seed.slug);
        }
    }

    tx.commit().await?;
    tracing::info!(
        "Loaded {} new tags from {} ({} entries)",
        inserted,
        path.display(),
        seeds.len()
    );
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;

    #[tokio::test]
    async fn ingredients_are_get_or_create() {
        let ctx = TestContext::new().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingredients.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "salt", "measurement_unit": "g"},
                {"name": "milk", "measurement_unit": "ml"},
                {"name": "", "measurement_unit": "g"}
            ]"#,
        )
        .unwrap();

        assert_eq!(load_ingredients(&ctx.state.pool, &path).await.unwrap(), 2);
        assert_eq!(load_ingredients(&ctx.state.pool, &path).await.unwrap(), 0);

        let mut conn = ctx.state.pool.acquire().await.unwrap();
        assert_eq!(db::list_ingredients(&mut conn, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_tags_are_skipped() {
        let ctx = TestContext::new().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.json");
        std::fs::write(
            &path,
            r##"[
                {"name": "Breakfast", "color": "#ABC123", "slug": "valid_slug-1"},
                {"name": "Broken", "color": "#ZZZZZZ", "slug": "broken"},
                {"name": "Spaced", "color": "#123", "slug": "invalid slug!"}
            ]"##,
        )
        .unwrap();

        assert_eq!(load_tags(&ctx.state.pool, &path).await.unwrap(), 1);

        let mut conn = ctx.state.pool.acquire().await.unwrap();
        let tags = db::list_tags(&mut conn).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].slug, "valid_slug-1");
    }

    #[tokio::test]
    async fn missing_or_malformed_file_is_an_error() {
        let ctx = TestContext::new().await;
        let dir = tempfile::tempdir().unwrap();
        assert!(load_tags(&ctx.state.pool, &dir.path().join("absent.json")).await.is_err());

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_ingredients(&ctx.state.pool, &path).await.is_err());
    }
}
