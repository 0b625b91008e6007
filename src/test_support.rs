//! 테스트 공용 도구: 인메모리 DB와 임시 미디어 디렉토리를 가진 `AppState`,
//! 기본 데이터 적재, 실제 라우터로 요청 보내기.

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::db;
use crate::middleware::auth::create_access_token;
use crate::models::*;
use crate::routes::{self, auth::hash_password, AppState};

/// 1x1 PNG
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub struct TestContext {
    pub state: AppState,
    _media: TempDir,
}

impl TestContext {
    pub const PASSWORD: &'static str = "s3cret-pass";

    /// 연결이 하나뿐인 인메모리 풀. 연결이 닫히면 DB가 사라지므로 수명 제한을 끕니다.
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .unwrap();

        Self::with_pool(pool, tempfile::tempdir().unwrap()).await
    }

    /// 임시 디렉토리의 파일 DB를 여러 연결로 엽니다. 동시 요청 테스트용.
    pub async fn with_file_db() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(db::configure_connection(
                SqliteConnectOptions::new().filename(dir.path().join("foodgram.db")),
            ))
            .await
            .unwrap();

        Self::with_pool(pool, dir).await
    }

    async fn with_pool(pool: SqlitePool, media: TempDir) -> Self {
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let state = AppState {
            pool,
            jwt_secret: "test-secret".to_string(),
            media_path: media.path().to_str().unwrap().to_string(),
            media_url: "/media".to_string(),
            page_size: 6,
            token_ttl_hours: 1,
        };

        Self {
            state,
            _media: media,
        }
    }

    /// 태그 breakfast(1), lunch(2), dinner(3)와
    /// 재료 Salt g(1), Water ml(2), Flour g(3), Sugar g(4)를 추가합니다.
    pub async fn seed_catalog(&self) {
        let mut conn = self.state.pool.acquire().await.unwrap();
        for (name, color, slug) in [
            ("Breakfast", "#E26C2D", "breakfast"),
            ("Lunch", "#49B64E", "lunch"),
            ("Dinner", "#8775D2", "dinner"),
        ] {
            let seed = TagSeed {
                name: name.to_string(),
                color: color.to_string(),
                slug: slug.to_string(),
            };
            db::insert_tag_if_absent(&mut conn, &seed).await.unwrap();
        }
        for (name, unit) in [("Salt", "g"), ("Water", "ml"), ("Flour", "g"), ("Sugar", "g")] {
            let seed = IngredientSeed {
                name: name.to_string(),
                measurement_unit: unit.to_string(),
            };
            db::insert_ingredient_if_absent(&mut conn, &seed).await.unwrap();
        }
    }

    /// `{name}@example.com` / `PASSWORD`로 사용자를 만듭니다.
    pub async fn create_user(&self, name: &str) -> User {
        let req = RegisterRequest {
            email: format!("{name}@example.com"),
            username: name.to_string(),
            first_name: name.to_string(),
            last_name: "Tester".to_string(),
            password: Self::PASSWORD.to_string(),
        };
        let hash = hash_password(&req.password).unwrap();
        let mut conn = self.state.pool.acquire().await.unwrap();
        db::users::create_user(&mut conn, &req, &hash).await.unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        create_access_token(user.id, &self.state.jwt_secret, 1).unwrap()
    }

    /// DB에 직접 레시피를 추가합니다. `ingredients`는 (재료 ID, 수량) 목록.
    pub async fn create_recipe(
        &self,
        author_id: i64,
        name: &str,
        ingredients: &[(i64, i64)],
        tags: &[i64],
    ) -> i64 {
        let req = CreateRecipeRequest {
            ingredients: ingredients
                .iter()
                .map(|&(id, amount)| IngredientAmount { id, amount })
                .collect(),
            tags: tags.to_vec(),
            image: PNG_DATA_URI.to_string(),
            name: name.to_string(),
            text: format!("How to make {name}"),
            cooking_time: 10,
        };
        let image = format!("recipes/images/{}.png", name.to_lowercase());

        let mut tx = db::begin_write(&self.state.pool).await.unwrap();
        let id = db::insert_recipe(&mut tx, author_id, &req, &image).await.unwrap();
        db::insert_recipe_associations(&mut tx, id, &req.tags, &req.ingredients)
            .await
            .unwrap();
        tx.commit().await.unwrap();
        id
    }

    /// 라우터로 요청을 보내고 상태, 헤더, 본문 문자열을 돌려줍니다.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = routes::router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// JSON 응답용. 빈 본문은 `Value::Null`이 됩니다.
    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, text) = self.send(method, uri, token, body).await;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap()
        };
        (status, value)
    }
}
