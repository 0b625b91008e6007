//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 라우터 조립을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 로그인 (토큰 발급), 비밀번호 해싱
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `ingredients`: 재료 조회
//! - `recipes`: 레시피 CRUD, 즐겨찾기/장바구니, 장바구니 다운로드
//! - `tags`: 태그 조회
//! - `users`: 회원가입, 사용자 조회, 비밀번호 변경, 계정 삭제, 구독

pub mod auth;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// `SqlitePool`은 내부적으로 Arc를 사용하므로 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    /// 레시피 이미지 저장 디렉토리
    pub media_path: String,
    /// 이미지 공개 URL 접두사
    pub media_url: String,
    /// 목록 API의 기본 페이지 크기
    pub page_size: i64,
    /// 발급하는 토큰의 유효 시간
    pub token_ttl_hours: i64,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            media_path: config.media_path.clone(),
            media_url: config.media_url.clone(),
            page_size: config.page_size,
            token_ttl_hours: config.token_ttl_hours,
        }
    }
}

/// 전체 애플리케이션 라우터를 조립합니다.
///
/// - API 라우트는 `/api` 아래에 중첩됩니다.
/// - 저장된 이미지는 `MEDIA_URL` 경로에서 정적 파일로 서빙됩니다.
/// - `/users/me`처럼 고정된 경로는 `/users/{id}`보다 우선 매칭됩니다.
pub fn router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/users", get(users::list_users).post(users::register))
        .route("/users/me", get(users::me).delete(users::delete_me))
        .route("/users/set_password", post(users::set_password))
        .route("/users/subscriptions", get(users::subscriptions))
        .route("/users/{id}", get(users::get_user))
        .route(
            "/users/{id}/subscribe",
            post(users::subscribe).delete(users::unsubscribe),
        );

    let recipe_routes = Router::new()
        .route("/recipes", get(recipes::list_recipes).post(recipes::create_recipe))
        .route(
            "/recipes/download_shopping_cart",
            get(recipes::download_shopping_cart),
        )
        .route(
            "/recipes/{id}",
            get(recipes::get_recipe)
                .patch(recipes::update_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/recipes/{id}/favorite",
            post(recipes::add_favorite).delete(recipes::remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart",
            post(recipes::add_to_shopping_cart).delete(recipes::remove_from_shopping_cart),
        );

    let api_routes = Router::new()
        .route("/auth/token/login", post(auth::login))
        .merge(user_routes)
        .merge(recipe_routes)
        .route("/ingredients", get(ingredients::list_ingredients))
        .route("/ingredients/{id}", get(ingredients::get_ingredient))
        .route("/tags", get(tags::list_tags))
        .route("/tags/{id}", get(tags::get_tag))
        .route("/health", get(health::health_check));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let media_prefix = state.media_url.trim_end_matches('/').to_string();
    let media = ServeDir::new(&state.media_path);

    let mut app = Router::new().nest("/api", api_routes);
    if media_prefix.is_empty() {
        tracing::warn!("MEDIA_URL is empty, stored images are not served");
    } else {
        app = app.nest_service(&media_prefix, media);
    }

    app.with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
