//! # 인증 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST /api/auth/token/login` → `{ "auth_token": "..." }`
//!
//! 비밀번호는 Argon2id로 해싱하여 저장합니다. 해싱/검증 함수는
//! 회원가입, 비밀번호 변경, 계정 삭제 핸들러도 함께 사용합니다.

use crate::{
    db::users as db_users,
    error::AppError,
    middleware::auth::create_access_token,
    models::user::*,
    routes::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};

/// 비밀번호를 Argon2id로 해싱합니다. 매번 새 솔트를 생성합니다.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(hash)
}

/// 저장된 해시와 비밀번호가 일치하는지 확인합니다.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// `POST /auth/token/login` — 이메일과 비밀번호로 토큰을 발급합니다.
///
/// 이메일이 없는 경우와 비밀번호가 틀린 경우를 구분하지 않고 같은 401을 돌려줍니다.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = body?;
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let mut conn = state.pool.acquire().await?;
    let user = db_users::find_by_email(&mut conn, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    let auth_token = create_access_token(user.id, &state.jwt_secret, state.token_ttl_hours)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    tracing::debug!("Issued token for user {}", user.id);

    Ok(Json(TokenResponse { auth_token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[test]
    fn hash_verifies_only_original_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[tokio::test]
    async fn login_issues_usable_token() {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("chef").await;

        let (status, body) = ctx
            .send_json(
                Method::POST,
                "/api/auth/token/login",
                None,
                Some(json!({ "email": user.email, "password": TestContext::PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["auth_token"].as_str().unwrap().to_string();

        let (status, me) = ctx.send_json(Method::GET, "/api/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], user.id);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("chef").await;

        let (status, body) = ctx
            .send_json(
                Method::POST,
                "/api/auth/token/login",
                None,
                Some(json!({ "email": user.email, "password": "not-the-password" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "unauthorized");

        let (status, _) = ctx
            .send_json(
                Method::POST,
                "/api/auth/token/login",
                None,
                Some(json!({ "email": "nobody@example.com", "password": "whatever1" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_of_deleted_user_is_rejected() {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("ghost").await;
        let token = ctx.token_for(&user);

        let mut conn = ctx.state.pool.acquire().await.unwrap();
        db_users::delete_user(&mut conn, user.id).await.unwrap();
        drop(conn);

        let (status, body) = ctx.send_json(Method::GET, "/api/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "invalid_token");
    }
}
