//! # 미들웨어 모듈
//!
//! - `auth`: 토큰 발급/검증과 `AuthUser` 추출자
//! - `permissions`: 레시피 작성자 권한 확인

pub mod auth;
pub mod permissions;
