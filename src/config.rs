//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로
//! - `JWT_SECRET`: 인증 토큰 서명에 사용할 비밀키
//! - `MEDIA_PATH`: 레시피 이미지 저장 디렉토리
//! - `MEDIA_URL`: 이미지 URL 앞에 붙는 공개 경로
//! - `HOST`, `PORT`: 서버 바인딩 주소와 포트
//! - `PAGE_SIZE`: 목록 API의 기본 페이지 크기
//! - `TOKEN_TTL_HOURS`: 인증 토큰 유효 시간

use std::env;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/foodgram.db")
    pub database_url: String,
    /// 인증 토큰 서명/검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 레시피 이미지가 저장되는 디렉토리 경로
    pub media_path: String,
    /// 이미지 URL의 접두사 (기본값: "/media")
    pub media_url: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 8000)
    pub port: u16,
    /// `limit` 파라미터가 없을 때의 페이지 크기 (기본값: 6)
    pub page_size: i64,
    /// 인증 토큰 유효 시간(시간 단위, 기본값: 24)
    pub token_ttl_hours: i64,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            media_path: env::var("MEDIA_PATH").unwrap_or_else(|_| "data/media".to_string()),
            media_url: env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            // 숫자 설정은 파싱에 실패하면 기본값을 사용합니다.
            port: parse_or("PORT", 8000),
            page_size: parse_or::<i64>("PAGE_SIZE", 6).max(1),
            token_ttl_hours: parse_or::<i64>("TOKEN_TTL_HOURS", 24).max(1),
        })
    }
}

/// 환경변수를 숫자로 읽고, 없거나 잘못된 값이면 `default`를 반환합니다.
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
