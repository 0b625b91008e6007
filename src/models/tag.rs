//! # 태그 모델 정의
//!
//! 태그는 레시피를 분류하는 라벨입니다 (예: 아침, 점심, 저녁).
//! 색상과 slug는 각각 전역에서 유일하며, 형식 검증은
//! `services::validation`에서 수행합니다.

use serde::{Deserialize, Serialize};

/// 태그 엔티티 — DB의 `tags` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    /// 태그 이름 (예: "아침")
    pub name: String,
    /// 색상 코드 (`#RRGGBB` 또는 `#RGB`)
    pub color: String,
    /// URL과 필터에 쓰이는 식별자 (예: "breakfast")
    pub slug: String,
}

/// `load-data` 명령이 읽는 태그 JSON 파일의 한 항목.
#[derive(Debug, Deserialize)]
pub struct TagSeed {
    pub name: String,
    pub color: String,
    pub slug: String,
}
