//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `follow`: 구독(팔로우) 응답 구조체
//! - `ingredient`: 재료(Ingredient) 구조체
//! - `recipe`: 레시피와 레시피-재료 관계, 요청/응답 구조체
//! - `tag`: 태그 구조체
//! - `user`: 사용자(User) 관련 구조체
//!
//! `pub use X::*;`로 하위 모듈의 항목을 재공개하여
//! `crate::models::Recipe`처럼 짧게 접근할 수 있게 합니다.

pub mod follow;
pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

pub use follow::*;
pub use ingredient::*;
pub use recipe::*;
pub use tag::*;
pub use user::*;
