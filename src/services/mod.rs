//! # 서비스 모듈
//!
//! DB에 직접 의존하지 않는 비즈니스 로직과 파일 I/O를 모아둔 모듈입니다.
//! - `images`: data URI 이미지 디코딩, 저장, 삭제, URL 생성
//! - `loader`: `load-data` 명령의 재료/태그 JSON 적재
//! - `pagination`: 페이지 번호 기반 페이지네이션
//! - `shopping_list`: 장바구니 재료 합계를 텍스트로 렌더링
//! - `validation`: 입력값 형식 검증

pub mod images;
pub mod loader;
pub mod pagination;
pub mod shopping_list;
pub mod validation;
