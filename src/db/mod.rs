//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 모든 함수는 `&mut SqliteConnection`을 받습니다. 호출하는 쪽이
//! 풀에서 빌린 연결(`pool.acquire()`)이나 쓰기 트랜잭션(`begin_write`)을 넘기므로,
//! 같은 함수를 읽기 요청과 쓰기 트랜잭션에서 그대로 재사용할 수 있습니다.
//!
//! 각 하위 모듈:
//! - `collections`: 즐겨찾기와 장바구니 (같은 모양의 두 관계 테이블), 장바구니 합계
//! - `follows`: 사용자 구독 관계
//! - `ingredients`: 재료 조회와 적재
//! - `recipes`: 레시피 목록/상세 쿼리, 쓰기, 연관 행 교체, 명시적 연쇄 삭제
//! - `tags`: 태그 조회와 적재
//! - `users`: 사용자 계정과 계정 삭제

pub mod collections;
pub mod follows;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

pub use collections::*;
pub use follows::*;
pub use ingredients::*;
pub use recipes::*;
pub use tags::*;

use std::collections::HashSet;

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::error::AppError;

/// 서버와 테스트가 같이 쓰는 연결 설정.
///
/// - 외래 키 검사는 SQLite에서 연결마다 켜야 합니다.
/// - WAL 모드에서는 읽기 연결이 커밋 중인 쓰기를 막지 않습니다.
/// - 쓰기 잠금은 최대 5초까지 기다립니다.
pub fn configure_connection(options: SqliteConnectOptions) -> SqliteConnectOptions {
    options
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
}

/// 쓰기 트랜잭션을 `BEGIN IMMEDIATE`로 시작합니다.
///
/// 시작과 동시에 DB 쓰기 잠금을 잡으므로 쓰기 트랜잭션끼리는 차례로 실행되고,
/// 트랜잭션 안의 "확인 후 삽입"(이름 중복 검사 등) 사이에 다른 쓰기가 끼어들지 못합니다.
/// 잠금을 기다리는 시간은 연결의 busy timeout을 따릅니다.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// `ids` 중 `table`에 존재하지 않는 첫 번째 ID를 찾습니다. 모두 존재하면 None.
///
/// `table`은 코드에 고정된 테이블 이름만 받습니다 (`&'static str`).
pub(crate) async fn first_missing_id(
    conn: &mut SqliteConnection,
    table: &'static str,
    ids: &[i64],
) -> Result<Option<i64>, AppError> {
    if ids.is_empty() {
        return Ok(None);
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT id FROM ");
    qb.push(table).push(" WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let found: HashSet<i64> = qb
        .build_query_scalar::<i64>()
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .collect();

    Ok(ids.iter().copied().find(|id| !found.contains(id)))
}
