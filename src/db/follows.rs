//! # 구독(팔로우) 쿼리 모듈
//!
//! `follows` 테이블: (user_id = 구독하는 사람, author_id = 구독 대상)

use crate::error::AppError;
use crate::models::UserResponse;
use sqlx::SqliteConnection;

/// 구독을 추가합니다. 이미 구독 중이면 false.
///
/// 자기 자신 구독은 호출 전에 걸러야 합니다. (CHECK 제약도 있지만
/// `INSERT OR IGNORE`는 CHECK 위반도 조용히 무시합니다.)
pub async fn follow(
    conn: &mut SqliteConnection,
    user_id: i64,
    author_id: i64,
) -> Result<bool, AppError> {
    let result = sqlx::query("INSERT OR IGNORE INTO follows (user_id, author_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(author_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 구독을 해제합니다. 구독 중이 아니었으면 false.
pub async fn unfollow(
    conn: &mut SqliteConnection,
    user_id: i64,
    author_id: i64,
) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
        .bind(user_id)
        .bind(author_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 사용자가 구독 중인 작성자 목록을 ID 순으로 조회합니다.
///
/// 목록의 모든 행은 구독 관계가 있으므로 `is_subscribed`는 사실상 항상 true지만,
/// 다른 사용자 조회와 같은 방식으로 요청자 기준 EXISTS로 계산합니다.
pub async fn list_subscriptions(
    conn: &mut SqliteConnection,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserResponse>, AppError> {
    let authors = sqlx::query_as::<_, UserResponse>(
        r#"
        SELECT u.email, u.id, u.username, u.first_name, u.last_name,
               EXISTS (SELECT 1 FROM follows s WHERE s.user_id = ? AND s.author_id = u.id)
                   AS is_subscribed
        FROM users u
        JOIN follows f ON f.author_id = u.id
        WHERE f.user_id = ?
        ORDER BY u.id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;

    Ok(authors)
}

pub async fn count_subscriptions(conn: &mut SqliteConnection, user_id: i64) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}
