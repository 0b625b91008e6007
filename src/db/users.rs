//! # 사용자 데이터베이스 쿼리 모듈
//!
//! 계정 생성/조회, 비밀번호 변경, 요청자 기준 사용자 표현(`UserResponse`) 조회,
//! 그리고 계정 삭제 시의 연쇄 삭제를 담당합니다.

use crate::db::recipes::{delete_recipe, list_author_recipe_ids};
use crate::error::AppError;
use crate::models::*;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, password_hash";

/// 새 사용자를 추가하고 저장된 행을 반환합니다.
///
/// 이메일/사용자 이름 중복은 호출하는 쪽이 같은 쓰기 트랜잭션(`begin_write`) 안에서 먼저 확인합니다.
pub async fn create_user(
    conn: &mut SqliteConnection,
    req: &RegisterRequest,
    password_hash: &str,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, username, first_name, last_name, password_hash)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&req.email)
    .bind(&req.username)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(password_hash)
    .fetch_one(&mut *conn)
    .await?;

    Ok(user)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(user)
}

pub async fn find_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, AppError> {
    let user =
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(user)
}

pub async fn find_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<User>, AppError> {
    let user =
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(user)
}

/// 토큰의 사용자가 아직 존재하는지 확인합니다 (삭제된 계정의 토큰 거부).
pub async fn user_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = ?)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(exists)
}

pub async fn update_password(
    conn: &mut SqliteConnection,
    id: i64,
    password_hash: &str,
) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// `UserResponse`의 SELECT 절. 익명 요청자는 `is_subscribed`를 상수로 선택합니다.
fn push_user_select(qb: &mut QueryBuilder<'_, Sqlite>, viewer: Option<i64>) {
    qb.push("SELECT u.email, u.id, u.username, u.first_name, u.last_name, ");
    match viewer {
        None => {
            qb.push("0 AS is_subscribed");
        }
        Some(viewer_id) => {
            qb.push("EXISTS (SELECT 1 FROM follows f WHERE f.author_id = u.id AND f.user_id = ")
                .push_bind(viewer_id)
                .push(") AS is_subscribed");
        }
    }
    qb.push(" FROM users u");
}

/// 요청자 기준 사용자 표현을 조회합니다.
pub async fn get_user_view(
    conn: &mut SqliteConnection,
    id: i64,
    viewer: Option<i64>,
) -> Result<Option<UserResponse>, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("");
    push_user_select(&mut qb, viewer);
    qb.push(" WHERE u.id = ").push_bind(id);

    let user = qb
        .build_query_as::<UserResponse>()
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

/// 사용자 목록 한 페이지 (ID 순)
pub async fn list_users(
    conn: &mut SqliteConnection,
    viewer: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserResponse>, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("");
    push_user_select(&mut qb, viewer);
    qb.push(" ORDER BY u.id LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let users = qb.build_query_as::<UserResponse>().fetch_all(&mut *conn).await?;
    Ok(users)
}

pub async fn count_users(conn: &mut SqliteConnection) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// 계정과 그 계정이 남긴 모든 것을 삭제하고, 지워진 레시피들의 이미지 경로를 반환합니다.
///
/// 삭제 순서:
/// 1. 작성한 레시피 (각 레시피의 연관 행 포함, `delete_recipe`)
/// 2. 양방향 구독 관계
/// 3. 이 사용자의 즐겨찾기와 장바구니
/// 4. 사용자 행
///
/// 이미지 파일은 트랜잭션 커밋 후에 호출하는 쪽이 지웁니다.
pub async fn delete_user(conn: &mut SqliteConnection, id: i64) -> Result<Vec<String>, AppError> {
    let mut images = Vec::new();
    for recipe_id in list_author_recipe_ids(conn, id).await? {
        if let Some(image) = delete_recipe(conn, recipe_id).await? {
            images.push(image);
        }
    }

    sqlx::query("DELETE FROM follows WHERE user_id = ? OR author_id = ?")
        .bind(id)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    for table in ["favorites", "shopping_list"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE user_id = ?"))
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(images)
}
