//! # 권한 확인
//!
//! 레시피 수정/삭제는 작성자만 할 수 있습니다. 읽기는 누구나 가능하므로
//! 별도의 확인이 없습니다.

use crate::error::AppError;
use crate::middleware::auth::AuthUser;

/// 요청자가 작성자가 아니면 403을 반환합니다.
pub fn ensure_author(author_id: i64, user: &AuthUser) -> Result<(), AppError> {
    if author_id != user.user_id {
        return Err(AppError::Forbidden(
            "only the author can modify this recipe".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_author_passes() {
        let user = AuthUser { user_id: 7 };
        assert!(ensure_author(7, &user).is_ok());
        assert!(matches!(ensure_author(8, &user), Err(AppError::Forbidden(_))));
    }
}
