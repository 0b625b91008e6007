//! # 입력값 검증 서비스
//!
//! 요청 본문과 적재 데이터의 형식을 검증합니다.
//! 모든 함수는 DB에 접근하지 않으며, 실패하면 `AppError::BadRequest`를 돌려줍니다.
//! 참조 무결성(존재하는 태그/재료인지, 이름이 중복되는지)은 트랜잭션 안에서
//! 라우트 핸들러가 확인합니다.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;
use crate::models::*;

/// 태그 slug: 영문자, 숫자, 하이픈, 밑줄
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug regex"));

/// 색상 코드: `#RRGGBB` 또는 `#RGB`
static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("color regex"));

/// 사용자 이름: 단어 문자와 `.@+-`
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username regex"));

pub const NAME_MAX_LEN: usize = 200;
pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PASSWORD_MIN_LEN: usize = 8;
/// 수량과 조리 시간의 상한. 장바구니 합계(SUM)가 i64를 넘지 않게 32비트 범위로 제한합니다.
pub const QUANTITY_MAX: i64 = i32::MAX as i64;

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::BadRequest(message.into())
}

/// 필수 문자열 필드: 공백만 있으면 안 되고, 글자 수(바이트 아님)가 `max`를 넘으면 안 됩니다.
fn require_text(field: &str, value: &str, max: Option<usize>) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(bad_request(format!("{field}: this field may not be blank")));
    }
    if let Some(max) = max {
        if value.chars().count() > max {
            return Err(bad_request(format!(
                "{field}: ensure this field has no more than {max} characters"
            )));
        }
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.chars().count() > NAME_MAX_LEN || !SLUG_RE.is_match(slug) {
        return Err(bad_request(format!("slug: '{slug}' is not a valid slug")));
    }
    Ok(())
}

pub fn validate_color(color: &str) -> Result<(), AppError> {
    if !COLOR_RE.is_match(color) {
        return Err(bad_request(format!("color: '{color}' is not a valid hex color")));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    require_text("username", username, Some(USERNAME_MAX_LEN))?;
    if !USERNAME_RE.is_match(username) {
        return Err(bad_request("username: contains forbidden characters"));
    }
    // "me"는 /users/me 경로와 겹칩니다.
    if username == "me" {
        return Err(bad_request("username: 'me' is reserved"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    require_text("email", email, Some(EMAIL_MAX_LEN))?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(bad_request("email: enter a valid email address")),
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(bad_request(format!(
            "password: must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    validate_email(&req.email)?;
    validate_username(&req.username)?;
    require_text("first_name", &req.first_name, Some(USERNAME_MAX_LEN))?;
    require_text("last_name", &req.last_name, Some(USERNAME_MAX_LEN))?;
    validate_password(&req.password)
}

pub fn validate_tag_seed(seed: &TagSeed) -> Result<(), AppError> {
    require_text("name", &seed.name, Some(NAME_MAX_LEN))?;
    validate_color(&seed.color)?;
    validate_slug(&seed.slug)
}

pub fn validate_ingredient_seed(seed: &IngredientSeed) -> Result<(), AppError> {
    require_text("name", &seed.name, Some(NAME_MAX_LEN))?;
    require_text("measurement_unit", &seed.measurement_unit, Some(NAME_MAX_LEN))
}

fn validate_cooking_time(cooking_time: i64) -> Result<(), AppError> {
    if cooking_time < 1 {
        return Err(bad_request("cooking_time: must be at least 1 minute"));
    }
    if cooking_time > QUANTITY_MAX {
        return Err(bad_request(format!(
            "cooking_time: must be at most {QUANTITY_MAX}"
        )));
    }
    Ok(())
}

/// 태그와 재료 목록: 비어 있으면 안 되고, 같은 ID가 두 번 나오면 안 되며,
/// 수량은 1 이상 `QUANTITY_MAX` 이하.
fn validate_associations(tags: &[i64], ingredients: &[IngredientAmount]) -> Result<(), AppError> {
    if tags.is_empty() {
        return Err(bad_request("tags: at least one tag is required"));
    }
    let mut seen = HashSet::new();
    if !tags.iter().all(|id| seen.insert(*id)) {
        return Err(bad_request("tags: tags must not repeat"));
    }

    if ingredients.is_empty() {
        return Err(bad_request("ingredients: at least one ingredient is required"));
    }
    let mut seen = HashSet::new();
    for item in ingredients {
        if !(1..=QUANTITY_MAX).contains(&item.amount) {
            return Err(bad_request(format!(
                "ingredients: amount for ingredient {} must be between 1 and {QUANTITY_MAX}",
                item.id
            )));
        }
        if !seen.insert(item.id) {
            return Err(bad_request(format!(
                "ingredients: ingredient {} is listed more than once",
                item.id
            )));
        }
    }
    Ok(())
}

pub fn validate_create_recipe(req: &CreateRecipeRequest) -> Result<(), AppError> {
    require_text("name", &req.name, Some(NAME_MAX_LEN))?;
    require_text("text", &req.text, None)?;
    require_text("image", &req.image, None)?;
    validate_cooking_time(req.cooking_time)?;
    validate_associations(&req.tags, &req.ingredients)
}

pub fn validate_update_recipe(req: &UpdateRecipeRequest) -> Result<(), AppError> {
    if let Some(name) = &req.name {
        require_text("name", name, Some(NAME_MAX_LEN))?;
    }
    if let Some(text) = &req.text {
        require_text("text", text, None)?;
    }
    if let Some(image) = &req.image {
        require_text("image", image, None)?;
    }
    if let Some(cooking_time) = req.cooking_time {
        validate_cooking_time(cooking_time)?;
    }
    validate_associations(&req.tags, &req.ingredients)
}
