//! # 레시피 이미지 서비스
//!
//! 클라이언트는 이미지를 `data:image/png;base64,iVBORw0...` 형태의 data URI로 보냅니다.
//! 이 모듈은 그것을 디코딩해 미디어 디렉토리에 파일로 저장하고,
//! DB에는 미디어 디렉토리 기준 상대 경로만 기록합니다.

use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::fs;

use crate::error::AppError;

/// 레시피 이미지가 저장되는 하위 디렉토리 (미디어 디렉토리 기준)
pub const IMAGE_DIR: &str = "recipes/images";

/// 디코딩된 이미지: 선언된 확장자와 원본 바이트
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// data URI를 디코딩합니다.
///
/// 형식: `data:image/<확장자>;base64,<데이터>`
/// 확장자는 영문자/숫자만 허용하고 소문자로 정규화합니다.
pub fn decode_data_uri(data: &str) -> Result<DecodedImage, AppError> {
    let invalid = || AppError::BadRequest("image: expected data:image/<ext>;base64,<payload>".to_string());

    let rest = data.trim().strip_prefix("data:image/").ok_or_else(invalid)?;
    let (extension, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;

    if extension.is_empty()
        || extension.len() > 10
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(invalid());
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| AppError::BadRequest(format!("image: invalid base64 payload ({e})")))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("image: the submitted file is empty".to_string()));
    }

    Ok(DecodedImage {
        extension: extension.to_ascii_lowercase(),
        bytes,
    })
}

/// 이미지를 `<media_path>/recipes/images/<uuid>.<확장자>`에 저장하고 상대 경로를 반환합니다.
///
/// 파일 이름은 UUIDv7이므로 같은 이름으로 덮어쓸 일이 없습니다.
pub async fn save_image(media_path: &str, image: &DecodedImage) -> Result<String, AppError> {
    let relative = format!(
        "{}/{}.{}",
        IMAGE_DIR,
        uuid::Uuid::now_v7(),
        image.extension
    );
    let full_path = PathBuf::from(media_path).join(&relative);

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&full_path, &image.bytes).await?;

    Ok(relative)
}

/// 저장된 이미지를 삭제합니다.
///
/// 레시피 행은 이미 커밋된 뒤에 호출되므로 실패해도 요청을 실패시키지 않고 경고만 남깁니다.
pub async fn remove_image(media_path: &str, relative: &str) {
    let full_path = PathBuf::from(media_path).join(relative);
    if let Err(e) = fs::remove_file(&full_path).await {
        tracing::warn!("Failed to remove image {}: {}", full_path.display(), e);
    }
}

/// 상대 경로를 공개 URL로 바꿉니다. 예: ("/media/", "recipes/images/a.png") → "/media/recipes/images/a.png"
pub fn image_url(media_url: &str, relative: &str) -> String {
    format!("{}/{}", media_url.trim_end_matches('/'), relative)
}
