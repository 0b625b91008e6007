//! # 페이지 번호 기반 페이지네이션
//!
//! 목록 API는 `?page=2&limit=10` 형태의 파라미터를 받고,
//! 다음 모양의 응답을 돌려줍니다:
//!
//! ```json
//! { "count": 23, "next": "/api/recipes?limit=10&page=3", "previous": "/api/recipes?limit=10", "results": [...] }
//! ```
//!
//! - `page`가 숫자가 아니거나 1보다 작으면 404
//! - `limit`이 숫자가 아니거나 1보다 작으면 설정의 기본 페이지 크기를 사용
//! - 마지막 페이지를 넘는 페이지(1페이지 제외)는 404

use axum::http::Uri;
use serde::Serialize;

use crate::error::AppError;

/// 쿼리 파라미터에서 읽은 페이지 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// (키, 값) 쿼리 목록에서 `page`와 `limit`을 읽습니다.
    pub fn from_pairs(pairs: &[(String, String)], default_limit: i64) -> Result<Self, AppError> {
        let page = match last_value(pairs, "page") {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(AppError::NotFound),
            },
        };
        let limit = last_value(pairs, "limit")
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|limit| *limit >= 1)
            .unwrap_or(default_limit);

        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// 요청한 페이지가 전체 개수 범위 안에 있는지 확인합니다. 1페이지는 항상 유효합니다.
    pub fn ensure_in_range(&self, count: i64) -> Result<(), AppError> {
        if self.page > 1 && self.offset() >= count {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

/// 같은 키가 여러 번 오면 마지막 값을 사용합니다.
fn last_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// 페이지네이션된 목록 응답
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// 결과와 전체 개수로 응답을 만들고, 요청 URI를 기준으로 이전/다음 링크를 계산합니다.
    pub fn new(results: Vec<T>, count: i64, pagination: Pagination, uri: &Uri) -> Self {
        let has_next = pagination.page.saturating_mul(pagination.limit) < count;
        let next = has_next
            .then(|| page_link(uri, Some(pagination.page + 1)))
            .flatten();
        let previous = match pagination.page {
            1 => None,
            // 1페이지로 가는 링크에는 page 파라미터를 붙이지 않습니다.
            2 => page_link(uri, None),
            page => page_link(uri, Some(page - 1)),
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// 요청 URI의 `page` 파라미터만 바꾼 링크를 만듭니다. 나머지 파라미터는 순서대로 유지됩니다.
fn page_link(uri: &Uri, page: Option<i64>) -> Option<String> {
    let mut pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(uri.query().unwrap_or("")).ok()?;
    pairs.retain(|(key, _)| key != "page");
    if let Some(page) = page {
        pairs.push(("page".to_string(), page.to_string()));
    }

    let query = serde_urlencoded::to_string(&pairs).ok()?;
    if query.is_empty() {
        Some(uri.path().to_string())
    } else {
        Some(format!("{}?{}", uri.path(), query))
    }
}
