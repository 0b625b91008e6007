//! # 장바구니 텍스트 렌더링
//!
//! `db::shopping_list_totals`가 (재료 이름, 단위)별로 합산하고 이름·단위 순으로
//! 정렬한 결과를 한 줄에 하나씩 텍스트로 만듭니다.
//!
//! ```text
//! Salt (g) - 8
//! Water (ml) - 500
//! ```

use crate::models::ShoppingListItem;

/// 다운로드 파일 이름
pub const FILE_NAME: &str = "shopping_list.txt";

/// 합계 목록을 `"{이름} ({단위}) - {수량}\n"` 줄들로 렌더링합니다.
/// 빈 장바구니는 빈 문자열이 됩니다.
pub fn render_shopping_list(items: &[ShoppingListItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} ({}) - {}\n", item.name, item.measurement_unit, item.amount))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, unit: &str, amount: i64) -> ShoppingListItem {
        ShoppingListItem {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn renders_one_line_per_item() {
        let text = render_shopping_list(&[item("Salt", "g", 8), item("Water", "ml", 500)]);
        assert_eq!(text, "Salt (g) - 8\nWater (ml) - 500\n");
    }

    #[test]
    fn empty_cart_renders_empty_text() {
        assert_eq!(render_shopping_list(&[]), "");
    }
}
