//! 类别标签归一化
//!
//! 模型返回的类别名大小写、分隔符都不稳定（"Must Have Items" /
//! "MUST_HAVE_ITEMS" / "must-have-items"），这里统一折叠后与枚举的代码和
//! 展示名匹配；匹配不上时落入默认类别，单个未知类别不会导致整个响应被拒绝。

use std::str::FromStr;

use strum::IntoEnumIterator;
use tracing::debug;
use travel_mate_entity::category::{PackingCategory, TipCategory};

/// 折叠为 UPPER_SNAKE 形式：统一大写，空格和连字符替换为下划线
fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase().replace([' ', '-'], "_")
}

/// 解析行李类别，未匹配时落入 Misc
pub fn resolve_packing_category(label: &str) -> PackingCategory {
    let normalized = normalize_label(label);
    if let Ok(category) = PackingCategory::from_str(&normalized) {
        return category;
    }
    if let Some(category) = PackingCategory::iter().find(|c| normalize_label(c.display_name()) == normalized) {
        return category;
    }
    debug!("未识别的行李类别 '{}'，归入 Miscellaneous", label);
    PackingCategory::Misc
}

/// 解析贴士类别，未匹配时落入 General
pub fn resolve_tip_category(label: &str) -> TipCategory {
    let normalized = normalize_label(label);
    if let Ok(category) = TipCategory::from_str(&normalized) {
        return category;
    }
    if let Some(category) = TipCategory::iter().find(|c| normalize_label(c.display_name()) == normalized) {
        return category;
    }
    debug!("未识别的贴士类别 '{}'，归入 General", label);
    TipCategory::General
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_category_exact_code() {
        assert_eq!(resolve_packing_category("CLOTHING"), PackingCategory::Clothing);
        assert_eq!(resolve_packing_category("MISC"), PackingCategory::Misc);
    }

    #[test]
    fn test_packing_category_display_name() {
        assert_eq!(resolve_packing_category("Clothing"), PackingCategory::Clothing);
        assert_eq!(resolve_packing_category("Miscellaneous"), PackingCategory::Misc);
    }

    #[test]
    fn test_packing_category_case_and_delimiter_variants() {
        // 仅大小写或分隔符不同的标签必须归到同一类别
        assert_eq!(resolve_packing_category("clothing"), PackingCategory::Clothing);
        assert_eq!(resolve_packing_category("Toiletries "), PackingCategory::Toiletries);
        assert_eq!(resolve_packing_category("documents"), PackingCategory::Documents);
    }

    #[test]
    fn test_packing_category_fallback() {
        assert_eq!(resolve_packing_category("Medications"), PackingCategory::Misc);
        assert_eq!(resolve_packing_category("Documents & Money"), PackingCategory::Misc);
        assert_eq!(resolve_packing_category(""), PackingCategory::Misc);
    }

    #[test]
    fn test_tip_category_display_name() {
        assert_eq!(resolve_tip_category("Cultural Advice"), TipCategory::Cultural);
        assert_eq!(resolve_tip_category("Local Information"), TipCategory::LocalInfo);
        assert_eq!(resolve_tip_category("Must Have Items"), TipCategory::MustHave);
    }

    #[test]
    fn test_tip_category_delimiter_variants_fold_to_same_code() {
        let variants = ["Must Have Items", "MUST_HAVE_ITEMS", "must-have-items"];
        for variant in variants {
            assert_eq!(resolve_tip_category(variant), TipCategory::MustHave, "{}", variant);
        }
    }

    #[test]
    fn test_tip_category_exact_code() {
        assert_eq!(resolve_tip_category("MUST_HAVE"), TipCategory::MustHave);
        assert_eq!(resolve_tip_category("LOCAL_INFO"), TipCategory::LocalInfo);
    }

    #[test]
    fn test_tip_category_fallback() {
        assert_eq!(resolve_tip_category("Random Stuff"), TipCategory::General);
    }
}
