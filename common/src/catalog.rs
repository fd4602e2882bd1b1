//! カタログの並べ替え・検索モジュール
//!
//! 1. 優先度表にあるカテゴリを優先度順（安定ソート）
//! 2. それ以外をカテゴリ名のアルファベット順、カテゴリなしは最後
//! 3. 表示用に装飾（説明の小文字化、保証区分、追加済みフラグ）

use crate::constants::{level_priority, warranty_label};
use crate::types::CatalogItem;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 表示用のカタログ部品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub item: CatalogItem,

    /// 追加済みなら true（追加ボタンを無効化）
    pub disabled: bool,

    pub warranty: String,
}

/// カタログを表示順に並べ替える
pub fn sort_catalog(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let (mut known, mut other): (Vec<_>, Vec<_>) = items.into_iter().partition(|item| {
        item.level
            .as_deref()
            .and_then(level_priority)
            .is_some()
    });

    known.sort_by_key(|item| item.level.as_deref().and_then(level_priority));
    other.sort_by(|a, b| compare_levels(a.level.as_deref(), b.level.as_deref()));

    known.extend(other);
    known
}

/// 優先度表にないカテゴリの比較。カテゴリなしは後ろ
fn compare_levels(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => locale_compare(a, b),
    }
}

/// 辞書順比較。大文字小文字を無視して比べ、同じなら小文字を先にする
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// 並べ替え済みの部品を表示用に装飾する
pub fn decorate(items: Vec<CatalogItem>) -> Vec<CatalogEntry> {
    items
        .into_iter()
        .map(|mut item| {
            item.description = item.description.to_lowercase();
            let warranty = warranty_label(item.is_out_of_warranty).to_string();
            CatalogEntry {
                item,
                disabled: false,
                warranty,
            }
        })
        .collect()
}

/// 部品名・説明の部分一致で絞り込む（大文字小文字は無視、空なら全件）
pub fn filter_catalog<'a>(entries: &'a [CatalogEntry], query: &str) -> Vec<&'a CatalogEntry> {
    if query.is_empty() {
        return entries.iter().collect();
    }

    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            entry.item.name.to_lowercase().contains(&needle)
                || entry.item.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// 追加済みフラグを更新する
pub fn mark_added<F>(entries: &mut [CatalogEntry], is_added: F)
where
    F: Fn(&str) -> bool,
{
    for entry in entries {
        entry.disabled = is_added(&entry.item.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(name: &str, level: Option<&str>) -> CatalogItem {
        CatalogItem {
            id: format!("id-{}", name),
            name: name.to_string(),
            description: format!("{} Description", name),
            image: String::new(),
            level: level.map(str::to_string),
            max_qty: 2,
            is_out_of_warranty: false,
        }
    }

    fn names(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_known_category_by_priority() {
        let sorted = sort_catalog(vec![part("A", Some("Filters")), part("B", Some("MU"))]);
        assert_eq!(names(&sorted), vec!["B", "A"]);
    }

    #[test]
    fn test_known_before_unknown() {
        let sorted = sort_catalog(vec![
            part("acc", Some("Accessories")),
            part("belt", Some("Tracks & Belts")),
            part("none", None),
            part("psu", Some("power supply")),
        ]);
        assert_eq!(names(&sorted), vec!["psu", "belt", "acc", "none"]);
    }

    #[test]
    fn test_priority_ties_are_stable() {
        let sorted = sort_catalog(vec![
            part("m1", Some("Motor Unit")),
            part("c1", Some("Cables")),
            part("m2", Some("MU")),
            part("m3", Some("motor unit-commercial")),
        ]);
        assert_eq!(names(&sorted), vec!["m1", "m2", "m3", "c1"]);
    }

    #[test]
    fn test_unknown_alphabetical_absent_last() {
        let sorted = sort_catalog(vec![
            part("n1", None),
            part("z", Some("Zodiac")),
            part("n2", None),
            part("a", Some("Accessories")),
            part("h", Some("hoses")),
        ]);
        assert_eq!(names(&sorted), vec!["a", "h", "z", "n1", "n2"]);
    }

    #[test]
    fn test_unknown_same_level_keeps_input_order() {
        let items = vec![
            part("c1", Some("Accessories")),
            part("z", Some("Hoses")),
            part("c2", Some("Accessories")),
            part("c3", Some("accessories")),
        ];
        assert_eq!(names(&sort_catalog(items)), vec!["c3", "c1", "c2", "z"]);
    }

    #[test]
    fn test_locale_compare_case() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("Kit", "Kit"), Ordering::Equal);
    }

    #[test]
    fn test_decorate() {
        let mut item = part("9995", Some("Filters"));
        item.is_out_of_warranty = true;
        let entries = decorate(vec![item]);
        assert_eq!(entries[0].item.description, "9995 description");
        assert_eq!(entries[0].warranty, "Out of Warranty");
        assert!(!entries[0].disabled);
    }

    #[test]
    fn test_filter_by_name_or_description() {
        let entries = decorate(vec![part("9995", None), part("4101", None)]);
        assert_eq!(filter_catalog(&entries, "").len(), 2);

        let hits = filter_catalog(&entries, "99");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.name, "9995");

        assert_eq!(filter_catalog(&entries, "DESCRIPTION").len(), 2);
        assert!(filter_catalog(&entries, "pump").is_empty());
    }

    #[test]
    fn test_mark_added() {
        let mut entries = decorate(vec![part("9995", None), part("4101", None)]);
        mark_added(&mut entries, |name| name == "4101");
        assert!(!entries[0].disabled);
        assert!(entries[1].disabled);
    }

    #[test]
    fn test_entry_serialize_flattened() {
        let entries = decorate(vec![part("9995", Some("Filters"))]);
        let json = serde_json::to_string(&entries[0]).unwrap();
        assert!(json.contains("\"name\":\"9995\""));
        assert!(json.contains("\"maxQty\":2"));
        assert!(json.contains("\"disabled\":false"));
    }
}
