//! Post-extraction validation shared by the rule and AI paths.

use std::collections::HashSet;

use tracing::debug;

use super::options::is_plausible_option;
use crate::types::ChecklistItem;

/// Fill gaps, trim fields, filter options and make ids unique.
pub fn finalize(items: Vec<ChecklistItem>) -> Vec<ChecklistItem> {
    let mut taken = HashSet::new();

    items
        .into_iter()
        .enumerate()
        .map(|(i, mut item)| {
            item.id = item.id.trim().to_string();
            if item.id.is_empty() {
                item.id = format!("item_{:03}", i + 1);
                debug!(id = %item.id, "Generated missing item id");
            }

            item.text = item.text.trim().to_string();
            if item.text.is_empty() {
                item.text = format!("Review item {}", i + 1);
                debug!(id = %item.id, "Generated missing item text");
            }

            item.description = item
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());

            let before = item.options.len();
            item.options = item
                .options
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| is_plausible_option(o))
                .collect();
            if item.options.len() < before {
                debug!(
                    id = %item.id,
                    dropped = before - item.options.len(),
                    "Dropped implausible options"
                );
            }

            item.id = unique_id(&item.id, &mut taken);
            item
        })
        .collect()
}

fn unique_id(id: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(id.to_string()) {
        return id.to_string();
    }
    let unique = (2..)
        .map(|n| format!("{id}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| id.to_string());
    debug!(original = id, renamed = %unique, "Renamed duplicate item id");
    taken.insert(unique.clone());
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemType;

    #[test]
    fn test_fills_missing_fields() {
        let items = finalize(vec![
            ChecklistItem::new("  ", "   ", ItemType::Checkbox),
            ChecklistItem::new("a", " Keep me ", ItemType::Text).with_description(" note "),
        ]);
        assert_eq!(items[0].id, "item_001");
        assert_eq!(items[0].text, "Review item 1");
        assert_eq!(items[1].text, "Keep me");
        assert_eq!(items[1].description.as_deref(), Some("note"));
    }

    #[test]
    fn test_unique_ids() {
        let items = finalize(vec![
            ChecklistItem::new("item_1", "A", ItemType::Text),
            ChecklistItem::new("item_1", "B", ItemType::Text),
            ChecklistItem::new("item_1_2", "C", ItemType::Text),
            ChecklistItem::new("item_1", "D", ItemType::Text),
        ]);
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["item_1", "item_1_2", "item_1_2_2", "item_1_3"]);
    }

    #[test]
    fn test_filters_options() {
        let items = finalize(vec![ChecklistItem::new("q", "Q", ItemType::RadioGroup)
            .with_options(vec![
                "Opened in the name of the UCITS".into(),
                "pened in the name of the UCITS".into(),
                " ".into(),
            ])]);
        assert_eq!(items[0].options, vec!["Opened in the name of the UCITS"]);
    }
}
