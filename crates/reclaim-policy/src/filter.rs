//! Which items the processing input slots accept.

use std::collections::HashSet;

use reclaim_config::Settings;
use reclaim_world::Item;

/// The first six container slots are the processing inputs; only they are
/// filtered. Anything placed at a higher slot index is unrestricted.
pub const INPUT_SLOTS: usize = 6;

/// Category allowlist plus shortname blacklist, built once from settings.
///
/// Both checkpoints — the pre-acceptance veto and the post-insertion
/// validation — consult the same filter, so an item can never slip in
/// through the gap between the two container events.
#[derive(Debug, Clone)]
pub struct ItemFilter {
    recyclable: HashSet<String>,
    blacklist: HashSet<String>,
}

impl ItemFilter {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            recyclable: settings.recyclable_types.iter().cloned().collect(),
            blacklist: settings.blacklist.iter().cloned().collect(),
        }
    }

    /// Whether the item may be processed: category allowlisted and
    /// shortname not blacklisted.
    pub fn is_eligible(&self, item: &Item) -> bool {
        self.recyclable.contains(item.category.name()) && !self.blacklist.contains(&item.shortname)
    }

    /// Slot-aware check: input slots apply [`is_eligible`](Self::is_eligible),
    /// other slots accept anything.
    pub fn allows(&self, item: &Item, slot: usize) -> bool {
        slot >= INPUT_SLOTS || self.is_eligible(item)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim_world::ItemCategory;

    fn filter(types: &[&str], blacklist: &[&str]) -> ItemFilter {
        ItemFilter::from_settings(&Settings {
            recyclable_types: types.iter().map(|s| s.to_string()).collect(),
            blacklist: blacklist.iter().map(|s| s.to_string()).collect(),
            ..Settings::default()
        })
    }

    #[test]
    fn test_allowlisted_category_is_eligible() {
        let f = filter(&["Component"], &[]);
        assert!(f.is_eligible(&Item::new("rope", ItemCategory::Component)));
    }

    #[test]
    fn test_category_outside_allowlist_is_rejected() {
        let f = filter(&["Component"], &[]);
        assert!(!f.is_eligible(&Item::new("rifle.ak", ItemCategory::Weapon)));
    }

    #[test]
    fn test_blacklisted_shortname_overrides_allowlist() {
        let f = filter(&["Weapon"], &["rifle.ak"]);
        assert!(!f.is_eligible(&Item::new("rifle.ak", ItemCategory::Weapon)));
        assert!(f.is_eligible(&Item::new("pistol.revolver", ItemCategory::Weapon)));
    }

    #[test]
    fn test_input_slots_are_filtered() {
        let f = filter(&["Component"], &[]);
        let bad = Item::new("rifle.ak", ItemCategory::Weapon);

        for slot in 0..INPUT_SLOTS {
            assert!(!f.allows(&bad, slot), "slot {slot} must be filtered");
        }
    }

    #[test]
    fn test_slots_past_inputs_accept_anything() {
        let f = filter(&[], &["rock"]);
        let bad = Item::new("rock", ItemCategory::Tool);

        assert!(!f.allows(&bad, 5));
        assert!(f.allows(&bad, 6));
        assert!(f.allows(&bad, 11));
    }

    #[test]
    fn test_stock_settings_accept_components() {
        let f = ItemFilter::from_settings(&Settings::default());
        assert!(f.is_eligible(&Item::new("gears", ItemCategory::Component)));
        assert!(!f.is_eligible(&Item::new("wood", ItemCategory::Resources)));
    }
}
