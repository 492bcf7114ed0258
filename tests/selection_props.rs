use dropui::components::dropdown::{filter_options, resolve_selected};
use dropui::{Resolved, Selection, SelectionMode};
use proptest::prelude::*;

// Option sets are (key, label) pairs with unique keys
fn arb_options() -> impl Strategy<Value = Vec<(u8, String)>> {
    prop::collection::btree_map(any::<u8>(), "[a-zA-Z ]{0,8}", 0..24)
        .prop_map(|map| map.into_iter().collect())
}

// Multi selections without duplicates, in arbitrary order
fn arb_multi() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::btree_set(any::<u8>(), 0..16)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    /// Property: picking the same option twice in multi mode restores the selection
    #[test]
    fn prop_multi_toggle_is_an_involution(keys in arb_multi(), key in any::<u8>()) {
        let selection = Selection::Multi(keys);
        let back = selection
            .toggled(key, SelectionMode::Multi)
            .toggled(key, SelectionMode::Multi);

        // Re-adding appends, so only membership is guaranteed when the key was present
        let mut before = selection.keys().to_vec();
        let mut after = back.keys().to_vec();
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);
        if !selection.contains(&key) {
            prop_assert_eq!(back, selection);
        }
    }

    /// Property: toggling never duplicates keys and leaves other keys in order
    #[test]
    fn prop_multi_toggle_keeps_others_in_order(keys in arb_multi(), key in any::<u8>()) {
        let next = Selection::Multi(keys.clone()).toggled(key, SelectionMode::Multi);
        let mut seen = std::collections::HashSet::new();
        prop_assert!(next.keys().iter().all(|k| seen.insert(*k)));

        let others: Vec<u8> = keys.iter().copied().filter(|k| *k != key).collect();
        let kept: Vec<u8> = next.keys().iter().copied().filter(|k| *k != key).collect();
        prop_assert_eq!(others, kept);
        prop_assert_eq!(next.contains(&key), !keys.contains(&key));
    }

    /// Property: single mode always lands on exactly the picked key
    #[test]
    fn prop_single_pick_selects_exactly(current in any::<Option<u8>>(), key in any::<u8>()) {
        let next = Selection::Single(current).toggled(key, SelectionMode::Single);
        prop_assert_eq!(next, Selection::Single(Some(key)));
    }

    /// Property: resolved options are selected, unique, and in option-set order
    #[test]
    fn prop_resolve_multi_follows_option_order(options in arb_options(), keys in arb_multi()) {
        let selection = Selection::Multi(keys.clone());
        let Resolved::Multi(resolved) = resolve_selected(&options, &selection, |o| o.0) else {
            panic!("multi selection must resolve to many");
        };

        let expected: Vec<&(u8, String)> = options.iter().filter(|o| keys.contains(&o.0)).collect();
        prop_assert_eq!(resolved, expected);
    }

    /// Property: the filter keeps exactly the options whose label contains the text
    #[test]
    fn prop_filter_is_sound_and_complete(options in arb_options(), text in "[a-zA-Z]{0,3}") {
        let kept = filter_options(&options, |o| o.1.clone(), &text);
        let needle = text.to_lowercase();

        for (idx, option) in options.iter().enumerate() {
            let matches = option.1.to_lowercase().contains(&needle);
            prop_assert_eq!(kept.contains(&idx), matches);
        }
        prop_assert!(kept.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
