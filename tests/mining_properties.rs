use std::collections::BTreeSet;

use basket_miner::{
    apriori::{Itemset, mine},
    rules::generate,
    transactions::Transaction,
};
use proptest::prelude::*;

fn arb_transactions() -> impl Strategy<Value = Vec<Transaction>> {
    // Small alphabet keeps candidate growth bounded while still producing
    // multi-level itemsets.
    let item = proptest::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_string);
    let basket = proptest::collection::btree_set(item, 1..4usize);
    proptest::collection::vec(basket, 1..12).prop_map(|baskets| {
        baskets
            .into_iter()
            .enumerate()
            .map(|(idx, items)| Transaction {
                id: idx.to_string(),
                items,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn mining_is_deterministic(txs in arb_transactions(), min_support in 0.0f64..0.6) {
        let first = mine(&txs, min_support, 0);
        let second = mine(&txs, min_support, 0);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn supports_are_valid_ratios(txs in arb_transactions(), min_support in 0.0f64..0.6) {
        let frequents = mine(&txs, min_support, 0);
        for level in frequents.values() {
            for support in level.values() {
                prop_assert!(*support > 0.0);
                prop_assert!(*support <= 1.0);
                prop_assert!(*support >= min_support);
            }
        }
    }

    #[test]
    fn support_is_anti_monotone(txs in arb_transactions()) {
        let frequents = mine(&txs, 0.0, 0);
        for (k, level) in frequents.iter().filter(|(k, _)| **k > 1) {
            let parents = &frequents[&(k - 1)];
            for (itemset, support) in level {
                for item in itemset {
                    let subset: Itemset = itemset
                        .iter()
                        .filter(|candidate| *candidate != item)
                        .cloned()
                        .collect();
                    let parent = parents.get(&subset).copied();
                    prop_assert!(parent.is_some(), "subset of a frequent itemset missing");
                    prop_assert!(*support <= parent.unwrap() + 1e-12);
                }
            }
        }
    }

    #[test]
    fn rule_metrics_are_consistent(txs in arb_transactions(), min_support in 0.0f64..0.3) {
        let frequents = mine(&txs, min_support, 0);
        let rules = generate(&frequents, 0.0);
        for rule in &rules {
            prop_assert!(rule.confidence > 0.0);
            prop_assert!(rule.confidence <= 1.0 + 1e-12);
            prop_assert!(rule.lift > 0.0);
            let antecedent: BTreeSet<&String> = rule.antecedent.iter().collect();
            let consequent: BTreeSet<&String> = rule.consequent.iter().collect();
            prop_assert!(antecedent.is_disjoint(&consequent));
            prop_assert!(!antecedent.is_empty());
            prop_assert!(!consequent.is_empty());
        }
    }
}
