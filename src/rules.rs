//! Association-rule derivation from frequent itemsets.
//!
//! Every frequent itemset of size ≥2 is split into all non-empty
//! antecedent/consequent pairs; complementary splits are both emitted, as in
//! standard association-rule output. A rule whose consequent has zero
//! recorded support gets infinite lift and always passes the threshold;
//! exporters treat that value as a sentinel, not a number.

use std::{cmp::Ordering, collections::HashMap};

use itertools::Itertools;
use serde::Serialize;

use crate::apriori::{Itemset, LevelledItemsets};

#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    pub antecedent: Vec<String>,
    pub consequent: Vec<String>,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
}

impl Rule {
    /// Comma-joined antecedent labels for display and export.
    pub fn antecedent_label(&self) -> String {
        self.antecedent.join(", ")
    }

    pub fn consequent_label(&self) -> String {
        self.consequent.join(", ")
    }
}

/// Derives all rules with lift ≥ `min_lift`, sorted descending by
/// (lift, confidence, support) with label ties broken lexicographically so
/// output order is fully reproducible.
pub fn generate(frequents: &LevelledItemsets, min_lift: f64) -> Vec<Rule> {
    let mut support_lookup: HashMap<&Itemset, f64> = HashMap::new();
    for level in frequents.values() {
        for (itemset, support) in level {
            support_lookup.insert(itemset, *support);
        }
    }

    let mut rules = Vec::new();
    for (size, level) in frequents.iter().filter(|(size, _)| **size >= 2) {
        for (itemset, support) in level {
            let items: Vec<&String> = itemset.iter().collect();
            for split in 1..*size {
                for antecedent_items in items.iter().copied().combinations(split) {
                    let antecedent: Itemset = antecedent_items.into_iter().cloned().collect();
                    let consequent: Itemset = itemset.difference(&antecedent).cloned().collect();
                    if consequent.is_empty() {
                        continue;
                    }
                    let antecedent_support =
                        support_lookup.get(&antecedent).copied().unwrap_or(0.0);
                    if antecedent_support <= 0.0 {
                        continue;
                    }
                    let consequent_support =
                        support_lookup.get(&consequent).copied().unwrap_or(0.0);
                    let confidence = support / antecedent_support;
                    let lift = if consequent_support > 0.0 {
                        confidence / consequent_support
                    } else {
                        f64::INFINITY
                    };
                    if lift < min_lift {
                        continue;
                    }
                    rules.push(Rule {
                        antecedent: antecedent.into_iter().collect(),
                        consequent: consequent.into_iter().collect(),
                        support: *support,
                        confidence,
                        lift,
                    });
                }
            }
        }
    }

    rules.sort_by(compare_rules);
    rules
}

fn compare_rules(a: &Rule, b: &Rule) -> Ordering {
    b.lift
        .total_cmp(&a.lift)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| b.support.total_cmp(&a.support))
        .then_with(|| a.antecedent.cmp(&b.antecedent))
        .then_with(|| a.consequent.cmp(&b.consequent))
}
