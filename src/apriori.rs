//! Level-wise Apriori frequent-itemset mining.
//!
//! Candidate generation joins pairs of (k−1)-frequents and prunes any
//! candidate with an infrequent (k−1)-subset before counting. Counting is a
//! plain subset-containment scan over all transactions; growth at higher k
//! is combinatorial in the number of frequent single items, which is the
//! known scalability ceiling of this algorithm (see `benches/apriori.rs`).

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::transactions::Transaction;

/// Canonical itemset: a `BTreeSet` keeps identity and iteration order
/// independent of construction order.
pub type Itemset = std::collections::BTreeSet<String>;

/// Frequent itemsets grouped by size, each mapped to its support.
pub type LevelledItemsets = BTreeMap<usize, HashMap<Itemset, f64>>;

/// Mines all frequent itemsets with support ≥ `min_support` (inclusive).
///
/// `max_len` caps the largest itemset size as a safety valve against
/// candidate blow-up; 0 means unlimited.
pub fn mine(transactions: &[Transaction], min_support: f64, max_len: usize) -> LevelledItemsets {
    let mut frequents = LevelledItemsets::new();
    if transactions.is_empty() {
        return frequents;
    }
    let total = transactions.len() as f64;

    let mut item_counts: HashMap<&str, usize> = HashMap::new();
    for transaction in transactions {
        for item in &transaction.items {
            *item_counts.entry(item.as_str()).or_insert(0) += 1;
        }
    }
    let level_one: HashMap<Itemset, f64> = item_counts
        .into_iter()
        .map(|(item, count)| {
            (
                Itemset::from([item.to_string()]),
                count as f64 / total,
            )
        })
        .filter(|(_, support)| *support >= min_support)
        .collect();
    if level_one.is_empty() {
        return frequents;
    }

    let mut prev: Vec<Itemset> = level_one.keys().cloned().collect();
    frequents.insert(1, level_one);

    let mut k = 2;
    while !prev.is_empty() && (max_len == 0 || k <= max_len) {
        let candidates = generate_candidates(&prev, k);
        let level: HashMap<Itemset, f64> = count_support(&candidates, transactions, total)
            .into_iter()
            .filter(|(_, support)| *support >= min_support)
            .collect();
        if level.is_empty() {
            break;
        }
        prev = level.keys().cloned().collect();
        frequents.insert(k, level);
        k += 1;
    }

    frequents
}

/// Join step: unions of pairs of (k−1)-frequents that have exactly k
/// elements, pruned when any (k−1)-subset is not itself frequent.
fn generate_candidates(prev: &[Itemset], k: usize) -> HashSet<Itemset> {
    let prev_lookup: HashSet<&Itemset> = prev.iter().collect();
    let mut candidates = HashSet::new();
    for i in 0..prev.len() {
        for j in (i + 1)..prev.len() {
            let union: Itemset = prev[i].union(&prev[j]).cloned().collect();
            if union.len() != k {
                continue;
            }
            let all_subsets_frequent = union.iter().all(|item| {
                let mut subset = union.clone();
                subset.remove(item);
                prev_lookup.contains(&subset)
            });
            if all_subsets_frequent {
                candidates.insert(union);
            }
        }
    }
    candidates
}

/// Counts candidate support across all transactions. Zero-count candidates
/// are excluded outright so they never appear even at min_support 0.
fn count_support(
    candidates: &HashSet<Itemset>,
    transactions: &[Transaction],
    total: f64,
) -> HashMap<Itemset, f64> {
    let mut counts: HashMap<&Itemset, usize> = HashMap::new();
    for transaction in transactions {
        for candidate in candidates {
            if candidate.iter().all(|item| transaction.items.contains(item)) {
                *counts.entry(candidate).or_insert(0) += 1;
            }
        }
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(itemset, count)| (itemset.clone(), count as f64 / total))
        .collect()
}
