use fparray::fp::ItemsetRecord;
use fparray::{CacheGeometry, Database, MinSupport, Miner, MinerConfig, MiningResult};
use proptest::prelude::*;
use std::collections::BTreeMap;

const MAX_ITEM: u32 = 6;
const LARGE_ID_OFFSET: u32 = 3_000_000_000;

/// Support of every non-empty itemset over items `1..=MAX_ITEM`, by exhaustive subset enumeration.
fn brute_force(transactions: &[Vec<u32>], min_support: u32) -> BTreeMap<Vec<u32>, u32> {
    let mut frequent = BTreeMap::new();
    for mask in 1u32..(1 << MAX_ITEM) {
        let itemset: Vec<u32> = (1..=MAX_ITEM).filter(|item| mask & (1 << (item - 1)) != 0).collect();
        let support = transactions
            .iter()
            .filter(|tx| itemset.iter().all(|item| tx.contains(item)))
            .count() as u32;
        if support >= min_support {
            frequent.insert(itemset, support);
        }
    }
    frequent
}

fn as_map(result: &MiningResult) -> BTreeMap<Vec<u32>, u32> {
    result
        .iter()
        .map(|itemset| {
            let mut items = itemset.items;
            items.sort_unstable();
            (items, itemset.support)
        })
        .collect()
}

fn records(result: &MiningResult) -> Vec<(u32, ItemsetRecord)> {
    result.itemsets.iter().map(|(id, record)| (id, *record)).collect()
}

fn mine(transactions: &[Vec<u32>], config: MinerConfig) -> MiningResult {
    let mut db = Database::new(transactions.to_vec());
    Miner::new(config).unwrap().mine(&mut db).unwrap()
}

fn transaction_sets() -> impl Strategy<Value = Vec<Vec<u32>>> {
    prop::collection::vec(prop::collection::vec(1..=MAX_ITEM, 0..6), 0..16)
}

proptest::proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    /// Mining agrees with exhaustive counting for any group, thread and cache layout.
    fn agrees_with_brute_force(
        transactions in transaction_sets(),
        min_support in 1u32..4,
        groups in 1usize..4,
        threads in 1usize..3,
        cached in any::<bool>(),
    ) {
        let mut config = MinerConfig::new(MinSupport::Count(min_support))
            .with_groups(groups)
            .with_threads_per_group(threads);
        if !cached {
            config = config.without_cache();
        }
        let result = mine(&transactions, config);

        prop_assert_eq!(as_map(&result), brute_force(&transactions, min_support));
    }

    #[test]
    /// Ids far above the dense-histogram range mine the same itemsets, shifted.
    fn large_item_ids_agree_with_brute_force(transactions in transaction_sets(), min_support in 1u32..3) {
        let shifted: Vec<Vec<u32>> = transactions
            .iter()
            .map(|tx| tx.iter().map(|&item| item + LARGE_ID_OFFSET).collect())
            .collect();
        let result = mine(&shifted, MinerConfig::new(MinSupport::Count(min_support)).with_groups(2));

        let expected: BTreeMap<Vec<u32>, u32> = brute_force(&transactions, min_support)
            .into_iter()
            .map(|(items, support)| (items.into_iter().map(|item| item + LARGE_ID_OFFSET).collect(), support))
            .collect();
        prop_assert_eq!(as_map(&result), expected);
    }

    #[test]
    /// Every reported itemset meets the threshold and no subset has lower support.
    fn supports_are_anti_monotone(transactions in transaction_sets(), min_support in 1u32..4) {
        let result = mine(&transactions, MinerConfig::new(MinSupport::Count(min_support)).with_groups(2));
        let found = as_map(&result);

        for (items, &support) in &found {
            prop_assert!(support >= min_support);
            if items.len() < 2 {
                continue;
            }
            for skip in 0..items.len() {
                let mut subset = items.clone();
                subset.remove(skip);
                let subset_support = found.get(&subset).copied();
                prop_assert!(subset_support.is_some_and(|s| s >= support), "{:?} missing or lower than {:?}", subset, items);
            }
        }
    }

    #[test]
    /// Ids and records do not depend on how work is split.
    fn numbering_is_deterministic(transactions in transaction_sets(), min_support in 1u32..3) {
        let serial = mine(
            &transactions,
            MinerConfig::new(MinSupport::Count(min_support)).with_groups(1).with_threads_per_group(1),
        );
        let parallel = mine(
            &transactions,
            MinerConfig::new(MinSupport::Count(min_support))
                .with_groups(3)
                .with_threads_per_group(2)
                .with_shards(3)
                .with_seed_batch(2),
        );

        prop_assert_eq!(records(&serial), records(&parallel));
        prop_assert_eq!(serial.singletons, parallel.singletons);
    }

    #[test]
    /// Results are identical with and without the read cache, for any geometry.
    fn cache_is_transparent(
        transactions in transaction_sets(),
        ways in 1usize..4,
        set_bits in 0u32..4,
    ) {
        let config = MinerConfig::new(MinSupport::Count(1)).with_groups(2);
        let uncached = mine(&transactions, config.clone().without_cache());
        let cached = mine(&transactions, config.with_cache(CacheGeometry::new(ways, 1 << set_bits)));

        prop_assert_eq!(records(&uncached), records(&cached));
    }

    #[test]
    /// A synthetic id expands to one item per level, its record's suffix last.
    fn materialize_follows_records(transactions in transaction_sets()) {
        let result = mine(&transactions, MinerConfig::new(MinSupport::Count(1)));
        let table = &result.itemsets;

        for (id, record) in table.iter() {
            let items = table.materialize(id).unwrap();
            prop_assert_eq!(items.last().copied(), Some(record.suffix));

            let prefix_len = table.materialize(record.prefix).map_or(0, |prefix| prefix.len());
            prop_assert_eq!(items.len(), prefix_len + 1);

            let mut distinct = items.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(distinct.len(), items.len());
        }
    }

    #[test]
    /// Filtered transactions keep exactly the frequent items, in non-increasing support order.
    fn filtering_keeps_frequent_items_in_order(transactions in transaction_sets(), min_support in 1u32..4) {
        let mut db = Database::new(transactions.clone());
        let frequent = db.scan_for_frequent_items(min_support);
        let support: BTreeMap<u32, u32> = frequent.iter().copied().collect();

        let filtered = db.filtered_items().unwrap();
        let expected: Vec<Vec<u32>> = transactions
            .iter()
            .map(|tx| {
                let mut items: Vec<u32> = tx.iter().copied().filter(|item| support.contains_key(item)).collect();
                items.sort_unstable();
                items.dedup();
                items
            })
            .filter(|items| !items.is_empty())
            .collect();
        prop_assert_eq!(filtered.len(), expected.len());

        for (tx, expected) in filtered.iter().zip(&expected) {
            let mut sorted = tx.clone();
            sorted.sort_unstable();
            prop_assert_eq!(&sorted, expected);
            for pair in tx.windows(2) {
                prop_assert!(support[&pair[0]] >= support[&pair[1]]);
            }
        }
    }
}
