use std::sync::Arc;

use pagestore::buffer::BufferPoolManager;
use pagestore::disk::DiskManager;
use pagestore::index::BPlusTree;
use pagestore::page::RecordId;
use pagestore::trie::Trie;

fn open_tree(page_size: usize, pool_size: usize) -> (BPlusTree<i64>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let disk = DiskManager::open(dir.path().join("data.db"), page_size).unwrap();
    let bpm = BufferPoolManager::new_shared(pool_size, 2, page_size, disk);
    (BPlusTree::open("orders", bpm).unwrap(), dir)
}

fn rid(n: i64) -> RecordId {
    RecordId::new(n as i32, 0)
}

#[test]
fn scenario_empty_tree() {
    let (tree, _dir) = open_tree(4096, 16);
    assert!(tree.is_empty().unwrap());
    assert_eq!(tree.get_value(&42).unwrap(), None);
}

#[test]
fn scenario_singleton() {
    let (tree, _dir) = open_tree(4096, 16);
    assert!(tree.insert(42, rid(42)).unwrap());
    assert_eq!(tree.get_value(&42).unwrap(), Some(rid(42)));
}

#[test]
fn scenario_linear_ascending_with_small_max_sizes() {
    // page_size=128 drives leaf_max_size=2, internal_max_size=3 for an i64
    // key, forcing several splits over just five inserts.
    let (tree, _dir) = open_tree(128, 32);
    assert_eq!(tree.leaf_max_size(), 2);
    assert_eq!(tree.internal_max_size(), 3);

    for k in 1..=5i64 {
        assert!(tree.insert(k, rid(k)).unwrap());
    }

    let scanned: Vec<(i64, RecordId)> = tree.range_from(&1).unwrap().map(|r| r.unwrap()).collect();
    assert_eq!(scanned.len(), 5);
    for (i, (key, value)) in scanned.into_iter().enumerate() {
        assert_eq!(key, i as i64 + 1);
        assert_eq!(value, rid(i as i64 + 1));
    }
}

#[test]
fn scenario_random_permutation_round_trip() {
    use rand::seq::SliceRandom;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    let (tree, _dir) = open_tree(128, 64);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let mut insert_order: Vec<i64> = (1..30).collect();
    insert_order.shuffle(&mut rng);
    for &k in &insert_order {
        assert!(tree.insert(k, rid(k)).unwrap());
        assert_eq!(tree.get_value(&k).unwrap(), Some(rid(k)));
    }

    let mut remove_order = insert_order.clone();
    remove_order.shuffle(&mut rng);
    for (i, &k) in remove_order.iter().enumerate() {
        assert!(tree.remove(&k).unwrap());
        assert_eq!(tree.get_value(&k).unwrap(), None);
        for &still_present in &remove_order[i + 1..] {
            assert_eq!(tree.get_value(&still_present).unwrap(), Some(rid(still_present)));
        }
    }
    assert!(tree.is_empty().unwrap());
}

#[test]
fn scenario_trie_duplicate_insert_keeps_original_value() {
    let trie = Trie::new();
    assert!(trie.insert("abc", 1i64));
    assert!(!trie.insert("abc", 2i64));
    assert_eq!(trie.get_value::<i64>("abc"), Some(1));
}

#[test]
fn scenario_trie_type_mismatch_is_none() {
    let trie = Trie::new();
    trie.insert("x", 1i64);
    assert_eq!(trie.get_value::<String>("x"), None);
}

#[test]
fn concurrent_inserts_across_threads_all_land() {
    let (tree, _dir) = open_tree(128, 64);
    let tree = Arc::new(tree);

    crossbeam::thread::scope(|scope| {
        for t in 0..4 {
            let tree = Arc::clone(&tree);
            scope.spawn(move |_| {
                for i in 0..25 {
                    let key = t * 25 + i;
                    tree.insert(key, rid(key)).unwrap();
                }
            });
        }
    })
    .unwrap();

    for key in 0..100 {
        assert_eq!(tree.get_value(&key).unwrap(), Some(rid(key)));
    }
}

#[test]
fn concurrent_trie_reads_and_writes_are_consistent() {
    let trie = Arc::new(Trie::new());

    crossbeam::thread::scope(|scope| {
        for t in 0..4 {
            let trie = Arc::clone(&trie);
            scope.spawn(move |_| {
                let key = format!("key-{t}");
                trie.insert(&key, t);
                for _ in 0..50 {
                    assert_eq!(trie.get_value::<i32>(&key), Some(t));
                }
            });
        }
    })
    .unwrap();

    for t in 0..4 {
        assert_eq!(trie.get_value::<i32>(&format!("key-{t}")), Some(t));
    }
}
