use std::sync::Arc;

use log::{info, LevelFilter};

use pagestore::buffer::BufferPoolManager;
use pagestore::config::StorageConfig;
use pagestore::disk::DiskManager;
use pagestore::index::BPlusTree;
use pagestore::page::RecordId;
use pagestore::trie::Trie;

/// Minimal `log::Log` implementation so the demo has visible output without
/// pulling in an external logging backend — the library itself never
/// installs a logger (see `config::4.7` in the design docs).
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() -> pagestore::common::Result<()> {
    log::set_logger(&LOGGER).expect("logger already initialized");
    log::set_max_level(LevelFilter::Debug);

    let config = StorageConfig::load(Some("PageStore.toml"))?;
    info!(
        "starting pagestore demo: page_size={} pool_size={} data_file={}",
        config.page_size, config.pool_size, config.data_file
    );

    let disk = DiskManager::open(&config.data_file, config.page_size)?;
    let bpm = BufferPoolManager::new_shared(config.pool_size, config.replacer_k, config.page_size, disk);

    let tree: BPlusTree<i64> = BPlusTree::open("demo", bpm)?;
    for key in [10, 5, 20, 3, 7, 15, 25] {
        tree.insert(key, RecordId::new(key as i32, 0))?;
    }
    info!("inserted 7 keys, tree empty = {}", tree.is_empty()?);

    for item in tree.iter()? {
        let (key, rid) = item?;
        info!("scan: {key} -> {rid:?}");
    }

    let trie = Trie::new();
    trie.insert("alice", 30i32);
    trie.insert("bob", 25i32);
    if let Some(age) = trie.get_value::<i32>("alice") {
        info!("trie lookup: alice is {age}");
    }

    Ok(())
}
