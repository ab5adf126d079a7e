//! The worker pool is process global and can be sized only once, so this
//! binary holds a single test that owns pool initialization.

use simple_docs::{config, index};
use std::fs;
use tempfile::TempDir;

#[test]
fn max_processes_applies_when_pool_is_sized_before_indexing() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "site_title = \"Pool\"\n\n[processing]\nmax_processes = 1\n",
    )
    .unwrap();
    fs::write(tmp.path().join("01_intro.md"), "---\ntitle: Intro\n---\nHi.\n").unwrap();
    fs::write(tmp.path().join("02_usage.md"), "---\ntitle: Usage\n---\nUse.\n").unwrap();

    let config = config::load_config(tmp.path()).unwrap();
    assert_eq!(config::init_thread_pool(&config.processing), 1);

    let manifest = index::scan_with_config(tmp.path(), config).unwrap();
    assert_eq!(manifest.index.paths(), &["/intro/", "/usage/"]);
    assert_eq!(manifest.config.site_title, "Pool");
    assert_eq!(rayon::current_num_threads(), 1);
}
