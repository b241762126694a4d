//! Bundling a source tree into the addressable layout and loading from it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cardframe::bundler::{self, CATALOG_FILE};
use cardframe::resources::address::{Address, AddressGroup};
use cardframe::resources::assetcache::AssetCache;
use cardframe::resources::assetloader::{AssetKind, FsAssetLoader};

struct TempTree(PathBuf);

impl TempTree {
    fn new(tag: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("cardframe-bundler-{}-{}", tag, fastrand::u64(..)));
        fs::create_dir_all(&dir).unwrap();
        TempTree(dir)
    }

    fn write(&self, rel: &str, contents: &str) {
        let path = self.0.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempTree {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

const PANEL: &str = r#"{"title": "Main", "buttons": [{"id": "start", "label": "Start", "rect": [0, 0, 10, 10]}]}"#;

fn source_tree() -> TempTree {
    let src = TempTree::new("src");
    src.write("UI/MainPanel.json", PANEL);
    src.write("UI/MainPanel.json.meta", "guid: 1");
    src.write("UI/Popups/VictoryPanel.json", r#"{"title": "Victory"}"#);
    src.write("Tables/Levels.json", r#"[{"id": 1, "name": "Gate"}]"#);
    src.write("Tables/Old/Levels.json", r#"[]"#);
    src.write("Audio/BGM/main.ogg", "ogg");
    src
}

#[test]
fn bundles_groups_and_writes_catalog() {
    let src = source_tree();
    let out = TempTree::new("out");

    let report = bundler::bundle_assets(src.path(), out.path()).unwrap();

    assert_eq!(report.total(), 4);
    assert!(report.added.contains(&(AddressGroup::Ui, 2)));
    assert!(report.added.contains(&(AddressGroup::Tables, 1)));
    assert_eq!(report.duplicates.len(), 1);
    assert!(report.missing_folders.contains(&"Audio/SFX".to_string()));
    assert!(report.missing_folders.contains(&"Sprites".to_string()));

    assert!(out.path().join("ui/VictoryPanel.json").exists());
    assert!(!out.path().join("ui/MainPanel.json.meta").exists());
    assert!(out.path().join(CATALOG_FILE).exists());

    let catalog = bundler::read_catalog(out.path()).unwrap();
    assert_eq!(catalog.entry_count(), 4);
    let entry = catalog.find(&Address::new("audio_bgm/main")).unwrap();
    assert_eq!(entry.path, "audio_bgm/main.ogg");
    // The top-level file sorts before the nested duplicate.
    let levels = fs::read_to_string(out.path().join("tables/Levels.json")).unwrap();
    assert!(levels.contains("Gate"));
}

#[test]
fn bundled_tree_is_loadable() {
    let src = source_tree();
    let out = TempTree::new("load");
    bundler::bundle_assets(src.path(), out.path()).unwrap();

    let mut cache = AssetCache::new(Arc::new(FsAssetLoader::new(out.path())));
    let asset = cache
        .load(&Address::new("ui/MainPanel"), AssetKind::Prefab)
        .unwrap();
    let prefab = asset.as_prefab().unwrap();
    assert_eq!(prefab.title, "Main");
    assert!(prefab.button("start").is_some());
    assert!(cache.text(&Address::new("tables/Levels")).is_some());
}

#[test]
fn clear_removes_bundles_and_reports_count() {
    let src = source_tree();
    let out = TempTree::new("clear");
    bundler::bundle_assets(src.path(), out.path()).unwrap();
    out.write("keep.txt", "not bundled");

    assert_eq!(bundler::clear_bundles(out.path()).unwrap(), 4);
    assert!(!out.path().join("ui").exists());
    assert!(!out.path().join(CATALOG_FILE).exists());
    assert!(out.path().join("keep.txt").exists());
    assert_eq!(bundler::clear_bundles(out.path()).unwrap(), 0);
}

#[test]
fn missing_source_root_bundles_nothing() {
    let out = TempTree::new("empty");
    let report = bundler::bundle_assets(&out.path().join("absent"), out.path()).unwrap();
    assert_eq!(report.total(), 0);
    assert_eq!(report.missing_folders.len(), AddressGroup::ALL.len());
    let catalog = bundler::read_catalog(out.path()).unwrap();
    assert!(catalog.groups.is_empty());
    assert!(bundler::format_catalog(&catalog).contains("Total entries: 0"));
}
