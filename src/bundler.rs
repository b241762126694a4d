//! Asset bundling tool.
//!
//! Packs a source tree into the addressable layout the runtime loads from.
//! Each [`AddressGroup`] has a fixed source folder (`UI`, `Audio/BGM`, ...);
//! every file found under it, at any depth, is copied flat into
//! `<out_root>/<group>/` and addressed as `<group>/<file stem>`. A
//! `catalog.json` listing all entries is written next to the group folders.
//!
//! Folders that do not exist are reported and skipped. Within a group, the
//! first file claiming an address wins; later ones are skipped with a
//! warning. Unity-style `.meta` sidecar files are ignored.

use crate::resources::address::{Address, AddressGroup};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CATALOG_FILE: &str = "catalog.json";

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to access '{path}': {details}")]
    Io { path: String, details: String },

    #[error("catalog '{path}' is malformed: {details}")]
    Catalog { path: String, details: String },
}

impl BundleError {
    fn io(path: &Path, err: std::io::Error) -> Self {
        BundleError::Io {
            path: path.display().to_string(),
            details: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub address: Address,
    /// Path relative to the bundle root.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogGroup {
    pub name: String,
    pub entries: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub groups: Vec<CatalogGroup>,
}

impl Catalog {
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    pub fn find(&self, address: &Address) -> Option<&CatalogEntry> {
        self.groups
            .iter()
            .flat_map(|g| g.entries.iter())
            .find(|e| &e.address == address)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleReport {
    /// Entries added per group, in group order.
    pub added: Vec<(AddressGroup, usize)>,
    /// Source folders that were not found.
    pub missing_folders: Vec<String>,
    /// Files skipped because their address was already taken.
    pub duplicates: Vec<String>,
}

impl BundleReport {
    pub fn total(&self) -> usize {
        self.added.iter().map(|(_, n)| n).sum()
    }
}

/// All files below `dir`, sorted for a stable catalog order.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), BundleError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| BundleError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path.extension().is_none_or(|ext| ext != "meta") {
            out.push(path);
        }
    }
    Ok(())
}

/// Copy every group's source files into `out_root` and write the catalog.
pub fn bundle_assets(source_root: &Path, out_root: &Path) -> Result<BundleReport, BundleError> {
    info!(
        "[Bundler] Bundling {} -> {}",
        source_root.display(),
        out_root.display()
    );
    let mut report = BundleReport::default();
    let mut catalog = Catalog::default();

    for group in AddressGroup::ALL {
        let folder = source_root.join(group.source_folder());
        if !folder.is_dir() {
            warn!("[Bundler] Folder does not exist: {}", folder.display());
            report.missing_folders.push(group.source_folder().to_string());
            continue;
        }

        let mut files = Vec::new();
        collect_files(&folder, &mut files)?;

        let group_dir = out_root.join(group.as_str());
        fs::create_dir_all(&group_dir).map_err(|e| BundleError::io(&group_dir, e))?;

        let mut entries: Vec<CatalogEntry> = Vec::new();
        for file in files {
            let (Some(stem), Some(file_name)) = (
                file.file_stem().and_then(|s| s.to_str()),
                file.file_name().and_then(|s| s.to_str()),
            ) else {
                warn!("[Bundler] Skipping non UTF-8 path: {}", file.display());
                continue;
            };
            let address = Address::in_group(group, stem);
            if entries.iter().any(|e| e.address == address) {
                warn!(
                    "[Bundler] {} already bundled, skipping {}",
                    address,
                    file.display()
                );
                report.duplicates.push(file.display().to_string());
                continue;
            }
            let dest = group_dir.join(file_name);
            fs::copy(&file, &dest).map_err(|e| BundleError::io(&file, e))?;
            entries.push(CatalogEntry {
                address,
                path: format!("{}/{}", group.as_str(), file_name),
            });
        }

        info!(
            "[Bundler] {}: added {} entries to group '{}'",
            group.source_folder(),
            entries.len(),
            group
        );
        report.added.push((group, entries.len()));
        catalog.groups.push(CatalogGroup {
            name: group.as_str().to_string(),
            entries,
        });
    }

    write_catalog(out_root, &catalog)?;
    info!("[Bundler] Done, {} entries total", report.total());
    Ok(report)
}

pub fn write_catalog(out_root: &Path, catalog: &Catalog) -> Result<(), BundleError> {
    fs::create_dir_all(out_root).map_err(|e| BundleError::io(out_root, e))?;
    let path = out_root.join(CATALOG_FILE);
    let json = serde_json::to_string_pretty(catalog).map_err(|e| BundleError::Catalog {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    fs::write(&path, json).map_err(|e| BundleError::io(&path, e))
}

pub fn read_catalog(out_root: &Path) -> Result<Catalog, BundleError> {
    let path = out_root.join(CATALOG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| BundleError::io(&path, e))?;
    serde_json::from_str(&text).map_err(|e| BundleError::Catalog {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}

/// Human-readable listing of the catalog groups and their entries.
pub fn format_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Groups: {}", catalog.groups.len());
    for group in &catalog.groups {
        let _ = writeln!(out, "[{}] {} entries", group.name, group.entries.len());
        for entry in &group.entries {
            let _ = writeln!(out, "  {} -> {}", entry.address, entry.path);
        }
    }
    let _ = writeln!(out, "Total entries: {}", catalog.entry_count());
    out
}

/// Remove the group folders and catalog. Returns how many catalog entries
/// were removed (0 when there was no catalog).
pub fn clear_bundles(out_root: &Path) -> Result<usize, BundleError> {
    let removed = match read_catalog(out_root) {
        Ok(catalog) => catalog.entry_count(),
        Err(e) => {
            warn!("[Bundler] No readable catalog: {}", e);
            0
        }
    };
    for group in AddressGroup::ALL {
        let dir = out_root.join(group.as_str());
        if dir.is_dir() {
            fs::remove_dir_all(&dir).map_err(|e| BundleError::io(&dir, e))?;
        }
    }
    let catalog = out_root.join(CATALOG_FILE);
    if catalog.exists() {
        fs::remove_file(&catalog).map_err(|e| BundleError::io(&catalog, e))?;
    }
    info!("[Bundler] Cleared {} entries", removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cardframe-bundle-{}-{}", tag, fastrand::u64(..)));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn format_lists_groups_and_total() {
        let catalog = Catalog {
            groups: vec![CatalogGroup {
                name: "ui".to_string(),
                entries: vec![CatalogEntry {
                    address: Address::new("ui/MainPanel"),
                    path: "ui/MainPanel.json".to_string(),
                }],
            }],
        };
        let text = format_catalog(&catalog);
        assert!(text.contains("[ui] 1 entries"));
        assert!(text.contains("ui/MainPanel -> ui/MainPanel.json"));
        assert!(text.ends_with("Total entries: 1\n"));
    }

    #[test]
    fn meta_files_and_folders_are_skipped() {
        let src = temp_dir("collect");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.png"), b"x").unwrap();
        fs::write(src.join("a.png.meta"), b"x").unwrap();
        fs::write(src.join("nested/b.png"), b"x").unwrap();
        let mut files = Vec::new();
        collect_files(&src, &mut files).unwrap();
        assert_eq!(files, vec![src.join("a.png"), src.join("nested/b.png")]);
        let _ = fs::remove_dir_all(&src);
    }

    #[test]
    fn reading_missing_catalog_fails() {
        let out = temp_dir("nocatalog");
        assert!(matches!(read_catalog(&out), Err(BundleError::Io { .. })));
        assert_eq!(clear_bundles(&out).unwrap(), 0);
        let _ = fs::remove_dir_all(&out);
    }
}
