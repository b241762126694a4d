//! Asset payloads and the loader seam.
//!
//! [`AssetLoader`] is the platform boundary of the resource cache: it turns an
//! [`Address`] into an [`Asset`] and releases whatever backing storage it
//! holds when the cache lets go of an entry. [`FsAssetLoader`] reads the build
//! tree written by the bundling tool; tests plug in in-memory loaders.

use crate::resources::address::{Address, AddressGroup};
use crate::resources::prefab::PanelPrefab;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Requested asset type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Texture,
    Audio,
    Prefab,
    Text,
}

/// Audio clips are opened by the audio device itself; the cache only
/// resolves where they live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub address: Address,
    pub path: PathBuf,
}

/// A loaded asset.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Texture { path: PathBuf, bytes: Vec<u8> },
    Audio(AudioClip),
    Prefab(PanelPrefab),
    Text(String),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Texture { .. } => AssetKind::Texture,
            Asset::Audio(_) => AssetKind::Audio,
            Asset::Prefab(_) => AssetKind::Prefab,
            Asset::Text(_) => AssetKind::Text,
        }
    }

    pub fn as_prefab(&self) -> Option<&PanelPrefab> {
        match self {
            Asset::Prefab(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioClip> {
        match self {
            Asset::Audio(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Asset::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Errors that can occur when loading an asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(Address),

    #[error("failed to read '{path}': {details}")]
    Read { path: String, details: String },

    #[error("failed to parse '{address}': {details}")]
    Parse { address: Address, details: String },

    #[error("asset '{address}' cannot be loaded as {kind:?}")]
    WrongKind { address: Address, kind: AssetKind },
}

/// Platform asset loader.
///
/// Implementations must be shareable across threads: asynchronous loads run
/// the loader on a worker thread.
pub trait AssetLoader: Send + Sync {
    fn load(&self, address: &Address, kind: AssetKind) -> Result<Asset, AssetError>;

    /// Drop any backing storage for `address`. Called once per evicted entry.
    fn release(&self, _address: &Address) {}
}

/// Loads assets from `<root>/<group>/<name>.<ext>`.
#[derive(Debug, Clone)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsAssetLoader { root: root.into() }
    }

    /// Resolve an address to an existing file, trying each extension of its group.
    /// Names that could step outside the group folder never resolve.
    pub fn resolve(&self, address: &Address) -> Option<PathBuf> {
        let group = address.group()?;
        let name = address.name();
        if name.is_empty() || name.contains("..") || name.contains(['/', '\\']) {
            warn!("[FsAssetLoader] Rejected address outside the asset root: {}", address);
            return None;
        }
        let dir = self.root.join(group.as_str());
        group
            .extensions()
            .iter()
            .map(|ext| dir.join(format!("{}.{}", name, ext)))
            .find(|p| p.is_file())
    }

    fn read_text(&self, address: &Address, path: &Path) -> Result<String, AssetError> {
        std::fs::read_to_string(path).map_err(|e| AssetError::Read {
            path: path.display().to_string(),
            details: e.to_string(),
        })
        .map(|text| {
            debug!("[FsAssetLoader] read text '{}' ({} bytes)", address, text.len());
            text
        })
    }
}

impl AssetLoader for FsAssetLoader {
    fn load(&self, address: &Address, kind: AssetKind) -> Result<Asset, AssetError> {
        let path = self
            .resolve(address)
            .ok_or_else(|| AssetError::NotFound(address.clone()))?;
        let group = address.group();
        match kind {
            AssetKind::Text => self.read_text(address, &path).map(Asset::Text),
            AssetKind::Prefab => {
                if !matches!(group, Some(AddressGroup::Ui) | Some(AddressGroup::Prefabs)) {
                    return Err(AssetError::WrongKind {
                        address: address.clone(),
                        kind,
                    });
                }
                let text = self.read_text(address, &path)?;
                PanelPrefab::from_json(&text)
                    .map(Asset::Prefab)
                    .map_err(|e| AssetError::Parse {
                        address: address.clone(),
                        details: e.to_string(),
                    })
            }
            AssetKind::Audio => {
                if !matches!(
                    group,
                    Some(AddressGroup::AudioBgm) | Some(AddressGroup::AudioSfx)
                ) {
                    return Err(AssetError::WrongKind {
                        address: address.clone(),
                        kind,
                    });
                }
                Ok(Asset::Audio(AudioClip {
                    address: address.clone(),
                    path,
                }))
            }
            AssetKind::Texture => {
                let bytes = std::fs::read(&path).map_err(|e| AssetError::Read {
                    path: path.display().to_string(),
                    details: e.to_string(),
                })?;
                Ok(Asset::Texture { path, bytes })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_root() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cardframe-loader-{}", fastrand::u64(..)));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_prefab_and_text() {
        let root = temp_root();
        fs::create_dir_all(root.join("ui")).unwrap();
        fs::create_dir_all(root.join("tables")).unwrap();
        fs::write(root.join("ui/MainPanel.json"), r#"{ "title": "Main" }"#).unwrap();
        fs::write(root.join("tables/Units.json"), "[]").unwrap();

        let loader = FsAssetLoader::new(&root);
        let prefab = loader.load(&"ui/MainPanel".into(), AssetKind::Prefab).unwrap();
        assert_eq!(prefab.as_prefab().unwrap().title, "Main");
        let text = loader.load(&"tables/Units".into(), AssetKind::Text).unwrap();
        assert_eq!(text.as_text(), Some("[]"));

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn audio_tries_each_extension() {
        let root = temp_root();
        fs::create_dir_all(root.join("audio_sfx")).unwrap();
        fs::write(root.join("audio_sfx/click.wav"), b"RIFF").unwrap();

        let loader = FsAssetLoader::new(&root);
        let clip = loader.load(&"audio_sfx/click".into(), AssetKind::Audio).unwrap();
        assert!(clip.as_audio().unwrap().path.ends_with("click.wav"));

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn missing_and_malformed_assets_are_errors() {
        let root = temp_root();
        fs::create_dir_all(root.join("ui")).unwrap();
        fs::write(root.join("ui/Broken.json"), "{ not json").unwrap();

        let loader = FsAssetLoader::new(&root);
        assert!(matches!(
            loader.load(&"ui/Nope".into(), AssetKind::Prefab),
            Err(AssetError::NotFound(_))
        ));
        assert!(matches!(
            loader.load(&"ui/Broken".into(), AssetKind::Prefab),
            Err(AssetError::Parse { .. })
        ));

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn names_escaping_the_root_do_not_resolve() {
        let root = temp_root();
        let inner = root.join("assets");
        fs::create_dir_all(inner.join("tables")).unwrap();
        fs::write(root.join("secret.json"), "[]").unwrap();
        fs::write(inner.join("tables/Units.json"), "[]").unwrap();

        let loader = FsAssetLoader::new(&inner);
        assert!(loader.resolve(&"tables/Units".into()).is_some());
        assert!(loader.resolve(&"tables/../../secret".into()).is_none());
        assert!(loader.resolve(&"tables/..".into()).is_none());
        assert!(loader.resolve(&"tables/sub/Units".into()).is_none());
        assert!(loader.resolve(&"tables/".into()).is_none());
        assert!(matches!(
            loader.load(&"tables/../../secret".into(), AssetKind::Text),
            Err(AssetError::NotFound(_))
        ));

        fs::remove_dir_all(root).ok();
    }
}
