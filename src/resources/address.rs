//! Asset addresses.
//!
//! Every loadable asset is identified by a flat string of the form
//! `<group>/<name>`, where `<name>` is the file name without extension and
//! `<group>` is one of the fixed [`AddressGroup`] folders produced by the
//! bundling tool.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed asset groups. Each maps to one folder of the build tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressGroup {
    Ui,
    AudioBgm,
    AudioSfx,
    Sprites,
    Prefabs,
    Tables,
}

impl AddressGroup {
    pub const ALL: [AddressGroup; 6] = [
        AddressGroup::Ui,
        AddressGroup::AudioBgm,
        AddressGroup::AudioSfx,
        AddressGroup::Sprites,
        AddressGroup::Prefabs,
        AddressGroup::Tables,
    ];

    /// Folder name in the build tree and address prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            AddressGroup::Ui => "ui",
            AddressGroup::AudioBgm => "audio_bgm",
            AddressGroup::AudioSfx => "audio_sfx",
            AddressGroup::Sprites => "sprites",
            AddressGroup::Prefabs => "prefabs",
            AddressGroup::Tables => "tables",
        }
    }

    /// Source folder scanned by the bundling tool.
    pub fn source_folder(self) -> &'static str {
        match self {
            AddressGroup::Ui => "UI",
            AddressGroup::AudioBgm => "Audio/BGM",
            AddressGroup::AudioSfx => "Audio/SFX",
            AddressGroup::Sprites => "Sprites",
            AddressGroup::Prefabs => "Prefabs",
            AddressGroup::Tables => "Tables",
        }
    }

    /// File extensions tried, in order, when resolving an address on disk.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            AddressGroup::Ui | AddressGroup::Prefabs | AddressGroup::Tables => &["json"],
            AddressGroup::AudioBgm | AddressGroup::AudioSfx => &["ogg", "wav", "mp3"],
            AddressGroup::Sprites => &["png"],
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        AddressGroup::ALL.into_iter().find(|g| g.as_str() == s)
    }
}

impl fmt::Display for AddressGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String key identifying one loadable asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(s: impl Into<String>) -> Self {
        Address(s.into())
    }

    /// Build an address from a group and a file stem.
    pub fn in_group(group: AddressGroup, name: &str) -> Self {
        Address(format!("{}/{}", group.as_str(), name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The group prefix, if it names one of the known groups.
    pub fn group(&self) -> Option<AddressGroup> {
        let (group, _) = self.0.split_once('/')?;
        AddressGroup::parse(group)
    }

    /// The part after the group prefix, or the whole address if there is none.
    pub fn name(&self) -> &str {
        match self.0.split_once('/') {
            Some((_, name)) => name,
            None => &self.0,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Address(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
