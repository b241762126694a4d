//! Panel behaviours hosted by the [`UiHost`](crate::resources::uihost::UiHost).
//!
//! A panel is a prefab (labels, buttons, a background rect) plus a behaviour
//! object. Behaviours are split into capability traits:
//! - [`Initializable`] runs once, right after the prefab is instantiated.
//! - [`Showable`] receives show/hide/close notifications.
//! - [`PanelBehavior`] adds button handling and a per-frame update.
//!
//! Behaviours never touch the managers. They read the player record through
//! the [`PanelContext`] and emit [`GameCommand`]s into it; the host hands the
//! collected commands back to the caller, which applies them in order.
//!
//! Submodules:
//! - [`main`] – title screen
//! - [`cardbuild`] – deck screen leading into a battle
//! - [`battle`] – timed battle stand-in
//! - [`victory`] – reward screen

pub mod battle;
pub mod cardbuild;
pub mod main;
pub mod victory;

use crate::events::gamecommand::GameCommand;
use crate::resources::address::Address;
use crate::resources::datastore::PlayerRecord;
use crate::resources::prefab::{PanelPrefab, PrefabLabel};
use log::debug;
use rustc_hash::FxHashMap;

pub const MAIN_PANEL: &str = "ui/MainPanel";
pub const CARD_BUILD_PANEL: &str = "ui/CardBuildPanel";
pub const BATTLE_PANEL: &str = "ui/BattlePanel";
pub const VICTORY_PANEL: &str = "ui/VictoryPanel";

/// Arguments passed along with a show request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PanelArgs {
    #[default]
    None,
    Level(u32),
}

impl PanelArgs {
    pub fn level(&self) -> Option<u32> {
        match self {
            PanelArgs::Level(level) => Some(*level),
            PanelArgs::None => None,
        }
    }
}

/// What a behaviour may see and do while handling a callback.
#[derive(Debug, Default)]
pub struct PanelContext<'a> {
    player: Option<&'a PlayerRecord>,
    commands: Vec<GameCommand>,
}

impl<'a> PanelContext<'a> {
    pub fn new(player: Option<&'a PlayerRecord>) -> Self {
        PanelContext {
            player,
            commands: Vec::new(),
        }
    }

    pub fn player(&self) -> Option<&PlayerRecord> {
        self.player
    }

    pub fn emit(&mut self, command: GameCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[GameCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<GameCommand> {
        self.commands
    }
}

/// Instantiated prefab state: text overrides and alpha values.
#[derive(Debug, Clone)]
pub struct PanelView {
    address: Address,
    prefab: PanelPrefab,
    texts: FxHashMap<String, String>,
    group_alpha: FxHashMap<String, f32>,
    /// Panel-wide alpha, multiplied into every label.
    pub alpha: f32,
    /// Whether the panel currently receives button presses.
    pub blocks_input: bool,
}

impl PanelView {
    pub fn new(address: Address, prefab: PanelPrefab) -> Self {
        PanelView {
            address,
            prefab,
            texts: FxHashMap::default(),
            group_alpha: FxHashMap::default(),
            alpha: 1.0,
            blocks_input: true,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn prefab(&self) -> &PanelPrefab {
        &self.prefab
    }

    /// Current text of a label: the override if one was set, otherwise the
    /// prefab text.
    pub fn text(&self, label: &str) -> Option<&str> {
        if let Some(text) = self.texts.get(label) {
            return Some(text);
        }
        self.prefab.label(label).map(|l| l.text.as_str())
    }

    /// Override a label's text. Labels missing from the prefab are ignored.
    pub fn set_text(&mut self, label: &str, text: impl Into<String>) {
        if self.prefab.label(label).is_none() {
            debug!("[PanelView] {} has no label '{}'", self.address, label);
            return;
        }
        self.texts.insert(label.to_string(), text.into());
    }

    pub fn group_alpha(&self, group: &str) -> f32 {
        self.group_alpha.get(group).copied().unwrap_or(1.0)
    }

    pub fn set_group_alpha(&mut self, group: &str, alpha: f32) {
        self.group_alpha
            .insert(group.to_string(), alpha.clamp(0.0, 1.0));
    }

    /// Effective alpha of a label.
    pub fn label_alpha(&self, label: &PrefabLabel) -> f32 {
        let group = label
            .group
            .as_deref()
            .map(|g| self.group_alpha(g))
            .unwrap_or(1.0);
        self.alpha * group
    }
}

pub trait Initializable {
    fn initialize(&mut self, _view: &mut PanelView, _ctx: &PanelContext) {}
}

pub trait Showable {
    fn on_show(&mut self, _args: &PanelArgs, _view: &mut PanelView, _ctx: &mut PanelContext) {}
    fn on_hide(&mut self, _view: &mut PanelView, _ctx: &mut PanelContext) {}
    fn on_close(&mut self, _ctx: &mut PanelContext) {}
}

pub trait PanelBehavior: Initializable + Showable + Send + Sync {
    fn on_button(&mut self, _id: &str, _view: &mut PanelView, _ctx: &mut PanelContext) {}
    fn update(&mut self, _dt: f32, _view: &mut PanelView, _ctx: &mut PanelContext) {}
}

/// Behaviour for panels with no registered type. It only displays its prefab.
#[derive(Debug, Default)]
pub struct PlainPanel;

impl Initializable for PlainPanel {}
impl Showable for PlainPanel {}
impl PanelBehavior for PlainPanel {}

pub type PanelFactory = fn() -> Box<dyn PanelBehavior>;

/// Maps panel addresses to behaviour factories.
pub struct PanelRegistry {
    factories: FxHashMap<Address, PanelFactory>,
}

impl PanelRegistry {
    pub fn empty() -> Self {
        PanelRegistry {
            factories: FxHashMap::default(),
        }
    }

    /// Registry with the four game panels.
    pub fn with_defaults() -> Self {
        let mut registry = PanelRegistry::empty();
        registry.register(MAIN_PANEL, || Box::new(main::MainPanel));
        registry.register(CARD_BUILD_PANEL, || Box::new(cardbuild::CardBuildPanel::default()));
        registry.register(BATTLE_PANEL, || Box::new(battle::BattlePanel::default()));
        registry.register(VICTORY_PANEL, || Box::new(victory::VictoryPanel::default()));
        registry
    }

    pub fn register(&mut self, address: impl Into<Address>, factory: PanelFactory) {
        self.factories.insert(address.into(), factory);
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.factories.contains_key(address)
    }

    pub fn create(&self, address: &Address) -> Box<dyn PanelBehavior> {
        match self.factories.get(address) {
            Some(factory) => factory(),
            None => Box::new(PlainPanel),
        }
    }
}

impl Default for PanelRegistry {
    fn default() -> Self {
        PanelRegistry::with_defaults()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::resources::prefab::{PrefabButton, PrefabLabel};

    /// Prefab with the given labels and one button per id.
    pub fn prefab(labels: &[&str], buttons: &[&str]) -> PanelPrefab {
        PanelPrefab {
            labels: labels
                .iter()
                .map(|id| PrefabLabel {
                    id: id.to_string(),
                    text: String::new(),
                    x: 0.0,
                    y: 0.0,
                    size: 24.0,
                    group: if *id == "reward" {
                        Some("reward".to_string())
                    } else {
                        None
                    },
                })
                .collect(),
            buttons: buttons
                .iter()
                .enumerate()
                .map(|(i, id)| PrefabButton {
                    id: id.to_string(),
                    label: id.to_string(),
                    rect: [0.0, 60.0 * i as f32, 200.0, 50.0],
                })
                .collect(),
            ..PanelPrefab::default()
        }
    }

    pub fn view(address: &str, labels: &[&str], buttons: &[&str]) -> PanelView {
        PanelView::new(address.into(), prefab(labels, buttons))
    }
}
