//! Layered panel host.
//!
//! The host instantiates panel prefabs loaded through the [`AssetCache`] and
//! keeps at most one live instance per address. Instances are grouped into
//! per-[`UiLayer`] containers that are created on first use; the containers
//! live in a `BTreeMap`, so iterating them yields the draw order (and the
//! reverse yields the hit-test order).
//!
//! Lifecycle of an address:
//!
//! ```text
//! (absent) --show--> Loading --> Shown <--hide/show--> Hidden
//!                                  \__________close__________/--> Closed (removed)
//! ```
//!
//! Animated transitions are explicit [`Fade`] state machines advanced by
//! [`UiHost::tick`]. Starting a new fade replaces the one in flight, and
//! closing a panel drops it.

use crate::components::tween::{Easing, Fade};
use crate::panels::{PanelArgs, PanelBehavior, PanelContext, PanelRegistry, PanelView};
use crate::resources::address::Address;
use crate::resources::assetcache::AssetCache;
use crate::resources::assetloader::AssetKind;
use bevy_ecs::prelude::Resource;
use log::{debug, error, info, warn};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Canvas layers, drawn bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UiLayer {
    Background,
    Normal,
    Top,
    PopUp,
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Loading,
    Shown,
    Hidden,
    Closed,
}

pub type PanelId = u64;

#[derive(Debug, Clone)]
struct PanelFade {
    fade: Fade,
    /// Becomes Hidden once the fade completes.
    hide_on_finish: bool,
}

/// A live panel.
pub struct PanelInstance {
    pub id: PanelId,
    pub layer: UiLayer,
    state: PanelState,
    view: PanelView,
    behavior: Box<dyn PanelBehavior>,
    fade: Option<PanelFade>,
}

impl PanelInstance {
    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Whether the panel should be drawn this frame.
    pub fn is_visible(&self) -> bool {
        self.state == PanelState::Shown || self.fade.is_some()
    }
}

/// Panels of one layer, in insertion order.
#[derive(Debug, Clone)]
pub struct LayerContainer {
    pub layer: UiLayer,
    panels: Vec<Address>,
}

impl LayerContainer {
    pub fn panels(&self) -> &[Address] {
        &self.panels
    }
}

#[derive(Resource)]
pub struct UiHost {
    registry: PanelRegistry,
    panels: FxHashMap<Address, PanelInstance>,
    layers: BTreeMap<UiLayer, LayerContainer>,
    next_id: PanelId,
}

impl Default for UiHost {
    fn default() -> Self {
        UiHost::new(PanelRegistry::with_defaults())
    }
}

impl UiHost {
    pub fn new(registry: PanelRegistry) -> Self {
        info!("[UiHost] Initialized");
        UiHost {
            registry,
            panels: FxHashMap::default(),
            layers: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Show a panel, instantiating it on first use.
    ///
    /// An instance that is already live is re-shown and receives `on_show`
    /// again without reloading its prefab. Returns `None` if the prefab
    /// cannot be loaded.
    pub fn show(
        &mut self,
        cache: &mut AssetCache,
        address: &Address,
        layer: UiLayer,
        args: &PanelArgs,
        ctx: &mut PanelContext,
    ) -> Option<PanelId> {
        if let Some(inst) = self.panels.get_mut(address) {
            inst.state = PanelState::Shown;
            inst.fade = None;
            inst.view.alpha = 1.0;
            inst.view.blocks_input = true;
            inst.behavior.on_show(args, &mut inst.view, ctx);
            debug!("[UiHost] Panel re-shown: {}", address);
            return Some(inst.id);
        }

        let Some(asset) = cache.load(address, AssetKind::Prefab) else {
            error!("[UiHost] Panel prefab not found: {}", address);
            return None;
        };
        let Some(prefab) = asset.as_prefab() else {
            error!("[UiHost] Asset is not a panel prefab: {}", address);
            return None;
        };

        let container = self.layers.entry(layer).or_insert_with(|| {
            debug!("[UiHost] Layer container created: {:?}", layer);
            LayerContainer {
                layer,
                panels: Vec::new(),
            }
        });
        container.panels.push(address.clone());

        let id = self.next_id;
        self.next_id += 1;
        let mut inst = PanelInstance {
            id,
            layer,
            state: PanelState::Loading,
            view: PanelView::new(address.clone(), prefab.clone()),
            behavior: self.registry.create(address),
            fade: None,
        };
        inst.behavior.initialize(&mut inst.view, ctx);
        inst.behavior.on_show(args, &mut inst.view, ctx);
        inst.state = PanelState::Shown;
        self.panels.insert(address.clone(), inst);
        info!("[UiHost] Panel shown: {}", address);
        Some(id)
    }

    /// Show a panel and fade it in over `duration` seconds. Input is blocked
    /// until the fade completes.
    pub fn show_animated(
        &mut self,
        cache: &mut AssetCache,
        address: &Address,
        layer: UiLayer,
        args: &PanelArgs,
        duration: f32,
        ctx: &mut PanelContext,
    ) -> Option<PanelId> {
        let id = self.show(cache, address, layer, args, ctx)?;
        if let Some(inst) = self.panels.get_mut(address) {
            inst.view.alpha = 0.0;
            inst.view.blocks_input = false;
            inst.fade = Some(PanelFade {
                fade: Fade::fade_in(duration).with_easing(Easing::QuadOut),
                hide_on_finish: false,
            });
        }
        Some(id)
    }

    /// Hide a live panel. The instance is kept for a later show. Unknown
    /// addresses are ignored.
    pub fn hide(&mut self, address: &Address, ctx: &mut PanelContext) -> bool {
        let Some(inst) = self.panels.get_mut(address) else {
            return false;
        };
        inst.fade = None;
        inst.view.alpha = 0.0;
        inst.view.blocks_input = false;
        if inst.state != PanelState::Hidden {
            inst.state = PanelState::Hidden;
            inst.behavior.on_hide(&mut inst.view, ctx);
            info!("[UiHost] Panel hidden: {}", address);
        }
        true
    }

    /// Fade a shown panel out over `duration` seconds, then hide it.
    pub fn hide_animated(&mut self, address: &Address, duration: f32) -> bool {
        let Some(inst) = self.panels.get_mut(address) else {
            return false;
        };
        if inst.state != PanelState::Shown {
            return false;
        }
        inst.view.blocks_input = false;
        inst.fade = Some(PanelFade {
            fade: Fade::new(inst.view.alpha, 0.0, duration).with_easing(Easing::QuadIn),
            hide_on_finish: true,
        });
        true
    }

    /// Close a panel: drop the instance and unload its prefab.
    pub fn close(&mut self, cache: &mut AssetCache, address: &Address, ctx: &mut PanelContext) -> bool {
        let Some(mut inst) = self.panels.remove(address) else {
            return false;
        };
        inst.fade = None;
        inst.behavior.on_close(ctx);
        inst.state = PanelState::Closed;
        if let Some(container) = self.layers.get_mut(&inst.layer) {
            container.panels.retain(|a| a != address);
        }
        cache.unload(address);
        info!("[UiHost] Panel closed: {}", address);
        true
    }

    /// Close every live panel, topmost layer first.
    pub fn close_all(&mut self, cache: &mut AssetCache, ctx: &mut PanelContext) -> usize {
        let addresses: Vec<Address> = self
            .layers
            .values()
            .rev()
            .flat_map(|c| c.panels.iter().rev().cloned())
            .collect();
        addresses
            .iter()
            .filter(|a| self.close(cache, a, ctx))
            .count()
    }

    /// Route a button press to the panel's behaviour. Ignored unless the
    /// panel is shown and the button exists in its prefab.
    pub fn press_button(&mut self, address: &Address, button: &str, ctx: &mut PanelContext) -> bool {
        let Some(inst) = self.panels.get_mut(address) else {
            warn!("[UiHost] Button '{}' pressed on inactive panel {}", button, address);
            return false;
        };
        if inst.state != PanelState::Shown {
            debug!("[UiHost] Ignoring '{}' on {:?} panel {}", button, inst.state, address);
            return false;
        }
        if inst.view.prefab().button(button).is_none() {
            warn!("[UiHost] Panel {} has no button '{}'", address, button);
            return false;
        }
        inst.behavior.on_button(button, &mut inst.view, ctx);
        true
    }

    /// Advance fades and update shown panels, bottom layer first.
    pub fn tick(&mut self, dt: f32, ctx: &mut PanelContext) {
        for address in self.draw_order_addresses() {
            let Some(inst) = self.panels.get_mut(&address) else {
                continue;
            };
            if let Some(pf) = inst.fade.as_mut() {
                inst.view.alpha = pf.fade.advance(dt);
                if pf.fade.finished() {
                    let hide = pf.hide_on_finish;
                    inst.fade = None;
                    if hide {
                        inst.state = PanelState::Hidden;
                        inst.behavior.on_hide(&mut inst.view, ctx);
                        info!("[UiHost] Panel hidden: {}", address);
                    } else {
                        inst.view.blocks_input = true;
                    }
                }
            }
            if inst.state == PanelState::Shown {
                inst.behavior.update(dt, &mut inst.view, ctx);
            }
        }
    }

    /// Topmost shown panel button under the point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<(Address, String)> {
        for container in self.layers.values().rev() {
            for address in container.panels.iter().rev() {
                let Some(inst) = self.panels.get(address) else {
                    continue;
                };
                if inst.state != PanelState::Shown || !inst.view.blocks_input {
                    continue;
                }
                if let Some(button) = inst.view.prefab().button_at(x, y) {
                    return Some((address.clone(), button.id.clone()));
                }
            }
        }
        None
    }

    fn draw_order_addresses(&self) -> Vec<Address> {
        self.layers
            .values()
            .flat_map(|c| c.panels.iter().cloned())
            .collect()
    }

    /// Live panels, bottom layer first.
    pub fn draw_order(&self) -> impl Iterator<Item = &PanelInstance> {
        self.layers
            .values()
            .flat_map(|c| c.panels.iter())
            .filter_map(|a| self.panels.get(a))
    }

    pub fn get(&self, address: &Address) -> Option<&PanelInstance> {
        self.panels.get(address)
    }

    /// `None` means the address has no live instance.
    pub fn state(&self, address: &Address) -> Option<PanelState> {
        self.panels.get(address).map(|p| p.state)
    }

    pub fn is_active(&self, address: &Address) -> bool {
        self.panels.contains_key(address)
    }

    pub fn active_count(&self) -> usize {
        self.panels.len()
    }

    pub fn layer_of(&self, address: &Address) -> Option<UiLayer> {
        self.panels.get(address).map(|p| p.layer)
    }

    pub fn layer(&self, layer: UiLayer) -> Option<&LayerContainer> {
        self.layers.get(&layer)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::gamecommand::GameCommand;
    use crate::panels::{Initializable, PanelBehavior, Showable, testing};
    use crate::resources::assetloader::{Asset, AssetError, AssetLoader};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Prefabs {
        loads: AtomicUsize,
    }

    impl AssetLoader for Prefabs {
        fn load(&self, address: &Address, _kind: AssetKind) -> Result<Asset, AssetError> {
            if address.name() == "Missing" {
                return Err(AssetError::NotFound(address.clone()));
            }
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Asset::Prefab(testing::prefab(&["title"], &["ok"])))
        }
    }

    /// Records every callback as a command so tests can observe them.
    #[derive(Default)]
    struct Probe;

    impl Initializable for Probe {
        fn initialize(&mut self, view: &mut PanelView, _ctx: &PanelContext) {
            view.set_text("title", "init");
        }
    }

    impl Showable for Probe {
        fn on_show(&mut self, _args: &PanelArgs, _view: &mut PanelView, ctx: &mut PanelContext) {
            ctx.emit(GameCommand::SaveGame);
        }
        fn on_hide(&mut self, _view: &mut PanelView, ctx: &mut PanelContext) {
            ctx.emit(GameCommand::StopMusic);
        }
        fn on_close(&mut self, ctx: &mut PanelContext) {
            ctx.emit(GameCommand::CloseAllPanels);
        }
    }

    impl PanelBehavior for Probe {
        fn on_button(&mut self, _id: &str, _view: &mut PanelView, ctx: &mut PanelContext) {
            ctx.emit(GameCommand::Quit);
        }
    }

    fn setup() -> (UiHost, AssetCache, Arc<Prefabs>) {
        let loader = Arc::new(Prefabs {
            loads: AtomicUsize::new(0),
        });
        let mut registry = PanelRegistry::empty();
        registry.register("ui/Probe", || Box::new(Probe));
        (UiHost::new(registry), AssetCache::new(loader.clone()), loader)
    }

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    #[test]
    fn show_twice_reuses_instance() {
        let (mut ui, mut cache, loader) = setup();
        let mut ctx = PanelContext::new(None);
        let a = ui.show(&mut cache, &addr("ui/Probe"), UiLayer::Normal, &PanelArgs::None, &mut ctx);
        let b = ui.show(&mut cache, &addr("ui/Probe"), UiLayer::Normal, &PanelArgs::None, &mut ctx);
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(ui.active_count(), 1);
        assert_eq!(ctx.commands().len(), 2);
        assert_eq!(
            ui.get(&addr("ui/Probe")).and_then(|p| p.view().text("title")),
            Some("init")
        );
    }

    #[test]
    fn missing_prefab_shows_nothing() {
        let (mut ui, mut cache, _) = setup();
        let mut ctx = PanelContext::new(None);
        assert_eq!(
            ui.show(&mut cache, &addr("ui/Missing"), UiLayer::Normal, &PanelArgs::None, &mut ctx),
            None
        );
        assert!(!ui.is_active(&addr("ui/Missing")));
        assert_eq!(ui.layer_count(), 0);
    }

    #[test]
    fn hide_keeps_instance_and_blocks_input() {
        let (mut ui, mut cache, _) = setup();
        let mut ctx = PanelContext::new(None);
        let probe = addr("ui/Probe");
        ui.show(&mut cache, &probe, UiLayer::Normal, &PanelArgs::None, &mut ctx);
        assert!(ui.hide(&probe, &mut ctx));
        assert_eq!(ui.state(&probe), Some(PanelState::Hidden));
        assert!(ui.is_active(&probe));
        assert!(!ui.press_button(&probe, "ok", &mut ctx));
        assert!(!ui.hide(&addr("ui/Unknown"), &mut ctx));
        assert_eq!(ui.hit_test(10.0, 10.0), None);
    }

    #[test]
    fn close_unloads_prefab_and_removes_from_layer() {
        let (mut ui, mut cache, loader) = setup();
        let mut ctx = PanelContext::new(None);
        let probe = addr("ui/Probe");
        ui.show(&mut cache, &probe, UiLayer::PopUp, &PanelArgs::None, &mut ctx);
        assert!(cache.contains(&probe));
        assert!(ui.close(&mut cache, &probe, &mut ctx));
        assert!(!ui.is_active(&probe));
        assert_eq!(ui.state(&probe), None);
        assert!(!cache.contains(&probe));
        assert!(ui.layer(UiLayer::PopUp).is_some_and(|c| c.panels().is_empty()));
        assert!(!ui.close(&mut cache, &probe, &mut ctx));

        ui.show(&mut cache, &probe, UiLayer::PopUp, &PanelArgs::None, &mut ctx);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn layers_order_hit_testing() {
        let (mut ui, mut cache, _) = setup();
        let mut ctx = PanelContext::new(None);
        ui.show(&mut cache, &addr("ui/Probe"), UiLayer::Normal, &PanelArgs::None, &mut ctx);
        ui.show(&mut cache, &addr("ui/Other"), UiLayer::Alert, &PanelArgs::None, &mut ctx);
        ui.show(&mut cache, &addr("ui/Back"), UiLayer::Background, &PanelArgs::None, &mut ctx);
        let order: Vec<_> = ui.draw_order().map(|p| p.layer).collect();
        assert_eq!(order, vec![UiLayer::Background, UiLayer::Normal, UiLayer::Alert]);
        assert_eq!(
            ui.hit_test(10.0, 10.0),
            Some((addr("ui/Other"), "ok".to_string()))
        );
        assert_eq!(ui.layer_of(&addr("ui/Back")), Some(UiLayer::Background));
    }

    #[test]
    fn press_button_dispatches_only_known_buttons() {
        let (mut ui, mut cache, _) = setup();
        let probe = addr("ui/Probe");
        let mut ctx = PanelContext::new(None);
        ui.show(&mut cache, &probe, UiLayer::Normal, &PanelArgs::None, &mut ctx);
        let mut ctx = PanelContext::new(None);
        assert!(!ui.press_button(&probe, "nope", &mut ctx));
        assert!(ui.press_button(&probe, "ok", &mut ctx));
        assert_eq!(ctx.into_commands(), vec![GameCommand::Quit]);
    }

    #[test]
    fn animated_show_then_hide() {
        let (mut ui, mut cache, _) = setup();
        let probe = addr("ui/Probe");
        let mut ctx = PanelContext::new(None);
        ui.show_animated(&mut cache, &probe, UiLayer::Normal, &PanelArgs::None, 0.4, &mut ctx);
        let view_alpha = |ui: &UiHost| ui.get(&probe).map(|p| p.view().alpha);
        assert_eq!(view_alpha(&ui), Some(0.0));
        assert_eq!(ui.hit_test(10.0, 10.0), None);

        // Eased out: three quarters opaque at the halfway mark.
        ui.tick(0.2, &mut ctx);
        assert!((view_alpha(&ui).unwrap_or(0.0) - 0.75).abs() < 1e-6);
        ui.tick(0.2, &mut ctx);
        assert_eq!(view_alpha(&ui), Some(1.0));
        assert!(ui.hit_test(10.0, 10.0).is_some());

        assert!(ui.hide_animated(&probe, 0.5));
        ui.tick(0.25, &mut ctx);
        assert!((view_alpha(&ui).unwrap_or(0.0) - 0.75).abs() < 1e-6);
        assert_eq!(ui.state(&probe), Some(PanelState::Shown));
        ui.tick(0.25, &mut ctx);
        assert_eq!(ui.state(&probe), Some(PanelState::Hidden));
    }

    #[test]
    fn new_fade_replaces_in_flight_fade() {
        let (mut ui, mut cache, _) = setup();
        let probe = addr("ui/Probe");
        let mut ctx = PanelContext::new(None);
        ui.show_animated(&mut cache, &probe, UiLayer::Normal, &PanelArgs::None, 1.0, &mut ctx);
        ui.tick(0.5, &mut ctx);
        assert!(ui.hide_animated(&probe, 1.0));
        ui.tick(1.0, &mut ctx);
        assert_eq!(ui.state(&probe), Some(PanelState::Hidden));

        // Closing mid-fade drops the fade with the instance.
        ui.show_animated(&mut cache, &probe, UiLayer::Normal, &PanelArgs::None, 1.0, &mut ctx);
        assert!(ui.close(&mut cache, &probe, &mut ctx));
        ui.tick(1.0, &mut ctx);
        assert!(!ui.is_active(&probe));
    }

    #[test]
    fn close_all_empties_the_host() {
        let (mut ui, mut cache, _) = setup();
        let mut ctx = PanelContext::new(None);
        ui.show(&mut cache, &addr("ui/Probe"), UiLayer::Normal, &PanelArgs::None, &mut ctx);
        ui.show(&mut cache, &addr("ui/Other"), UiLayer::Top, &PanelArgs::None, &mut ctx);
        assert_eq!(ui.close_all(&mut cache, &mut ctx), 2);
        assert_eq!(ui.active_count(), 0);
        assert!(cache.is_empty());
    }
}
