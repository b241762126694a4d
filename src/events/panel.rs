use crate::resources::address::Address;
use bevy_ecs::message::Message;

/// A button press on a panel, produced by the renderer's hit test or by the
/// headless autopilot.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct PanelInput {
    pub address: Address,
    pub button: String,
}

impl PanelInput {
    pub fn new(address: impl Into<Address>, button: impl Into<String>) -> Self {
        PanelInput {
            address: address.into(),
            button: button.into(),
        }
    }
}
