//! Panel prefab layout.
//!
//! A prefab is a JSON document describing the static layout of one UI panel:
//! background rectangle, text labels, and clickable buttons. Coordinates are
//! in screen pixels relative to the canvas origin.
//!
//! ```json
//! {
//!   "title": "Main",
//!   "rect": [0, 0, 1280, 720],
//!   "background": [20, 24, 40, 255],
//!   "labels": [ { "id": "title", "text": "Cards!", "x": 540, "y": 120, "size": 48 } ],
//!   "buttons": [ { "id": "start", "label": "Start", "rect": [540, 320, 200, 60] } ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Axis-aligned rectangle `[x, y, w, h]`.
pub type Rect = [f32; 4];

pub fn rect_contains(rect: &Rect, x: f32, y: f32) -> bool {
    x >= rect[0] && y >= rect[1] && x < rect[0] + rect[2] && y < rect[1] + rect[3]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabLabel {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_label_size")]
    pub size: f32,
    /// Optional fade group; behaviours can drive the alpha of a whole group.
    #[serde(default)]
    pub group: Option<String>,
}

fn default_label_size() -> f32 {
    24.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabButton {
    pub id: String,
    pub label: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelPrefab {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_rect")]
    pub rect: Rect,
    #[serde(default = "default_background")]
    pub background: [u8; 4],
    #[serde(default)]
    pub labels: SmallVec<[PrefabLabel; 4]>,
    #[serde(default)]
    pub buttons: SmallVec<[PrefabButton; 4]>,
}

fn default_rect() -> Rect {
    [0.0, 0.0, 1280.0, 720.0]
}

fn default_background() -> [u8; 4] {
    [0, 0, 0, 200]
}

impl PanelPrefab {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn button(&self, id: &str) -> Option<&PrefabButton> {
        self.buttons.iter().find(|b| b.id == id)
    }

    pub fn label(&self, id: &str) -> Option<&PrefabLabel> {
        self.labels.iter().find(|l| l.id == id)
    }

    /// Topmost button containing the point. Later buttons draw over earlier ones.
    pub fn button_at(&self, x: f32, y: f32) -> Option<&PrefabButton> {
        self.buttons.iter().rev().find(|b| rect_contains(&b.rect, x, y))
    }
}

impl Default for PanelPrefab {
    fn default() -> Self {
        PanelPrefab {
            title: String::new(),
            rect: default_rect(),
            background: default_background(),
            labels: SmallVec::new(),
            buttons: SmallVec::new(),
        }
    }
}
