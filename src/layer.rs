use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a layer.
///
/// Ids are handed out monotonically by [`LayerStack`] and are never reused,
/// so an op's layer reference stays unambiguous across deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier for the layer
    pub id: LayerId,
    /// Display name of the layer
    pub name: String,
    /// Whether the layer is currently visible
    pub visible: bool,
    /// Compositing opacity in [0, 1], multiplied into every op on the layer
    pub opacity: f32,
}

impl Layer {
    fn new(id: LayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            visible: true,
            opacity: 1.0,
        }
    }
}

/// The ordered set of layers in a document.
///
/// List order is z-order: the first layer composites at the bottom. Exactly
/// one layer is active at any time and new ops always target it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<Layer>,
    active: LayerId,
    next_id: u64,
}

impl LayerStack {
    /// Creates a stack holding the single default layer, which is active.
    pub fn new() -> Self {
        let first = Layer::new(LayerId(0), "Layer 1");
        Self {
            active: first.id,
            layers: vec![first],
            next_id: 1,
        }
    }

    /// Layers in z-order, bottom first.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// The layer new ops are appended to. Always refers to an existing layer.
    pub fn active(&self) -> LayerId {
        self.active
    }

    /// Makes `id` the active layer. Ignored if no such layer exists.
    pub fn set_active(&mut self, id: LayerId) {
        if self.get(id).is_some() {
            self.active = id;
        }
    }

    /// Adds a new layer on top of the stack, makes it active and returns its
    /// id.
    pub fn add(&mut self, name: &str) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push(Layer::new(id, name));
        self.active = id;
        id
    }

    /// Removes a layer. Refused (returns `false`) when it is the only layer
    /// left or the id is unknown. The caller is responsible for dropping the
    /// ops that referenced it, see [`crate::Document::remove_layer_ops`].
    pub fn remove(&mut self, id: LayerId) -> bool {
        if self.layers.len() <= 1 {
            return false;
        }
        let Some(index) = self.layers.iter().position(|l| l.id == id) else {
            return false;
        };
        self.layers.remove(index);
        // Keep the active id pointing at an existing layer.
        if self.active == id {
            let fallback = index.min(self.layers.len() - 1);
            self.active = self.layers[fallback].id;
        }
        true
    }

    /// Registers an id seen in a loaded document if it is not already
    /// present, so ops never dangle. The layer appears on top with a generic
    /// name.
    pub fn ensure(&mut self, id: LayerId) {
        if self.get(id).is_none() {
            self.layers.push(Layer::new(id, &format!("Layer {}", id.0 + 1)));
            self.next_id = self.next_id.max(id.0 + 1);
        }
    }

    pub fn set_name(&mut self, id: LayerId, name: &str) {
        if let Some(layer) = self.get_mut(id) {
            layer.name = name.to_string();
        }
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(layer) = self.get_mut(id) {
            layer.visible = visible;
        }
    }

    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) {
        if let Some(layer) = self.get_mut(id) {
            layer.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Moves a layer one step up (`+1`) or down (`-1`) in z-order.
    pub fn shift(&mut self, id: LayerId, delta: i32) {
        let Some(index) = self.layers.iter().position(|l| l.id == id) else {
            return;
        };
        let target = index as i32 + delta;
        if target >= 0 && (target as usize) < self.layers.len() {
            self.layers.swap(index, target as usize);
        }
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}
