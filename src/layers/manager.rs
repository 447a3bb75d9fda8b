use crate::{
    core::{adapter::LayerOrder, constants::FIRST_LAYER_ORDER},
    layers::base::LayerHandle,
    prelude::HashMap,
};

/// Bookkeeping of the layers registered on a map.
///
/// Holds the id index, the base-layer list, the selected-layer list and the
/// counter for auto-assigned orders. Every list only ever names ids present
/// in the index.
pub struct LayerRegistry {
    /// All layers indexed by ID
    layers: HashMap<String, LayerHandle>,
    /// Ids of base layers, in insertion order
    base_layers: Vec<String>,
    /// Ids of layers with a selection, in selection order
    selected_layers: Vec<String>,
    next_order: i32,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self {
            layers: HashMap::default(),
            base_layers: Vec::new(),
            selected_layers: Vec::new(),
            next_order: FIRST_LAYER_ORDER,
        }
    }
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the next auto-assigned order. Ids derive from it too.
    pub fn next_order(&mut self) -> i32 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    /// Registers a layer, replacing any previous one with the same id
    pub fn insert(&mut self, layer: LayerHandle) -> Option<LayerHandle> {
        self.layers.insert(layer.id().to_string(), layer)
    }

    pub fn get(&self, id: &str) -> Option<LayerHandle> {
        self.layers.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    /// Removes a layer and purges it from the base and selected lists
    pub fn remove(&mut self, id: &str) -> Option<LayerHandle> {
        self.base_layers.retain(|l| l != id);
        self.selected_layers.retain(|l| l != id);
        self.layers.remove(id)
    }

    /// Removes the layer only if the registered entry is this exact handle
    pub fn remove_entry(&mut self, layer: &LayerHandle) -> bool {
        match self.layers.get(layer.id()) {
            Some(current) if std::sync::Arc::ptr_eq(current, layer) => {
                self.remove(layer.id());
                true
            }
            _ => false,
        }
    }

    pub fn push_base(&mut self, id: &str) {
        if self.layers.contains_key(id) && !self.is_base(id) {
            self.base_layers.push(id.to_string());
        }
    }

    pub fn is_base(&self, id: &str) -> bool {
        self.base_layers.iter().any(|l| l == id)
    }

    pub fn base_layers(&self) -> &[String] {
        &self.base_layers
    }

    pub fn select(&mut self, id: &str) {
        if self.layers.contains_key(id) && !self.selected_layers.iter().any(|l| l == id) {
            self.selected_layers.push(id.to_string());
        }
    }

    pub fn unselect(&mut self, id: &str) {
        self.selected_layers.retain(|l| l != id);
    }

    pub fn selected_layers(&self) -> &[String] {
        &self.selected_layers
    }

    /// Lists all layer IDs
    pub fn ids(&self) -> Vec<String> {
        self.layers.keys().cloned().collect()
    }

    /// Gets all layers sorted by order, ties broken by id
    pub fn handles(&self) -> Vec<LayerHandle> {
        let mut handles: Vec<LayerHandle> = self.layers.values().cloned().collect();
        handles.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.id().cmp(b.id())));
        handles
    }

    /// Current stacking of every registered layer
    pub fn order_snapshot(&self) -> Vec<LayerOrder> {
        self.handles()
            .iter()
            .map(|l| LayerOrder {
                id: l.id().to_string(),
                order: l.order(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{
        base::{AdapterKind, LayerEntry, LayerOptions},
        tile::TileAdapter,
    };
    use std::sync::Arc;

    fn layer(id: &str, order: i32) -> LayerHandle {
        Arc::new(LayerEntry::new(
            id.to_string(),
            AdapterKind::Tile,
            order,
            LayerOptions::new(),
            Box::new(TileAdapter::new()),
        ))
    }

    #[test]
    fn test_orders_start_at_one() {
        let mut registry = LayerRegistry::new();
        assert_eq!(registry.next_order(), 1);
        assert_eq!(registry.next_order(), 2);
    }

    #[test]
    fn test_remove_purges_base_and_selection() {
        let mut registry = LayerRegistry::new();
        registry.insert(layer("osm", 0));
        registry.insert(layer("points", 1));
        registry.push_base("osm");
        registry.select("points");
        registry.select("points");
        registry.select("ghost");

        assert_eq!(registry.base_layers(), &["osm".to_string()]);
        assert_eq!(registry.selected_layers(), &["points".to_string()]);

        registry.remove("osm");
        registry.remove("points");
        assert!(registry.base_layers().is_empty());
        assert!(registry.selected_layers().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_entry_ignores_replaced_layer() {
        let mut registry = LayerRegistry::new();
        let old = layer("a", 1);
        registry.insert(old.clone());
        registry.insert(layer("a", 2));

        assert!(!registry.remove_entry(&old));
        assert!(registry.contains("a"));
    }

    #[test]
    fn test_order_snapshot_is_sorted() {
        let mut registry = LayerRegistry::new();
        registry.insert(layer("b", 2));
        registry.insert(layer("a", 1));
        registry.insert(layer("base", 0));

        let ids: Vec<String> = registry.order_snapshot().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["base", "a", "b"]);
    }
}
