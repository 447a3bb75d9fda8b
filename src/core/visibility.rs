//! Layer visibility state machine of [`WebMap`].
//!
//! A layer is either hidden or shown. Transitions emit `layer:pre*` then the
//! terminal event; requests made before the native map exists are queued and
//! replayed on the map adapter's `create` event.

use crate::{
    core::{constants::BASE_LAYER_ORDER, layer_ops::LayerDef, map::WebMap},
    input::events::LayerEvent,
    layers::base::{EventHandled, LayerHandle},
};

impl WebMap {
    pub fn show_layer(&self, layer: impl Into<LayerDef>) {
        self.toggle_layer(layer, Some(true));
    }

    pub fn hide_layer(&self, layer: impl Into<LayerDef>) {
        self.toggle_layer(layer, Some(false));
    }

    /// Sets the layer visibility to `status`, or inverts it when `None`.
    /// No-op when the layer already is in the target state.
    pub fn toggle_layer(&self, layer: impl Into<LayerDef>, status: Option<bool>) {
        let layer = match self.get_layer(layer) {
            Some(layer) => layer,
            None => return,
        };

        if !self.is_map_created() {
            self.queue_toggle(&layer, status);
            return;
        }

        let target = status.unwrap_or(!layer.is_visible());
        self.apply_visibility(&layer, target);
    }

    fn queue_toggle(&self, layer: &LayerHandle, status: Option<bool>) {
        let mut pending = self.inner.pending_toggles.lock();
        let target = status.unwrap_or_else(|| {
            let current = pending
                .iter()
                .rev()
                .find(|(id, _)| id == layer.id())
                .map(|(_, target)| *target)
                .unwrap_or_else(|| layer.is_visible());
            !current
        });
        log::warn!(
            "map not created yet, {} of layer {} deferred",
            if target { "show" } else { "hide" },
            layer.id()
        );
        pending.push((layer.id().to_string(), target));
    }

    /// Replays the queued visibility requests in order
    pub(crate) fn replay_pending_toggles(&self) {
        let pending: Vec<(String, bool)> = self.inner.pending_toggles.lock().drain(..).collect();
        for (id, target) in pending {
            if let Some(layer) = self.get_layer(id.as_str()) {
                self.apply_visibility(&layer, target);
            }
        }
    }

    fn apply_visibility(&self, layer: &LayerHandle, target: bool) {
        if layer.is_visible() == target {
            return;
        }
        layer.set_visibility(target);

        let native = match layer.native() {
            Some(native) => native,
            // Still being added: the add applies the flag once the native layer exists
            None => return,
        };

        let events = &self.inner.events.lifecycle;
        let adapter = layer.adapter();
        let map_adapter = &self.inner.map_adapter;

        if target {
            events.emit(&LayerEvent::PreShow(layer.clone()));
            if adapter.show_layer(&native) == EventHandled::NotHandled {
                map_adapter.show_layer(&native);
            }
            let order = if layer.is_base_layer() {
                BASE_LAYER_ORDER
            } else {
                layer.order()
            };
            let layers = self.inner.registry.lock().order_snapshot();
            map_adapter.set_layer_order(&native, order, &layers);
            events.emit(&LayerEvent::Show(layer.clone()));
        } else {
            events.emit(&LayerEvent::PreHide(layer.clone()));
            if adapter.hide_layer(&native) == EventHandled::NotHandled {
                map_adapter.hide_layer(&native);
            }
            events.emit(&LayerEvent::Hide(layer.clone()));
        }
        log::debug!("layer {} visibility set to {}", layer.id(), target);
    }
}
