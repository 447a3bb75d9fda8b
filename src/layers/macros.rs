//! Macros to reduce boilerplate in adapter implementations

/// Implements the `as_any` downcast hook of [`LayerAdapter`].
///
/// Usage, inside an `impl LayerAdapter for MyAdapter` block:
/// ```ignore
/// webmap::impl_layer_adapter_any!();
/// ```
///
/// [`LayerAdapter`]: crate::layers::base::LayerAdapter
#[macro_export]
macro_rules! impl_layer_adapter_any {
    () => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    };
}

/// Implements `kind` and `as_any` for a [`LayerAdapterFactory`] that stores
/// its kind in the given field.
///
/// [`LayerAdapterFactory`]: crate::layers::factory::LayerAdapterFactory
#[macro_export]
macro_rules! impl_factory_boilerplate {
    ($kind_field:ident) => {
        fn kind(&self) -> $crate::layers::base::AdapterKind {
            self.$kind_field.clone()
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    };
}

/// Forwards the vector capability of a wrapping adapter to the wrapped one.
#[macro_export]
macro_rules! forward_vector_capability {
    ($inner_field:ident) => {
        fn vector(&self) -> Option<&dyn $crate::layers::base::VectorLayerAdapter> {
            self.$inner_field.vector()
        }
    };
}
