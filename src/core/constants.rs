//! Core constants mirroring common web-map conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Lowest zoom applied to layers that do not set their own.
pub const DEFAULT_MIN_ZOOM: f64 = 0.0;

/// Highest zoom applied to layers that do not set their own.
pub const DEFAULT_MAX_ZOOM: f64 = 21.0;

/// Default vector paint.
pub const DEFAULT_PAINT_COLOR: &str = "blue";
pub const DEFAULT_PAINT_RADIUS: f64 = 8.0;

/// Default paint of selected features.
pub const DEFAULT_SELECTED_PAINT_COLOR: &str = "darkblue";
pub const DEFAULT_SELECTED_PAINT_RADIUS: f64 = 12.0;

/// Stacking order reserved for base layers.
pub const BASE_LAYER_ORDER: i32 = 0;

/// First value of the automatic layer order/id counter.
pub const FIRST_LAYER_ORDER: i32 = 1;

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;
