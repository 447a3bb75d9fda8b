pub mod controls;

pub use controls::{ControlKind, ControlOptions, ControlPosition, CreateControlOptions, MapControl};
