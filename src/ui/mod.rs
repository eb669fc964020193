//! egui rendering.  Widgets read [`crate::state::AppState`] and mutate it only
//! through its control methods.

pub mod charts;
pub mod panels;
pub mod table;
