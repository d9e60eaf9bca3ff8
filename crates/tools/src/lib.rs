//! Developer tooling: level inspector and ASCII map of the live window.
//!
//! # Invariants
//! - Tools only read; they never mutate the window or the scene.

mod inspector;

pub use inspector::{LevelInspector, LevelSummary, TileInfo};

pub fn crate_info() -> &'static str {
    "runway-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
