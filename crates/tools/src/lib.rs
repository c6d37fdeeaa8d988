//! Developer Tooling: read-only streaming inspection for logs and CLIs.
//!
//! # Invariants
//! - Inspection never mutates streaming state.

mod inspector;

pub use inspector::{RingRow, StreamingInspector, StreamingSummary};

pub fn crate_info() -> &'static str {
    "overworld-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
