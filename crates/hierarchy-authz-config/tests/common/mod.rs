// crates/hierarchy-authz-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for hierarchy-authz-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use hierarchy_authz_config::HierarchyAuthzConfig;

/// Smallest valid configuration document.
pub const MINIMAL_TOML: &str = "[store]\npath = \"authz/roles.sqlite\"\n";

/// Parses a TOML string into a `HierarchyAuthzConfig` without validating it.
pub fn config_from_toml(toml_str: &str) -> Result<HierarchyAuthzConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<HierarchyAuthzConfig, toml::de::Error> {
    config_from_toml(MINIMAL_TOML)
}
