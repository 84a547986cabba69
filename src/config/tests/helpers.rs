//! Shared test helpers for configuration tests.

use ortho_config::MergeComposer;
use serde_json::Value;

use crate::BeaconConfig;

/// Configuration sources, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Defaults,
    File,
    Environment,
    Cli,
}

impl Layer {
    fn push(self, composer: &mut MergeComposer, value: Value) {
        match self {
            Self::Defaults => composer.push_defaults(value),
            Self::File => composer.push_file(value, None),
            Self::Environment => composer.push_environment(value),
            Self::Cli => composer.push_cli(value),
        }
    }
}

/// Composes a [`BeaconConfig`] from layers applied in order.
pub fn build_config_from_layers(layers: &[(Layer, Value)]) -> BeaconConfig {
    let mut composer = MergeComposer::new();

    for (layer, value) in layers {
        layer.push(&mut composer, value.clone());
    }

    BeaconConfig::merge_from_layers(composer.layers()).expect("merge should succeed")
}
