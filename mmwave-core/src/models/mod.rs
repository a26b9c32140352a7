//! Radar Model Database
//!
//! The R60 family shares one wire protocol but each module exposes a
//! different set of functions. Every supported model has a submodule with
//! its operation catalog, state mirror and dispatch table, plus an entry in
//! [`MODELS`] describing it.

use serde::{Deserialize, Serialize, Serializer};

#[cfg(feature = "r60abd1")]
pub mod r60abd1;
#[cfg(feature = "r60afd1")]
pub mod r60afd1;
#[cfg(feature = "r60amp1")]
pub mod r60amp1;

/// Supported radar modules
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum Model {
    R60AMP1,
    R60ABD1,
    R60AFD1,
}

impl Model {
    /// Get the model name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::R60AMP1 => "R60AMP1",
            Model::R60ABD1 => "R60ABD1",
            Model::R60AFD1 => "R60AFD1",
        }
    }

    pub fn info(&self) -> &'static ModelInfo {
        match self {
            Model::R60AMP1 => &MODELS[0],
            Model::R60ABD1 => &MODELS[1],
            Model::R60AFD1 => &MODELS[2],
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl TryFrom<&str> for Model {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_uppercase().as_str() {
            "R60AMP1" => Ok(Model::R60AMP1),
            "R60ABD1" => Ok(Model::R60ABD1),
            "R60AFD1" => Ok(Model::R60AFD1),
            _ => Err(format!("Unknown model: {}", s)),
        }
    }
}

/// Information about a specific radar module
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub model: Model,
    /// Human-readable display name
    pub display_name: &'static str,

    /// Whether the heartbeat can be queried, or is only reported
    pub heartbeat_query: bool,
    /// Default timeout of the reset command in milliseconds
    pub reset_timeout_ms: u64,

    /// Feature groups the module supports
    pub features: &'static [&'static str],
}

pub static MODELS: [ModelInfo; 3] = [
    ModelInfo {
        model: Model::R60AMP1,
        display_name: "R60AMP1 presence and trajectory radar",
        heartbeat_query: true,
        reset_timeout_ms: 500,
        features: &["presence", "motion", "trajectory"],
    },
    ModelInfo {
        model: Model::R60ABD1,
        display_name: "R60ABD1 breathing, heart rate and sleep radar",
        heartbeat_query: true,
        reset_timeout_ms: 500,
        features: &["presence", "motion", "distance", "heartRate", "breath", "sleep"],
    },
    ModelInfo {
        model: Model::R60AFD1,
        display_name: "R60AFD1 fall detection radar",
        heartbeat_query: false,
        reset_timeout_ms: 200,
        features: &["presence", "motion", "installation", "fall", "staticStay", "track"],
    },
];

/// Look up a model by the product model string it reports
pub fn get_model(name: &str) -> Option<&'static ModelInfo> {
    MODELS
        .iter()
        .find(|m| name.to_ascii_uppercase().starts_with(m.model.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_model() {
        let m = get_model("r60abd1").unwrap();
        assert_eq!(m.model, Model::R60ABD1);
        assert!(get_model("MR24HPC1").is_none());
    }

    #[test]
    fn test_info_matches_model() {
        for m in [Model::R60AMP1, Model::R60ABD1, Model::R60AFD1] {
            assert_eq!(m.info().model, m);
            assert_eq!(Model::try_from(m.as_str()), Ok(m));
        }
    }
}
