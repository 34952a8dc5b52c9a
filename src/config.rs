use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShrinkMethod {
    #[default]
    #[serde(rename = "degree", alias = "byDegree")]
    ByDegree,
    #[serde(rename = "random")]
    Random,
}

impl ShrinkMethod {
    pub const ALL: [Self; 2] = [Self::ByDegree, Self::Random];

    pub fn label(self) -> &'static str {
        match self {
            Self::ByDegree => "degree",
            Self::Random => "random",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutKind {
    #[default]
    #[serde(rename = "spring")]
    Spring,
    #[serde(rename = "circular")]
    Circular,
    #[serde(rename = "shell")]
    Shell,
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "kamada", alias = "kamadaKawai")]
    KamadaKawai,
    #[serde(rename = "fruchterman", alias = "fruchtermanReingold")]
    FruchtermanReingold,
}

impl LayoutKind {
    pub const ALL: [Self; 6] = [
        Self::Spring,
        Self::Circular,
        Self::Shell,
        Self::Random,
        Self::KamadaKawai,
        Self::FruchtermanReingold,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Circular => "circular",
            Self::Shell => "shell",
            Self::Random => "random",
            Self::KamadaKawai => "kamada",
            Self::FruchtermanReingold => "fruchterman",
        }
    }

    pub fn is_pinned(self) -> bool {
        matches!(self, Self::Circular | Self::Shell)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Configuration {
    pub vertex_limit: i64,
    pub shrink_method: ShrinkMethod,
    pub layout: LayoutKind,
    pub show_labels: bool,
    pub show_weights: bool,
    pub dynamic_mode: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            vertex_limit: 10,
            shrink_method: ShrinkMethod::ByDegree,
            layout: LayoutKind::Spring,
            show_labels: true,
            show_weights: false,
            dynamic_mode: false,
        }
    }
}

impl Configuration {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|error| GraphError::InvalidConfig(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vertex_limit <= 0 {
            return Err(GraphError::InvalidConfig(format!(
                "vertexLimit must be positive, got {}",
                self.vertex_limit
            )));
        }
        Ok(())
    }

    pub fn limit(&self) -> Result<usize> {
        self.validate()?;
        usize::try_from(self.vertex_limit)
            .map_err(|_| GraphError::InvalidConfig("vertexLimit is out of range".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_tokens() {
        let config = Configuration::from_json(
            r#"{"vertexLimit":25,"shrinkMethod":"random","layout":"kamada","showLabels":false,"showWeights":true,"dynamicMode":true}"#,
        )
        .unwrap();
        assert_eq!(config.vertex_limit, 25);
        assert_eq!(config.shrink_method, ShrinkMethod::Random);
        assert_eq!(config.layout, LayoutKind::KamadaKawai);
        assert!(!config.show_labels);
        assert!(config.show_weights);
        assert!(config.dynamic_mode);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = Configuration::from_json(r#"{"layout":"shell"}"#).unwrap();
        assert_eq!(config.vertex_limit, 10);
        assert_eq!(config.layout, LayoutKind::Shell);
        assert_eq!(config.shrink_method, ShrinkMethod::ByDegree);
    }

    #[test]
    fn long_layout_names_are_aliases() {
        let config = Configuration::from_json(r#"{"layout":"fruchtermanReingold"}"#).unwrap();
        assert_eq!(config.layout, LayoutKind::FruchtermanReingold);
    }

    #[test]
    fn rejects_unknown_layout() {
        let error = Configuration::from_json(r#"{"layout":"hyperbolic"}"#).unwrap_err();
        assert!(matches!(error, GraphError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_non_positive_limit() {
        for raw in [r#"{"vertexLimit":0}"#, r#"{"vertexLimit":-4}"#] {
            let error = Configuration::from_json(raw).unwrap_err();
            assert!(matches!(error, GraphError::InvalidConfig(_)), "{raw}");
        }
    }
}
