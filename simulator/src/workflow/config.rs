use anyhow::Context;
use sensorcore::processing::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::profile::GeneratorConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub messages: usize,
    pub batch_size: usize,
    pub max_points: usize,
    pub smoothing_window: usize,
    pub malformed_ratio: f64,
    pub seed: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            messages: 1000,
            batch_size: 100,
            max_points: 500,
            smoothing_window: DEFAULT_WINDOW,
            malformed_ratio: 0.05,
            seed: 0,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(messages: usize, batch_size: usize, max_points: usize) -> Self {
        Self {
            messages,
            batch_size,
            max_points,
            ..Default::default()
        }
    }

    pub fn to_generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            messages: self.messages,
            malformed_ratio: self.malformed_ratio,
            seed: self.seed,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_generator_config() {
        let cfg = WorkflowConfig::from_args(2048, 128, 300);
        assert_eq!(cfg.to_generator_config().messages, 2048);
        assert_eq!(cfg.smoothing_window, DEFAULT_WINDOW);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"messages: 300\nbatch_size: 50\nmalformed_ratio: 0.0\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.messages, 300);
        assert_eq!(cfg.batch_size, 50);
        assert_eq!(cfg.max_points, 500);
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("/nonexistent/workflow.yaml").unwrap_err();
        assert!(err.to_string().contains("reading workflow config"));
    }
}
