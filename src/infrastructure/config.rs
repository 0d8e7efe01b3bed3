use crate::domain::figure::Theme;
use crate::error::AnalyzerError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Sources to chart; all sources found in `data_dir` when empty.
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub output_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub step_seconds: u32,
    pub rolling_multipliers: Vec<u32>,
    pub emote_step_multiplier: u32,
    pub min_occurrences: usize,
    pub top_size: Option<usize>,
    pub name_filter: Vec<String>,
    pub spike_min_count: u64,
    pub spike_min_power: f64,
    pub spike_baseline_buckets: usize,
    pub theme: Theme,
    pub video_axis_title: String,
    pub combined_axis_title: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            step_seconds: 15,
            rolling_multipliers: vec![1, 4, 20],
            emote_step_multiplier: 4,
            min_occurrences: 10,
            top_size: Some(6),
            name_filter: Vec::new(),
            spike_min_count: 5,
            spike_min_power: 0.4,
            spike_baseline_buckets: 4,
            theme: Theme::Light,
            video_axis_title: "Video time".to_string(),
            combined_axis_title: "Stream time".to_string(),
        }
    }
}

impl ChartConfig {
    pub fn emote_step_seconds(&self) -> u32 {
        self.step_seconds.saturating_mul(self.emote_step_multiplier)
    }

    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.step_seconds == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "step_seconds must be positive".to_string(),
            ));
        }
        if self.emote_step_multiplier == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "emote_step_multiplier must be positive".to_string(),
            ));
        }
        if self
            .step_seconds
            .checked_mul(self.emote_step_multiplier)
            .is_none()
        {
            return Err(AnalyzerError::InvalidConfig(format!(
                "emote step of {}s x {} does not fit in u32 seconds",
                self.step_seconds, self.emote_step_multiplier
            )));
        }
        if self.rolling_multipliers.is_empty() {
            return Err(AnalyzerError::InvalidConfig(
                "rolling_multipliers must not be empty".to_string(),
            ));
        }
        if self.spike_min_power.is_nan() || self.spike_min_power < 0.0 {
            return Err(AnalyzerError::InvalidConfig(format!(
                "spike_min_power must be non-negative, got {}",
                self.spike_min_power
            )));
        }
        Ok(())
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

pub fn load_analyzer_config() -> anyhow::Result<AnalyzerConfig> {
    build_config(config::File::with_name("config/analyzer").required(false))
}

pub fn load_analyzer_config_from(path: &Path) -> anyhow::Result<AnalyzerConfig> {
    build_config(config::File::from(path))
}

fn build_config<S>(file: S) -> anyhow::Result<AnalyzerConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix("CHAT_ANALYZER").separator("__"))
        .build()?;

    let config: AnalyzerConfig = settings.try_deserialize()?;
    config.chart.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let chart = ChartConfig::default();
        assert_eq!(chart.emote_step_seconds(), 60);
        assert!(chart.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_nonsense() {
        let zero_step = ChartConfig {
            step_seconds: 0,
            ..ChartConfig::default()
        };
        assert!(matches!(
            zero_step.validate(),
            Err(AnalyzerError::InvalidConfig(_))
        ));

        let no_windows = ChartConfig {
            rolling_multipliers: Vec::new(),
            ..ChartConfig::default()
        };
        assert!(no_windows.validate().is_err());

        let negative_power = ChartConfig {
            spike_min_power: -0.1,
            ..ChartConfig::default()
        };
        assert!(negative_power.validate().is_err());
    }

    #[test]
    fn test_emote_step_overflow_is_rejected() {
        let huge = ChartConfig {
            step_seconds: 3600,
            emote_step_multiplier: u32::MAX / 1000,
            ..ChartConfig::default()
        };

        assert!(matches!(huge.validate(), Err(AnalyzerError::InvalidConfig(_))));
        assert_eq!(huge.emote_step_seconds(), u32::MAX);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
data_dir = "chat-data"
sources = ["abc", "def"]

[chart]
step_seconds = 30
rolling_multipliers = [1, 2]
name_filter = ["Kappa"]
theme = "dark"
"#
        )
        .unwrap();

        let config = load_analyzer_config_from(file.path()).unwrap();

        assert_eq!(config.data_dir, "chat-data");
        assert_eq!(config.sources, vec!["abc", "def"]);
        assert_eq!(config.output_path, None);
        assert_eq!(config.chart.step_seconds, 30);
        assert_eq!(config.chart.rolling_multipliers, vec![1, 2]);
        assert_eq!(config.chart.name_filter, vec!["Kappa"]);
        assert_eq!(config.chart.theme, Theme::Dark);
        assert_eq!(config.chart.min_occurrences, 10);
        assert_eq!(config.chart.top_size, Some(6));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[chart]\nstep_seconds = 0").unwrap();

        assert!(load_analyzer_config_from(file.path()).is_err());
    }
}
