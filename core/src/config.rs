use crate::prelude::{WorkflowError, WorkflowResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings shared by the widget and the headless driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    #[serde(alias = "endpointBaseUrl")]
    pub endpoint_base_url: String,
    pub gallery_dir: PathBuf,
    pub tick_interval_ms: u64,
    pub grace_period_ms: u64,
    pub stop_delay_ms: u64,
    pub gallery_timeout_ms: u64,
    pub max_upload_bytes: u64,
    /// Require a successful wake probe before the upload control is offered.
    pub wake_probe: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint_base_url: "http://localhost:5000/".into(),
            gallery_dir: PathBuf::from("images"),
            tick_interval_ms: 100,
            grace_period_ms: 5_000,
            stop_delay_ms: 1_000,
            gallery_timeout_ms: 10_000,
            max_upload_bytes: 16 * 1024 * 1024,
            wake_probe: false,
        }
    }
}

/// Command-line overrides layered on top of the YAML file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub gallery: Option<PathBuf>,
    pub wake: bool,
}

/// Timing and gating knobs the reducer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub grace_period: Duration,
    pub stop_delay: Duration,
    pub max_upload_bytes: u64,
    pub wake_probe: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        WidgetConfig::default().workflow_settings()
    }
}

impl WidgetConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> WorkflowResult<Self> {
        let config = Self::read(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses the file without validating it, so overrides can still repair it.
    fn read(path: &Path) -> WorkflowResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| WorkflowError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::parse_yaml(&contents)
            .map_err(|e| WorkflowError::Config(format!("{} ({})", e, path.display())))
    }

    /// Loads `path` when given, otherwise starts from defaults, then applies overrides.
    pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> WorkflowResult<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => Self::default(),
        };

        if let Some(endpoint) = overrides.endpoint {
            config.endpoint_base_url = endpoint;
        }
        if let Some(gallery) = overrides.gallery {
            config.gallery_dir = gallery;
        }
        if overrides.wake {
            config.wake_probe = true;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> WorkflowResult<Self> {
        let config = Self::parse_yaml(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_yaml(contents: &str) -> WorkflowResult<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| WorkflowError::Config(format!("parsing config: {}", e)))
    }

    pub fn validate(&self) -> WorkflowResult<()> {
        self.endpoint()?;
        if self.tick_interval_ms == 0 {
            return Err(WorkflowError::Config(
                "tick_interval_ms must be greater than zero".into(),
            ));
        }
        if self.gallery_timeout_ms == 0 {
            return Err(WorkflowError::Config(
                "gallery_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> WorkflowResult<Url> {
        let url = Url::parse(&self.endpoint_base_url).map_err(|e| {
            WorkflowError::Config(format!("endpoint {}: {}", self.endpoint_base_url, e))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(WorkflowError::Config(format!(
                "endpoint scheme {} is not http(s)",
                other
            ))),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn gallery_timeout(&self) -> Duration {
        Duration::from_millis(self.gallery_timeout_ms)
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            grace_period: Duration::from_millis(self.grace_period_ms),
            stop_delay: Duration::from_millis(self.stop_delay_ms),
            max_upload_bytes: self.max_upload_bytes,
            wake_probe: self.wake_probe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_development_service() {
        let cfg = WidgetConfig::default();
        assert_eq!(cfg.endpoint().unwrap().as_str(), "http://localhost:5000/");
        assert_eq!(cfg.tick_interval(), Duration::from_millis(100));
        assert_eq!(cfg.workflow_settings().grace_period, Duration::from_secs(5));
        assert!(!cfg.wake_probe);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"endpointBaseUrl: https://object-detector-resnet101.onrender.com/\nwake_probe: true\ntick_interval_ms: 50\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WidgetConfig::load(&path).unwrap();
        assert_eq!(
            cfg.endpoint_base_url,
            "https://object-detector-resnet101.onrender.com/"
        );
        assert!(cfg.wake_probe);
        assert_eq!(cfg.tick_interval_ms, 50);
        assert_eq!(cfg.stop_delay_ms, 1_000);
    }

    #[test]
    fn overrides_take_precedence_over_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"endpoint_base_url: http://localhost:5000/\ngallery_dir: assets\n")
            .unwrap();
        let path = temp.into_temp_path();

        let cfg = WidgetConfig::resolve(
            Some(&*path),
            ConfigOverrides {
                endpoint: Some("https://object-detector-resnet101.onrender.com/".into()),
                gallery: None,
                wake: true,
            },
        )
        .unwrap();

        assert_eq!(
            cfg.endpoint_base_url,
            "https://object-detector-resnet101.onrender.com/"
        );
        assert_eq!(cfg.gallery_dir, PathBuf::from("assets"));
        assert!(cfg.wake_probe);

        let bad = WidgetConfig::resolve(
            None,
            ConfigOverrides {
                endpoint: Some("localhost without scheme".into()),
                ..ConfigOverrides::default()
            },
        );
        assert!(matches!(bad, Err(WorkflowError::Config(_))));
    }

    #[test]
    fn endpoint_override_repairs_bad_file_value() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"endpoint_base_url: not a url\nstop_delay_ms: 250\n")
            .unwrap();
        let path = temp.into_temp_path();

        assert!(matches!(
            WidgetConfig::load(&path),
            Err(WorkflowError::Config(_))
        ));

        let cfg = WidgetConfig::resolve(
            Some(&*path),
            ConfigOverrides {
                endpoint: Some("http://127.0.0.1:5000/".into()),
                ..ConfigOverrides::default()
            },
        )
        .unwrap();
        assert_eq!(cfg.endpoint().unwrap().as_str(), "http://127.0.0.1:5000/");
        assert_eq!(cfg.stop_delay_ms, 250);

        assert!(matches!(
            WidgetConfig::resolve(Some(&*path), ConfigOverrides::default()),
            Err(WorkflowError::Config(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            WidgetConfig::from_yaml("endpoint_base_url: not a url\n"),
            Err(WorkflowError::Config(_))
        ));
        assert!(matches!(
            WidgetConfig::from_yaml("endpoint_base_url: ftp://example.com/\n"),
            Err(WorkflowError::Config(_))
        ));
        assert!(matches!(
            WidgetConfig::from_yaml("tick_interval_ms: 0\n"),
            Err(WorkflowError::Config(_))
        ));
        assert!(matches!(
            WidgetConfig::from_yaml("gallery_timeout_ms: 0\n"),
            Err(WorkflowError::Config(_))
        ));
    }
}
