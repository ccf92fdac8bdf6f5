use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Directory holding `all.json`, `all.ndjson` and `filtered.json`.
    pub output_dir: PathBuf,
    pub webdriver_url: String,
    /// Persistent browser profile so a manual login survives between runs.
    pub user_data_dir: PathBuf,
    pub driver_timeout_secs: u64,
    pub container_wait_secs: u64,
    /// When `false`, profiles that yielded no posts are not written to the
    /// aggregate store and get another attempt on the next run.
    pub record_empty_profiles: bool,
    pub deepseek_api_key: Option<String>,
    pub deepseek_base_url: String,
    pub deepseek_model: String,
    pub classifier_timeout_secs: u64,
}

impl AppConfig {
    /// Default aggregate store path for the given line/document encoding.
    #[must_use]
    pub fn aggregate_path(&self, line_encoded: bool) -> PathBuf {
        if line_encoded {
            self.output_dir.join("all.ndjson")
        } else {
            self.output_dir.join("all.json")
        }
    }

    #[must_use]
    pub fn filtered_path(&self) -> PathBuf {
        self.output_dir.join("filtered.json")
    }

    #[must_use]
    pub fn table_path(&self) -> PathBuf {
        self.output_dir.join("filtered.csv")
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("output_dir", &self.output_dir)
            .field("webdriver_url", &self.webdriver_url)
            .field("user_data_dir", &self.user_data_dir)
            .field("driver_timeout_secs", &self.driver_timeout_secs)
            .field("container_wait_secs", &self.container_wait_secs)
            .field("record_empty_profiles", &self.record_empty_profiles)
            .field(
                "deepseek_api_key",
                &self.deepseek_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("deepseek_base_url", &self.deepseek_base_url)
            .field("deepseek_model", &self.deepseek_model)
            .field("classifier_timeout_secs", &self.classifier_timeout_secs)
            .finish()
    }
}
