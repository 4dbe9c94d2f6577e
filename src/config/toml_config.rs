use crate::domain::ports::ConfigProvider;
use crate::utils::error::{LockerError, Result};
use crate::utils::validation::{validate_json_file, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the four input files live. File names are relative to `dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: String,
    #[serde(default = "default_users")]
    pub users: String,
    #[serde(default = "default_lockers")]
    pub lockers: String,
    #[serde(default = "default_parcels")]
    pub parcels: String,
    #[serde(default = "default_delivers")]
    pub delivers: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub allow_zero_capacity: bool,
    #[serde(default = "default_check_deliverability")]
    pub check_deliverability: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_bundle")]
    pub bundle: String,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_users() -> String {
    "users.json".to_string()
}

fn default_lockers() -> String {
    "lockers.json".to_string()
}

fn default_parcels() -> String {
    "parcels.json".to_string()
}

fn default_delivers() -> String {
    "delivers.json".to_string()
}

fn default_check_deliverability() -> bool {
    true
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_bundle() -> String {
    "reports.zip".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            users: default_users(),
            lockers: default_lockers(),
            parcels: default_parcels(),
            delivers: default_delivers(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allow_zero_capacity: false,
            check_deliverability: default_check_deliverability(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            bundle: default_bundle(),
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LockerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left
    /// as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| LockerError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn data_dir(&self) -> &str {
        &self.data.dir
    }

    pub fn bundle_name(&self) -> &str {
        &self.output.bundle
    }
}

impl ConfigProvider for TomlConfig {
    fn users_file(&self) -> &str {
        &self.data.users
    }

    fn lockers_file(&self) -> &str {
        &self.data.lockers
    }

    fn parcels_file(&self) -> &str {
        &self.data.parcels
    }

    fn delivers_file(&self) -> &str {
        &self.data.delivers
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn allow_zero_capacity(&self) -> bool {
        self.validation.allow_zero_capacity
    }

    fn check_deliverability(&self) -> bool {
        self.validation.check_deliverability
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("data.dir", &self.data.dir)?;
        validate_json_file("data.users", &self.data.users)?;
        validate_json_file("data.lockers", &self.data.lockers)?;
        validate_json_file("data.parcels", &self.data.parcels)?;
        validate_json_file("data.delivers", &self.data.delivers)?;
        validate_path("output.path", &self.output.path)?;
        validate_path("output.bundle", &self.output.bundle)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[data]
dir = "/srv/lockers"
users = "people.json"
lockers = "lockers.json"
parcels = "parcels.json"
delivers = "shipments.json"

[validation]
allow_zero_capacity = true
check_deliverability = false

[output]
path = "./reports"
bundle = "weekly.zip"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.data_dir(), "/srv/lockers");
        assert_eq!(config.users_file(), "people.json");
        assert_eq!(config.delivers_file(), "shipments.json");
        assert!(config.allow_zero_capacity());
        assert!(!config.check_deliverability());
        assert_eq!(config.output_path(), "./reports");
        assert_eq!(config.bundle_name(), "weekly.zip");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config = TomlConfig::from_toml_str("[validation]\nallow_zero_capacity = true\n").unwrap();

        assert_eq!(config.data_dir(), "./data");
        assert_eq!(config.lockers_file(), "lockers.json");
        assert_eq!(config.parcels_file(), "parcels.json");
        assert!(config.allow_zero_capacity());
        assert!(config.check_deliverability());
        assert_eq!(config.bundle_name(), "reports.zip");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LOCKER_ETL_TEST_DATA_DIR", "/tmp/locker-data");

        let toml_content = r#"
[data]
dir = "${LOCKER_ETL_TEST_DATA_DIR}"
users = "${LOCKER_ETL_TEST_UNSET}.json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data_dir(), "/tmp/locker-data");
        assert_eq!(config.users_file(), "${LOCKER_ETL_TEST_UNSET}.json");

        std::env::remove_var("LOCKER_ETL_TEST_DATA_DIR");
    }

    #[test]
    fn test_validation_rejects_non_json_data_file() {
        let config = TomlConfig::from_toml_str("[data]\nusers = \"users.csv\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(LockerError::InvalidConfigValueError { ref field, .. }) if field == "data.users"
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            TomlConfig::from_toml_str("[data\nusers = 1"),
            Err(LockerError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\npath = \"./from-file\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_path(), "./from-file");
    }
}
