use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub mod check;

/// Deployment environment. Drives HSTS, the CSP dev relaxations and the
/// double confirmation of destructive console commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Development,
    Testing,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Local | Environment::Development)
    }
}

/// One score band of the assessment grading scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeBand {
    pub grade: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Hits allowed inside a window of `per_seconds`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Limit {
    pub max: u32,
    pub per_seconds: u64,
}

impl Limit {
    pub const fn per_minute(max: u32) -> Self {
        Self {
            max,
            per_seconds: 60,
        }
    }

    pub const fn per_hour(max: u32) -> Self {
        Self {
            max,
            per_seconds: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimits {
    pub api: Limit,
    pub api_strict: Limit,
    pub login: Limit,
    pub login_hourly: Limit,
    pub upload: Limit,
    pub report_generation: Limit,
    pub export: Limit,
    pub dashboard: Limit,
    pub admin: Limit,
    pub guest: Limit,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            api: Limit::per_minute(60),
            api_strict: Limit::per_minute(20),
            login: Limit::per_minute(5),
            login_hourly: Limit::per_hour(20),
            upload: Limit::per_minute(10),
            report_generation: Limit::per_minute(5),
            export: Limit::per_minute(3),
            dashboard: Limit::per_minute(120),
            admin: Limit::per_minute(100),
            guest: Limit::per_minute(30),
        }
    }
}

impl RateLimits {
    /// Look a named limit up. Unknown names fall back to `api`.
    pub fn get(&self, name: &str) -> Limit {
        match name {
            "api_strict" => self.api_strict,
            "login" => self.login,
            "login_hourly" => self.login_hourly,
            "upload" => self.upload,
            "report_generation" => self.report_generation,
            "export" => self.export,
            "dashboard" => self.dashboard,
            "admin" => self.admin,
            "guest" => self.guest,
            _ => self.api,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_institution_name")]
    pub institution_name: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    #[serde(default = "default_passing_score")]
    pub passing_score: f64,
    #[serde(default = "default_grading")]
    pub grading: Vec<GradeBand>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rate_limits: RateLimits,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_institution_name() -> String {
    "Pemerintah Daerah".to_string()
}
fn default_upload_dir() -> String {
    Config::config_dir()
        .join("uploads")
        .to_string_lossy()
        .to_string()
}
fn default_report_dir() -> String {
    Config::config_dir()
        .join("reports")
        .to_string_lossy()
        .to_string()
}
fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}
fn default_passing_score() -> f64 {
    60.0
}

pub fn default_grading() -> Vec<GradeBand> {
    [
        ("A", 90.0, 100.0),
        ("B", 80.0, 89.0),
        ("C", 70.0, 79.0),
        ("D", 60.0, 69.0),
        ("E", 0.0, 59.0),
    ]
    .into_iter()
    .map(|(g, min, max)| GradeBand {
        grade: g.to_string(),
        min,
        max,
    })
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file().to_string_lossy().to_string())
    }
}

impl Config {
    pub fn with_database(database: String) -> Self {
        Self {
            database,
            environment: Environment::default(),
            institution_name: default_institution_name(),
            upload_dir: default_upload_dir(),
            report_dir: default_report_dir(),
            max_upload_size: default_max_upload_size(),
            passing_score: default_passing_score(),
            grading: default_grading(),
            server: ServerConfig::default(),
            rate_limits: RateLimits::default(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("sakip")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".sakip")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("sakip.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("sakip.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Initialize configuration and database files.
    /// Returns the database path that was set up.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = std::path::Path::new(&name);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        } else {
            dir.join("sakip.sqlite")
        };

        // Write config file
        if !is_test {
            fs::create_dir_all(&dir)?;
            let config = Config::with_database(db_path.to_string_lossy().to_string());
            let yaml = config.to_yaml()?;
            let mut file = fs::File::create(Self::config_file()).map_err(|_| AppError::ConfigSave)?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(db_path)
    }

    /// Grade letter for a 0-100 score on the configured scale.
    pub fn grade_for(&self, score: f64) -> String {
        crate::core::dashboard::assessment_grade(score, &self.grading)
    }
}
