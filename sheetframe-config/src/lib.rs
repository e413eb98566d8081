use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub units: UnitsConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub relocation: RelocationConfig,
    #[serde(default)]
    pub split: SplitConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `SHEETFRAME_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("SHEETFRAME_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 展示单位（毫米）与图纸单位之间的换算。
#[derive(Debug, Clone, Deserialize)]
pub struct UnitsConfig {
    #[serde(default = "UnitsConfig::default_presentation_per_unit")]
    pub presentation_per_unit: f64,
}

impl UnitsConfig {
    fn default_presentation_per_unit() -> f64 {
        304.8
    }
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            presentation_per_unit: Self::default_presentation_per_unit(),
        }
    }
}

/// 列布局参数；`spacing` 与 `margin` 以展示单位给出，`tolerance` 以图纸单位给出。
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "LayoutConfig::default_spacing")]
    pub spacing: f64,
    #[serde(default = "LayoutConfig::default_margin")]
    pub margin: f64,
    #[serde(default)]
    pub tolerance: f64,
}

impl LayoutConfig {
    fn default_spacing() -> f64 {
        10.0
    }

    fn default_margin() -> f64 {
        50.0
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: Self::default_spacing(),
            margin: Self::default_margin(),
            tolerance: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelocationConfig {
    #[serde(default)]
    pub anchor_to_target: bool,
    #[serde(default = "RelocationConfig::default_preserve_label_offset")]
    pub preserve_label_offset: bool,
}

impl RelocationConfig {
    fn default_preserve_label_offset() -> bool {
        true
    }
}

impl Default for RelocationConfig {
    fn default() -> Self {
        Self {
            anchor_to_target: false,
            preserve_label_offset: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    AllowPartial,
    #[default]
    AllOrNothing,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SplitConfig {
    #[serde(default)]
    pub failure_policy: FailureMode,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_every_section() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.logging.level, "info");
        assert!((cfg.units.presentation_per_unit - 304.8).abs() < f64::EPSILON);
        assert!((cfg.layout.spacing - 10.0).abs() < f64::EPSILON);
        assert!((cfg.layout.margin - 50.0).abs() < f64::EPSILON);
        assert_eq!(cfg.layout.tolerance, 0.0);
        assert!(!cfg.relocation.anchor_to_target);
        assert!(cfg.relocation.preserve_label_offset);
        assert_eq!(cfg.split.failure_policy, FailureMode::AllOrNothing);
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [layout]
            spacing = 5.0

            [relocation]
            anchor_to_target = true

            [split]
            failure_policy = "allow_partial"
            "#
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert!((cfg.layout.spacing - 5.0).abs() < f64::EPSILON);
        assert!((cfg.layout.margin - 50.0).abs() < f64::EPSILON);
        assert!(cfg.relocation.anchor_to_target);
        assert!(cfg.relocation.preserve_label_offset);
        assert_eq!(cfg.split.failure_policy, FailureMode::AllowPartial);
        assert!((cfg.units.presentation_per_unit - 304.8).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[layout]\nspacing = \"wide\"").unwrap();
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let missing = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
