use std::env;
use std::path::{Path, PathBuf};

use sheetframe_config::{AppConfig, FailureMode};
use sheetframe_core::units::UnitScale;
use sheetframe_engine::relocation::RelocationOptions;
use sheetframe_engine::scene::{DemoSheets, FailurePolicy, Scene};
use sheetframe_engine::split::SplitOptions;
use sheetframe_io::{DocumentLoader, JsonSnapshot};
use tracing::{info, warn};

use crate::errors::FrontendError;

/// 文档来源，便于前端呈现加载信息。
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Snapshot(PathBuf),
    Demo,
}

/// 统一封装加载后的场景与元信息。
#[derive(Debug)]
pub struct LoadedScene {
    pub scene: Scene,
    pub source: DocumentSource,
    pub demo: Option<DemoSheets>,
}

/// 由配置换算出的引擎参数，长度均为图纸单位。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub split: SplitOptions,
    pub spacing: f64,
    pub margin: f64,
    pub policy: FailurePolicy,
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let scale = UnitScale::new(config.units.presentation_per_unit);
        let policy = match config.split.failure_policy {
            FailureMode::AllowPartial => FailurePolicy::AllowPartial,
            FailureMode::AllOrNothing => FailurePolicy::AllOrNothing,
        };
        Self {
            split: SplitOptions {
                relocation: RelocationOptions {
                    anchor_to_target: config.relocation.anchor_to_target,
                    preserve_label_offset: config.relocation.preserve_label_offset,
                },
                tolerance: config.layout.tolerance.max(0.0),
            },
            spacing: scale.to_drawing(config.layout.spacing),
            margin: scale.to_drawing(config.layout.margin),
            policy,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// 加载场景：显式路径优先且失败即报错；否则尝试环境变量 `SHEETFRAME_CLI_SNAPSHOT`，
/// 读取失败时回退到内置示例。
pub fn load_scene(explicit: Option<&Path>) -> Result<LoadedScene, FrontendError> {
    let loader = JsonSnapshot::new();
    if let Some(path) = explicit {
        let document = loader.load(path)?;
        info!(path = %path.display(), "从快照加载文档成功");
        return Ok(LoadedScene {
            scene: Scene::with_document(document),
            source: DocumentSource::Snapshot(path.to_path_buf()),
            demo: None,
        });
    }

    if let Some(path) = env::var_os("SHEETFRAME_CLI_SNAPSHOT") {
        let path = PathBuf::from(path);
        match loader.load(&path) {
            Ok(document) => {
                info!(path = %path.display(), "从快照加载文档成功");
                return Ok(LoadedScene {
                    scene: Scene::with_document(document),
                    source: DocumentSource::Snapshot(path),
                    demo: None,
                });
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "加载快照失败，回退到内置示例");
            }
        }
    }

    let mut scene = Scene::new();
    let demo = scene.populate_demo();
    Ok(LoadedScene {
        scene,
        source: DocumentSource::Demo,
        demo: Some(demo),
    })
}

#[cfg(test)]
mod tests {
    use sheetframe_io::DocumentSaver;

    use super::*;

    #[test]
    fn settings_convert_presentation_lengths() {
        let settings = EngineSettings::default();
        assert!((settings.spacing - 10.0 / 304.8).abs() < 1e-12);
        assert!((settings.margin - 50.0 / 304.8).abs() < 1e-12);
        assert_eq!(settings.policy, FailurePolicy::AllOrNothing);
        assert!(settings.split.relocation.preserve_label_offset);
        assert!(!settings.split.relocation.anchor_to_target);
    }

    #[test]
    fn explicit_snapshot_is_loaded() {
        let mut scene = Scene::new();
        scene.populate_demo();
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("demo.json");
        JsonSnapshot::new()
            .save(scene.document(), &path)
            .expect("save snapshot");

        let loaded = load_scene(Some(&path)).expect("load");
        assert!(matches!(loaded.source, DocumentSource::Snapshot(_)));
        assert!(loaded.demo.is_none());
        assert_eq!(loaded.scene.document(), scene.document());
    }

    #[test]
    fn missing_explicit_snapshot_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_scene(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert!(matches!(err, FrontendError::Io(_)));
    }
}
