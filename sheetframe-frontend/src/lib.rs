pub mod cli;
pub mod errors;
pub mod loader;

use std::path::Path;

use errors::FrontendError;
use sheetframe_config::AppConfig;
use tracing::info;

/// 以指定快照运行 CLI；`output` 非空时把处理后的文档写回磁盘。
pub fn run_cli(
    config: &AppConfig,
    snapshot: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), FrontendError> {
    info!("启动 CLI 前端");
    let loaded = loader::load_scene(snapshot)?;
    let summary = cli::run(loaded, &loader::EngineSettings::from_config(config))?;
    print!("{summary}");
    if let Some(path) = output {
        cli::save_document(&summary.document, path)?;
        println!("已写出快照：{}", path.display());
    }
    Ok(())
}
