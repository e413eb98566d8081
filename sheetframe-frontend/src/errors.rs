use sheetframe_engine::errors::EngineError;
use sheetframe_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("快照读写失败: {0}")]
    Io(#[from] IoError),
    #[error("图纸处理失败: {0}")]
    Engine(#[from] EngineError),
    #[error("文档中没有任何图纸")]
    EmptyDocument,
}
