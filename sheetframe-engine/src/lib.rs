pub mod column;
pub mod frame;
pub mod grouping;
pub mod host;
pub mod naming;
pub mod relocation;
pub mod scene;
pub mod split;

pub mod errors {
    use thiserror::Error;

    /// 宿主文档拒绝或无法完成的单项操作。
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum HostError {
        #[error("view {view} cannot be placed on sheet {sheet}")]
        PlacementRefused { view: u64, sheet: u64 },
        #[error("placement {0} not found")]
        PlacementNotFound(u64),
        #[error("outline of placement {0} is not available")]
        OutlineUnavailable(u64),
        #[error("sheet {0} not found")]
        SheetNotFound(u64),
        #[error("frame {0} not found")]
        FrameNotFound(u64),
    }

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("sheet {0} not found")]
        SheetNotFound(u64),
        #[error("frame {0} has no anchor point")]
        FrameWithoutAnchor(u64),
        #[error("host operation failed: {0}")]
        Host(#[from] HostError),
        #[error("{failed} of {total} items failed, changes were rolled back")]
        PartialFailure { failed: usize, total: usize },
    }
}
