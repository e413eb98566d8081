use tracing::{debug, warn};

use sheetframe_core::document::{LabelSize, SheetDocument, ViewKind};
use sheetframe_core::geometry::{Outline, Point};
use sheetframe_core::model::{FrameId, SheetId, ViewId};

use crate::column::{ColumnLayout, ColumnReport, place_column};
use crate::errors::EngineError;
use crate::frame::resolve_frame_outline;
use crate::host::SheetHost;
use crate::split::{SplitOptions, SplitReport, split_sheet};

/// 批量操作出现部分失败时的处理方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// 保留已成功的部分。
    AllowPartial,
    /// 只要有一项失败就整体回滚。
    #[default]
    AllOrNothing,
}

impl FailurePolicy {
    fn check(self, failed: usize, total: usize) -> Result<(), EngineError> {
        match self {
            FailurePolicy::AllOrNothing if failed > 0 => {
                Err(EngineError::PartialFailure { failed, total })
            }
            _ => Ok(()),
        }
    }
}

/// 场景持有文档，并以快照方式为一次逻辑操作提供全有或全无的提交语义。
#[derive(Debug, Default)]
pub struct Scene {
    document: SheetDocument,
}

#[derive(Debug, Clone)]
pub struct DemoSheets {
    pub sheet: SheetId,
    pub frames: [FrameId; 2],
    pub unplaced: Vec<ViewId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: SheetDocument) -> Self {
        Self { document }
    }

    #[inline]
    pub fn document(&self) -> &SheetDocument {
        &self.document
    }

    #[inline]
    pub fn document_mut(&mut self) -> &mut SheetDocument {
        &mut self.document
    }

    pub fn into_document(self) -> SheetDocument {
        self.document
    }

    /// 在文档快照上执行 `operation`；返回错误时恢复快照。
    pub fn transaction<T, F>(&mut self, operation: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut SheetDocument) -> Result<T, EngineError>,
    {
        let snapshot = self.document.clone();
        match operation(&mut self.document) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(error = %err, "操作失败，文档已回滚");
                self.document = snapshot;
                Err(err)
            }
        }
    }

    pub fn split_sheet(
        &mut self,
        sheet: SheetId,
        options: &SplitOptions,
        policy: FailurePolicy,
    ) -> Result<SplitReport, EngineError> {
        self.transaction(|document| {
            let report = split_sheet(document, sheet, options)?;
            policy.check(report.failed_count(), report.total())?;
            Ok(report)
        })
    }

    pub fn place_column(
        &mut self,
        sheet: SheetId,
        views: &[ViewId],
        layout: &ColumnLayout,
        policy: FailurePolicy,
    ) -> Result<ColumnReport, EngineError> {
        self.transaction(|document| {
            let report = place_column(document, sheet, views, layout);
            policy.check(report.skipped.len(), report.total())?;
            Ok(report)
        })
    }

    /// 图纸上已有内容（视口与图框）的外包框列表。
    pub fn sheet_content(&self, sheet: SheetId) -> Vec<Outline> {
        let frames = self
            .document
            .frames_on_sheet(sheet)
            .into_iter()
            .filter_map(|frame| resolve_frame_outline(&frame));
        let items = self
            .document
            .items_on_sheet(sheet)
            .into_iter()
            .map(|item| item.outline);
        frames.chain(items).collect()
    }

    /// 填充一张含两个图框的示例图纸，以及若干尚未放置的视图。
    pub fn populate_demo(&mut self) -> DemoSheets {
        let label = Some(LabelSize {
            width: 1.2,
            height: 0.2,
        });
        let document = &mut self.document;
        let sheet = document.add_sheet("Floor Plans", "A101");
        let left =
            document.add_frame(sheet, Some(Point::planar(2.75, 0.0)), 2.75, 1.95, 0.0, "A1");
        let right =
            document.add_frame(sheet, Some(Point::planar(6.0, 0.0)), 2.75, 1.95, 0.0, "A1");

        let placed = [
            ("Level 1", 1.2, 0.8, Point::planar(1.0, 1.2)),
            ("Level 2", 0.9, 0.6, Point::planar(2.0, 0.6)),
            ("Roof", 1.4, 0.9, Point::planar(4.5, 1.1)),
            ("Site", 1.0, 0.5, Point::planar(4.0, 0.4)),
        ];
        for (name, width, height, center) in placed {
            let view = document.add_view(name, ViewKind::Drawing, width, height, label);
            document.place_view(view, sheet, center, None);
        }

        let unplaced = [
            ("Section A", 0.8, 0.3),
            ("Section B", 0.6, 0.5),
            ("Detail 1", 0.4, 0.4),
        ]
        .into_iter()
        .map(|(name, width, height)| {
            document.add_view(name, ViewKind::Drawing, width, height, label)
        })
        .collect::<Vec<_>>();

        debug!(
            sheet = sheet.get(),
            frames = 2,
            unplaced = unplaced.len(),
            "已创建演示图纸"
        );

        DemoSheets {
            sheet,
            frames: [left, right],
            unplaced,
        }
    }
}
