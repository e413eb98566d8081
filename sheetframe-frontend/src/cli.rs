use std::fmt;
use std::path::Path;

use sheetframe_core::document::SheetDocument;
use sheetframe_core::geometry::Point;
use sheetframe_core::model::{SheetInfo, ViewId};
use sheetframe_engine::column::{ColumnLayout, ColumnReport};
use sheetframe_engine::errors::EngineError;
use sheetframe_engine::split::SplitReport;
use sheetframe_io::{DocumentSaver, JsonSnapshot};
use tracing::{info, warn};

use crate::errors::FrontendError;
use crate::loader::{DocumentSource, EngineSettings, LoadedScene};

/// 一张多图框图纸的拆分结果。
#[derive(Debug)]
pub struct SheetRun {
    pub sheet: SheetInfo,
    pub frames: usize,
    pub result: Result<SplitReport, EngineError>,
}

/// 未放置视图的排列结果。
#[derive(Debug)]
pub struct ColumnRun {
    pub sheet: SheetInfo,
    pub views: Vec<ViewId>,
    pub result: Result<ColumnReport, EngineError>,
}

/// CLI 一次运行的全部结果，以及处理后的文档。
#[derive(Debug)]
pub struct CliSummary {
    pub source: DocumentSource,
    pub splits: Vec<SheetRun>,
    pub column: Option<ColumnRun>,
    pub document: SheetDocument,
}

/// 拆分所有含多个图框的图纸，再把未放置的视图排在第一张图纸已有内容的右侧。
///
/// 每一步都在独立事务中执行，某张图纸失败不会影响其它图纸。
pub fn run(loaded: LoadedScene, settings: &EngineSettings) -> Result<CliSummary, FrontendError> {
    let LoadedScene {
        mut scene,
        source,
        demo,
    } = loaded;
    if let Some(demo) = &demo {
        info!(
            sheet = demo.sheet.get(),
            unplaced = demo.unplaced.len(),
            "使用内置示例图纸"
        );
    }
    let sheets: Vec<SheetInfo> = scene.document().sheets().cloned().collect();
    let Some(first) = sheets.first().cloned() else {
        return Err(FrontendError::EmptyDocument);
    };

    let mut splits = Vec::new();
    for sheet in sheets {
        let frames = scene.document().frames_on(sheet.id).count();
        if frames < 2 {
            continue;
        }
        let result = scene.split_sheet(sheet.id, &settings.split, settings.policy);
        match &result {
            Ok(report) => info!(
                sheet = %sheet.name,
                created = report.created.len(),
                relocated = report.relocated_count(),
                "图纸拆分完成"
            ),
            Err(err) => warn!(sheet = %sheet.name, error = %err, "图纸拆分失败，已回滚"),
        }
        splits.push(SheetRun {
            sheet,
            frames,
            result,
        });
    }

    let views: Vec<ViewId> = scene.document().unplaced_views().map(|view| view.id).collect();
    let column = if views.is_empty() {
        None
    } else {
        let layout = ColumnLayout::beside(
            scene.sheet_content(first.id),
            settings.margin,
            settings.spacing,
        );
        let result = scene.place_column(first.id, &views, &layout, settings.policy);
        match &result {
            Ok(report) => info!(
                sheet = %first.name,
                placed = report.placed.len(),
                skipped = report.skipped.len(),
                "未放置视图已排列"
            ),
            Err(err) => warn!(sheet = %first.name, error = %err, "排列视图失败，已回滚"),
        }
        Some(ColumnRun {
            sheet: first,
            views,
            result,
        })
    };

    Ok(CliSummary {
        source,
        splits,
        column,
        document: scene.into_document(),
    })
}

pub fn save_document(document: &SheetDocument, path: &Path) -> Result<(), FrontendError> {
    JsonSnapshot::pretty().save(document, path)?;
    Ok(())
}

/// 面向终端的中文报告。
impl fmt::Display for CliSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "图纸拆分与视口排列")?;
        match &self.source {
            DocumentSource::Snapshot(path) => writeln!(f, "已从快照加载文档：{}", path.display())?,
            DocumentSource::Demo => writeln!(f, "使用内置示例文档")?,
        }

        if self.splits.is_empty() {
            writeln!(f, "没有需要拆分的图纸。")?;
        }
        for run in &self.splits {
            writeln!(
                f,
                "图纸 {} {} ({} 个图框)：",
                run.sheet.number, run.sheet.name, run.frames
            )?;
            match &run.result {
                Ok(report) => self.write_split(f, report)?,
                Err(err) => writeln!(f, "  拆分失败：{err}")?,
            }
        }

        if let Some(run) = &self.column {
            writeln!(
                f,
                "在图纸 {} 上排列 {} 个未放置视图：",
                run.sheet.number,
                run.views.len()
            )?;
            match &run.result {
                Ok(report) => {
                    for placed in &report.placed {
                        writeln!(
                            f,
                            "  - {} 中心={}",
                            self.view_name(placed.view),
                            format_point(placed.center)
                        )?;
                    }
                    for (view, err) in &report.skipped {
                        writeln!(f, "  - {} 跳过：{err}", self.view_name(*view))?;
                    }
                }
                Err(err) => writeln!(f, "  排列失败：{err}")?,
            }
        }

        writeln!(f, "当前文档图纸：")?;
        for sheet in self.document.sheets() {
            writeln!(
                f,
                "  - {} {}：图框 {} 个，视口 {} 个",
                sheet.number,
                sheet.name,
                self.document.frames_on(sheet.id).count(),
                self.document.items_on(sheet.id).len()
            )?;
        }
        Ok(())
    }
}

impl CliSummary {
    fn write_split(&self, f: &mut fmt::Formatter<'_>, report: &SplitReport) -> fmt::Result {
        if let Some(kept) = &report.kept {
            writeln!(f, "  保留首个图框，含 {} 个视口", kept.items.len())?;
        }
        for split in &report.created {
            writeln!(
                f,
                "  新建图纸 {} {}，图框锚点 {}",
                split.sheet.number,
                split.sheet.name,
                format_point_option(split.frame.anchor)
            )?;
            for outcome in &split.outcomes {
                let name = self.view_name(outcome.item.view);
                match &outcome.result {
                    Ok(placed) => writeln!(f, "    - {name} -> {}", format_point(placed.center))?,
                    Err(err) => writeln!(f, "    - {name} 迁移失败：{err}")?,
                }
            }
        }
        Ok(())
    }

    fn view_name(&self, view: ViewId) -> String {
        self.document
            .view(view)
            .map(|definition| definition.name.clone())
            .unwrap_or_else(|| format!("#{}", view.get()))
    }
}

fn format_point(point: Point) -> String {
    format!("({:.2}, {:.2})", point.x(), point.y())
}

fn format_point_option(value: Option<Point>) -> String {
    value
        .map(format_point)
        .unwrap_or_else(|| "<无>".to_string())
}
