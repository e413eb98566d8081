use sheetframe_core::geometry::Point;
use sheetframe_core::model::{Frame, FrameId, SheetId, SheetInfo};
use tracing::{info, warn};

use crate::errors::EngineError;
use crate::grouping::{Group, group_items_by_frames_with_tolerance};
use crate::host::SheetHost;
use crate::naming::{unique_name, unique_number};
use crate::relocation::{RelocationOptions, RelocationOutcome, relocate_group};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SplitOptions {
    pub relocation: RelocationOptions,
    /// 分组时的相交容差（图纸单位）。
    pub tolerance: f64,
}

/// 拆分出的一张新图纸。
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSplit {
    pub source_frame: FrameId,
    pub sheet: SheetInfo,
    pub frame: Frame,
    pub outcomes: Vec<RelocationOutcome>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitReport {
    /// 留在原图纸上的第一组。
    pub kept: Option<Group>,
    pub created: Vec<SheetSplit>,
}

impl SplitReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &RelocationOutcome> {
        self.created.iter().flat_map(|split| split.outcomes.iter())
    }

    pub fn relocated_count(&self) -> usize {
        self.outcomes().filter(|outcome| outcome.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes().filter(|outcome| !outcome.is_ok()).count()
    }

    pub fn total(&self) -> usize {
        self.outcomes().count()
    }
}

/// 把一张含多个图框的图纸拆成每个图框一张。
///
/// 第一组保留在原图纸；其余每组新建一张图纸（名称与编号按原图纸消歧），
/// 在原点放置同规格图框并迁移组内视口，最后删除被取代的原图框。
/// 创建图纸或图框失败时返回错误，由调用方回滚。
pub fn split_sheet<H>(
    host: &mut H,
    sheet: SheetId,
    options: &SplitOptions,
) -> Result<SplitReport, EngineError>
where
    H: SheetHost + ?Sized,
{
    let source = host
        .sheet_info(sheet)
        .ok_or(EngineError::SheetNotFound(sheet.get()))?;
    let frames = host.frames_on_sheet(sheet);
    let items = host.items_on_sheet(sheet);
    let mut groups =
        group_items_by_frames_with_tolerance(&frames, &items, options.tolerance).into_iter();

    let mut report = SplitReport {
        kept: groups.next(),
        created: Vec::new(),
    };

    for group in groups {
        let source_anchor = group
            .frame
            .anchor
            .ok_or(EngineError::FrameWithoutAnchor(group.frame.id.get()))?;
        let name = unique_name(&source.name, &host.existing_sheet_names());
        let number = unique_number(&source.number, &host.existing_sheet_numbers());
        let new_sheet = host.create_sheet(&name, &number)?;

        let anchor = if options.relocation.anchor_to_target {
            source_anchor
        } else {
            Point::ORIGIN
        };
        let frame = host.place_frame(&group.frame, new_sheet, anchor)?;
        let outcomes = relocate_group(host, &group, &frame, options.relocation);
        host.delete_frame(group.frame.id)?;

        let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
        if failed > 0 {
            warn!(sheet = %name, failed, "部分视口未能迁移到新图纸");
        }
        info!(
            sheet = %name,
            number = %number,
            items = outcomes.len(),
            "已拆分出新图纸"
        );

        report.created.push(SheetSplit {
            source_frame: group.frame.id,
            sheet: SheetInfo {
                id: new_sheet,
                name,
                number,
            },
            frame,
            outcomes,
        });
    }

    Ok(report)
}
