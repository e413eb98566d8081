use sheetframe_core::geometry::{Outline, Point, Vector};
use sheetframe_core::model::{Frame, Item, PlacedItem};
use tracing::{debug, warn};

use crate::errors::HostError;
use crate::grouping::Group;
use crate::host::SheetHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelocationOptions {
    /// 为 `true` 时新中心再加上目标图框锚点；默认假设两图框共用局部原点。
    pub anchor_to_target: bool,
    /// 重建视口后恢复原标签相对视口中心的偏移。
    pub preserve_label_offset: bool,
}

impl Default for RelocationOptions {
    fn default() -> Self {
        Self {
            anchor_to_target: false,
            preserve_label_offset: true,
        }
    }
}

/// 单个视口的迁移结果。
#[derive(Debug, Clone, PartialEq)]
pub struct RelocationOutcome {
    pub item: Item,
    pub result: Result<PlacedItem, HostError>,
}

impl RelocationOutcome {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// 以视口范围的右上角记录其相对源图框锚点的位置，再换算成新的中心点。
pub fn relocated_center(
    outline: &Outline,
    source_anchor: Point,
    target_anchor: Option<Point>,
) -> Point {
    let relative = outline.maximum() - source_anchor.flatten();
    let half = Vector::planar(outline.width() * 0.5, outline.height() * 0.5);
    let center = (relative - half).to_point();
    match target_anchor {
        Some(anchor) => center.translate(anchor.flatten() - Point::ORIGIN),
        None => center,
    }
}

/// 把组内所有视口从源图框迁移到 `target` 所在图纸，保持相对锚点的位置与标签偏移。
///
/// 每个视口独立处理：删除原放置后在目标图纸重建；删除或重建失败记录在结果中，
/// 继续处理下一个视口。重建后标签偏移恢复失败只记警告，结果仍算迁移成功。
/// 源图框没有锚点时返回空结果。
pub fn relocate_group<H>(
    host: &mut H,
    group: &Group,
    target: &Frame,
    options: RelocationOptions,
) -> Vec<RelocationOutcome>
where
    H: SheetHost + ?Sized,
{
    let Some(source_anchor) = group.frame.anchor else {
        warn!(frame = group.frame.id.get(), "源图框没有锚点，跳过迁移");
        return Vec::new();
    };
    let target_anchor = if options.anchor_to_target {
        Some(target.anchor.unwrap_or(Point::ORIGIN))
    } else {
        None
    };

    group
        .items
        .iter()
        .map(|item| {
            let result =
                relocate_item(&mut *host, item, source_anchor, target_anchor, target, options);
            if let Err(err) = &result {
                warn!(
                    view = item.view.get(),
                    target_sheet = target.sheet.get(),
                    error = %err,
                    "视口迁移失败"
                );
            }
            RelocationOutcome {
                item: item.clone(),
                result,
            }
        })
        .collect()
}

fn relocate_item<H>(
    host: &mut H,
    item: &Item,
    source_anchor: Point,
    target_anchor: Option<Point>,
    target: &Frame,
    options: RelocationOptions,
) -> Result<PlacedItem, HostError>
where
    H: SheetHost + ?Sized,
{
    let outline = host
        .placement_outline(item.placement)
        .unwrap_or(item.outline);
    let label_offset = host
        .label_outline(item.placement)
        .or(item.label_outline)
        .map(|label| label.center() - outline.center());
    let center = relocated_center(&outline, source_anchor, target_anchor);

    host.delete_placement(item.placement)?;

    if !host.can_place(item.view, target.sheet) {
        return Err(HostError::PlacementRefused {
            view: item.view.get(),
            sheet: target.sheet.get(),
        });
    }
    let placement = host.create_placement(item.view, target.sheet, center, item.style)?;
    // 视口已在目标图纸上；标签偏移恢复失败不改变迁移结果。
    if options.preserve_label_offset {
        if let Some(offset) = label_offset {
            if let Err(err) = host.set_label_offset(placement, offset) {
                warn!(
                    view = item.view.get(),
                    placement = placement.get(),
                    error = %err,
                    "标签偏移未能恢复"
                );
            }
        }
    }

    debug!(
        view = item.view.get(),
        from = item.placement.get(),
        to = placement.get(),
        x = center.x(),
        y = center.y(),
        "视口已迁移"
    );

    Ok(PlacedItem {
        view: item.view,
        placement,
        sheet: target.sheet,
        center,
        outline: host.placement_outline(placement),
    })
}
