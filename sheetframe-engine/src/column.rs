use sheetframe_core::geometry::{Outline, Point, Vector};
use sheetframe_core::model::{PlacedItem, PlacementId, SheetId, ViewId};
use tracing::{debug, warn};

use crate::errors::HostError;
use crate::host::SheetHost;

/// 纵向排列参数：左边缘对齐列、首行顶边与行间距（均为图纸单位）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    pub alignment_x: f64,
    pub start_y: f64,
    pub spacing: f64,
}

impl ColumnLayout {
    pub fn new(alignment_x: f64, start_y: f64, spacing: f64) -> Self {
        Self {
            alignment_x,
            start_y,
            spacing: spacing.max(0.0),
        }
    }

    /// 以 `start` 为首行左上角。
    pub fn at(start: Point, spacing: f64) -> Self {
        Self::new(start.x(), start.y(), spacing)
    }

    /// 在已有内容右侧开新列：对齐列 = 最右边缘 + `margin`，首行 = 最顶边缘。
    /// 图纸为空时从原点开始。
    pub fn beside<I>(existing: I, margin: f64, spacing: f64) -> Self
    where
        I: IntoIterator<Item = Outline>,
    {
        let combined = existing
            .into_iter()
            .reduce(|acc, outline| acc.union(&outline));
        match combined {
            Some(bounds) => Self::new(
                bounds.maximum().x() + margin,
                bounds.maximum().y(),
                spacing,
            ),
            None => Self::new(0.0, 0.0, spacing),
        }
    }
}

/// 第一阶段：视口已在试探位置创建，但真实范围尚未读取。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TentativePlacement {
    view: ViewId,
    sheet: SheetId,
    placement: PlacementId,
    position: Point,
}

impl TentativePlacement {
    pub fn create<H>(
        host: &mut H,
        view: ViewId,
        sheet: SheetId,
        position: Point,
    ) -> Result<Self, HostError>
    where
        H: SheetHost + ?Sized,
    {
        if !host.can_place(view, sheet) {
            return Err(HostError::PlacementRefused {
                view: view.get(),
                sheet: sheet.get(),
            });
        }
        let placement = host.create_placement(view, sheet, position, None)?;
        Ok(Self {
            view,
            sheet,
            placement,
            position,
        })
    }

    #[inline]
    pub fn placement(&self) -> PlacementId {
        self.placement
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn measure<H>(self, host: &H) -> Result<MeasuredPlacement, HostError>
    where
        H: SheetHost + ?Sized,
    {
        let outline = host
            .placement_outline(self.placement)
            .ok_or(HostError::OutlineUnavailable(self.placement.get()))?;
        Ok(MeasuredPlacement {
            tentative: self,
            outline,
        })
    }
}

/// 第二阶段：已读取宿主排版后的真实范围。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredPlacement {
    tentative: TentativePlacement,
    outline: Outline,
}

impl MeasuredPlacement {
    #[inline]
    pub fn outline(&self) -> Outline {
        self.outline
    }

    #[inline]
    pub fn placement(&self) -> PlacementId {
        self.tentative.placement
    }

    /// 第三阶段：移动视口，使左边缘落在 `alignment_x`、顶边落在 `top_y`。
    pub fn finalize<H>(
        self,
        host: &mut H,
        alignment_x: f64,
        top_y: f64,
    ) -> Result<PlacedItem, HostError>
    where
        H: SheetHost + ?Sized,
    {
        let offset = Vector::planar(
            alignment_x - self.outline.minimum().x(),
            top_y - self.outline.maximum().y(),
        );
        let center = self.outline.center().translate(offset);
        host.recenter(self.tentative.placement, center)?;
        Ok(PlacedItem {
            view: self.tentative.view,
            placement: self.tentative.placement,
            sheet: self.tentative.sheet,
            center,
            outline: Some(self.outline.translate(offset)),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnReport {
    pub placed: Vec<PlacedItem>,
    pub skipped: Vec<(ViewId, HostError)>,
}

impl ColumnReport {
    #[inline]
    pub fn total(&self) -> usize {
        self.placed.len() + self.skipped.len()
    }
}

/// 将视图自上而下排成一列，行间保持 `spacing` 的间隙。
///
/// 每个视图先在 `(0, currentY)` 试探创建，再读取真实范围并移动到对齐位置；
/// 被宿主拒绝或中途失败的视图记录在 `skipped` 中，不推进当前行。
pub fn place_column<H>(
    host: &mut H,
    sheet: SheetId,
    views: &[ViewId],
    layout: &ColumnLayout,
) -> ColumnReport
where
    H: SheetHost + ?Sized,
{
    let mut report = ColumnReport::default();
    let mut current_y = layout.start_y;

    for &view in views {
        match place_in_column(host, view, sheet, layout.alignment_x, current_y) {
            Ok((placed, height)) => {
                debug!(
                    view = view.get(),
                    x = placed.center.x(),
                    y = placed.center.y(),
                    height,
                    "视口已排入列"
                );
                current_y -= height + layout.spacing;
                report.placed.push(placed);
            }
            Err(err) => {
                warn!(view = view.get(), error = %err, "视口无法排入列，已跳过");
                report.skipped.push((view, err));
            }
        }
    }

    report
}

/// 走完一行的三个阶段；创建之后任一步失败都会撤掉试探视口，不在图纸上留下残留。
fn place_in_column<H>(
    host: &mut H,
    view: ViewId,
    sheet: SheetId,
    alignment_x: f64,
    top_y: f64,
) -> Result<(PlacedItem, f64), HostError>
where
    H: SheetHost + ?Sized,
{
    let tentative = TentativePlacement::create(host, view, sheet, Point::planar(0.0, top_y))?;
    let placement = tentative.placement();
    let result = tentative.measure(&*host).and_then(|measured| {
        let height = measured.outline().height();
        measured
            .finalize(&mut *host, alignment_x, top_y)
            .map(|placed| (placed, height))
    });
    if result.is_err() {
        if let Err(err) = host.delete_placement(placement) {
            warn!(placement = placement.get(), error = %err, "无法撤回试探视口");
        }
    }
    result
}
