use std::collections::HashSet;

use sheetframe_core::document::SheetDocument;
use sheetframe_core::geometry::{Outline, Point, Vector};
use sheetframe_core::model::{
    Frame, FrameId, Item, PlacementId, SheetId, SheetInfo, StyleId, ViewId,
};

use crate::errors::HostError;

/// 宿主文档协作者：布局引擎通过它读取图纸内容并创建、移动、删除视口。
///
/// 引擎本身不做事务管理；调用方负责在一次逻辑操作结束后提交或回滚。
pub trait SheetHost {
    fn sheet_info(&self, sheet: SheetId) -> Option<SheetInfo>;

    fn frames_on_sheet(&self, sheet: SheetId) -> Vec<Frame>;

    fn items_on_sheet(&self, sheet: SheetId) -> Vec<Item>;

    fn can_place(&self, view: ViewId, sheet: SheetId) -> bool;

    /// 在 `point` 处创建视口（`point` 为视口中心）。
    fn create_placement(
        &mut self,
        view: ViewId,
        sheet: SheetId,
        point: Point,
        style: Option<StyleId>,
    ) -> Result<PlacementId, HostError>;

    fn delete_placement(&mut self, placement: PlacementId) -> Result<(), HostError>;

    fn recenter(&mut self, placement: PlacementId, center: Point) -> Result<(), HostError>;

    /// 设置标签中心相对视口中心的偏移。
    fn set_label_offset(
        &mut self,
        placement: PlacementId,
        offset: Vector,
    ) -> Result<(), HostError>;

    /// 读取已创建视口的真实范围；只有宿主完成排版后才可知。
    fn placement_outline(&self, placement: PlacementId) -> Option<Outline>;

    fn label_outline(&self, placement: PlacementId) -> Option<Outline>;

    fn existing_sheet_names(&self) -> HashSet<String>;

    fn existing_sheet_numbers(&self) -> HashSet<String>;

    fn create_sheet(&mut self, name: &str, number: &str) -> Result<SheetId, HostError>;

    /// 以 `template` 的尺寸、旋转和族名在目标图纸的 `anchor` 处放置新图框。
    fn place_frame(
        &mut self,
        template: &Frame,
        sheet: SheetId,
        anchor: Point,
    ) -> Result<Frame, HostError>;

    fn delete_frame(&mut self, frame: FrameId) -> Result<(), HostError>;
}

impl SheetHost for SheetDocument {
    fn sheet_info(&self, sheet: SheetId) -> Option<SheetInfo> {
        self.sheet(sheet).cloned()
    }

    fn frames_on_sheet(&self, sheet: SheetId) -> Vec<Frame> {
        self.frames_on(sheet).cloned().collect()
    }

    fn items_on_sheet(&self, sheet: SheetId) -> Vec<Item> {
        self.items_on(sheet)
    }

    fn can_place(&self, view: ViewId, sheet: SheetId) -> bool {
        SheetDocument::can_place(self, view, sheet)
    }

    fn create_placement(
        &mut self,
        view: ViewId,
        sheet: SheetId,
        point: Point,
        style: Option<StyleId>,
    ) -> Result<PlacementId, HostError> {
        self.place_view(view, sheet, point, style)
            .ok_or(HostError::PlacementRefused {
                view: view.get(),
                sheet: sheet.get(),
            })
    }

    fn delete_placement(&mut self, placement: PlacementId) -> Result<(), HostError> {
        self.remove_placement(placement)
            .map(|_| ())
            .ok_or(HostError::PlacementNotFound(placement.get()))
    }

    fn recenter(&mut self, placement: PlacementId, center: Point) -> Result<(), HostError> {
        if self.set_placement_center(placement, center) {
            Ok(())
        } else {
            Err(HostError::PlacementNotFound(placement.get()))
        }
    }

    fn set_label_offset(
        &mut self,
        placement: PlacementId,
        offset: Vector,
    ) -> Result<(), HostError> {
        if SheetDocument::set_label_offset(self, placement, offset) {
            Ok(())
        } else {
            Err(HostError::PlacementNotFound(placement.get()))
        }
    }

    fn placement_outline(&self, placement: PlacementId) -> Option<Outline> {
        SheetDocument::placement_outline(self, placement)
    }

    fn label_outline(&self, placement: PlacementId) -> Option<Outline> {
        SheetDocument::label_outline(self, placement)
    }

    fn existing_sheet_names(&self) -> HashSet<String> {
        self.sheet_names()
    }

    fn existing_sheet_numbers(&self) -> HashSet<String> {
        self.sheet_numbers()
    }

    fn create_sheet(&mut self, name: &str, number: &str) -> Result<SheetId, HostError> {
        Ok(self.add_sheet(name, number))
    }

    fn place_frame(
        &mut self,
        template: &Frame,
        sheet: SheetId,
        anchor: Point,
    ) -> Result<Frame, HostError> {
        if self.sheet(sheet).is_none() {
            return Err(HostError::SheetNotFound(sheet.get()));
        }
        let id = self.add_frame(
            sheet,
            Some(anchor),
            template.width,
            template.height,
            template.rotation,
            template.family.clone(),
        );
        self.frame(id)
            .cloned()
            .ok_or(HostError::FrameNotFound(id.get()))
    }

    fn delete_frame(&mut self, frame: FrameId) -> Result<(), HostError> {
        self.remove_frame(frame)
            .map(|_| ())
            .ok_or(HostError::FrameNotFound(frame.get()))
    }
}
