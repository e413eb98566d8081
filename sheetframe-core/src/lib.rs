pub mod geometry {
    use std::ops::{Add, Neg, Sub};

    use glam::{DMat3, DVec3};
    use serde::{Deserialize, Serialize};

    /// 图纸平面上的点，内部以 `glam::DVec3` 表示；2D 计算中 z 恒为 0。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point(pub DVec3);

    impl Point {
        pub const ORIGIN: Point = Point(DVec3::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        /// 构造 z = 0 的平面点。
        #[inline]
        pub fn planar(x: f64, y: f64) -> Self {
            Self(DVec3::new(x, y, 0.0))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn translate(self, offset: Vector) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn vector_to(self, other: Point) -> Vector {
            Vector(other.0 - self.0)
        }

        /// 投影到 z = 0 平面。
        #[inline]
        pub fn flatten(self) -> Self {
            Self(DVec3::new(self.0.x, self.0.y, 0.0))
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }
    }

    impl From<DVec3> for Point {
        fn from(value: DVec3) -> Self {
            Self(value)
        }
    }

    impl Sub for Point {
        type Output = Vector;

        fn sub(self, rhs: Point) -> Vector {
            Vector(self.0 - rhs.0)
        }
    }

    /// 平面位移向量，用于相对图框锚点的偏移与标签偏移。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector(pub DVec3);

    impl Vector {
        pub const ZERO: Vector = Vector(DVec3::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        #[inline]
        pub fn planar(x: f64, y: f64) -> Self {
            Self(DVec3::new(x, y, 0.0))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        /// 把向量当作位置（相对原点）。
        #[inline]
        pub fn to_point(self) -> Point {
            Point(self.0)
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }
    }

    impl From<DVec3> for Vector {
        fn from(value: DVec3) -> Self {
            Self(value)
        }
    }

    impl Add for Vector {
        type Output = Vector;

        fn add(self, rhs: Vector) -> Vector {
            Vector(self.0 + rhs.0)
        }
    }

    impl Sub for Vector {
        type Output = Vector;

        fn sub(self, rhs: Vector) -> Vector {
            Vector(self.0 - rhs.0)
        }
    }

    impl Neg for Vector {
        type Output = Vector;

        fn neg(self) -> Vector {
            Vector(-self.0)
        }
    }

    /// 轴对齐包围盒（AABB），保证 `minimum <= maximum`，z 固定为 0。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    #[serde(from = "OutlineCorners")]
    pub struct Outline {
        minimum: Point,
        maximum: Point,
    }

    /// 反序列化时的原始角点，经 `Outline::new` 整理后才成为 `Outline`。
    #[derive(Deserialize)]
    struct OutlineCorners {
        minimum: Point,
        maximum: Point,
    }

    impl From<OutlineCorners> for Outline {
        fn from(corners: OutlineCorners) -> Self {
            Outline::new(corners.minimum, corners.maximum)
        }
    }

    impl Outline {
        /// 由任意两个对角点构造，自动整理最小/最大值。
        pub fn new(a: Point, b: Point) -> Self {
            let min = a.0.min(b.0);
            let max = a.0.max(b.0);
            Self {
                minimum: Point::planar(min.x, min.y),
                maximum: Point::planar(max.x, max.y),
            }
        }

        /// 以中心点和宽高构造。
        pub fn from_center(center: Point, width: f64, height: f64) -> Self {
            let half = Vector::planar(width.abs() * 0.5, height.abs() * 0.5);
            Self::new(center.translate(-half), center.translate(half))
        }

        #[inline]
        pub fn minimum(&self) -> Point {
            self.minimum
        }

        #[inline]
        pub fn maximum(&self) -> Point {
            self.maximum
        }

        #[inline]
        pub fn center(&self) -> Point {
            Point((self.minimum.0 + self.maximum.0) * 0.5)
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.maximum.x() - self.minimum.x()
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.maximum.y() - self.minimum.y()
        }

        #[inline]
        pub fn translate(&self, offset: Vector) -> Self {
            Self {
                minimum: self.minimum.translate(offset).flatten(),
                maximum: self.maximum.translate(offset).flatten(),
            }
        }

        /// 闭区间包含测试。
        pub fn contains_point(&self, point: Point) -> bool {
            point.x() >= self.minimum.x()
                && point.x() <= self.maximum.x()
                && point.y() >= self.minimum.y()
                && point.y() <= self.maximum.y()
        }

        pub fn intersects(&self, other: &Outline, tolerance: f64) -> bool {
            intersects(self, other, tolerance)
        }

        /// 合并另一个包围盒，返回覆盖两者的最小 AABB。
        pub fn union(&self, other: &Outline) -> Self {
            Self::new(
                Point(self.minimum.0.min(other.minimum.0)),
                Point(self.maximum.0.max(other.maximum.0)),
            )
        }
    }

    /// 计算覆盖所有点的最小包围盒；输入为空时返回 `None`。
    pub fn outline_from_corners<I>(points: I) -> Option<Outline>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?.flatten();
        let (min, max) = iter.fold((first.0, first.0), |(min, max), point| {
            (min.min(point.0), max.max(point.0))
        });
        Some(Outline::new(Point(min), Point(max)))
    }

    /// 两个包围盒在两轴上的投影（放宽 `tolerance`）都重叠即视为相交，接触也算相交。
    pub fn intersects(a: &Outline, b: &Outline, tolerance: f64) -> bool {
        let tol = tolerance.max(0.0);
        a.minimum.x() <= b.maximum.x() + tol
            && b.minimum.x() <= a.maximum.x() + tol
            && a.minimum.y() <= b.maximum.y() + tol
            && b.minimum.y() <= a.maximum.y() + tol
    }

    pub fn center_inside(inner: &Outline, outer: &Outline) -> bool {
        outer.contains_point(inner.center())
    }

    /// 绕 `pivot` 在 XY 平面内旋转（弧度，逆时针为正），z 保持不变。
    pub fn rotate_around_point(point: Point, pivot: Point, angle: f64) -> Point {
        let local = DVec3::new(point.x() - pivot.x(), point.y() - pivot.y(), 0.0);
        let rotated = DMat3::from_rotation_z(angle) * local;
        Point::new(pivot.x() + rotated.x, pivot.y() + rotated.y, point.z())
    }

}

pub mod units {
    use serde::{Deserialize, Serialize};

    /// 1 图纸单位（英尺当量）对应的展示单位（毫米）数量。
    pub const PRESENTATION_UNITS_PER_DRAWING_UNIT: f64 = 304.8;

    /// 展示单位与图纸单位之间的线性换算。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct UnitScale {
        presentation_per_unit: f64,
    }

    impl UnitScale {
        /// 非正或非有限的比例会退化为默认值。
        pub fn new(presentation_per_unit: f64) -> Self {
            if presentation_per_unit.is_finite() && presentation_per_unit > 0.0 {
                Self {
                    presentation_per_unit,
                }
            } else {
                Self::default()
            }
        }

        #[inline]
        pub fn presentation_per_unit(self) -> f64 {
            self.presentation_per_unit
        }

        #[inline]
        pub fn to_drawing(self, presentation: f64) -> f64 {
            presentation / self.presentation_per_unit
        }

        #[inline]
        pub fn to_presentation(self, drawing: f64) -> f64 {
            drawing * self.presentation_per_unit
        }
    }

    impl Default for UnitScale {
        fn default() -> Self {
            Self {
                presentation_per_unit: PRESENTATION_UNITS_PER_DRAWING_UNIT,
            }
        }
    }

}

pub mod model {
    use serde::{Deserialize, Serialize};

    use crate::geometry::{Outline, Point, Vector};

    macro_rules! id_type {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            pub struct $name(u64);

            impl $name {
                #[inline]
                pub fn new(raw: u64) -> Self {
                    Self(raw)
                }

                #[inline]
                pub fn get(self) -> u64 {
                    self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        };
    }

    id_type!(
        /// 图纸标识。
        SheetId
    );
    id_type!(
        /// 图框（标题栏）实例标识。
        FrameId
    );
    id_type!(
        /// 视图目录中的视图标识，与具体放置无关。
        ViewId
    );
    id_type!(
        /// 视图在某张图纸上的一次放置（视口）。
        PlacementId
    );
    id_type!(StyleId);

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SheetInfo {
        pub id: SheetId,
        pub name: String,
        pub number: String,
    }

    /// 矩形图框。锚点在局部坐标系中是右下角，旋转绕锚点进行。
    ///
    /// `anchor` 为 `None` 表示图框并非基于点放置，无法求得范围，分组时会被忽略。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Frame {
        pub id: FrameId,
        pub sheet: SheetId,
        pub anchor: Option<Point>,
        pub width: f64,
        pub height: f64,
        pub rotation: f64,
        #[serde(default)]
        pub family: String,
    }

    /// 已放置在图纸上的视图快照：包含视口范围与可选的标题标签范围。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Item {
        pub placement: PlacementId,
        pub view: ViewId,
        pub sheet: SheetId,
        pub outline: Outline,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label_outline: Option<Outline>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub style: Option<StyleId>,
    }

    impl Item {
        /// 标签中心相对视口中心的偏移。
        pub fn label_offset(&self) -> Option<Vector> {
            self.label_outline
                .map(|label| label.center() - self.outline.center())
        }
    }

    /// 放置结果：视图及其在图纸上的最终位置。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PlacedItem {
        pub view: ViewId,
        pub placement: PlacementId,
        pub sheet: SheetId,
        pub center: Point,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub outline: Option<Outline>,
    }
}

pub mod document {
    use std::collections::HashSet;

    use serde::{Deserialize, Serialize};

    use crate::geometry::{Outline, Point, Vector};
    use crate::model::{
        Frame, FrameId, Item, PlacementId, SheetId, SheetInfo, StyleId, ViewId,
    };

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ViewKind {
        /// 普通视图，整个文档中只能放置一次。
        Drawing,
        /// 图例，可放置在多张图纸上，但每张图纸最多一次。
        Legend,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct LabelSize {
        pub width: f64,
        pub height: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ViewDefinition {
        pub id: ViewId,
        pub name: String,
        pub kind: ViewKind,
        pub width: f64,
        pub height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label: Option<LabelSize>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Placement {
        pub id: PlacementId,
        pub view: ViewId,
        pub sheet: SheetId,
        pub center: Point,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub style: Option<StyleId>,
        /// 显式设置的标签中心偏移；为空时使用默认位置（视口正下方）。
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label_offset: Option<Vector>,
    }

    /// 内存中的图纸文档：图纸、图框、视图目录与视口放置。
    ///
    /// 所有集合均保持插入顺序，保证分组与布局结果可复现。
    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SheetDocument {
        sheets: Vec<SheetInfo>,
        frames: Vec<Frame>,
        views: Vec<ViewDefinition>,
        placements: Vec<Placement>,
        next_id: u64,
    }

    impl SheetDocument {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_sheet(&mut self, name: impl Into<String>, number: impl Into<String>) -> SheetId {
            let id = SheetId::new(self.next_raw_id());
            self.sheets.push(SheetInfo {
                id,
                name: name.into(),
                number: number.into(),
            });
            id
        }

        pub fn add_view(
            &mut self,
            name: impl Into<String>,
            kind: ViewKind,
            width: f64,
            height: f64,
            label: Option<LabelSize>,
        ) -> ViewId {
            let id = ViewId::new(self.next_raw_id());
            self.views.push(ViewDefinition {
                id,
                name: name.into(),
                kind,
                width: width.abs(),
                height: height.abs(),
                label,
            });
            id
        }

        pub fn add_frame(
            &mut self,
            sheet: SheetId,
            anchor: Option<Point>,
            width: f64,
            height: f64,
            rotation: f64,
            family: impl Into<String>,
        ) -> FrameId {
            let id = FrameId::new(self.next_raw_id());
            self.frames.push(Frame {
                id,
                sheet,
                anchor,
                width,
                height,
                rotation,
                family: family.into(),
            });
            id
        }

        /// 以 `center` 为视口中心放置视图；宿主拒绝时返回 `None`。
        pub fn place_view(
            &mut self,
            view: ViewId,
            sheet: SheetId,
            center: Point,
            style: Option<StyleId>,
        ) -> Option<PlacementId> {
            if !self.can_place(view, sheet) {
                return None;
            }
            let id = PlacementId::new(self.next_raw_id());
            self.placements.push(Placement {
                id,
                view,
                sheet,
                center: center.flatten(),
                style,
                label_offset: None,
            });
            Some(id)
        }

        pub fn can_place(&self, view: ViewId, sheet: SheetId) -> bool {
            if self.sheet(sheet).is_none() {
                return false;
            }
            let Some(definition) = self.view(view) else {
                return false;
            };
            let mut existing = self.placements.iter().filter(|p| p.view == view);
            match definition.kind {
                ViewKind::Drawing => existing.next().is_none(),
                ViewKind::Legend => existing.all(|p| p.sheet != sheet),
            }
        }

        pub fn sheet(&self, id: SheetId) -> Option<&SheetInfo> {
            self.sheets.iter().find(|sheet| sheet.id == id)
        }

        pub fn sheets(&self) -> impl Iterator<Item = &SheetInfo> {
            self.sheets.iter()
        }

        pub fn view(&self, id: ViewId) -> Option<&ViewDefinition> {
            self.views.iter().find(|view| view.id == id)
        }

        pub fn views(&self) -> impl Iterator<Item = &ViewDefinition> {
            self.views.iter()
        }

        /// 尚未放置到任何图纸上的视图（图例除外，它们总可以再次放置）。
        pub fn unplaced_views(&self) -> impl Iterator<Item = &ViewDefinition> {
            self.views.iter().filter(|view| {
                view.kind == ViewKind::Drawing
                    && !self.placements.iter().any(|p| p.view == view.id)
            })
        }

        pub fn frame(&self, id: FrameId) -> Option<&Frame> {
            self.frames.iter().find(|frame| frame.id == id)
        }

        pub fn frames_on(&self, sheet: SheetId) -> impl Iterator<Item = &Frame> {
            self.frames.iter().filter(move |frame| frame.sheet == sheet)
        }

        pub fn remove_frame(&mut self, id: FrameId) -> Option<Frame> {
            let index = self.frames.iter().position(|frame| frame.id == id)?;
            Some(self.frames.remove(index))
        }

        pub fn placement(&self, id: PlacementId) -> Option<&Placement> {
            self.placements.iter().find(|p| p.id == id)
        }

        pub fn placements(&self) -> impl Iterator<Item = &Placement> {
            self.placements.iter()
        }

        pub fn remove_placement(&mut self, id: PlacementId) -> Option<Placement> {
            let index = self.placements.iter().position(|p| p.id == id)?;
            Some(self.placements.remove(index))
        }

        /// 修改视口中心，返回是否找到该放置。
        pub fn set_placement_center(&mut self, id: PlacementId, center: Point) -> bool {
            match self.placements.iter_mut().find(|p| p.id == id) {
                Some(placement) => {
                    placement.center = center.flatten();
                    true
                }
                None => false,
            }
        }

        pub fn set_label_offset(&mut self, id: PlacementId, offset: Vector) -> bool {
            match self.placements.iter_mut().find(|p| p.id == id) {
                Some(placement) => {
                    placement.label_offset = Some(offset);
                    true
                }
                None => false,
            }
        }

        pub fn placement_outline(&self, id: PlacementId) -> Option<Outline> {
            let placement = self.placement(id)?;
            let view = self.view(placement.view)?;
            Some(Outline::from_center(
                placement.center,
                view.width,
                view.height,
            ))
        }

        /// 标签默认位于视口正下方并与其相接。
        pub fn label_outline(&self, id: PlacementId) -> Option<Outline> {
            let placement = self.placement(id)?;
            let view = self.view(placement.view)?;
            let label = view.label?;
            let offset = placement.label_offset.unwrap_or_else(|| {
                Vector::planar(0.0, -(view.height * 0.5 + label.height * 0.5))
            });
            Some(Outline::from_center(
                placement.center.translate(offset),
                label.width,
                label.height,
            ))
        }

        /// 以文档顺序列出图纸上的视口快照。
        pub fn items_on(&self, sheet: SheetId) -> Vec<Item> {
            self.placements
                .iter()
                .filter(|p| p.sheet == sheet)
                .filter_map(|p| {
                    Some(Item {
                        placement: p.id,
                        view: p.view,
                        sheet: p.sheet,
                        outline: self.placement_outline(p.id)?,
                        label_outline: self.label_outline(p.id),
                        style: p.style,
                    })
                })
                .collect()
        }

        pub fn sheet_names(&self) -> HashSet<String> {
            self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
        }

        pub fn sheet_numbers(&self) -> HashSet<String> {
            self.sheets.iter().map(|sheet| sheet.number.clone()).collect()
        }

        fn next_raw_id(&mut self) -> u64 {
            let id = self.next_id;
            self.next_id += 1;
            id
        }
    }

}
