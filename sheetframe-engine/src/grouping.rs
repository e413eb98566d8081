use sheetframe_core::geometry::{Outline, center_inside, intersects};
use sheetframe_core::model::{Frame, Item};
use tracing::debug;

use crate::frame::resolve_frame_outline;

/// 一个图框及其在空间上拥有的视口（保持输入顺序）。
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub frame: Frame,
    pub outline: Outline,
    pub items: Vec<Item>,
}

impl Group {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn group_items_by_frames(frames: &[Frame], items: &[Item]) -> Vec<Group> {
    group_items_by_frames_with_tolerance(frames, items, 0.0)
}

/// 按图框对视口分组：视口与图框范围相交或其中心落在图框内即归属该图框。
///
/// 按图框输入顺序扫描，第一个命中的图框获胜；图框重叠时结果依赖顺序。
/// 不匹配任何图框的视口被静默丢弃，没有锚点的图框不参与分组。
pub fn group_items_by_frames_with_tolerance(
    frames: &[Frame],
    items: &[Item],
    tolerance: f64,
) -> Vec<Group> {
    let mut groups: Vec<Group> = frames
        .iter()
        .filter_map(|frame| {
            let outline = resolve_frame_outline(frame)?;
            Some(Group {
                frame: frame.clone(),
                outline,
                items: Vec::new(),
            })
        })
        .collect();

    let mut dropped = 0usize;
    for item in items {
        let owner = groups.iter_mut().find(|group| {
            intersects(&item.outline, &group.outline, tolerance)
                || center_inside(&item.outline, &group.outline)
        });
        match owner {
            Some(group) => group.items.push(item.clone()),
            None => dropped += 1,
        }
    }

    debug!(
        frames = frames.len(),
        groups = groups.len(),
        items = items.len(),
        dropped,
        "视口分组完成"
    );
    groups
}

#[cfg(test)]
mod tests {
    use sheetframe_core::geometry::Point;
    use sheetframe_core::model::{FrameId, PlacementId, SheetId, ViewId};

    use super::*;

    fn frame(id: u64, anchor: Option<Point>, width: f64, height: f64) -> Frame {
        Frame {
            id: FrameId::new(id),
            sheet: SheetId::new(0),
            anchor,
            width,
            height,
            rotation: 0.0,
            family: String::new(),
        }
    }

    fn item(id: u64, center: Point, width: f64, height: f64) -> Item {
        Item {
            placement: PlacementId::new(id),
            view: ViewId::new(id + 100),
            sheet: SheetId::new(0),
            outline: Outline::from_center(center, width, height),
            label_outline: None,
            style: None,
        }
    }

    fn ids(group: &Group) -> Vec<u64> {
        group.items.iter().map(|item| item.placement.get()).collect()
    }

    #[test]
    fn items_go_to_the_frame_that_contains_them() {
        let left = frame(1, Some(Point::planar(10.0, 0.0)), 10.0, 8.0);
        let right = frame(2, Some(Point::planar(25.0, 0.0)), 10.0, 8.0);
        let items = [
            item(1, Point::planar(5.0, 4.0), 2.0, 2.0),
            item(2, Point::planar(20.0, 4.0), 2.0, 2.0),
            item(3, Point::planar(3.0, 2.0), 1.0, 1.0),
            item(4, Point::planar(100.0, 100.0), 1.0, 1.0),
        ];

        for frames in [[left.clone(), right.clone()], [right.clone(), left.clone()]] {
            let groups = group_items_by_frames(&frames, &items);
            assert_eq!(groups.len(), 2);
            let by_id = |id: u64| {
                groups
                    .iter()
                    .find(|group| group.frame.id.get() == id)
                    .expect("group")
            };
            assert_eq!(ids(by_id(1)), vec![1, 3]);
            assert_eq!(ids(by_id(2)), vec![2]);
        }
    }

    #[test]
    fn overlapping_frames_are_first_match_wins() {
        let a = frame(1, Some(Point::planar(10.0, 0.0)), 10.0, 10.0);
        let b = frame(2, Some(Point::planar(15.0, 0.0)), 10.0, 10.0);
        let shared = [item(7, Point::planar(7.5, 5.0), 1.0, 1.0)];

        let groups = group_items_by_frames(&[a.clone(), b.clone()], &shared);
        assert_eq!(groups[0].frame.id, a.id);
        assert_eq!(ids(&groups[0]), vec![7]);
        assert!(groups[1].is_empty());

        let groups = group_items_by_frames(&[b.clone(), a.clone()], &shared);
        assert_eq!(groups[0].frame.id, b.id);
        assert_eq!(ids(&groups[0]), vec![7]);
        assert!(groups[1].is_empty());
    }

    #[test]
    fn grouping_is_idempotent_and_skips_unanchored_frames() {
        let frames = [
            frame(1, None, 10.0, 10.0),
            frame(2, Some(Point::planar(10.0, 0.0)), 10.0, 10.0),
        ];
        let items = [
            item(1, Point::planar(2.0, 2.0), 1.0, 1.0),
            item(2, Point::planar(8.0, 8.0), 1.0, 1.0),
        ];
        let first = group_items_by_frames(&frames, &items);
        let second = group_items_by_frames(&frames, &items);
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].frame.id.get(), 2);
        assert_eq!(ids(&first[0]), vec![1, 2]);
    }

    #[test]
    fn tolerance_widens_matching() {
        let frames = [frame(1, Some(Point::planar(10.0, 0.0)), 10.0, 10.0)];
        let near = [item(1, Point::planar(11.0, 5.0), 1.0, 1.0)];
        assert!(group_items_by_frames(&frames, &near)[0].is_empty());
        let groups = group_items_by_frames_with_tolerance(&frames, &near, 0.5);
        assert_eq!(ids(&groups[0]), vec![1]);
    }

    #[test]
    fn empty_inputs_give_empty_groups() {
        assert!(group_items_by_frames(&[], &[]).is_empty());
        let frames = [frame(1, Some(Point::ORIGIN), 1.0, 1.0)];
        let groups = group_items_by_frames(&frames, &[]);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_empty());
    }
}
