use std::f64::consts::TAU;

use sheetframe_core::geometry::{Outline, Point, outline_from_corners, rotate_around_point};
use sheetframe_core::model::Frame;

const ROTATION_EPSILON: f64 = 1e-12;

/// 旋转角（按 2π 取模后）是否可视为零。
pub fn is_unrotated(rotation: f64) -> bool {
    let normalized = rotation.rem_euclid(TAU);
    normalized <= ROTATION_EPSILON || TAU - normalized <= ROTATION_EPSILON
}

/// 图框局部坐标系下的四个角点：锚点为右下角。
pub fn local_corners(frame: &Frame) -> [Point; 4] {
    [
        Point::planar(0.0, 0.0),
        Point::planar(-frame.width, 0.0),
        Point::planar(-frame.width, frame.height),
        Point::planar(0.0, frame.height),
    ]
}

/// 图框四角在图纸坐标系下的位置（已平移并绕锚点旋转）。
pub fn world_corners(frame: &Frame) -> Option<[Point; 4]> {
    let anchor = frame.anchor?.flatten();
    Some(local_corners(frame).map(|corner| {
        let translated = Point::planar(anchor.x() + corner.x(), anchor.y() + corner.y());
        rotate_around_point(translated, anchor, frame.rotation)
    }))
}

/// 计算图框的轴对齐范围。
///
/// 旋转为零时直接按闭式求解，避免三角函数误差；否则取旋转后四角的 AABB，
/// 这是旋转矩形的保守外包框而不是矩形本身。没有锚点的图框返回 `None`。
pub fn resolve_frame_outline(frame: &Frame) -> Option<Outline> {
    let anchor = frame.anchor?;
    if is_unrotated(frame.rotation) {
        return Some(Outline::new(
            Point::planar(anchor.x() - frame.width, anchor.y()),
            Point::planar(anchor.x(), anchor.y() + frame.height),
        ));
    }
    outline_from_corners(world_corners(frame)?)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_6};

    use sheetframe_core::model::{FrameId, SheetId};

    use super::*;

    fn frame(anchor: Option<Point>, width: f64, height: f64, rotation: f64) -> Frame {
        Frame {
            id: FrameId::new(1),
            sheet: SheetId::new(0),
            anchor,
            width,
            height,
            rotation,
            family: "A1".to_string(),
        }
    }

    #[test]
    fn unrotated_frame_uses_closed_form() {
        let anchor = Point::planar(0.1, 0.7);
        for rotation in [0.0, TAU, -TAU] {
            let outline = resolve_frame_outline(&frame(Some(anchor), 0.3, 0.2, rotation))
                .expect("outline");
            assert_eq!(outline.minimum(), Point::planar(0.1 - 0.3, 0.7));
            assert_eq!(outline.maximum(), Point::planar(0.1, 0.7 + 0.2));
        }
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let outline = resolve_frame_outline(&frame(
            Some(Point::planar(10.0, 5.0)),
            4.0,
            2.0,
            FRAC_PI_2,
        ))
        .expect("outline");
        assert!((outline.minimum().x() - 8.0).abs() < 1e-9);
        assert!((outline.minimum().y() - 1.0).abs() < 1e-9);
        assert!((outline.maximum().x() - 10.0).abs() < 1e-9);
        assert!((outline.maximum().y() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn rotated_corners_round_trip() {
        let source = frame(Some(Point::planar(3.0, -2.0)), 5.0, 3.5, FRAC_PI_6);
        let anchor = Point::planar(3.0, -2.0);
        let rotated = world_corners(&source).expect("corners");
        for (corner, local) in rotated.iter().zip(local_corners(&source)) {
            let back = rotate_around_point(*corner, anchor, -FRAC_PI_6);
            assert!((back.x() - (anchor.x() + local.x())).abs() < 1e-9);
            assert!((back.y() - (anchor.y() + local.y())).abs() < 1e-9);
        }

        let outline = resolve_frame_outline(&source).expect("outline");
        for corner in rotated {
            assert!(outline.contains_point(corner));
        }
    }

    #[test]
    fn frame_without_anchor_has_no_outline() {
        assert!(resolve_frame_outline(&frame(None, 1.0, 1.0, 0.0)).is_none());
        assert!(world_corners(&frame(None, 1.0, 1.0, 0.4)).is_none());
    }
}
