use super::*;
use crate::foundation::core::SurfaceSize;
use crate::foundation::core::Rect;
use crate::shape::surface::{RecordingSurface, SurfaceCall};

fn canvas() -> AnnotationCanvas<RecordingSurface> {
    AnnotationCanvas::new(RecordingSurface::new(SurfaceSize::new(640, 360)), 3.0)
}

#[test]
fn circle_drag_commits_radius_from_anchor_distance() {
    let mut c = canvas();
    c.pointer_down(Point::new(100.0, 100.0));
    let shape = c.pointer_up(Point::new(103.0, 104.0)).unwrap();
    assert_eq!(
        shape,
        Shape::Circle {
            center: Point::new(100.0, 100.0),
            radius: 5.0,
            color: ShapeColor::Red,
        }
    );
    assert_eq!(c.history().len(), 1);
    assert_eq!(c.surface().visible_strokes(), 1);
}

#[test]
fn zero_length_drag_still_commits() {
    let mut c = canvas();
    c.select_tool(Tool::Line);
    c.pointer_down(Point::new(5.0, 5.0));
    let shape = c.pointer_up(Point::new(5.0, 5.0)).unwrap();
    assert!(matches!(shape, Shape::Line { start, end, .. } if start == end));
}

#[test]
fn pointer_up_without_anchor_is_ignored() {
    let mut c = canvas();
    assert!(c.pointer_up(Point::new(1.0, 1.0)).is_none());
    assert!(c.history().is_empty());
}

#[test]
fn polyline_needs_three_taps() {
    let mut c = canvas();
    c.select_tool(Tool::Polyline);
    c.select_color(ShapeColor::Blue);
    assert_eq!(c.tap(Point::new(0.0, 0.0)), TapOutcome::Started);
    assert_eq!(c.tap(Point::new(10.0, 0.0)), TapOutcome::FirstSegment);
    assert!(c.history().is_empty());
    assert_eq!(c.surface().visible_strokes(), 1);

    let TapOutcome::Completed(shape) = c.tap(Point::new(10.0, 10.0)) else {
        panic!("third tap should complete the polyline");
    };
    assert_eq!(shape.color(), ShapeColor::Blue);
    assert_eq!(c.history().len(), 1);
    assert!(c.pending_points().is_empty());
}

#[test]
fn taps_are_ignored_by_drag_tools() {
    let mut c = canvas();
    assert_eq!(c.tap(Point::new(1.0, 1.0)), TapOutcome::Ignored);
    assert!(c.pending_points().is_empty());
}

#[test]
fn colour_is_captured_at_gesture_start() {
    let mut c = canvas();
    c.pointer_down(Point::new(1.0, 1.0));
    c.select_color(ShapeColor::Yellow);
    let shape = c.pointer_up(Point::new(2.0, 2.0)).unwrap();
    assert_eq!(shape.color(), ShapeColor::Red);
}

#[test]
fn switching_tool_cancels_partial_polyline_and_erases_feedback() {
    let mut c = canvas();
    c.pointer_down(Point::new(50.0, 50.0));
    c.pointer_up(Point::new(60.0, 50.0));
    c.select_tool(Tool::Polyline);
    c.tap(Point::new(0.0, 0.0));
    c.tap(Point::new(5.0, 5.0));
    assert_eq!(c.surface().visible_strokes(), 2);

    c.select_tool(Tool::Line);
    assert!(c.pending_points().is_empty());
    assert_eq!(c.surface().visible_strokes(), 1);
    assert_eq!(c.history().len(), 1);
}

#[test]
fn undo_replays_remaining_history_in_order() {
    let mut c = canvas();
    for x in [10.0, 20.0, 30.0] {
        c.pointer_down(Point::new(x, x));
        c.pointer_up(Point::new(x + 5.0, x));
    }
    let removed = c.undo_last().unwrap();
    assert!(matches!(removed, Shape::Circle { center, .. } if center.x == 30.0));
    assert_eq!(c.history().len(), 2);
    assert_eq!(c.surface().calls().last(), Some(&SurfaceCall::Stroke {
        elements: c.history().shapes()[1].to_path().elements().len(),
        style: StrokeStyle::new(ShapeColor::Red, 3.0),
    }));
    assert_eq!(c.surface().visible_strokes(), 2);
}

#[test]
fn undo_on_empty_history_is_a_noop() {
    let mut c = canvas();
    assert!(c.undo_last().is_none());
    assert!(c.history().is_empty());
}

#[test]
fn clear_all_wipes_history_and_surface() {
    let mut c = canvas();
    c.pointer_down(Point::new(1.0, 1.0));
    c.pointer_up(Point::new(9.0, 1.0));
    c.clear_all();
    assert!(c.history().is_empty());
    assert_eq!(c.surface().visible_strokes(), 0);
}

#[test]
fn preview_follows_the_pending_gesture() {
    let mut c = canvas();
    assert!(c.preview(Point::ZERO).is_none());
    c.select_tool(Tool::Line);
    c.pointer_down(Point::new(1.0, 2.0));
    assert_eq!(
        c.preview(Point::new(3.0, 4.0)),
        Some(Shape::Line {
            start: Point::new(1.0, 2.0),
            end: Point::new(3.0, 4.0),
            color: ShapeColor::Red,
        })
    );
    // Preview never commits.
    assert!(c.history().is_empty());
}

#[test]
fn history_scaling_maps_every_shape() {
    let history: DrawHistory = [
        Shape::Line {
            start: Point::new(1.0, 1.0),
            end: Point::new(2.0, 2.0),
            color: ShapeColor::Red,
        },
        Shape::Circle {
            center: Point::new(4.0, 4.0),
            radius: 1.0,
            color: ShapeColor::Blue,
        },
    ]
    .into_iter()
    .collect();
    let scaled = history.scaled(2.0, 2.0);
    assert_eq!(scaled.len(), 2);
    assert_eq!(scaled.shapes()[1].bounds(), Rect::new(6.0, 6.0, 10.0, 10.0));
}
