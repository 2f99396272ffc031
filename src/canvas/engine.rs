use crate::canvas::history::DrawHistory;
use crate::foundation::core::Point;
use crate::shape::model::{Shape, ShapeColor, segment_path};
use crate::shape::surface::{DrawSurface, StrokeStyle};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// Active drawing tool.
pub enum Tool {
    /// Drag from centre to rim.
    #[default]
    Circle,
    /// Drag from start to end.
    Line,
    /// Three taps: start, via-point, end.
    Polyline,
}

#[derive(Clone, Debug, PartialEq)]
enum Gesture {
    Idle,
    Drag { anchor: Point, color: ShapeColor },
    Taps { points: Vec<Point>, color: ShapeColor },
}

/// What a polyline tap did.
#[derive(Clone, Debug, PartialEq)]
pub enum TapOutcome {
    /// The active tool does not take taps.
    Ignored,
    /// First point recorded.
    Started,
    /// Second point recorded; the first segment was drawn as feedback.
    FirstSegment,
    /// Third point recorded; the shape was committed to history.
    Completed(Shape),
}

/// Interactive capture state machine for one annotation session.
///
/// Owns the surface it draws on and the [`DrawHistory`]. Committed shapes are never mutated;
/// removing one replays the remaining history on a cleared surface.
pub struct AnnotationCanvas<S: DrawSurface> {
    surface: S,
    tool: Tool,
    color: ShapeColor,
    history: DrawHistory,
    gesture: Gesture,
    line_width: f64,
}

impl<S: DrawSurface> AnnotationCanvas<S> {
    pub fn new(surface: S, line_width: f64) -> Self {
        Self {
            surface,
            tool: Tool::default(),
            color: ShapeColor::default(),
            history: DrawHistory::new(),
            gesture: Gesture::Idle,
            line_width,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> ShapeColor {
        self.color
    }

    pub fn history(&self) -> &DrawHistory {
        &self.history
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Points of the gesture in progress (anchor for drags, taps for polylines).
    pub fn pending_points(&self) -> &[Point] {
        match &self.gesture {
            Gesture::Idle => &[],
            Gesture::Drag { anchor, .. } => std::slice::from_ref(anchor),
            Gesture::Taps { points, .. } => points,
        }
    }

    /// Switch tools. A different tool cancels the gesture in progress.
    pub fn select_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            self.cancel_gesture();
            self.tool = tool;
        }
    }

    /// Pen colour for the next gesture; a gesture keeps the colour it started with.
    pub fn select_color(&mut self, color: ShapeColor) {
        self.color = color;
    }

    pub fn pointer_down(&mut self, at: Point) {
        match self.tool {
            Tool::Circle | Tool::Line => {
                self.gesture = Gesture::Drag {
                    anchor: at,
                    color: self.color,
                };
            }
            Tool::Polyline => {
                tracing::debug!("pointer_down ignored: polyline is tap-driven");
            }
        }
    }

    /// Finish a drag. Returns the committed shape, or `None` when no drag was in progress.
    pub fn pointer_up(&mut self, at: Point) -> Option<Shape> {
        let Gesture::Drag { anchor, color } = self.gesture else {
            return None;
        };
        self.gesture = Gesture::Idle;
        let shape = drag_shape(self.tool, anchor, at, color)?;
        self.commit(shape);
        Some(shape)
    }

    /// Feed one polyline tap.
    pub fn tap(&mut self, at: Point) -> TapOutcome {
        if self.tool != Tool::Polyline {
            return TapOutcome::Ignored;
        }

        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Taps { mut points, color } if points.len() == 2 => {
                self.stroke_segment(points[1], at, color);
                points.push(at);
                let shape = Shape::Polyline {
                    points: [points[0], points[1], points[2]],
                    color,
                };
                self.history.push(shape);
                tracing::debug!(shapes = self.history.len(), "polyline committed");
                TapOutcome::Completed(shape)
            }
            Gesture::Taps { mut points, color } if points.len() == 1 => {
                self.stroke_segment(points[0], at, color);
                points.push(at);
                self.gesture = Gesture::Taps { points, color };
                TapOutcome::FirstSegment
            }
            _ => {
                self.gesture = Gesture::Taps {
                    points: vec![at],
                    color: self.color,
                };
                TapOutcome::Started
            }
        }
    }

    /// Shape the current gesture would produce if it ended at `at`.
    pub fn preview(&self, at: Point) -> Option<Shape> {
        match &self.gesture {
            Gesture::Idle => None,
            Gesture::Drag { anchor, color } => drag_shape(self.tool, *anchor, at, *color),
            Gesture::Taps { points, color } => match points.as_slice() {
                [start] => Some(Shape::Line {
                    start: *start,
                    end: at,
                    color: *color,
                }),
                [start, via] => Some(Shape::Polyline {
                    points: [*start, *via, at],
                    color: *color,
                }),
                _ => None,
            },
        }
    }

    /// Drop the gesture in progress, erasing any feedback it drew.
    pub fn cancel_gesture(&mut self) {
        let had_feedback = matches!(&self.gesture, Gesture::Taps { points, .. } if points.len() > 1);
        self.gesture = Gesture::Idle;
        if had_feedback {
            self.redraw();
        }
    }

    /// Remove the most recent shape and replay the rest from a cleared surface.
    ///
    /// Any gesture in progress is dropped as well, since the replay erases its feedback.
    pub fn undo_last(&mut self) -> Option<Shape> {
        self.gesture = Gesture::Idle;
        let popped = self.history.pop();
        self.redraw();
        popped
    }

    pub fn clear_all(&mut self) {
        self.history.clear();
        self.gesture = Gesture::Idle;
        self.surface.clear();
    }

    /// Consume the session, keeping only what survives it.
    pub fn into_parts(self) -> (S, DrawHistory) {
        (self.surface, self.history)
    }

    fn commit(&mut self, shape: Shape) {
        shape.render(&mut self.surface, self.line_width);
        self.history.push(shape);
        tracing::debug!(shapes = self.history.len(), "shape committed");
    }

    fn stroke_segment(&mut self, a: Point, b: Point, color: ShapeColor) {
        self.surface
            .stroke_path(&segment_path(a, b), StrokeStyle::new(color, self.line_width));
    }

    fn redraw(&mut self) {
        self.surface.clear();
        self.history.render_all(&mut self.surface, self.line_width);
    }
}

fn drag_shape(tool: Tool, anchor: Point, release: Point, color: ShapeColor) -> Option<Shape> {
    match tool {
        Tool::Circle => Some(Shape::Circle {
            center: anchor,
            radius: anchor.distance(release),
            color,
        }),
        Tool::Line => Some(Shape::Line {
            start: anchor,
            end: release,
            color,
        }),
        Tool::Polyline => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/engine.rs"]
mod tests;
