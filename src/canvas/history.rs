use crate::shape::model::Shape;
use crate::shape::surface::DrawSurface;

/// Committed shapes in insertion order: insertion order is both z-order and undo order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DrawHistory {
    shapes: Vec<Shape>,
}

impl DrawHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Remove and return the most recently appended shape.
    pub fn pop(&mut self) -> Option<Shape> {
        self.shapes.pop()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shape> {
        self.shapes.iter()
    }

    /// Draw every shape, bottom to top.
    pub fn render_all<S: DrawSurface + ?Sized>(&self, surface: &mut S, line_width: f64) {
        for shape in &self.shapes {
            shape.render(surface, line_width);
        }
    }

    /// Copy of the history with every shape remapped by `(sx, sy)`.
    pub fn scaled(&self, sx: f64, sy: f64) -> DrawHistory {
        self.shapes.iter().map(|s| s.scale(sx, sy)).collect()
    }
}

impl FromIterator<Shape> for DrawHistory {
    fn from_iter<I: IntoIterator<Item = Shape>>(iter: I) -> Self {
        Self {
            shapes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DrawHistory {
    type Item = &'a Shape;
    type IntoIter = std::slice::Iter<'a, Shape>;

    fn into_iter(self) -> Self::IntoIter {
        self.shapes.iter()
    }
}
