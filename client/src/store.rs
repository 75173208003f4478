use syncsketch_shared::{Stroke, StrokeId};

/// Strokes keyed by id, kept in insertion order. Iteration order is paint
/// order: later strokes cover earlier ones.
#[derive(Clone, Debug, Default)]
pub struct StrokeStore {
    strokes: Vec<Stroke>,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `stroke`, or swaps it in at the existing slot when its id is
    /// already present. Returns the stroke it replaced.
    pub fn put(&mut self, stroke: Stroke) -> Option<Stroke> {
        match self.position(&stroke.id) {
            Some(index) => Some(std::mem::replace(&mut self.strokes[index], stroke)),
            None => {
                self.strokes.push(stroke);
                None
            }
        }
    }

    pub fn get(&self, id: &StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|stroke| &stroke.id == id)
    }

    pub fn get_mut(&mut self, id: &StrokeId) -> Option<&mut Stroke> {
        self.strokes.iter_mut().find(|stroke| &stroke.id == id)
    }

    pub fn contains(&self, id: &StrokeId) -> bool {
        self.position(id).is_some()
    }

    pub fn delete(&mut self, id: &StrokeId) -> Option<Stroke> {
        let index = self.position(id)?;
        Some(self.strokes.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stroke> {
        self.strokes.iter()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Drops everything and loads `strokes` in order.
    pub fn replace_all(&mut self, strokes: Vec<Stroke>) {
        self.strokes.clear();
        for stroke in strokes {
            self.put(stroke);
        }
    }

    fn position(&self, id: &StrokeId) -> Option<usize> {
        self.strokes.iter().position(|stroke| &stroke.id == id)
    }
}

impl<'a> IntoIterator for &'a StrokeStore {
    type Item = &'a Stroke;
    type IntoIter = std::slice::Iter<'a, Stroke>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
