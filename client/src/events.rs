use syncsketch_shared::{Color, StrokeId, UserId};

/// Surfaces the presentation layer composites, bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Main,
    Preview,
    Overlay,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
    /// The coordinating service assigned this participant an identity.
    Joined { user_id: UserId, color: Color },
    /// Pixels of `Layer` changed and should be presented again.
    LayerChanged(Layer),
    StrokeCommitted(StrokeId),
    StrokeRemoved(StrokeId),
    /// The store was replaced wholesale by a history snapshot.
    HistoryReplaced { strokes: usize },
}

/// Receives notifications about what the canvas did.
pub trait EventSink {
    fn emit(&mut self, event: CanvasEvent);
}

impl EventSink for Vec<CanvasEvent> {
    fn emit(&mut self, event: CanvasEvent) {
        self.push(event);
    }
}

impl EventSink for () {
    fn emit(&mut self, _event: CanvasEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: CanvasEvent) {
        (**self).emit(event);
    }
}
