//! Test doubles for exercising guests and hosts without a real surface.

use crate::color::Color;
use crate::command::{DrawCommand, DrawSink};

/// A [`DrawSink`] that records commands instead of rasterizing them.
///
/// Useful for asserting on exactly what a guest emitted, in order.
///
/// # Example
///
/// ```
/// use easel_core::testing::RecordingSink;
/// use easel_core::{DrawCommand, DrawSink};
///
/// let mut sink = RecordingSink::new();
/// sink.clear(None);
/// sink.draw_line(0.0, 0.0, 10.0, 10.0, None);
///
/// assert_eq!(sink.commands().len(), 2);
/// assert_eq!(sink.line_count(), 1);
/// assert!(matches!(sink.commands()[0], DrawCommand::Clear { .. }));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSink {
    commands: Vec<DrawCommand>,
}

impl RecordingSink {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded commands, in arrival order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of recorded `Clear` commands.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear { .. }))
            .count()
    }

    /// Number of recorded `Line` commands.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    /// Drain the recorded commands, leaving the recorder empty for the
    /// next replay.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl DrawSink for RecordingSink {
    fn clear(&mut self, color: Option<Color>) {
        self.commands.push(DrawCommand::Clear { color });
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Option<Color>) {
        self.commands.push(DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}
