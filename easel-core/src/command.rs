//! The draw command vocabulary guests emit and hosts replay.

use crate::color::Color;

/// A single drawing command, as received from the guest.
///
/// Commands form an ordered display list: a `Clear` wipes whatever came
/// before it, and later `Line`s paint over earlier ones. Replaying the same
/// list onto the same surface always produces the same pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface with a color, or with the sink's background
    /// color when none is given.
    Clear {
        /// Explicit fill color, if the guest supplied one.
        color: Option<Color>,
    },

    /// Draw a straight line segment between two points, in surface
    /// coordinates.
    Line {
        /// X coordinate of the first endpoint.
        x1: f64,
        /// Y coordinate of the first endpoint.
        y1: f64,
        /// X coordinate of the second endpoint.
        x2: f64,
        /// Y coordinate of the second endpoint.
        y2: f64,
        /// Explicit stroke color, if the guest supplied one.
        color: Option<Color>,
    },
}

/// Receiver for guest draw commands.
///
/// The host invokes these callbacks synchronously, in the exact order the
/// guest emitted them, while a guest entrypoint is still on the stack.
/// Implementations decide what a missing color means; the themed
/// [`Painter`](crate::surface::Painter) substitutes its theme colors.
pub trait DrawSink {
    /// Clear the drawing area.
    fn clear(&mut self, color: Option<Color>);

    /// Draw a line segment from `(x1, y1)` to `(x2, y2)`.
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Option<Color>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_compare_by_value() {
        let a = DrawCommand::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
            color: None,
        };
        let b = DrawCommand::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
            color: None,
        };
        assert_eq!(a, b);

        let c = DrawCommand::Clear {
            color: Some(Color::WHITE),
        };
        assert_ne!(a, c);
    }
}
