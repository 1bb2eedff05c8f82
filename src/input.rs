use crate::geometry::StrokePoint;
use egui::{Pos2, Vec2};

/// What kind of device produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
    Pen,
}

/// One pointer event as delivered by the hosting surface, in its display
/// coordinate space.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    /// Position in the host's display coordinates.
    pub client: Pos2,
    /// Reported pressure, if the device has any.
    pub pressure: Option<f32>,
    pub source: PointerSource,
}

/// Maps display coordinates onto the backing raster surface.
///
/// The displayed size can differ from the backing-store resolution on
/// high-density displays; the ratio between the two is the scale factor.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceView {
    /// Top-left corner of the displayed surface, in display coordinates.
    pub origin: Pos2,
    /// Displayed size, in display coordinates.
    pub displayed: Vec2,
    /// Backing-store resolution, in device pixels.
    pub device: Vec2,
}

impl SurfaceView {
    /// Converts a pointer event into a device-pixel stroke point.
    ///
    /// Events without pressure get a default: 0.5 for mice and pens that
    /// report nothing, 0.8 for touch. The result is clamped to the valid
    /// pressure range by [`StrokePoint::new`].
    pub fn to_device(&self, event: &PointerEvent) -> StrokePoint {
        let x = (event.client.x - self.origin.x) * self.device.x / self.displayed.x;
        let y = (event.client.y - self.origin.y) * self.device.y / self.displayed.y;
        let pressure = event.pressure.unwrap_or(match event.source {
            PointerSource::Touch => 0.8,
            PointerSource::Mouse | PointerSource::Pen => 0.5,
        });
        StrokePoint::new(x, y, pressure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> SurfaceView {
        SurfaceView {
            origin: Pos2::new(100.0, 50.0),
            displayed: Vec2::new(400.0, 300.0),
            device: Vec2::new(800.0, 600.0),
        }
    }

    #[test]
    fn converts_display_to_device_pixels() {
        let event = PointerEvent {
            client: Pos2::new(300.0, 200.0),
            pressure: Some(0.7),
            source: PointerSource::Pen,
        };
        let point = view().to_device(&event);
        // 2x backing-store scale on both axes.
        assert_eq!(point.pos, Pos2::new(400.0, 300.0));
        assert_eq!(point.pressure, 0.7);
    }

    #[test]
    fn pressure_defaults_depend_on_source() {
        let mut event = PointerEvent {
            client: Pos2::new(100.0, 50.0),
            pressure: None,
            source: PointerSource::Mouse,
        };
        assert_eq!(view().to_device(&event).pressure, 0.5);
        event.source = PointerSource::Touch;
        assert_eq!(view().to_device(&event).pressure, 0.8);
    }

    #[test]
    fn reported_pressure_is_clamped() {
        let event = PointerEvent {
            client: Pos2::new(100.0, 50.0),
            pressure: Some(3.0),
            source: PointerSource::Pen,
        };
        assert_eq!(view().to_device(&event).pressure, 1.0);
    }
}
