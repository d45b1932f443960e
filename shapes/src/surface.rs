//! Map surface seam: projection, click listeners, and capture sessions.
//!
//! The real map (tiles, projection, DOM events) lives outside this crate and
//! is reached through [`MapSurface`]. A [`CaptureSession`] is the single-owner
//! handle on one registered click listener; whoever holds it receives clicks,
//! and it must be handed back through [`CaptureSession::release`] on every
//! exit path.
//!
//! [`Viewport`] is a linear reference surface (a pan/zoom camera in degrees)
//! used by tests and headless hosts.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::collections::BTreeSet;

use crate::model::Position;

/// A point in screen space, in CSS pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Handle of one registered click listener on a map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// A primary click delivered by the surface to one listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    pub listener: ListenerId,
    pub screen: ScreenPoint,
}

/// The map rendering surface, as far as authoring and navigation need it.
pub trait MapSurface {
    /// Translate a screen pixel into a geographic coordinate.
    fn unproject(&self, screen: ScreenPoint) -> Position;

    /// Register a click listener and return its handle.
    fn add_click_listener(&mut self) -> ListenerId;

    /// Deregister a listener. Unknown handles are ignored.
    fn remove_click_listener(&mut self, id: ListenerId);

    /// Move the view so `position` is centered.
    fn center_on(&mut self, position: Position);
}

/// Exclusive ownership of one click listener for the duration of an authoring session.
#[derive(Debug)]
pub struct CaptureSession {
    listener: Option<ListenerId>,
}

impl CaptureSession {
    /// Register a listener on `surface` and take ownership of it.
    #[must_use]
    pub fn acquire(surface: &mut dyn MapSurface) -> Self {
        let id = surface.add_click_listener();
        tracing::debug!(listener = id.0, "capture session acquired");
        Self { listener: Some(id) }
    }

    #[must_use]
    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    /// Whether `event` was delivered to this session's listener.
    #[must_use]
    pub fn owns(&self, event: &ClickEvent) -> bool {
        self.listener == Some(event.listener)
    }

    /// Deregister the listener from `surface`, ending the session.
    pub fn release(mut self, surface: &mut dyn MapSurface) {
        if let Some(id) = self.listener.take() {
            surface.remove_click_listener(id);
            tracing::debug!(listener = id.0, "capture session released");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(id) = self.listener {
            tracing::warn!(listener = id.0, "capture session dropped without release; click listener leaked");
        }
    }
}

/// Linear pan/zoom surface: a fixed number of degrees per screen pixel.
///
/// Longitude grows to the right and latitude grows upward. Clicks are
/// dispatched to every registered listener, mirroring a browser event bus.
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Geographic coordinate at the center of the viewport.
    pub center: Position,
    /// Degrees of latitude and longitude covered by one CSS pixel.
    pub degrees_per_px: f64,
    /// Viewport width in CSS pixels.
    pub width: f64,
    /// Viewport height in CSS pixels.
    pub height: f64,
    listeners: BTreeSet<ListenerId>,
    next_listener: u64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Position::default(), 0.0001, 1024.0, 768.0)
    }
}

impl Viewport {
    #[must_use]
    pub fn new(center: Position, degrees_per_px: f64, width: f64, height: f64) -> Self {
        Self { center, degrees_per_px, width, height, listeners: BTreeSet::new(), next_listener: 1 }
    }

    /// Convert a geographic coordinate to screen pixels.
    #[must_use]
    pub fn project(&self, position: Position) -> ScreenPoint {
        ScreenPoint {
            x: (position.longitude - self.center.longitude) / self.degrees_per_px + self.width / 2.0,
            y: (self.center.latitude - position.latitude) / self.degrees_per_px + self.height / 2.0,
        }
    }

    /// Simulate a primary click: one event per registered listener.
    #[must_use]
    pub fn click(&self, screen: ScreenPoint) -> Vec<ClickEvent> {
        self.listeners
            .iter()
            .map(|&listener| ClickEvent { listener, screen })
            .collect()
    }

    /// Number of click listeners currently registered.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl MapSurface for Viewport {
    fn unproject(&self, screen: ScreenPoint) -> Position {
        Position {
            latitude: self.center.latitude - (screen.y - self.height / 2.0) * self.degrees_per_px,
            longitude: self.center.longitude + (screen.x - self.width / 2.0) * self.degrees_per_px,
        }
    }

    fn add_click_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id);
        id
    }

    fn remove_click_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn center_on(&mut self, position: Position) {
        self.center = position;
    }
}
