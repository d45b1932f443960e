//! Interaction over rendered shapes: info popups and the edit/delete menu.
//!
//! The layer owns no shapes. It receives hit-target clicks from the host,
//! tracks which popup or menu is open, and returns [`Action`]s for the host
//! to execute (re-render, open an editor, call the store's delete).

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use crate::geometry::centroid;
use crate::model::{Position, Shape, ShapeId};
use crate::surface::ScreenPoint;

/// Mouse button of a hit-target click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or long press).
    Secondary,
}

/// Side effects requested by the layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RenderNeeded,
    EditRequested(ShapeId),
    DeleteRequested(ShapeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Edit,
    Delete,
}

/// An open context menu anchored at the click position.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub shape_id: ShapeId,
    pub screen: ScreenPoint,
}

/// Info popup content for the shape whose hit target was clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub shape_id: ShapeId,
    pub name: String,
    pub description: String,
    pub at: Position,
}

#[derive(Debug, Default)]
pub struct ShapeLayer {
    popup: Option<ShapeId>,
    menu: Option<ContextMenu>,
}

impl ShapeLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on a shape's hit target.
    ///
    /// Primary toggles the popup; secondary opens the menu. The preview is
    /// not interactive.
    pub fn on_hit(&mut self, id: &ShapeId, button: Button, screen: ScreenPoint) -> Vec<Action> {
        if id.is_preview() {
            return Vec::new();
        }
        match button {
            Button::Primary => {
                self.menu = None;
                self.popup = if self.popup.as_ref() == Some(id) { None } else { Some(id.clone()) };
            }
            Button::Secondary => {
                self.menu = Some(ContextMenu { shape_id: id.clone(), screen });
            }
            Button::Middle => return Vec::new(),
        }
        vec![Action::RenderNeeded]
    }

    /// Resolve the open context menu.
    pub fn choose(&mut self, choice: MenuChoice) -> Vec<Action> {
        let Some(menu) = self.menu.take() else {
            return Vec::new();
        };
        tracing::debug!(id = %menu.shape_id, ?choice, "context menu choice");
        let requested = match choice {
            MenuChoice::Edit => Action::EditRequested(menu.shape_id),
            MenuChoice::Delete => Action::DeleteRequested(menu.shape_id),
        };
        vec![requested, Action::RenderNeeded]
    }

    /// Close any open popup or menu (click on empty map, Escape).
    #[must_use]
    pub fn dismiss(&mut self) -> Vec<Action> {
        if self.popup.is_none() && self.menu.is_none() {
            return Vec::new();
        }
        self.popup = None;
        self.menu = None;
        vec![Action::RenderNeeded]
    }

    #[must_use]
    pub fn menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    /// Content of the open popup, resolved against the current collection.
    #[must_use]
    pub fn popup(&self, shapes: &[Shape]) -> Option<Popup> {
        let id = self.popup.as_ref()?;
        let shape = shapes.iter().find(|s| &s.id == id)?;
        Some(Popup {
            shape_id: shape.id.clone(),
            name: shape.name.clone(),
            description: shape.description.clone(),
            at: centroid(&shape.geometry),
        })
    }

    /// Drop popup or menu state for shapes no longer in the collection.
    #[must_use]
    pub fn retain(&mut self, shapes: &[Shape]) -> Vec<Action> {
        let exists = |id: &ShapeId| shapes.iter().any(|s| &s.id == id);
        let mut changed = false;
        if self.popup.as_ref().is_some_and(|id| !exists(id)) {
            self.popup = None;
            changed = true;
        }
        if self.menu.as_ref().is_some_and(|m| !exists(&m.shape_id)) {
            self.menu = None;
            changed = true;
        }
        if changed { vec![Action::RenderNeeded] } else { Vec::new() }
    }
}
