use glam::DVec2;

/// A high-level action produced by whatever UI drives the stage.
///
/// Key events carry the character of the key; only the digits `1`-`6` mean
/// anything to the facing latch, everything else is ignored there.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Move the camera by a delta in scene pixels.
    Pan(DVec2),
    /// Pointer pressed at a viewport pixel.
    PointerDown(DVec2),
    KeyDown(char),
    KeyUp(char),
    /// The inventory selected a block type for placement.
    SelectBlockType(String),
    /// Undo the last block edit.
    Undo,
    /// Redo the last undone edit.
    Redo,
    /// No-op (used for input that hasn't been bound yet).
    Noop,
}

impl Action {
    /// Whether this action can change world or scene state.
    pub fn is_edit(&self) -> bool {
        matches!(self, Self::PointerDown(_) | Self::Undo | Self::Redo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_and_history_are_edits() {
        assert!(Action::PointerDown(DVec2::new(10.0, 20.0)).is_edit());
        assert!(Action::Undo.is_edit());
        assert!(Action::Redo.is_edit());
    }

    #[test]
    fn navigation_and_keys_are_not_edits() {
        assert!(!Action::Pan(DVec2::X).is_edit());
        assert!(!Action::KeyDown('1').is_edit());
        assert!(!Action::SelectBlockType("stone".into()).is_edit());
        assert!(!Action::Noop.is_edit());
    }
}
