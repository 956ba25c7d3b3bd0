use tilescape_common::{Block, BlockPos};

/// Whether an edit added or cleared a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Place,
    Remove,
}

/// A block write that can be applied to the world and reversed.
///
/// Carries the replaced value so it can undo itself.
#[derive(Debug, Clone, PartialEq)]
pub struct EditCommand {
    pub pos: BlockPos,
    pub old: Block,
    pub new: Block,
}

impl EditCommand {
    pub fn kind(&self) -> EditKind {
        if self.new.is_empty() {
            EditKind::Remove
        } else {
            EditKind::Place
        }
    }

    /// Produce the inverse command (for undo).
    pub fn inverse(&self) -> Self {
        Self {
            pos: self.pos,
            old: self.new.clone(),
            new: self.old.clone(),
        }
    }
}

/// Undo/redo bookkeeping for block edits.
///
/// Only records commands; applying them is up to the caller, which must
/// commit the world write before recording.
#[derive(Debug, Default)]
pub struct Editor {
    undo_stack: Vec<EditCommand>,
    redo_stack: Vec<EditCommand>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed edit. Clears the redo stack.
    pub fn record(&mut self, cmd: EditCommand) {
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
    }

    /// Pop the command to revert. The caller applies its inverse and then
    /// hands it back through [`Editor::undone`].
    pub fn take_undo(&mut self) -> Option<EditCommand> {
        self.undo_stack.pop()
    }

    pub fn undone(&mut self, cmd: EditCommand) {
        self.redo_stack.push(cmd);
    }

    /// Pop the command to re-apply. The caller applies it and then hands it
    /// back through [`Editor::redone`].
    pub fn take_redo(&mut self) -> Option<EditCommand> {
        self.redo_stack.pop()
    }

    pub fn redone(&mut self, cmd: EditCommand) {
        self.undo_stack.push(cmd);
    }

    /// Put a command back on the stack it was taken from after a failed
    /// application.
    pub fn restore_undo(&mut self, cmd: EditCommand) {
        self.undo_stack.push(cmd);
    }

    pub fn restore_redo(&mut self, cmd: EditCommand) {
        self.redo_stack.push(cmd);
    }

    /// Number of operations on the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of operations on the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place() -> EditCommand {
        EditCommand {
            pos: BlockPos::new(1, 2, 3),
            old: Block::Empty,
            new: Block::material("stone"),
        }
    }

    #[test]
    fn kind_follows_new_value() {
        assert_eq!(place().kind(), EditKind::Place);
        assert_eq!(place().inverse().kind(), EditKind::Remove);
    }

    #[test]
    fn inverse_swaps_values() {
        let cmd = place();
        let inv = cmd.inverse();
        assert_eq!(inv.pos, cmd.pos);
        assert_eq!(inv.old, cmd.new);
        assert_eq!(inv.new, cmd.old);
        assert_eq!(inv.inverse(), cmd);
    }

    #[test]
    fn undo_then_redo_moves_between_stacks() {
        let mut editor = Editor::new();
        editor.record(place());
        assert!(editor.can_undo());

        let cmd = editor.take_undo().unwrap();
        editor.undone(cmd);
        assert_eq!(editor.undo_count(), 0);
        assert_eq!(editor.redo_count(), 1);

        let cmd = editor.take_redo().unwrap();
        editor.redone(cmd);
        assert_eq!(editor.undo_count(), 1);
        assert!(!editor.can_redo());
    }

    #[test]
    fn redo_cleared_on_new_edit() {
        let mut editor = Editor::new();
        editor.record(place());
        let cmd = editor.take_undo().unwrap();
        editor.undone(cmd);
        assert!(editor.can_redo());

        editor.record(place());
        assert!(!editor.can_redo());
    }

    #[test]
    fn empty_stacks_yield_nothing() {
        let mut editor = Editor::new();
        assert!(editor.take_undo().is_none());
        assert!(editor.take_redo().is_none());
    }
}
