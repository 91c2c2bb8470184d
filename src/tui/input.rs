use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Represents the result of handling a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Swipe the current photo right
    Keep,
    /// Swipe the current photo left
    Yeet,
    /// Swipe the current photo up to see its details
    Details,
    /// Open the current photo in the system viewer
    Open,
    /// Review the yeeted photos
    Staged,
    /// Start the review from the first photo
    Restart,
    /// Move the selection down
    Next,
    /// Move the selection up
    Previous,
    /// Mark or unmark the selected yeeted photo to keep
    ToggleKeep,
    /// Restore the photos marked to keep
    KeepSelected,
    /// Delete the photos not marked to keep
    DeleteUnselected,
    /// Confirm permanent deletion
    ConfirmDelete,
    /// Cancel permanent deletion
    CancelDelete,
    /// Ask for gallery access again
    RequestPermission,
    /// Leave the current screen
    Back,
    /// Toggle help overlay
    Help,
    /// No action
    None,
}

/// Maps keyboard events to actions on the review screen
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        // Keep: Right arrow or k
        (KeyCode::Right, KeyModifiers::NONE) => KeyAction::Keep,
        (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Keep,

        // Yeet: Left arrow or y
        (KeyCode::Left, KeyModifiers::NONE) => KeyAction::Yeet,
        (KeyCode::Char('y'), KeyModifiers::NONE) => KeyAction::Yeet,

        // Details: Up arrow or i
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Details,
        (KeyCode::Char('i'), KeyModifiers::NONE) => KeyAction::Details,

        (KeyCode::Char('o'), KeyModifiers::NONE) => KeyAction::Open,
        (KeyCode::Char('s'), KeyModifiers::NONE) => KeyAction::Staged,
        (KeyCode::Char('r'), KeyModifiers::NONE) => KeyAction::Restart,

        // Help: ?
        (KeyCode::Char('?'), KeyModifiers::NONE) => KeyAction::Help,
        (KeyCode::Char('?'), KeyModifiers::SHIFT) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// Maps keyboard events on the yeeted photos screen
pub fn handle_staged_input(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,

        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::Next,
        (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::Next,
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Previous,
        (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Previous,

        (KeyCode::Char(' '), KeyModifiers::NONE) => KeyAction::ToggleKeep,
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::KeepSelected,
        (KeyCode::Char('d'), KeyModifiers::NONE) => KeyAction::DeleteUnselected,
        (KeyCode::Char('o'), KeyModifiers::NONE) => KeyAction::Open,

        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Back,
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Back,
        (KeyCode::Char('s'), KeyModifiers::NONE) => KeyAction::Back,

        (KeyCode::Char('?'), KeyModifiers::NONE) => KeyAction::Help,
        (KeyCode::Char('?'), KeyModifiers::SHIFT) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// Maps keyboard events on the details sheet
pub fn handle_details_input(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Char('o'), KeyModifiers::NONE) => KeyAction::Open,
        (KeyCode::Esc, KeyModifiers::NONE)
        | (KeyCode::Enter, KeyModifiers::NONE)
        | (KeyCode::Down, KeyModifiers::NONE)
        | (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Back,
        _ => KeyAction::None,
    }
}

/// Maps keyboard events to confirmation actions
/// Used when ViewState is ConfirmDelete
pub fn handle_confirm_input(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Confirm: y or Enter
        (KeyCode::Char('y'), KeyModifiers::NONE) => KeyAction::ConfirmDelete,
        (KeyCode::Char('Y'), _) => KeyAction::ConfirmDelete,
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::ConfirmDelete,

        // Cancel: n or Esc
        (KeyCode::Char('n'), KeyModifiers::NONE) => KeyAction::CancelDelete,
        (KeyCode::Char('N'), _) => KeyAction::CancelDelete,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::CancelDelete,

        _ => KeyAction::None,
    }
}

/// Maps keyboard events on the permission screen
pub fn handle_permission_input(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::RequestPermission,
        (KeyCode::Char('g'), KeyModifiers::NONE) => KeyAction::RequestPermission,
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,
        _ => KeyAction::None,
    }
}

/// Pointer input relevant to the swipe card, in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Press { column: u16, row: u16 },
    Drag { column: u16, row: u16 },
    Release { column: u16, row: u16 },
    None,
}

/// Maps mouse events to card gestures; only the left button drags
pub fn handle_mouse_event(mouse: MouseEvent) -> PointerAction {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => PointerAction::Press { column, row },
        MouseEventKind::Drag(MouseButton::Left) => PointerAction::Drag { column, row },
        MouseEventKind::Up(MouseButton::Left) => PointerAction::Release { column, row },
        _ => PointerAction::None,
    }
}
