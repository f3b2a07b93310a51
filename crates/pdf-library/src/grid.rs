//! Home-screen bookkeeping for drag-to-reorder and file-drop uploads.

use crate::library::UploadProgress;

/// State of an in-progress drag of one grid item onto another
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReorderDrag {
    dragged_index: Option<usize>,
    drag_over_index: Option<usize>,
}

impl ReorderDrag {
    pub fn dragged_index(&self) -> Option<usize> {
        self.dragged_index
    }

    pub fn drag_over_index(&self) -> Option<usize> {
        self.drag_over_index
    }

    pub fn is_dragging(&self, index: usize) -> bool {
        self.dragged_index == Some(index)
    }

    pub fn start(&mut self, index: usize) {
        self.dragged_index = Some(index);
    }

    /// Hovering a target; the dragged item itself is never a target
    pub fn enter(&mut self, index: usize) {
        if self.dragged_index.is_some_and(|dragged| dragged != index) {
            self.drag_over_index = Some(index);
        }
    }

    pub fn leave(&mut self, index: usize) {
        if self.drag_over_index == Some(index) {
            self.drag_over_index = None;
        }
    }

    /// Finish the drag on `index`; returns the `(from, to)` move to apply, if any
    pub fn drop_on(&mut self, index: usize) -> Option<(usize, usize)> {
        let result = self
            .dragged_index
            .filter(|&dragged| dragged != index)
            .map(|dragged| (dragged, index));
        self.end();
        result
    }

    pub fn end(&mut self) {
        self.dragged_index = None;
        self.drag_over_index = None;
    }
}

/// Whether files from outside the app are hovering over the window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileDropOverlay {
    active: bool,
}

impl FileDropOverlay {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Only drags carrying files show the overlay
    pub fn hover(&mut self, carries_files: bool) {
        if carries_files {
            self.active = true;
        }
    }

    pub fn leave(&mut self) {
        self.active = false;
    }

    pub fn drop(&mut self) {
        self.active = false;
    }
}

/// A progress bar is only worth showing when several files are in flight
pub fn should_show_progress(progress: Option<&UploadProgress>) -> bool {
    progress.is_some_and(|p| p.total > 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_on_other_item_yields_move() {
        let mut drag = ReorderDrag::default();
        drag.start(1);
        drag.enter(3);
        assert_eq!(drag.drag_over_index(), Some(3));
        assert_eq!(drag.drop_on(3), Some((1, 3)));
        assert_eq!(drag, ReorderDrag::default());
    }

    #[test]
    fn test_drop_on_self_is_ignored() {
        let mut drag = ReorderDrag::default();
        drag.start(2);
        drag.enter(2);
        assert_eq!(drag.drag_over_index(), None);
        assert_eq!(drag.drop_on(2), None);
        assert_eq!(drag.dragged_index(), None);
    }

    #[test]
    fn test_enter_without_drag_is_ignored() {
        let mut drag = ReorderDrag::default();
        drag.enter(0);
        assert_eq!(drag.drag_over_index(), None);
        assert_eq!(drag.drop_on(0), None);
    }

    #[test]
    fn test_leave_only_clears_matching_target() {
        let mut drag = ReorderDrag::default();
        drag.start(0);
        drag.enter(2);
        drag.leave(1);
        assert_eq!(drag.drag_over_index(), Some(2));
        drag.leave(2);
        assert_eq!(drag.drag_over_index(), None);
        assert!(drag.is_dragging(0));
    }

    #[test]
    fn test_file_overlay_requires_files() {
        let mut overlay = FileDropOverlay::default();
        overlay.hover(false);
        assert!(!overlay.is_active());
        overlay.hover(true);
        assert!(overlay.is_active());
        overlay.drop();
        assert!(!overlay.is_active());
    }

    #[test]
    fn test_progress_only_for_batches() {
        assert!(!should_show_progress(None));
        assert!(!should_show_progress(Some(&UploadProgress {
            uploaded: 0,
            total: 1
        })));
        assert!(should_show_progress(Some(&UploadProgress {
            uploaded: 1,
            total: 3
        })));
    }
}
