use eframe::egui;
use pdf_async_runtime::PdfCommand;
use tokio::sync::mpsc;

use crate::viewer::prefetch_candidates;

/// UI-side state of the viewer screen
pub struct ViewerState {
    pub id: String,
    pub title: String,
    /// 1-based page shown
    pub current_page: u32,
    pub total_pages: usize,
    pub page_texture: Option<egui::TextureHandle>,
    pub error: Option<String>,
    pub loading: bool,
    page_input: String,
}

impl ViewerState {
    pub fn new(id: String) -> Self {
        Self {
            id,
            title: "Loading...".to_string(),
            current_page: 1,
            total_pages: 0,
            page_texture: None,
            error: None,
            loading: true,
            page_input: String::new(),
        }
    }

    pub fn opened(&mut self, title: String, page_count: usize, current_page: u32) {
        self.title = title;
        self.total_pages = page_count;
        self.current_page = current_page;
        self.page_input = current_page.to_string();
        self.loading = false;
    }

    pub fn failed(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }

    /// 0-based index of the page shown
    pub fn page_index(&self) -> usize {
        self.current_page.saturating_sub(1) as usize
    }

    /// Whether a rendered page belongs on screen; renders of another document
    /// or of a page the user already left are stale
    pub fn wants_page(&self, id: &str, page_index: usize) -> bool {
        self.id == id && self.page_index() == page_index
    }

    /// Record a render failure for the page on screen; returns false for stale ones
    pub fn page_failed(&mut self, id: &str, page_index: usize, message: String) -> bool {
        if !self.wants_page(id, page_index) {
            return false;
        }
        self.page_texture = None;
        self.failed(message);
        true
    }
}

/// Ask the worker for the current page and its neighbours
pub fn request_render(state: &ViewerState, command_tx: &mpsc::UnboundedSender<PdfCommand>) {
    if state.total_pages == 0 {
        return;
    }
    let page_index = state.page_index();
    let _ = command_tx.send(PdfCommand::ViewerRenderPage { page_index });
    let page_indices = prefetch_candidates(page_index, state.total_pages);
    if !page_indices.is_empty() {
        let _ = command_tx.send(PdfCommand::ViewerPrefetchPages { page_indices });
    }
}

fn go_to_page(state: &mut ViewerState, page: u32, command_tx: &mpsc::UnboundedSender<PdfCommand>) {
    let page = page.clamp(1, state.total_pages.max(1) as u32);
    state.page_input = page.to_string();
    if page == state.current_page {
        return;
    }
    state.current_page = page;
    let _ = command_tx.send(PdfCommand::ViewerPageChanged { page });
    request_render(state, command_tx);
}

/// Draw the viewer; returns true when the user asks to go back
pub fn show_viewer(
    ui: &mut egui::Ui,
    state: &mut ViewerState,
    command_tx: &mpsc::UnboundedSender<PdfCommand>,
) -> bool {
    let mut go_back = false;

    ui.horizontal(|ui| {
        if ui.button("← Back").clicked() {
            go_back = true;
        }
        ui.separator();
        ui.heading(&state.title);
    });
    ui.separator();

    if let Some(message) = &state.error {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading("⚠");
            ui.label(egui::RichText::new(message).color(ui.visuals().error_fg_color));
            ui.add_space(12.0);
            if ui.button("Go Back").clicked() {
                go_back = true;
            }
        });
        return go_back;
    }

    if state.loading {
        ui.centered_and_justified(|ui| {
            ui.spinner();
        });
        return go_back;
    }

    let (next, previous) = ui.input(|i| {
        (
            i.key_pressed(egui::Key::ArrowRight) || i.key_pressed(egui::Key::PageDown),
            i.key_pressed(egui::Key::ArrowLeft) || i.key_pressed(egui::Key::PageUp),
        )
    });

    ui.horizontal(|ui| {
        let can_go_back = state.current_page > 1;
        let can_go_forward = (state.current_page as usize) < state.total_pages;

        if ui
            .add_enabled(can_go_back, egui::Button::new("◀ Previous"))
            .clicked()
            || (previous && can_go_back)
        {
            let page = state.current_page - 1;
            go_to_page(state, page, command_tx);
        }

        ui.label("Page");
        let input = ui.add_sized(
            [48.0, 20.0],
            egui::TextEdit::singleline(&mut state.page_input),
        );
        if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            match state.page_input.trim().parse::<u32>() {
                Ok(page) => go_to_page(state, page, command_tx),
                Err(_) => state.page_input = state.current_page.to_string(),
            }
        }
        ui.label(format!("of {}", state.total_pages));

        if ui
            .add_enabled(can_go_forward, egui::Button::new("Next ▶"))
            .clicked()
            || (next && can_go_forward && !input.has_focus())
        {
            let page = state.current_page + 1;
            go_to_page(state, page, command_tx);
        }
    });

    ui.separator();

    if let Some(texture) = &state.page_texture {
        egui::ScrollArea::both().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.image((texture.id(), texture.size_vec2()));
            });
        });
    } else if state.total_pages == 0 {
        ui.centered_and_justified(|ui| {
            ui.label("This PDF has no pages");
        });
    } else {
        ui.centered_and_justified(|ui| {
            ui.spinner();
        });
    }

    go_back
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_to_page_clamps_and_persists() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = ViewerState::new("id".into());
        state.opened("doc.pdf".into(), 3, 1);

        go_to_page(&mut state, 10, &tx);
        assert_eq!(state.current_page, 3);
        assert_eq!(state.page_input, "3");

        assert!(matches!(
            rx.try_recv(),
            Ok(PdfCommand::ViewerPageChanged { page: 3 })
        ));
        assert!(matches!(
            rx.try_recv(),
            Ok(PdfCommand::ViewerRenderPage { page_index: 2 })
        ));
        assert!(matches!(
            rx.try_recv(),
            Ok(PdfCommand::ViewerPrefetchPages { page_indices }) if page_indices == [1]
        ));
    }

    #[test]
    fn test_page_from_other_document_is_stale() {
        let mut state = ViewerState::new("current".into());
        state.opened("doc.pdf".into(), 5, 2);

        assert!(state.wants_page("current", 1));
        assert!(!state.wants_page("previous", 1));
        assert!(!state.wants_page("current", 0));
    }

    #[test]
    fn test_render_failure_shows_error() {
        let mut state = ViewerState::new("current".into());
        state.opened("doc.pdf".into(), 5, 1);

        assert!(!state.page_failed("previous", 0, "boom".into()));
        assert!(state.error.is_none());

        assert!(state.page_failed("current", 0, "Failed to render page: boom".into()));
        assert_eq!(state.error.as_deref(), Some("Failed to render page: boom"));
        assert!(!state.loading);
    }

    #[test]
    fn test_go_to_same_page_sends_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = ViewerState::new("id".into());
        state.opened("doc.pdf".into(), 3, 2);

        go_to_page(&mut state, 2, &tx);
        assert!(rx.try_recv().is_err());
    }
}
