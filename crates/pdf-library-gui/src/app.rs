use eframe::egui;
use pdf_async_runtime::{PdfCommand, PdfUpdate, UploadProgress};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::handlers::library::describe_report;
use crate::logger::AppLogger;
use crate::views::{HomeAction, HomeState, ViewerState, home, show_home, show_viewer, viewer};

enum Screen {
    Home,
    Viewer(ViewerState),
}

pub struct PdfLibraryApp {
    screen: Screen,
    home: HomeState,
    status: String,
    show_log: bool,
    logger: AppLogger,

    // Async infrastructure
    command_tx: mpsc::UnboundedSender<PdfCommand>,
    update_rx: mpsc::UnboundedReceiver<PdfUpdate>,
}

impl PdfLibraryApp {
    pub fn new(
        command_tx: mpsc::UnboundedSender<PdfCommand>,
        update_rx: mpsc::UnboundedReceiver<PdfUpdate>,
        logger: AppLogger,
    ) -> Self {
        let home = HomeState::loading();
        let _ = command_tx.send(PdfCommand::LibraryRefresh);

        Self {
            screen: Screen::Home,
            home,
            status: String::new(),
            show_log: false,
            logger,
            command_tx,
            update_rx,
        }
    }

    fn open_viewer(&mut self, id: String) {
        let _ = self.command_tx.send(PdfCommand::ViewerOpen { id: id.clone() });
        self.screen = Screen::Viewer(ViewerState::new(id));
    }

    fn close_viewer(&mut self) {
        let _ = self.command_tx.send(PdfCommand::ViewerClose);
        self.screen = Screen::Home;
    }

    fn busy(&self) -> bool {
        let viewer_busy = match &self.screen {
            Screen::Viewer(state) => {
                state.loading
                    || (state.page_texture.is_none()
                        && state.error.is_none()
                        && state.total_pages > 0)
            }
            Screen::Home => false,
        };
        self.home.loading || self.home.uploading || viewer_busy
    }

    fn process_updates(&mut self, ctx: &egui::Context) {
        while let Ok(update) = self.update_rx.try_recv() {
            match update {
                PdfUpdate::Progress { current, total, .. } => {
                    self.home.upload_progress = Some(UploadProgress {
                        uploaded: current,
                        total,
                    });
                }
                PdfUpdate::LibraryLoaded { items } => {
                    self.home.set_items(items);
                }
                PdfUpdate::UploadFinished { report } => {
                    self.home.uploading = false;
                    self.home.upload_progress = None;
                    if report.attempted() > 0 {
                        self.status = describe_report(&report);
                    }
                }
                PdfUpdate::FilesRejected { names } => {
                    self.status =
                        format!("The following files are not valid PDFs: {}", names.join(", "));
                }
                PdfUpdate::Deleted { id } => {
                    self.home.remove(&id);
                    self.status = "PDF deleted".to_string();
                }
                PdfUpdate::Cleared { count } => {
                    self.status = format!("Deleted {} PDFs", count);
                }
                PdfUpdate::Error { message } => {
                    self.home.loading = false;
                    if let Screen::Viewer(state) = &mut self.screen {
                        if state.loading {
                            state.failed(message.clone());
                        }
                    }
                    self.status = format!("Error: {message}");
                }
                PdfUpdate::ViewerOpened {
                    id,
                    name,
                    page_count,
                    current_page,
                } => {
                    let Screen::Viewer(state) = &mut self.screen else {
                        continue;
                    };
                    // The user already left for another document
                    if state.id != id {
                        continue;
                    }
                    state.opened(name, page_count, current_page);
                    viewer::request_render(state, &self.command_tx);
                }
                PdfUpdate::ViewerPageRendered {
                    id,
                    page_index,
                    width,
                    height,
                    rgba_data,
                } => {
                    let Screen::Viewer(state) = &mut self.screen else {
                        continue;
                    };
                    if !state.wants_page(&id, page_index) {
                        continue;
                    }

                    let color_image =
                        egui::ColorImage::from_rgba_unmultiplied([width, height], &rgba_data);
                    if let Some(texture) = &mut state.page_texture {
                        texture.set(color_image, egui::TextureOptions::default());
                    } else {
                        state.page_texture = Some(ctx.load_texture(
                            "pdf_page",
                            color_image,
                            egui::TextureOptions::default(),
                        ));
                    }
                }
                PdfUpdate::ViewerFailed { message } => {
                    if let Screen::Viewer(state) = &mut self.screen {
                        state.failed(message);
                    }
                }
                PdfUpdate::ViewerPageFailed {
                    id,
                    page_index,
                    message,
                } => {
                    if let Screen::Viewer(state) = &mut self.screen {
                        if state.page_failed(&id, page_index, message.clone()) {
                            self.status = format!("Error: {message}");
                        }
                    }
                }
                PdfUpdate::ViewerClosed => {
                    log::debug!("Viewer closed");
                }
            }
        }
    }

    fn show_log_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.toggle_value(&mut self.show_log, "📜 Log");
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });

            if self.show_log {
                ui.separator();
                egui::ScrollArea::vertical()
                    .max_height(160.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for entry in self.logger.entries() {
                            let color = match entry.level {
                                log::Level::Error => ui.visuals().error_fg_color,
                                log::Level::Warn => ui.visuals().warn_fg_color,
                                _ => ui.visuals().text_color(),
                            };
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} [{}] {}",
                                    entry.timestamp.format("%H:%M:%S"),
                                    entry.level,
                                    entry.message
                                ))
                                .monospace()
                                .color(color),
                            );
                        }
                    });
                if ui.small_button("Clear log").clicked() {
                    self.logger.clear();
                }
            }
        });
    }
}

impl eframe::App for PdfLibraryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_updates(ctx);

        // Dropped files are uploaded from either screen
        let dropped = home::handle_file_drop(ctx, &mut self.home);
        if !dropped.is_empty() {
            home::queue_upload(dropped, &self.command_tx, &mut self.home);
        }

        self.show_log_panel(ctx);

        let mut action = HomeAction::None;
        let mut go_back = false;
        egui::CentralPanel::default().show(ctx, |ui| match &mut self.screen {
            Screen::Home => action = show_home(ui, &mut self.home, &self.command_tx),
            Screen::Viewer(state) => go_back = show_viewer(ui, state, &self.command_tx),
        });

        if let HomeAction::Open { id } = action {
            self.open_viewer(id);
        }
        if go_back {
            self.close_viewer();
        }

        if self.busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
