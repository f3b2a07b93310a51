use eframe::egui;
use pdf_async_runtime::{PdfCommand, PdfListItem, UploadProgress};
use pdf_library::grid::{FileDropOverlay, ReorderDrag, should_show_progress};
use pdf_library::{decode_data_url, format_file_size};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::ui_components::{ConfirmDialog, ConfirmOutcome, truncated_label};

const CARD_WIDTH: f32 = 150.0;
const COVER_SIZE: egui::Vec2 = egui::vec2(130.0, 182.0);
const DROP_TARGET_COLOR: egui::Color32 = egui::Color32::from_rgb(0x25, 0x63, 0xeb);

/// Destructive action waiting for the user's confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirm {
    Delete { id: String, name: String },
    ClearAll,
}

/// What the home screen asks the app to do after a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeAction {
    None,
    Open { id: String },
}

#[derive(Default)]
pub struct HomeState {
    pub items: Vec<PdfListItem>,
    /// Decoded cover textures; `None` marks covers that failed to decode
    covers: HashMap<String, Option<egui::TextureHandle>>,
    pub drag: ReorderDrag,
    pub file_drop: FileDropOverlay,
    pub upload_progress: Option<UploadProgress>,
    pub uploading: bool,
    pub loading: bool,
    pub confirm: Option<PendingConfirm>,
}

impl HomeState {
    /// Empty grid waiting for the first library listing
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    pub fn set_items(&mut self, items: Vec<PdfListItem>) {
        self.covers
            .retain(|id, _| items.iter().any(|item| &item.id == id));
        self.items = items;
        self.loading = false;
    }

    pub fn remove(&mut self, id: &str) {
        self.items.retain(|item| item.id != id);
        self.covers.remove(id);
    }

    fn cover_texture(&mut self, ctx: &egui::Context, item: &PdfListItem) -> Option<egui::TextureHandle> {
        self.covers
            .entry(item.id.clone())
            .or_insert_with(|| load_cover(ctx, item))
            .clone()
    }
}

fn load_cover(ctx: &egui::Context, item: &PdfListItem) -> Option<egui::TextureHandle> {
    let url = item.cover_image.as_deref()?;
    let cover = match decode_data_url(url) {
        Ok(cover) => cover,
        Err(e) => {
            log::warn!("Cover for {} is unreadable: {}", item.name, e);
            return None;
        }
    };
    let image = match image::load_from_memory(&cover.data) {
        Ok(image) => image.to_rgba8(),
        Err(e) => {
            log::warn!("Cover for {} could not be decoded: {}", item.name, e);
            return None;
        }
    };

    let size = [image.width() as usize, image.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
    Some(ctx.load_texture(
        format!("cover_{}", item.id),
        color_image,
        egui::TextureOptions::LINEAR,
    ))
}

/// Offer a native picker for PDF files and queue the upload
pub fn pick_and_upload(command_tx: &mpsc::UnboundedSender<PdfCommand>, state: &mut HomeState) {
    if let Some(paths) = rfd::FileDialog::new()
        .add_filter("PDF", &["pdf"])
        .pick_files()
    {
        queue_upload(paths, command_tx, state);
    }
}

pub fn queue_upload(
    paths: Vec<PathBuf>,
    command_tx: &mpsc::UnboundedSender<PdfCommand>,
    state: &mut HomeState,
) {
    if paths.is_empty() {
        return;
    }
    state.uploading = true;
    state.upload_progress = None;
    let _ = command_tx.send(PdfCommand::Upload { paths });
}

pub fn show_home(
    ui: &mut egui::Ui,
    state: &mut HomeState,
    command_tx: &mpsc::UnboundedSender<PdfCommand>,
) -> HomeAction {
    let mut action = HomeAction::None;

    ui.horizontal(|ui| {
        ui.heading("PDF Library");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(!state.uploading, egui::Button::new("📤 Upload PDF"))
                .clicked()
            {
                pick_and_upload(command_tx, state);
            }
            if !state.items.is_empty() && ui.button("🗑 Clear All").clicked() {
                state.confirm = Some(PendingConfirm::ClearAll);
            }
        });
    });

    if state.uploading {
        if should_show_progress(state.upload_progress.as_ref()) {
            if let Some(progress) = state.upload_progress {
                ui.add(
                    egui::ProgressBar::new(progress.fraction())
                        .text(format!(
                            "Uploading {} of {} files...",
                            progress.uploaded, progress.total
                        ))
                        .animate(true),
                );
            }
        } else {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Uploading...");
            });
        }
    }

    ui.separator();

    if state.loading && state.items.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.spinner();
            ui.label("Loading library...");
        });
    } else if state.items.is_empty() {
        show_empty_state(ui, state, command_tx);
    } else {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(16.0, 16.0);
                for index in 0..state.items.len() {
                    if let Some(open) = show_card(ui, state, index, command_tx) {
                        action = open;
                    }
                }
            });
        });
    }

    // Drag released outside any card
    if !egui::DragAndDrop::has_any_payload(ui.ctx()) && state.drag.dragged_index().is_some() {
        state.drag.end();
    }

    show_confirm(ui.ctx(), state, command_tx);
    action
}

fn show_empty_state(
    ui: &mut egui::Ui,
    state: &mut HomeState,
    command_tx: &mpsc::UnboundedSender<PdfCommand>,
) {
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.heading("📚");
        ui.label("No PDFs yet");
        ui.label(
            egui::RichText::new("Upload a PDF or drop files onto this window to get started")
                .weak(),
        );
        ui.add_space(12.0);
        if ui
            .add_enabled(!state.uploading, egui::Button::new("Upload PDF"))
            .clicked()
        {
            pick_and_upload(command_tx, state);
        }
    });
}

fn show_card(
    ui: &mut egui::Ui,
    state: &mut HomeState,
    index: usize,
    command_tx: &mpsc::UnboundedSender<PdfCommand>,
) -> Option<HomeAction> {
    let item = state.items[index].clone();
    let texture = state.cover_texture(ui.ctx(), &item);
    let drag_id = egui::Id::new(("pdf_card", &item.id));
    let highlighted = state.drag.drag_over_index() == Some(index);
    let dimmed = state.drag.is_dragging(index);

    let mut action = None;
    let inner = ui.dnd_drag_source(drag_id, index, |ui| {
        let stroke = if highlighted {
            egui::Stroke::new(2.0, DROP_TARGET_COLOR)
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke
        };

        egui::Frame::group(ui.style())
            .stroke(stroke)
            .show(ui, |ui| {
                if dimmed {
                    ui.set_opacity(0.4);
                }
                ui.set_width(CARD_WIDTH);
                ui.vertical_centered(|ui| {
                    let cover = match &texture {
                        Some(texture) => ui.add(
                            egui::Image::new(texture)
                                .fit_to_exact_size(COVER_SIZE)
                                .sense(egui::Sense::click()),
                        ),
                        None => ui.add_sized(COVER_SIZE, egui::Button::new("📄")),
                    };
                    if cover.on_hover_text("Open").clicked() {
                        action = Some(HomeAction::Open {
                            id: item.id.clone(),
                        });
                    }

                    truncated_label(ui, &item.name);
                    ui.label(
                        egui::RichText::new(format!(
                            "{} · {}",
                            format_file_size(item.size),
                            item.upload_date
                                .with_timezone(&chrono::Local)
                                .format("%b %-d, %Y")
                        ))
                        .small()
                        .weak(),
                    );

                    if ui.small_button("🗑 Delete").clicked() {
                        state.confirm = Some(PendingConfirm::Delete {
                            id: item.id.clone(),
                            name: item.name.clone(),
                        });
                    }
                });
            });
    });

    let response = inner.response;
    if ui.ctx().is_being_dragged(drag_id) && state.drag.dragged_index() != Some(index) {
        state.drag.start(index);
    }

    if response.dnd_hover_payload::<usize>().is_some() {
        state.drag.enter(index);
    } else {
        state.drag.leave(index);
    }

    if let Some(from) = response.dnd_release_payload::<usize>() {
        if state.drag.dragged_index().is_none() {
            state.drag.start(*from);
        }
        if let Some((from, to)) = state.drag.drop_on(index) {
            let _ = command_tx.send(PdfCommand::Reorder {
                items: state.items.clone(),
                from,
                to,
            });
            // Show the move right away; the worker echoes the saved order back
            let moved = state.items.remove(from);
            state.items.insert(to, moved);
        }
    }

    action
}

fn show_confirm(
    ctx: &egui::Context,
    state: &mut HomeState,
    command_tx: &mpsc::UnboundedSender<PdfCommand>,
) {
    let Some(pending) = state.confirm.clone() else {
        return;
    };

    let outcome = match &pending {
        PendingConfirm::Delete { name, .. } => {
            let message = format!("Are you sure you want to delete \"{}\"?", name);
            ConfirmDialog::new("Delete PDF", &message).show(ctx)
        }
        PendingConfirm::ClearAll => ConfirmDialog::new(
            "Delete All PDFs",
            "Are you sure you want to delete ALL PDFs? This action cannot be undone.",
        )
        .confirm_label("Delete All")
        .show(ctx),
    };

    match outcome {
        ConfirmOutcome::Pending => {}
        ConfirmOutcome::Cancelled => state.confirm = None,
        ConfirmOutcome::Confirmed => {
            state.confirm = None;
            match pending {
                PendingConfirm::Delete { id, .. } => {
                    let _ = command_tx.send(PdfCommand::Delete { id });
                }
                PendingConfirm::ClearAll => {
                    let _ = command_tx.send(PdfCommand::ClearAll);
                }
            }
        }
    }
}

/// Track OS file drags over the window and collect dropped paths
pub fn handle_file_drop(ctx: &egui::Context, state: &mut HomeState) -> Vec<PathBuf> {
    let (hovering, dropped) = ctx.input(|i| {
        let dropped: Vec<PathBuf> = i
            .raw
            .dropped_files
            .iter()
            .filter_map(|file| file.path.clone())
            .collect();
        (!i.raw.hovered_files.is_empty(), dropped)
    });

    if hovering {
        state.file_drop.hover(true);
    } else if state.file_drop.is_active() {
        state.file_drop.leave();
    }

    if !dropped.is_empty() {
        state.file_drop.drop();
    }

    if state.file_drop.is_active() {
        paint_drop_overlay(ctx);
    }
    dropped
}

fn paint_drop_overlay(ctx: &egui::Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("file_drop_overlay"),
    ));
    let rect = ctx.content_rect();
    painter.rect_filled(rect, 0.0, egui::Color32::from_black_alpha(160));
    painter.rect_stroke(
        rect.shrink(12.0),
        8.0,
        egui::Stroke::new(3.0, DROP_TARGET_COLOR),
        egui::StrokeKind::Inside,
    );
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Drop PDF files here to upload",
        egui::FontId::proportional(24.0),
        egui::Color32::WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: &str) -> PdfListItem {
        PdfListItem {
            id: id.to_string(),
            name: format!("{id}.pdf"),
            size: 1024,
            upload_date: Utc::now(),
            cover_image: None,
        }
    }

    #[test]
    fn test_loading_state_until_first_listing() {
        let mut state = HomeState::loading();
        assert!(state.loading);
        assert!(state.items.is_empty());
        assert!(!state.uploading);

        state.set_items(vec![item("a"), item("b")]);
        assert!(!state.loading);
        assert_eq!(state.items.len(), 2);

        state.remove("a");
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].id, "b");
    }

    #[test]
    fn test_queue_upload_ignores_empty_selection() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = HomeState::default();

        queue_upload(Vec::new(), &tx, &mut state);
        assert!(!state.uploading);
        assert!(rx.try_recv().is_err());

        queue_upload(vec![PathBuf::from("a.pdf")], &tx, &mut state);
        assert!(state.uploading);
        assert!(matches!(rx.try_recv(), Ok(PdfCommand::Upload { paths }) if paths.len() == 1));
    }
}
