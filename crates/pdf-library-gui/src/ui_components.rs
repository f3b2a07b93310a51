use eframe::egui;

/// Outcome of a confirmation prompt for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Pending,
    Confirmed,
    Cancelled,
}

/// Modal yes/no prompt for destructive actions
pub struct ConfirmDialog<'a> {
    title: &'a str,
    message: &'a str,
    confirm_label: &'a str,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(title: &'a str, message: &'a str) -> Self {
        Self {
            title,
            message,
            confirm_label: "Delete",
        }
    }

    pub fn confirm_label(mut self, label: &'a str) -> Self {
        self.confirm_label = label;
        self
    }

    pub fn show(self, ctx: &egui::Context) -> ConfirmOutcome {
        let mut outcome = ConfirmOutcome::Pending;

        let modal = egui::Modal::new(egui::Id::new("confirm_dialog")).show(ctx, |ui| {
            ui.set_max_width(360.0);
            ui.heading(self.title);
            ui.add_space(8.0);
            ui.label(self.message);
            ui.add_space(12.0);

            ui.horizontal(|ui| {
                let confirm = egui::Button::new(
                    egui::RichText::new(self.confirm_label).color(egui::Color32::WHITE),
                )
                .fill(egui::Color32::from_rgb(0xdc, 0x26, 0x26));
                if ui.add(confirm).clicked() {
                    outcome = ConfirmOutcome::Confirmed;
                }
                if ui.button("Cancel").clicked() {
                    outcome = ConfirmOutcome::Cancelled;
                }
            });
        });

        if outcome == ConfirmOutcome::Pending && modal.should_close() {
            outcome = ConfirmOutcome::Cancelled;
        }
        outcome
    }
}

/// Label that shortens long file names instead of widening the card
pub fn truncated_label(ui: &mut egui::Ui, text: &str) -> egui::Response {
    ui.add(egui::Label::new(text).truncate())
        .on_hover_text(text)
}
