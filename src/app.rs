use eframe::egui::{self, Ui};

use crate::state::{AppState, Page};
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ModelEvalApp {
    pub state: AppState,
}

impl ModelEvalApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ModelEvalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Bind whatever the workers finished since the last frame.
        self.state.poll();

        // ---- Top panel: navigation ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui: &mut Ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: active page ----
        egui::CentralPanel::default().show(ctx, |ui: &mut Ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| match self.state.page {
                    Page::Main => pages::main_page(ui, &mut self.state),
                    Page::Analytics => pages::analytics_page(ui, &self.state),
                    Page::About => pages::about_page(ui, &self.state),
                    Page::Registration | Page::SignIn => pages::auth_page(ui, &mut self.state),
                });
        });
    }
}
