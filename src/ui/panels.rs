use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Top bar – navigation and identity
// ---------------------------------------------------------------------------

/// Render the top menu / navigation bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Файл", |ui: &mut Ui| {
            if ui.button("Открыть…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let mut pages = vec![Page::Main, Page::Analytics, Page::About];
        let authenticated = state.is_authenticated();
        if !authenticated {
            pages.extend([Page::Registration, Page::SignIn]);
        }
        for page in pages {
            if ui.selectable_label(state.page == page, page.title()).clicked() {
                state.navigate(page);
            }
        }
        if authenticated && ui.button("Выход").clicked() {
            state.sign_out();
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            ui.label(RichText::new(state.identity.user_name()).italics());
        });
    });

    if let Some(msg) = &state.status_message {
        ui.label(RichText::new(msg).color(Color32::RED));
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Open a saved analytics response and show it without contacting the server.
pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open analytics payload")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(sections) => {
                log::info!(
                    "Loaded {} sections from {}",
                    sections.len(),
                    path.display()
                );
                state.show_sections(sections);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
