use eframe::egui::{self, RichText, Ui};

use crate::data::model::Section;
use crate::state::{AppState, InfoContent, Page, LOADING_TEXT};
use crate::ui::tables::table;

// ---------------------------------------------------------------------------
// Main page – subject area, target attribute, training data
// ---------------------------------------------------------------------------

pub fn main_page(ui: &mut Ui, state: &mut AppState) {
    let mut next_page = false;

    for item in &state.info.items {
        ui.heading(item.heading);
        match &item.content {
            InfoContent::Loading => {
                ui.horizontal(|ui: &mut Ui| {
                    ui.spinner();
                    ui.label(LOADING_TEXT);
                });
            }
            InfoContent::Text(text) => paragraphs(ui, text),
            InfoContent::Table(t) => {
                table(ui, item.key, t, None);
                next_page = ui
                    .add_enabled(
                        !state.info.is_loading(item.key),
                        egui::Button::new(format!(
                            "Следующие {} записей",
                            state.info.pagination.limit
                        )),
                    )
                    .clicked();
            }
            InfoContent::Failed => {
                ui.label("—");
            }
        }
        ui.add_space(12.0);
    }

    if next_page {
        state.next_info_page();
    }
}

/// Each line break of the source text starts a new paragraph.
fn paragraphs(ui: &mut Ui, text: &str) {
    for line in text.split('\n') {
        ui.label(line);
        ui.add_space(6.0);
    }
}

// ---------------------------------------------------------------------------
// Analytics page
// ---------------------------------------------------------------------------

pub fn analytics_page(ui: &mut Ui, state: &AppState) {
    let view = &state.analytics;

    if view.is_loading() {
        ui.horizontal(|ui: &mut Ui| {
            ui.spinner();
            ui.label(LOADING_TEXT);
        });
        return;
    }

    if let Some(err) = view.output.error() {
        ui.label(RichText::new(err).monospace());
        return;
    }

    for section in view.output.sections() {
        match section {
            Section::Overall(t) => table(ui, "overall", t, None),
            Section::Model(m) => {
                let color = view.color_map.as_ref().map(|cm| cm.color_for(&m.id));
                ui.separator();
                ui.push_id(&m.id, |ui: &mut Ui| {
                    table(ui, "metrics", &m.metrics, color);
                    if let Some(path) = &m.image {
                        ui.add(
                            egui::Image::new(state.client.resolve(path))
                                .max_width(ui.available_width().min(640.0))
                                .fit_to_original_size(1.0),
                        );
                        ui.add_space(12.0);
                    }
                    if let Some(matrix) = &m.matrix {
                        table(ui, "matrix", matrix, None);
                    }
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// About page – identity widgets
// ---------------------------------------------------------------------------

pub fn about_page(ui: &mut Ui, state: &AppState) {
    ui.heading(Page::About.title());
    egui::Grid::new("about_identity")
        .num_columns(2)
        .spacing([16.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Пользователь");
            ui.label(state.identity.user_name());
            ui.end_row();
            ui.strong("Роль");
            ui.label(state.identity.role_name());
            ui.end_row();
        });
}

// ---------------------------------------------------------------------------
// Sign-in / registration
// ---------------------------------------------------------------------------

pub fn auth_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.page.title());
    let busy = state.auth_form.is_busy();

    egui::Grid::new("auth_form")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Логин");
            ui.add_enabled(
                !busy,
                egui::TextEdit::singleline(&mut state.auth_form.user_name),
            );
            ui.end_row();
            ui.label("Пароль");
            ui.add_enabled(
                !busy,
                egui::TextEdit::singleline(&mut state.auth_form.password).password(true),
            );
            ui.end_row();
        });

    let label = match state.page {
        Page::Registration => "Зарегистрироваться",
        _ => "Войти",
    };
    if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
        state.submit_auth();
    }
    if busy {
        ui.spinner();
    }
}
