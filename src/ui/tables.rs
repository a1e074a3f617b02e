use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::model::RenderedTable;

// ---------------------------------------------------------------------------
// Rendered table → striped grid
// ---------------------------------------------------------------------------

/// Draw a caption, a header row and the data rows. `id` must be unique
/// within the page.
pub fn table(ui: &mut Ui, id: &str, t: &RenderedTable, caption_color: Option<Color32>) {
    if !t.caption.is_empty() {
        let mut caption = RichText::new(&t.caption).strong().size(15.0);
        if let Some(c) = caption_color {
            caption = caption.color(c);
        }
        ui.label(caption);
    }

    egui::ScrollArea::horizontal()
        .id_salt(("table_scroll", id))
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new(("table", id))
                .striped(true)
                .num_columns(t.header.len())
                .spacing([16.0, 4.0])
                .show(ui, |ui: &mut Ui| {
                    for h in &t.header {
                        ui.strong(h);
                    }
                    ui.end_row();

                    for row in &t.rows {
                        for cell in row {
                            ui.monospace(cell);
                        }
                        ui.end_row();
                    }
                });
        });
    ui.add_space(20.0);
}
