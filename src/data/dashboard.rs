use serde_json::Value as JsonValue;

use crate::error::ViewError;

use super::decompose::decompose;
use super::model::{AnalyticsPayload, ModelSection, Section};
use super::table::render;

/// Caption prefix of a model's confusion matrix.
pub const MATRIX_CAPTION_PREFIX: &str = "Матрица ошибок: ";

/// Decode and assemble a raw analytics response.
pub fn assemble_value(value: JsonValue) -> Result<Vec<Section>, ViewError> {
    let payload: AnalyticsPayload = serde_json::from_value(value)
        .map_err(|e| ViewError::validation(format!("analytics payload: {e}")))?;
    assemble(&payload)
}

/// Turn a payload into `[overall, model sections...]`.
///
/// Sections are collected locally and only returned once every table has
/// rendered, so a malformed payload never yields a partial dashboard.
pub fn assemble(payload: &AnalyticsPayload) -> Result<Vec<Section>, ViewError> {
    let overall = render(&payload.table.name, &payload.table.data)?;
    let per_model = decompose(&payload.table.data)?;

    let mut sections = Vec::with_capacity(per_model.len() + 1);
    sections.push(Section::Overall(overall));

    for model in per_model {
        let metrics = render(&model.name, &model.data)?;
        let cm = payload
            .confusion_matrices
            .iter()
            .find(|c| c.method == model.name);

        // The confusion entry's own image wins over the generic graphs map.
        let image = cm
            .and_then(|c| c.roc_curve.clone())
            .or_else(|| {
                payload
                    .graphs
                    .as_ref()
                    .and_then(|g| g.get(&model.name).cloned())
            });

        let matrix = cm
            .map(|c| render(&format!("{MATRIX_CAPTION_PREFIX}{}", model.name), &c.matrix))
            .transpose()?;

        sections.push(Section::Model(ModelSection {
            id: model.name,
            metrics,
            image,
            matrix,
        }));
    }

    log::info!(
        "assembled analytics '{}' with {} model sections",
        payload.table.name,
        sections.len() - 1
    );
    Ok(sections)
}
