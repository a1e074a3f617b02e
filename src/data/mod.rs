/// Data layer: payload types, table rendering, per-model decomposition and
/// dashboard assembly. Pure values only; nothing here touches egui.
///
/// Architecture:
/// ```text
///  GET /api/analytics/  or  saved .json
///        │
///        ▼
///   ┌───────────┐
///   │ dashboard  │  validate payload → Vec<Section>
///   └───────────┘
///     │       │
///     ▼       ▼
///  ┌───────┐ ┌───────────┐
///  │ table  │ │ decompose  │  metrics table → per-model sub-tables
///  └───────┘ └───────────┘
/// ```

pub mod dashboard;
pub mod decompose;
pub mod loader;
pub mod model;
pub mod table;
