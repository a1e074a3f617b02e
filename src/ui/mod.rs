/// egui adapter: binds the values built in `data` / `state` to widgets.
/// Nothing below this module decides what a table contains.

pub mod pages;
pub mod panels;
pub mod tables;
