pub mod class_labels;
pub mod config;
