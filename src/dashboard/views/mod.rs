//! Dashboard views

pub mod batch;
pub mod settings;
pub mod sliders;
pub mod viewer;

pub use batch::render_batch_view;
pub use settings::render_settings_view;
pub use viewer::render_viewer_view;
