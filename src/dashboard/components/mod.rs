//! Reusable UI components for the dashboard

pub mod scroll_slider;
pub mod sidebar;
pub mod status_card;

pub use scroll_slider::add_scroll_slider;
pub use sidebar::{render_sidebar, SidebarInfo};
pub use status_card::{CardStatus, StatusCard};
