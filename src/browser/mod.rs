//! chromiumoxide-backed collaborators for the snapshot core
//!
//! Launching Chrome, holding the selected page, and turning that page into
//! raw accessibility trees and text samples.

mod page_source;
mod session;
mod wrapper;

pub use page_source::{capture_ax_tree, sample_page_text};
pub use session::PageSession;
pub use wrapper::{BrowserWrapper, launch_browser};
