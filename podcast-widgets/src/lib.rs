//! # Podcast Widgets
//!
//! Shared UI infrastructure for Podcast Studio apps built on
//! [Makepad](https://github.com/makepad/makepad).
//!
//! ## Modules
//!
//! - [`theme`] - Colour palette, fonts, and dark mode pairs
//! - [`app_trait`] - Plugin app interface (`PodcastApp`, `AppRegistry`)
//!
//! ```rust,ignore
//! live_design! {
//!     use podcast_widgets::theme::*;
//!
//!     MyWidget = <View> {
//!         draw_bg: { color: (PANEL_BG) }
//!     }
//! }
//! ```

pub mod app_trait;
pub mod theme;

pub use app_trait::{AppInfo, AppRegistry, PodcastApp, StateChangeListener};

use makepad_widgets::Cx;

/// Register shared widgets with Makepad.
///
/// Must run in `LiveRegister::live_register` before any app registers, since
/// app designs import the theme constants.
pub fn live_design(cx: &mut Cx) {
    theme::live_design(cx);
}
