//! Podcast Generator Screen Module
//!
//! The single form that turns source text into a transcript and then audio.

pub use self::main::{PodcastScreen, PodcastScreenRef, PodcastScreenWidgetRefExt};

mod main;
pub mod design;

/// Register live design for this module
pub fn live_design(cx: &mut makepad_widgets::Cx) {
    design::live_design(cx);
}
