//! # PodcastApp Trait - Plugin App Interface
//!
//! Standard interface for apps hosted by the Podcast Studio shell.
//!
//! Makepad's `live_design!` macro resolves widget types at compile time, so the
//! shell still imports each app's screen type directly. This trait adds:
//!
//! - **Standardized metadata** via [`AppInfo`]
//! - **Consistent registration** via [`PodcastApp::live_design`]
//! - **Runtime queries** via [`AppRegistry`]
//!
//! ```rust,ignore
//! use podcast_widgets::{AppInfo, PodcastApp};
//!
//! pub struct MyApp;
//!
//! impl PodcastApp for MyApp {
//!     fn info() -> AppInfo {
//!         AppInfo { name: "My App", id: "my-app", description: "Does things" }
//!     }
//!
//!     fn live_design(cx: &mut Cx) {
//!         crate::screen::live_design(cx);
//!     }
//! }
//! ```

use makepad_widgets::Cx;

/// Metadata about a registered app
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppInfo {
    /// Display name shown in UI
    pub name: &'static str,
    /// Unique identifier for the app
    pub id: &'static str,
    /// Description of the app
    pub description: &'static str,
}

/// Trait for apps that integrate with the Podcast Studio shell
pub trait PodcastApp {
    /// Returns metadata about this app
    fn info() -> AppInfo
    where
        Self: Sized;

    /// Register this app's widgets with Makepad
    fn live_design(cx: &mut Cx);
}

/// Registry of all installed apps
///
/// Apps must still be imported at compile time; the registry only holds
/// metadata for runtime queries (window title, about text).
pub struct AppRegistry {
    apps: Vec<AppInfo>,
}

impl AppRegistry {
    /// Create a new empty registry
    pub const fn new() -> Self {
        Self { apps: Vec::new() }
    }

    /// Register an app. Re-registering an id replaces the previous entry.
    pub fn register(&mut self, info: AppInfo) {
        self.apps.retain(|app| app.id != info.id);
        self.apps.push(info);
    }

    pub fn apps(&self) -> &[AppInfo] {
        &self.apps
    }

    pub fn find_by_id(&self, id: &str) -> Option<&AppInfo> {
        self.apps.iter().find(|app| app.id == id)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for widgets that respond to global state changes
///
/// ```ignore
/// impl StateChangeListener for MyScreenRef {
///     fn on_dark_mode_change(&self, cx: &mut Cx, dark_mode: f64) {
///         if let Some(mut inner) = self.borrow_mut() {
///             inner.view.apply_over(cx, live!{
///                 draw_bg: { dark_mode: (dark_mode) }
///             });
///         }
///     }
/// }
/// ```
pub trait StateChangeListener {
    /// Called when dark mode setting changes
    ///
    /// * `dark_mode` - 0.0 = light, 1.0 = dark
    fn on_dark_mode_change(&self, cx: &mut Cx, dark_mode: f64);
}
