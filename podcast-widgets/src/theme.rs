//! Podcast Studio theme - shared colours, fonts, and dark mode pairs
//!
//! Every surface colour comes in a light/dark pair (`PANEL_BG` / `PANEL_BG_DARK`).
//! Widgets carry an `instance dark_mode` and `mix()` between the two, so the
//! shell can animate the whole UI by applying a single float.
//!
//! Fonts inherit Makepad's bundled theme fonts so no resource files are needed.

use makepad_widgets::*;

live_design! {
    use link::theme::*;

    // ------------------------------------------------------------------------
    // Fonts
    // ------------------------------------------------------------------------

    pub FONT_REGULAR = <THEME_FONT_REGULAR> {}
    pub FONT_MEDIUM = <THEME_FONT_REGULAR> {}
    pub FONT_SEMIBOLD = <THEME_FONT_BOLD> {}
    pub FONT_BOLD = <THEME_FONT_BOLD> {}

    // ------------------------------------------------------------------------
    // Base palette (Tailwind scale)
    // ------------------------------------------------------------------------

    pub WHITE = #ffffff

    pub SLATE_50 = #f8fafc
    pub SLATE_100 = #f1f5f9
    pub SLATE_200 = #e2e8f0
    pub SLATE_300 = #cbd5e1
    pub SLATE_400 = #94a3b8
    pub SLATE_500 = #64748b
    pub SLATE_600 = #475569
    pub SLATE_700 = #334155
    pub SLATE_800 = #1e293b
    pub SLATE_900 = #0f172a

    pub GRAY_100 = #f3f4f6
    pub GRAY_200 = #e5e7eb
    pub GRAY_300 = #d1d5db
    pub GRAY_500 = #6b7280
    pub GRAY_600 = #4b5563
    pub GRAY_700 = #374151

    pub BLUE_100 = #dbeafe
    pub BLUE_600 = #x2563eb
    pub INDIGO_200 = #c7d2fe
    pub GREEN_500 = #10b981
    pub AMBER_500 = #f59e0b
    pub RED_500 = #ef4444

    // ------------------------------------------------------------------------
    // Semantic colours (light / dark pairs)
    // ------------------------------------------------------------------------

    pub DARK_BG = #f5f7fa
    pub DARK_BG_DARK = #x0b1120

    pub PANEL_BG = #ffffff
    pub PANEL_BG_DARK = #1e293b

    pub TEXT_PRIMARY = #1f2937
    pub TEXT_PRIMARY_DARK = #f1f5f9
    pub TEXT_SECONDARY = #6b7280
    pub TEXT_SECONDARY_DARK = #94a3b8

    pub BORDER = #e5e7eb
    pub BORDER_DARK = #334155
    pub DIVIDER = #e2e8f0
    pub DIVIDER_DARK = #334155

    pub ACCENT_BLUE = #3b82f6
    pub ACCENT_GREEN = #10b981
    pub ACCENT_RED = #ef4444
}
