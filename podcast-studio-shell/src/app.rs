//! Podcast Studio App - Main application shell
//!
//! Organized into sections:
//! - UI Definitions (live_design! macro)
//! - App struct and startup (config + preferences)
//! - Event Handling (AppMain impl)
//! - Dark mode

use std::sync::Arc;

use makepad_widgets::*;

use podcast_generator::{GeneratorConfig, PodcastGeneratorApp, PodcastScreenWidgetRefExt, Preferences};
use podcast_widgets::{AppRegistry, PodcastApp};

// ============================================================================
// UI DEFINITIONS
// ============================================================================

live_design! {
    use link::theme::*;
    use link::shaders::*;
    use link::widgets::*;

    use podcast_widgets::theme::*;

    use podcast_generator::screen::design::PodcastScreen;

    App = {{App}} {
        ui: <Window> {
            window: { title: "Podcast Studio", inner_size: vec2(1400, 900) }
            pass: { clear_color: (DARK_BG) }

            body = <View> {
                width: Fill, height: Fill
                flow: Down

                header = <View> {
                    width: Fill, height: Fit
                    flow: Right
                    spacing: 12
                    align: {y: 0.5}
                    padding: {left: 20, right: 20, top: 12, bottom: 12}
                    show_bg: true
                    draw_bg: {
                        instance dark_mode: 0.0
                        fn pixel(self) -> vec4 {
                            let sdf = Sdf2d::viewport(self.pos * self.rect_size);
                            sdf.rect(0., 0., self.rect_size.x, self.rect_size.y);
                            sdf.fill(mix((PANEL_BG), (PANEL_BG_DARK), self.dark_mode));
                            // Bottom divider
                            sdf.rect(0., self.rect_size.y - 1.0, self.rect_size.x, 1.0);
                            sdf.fill(mix((DIVIDER), (DIVIDER_DARK), self.dark_mode));
                            return sdf.result;
                        }
                    }

                    title = <Label> {
                        text: "Podcast Studio"
                        draw_text: {
                            instance dark_mode: 0.0
                            text_style: <FONT_BOLD>{ font_size: 20.0 }
                            fn get_color(self) -> vec4 {
                                return mix((TEXT_PRIMARY), (TEXT_PRIMARY_DARK), self.dark_mode);
                            }
                        }
                    }

                    <View> { width: Fill, height: 1 }

                    // Theme toggle button
                    theme_toggle = <View> {
                        width: 36, height: 36
                        align: {x: 0.5, y: 0.5}
                        cursor: Hand
                        show_bg: true
                        draw_bg: {
                            instance hover: 0.0
                            fn pixel(self) -> vec4 {
                                let sdf = Sdf2d::viewport(self.pos * self.rect_size);
                                let cx = self.rect_size.x * 0.5;
                                let cy = self.rect_size.y * 0.5;
                                sdf.circle(cx, cy, 16.0);
                                sdf.fill(mix(vec4(0.0, 0.0, 0.0, 0.0), (SLATE_200), self.hover));
                                return sdf.result;
                            }
                        }

                        sun_icon = <View> {
                            width: 20, height: 20
                            show_bg: true
                            draw_bg: {
                                fn pixel(self) -> vec4 {
                                    let sdf = Sdf2d::viewport(self.pos * self.rect_size);
                                    let c = self.rect_size * 0.5;
                                    sdf.circle(c.x, c.y, 4.0);
                                    sdf.fill((AMBER_500));
                                    let ray_len = 2.5;
                                    let ray_dist = 6.5;
                                    sdf.move_to(c.x, c.y - ray_dist);
                                    sdf.line_to(c.x, c.y - ray_dist - ray_len);
                                    sdf.stroke((AMBER_500), 1.5);
                                    sdf.move_to(c.x, c.y + ray_dist);
                                    sdf.line_to(c.x, c.y + ray_dist + ray_len);
                                    sdf.stroke((AMBER_500), 1.5);
                                    sdf.move_to(c.x - ray_dist, c.y);
                                    sdf.line_to(c.x - ray_dist - ray_len, c.y);
                                    sdf.stroke((AMBER_500), 1.5);
                                    sdf.move_to(c.x + ray_dist, c.y);
                                    sdf.line_to(c.x + ray_dist + ray_len, c.y);
                                    sdf.stroke((AMBER_500), 1.5);
                                    return sdf.result;
                                }
                            }
                        }

                        moon_icon = <View> {
                            width: 20, height: 20
                            visible: false
                            show_bg: true
                            draw_bg: {
                                fn pixel(self) -> vec4 {
                                    let sdf = Sdf2d::viewport(self.pos * self.rect_size);
                                    let c = self.rect_size * 0.5;
                                    sdf.circle(c.x, c.y, 6.0);
                                    sdf.fill(#6366f1);
                                    sdf.circle(c.x + 3.5, c.y - 2.5, 4.5);
                                    sdf.fill((PANEL_BG_DARK));
                                    return sdf.result;
                                }
                            }
                        }
                    }
                }

                podcast_screen = <PodcastScreen> {}
            }
        }
    }
}

// ============================================================================
// APP STRUCT
// ============================================================================

#[derive(Live)]
pub struct App {
    #[live]
    ui: WidgetRef,
    /// Registry of installed apps (populated on init)
    #[rust]
    app_registry: AppRegistry,
    /// Loaded once at startup and handed to the screen
    #[rust]
    config: Option<Arc<GeneratorConfig>>,
    #[rust]
    dark_mode: bool,
    /// Dark mode animation progress (0.0 = light, 1.0 = dark)
    #[rust]
    dark_mode_anim: f64,
    #[rust]
    dark_mode_animating: bool,
    #[rust]
    dark_mode_anim_start: f64,
    /// Whether the screen has been configured (on first draw)
    #[rust]
    initialized: bool,
}

impl LiveHook for App {
    fn after_new_from_doc(&mut self, _cx: &mut Cx) {
        self.app_registry.register(PodcastGeneratorApp::info());
        ::log::info!("{} app(s) installed", self.app_registry.len());

        // Configuration errors are fatal at startup
        match GeneratorConfig::load() {
            Ok(config) => self.config = Some(Arc::new(config)),
            Err(e) => {
                ::log::error!("{}", e);
                std::process::exit(1);
            }
        }

        let prefs = Preferences::load();
        self.dark_mode = prefs.dark_mode;
        self.dark_mode_anim = if prefs.dark_mode { 1.0 } else { 0.0 };
    }
}

impl LiveRegister for App {
    fn live_register(cx: &mut Cx) {
        makepad_widgets::live_design(cx);
        podcast_widgets::live_design(cx);
        <PodcastGeneratorApp as PodcastApp>::live_design(cx);
    }
}

// ============================================================================
// EVENT HANDLING
// ============================================================================

impl AppMain for App {
    fn handle_event(&mut self, cx: &mut Cx, event: &Event) {
        self.ui.handle_event(cx, event, &mut Scope::empty());

        // Widgets exist once the first frame is drawn
        if !self.initialized {
            if let Event::Draw(_) = event {
                self.initialized = true;
                if let Some(config) = self.config.clone() {
                    self.ui.podcast_screen(ids!(body.podcast_screen)).set_config(cx, config);
                }
                self.apply_dark_mode(cx, self.dark_mode_anim);
                self.update_theme_toggle_icon(cx);
            }
        }

        if self.dark_mode_animating {
            self.update_dark_mode_animation(cx);
        }

        self.handle_theme_toggle(cx, event);
    }
}

// ============================================================================
// DARK MODE
// ============================================================================

impl App {
    fn handle_theme_toggle(&mut self, cx: &mut Cx, event: &Event) {
        let theme_btn = self.ui.view(ids!(body.header.theme_toggle));

        match event.hits(cx, theme_btn.area()) {
            Hit::FingerHoverIn(_) => {
                theme_btn.apply_over(cx, live! { draw_bg: { hover: 1.0 } });
                self.ui.redraw(cx);
            }
            Hit::FingerHoverOut(_) => {
                theme_btn.apply_over(cx, live! { draw_bg: { hover: 0.0 } });
                self.ui.redraw(cx);
            }
            Hit::FingerUp(_) => {
                self.toggle_dark_mode(cx);
                self.update_theme_toggle_icon(cx);

                let mut prefs = Preferences::load();
                prefs.dark_mode = self.dark_mode;
                prefs.save();
            }
            _ => {}
        }
    }

    fn update_theme_toggle_icon(&mut self, cx: &mut Cx) {
        let is_dark = self.dark_mode;
        self.ui.view(ids!(body.header.theme_toggle.sun_icon)).set_visible(cx, !is_dark);
        self.ui.view(ids!(body.header.theme_toggle.moon_icon)).set_visible(cx, is_dark);
        self.ui.redraw(cx);
    }

    fn toggle_dark_mode(&mut self, cx: &mut Cx) {
        self.dark_mode = !self.dark_mode;
        self.dark_mode_animating = true;
        self.dark_mode_anim_start = Cx::time_now();

        // Screen snaps to the target; only the header animates
        let target = if self.dark_mode { 1.0 } else { 0.0 };
        self.ui.podcast_screen(ids!(body.podcast_screen)).update_dark_mode(cx, target);
        self.ui.redraw(cx);
    }

    fn update_dark_mode_animation(&mut self, cx: &mut Cx) {
        let elapsed = Cx::time_now() - self.dark_mode_anim_start;
        let duration = 0.3;

        // Ease-out cubic
        let t = (elapsed / duration).min(1.0);
        let eased = 1.0 - (1.0 - t).powi(3);

        let target = if self.dark_mode { 1.0 } else { 0.0 };
        let start = 1.0 - target;
        self.dark_mode_anim = start + (target - start) * eased;
        self.apply_header_dark_mode(cx, self.dark_mode_anim);

        if t >= 1.0 {
            self.dark_mode_animating = false;
            self.dark_mode_anim = target;
        }

        self.ui.redraw(cx);
    }

    fn apply_header_dark_mode(&mut self, cx: &mut Cx, dm: f64) {
        self.ui.view(ids!(body.header)).apply_over(cx, live! {
            draw_bg: { dark_mode: (dm) }
        });
        self.ui.label(ids!(body.header.title)).apply_over(cx, live! {
            draw_text: { dark_mode: (dm) }
        });
    }

    fn apply_dark_mode(&mut self, cx: &mut Cx, dm: f64) {
        self.apply_header_dark_mode(cx, dm);
        self.ui.podcast_screen(ids!(body.podcast_screen)).update_dark_mode(cx, dm);
    }
}

app_main!(App);
