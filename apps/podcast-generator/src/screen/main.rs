//! Podcast Generator Screen - form, actions and the worker poll loop

use std::path::PathBuf;
use std::sync::Arc;

use makepad_widgets::*;
use podcast_widgets::StateChangeListener;

use crate::config::{mask_secret, Credential, GeneratorConfig, Profile};
use crate::duration::DurationEstimator;
use crate::generation::{
    audio_status, failure_status, transcript_status, GenerationCommand, GenerationEvent,
    GenerationSession, GenerationWorker, TaskKind,
};
use crate::preferences::Preferences;
use crate::request::{
    format_minutes, DurationEntry, PodcastRequest, PodcastStyle, SpeakerCount,
    DEFAULT_DURATION_MINUTES,
};
use crate::tts::{TtsProvider, VoiceSelection};

/// Oldest log lines are dropped past this count
const MAX_LOG_ENTRIES: usize = 200;

const LOG_PANEL_WIDTH: f64 = 300.0;

#[derive(Live, LiveHook, Widget)]
pub struct PodcastScreen {
    #[deref]
    view: View,

    #[rust]
    config: Option<Arc<GeneratorConfig>>,

    #[rust]
    worker: Option<GenerationWorker>,

    #[rust]
    session: GenerationSession,

    #[rust]
    poll_timer: Timer,

    // Form state mirrored from the dropdowns
    #[rust]
    profile: Profile,

    #[rust]
    style: PodcastStyle,

    #[rust]
    speakers: SpeakerCount,

    #[rust]
    provider: TtsProvider,

    #[rust]
    voices: VoiceSelection,

    #[rust(DEFAULT_DURATION_MINUTES)]
    duration_minutes: f64,

    // Activity log
    #[rust]
    log_entries: Vec<String>,

    #[rust]
    log_level_filter: usize, // 0=ALL, 1=INFO, 2=WARN, 3=ERROR

    #[rust]
    log_panel_collapsed: bool,
}

impl Widget for PodcastScreen {
    fn handle_event(&mut self, cx: &mut Cx, event: &Event, scope: &mut Scope) {
        self.view.handle_event(cx, event, scope);

        if self.poll_timer.is_event(event).is_some() {
            self.poll_worker(cx);
        }

        let actions = match event {
            Event::Actions(actions) => actions.as_slice(),
            _ => return,
        };

        // Source text drives the duration suggestion
        if let Some(text) = self.source_input().changed(actions) {
            self.update_suggestion(cx, &text);
        }

        if let Some(text) = self.duration_input().changed(actions) {
            self.handle_duration_entry(cx, &text);
        }

        if let Some(value) = self.duration_slider().slided(actions) {
            self.handle_duration_slider(cx, value);
        }

        if let Some(text) = self.transcript_editor().changed(actions) {
            if self.session.edit_transcript(&text).is_err() {
                // Running task owns the transcript; put the editor back
                let current = self.session.artifact().transcript_text.clone().unwrap_or_default();
                self.transcript_editor().set_text(cx, &current);
            }
        }

        // Dropdowns
        if let Some(index) = self.view.drop_down(ids!(main_content.form_panel.settings_section.style_row.style_dropdown)).selected(actions) {
            self.style = PodcastStyle::from_index(index);
            ::log::info!("Style changed to {}", self.style.label());
            self.save_preferences();
        }

        if let Some(index) = self.view.drop_down(ids!(main_content.form_panel.settings_section.speakers_row.speakers_dropdown)).selected(actions) {
            self.speakers = SpeakerCount::from_index(index);
            self.save_preferences();
        }

        if let Some(index) = self.view.drop_down(ids!(main_content.form_panel.settings_section.profile_row.profile_dropdown)).selected(actions) {
            self.handle_profile_change(cx, Profile::from_index(index));
        }

        if let Some(index) = self.view.drop_down(ids!(main_content.form_panel.voice_section.provider_row.provider_dropdown)).selected(actions) {
            self.handle_provider_change(cx, TtsProvider::from_index(index));
        }

        if let Some(index) = self.host_dropdown().selected(actions) {
            if let Some(voice) = self.provider.voices().get(index) {
                self.voices.host = voice.to_string();
                self.save_preferences();
            }
        }

        if let Some(index) = self.guest_dropdown().selected(actions) {
            if let Some(voice) = self.provider.voices().get(index) {
                self.voices.guest = voice.to_string();
                self.save_preferences();
            }
        }

        // Buttons
        if self.view.button(ids!(main_content.form_panel.voice_section.output_row.browse_button)).clicked(actions) {
            self.handle_browse(cx);
        }

        if self.view.button(ids!(main_content.result_panel.control_bar.generate_text_button)).clicked(actions) {
            self.handle_generate_text(cx);
        }

        if self.view.button(ids!(main_content.result_panel.control_bar.generate_audio_button)).clicked(actions) {
            self.handle_generate_audio(cx);
        }

        if self.view.button(ids!(main_content.result_panel.control_bar.cancel_button)).clicked(actions) {
            self.handle_cancel(cx);
        }

        if self.view.button(ids!(main_content.result_panel.control_bar.clear_button)).clicked(actions) {
            self.handle_clear(cx);
        }

        if self.view.button(ids!(main_content.result_panel.control_bar.open_audio_button)).clicked(actions) {
            self.handle_open_audio(cx);
        }

        // Log panel
        if self.view.button(ids!(main_content.log_section.toggle_column.toggle_log_btn)).clicked(actions) {
            self.toggle_log_panel(cx);
        }

        if let Some(selected) = self.view.drop_down(ids!(main_content.log_section.log_content_column.log_header.log_filter_row.level_filter)).selected(actions) {
            self.log_level_filter = selected;
            self.update_log_display(cx);
        }

        if self.view.button(ids!(main_content.log_section.log_content_column.log_header.log_filter_row.clear_log_btn)).clicked(actions) {
            self.log_entries.clear();
            self.update_log_display(cx);
        }
    }

    fn draw_walk(&mut self, cx: &mut Cx2d, scope: &mut Scope, walk: Walk) -> DrawStep {
        self.view.draw_walk(cx, scope, walk)
    }
}

// =====================================================
// WIDGET ACCESSORS
// =====================================================

impl PodcastScreen {
    fn source_input(&self) -> TextInputRef {
        self.view.text_input(ids!(main_content.form_panel.source_section.source_input))
    }

    fn duration_input(&self) -> TextInputRef {
        self.view.text_input(ids!(main_content.form_panel.settings_section.duration_row.duration_input))
    }

    fn duration_slider(&self) -> SliderRef {
        self.view.slider(ids!(main_content.form_panel.settings_section.duration_row.duration_slider))
    }

    fn prompt_input(&self) -> TextInputRef {
        self.view.text_input(ids!(main_content.form_panel.settings_section.prompt_input))
    }

    fn output_dir_input(&self) -> TextInputRef {
        self.view.text_input(ids!(main_content.form_panel.voice_section.output_row.output_dir_input))
    }

    fn transcript_editor(&self) -> TextInputRef {
        self.view.text_input(ids!(main_content.result_panel.transcript_panel.transcript_editor))
    }

    fn host_dropdown(&self) -> DropDownRef {
        self.view.drop_down(ids!(main_content.form_panel.voice_section.host_row.host_dropdown))
    }

    fn guest_dropdown(&self) -> DropDownRef {
        self.view.drop_down(ids!(main_content.form_panel.voice_section.guest_row.guest_dropdown))
    }

    /// Editor is read-only while a task is running
    fn sync_editor_lock(&mut self, cx: &mut Cx) {
        let locked = self.session.busy().is_some();
        self.transcript_editor().apply_over(cx, live! { is_read_only: (locked) });
    }

    fn set_status(&mut self, cx: &mut Cx, text: &str) {
        self.view.label(ids!(main_content.result_panel.status_section.status_label)).set_text(cx, text);
        self.view.redraw(cx);
    }

    fn set_usage(&mut self, cx: &mut Cx, text: &str) {
        self.view.label(ids!(main_content.result_panel.status_section.usage_label)).set_text(cx, text);
    }

    fn set_suggestion(&mut self, cx: &mut Cx, minutes: u32) {
        self.view
            .label(ids!(main_content.form_panel.source_section.suggestion_label))
            .set_text(cx, &format!("Suggested duration: {} minutes", minutes));
    }
}

// =====================================================
// SETUP
// =====================================================

impl PodcastScreen {
    /// Install the loaded config, restore preferences and start polling
    fn configure(&mut self, cx: &mut Cx, config: Arc<GeneratorConfig>) {
        let prefs = Preferences::load();

        self.profile = prefs.profile.unwrap_or(config.profile);
        self.style = prefs.style;
        self.speakers = prefs.speakers;
        self.provider = prefs.provider;
        self.voices = prefs.voices;
        let output_dir = prefs.output_dir.unwrap_or_else(|| config.output_dir.clone());

        if let Ok(key) = config.keys.get(Credential::OpenAi) {
            ::log::info!("Using {} at {} (key {})", config.chat.model, config.chat.api_url, mask_secret(key));
        }

        match GenerationWorker::new(config.clone()) {
            Ok(worker) => self.worker = Some(worker),
            Err(e) => {
                ::log::error!("Failed to start generation worker: {}", e);
                self.set_status(cx, &e.to_string());
                self.add_log(cx, "ERROR", &e.to_string());
            }
        }
        self.config = Some(config);

        self.view.drop_down(ids!(main_content.form_panel.settings_section.style_row.style_dropdown)).set_selected_item(cx, self.style.index());
        self.view.drop_down(ids!(main_content.form_panel.settings_section.speakers_row.speakers_dropdown)).set_selected_item(cx, self.speakers.index());
        self.view.drop_down(ids!(main_content.form_panel.settings_section.profile_row.profile_dropdown)).set_selected_item(cx, self.profile.index());
        self.view.drop_down(ids!(main_content.form_panel.voice_section.provider_row.provider_dropdown)).set_selected_item(cx, self.provider.index());
        self.populate_voice_dropdowns(cx);
        self.output_dir_input().set_text(cx, &output_dir.display().to_string());
        self.set_duration(cx, DEFAULT_DURATION_MINUTES);

        self.poll_timer = cx.start_interval(0.1);

        self.add_log(cx, "INFO", "Podcast Generator ready");
        self.add_log(cx, "INFO", &format!("Profile: {}", self.profile.label()));
        self.view.redraw(cx);
    }

    fn estimator(&self) -> Box<dyn DurationEstimator> {
        let kind = match &self.config {
            Some(config) => config.estimator(self.profile),
            None => self.profile.estimator(),
        };
        kind.build()
    }

    fn save_preferences(&self) {
        let mut prefs = Preferences::load();
        prefs.profile = Some(self.profile);
        prefs.style = self.style;
        prefs.speakers = self.speakers;
        prefs.provider = self.provider;
        prefs.voices = self.voices.clone();
        let output_dir = self.output_dir_input().text();
        if !output_dir.trim().is_empty() {
            prefs.output_dir = Some(PathBuf::from(output_dir.trim()));
        }
        prefs.save();
    }
}

// =====================================================
// FORM HANDLERS
// =====================================================

impl PodcastScreen {
    fn update_suggestion(&mut self, cx: &mut Cx, text: &str) {
        // Empty input keeps whatever suggestion is showing
        let Some(suggestion) = self.estimator().estimate(text) else {
            return;
        };
        self.set_suggestion(cx, suggestion.minutes);
        self.set_duration(cx, suggestion.minutes as f64);
    }

    /// Write `minutes` to the field and the slider
    fn set_duration(&mut self, cx: &mut Cx, minutes: f64) {
        self.duration_minutes = minutes;
        self.duration_input().set_text(cx, &format_minutes(minutes));
        self.duration_slider().set_value(cx, minutes);
    }

    fn handle_duration_entry(&mut self, cx: &mut Cx, text: &str) {
        let entry = DurationEntry::parse(text);
        let Some(minutes) = entry.minutes() else {
            return;
        };

        if matches!(entry, DurationEntry::ResetToDefault) {
            ::log::warn!("Invalid duration {:?}, reset to {}", text, format_minutes(minutes));
        }

        self.duration_minutes = minutes;
        if entry.rewrites_field() {
            self.duration_input().set_text(cx, &format_minutes(minutes));
        }
        self.duration_slider().set_value(cx, minutes);
    }

    fn handle_duration_slider(&mut self, cx: &mut Cx, value: f64) {
        let minutes = value.trunc();
        self.duration_minutes = minutes;
        self.duration_input().set_text(cx, &format_minutes(minutes));
    }

    fn handle_profile_change(&mut self, cx: &mut Cx, profile: Profile) {
        if profile == self.profile {
            return;
        }
        self.profile = profile;
        self.add_log(cx, "INFO", &format!("Profile: {}", profile.label()));
        self.save_preferences();

        let text = self.source_input().text();
        self.update_suggestion(cx, &text);
    }

    fn handle_provider_change(&mut self, cx: &mut Cx, provider: TtsProvider) {
        self.provider = provider;
        self.voices = VoiceSelection::for_provider(provider, &self.voices.host, &self.voices.guest);
        self.populate_voice_dropdowns(cx);
        self.add_log(
            cx,
            "INFO",
            &format!("Provider: {} (host {}, guest {})", provider.id(), self.voices.host, self.voices.guest),
        );
        self.save_preferences();
    }

    fn populate_voice_dropdowns(&mut self, cx: &mut Cx) {
        let voices = self.provider.voices();
        let labels: Vec<String> = voices.iter().map(|v| v.to_string()).collect();
        let position = |current: &str| voices.iter().position(|v| *v == current).unwrap_or(0);

        let host = self.host_dropdown();
        host.set_labels(cx, labels.clone());
        host.set_selected_item(cx, position(&self.voices.host));

        let guest = self.guest_dropdown();
        guest.set_labels(cx, labels);
        guest.set_selected_item(cx, position(&self.voices.guest));
    }

    fn handle_browse(&mut self, cx: &mut Cx) {
        let folder = rfd::FileDialog::new()
            .set_title("Select Output Directory")
            .pick_folder();

        if let Some(path) = folder {
            ::log::info!("Output directory: {}", path.display());
            self.output_dir_input().set_text(cx, &path.display().to_string());
            self.save_preferences();
        }
    }

    fn current_request(&self) -> PodcastRequest {
        PodcastRequest::new(
            self.source_input().text(),
            self.style,
            self.speakers,
            self.duration_minutes,
            self.prompt_input().text(),
        )
    }

    fn output_dir(&self) -> PathBuf {
        let text = self.output_dir_input().text();
        match (text.trim(), &self.config) {
            ("", Some(config)) => config.output_dir.clone(),
            ("", None) => PathBuf::from("./output"),
            (dir, _) => PathBuf::from(dir),
        }
    }
}

// =====================================================
// ACTIONS
// =====================================================

impl PodcastScreen {
    fn handle_generate_text(&mut self, cx: &mut Cx) {
        if self.worker.is_none() {
            self.set_status(cx, "Generator is not configured");
            return;
        }

        let request = self.current_request();
        if let Err(e) = self.session.begin_transcript(&request) {
            self.set_status(cx, &e.to_string());
            self.add_log(cx, e.log_level(), &e.to_string());
            return;
        }

        let profile = self.profile;
        let minutes = format_minutes(request.duration_minutes);
        if let Some(worker) = self.worker.as_mut() {
            worker.submit(GenerationCommand::Transcript { request, profile });
        }
        self.sync_editor_lock(cx);

        self.set_status(cx, "Generating podcast text...");
        self.set_usage(cx, "");
        self.add_log(cx, "INFO", &format!("Generating transcript ({} minutes, {} profile)", minutes, profile.label()));
    }

    fn handle_generate_audio(&mut self, cx: &mut Cx) {
        if self.worker.is_none() {
            self.set_status(cx, "Generator is not configured");
            return;
        }

        // The editor is the source of truth for the transcript
        let edited = self.transcript_editor().text();
        if let Err(e) = self.session.edit_transcript(&edited) {
            self.set_status(cx, &e.to_string());
            self.add_log(cx, e.log_level(), &e.to_string());
            return;
        }

        let transcript = match self.session.begin_audio() {
            Ok(transcript) => transcript,
            Err(e) => {
                self.set_status(cx, &e.to_string());
                self.add_log(cx, e.log_level(), &e.to_string());
                return;
            }
        };

        let provider = self.provider;
        let voices = self.voices.clone();
        let output_dir = self.output_dir();
        self.save_preferences();

        self.add_log(
            cx,
            "INFO",
            &format!(
                "Generating audio with {} (host {}, guest {}) into {}",
                provider.id(),
                voices.host,
                voices.guest,
                output_dir.display()
            ),
        );

        if let Some(worker) = self.worker.as_mut() {
            worker.submit(GenerationCommand::Audio {
                transcript,
                provider,
                voices,
                output_dir,
            });
        }
        self.sync_editor_lock(cx);
        self.set_status(cx, "Generating audio...");
    }

    fn handle_cancel(&mut self, cx: &mut Cx) {
        let cancelled = self.worker.as_ref().map(|w| w.cancel()).unwrap_or(false);
        if cancelled {
            self.set_status(cx, "Cancelling...");
        } else {
            self.set_status(cx, "Nothing to cancel");
        }
    }

    fn handle_clear(&mut self, cx: &mut Cx) {
        if let Some(worker) = self.worker.as_mut() {
            worker.invalidate();
        }
        self.session.clear();
        self.sync_editor_lock(cx);

        self.source_input().set_text(cx, "");
        self.transcript_editor().set_text(cx, "");
        self.prompt_input().set_text(cx, "");
        self.set_duration(cx, DEFAULT_DURATION_MINUTES);
        self.set_suggestion(cx, DEFAULT_DURATION_MINUTES as u32);
        self.set_usage(cx, "");
        self.set_status(cx, "");
        self.add_log(cx, "INFO", "Form cleared");
    }

    fn handle_open_audio(&mut self, cx: &mut Cx) {
        let Some(path) = self.session.artifact().audio_file_path.clone() else {
            self.set_status(cx, "No audio generated yet");
            return;
        };

        if let Err(e) = open::that(&path) {
            ::log::error!("Failed to open {}: {}", path.display(), e);
            self.set_status(cx, &format!("Failed to open audio: {}", e));
        }
    }

    fn poll_worker(&mut self, cx: &mut Cx) {
        let events = match self.worker.as_ref() {
            Some(worker) => worker.poll(),
            None => return,
        };

        for event in events {
            match event {
                GenerationEvent::TranscriptReady { outcome, .. } => {
                    self.session.complete_transcript(outcome.text.clone(), outcome.usage.clone());
                    self.transcript_editor().set_text(cx, &outcome.text);
                    if let Some(warning) = outcome.budget.warning() {
                        self.add_log(cx, "WARN", &warning);
                    }
                    let usage = outcome.usage.summary();
                    self.set_usage(cx, &usage);
                    self.set_status(cx, &transcript_status(&outcome));
                    self.add_log(cx, "INFO", &format!("Transcript ready. {}", usage));
                }
                GenerationEvent::AudioReady { path, .. } => {
                    let status = audio_status(&path);
                    self.session.complete_audio(path);
                    self.set_status(cx, &status);
                    self.add_log(cx, "INFO", &status);
                }
                GenerationEvent::Failed { kind, message, level, .. } => {
                    self.session.abort();
                    self.set_status(cx, &failure_status(kind, &message));
                    self.add_log(cx, level, &message);
                }
                GenerationEvent::Cancelled { kind, .. } => {
                    self.session.abort();
                    let what = match kind {
                        TaskKind::Transcript => "Text generation",
                        TaskKind::Audio => "Audio generation",
                    };
                    self.set_status(cx, &format!("{} cancelled", what));
                    self.add_log(cx, "WARN", &format!("{} cancelled", what));
                }
            }
            self.sync_editor_lock(cx);
        }
    }
}

// =====================================================
// LOG PANEL
// =====================================================

impl PodcastScreen {
    fn toggle_log_panel(&mut self, cx: &mut Cx) {
        self.log_panel_collapsed = !self.log_panel_collapsed;

        if self.log_panel_collapsed {
            self.view.view(ids!(main_content.log_section)).apply_over(cx, live!{ width: Fit });
            self.view.view(ids!(main_content.log_section.log_content_column)).set_visible(cx, false);
            self.view.button(ids!(main_content.log_section.toggle_column.toggle_log_btn)).set_text(cx, ">");
        } else {
            self.view.view(ids!(main_content.log_section)).apply_over(cx, live!{ width: (LOG_PANEL_WIDTH) });
            self.view.view(ids!(main_content.log_section.log_content_column)).set_visible(cx, true);
            self.view.button(ids!(main_content.log_section.toggle_column.toggle_log_btn)).set_text(cx, "<");
        }

        self.view.redraw(cx);
    }

    fn update_log_display(&mut self, cx: &mut Cx) {
        let wanted = match self.log_level_filter {
            1 => Some("[INFO]"),
            2 => Some("[WARN]"),
            3 => Some("[ERROR]"),
            _ => None,
        };

        let filtered: Vec<&str> = self
            .log_entries
            .iter()
            .filter(|entry| wanted.map_or(true, |level| entry.starts_with(level)))
            .map(String::as_str)
            .collect();

        // Double newlines become Markdown paragraph breaks
        let log_text = if filtered.is_empty() {
            "*No log entries*".to_string()
        } else {
            filtered.join("\n\n")
        };

        self.view
            .markdown(ids!(main_content.log_section.log_content_column.log_scroll.log_content_wrapper.log_content))
            .set_text(cx, &log_text);
        self.view.redraw(cx);
    }

    fn add_log(&mut self, cx: &mut Cx, level: &str, message: &str) {
        self.log_entries.push(format!("[{}] {}", level, message));
        if self.log_entries.len() > MAX_LOG_ENTRIES {
            let excess = self.log_entries.len() - MAX_LOG_ENTRIES;
            self.log_entries.drain(..excess);
        }
        self.update_log_display(cx);
    }
}

// =====================================================
// REF API (used by the shell)
// =====================================================

impl PodcastScreenRef {
    /// Hand the loaded configuration to the screen
    pub fn set_config(&self, cx: &mut Cx, config: Arc<GeneratorConfig>) {
        if let Some(mut inner) = self.borrow_mut() {
            inner.configure(cx, config);
        }
    }

    /// Update dark mode for this screen
    pub fn update_dark_mode(&self, cx: &mut Cx, dark_mode: f64) {
        self.on_dark_mode_change(cx, dark_mode);
    }
}

impl StateChangeListener for PodcastScreenRef {
    fn on_dark_mode_change(&self, cx: &mut Cx, dark_mode: f64) {
        if let Some(mut inner) = self.borrow_mut() {
            inner.view.apply_over(cx, live!{
                draw_bg: { dark_mode: (dark_mode) }
            });

            inner.view.label(ids!(header.title_label)).apply_over(cx, live!{
                draw_text: { dark_mode: (dark_mode) }
            });
            inner.view.label(ids!(header.header_description)).apply_over(cx, live!{
                draw_text: { dark_mode: (dark_mode) }
            });

            let panels: [&[LiveId]; 9] = [
                ids!(main_content.form_panel.source_section),
                ids!(main_content.form_panel.settings_section),
                ids!(main_content.form_panel.voice_section),
                ids!(main_content.result_panel.control_bar),
                ids!(main_content.result_panel.status_section),
                ids!(main_content.result_panel.transcript_panel),
                ids!(main_content.log_section.toggle_column),
                ids!(main_content.log_section.log_content_column),
                ids!(main_content.log_section.log_content_column.log_header),
            ];
            for panel in panels {
                inner.view.view(panel).apply_over(cx, live!{
                    draw_bg: { dark_mode: (dark_mode) }
                });
            }

            let labels: [&[LiveId]; 4] = [
                ids!(main_content.form_panel.source_section.suggestion_label),
                ids!(main_content.result_panel.status_section.status_label),
                ids!(main_content.result_panel.status_section.usage_label),
                ids!(main_content.log_section.log_content_column.log_header.log_title_row.log_title_label),
            ];
            for label in labels {
                inner.view.label(label).apply_over(cx, live!{
                    draw_text: { dark_mode: (dark_mode) }
                });
            }

            // TextInputs keep their own instance; apply_over on them fails to resolve

            let log_markdown = inner.view.markdown(ids!(main_content.log_section.log_content_column.log_scroll.log_content_wrapper.log_content));
            let log_color = if dark_mode > 0.5 {
                vec4(0.945, 0.961, 0.976, 1.0)
            } else {
                vec4(0.216, 0.255, 0.318, 1.0)
            };
            log_markdown.apply_over(cx, live!{
                font_color: (log_color)
                draw_normal: { color: (log_color) }
            });

            inner.view.redraw(cx);
        }
    }
}
