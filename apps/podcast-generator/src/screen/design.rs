//! Podcast Generator UI Design - Makepad live_design DSL

use makepad_widgets::*;
use super::PodcastScreen;

live_design! {
    use link::theme::*;
    use link::shaders::*;
    use link::widgets::*;

    use podcast_widgets::theme::*;

    SECTION_SPACING = 12.0
    PANEL_RADIUS = 4.0
    PANEL_PADDING = 12.0

    // Rounded card used by every form section
    Panel = <RoundedView> {
        width: Fill, height: Fit
        flow: Down
        spacing: 8
        padding: (PANEL_PADDING)
        show_bg: true
        draw_bg: {
            instance dark_mode: 0.0
            border_radius: (PANEL_RADIUS)
            fn pixel(self) -> vec4 {
                let sdf = Sdf2d::viewport(self.pos * self.rect_size);
                sdf.box(0., 0., self.rect_size.x, self.rect_size.y, self.border_radius);
                let bg = mix((PANEL_BG), (PANEL_BG_DARK), self.dark_mode);
                sdf.fill(bg);
                return sdf.result;
            }
        }
    }

    SectionTitle = <Label> {
        draw_text: {
            instance dark_mode: 0.0
            text_style: <FONT_SEMIBOLD>{ font_size: 14.0 }
            fn get_color(self) -> vec4 {
                return mix((TEXT_PRIMARY), (TEXT_PRIMARY_DARK), self.dark_mode);
            }
        }
    }

    FieldLabel = <Label> {
        width: 90
        draw_text: {
            instance dark_mode: 0.0
            text_style: <FONT_MEDIUM>{ font_size: 12.0 }
            fn get_color(self) -> vec4 {
                return mix((TEXT_SECONDARY), (TEXT_SECONDARY_DARK), self.dark_mode);
            }
        }
    }

    HintLabel = <Label> {
        width: Fill
        draw_text: {
            instance dark_mode: 0.0
            text_style: <FONT_REGULAR>{ font_size: 11.0 }
            wrap: Word
            fn get_color(self) -> vec4 {
                return mix((TEXT_SECONDARY), (TEXT_SECONDARY_DARK), self.dark_mode);
            }
        }
    }

    FieldRow = <View> {
        width: Fill, height: Fit
        flow: Right
        spacing: 8
        align: {y: 0.5}
    }

    FormDropDown = <DropDown> {
        width: Fill, height: 28
        popup_menu_position: BelowInput
        draw_text: {
            instance text_hover: 0.0
            text_style: <FONT_MEDIUM>{ font_size: 12.0 }
            fn get_color(self) -> vec4 {
                return mix((TEXT_PRIMARY), (BLUE_600), self.text_hover);
            }
        }
        draw_bg: {
            instance hover: 0.0
            fn pixel(self) -> vec4 {
                let sdf = Sdf2d::viewport(self.pos * self.rect_size);
                sdf.box(0., 0., self.rect_size.x, self.rect_size.y, 4.0);
                sdf.fill(mix((BLUE_100), #bfdbfe, self.hover));
                sdf.stroke((GRAY_300), 1.0);
                return sdf.result;
            }
        }
        popup_menu: {
            draw_bg: {
                color: (WHITE)
                border_color: (BORDER)
                border_size: 1.0
                border_radius: 4.0
            }
            menu_item: {
                draw_bg: {
                    color: (WHITE)
                    color_hover: (GRAY_100)
                }
                draw_text: {
                    fn get_color(self) -> vec4 {
                        return mix(
                            mix((GRAY_700), (TEXT_PRIMARY), self.active),
                            (TEXT_PRIMARY),
                            self.hover
                        );
                    }
                }
            }
        }
    }

    FormInput = <TextInput> {
        width: Fill, height: Fit
        padding: {left: 10, right: 10, top: 6, bottom: 6}
        draw_bg: {
            instance dark_mode: 0.0
            fn pixel(self) -> vec4 {
                let sdf = Sdf2d::viewport(self.pos * self.rect_size);
                sdf.box(0., 0., self.rect_size.x, self.rect_size.y, 4.0);
                sdf.fill(mix((WHITE), (SLATE_900), self.dark_mode));
                sdf.stroke(mix((BORDER), (BORDER_DARK), self.dark_mode), 1.0);
                return sdf.result;
            }
        }
        draw_text: {
            instance dark_mode: 0.0
            text_style: <FONT_REGULAR>{ font_size: 12.0 }
            word: Wrap
            fn get_color(self) -> vec4 {
                return mix((TEXT_PRIMARY), (TEXT_PRIMARY_DARK), self.dark_mode);
            }
        }
        draw_selection: {
            color: (INDIGO_200)
        }
    }

    // Filled action button; `accent` sets the fill colour
    ActionButton = <Button> {
        width: Fit, height: 30
        padding: {left: 14, right: 14}
        draw_text: {
            text_style: <FONT_MEDIUM>{ font_size: 12.0 }
            color: (WHITE)
        }
        draw_bg: {
            instance hover: 0.0
            instance accent: #3b82f6
            fn pixel(self) -> vec4 {
                let sdf = Sdf2d::viewport(self.pos * self.rect_size);
                sdf.box(0., 0., self.rect_size.x, self.rect_size.y, 4.0);
                sdf.fill(mix(self.accent, self.accent * 1.15, self.hover));
                return sdf.result;
            }
        }
        animator: {
            hover = {
                default: off
                off = { from: {all: Forward {duration: 0.1}} apply: {draw_bg: {hover: 0.0}} }
                on = { from: {all: Forward {duration: 0.1}} apply: {draw_bg: {hover: 1.0}} }
            }
        }
    }

    pub PodcastScreen = {{PodcastScreen}} {
        width: Fill, height: Fill
        flow: Down
        spacing: (SECTION_SPACING)
        padding: { left: 16, right: 16, top: 12, bottom: 12 }
        show_bg: true
        draw_bg: {
            instance dark_mode: 0.0
            fn pixel(self) -> vec4 {
                return mix((DARK_BG), (DARK_BG_DARK), self.dark_mode);
            }
        }

        header = <View> {
            width: Fill, height: Fit
            flow: Right
            spacing: 12
            align: {y: 0.5}

            icon_label = <Label> {
                text: "🎙️"
                draw_text: {
                    text_style: <FONT_BOLD>{ font_size: 28.0 }
                }
            }

            title_label = <Label> {
                text: "Podcast Generator"
                draw_text: {
                    instance dark_mode: 0.0
                    text_style: <FONT_BOLD>{ font_size: 24.0 }
                    fn get_color(self) -> vec4 {
                        return mix((TEXT_PRIMARY), (TEXT_PRIMARY_DARK), self.dark_mode);
                    }
                }
            }

            header_description = <Label> {
                text: "Turn any text into a two-voice podcast"
                draw_text: {
                    instance dark_mode: 0.0
                    text_style: <FONT_REGULAR>{ font_size: 13.0 }
                    fn get_color(self) -> vec4 {
                        return mix((TEXT_SECONDARY), (TEXT_SECONDARY_DARK), self.dark_mode);
                    }
                }
            }
        }

        main_content = <View> {
            width: Fill, height: Fill
            flow: Right
            spacing: (SECTION_SPACING)

            // Left column - request form
            form_panel = <ScrollYView> {
                width: 420, height: Fill
                flow: Down
                spacing: (SECTION_SPACING)
                scroll_bars: <ScrollBars> {
                    show_scroll_x: false
                    show_scroll_y: true
                }

                source_section = <Panel> {
                    <SectionTitle> { text: "Source Text" }

                    source_input = <FormInput> {
                        height: 180
                        empty_text: "Paste an article, notes or JSON to talk about..."
                    }

                    suggestion_label = <HintLabel> {
                        text: "Suggested duration: 5 minutes"
                    }
                }

                settings_section = <Panel> {
                    <SectionTitle> { text: "Podcast Settings" }

                    style_row = <FieldRow> {
                        <FieldLabel> { text: "Style" }
                        style_dropdown = <FormDropDown> {
                            labels: ["Conversational", "Professional", "Casual", "Academic", "Humorous", "Serious"]
                            values: [0, 1, 2, 3, 4, 5]
                        }
                    }

                    speakers_row = <FieldRow> {
                        <FieldLabel> { text: "Speakers" }
                        speakers_dropdown = <FormDropDown> {
                            labels: ["2", "3", "4"]
                            values: [0, 1, 2]
                        }
                    }

                    profile_row = <FieldRow> {
                        <FieldLabel> { text: "Profile" }
                        profile_dropdown = <FormDropDown> {
                            labels: ["Classic", "Extended"]
                            values: [0, 1]
                        }
                    }

                    duration_row = <FieldRow> {
                        <FieldLabel> { text: "Minutes" }
                        duration_input = <FormInput> {
                            width: 60
                            text: "5"
                        }
                        duration_slider = <Slider> {
                            width: Fill
                            text: ""
                            min: 1.0
                            max: 60.0
                            step: 1.0
                            default: 5.0
                            precision: 0
                        }
                    }

                    <FieldLabel> { width: Fill, text: "System Prompt" }
                    prompt_input = <FormInput> {
                        height: 110
                        empty_text: "Leave blank to use the default host prompt"
                    }
                }

                voice_section = <Panel> {
                    <SectionTitle> { text: "Voices & Output" }

                    provider_row = <FieldRow> {
                        <FieldLabel> { text: "Provider" }
                        provider_dropdown = <FormDropDown> {
                            labels: ["openai", "elevenlabs", "edge", "gemini", "geminimulti"]
                            values: [0, 1, 2, 3, 4]
                        }
                    }

                    host_row = <FieldRow> {
                        <FieldLabel> { text: "Host" }
                        host_dropdown = <FormDropDown> {
                            labels: ["alloy", "echo", "fable", "onyx", "nova", "shimmer"]
                            values: [0, 1, 2, 3, 4, 5]
                        }
                    }

                    guest_row = <FieldRow> {
                        <FieldLabel> { text: "Guest" }
                        guest_dropdown = <FormDropDown> {
                            labels: ["alloy", "echo", "fable", "onyx", "nova", "shimmer"]
                            values: [0, 1, 2, 3, 4, 5]
                        }
                    }

                    output_row = <FieldRow> {
                        <FieldLabel> { text: "Output" }
                        output_dir_input = <FormInput> {
                            text: "./output"
                        }
                        browse_button = <ActionButton> {
                            text: "Browse"
                            draw_bg: { accent: #64748b }
                        }
                    }
                }
            }

            // Middle column - actions, status and transcript
            result_panel = <View> {
                width: Fill, height: Fill
                flow: Down
                spacing: (SECTION_SPACING)

                control_bar = <Panel> {
                    flow: Right
                    align: {y: 0.5}

                    generate_text_button = <ActionButton> {
                        text: "Generate Text"
                        draw_bg: { accent: #6366f1 }
                    }
                    generate_audio_button = <ActionButton> {
                        text: "Generate Audio"
                        draw_bg: { accent: #10b981 }
                    }
                    cancel_button = <ActionButton> {
                        text: "Cancel"
                        draw_bg: { accent: #ef4444 }
                    }
                    clear_button = <ActionButton> {
                        text: "Clear"
                        draw_bg: { accent: #64748b }
                    }
                    open_audio_button = <ActionButton> {
                        text: "Open Audio"
                        draw_bg: { accent: #f59e0b }
                    }
                }

                status_section = <Panel> {
                    status_label = <Label> {
                        width: Fill
                        text: "Ready"
                        draw_text: {
                            instance dark_mode: 0.0
                            text_style: <FONT_MEDIUM>{ font_size: 12.0 }
                            wrap: Word
                            fn get_color(self) -> vec4 {
                                return mix((TEXT_PRIMARY), (TEXT_PRIMARY_DARK), self.dark_mode);
                            }
                        }
                    }
                    usage_label = <HintLabel> {
                        text: ""
                    }
                }

                transcript_panel = <Panel> {
                    height: Fill

                    <SectionTitle> { text: "Transcript" }
                    <HintLabel> { text: "Edit freely before generating audio" }

                    transcript_editor = <FormInput> {
                        height: Fill
                        empty_text: "Generated transcript appears here..."
                    }
                }
            }

            // Log panel - collapsible
            log_section = <View> {
                width: 300, height: Fill
                flow: Right

                toggle_column = <View> {
                    width: Fit, height: Fill
                    show_bg: true
                    draw_bg: {
                        instance dark_mode: 0.0
                        fn pixel(self) -> vec4 {
                            return mix((SLATE_50), (SLATE_800), self.dark_mode);
                        }
                    }
                    align: {x: 0.5, y: 0.0}
                    padding: {left: 4, right: 4, top: 8}

                    toggle_log_btn = <Button> {
                        width: Fit, height: Fit
                        padding: {left: 8, right: 8, top: 6, bottom: 6}
                        text: "<"
                        draw_text: {
                            instance dark_mode: 0.0
                            text_style: <FONT_BOLD>{ font_size: 11.0 }
                            fn get_color(self) -> vec4 {
                                return mix((SLATE_500), (SLATE_400), self.dark_mode);
                            }
                        }
                        draw_bg: {
                            instance dark_mode: 0.0
                            border_radius: 4.0
                            fn pixel(self) -> vec4 {
                                let sdf = Sdf2d::viewport(self.pos * self.rect_size);
                                sdf.box(0., 0., self.rect_size.x, self.rect_size.y, self.border_radius);
                                let base = mix((SLATE_200), (SLATE_600), self.dark_mode);
                                let hover_color = mix((SLATE_300), (SLATE_500), self.dark_mode);
                                sdf.fill(mix(base, hover_color, self.hover));
                                return sdf.result;
                            }
                        }
                    }
                }

                log_content_column = <RoundedView> {
                    width: Fill, height: Fill
                    flow: Down
                    draw_bg: {
                        instance dark_mode: 0.0
                        border_radius: (PANEL_RADIUS)
                        fn get_color(self) -> vec4 {
                            return mix((PANEL_BG), (PANEL_BG_DARK), self.dark_mode);
                        }
                    }

                    log_header = <View> {
                        width: Fill, height: Fit
                        flow: Down
                        show_bg: true
                        draw_bg: {
                            instance dark_mode: 0.0
                            fn pixel(self) -> vec4 {
                                return mix((SLATE_50), (SLATE_800), self.dark_mode);
                            }
                        }

                        log_title_row = <View> {
                            width: Fill, height: Fit
                            padding: {left: 12, right: 12, top: 10, bottom: 6}
                            log_title_label = <SectionTitle> {
                                text: "Activity Log"
                            }
                        }

                        log_filter_row = <View> {
                            width: Fill, height: 32
                            flow: Right
                            align: {y: 0.5}
                            padding: {left: 8, right: 8, bottom: 6}
                            spacing: 6

                            level_filter = <FormDropDown> {
                                width: 80, height: 24
                                labels: ["ALL", "INFO", "WARN", "ERROR"]
                                values: [0, 1, 2, 3]
                            }

                            clear_log_btn = <Button> {
                                width: 60, height: 24
                                text: "Clear"
                                draw_text: {
                                    text_style: <FONT_MEDIUM>{ font_size: 10.0 }
                                    color: (TEXT_PRIMARY)
                                }
                                draw_bg: {
                                    fn pixel(self) -> vec4 {
                                        let sdf = Sdf2d::viewport(self.pos * self.rect_size);
                                        sdf.box(0., 0., self.rect_size.x, self.rect_size.y, 4.0);
                                        sdf.fill((GRAY_200));
                                        return sdf.result;
                                    }
                                }
                            }
                        }
                    }

                    log_scroll = <ScrollYView> {
                        width: Fill, height: Fill
                        flow: Down
                        scroll_bars: <ScrollBars> {
                            show_scroll_x: false
                            show_scroll_y: true
                        }

                        log_content_wrapper = <View> {
                            width: Fill, height: Fit
                            padding: {left: 12, right: 12, top: 8, bottom: 8}
                            flow: Down

                            log_content = <Markdown> {
                                width: Fill,
                                font_size: 10.0
                                font_color: (GRAY_700)
                                paragraph_spacing: 4
                            }
                        }
                    }
                }
            }
        }
    }
}
