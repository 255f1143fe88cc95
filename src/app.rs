use crate::audio::duration::probe_duration;
use crate::audio::player::AudioPlayer;
use crate::config::Settings;
use crate::controller::{Controller, ControllerEvent};
use crate::error::Result;
use crate::utils::album_art::load_thumbnail;
use eframe::egui::load::SizedTexture;
use eframe::egui::{
    self, CentralPanel, Color32, Context, Layout, Rect, RichText, ScrollArea, SidePanel, Slider,
    TextureHandle, TextureOptions, Vec2,
};
use eframe::Frame;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const ACCENT_COLOR: Color32 = Color32::from_rgb(0x03, 0x45, 0xfc);
const LIGHTER_ACCENT_COLOR: Color32 = Color32::from_rgb(0x66, 0x99, 0xFF);
const MODE_OFF_COLOR: Color32 = Color32::from_rgb(0x00, 0x7a, 0xcc);
const MODE_ON_COLOR: Color32 = Color32::from_rgb(0xa0, 0xa0, 0xa0);
const ART_PLACEHOLDER_COLOR: Color32 = Color32::from_rgb(0xf0, 0xf0, 0xf0);
const NO_MATCH_MESSAGE: &str = "No matching songs found.";

pub struct PlayerApp {
    controller: Controller<AudioPlayer>,
    thumbnail_size: u32,
    track_names: Vec<String>,
    song_label: String,
    total_duration: Duration,
    album_art: Option<TextureHandle>,
    volume: i32,
    search_query: String,
    info_message: Option<String>,
}

impl PlayerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let mut controller =
            Controller::new(AudioPlayer::default(), settings.library.scan_options());
        let volume = i32::from(controller.set_volume(settings.player.initial_volume));

        if let Some(folder) = &settings.library.start_folder {
            controller.select_folder(folder);
        }

        Self {
            controller,
            thumbnail_size: settings.art.thumbnail_size,
            track_names: Vec::new(),
            song_label: String::new(),
            total_duration: Duration::ZERO,
            album_art: None,
            volume,
            search_query: String::new(),
            info_message: None,
        }
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        ctx.request_repaint_after(Duration::from_millis(30));
        self.apply_events(ctx);

        self.render_ui(ctx);
    }
}

impl PlayerApp {
    /// Syncs widget state with whatever the controller reported since the
    /// previous frame.
    fn apply_events(&mut self, ctx: &Context) {
        for event in self.controller.drain_events() {
            match event {
                ControllerEvent::PlaylistChanged => {
                    self.track_names = self.controller.state().display_names();
                }
                ControllerEvent::NowPlaying(index) => self.show_now_playing(index),
                // Button fills are read from the state every frame.
                ControllerEvent::ModesChanged { .. } => {}
                ControllerEvent::AlbumArtChanged(path) => {
                    self.album_art = path.and_then(|path| self.load_art(ctx, &path));
                }
                ControllerEvent::VolumeChanged(volume) => self.volume = i32::from(volume),
                ControllerEvent::NoMatch(_) => {
                    self.info_message = Some(NO_MATCH_MESSAGE.to_string());
                }
            }
        }
    }

    fn show_now_playing(&mut self, index: usize) {
        self.song_label = self.track_names.get(index).cloned().unwrap_or_default();

        let Some(path) = self.controller.state().playlist.get(index) else {
            return;
        };
        self.total_duration = probe_duration(path).unwrap_or_else(|err| {
            debug!(track = %path.display(), "{err}");
            Duration::ZERO
        });
    }

    fn load_art(&self, ctx: &Context, path: &Path) -> Option<TextureHandle> {
        match load_thumbnail(path, self.thumbnail_size) {
            Ok(image) => Some(ctx.load_texture("album_art", image, TextureOptions::LINEAR)),
            Err(err) => {
                warn!(art = %path.display(), "{err}");
                None
            }
        }
    }

    /// Controller errors here are empty-playlist or stale-index conditions
    /// from a button press; there is nothing to tell the user.
    fn run(&mut self, action: impl FnOnce(&mut Controller<AudioPlayer>) -> Result<()>) {
        if let Err(err) = action(&mut self.controller) {
            debug!("Ignored: {err}");
        }
    }

    fn render_ui(&mut self, ctx: &Context) {
        self.render_sidebar(ctx);
        self.render_main_panel(ctx);
        self.render_info_window(ctx);
    }

    fn render_sidebar(&mut self, ctx: &Context) {
        SidePanel::left("side_panel").default_width(200.0).show(ctx, |ui| {
            ui.heading("Music Player");
            ui.separator();

            if ui.button("Select Folder").clicked() {
                if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                    self.controller.select_folder(&dir);
                }
            }

            ui.separator();

            let mut track_to_play: Option<usize> = None;

            let state = self.controller.state();

            ScrollArea::vertical().show(ui, |ui| {
                for (index, name) in self.track_names.iter().enumerate() {
                    if ui.selectable_label(state.is_current(index), name).clicked() {
                        track_to_play = Some(index);
                    }
                }
            });

            if let Some(index) = track_to_play {
                self.run(|c| c.select_track(index));
            }
        });
    }

    fn render_main_panel(&mut self, ctx: &Context) {
        CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("▶ Play").clicked() {
                    self.run(|c| c.play());
                }
                if ui.button("⏸ Pause").clicked() {
                    self.controller.pause();
                }
                if ui.button("Resume").clicked() {
                    self.controller.resume();
                }
                if ui.button("⏹ Stop").clicked() {
                    self.controller.stop();
                }
                if ui.button("Previous").clicked() {
                    self.run(|c| c.previous());
                }
                if ui.button("Next").clicked() {
                    self.run(|c| c.next());
                }
            });

            ui.horizontal(|ui| {
                let state = self.controller.state();
                let (shuffle, repeat) = (state.shuffle, state.repeat);
                if mode_button(ui, "Shuffle", shuffle).clicked() {
                    self.controller.toggle_shuffle();
                }
                if mode_button(ui, "Repeat", repeat).clicked() {
                    self.controller.toggle_repeat();
                }
            });

            if ui
                .add(Slider::new(&mut self.volume, 0..=100).text("Volume"))
                .changed()
            {
                self.controller.set_volume(self.volume);
            }

            ui.horizontal(|ui| {
                let response = ui.text_edit_singleline(&mut self.search_query);
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Search").clicked() || submitted {
                    let query = self.search_query.clone();
                    self.run(|c| c.search(&query).map(drop));
                }
            });

            ui.separator();

            ui.vertical_centered(|ui| {
                self.render_album_art(ui);
                ui.label(RichText::new(&self.song_label).size(16.0));
            });

            self.render_progress(ui);
        });
    }

    fn render_album_art(&self, ui: &mut egui::Ui) {
        let size = Vec2::splat(self.thumbnail_size as f32);
        match &self.album_art {
            Some(texture) => {
                ui.add(
                    egui::Image::from_texture(SizedTexture::from_handle(texture))
                        .fit_to_exact_size(size),
                );
            }
            None => {
                let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                ui.painter().rect_filled(rect, 4.0, ART_PLACEHOLDER_COLOR);
            }
        }
    }

    fn render_progress(&self, ui: &mut egui::Ui) {
        let progress_secs = self.controller.engine().progress().as_secs();
        let total_secs = self.total_duration.as_secs();

        let ratio = if total_secs > 0 {
            (progress_secs as f32 / total_secs as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let bar_height = 6.0;
        let horizontal_padding = 12.0;

        ui.add_space(5.0);

        let (outer_rect, _) = ui.allocate_exact_size(
            Vec2::new(ui.available_width(), bar_height),
            egui::Sense::hover(),
        );
        let bar_rect = Rect {
            min: outer_rect.min + Vec2::new(horizontal_padding, 0.0),
            max: outer_rect.max - Vec2::new(horizontal_padding, 0.0),
        };
        ui.painter().rect_filled(bar_rect, 3.0, LIGHTER_ACCENT_COLOR);

        let played_rect = Rect {
            min: bar_rect.min,
            max: egui::pos2(bar_rect.min.x + bar_rect.width() * ratio, bar_rect.max.y),
        };
        ui.painter().rect_filled(played_rect, 3.0, ACCENT_COLOR);

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_space(horizontal_padding);
            ui.label(format_time(progress_secs));
            ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add_space(horizontal_padding);
                ui.label(format_time(total_secs));
            });
        });
    }

    fn render_info_window(&mut self, ctx: &Context) {
        let Some(message) = &self.info_message else {
            return;
        };

        let mut open = true;
        let mut dismissed = false;
        egui::Window::new("Search Result")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(message.as_str());
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if !open || dismissed {
            self.info_message = None;
        }
    }
}

fn mode_button(ui: &mut egui::Ui, label: &str, on: bool) -> egui::Response {
    let fill = if on { MODE_ON_COLOR } else { MODE_OFF_COLOR };
    ui.add(egui::Button::new(RichText::new(label).color(Color32::WHITE)).fill(fill))
}

fn format_time(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
