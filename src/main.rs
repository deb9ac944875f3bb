//! jamkit demo
//!
//! Runs the built-in states on a 384x256 indexed framebuffer, scaled up
//! with nearest filtering. The demo song is generated a slice per frame
//! and starts looping once it is ready.

use std::sync::Arc;

use jamkit::game::{KeyState, StateMachine};
use jamkit::rasterizer::{Framebuffer, HEIGHT, WIDTH};
use jamkit::synth::{Job, Slice, Song, SongRender, StereoBuffer, Step, ToStereo};
use jamkit::{JamConfig, VERSION};
use macroquad::prelude::*;

const CONFIG_PATH: &str = "jam.ron";

/// Loop iterations per generation slice where there is no wall clock
#[cfg(target_arch = "wasm32")]
const WASM_SLICE_UNITS: u64 = 200_000;

/// Window scale until the config has been read
const DEFAULT_SCALE: i32 = 3;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("jamkit v{}", VERSION),
        window_width: WIDTH as i32 * DEFAULT_SCALE,
        window_height: HEIGHT as i32 * DEFAULT_SCALE,
        window_resizable: true,
        ..Default::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn load_config() -> JamConfig {
    if !std::path::Path::new(CONFIG_PATH).exists() {
        return JamConfig::default();
    }
    match JamConfig::load(CONFIG_PATH) {
        Ok(config) => {
            log::info!("loaded {}", CONFIG_PATH);
            config
        }
        Err(e) => {
            log::warn!("ignoring {}: {}", CONFIG_PATH, e);
            JamConfig::default()
        }
    }
}

/// Background song generation, advanced once per frame
enum Music {
    Rendering(SongRender),
    Converting(ToStereo),
    Ready(Arc<StereoBuffer>),
    Off,
}

impl Music {
    fn start(config: &JamConfig) -> Self {
        match Song::demo() {
            Ok(song) => Music::Rendering(SongRender::new(song, config.audio.noise_seed)),
            Err(e) => {
                log::error!("demo song failed to load: {}", e);
                Music::Off
            }
        }
    }

    fn progress(&self) -> Option<f32> {
        match self {
            Music::Rendering(job) => Some(0.9 * job.progress()),
            Music::Converting(job) => Some(0.9 + 0.1 * job.progress()),
            _ => None,
        }
    }

    /// Run one slice. Returns the finished buffer on the frame it completes.
    fn advance(&mut self, slice: &mut Slice) -> Option<Arc<StereoBuffer>> {
        match self {
            Music::Rendering(job) => {
                if let Step::Ready(master) = job.resume(slice) {
                    *self = Music::Converting(ToStereo::new(master));
                }
                None
            }
            Music::Converting(job) => match job.resume(slice) {
                Step::Ready(stereo) => {
                    log::info!("song ready: {:.1} s", stereo.duration_secs());
                    let stereo = Arc::new(stereo);
                    *self = Music::Ready(Arc::clone(&stereo));
                    Some(stereo)
                }
                Step::Pending => None,
            },
            Music::Ready(_) | Music::Off => None,
        }
    }
}

fn frame_slice(config: &JamConfig) -> Slice {
    #[cfg(not(target_arch = "wasm32"))]
    {
        Slice::timed(config.audio.slice_budget())
    }
    #[cfg(target_arch = "wasm32")]
    {
        let _ = config;
        Slice::work(WASM_SLICE_UNITS)
    }
}

/// Draw the framebuffer centred in the window, scaled to fit
fn present(fb: &Framebuffer, rgba: &mut [u8]) {
    fb.present_rgba8(rgba);
    let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, rgba);
    texture.set_filter(FilterMode::Nearest);

    let (fw, fh) = (fb.width as f32, fb.height as f32);
    let scale = (screen_width() / fw).min(screen_height() / fh);
    let (draw_w, draw_h) = (fw * scale, fh * scale);
    draw_texture_ex(
        &texture,
        (screen_width() - draw_w) / 2.0,
        (screen_height() - draw_h) / 2.0,
        WHITE,
        DrawTextureParams {
            dest_size: Some(Vec2::new(draw_w, draw_h)),
            ..Default::default()
        },
    );
}

#[macroquad::main(window_conf)]
async fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    init_logging();

    let config = load_config();
    let scale = config.display.scale.max(1) as f32;
    request_new_screen_size(config.display.width as f32 * scale, config.display.height as f32 * scale);
    let mut fb = Framebuffer::from_config(&config.display);
    let mut rgba = vec![0u8; fb.page_size() * 4];
    let mut states = StateMachine::new();
    let mut keys = KeyState::new();
    let mut music = Music::start(&config);

    #[cfg(not(target_arch = "wasm32"))]
    let audio = match jamkit::audio::AudioOutput::open() {
        Ok(out) => Some(out),
        Err(e) => {
            log::warn!("audio disabled: {}", e);
            None
        }
    };

    log::info!("jamkit v{}: {}x{}, {} pages", VERSION, fb.width, fb.height, fb.pages());

    loop {
        #[cfg(not(target_arch = "wasm32"))]
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        if let Some(song) = music.advance(&mut frame_slice(&config)) {
            #[cfg(not(target_arch = "wasm32"))]
            if let (Some(out), true) = (&audio, config.audio.autoplay) {
                out.with_mixer(|mixer| mixer.play(song, 1.0, 0.0, true));
            }
            #[cfg(target_arch = "wasm32")]
            drop(song);
        }

        keys.poll();
        states.frame(get_frame_time(), &keys, &mut fb);
        keys.update();

        #[cfg(not(target_arch = "wasm32"))]
        if is_key_pressed(KeyCode::F12) {
            match fb.save_png("screenshot.png") {
                Ok(()) => log::info!("saved screenshot.png"),
                Err(e) => log::warn!("screenshot failed: {}", e),
            }
        }

        clear_background(BLACK);
        present(&fb, &mut rgba);
        if let Some(p) = music.progress() {
            draw_text(&format!("generating music {:.0}%", p * 100.0), 8.0, screen_height() - 8.0, 20.0, GRAY);
        }

        next_frame().await;
    }
}
