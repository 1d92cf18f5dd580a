// src/app.rs

//! The demo application loop: a framed backdrop with one bouncing rectangle.
//!
//! Each iteration polls the window and, unless it asked to exit, runs the
//! renderer's frame protocol `clear` → `draw_rect`* → `present`.

use crate::config::{Config, SceneConfig};
use crate::platform::PlatformWindow;
use crate::renderer::Renderer;
use log::{debug, info, trace};
use std::time::Duration;

pub struct App {
    scene: SceneConfig,
    frame_interval: Duration,
    rect_x: i32,
    rect_y: i32,
    velocity_x: i32,
    velocity_y: i32,
    frames: u64,
}

/// Advances one axis and reflects off `[min, max]`.
fn bounce(pos: i32, velocity: i32, min: i32, max: i32) -> (i32, i32) {
    if max <= min {
        return (min, velocity);
    }
    let next = pos.saturating_add(velocity);
    if next < min {
        (min, velocity.saturating_neg())
    } else if next > max {
        (max, velocity.saturating_neg())
    } else {
        (next, velocity)
    }
}

fn as_coord(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

impl App {
    pub fn new(config: &Config) -> Self {
        let scene = config.scene.clone();
        let start = scene.border_width.max(0);
        Self {
            rect_x: start,
            rect_y: start,
            velocity_x: scene.velocity_x,
            velocity_y: scene.velocity_y,
            frame_interval: Duration::from_millis(config.frame.min_frame_interval_ms),
            scene,
            frames: 0,
        }
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Top-left corner of the bouncing rectangle in the next frame.
    pub fn rect_position(&self) -> (i32, i32) {
        (self.rect_x, self.rect_y)
    }

    /// Draws one frame into `renderer` and advances the animation.
    pub fn draw_frame<W: PlatformWindow>(&mut self, renderer: &mut Renderer<W>) {
        let width = as_coord(renderer.width());
        let height = as_coord(renderer.height());
        let scene = &self.scene;

        renderer.clear(scene.background);

        let bw = scene.border_width;
        if bw > 0 {
            renderer.draw_rect(0, 0, width, bw, scene.border_color);
            renderer.draw_rect(0, height.saturating_sub(bw), width, bw, scene.border_color);
            renderer.draw_rect(0, 0, bw, height, scene.border_color);
            renderer.draw_rect(width.saturating_sub(bw), 0, bw, height, scene.border_color);
        }

        renderer.draw_rect(
            self.rect_x,
            self.rect_y,
            scene.rect_width,
            scene.rect_height,
            scene.rect_color,
        );

        let inset = bw.max(0);
        (self.rect_x, self.velocity_x) = bounce(
            self.rect_x,
            self.velocity_x,
            inset,
            width.saturating_sub(inset).saturating_sub(scene.rect_width),
        );
        (self.rect_y, self.velocity_y) = bounce(
            self.rect_y,
            self.velocity_y,
            inset,
            height.saturating_sub(inset).saturating_sub(scene.rect_height),
        );
    }

    /// Runs until the window reports exit. Returns the number of frames presented.
    pub fn run<W: PlatformWindow>(&mut self, window: &mut W, renderer: &mut Renderer<W>) -> u64 {
        self.run_frames(window, renderer, u64::MAX)
    }

    /// Like [`run`](App::run) but presents at most `max_frames` frames.
    pub fn run_frames<W: PlatformWindow>(
        &mut self,
        window: &mut W,
        renderer: &mut Renderer<W>,
        max_frames: u64,
    ) -> u64 {
        info!("Starting main loop...");
        let start = self.frames;
        while self.frames - start < max_frames {
            if window.poll().is_exit() {
                info!("Exit requested after {} frames.", self.frames);
                break;
            }
            self.draw_frame(renderer);
            renderer.present(window);
            self.frames += 1;
            trace!("Frame {} presented", self.frames);

            if !self.frame_interval.is_zero() {
                std::thread::sleep(self.frame_interval);
            }
        }
        debug!("Main loop finished: {} frames this run", self.frames - start);
        self.frames - start
    }
}
