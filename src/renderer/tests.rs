// src/renderer/tests.rs

use super::Renderer;
use crate::color::{TRANSPARENT, WHITE};
use crate::error::PlatformError;
use crate::platform::headless::{
    FailAt, HeadlessOptions, HeadlessWindow, Resource, ResourceLedger,
};
use crate::platform::PlatformWindow;
use test_log::test;

fn window(width: u32, height: u32) -> HeadlessWindow {
    HeadlessWindow::open(width, height, "renderer test").unwrap()
}

/// Coordinates of every pixel that differs from `background`.
fn painted(renderer: &Renderer<HeadlessWindow>, background: u32) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    for y in 0..renderer.height() {
        for x in 0..renderer.width() {
            if renderer.pixel(x, y) != Some(background) {
                out.push((x, y));
            }
        }
    }
    out
}

#[test]
fn create_yields_zeroed_buffer_of_window_size() {
    for (w, h) in [(1, 1), (10, 10), (64, 3), (3, 64)] {
        let win = window(w, h);
        let renderer = Renderer::create(&win).unwrap();
        assert_eq!((renderer.width(), renderer.height()), (w, h));
        assert_eq!(renderer.pixels().len(), (w * h) as usize);
        assert!(renderer.pixels().iter().all(|&p| p == TRANSPARENT));
    }
}

#[test]
fn clear_sets_every_pixel() {
    let win = window(13, 7);
    let mut renderer = Renderer::create(&win).unwrap();
    for color in [0xFF00_0000, 0x1234_5678, WHITE, 0] {
        renderer.clear(color);
        assert!(renderer.pixels().iter().all(|&p| p == color));
    }
}

#[test]
fn draw_rect_clips_at_the_top_left_corner() {
    let win = window(10, 10);
    let mut renderer = Renderer::create(&win).unwrap();
    renderer.clear(0);
    renderer.draw_rect(-2, -2, 5, 5, WHITE);

    let expected: Vec<(u32, u32)> = (0..3).flat_map(|y| (0..3).map(move |x| (x, y))).collect();
    assert_eq!(painted(&renderer, 0), expected);
    assert!(expected
        .iter()
        .all(|&(x, y)| renderer.pixel(x, y) == Some(WHITE)));
}

#[test]
fn draw_rect_clips_at_the_bottom_right_corner() {
    let win = window(10, 10);
    let mut renderer = Renderer::create(&win).unwrap();
    renderer.draw_rect(8, 9, 100, 100, WHITE);
    assert_eq!(painted(&renderer, 0), vec![(8, 9), (9, 9)]);
}

#[test]
fn draw_rect_interior_fills_exact_region() {
    let win = window(6, 5);
    let mut renderer = Renderer::create(&win).unwrap();
    renderer.draw_rect(1, 2, 3, 2, 0xFFAA_0000);
    assert_eq!(
        painted(&renderer, 0),
        vec![(1, 2), (2, 2), (3, 2), (1, 3), (2, 3), (3, 3)]
    );
}

#[test]
fn degenerate_or_offscreen_rects_touch_nothing() {
    let win = window(10, 10);
    let mut renderer = Renderer::create(&win).unwrap();
    renderer.clear(0xFF10_2030);
    let before = renderer.pixels().to_vec();

    renderer.draw_rect(2, 2, 0, 5, WHITE);
    renderer.draw_rect(2, 2, 5, 0, WHITE);
    renderer.draw_rect(2, 2, -3, 4, WHITE);
    renderer.draw_rect(10, 0, 5, 5, WHITE);
    renderer.draw_rect(0, 10, 5, 5, WHITE);
    renderer.draw_rect(-5, -5, 5, 5, WHITE);
    renderer.draw_rect(-20, 3, 4, 4, WHITE);

    assert_eq!(renderer.pixels(), &before[..]);
}

#[test]
fn draw_rect_survives_extreme_coordinates() {
    let win = window(4, 4);
    let mut renderer = Renderer::create(&win).unwrap();
    renderer.draw_rect(i32::MAX, i32::MAX, i32::MAX, i32::MAX, WHITE);
    renderer.draw_rect(i32::MIN, i32::MIN, i32::MAX, i32::MAX, WHITE);
    assert!(renderer.pixels().iter().all(|&p| p == 0));

    renderer.draw_rect(-1, -1, i32::MAX, i32::MAX, WHITE);
    assert!(renderer.pixels().iter().all(|&p| p == WHITE));
}

#[test]
fn pixel_outside_buffer_is_none() {
    let win = window(3, 2);
    let renderer = Renderer::create(&win).unwrap();
    assert_eq!(renderer.pixel(3, 0), None);
    assert_eq!(renderer.pixel(0, 2), None);
    assert_eq!(renderer.pixel(2, 1), Some(0));
}

#[test]
fn present_copies_buffer_to_visible_surface() {
    let win = window(4, 4);
    let mut renderer = Renderer::create(&win).unwrap();
    renderer.clear(0xFF00_00FF);
    renderer.draw_rect(1, 1, 2, 2, WHITE);
    assert!(win.visible_surface().is_empty());

    renderer.present(&win);
    assert_eq!(win.visible_surface(), renderer.pixels());
}

#[test]
fn presenting_twice_shows_the_same_surface() {
    let win = window(5, 5);
    let mut renderer = Renderer::create(&win).unwrap();
    renderer.clear(0xFF33_3333);
    renderer.draw_rect(0, 0, 2, 2, WHITE);

    renderer.present(&win);
    let first = win.visible_surface();
    renderer.present(&win);
    let second = win.visible_surface();

    assert_eq!(first, second);
    assert_eq!(win.present_count(), 2);
}

#[test]
fn writes_are_visible_through_the_image_view_without_rebuilding_it() {
    let win = window(2, 2);
    let mut renderer = Renderer::create(&win).unwrap();
    renderer.present(&win);
    renderer.clear(WHITE);
    renderer.present(&win);
    assert!(win.visible_surface().iter().all(|&p| p == WHITE));
    assert_eq!(win.ledger().acquired(Resource::ImageView), 1);
}

#[test]
fn surface_failure_reports_surface_error_and_leaks_nothing() {
    let ledger = ResourceLedger::new();
    let options = HeadlessOptions {
        fail_at: Some(FailAt::Surface),
        ledger: ledger.clone(),
        ..HeadlessOptions::default()
    };
    let win = HeadlessWindow::open_with(8, 8, "surface failure", options).unwrap();

    let err = Renderer::create(&win).err().unwrap();
    assert!(matches!(err, PlatformError::Surface(_)));
    assert_eq!(ledger.acquired(Resource::ImageView), 0);

    win.close();
    assert_eq!(ledger.outstanding(), 0);
}

#[test]
fn destroy_releases_the_image_view_exactly_once() {
    let win = window(8, 8);
    let ledger = win.ledger().clone();
    let renderer = Renderer::create(&win).unwrap();
    assert_eq!(ledger.acquired(Resource::ImageView), 1);

    renderer.destroy();
    assert_eq!(ledger.released(Resource::ImageView), 1);

    win.close();
    assert_eq!(ledger.outstanding(), 0);
}

#[test]
fn dimensions_are_snapshotted_at_create() {
    let win = window(9, 4);
    let renderer = Renderer::create(&win).unwrap();
    assert_eq!(renderer.width(), win.width());
    assert_eq!(renderer.height(), win.height());
}
