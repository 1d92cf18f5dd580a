// src/platform/x11/tests.rs

// These exercise event translation and visual checks on hand-built Xlib
// structs; nothing here talks to an X server.

use super::surface::{check_image_layout, check_visual};
use super::translate_event;
use crate::error::PlatformError;
use crate::event::{drain_events, CloseToken, PollStatus, WindowEvent};
use libc::{c_int, c_long, c_ulong};
use std::mem;
use test_log::test;
use x11::xlib;

fn event_of_type(type_: libc::c_int) -> xlib::XEvent {
    let mut xevent: xlib::XEvent = unsafe { mem::zeroed() };
    xevent.type_ = type_;
    xevent
}

fn client_message(payload: xlib::Atom) -> xlib::XEvent {
    let mut xevent = event_of_type(xlib::ClientMessage);
    unsafe {
        xevent.client_message.format = 32;
        xevent.client_message.data.set_long(0, payload as c_long);
    }
    xevent
}

#[test]
fn key_press_translates_to_key_press() {
    assert_eq!(
        translate_event(&event_of_type(xlib::KeyPress)),
        WindowEvent::KeyPress
    );
}

#[test]
fn client_message_carries_its_first_long_as_token() {
    assert_eq!(
        translate_event(&client_message(42)),
        WindowEvent::CloseRequest {
            token: CloseToken::new(42)
        }
    );
}

#[test]
fn unrelated_events_translate_to_other() {
    for type_ in [
        xlib::Expose,
        xlib::KeyRelease,
        xlib::ButtonPress,
        xlib::MotionNotify,
        xlib::ConfigureNotify,
        xlib::FocusIn,
    ] {
        assert_eq!(translate_event(&event_of_type(type_)), WindowEvent::Other);
    }
}

#[test]
fn only_the_registered_atom_closes() {
    let registered = CloseToken::new(77);
    let foreign = [translate_event(&client_message(78))];
    let ours = [translate_event(&client_message(77))];
    assert_eq!(drain_events(foreign, registered), PollStatus::Continue);
    assert_eq!(drain_events(ours, registered), PollStatus::Exit);
}

fn visual(class: c_int, red: c_ulong, green: c_ulong, blue: c_ulong) -> xlib::Visual {
    let mut visual: xlib::Visual = unsafe { mem::zeroed() };
    visual.class = class;
    visual.red_mask = red;
    visual.green_mask = green;
    visual.blue_mask = blue;
    visual
}

fn rgb_visual(class: c_int) -> xlib::Visual {
    visual(class, 0xFF_0000, 0xFF00, 0xFF)
}

#[test]
fn standard_true_color_visual_is_accepted_at_depth_24_and_32() {
    let mut v = rgb_visual(xlib::TrueColor);
    assert_eq!(check_visual(&mut v, 24), Ok(()));
    assert_eq!(check_visual(&mut v, 32), Ok(()));
}

#[test]
fn swapped_channel_masks_are_a_surface_error() {
    let mut bgr = visual(xlib::TrueColor, 0xFF, 0xFF00, 0xFF_0000);
    match check_visual(&mut bgr, 24) {
        Err(PlatformError::Surface(msg)) => assert!(msg.contains("channel masks"), "{}", msg),
        other => panic!("expected a surface error, got {:?}", other),
    }
}

#[test]
fn other_depths_are_a_surface_error() {
    let mut v = rgb_visual(xlib::TrueColor);
    for depth in [8, 15, 16, 30] {
        assert!(matches!(
            check_visual(&mut v, depth),
            Err(PlatformError::Surface(_))
        ));
    }
}

#[test]
fn non_true_color_classes_are_a_surface_error() {
    for class in [
        xlib::DirectColor,
        xlib::PseudoColor,
        xlib::StaticGray,
        xlib::GrayScale,
        xlib::StaticColor,
    ] {
        let mut v = rgb_visual(class);
        assert!(matches!(
            check_visual(&mut v, 24),
            Err(PlatformError::Surface(_))
        ));
    }
}

#[test]
fn only_32_bit_image_layouts_are_accepted() {
    assert_eq!(check_image_layout(32), Ok(()));
    for bpp in [8, 16, 24] {
        assert!(matches!(
            check_image_layout(bpp),
            Err(PlatformError::Surface(_))
        ));
    }
}
