// src/color.rs

//! Packed 32-bit ARGB helpers.
//!
//! Pixels are plain `u32` values laid out as `0xAARRGGBB`. On little-endian
//! hosts that is `B, G, R, A` in memory, which is what both the X11 TrueColor
//! visuals and 32-bpp Win32 DIBs expect, so the renderer never converts.

pub const WHITE: u32 = 0xFFFF_FFFF;
/// Zero color; a freshly created buffer is filled with it.
pub const TRANSPARENT: u32 = 0x0000_0000;

/// Packs the four channels into `0xAARRGGBB`.
#[inline]
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Opaque color from red, green and blue.
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    argb(0xFF, r, g, b)
}

/// Parses `#RRGGBB` (opaque) or `#AARRGGBB`. The leading `#` is optional.
pub fn parse_hex(s: &str) -> Option<u32> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        6 => u32::from_str_radix(digits, 16).ok().map(|v| 0xFF00_0000 | v),
        8 => u32::from_str_radix(digits, 16).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn packs_components_in_argb_order() {
        assert_eq!(argb(0x12, 0x34, 0x56, 0x78), 0x1234_5678);
        assert_eq!(rgb(255, 0, 0), 0xFFFF_0000);
    }

    #[test]
    fn parses_hex_strings() {
        assert_eq!(parse_hex("#102030"), Some(0xFF10_2030));
        assert_eq!(parse_hex("80102030"), Some(0x8010_2030));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#+12345"), None);
        assert_eq!(parse_hex("#GG0000"), None);
    }
}
