//! Color conversions between `#rrggbb` codes and RGB/HSL/HSV triples.
//!
//! Hue is in degrees `[0, 360)`; saturation, lightness and value are
//! percentages `[0, 100]`. Converting hex → HSL → hex reproduces every
//! channel within ±1.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// Validate a user-supplied `#rrggbb` code and normalize it to lowercase.
pub fn parse_hex(code: &str) -> Result<String> {
    let code = code.trim();
    let digits = code
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| Error::InvalidColor(code.to_string()))?;
    Ok(format!("#{}", digits.to_ascii_lowercase()))
}

/// Split a `#rrggbb` code into channels.
pub fn hex_to_rgb(code: &str) -> Result<Rgb> {
    let code = parse_hex(code)?;
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&code[range], 16).map_err(|_| Error::InvalidColor(code.clone()))
    };
    Ok(Rgb {
        r: channel(1..3)?,
        g: channel(3..5)?,
        b: channel(5..7)?,
    })
}

pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let (r, g, b) = (f64::from(rgb.r), f64::from(rgb.g), f64::from(rgb.b));
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;

    let h = if chroma == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / chroma)
    } else if max == g {
        60.0 * ((b - r) / chroma) + 120.0
    } else {
        60.0 * ((r - g) / chroma) + 240.0
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let l = (max + min) / 2.0 * (100.0 / 255.0);
    let s = if chroma == 0.0 {
        0.0
    } else {
        chroma / (max + min).min(510.0 - max - min) * 100.0
    };

    Hsl { h, s, l }
}

pub fn hex_to_hsl(code: &str) -> Result<Hsl> {
    hex_to_rgb(code).map(rgb_to_hsl)
}

pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = hsl.h.rem_euclid(360.0);
    let spread = hsl.l.min(100.0 - hsl.l) * hsl.s / 100.0;
    let max = 2.55 * (hsl.l + spread);
    let min = 2.55 * (hsl.l - spread);
    let ramp = |offset: f64| offset / 60.0 * (max - min) + min;

    let (r, g, b) = if h <= 60.0 {
        (max, ramp(h), min)
    } else if h <= 120.0 {
        (ramp(120.0 - h), max, min)
    } else if h <= 180.0 {
        (min, max, ramp(h - 120.0))
    } else if h <= 240.0 {
        (min, ramp(240.0 - h), max)
    } else if h <= 300.0 {
        (ramp(h - 240.0), min, max)
    } else {
        (max, min, ramp(360.0 - h))
    };

    let quantize = |channel: f64| channel.round().clamp(0.0, 255.0) as u8;
    Rgb {
        r: quantize(r),
        g: quantize(g),
        b: quantize(b),
    }
}

/// Lowercase `#rrggbb` for an HSL triple, rounding each channel.
pub fn hsl_to_hex(hsl: Hsl) -> String {
    rgb_to_hex(hsl_to_rgb(hsl))
}

pub fn hsl_to_hsv(hsl: Hsl) -> Hsv {
    let v = hsl.l + hsl.s * hsl.l.min(100.0 - hsl.l) / 100.0;
    let s = if v == 0.0 {
        0.0
    } else {
        2.0 * (v - hsl.l) / v * 100.0
    };
    Hsv { h: hsl.h, s, v }
}

pub fn hsv_to_hsl(hsv: Hsv) -> Hsl {
    let l = hsv.v * (1.0 - hsv.s / 200.0);
    let denom = l.min(100.0 - l);
    let s = if denom <= 0.0 {
        0.0
    } else {
        (hsv.v - l) / denom * 100.0
    };
    Hsl { h: hsv.h, s, l }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    fn channels_within_one(a: &str, b: &str) -> bool {
        let (a, b) = (hex_to_rgb(a).unwrap(), hex_to_rgb(b).unwrap());
        [(a.r, b.r), (a.g, b.g), (a.b, b.b)]
            .iter()
            .all(|(x, y)| x.abs_diff(*y) <= 1)
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(
            hex_to_rgb("#1a2B3c").unwrap(),
            Rgb {
                r: 0x1a,
                g: 0x2b,
                b: 0x3c
            }
        );
    }

    #[test]
    fn test_parse_hex_rejects_malformed() {
        assert_eq!(parse_hex("#FFF3F3").unwrap(), "#fff3f3");
        assert!(parse_hex("fff3f3").is_err());
        assert!(parse_hex("#fff").is_err());
        assert!(parse_hex("#gggggg").is_err());
        assert!(matches!(hex_to_rgb("#12345"), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn test_primary_colors_to_hsl() {
        let red = hex_to_hsl("#ff0000").unwrap();
        assert_close(red.h, 0.0);
        assert_close(red.s, 100.0);
        assert_close(red.l, 50.0);

        let blue = hex_to_hsl("#0000ff").unwrap();
        assert_close(blue.h, 240.0);

        let gray = hex_to_hsl("#808080").unwrap();
        assert_close(gray.h, 0.0);
        assert_close(gray.s, 0.0);

        let black = hex_to_hsl("#000000").unwrap();
        assert_close(black.s, 0.0);
        assert_close(black.l, 0.0);
    }

    #[test]
    fn test_hue_is_never_negative() {
        // red is max and blue exceeds green
        let hsl = hex_to_hsl("#ff0080").unwrap();
        assert!(hsl.h >= 0.0 && hsl.h < 360.0);
        assert_close(hsl.h, 329.88);
    }

    #[test]
    fn test_hsl_to_hex() {
        assert_eq!(
            hsl_to_hex(Hsl {
                h: 120.0,
                s: 100.0,
                l: 50.0
            }),
            "#00ff00"
        );
        assert_eq!(
            hsl_to_hex(Hsl {
                h: 0.0,
                s: 0.0,
                l: 100.0
            }),
            "#ffffff"
        );
    }

    #[test]
    fn test_hex_hsl_round_trip_within_one() {
        let mut checked = 0;
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(51) {
                for b in (0..=255u16).step_by(15) {
                    let code = format!("#{:02x}{:02x}{:02x}", r, g, b);
                    let back = hsl_to_hex(hex_to_hsl(&code).unwrap());
                    assert!(channels_within_one(&code, &back), "{code} -> {back}");
                    checked += 1;
                }
            }
        }
        assert!(checked > 1000);

        for code in ["#fff3f3", "#1a2b3c", "#ff0080", "#010203", "#fefefe"] {
            let back = hsl_to_hex(hex_to_hsl(code).unwrap());
            assert!(channels_within_one(code, &back), "{code} -> {back}");
        }
    }

    #[test]
    fn test_hsl_hsv_round_trip() {
        let hsl = Hsl {
            h: 200.0,
            s: 60.0,
            l: 40.0,
        };
        let hsv = hsl_to_hsv(hsl);
        assert_close(hsv.h, 200.0);
        assert_close(hsv.v, 64.0);
        assert_close(hsv.s, 75.0);

        let back = hsv_to_hsl(hsv);
        assert_close(back.s, hsl.s);
        assert_close(back.l, hsl.l);
    }

    #[test]
    fn test_hsv_extremes_do_not_produce_nan() {
        let black = hsl_to_hsv(Hsl {
            h: 0.0,
            s: 0.0,
            l: 0.0,
        });
        assert_eq!(black.s, 0.0);

        let white = hsv_to_hsl(Hsv {
            h: 0.0,
            s: 0.0,
            v: 100.0,
        });
        assert_close(white.l, 100.0);
        assert_eq!(white.s, 0.0);
    }
}
