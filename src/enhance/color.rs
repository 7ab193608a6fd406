//! Pure per-pixel color space conversions.
//!
//! Both conversions work on 8-bit encodings, so a stage that edits one
//! channel and converts back sees the same quantization an 8-bit imaging
//! library would produce.
//!
//! - [`Lab8`]: CIE L\*a\*b\* (D65), with L scaled to 0–255 and a/b offset by 128.
//! - [`Hsv8`]: hue in degrees, saturation and value as 0–255.

/// D65 reference white.
const WHITE_X: f32 = 0.950456;
const WHITE_Z: f32 = 1.088754;

/// sRGB (linear) to XYZ, D65.
const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.412453, 0.357580, 0.180423],
    [0.212671, 0.715160, 0.072169],
    [0.019334, 0.119193, 0.950227],
];

/// XYZ to sRGB (linear), D65.
const XYZ_TO_RGB: [[f32; 3]; 3] = [
    [3.240479, -1.537150, -0.498535],
    [-0.969256, 1.875992, 0.041556],
    [0.055648, -0.204043, 1.057311],
];

/// 8-bit L\*a\*b\* pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lab8 {
    pub l: u8,
    pub a: u8,
    pub b: u8,
}

/// HSV pixel. Hue stays in floating point so a saturation-only edit does not
/// shift hue through quantization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv8 {
    /// Degrees in `[0, 360)`. Zero for achromatic pixels.
    pub h: f32,
    pub s: u8,
    pub v: u8,
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

#[inline]
fn lab_f_inv(f: f32) -> f32 {
    if f > 6.0 / 29.0 {
        f * f * f
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

#[inline]
fn mul3(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Convert an sRGB pixel to 8-bit L\*a\*b\*.
pub fn rgb_to_lab8(rgb: [u8; 3]) -> Lab8 {
    let lin = rgb.map(|c| srgb_to_linear(c as f32 / 255.0));
    let [x, y, z] = mul3(&RGB_TO_XYZ, lin);

    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y);
    let fz = lab_f(z / WHITE_Z);

    let l = 116.0 * fy - 16.0;
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);

    Lab8 {
        l: to_u8(l * 255.0 / 100.0),
        a: to_u8(a + 128.0),
        b: to_u8(b + 128.0),
    }
}

/// Convert an 8-bit L\*a\*b\* pixel back to sRGB. Out-of-gamut values clip.
pub fn lab8_to_rgb(lab: Lab8) -> [u8; 3] {
    let l = lab.l as f32 * 100.0 / 255.0;
    let a = lab.a as f32 - 128.0;
    let b = lab.b as f32 - 128.0;

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let xyz = [
        lab_f_inv(fx) * WHITE_X,
        lab_f_inv(fy),
        lab_f_inv(fz) * WHITE_Z,
    ];
    mul3(&XYZ_TO_RGB, xyz).map(|c| to_u8(linear_to_srgb(c) * 255.0))
}

/// Convert an sRGB pixel to HSV.
pub fn rgb_to_hsv8(rgb: [u8; 3]) -> Hsv8 {
    let [r, g, b] = rgb.map(|c| c as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };

    Hsv8 {
        h: if h < 0.0 { h + 360.0 } else { h },
        s: to_u8(s),
        v: max as u8,
    }
}

/// Convert an HSV pixel back to sRGB.
pub fn hsv8_to_rgb(hsv: Hsv8) -> [u8; 3] {
    let s = hsv.s as f32 / 255.0;
    let v = hsv.v as f32;
    if s == 0.0 {
        return [hsv.v; 3];
    }

    let hh = hsv.h.rem_euclid(360.0) / 60.0;
    let sector = hh.floor();
    let f = hh - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [to_u8(r), to_u8(g), to_u8(b)]
}
