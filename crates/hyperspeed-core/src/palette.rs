//! Colors and the role → color palette.

use serde::Serialize;
use serde_json::Value;
use smallvec::{smallvec, SmallVec};

/// Linear-ish RGB triple in 0..=1.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0.0, 0.0, 0.0]);

    pub const fn from_hex(hex: u32) -> Self {
        Rgb([
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        ])
    }

    #[inline]
    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [self.0[0], self.0[1], self.0[2], alpha]
    }

    /// Accepts `"#rrggbb"`, `"0xRRGGBB"`, `"rrggbb"`, an integer, or `[r, g, b]` floats in 0..=1.
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => {
                let s = s.trim();
                let digits = s
                    .strip_prefix('#')
                    .or_else(|| s.strip_prefix("0x"))
                    .or_else(|| s.strip_prefix("0X"))
                    .unwrap_or(s);
                if digits.len() != 6 {
                    return None;
                }
                u32::from_str_radix(digits, 16).ok().map(Rgb::from_hex)
            }
            Value::Number(n) => {
                let v = n.as_u64()?;
                (v <= 0xff_ffff).then(|| Rgb::from_hex(v as u32))
            }
            Value::Array(items) if items.len() == 3 => {
                let mut c = [0.0f32; 3];
                for (i, item) in items.iter().enumerate() {
                    let f = item.as_f64()? as f32;
                    if !(0.0..=1.0).contains(&f) {
                        return None;
                    }
                    c[i] = f;
                }
                Some(Rgb(c))
            }
            _ => None,
        }
    }
}

pub type CarColors = SmallVec<[Rgb; 4]>;

/// Named colors of the scene, one per road role.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Palette {
    pub road: Rgb,
    pub island: Rgb,
    pub background: Rgb,
    pub shoulder_lines: Rgb,
    pub broken_lines: Rgb,
    pub sticks: Rgb,
    pub left_cars: CarColors,
    pub right_cars: CarColors,
}

/// Roles a palette entry can be assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteRole {
    Road,
    Island,
    Background,
    ShoulderLines,
    BrokenLines,
    Sticks,
    LeftCars,
    RightCars,
}

impl PaletteRole {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "road" | "road_color" | "roadColor" => Some(PaletteRole::Road),
            "island" | "island_color" | "islandColor" => Some(PaletteRole::Island),
            "background" => Some(PaletteRole::Background),
            "shoulder_lines" | "shoulderLines" => Some(PaletteRole::ShoulderLines),
            "broken_lines" | "brokenLines" => Some(PaletteRole::BrokenLines),
            "sticks" => Some(PaletteRole::Sticks),
            "left_cars" | "leftCars" => Some(PaletteRole::LeftCars),
            "right_cars" | "rightCars" => Some(PaletteRole::RightCars),
            _ => None,
        }
    }
}

impl Palette {
    pub fn neon() -> Self {
        Self {
            road: Rgb::from_hex(0x080808),
            island: Rgb::from_hex(0x0a0a0a),
            background: Rgb::BLACK,
            shoulder_lines: Rgb::from_hex(0x131318),
            broken_lines: Rgb::from_hex(0x131318),
            sticks: Rgb::from_hex(0x03b3c3),
            left_cars: smallvec![
                Rgb::from_hex(0xd856bf),
                Rgb::from_hex(0x6750a2),
                Rgb::from_hex(0xc247ac)
            ],
            right_cars: smallvec![
                Rgb::from_hex(0x03b3c3),
                Rgb::from_hex(0x0e5ea5),
                Rgb::from_hex(0x324555)
            ],
        }
    }

    pub fn sunset() -> Self {
        Self {
            sticks: Rgb::from_hex(0xff9f1c),
            left_cars: smallvec![
                Rgb::from_hex(0xff102a),
                Rgb::from_hex(0xeb383e),
                Rgb::from_hex(0xff102a)
            ],
            right_cars: smallvec![
                Rgb::from_hex(0xdadafa),
                Rgb::from_hex(0xbebae3),
                Rgb::from_hex(0x8f97e4)
            ],
            ..Self::neon()
        }
    }

    pub fn cyber() -> Self {
        Self {
            sticks: Rgb::from_hex(0xa90519),
            left_cars: smallvec![
                Rgb::from_hex(0xdc5b20),
                Rgb::from_hex(0xdca320),
                Rgb::from_hex(0xdc2020)
            ],
            right_cars: smallvec![
                Rgb::from_hex(0x334bf7),
                Rgb::from_hex(0xe5e6ed),
                Rgb::from_hex(0xbfc6f3)
            ],
            ..Self::neon()
        }
    }

    pub fn deep() -> Self {
        Self {
            background: Rgb::from_hex(0x01010a),
            sticks: Rgb::from_hex(0xc5e8eb),
            left_cars: smallvec![
                Rgb::from_hex(0xff322f),
                Rgb::from_hex(0xa33010),
                Rgb::from_hex(0xa81508)
            ],
            right_cars: smallvec![
                Rgb::from_hex(0xfdfdf0),
                Rgb::from_hex(0xf3dea0),
                Rgb::from_hex(0xe2bb88)
            ],
            ..Self::neon()
        }
    }

    /// Assign a single color to a role; list roles become a one-entry list.
    pub fn set(&mut self, role: PaletteRole, color: Rgb) {
        match role {
            PaletteRole::Road => self.road = color,
            PaletteRole::Island => self.island = color,
            PaletteRole::Background => self.background = color,
            PaletteRole::ShoulderLines => self.shoulder_lines = color,
            PaletteRole::BrokenLines => self.broken_lines = color,
            PaletteRole::Sticks => self.sticks = color,
            PaletteRole::LeftCars => self.left_cars = smallvec![color],
            PaletteRole::RightCars => self.right_cars = smallvec![color],
        }
    }

    pub fn set_cars(&mut self, role: PaletteRole, colors: CarColors) {
        match role {
            PaletteRole::LeftCars => self.left_cars = colors,
            PaletteRole::RightCars => self.right_cars = colors,
            _ => {
                if let Some(first) = colors.first() {
                    self.set(role, *first);
                }
            }
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::neon()
    }
}
