#![forbid(unsafe_code)]

//! Backgrounds and palette for the chat screen.

use beau_render::cell::PackedRgba;
use beau_widgets::background_picker::BackgroundOption;

/// Selectable chat backgrounds. The first is the default.
pub const BACKGROUNDS: [BackgroundOption; 6] = [
    BackgroundOption {
        id: "telegram_blue",
        name: "Telegram Blue",
        gradient: [hex(0x0088cc), hex(0x005580)],
    },
    BackgroundOption {
        id: "sunset_warm",
        name: "Warm Sunset",
        gradient: [hex(0xff6b6b), hex(0xfeca57)],
    },
    BackgroundOption {
        id: "ocean_deep",
        name: "Deep Ocean",
        gradient: [hex(0x667eea), hex(0x764ba2)],
    },
    BackgroundOption {
        id: "forest_green",
        name: "Forest Green",
        gradient: [hex(0x56ab2f), hex(0xa8e6cf)],
    },
    BackgroundOption {
        id: "purple_dream",
        name: "Purple Dream",
        gradient: [hex(0xc471ed), hex(0xf7797d)],
    },
    BackgroundOption {
        id: "midnight_blue",
        name: "Midnight Blue",
        gradient: [hex(0x2c3e50), hex(0x34495e)],
    },
];

/// Index of the background with this id.
pub fn background_index(id: &str) -> Option<usize> {
    BACKGROUNDS.iter().position(|b| b.id == id)
}

/// Darkening applied over the gradient so bubbles stay readable.
pub const OVERLAY: f32 = 0.2;

pub const INPUT_BAR_BG: PackedRgba = hex(0xffffff);
pub const INPUT_FIELD_BG: PackedRgba = hex(0xf3f4f6);
pub const INPUT_FG: PackedRgba = hex(0x1f2937);
pub const PLACEHOLDER_FG: PackedRgba = hex(0x9ca3af);
pub const SEND_BG: PackedRgba = hex(0x667eea);
pub const SEND_FG: PackedRgba = hex(0xffffff);
pub const HINT_FG: PackedRgba = hex(0x6b7280);

const fn hex(rgb: u32) -> PackedRgba {
    PackedRgba::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        for (i, option) in BACKGROUNDS.iter().enumerate() {
            assert_eq!(background_index(option.id), Some(i));
        }
        assert_eq!(background_index("nope"), None);
    }

    #[test]
    fn hex_splits_channels() {
        let c = hex(0x0088cc);
        assert_eq!((c.r(), c.g(), c.b()), (0x00, 0x88, 0xcc));
    }
}
