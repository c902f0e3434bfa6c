//! Overlay colors

use image::Rgba;

/// Class colors, assigned by `group index % CLASS_PALETTE.len()`
pub const CLASS_PALETTE: [Rgba<u8>; 6] = [
    Rgba([0x58, 0x65, 0xF2, 0xFF]),
    Rgba([0xEB, 0x45, 0x9E, 0xFF]),
    Rgba([0xF2, 0xA9, 0x00, 0xFF]),
    Rgba([0x3B, 0xA5, 0x5C, 0xFF]),
    Rgba([0xED, 0x42, 0x45, 0xFF]),
    Rgba([0x9B, 0x59, 0xB6, 0xFF]),
];

/// Text regions and OCR labels
pub const TEXT_HIGHLIGHT: Rgba<u8> = Rgba([0x00, 0xFF, 0x00, 0xFF]);

/// Fill alpha for class boxes (~20%)
pub const CLASS_FILL_ALPHA: u8 = 0x33;

/// Fill alpha for text boxes
pub const TEXT_FILL_ALPHA: u8 = 0x22;

/// Color for the class at `index`; repeats once classes outnumber the palette
pub fn class_color(index: usize) -> Rgba<u8> {
    CLASS_PALETTE[index % CLASS_PALETTE.len()]
}

pub fn with_alpha(color: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], alpha])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(class_color(0), class_color(6));
        assert_eq!(class_color(5), class_color(11));
        assert_ne!(class_color(0), class_color(1));
    }
}
