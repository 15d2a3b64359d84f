//! Built-in key names.
//!
//! Plain codes follow the USB HID Usage Tables, Keyboard/Keypad Page (0x07).
//! Special codes are the low byte of Consumer Page (0x0C) usages as the
//! receiver reports them.

use crate::codes::Description;

/// Letters, digits and F-keys are generated; everything else is listed.
const NAMED_KEYS: &[(u8, &[&str])] = &[
    (0x28, &["Enter", "Return"]),
    (0x29, &["Escape", "Esc"]),
    (0x2A, &["Backspace"]),
    (0x2B, &["Tab"]),
    (0x2C, &["Space", "Spacebar"]),
    (0x2D, &["-"]),
    (0x2E, &["="]),
    (0x2F, &["["]),
    (0x30, &["]"]),
    (0x31, &["\\"]),
    (0x33, &[";"]),
    (0x34, &["'"]),
    (0x35, &["`"]),
    (0x36, &[","]),
    (0x37, &["."]),
    (0x38, &["/"]),
    (0x39, &["Caps Lock"]),
    (0x46, &["Print Screen"]),
    (0x47, &["Scroll Lock"]),
    (0x48, &["Pause"]),
    (0x49, &["Insert"]),
    (0x4A, &["Home"]),
    (0x4B, &["Page Up"]),
    (0x4C, &["Delete"]),
    (0x4D, &["End"]),
    (0x4E, &["Page Down"]),
    (0x4F, &["Right", "Right Arrow"]),
    (0x50, &["Left", "Left Arrow"]),
    (0x51, &["Down", "Down Arrow"]),
    (0x52, &["Up", "Up Arrow"]),
    (0x53, &["Num Lock"]),
    (0x54, &["Keypad /"]),
    (0x55, &["Keypad *"]),
    (0x56, &["Keypad -"]),
    (0x57, &["Keypad +"]),
    (0x58, &["Keypad Enter"]),
    (0x62, &["Keypad 0"]),
    (0x63, &["Keypad ."]),
    (0x64, &["Non-US \\"]),
    (0x65, &["Menu", "Application"]),
    (0x66, &["Power"]),
    (0x7F, &["Mute"]),
    (0x80, &["Volume Up"]),
    (0x81, &["Volume Down"]),
];

const CONSUMER_KEYS: &[(u8, &[&str])] = &[
    (0x30, &["Power"]),
    (0x40, &["Menu"]),
    (0x41, &["Menu Pick", "Select"]),
    (0x42, &["Menu Up"]),
    (0x43, &["Menu Down"]),
    (0x44, &["Menu Left"]),
    (0x45, &["Menu Right"]),
    (0x46, &["Menu Escape", "Back"]),
    (0x9C, &["Channel Up"]),
    (0x9D, &["Channel Down"]),
    (0xB0, &["Play"]),
    (0xB1, &["Pause"]),
    (0xB2, &["Record"]),
    (0xB3, &["Fast Forward"]),
    (0xB4, &["Rewind"]),
    (0xB5, &["Next Track"]),
    (0xB6, &["Previous Track"]),
    (0xB7, &["Stop"]),
    (0xB8, &["Eject"]),
    (0xCD, &["Play/Pause"]),
    (0xE2, &["Mute"]),
    (0xE9, &["Volume Up"]),
    (0xEA, &["Volume Down"]),
];

/// Keyboard page entries.
pub fn keyboard() -> Vec<(u8, Description)> {
    let mut keys = Vec::with_capacity(128);

    // A..Z = 0x04..0x1D
    for (i, letter) in ('A'..='Z').enumerate() {
        keys.push((0x04 + i as u8, Description::Single(letter.to_string())));
    }
    // 1..9 = 0x1E..0x26, 0 = 0x27
    for n in 1..=9u8 {
        keys.push((0x1D + n, Description::Single(n.to_string())));
    }
    keys.push((0x27, Description::Single("0".to_string())));
    // F1..F12 = 0x3A..0x45
    for n in 1..=12u8 {
        keys.push((0x39 + n, Description::Single(format!("F{n}"))));
    }
    // Keypad 1..9 = 0x59..0x61
    for n in 1..=9u8 {
        keys.push((0x58 + n, Description::Single(format!("Keypad {n}"))));
    }

    keys.extend(NAMED_KEYS.iter().map(|&(code, names)| (code, names.into())));
    keys
}

/// Consumer page entries for the special section.
pub fn consumer() -> Vec<(u8, Description)> {
    CONSUMER_KEYS
        .iter()
        .map(|&(code, names)| (code, names.into()))
        .collect()
}
