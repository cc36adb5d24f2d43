use ratatui::style::Color;
use term_color_support::ColorSupport;

use crate::mns_config::Theme;

/// A palette entry: exact RGB plus fallbacks for limited terminals
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Swatch {
    pub rgb: (u8, u8, u8),
    pub index256: u8,
    pub basic: Color,
}

const fn swatch(rgb: (u8, u8, u8), index256: u8, basic: Color) -> Swatch {
    Swatch { rgb, index256, basic }
}

/// Colour depth the terminal advertises
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Depth {
    pub truecolor: bool,
    pub indexed256: bool,
}

impl Depth {
    /// Detect the colour depth of stdout
    pub fn detect() -> Depth {
        let support = ColorSupport::stdout();
        Depth { truecolor: support.has_16m, indexed256: support.has_256 }
    }
}

impl Swatch {
    /// Pick the best representation the terminal supports
    pub fn resolve(self, depth: Depth) -> Color {
        if depth.truecolor {
            Color::Rgb(self.rgb.0, self.rgb.1, self.rgb.2)
        } else if depth.indexed256 {
            Color::Indexed(self.index256)
        } else {
            self.basic
        }
    }
}

/// Colour roles used by the board and chrome
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub board_bg: Color,
    pub hidden: Color,
    pub revealed_bg: Color,
    pub cursor_bg: Color,
    pub mine: Color,
    pub flag: Color,
    pub menu_key: Color,
    pub numbers: [Color; 8],
}

struct Swatches {
    background: Swatch,
    text: Swatch,
    board_bg: Swatch,
    hidden: Swatch,
    revealed_bg: Swatch,
    cursor_bg: Swatch,
    mine: Swatch,
    flag: Swatch,
    menu_key: Swatch,
    numbers: [Swatch; 8],
}

const LIGHT: Swatches = Swatches {
    background: swatch((242, 242, 242), 255, Color::White),
    text: swatch((12, 12, 12), 232, Color::Black),
    board_bg: swatch((189, 189, 189), 250, Color::Gray),
    hidden: swatch((118, 118, 118), 243, Color::DarkGray),
    revealed_bg: swatch((224, 224, 224), 254, Color::White),
    cursor_bg: swatch((59, 120, 255), 63, Color::LightBlue),
    mine: swatch((12, 12, 12), 232, Color::Black),
    flag: swatch((197, 15, 31), 160, Color::Red),
    menu_key: swatch((0, 55, 218), 20, Color::Blue),
    numbers: [
        swatch((0, 55, 218), 20, Color::Blue),
        swatch((19, 161, 14), 28, Color::Green),
        swatch((197, 15, 31), 160, Color::Red),
        swatch((0, 0, 128), 18, Color::Blue),
        swatch((128, 0, 0), 88, Color::Red),
        swatch((0, 128, 128), 30, Color::Cyan),
        swatch((12, 12, 12), 232, Color::Black),
        swatch((118, 118, 118), 243, Color::DarkGray),
    ],
};

const DARK: Swatches = Swatches {
    background: swatch((12, 12, 12), 232, Color::Black),
    text: swatch((204, 204, 204), 250, Color::Gray),
    board_bg: swatch((48, 48, 48), 236, Color::Black),
    hidden: swatch((118, 118, 118), 243, Color::DarkGray),
    revealed_bg: swatch((28, 28, 28), 234, Color::Black),
    cursor_bg: swatch((0, 55, 218), 20, Color::Blue),
    mine: swatch((249, 241, 165), 229, Color::LightYellow),
    flag: swatch((231, 72, 86), 203, Color::LightRed),
    menu_key: swatch((193, 156, 0), 178, Color::Yellow),
    numbers: [
        swatch((59, 120, 255), 63, Color::LightBlue),
        swatch((22, 198, 12), 46, Color::LightGreen),
        swatch((231, 72, 86), 203, Color::LightRed),
        swatch((180, 0, 158), 163, Color::LightMagenta),
        swatch((193, 156, 0), 178, Color::Yellow),
        swatch((97, 214, 214), 116, Color::LightCyan),
        swatch((242, 242, 242), 255, Color::White),
        swatch((118, 118, 118), 243, Color::DarkGray),
    ],
};

impl Palette {
    /// Resolve the palette for `theme` against the current terminal
    pub fn for_theme(theme: Theme) -> Palette {
        Self::resolve(theme, Depth::detect())
    }

    pub fn resolve(theme: Theme, depth: Depth) -> Palette {
        let s = match theme {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        };
        Palette {
            background: s.background.resolve(depth),
            text: s.text.resolve(depth),
            board_bg: s.board_bg.resolve(depth),
            hidden: s.hidden.resolve(depth),
            revealed_bg: s.revealed_bg.resolve(depth),
            cursor_bg: s.cursor_bg.resolve(depth),
            mine: s.mine.resolve(depth),
            flag: s.flag.resolve(depth),
            menu_key: s.menu_key.resolve(depth),
            numbers: s.numbers.map(|n| n.resolve(depth)),
        }
    }

    /// Foreground colour for an adjacency number (1-8)
    pub fn number(&self, n: u8) -> Color {
        self.numbers[(n as usize).saturating_sub(1).min(7)]
    }
}
