use ratatui::style::Color;

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub highlight: Color,
    pub up: Color,
    pub down: Color,
    pub line: Color,
    pub bar: Color,
    pub muted: Color,
    pub error: Color,
    pub warning: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            highlight: Color::Yellow,
            up: Color::LightGreen,
            down: Color::LightRed,
            line: Color::Cyan,
            bar: Color::Blue,
            muted: Color::DarkGray,
            error: Color::Red,
            warning: Color::LightYellow,
        }
    }
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            highlight: Color::Blue,
            up: Color::Green,
            down: Color::Red,
            line: Color::Blue,
            bar: Color::DarkGray,
            muted: Color::Gray,
            error: Color::Red,
            warning: Color::Yellow,
        }
    }
    pub fn nord() -> Self {
        Self {
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(216, 222, 233),
            highlight: Color::Rgb(136, 192, 208),
            up: Color::Rgb(163, 190, 140),
            down: Color::Rgb(191, 97, 106),
            line: Color::Rgb(129, 161, 193),
            bar: Color::Rgb(94, 129, 172),
            muted: Color::Rgb(76, 86, 106),
            error: Color::Rgb(191, 97, 106),
            warning: Color::Rgb(235, 203, 139),
        }
    }
    pub fn colorblind() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            highlight: Color::Yellow,
            up: Color::Rgb(0x00, 0x80, 0xFF),   // blue instead of green
            down: Color::Rgb(0xFF, 0x8C, 0x00), // orange instead of red
            line: Color::Cyan,
            bar: Color::Rgb(0x00, 0x80, 0xFF),
            muted: Color::DarkGray,
            error: Color::Rgb(0xFF, 0x8C, 0x00),
            warning: Color::LightYellow,
        }
    }
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "nord" => Self::nord(),
            "colorblind" => Self::colorblind(),
            _ => Self::dark(),
        }
    }

    /// Colour for a signed move: gains, losses, flat.
    pub fn signed(&self, v: f64) -> Color {
        if v > 0.0 {
            self.up
        } else if v < 0.0 {
            self.down
        } else {
            self.fg
        }
    }
}
