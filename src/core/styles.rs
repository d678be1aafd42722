//! Output style roles mapped to `colored::Color`
//!
//! Each logical role is a variant of `StyleRole`. Coloring is applied only when
//! the `enabled` flag is true, so nothing here holds global state.
//!
//! ```
//! use tweetbucket::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Bucket", false), "Bucket");
//! assert!(StyleRole::Header.paint("Bucket", true).starts_with("\x1b[33m"));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header    => Some(Color::Yellow),
    Timestamp => Some(Color::Cyan),
    Count     => Some(Color::BrightGreen),
    Literal   => Some(Color::Cyan),
    Valid     => Some(Color::Green),
    Invalid   => Some(Color::Red),
    Error     => Some(Color::BrightRed),
    Text      => None,
    Dim       => Some(Color::BrightBlack),
}

impl StyleRole {
    pub fn ansi_code(self) -> Option<&'static str> {
        ansi_code(self.color()?)
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.ansi_code() {
            Some(code) if enabled => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    /// prettytable style spec for this role, e.g. `"Fy"`
    pub fn table_spec(self, enabled: bool) -> String {
        let spec = match self.color() {
            Some(Color::Red) => "Fr",
            Some(Color::Green) => "Fg",
            Some(Color::Yellow) => "Fy",
            Some(Color::Cyan) => "Fc",
            Some(Color::BrightRed) => "FR",
            Some(Color::BrightGreen) => "FG",
            Some(Color::BrightBlack) => "FK",
            _ => "",
        };
        if enabled {
            spec.to_string()
        } else {
            String::new()
        }
    }
}

fn ansi_code(c: Color) -> Option<&'static str> {
    match c {
        Color::Red => Some("31"),
        Color::Green => Some("32"),
        Color::Yellow => Some("33"),
        Color::Cyan => Some("36"),
        Color::BrightBlack => Some("90"),
        Color::BrightRed => Some("91"),
        Color::BrightGreen => Some("92"),
        _ => None,
    }
}

fn color_to_ansi(c: Color) -> Option<AnsiColor> {
    Some(match c {
        Color::Red => AnsiColor::Red,
        Color::Green => AnsiColor::Green,
        Color::Yellow => AnsiColor::Yellow,
        Color::Cyan => AnsiColor::Cyan,
        Color::BrightBlack => AnsiColor::BrightBlack,
        Color::BrightRed => AnsiColor::BrightRed,
        Color::BrightGreen => AnsiColor::BrightGreen,
        _ => return None,
    })
}

/// clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(color_to_ansi) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Literal, false))
        .placeholder(style(StyleRole::Dim, false))
        .valid(style(StyleRole::Valid, false))
        .invalid(style(StyleRole::Invalid, false))
        .error(style(StyleRole::Error, true))
}
