use std::fmt;

/// Colour as understood by a 2D canvas `fillStyle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
    /// Hue in degrees, saturation and lightness in percent, alpha in [0, 1].
    Hsla { h: f64, s: f64, l: f64, a: f64 },
}

impl Color {
    pub fn with_alpha(self, alpha: f64) -> Color {
        let a = alpha.clamp(0.0, 1.0);
        match self {
            Color::Rgb(r, g, b) | Color::Rgba(r, g, b, _) => Color::Rgba(r, g, b, a),
            Color::Hsla { h, s, l, .. } => Color::Hsla { h, s, l, a },
        }
    }

    pub fn alpha(&self) -> f64 {
        match *self {
            Color::Rgb(..) => 1.0,
            Color::Rgba(_, _, _, a) | Color::Hsla { a, .. } => a,
        }
    }

    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Color::Rgb(r, g, b) => write!(f, "rgb({r}, {g}, {b})"),
            Color::Rgba(r, g, b, a) => write!(f, "rgba({r}, {g}, {b}, {a:.3})"),
            Color::Hsla { h, s, l, a } => {
                write!(f, "hsla({:.1}, {:.0}%, {:.0}%, {:.3})", h.rem_euclid(360.0), s, l, a)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_strings() {
        assert_eq!(Color::Rgb(0, 255, 255).to_css(), "rgb(0, 255, 255)");
        assert_eq!(Color::Rgba(0, 0, 0, 0.3).to_css(), "rgba(0, 0, 0, 0.300)");
        let orb = Color::Hsla { h: 370.0, s: 100.0, l: 60.0, a: 0.5 };
        assert_eq!(orb.to_css(), "hsla(10.0, 100%, 60%, 0.500)");
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(Color::Rgb(1, 2, 3).with_alpha(1.7), Color::Rgba(1, 2, 3, 1.0));
        assert_eq!(Color::Rgb(1, 2, 3).with_alpha(-0.2).alpha(), 0.0);
    }
}
