//! CSS length values.

/// Root font size used for `em`/`rem`.
pub const BASE_FONT_SIZE: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    Vh(f64),
    Vw(f64),
    Em(f64),
    Percent(f64),
    Auto,
}

/// What relative lengths resolve against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub containing_block: f64,
}

impl Length {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if value == "auto" {
            return Some(Self::Auto);
        }

        let split = value
            .find(|ch: char| !(ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+')))
            .unwrap_or(value.len());
        let (number, unit) = value.split_at(split);
        let number: f64 = number.parse().ok()?;
        if !number.is_finite() {
            return None;
        }

        match unit {
            "px" => Some(Self::Px(number)),
            "vh" | "dvh" | "svh" | "lvh" => Some(Self::Vh(number)),
            "vw" => Some(Self::Vw(number)),
            "em" | "rem" => Some(Self::Em(number)),
            "%" => Some(Self::Percent(number)),
            "" if number == 0.0 => Some(Self::Px(0.0)),
            _ => None,
        }
    }

    /// Pixel value; `None` for `auto`.
    pub fn resolve(&self, context: &LengthContext) -> Option<f64> {
        match *self {
            Self::Px(px) => Some(px),
            Self::Vh(vh) => Some(vh * context.viewport_height / 100.0),
            Self::Vw(vw) => Some(vw * context.viewport_width / 100.0),
            Self::Em(em) => Some(em * BASE_FONT_SIZE),
            Self::Percent(pct) => Some(pct * context.containing_block / 100.0),
            Self::Auto => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Length;
    use super::LengthContext;

    const CONTEXT: LengthContext = LengthContext {
        viewport_width: 1000.0,
        viewport_height: 800.0,
        containing_block: 500.0,
    };

    #[test]
    fn resolves_units() {
        let cases = [
            ("12px", Some(12.0)),
            ("100vh", Some(800.0)),
            ("50vw", Some(500.0)),
            ("1.5rem", Some(24.0)),
            ("10%", Some(50.0)),
            ("0", Some(0.0)),
            ("auto", None),
        ];
        for (input, expected) in cases {
            let resolved = Length::parse(input).and_then(|length| length.resolve(&CONTEXT));
            assert_eq!(resolved, expected, "{input}");
        }
    }

    #[test]
    fn rejects_unknown_units() {
        assert_eq!(Length::parse("3furlongs"), None);
        assert_eq!(Length::parse("12"), None);
        assert_eq!(Length::parse("px"), None);
    }
}
