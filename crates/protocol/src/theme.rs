use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    // Giemsa stain classes
    BandGneg,
    BandGpos25,
    BandGpos50,
    BandGpos75,
    BandGpos100,
    BandAcen,
    BandGvar,
    BandStalk,
    BandOther,

    // Axis
    AxisLine,
    AxisText,

    // Hover label
    LabelText,

    // Selectors
    SelectorFill,
    SelectorBorder,
    SelectorHandle,

    Background,
}

impl ThemeToken {
    /// Map a band type id (`"band:gpos50"`, `"band:stalk"`, ...) to its stain token.
    pub fn for_band_type(type_id: &str) -> Self {
        let stain = type_id.rsplit(':').next().unwrap_or(type_id);
        match stain {
            "gneg" => Self::BandGneg,
            "gpos25" => Self::BandGpos25,
            "gpos50" => Self::BandGpos50,
            "gpos75" => Self::BandGpos75,
            "gpos100" | "gpos" => Self::BandGpos100,
            "acen" => Self::BandAcen,
            "gvar" => Self::BandGvar,
            "stalk" => Self::BandStalk,
            _ => Self::BandOther,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stain_tokens() {
        assert_eq!(ThemeToken::for_band_type("band:gneg"), ThemeToken::BandGneg);
        assert_eq!(ThemeToken::for_band_type("band:gpos75"), ThemeToken::BandGpos75);
        assert_eq!(ThemeToken::for_band_type("band:stalk"), ThemeToken::BandStalk);
        assert_eq!(ThemeToken::for_band_type("acen"), ThemeToken::BandAcen);
        assert_eq!(ThemeToken::for_band_type("band:weird"), ThemeToken::BandOther);
    }
}
