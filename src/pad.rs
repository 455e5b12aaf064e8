use serde::{Deserialize, Serialize};

/// One of the three physical pads a hit can come from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum PadId {
    #[strum(to_string = "LH")]
    LeftHand,
    #[strum(to_string = "RH")]
    RightHand,
    #[strum(to_string = "RF")]
    RightFoot,
}

impl PadId {
    /// Display order used by the pad row: hi-hat, snare, kick.
    pub const ALL: [PadId; 3] = [PadId::LeftHand, PadId::RightHand, PadId::RightFoot];

    /// Stable index for per-pad lookup tables.
    pub fn index(self) -> usize {
        match self {
            PadId::LeftHand => 0,
            PadId::RightHand => 1,
            PadId::RightFoot => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PadId::LeftHand => "Left Hand (Hi-Hat)",
            PadId::RightHand => "Right Hand (Snare)",
            PadId::RightFoot => "Right Foot (Kick)",
        }
    }

    /// Numeric code sent by the trigger hardware for this pad.
    pub fn device_code(self) -> &'static str {
        match self {
            PadId::RightHand => "1",
            PadId::LeftHand => "2",
            PadId::RightFoot => "3",
        }
    }
}

/// Map a raw token to a pad. `None` means the token is unrecognized, which
/// is a normal outcome rather than an error.
pub fn normalize(raw: &str) -> Option<PadId> {
    let token = raw.trim().to_uppercase();
    match token.as_str() {
        "1" | "RH" | "R_HAND" | "R-HAND" => Some(PadId::RightHand),
        "2" | "LH" | "L_HAND" | "L-HAND" => Some(PadId::LeftHand),
        "3" | "RF" | "R_FOOT" | "R-FOOT" => Some(PadId::RightFoot),
        _ => None,
    }
}

/// Short form shown to the user for a raw token: the canonical pad token when
/// recognized, otherwise the trimmed input as received.
pub fn display_token(raw: &str) -> String {
    match normalize(raw) {
        Some(pad) => pad.to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_codes() {
        assert_eq!(normalize("1"), Some(PadId::RightHand));
        assert_eq!(normalize("2"), Some(PadId::LeftHand));
        assert_eq!(normalize("3"), Some(PadId::RightFoot));
    }

    #[test]
    fn abbreviation_variants() {
        for raw in ["RH", "R_HAND", "R-HAND", "rh", " r-hand "] {
            assert_eq!(normalize(raw), Some(PadId::RightHand), "{raw}");
        }
        for raw in ["LH", "L_HAND", "L-HAND", "l_hand"] {
            assert_eq!(normalize(raw), Some(PadId::LeftHand), "{raw}");
        }
        for raw in ["RF", "R_FOOT", "R-FOOT", "Rf"] {
            assert_eq!(normalize(raw), Some(PadId::RightFoot), "{raw}");
        }
    }

    #[test]
    fn unrecognized_tokens() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize("9"), None);
        assert_eq!(normalize("LF"), None);
        assert_eq!(normalize("R HAND"), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(display_token("1"), "RH");
        assert_eq!(display_token("l-hand"), "LH");
        assert_eq!(display_token(" 9 "), "9");
        assert_eq!(PadId::RightFoot.to_string(), "RF");
    }

    #[test]
    fn device_codes_round_trip() {
        for pad in PadId::ALL {
            assert_eq!(normalize(pad.device_code()), Some(pad));
        }
    }

    #[test]
    fn index_is_dense() {
        let mut seen = [false; 3];
        for pad in PadId::ALL {
            seen[pad.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
