use std::fmt::Display;

use num_enum::TryFromPrimitive;

/// External (character-select) character ids, as stored in the game-info
/// block. These differ from the per-frame internal ids, which also encode
/// transformation states like Zelda/Sheik.
#[derive(Debug, PartialEq, Copy, Clone, TryFromPrimitive)]
#[repr(u8)]
pub enum Character {
    CaptainFalcon = 0,
    DonkeyKong,
    Fox,
    MrGameAndWatch,
    Kirby,
    Bowser,
    Link,
    Luigi,
    Mario,
    Marth,
    Mewtwo,
    Ness,
    Peach,
    Pikachu,
    IceClimbers,
    Jigglypuff,
    Samus,
    Yoshi,
    Zelda,
    Sheik,
    Falco,
    YoungLink,
    DrMario,
    Roy,
    Pichu,
    Ganondorf,
}

impl Display for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::CaptainFalcon => write!(f, "Captain Falcon"),
            Self::DonkeyKong => write!(f, "Donkey Kong"),
            Self::Fox => write!(f, "Fox"),
            Self::MrGameAndWatch => write!(f, "Mr. Game & Watch"),
            Self::Kirby => write!(f, "Kirby"),
            Self::Bowser => write!(f, "Bowser"),
            Self::Link => write!(f, "Link"),
            Self::Luigi => write!(f, "Luigi"),
            Self::Mario => write!(f, "Mario"),
            Self::Marth => write!(f, "Marth"),
            Self::Mewtwo => write!(f, "Mewtwo"),
            Self::Ness => write!(f, "Ness"),
            Self::Peach => write!(f, "Peach"),
            Self::Pikachu => write!(f, "Pikachu"),
            Self::IceClimbers => write!(f, "Ice Climbers"),
            Self::Jigglypuff => write!(f, "Jigglypuff"),
            Self::Samus => write!(f, "Samus"),
            Self::Yoshi => write!(f, "Yoshi"),
            Self::Zelda => write!(f, "Zelda"),
            Self::Sheik => write!(f, "Sheik"),
            Self::Falco => write!(f, "Falco"),
            Self::YoungLink => write!(f, "Young Link"),
            Self::DrMario => write!(f, "Dr. Mario"),
            Self::Roy => write!(f, "Roy"),
            Self::Pichu => write!(f, "Pichu"),
            Self::Ganondorf => write!(f, "Ganondorf"),
        }
    }
}

/// Display name for a raw external character id.
pub fn character_name(ext_char_id: u8) -> String {
    Character::try_from(ext_char_id)
        .map(|c| c.to_string())
        .unwrap_or_else(|_| format!("Unknown ({ext_char_id})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_ids_round_trip() {
        assert_eq!(Character::try_from(2), Ok(Character::Fox));
        assert_eq!(Character::try_from(20), Ok(Character::Falco));
        assert!(Character::try_from(26).is_err());
    }

    #[test]
    fn unknown_ids_still_render() {
        assert_eq!(character_name(9), "Marth");
        assert_eq!(character_name(200), "Unknown (200)");
    }
}
