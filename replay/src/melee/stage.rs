use std::fmt::Display;

use num_enum::TryFromPrimitive;

/// Stage ids as they appear in the GAME_START event.
#[derive(Debug, PartialEq, Copy, Clone, TryFromPrimitive)]
#[repr(u16)]
pub enum Stage {
    FountainOfDreams = 2,
    PokemonStadium = 3,
    PeachsCastle = 4,
    KongoJungle = 5,
    Brinstar = 6,
    Corneria = 7,
    YoshisStory = 8,
    Onett = 9,
    MuteCity = 10,
    RainbowCruise = 11,
    JungleJapes = 12,
    GreatBay = 13,
    HyruleTemple = 14,
    BrinstarDepths = 15,
    YoshisIsland = 16,
    GreenGreens = 17,
    Fourside = 18,
    MushroomKingdom = 19,
    MushroomKingdomII = 20,
    Venom = 22,
    PokeFloats = 23,
    BigBlue = 24,
    IcicleMountain = 25,
    Icetop = 26,
    FlatZone = 27,
    DreamLandN64 = 28,
    YoshisIslandN64 = 29,
    KongoJungleN64 = 30,
    Battlefield = 31,
    FinalDestination = 32,
}

impl Stage {
    /// X coordinate of the stage's ledges, used by the off-stage check.
    /// Stages without meaningful ledge data get a bound wide enough that
    /// only falling below the stage counts as off-stage.
    pub fn ledge_x(self) -> f32 {
        match self {
            Self::FountainOfDreams => 63.35,
            Self::PokemonStadium => 87.75,
            Self::YoshisStory => 56.0,
            Self::DreamLandN64 => 77.27,
            Self::Battlefield => 68.4,
            Self::FinalDestination => 85.57,
            _ => 500.0,
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::FountainOfDreams => write!(f, "Fountain of Dreams"),
            Self::PokemonStadium => write!(f, "Pokemon Stadium"),
            Self::PeachsCastle => write!(f, "Princess Peach's Castle"),
            Self::KongoJungle => write!(f, "Kongo Jungle"),
            Self::Brinstar => write!(f, "Brinstar"),
            Self::Corneria => write!(f, "Corneria"),
            Self::YoshisStory => write!(f, "Yoshi's Story"),
            Self::Onett => write!(f, "Onett"),
            Self::MuteCity => write!(f, "Mute City"),
            Self::RainbowCruise => write!(f, "Rainbow Cruise"),
            Self::JungleJapes => write!(f, "Jungle Japes"),
            Self::GreatBay => write!(f, "Great Bay"),
            Self::HyruleTemple => write!(f, "Hyrule Temple"),
            Self::BrinstarDepths => write!(f, "Brinstar Depths"),
            Self::YoshisIsland => write!(f, "Yoshi's Island"),
            Self::GreenGreens => write!(f, "Green Greens"),
            Self::Fourside => write!(f, "Fourside"),
            Self::MushroomKingdom => write!(f, "Mushroom Kingdom"),
            Self::MushroomKingdomII => write!(f, "Mushroom Kingdom II"),
            Self::Venom => write!(f, "Venom"),
            Self::PokeFloats => write!(f, "Poke Floats"),
            Self::BigBlue => write!(f, "Big Blue"),
            Self::IcicleMountain => write!(f, "Icicle Mountain"),
            Self::Icetop => write!(f, "Icetop"),
            Self::FlatZone => write!(f, "Flat Zone"),
            Self::DreamLandN64 => write!(f, "Dream Land (N64)"),
            Self::YoshisIslandN64 => write!(f, "Yoshi's Island (N64)"),
            Self::KongoJungleN64 => write!(f, "Kongo Jungle (N64)"),
            Self::Battlefield => write!(f, "Battlefield"),
            Self::FinalDestination => write!(f, "Final Destination"),
        }
    }
}

/// Ledge bound for a raw stage id, tolerating ids we have no entry for.
pub fn ledge_for(stage_id: u16) -> f32 {
    Stage::try_from(stage_id).map(Stage::ledge_x).unwrap_or(500.0)
}
