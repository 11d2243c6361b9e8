use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumString};

/// Destination field of a compute instruction.
/// The discriminant is the `d1 d2 d3` bit triple (A, D, M).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
)]
#[repr(u8)]
pub enum Dest {
    M = 0b001,
    D = 0b010,
    MD = 0b011,
    A = 0b100,
    AM = 0b101,
    AD = 0b110,
    AMD = 0b111,
}

impl Dest {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(dest) => Ok(dest),
            Err(_) => Err(format!("Unknown dest: `{s}`")),
        }
    }

    fn bits(self) -> u8 {
        self.into()
    }

    pub fn writes_a(self) -> bool {
        self.bits() & 0b100 != 0
    }

    pub fn writes_d(self) -> bool {
        self.bits() & 0b010 != 0
    }

    pub fn writes_m(self) -> bool {
        self.bits() & 0b001 != 0
    }
}

#[test]
fn test() {
    assert_eq!(Dest::parse("MD"), Ok(Dest::MD));
    assert_eq!(Dest::AMD.to_string(), "AMD");
    assert!(Dest::parse("X").is_err());
    assert!(Dest::AD.writes_a() && Dest::AD.writes_d() && !Dest::AD.writes_m());
    assert_eq!(Dest::try_from(0b101).ok(), Some(Dest::AM));
}
