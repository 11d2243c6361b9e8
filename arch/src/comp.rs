use bimap::BiMap;
use once_cell::sync::Lazy;
use std::fmt::Display;

/// Expression field of a compute instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Comp {
    Zero,
    One,
    NegOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    NegD,
    NegA,
    NegM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

static COMP_STR: Lazy<BiMap<Comp, &'static str>> = Lazy::new(|| {
    let mut map: BiMap<Comp, &'static str> = BiMap::new();
    map.insert(Comp::Zero, "0");
    map.insert(Comp::One, "1");
    map.insert(Comp::NegOne, "-1");
    map.insert(Comp::D, "D");
    map.insert(Comp::A, "A");
    map.insert(Comp::M, "M");
    map.insert(Comp::NotD, "!D");
    map.insert(Comp::NotA, "!A");
    map.insert(Comp::NotM, "!M");
    map.insert(Comp::NegD, "-D");
    map.insert(Comp::NegA, "-A");
    map.insert(Comp::NegM, "-M");
    map.insert(Comp::DPlusOne, "D+1");
    map.insert(Comp::APlusOne, "A+1");
    map.insert(Comp::MPlusOne, "M+1");
    map.insert(Comp::DMinusOne, "D-1");
    map.insert(Comp::AMinusOne, "A-1");
    map.insert(Comp::MMinusOne, "M-1");
    map.insert(Comp::DPlusA, "D+A");
    map.insert(Comp::DPlusM, "D+M");
    map.insert(Comp::DMinusA, "D-A");
    map.insert(Comp::DMinusM, "D-M");
    map.insert(Comp::AMinusD, "A-D");
    map.insert(Comp::MMinusD, "M-D");
    map.insert(Comp::DAndA, "D&A");
    map.insert(Comp::DAndM, "D&M");
    map.insert(Comp::DOrA, "D|A");
    map.insert(Comp::DOrM, "D|M");
    map
});

// Commutative spellings accepted by assemblers
fn alias(s: &str) -> &str {
    match s {
        "A+D" => "D+A",
        "M+D" => "D+M",
        "A&D" => "D&A",
        "M&D" => "D&M",
        "A|D" => "D|A",
        "M|D" => "D|M",
        _ => s,
    }
}

impl Comp {
    pub fn parse(s: &str) -> Result<Comp, String> {
        if let Some(comp) = COMP_STR.get_by_right(alias(s)) {
            Ok(*comp)
        } else {
            Err(format!("Unknown expression: `{}`", s))
        }
    }

    pub fn format(&self) -> &'static str {
        COMP_STR.get_by_left(self).copied().unwrap_or("?")
    }

    /// True when the expression reads `M`, i.e. `RAM[A]`.
    pub fn reads_m(&self) -> bool {
        use Comp::*;
        matches!(
            self,
            M | NotM | NegM | MPlusOne | MMinusOne | DPlusM | DMinusM | MMinusD | DAndM | DOrM
        )
    }

    pub fn eval(&self, a: u16, d: u16, m: u16) -> u16 {
        use Comp::*;
        match self {
            Zero => 0,
            One => 1,
            NegOne => 0xFFFF,
            D => d,
            A => a,
            M => m,
            NotD => !d,
            NotA => !a,
            NotM => !m,
            NegD => d.wrapping_neg(),
            NegA => a.wrapping_neg(),
            NegM => m.wrapping_neg(),
            DPlusOne => d.wrapping_add(1),
            APlusOne => a.wrapping_add(1),
            MPlusOne => m.wrapping_add(1),
            DMinusOne => d.wrapping_sub(1),
            AMinusOne => a.wrapping_sub(1),
            MMinusOne => m.wrapping_sub(1),
            DPlusA => d.wrapping_add(a),
            DPlusM => d.wrapping_add(m),
            DMinusA => d.wrapping_sub(a),
            DMinusM => d.wrapping_sub(m),
            AMinusD => a.wrapping_sub(d),
            MMinusD => m.wrapping_sub(d),
            DAndA => d & a,
            DAndM => d & m,
            DOrA => d | a,
            DOrM => d | m,
        }
    }
}

impl Display for Comp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::Comp;

    #[test]
    fn parse_and_format() {
        assert_eq!(Comp::parse("D+M"), Ok(Comp::DPlusM));
        assert_eq!(Comp::parse("M+D"), Ok(Comp::DPlusM));
        assert_eq!(Comp::parse("A-1"), Ok(Comp::AMinusOne));
        assert_eq!(Comp::AMinusD.to_string(), "A-D");
        assert!(Comp::parse("D*M").is_err());
    }

    #[test]
    fn eval_wraps() {
        assert_eq!(Comp::DMinusM.eval(0, 5, 3), 2);
        assert_eq!(Comp::DMinusM.eval(0, 3, 5), 0xFFFE);
        assert_eq!(Comp::DPlusA.eval(0xFFFF, 1, 0), 0);
        assert_eq!(Comp::NegOne.eval(0, 0, 0) as i16, -1);
    }

    #[test]
    fn reads_m() {
        assert!(Comp::DPlusM.reads_m());
        assert!(!Comp::APlusOne.reads_m());
    }
}
