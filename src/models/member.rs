use anyhow::Result;
use rust_decimal::Decimal;

/// Contribution tier. A double-tier member holds two shares of the kitti.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Standard,
    Double,
}

impl Tier {
    pub fn dues(&self) -> Decimal {
        match self {
            Self::Standard => Decimal::from(2000),
            Self::Double => Decimal::from(4000),
        }
    }

    /// Number of payout slots the member holds on the settlement sheet.
    pub fn shares(&self) -> usize {
        match self {
            Self::Standard => 1,
            Self::Double => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Double => "Double",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub sr: u32,
    pub flat: &'static str,
    pub name: &'static str,
    pub tier: Tier,
}

impl Member {
    const fn new(sr: u32, flat: &'static str, name: &'static str, tier: Tier) -> Self {
        Self {
            sr,
            flat,
            name,
            tier,
        }
    }

    pub fn dues(&self) -> Decimal {
        self.tier.dues()
    }
}

const MEMBERS: &[Member] = &[
    Member::new(1, "A-412", "श्रीमती राजेश यादव", Tier::Standard),
    Member::new(2, "A-509", "श्रीमती मंजू", Tier::Standard),
    Member::new(3, "A-101", "श्रीमती अंजू", Tier::Standard),
    Member::new(4, "A-202", "श्रीमती राजू", Tier::Standard),
    Member::new(5, "A-810", "श्रीमती सरिता", Tier::Standard),
    Member::new(6, "B-407", "श्रीमती प्रज्ञा", Tier::Standard),
    Member::new(7, "B-203", "श्रीमती मीनाक्षी", Tier::Standard),
    Member::new(8, "B-201", "श्रीमती संतोष", Tier::Standard),
    Member::new(9, "A-307", "श्रीमती राजबाला", Tier::Double),
    Member::new(10, "B-403", "श्रीमती किरण", Tier::Double),
];

/// The fixed society roster. Compiled-in policy, never persisted on its own.
pub struct Roster;

impl Roster {
    pub fn members() -> &'static [Member] {
        MEMBERS
    }

    pub fn find(sr: u32) -> Option<&'static Member> {
        MEMBERS.iter().find(|m| m.sr == sr)
    }

    /// Due amount for a serial number. An SR outside the roster means the
    /// persisted data no longer belongs to this society, so it is an error.
    pub fn dues_for(sr: u32) -> Result<Decimal> {
        Self::member(sr).map(Member::dues)
    }

    pub fn shares_for(sr: u32) -> Result<usize> {
        Self::member(sr).map(|m| m.tier.shares())
    }

    fn member(sr: u32) -> Result<&'static Member> {
        Self::find(sr).ok_or_else(|| anyhow::anyhow!("SR {sr} is not on the society roster"))
    }
}
