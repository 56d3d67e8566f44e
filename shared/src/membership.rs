//! Membership vocabulary: roles, engagement levels and precinct tiers.

use serde::{Deserialize, Serialize};

use crate::territory::TerritoryPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Holder of a verified GeD digital identity.
    Geder,
    Supporter,
    Unverified,
}

impl UserRole {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Geder => "GeDer",
            Self::Supporter => "მხარდამჭერი",
            Self::Unverified => "დაუდასტურებელი",
        }
    }

    #[must_use]
    pub const fn can_endorse(self) -> bool {
        matches!(self, Self::Geder)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    Passive,
    Active,
}

impl EngagementLevel {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passive => "პასიური",
            Self::Active => "აქტიური",
        }
    }

    /// Only publicly active members can be elected to lead a ten-member cell.
    #[must_use]
    pub const fn can_lead_group(self) -> bool {
        match self {
            Self::Active => true,
            Self::Passive => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Ten,
    Fifty,
    Hundred,
    Thousand,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Ten, Tier::Fifty, Tier::Hundred, Tier::Thousand];

    #[must_use]
    pub const fn threshold(self) -> u32 {
        match self {
            Self::Ten => 10,
            Self::Fifty => 50,
            Self::Hundred => 100,
            Self::Thousand => 1000,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ten => "ათეული",
            Self::Fifty => "ორმოცდაათეული",
            Self::Hundred => "ასეული",
            Self::Thousand => "ათასეული",
        }
    }

    #[must_use]
    pub const fn capabilities(self) -> &'static [&'static str] {
        match self {
            Self::Ten => &["ხმის მიცემა", "SOS შეტყობინება", "ადგილობრივი არბიტრაჟი"],
            Self::Fifty => &[
                "გაძლიერებული ხილვადობა",
                "არბიტრაჟი — ბაზისური",
                "ტელევიზიის დრო",
            ],
            Self::Hundred => &[
                "ტელევიზიის დრო — გაძლიერებული",
                "არბიტრაჟი — გაძლიერებული",
                "ბიუჯეტის უფლება",
            ],
            Self::Thousand => &["სრული ბიუჯეტი", "საბჭოს წევრობა", "რეგიონალური მედია"],
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Ten => Some(Self::Fifty),
            Self::Fifty => Some(Self::Hundred),
            Self::Hundred => Some(Self::Thousand),
            Self::Thousand => None,
        }
    }

    /// Highest tier unlocked by `members`; `None` below the first threshold.
    #[must_use]
    pub fn for_member_count(members: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .rev()
            .find(|tier| members >= tier.threshold())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProgress {
    pub members: u32,
    pub current: Option<Tier>,
    pub next: Option<Tier>,
    /// Members still needed to unlock `next`; 0 at the top tier.
    pub missing: u32,
}

impl TierProgress {
    #[must_use]
    pub fn new(members: u32) -> Self {
        let current = Tier::for_member_count(members);
        let next = match current {
            Some(tier) => tier.next(),
            None => Some(Tier::Ten),
        };
        let missing = next.map_or(0, |tier| tier.threshold().saturating_sub(members));
        Self {
            members,
            current,
            next,
            missing,
        }
    }

    /// Progress towards `next` in whole percent.
    #[must_use]
    pub fn percent(&self) -> u8 {
        match self.next {
            None => 100,
            Some(tier) => {
                let pct = u64::from(self.members) * 100 / u64::from(tier.threshold());
                u8::try_from(pct.min(100)).unwrap_or(100)
            }
        }
    }

    #[must_use]
    pub fn is_unlocked(&self, tier: Tier) -> bool {
        self.current.is_some_and(|current| current >= tier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub engagement: Option<EngagementLevel>,
    pub ged_balance: u32,
    pub territory: Option<TerritoryPath>,
    pub group_id: Option<String>,
    /// Elected leader of a ten-member cell.
    pub is_atistavi: bool,
}

impl User {
    /// Stand-in profile returned by the simulated sign-in.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            id: "1".into(),
            first_name: "გიორგი".into(),
            last_name: "ბერიძე".into(),
            role: UserRole::Geder,
            engagement: None,
            ged_balance: 1250,
            territory: None,
            group_id: Some("g1".into()),
            is_atistavi: true,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
