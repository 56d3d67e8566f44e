//! Serialisable projection of the model for the shell.

use serde::{Deserialize, Serialize};

use crate::error::UserFacingError;
use crate::membership::{EngagementLevel, Tier, TierProgress, User};
use crate::selector::{HierarchicalSelector, HierarchyNode};
use crate::session::Session;
use crate::territory::{GeoUnit, TerritoryLevel};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewState {
    Welcome,
    Phone {
        display: String,
        digits: String,
        can_continue: bool,
    },
    Otp {
        cells: Vec<String>,
        active_index: usize,
        verifying: bool,
        masked_phone: Option<String>,
    },
    GedCheck,
    StatusSelection {
        options: Vec<EngagementOption>,
        selected: Option<EngagementLevel>,
        can_continue: bool,
    },
    Territory(TerritoryView),
    Complete {
        member: MemberSummary,
    },
    Home {
        member: MemberSummary,
    },
    Error {
        title: String,
        message: String,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngagementOption {
    pub level: EngagementLevel,
    pub label: String,
    pub can_lead_group: bool,
}

impl EngagementOption {
    #[must_use]
    pub fn all() -> Vec<Self> {
        [EngagementLevel::Passive, EngagementLevel::Active]
            .into_iter()
            .map(|level| Self {
                level,
                label: level.label().to_string(),
                can_lead_group: level.can_lead_group(),
            })
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrecinctStats {
    pub member_count: u32,
    pub group_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TerritoryRow {
    pub id: String,
    pub name: String,
    /// Only precinct rows carry stats.
    pub stats: Option<PrecinctStats>,
}

impl From<&GeoUnit> for TerritoryRow {
    fn from(unit: &GeoUnit) -> Self {
        Self {
            id: unit.id().to_string(),
            name: unit.name().to_string(),
            stats: unit.as_precinct().map(|p| PrecinctStats {
                member_count: p.member_count,
                group_count: p.group_count,
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TerritoryView {
    pub level: usize,
    pub prompt: String,
    pub breadcrumb: String,
    pub rows: Vec<TerritoryRow>,
    pub selected_leaf_id: Option<String>,
    pub can_confirm: bool,
}

impl From<&HierarchicalSelector<GeoUnit>> for TerritoryView {
    fn from(selector: &HierarchicalSelector<GeoUnit>) -> Self {
        let level = selector.step();
        Self {
            level,
            prompt: TerritoryLevel::from_index(level)
                .map(TerritoryLevel::prompt)
                .unwrap_or_default()
                .to_string(),
            breadcrumb: selector.breadcrumb(),
            rows: selector.current_candidates().map(TerritoryRow::from).collect(),
            selected_leaf_id: selector.leaf().map(|unit| unit.id().to_string()),
            can_confirm: selector.is_complete(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierView {
    pub members: u32,
    pub current: Option<String>,
    pub next: Option<String>,
    pub missing: u32,
    pub percent: u8,
    pub unlocked_capabilities: Vec<String>,
}

impl From<TierProgress> for TierView {
    fn from(progress: TierProgress) -> Self {
        let unlocked_capabilities = Tier::ALL
            .into_iter()
            .filter(|tier| progress.is_unlocked(*tier))
            .flat_map(Tier::capabilities)
            .map(|c| (*c).to_string())
            .collect();

        Self {
            members: progress.members,
            current: progress.current.map(|t| t.label().to_string()),
            next: progress.next.map(|t| t.label().to_string()),
            missing: progress.missing,
            percent: progress.percent(),
            unlocked_capabilities,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberSummary {
    pub full_name: String,
    pub role: String,
    pub can_endorse: bool,
    pub engagement: Option<String>,
    pub ged_balance: u32,
    pub has_ged: Option<bool>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub precinct: Option<String>,
    pub tier: Option<TierView>,
}

impl From<&Session> for MemberSummary {
    fn from(session: &Session) -> Self {
        let user: &User = session.user();
        let territory = user.territory.as_ref();
        Self {
            full_name: user.full_name(),
            role: user.role.label().to_string(),
            can_endorse: user.role.can_endorse(),
            engagement: user.engagement.map(|e| e.label().to_string()),
            ged_balance: user.ged_balance,
            has_ged: session.has_ged(),
            region: territory.map(|t| t.region.name.clone()),
            district: territory.map(|t| t.district.name.clone()),
            precinct: territory.map(|t| t.precinct.name.clone()),
            tier: session.tier_progress().map(TierView::from),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub state: ViewState,
    pub error: Option<UserFacingError>,
    pub is_authenticated: bool,
}
