//! Static territorial reference data: regions, districts and precincts.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::selector::{validate_levels, HierarchicalSelector, HierarchyNode, SelectorError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: String,
    pub name: String,
    pub region_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Precinct {
    pub id: String,
    pub name: String,
    pub district_id: String,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub group_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryLevel {
    Region,
    District,
    Precinct,
}

impl TerritoryLevel {
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Region),
            1 => Some(Self::District),
            2 => Some(Self::Precinct),
            _ => None,
        }
    }

    /// Screen title prompting a pick at this level.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Region => "აირჩიეთ რეგიონი",
            Self::District => "აირჩიეთ ოლქი",
            Self::Precinct => "აირჩიეთ უბანი",
        }
    }
}

/// One unit of the territorial hierarchy, tagged by level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum GeoUnit {
    Region(Region),
    District(District),
    Precinct(Precinct),
}

impl GeoUnit {
    #[must_use]
    pub const fn level(&self) -> TerritoryLevel {
        match self {
            Self::Region(_) => TerritoryLevel::Region,
            Self::District(_) => TerritoryLevel::District,
            Self::Precinct(_) => TerritoryLevel::Precinct,
        }
    }

    #[must_use]
    pub const fn as_precinct(&self) -> Option<&Precinct> {
        match self {
            Self::Precinct(p) => Some(p),
            Self::Region(_) | Self::District(_) => None,
        }
    }
}

impl HierarchyNode for GeoUnit {
    fn id(&self) -> &str {
        match self {
            Self::Region(r) => &r.id,
            Self::District(d) => &d.id,
            Self::Precinct(p) => &p.id,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Region(r) => &r.name,
            Self::District(d) => &d.name,
            Self::Precinct(p) => &p.name,
        }
    }

    fn parent_id(&self) -> Option<&str> {
        match self {
            Self::Region(_) => None,
            Self::District(d) => Some(&d.region_id),
            Self::Precinct(p) => Some(&p.district_id),
        }
    }
}

/// A fully resolved region → district → precinct pick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerritoryPath {
    pub region: Region,
    pub district: District,
    pub precinct: Precinct,
}

impl TerritoryPath {
    /// Builds the path from a complete selector selection.
    #[must_use]
    pub fn from_selection(selection: &[GeoUnit]) -> Option<Self> {
        match selection {
            [GeoUnit::Region(region), GeoUnit::District(district), GeoUnit::Precinct(precinct)] => {
                Some(Self {
                    region: region.clone(),
                    district: district.clone(),
                    precinct: precinct.clone(),
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("failed to parse territory dataset: {0}")]
    Parse(String),
    #[error("territory dataset has no regions")]
    Empty,
    #[error(transparent)]
    Hierarchy(#[from] SelectorError),
}

impl From<serde_json::Error> for DatasetError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryDataset {
    pub regions: Vec<Region>,
    pub districts: Vec<District>,
    pub precincts: Vec<Precinct>,
}

impl Default for TerritoryDataset {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TerritoryDataset {
    /// Parses and validates a dataset in the shell's JSON format.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        debug!(
            regions = dataset.regions.len(),
            districts = dataset.districts.len(),
            precincts = dataset.precincts.len(),
            "territory dataset loaded"
        );
        Ok(dataset)
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.regions.is_empty() {
            return Err(DatasetError::Empty);
        }
        validate_levels(&self.levels())?;
        Ok(())
    }

    /// Units per level, root first, in the order the selector expects.
    #[must_use]
    pub fn levels(&self) -> Vec<Vec<GeoUnit>> {
        vec![
            self.regions.iter().cloned().map(GeoUnit::Region).collect(),
            self.districts.iter().cloned().map(GeoUnit::District).collect(),
            self.precincts.iter().cloned().map(GeoUnit::Precinct).collect(),
        ]
    }

    pub fn selector(&self) -> Result<HierarchicalSelector<GeoUnit>, SelectorError> {
        HierarchicalSelector::new(self.levels())
    }

    #[must_use]
    pub fn precinct(&self, id: &str) -> Option<&Precinct> {
        self.precincts.iter().find(|p| p.id == id)
    }

    /// Resolves a precinct id to its full path.
    #[must_use]
    pub fn path_to(&self, precinct_id: &str) -> Option<TerritoryPath> {
        let precinct = self.precinct(precinct_id)?;
        let district = self.districts.iter().find(|d| d.id == precinct.district_id)?;
        let region = self.regions.iter().find(|r| r.id == district.region_id)?;
        Some(TerritoryPath {
            region: region.clone(),
            district: district.clone(),
            precinct: precinct.clone(),
        })
    }

    #[must_use]
    pub fn builtin() -> Self {
        fn region(id: &str, name: &str) -> Region {
            Region {
                id: id.into(),
                name: name.into(),
            }
        }
        fn district(id: &str, name: &str, region_id: &str) -> District {
            District {
                id: id.into(),
                name: name.into(),
                region_id: region_id.into(),
            }
        }
        fn precinct(id: &str, name: &str, district_id: &str, members: u32, groups: u32) -> Precinct {
            Precinct {
                id: id.into(),
                name: name.into(),
                district_id: district_id.into(),
                member_count: members,
                group_count: groups,
            }
        }

        Self {
            regions: vec![
                region("r1", "თბილისი"),
                region("r2", "იმერეთი"),
                region("r3", "აჭარა"),
            ],
            districts: vec![
                district("d1", "საბურთალოს ოლქი", "r1"),
                district("d2", "ვაკის ოლქი", "r1"),
                district("d3", "ისანი-სამგორის ოლქი", "r1"),
                district("d4", "ქუთაისის ოლქი", "r2"),
                district("d5", "ზესტაფონის ოლქი", "r2"),
                district("d6", "ბათუმის ოლქი", "r3"),
                district("d7", "ქობულეთის ოლქი", "r3"),
            ],
            precincts: vec![
                precinct("p1", "საბურთალო #12", "d1", 43, 5),
                precinct("p2", "საბურთალო #15", "d1", 28, 3),
                precinct("p3", "ვაკე #3", "d2", 35, 4),
                precinct("p4", "ვაკე #7", "d2", 12, 1),
                precinct("p5", "ისანი #5", "d3", 20, 2),
                precinct("p6", "ქუთაისი #1", "d4", 55, 6),
                precinct("p7", "ქუთაისი #4", "d4", 18, 2),
                precinct("p8", "ზესტაფონი #2", "d5", 8, 1),
                precinct("p9", "ბათუმი #1", "d6", 40, 4),
                precinct("p10", "ქობულეთი #1", "d7", 15, 2),
            ],
        }
    }
}
