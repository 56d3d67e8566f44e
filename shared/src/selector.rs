//! Progressive drill-down selection over static reference levels.
//!
//! Level `k + 1` only ever offers the children of the unit picked at level
//! `k`. Candidate lists are filtered on every call, so a parent change can
//! never leave a stale list behind.

use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// A record that can sit at one level of a selection hierarchy.
pub trait HierarchyNode {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    /// `None` for root-level units.
    fn parent_id(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("hierarchy must have at least one level")]
    NoLevels,
    #[error("invalid hierarchy at level {level}: {reason}")]
    InvalidHierarchy { level: usize, reason: String },
    #[error("level {level} is out of range (depth {depth})")]
    LevelOutOfRange { level: usize, depth: usize },
    #[error("level {level} has not been reached (current step {step})")]
    LevelNotReached { level: usize, step: usize },
    #[error("unit {unit_id} is not a candidate at level {level}")]
    NotACandidate { level: usize, unit_id: String },
    #[error("already at the root level")]
    AtRoot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome<N> {
    /// A non-terminal pick; the flow moved on to `step`.
    Advanced { step: usize },
    LeafSelected(N),
}

/// Checks the reference data: root units have no parent, every deeper unit
/// points at an existing unit one level up, and ids are unique per level.
pub fn validate_levels<N: HierarchyNode>(levels: &[Vec<N>]) -> Result<(), SelectorError> {
    if levels.is_empty() {
        return Err(SelectorError::NoLevels);
    }

    let mut parent_ids: Option<HashSet<&str>> = None;

    for (level, units) in levels.iter().enumerate() {
        let mut ids = HashSet::with_capacity(units.len());

        for unit in units {
            if !ids.insert(unit.id()) {
                return Err(SelectorError::InvalidHierarchy {
                    level,
                    reason: format!("duplicate id {}", unit.id()),
                });
            }

            match (&parent_ids, unit.parent_id()) {
                (None, None) => {}
                (None, Some(parent)) => {
                    return Err(SelectorError::InvalidHierarchy {
                        level,
                        reason: format!("root unit {} references parent {parent}", unit.id()),
                    });
                }
                (Some(_), None) => {
                    return Err(SelectorError::InvalidHierarchy {
                        level,
                        reason: format!("unit {} has no parent", unit.id()),
                    });
                }
                (Some(parents), Some(parent)) => {
                    if !parents.contains(parent) {
                        return Err(SelectorError::InvalidHierarchy {
                            level,
                            reason: format!(
                                "unit {} references missing parent {parent}",
                                unit.id()
                            ),
                        });
                    }
                }
            }
        }

        parent_ids = Some(ids);
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    Root,
    ChildrenOf(&'a str),
    Unselected,
}

/// N-level drill-down state machine.
///
/// `selection` is always a contiguous prefix: picking at level `k` truncates
/// everything deeper before storing the new unit. `step` is the level whose
/// candidates are on screen and never exceeds `depth - 1`.
#[derive(Debug, Clone)]
pub struct HierarchicalSelector<N> {
    levels: Vec<Vec<N>>,
    step: usize,
    selection: Vec<N>,
}

impl<N: HierarchyNode + Clone> HierarchicalSelector<N> {
    pub fn new(levels: Vec<Vec<N>>) -> Result<Self, SelectorError> {
        validate_levels(&levels)?;
        debug!(depth = levels.len(), "selector created");
        Ok(Self {
            levels,
            step: 0,
            selection: Vec::new(),
        })
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub const fn step(&self) -> usize {
        self.step
    }

    #[must_use]
    pub fn selection(&self) -> &[N] {
        &self.selection
    }

    #[must_use]
    pub fn selected(&self, level: usize) -> Option<&N> {
        self.selection.get(level)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.selection.len() == self.depth()
    }

    #[must_use]
    pub fn leaf(&self) -> Option<&N> {
        if self.is_complete() {
            self.selection.last()
        } else {
            None
        }
    }

    /// Units selectable at `level` given the current selection. Empty when
    /// the parent level has nothing selected or `level` is out of range.
    pub fn candidates_for(&self, level: usize) -> impl Iterator<Item = &N> + '_ {
        let scope = match level.checked_sub(1) {
            None => Scope::Root,
            Some(parent_level) => match self.selection.get(parent_level) {
                Some(parent) => Scope::ChildrenOf(parent.id()),
                None => Scope::Unselected,
            },
        };

        self.levels
            .get(level)
            .into_iter()
            .flatten()
            .filter(move |unit| match scope {
                Scope::Root => unit.parent_id().is_none(),
                Scope::ChildrenOf(parent) => unit.parent_id() == Some(parent),
                Scope::Unselected => false,
            })
    }

    /// Candidates of the level currently on screen.
    pub fn current_candidates(&self) -> impl Iterator<Item = &N> + '_ {
        self.candidates_for(self.step)
    }

    pub fn breadcrumb_segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.selection.iter().take(self.step).map(HierarchyNode::name)
    }

    #[must_use]
    pub fn breadcrumb(&self) -> String {
        self.breadcrumb_segments()
            .collect::<Vec<_>>()
            .join(BREADCRUMB_SEPARATOR)
    }

    pub fn select_at_level(
        &mut self,
        level: usize,
        unit: &N,
    ) -> Result<SelectOutcome<N>, SelectorError> {
        self.select_by_id(level, unit.id())
    }

    /// Picks the candidate with `unit_id` at `level`, dropping deeper picks.
    ///
    /// Re-picking at a shallower level is allowed (breadcrumb jumps); picking
    /// past the current step is not, since no transition skips a level.
    #[instrument(skip(self), fields(step = self.step))]
    pub fn select_by_id(
        &mut self,
        level: usize,
        unit_id: &str,
    ) -> Result<SelectOutcome<N>, SelectorError> {
        let depth = self.depth();
        if level >= depth {
            return Err(SelectorError::LevelOutOfRange { level, depth });
        }
        if level > self.step {
            return Err(SelectorError::LevelNotReached {
                level,
                step: self.step,
            });
        }

        let Some(chosen) = self
            .candidates_for(level)
            .find(|unit| unit.id() == unit_id)
            .cloned()
        else {
            warn!(level, unit_id, "rejected unit outside candidate set");
            return Err(SelectorError::NotACandidate {
                level,
                unit_id: unit_id.to_string(),
            });
        };

        self.selection.truncate(level);
        self.selection.push(chosen);

        if level + 1 < depth {
            self.step = level + 1;
            debug!(step = self.step, "selection advanced");
            Ok(SelectOutcome::Advanced { step: self.step })
        } else {
            self.step = level;
            debug!(unit_id, "leaf selected");
            Ok(SelectOutcome::LeafSelected(self.selection[level].clone()))
        }
    }

    /// Moves one level up. Picks at and above the new step are kept so the
    /// breadcrumb survives a round trip; a chosen leaf is discarded.
    pub fn go_back(&mut self) -> Result<usize, SelectorError> {
        if self.step == 0 {
            return Err(SelectorError::AtRoot);
        }
        if self.is_complete() {
            self.selection.pop();
        }
        self.step -= 1;
        debug!(step = self.step, "selection stepped back");
        Ok(self.step)
    }

    pub fn reset(&mut self) {
        self.step = 0;
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Unit {
        id: String,
        name: String,
        parent: Option<String>,
    }

    impl HierarchyNode for Unit {
        fn id(&self) -> &str {
            &self.id
        }
        fn name(&self) -> &str {
            &self.name
        }
        fn parent_id(&self) -> Option<&str> {
            self.parent.as_deref()
        }
    }

    fn unit(id: &str, parent: Option<&str>) -> Unit {
        Unit {
            id: id.into(),
            name: id.to_uppercase(),
            parent: parent.map(Into::into),
        }
    }

    fn three_levels() -> Vec<Vec<Unit>> {
        vec![
            vec![unit("r1", None), unit("r2", None)],
            vec![
                unit("d1", Some("r1")),
                unit("d2", Some("r1")),
                unit("d3", Some("r2")),
            ],
            vec![
                unit("p1", Some("d1")),
                unit("p2", Some("d1")),
                unit("p3", Some("d2")),
                unit("p4", Some("d3")),
            ],
        ]
    }

    fn ids<'a>(units: impl Iterator<Item = &'a Unit>) -> Vec<&'a str> {
        units.map(|u| u.id.as_str()).collect()
    }

    fn at_terminal() -> HierarchicalSelector<Unit> {
        let mut selector = HierarchicalSelector::new(three_levels()).unwrap();
        selector.select_by_id(0, "r1").unwrap();
        selector.select_by_id(1, "d1").unwrap();
        selector.select_by_id(2, "p1").unwrap();
        selector
    }

    #[test]
    fn test_initial_state() {
        let selector = HierarchicalSelector::new(three_levels()).unwrap();
        assert_eq!(selector.step(), 0);
        assert!(selector.selection().is_empty());
        assert!(!selector.is_complete());
        assert_eq!(selector.breadcrumb(), "");
        assert_eq!(ids(selector.candidates_for(0)), vec!["r1", "r2"]);
        assert!(selector.candidates_for(1).next().is_none());
    }

    #[test]
    fn test_candidates_narrow_by_parent() {
        let mut selector = HierarchicalSelector::new(three_levels()).unwrap();
        selector.select_by_id(0, "r1").unwrap();
        assert_eq!(ids(selector.candidates_for(1)), vec!["d1", "d2"]);

        selector.select_by_id(0, "r2").unwrap();
        assert_eq!(ids(selector.candidates_for(1)), vec!["d3"]);
        assert_eq!(ids(selector.current_candidates()), vec!["d3"]);
    }

    #[test]
    fn test_reselect_root_clears_downstream() {
        let mut selector = at_terminal();
        assert!(selector.is_complete());

        let outcome = selector.select_by_id(0, "r2").unwrap();
        assert_eq!(outcome, SelectOutcome::Advanced { step: 1 });
        assert_eq!(ids(selector.selection().iter()), vec!["r2"]);
        assert_eq!(selector.step(), 1);
        assert!(!selector.is_complete());
        assert!(selector.leaf().is_none());
    }

    #[test]
    fn test_leaf_selection_is_terminal() {
        let mut selector = HierarchicalSelector::new(three_levels()).unwrap();
        selector.select_by_id(0, "r1").unwrap();
        selector.select_by_id(1, "d1").unwrap();
        let outcome = selector.select_by_id(2, "p2").unwrap();

        assert_eq!(outcome, SelectOutcome::LeafSelected(unit("p2", Some("d1"))));
        assert!(selector.is_complete());
        assert_eq!(selector.step(), 2);
        assert_eq!(selector.leaf().map(|u| u.id.as_str()), Some("p2"));
        assert_eq!(selector.breadcrumb(), "R1 > D1");
    }

    #[test]
    fn test_leaf_can_be_changed_in_place() {
        let mut selector = at_terminal();
        selector.select_by_id(2, "p2").unwrap();
        assert_eq!(selector.leaf().map(|u| u.id.as_str()), Some("p2"));
        assert_eq!(selector.selection().len(), 3);
    }

    #[test]
    fn test_orphan_unit_is_rejected() {
        let mut selector = HierarchicalSelector::new(three_levels()).unwrap();
        selector.select_by_id(0, "r1").unwrap();

        let err = selector.select_by_id(1, "d3").unwrap_err();
        assert_eq!(
            err,
            SelectorError::NotACandidate {
                level: 1,
                unit_id: "d3".into()
            }
        );
        assert_eq!(selector.selection().len(), 1);
        assert_eq!(selector.step(), 1);

        assert!(selector.select_at_level(1, &unit("d1", Some("r1"))).is_ok());
    }

    #[test]
    fn test_cannot_skip_levels() {
        let mut selector = HierarchicalSelector::new(three_levels()).unwrap();
        assert_eq!(
            selector.select_by_id(1, "d1"),
            Err(SelectorError::LevelNotReached { level: 1, step: 0 })
        );
        assert_eq!(
            selector.select_by_id(3, "x"),
            Err(SelectorError::LevelOutOfRange { level: 3, depth: 3 })
        );
    }

    #[test]
    fn test_go_back_keeps_parent_selection() {
        let mut selector = HierarchicalSelector::new(three_levels()).unwrap();
        selector.select_by_id(0, "r1").unwrap();
        selector.select_by_id(1, "d2").unwrap();

        assert_eq!(selector.go_back(), Ok(1));
        assert_eq!(selector.breadcrumb(), "R1");
        assert_eq!(selector.selected(0).map(|u| u.id.as_str()), Some("r1"));
        assert_eq!(selector.selected(1).map(|u| u.id.as_str()), Some("d2"));

        assert_eq!(selector.go_back(), Ok(0));
        assert_eq!(selector.breadcrumb(), "");
        assert_eq!(selector.selected(0).map(|u| u.id.as_str()), Some("r1"));
    }

    #[test]
    fn test_go_back_from_terminal_discards_leaf() {
        let mut selector = at_terminal();
        assert_eq!(selector.go_back(), Ok(1));
        assert!(!selector.is_complete());
        assert!(selector.selected(2).is_none());
        assert_eq!(selector.selected(1).map(|u| u.id.as_str()), Some("d1"));
    }

    #[test]
    fn test_go_back_at_root_is_state_error() {
        let mut selector = HierarchicalSelector::new(three_levels()).unwrap();
        assert_eq!(selector.go_back(), Err(SelectorError::AtRoot));
        selector.select_by_id(0, "r1").unwrap();
        selector.go_back().unwrap();
        assert_eq!(selector.go_back(), Err(SelectorError::AtRoot));
    }

    #[test]
    fn test_reset() {
        let mut selector = at_terminal();
        selector.reset();
        assert_eq!(selector.step(), 0);
        assert!(selector.selection().is_empty());
    }

    #[test]
    fn test_single_level_hierarchy() {
        let mut selector =
            HierarchicalSelector::new(vec![vec![unit("a", None), unit("b", None)]]).unwrap();
        let outcome = selector.select_by_id(0, "b").unwrap();
        assert!(matches!(outcome, SelectOutcome::LeafSelected(_)));
        assert!(selector.is_complete());
        assert_eq!(selector.go_back(), Err(SelectorError::AtRoot));
    }

    #[test]
    fn test_validate_levels() {
        assert_eq!(
            validate_levels::<Unit>(&[]),
            Err(SelectorError::NoLevels)
        );

        let dangling = vec![vec![unit("r1", None)], vec![unit("d1", Some("r9"))]];
        assert!(matches!(
            validate_levels(&dangling),
            Err(SelectorError::InvalidHierarchy { level: 1, .. })
        ));

        let rooted_child = vec![vec![unit("r1", Some("x"))]];
        assert!(matches!(
            validate_levels(&rooted_child),
            Err(SelectorError::InvalidHierarchy { level: 0, .. })
        ));

        let orphan = vec![vec![unit("r1", None)], vec![unit("d1", None)]];
        assert!(matches!(
            validate_levels(&orphan),
            Err(SelectorError::InvalidHierarchy { level: 1, .. })
        ));

        let duplicate = vec![vec![unit("r1", None), unit("r1", None)]];
        assert!(matches!(
            validate_levels(&duplicate),
            Err(SelectorError::InvalidHierarchy { level: 0, .. })
        ));
    }

    proptest! {
        #[test]
        fn candidates_match_brute_force(picks in proptest::collection::vec((0usize..3, 0usize..4), 0..20)) {
            let levels = three_levels();
            let mut selector = HierarchicalSelector::new(levels.clone()).unwrap();

            for (level, pick) in picks {
                let options: Vec<String> =
                    selector.candidates_for(level).map(|u| u.id.clone()).collect();
                if let Some(id) = options.get(pick % options.len().max(1)) {
                    let _ = selector.select_by_id(level, id);
                }

                for check in 0..levels.len() {
                    let expected: Vec<&str> = match check.checked_sub(1) {
                        None => levels[0].iter().map(|u| u.id.as_str()).collect(),
                        Some(parent) => match selector.selected(parent) {
                            Some(p) => levels[check]
                                .iter()
                                .filter(|u| u.parent.as_deref() == Some(p.id.as_str()))
                                .map(|u| u.id.as_str())
                                .collect(),
                            None => Vec::new(),
                        },
                    };
                    prop_assert_eq!(ids(selector.candidates_for(check)), expected);
                }

                prop_assert!(selector.step() < levels.len());
                prop_assert!(selector.selection().len() >= selector.step());
            }
        }
    }
}
