use std::collections::HashMap;

use tracing::debug;

use crate::model::{CellKey, Team};

/// Flattened row order for the whole grid: teams by `order`, then resources
/// by `order` within their team, inactive resources excluded. Range
/// selection indexes into this order.
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    rows: Vec<String>,
    index_by_resource: HashMap<String, usize>,
}

impl GridIndex {
    #[tracing::instrument(skip(teams))]
    pub fn from_teams(teams: &[Team]) -> Self {
        let mut teams: Vec<&Team> = teams.iter().collect();
        teams.sort_by_key(|t| t.order);

        let mut rows = Vec::new();
        for team in teams {
            let mut resources: Vec<_> = team.resources.iter().filter(|r| r.is_active).collect();
            resources.sort_by_key(|r| r.order);
            rows.extend(resources.into_iter().map(|r| r.id.clone()));
        }

        let index_by_resource = rows
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        debug!(rows = rows.len(), "built grid index");
        Self {
            rows,
            index_by_resource,
        }
    }

    pub fn row_of(&self, resource_id: &str) -> Option<usize> {
        self.index_by_resource.get(resource_id).copied()
    }

    pub fn resource_at(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn resource_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(String::as_str)
    }

    /// Inclusive rectangle between two cells of the same schedule: the
    /// cross-product of the row span and the day span, order-independent.
    /// Cells whose resource is unknown to the grid produce an empty range.
    pub fn rectangle(&self, a: &CellKey, b: &CellKey) -> Vec<CellKey> {
        debug_assert_eq!(a.schedule_id, b.schedule_id);

        let (Some(ra), Some(rb)) = (self.row_of(&a.resource_id), self.row_of(&b.resource_id))
        else {
            return Vec::new();
        };

        let (row_lo, row_hi) = (ra.min(rb), ra.max(rb));
        let (day_lo, day_hi) = (
            a.day_of_week.min(b.day_of_week),
            a.day_of_week.max(b.day_of_week),
        );

        let mut cells = Vec::with_capacity((row_hi - row_lo + 1) * usize::from(day_hi - day_lo + 1));
        for row in row_lo..=row_hi {
            let Some(resource_id) = self.resource_at(row) else {
                continue;
            };
            for day in day_lo..=day_hi {
                cells.push(CellKey::new(a.schedule_id.clone(), resource_id, day));
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Resource;

    fn team(id: &str, order: i64, resources: Vec<Resource>) -> Team {
        Team {
            id: id.to_string(),
            name: id.to_string(),
            display_name: id.to_uppercase(),
            order,
            color: None,
            resources,
        }
    }

    fn resource(id: &str, team_id: &str, order: i64, active: bool) -> Resource {
        Resource {
            id: id.to_string(),
            name: id.to_string(),
            team_id: team_id.to_string(),
            order,
            is_active: active,
        }
    }

    fn sample_teams() -> Vec<Team> {
        vec![
            team(
                "t2",
                2,
                vec![resource("m3", "t2", 1, true), resource("m4", "t2", 2, false)],
            ),
            team(
                "t1",
                1,
                vec![resource("m2", "t1", 2, true), resource("m1", "t1", 1, true)],
            ),
        ]
    }

    #[test]
    fn rows_follow_team_then_resource_order_skipping_inactive() {
        let grid = GridIndex::from_teams(&sample_teams());
        let rows: Vec<_> = grid.resource_ids().collect();
        assert_eq!(rows, vec!["m1", "m2", "m3"]);
        assert_eq!(grid.row_of("m2"), Some(1));
        assert_eq!(grid.row_of("m4"), None);
    }

    #[test]
    fn rectangle_is_inclusive_and_order_independent() {
        let grid = GridIndex::from_teams(&sample_teams());
        let a = CellKey::new("s1", "m1", 0);
        let b = CellKey::new("s1", "m3", 2);

        let forward = grid.rectangle(&a, &b);
        let backward = grid.rectangle(&b, &a);

        assert_eq!(forward.len(), 9);
        assert_eq!(forward, backward);
        for resource in ["m1", "m2", "m3"] {
            for day in 0..=2 {
                assert!(forward.contains(&CellKey::new("s1", resource, day)));
            }
        }
    }

    #[test]
    fn rectangle_with_unknown_resource_is_empty() {
        let grid = GridIndex::from_teams(&sample_teams());
        let a = CellKey::new("s1", "m1", 0);
        let b = CellKey::new("s1", "ghost", 2);
        assert!(grid.rectangle(&a, &b).is_empty());
    }
}
