use std::path::{Path, PathBuf};

use storage::models::Discipline;

use crate::error::{Result, SyncError};

pub const MAX_POINTS: usize = 1400;

/// Points of a performance better than anything the table knows. Such results are suspicious
/// and get flagged instead of scored.
pub const INVALID_RESULT_SENTINEL: i16 = -1;

/// Marks a table entry without a value.
const NO_RESULT_SENTINEL: i64 = -2;

/// Performance-to-points table of one discipline.
///
/// Entry `i` holds the performance required for `MAX_POINTS - i` points, so the table runs from
/// best to worst performance.
#[derive(Debug, Clone)]
pub struct ScoreList {
    ascending: bool,
    values: Vec<i64>,
    best: i64,
    worst: i64,
}

impl ScoreList {
    /// `{dir}/{indoor|outdoor}/{men|women}/{score_identifier}.json`
    pub fn path(dir: &Path, discipline: &Discipline) -> Option<PathBuf> {
        let identifier = discipline.score_identifier.as_deref()?;
        Some(
            dir.join(discipline.place())
                .join(discipline.gender())
                .join(format!("{identifier}.json")),
        )
    }

    pub fn load(dir: &Path, discipline: &Discipline) -> Result<Self> {
        let path = Self::path(dir, discipline).ok_or_else(|| {
            SyncError::ScoreListError(format!(
                "Discipline {} has no score identifier",
                discipline.name
            ))
        })?;

        if !path.is_file() {
            return Err(SyncError::ScoreListError(format!(
                "{} was not found",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path)?;
        let values: Vec<i64> = serde_json::from_str(&content)?;
        Self::from_values(values, discipline.ascending)
    }

    /// Builds the table from raw entries. Leading missing entries become unreachable, interior
    /// ones repeat the preceding value.
    pub fn from_values(mut values: Vec<i64>, ascending: bool) -> Result<Self> {
        if values.len() != MAX_POINTS {
            return Err(SyncError::ScoreListError(format!(
                "Expected {} entries, found {}",
                MAX_POINTS,
                values.len()
            )));
        }

        let unreachable = Self::unreachable(ascending);
        let first_value = values
            .iter()
            .position(|v| *v != NO_RESULT_SENTINEL)
            .unwrap_or(values.len());
        values[..first_value].fill(unreachable);

        let best = values.get(first_value).copied().unwrap_or(unreachable);
        let mut last = best;
        for value in values.iter_mut().skip(first_value) {
            if *value == NO_RESULT_SENTINEL {
                *value = last;
            } else {
                last = *value;
            }
        }

        let monotone = values.windows(2).all(|pair| {
            if ascending {
                pair[0] <= pair[1]
            } else {
                pair[0] >= pair[1]
            }
        });
        if !monotone {
            return Err(SyncError::ScoreListError(format!(
                "Score table is not monotonically {}",
                if ascending { "increasing" } else { "decreasing" }
            )));
        }

        Ok(Self {
            ascending,
            values,
            best,
            worst: last,
        })
    }

    fn unreachable(ascending: bool) -> i64 {
        if ascending { 0 } else { i64::MAX }
    }

    /// Points for `performance`: [`INVALID_RESULT_SENTINEL`] above the table, 0 below it.
    pub fn find_score(&self, performance: i32) -> i16 {
        let performance = i64::from(performance);
        let (above_best, below_worst) = if self.ascending {
            (performance < self.best, performance > self.worst)
        } else {
            (performance > self.best, performance < self.worst)
        };

        if above_best {
            return INVALID_RESULT_SENTINEL;
        }
        if below_worst {
            return 0;
        }

        let position = if self.ascending {
            self.values.partition_point(|v| *v < performance)
        } else {
            self.values.partition_point(|v| *v > performance)
        };

        // position < MAX_POINTS since performance is within [best, worst]
        (MAX_POINTS - position) as i16
    }

    /// Lowest performance worth `score` points, `None` if the table has no value for it.
    pub fn find_performance(&self, score: usize) -> Option<i64> {
        if !(1..=MAX_POINTS).contains(&score) {
            return None;
        }
        let value = self.values[MAX_POINTS - score];
        (value != Self::unreachable(self.ascending)).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Ascending table: 1000 hundredths for 1400 points, one hundredth slower per point.
    fn sprint_values() -> Vec<i64> {
        (0..MAX_POINTS as i64).map(|i| 1000 + i).collect()
    }

    #[test]
    fn test_find_score_ascending() {
        let list = ScoreList::from_values(sprint_values(), true).unwrap();
        assert_eq!(list.find_score(999), INVALID_RESULT_SENTINEL);
        assert_eq!(list.find_score(1000), 1400);
        assert_eq!(list.find_score(1001), 1399);
        assert_eq!(list.find_score(2399), 1);
        assert_eq!(list.find_score(2400), 0);
    }

    #[test]
    fn test_find_score_descending() {
        let values: Vec<i64> = (0..MAX_POINTS as i64).map(|i| 900 - i / 2).collect();
        let list = ScoreList::from_values(values, false).unwrap();
        assert_eq!(list.find_score(901), INVALID_RESULT_SENTINEL);
        assert_eq!(list.find_score(900), 1400);
        // 899 is first reached at index 2
        assert_eq!(list.find_score(899), 1398);
        assert_eq!(list.find_score(201), 2);
        assert_eq!(list.find_score(200), 0);
    }

    #[test]
    fn test_missing_entries_are_filled() {
        let mut values = sprint_values();
        values[0] = NO_RESULT_SENTINEL;
        values[1] = NO_RESULT_SENTINEL;
        values[10] = NO_RESULT_SENTINEL;
        let list = ScoreList::from_values(values, true).unwrap();

        assert_eq!(list.find_score(1001), INVALID_RESULT_SENTINEL);
        assert_eq!(list.find_score(1002), 1400 - 2);
        // index 10 repeats index 9, so 1010 first appears at index 11
        assert_eq!(list.find_score(1010), 1400 - 11);
        assert_eq!(list.find_performance(1400), None);
        assert_eq!(list.find_performance(1398), Some(1002));
        assert_eq!(list.find_performance(0), None);
    }

    #[test]
    fn test_rejects_malformed_tables() {
        assert!(ScoreList::from_values(vec![1, 2, 3], true).is_err());

        let mut values = sprint_values();
        values.swap(3, 4);
        assert!(ScoreList::from_values(values, true).is_err());
        assert!(ScoreList::from_values(sprint_values(), false).is_err());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let discipline = Discipline {
            discipline_id: Uuid::new_v4(),
            config_id: Uuid::new_v4(),
            name: "100m".to_string(),
            ascending: true,
            discipline_code: "100".to_string(),
            indoor: false,
            male: false,
            ignore: false,
            score_identifier: Some("100m".to_string()),
        };

        assert!(matches!(
            ScoreList::load(dir.path(), &discipline),
            Err(SyncError::ScoreListError(_))
        ));

        let path = ScoreList::path(dir.path(), &discipline).unwrap();
        assert!(path.ends_with("outdoor/women/100m.json"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, serde_json::to_string(&sprint_values()).unwrap()).unwrap();

        let list = ScoreList::load(dir.path(), &discipline).unwrap();
        assert_eq!(list.find_score(1000), 1400);
    }
}
