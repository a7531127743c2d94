//! Read-only projections over a task list.
//!
//! # Responsibility
//! - Filter tasks by the active tab.
//! - Aggregate completion and per-category counts for charts.
//! - Resolve a task's category metadata with deterministic fallback.
//!
//! # Invariants
//! - Every function here is pure and keeps input order.
//! - Completed and pending filters partition the input.
//! - Category counts follow table order and sum to the input length.

use crate::model::category::{Category, CategoryTable};
use crate::model::task::TaskRecord;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const COMPLETED_COLOR: &str = "#10B981";
pub const PENDING_COLOR: &str = "#F59E0B";

/// Task list tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    All,
    Completed,
    Pending,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::All, Tab::Completed, Tab::Pending];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }

    /// Whether `task` is visible under this tab.
    pub fn matches(self, task: &TaskRecord) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.completed,
            Self::Pending => !task.completed,
        }
    }
}

impl Display for Tab {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            other => Err(format!(
                "unknown tab `{other}`; expected all|completed|pending"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionSummary {
    pub completed_count: usize,
    pub pending_count: usize,
}

impl CompletionSummary {
    pub fn total(&self) -> usize {
        self.completed_count + self.pending_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount<'a> {
    pub category: &'a Category,
    pub count: usize,
}

/// One labeled value handed to the chart renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub label: String,
    pub value: usize,
    pub color: String,
}

pub fn filter_by_tab(tasks: &[TaskRecord], tab: Tab) -> Vec<&TaskRecord> {
    tasks.iter().filter(|task| tab.matches(task)).collect()
}

pub fn aggregate_completion(tasks: &[TaskRecord]) -> CompletionSummary {
    let completed_count = tasks.iter().filter(|task| task.completed).count();
    CompletionSummary {
        completed_count,
        pending_count: tasks.len() - completed_count,
    }
}

/// Counts tasks per category in table order, zero counts included.
///
/// Each task counts under its resolved category: ids match ASCII
/// case-insensitively and unknown types count toward the fallback category.
/// The counts therefore always sum to `tasks.len()`.
pub fn aggregate_by_type<'a>(
    tasks: &[TaskRecord],
    table: &'a CategoryTable,
) -> Vec<CategoryCount<'a>> {
    let mut counts = vec![0usize; table.len()];
    for task in tasks {
        counts[table.resolve_position(&task.kind)] += 1;
    }
    table
        .entries()
        .iter()
        .zip(counts)
        .map(|(category, count)| CategoryCount { category, count })
        .collect()
}

pub fn resolve_category<'a>(task: &TaskRecord, table: &'a CategoryTable) -> &'a Category {
    table.resolve(&task.kind)
}

pub fn completion_chart(summary: CompletionSummary) -> Vec<ChartSlice> {
    vec![
        ChartSlice {
            label: "Completed".to_string(),
            value: summary.completed_count,
            color: COMPLETED_COLOR.to_string(),
        },
        ChartSlice {
            label: "Pending".to_string(),
            value: summary.pending_count,
            color: PENDING_COLOR.to_string(),
        },
    ]
}

pub fn category_chart(counts: &[CategoryCount<'_>]) -> Vec<ChartSlice> {
    counts
        .iter()
        .map(|entry| ChartSlice {
            label: entry.category.name.clone(),
            value: entry.count,
            color: entry.category.color.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{aggregate_completion, completion_chart, Tab};
    use crate::model::task::TaskRecord;
    use chrono::NaiveDate;

    fn task(text: &str, completed: bool) -> TaskRecord {
        let mut task =
            TaskRecord::new(text, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "work").unwrap();
        task.completed = completed;
        task
    }

    #[test]
    fn tab_parses_case_insensitively() {
        assert_eq!("Pending".parse::<Tab>().unwrap(), Tab::Pending);
        assert_eq!(" all ".parse::<Tab>().unwrap(), Tab::All);
        assert!("done".parse::<Tab>().is_err());
        assert_eq!(Tab::default(), Tab::All);
    }

    #[test]
    fn tab_round_trips_through_display() {
        for tab in Tab::ALL {
            assert_eq!(tab.to_string().parse::<Tab>().unwrap(), tab);
        }
    }

    #[test]
    fn completion_chart_orders_completed_first() {
        let tasks = vec![task("a", true), task("b", false), task("c", false)];
        let summary = aggregate_completion(&tasks);
        assert_eq!(summary.total(), 3);

        let slices = completion_chart(summary);
        assert_eq!(slices[0].label, "Completed");
        assert_eq!(slices[0].value, 1);
        assert_eq!(slices[1].label, "Pending");
        assert_eq!(slices[1].value, 2);
    }
}
