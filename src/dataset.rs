// GAIA task rows from a split's metadata.jsonl

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskRow {
    pub task_id: String,
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Final answer", default)]
    pub true_answer: String,
    #[serde(rename = "Level", deserialize_with = "level_label")]
    pub task: String,
    #[serde(default)]
    pub file_name: String,
}

impl TaskRow {
    pub fn has_attachment(&self) -> bool {
        !self.file_name.is_empty()
    }
}

// Levels appear both as numbers and strings depending on the export
fn level_label<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Level {
        Number(u64),
        Text(String),
    }

    Ok(match Level::deserialize(deserializer)? {
        Level::Number(n) => n.to_string(),
        Level::Text(s) => s,
    })
}

/// Directory holding a split's metadata and attachments
pub fn split_dir(data_dir: &Path, set: &str) -> PathBuf {
    data_dir.join(set)
}

pub fn parse_tasks(jsonl: &str, split_dir: &Path) -> Result<Vec<TaskRow>> {
    let mut rows = Vec::new();
    for (idx, line) in jsonl.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut row: TaskRow =
            serde_json::from_str(line).with_context(|| format!("Invalid task on line {}", idx + 1))?;
        if row.has_attachment() {
            row.file_name = split_dir.join(&row.file_name).to_string_lossy().into_owned();
        }
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_tasks(data_dir: &Path, set: &str) -> Result<Vec<TaskRow>> {
    let dir = split_dir(data_dir, set);
    let metadata = dir.join("metadata.jsonl");
    let jsonl = std::fs::read_to_string(&metadata)
        .with_context(|| format!("Failed to read {}", metadata.display()))?;

    let rows = parse_tasks(&jsonl, &dir)?;
    info!(set, tasks = rows.len(), "Loaded evaluation dataset");
    Ok(rows)
}

pub fn level_counts(rows: &[TaskRow]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.task.clone()).or_insert(0) += 1;
    }
    counts
}
