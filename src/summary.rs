use std::fmt;

use serde::Serialize;

use crate::data::model::{FileCorpus, Record, RegressionDataset, TabularDataset};

// ---------------------------------------------------------------------------
// Summary – what the CLI reports about a loaded record
// ---------------------------------------------------------------------------

/// Printable overview of a loaded record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub name: String,
    pub n_samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
    pub target_names: Vec<String>,
    /// Samples per entry of `target_names`.
    pub class_counts: Vec<usize>,
    pub keys: Vec<String>,
    /// First few rows (tabular) or paths (corpus), rendered as text.
    pub head: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
}

fn keys_of(record: &impl Record) -> Vec<String> {
    record.keys().into_iter().map(str::to_string).collect()
}

fn render_row<'a>(values: impl Iterator<Item = &'a f64>) -> String {
    values
        .map(|v| format!("{v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Summary {
    pub fn of_tabular(name: &str, ds: &TabularDataset, head: usize) -> Self {
        Summary {
            name: name.to_string(),
            n_samples: ds.n_samples(),
            n_features: Some(ds.n_features()),
            target_names: ds.target_names.clone(),
            class_counts: ds.class_counts(),
            keys: keys_of(ds),
            head: ds
                .data
                .outer_iter()
                .zip(ds.target.iter())
                .take(head)
                .map(|(row, label)| format!("[{}] -> {}", render_row(row.iter()), label))
                .collect(),
            descr: ds.descr.clone(),
        }
    }

    pub fn of_regression(name: &str, ds: &RegressionDataset, head: usize) -> Self {
        Summary {
            name: name.to_string(),
            n_samples: ds.n_samples(),
            n_features: Some(ds.n_features()),
            target_names: Vec::new(),
            class_counts: Vec::new(),
            keys: keys_of(ds),
            head: ds
                .data
                .outer_iter()
                .zip(ds.target.iter())
                .take(head)
                .map(|(row, y)| format!("[{}] -> {}", render_row(row.iter()), y))
                .collect(),
            descr: ds.descr.clone(),
        }
    }

    pub fn of_corpus(name: &str, corpus: &FileCorpus, head: usize) -> Self {
        let mut class_counts = vec![0; corpus.target_names.len()];
        for &label in corpus.target.iter() {
            class_counts[label] += 1;
        }
        Summary {
            name: name.to_string(),
            n_samples: corpus.len(),
            n_features: None,
            target_names: corpus.target_names.clone(),
            class_counts,
            keys: keys_of(corpus),
            head: corpus
                .labelled_paths()
                .take(head)
                .map(|(path, category)| format!("{} -> {}", path.display(), category))
                .collect(),
            descr: corpus.descr.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} samples", self.name, self.n_samples)?;
        if let Some(n) = self.n_features {
            write!(f, ", {n} features")?;
        }
        writeln!(f)?;
        writeln!(f, "keys: {}", self.keys.join(", "))?;
        if !self.target_names.is_empty() {
            let classes: Vec<String> = self
                .target_names
                .iter()
                .zip(&self.class_counts)
                .map(|(name, count)| format!("{name} ({count})"))
                .collect();
            writeln!(f, "classes: {}", classes.join(", "))?;
        }
        for line in &self.head {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}
