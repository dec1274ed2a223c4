//! Data layer: records, bundled loaders, and the directory-corpus loader.
//!
//! Architecture:
//! ```text
//!  resources/data/*.csv(.gz)        container/<category>/<file>
//!        │                                   │
//!        ▼                                   ▼
//!   ┌──────────┐                      ┌──────────┐
//!   │  loader   │ parse → dataset      │  files    │ list, label, shuffle
//!   └──────────┘                      └──────────┘
//!        │                                   │   ▲
//!        │                                   │   └── filter (category allow-list)
//!        ▼                                   ▼
//!   ┌────────────────────────────────────────────┐
//!   │ model: TabularDataset / RegressionDataset / │
//!   │        FileCorpus / Bunch  (Record access)   │
//!   └────────────────────────────────────────────┘
//! ```

pub mod files;
pub mod filter;
pub mod loader;
pub mod model;
pub mod resources;
