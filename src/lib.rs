//! Small reference datasets and directory-corpus loading.
//!
//! Bundled datasets are read from a resource root (see
//! [`Resources`](data::resources::Resources)); user corpora are read from any
//! directory with one subfolder per category.
//!
//! ```no_run
//! use rusty_bunch::data::files::{load_files, LoadFilesOptions};
//! use rusty_bunch::data::loader::load_iris;
//!
//! let iris = load_iris()?;
//! assert_eq!(iris.target_names, ["setosa", "versicolor", "virginica"]);
//!
//! let corpus = load_files("20news/train", &LoadFilesOptions::new().seed(0))?;
//! println!("{} documents", corpus.len());
//! # Ok::<(), rusty_bunch::DatasetError>(())
//! ```

pub mod data;
pub mod error;
pub mod proba;
pub mod summary;

pub use data::files::{load_files, load_files_with_rng, LoadFilesOptions};
pub use data::loader::{load_digits, load_iris, load_trees};
pub use data::model::{Bunch, Field, FileCorpus, Record, RegressionDataset, TabularDataset, Value};
pub use data::resources::Resources;
pub use error::{DatasetError, Result};
