use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::path::PathBuf;

use ndarray::{
    Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, ArrayViewMut3, Axis,
};

use crate::error::{DatasetError, Result};

/// Canonical record keys.
pub const DATA: &str = "data";
pub const TARGET: &str = "target";
pub const TARGET_NAMES: &str = "target_names";
pub const DESCR: &str = "DESCR";
pub const IMAGES: &str = "images";
pub const FILENAMES: &str = "filenames";

// ---------------------------------------------------------------------------
// Field – a borrowed entry of a record
// ---------------------------------------------------------------------------

/// A record entry seen through key lookup. Borrows from the record, so a
/// field and the struct member it came from are the same storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<'a> {
    Matrix(ArrayView2<'a, f64>),
    Images(ArrayView3<'a, f64>),
    Floats(ArrayView1<'a, f64>),
    Labels(ArrayView1<'a, usize>),
    Names(&'a [String]),
    Paths(&'a [PathBuf]),
    Text(&'a str),
    /// Key is present but carries nothing (e.g. no description supplied).
    Null,
}

impl<'a> Field<'a> {
    pub fn as_matrix(&self) -> Option<ArrayView2<'a, f64>> {
        match self {
            Field::Matrix(m) => Some(m.clone()),
            _ => None,
        }
    }

    pub fn as_images(&self) -> Option<ArrayView3<'a, f64>> {
        match self {
            Field::Images(i) => Some(i.clone()),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<ArrayView1<'a, f64>> {
        match self {
            Field::Floats(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_labels(&self) -> Option<ArrayView1<'a, usize>> {
        match self {
            Field::Labels(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_names(&self) -> Option<&'a [String]> {
        match self {
            Field::Names(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_paths(&self) -> Option<&'a [PathBuf]> {
        match self {
            Field::Paths(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Field::Text(t) => Some(*t),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Matrix(m) => write!(f, "matrix {}x{}", m.nrows(), m.ncols()),
            Field::Images(i) => {
                let (n, h, w) = i.dim();
                write!(f, "images {n}x{h}x{w}")
            }
            Field::Floats(v) => write!(f, "float vector [{}]", v.len()),
            Field::Labels(v) => write!(f, "label vector [{}]", v.len()),
            Field::Names(n) => write!(f, "{}", n.join(", ")),
            Field::Paths(p) => write!(f, "{} paths", p.len()),
            Field::Text(t) => write!(f, "text ({} chars)", t.chars().count()),
            Field::Null => write!(f, "<none>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – dual key / field access
// ---------------------------------------------------------------------------

/// Key-based access to a dataset record. Every key returned by [`keys`]
/// resolves through [`get`] for the lifetime of the record.
///
/// [`keys`]: Record::keys
/// [`get`]: Record::get
pub trait Record {
    fn keys(&self) -> Vec<&str>;

    fn get(&self, key: &str) -> Option<Field<'_>>;

    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

fn descr_field(descr: &Option<String>) -> Field<'_> {
    match descr {
        Some(text) => Field::Text(text),
        None => Field::Null,
    }
}

// ---------------------------------------------------------------------------
// Value / Bunch – generic owned record
// ---------------------------------------------------------------------------

/// An owned record value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Matrix(Array2<f64>),
    Images(Array3<f64>),
    Floats(Array1<f64>),
    Labels(Array1<usize>),
    Names(Vec<String>),
    Paths(Vec<PathBuf>),
    Text(String),
    Null,
}

impl Value {
    pub fn as_field(&self) -> Field<'_> {
        match self {
            Value::Matrix(m) => Field::Matrix(m.view()),
            Value::Images(i) => Field::Images(i.view()),
            Value::Floats(v) => Field::Floats(v.view()),
            Value::Labels(v) => Field::Labels(v.view()),
            Value::Names(n) => Field::Names(n),
            Value::Paths(p) => Field::Paths(p),
            Value::Text(t) => Field::Text(t),
            Value::Null => Field::Null,
        }
    }
}

impl From<Option<String>> for Value {
    fn from(text: Option<String>) -> Self {
        text.map_or(Value::Null, Value::Text)
    }
}

/// Generic record: a fixed mapping of names to values.
///
/// Built once from `(name, value)` pairs and never extended afterwards. A
/// repeated name keeps the last value, as inserting into a map would.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bunch {
    entries: BTreeMap<String, Value>,
}

impl Bunch {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        entries.into_iter().collect()
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Bunch {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Bunch {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Index<&str> for Bunch {
    type Output = Value;

    /// Panics when the key is absent, like `BTreeMap`'s indexing.
    fn index(&self, key: &str) -> &Value {
        match self.entries.get(key) {
            Some(value) => value,
            None => panic!("no entry named '{key}' in bunch"),
        }
    }
}

impl Record for Bunch {
    fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    fn get(&self, key: &str) -> Option<Field<'_>> {
        self.entries.get(key).map(Value::as_field)
    }
}

// ---------------------------------------------------------------------------
// TabularDataset – classification data with integer labels
// ---------------------------------------------------------------------------

/// A classification dataset: `data` is samples × features, `target[i]` is an
/// index into `target_names`.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    pub data: Array2<f64>,
    pub target: Array1<usize>,
    pub target_names: Vec<String>,
    pub descr: Option<String>,
    image_shape: Option<(usize, usize)>,
}

impl TabularDataset {
    pub fn new(
        data: Array2<f64>,
        target: Array1<usize>,
        target_names: Vec<String>,
        descr: Option<String>,
    ) -> Self {
        TabularDataset {
            data,
            target,
            target_names,
            descr,
            image_shape: None,
        }
    }

    /// Declare that every sample is a `height × width` image, enabling
    /// [`images`](Self::images).
    pub fn with_image_shape(mut self, height: usize, width: usize) -> Result<Self> {
        if height * width != self.data.ncols() {
            return Err(DatasetError::Shape(format!(
                "{height}x{width} images need {} features, data has {}",
                height * width,
                self.data.ncols()
            )));
        }
        self.image_shape = Some((height, width));
        Ok(self)
    }

    pub fn image_shape(&self) -> Option<(usize, usize)> {
        self.image_shape
    }

    /// Samples × height × width view over `data`'s buffer.
    ///
    /// `None` without an image shape, or if `data` was replaced by an array
    /// that can no longer be reshaped in place.
    pub fn images(&self) -> Option<ArrayView3<'_, f64>> {
        let (height, width) = self.image_shape?;
        self.data
            .view()
            .into_shape_with_order((self.data.nrows(), height, width))
            .ok()
    }

    /// Mutable counterpart of [`images`](Self::images); writes land in `data`.
    pub fn images_mut(&mut self) -> Option<ArrayViewMut3<'_, f64>> {
        let (height, width) = self.image_shape?;
        let n_samples = self.data.nrows();
        self.data
            .view_mut()
            .into_shape_with_order((n_samples, height, width))
            .ok()
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    /// Name of the class of sample `index`.
    pub fn target_name(&self, index: usize) -> Option<&str> {
        let label = *self.target.get(index)?;
        self.target_names.get(label).map(String::as_str)
    }

    /// Per-class sample counts, indexed like `target_names`.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.target_names.len()];
        for &label in self.target.iter() {
            if let Some(slot) = counts.get_mut(label) {
                *slot += 1;
            }
        }
        counts
    }
}

impl Record for TabularDataset {
    fn keys(&self) -> Vec<&str> {
        let mut keys = vec![DATA, TARGET, TARGET_NAMES, DESCR];
        if self.images().is_some() {
            keys.push(IMAGES);
        }
        keys
    }

    fn get(&self, key: &str) -> Option<Field<'_>> {
        match key {
            DATA => Some(Field::Matrix(self.data.view())),
            TARGET => Some(Field::Labels(self.target.view())),
            TARGET_NAMES => Some(Field::Names(&self.target_names)),
            DESCR => Some(descr_field(&self.descr)),
            IMAGES => self.images().map(Field::Images),
            _ => None,
        }
    }
}

/// Flattens into a generic record. The image view is materialised as its
/// own array here, since a `Bunch` owns each value separately.
impl From<TabularDataset> for Bunch {
    fn from(dataset: TabularDataset) -> Self {
        let images = dataset.images().map(|view| view.to_owned());
        let mut entries = vec![
            (TARGET, Value::Labels(dataset.target)),
            (TARGET_NAMES, Value::Names(dataset.target_names)),
            (DESCR, Value::from(dataset.descr)),
            (DATA, Value::Matrix(dataset.data)),
        ];
        if let Some(images) = images {
            entries.push((IMAGES, Value::Images(images)));
        }
        Bunch::new(entries)
    }
}

// ---------------------------------------------------------------------------
// RegressionDataset – continuous targets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionDataset {
    pub data: Array2<f64>,
    pub target: Array1<f64>,
    pub descr: Option<String>,
}

impl RegressionDataset {
    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    /// Column means of `data`; empty when there are no samples.
    pub fn feature_means(&self) -> Array1<f64> {
        self.data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(0))
    }
}

impl Record for RegressionDataset {
    fn keys(&self) -> Vec<&str> {
        vec![DATA, TARGET, DESCR]
    }

    fn get(&self, key: &str) -> Option<Field<'_>> {
        match key {
            DATA => Some(Field::Matrix(self.data.view())),
            TARGET => Some(Field::Floats(self.target.view())),
            DESCR => Some(descr_field(&self.descr)),
            _ => None,
        }
    }
}

impl From<RegressionDataset> for Bunch {
    fn from(dataset: RegressionDataset) -> Self {
        Bunch::new([
            (DATA, Value::Matrix(dataset.data)),
            (TARGET, Value::Floats(dataset.target)),
            (DESCR, Value::from(dataset.descr)),
        ])
    }
}

// ---------------------------------------------------------------------------
// FileCorpus – category-labelled files on disk
// ---------------------------------------------------------------------------

/// Paths of a directory corpus with one label per file. File contents are
/// never read.
#[derive(Debug, Clone, PartialEq)]
pub struct FileCorpus {
    pub filenames: Vec<PathBuf>,
    pub target: Array1<usize>,
    pub target_names: Vec<String>,
    pub descr: Option<String>,
}

impl FileCorpus {
    /// Number of files.
    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }

    /// `(path, category name)` pairs in corpus order.
    pub fn labelled_paths(&self) -> impl Iterator<Item = (&PathBuf, &str)> {
        self.filenames
            .iter()
            .zip(self.target.iter())
            .map(|(path, &label)| (path, self.target_names[label].as_str()))
    }
}

impl Record for FileCorpus {
    fn keys(&self) -> Vec<&str> {
        vec![FILENAMES, TARGET, TARGET_NAMES, DESCR]
    }

    fn get(&self, key: &str) -> Option<Field<'_>> {
        match key {
            FILENAMES => Some(Field::Paths(&self.filenames)),
            TARGET => Some(Field::Labels(self.target.view())),
            TARGET_NAMES => Some(Field::Names(&self.target_names)),
            DESCR => Some(descr_field(&self.descr)),
            _ => None,
        }
    }
}

impl From<FileCorpus> for Bunch {
    fn from(corpus: FileCorpus) -> Self {
        Bunch::new([
            (FILENAMES, Value::Paths(corpus.filenames)),
            (TARGET, Value::Labels(corpus.target)),
            (TARGET_NAMES, Value::Names(corpus.target_names)),
            (DESCR, Value::from(corpus.descr)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array};

    fn small_images() -> TabularDataset {
        let data = Array::from_shape_vec((2, 4), (0..8).map(f64::from).collect()).unwrap();
        TabularDataset::new(
            data,
            array![0, 1],
            vec!["a".into(), "b".into()],
            None,
        )
        .with_image_shape(2, 2)
        .unwrap()
    }

    #[test]
    fn bunch_exposes_every_constructed_key() {
        let bunch = Bunch::new([
            ("target", Value::Labels(array![0, 1, 1])),
            ("DESCR", Value::Text("three samples".into())),
        ]);
        assert_eq!(bunch.len(), 2);
        assert_eq!(bunch.keys(), vec!["DESCR", "target"]);
        assert_eq!(bunch["target"], Value::Labels(array![0, 1, 1]));
        assert_eq!(bunch.get("DESCR").unwrap().as_text(), Some("three samples"));
        assert!(bunch.get("data").is_none());
    }

    #[test]
    fn bunch_keeps_last_duplicate() {
        let bunch = Bunch::new([
            ("DESCR", Value::Text("first".into())),
            ("DESCR", Value::Text("second".into())),
        ]);
        assert_eq!(bunch.len(), 1);
        assert_eq!(bunch["DESCR"], Value::Text("second".into()));
    }

    #[test]
    #[should_panic(expected = "no entry named 'images'")]
    fn bunch_index_panics_on_missing_key() {
        let bunch = Bunch::default();
        let _ = &bunch["images"];
    }

    #[test]
    fn typed_fields_and_keys_agree() {
        let ds = small_images();
        let target = ds.get(TARGET).unwrap().as_labels().unwrap();
        assert_eq!(target, ds.target.view());
        assert_eq!(ds.get(TARGET_NAMES).unwrap().as_names().unwrap(), &ds.target_names[..]);
        assert!(ds.get(DESCR).unwrap().is_null());
        for key in ds.keys() {
            assert!(ds.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn images_view_shares_storage_with_data() {
        let mut ds = small_images();
        assert_eq!(ds.images().unwrap().dim(), (2, 2, 2));
        assert_eq!(ds.images().unwrap()[[1, 0, 1]], 5.0);

        ds.images_mut().unwrap()[[1, 1, 0]] = -1.0;
        assert_eq!(ds.data[[1, 2]], -1.0);

        ds.data[[0, 3]] = 42.0;
        assert_eq!(ds.images().unwrap()[[0, 1, 1]], 42.0);
    }

    #[test]
    fn images_key_dropped_when_data_no_longer_reshapes() {
        let mut ds = small_images();
        assert!(ds.keys().contains(&IMAGES));

        ds.data = Array2::zeros((2, 3));
        assert!(ds.images().is_none());
        assert!(!ds.keys().contains(&IMAGES));
        for key in ds.keys() {
            assert!(ds.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn image_shape_must_cover_features() {
        let ds = TabularDataset::new(Array2::zeros((1, 6)), array![0], vec!["a".into()], None);
        assert!(matches!(ds.with_image_shape(2, 2), Err(DatasetError::Shape(_))));
    }

    #[test]
    fn class_counts_and_names() {
        let ds = small_images();
        assert_eq!(ds.class_counts(), vec![1, 1]);
        assert_eq!(ds.target_name(1), Some("b"));
        assert_eq!(ds.target_name(2), None);
    }

    #[test]
    fn tabular_into_bunch_keeps_images() {
        let bunch = Bunch::from(small_images());
        assert_eq!(bunch.keys(), vec!["DESCR", "data", "images", "target", "target_names"]);
        assert_eq!(bunch["DESCR"], Value::Null);
        let images = bunch.get(IMAGES).unwrap().as_images().unwrap();
        assert_eq!(images[[1, 1, 1]], 7.0);
    }

    #[test]
    fn corpus_pairs_paths_with_names() {
        let corpus = FileCorpus {
            filenames: vec![PathBuf::from("/c/a/1"), PathBuf::from("/c/b/2")],
            target: array![0, 1],
            target_names: vec!["a".into(), "b".into()],
            descr: Some("two files".into()),
        };
        let pairs: Vec<_> = corpus.labelled_paths().map(|(_, name)| name).collect();
        assert_eq!(pairs, vec!["a", "b"]);
        assert_eq!(corpus.get(FILENAMES).unwrap().to_string(), "2 paths");
        assert_eq!(corpus.get(DESCR).unwrap().as_text(), Some("two files"));
    }
}
