use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::filter::{is_selected, selection_from, unmatched_categories};
use super::model::FileCorpus;
use crate::error::{DatasetError, Result};

/// Seed used when shuffling without an explicit generator.
pub const DEFAULT_SEED: u64 = 42;

/// Options for [`load_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFilesOptions {
    /// Free text stored as the corpus `DESCR`.
    pub description: Option<String>,
    /// Category allow-list; `None` loads every subfolder.
    pub categories: Option<Vec<String>>,
    pub shuffle: bool,
    /// Seed for the generator [`load_files`] creates. Ignored by
    /// [`load_files_with_rng`].
    pub seed: u64,
}

impl Default for LoadFilesOptions {
    fn default() -> Self {
        LoadFilesOptions {
            description: None,
            categories: None,
            shuffle: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl LoadFilesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Load a corpus laid out as one subfolder per category:
///
/// ```text
/// container/
///     category_a/
///         file_1.txt
///         file_2.txt
///     category_b/
///         file_3.txt
/// ```
///
/// Folder names, sorted, become `target_names`; each file's label is the
/// position of its folder in that list. Only paths are collected, files are
/// not opened. When shuffling, a `StdRng` seeded with `options.seed` drives
/// the permutation, so equal seeds give equal orders.
pub fn load_files(container: impl AsRef<Path>, options: &LoadFilesOptions) -> Result<FileCorpus> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    load_files_with_rng(container, options, &mut rng)
}

/// Like [`load_files`], shuffling with a caller-owned generator. The
/// generator is left advanced, so successive calls sharing it see different
/// permutations.
pub fn load_files_with_rng<R: Rng + ?Sized>(
    container: impl AsRef<Path>,
    options: &LoadFilesOptions,
    rng: &mut R,
) -> Result<FileCorpus> {
    let container = container.as_ref();
    check_container(container)?;
    let container = std::path::absolute(container).map_err(|e| DatasetError::io(container, e))?;

    // (display name, real path): names may be lossy, paths never are
    let folders: Vec<(String, PathBuf)> = sorted_entries(&container)?
        .into_iter()
        .filter(|(_, path)| path.is_dir())
        .collect();

    let selection = selection_from(options.categories.as_deref());
    let folder_names: Vec<String> = folders.iter().map(|(name, _)| name.clone()).collect();
    for name in unmatched_categories(&folder_names, &selection) {
        debug!("category '{name}' not found under {}, ignored", container.display());
    }
    let folders: Vec<(String, PathBuf)> = folders
        .into_iter()
        .filter(|(name, _)| is_selected(name, &selection))
        .collect();

    let mut target_names = Vec::with_capacity(folders.len());
    let mut filenames = Vec::new();
    let mut target = Vec::new();
    for (label, (folder, folder_path)) in folders.into_iter().enumerate() {
        let documents: Vec<PathBuf> = sorted_entries(&folder_path)?
            .into_iter()
            .map(|(_, path)| path)
            .filter(|path| !path.is_dir())
            .collect();
        debug!("{}: {} files", folder, documents.len());
        target.extend(std::iter::repeat(label).take(documents.len()));
        filenames.extend(documents);
        target_names.push(folder);
    }

    if options.shuffle {
        let mut indices: Vec<usize> = (0..filenames.len()).collect();
        indices.shuffle(rng);
        filenames = indices.iter().map(|&i| filenames[i].clone()).collect();
        target = indices.iter().map(|&i| target[i]).collect();
    }

    info!(
        "loaded {} files in {} categories from {}",
        filenames.len(),
        target_names.len(),
        container.display()
    );

    Ok(FileCorpus {
        filenames,
        target: Array1::from(target),
        target_names,
        descr: options.description.clone(),
    })
}

fn check_container(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DatasetError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(DatasetError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(DatasetError::io(path, e)),
    }
}

/// Entries of `dir` as `(name, full path)`, sorted by raw name. The name is
/// for display only; non-UTF-8 names are converted lossily.
fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| DatasetError::io(dir, e))? {
        let entry = entry.map_err(|e| DatasetError::io(dir, e))?;
        entries.push((entry.file_name(), entry.path()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries
        .into_iter()
        .map(|(name, path)| (name.to_string_lossy().into_owned(), path))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// `cat_b/{y.txt}`, `cat_a/{x.txt, z.txt}`, plus a stray top-level file.
    fn corpus() -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("cat_b")).unwrap();
        fs::create_dir(root.join("cat_a")).unwrap();
        fs::write(root.join("cat_b/y.txt"), "y").unwrap();
        fs::write(root.join("cat_a/z.txt"), "z").unwrap();
        fs::write(root.join("cat_a/x.txt"), "x").unwrap();
        fs::write(root.join("README"), "not a category").unwrap();
        tmp
    }

    fn names(corpus: &FileCorpus) -> Vec<String> {
        corpus
            .filenames
            .iter()
            .map(|p| {
                let folder = p.parent().unwrap().file_name().unwrap().to_string_lossy();
                let file = p.file_name().unwrap().to_string_lossy();
                format!("{folder}/{file}")
            })
            .collect()
    }

    /// 4 categories × 5 files.
    fn larger_corpus() -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().unwrap();
        for cat in ["d", "a", "c", "b"] {
            fs::create_dir(tmp.path().join(cat)).unwrap();
            for i in 0..5 {
                fs::write(tmp.path().join(cat).join(format!("{i}.txt")), cat).unwrap();
            }
        }
        tmp
    }

    #[test]
    fn unshuffled_is_grouped_and_sorted() {
        let tmp = corpus();
        let result = load_files(tmp.path(), &LoadFilesOptions::new().shuffle(false)).unwrap();

        assert_eq!(result.target_names, vec!["cat_a", "cat_b"]);
        assert_eq!(names(&result), vec!["cat_a/x.txt", "cat_a/z.txt", "cat_b/y.txt"]);
        assert_eq!(result.target.to_vec(), vec![0, 0, 1]);
        assert!(result.filenames.iter().all(|p| p.is_absolute()));
        assert!(result.filenames[0].starts_with(std::path::absolute(tmp.path()).unwrap()));
        assert_eq!(result.descr, None);
    }

    #[test]
    fn labels_index_target_names() {
        let tmp = larger_corpus();
        let result = load_files(tmp.path(), &LoadFilesOptions::new()).unwrap();
        assert_eq!(result.len(), result.target.len());
        for (path, name) in result.labelled_paths() {
            assert_eq!(fs::read_to_string(path).unwrap(), name);
        }
    }

    #[test]
    fn same_seed_same_order() {
        let tmp = larger_corpus();
        let opts = LoadFilesOptions::new().seed(7);
        let first = load_files(tmp.path(), &opts).unwrap();
        let second = load_files(tmp.path(), &opts).unwrap();
        assert_eq!(first, second);

        let unshuffled = load_files(tmp.path(), &opts.clone().shuffle(false)).unwrap();
        assert_ne!(first.filenames, unshuffled.filenames);
        let a: HashSet<_> = first.filenames.iter().collect();
        let b: HashSet<_> = unshuffled.filenames.iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn explicit_rng_matches_seed() {
        let tmp = larger_corpus();
        let opts = LoadFilesOptions::new();
        let seeded = load_files(tmp.path(), &opts).unwrap();

        let mut rng = StdRng::seed_from_u64(DEFAULT_SEED);
        let with_rng = load_files_with_rng(tmp.path(), &opts, &mut rng).unwrap();
        assert_eq!(seeded, with_rng);

        // the shared generator has advanced
        let again = load_files_with_rng(tmp.path(), &opts, &mut rng).unwrap();
        assert_ne!(with_rng.filenames, again.filenames);
    }

    #[test]
    fn allow_list_filters_categories() {
        let tmp = larger_corpus();
        let opts = LoadFilesOptions::new()
            .categories(["c", "a", "zzz"])
            .description("two of four");
        let result = load_files(tmp.path(), &opts).unwrap();

        assert_eq!(result.target_names, vec!["a", "c"]);
        assert_eq!(result.len(), 10);
        for (path, name) in result.labelled_paths() {
            assert!(path.parent().unwrap().ends_with(name));
            assert_ne!(name, "b");
            assert_ne!(name, "d");
        }
        assert_eq!(result.descr.as_deref(), Some("two of four"));
    }

    #[test]
    fn allow_list_excluding_everything_is_empty() {
        let tmp = corpus();
        let opts = LoadFilesOptions::new().categories(["nope"]);
        let result = load_files(tmp.path(), &opts).unwrap();
        assert!(result.is_empty());
        assert!(result.target.is_empty());
        assert!(result.target_names.is_empty());
    }

    #[test]
    fn missing_container() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = load_files(tmp.path().join("absent"), &LoadFilesOptions::new()).unwrap_err();
        assert!(matches!(err, DatasetError::NotFound(_)));
    }

    #[test]
    fn container_is_a_file() {
        let tmp = corpus();
        let err = load_files(tmp.path().join("README"), &LoadFilesOptions::new()).unwrap_err();
        assert!(matches!(err, DatasetError::NotADirectory(_)));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_category_folder() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let folder = tmp.path().join(OsStr::from_bytes(b"caf\xe9"));
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("a.txt"), "a").unwrap();

        let result = load_files(tmp.path(), &LoadFilesOptions::new().shuffle(false)).unwrap();
        assert_eq!(result.target_names, vec!["caf\u{FFFD}"]);
        assert_eq!(result.len(), 1);
        assert_eq!(result.filenames[0].parent().unwrap().file_name(), folder.file_name());
        assert!(result.filenames[0].is_file());
    }
}
