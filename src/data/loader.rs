use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use log::info;
use ndarray::{s, Array1, Array2};

use super::model::{RegressionDataset, TabularDataset};
use super::resources::Resources;
use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// Public entry-points (default resource root)
// ---------------------------------------------------------------------------

/// The 3-class iris dataset: 150 samples, 4 features.
pub fn load_iris() -> Result<TabularDataset> {
    Resources::default().load_iris()
}

/// 8×8 digit images, 10 classes. `images()` is available on the result.
pub fn load_digits() -> Result<TabularDataset> {
    Resources::default().load_digits()
}

/// Black cherry trees regression dataset: girth and height → volume.
pub fn load_trees() -> Result<RegressionDataset> {
    Resources::default().load_trees()
}

impl Resources {
    pub fn load_iris(&self) -> Result<TabularDataset> {
        self.load_header_csv("iris.csv", "iris.rst")
    }

    pub fn load_digits(&self) -> Result<TabularDataset> {
        let target_names = (0..10).map(|d| d.to_string()).collect();
        self.load_labelled_matrix("digits.csv.gz", Delimiter::Comma, target_names, "digits.rst")?
            .with_image_shape(8, 8)
    }

    pub fn load_trees(&self) -> Result<RegressionDataset> {
        self.load_regression(
            "trees_data.csv.gz",
            "trees_target.csv.gz",
            Delimiter::Whitespace,
            "trees.rst",
        )
    }

    /// Load a header-delimited CSV file from `data/`, see [`parse_header_csv`].
    pub fn load_header_csv(&self, data: &str, descr: &str) -> Result<TabularDataset> {
        let (path, file) = self.open_data(data)?;
        let mut dataset = parse_header_csv(file, &path)?;
        dataset.descr = self.read_descr(descr)?;
        info!(
            "loaded {}: {} samples, {} features, {} classes",
            data,
            dataset.n_samples(),
            dataset.n_features(),
            dataset.target_names.len()
        );
        Ok(dataset)
    }

    /// Load a gzipped matrix whose last column is the class label.
    pub fn load_labelled_matrix(
        &self,
        data: &str,
        delimiter: Delimiter,
        target_names: Vec<String>,
        descr: &str,
    ) -> Result<TabularDataset> {
        let (path, file) = self.open_data(data)?;
        let (matrix, lines) =
            parse_matrix_with_lines(BufReader::new(GzDecoder::new(file)), delimiter, &path)?;
        let (features, target) = split_label_column(matrix, &lines, target_names.len(), &path)?;
        info!(
            "loaded {}: {} samples, {} features",
            data,
            features.nrows(),
            features.ncols()
        );
        Ok(TabularDataset::new(
            features,
            target,
            target_names,
            self.read_descr(descr)?,
        ))
    }

    /// Load features and targets from two gzipped matrices with matching
    /// row counts. The target file must have a single column.
    pub fn load_regression(
        &self,
        data: &str,
        target: &str,
        delimiter: Delimiter,
        descr: &str,
    ) -> Result<RegressionDataset> {
        let (data_path, data_file) = self.open_data(data)?;
        let features = parse_matrix(
            BufReader::new(GzDecoder::new(data_file)),
            delimiter,
            &data_path,
        )?;

        let (target_path, target_file) = self.open_data(target)?;
        let targets = parse_matrix(
            BufReader::new(GzDecoder::new(target_file)),
            delimiter,
            &target_path,
        )?;

        if targets.nrows() > 0 && targets.ncols() != 1 {
            return Err(DatasetError::parse(
                &target_path,
                1,
                format!("expected 1 target column, found {}", targets.ncols()),
            ));
        }
        if targets.nrows() != features.nrows() {
            return Err(DatasetError::Shape(format!(
                "{} has {} rows but {} has {}",
                data,
                features.nrows(),
                target,
                targets.nrows()
            )));
        }

        let target = if targets.nrows() == 0 {
            Array1::zeros(0)
        } else {
            targets.column(0).to_owned()
        };
        info!(
            "loaded {}: {} samples, {} features",
            data,
            features.nrows(),
            features.ncols()
        );
        Ok(RegressionDataset {
            data: features,
            target,
            descr: self.read_descr(descr)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Header-delimited CSV
// ---------------------------------------------------------------------------

/// Parse a CSV whose first row is `n_samples,n_features,name_0,name_1,...`
/// followed by exactly `n_samples` rows of `n_features` floats and one
/// integer label.
///
/// `path` is only used to label errors.
pub fn parse_header_csv<R: Read>(reader: R, path: &Path) -> Result<TabularDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(|e| csv_error(path, e))?,
        None => return Err(DatasetError::parse(path, 1, "empty file, expected header")),
    };
    if header.len() < 2 {
        return Err(DatasetError::parse(
            path,
            1,
            "header must start with sample and feature counts",
        ));
    }
    let n_samples = parse_count(&header[0], "sample count", path)?;
    let n_features = parse_count(&header[1], "feature count", path)?;
    let target_names: Vec<String> = header.iter().skip(2).map(str::to_string).collect();

    // ndarray caps the element count (over non-zero axes) at isize::MAX
    let row_width = n_features.checked_add(1);
    let fits = n_samples
        .max(1)
        .checked_mul(n_features.max(1))
        .is_some_and(|n| n <= isize::MAX as usize);
    let Some(row_width) = row_width.filter(|_| fits) else {
        return Err(DatasetError::parse(
            path,
            1,
            format!("{n_samples} samples x {n_features} features is too large"),
        ));
    };

    // grown row by row so a lying header cannot force a huge allocation
    let mut data = Vec::new();
    let mut target = Vec::new();

    for i in 0..n_samples {
        let record = match records.next() {
            Some(record) => record.map_err(|e| csv_error(path, e))?,
            None => {
                return Err(DatasetError::parse(
                    path,
                    i as u64 + 2,
                    format!("header declares {n_samples} samples, found {i}"),
                ))
            }
        };
        let line = record.position().map_or(i as u64 + 2, |p| p.line());

        if record.len() != row_width {
            return Err(DatasetError::parse(
                path,
                line,
                format!(
                    "expected {} features and a label, found {} fields",
                    n_features,
                    record.len()
                ),
            ));
        }

        for (j, field) in record.iter().take(n_features).enumerate() {
            data.push(field.parse::<f64>().map_err(|_| {
                DatasetError::parse(path, line, format!("feature {j}: '{field}' is not a number"))
            })?);
        }
        target.push(parse_label(&record[n_features], target_names.len(), path, line)?);
    }

    for record in records {
        let record = record.map_err(|e| csv_error(path, e))?;
        if record.iter().any(|f| !f.is_empty()) {
            let line = record.position().map_or(0, |p| p.line());
            return Err(DatasetError::parse(
                path,
                line,
                format!("header declares {n_samples} samples, found more"),
            ));
        }
    }

    let data = Array2::from_shape_vec((n_samples, n_features), data)
        .map_err(|e| DatasetError::Shape(e.to_string()))?;
    Ok(TabularDataset::new(data, Array1::from(target), target_names, None))
}

fn parse_count(field: &str, what: &str, path: &Path) -> Result<usize> {
    field
        .parse::<usize>()
        .map_err(|_| DatasetError::parse(path, 1, format!("{what} '{field}' is not a count")))
}

fn parse_label(field: &str, n_classes: usize, path: &Path, line: u64) -> Result<usize> {
    let label = field
        .parse::<i64>()
        .map_err(|_| DatasetError::parse(path, line, format!("label '{field}' is not an integer")))?;
    check_label(label, n_classes, path, line)
}

fn check_label(label: i64, n_classes: usize, path: &Path, line: u64) -> Result<usize> {
    match usize::try_from(label) {
        Ok(index) if index < n_classes => Ok(index),
        _ => Err(DatasetError::parse(
            path,
            line,
            format!("label {label} outside 0..{n_classes}"),
        )),
    }
}

fn csv_error(path: &Path, err: csv::Error) -> DatasetError {
    let line = err.position().map_or(0, |p| p.line());
    DatasetError::parse(path, line, err.to_string())
}

// ---------------------------------------------------------------------------
// Headerless numeric matrices
// ---------------------------------------------------------------------------

/// Field separator of a headerless numeric matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    /// Any run of spaces or tabs.
    Whitespace,
}

/// Parse rows of numbers into a matrix. Blank lines and `#` comments are
/// skipped; every row must have the same width.
pub fn parse_matrix<R: BufRead>(reader: R, delimiter: Delimiter, path: &Path) -> Result<Array2<f64>> {
    parse_matrix_with_lines(reader, delimiter, path).map(|(matrix, _)| matrix)
}

/// Like [`parse_matrix`], also returning the 1-based source line of each
/// matrix row.
pub fn parse_matrix_with_lines<R: BufRead>(
    reader: R,
    delimiter: Delimiter,
    path: &Path,
) -> Result<(Array2<f64>, Vec<u64>)> {
    let mut values = Vec::new();
    let mut source_lines = Vec::new();
    let mut width = None;
    let mut rows = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx as u64 + 1;
        let line = line.map_err(|e| DatasetError::io(path, e))?;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let before = values.len();
        match delimiter {
            Delimiter::Comma => push_floats(content.split(','), &mut values, path, line_no)?,
            Delimiter::Whitespace => {
                push_floats(content.split_whitespace(), &mut values, path, line_no)?
            }
        }
        let row_width = values.len() - before;

        match width {
            None => width = Some(row_width),
            Some(w) if w != row_width => {
                return Err(DatasetError::parse(
                    path,
                    line_no,
                    format!("expected {w} columns, found {row_width}"),
                ))
            }
            Some(_) => {}
        }
        rows += 1;
        source_lines.push(line_no);
    }

    let matrix = Array2::from_shape_vec((rows, width.unwrap_or(0)), values)
        .map_err(|e| DatasetError::Shape(e.to_string()))?;
    Ok((matrix, source_lines))
}

fn push_floats<'a>(
    tokens: impl Iterator<Item = &'a str>,
    out: &mut Vec<f64>,
    path: &Path,
    line: u64,
) -> Result<()> {
    for (j, tok) in tokens.enumerate() {
        let tok = tok.trim();
        let value = tok.parse::<f64>().map_err(|_| {
            DatasetError::parse(path, line, format!("column {j}: '{tok}' is not a number"))
        })?;
        out.push(value);
    }
    Ok(())
}

/// Split off the last column as integer class labels. `source_lines` maps
/// matrix rows to file lines for error reports, as returned by
/// [`parse_matrix_with_lines`].
pub fn split_label_column(
    matrix: Array2<f64>,
    source_lines: &[u64],
    n_classes: usize,
    path: &Path,
) -> Result<(Array2<f64>, Array1<usize>)> {
    if matrix.ncols() == 0 {
        return Ok((Array2::zeros((0, 0)), Array1::zeros(0)));
    }
    let last = matrix.ncols() - 1;

    let target = matrix
        .column(last)
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            let line = source_lines.get(row).copied().unwrap_or(row as u64 + 1);
            if value.fract() != 0.0 || !value.is_finite() {
                return Err(DatasetError::parse(
                    path,
                    line,
                    format!("label {value} is not an integer"),
                ));
            }
            check_label(value as i64, n_classes, path, line)
        })
        .collect::<Result<Vec<usize>>>()?;

    let features = matrix.slice(s![.., ..last]).to_owned();
    Ok((features, Array1::from(target)))
}
