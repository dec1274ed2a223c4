//! Probability estimates from an external linear classification solver.
//!
//! The numerical work happens behind [`ProbabilitySolver`]. This module only
//! checks shapes on the way in and fixes the column order on the way out:
//! solvers report one column per class in their own internal label order,
//! callers get columns in ascending label order.

use ndarray::{Array2, ArrayView2, Axis};

use crate::error::{DatasetError, Result};

/// Regularisation norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Penalty {
    L1,
    L2,
}

/// Solver settings forwarded verbatim with every prediction call.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParams {
    pub penalty: Penalty,
    pub dual: bool,
    pub tol: f64,
    pub c: f64,
    /// Intercept feature value appended to each sample, negative when the
    /// model has no intercept.
    pub bias: f64,
}

/// The external solver seam.
pub trait ProbabilitySolver {
    /// Raw probabilities, `n_samples × n_classes`, with column `j` belonging
    /// to `labels[j]`.
    fn predict_proba_raw(
        &self,
        x: ArrayView2<'_, f64>,
        coef: ArrayView2<'_, f64>,
        labels: &[i64],
        params: &SolverParams,
    ) -> Result<Array2<f64>>;
}

/// Permute the columns of `probas` so they follow ascending `labels`.
///
/// Column `j` of the result is the column whose label is the `j`-th smallest.
/// Ties keep their original relative order.
pub fn reorder_columns(probas: ArrayView2<'_, f64>, labels: &[i64]) -> Result<Array2<f64>> {
    if probas.ncols() != labels.len() {
        return Err(DatasetError::Shape(format!(
            "{} probability columns for {} labels",
            probas.ncols(),
            labels.len()
        )));
    }
    Ok(probas.select(Axis(1), &argsort(labels)))
}

fn argsort(labels: &[i64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by_key(|&i| labels[i]);
    order
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hyperparameters {
    penalty: Penalty,
    dual: bool,
    tol: f64,
    c: f64,
    fit_intercept: bool,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters {
            penalty: Penalty::L2,
            dual: false,
            tol: 1e-4,
            c: 1.0,
            fit_intercept: true,
        }
    }
}

impl Hyperparameters {
    pub fn new() -> Hyperparameters {
        Hyperparameters::default()
    }

    pub fn penalty(&mut self, penalty: Penalty) -> &mut Hyperparameters {
        self.penalty = penalty;
        self
    }

    /// Dual formulation; only valid with the L2 penalty.
    pub fn dual(&mut self, dual: bool) -> &mut Hyperparameters {
        self.dual = dual;
        self
    }

    pub fn tol(&mut self, tol: f64) -> &mut Hyperparameters {
        self.tol = tol;
        self
    }

    /// Inverse regularisation strength. Smaller is stronger.
    pub fn c(&mut self, c: f64) -> &mut Hyperparameters {
        self.c = c;
        self
    }

    pub fn fit_intercept(&mut self, fit_intercept: bool) -> &mut Hyperparameters {
        self.fit_intercept = fit_intercept;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.c.is_nan() || self.c <= 0.0 {
            return Err(DatasetError::InvalidParameter(format!(
                "C must be positive, got {}",
                self.c
            )));
        }
        if self.tol.is_nan() || self.tol <= 0.0 {
            return Err(DatasetError::InvalidParameter(format!(
                "tol must be positive, got {}",
                self.tol
            )));
        }
        if self.dual && self.penalty == Penalty::L1 {
            return Err(DatasetError::InvalidParameter(
                "dual formulation requires the l2 penalty".to_string(),
            ));
        }
        Ok(())
    }

    fn solver_params(&self) -> SolverParams {
        SolverParams {
            penalty: self.penalty,
            dual: self.dual,
            tol: self.tol,
            c: self.c,
            bias: if self.fit_intercept { 1.0 } else { -1.0 },
        }
    }

    /// Wrap an already fitted coefficient matrix.
    ///
    /// `coef` has one row per decision function and `n_features` columns,
    /// plus one trailing intercept column when `fit_intercept` is set.
    /// `labels` are the class labels in the solver's internal order.
    pub fn build<S: ProbabilitySolver>(
        &self,
        solver: S,
        coef: Array2<f64>,
        labels: Vec<i64>,
    ) -> Result<LogisticRegression<S>> {
        self.validate()?;
        let intercept_cols = usize::from(self.fit_intercept);
        if coef.ncols() < intercept_cols {
            return Err(DatasetError::Shape(
                "coefficient matrix has no intercept column".to_string(),
            ));
        }
        if labels.len() < 2 {
            return Err(DatasetError::InvalidParameter(format!(
                "need at least 2 classes, got {}",
                labels.len()
            )));
        }
        // binary problems carry a single decision function
        let expected_rows = if labels.len() == 2 { 1 } else { labels.len() };
        if coef.nrows() != expected_rows && coef.nrows() != labels.len() {
            return Err(DatasetError::Shape(format!(
                "{} coefficient rows for {} classes",
                coef.nrows(),
                labels.len()
            )));
        }
        Ok(LogisticRegression {
            n_features: coef.ncols() - intercept_cols,
            hyperparams: self.clone(),
            solver,
            coef,
            labels,
        })
    }
}

/// L1/L2 regularised logistic regression backed by an external solver.
#[derive(Debug, Clone)]
pub struct LogisticRegression<S> {
    n_features: usize,
    hyperparams: Hyperparameters,
    solver: S,
    coef: Array2<f64>,
    labels: Vec<i64>,
}

impl<S: ProbabilitySolver> LogisticRegression<S> {
    /// Feature coefficients, without the intercept column.
    pub fn coef(&self) -> ArrayView2<'_, f64> {
        self.coef.slice(ndarray::s![.., ..self.n_features])
    }

    /// Intercepts, one per decision function, if the model has them.
    pub fn intercept(&self) -> Option<Vec<f64>> {
        if self.hyperparams.fit_intercept {
            Some(self.coef.column(self.n_features).to_vec())
        } else {
            None
        }
    }

    /// Class labels in ascending order, matching the probability columns.
    pub fn classes(&self) -> Vec<i64> {
        let mut classes = self.labels.clone();
        classes.sort_unstable();
        classes
    }

    /// Class probabilities, `n_samples × n_classes`, columns ordered by
    /// ascending class label.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features {
            return Err(DatasetError::Shape(format!(
                "model expects {} features, input has {}",
                self.n_features,
                x.ncols()
            )));
        }
        let raw = self.solver.predict_proba_raw(
            x,
            self.coef.view(),
            &self.labels,
            &self.hyperparams.solver_params(),
        )?;
        if raw.nrows() != x.nrows() {
            return Err(DatasetError::Solver(format!(
                "solver returned {} rows for {} samples",
                raw.nrows(),
                x.nrows()
            )));
        }
        reorder_columns(raw.view(), &self.labels)
    }

    /// Natural log of [`predict_proba`](Self::predict_proba).
    pub fn predict_log_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        Ok(self.predict_proba(x)?.mapv_into(f64::ln))
    }
}
