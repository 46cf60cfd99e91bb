//! Append-only ordered collection of case results.

use serde::{Deserialize, Serialize};

use crate::types::{CaseResult, CaseStatus};

/// Ordered case results; insertion order is processing order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSeries {
    name: String,
    cases: Vec<CaseResult>,
}

/// Aggregate view over a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub total: usize,
    pub converged: usize,
    pub not_converged: usize,
    pub solver_errors: usize,
    pub invalid_input: usize,
    /// (min, max) COP over converged cases.
    pub cop_range: Option<(f64, f64)>,
}

impl SeriesSummary {
    pub fn failed(&self) -> usize {
        self.total - self.converged
    }
}

impl ResultSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    pub(crate) fn from_cases(name: impl Into<String>, cases: Vec<CaseResult>) -> Self {
        Self {
            name: name.into(),
            cases,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a result. Existing entries are never modified.
    pub fn push(&mut self, result: CaseResult) {
        self.cases.push(result);
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CaseResult> {
        self.cases.get(index)
    }

    pub fn cases(&self) -> &[CaseResult] {
        &self.cases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaseResult> {
        self.cases.iter()
    }

    pub fn summary(&self) -> SeriesSummary {
        let count = |status| self.cases.iter().filter(|c| c.status() == status).count();
        let cop_range = self
            .cases
            .iter()
            .filter_map(|c| c.metrics().map(|m| m.cop))
            .fold(None, |acc: Option<(f64, f64)>, cop| match acc {
                None => Some((cop, cop)),
                Some((lo, hi)) => Some((lo.min(cop), hi.max(cop))),
            });

        SeriesSummary {
            total: self.cases.len(),
            converged: count(CaseStatus::Converged),
            not_converged: count(CaseStatus::NotConverged),
            solver_errors: count(CaseStatus::SolverError),
            invalid_input: count(CaseStatus::InvalidInput),
            cop_range,
        }
    }
}

impl<'a> IntoIterator for &'a ResultSeries {
    type Item = &'a CaseResult;
    type IntoIter = std::slice::Iter<'a, CaseResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CaseId, Metrics};

    fn ok(index: usize, cop: f64) -> CaseResult {
        CaseResult::success(
            CaseId::Perturbation {
                index,
                value: index as f64,
            },
            Metrics {
                cop,
                compressor_power_w: 1.0,
                evaporator_duty_w: cop - 1.0,
                condenser_duty_w: cop,
            },
        )
    }

    #[test]
    fn push_preserves_order() {
        let mut series = ResultSeries::new("sweep");
        series.push(ok(0, 3.0));
        series.push(CaseResult::not_converged(
            CaseId::Perturbation {
                index: 1,
                value: 1.0,
            },
            "limit",
        ));
        series.push(ok(2, 4.0));

        let indices: Vec<_> = series
            .iter()
            .map(|c| match c.case() {
                CaseId::Perturbation { index, .. } => *index,
                _ => usize::MAX,
            })
            .collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn summary_counts_and_cop_range() {
        let mut series = ResultSeries::new("s");
        series.push(ok(0, 3.0));
        series.push(ok(1, 4.5));
        series.push(CaseResult::solver_error(CaseId::Design, "boom"));

        let s = series.summary();
        assert_eq!(s.total, 3);
        assert_eq!(s.converged, 2);
        assert_eq!(s.failed(), 1);
        assert_eq!(s.solver_errors, 1);
        assert_eq!(s.cop_range, Some((3.0, 4.5)));
    }

    #[test]
    fn empty_summary_has_no_cop_range() {
        let s = ResultSeries::new("empty").summary();
        assert_eq!(s.total, 0);
        assert!(s.cop_range.is_none());
    }
}
