//! Console rendering of a finished report.
//!
//! Every function here is a pure function of a [`Report`] and the configured
//! [`Thresholds`]; printing is left to the caller.

use crate::config::{MetricTarget, Thresholds};
use crate::report::Report;
use std::fmt::Write as _;

const RULE_WIDTH: usize = 70;

/// Format `value` with `digits` decimals, rounding ties away from zero.
///
/// `{:.2}` rounds ties to even (`0.125` → `0.12`); scores are often exact
/// k/8 fractions, so the scaled value is rounded first.
pub fn fixed(value: f64, digits: usize) -> String {
    let scale = 10f64.powi(digits as i32);
    format!("{:.*}", digits, (value * scale).round() / scale)
}

/// Per-case status derived from faithfulness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Pass,
    Warn,
    Fail,
}

impl CaseStatus {
    pub fn from_faithfulness(faithfulness: f64, thresholds: &Thresholds) -> Self {
        if faithfulness >= thresholds.case_pass {
            Self::Pass
        } else if faithfulness >= thresholds.case_warn {
            Self::Warn
        } else {
            Self::Fail
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Pass => "✓",
            Self::Warn => "⚠",
            Self::Fail => "✗",
        }
    }
}

/// Aggregate metric grade against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Pass,
    Partial,
    Fail,
}

impl Grade {
    pub fn for_score(value: f64, target: &MetricTarget) -> Self {
        if value >= target.target {
            Self::Pass
        } else if value >= target.partial {
            Self::Partial
        } else {
            Self::Fail
        }
    }

    /// Latency has no partial band.
    pub fn for_latency(p50_ms: f64, limit_ms: f64) -> Self {
        if p50_ms <= limit_ms {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Pass => "✓",
            Self::Partial => "~",
            Self::Fail => "x",
        }
    }
}

fn rule(c: char) -> String {
    std::iter::repeat_n(c, RULE_WIDTH).collect()
}

/// Fixed-width per-case table with a header.
pub fn case_table(report: &Report, thresholds: &Thresholds) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "ID            Category              F    R    P    Latency"
    );
    let _ = writeln!(out, "{}", rule('-'));
    for r in &report.results {
        let status = CaseStatus::from_faithfulness(r.faithfulness, thresholds);
        let _ = writeln!(
            out,
            "{:<13} {:<20.20} {} {} {} {:>6}ms  {}",
            r.id,
            r.category,
            fixed(r.faithfulness, 2),
            fixed(r.relevance, 2),
            fixed(r.precision, 2),
            fixed(r.latency_ms, 0),
            status.glyph()
        );
    }
    out
}

/// Aggregate metrics graded against their targets.
pub fn metrics_block(report: &Report, thresholds: &Thresholds) -> String {
    let m = &report.metrics;
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule('='));
    let _ = writeln!(out, "METRICS ({} cases)", report.case_count());
    let _ = writeln!(out, "{}", rule('='));
    let scored = [
        ("Faithfulness:     ", m.faithfulness, &thresholds.faithfulness),
        ("Context Precision:", m.context_precision, &thresholds.context_precision),
        ("Answer Relevance: ", m.answer_relevance, &thresholds.answer_relevance),
    ];
    for (label, value, target) in scored {
        let _ = writeln!(
            out,
            "{label} {} / 1.00  {}",
            fixed(value, 2),
            Grade::for_score(value, target).glyph()
        );
    }
    let _ = writeln!(
        out,
        "Latency p50:       {}ms  {}",
        fixed(m.latency_p50, 0),
        Grade::for_latency(m.latency_p50, thresholds.latency_p50_ms).glyph()
    );
    let _ = writeln!(out, "Latency p90:       {}ms", fixed(m.latency_p90, 0));
    out
}

/// One-line compliance summary, present only when the slice exists.
pub fn compliance_line(report: &Report) -> Option<String> {
    report
        .compliance
        .as_ref()
        .map(|c| format!("{}: {} faithfulness", c.label, fixed(c.faithfulness, 2)))
}

/// Markdown table rows for pasting into documentation.
pub fn readme_table(report: &Report, thresholds: &Thresholds) -> String {
    let m = &report.metrics;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "| Faithfulness | {} | ≥{} |",
        fixed(m.faithfulness, 2),
        fixed(thresholds.faithfulness.target, 2)
    );
    let _ = writeln!(
        out,
        "| Context Precision | {} | ≥{} |",
        fixed(m.context_precision, 2),
        fixed(thresholds.context_precision.target, 2)
    );
    let _ = writeln!(
        out,
        "| Answer Relevance | {} | ≥{} |",
        fixed(m.answer_relevance, 2),
        fixed(thresholds.answer_relevance.target, 2)
    );
    let _ = writeln!(
        out,
        "| Latency (p50) | {}ms | ≤{}ms |",
        fixed(m.latency_p50, 0),
        fixed(thresholds.latency_p50_ms, 0)
    );
    out
}

/// The full console summary: table, metrics, compliance line and README rows.
pub fn summary(report: &Report, thresholds: &Thresholds, report_path: Option<&str>) -> String {
    let mut out = case_table(report, thresholds);
    out.push_str(&metrics_block(report, thresholds));
    if let Some(line) = compliance_line(report) {
        let _ = writeln!(out, "\n{line}");
    }
    if let Some(path) = report_path {
        let _ = writeln!(out, "\nResults in {path}");
    }
    let _ = writeln!(out, "\nREADME table:");
    out.push_str(&readme_table(report, thresholds));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseResult;
    use crate::config::ComplianceConfig;
    use crate::metrics::MetricScores;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn report(results: Vec<CaseResult>) -> Report {
        Report::build_at(
            results,
            &ComplianceConfig::default(),
            Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap(),
        )
    }

    fn case(id: &str, category: &str, f: f64, latency_ms: f64) -> CaseResult {
        CaseResult::new(
            id,
            category,
            MetricScores {
                faithfulness: f,
                relevance: 0.25,
                precision: 0.5,
            },
            latency_ms,
        )
    }

    #[test]
    fn test_fixed_rounds_ties_up() {
        assert_eq!(fixed(0.125, 2), "0.13");
        assert_eq!(fixed(0.625, 2), "0.63");
        assert_eq!(fixed(0.375, 2), "0.38");
        assert_eq!(fixed(412.5, 0), "413");
        assert_eq!(fixed(0.0, 2), "0.00");
        assert_eq!(fixed(1.0, 2), "1.00");
    }

    #[test]
    fn test_tie_scores_render_rounded_up() {
        let r = report(vec![CaseResult::new(
            "Q1",
            "dosing",
            MetricScores {
                faithfulness: 0.125,
                relevance: 0.625,
                precision: 0.375,
            },
            412.5,
        )]);
        let t = Thresholds::default();

        let row = case_table(&r, &t).lines().nth(2).unwrap().to_string();
        assert_eq!(
            row,
            "Q1            dosing               0.13 0.63 0.38    413ms  ✗"
        );

        let block = metrics_block(&r, &t);
        assert!(block.contains("Faithfulness:      0.13 / 1.00  x"));
        assert!(block.contains("Answer Relevance:  0.63 / 1.00  x"));
        assert!(block.contains("Latency p50:       413ms  ✓"));
        assert!(block.contains("Latency p90:       413ms\n"));

        let readme = readme_table(&r, &t);
        assert!(readme.contains("| Faithfulness | 0.13 | ≥0.85 |"));
        assert!(readme.contains("| Latency (p50) | 413ms | ≤800ms |"));
    }

    #[test]
    fn test_case_status_bands() {
        let t = Thresholds::default();
        assert_eq!(CaseStatus::from_faithfulness(0.75, &t), CaseStatus::Pass);
        assert_eq!(CaseStatus::from_faithfulness(0.5, &t), CaseStatus::Warn);
        assert_eq!(CaseStatus::from_faithfulness(0.49, &t), CaseStatus::Fail);
    }

    #[test]
    fn test_grades_follow_configured_targets() {
        let t = Thresholds::default();
        assert_eq!(Grade::for_score(0.85, &t.faithfulness), Grade::Pass);
        assert_eq!(Grade::for_score(0.80, &t.faithfulness), Grade::Partial);
        assert_eq!(Grade::for_score(0.80, &t.context_precision), Grade::Pass);
        assert_eq!(Grade::for_score(0.10, &t.answer_relevance), Grade::Fail);
        assert_eq!(Grade::for_latency(800.0, t.latency_p50_ms), Grade::Pass);
        assert_eq!(Grade::for_latency(801.0, t.latency_p50_ms), Grade::Fail);

        let strict = MetricTarget::new(0.95, 0.9);
        assert_eq!(Grade::for_score(0.85, &strict), Grade::Fail);
    }

    #[test]
    fn test_case_row_layout() {
        let r = report(vec![case(
            "MED-01",
            "medicare-billing-and-coding",
            0.8,
            412.4,
        )]);
        let table = case_table(&r, &Thresholds::default());
        let row = table.lines().nth(2).unwrap();
        assert_eq!(
            row,
            "MED-01        medicare-billing-and 0.80 0.25 0.50    412ms  ✓"
        );
    }

    #[test]
    fn test_metrics_block_and_readme() {
        let r = report(vec![case("Q1", "dosing", 0.6, 900.0)]);
        let t = Thresholds::default();

        let block = metrics_block(&r, &t);
        assert!(block.contains("METRICS (1 cases)"));
        assert!(block.contains("Faithfulness:      0.60 / 1.00  x"));
        assert!(block.contains("Latency p50:       900ms  x"));
        assert!(block.contains("Latency p90:       900ms\n"));

        let readme = readme_table(&r, &t);
        assert_eq!(
            readme.lines().collect::<Vec<_>>(),
            vec![
                "| Faithfulness | 0.60 | ≥0.85 |",
                "| Context Precision | 0.50 | ≥0.80 |",
                "| Answer Relevance | 0.25 | ≥0.85 |",
                "| Latency (p50) | 900ms | ≤800ms |",
            ]
        );
    }

    #[test]
    fn test_summary_includes_compliance_only_when_present() {
        let t = Thresholds::default();
        let plain = summary(&report(vec![case("Q1", "voice", 0.9, 300.0)]), &t, None);
        assert!(!plain.contains("Medicare compliance"));

        let marked = summary(
            &report(vec![
                case("M1", "medicare-billing", 0.9, 300.0),
                case("M2", "medicare-billing", 0.7, 300.0),
            ]),
            &t,
            Some("eval/baseline_results.json"),
        );
        assert!(marked.contains("Medicare compliance: 0.80 faithfulness"));
        assert!(marked.contains("Results in eval/baseline_results.json"));
        assert!(marked.contains("README table:"));
    }
}
