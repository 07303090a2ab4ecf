//! Formatted terminal output for a test run.
//!
//! We keep formatting code in one place so:
//! - the estimation/testing code stays clean and testable
//! - output changes are localized

use crate::domain::{FamilyEvaluation, Sample, TesterConfig};
use crate::math::{Moments, min_max};

/// Header block: input source, sample summary and significance.
pub fn format_run_summary(source: &str, sample: &Sample, config: &TesterConfig) -> String {
    let mut out = String::new();

    out.push_str("=== gof - Distribution Conformance Test ===\n");
    out.push_str(&format!("Source: {source}\n"));

    let (lo, hi) = min_max(sample.values()).unwrap_or((f64::NAN, f64::NAN));
    out.push_str(&format!(
        "Sample: n={} | range=[{lo:.4}, {hi:.4}]\n",
        sample.len()
    ));
    if let Some(m) = Moments::of(sample.values()) {
        out.push_str(&format!(
            "Moments: mean={:.4} sd={:.4} skew={:.3} kurt={:.3}\n",
            m.mean,
            m.sample_variance().sqrt(),
            m.skewness(),
            m.kurtosis()
        ));
    }
    out.push_str(&format!(
        "Significance: {} (is_dist = p_value > {})\n",
        config.significance, config.significance
    ));

    out
}

/// One row per requested family, in request order.
pub fn format_results(evaluations: &[FamilyEvaluation]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:<6} {:>8} {:>12} {:>12}  {}\n",
            "family", "test", "is_dist", "statistic", "p_value", "parameters"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<12} {:-<6} {:-<8} {:-<12} {:-<12}  {:-<10}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for eval in evaluations {
        let name = truncate(&eval.dist_type, 12);
        let line = match &eval.result {
            Ok(v) => format!(
                "{name:<12} {:<6} {:>8} {:>12.6} {:>12.6}  {}",
                v.method.display_name(),
                if v.outcome.is_dist { "yes" } else { "no" },
                v.outcome.statistic,
                v.outcome.p_value,
                v.params.summary(),
            ),
            Err(e) => format!("{name:<12} {:<6} {:>8}  {e}", "-", "error"),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let accepted: Vec<&str> = evaluations
        .iter()
        .filter(|e| e.result.as_ref().is_ok_and(|v| v.outcome.is_dist))
        .map(|e| e.dist_type.as_str())
        .collect();
    out.push('\n');
    if accepted.is_empty() {
        out.push_str("Not rejected: none\n");
    } else {
        out.push_str(&format!("Not rejected: {}\n", accepted.join(", ")));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tester::Tester;

    #[test]
    fn results_table_lists_every_family_in_order() {
        let xs = [1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
        let evals = Tester::default()
            .evaluate_detailed(&xs, &["bernoulli", "not_a_family"])
            .unwrap();
        let text = format_results(&evals);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("family"));
        assert!(lines[2].starts_with("bernoulli"));
        assert!(lines[2].contains("yes"));
        assert!(lines[2].contains("p=0.6250"));
        assert!(lines[3].starts_with("not_a_family"));
        assert!(lines[3].contains("UnsupportedFamily"));
        assert!(text.ends_with("Not rejected: bernoulli\n"));
    }

    #[test]
    fn summary_mentions_size_and_significance() {
        let sample = Sample::new(vec![1.0, 2.0, 4.0]).unwrap();
        let text = format_run_summary("inline", &sample, &TesterConfig::default());
        assert!(text.contains("n=3"));
        assert!(text.contains("range=[1.0000, 4.0000]"));
        assert!(text.contains("Significance: 0.05"));
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdefgh", 5), "abcd.");
    }
}
