//! Conversion of raw request strings into typed processor inputs.
//!
//! Every position is evaluated, so a report lists all failing fields rather
//! than stopping at the first one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::input::{ConvertedInput, ConvertedInputs, InputSpec, NodeId};
use crate::core::kind::InputKind;

/// Why a single raw value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueReason {
    /// A token that should have been a node id did not parse as one.
    NotAnInteger(String),
    /// A `Nodes` value contained no node ids at all.
    EmptyNodeSet,
    /// The schema declares this position but no raw value was supplied.
    Missing,
    /// A raw value was supplied past the end of the schema.
    Unexpected,
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueReason::NotAnInteger(token) => write!(f, "'{}' is not a valid node id", token),
            IssueReason::EmptyNodeSet => f.write_str("at least one node is required"),
            IssueReason::Missing => f.write_str("no value was supplied"),
            IssueReason::Unexpected => f.write_str("no input is declared at this position"),
        }
    }
}

/// A validation failure tied to one input position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldIssue {
    pub position: usize,
    /// The schema label, absent for values past the end of the schema.
    pub label: Option<String>,
    pub reason: IssueReason,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} (input {}): {}", label, self.position + 1, self.reason),
            None => write!(f, "Input {}: {}", self.position + 1, self.reason),
        }
    }
}

/// The outcome of a failed conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<FieldIssue>,
    /// What could be converted, aligned with the schema. `None` where nothing usable was parsed.
    pub partial: Vec<Option<ConvertedInput>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, position: usize, label: Option<&str>, reason: IssueReason) {
        self.issues.push(FieldIssue {
            position,
            label: label.map(str::to_string),
            reason,
        });
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues reported against the given position.
    pub fn issues_at(&self, position: usize) -> impl Iterator<Item = &FieldIssue> {
        self.issues.iter().filter(move |i| i.position == position)
    }
}

/// Parses a single node id. Surrounding whitespace and a leading sign are accepted.
pub fn parse_node(raw: &str) -> Result<NodeId, IssueReason> {
    raw.trim()
        .parse::<NodeId>()
        .map_err(|_| IssueReason::NotAnInteger(raw.to_string()))
}

/// Parses a comma and/or whitespace separated list of node ids.
///
/// Returns the ids that parsed alongside every issue found; an empty id list
/// is its own issue.
pub fn parse_node_set(raw: &str) -> (Vec<NodeId>, Vec<IssueReason>) {
    let mut ids = Vec::new();
    let mut issues = Vec::new();

    for token in raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match token.parse::<NodeId>() {
            Ok(id) => ids.push(id),
            Err(_) => issues.push(IssueReason::NotAnInteger(token.to_string())),
        }
    }

    if ids.is_empty() {
        issues.push(IssueReason::EmptyNodeSet);
    }
    (ids, issues)
}

/// Converts `raw` against `specs`, position by position.
///
/// Succeeds only when every position converts and `raw.len() == specs.len()`.
pub fn convert<S: AsRef<str>>(
    specs: &[InputSpec],
    raw: &[S],
) -> Result<ConvertedInputs, ValidationReport> {
    let mut report = ValidationReport::new();

    for (position, spec) in specs.iter().enumerate() {
        let label = Some(spec.label.as_str());
        let Some(value) = raw.get(position).map(|v| v.as_ref()) else {
            report.add_issue(position, label, IssueReason::Missing);
            report.partial.push(None);
            continue;
        };

        let converted = match spec.kind {
            InputKind::Node => match parse_node(value) {
                Ok(id) => Some(ConvertedInput::Node(id)),
                Err(reason) => {
                    report.add_issue(position, label, reason);
                    None
                }
            },
            InputKind::NodeSet => {
                let (ids, issues) = parse_node_set(value);
                for reason in issues {
                    report.add_issue(position, label, reason);
                }
                Some(ConvertedInput::NodeSet(ids))
            }
            InputKind::Text => Some(ConvertedInput::Text(value.to_string())),
        };
        report.partial.push(converted);
    }

    for position in specs.len()..raw.len() {
        report.add_issue(position, None, IssueReason::Unexpected);
    }

    if report.is_valid() {
        let values = report.partial.into_iter().flatten().collect::<Vec<_>>();
        debug_assert_eq!(values.len(), specs.len());
        Ok(ConvertedInputs::new(values))
    } else {
        Err(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_node_set_splits_on_commas_and_spaces() {
        let out = convert(&[InputSpec::node_set("Nodes")], &["5, 7,9"]).unwrap();
        assert_eq!(out.into_inner(), vec![ConvertedInput::NodeSet(vec![5, 7, 9])]);
    }

    #[test]
    fn test_empty_node_set_fails() {
        let report = convert(&[InputSpec::node_set("Nodes")], &[""]).unwrap_err();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].reason, IssueReason::EmptyNodeSet);
        assert_eq!(report.partial, vec![Some(ConvertedInput::NodeSet(vec![]))]);
    }

    #[test]
    fn test_node_set_with_bad_token_keeps_good_ids_in_partial() {
        let report = convert(&[InputSpec::node_set("Nodes")], &["1 x 3"]).unwrap_err();
        assert_eq!(
            report.issues[0].reason,
            IssueReason::NotAnInteger("x".to_string())
        );
        assert_eq!(report.partial, vec![Some(ConvertedInput::NodeSet(vec![1, 3]))]);
    }

    #[test]
    fn test_unparseable_node_set_reports_both_issues() {
        let (ids, issues) = parse_node_set("abc");
        assert!(ids.is_empty());
        assert_eq!(
            issues,
            vec![
                IssueReason::NotAnInteger("abc".to_string()),
                IssueReason::EmptyNodeSet
            ]
        );
    }

    #[test]
    fn test_node_rejects_non_integer() {
        let report = convert(&[InputSpec::node("Dest")], &["abc"]).unwrap_err();
        assert_eq!(report.issues[0].label.as_deref(), Some("Dest"));
        assert_eq!(report.partial, vec![None]);
    }

    #[test]
    fn test_node_accepts_sign_and_padding() {
        assert_eq!(parse_node(" -1 "), Ok(-1));
        assert_eq!(parse_node("+42"), Ok(42));
        assert!(parse_node("").is_err());
        assert!(parse_node("99999999999").is_err());
    }

    #[test]
    fn test_text_accepts_empty() {
        let out = convert(&[InputSpec::text("Name")], &[""]).unwrap();
        assert_eq!(out.into_inner(), vec![ConvertedInput::Text(String::new())]);
    }

    #[test]
    fn test_every_position_is_evaluated() {
        let specs = [
            InputSpec::node("A"),
            InputSpec::node_set("B"),
            InputSpec::text("C"),
        ];
        let report = convert(&specs, &["x", "", "ok"]).unwrap_err();
        let positions: Vec<usize> = report.issues.iter().map(|i| i.position).collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(report.partial.len(), 3);
        assert_eq!(report.partial[2], Some(ConvertedInput::Text("ok".into())));
    }

    #[test]
    fn test_too_few_values_is_a_failure() {
        let specs = [InputSpec::node_set("Sources"), InputSpec::node("Destination")];
        let report = convert(&specs, &["1"]).unwrap_err();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].position, 1);
        assert_eq!(report.issues[0].reason, IssueReason::Missing);
        assert_eq!(
            report.issues[0].to_string(),
            "Destination (input 2): no value was supplied"
        );
    }

    #[test]
    fn test_too_many_values_is_a_failure() {
        let report = convert(&[InputSpec::text("Only")], &["a", "b"]).unwrap_err();
        assert_eq!(report.issues_at(1).count(), 1);
        assert_eq!(report.issues[0].label, None);
        assert_eq!(report.issues[0].reason, IssueReason::Unexpected);
    }

    #[test]
    fn test_empty_schema_with_no_values_succeeds() {
        let raw: [&str; 0] = [];
        assert!(convert(&[], &raw).unwrap().is_empty());
    }
}
