use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::ContentService;
use crate::core::error::ProcessorError;
use crate::core::input::{ConvertedInputs, InputSpec};
use crate::core::markup::{escape_html, html_list};
use crate::core::processor::Processor;

pub const LABEL: &str = "Bulk Create Nodes";

/// Used when the delimiter input is left empty.
pub const DEFAULT_DELIMITER: &str = ",";

/// Creates one child node per name under a parent, skipping names already taken.
pub struct BulkCreateNodes {
    backend: Arc<dyn ContentService>,
}

impl BulkCreateNodes {
    pub fn new(backend: Arc<dyn ContentService>) -> Self {
        Self { backend }
    }
}

/// Splits `names` on the literal `delimiter`, trimming entries and dropping empty ones.
pub fn split_names<'a>(names: &'a str, delimiter: &str) -> Vec<&'a str> {
    let delimiter = if delimiter.is_empty() {
        DEFAULT_DELIMITER
    } else {
        delimiter
    };
    names
        .split(delimiter)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

/// The name the backend refused and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFailure {
    pub name: String,
    pub error: String,
}

/// Which requested names were created and which were skipped.
///
/// A backend fault stops the batch; the names after it land in `not_attempted`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Option<CreateFailure>,
    pub not_attempted: Vec<String>,
}

impl CreateOutcome {
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<h2>Done</h2>Created ({}):{}Skipped ({}):{}",
            self.created.len(),
            html_list(&self.created),
            self.skipped.len(),
            html_list(&self.skipped)
        );
        if let Some(failure) = &self.failed {
            html.push_str(&format!(
                "Failed at {}: {}<br />Not attempted ({}):{}",
                escape_html(&failure.name),
                escape_html(&failure.error),
                self.not_attempted.len(),
                html_list(&self.not_attempted)
            ));
        }
        html
    }
}

impl Processor for BulkCreateNodes {
    fn label(&self) -> &str {
        LABEL
    }

    fn inputs(&self) -> Vec<InputSpec> {
        vec![
            InputSpec::node("Select Parent Node"),
            InputSpec::text("Delimiter"),
            InputSpec::text("Names"),
            InputSpec::text("Document Type Alias"),
        ]
    }

    fn execute(&self, inputs: &ConvertedInputs) -> Result<String, ProcessorError> {
        let parent = inputs.node(0)?;
        let names = split_names(inputs.text(2)?, inputs.text(1)?);
        let doc_type_alias = inputs.text(3)?;

        // Classify everything before the first write.
        let mut taken: HashSet<String> = self
            .backend
            .children(parent)?
            .into_iter()
            .map(|child| child.name.to_lowercase())
            .collect();
        let mut outcome = CreateOutcome::default();
        let mut to_create = Vec::new();
        for name in names {
            if taken.insert(name.to_lowercase()) {
                to_create.push(name);
            } else {
                outcome.skipped.push(name.to_string());
            }
        }

        let mut pending = to_create.into_iter();
        for name in pending.by_ref() {
            let created = self
                .backend
                .create_content(name, parent, doc_type_alias)
                .and_then(|node| self.backend.save(&node));
            match created {
                Ok(()) => outcome.created.push(name.to_string()),
                Err(e) => {
                    log::warn!("Bulk create under {} stopped at '{}': {}", parent, name, e);
                    outcome.failed = Some(CreateFailure {
                        name: name.to_string(),
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }
        outcome.not_attempted = pending.map(str::to_string).collect();

        log::debug!(
            "Created {} and skipped {} node(s) under {}",
            outcome.created.len(),
            outcome.skipped.len(),
            parent
        );
        Ok(outcome.to_html())
    }
}
