use std::fmt;
use std::sync::Arc;

use crate::core::error::DiscoveryError;
use crate::core::input::InputSpec;
use crate::core::processor::Processor;

/// A source of processors, enumerated once at discovery time.
pub trait ProcessorProvider {
    /// A short name used in logs.
    fn name(&self) -> &str;

    fn processors(&self) -> Result<Vec<Arc<dyn Processor>>, DiscoveryError>;
}

/// A provider backed by a closure.
pub struct FnProvider<F> {
    name: String,
    enumerate: F,
}

impl<F> FnProvider<F> {
    pub fn new(name: impl Into<String>, enumerate: F) -> Self
    where
        F: Fn() -> Result<Vec<Arc<dyn Processor>>, DiscoveryError>,
    {
        Self {
            name: name.into(),
            enumerate,
        }
    }
}

impl<F> ProcessorProvider for FnProvider<F>
where
    F: Fn() -> Result<Vec<Arc<dyn Processor>>, DiscoveryError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn processors(&self) -> Result<Vec<Arc<dyn Processor>>, DiscoveryError> {
        (self.enumerate)()
    }
}

/// Index of every available processor, in registration order.
///
/// Built once, then shared read-only (usually behind an `Arc`).
#[derive(Default, Clone)]
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn Processor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from every provider that enumerates successfully.
    ///
    /// A provider that fails is logged and skipped.
    pub fn discover(providers: &[&dyn ProcessorProvider]) -> Self {
        let mut registry = Self::new();
        for provider in providers {
            match provider.processors() {
                Ok(found) => {
                    log::debug!(
                        "Provider '{}' offered {} processor(s)",
                        provider.name(),
                        found.len()
                    );
                    for processor in found {
                        registry.register(processor);
                    }
                }
                Err(e) => log::warn!("Skipping provider '{}': {}", provider.name(), e),
            }
        }
        registry
    }

    /// Adds a processor. If its label is already taken (ignoring case),
    /// the earlier registration keeps winning lookups and a warning is logged.
    pub fn register(&mut self, processor: Arc<dyn Processor>) {
        if self.find(processor.label()).is_some() {
            log::warn!(
                "Processor label '{}' is already registered; the earlier registration wins.",
                processor.label()
            );
        }
        self.processors.push(processor);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, processor: impl Processor) -> Self {
        self.register(Arc::new(processor));
        self
    }

    /// Every registered label, in registration order (duplicates included).
    pub fn labels(&self) -> Vec<String> {
        self.processors
            .iter()
            .map(|p| p.label().to_string())
            .collect()
    }

    /// Finds a processor by case-insensitive exact label. First registration wins.
    pub fn find(&self, label: &str) -> Option<&Arc<dyn Processor>> {
        self.processors
            .iter()
            .find(|p| labels_match(p.label(), label))
    }

    /// The input schema of the processor with this label.
    pub fn inputs_of(&self, label: &str) -> Option<Vec<InputSpec>> {
        self.find(label).map(|p| p.inputs())
    }

    /// Labels registered more than once, ignoring case, reported by their first spelling.
    pub fn shadowed_labels(&self) -> Vec<String> {
        let mut shadowed: Vec<String> = Vec::new();
        for (i, p) in self.processors.iter().enumerate() {
            let first = self.processors[..i]
                .iter()
                .find(|earlier| labels_match(earlier.label(), p.label()));
            if let Some(first) = first {
                if !shadowed.iter().any(|s| labels_match(s, first.label())) {
                    shadowed.push(first.label().to_string());
                }
            }
        }
        shadowed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Processor>> {
        self.processors.iter()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("labels", &self.labels())
            .finish()
    }
}

fn labels_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
