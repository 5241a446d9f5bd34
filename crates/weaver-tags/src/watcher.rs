//! Mutation batches to content-processor runs.
//!
//! The host reports DOM changes as [`Mutation`] records (the browser crate
//! translates `MutationRecord`s, tests build them by hand). Each batch is
//! resolved to the set of target elements it touched, and every candidate is
//! processed once, in first-seen order.
//!
//! Rewriting a candidate itself triggers further mutations. Those come back
//! as a new batch, find only processed markup, and settle as no-ops.

use crate::content::{ContentProcessor, ScanOutcome};
use crate::host::ContentHost;
use crate::host::Selector;

/// One observed change.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<N> {
    /// Nodes were inserted under `target`.
    ChildList { target: N, added: Vec<N> },
    /// A text node's data changed.
    CharacterData { target: N },
}

/// Summary of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    /// Distinct target elements resolved from the batch.
    pub candidates: usize,
    /// Candidates whose children were replaced.
    pub converted: usize,
    /// Spans converted across all candidates.
    pub conversions: usize,
    /// Candidates whose rewrite failed; logged and skipped.
    pub failed: usize,
}

/// Resolves mutation batches to target elements and processes them.
#[derive(Debug)]
pub struct MutationWatcher {
    processor: ContentProcessor,
    targets: Selector,
}

impl MutationWatcher {
    pub fn new(processor: ContentProcessor, targets: Selector) -> Self {
        Self {
            processor,
            targets,
        }
    }

    pub fn targets(&self) -> &Selector {
        &self.targets
    }

    pub fn processor(&self) -> &ContentProcessor {
        &self.processor
    }

    /// Process every target element already under `root`.
    pub fn process_existing<H: ContentHost>(&mut self, host: &mut H, root: &H::Node) -> BatchReport {
        let mut candidates = Vec::new();
        if host.is_element(root) && host.matches(root, &self.targets) {
            candidates.push(root.clone());
        }
        candidates.extend(host.query_all(root, &self.targets));
        self.run(host, candidates)
    }

    /// Process the elements touched by one batch of mutations.
    ///
    /// Runs to completion before returning. Mutations caused by the rewrite
    /// arrive as a later batch and resolve to nothing.
    pub fn handle_batch<H: ContentHost>(
        &mut self,
        host: &mut H,
        mutations: &[Mutation<H::Node>],
    ) -> BatchReport {
        let candidates = self.resolve(host, mutations);
        self.run(host, candidates)
    }

    /// Distinct target elements touched by `mutations`, in first-seen order.
    pub fn resolve<H: ContentHost>(&self, host: &H, mutations: &[Mutation<H::Node>]) -> Vec<H::Node> {
        let mut found: Vec<H::Node> = Vec::new();
        let mut push = |node: H::Node| {
            if !found.contains(&node) {
                found.push(node);
            }
        };

        for mutation in mutations {
            match mutation {
                Mutation::ChildList { target, added } => {
                    for node in added {
                        if host.is_element(node) {
                            if host.is_processed(node) {
                                continue;
                            }
                            if let Some(element) = host.closest(node, &self.targets) {
                                push(element);
                            }
                            for element in host.query_all(node, &self.targets) {
                                push(element);
                            }
                        } else if host.text_data(node).is_some() {
                            if let Some(element) = host.closest(node, &self.targets) {
                                push(element);
                            }
                        }
                    }
                    // removals and comment inserts still touch the target
                    if added.is_empty() {
                        if let Some(element) = host.closest(target, &self.targets) {
                            push(element);
                        }
                    }
                }
                Mutation::CharacterData { target } => {
                    if let Some(element) = host.closest(target, &self.targets) {
                        push(element);
                    }
                }
            }
        }

        found
    }

    fn run<H: ContentHost>(&mut self, host: &mut H, candidates: Vec<H::Node>) -> BatchReport {
        let mut report = BatchReport {
            candidates: candidates.len(),
            ..BatchReport::default()
        };
        if candidates.is_empty() {
            return report;
        }

        for element in &candidates {
            match self.processor.process(host, element) {
                Ok(ScanOutcome::Converted { conversions }) => {
                    report.converted += 1;
                    report.conversions += conversions;
                }
                Ok(ScanOutcome::Unchanged) => {}
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(%error, "failed to rewrite tags in element");
                }
            }
        }

        if report.converted > 0 {
            tracing::debug!(
                candidates = report.candidates,
                converted = report.converted,
                conversions = report.conversions,
                "processed mutation batch"
            );
        }
        report
    }
}
