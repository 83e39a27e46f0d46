//! Branched-type filtering

use std::collections::BTreeSet;

use crate::event::{BranchEvent, ChangeSet};
use crate::rewrite::{EventRewriter, EventSink, RewriteError, RewriteResult};
use crate::schema::TypeRegistry;
use crate::visit::{rewrite_visiting, EventVisitor, Outcome};

/// Restricts the types copied by new branches to an allow-list and adds a
/// fixed set of types to every branch.
#[derive(Debug, Clone)]
pub struct BranchTypeFilter {
    allowed: BTreeSet<String>,
    always_include: BTreeSet<String>,
}

impl BranchTypeFilter {
    pub fn new(allowed: BTreeSet<String>, always_include: BTreeSet<String>) -> Self {
        Self {
            allowed,
            always_include,
        }
    }

    /// Like [`BranchTypeFilter::new`], rejecting types the registry does not know.
    pub fn checked(
        allowed: BTreeSet<String>,
        always_include: BTreeSet<String>,
        registry: &dyn TypeRegistry,
    ) -> RewriteResult<Self> {
        if let Some(unknown) = allowed
            .iter()
            .chain(always_include.iter())
            .find(|name| !registry.contains_type(name))
        {
            return Err(RewriteError::configuration(format!("cannot branch unknown type '{}'", unknown)));
        }
        Ok(Self::new(allowed, always_include))
    }

    /// `(types ∩ allowed) ∪ always_include`
    pub fn filter(&self, types: &BTreeSet<String>) -> BTreeSet<String> {
        types
            .intersection(&self.allowed)
            .chain(self.always_include.iter())
            .cloned()
            .collect()
    }
}

impl EventVisitor for BranchTypeFilter {
    fn visit_branch(&mut self, event: &mut BranchEvent) -> RewriteResult<Outcome> {
        event.branched_type_names = self.filter(&event.branched_type_names);
        Ok(Outcome::Apply)
    }
}

impl EventRewriter for BranchTypeFilter {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        rewrite_visiting(self, change_set, sink)
    }
}
