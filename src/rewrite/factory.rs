//! Declarative rewriter construction
//!
//! A pipeline is configured as an ordered list of [`RewriterSpec`]s. Each
//! entry is turned into its rewriter once, before any event is processed, so
//! every configuration error surfaces up front.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::branch::{BranchModificator, BranchTypeFilter};
use crate::event::{ChangeSet, Revision, FIRST_REVISION};
use crate::rename::{AttributeRenamer, TypeFilter, TypeRenamer};
use crate::revision::{Mode, RevisionAttributes, RevisionModificator};
use crate::schema::TypeRegistry;

use super::errors::{RewriteError, RewriteResult};
use super::filter::{ChangeSetPredicate, FilterRewriter};
use super::rewriter::{CopyRewriter, EventRewriter, ForkRewriter, IdentityRewriter};
use super::sink::EventSink;
use super::stack::stack;

fn default_mode() -> Mode {
    Mode::Replay
}

/// One configured pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RewriterSpec {
    Identity,
    Copy,
    RenameType {
        renames: BTreeMap<String, String>,
    },
    RenameAttribute {
        type_name: String,
        renames: BTreeMap<String, String>,
    },
    ExcludeTypes {
        types: BTreeSet<String>,
    },
    RevisionModification {
        #[serde(default = "default_mode")]
        mode: Mode,
        /// First output revision; defaults to the pipeline's.
        #[serde(default)]
        start_revision: Option<Revision>,
        #[serde(default)]
        revision_attributes: BTreeMap<String, BTreeSet<String>>,
    },
    BranchRemap {
        delta: i64,
    },
    BranchTypes {
        allowed: BTreeSet<String>,
        #[serde(default)]
        always_include: BTreeSet<String>,
    },
    Filter {
        predicate: ChangeSetPredicate,
        rewriter: Box<RewriterSpec>,
    },
    Stack {
        rewriters: Vec<RewriterSpec>,
    },
    Fork {
        rewriter: Box<RewriterSpec>,
    },
}

impl RewriterSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            RewriterSpec::Identity => "identity",
            RewriterSpec::Copy => "copy",
            RewriterSpec::RenameType { .. } => "rename-type",
            RewriterSpec::RenameAttribute { .. } => "rename-attribute",
            RewriterSpec::ExcludeTypes { .. } => "exclude-types",
            RewriterSpec::RevisionModification { .. } => "revision-modification",
            RewriterSpec::BranchRemap { .. } => "branch-remap",
            RewriterSpec::BranchTypes { .. } => "branch-types",
            RewriterSpec::Filter { .. } => "filter",
            RewriterSpec::Stack { .. } => "stack",
            RewriterSpec::Fork { .. } => "fork",
        }
    }
}

/// What rewriters may know about their surroundings when built.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    /// Schema of the source store. Without it type names are not validated
    /// and attribute renames do not reach subtypes.
    pub registry: Option<&'a dyn TypeRegistry>,
    /// Revision the first written change-set must carry.
    pub first_output_revision: Revision,
    /// Revision of the first change-set read from the source.
    pub first_input_revision: Revision,
}

impl<'a> BuildContext<'a> {
    pub fn new(registry: Option<&'a dyn TypeRegistry>) -> Self {
        Self {
            registry,
            first_output_revision: FIRST_REVISION,
            first_input_revision: FIRST_REVISION,
        }
    }

    pub fn with_revisions(mut self, first_input_revision: Revision, first_output_revision: Revision) -> Self {
        self.first_input_revision = first_input_revision;
        self.first_output_revision = first_output_revision;
        self
    }
}

/// A rewriter built from configuration, delegating to the concrete stage.
pub struct ProxyRewriter {
    kind: &'static str,
    inner: Box<dyn EventRewriter>,
}

impl ProxyRewriter {
    pub fn from_spec(spec: &RewriterSpec, ctx: &BuildContext<'_>) -> RewriteResult<Self> {
        let inner = build_rewriter(spec, ctx)?;
        debug!(kind = spec.kind(), "Rewriter built");
        Ok(Self {
            kind: spec.kind(),
            inner,
        })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl EventRewriter for ProxyRewriter {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        self.inner.rewrite(change_set, sink)
    }
}

/// Builds the rewriter a `RewriterSpec` describes.
pub fn build_rewriter(spec: &RewriterSpec, ctx: &BuildContext<'_>) -> RewriteResult<Box<dyn EventRewriter>> {
    let rewriter: Box<dyn EventRewriter> = match spec {
        RewriterSpec::Identity => Box::new(IdentityRewriter),
        RewriterSpec::Copy => Box::new(CopyRewriter),
        RewriterSpec::RenameType { renames } => match ctx.registry {
            Some(registry) => Box::new(TypeRenamer::checked(renames.clone(), registry)?),
            None => Box::new(TypeRenamer::new(renames.clone())),
        },
        RewriterSpec::RenameAttribute { type_name, renames } => match ctx.registry {
            Some(registry) => Box::new(AttributeRenamer::for_type_hierarchy(type_name, renames.clone(), registry)?),
            None => Box::new(AttributeRenamer::new(BTreeSet::from([type_name.clone()]), renames.clone())),
        },
        RewriterSpec::ExcludeTypes { types } => match ctx.registry {
            Some(registry) => Box::new(TypeFilter::checked(types.clone(), registry)?),
            None => Box::new(TypeFilter::new(types.clone())),
        },
        RewriterSpec::RevisionModification {
            mode,
            start_revision,
            revision_attributes,
        } => {
            let start = start_revision.unwrap_or(ctx.first_output_revision);
            if start < FIRST_REVISION {
                return Err(RewriteError::configuration(format!("invalid start revision {}", start)));
            }
            let attributes = match ctx.registry {
                Some(registry) => RevisionAttributes::with_registry(revision_attributes.clone(), registry)?,
                None => RevisionAttributes::from_config(revision_attributes.clone()),
            };
            let mut engine = RevisionModificator::new(attributes, start);
            engine.adopt(ctx.first_input_revision);
            engine.set_mode(*mode);
            Box::new(engine)
        }
        RewriterSpec::BranchRemap { delta } => Box::new(BranchModificator::new(*delta)),
        RewriterSpec::BranchTypes {
            allowed,
            always_include,
        } => match ctx.registry {
            Some(registry) => Box::new(BranchTypeFilter::checked(allowed.clone(), always_include.clone(), registry)?),
            None => Box::new(BranchTypeFilter::new(allowed.clone(), always_include.clone())),
        },
        RewriterSpec::Filter { predicate, rewriter } => {
            let predicate = predicate.clone();
            let inner = build_rewriter(rewriter, ctx)?;
            Box::new(FilterRewriter::new(move |cs: &ChangeSet| predicate.matches(cs), inner))
        }
        RewriterSpec::Stack { rewriters } => build_chain(rewriters, ctx)?,
        RewriterSpec::Fork { rewriter } => Box::new(ForkRewriter::new(build_rewriter(rewriter, ctx)?)),
    };
    Ok(rewriter)
}

/// Builds and stacks an ordered list of specs.
pub fn build_chain(specs: &[RewriterSpec], ctx: &BuildContext<'_>) -> RewriteResult<Box<dyn EventRewriter>> {
    let mut stages: Vec<Box<dyn EventRewriter>> = Vec::with_capacity(specs.len());
    for spec in specs {
        stages.push(Box::new(ProxyRewriter::from_spec(spec, ctx)?));
    }
    Ok(stack(stages))
}
