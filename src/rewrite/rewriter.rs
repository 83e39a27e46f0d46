//! The rewriter contract and its trivial implementations
//!
//! A rewriter consumes one change-set and writes zero, one or many
//! change-sets to a sink. Writing nothing suppresses the input.

use crate::event::ChangeSet;

use super::errors::RewriteResult;
use super::sink::EventSink;

/// A single-input, multi-output transformation over change-sets.
pub trait EventRewriter {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()>;
}

/// Passes every change-set through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityRewriter;

impl EventRewriter for IdentityRewriter {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        sink.write(change_set)
    }
}

/// Writes every change-set twice: a deep copy, then the input itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyRewriter;

impl EventRewriter for CopyRewriter {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        sink.write(change_set.copy())?;
        sink.write(change_set)
    }
}

/// Forks the stream: writes an unmodified copy of the input, then whatever
/// the inner rewriter produces from the original.
pub struct ForkRewriter {
    inner: Box<dyn EventRewriter>,
}

impl ForkRewriter {
    pub fn new(inner: Box<dyn EventRewriter>) -> Self {
        Self { inner }
    }
}

impl EventRewriter for ForkRewriter {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        sink.write(change_set.copy())?;
        self.inner.rewrite(change_set, sink)
    }
}

/// Rewriter adapter for a closure.
pub struct FnRewriter<F>(pub F);

impl<F> EventRewriter for FnRewriter<F>
where
    F: FnMut(ChangeSet, &mut dyn EventSink) -> RewriteResult<()>,
{
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        (self.0)(change_set, sink)
    }
}
