//! Receivers of rewritten change-sets

use crate::event::ChangeSet;

use super::errors::RewriteResult;

/// Accepts the output of a rewriter.
pub trait EventSink {
    /// Receives one change-set. May be called any number of times per input.
    fn write(&mut self, change_set: ChangeSet) -> RewriteResult<()>;
}

/// Collects everything written, in order.
impl EventSink for Vec<ChangeSet> {
    fn write(&mut self, change_set: ChangeSet) -> RewriteResult<()> {
        self.push(change_set);
        Ok(())
    }
}

/// Sink adapter for a closure.
pub struct FnSink<F>(pub F);

impl<F> EventSink for FnSink<F>
where
    F: FnMut(ChangeSet) -> RewriteResult<()>,
{
    fn write(&mut self, change_set: ChangeSet) -> RewriteResult<()> {
        (self.0)(change_set)
    }
}

/// Discards its input.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn write(&mut self, _change_set: ChangeSet) -> RewriteResult<()> {
        Ok(())
    }
}
