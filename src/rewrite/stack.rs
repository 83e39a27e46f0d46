//! Sequential composition of rewriters
//!
//! Stacking `[R1, .., Rn]` in front of a sink `S` builds the sink chain
//! right to left: whatever `R1` writes is fed to `R2` immediately, and so on,
//! until the output of `Rn` reaches `S`. Data flows left to right, one
//! change-set at a time.

use crate::event::ChangeSet;

use super::errors::RewriteResult;
use super::rewriter::{EventRewriter, IdentityRewriter};
use super::sink::EventSink;

/// Rewriters applied in sequence.
pub struct StackedRewriter {
    stages: Vec<Box<dyn EventRewriter>>,
}

impl StackedRewriter {
    pub fn new(stages: Vec<Box<dyn EventRewriter>>) -> Self {
        Self { stages }
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl EventRewriter for StackedRewriter {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        let mut head = StageSink {
            stages: self.stages.as_mut_slice(),
            out: sink,
        };
        head.write(change_set)
    }
}

/// The remaining stages of a stack, terminated by the caller's sink.
struct StageSink<'s, 'o> {
    stages: &'s mut [Box<dyn EventRewriter>],
    out: &'s mut (dyn EventSink + 'o),
}

impl EventSink for StageSink<'_, '_> {
    fn write(&mut self, change_set: ChangeSet) -> RewriteResult<()> {
        match self.stages.split_first_mut() {
            Some((first, rest)) => {
                let mut next = StageSink {
                    stages: rest,
                    out: &mut *self.out,
                };
                first.rewrite(change_set, &mut next)
            }
            None => self.out.write(change_set),
        }
    }
}

/// Stacks rewriters into one.
///
/// No rewriters yield the identity; a single rewriter is returned as is.
pub fn stack(mut rewriters: Vec<Box<dyn EventRewriter>>) -> Box<dyn EventRewriter> {
    if rewriters.len() > 1 {
        return Box::new(StackedRewriter::new(rewriters));
    }
    match rewriters.pop() {
        Some(single) => single,
        None => Box::new(IdentityRewriter),
    }
}
