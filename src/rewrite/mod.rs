//! Rewriter protocol and composition
//!
//! Every transformation implements [`EventRewriter`]: one change-set in,
//! any number of change-sets out through an [`EventSink`]. Rewriters compose
//! by stacking ([`stack`]), filtering ([`FilterRewriter`]), forking
//! ([`ForkRewriter`]) and declarative construction ([`RewriterSpec`]).

mod errors;
mod factory;
mod filter;
mod rewriter;
mod sink;
mod stack;

pub use errors::{RewriteError, RewriteResult};
pub use factory::{build_chain, build_rewriter, BuildContext, ProxyRewriter, RewriterSpec};
pub use filter::{ChangeSetPredicate, FilterRewriter};
pub use rewriter::{CopyRewriter, EventRewriter, FnRewriter, ForkRewriter, IdentityRewriter};
pub use sink::{EventSink, FnSink, NullSink};
pub use stack::{stack, StackedRewriter};
