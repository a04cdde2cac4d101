//! Semantic action handlers.
//!
//! A semantic action is an extension hook: an IRI naming the extension plus some code. The
//! engine does not interpret the code. It hands it, with the triples matched by the annotated
//! expression, to the handler registered for the IRI. Actions with no registered handler
//! succeed.

use crate::error::ShexValidationError;
use crate::model::SemAct;
use oxrdf::{NamedNode, Triple};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// An extension invoked by semantic actions.
pub trait SemanticActionHandler: Send + Sync {
    /// Runs the action. Returning `Ok(false)` rejects the current match.
    fn invoke(&self, code: Option<&str>, triples: &[Triple]) -> Result<bool, SemanticActionError>;
}

impl<F> SemanticActionHandler for F
where
    F: Fn(Option<&str>, &[Triple]) -> Result<bool, SemanticActionError> + Send + Sync,
{
    fn invoke(&self, code: Option<&str>, triples: &[Triple]) -> Result<bool, SemanticActionError> {
        self(code, triples)
    }
}

/// A semantic action handler failure. It aborts the validation run.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SemanticActionError {
    message: String,
}

impl SemanticActionError {
    /// Creates a new error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Table of semantic action handlers, keyed by extension IRI.
#[derive(Clone, Default)]
pub struct SemanticActions {
    handlers: FxHashMap<NamedNode, Arc<dyn SemanticActionHandler>>,
}

impl SemanticActions {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler of an extension, replacing any previous one.
    pub fn register(
        &mut self,
        name: NamedNode,
        handler: impl SemanticActionHandler + 'static,
    ) -> &mut Self {
        self.handlers.insert(name, Arc::new(handler));
        self
    }

    /// Returns true if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the given actions in order, stopping at the first rejection.
    pub(crate) fn run(
        &self,
        acts: &[SemAct],
        triples: &[Triple],
    ) -> Result<bool, ShexValidationError> {
        for act in acts {
            let Some(handler) = self.handlers.get(&act.name) else {
                continue;
            };
            let accepted = handler
                .invoke(act.code.as_deref(), triples)
                .map_err(|e| ShexValidationError::semantic_action(act.name.clone(), e.to_string()))?;
            trace!(action = %act.name, accepted, "semantic action");
            if !accepted {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Debug for SemanticActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
