//! Resolving who, if anyone, is making a request.

use crate::models::CallerId;

/// Resolves the calling identity once per request.
///
/// `None` means an anonymous caller: the calculation still runs but nothing is
/// written to the ledger.
pub trait IdentityProvider: Send + Sync {
    fn resolve_caller_id(&self) -> Option<CallerId>;
}

/// Always anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn resolve_caller_id(&self) -> Option<CallerId> {
        None
    }
}

/// A fixed identity, e.g. taken from a command-line flag.
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub Option<CallerId>);

impl IdentityProvider for FixedIdentity {
    fn resolve_caller_id(&self) -> Option<CallerId> {
        self.0.clone()
    }
}
