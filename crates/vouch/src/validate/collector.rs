//! Error collection and the failure policy.

use std::sync::Arc;

use ahash::AHashSet;
use vouch_schema::{Diagnostics, Policy};
use vouch_value::ValuePath;

use crate::error::{Failure, Rejection, ValidationError};

/// A failure travelling up the frames of one validation.
#[derive(Debug)]
pub(crate) struct Raised {
    pub failure: Arc<Failure>,
    /// Path of the frame that raised it
    pub origin: ValuePath,
    /// Set once some frame decided the failure must abort the operation.
    pub propagate: bool,
    /// Diagnostics attached by the first frame that decided to abort.
    pub rejection: Option<Rejection>,
}

impl Raised {
    pub fn new(failure: Failure, origin: ValuePath) -> Self {
        let propagate = failure.is_fatal();
        Self {
            failure: Arc::new(failure),
            origin,
            propagate,
            rejection: None,
        }
    }

    /// Mark as must-propagate, attaching diagnostics the first time.
    pub fn flag(&mut self, path: &ValuePath, properties: Option<Diagnostics>) {
        self.propagate = true;
        if self.rejection.is_none() {
            self.rejection = Some(Rejection::new(
                path.clone(),
                self.failure.clone(),
                properties,
            ));
        }
    }

    pub fn into_rejection(self) -> Rejection {
        match self.rejection {
            Some(rejection) => rejection,
            None => Rejection::new(self.origin, self.failure, None),
        }
    }
}

/// What a frame does with a failure it caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Hand the failure to the parent frame untouched.
    Reraise,
    /// Flag the failure and hand it to the parent frame.
    Propagate,
    /// Substitute null and continue.
    Recover,
}

/// Decide the fate of a failure caught by a frame.
///
/// A failure already flagged, or caught under [`Policy::Throw`], propagates
/// and aborts the operation. At a Required position null is not a valid
/// substitute, so the failure goes up unflagged and the nearest nullable
/// ancestor with [`Policy::Resolver`] recovers it. With no policy the failure
/// also goes up unchanged.
pub(crate) fn decide(policy: Option<Policy>, propagate: bool, required: bool) -> Decision {
    match policy {
        _ if propagate => Decision::Propagate,
        None => Decision::Reraise,
        Some(Policy::Throw) => Decision::Propagate,
        Some(Policy::Resolver) if required => Decision::Reraise,
        Some(Policy::Resolver) => Decision::Recover,
    }
}

/// Ordered failures of one validation, deduplicated by failure identity.
#[derive(Debug, Default)]
pub(crate) struct ErrorCollector {
    errors: Vec<ValidationError>,
    seen: AHashSet<usize>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `failure` at `path` unless this very failure was recorded
    /// before. Returns whether it was newly recorded.
    pub fn register(&mut self, failure: &Arc<Failure>, path: &ValuePath) -> bool {
        // The recorded clone keeps the allocation alive, so the address
        // cannot be reused while it is in `seen`.
        let key = Arc::as_ptr(failure) as usize;
        if !self.seen.insert(key) {
            return false;
        }
        self.errors
            .push(ValidationError::new(path.clone(), failure.clone()));
        true
    }

    pub fn finish(self) -> Vec<ValidationError> {
        self.errors
    }
}
