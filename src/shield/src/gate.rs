//! Tower layers gating services on permission checks
//!
//! The gate consults the [`Shield`] before the wrapped service runs and
//! short-circuits with a structured [`ShieldError`] on denial. It knows
//! nothing about the wrapped service's business logic.
//!
//! # Example
//!
//! ```ignore
//! let svc = ServiceBuilder::new()
//!     .layer(RequirePermission::one(shield.clone(), "order:create"))
//!     .service(create_order);
//! ```

use futures::future::{ready, Either, Ready};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::debug;

use crate::engine::Shield;
use crate::error::{Requirement, ShieldError};
use crate::types::{Actor, Role};

/// Requests that carry an already-authenticated actor
pub trait ActorSource {
    /// The actor, or `None` if the request never passed authentication
    fn actor(&self) -> Option<&Actor>;
}

impl ActorSource for Actor {
    fn actor(&self) -> Option<&Actor> {
        Some(self)
    }
}

impl<T> ActorSource for (Actor, T) {
    fn actor(&self) -> Option<&Actor> {
        Some(&self.0)
    }
}

impl<T> ActorSource for (Option<Actor>, T) {
    fn actor(&self) -> Option<&Actor> {
        self.0.as_ref()
    }
}

/// Layer that requires a [`Requirement`] before calling the inner service
#[derive(Clone)]
pub struct RequirePermission {
    shield: Arc<Shield>,
    requirement: Arc<Requirement>,
}

impl RequirePermission {
    /// Gate on an arbitrary requirement
    pub fn new(shield: Arc<Shield>, requirement: Requirement) -> Self {
        Self {
            shield,
            requirement: Arc::new(requirement),
        }
    }

    /// Require a single permission
    pub fn one(shield: Arc<Shield>, permission: impl Into<String>) -> Self {
        Self::new(shield, Requirement::Permission(permission.into()))
    }

    /// Require at least one of the permissions
    pub fn any<I, S>(shield: Arc<Shield>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            shield,
            Requirement::Any(permissions.into_iter().map(Into::into).collect()),
        )
    }

    /// Require every one of the permissions
    pub fn all<I, S>(shield: Arc<Shield>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            shield,
            Requirement::All(permissions.into_iter().map(Into::into).collect()),
        )
    }

    /// Require one of the roles
    pub fn role(shield: Arc<Shield>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self::new(shield, Requirement::Role(roles.into_iter().collect()))
    }

    /// The gate's requirement
    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }
}

impl<S> Layer<S> for RequirePermission {
    type Service = RequirePermissionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequirePermissionService {
            inner,
            shield: Arc::clone(&self.shield),
            requirement: Arc::clone(&self.requirement),
        }
    }
}

/// Service wrapper for [`RequirePermission`]
#[derive(Clone)]
pub struct RequirePermissionService<S> {
    inner: S,
    shield: Arc<Shield>,
    requirement: Arc<Requirement>,
}

impl<S, R> Service<R> for RequirePermissionService<S>
where
    S: Service<R>,
    S::Error: From<ShieldError>,
    R: ActorSource,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Either<Ready<Result<S::Response, S::Error>>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: R) -> Self::Future {
        let decision = match req.actor() {
            Some(actor) => self.shield.require(actor, &self.requirement),
            None => {
                debug!("gate rejected unauthenticated request: requires {}", self.requirement);
                Err(ShieldError::Unauthenticated(Requirement::clone(&self.requirement)))
            }
        };

        match decision {
            Ok(()) => Either::Right(self.inner.call(req)),
            Err(e) => Either::Left(ready(Err(e.into()))),
        }
    }
}
