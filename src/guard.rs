//! Access guards.
//!
//! Each guard performs exactly one check on the current identity, then either
//! fails with [`UserRequired`] or delegates to the wrapped handler. Guards do
//! not log, do not touch the environment and never catch errors raised by the
//! handler they wrap.

use crate::environ::Environ;
use crate::error::{Error, UserRequired};
use crate::handler::Handler;
use crate::middleware::{Middleware, Phase};
use crate::response::{Body, StartResponse};

/// Requires the current identity to hold a role.
///
/// Fails with "insufficient permissions" when there is no identity, when the
/// identity has no role list, or when the role is not in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireRole {
    role: String,
}

impl RequireRole {
    /// Returns the required role.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Checks the environment without running any handler.
    pub fn check(&self, environ: &Environ) -> Result<(), UserRequired> {
        match environ.usersign() {
            Some(usersign) if usersign.has_role(&self.role) => Ok(()),
            _ => Err(UserRequired::insufficient_permissions()),
        }
    }
}

/// Creates a [`RequireRole`] guard.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::{
///     handler_fn, require_role, Body, Environ, Error, Handler, Method, Middleware, ResponseHead,
///     Usersign,
/// };
///
/// let admin_only = require_role("ADMIN").wrap(handler_fn(|_, _| Ok(Body::from("1"))));
///
/// let mut fan = Environ::new(Method::Get, "/admin")
///     .with_usersign(Usersign::named("alice").with_roles(["fan"]));
/// let err = admin_only.call(&mut fan, &mut ResponseHead::default()).unwrap_err();
/// assert!(matches!(err, Error::UserRequired(_)));
///
/// let mut admin = Environ::new(Method::Get, "/admin")
///     .with_usersign(Usersign::named("bob").with_roles(["ADMIN"]));
/// let output = admin_only.call(&mut admin, &mut ResponseHead::default()).unwrap();
/// assert_eq!(output.into_string(), "1");
/// ```
pub fn require_role(role: impl Into<String>) -> RequireRole {
    RequireRole { role: role.into() }
}

impl Middleware for RequireRole {
    fn phase(&self) -> Phase {
        Phase::Before
    }

    fn handle(
        &self,
        next: &dyn Handler,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        self.check(environ)?;
        next.call(environ, start_response)
    }
}

/// Requires a logged-in identity other than `GUEST`.
///
/// Fails with "user must be logged in" when there is no identity, when the
/// identity has no name, or when the name is `GUEST`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequireAnyUser {
    _private: (),
}

impl RequireAnyUser {
    /// Checks the environment without running any handler.
    pub fn check(&self, environ: &Environ) -> Result<(), UserRequired> {
        match environ.usersign() {
            Some(usersign) if usersign.name.is_some() && !usersign.is_guest() => Ok(()),
            _ => Err(UserRequired::login_required()),
        }
    }
}

/// Creates a [`RequireAnyUser`] guard.
pub fn require_any_user() -> RequireAnyUser {
    RequireAnyUser::default()
}

impl Middleware for RequireAnyUser {
    fn phase(&self) -> Phase {
        Phase::Before
    }

    fn handle(
        &self,
        next: &dyn Handler,
        environ: &mut Environ,
        start_response: &mut dyn StartResponse,
    ) -> Result<Body, Error> {
        self.check(environ)?;
        next.call(environ, start_response)
    }
}
