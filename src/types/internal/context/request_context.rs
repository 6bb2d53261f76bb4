use std::net::IpAddr;

use crate::errors::InternalError;
use crate::errors::internal::AuthorizationError;
use crate::types::internal::auth::{Actor, Claims};

use super::{request_id::RequestId, request_source::RequestSource};

/// Request context that flows through all layers
///
/// Contains contextual information about the current request that is needed
/// for logging, auditing, and tracing across API, coordinator, and store layers.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Whether the request is authenticated (JWT validated successfully)
    pub authenticated: bool,

    /// Full JWT claims if authenticated
    pub claims: Option<Claims>,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,

    /// Actor who initiated the operation, used for log lines
    pub actor_id: String,
}

impl RequestContext {
    /// Create an unauthenticated RequestContext for an API request
    pub fn new() -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            authenticated: false,
            claims: None,
            source: RequestSource::API,
            actor_id: "anonymous".to_owned(),
        }
    }

    /// Create a RequestContext for CLI operations
    ///
    /// # Arguments
    /// * `command_name` - Name of the CLI command being executed
    ///
    /// # Returns
    /// * RequestContext configured for CLI source
    pub fn for_cli(command_name: &str) -> Self {
        Self {
            source: RequestSource::CLI,
            actor_id: format!("cli:{}", command_name),
            ..Self::new()
        }
    }

    /// Create a RequestContext for system operations
    ///
    /// # Arguments
    /// * `operation_name` - Name of the system operation being executed
    ///
    /// # Returns
    /// * RequestContext configured for System source
    pub fn for_system(operation_name: &str) -> Self {
        Self {
            source: RequestSource::System,
            actor_id: format!("system:{}", operation_name),
            ..Self::new()
        }
    }

    /// Set the ip_address
    pub fn with_ip_address(mut self, ip_address: IpAddr) -> Self {
        self.ip_address = Some(ip_address);
        self
    }

    /// Set authentication state with claims. The actor becomes the token subject.
    pub fn with_auth(mut self, claims: Claims) -> Self {
        self.authenticated = true;
        self.actor_id = claims.sub.clone();
        self.claims = Some(claims);
        self
    }

    /// Authenticated caller for permission checks
    ///
    /// # Returns
    /// * `Ok(Actor)` - Subject, email and role from the validated token
    /// * `Err(InternalError::Authorization(Unauthenticated))` - No valid token on this request
    pub fn actor(&self) -> Result<Actor, InternalError> {
        match (&self.claims, self.authenticated) {
            (Some(claims), true) => Ok(Actor::from(claims)),
            _ => Err(InternalError::Authorization(AuthorizationError::Unauthenticated)),
        }
    }

    /// User id stored as `actor_user_id` on activity records. None for CLI and system work.
    pub fn actor_user_id(&self) -> Option<String> {
        self.claims.as_ref().map(|claims| claims.sub.clone())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
