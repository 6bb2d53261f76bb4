use std::net::IpAddr;

use poem::Request;
use poem_openapi::auth::Bearer;

use crate::audit::AuditLogger;
use crate::errors::InternalError;
use crate::providers::TokenProvider;
use crate::types::internal::context::RequestContext;

/// Client IP, preferring proxy headers over the socket address
pub fn extract_ip_address(req: &Request) -> Option<IpAddr> {
    // X-Forwarded-For (proxy/load balancer), first hop is the client
    if let Some(forwarded) = req.header("X-Forwarded-For") {
        if let Some(ip) = forwarded.split(',').next() {
            if let Ok(ip) = ip.trim().parse() {
                return Some(ip);
            }
        }
    }

    // X-Real-IP (nginx)
    if let Some(real_ip) = req.header("X-Real-IP") {
        if let Ok(ip) = real_ip.trim().parse() {
            return Some(ip);
        }
    }

    req.remote_addr().as_socket_addr().map(|addr| addr.ip())
}

/// Build the RequestContext for an API request
///
/// Without a bearer token the context is anonymous; operations that need a
/// caller reject it later. A bearer token that fails validation is rejected
/// here and recorded in the audit log.
///
/// # Returns
/// * `Ok(RequestContext)` - Anonymous, or authenticated with the token's claims
/// * `Err(CredentialError)` - Token present but invalid or expired
pub async fn create_request_context(
    req: &Request,
    auth: Option<Bearer>,
    token_provider: &TokenProvider,
    audit_logger: &AuditLogger,
) -> Result<RequestContext, InternalError> {
    let mut ctx = RequestContext::new();
    if let Some(ip) = extract_ip_address(req) {
        ctx = ctx.with_ip_address(ip);
    }

    let Some(bearer) = auth else {
        return Ok(ctx);
    };

    match token_provider.validate_access_token(&bearer.token) {
        Ok(claims) => Ok(ctx.with_auth(claims)),
        Err(e) => {
            tracing::debug!("Rejected bearer token on request {}: {}", ctx.request_id, e);
            audit_logger
                .log_jwt_validation_failure(&ctx, &e.to_string())
                .await;
            Err(e)
        }
    }
}
