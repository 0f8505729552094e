//! Ownership checks for caller-identified resources.

use super::{AuthError, CurrentUser};

/// Allow the request only when the caller-supplied identity is exactly the
/// verified subject.
///
/// Comparison is literal: no case folding, no trimming. A missing verified
/// identity (no gate ran) or a missing supplied identity fails closed.
pub fn check(verified: Option<&CurrentUser>, supplied: Option<&str>) -> Result<(), AuthError> {
    let Some(user) = verified else {
        tracing::error!("ownership check reached without a verified identity");
        return Err(AuthError::Forbidden("no verified identity".to_string()));
    };

    match supplied {
        Some(identity) if identity == user.subject() => Ok(()),
        Some(identity) => {
            tracing::warn!(
                subject = %user.subject(),
                supplied = %identity,
                "ownership mismatch"
            );
            Err(AuthError::Forbidden(format!(
                "{} may not act for {}",
                user.subject(),
                identity
            )))
        }
        None => Err(AuthError::Forbidden("no identity supplied".to_string())),
    }
}
