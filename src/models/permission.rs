use tracing::warn;

use crate::errors::{Error, Result};
use crate::middleware::Caller;

/// Every operation that touches a record owned by an email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    OpportunityCreate,
    OpportunityUpdate,
    OpportunityDelete,
    OpportunityListOwn,

    ApplicationSubmit,
    ApplicationWithdraw,
    ApplicationListOwn,
}

pub trait PermissionChecker {
    fn owns(&self, owner_email: &str) -> bool;
    fn check_permission(&self, permission: Permission, owner_email: &str) -> Result<()>;
}

impl PermissionChecker for Caller {
    // Emails are compared exactly, as issued in the token.
    fn owns(&self, owner_email: &str) -> bool {
        self.email == owner_email
    }

    fn check_permission(&self, permission: Permission, owner_email: &str) -> Result<()> {
        if self.owns(owner_email) {
            Ok(())
        } else {
            warn!(
                caller = %self.email,
                owner = %owner_email,
                ?permission,
                "ownership check failed"
            );
            Err(Error::Forbidden)
        }
    }
}
