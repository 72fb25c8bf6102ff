use crate::models::FileRecord;
use crate::services::error::Denial;
use crate::services::identity::OwnerIdentity;

/// Decides whether a caller may see a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Owner is checked before the code; the first failure wins.
    pub fn authorize_fetch(
        &self,
        record: &FileRecord,
        caller: &OwnerIdentity,
        supplied_code: Option<&str>,
    ) -> Result<(), Denial> {
        if &record.owner != caller {
            return Err(Denial::OwnerMismatch);
        }

        match supplied_code {
            Some(code) if code == record.access_code => Ok(()),
            _ => Err(Denial::CodeMismatch),
        }
    }

    /// Listing has no denial path: a caller may always list, and only ever
    /// sees the records of the identity returned here.
    pub fn authorize_list<'a>(&self, caller: &'a OwnerIdentity) -> &'a OwnerIdentity {
        caller
    }
}
