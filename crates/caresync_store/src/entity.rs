//! Entity payloads and the user descriptor.

use crate::record::{EntityPayload, RecordId};
use serde::{Deserialize, Serialize};

/// Gender of a resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other or undisclosed.
    Other,
}

/// A resident of the covered area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    /// Full name.
    pub name: String,
    /// Date of birth, `YYYY-MM-DD`.
    pub date_of_birth: String,
    /// Gender.
    pub gender: Gender,
    /// Home address.
    pub address: String,
    /// Contact number.
    pub contact: String,
    /// User id of the health worker who added the record.
    pub added_by: String,
}

impl EntityPayload for Resident {
    const KIND: &'static str = "residents";
}

/// A single health visit for a resident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// The resident this visit belongs to.
    pub resident_id: RecordId,
    /// Date of the visit, `YYYY-MM-DD`.
    pub visit_date: String,
    /// Reason for the visit.
    pub reason: String,
    /// Diagnosis, if any.
    pub diagnosis: String,
    /// Intervention or treatment given.
    pub intervention: String,
    /// User id of the health worker who recorded the visit.
    pub recorded_by: String,
}

impl EntityPayload for HealthRecord {
    const KIND: &'static str = "health_records";
}

/// Access role of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Field health worker: creates and edits records.
    FieldWorker,
    /// Administrator.
    Admin,
    /// Read-only access.
    Viewer,
}

/// The signed-in user, as handed to the engine by the authentication layer.
///
/// The engine treats this as opaque apart from its presence: a sync cycle
/// refuses to start without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable user identifier.
    pub uid: String,
    /// Email address, if known.
    pub email: Option<String>,
    /// Display name, if known.
    pub display_name: Option<String>,
    /// Access role.
    pub role: Role,
    /// The area this worker is assigned to, if any.
    pub assigned_area: Option<String>,
}

impl UserProfile {
    /// Creates a field-worker profile with just a uid.
    #[must_use]
    pub fn field_worker(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            role: Role::FieldWorker,
            assigned_area: None,
        }
    }
}
