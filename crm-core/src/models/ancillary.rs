//! Ancillary records created from the intake form's dialogs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PhoneEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralSource {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReferralSource {
    pub name: String,
}

/// A fleet account: a company with its own contact list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    pub id: i64,
    pub company_name: String,
    pub phone_numbers: Vec<PhoneEntry>,
    pub emails: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFleet {
    pub company_name: String,
    pub phone_numbers: Vec<PhoneEntry>,
    pub emails: Vec<String>,
}
