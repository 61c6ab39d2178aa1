use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhoneType {
    #[default]
    Mobile,
    Work,
    Home,
    Office,
    Other,
}

impl PhoneType {
    pub fn all() -> &'static [PhoneType] {
        &[
            PhoneType::Mobile,
            PhoneType::Work,
            PhoneType::Home,
            PhoneType::Office,
            PhoneType::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneType::Mobile => "mobile",
            PhoneType::Work => "work",
            PhoneType::Home => "home",
            PhoneType::Office => "office",
            PhoneType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mobile" => Some(Self::Mobile),
            "work" => Some(Self::Work),
            "home" => Some(Self::Home),
            "office" => Some(Self::Office),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PhoneType::Mobile => "Mobile",
            PhoneType::Work => "Work",
            PhoneType::Home => "Home",
            PhoneType::Office => "Office",
            PhoneType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneEntry {
    pub phone_type: PhoneType,
    pub number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PreferredContact {
    #[default]
    Sms,
    Email,
    Both,
}

impl PreferredContact {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferredContact::Sms => "sms",
            PreferredContact::Email => "email",
            PreferredContact::Both => "both",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sms" => Some(Self::Sms),
            "email" => Some(Self::Email),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentTerms {
    #[default]
    Receipt,
    Net30,
    Net60,
}

impl PaymentTerms {
    pub fn all() -> &'static [PaymentTerms] {
        &[PaymentTerms::Receipt, PaymentTerms::Net30, PaymentTerms::Net60]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentTerms::Receipt => "receipt",
            PaymentTerms::Net30 => "net30",
            PaymentTerms::Net60 => "net60",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "receipt" => Some(Self::Receipt),
            "net30" => Some(Self::Net30),
            "net60" => Some(Self::Net60),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentTerms::Receipt => "Receipt",
            PaymentTerms::Net30 => "Net 30",
            PaymentTerms::Net60 => "Net 60",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub country: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Validated intake payload, produced by the customer form.
///
/// The phone and email lists are ordered and hold between one and three
/// entries; the form enforces the bounds before this is ever constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone_numbers: Vec<PhoneEntry>,
    pub emails: Vec<String>,
    pub preferred_contact: PreferredContact,
    pub tags: Option<String>,
    pub note: Option<String>,
    pub referral_source: Option<String>,
    pub company: Option<String>,
    pub fleet: Option<String>,
    pub payment_terms: Option<PaymentTerms>,
    pub on_shop_default: bool,
    pub address: Option<CustomerAddress>,
    pub default_fee: Option<Decimal>,
}

/// A persisted customer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_numbers: Vec<PhoneEntry>,
    pub emails: Vec<String>,
    pub preferred_contact: PreferredContact,
    pub tags: Option<String>,
    pub note: Option<String>,
    pub referral_source: Option<String>,
    pub company: Option<String>,
    pub fleet: Option<String>,
    pub payment_terms: Option<PaymentTerms>,
    pub on_shop_default: bool,
    pub address: Option<CustomerAddress>,
    pub default_fee: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
