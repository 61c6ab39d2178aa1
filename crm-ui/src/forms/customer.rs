//! Draft state for the customer intake form.
//!
//! Every field is held as entered text and only parsed by [`CustomerForm::validate`],
//! which either returns a clean [`NewCustomer`] or fills `errors` for display.

use crm_core::{
    CustomerAddress, NewCustomer, PaymentTerms, PhoneEntry, PhoneType, PreferredContact,
};

use crate::utils::parse_optional_decimal;

/// Upper bound on phone and email entries.
pub const MAX_CONTACT_ENTRIES: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct PhoneDraft {
    pub phone_type: PhoneType,
    pub number: String,
}

#[derive(Debug, Clone)]
pub struct CustomerForm {
    pub first_name: String,
    pub last_name: String,
    pub phones: Vec<PhoneDraft>,
    pub emails: Vec<String>,
    pub preferred_contact: PreferredContact,

    // Additional info
    pub tags: String,
    pub note: String,
    pub referral_source: String,
    pub company: String,
    pub fleet: String,
    pub payment_terms: Option<PaymentTerms>,
    pub on_shop_default: bool,

    // Address
    pub country: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,

    // Fees
    pub default_fee: String,

    // Section visibility, local-only
    pub show_additional_info: bool,
    pub show_address: bool,
    pub show_fees: bool,

    pub errors: Vec<String>,
}

impl Default for CustomerForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerForm {
    /// A blank form with the mandatory single phone and email rows.
    pub fn new() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            phones: vec![PhoneDraft::default()],
            emails: vec![String::new()],
            preferred_contact: PreferredContact::default(),
            tags: String::new(),
            note: String::new(),
            referral_source: String::new(),
            company: String::new(),
            fleet: String::new(),
            payment_terms: None,
            on_shop_default: false,
            country: String::new(),
            address1: String::new(),
            address2: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            default_fee: String::new(),
            show_additional_info: false,
            show_address: false,
            show_fees: false,
            errors: Vec::new(),
        }
    }

    /// No-op once three rows exist.
    pub fn add_phone(&mut self) {
        if self.phones.len() < MAX_CONTACT_ENTRIES {
            self.phones.push(PhoneDraft::default());
        }
    }

    /// No-op for the first row; the list never drops below one entry.
    pub fn remove_phone(&mut self, index: usize) {
        if index > 0 && index < self.phones.len() {
            self.phones.remove(index);
        }
    }

    /// No-op once three rows exist.
    pub fn add_email(&mut self) {
        if self.emails.len() < MAX_CONTACT_ENTRIES {
            self.emails.push(String::new());
        }
    }

    /// No-op for the first row; the list never drops below one entry.
    pub fn remove_email(&mut self, index: usize) {
        if index > 0 && index < self.emails.len() {
            self.emails.remove(index);
        }
    }

    /// Parse the draft into a NewCustomer, filling `errors` when invalid.
    pub fn validate(&mut self) -> Result<NewCustomer, ()> {
        self.errors.clear();

        if self.first_name.trim().is_empty() {
            self.errors.push("First Name is required".into());
        }
        if self.last_name.trim().is_empty() {
            self.errors.push("Last Name is required".into());
        }

        let mut phone_numbers = Vec::new();
        for (i, phone) in self.phones.iter().enumerate() {
            let number = phone.number.trim();
            if number.is_empty() {
                self.errors.push(format!("Phone Number {} is required", i + 1));
            } else {
                phone_numbers.push(PhoneEntry {
                    phone_type: phone.phone_type,
                    number: number.to_string(),
                });
            }
        }

        let mut emails = Vec::new();
        for (i, email) in self.emails.iter().enumerate() {
            let trimmed = email.trim();
            if trimmed.is_empty() {
                self.errors.push(format!("Email {} is required", i + 1));
            } else if !trimmed.contains('@') {
                self.errors.push(format!("Email {} is invalid", i + 1));
            } else {
                emails.push(trimmed.to_string());
            }
        }

        let default_fee = parse_optional_decimal(&self.default_fee);

        if !self.errors.is_empty() {
            return Err(());
        }

        let address = self.build_address();

        Ok(NewCustomer {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone_numbers,
            emails,
            preferred_contact: self.preferred_contact,
            tags: opt_string(&self.tags),
            note: opt_string(&self.note),
            referral_source: opt_string(&self.referral_source),
            company: opt_string(&self.company),
            fleet: opt_string(&self.fleet),
            payment_terms: self.payment_terms,
            on_shop_default: self.on_shop_default,
            address,
            default_fee,
        })
    }

    /// None unless at least one address field was filled in.
    fn build_address(&self) -> Option<CustomerAddress> {
        let fields = [
            &self.country,
            &self.address1,
            &self.address2,
            &self.city,
            &self.state,
            &self.zip_code,
        ];
        if fields.iter().all(|f| f.trim().is_empty()) {
            return None;
        }
        Some(CustomerAddress {
            country: self.country.trim().to_string(),
            address1: self.address1.trim().to_string(),
            address2: opt_string(&self.address2),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
        })
    }
}

fn opt_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn filled_form() -> CustomerForm {
        let mut form = CustomerForm::new();
        form.first_name = "Avery".into();
        form.last_name = "Diaz".into();
        form.phones[0].number = "555-0100".into();
        form.emails[0] = "avery@example.com".into();
        form
    }

    #[test]
    fn phone_list_stays_between_one_and_three() {
        let mut form = CustomerForm::new();
        assert_eq!(form.phones.len(), 1);

        form.remove_phone(0);
        assert_eq!(form.phones.len(), 1);

        form.add_phone();
        form.add_phone();
        assert_eq!(form.phones.len(), 3);
        form.add_phone();
        assert_eq!(form.phones.len(), 3);

        form.remove_phone(2);
        assert_eq!(form.phones.len(), 2);
    }

    #[test]
    fn email_list_stays_between_one_and_three() {
        let mut form = CustomerForm::new();
        form.remove_email(0);
        assert_eq!(form.emails.len(), 1);

        form.add_email();
        form.add_email();
        form.add_email();
        assert_eq!(form.emails.len(), 3);
    }

    #[test]
    fn validate_requires_names_phone_and_email() {
        let mut form = CustomerForm::new();
        assert!(form.validate().is_err());
        assert_eq!(
            form.errors,
            vec![
                "First Name is required".to_string(),
                "Last Name is required".to_string(),
                "Phone Number 1 is required".to_string(),
                "Email 1 is required".to_string(),
            ]
        );
    }

    #[test]
    fn validate_rejects_malformed_email() {
        let mut form = filled_form();
        form.emails[0] = "not-an-address".into();
        assert!(form.validate().is_err());
        assert_eq!(form.errors, vec!["Email 1 is invalid".to_string()]);
    }

    #[test]
    fn validate_produces_trimmed_payload() {
        let mut form = filled_form();
        form.first_name = "  Avery ".into();
        form.company = " Diaz Towing ".into();
        form.default_fee = "1,250.50".into();

        let customer = form.validate().unwrap();
        assert_eq!(customer.first_name, "Avery");
        assert_eq!(customer.company.as_deref(), Some("Diaz Towing"));
        assert_eq!(customer.default_fee, Some(dec!(1250.50)));
        assert_eq!(customer.address, None);
    }

    #[test]
    fn address_is_some_when_any_field_set() {
        let mut form = filled_form();
        form.city = "Bozeman".into();
        let customer = form.validate().unwrap();
        let address = customer.address.unwrap();
        assert_eq!(address.city, "Bozeman");
        assert_eq!(address.address2, None);
    }
}
