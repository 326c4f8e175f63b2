use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::types::normalize_phone_to_e164;
use crate::forms::optional_text;

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
/// Form data for creating or updating a customer.
pub struct CustomerForm {
    #[validate(length(min = 1, message = "The name field is required."))]
    pub name: String,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    /// Empty when the customer has no phone on file.
    #[serde(skip_serializing_if = "String::is_empty")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub customer_group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() || normalize_phone_to_e164(phone).is_ok() {
        return Ok(());
    }
    let mut error = ValidationError::new("phone");
    error.message = Some("The phone must be a valid phone number.".into());
    Err(error)
}

impl CustomerForm {
    #[must_use]
    pub fn new(name: &str, email: &str, phone: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            phone: normalize_phone_to_e164(phone).unwrap_or_else(|_| phone.trim().to_string()),
            customer_group_id: None,
            status: None,
        }
    }

    #[must_use]
    pub fn group(mut self, customer_group_id: i64) -> Self {
        self.customer_group_id = Some(customer_group_id);
        self
    }

    #[must_use]
    pub fn status(mut self, status: Option<String>) -> Self {
        self.status = optional_text(status);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::FieldErrors;
    use crate::forms::{FormError, prepare_payload};

    fn field_errors(form: &CustomerForm) -> FieldErrors {
        match prepare_payload(form) {
            Err(FormError::Validation(errors)) => FieldErrors::from(&errors),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn constructor_normalizes_inputs() {
        let form = CustomerForm::new(" Anna ", " ANNA@Example.com ", "+1 202 555 0143");
        assert_eq!(form.name, "Anna");
        assert_eq!(form.email, "anna@example.com");
        assert_eq!(form.phone, "+12025550143");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn invalid_email_and_phone_are_reported_per_field() {
        let form = CustomerForm::new("Anna", "not-an-email", "call me");
        let errors = field_errors(&form);

        assert!(errors.get("email").is_some());
        assert_eq!(
            errors.get("phone"),
            Some(&["The phone must be a valid phone number.".to_string()][..])
        );
        assert!(errors.get("name").is_none());
    }

    #[test]
    fn empty_phone_is_allowed_and_omitted() {
        let form = CustomerForm::new("Anna", "anna@example.com", "").group(3);
        let body = prepare_payload(&form).expect("valid form");
        assert_eq!(
            body,
            serde_json::json!({"name": "Anna", "email": "anna@example.com", "customer_group_id": 3})
        );
    }
}
