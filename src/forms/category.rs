use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::forms::optional_text;

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
/// Form data for creating or updating a category.
pub struct CategoryForm {
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CategoryForm {
    #[must_use]
    pub fn new(name: &str, description: Option<String>, status: Option<String>) -> Self {
        Self {
            name: name.trim().to_string(),
            description: optional_text(description),
            status: optional_text(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::FieldErrors;
    use crate::forms::{FormError, prepare_payload};

    #[test]
    fn blank_name_is_reported_on_the_name_field() {
        let form = CategoryForm::new("   ", Some("Paperbacks".into()), None);

        let err = prepare_payload(&form).expect_err("blank name must fail");
        let FormError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let field_errors = FieldErrors::from(&errors);

        assert_eq!(
            field_errors.get("name"),
            Some(&["The name field is required.".to_string()][..])
        );
        assert!(field_errors.get("description").is_none());
    }

    #[test]
    fn valid_form_encodes_without_empty_optionals() {
        let form = CategoryForm::new(" Books ", Some("  ".into()), Some("active".into()));

        let body = prepare_payload(&form).expect("valid form");

        assert_eq!(body, serde_json::json!({"name": "Books", "status": "active"}));
    }
}
