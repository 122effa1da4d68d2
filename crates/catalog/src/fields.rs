//! Raw product form and ordered required-field validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input validation failure for a product mutation.
///
/// The display strings are part of the HTTP contract and are matched verbatim
/// by existing clients, spelling included.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is Required")]
    MissingName,

    #[error("Description is Required")]
    MissingDescription,

    #[error("Price is Required")]
    MissingPrice,

    #[error("Category is Required")]
    MissingCategory,

    #[error("Quantity is Required")]
    MissingQuantity,

    /// Covers both an oversized photo and a missing photo under
    /// [`crate::PhotoPolicy::Required`].
    #[error("photo is Required and should be less then 1mb")]
    Photo,
}

/// Product form fields exactly as submitted (multipart text parts).
///
/// Nothing is parsed here; `None` means the part was not sent at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<String>,
    pub shipping: Option<String>,
}

impl ProductForm {
    /// Assign a named form part. Unknown part names are ignored and reported
    /// back as `false`.
    pub fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "price" => &mut self.price,
            "category" => &mut self.category,
            "quantity" => &mut self.quantity,
            "shipping" => &mut self.shipping,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// Required product fields, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Name,
    Description,
    Price,
    Category,
    Quantity,
}

impl RequiredField {
    /// Check order. The first missing field wins.
    pub const PRIORITY: [RequiredField; 5] = [
        RequiredField::Name,
        RequiredField::Description,
        RequiredField::Price,
        RequiredField::Category,
        RequiredField::Quantity,
    ];

    fn value(self, form: &ProductForm) -> Option<&str> {
        match self {
            RequiredField::Name => form.name.as_deref(),
            RequiredField::Description => form.description.as_deref(),
            RequiredField::Price => form.price.as_deref(),
            RequiredField::Category => form.category.as_deref(),
            RequiredField::Quantity => form.quantity.as_deref(),
        }
    }

    pub fn missing_error(self) -> ValidationError {
        match self {
            RequiredField::Name => ValidationError::MissingName,
            RequiredField::Description => ValidationError::MissingDescription,
            RequiredField::Price => ValidationError::MissingPrice,
            RequiredField::Category => ValidationError::MissingCategory,
            RequiredField::Quantity => ValidationError::MissingQuantity,
        }
    }
}

/// Short-circuiting presence check over [`RequiredField::PRIORITY`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldValidator;

impl FieldValidator {
    pub fn new() -> Self {
        Self
    }

    /// Returns the error of the first absent (unset or empty) required field.
    pub fn validate(&self, form: &ProductForm) -> Result<(), ValidationError> {
        for field in RequiredField::PRIORITY {
            match field.value(form) {
                Some(v) if !v.is_empty() => {}
                _ => return Err(field.missing_error()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> ProductForm {
        ProductForm {
            name: Some("Test Name".to_string()),
            description: Some("Test Description".to_string()),
            price: Some("100".to_string()),
            category: Some("Test Category".to_string()),
            quantity: Some("10".to_string()),
            shipping: Some("true".to_string()),
        }
    }

    fn clear(form: &mut ProductForm, field: RequiredField) {
        match field {
            RequiredField::Name => form.name = None,
            RequiredField::Description => form.description = None,
            RequiredField::Price => form.price = None,
            RequiredField::Category => form.category = None,
            RequiredField::Quantity => form.quantity = None,
        }
    }

    fn without(field: RequiredField) -> ProductForm {
        let mut form = complete_form();
        clear(&mut form, field);
        form
    }

    #[test]
    fn complete_form_passes() {
        assert_eq!(FieldValidator::new().validate(&complete_form()), Ok(()));
    }

    #[test]
    fn shipping_is_not_required() {
        let mut form = complete_form();
        form.shipping = None;
        assert_eq!(FieldValidator::new().validate(&form), Ok(()));
    }

    #[test]
    fn each_missing_field_reports_its_own_message() {
        let cases = [
            (RequiredField::Name, "Name is Required"),
            (RequiredField::Description, "Description is Required"),
            (RequiredField::Price, "Price is Required"),
            (RequiredField::Category, "Category is Required"),
            (RequiredField::Quantity, "Quantity is Required"),
        ];
        for (field, message) in cases {
            let err = FieldValidator::new().validate(&without(field)).unwrap_err();
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let mut form = complete_form();
        form.price = Some(String::new());
        assert_eq!(
            FieldValidator::new().validate(&form),
            Err(ValidationError::MissingPrice)
        );
    }

    #[test]
    fn name_error_wins_over_description_error() {
        let mut form = complete_form();
        form.name = None;
        form.description = None;
        assert_eq!(
            FieldValidator::new().validate(&form),
            Err(ValidationError::MissingName)
        );
    }

    #[test]
    fn empty_form_reports_name_first() {
        assert_eq!(
            FieldValidator::new().validate(&ProductForm::default()),
            Err(ValidationError::MissingName)
        );
    }

    #[test]
    fn set_ignores_unknown_parts() {
        let mut form = ProductForm::default();
        assert!(form.set("name", "Lamp".to_string()));
        assert!(!form.set("colour", "red".to_string()));
        assert_eq!(form.name.as_deref(), Some("Lamp"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn field_mask() -> impl Strategy<Value = [bool; 5]> {
            prop::array::uniform5(any::<bool>())
        }

        proptest! {
            /// Property: with any subset of required fields removed, the
            /// reported error is the earliest removed field in priority order.
            #[test]
            fn earliest_missing_field_is_reported(mask in field_mask()) {
                let mut form = complete_form();
                let mut expected = None;
                for (idx, field) in RequiredField::PRIORITY.iter().enumerate() {
                    if mask[idx] {
                        clear(&mut form, *field);
                        if expected.is_none() {
                            expected = Some(field.missing_error());
                        }
                    }
                }

                let result = FieldValidator::new().validate(&form);
                match expected {
                    Some(err) => prop_assert_eq!(result, Err(err)),
                    None => prop_assert_eq!(result, Ok(())),
                }
            }
        }
    }
}
