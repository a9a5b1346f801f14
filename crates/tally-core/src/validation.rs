//! # Validation Module
//!
//! Input validation for every form the dashboard submits.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web shell                                                    │
//! │  └── Disabled buttons, input masks                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Screen command (Rust)                                        │
//! │  └── THIS MODULE: every submission validated before a request is built │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Authoritative checks, surfaced through the envelope message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{BranchForm, EmployeeForm, ProfileForm, StoreProductForm};
use crate::MAX_SEARCH_QUERY_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a `.` with text on both sides
/// - No whitespace anywhere
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_email;
///
/// assert!(validate_email("owner@shop.rw").is_ok());
/// assert!(validate_email("owner").is_err());
/// assert!(validate_email("owner@shop").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "Email".to_string(),
        });
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid("must contain a single @"));
    };
    if local.is_empty() {
        return Err(invalid("missing name before @"));
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid("missing domain")),
    }
}

/// Checks a list of `(label, value)` pairs and reports every blank one.
///
/// ```rust
/// use tally_core::validation::validate_required;
///
/// let err = validate_required(&[("district", "Gasabo"), ("cell", " ")]).unwrap_err();
/// assert_eq!(err.to_string(), "Please fill in all required fields: cell");
/// ```
pub fn validate_required(fields: &[(&str, &str)]) -> ValidationResult<()> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Incomplete { missing })
    }
}

/// Validates a navigation search query.
///
/// ## Returns
/// The trimmed query string (may be empty).
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Form Validators
// =============================================================================

/// All five branch fields are required.
pub fn validate_branch_form(form: &BranchForm) -> ValidationResult<()> {
    validate_required(&[
        ("branchName", form.branch_name.as_str()),
        ("district", form.district.as_str()),
        ("sector", form.sector.as_str()),
        ("cell", form.cell.as_str()),
        ("village", form.village.as_str()),
    ])
}

/// Employee forms need identity and location fields, and a valid email.
///
/// `require_role` is set for updates, where the role selector is shown.
pub fn validate_employee_form(form: &EmployeeForm, require_role: bool) -> ValidationResult<()> {
    validate_required(&[
        ("username", form.username.as_str()),
        ("email", form.email.as_str()),
        ("firstName", form.first_name.as_str()),
        ("lastName", form.last_name.as_str()),
        ("phone", form.phone.as_str()),
        ("district", form.district.as_str()),
        ("sector", form.sector.as_str()),
        ("cell", form.cell.as_str()),
        ("village", form.village.as_str()),
    ])?;

    if require_role && form.role.is_none() {
        return Err(ValidationError::Incomplete {
            missing: vec!["role".to_string()],
        });
    }

    validate_email(&form.email)
}

/// Own-profile edits: names and email are required.
pub fn validate_profile_form(form: &ProfileForm) -> ValidationResult<()> {
    validate_required(&[
        ("firstName", form.first_name.as_str()),
        ("lastName", form.last_name.as_str()),
        ("email", form.email.as_str()),
    ])?;
    validate_email(&form.email)
}

/// Store product create/edit form.
pub fn validate_store_product_form(form: &StoreProductForm) -> ValidationResult<()> {
    validate_required(&[
        ("productName", form.product_name.as_str()),
        ("category", form.category.as_str()),
        ("branch", form.branch.as_str()),
    ])?;

    if form.quantity.value < 0 {
        return Err(ValidationError::Negative {
            field: "Quantity".to_string(),
        });
    }
    if !form.cost_price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "Cost price".to_string(),
        });
    }
    if let Some(price) = form.selling_price {
        if !price.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "Selling price".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{Quantity, QuantityUnit, Role};

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.rw").is_ok());
        assert!(validate_email("  padded@shop.rw  ").is_ok());

        assert!(matches!(
            validate_email(""),
            Err(ValidationError::Required { .. })
        ));
        for bad in ["plainname", "@shop.rw", "a@@shop.rw", "a@shop", "a@.rw", "a@shop.", "a b@shop.rw"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_branch_form_reports_missing_fields() {
        let form = BranchForm {
            branch_name: "Remera".into(),
            district: "Gasabo".into(),
            ..BranchForm::default()
        };
        let err = validate_branch_form(&form).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Incomplete {
                missing: vec!["sector".into(), "cell".into(), "village".into()]
            }
        );
    }

    fn employee_form() -> EmployeeForm {
        EmployeeForm {
            username: "jhabimana".into(),
            email: "jean@shop.rw".into(),
            first_name: "Jean".into(),
            last_name: "Habimana".into(),
            phone: "+250788123456".into(),
            district: "Nyarugenge".into(),
            sector: "Nyamirambo".into(),
            cell: "Rugarama".into(),
            village: "Kivugiza".into(),
            role: None,
            branch: None,
            is_active: None,
        }
    }

    #[test]
    fn test_employee_form() {
        let form = employee_form();
        assert!(validate_employee_form(&form, false).is_ok());
        assert!(validate_employee_form(&form, true).is_err());

        let with_role = EmployeeForm {
            role: Some(Role::Staff),
            ..employee_form()
        };
        assert!(validate_employee_form(&with_role, true).is_ok());

        let bad_email = EmployeeForm {
            email: "jean".into(),
            ..employee_form()
        };
        assert!(matches!(
            validate_employee_form(&bad_email, false),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_store_product_form() {
        let mut form = StoreProductForm {
            product_name: "Cement 50kg".into(),
            category: "Building".into(),
            branch: "Main".into(),
            quantity: Quantity::new(20, QuantityUnit::Pcs),
            cost_price: Money::from_units(11_000),
            selling_price: Some(Money::from_units(12_500)),
            ..StoreProductForm::default()
        };
        assert!(validate_store_product_form(&form).is_ok());

        form.selling_price = Some(Money::zero());
        assert!(validate_store_product_form(&form).is_err());

        form.selling_price = None;
        form.cost_price = Money::zero();
        assert!(validate_store_product_form(&form).is_err());
    }

    #[test]
    fn test_search_query_length() {
        assert_eq!(validate_search_query("  sold ").unwrap(), "sold");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }
}
