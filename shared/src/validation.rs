//! Validation utilities for the bakery inventory ledger

use crate::consumption::SalesQuantities;

/// Largest quantity accepted for one product in a sales report
pub const MAX_SALE_QUANTITY: i64 = 1_000_000;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate username format (3-32 characters: letters, digits, '_', '.', '-')
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters");
    }
    if username.len() > 32 {
        return Err("Username must be at most 32 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err("Username may only contain letters, digits, '_', '.' and '-'");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate business name (non-blank, at most 100 characters)
pub fn validate_business_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Business name must not be empty");
    }
    if name.chars().count() > 100 {
        return Err("Business name must be at most 100 characters");
    }
    Ok(())
}

// ============================================================================
// Ledger Validations
// ============================================================================

/// Validate recipe name (non-blank, at most 64 characters)
pub fn validate_recipe_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Recipe name must not be empty");
    }
    if name.chars().count() > 64 {
        return Err("Recipe name must be at most 64 characters");
    }
    Ok(())
}

/// Validate a manually entered stock amount
pub fn validate_stock_amount(amount: i64) -> Result<(), &'static str> {
    if amount < 0 {
        return Err("Stock amount cannot be negative");
    }
    Ok(())
}

/// Validate a sales report has at least one item sold
///
/// Non-positive lines are allowed and ignored by the consumption engine.
pub fn validate_sales(sales: &SalesQuantities) -> Result<(), &'static str> {
    if !sales.values().any(|&q| q > 0) {
        return Err("At least one item must have a positive quantity");
    }
    if sales.values().any(|&q| q > MAX_SALE_QUANTITY) {
        return Err("Quantity per item must not exceed 1000000");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("baker_01").is_ok());
        assert!(validate_username("anna.b").is_ok());
    }

    #[test]
    fn test_validate_username_invalid() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_recipe_name() {
        assert!(validate_recipe_name("Sourdough").is_ok());
        assert!(validate_recipe_name("   ").is_err());
    }

    #[test]
    fn test_validate_stock_amount() {
        assert!(validate_stock_amount(0).is_ok());
        assert!(validate_stock_amount(-5).is_err());
    }

    #[test]
    fn test_validate_sales() {
        let mut sales = SalesQuantities::new();
        sales.insert("Bread".to_string(), 0);
        assert!(validate_sales(&sales).is_err());
        sales.insert("Cake".to_string(), 2);
        assert!(validate_sales(&sales).is_ok());
        sales.insert("Cookies".to_string(), MAX_SALE_QUANTITY + 1);
        assert!(validate_sales(&sales).is_err());
    }
}
