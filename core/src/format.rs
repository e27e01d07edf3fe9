//! Display formatting for customer names, product codes and amounts.

use crate::model::Recommendation;

/// Known product codes and their marketing names. Keys are upper case.
const PRODUCT_NAMES: &[(&str, &str)] = &[
    ("BASIC_CHECKING", "Daily Flow Account"),
    ("CCOR602", "MyEnergy Checking Account"),
    ("CACR432", "AureaCard Exclusive"),
    ("CACR748", "AureaCard Infinity"),
    ("CADB439", "ZynaFlow Plus"),
    ("CADB783", "EasyYoung Pay"),
    ("CINV819", "SharesVault Investment"),
    ("CRDT356", "FlexiCredit Line"),
    ("DPAM682", "WealthPlus Managed Deposit"),
    ("DPAM234", "SaveSmart Goal Account"),
    ("DPAM891", "FutureSecure Pension Fund"),
    ("PRPE771", "Premium Business+ Package"),
    ("SINV263", "PlannerPro Advisory"),
    ("BUSINESS_ACCOUNT", "Business Prime Account"),
    ("MORTGAGE", "DreamHome Mortgage"),
    ("QUICKCASH", "QuickCash Personal Loan"),
    ("REWARDS_CREDIT", "Rewards Credit Card"),
    ("PERSONAL_LOAN", "Personal Loan"),
    ("MYENERGY", "MyEnergy Digital Account"),
];

/// Codes longer than this are assumed to already be display names.
const DISPLAY_NAME_MIN_LEN: usize = 15;

/// Turn a raw customer name into a display name.
///
/// Upstream uploads sometimes store the whole CSV row (`id,last,first,...`)
/// in the name column. Plain names pass through untouched.
pub fn parse_customer_name(raw: &str) -> String {
    if !raw.contains(',') {
        return raw.to_string();
    }
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() < 3 {
        return raw.to_string();
    }
    let last = parts[1].trim();
    let first = parts[2].trim();
    let full = format!("{first} {last}");
    let full = full.trim();
    if !full.is_empty() {
        return full.to_string();
    }
    let id = parts[0].trim();
    if !id.is_empty() {
        return id.to_string();
    }
    raw.to_string()
}

/// Display name for a recommendation's customer, falling back to the id.
pub fn customer_display_name(rec: &Recommendation) -> String {
    let parsed = rec
        .customer_name
        .as_deref()
        .map(parse_customer_name)
        .unwrap_or_default();
    if parsed.trim().is_empty() {
        rec.customer_id.clone()
    } else {
        parsed
    }
}

/// Look up a product code (case-insensitive) in the catalog.
pub fn product_display_name(code: &str) -> Option<&'static str> {
    let normalized = code.trim().to_ascii_uppercase();
    PRODUCT_NAMES
        .iter()
        .find(|(key, _)| *key == normalized)
        .map(|(_, name)| *name)
}

pub fn format_product_name(code: &str) -> String {
    if code.trim().is_empty() {
        return "Unknown Product".to_string();
    }
    if let Some(name) = product_display_name(code) {
        return name.to_string();
    }
    if code.contains(' ') || code.chars().count() > DISPLAY_NAME_MIN_LEN {
        return code.to_string();
    }
    title_case(&code.replace('_', " "))
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Whole-euro amount with thousands separators, e.g. `€12,346`.
pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount.round() } else { 0.0 };
    let sign = if amount < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}€{grouped}")
}

/// Ratio in [0,1] rendered as a percentage with one decimal.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_handles_mixed_separators() {
        assert_eq!(title_case("gold card-plus"), "Gold Card-Plus");
        assert_eq!(title_case("x2 BOND"), "X2 Bond");
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "€0");
        assert_eq!(format_currency(999.4), "€999");
        assert_eq!(format_currency(1234.5), "€1,235");
        assert_eq!(format_currency(1_234_567.0), "€1,234,567");
        assert_eq!(format_currency(-12_000.0), "-€12,000");
        assert_eq!(format_currency(f64::NAN), "€0");
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(0.756), "75.6%");
        assert_eq!(format_percent(0.0), "0.0%");
    }
}
