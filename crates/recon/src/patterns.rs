use serde::{Deserialize, Serialize};

/// One rule for a recurring non-itemized charge (subscription, digital
/// rental) that will never have a matching receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownPattern {
    pub pattern: String,
    /// Exact description match instead of substring containment.
    #[serde(default)]
    pub exact: bool,
    pub clean_name: String,
}

/// Ordered lookup table; more specific patterns must come first.
#[derive(Debug, Clone)]
pub struct KnownPatternTable {
    patterns: Vec<KnownPattern>,
}

impl KnownPatternTable {
    pub fn new(patterns: Vec<KnownPattern>) -> Self {
        Self { patterns }
    }

    /// Returns the clean display name for a recognized description.
    /// Case-insensitive; first rule wins.
    pub fn lookup(&self, description: &str) -> Option<&str> {
        let desc = description.trim().to_uppercase();
        self.patterns
            .iter()
            .find(|p| {
                let pattern = p.pattern.to_uppercase();
                if p.exact {
                    desc == pattern
                } else {
                    desc.contains(&pattern)
                }
            })
            .map(|p| p.clean_name.as_str())
    }
}

impl Default for KnownPatternTable {
    fn default() -> Self {
        let rule = |pattern: &str, exact: bool, clean_name: &str| KnownPattern {
            pattern: pattern.to_string(),
            exact,
            clean_name: clean_name.to_string(),
        };
        // Order matters: "Amazon Prime*" (with trailing junk) must be
        // checked before the exact "Amazon Prime" subscription rule.
        Self::new(vec![
            rule("Amazon Prime*", false, "Amazon Prime - Movie Rental"),
            rule("Amazon Prime", true, "Amazon Prime - Subscription"),
            rule("Amazon Kids", false, "Amazon Kids - Movie Rental"),
            rule("Amazon Tips", false, "Amazon - Grocery Tips"),
            rule("Amzn Digital", false, "Amazon Digital - Movie Rental"),
            rule("AMZN Digital", false, "Amazon Digital - Movie Rental"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_prime_is_subscription() {
        // The exact subscription description.
        let table = KnownPatternTable::default();
        assert_eq!(
            table.lookup("Amazon Prime"),
            Some("Amazon Prime - Subscription")
        );
    }

    #[test]
    fn prime_with_suffix_is_rental() {
        let table = KnownPatternTable::default();
        assert_eq!(
            table.lookup("Amazon Prime*2V4BX8"),
            Some("Amazon Prime - Movie Rental")
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = KnownPatternTable::default();
        assert_eq!(
            table.lookup("amzn digital 123"),
            Some("Amazon Digital - Movie Rental")
        );
    }

    #[test]
    fn unknown_description_is_none() {
        let table = KnownPatternTable::default();
        assert_eq!(table.lookup("AMAZON.COM*ABC123"), None);
        assert_eq!(table.lookup(""), None);
    }

    #[test]
    fn first_rule_wins() {
        let table = KnownPatternTable::new(vec![
            KnownPattern {
                pattern: "Prime".to_string(),
                exact: false,
                clean_name: "First".to_string(),
            },
            KnownPattern {
                pattern: "Prime".to_string(),
                exact: false,
                clean_name: "Second".to_string(),
            },
        ]);
        assert_eq!(table.lookup("Amazon Prime"), Some("First"));
    }
}
