//! Naming-convention fallback used when a module doesn't author solution
//! metadata. This reads identifiers, not code, and will misclassify any
//! function whose name doesn't follow the convention.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inferred {
    pub approach: &'static str,
    pub time: &'static str,
    pub space: &'static str,
}

struct NamingRule {
    needles: &'static [&'static str],
    inferred: Inferred,
}

// Evaluated top to bottom; the first rule with a matching needle wins.
const RULES: &[NamingRule] = &[
    NamingRule {
        needles: &["hash"],
        inferred: Inferred {
            approach: "Hash Map",
            time: "O(n)",
            space: "O(n)",
        },
    },
    NamingRule {
        needles: &["bruteforce", "brute"],
        inferred: Inferred {
            approach: "Brute Force",
            time: "O(n²)",
            space: "O(1)",
        },
    },
    NamingRule {
        needles: &["sort"],
        inferred: Inferred {
            approach: "Sorting",
            time: "O(n log n)",
            space: "O(n)",
        },
    },
    NamingRule {
        needles: &["recursive"],
        inferred: Inferred {
            approach: "Recursive",
            time: "O(n)",
            space: "O(n)",
        },
    },
    NamingRule {
        needles: &["iterative"],
        inferred: Inferred {
            approach: "Iterative",
            time: "O(n)",
            space: "O(1)",
        },
    },
    NamingRule {
        needles: &["anagram"],
        inferred: Inferred {
            approach: "Sorting",
            time: "O(n log n)",
            space: "O(n)",
        },
    },
];

pub const DEFAULT: Inferred = Inferred {
    approach: "Standard",
    time: "O(n)",
    space: "O(1)",
};

/// Approach and complexity labels guessed from a function name.
pub fn infer(function_name: &str) -> Inferred {
    let name = function_name.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|n| name.contains(n)))
        .map(|rule| rule.inferred)
        .unwrap_or(DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively() {
        assert_eq!(infer("twoSumHashMap").approach, "Hash Map");
        assert_eq!(infer("twoSumBruteForce").time, "O(n²)");
        assert_eq!(infer("mergeSort").approach, "Sorting");
        assert_eq!(infer("factorialRecursive").space, "O(n)");
        assert_eq!(infer("factorialIterative").space, "O(1)");
    }

    #[test]
    fn earlier_rules_take_precedence() {
        // hash beats sort, brute beats sort, sort beats recursive.
        assert_eq!(infer("sortedHashLookup").approach, "Hash Map");
        assert_eq!(infer("bruteSortCheck").approach, "Brute Force");
        assert_eq!(infer("recursiveSort").approach, "Sorting");
        assert_eq!(infer("iterativeRecursiveMix").approach, "Recursive");
    }

    #[test]
    fn anagram_only_applies_after_the_general_rules() {
        assert_eq!(
            infer("isAnagram"),
            Inferred {
                approach: "Sorting",
                time: "O(n log n)",
                space: "O(n)"
            }
        );
        assert_eq!(infer("anagramHashCount").approach, "Hash Map");
    }

    #[test]
    fn falls_back_to_standard() {
        assert_eq!(infer("binarySearch"), DEFAULT);
    }
}
