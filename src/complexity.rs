use crate::Solution;

/// Known growth classes, declared in ascending order so `Ord` is the rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComplexityClass {
    Constant,
    Logarithmic,
    Linear,
    Linearithmic,
    Quadratic,
    Cubic,
    Exponential,
}

/// Ordinal used for optimality. `Unknown` sorts after every known class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Known(ComplexityClass),
    Unknown,
}

// Keys are the inside of `O(...)`, lowercased with whitespace removed.
const RANK_TABLE: &[(&str, ComplexityClass)] = &[
    ("1", ComplexityClass::Constant),
    ("logn", ComplexityClass::Logarithmic),
    ("n", ComplexityClass::Linear),
    ("nlogn", ComplexityClass::Linearithmic),
    ("n²", ComplexityClass::Quadratic),
    ("n^2", ComplexityClass::Quadratic),
    ("n*n", ComplexityClass::Quadratic),
    ("n³", ComplexityClass::Cubic),
    ("n^3", ComplexityClass::Cubic),
    ("2^n", ComplexityClass::Exponential),
    ("2ⁿ", ComplexityClass::Exponential),
];

/// The leading complexity token: text up to the first whitespace that sits
/// outside parentheses, minus trailing `,`/`;`. `"O(n log n) average"`
/// yields `"O(n log n)"`.
pub fn leading_token(expr: &str) -> &str {
    let expr = expr.trim();
    let mut depth = 0i32;
    let mut end = expr.len();
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c.is_whitespace() && depth <= 0 => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    expr[..end].trim_end_matches(|c: char| c == ',' || c == ';')
}

pub fn classify(token: &str) -> Option<ComplexityClass> {
    let inner = token.strip_prefix("O(")?.strip_suffix(')')?;
    let key: String = inner
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    RANK_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, class)| *class)
}

pub fn rank(time_complexity: &str) -> Rank {
    classify(leading_token(time_complexity)).map_or(Rank::Unknown, Rank::Known)
}

/// Which of the given time complexities are optimal: every entry whose rank
/// equals the minimum. Ties all win; space complexity is not consulted.
pub fn optimal_mask<S: AsRef<str>>(time_complexities: &[S]) -> Vec<bool> {
    let ranks: Vec<Rank> = time_complexities.iter().map(|t| rank(t.as_ref())).collect();
    match ranks.iter().min() {
        Some(best) => ranks.iter().map(|r| r == best).collect(),
        None => Vec::new(),
    }
}

/// Sets `is_optimal` on every solution of one item.
pub fn mark_optimal(solutions: &mut [Solution]) {
    let times: Vec<&str> = solutions.iter().map(|s| s.time_complexity.as_str()).collect();
    let mask = optimal_mask(&times);
    for (solution, optimal) in solutions.iter_mut().zip(mask) {
        solution.is_optimal = optimal;
    }
}
