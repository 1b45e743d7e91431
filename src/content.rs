use serde::Deserialize;
use tracing::debug;

use crate::complexity;
use crate::error::ItemError;
use crate::heuristics;
use crate::parser::{ExportKind, ParsedModule};
use crate::reader::SourceFile;
use crate::{ContentItem, Example, ItemMetadata, Solution, SolutionType};

/// An entry of an authored `solutions` export. Anything left out is filled
/// from the naming heuristic.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolutionSpec {
    name: String,
    tab_name: Option<String>,
    approach: Option<String>,
    time_complexity: Option<String>,
    space_complexity: Option<String>,
    is_optimal: Option<bool>,
    #[serde(rename = "type")]
    kind: Option<SolutionType>,
}

/// Flattens one source module into a `ContentItem`.
pub fn build_item(file: &SourceFile) -> Result<ContentItem, ItemError> {
    let module = ParsedModule::parse(&file.text);

    let metadata = module
        .literal("metadata")
        .ok_or(ItemError::MissingExport("metadata"))?;
    let examples = module
        .literal("examples")
        .ok_or(ItemError::MissingExport("examples"))?;

    let metadata: ItemMetadata = serde_json::from_value(metadata).map_err(|source| {
        ItemError::InvalidField {
            field: "metadata",
            source,
        }
    })?;
    let examples: Vec<Example> = serde_json::from_value(examples).map_err(|source| {
        ItemError::InvalidField {
            field: "examples",
            source,
        }
    })?;

    let functions = module.function_names();
    let solutions = match module.literal("solutions") {
        Some(raw) => {
            let specs: Vec<SolutionSpec> = serde_json::from_value(raw).map_err(|source| {
                ItemError::InvalidField {
                    field: "solutions",
                    source,
                }
            })?;
            explicit_solutions(&module, specs)
        }
        None => inferred_solutions(&module, &functions),
    };

    Ok(ContentItem {
        name: file.name.clone(),
        slug: file.name.clone(),
        metadata,
        examples,
        code: file.text.clone(),
        functions,
        solutions,
    })
}

fn extract_logged(module: &ParsedModule<'_>, name: &str) -> String {
    let code = module.extract(name);
    if code.is_empty() {
        debug!("no export found for solution `{}`; using empty code", name);
    }
    code
}

fn explicit_solutions(module: &ParsedModule<'_>, specs: Vec<SolutionSpec>) -> Vec<Solution> {
    let declared = specs.iter().any(|s| s.is_optimal.is_some());

    let mut solutions: Vec<Solution> = specs
        .into_iter()
        .map(|spec| {
            let guess = heuristics::infer(&spec.name);
            let code = extract_logged(module, &spec.name);
            let is_class = module
                .find(&spec.name)
                .map_or(false, |d| d.kind == ExportKind::Class);
            let kind = spec.kind.unwrap_or(if is_class {
                SolutionType::Class
            } else {
                SolutionType::Function
            });
            Solution {
                tab_name: spec.tab_name.unwrap_or_else(|| spec.name.clone()),
                code,
                approach: spec.approach.unwrap_or_else(|| guess.approach.to_string()),
                time_complexity: spec.time_complexity.unwrap_or_else(|| guess.time.to_string()),
                space_complexity: spec.space_complexity.unwrap_or_else(|| guess.space.to_string()),
                is_optimal: spec.is_optimal.unwrap_or(false),
                kind: Some(kind),
                name: spec.name,
            }
        })
        .collect();

    if !declared {
        complexity::mark_optimal(&mut solutions);
    }
    solutions
}

fn inferred_solutions(module: &ParsedModule<'_>, functions: &[String]) -> Vec<Solution> {
    let mut solutions: Vec<Solution> = functions
        .iter()
        .map(|name| {
            let guess = heuristics::infer(name);
            Solution {
                name: name.clone(),
                tab_name: name.clone(),
                code: extract_logged(module, name),
                approach: guess.approach.to_string(),
                time_complexity: guess.time.to_string(),
                space_complexity: guess.space.to_string(),
                is_optimal: false,
                kind: None,
            }
        })
        .collect();
    complexity::mark_optimal(&mut solutions);
    solutions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Difficulty;
    use serde_json::json;
    use std::path::PathBuf;

    fn file(name: &str, text: &str) -> SourceFile {
        SourceFile {
            name: name.to_string(),
            path: PathBuf::from(format!("{}.ts", name)),
            text: text.to_string(),
        }
    }

    const TWO_SUM: &str = r#"
export const metadata = {
  title: 'Two Sum',
  description: 'Find two indices that add up to a target.',
  concepts: ['arrays', 'hash map'],
  timeComplexity: 'O(n)',
  spaceComplexity: 'O(n)',
  difficulty: 'Easy',
};

export const examples = [
  { input: [[2, 7, 11, 15], 9], output: [0, 1], description: 'first pair' },
  { input: [[], 1], output: new Error('no solution'), description: 'empty input' },
];

export function twoSumBruteForce(nums: number[], target: number): number[] {
  for (let i = 0; i < nums.length; i++)
    for (let j = i + 1; j < nums.length; j++)
      if (nums[i] + nums[j] === target) return [i, j];
  throw new Error('no solution');
}

export function twoSumHashMap(nums: number[], target: number): number[] {
  const seen = new Map<number, number>();
  for (let i = 0; i < nums.length; i++) {
    const j = seen.get(target - nums[i]);
    if (j !== undefined) return [j, i];
    seen.set(nums[i], i);
  }
  throw new Error('no solution');
}
"#;

    #[test]
    fn infers_solutions_from_function_names() {
        let item = build_item(&file("two-sum", TWO_SUM)).unwrap();
        assert_eq!(item.slug, "two-sum");
        assert_eq!(item.metadata.difficulty, Some(Difficulty::Easy));
        assert_eq!(item.functions, vec!["twoSumBruteForce", "twoSumHashMap"]);
        assert_eq!(item.examples[1].output, json!({"error": "no solution"}));
        assert_eq!(item.code, TWO_SUM);

        let brute = &item.solutions[0];
        assert_eq!(brute.approach, "Brute Force");
        assert_eq!(brute.time_complexity, "O(n²)");
        assert!(!brute.is_optimal);
        assert!(brute.code.starts_with("export function twoSumBruteForce"));
        assert_eq!(brute.kind, None);

        let hash = &item.solutions[1];
        assert_eq!(hash.approach, "Hash Map");
        assert!(hash.is_optimal);
        assert!(hash.code.ends_with("throw new Error('no solution');\n}"));
    }

    #[test]
    fn explicit_solutions_without_flags_are_ranked() {
        let src = r#"
export const metadata = { title: 'Factorial', description: 'n!' };
export const examples = [{ input: 5, output: 120 }];
export const solutions = [
  { name: 'factorial', tabName: 'Recursive', approach: 'Recursion', timeComplexity: 'O(n)', spaceComplexity: 'O(n)' },
  { name: 'factorialIterative', tabName: 'Loop', timeComplexity: 'O(n)', spaceComplexity: 'O(1)' },
  { name: 'factorialMissing', timeComplexity: 'O(n!)' },
];
export function factorial(n: number): number { return n <= 1 ? 1 : n * factorial(n - 1); }
export function factorialIterative(n: number): number { let r = 1; for (let i = 2; i <= n; i++) r *= i; return r; }
"#;
        let item = build_item(&file("factorial", src)).unwrap();
        let flags: Vec<_> = item.solutions.iter().map(|s| s.is_optimal).collect();
        assert_eq!(flags, vec![true, true, false]);
        assert_eq!(item.solutions[1].approach, "Iterative");
        assert_eq!(item.solutions[1].tab_name, "Loop");
        assert_eq!(item.solutions[2].code, "");
        assert_eq!(item.solutions[2].tab_name, "factorialMissing");
        assert_eq!(item.solutions[0].kind, Some(SolutionType::Function));
    }

    #[test]
    fn declared_flags_win_over_ranking() {
        let src = r#"
export const metadata = { title: 'LRU', description: 'cache' };
export const examples = [];
export const solutions = [
  { name: 'LRUCache', timeComplexity: 'O(1)', isOptimal: false },
  { name: 'lruWithArray', timeComplexity: 'O(n)', isOptimal: true },
  { name: 'lruNaive', timeComplexity: 'O(n)' },
];
export class LRUCache { get(k: number) { return k; } }
export const lruWithArray = (cap: number) => [];
"#;
        let item = build_item(&file("lru", src)).unwrap();
        let flags: Vec<_> = item.solutions.iter().map(|s| s.is_optimal).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert_eq!(item.solutions[0].kind, Some(SolutionType::Class));
        assert!(item.solutions[0].code.starts_with("export class LRUCache"));
        assert_eq!(item.functions, vec!["lruWithArray"]);
    }

    #[test]
    fn missing_exports_are_item_errors() {
        let no_meta = "export const examples = [];\nexport function f() {}";
        assert!(matches!(
            build_item(&file("a", no_meta)),
            Err(ItemError::MissingExport("metadata"))
        ));

        let no_examples = "export const metadata = { title: 't', description: 'd' };";
        assert!(matches!(
            build_item(&file("b", no_examples)),
            Err(ItemError::MissingExport("examples"))
        ));

        let bad_meta = "export const metadata = { description: 'no title' };\nexport const examples = [];";
        assert!(matches!(
            build_item(&file("c", bad_meta)),
            Err(ItemError::InvalidField { field: "metadata", .. })
        ));
    }

    #[test]
    fn unclosed_examples_array_still_builds() {
        let src = "export const metadata = { title: 't', description: 'd' };\n\
                   export function half(n: number) { return n / 2; }\n\
                   export const examples = [{ input: 4, output: 2, description: 'one' };";
        let item = build_item(&file("half", src)).unwrap();
        assert_eq!(item.examples.len(), 1);
        assert_eq!(item.examples[0].output, json!(2));
        assert_eq!(item.functions, vec!["half"]);

        let bare = "export const metadata = { title: 't', description: 'd' };\nexport const examples = [1, 2;";
        assert!(matches!(
            build_item(&file("bare", bare)),
            Err(ItemError::InvalidField { field: "examples", .. })
        ));
    }

    #[test]
    fn difficulty_is_written_lowercase() {
        let item = build_item(&file("two-sum", TWO_SUM)).unwrap();
        let json = serde_json::to_value(&item.metadata).unwrap();
        assert_eq!(json["difficulty"], "easy");
    }

    #[test]
    fn module_without_functions_has_no_solutions() {
        let src = "export const metadata = { title: 't', description: 'd', difficulty: 'legendary' };\nexport const examples = [];";
        let item = build_item(&file("plain", src)).unwrap();
        assert!(item.solutions.is_empty());
        assert!(item.functions.is_empty());
        assert_eq!(item.metadata.difficulty, None);
    }
}
