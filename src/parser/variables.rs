//! Variable declarations in the code following a pattern block.
//!
//! Recognizes CSS custom properties (`--name`), Sass variables (`$name`) and
//! Less variables (`@name`), each terminated by `;` and optionally followed
//! by a same-line `/* comment */` or `// comment`.

use crate::model::Variable;
use regex::Regex;
use std::sync::LazyLock;

static RE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?:^|[[:space:]{;])",
        r"(--[A-Za-z0-9_-]+|\$[A-Za-z0-9_-]+|@[A-Za-z0-9_-]+)",
        r"[[:blank:]]*:[[:blank:]]*([^;{}]+?)[[:blank:]]*;",
        r"(?:[[:blank:]]*(?:/\*[[:blank:]]*(.*?)[[:blank:]]*\*/|//[[:blank:]]*(.*)))?",
    ))
    .unwrap()
});

/// Collect declarations from `code`, in source order.
pub fn parse(code: &str) -> Vec<Variable> {
    code.lines()
        .flat_map(|line| RE_DECLARATION.captures_iter(line))
        .map(|caps| {
            let comment = caps
                .get(3)
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().trim().to_string())
                .filter(|c| !c.is_empty());
            Variable {
                name: caps[1].to_string(),
                value: caps[2].trim().to_string(),
                comment,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_properties_with_comments() {
        let code = ":root {\n    --brand-red: #703030; /* Headlines */\n    --brand-grey: #2F343B; /* Links */\n    --accent-red: #C77966;\n}";
        let vars = parse(code);
        assert_eq!(vars.len(), 3);
        assert_eq!(vars[0].name, "--brand-red");
        assert_eq!(vars[0].value, "#703030");
        assert_eq!(vars[0].comment.as_deref(), Some("Headlines"));
        assert_eq!(vars[1].comment.as_deref(), Some("Links"));
        assert_eq!(vars[2].name, "--accent-red");
        assert_eq!(vars[2].comment, None);
    }

    #[test]
    fn sass_and_less_variables() {
        let vars = parse("$spacing-unit: 8px; // base grid\n@font-stack: Helvetica, sans-serif;\n");
        assert_eq!(vars[0].name, "$spacing-unit");
        assert_eq!(vars[0].value, "8px");
        assert_eq!(vars[0].comment.as_deref(), Some("base grid"));
        assert_eq!(vars[1].name, "@font-stack");
        assert_eq!(vars[1].value, "Helvetica, sans-serif");
    }

    #[test]
    fn single_line_root() {
        let vars = parse(":root { --a: 1px; --b: 2px; }");
        let names: Vec<_> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["--a", "--b"]);
    }

    #[test]
    fn ordinary_properties_are_ignored() {
        assert!(parse(".btn { color: red; padding: 0 var(--gap); }").is_empty());
        assert!(parse("@media (min-width: 40em) { a { b: c; } }").is_empty());
        assert!(parse("@import 'base';").is_empty());
    }
}
