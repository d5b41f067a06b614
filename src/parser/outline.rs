//! Expansion of scenario outlines over their examples.

use itertools::Itertools as _;
use lazy_regex::regex;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{data_table::Table, error::ParseError, feature::Scenario};

/// `Examples:` block of a scenario outline.
#[derive(Clone, Debug)]
pub(crate) struct Examples {
    /// Tags written above the block.
    pub(crate) tags: Vec<String>,

    /// Header and values.
    pub(crate) table: Table,

    /// 1-based lines of the data rows.
    pub(crate) lines: Vec<usize>,
}

/// Expands the `outline` into one [`Scenario`] per data row of its
/// `examples`, replacing `<name>` placeholders in the scenario name, step
/// texts and step tables.
///
/// An outline without examples is returned as is.
///
/// # Errors
///
/// With [`ParseError::UnknownPlaceholder`] if a placeholder names no column
/// of the examples.
pub(crate) fn expand(
    outline: Scenario,
    examples: &[Examples],
) -> Result<Vec<Scenario>, ParseError> {
    if examples.is_empty() {
        return Ok(vec![outline]);
    }

    examples
        .iter()
        .flat_map(|ex| {
            ex.table
                .rows()
                .zip(&ex.lines)
                .map(move |(row, &line)| (ex, row, line))
        })
        .map(|(ex, row, line)| -> Result<Scenario, ParseError> {
            let substitute = |text: &str| {
                replace_placeholders(text, |name| row.get(name)).map_err(
                    |placeholder| ParseError::UnknownPlaceholder {
                        scenario: outline.name.clone(),
                        placeholder,
                        line,
                    },
                )
            };

            let mut expanded = outline.clone();
            expanded.name = substitute(&outline.name)?;
            expanded.line = line;
            expanded.tags = outline
                .tags
                .iter()
                .chain(&ex.tags)
                .unique()
                .cloned()
                .collect();
            for step in &mut expanded.steps {
                step.value = substitute(&step.value)?;
                step.table = step
                    .table
                    .as_ref()
                    .map(|t| t.map_cells(substitute))
                    .transpose()?;
            }
            Ok(expanded)
        })
        .collect()
}

/// Replaces every `<name>` in the `text` with its `lookup`ed value.
///
/// Returns the name of the first placeholder the `lookup` doesn't know.
fn replace_placeholders<'v>(
    text: &str,
    lookup: impl Fn(&str) -> Option<&'v str>,
) -> Result<String, String> {
    static TEMPLATE_REGEX: &Lazy<Regex> = regex!(r"<([^>\s]+)>");

    let mut unknown = None;
    let replaced = TEMPLATE_REGEX.replace_all(text, |cap: &regex::Captures<'_>| {
        let name = cap.get(1).map_or("", |m| m.as_str());
        lookup(name).unwrap_or_else(|| {
            _ = unknown.get_or_insert_with(|| name.to_owned());
            ""
        })
    });

    match unknown {
        Some(name) => Err(name),
        None => Ok(replaced.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use crate::{feature::Step, StepType};

    use super::*;

    fn outline() -> Scenario {
        Scenario {
            name: "eating <eat>".into(),
            tags: vec!["outline".into()],
            feature_tags: vec![],
            steps: vec![
                Step {
                    keyword: "Given".into(),
                    ty: StepType::Given,
                    value: "there are <start> cucumbers".into(),
                    table: None,
                    line: 3,
                },
                Step {
                    keyword: "Then".into(),
                    ty: StepType::Then,
                    value: "I should have them left".into(),
                    table: Some(
                        Table::try_from(vec![vec!["left"], vec!["<left>"]])
                            .unwrap(),
                    ),
                    line: 4,
                },
            ],
            description: String::new(),
            source: "test".into(),
            line: 2,
            action: None,
        }
    }

    fn examples(tags: &[&str]) -> Examples {
        Examples {
            tags: tags.iter().map(|&t| t.to_owned()).collect(),
            table: Table::try_from(vec![
                vec!["start", "eat", "left"],
                vec!["12", "5", "7"],
                vec!["20", "4", "16"],
            ])
            .unwrap(),
            lines: vec![9, 10],
        }
    }

    #[test]
    fn one_scenario_per_row() {
        let expanded =
            expand(outline(), &[examples(&["fast", "outline"])]).unwrap();

        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].name, "eating 5");
        assert_eq!(expanded[1].name, "eating 4");
        assert_eq!(expanded[0].steps[0].value, "there are 12 cucumbers");
        assert_eq!(expanded[1].steps[0].value, "there are 20 cucumbers");
        assert_eq!(
            expanded[1].steps[1].table.as_ref().unwrap().raw(),
            [["left"], ["16"]],
        );
        assert_eq!(expanded[0].line, 9);
        assert_eq!(expanded[0].tags, ["outline", "fast"]);
    }

    #[test]
    fn without_examples_stays_single() {
        let expanded = expand(outline(), &[]).unwrap();

        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].name, "eating <eat>");
    }

    #[test]
    fn unknown_placeholder() {
        let mut ex = examples(&[]);
        ex.table = Table::try_from(vec![vec!["start"], vec!["1"]]).unwrap();
        ex.lines = vec![12];

        assert_eq!(
            expand(outline(), &[ex]).unwrap_err(),
            ParseError::UnknownPlaceholder {
                scenario: "eating <eat>".into(),
                placeholder: "eat".into(),
                line: 12,
            },
        );
    }
}
