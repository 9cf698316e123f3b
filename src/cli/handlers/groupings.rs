use colored::Colorize;
use serde_json::json;

use crate::cli::output::{output_json, print_header, print_hint, print_table, OutputMode};
use crate::grouping::{GroupingRegistry, GroupingScheme, GroupingTable};
use crate::models::category::Category;
use crate::models::label::RawLabel;

pub fn handle_groupings(
    registry: &GroupingRegistry,
    default_grouping: &str,
    name: Option<&str>,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match name {
        Some(name) => {
            let scheme = registry.get(name)?;
            match mode {
                OutputMode::Json => output_json(&scheme_json(&scheme)),
                OutputMode::Human => print_scheme(&scheme),
            }
        }
        None => match mode {
            OutputMode::Json => {
                let schemes: Vec<_> = registry
                    .iter()
                    .map(|scheme| {
                        json!({
                            "name": scheme.name(),
                            "default": scheme.name() == default_grouping,
                            "emotions": scheme.emotions().len(),
                            "sentiments": scheme.sentiments().len(),
                        })
                    })
                    .collect();
                output_json(&schemes);
            }
            OutputMode::Human => {
                let rows = registry
                    .iter()
                    .map(|scheme| {
                        let name = if scheme.name() == default_grouping {
                            format!("{} {}", scheme.name(), "(default)".green())
                        } else {
                            scheme.name().to_string()
                        };
                        vec![
                            name,
                            scheme.emotions().len().to_string(),
                            scheme.sentiments().len().to_string(),
                        ]
                    })
                    .collect();
                print_table(&["Name", "Emotions", "Sentiments"], rows);
            }
        },
    }

    Ok(())
}

fn table_json<C: Category>(table: &GroupingTable<C>) -> serde_json::Value {
    table
        .groups()
        .iter()
        .map(|group| {
            json!({
                "category": group.category,
                "labels": group.labels,
            })
        })
        .collect()
}

fn scheme_json(scheme: &GroupingScheme) -> serde_json::Value {
    json!({
        "name": scheme.name(),
        "emotions": table_json(scheme.emotions()),
        "sentiments": table_json(scheme.sentiments()),
    })
}

fn table_rows<C: Category>(table: &GroupingTable<C>) -> Vec<Vec<String>> {
    table
        .groups()
        .iter()
        .map(|group| {
            let labels: Vec<&str> = group.labels.iter().map(|l| l.as_str()).collect();
            vec![group.category.to_string(), labels.join(", ")]
        })
        .collect()
}

fn print_scheme(scheme: &GroupingScheme) {
    print_header(&format!("Grouping '{}': emotions", scheme.name()));
    print_table(&["Category", "Labels"], table_rows(scheme.emotions()));

    print_header(&format!("Grouping '{}': sentiments", scheme.name()));
    print_table(&["Category", "Labels"], table_rows(scheme.sentiments()));

    let ungrouped: Vec<&str> = RawLabel::ALL
        .iter()
        .filter(|label| !scheme.sentiments().contains_label(**label))
        .map(|label| label.as_str())
        .collect();
    if !ungrouped.is_empty() {
        print_hint(&format!(
            "Labels without a sentiment: {}",
            ungrouped.join(", ")
        ));
    }
}
