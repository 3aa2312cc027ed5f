use crate::domain::model::{PropertyValue, Resource};
use crate::utils::error::Result;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

pub fn write_resources<W: Write>(resources: &[Resource], format: OutputFormat, writer: W) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(resources, writer),
        OutputFormat::Csv => write_csv(resources, writer),
    }
}

pub fn write_json<W: Write>(resources: &[Resource], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, resources)?;
    writeln!(writer)?;
    Ok(())
}

/// One row per resource. Columns are `@id` followed by every property key in
/// first-seen order; nested resources are written as their URI and
/// multi-valued properties joined with `; `.
pub fn write_csv<W: Write>(resources: &[Resource], writer: W) -> Result<()> {
    let mut columns: IndexSet<&str> = IndexSet::new();
    for resource in resources {
        columns.extend(resource.properties().map(|(key, _)| key));
    }

    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["@id"];
    header.extend(columns.iter().copied());
    csv.write_record(&header)?;

    for resource in resources {
        let mut row = vec![resource.uri().to_string()];
        row.extend(
            columns
                .iter()
                .map(|key| resource.get(key).map(cell).unwrap_or_default()),
        );
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

fn cell(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Literal(s) | PropertyValue::Reference(s) => s.clone(),
        PropertyValue::Resource(nested) => nested.uri().to_string(),
        PropertyValue::List(items) => items.iter().map(cell).collect::<Vec<_>>().join("; "),
    }
}
