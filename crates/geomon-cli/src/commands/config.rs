//! Config command implementation

use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::{ConfigOutput, ConfigValue};
use anyhow::Result;
use std::path::Path;
use tabled::Tabled;

pub fn execute(config_path: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_config(config_path)?;
    let inspection_map = config.to_inspection_map();

    if output.is_json() {
        let entry = |key: &str| {
            inspection_map
                .get(key)
                .map(|(value, source)| ConfigValue {
                    value: value.clone(),
                    source: format!("{:?}", source),
                })
                .unwrap_or_else(|| ConfigValue {
                    value: String::new(),
                    source: "Default".to_string(),
                })
        };

        output.result(ConfigOutput {
            crs: entry("crs"),
            conjunction: entry("conjunction"),
            geometry_validity: entry("geometry_validity"),
            filter_keys: entry("filter_keys"),
        })?;
    } else {
        output.section("Configuration Values");

        #[derive(Tabled)]
        struct ConfigRow {
            #[tabled(rename = "Key")]
            key: String,
            #[tabled(rename = "Value")]
            value: String,
            #[tabled(rename = "Source")]
            source: String,
        }

        let mut rows: Vec<ConfigRow> = inspection_map
            .into_iter()
            .map(|(key, (value, source))| ConfigRow {
                key,
                value,
                source: format!("{:?}", source),
            })
            .collect();

        rows.sort_by(|a, b| a.key.cmp(&b.key));

        output.table(rows);

        output.section("Configuration Precedence");
        output.info("CLI arguments > Environment variables > Config file > Defaults");
    }

    Ok(())
}
