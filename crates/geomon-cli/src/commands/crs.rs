//! CRS command implementation

use crate::cli::{split_codes, CrsArgs};
use crate::output::OutputWriter;
use crate::output_types::CrsOutput;
use anyhow::Result;
use geomon_core::crs::{coverage_crs_list, service_crs_list};
use tabled::Tabled;

pub fn execute(args: CrsArgs, output: &OutputWriter) -> Result<()> {
    let configured = args.service_srs.as_deref().map(split_codes).unwrap_or_default();
    let supported = split_codes(&args.supported);
    let service_default = service_crs_list(&configured, &supported);

    let response_srs = args.response_srs.as_deref().map(split_codes);
    let crs = coverage_crs_list(response_srs.as_deref(), service_default);

    if output.is_json() {
        output.result(CrsOutput { crs })?;
    } else {
        output.section("Advertised CRS");

        #[derive(Tabled)]
        struct CrsRow {
            #[tabled(rename = "#")]
            index: usize,
            #[tabled(rename = "URI")]
            uri: String,
        }

        let rows: Vec<CrsRow> =
            crs.into_iter().enumerate().map(|(i, uri)| CrsRow { index: i + 1, uri }).collect();
        output.table(rows);
    }

    Ok(())
}
