use serde::Serialize;

/// Output for extract command
#[derive(Debug, Serialize)]
pub struct ExtractOutput {
    pub bbox_centroid: Option<String>,
    pub regions: Vec<RegionOutput>,
}

/// One irreducible filter region
#[derive(Debug, Serialize)]
pub struct RegionOutput {
    pub attribute: String,
    pub clauses: usize,
    pub offset: usize,
    pub centroid: String,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub crs: ConfigValue,
    pub conjunction: ConfigValue,
    pub geometry_validity: ConfigValue,
    pub filter_keys: ConfigValue,
}

#[derive(Debug, Serialize)]
pub struct ConfigValue {
    pub value: String,
    pub source: String,
}

/// Output for crs command
#[derive(Debug, Serialize)]
pub struct CrsOutput {
    pub crs: Vec<String>,
}
