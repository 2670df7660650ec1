//! CRS URI lists advertised for coverage collections
//!
//! Codes are configured as bare EPSG numbers (or `EPSG:n` when typed by hand)
//! and published as OGC URIs, with CRS84 always first.

/// Prefix turning an EPSG code into its OGC URI
pub const CRS_PREFIX: &str = "http://www.opengis.net/def/crs/EPSG/0/";

/// The default CRS of the OGC APIs
pub const DEFAULT_CRS: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// Build the CRS list a service advertises.
///
/// `configured` holds the codes set on the service; when it is empty the
/// `supported` code database is consulted instead, keeping only the purely
/// numeric codes.
pub fn service_crs_list<S: AsRef<str>>(configured: &[S], supported: &[S]) -> Vec<String> {
    let mut result: Vec<String> = if configured.is_empty() {
        supported
            .iter()
            .map(|code| code.as_ref())
            .filter(|code| is_numeric_code(code))
            .map(|code| format!("{}{}", CRS_PREFIX, code))
            .collect()
    } else {
        configured.iter().map(|code| format!("{}{}", CRS_PREFIX, code.as_ref())).collect()
    };

    result.insert(0, DEFAULT_CRS.to_string());
    result
}

/// Build the CRS list of a single coverage.
///
/// Coverages declaring their own response SRS get those (with CRS84 moved to
/// the front); everything else inherits `default`.
pub fn coverage_crs_list<S: AsRef<str>>(
    response_srs: Option<&[S]>,
    default: Vec<String>,
) -> Vec<String> {
    match response_srs {
        Some(codes) => {
            let mut result: Vec<String> = codes
                .iter()
                .map(|code| code.as_ref())
                .map(|code| code.strip_prefix("EPSG:").unwrap_or(code))
                .map(|code| format!("{}{}", CRS_PREFIX, code))
                .collect();
            if let Some(i) = result.iter().position(|uri| uri == DEFAULT_CRS) {
                result.remove(i);
            }
            result.insert(0, DEFAULT_CRS.to_string());
            result
        }
        None => default,
    }
}

fn is_numeric_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_list_from_configuration() {
        let list = service_crs_list(&["4326", "3857"], &[]);
        assert_eq!(
            list,
            vec![
                DEFAULT_CRS.to_string(),
                format!("{}4326", CRS_PREFIX),
                format!("{}3857", CRS_PREFIX),
            ]
        );
    }

    #[test]
    fn test_service_list_falls_back_to_numeric_supported_codes() {
        let supported = ["4326", "WGS84(DD)", "32748", "AUTO:42001"];
        let list = service_crs_list(&[], &supported);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], DEFAULT_CRS);
        assert_eq!(list[1], format!("{}4326", CRS_PREFIX));
        assert_eq!(list[2], format!("{}32748", CRS_PREFIX));
    }

    #[test]
    fn test_coverage_list_strips_epsg_prefix() {
        let srs = ["EPSG:3857", "2154"];
        let list = coverage_crs_list(Some(&srs[..]), vec![]);
        assert_eq!(
            list,
            vec![
                DEFAULT_CRS.to_string(),
                format!("{}3857", CRS_PREFIX),
                format!("{}2154", CRS_PREFIX),
            ]
        );
    }

    #[test]
    fn test_coverage_list_keeps_repeated_codes() {
        let srs = ["4326", "EPSG:4326"];
        let list = coverage_crs_list(Some(&srs[..]), vec![]);
        assert_eq!(
            list,
            vec![
                DEFAULT_CRS.to_string(),
                format!("{}4326", CRS_PREFIX),
                format!("{}4326", CRS_PREFIX),
            ]
        );
    }

    #[test]
    fn test_coverage_list_inherits_default() {
        let default = service_crs_list(&["4326"], &[]);
        let list = coverage_crs_list::<&str>(None, default.clone());
        assert_eq!(list, default);
    }
}
