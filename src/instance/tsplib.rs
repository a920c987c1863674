//! TSPLIB reader for explicit full-matrix instances.
//!
//! Supports the subset of the TSPLIB95 format used by the ATSP library:
//!
//! ```text
//! NAME: br17
//! TYPE: ATSP
//! DIMENSION: 17
//! EDGE_WEIGHT_TYPE: EXPLICIT
//! EDGE_WEIGHT_FORMAT: FULL_MATRIX
//! EDGE_WEIGHT_SECTION
//!  9999 3 5 48 ...
//! EOF
//! ```
//!
//! Weights may be spread over any number of lines. Diagonal entries are
//! replaced with the instance sentinel, whatever the file stores there.

use super::Instance;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading a TSPLIB file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read instance: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed header line '{0}'")]
    MalformedHeader(String),
    #[error("missing DIMENSION in header")]
    MissingDimension,
    #[error("cannot parse {key}: '{value}'")]
    InvalidValue { key: String, value: String },
    #[error("unsupported {key}: '{value}'")]
    Unsupported { key: String, value: String },
    #[error("missing EDGE_WEIGHT_SECTION")]
    MissingWeightSection,
    #[error("cannot parse edge weight '{0}'")]
    InvalidWeight(String),
    #[error("expected {expected} edge weights, found {found}")]
    MissingWeights { expected: usize, found: usize },
}

/// Upper bound on the weight buffer reserved from the DIMENSION header.
const MAX_PREALLOCATED_WEIGHTS: usize = 1 << 16;

/// Header fields collected before the weight section.
#[derive(Debug, Default)]
struct Header {
    name: Option<String>,
    dimension: Option<usize>,
}

/// Reads an instance from a TSPLIB file on disk.
pub fn load_tsplib<P: AsRef<Path>>(path: P) -> Result<Instance, LoadError> {
    let file = File::open(path)?;
    read_tsplib(BufReader::new(file))
}

/// Parses an instance from TSPLIB text.
pub fn parse_tsplib(text: &str) -> Result<Instance, LoadError> {
    read_tsplib(text.as_bytes())
}

/// Reads an instance from any buffered TSPLIB source.
pub fn read_tsplib<R: BufRead>(reader: R) -> Result<Instance, LoadError> {
    let mut lines = reader.lines();
    let mut header = Header::default();
    let mut in_weights = false;

    for line in lines.by_ref() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "EDGE_WEIGHT_SECTION" {
            in_weights = true;
            break;
        }
        if line == "EOF" {
            break;
        }
        read_header_line(line, &mut header)?;
    }

    let dimension = header.dimension.ok_or(LoadError::MissingDimension)?;
    if !in_weights {
        return Err(LoadError::MissingWeightSection);
    }

    let expected = dimension
        .checked_mul(dimension)
        .ok_or_else(|| LoadError::InvalidValue {
            key: "DIMENSION".to_string(),
            value: dimension.to_string(),
        })?;
    // The header is untrusted; grow past this only as weights actually arrive.
    let mut costs = Vec::with_capacity(expected.min(MAX_PREALLOCATED_WEIGHTS));

    'weights: for line in lines {
        let line = line?;
        for token in line.split_whitespace() {
            if token == "EOF" {
                break 'weights;
            }
            if costs.len() == expected {
                break 'weights;
            }
            let weight = token
                .parse::<u64>()
                .map_err(|_| LoadError::InvalidWeight(token.to_string()))?;
            costs.push(weight);
        }
    }

    if costs.len() < expected {
        return Err(LoadError::MissingWeights {
            expected,
            found: costs.len(),
        });
    }

    tracing::debug!(
        name = header.name.as_deref().unwrap_or("unnamed"),
        dimension,
        "tsplib instance loaded"
    );

    Ok(Instance::from_row_major(dimension, costs))
}

fn read_header_line(line: &str, header: &mut Header) -> Result<(), LoadError> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| LoadError::MalformedHeader(line.to_string()))?;
    let key = key.trim();
    let value = value.trim();

    match key {
        "NAME" => header.name = Some(value.to_string()),
        "TYPE" => {
            if value != "ATSP" && value != "TSP" {
                return Err(unsupported(key, value));
            }
        }
        "DIMENSION" => {
            let dimension = value.parse::<usize>().ok().filter(|&d| d > 0).ok_or_else(|| {
                LoadError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            })?;
            header.dimension = Some(dimension);
        }
        "EDGE_WEIGHT_TYPE" => {
            if value != "EXPLICIT" {
                return Err(unsupported(key, value));
            }
        }
        "EDGE_WEIGHT_FORMAT" => {
            if value != "FULL_MATRIX" {
                return Err(unsupported(key, value));
            }
        }
        _ => {}
    }

    Ok(())
}

fn unsupported(key: &str, value: &str) -> LoadError {
    LoadError::Unsupported {
        key: key.to_string(),
        value: value.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::INFINITE_COST;

    const RING5: &str = "NAME: ring5
TYPE: ATSP
COMMENT: five nodes, cheap neighbours two steps apart
DIMENSION: 5
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: FULL_MATRIX
EDGE_WEIGHT_SECTION
 0 100 3 3 100
 100 0 100 3 3
 3 100 0 100 3
 3 3 100 0 100
 100 3 3 100 0
EOF
";

    #[test]
    fn test_reads_full_matrix() {
        let instance = parse_tsplib(RING5).unwrap();
        assert_eq!(instance.size(), 5);
        assert_eq!(instance.edge_cost(0, 2), 3);
        assert_eq!(instance.edge_cost(4, 0), 100);
        assert_eq!(instance.edge_cost(3, 3), INFINITE_COST);
        assert_eq!(instance.tour_cost(&[0, 2, 4, 1, 3]), 15);
    }

    #[test]
    fn test_weights_across_irregular_lines() {
        let text = "TYPE : ATSP\nDIMENSION : 3\nEDGE_WEIGHT_SECTION\n0 1 2 3\n0 5\n6 7 0\n";
        let instance = parse_tsplib(text).unwrap();
        assert_eq!(instance.edge_cost(0, 1), 1);
        assert_eq!(instance.edge_cost(1, 0), 3);
        assert_eq!(instance.edge_cost(1, 2), 5);
        assert_eq!(instance.edge_cost(2, 1), 7);
    }

    #[test]
    fn test_missing_dimension() {
        let text = "TYPE: ATSP\nEDGE_WEIGHT_SECTION\n0 1\n1 0\n";
        assert!(matches!(
            parse_tsplib(text),
            Err(LoadError::MissingDimension)
        ));
    }

    #[test]
    fn test_invalid_dimension() {
        let text = "DIMENSION: zero\nEDGE_WEIGHT_SECTION\n";
        assert!(matches!(
            parse_tsplib(text),
            Err(LoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_oversized_dimension() {
        let text = "TYPE: ATSP\nDIMENSION: 5000000000\nEDGE_WEIGHT_SECTION\n1 2\nEOF\n";
        match parse_tsplib(text) {
            Err(LoadError::InvalidValue { key, .. }) => assert_eq!(key, "DIMENSION"),
            other => panic!("expected invalid dimension, got {other:?}"),
        }
    }

    #[test]
    fn test_large_dimension_with_few_weights() {
        let text = "DIMENSION: 100000\nEDGE_WEIGHT_SECTION\n0 1 2\nEOF\n";
        match parse_tsplib(text) {
            Err(LoadError::MissingWeights { expected, found }) => {
                assert_eq!(expected, 10_000_000_000);
                assert_eq!(found, 3);
            }
            other => panic!("expected missing weights, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_format() {
        let text = "DIMENSION: 3\nEDGE_WEIGHT_FORMAT: UPPER_ROW\nEDGE_WEIGHT_SECTION\n1 2 3\n";
        match parse_tsplib(text) {
            Err(LoadError::Unsupported { key, value }) => {
                assert_eq!(key, "EDGE_WEIGHT_FORMAT");
                assert_eq!(value, "UPPER_ROW");
            }
            other => panic!("expected unsupported format, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_type() {
        let text = "TYPE: CVRP\nDIMENSION: 2\n";
        assert!(matches!(
            parse_tsplib(text),
            Err(LoadError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_truncated_weights() {
        let text = "DIMENSION: 2\nEDGE_WEIGHT_SECTION\n0 1 2\nEOF\n";
        match parse_tsplib(text) {
            Err(LoadError::MissingWeights { expected, found }) => {
                assert_eq!(expected, 4);
                assert_eq!(found, 3);
            }
            other => panic!("expected missing weights, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_weight_token() {
        let text = "DIMENSION: 2\nEDGE_WEIGHT_SECTION\n0 x 2 0\n";
        assert!(matches!(
            parse_tsplib(text),
            Err(LoadError::InvalidWeight(token)) if token == "x"
        ));
    }

    #[test]
    fn test_missing_weight_section() {
        let text = "DIMENSION: 2\nEOF\n";
        assert!(matches!(
            parse_tsplib(text),
            Err(LoadError::MissingWeightSection)
        ));
    }

    #[test]
    fn test_malformed_header() {
        let text = "DIMENSION 2\nEDGE_WEIGHT_SECTION\n";
        assert!(matches!(
            parse_tsplib(text),
            Err(LoadError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_tsplib("/nonexistent/instance.atsp"),
            Err(LoadError::Io(_))
        ));
    }
}
