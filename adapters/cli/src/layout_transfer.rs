#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use maze_escape_core::{CellCoord, MazeLayout};
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "maze";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "maze:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';
const WALL_GLYPH: char = '#';
const PATH_GLYPH: char = '.';

/// Snapshot of a maze layout and its cell length.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MazeSnapshot {
    pub(crate) layout: MazeLayout,
    /// Length of a single cell edge expressed in world units.
    pub(crate) cell_length: f32,
}

impl MazeSnapshot {
    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let columns = usize::try_from(self.layout.columns()).unwrap_or(0).max(1);
        let walls = self
            .layout
            .walls()
            .chunks(columns)
            .map(|row| {
                row.iter()
                    .map(|wall| if *wall { WALL_GLYPH } else { PATH_GLYPH })
                    .collect()
            })
            .collect();
        let payload = SerializableSnapshot {
            cell_length: self.cell_length,
            walls,
        };
        let json = serde_json::to_vec(&payload).expect("layout snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.layout.columns(),
            self.layout.rows()
        )
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        let layout = parse_walls(columns, rows, &decoded.walls)?;
        Ok(Self {
            layout,
            cell_length: decoded.cell_length,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    cell_length: f32,
    walls: Vec<String>,
}

/// Errors that can occur while decoding layout transfer strings.
#[derive(Debug)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The wall rows disagree with the declared dimensions.
    MismatchedWalls {
        /// Row at which the mismatch was detected.
        row: usize,
    },
    /// A wall row contained a glyph other than `#` or `.`.
    InvalidGlyph(char),
}

impl fmt::Display for LayoutTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layout payload was empty"),
            Self::MissingPrefix => write!(f, "layout string is missing the prefix"),
            Self::MissingVersion => write!(f, "layout string is missing the version"),
            Self::MissingDimensions => write!(f, "layout string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "layout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layout version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode layout payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse layout payload: {error}")
            }
            Self::MismatchedWalls { row } => {
                write!(f, "wall rows do not match the grid dimensions at row {row}")
            }
            Self::InvalidGlyph(glyph) => write!(f, "unexpected wall glyph '{glyph}'"),
        }
    }
}

impl Error for LayoutTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(LayoutTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((columns, rows))
}

fn parse_walls(
    columns: u32,
    rows: u32,
    lines: &[String],
) -> Result<MazeLayout, LayoutTransferError> {
    let expected_rows = usize::try_from(rows).unwrap_or(usize::MAX);
    let expected_columns = usize::try_from(columns).unwrap_or(usize::MAX);
    if lines.len() != expected_rows {
        return Err(LayoutTransferError::MismatchedWalls {
            row: lines.len().min(expected_rows),
        });
    }

    let mut layout = MazeLayout::filled(columns, rows);
    for (row, line) in (0_u32..).zip(lines) {
        if line.chars().count() != expected_columns {
            return Err(LayoutTransferError::MismatchedWalls {
                row: usize::try_from(row).unwrap_or(usize::MAX),
            });
        }
        for (column, glyph) in (0_u32..).zip(line.chars()) {
            let wall = match glyph {
                WALL_GLYPH => true,
                PATH_GLYPH => false,
                other => return Err(LayoutTransferError::InvalidGlyph(other)),
            };
            layout.set_wall(CellCoord::new(column, row), wall);
        }
    }
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout() -> MazeLayout {
        let mut layout = MazeLayout::filled(5, 3);
        for column in 1..4 {
            layout.set_wall(CellCoord::new(column, 1), false);
        }
        layout
    }

    #[test]
    fn round_trip_layout() {
        let snapshot = MazeSnapshot {
            layout: sample_layout(),
            cell_length: 4.0,
        };

        let encoded = snapshot.encode();
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:5x3:")));

        let decoded = MazeSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn payload_stores_rows_as_glyphs() {
        let snapshot = MazeSnapshot {
            layout: sample_layout(),
            cell_length: 2.5,
        };
        let encoded = snapshot.encode();
        let payload = encoded.rsplit(FIELD_DELIMITER).next().expect("payload");
        let bytes = STANDARD_NO_PAD.decode(payload).expect("base64");
        let decoded: SerializableSnapshot = serde_json::from_slice(&bytes).expect("json");

        assert_eq!(decoded.walls, vec!["#####", "#...#", "#####"]);
        assert_eq!(decoded.cell_length, 2.5);
    }

    #[test]
    fn rejects_foreign_prefix_and_version() {
        assert!(matches!(
            MazeSnapshot::decode("grid:v1:3x3:abc"),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "grid"
        ));
        assert!(matches!(
            MazeSnapshot::decode("maze:v2:3x3:abc"),
            Err(LayoutTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            MazeSnapshot::decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
    }

    #[test]
    fn rejects_rows_that_disagree_with_dimensions() {
        let payload = SerializableSnapshot {
            cell_length: 4.0,
            walls: vec!["###".into(), "#.#".into()],
        };
        let json = serde_json::to_vec(&payload).expect("json");
        let encoded = format!("{SNAPSHOT_HEADER}:3x3:{}", STANDARD_NO_PAD.encode(json));

        assert!(matches!(
            MazeSnapshot::decode(&encoded),
            Err(LayoutTransferError::MismatchedWalls { row: 2 })
        ));
    }

    #[test]
    fn rejects_unknown_glyphs() {
        let payload = SerializableSnapshot {
            cell_length: 4.0,
            walls: vec!["###".into(), "#x#".into(), "###".into()],
        };
        let json = serde_json::to_vec(&payload).expect("json");
        let encoded = format!("{SNAPSHOT_HEADER}:3x3:{}", STANDARD_NO_PAD.encode(json));

        assert!(matches!(
            MazeSnapshot::decode(&encoded),
            Err(LayoutTransferError::InvalidGlyph('x'))
        ));
    }
}
