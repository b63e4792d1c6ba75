use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::engine::TurnFrame;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("turn {0} has no snapshot slot; turns start at 1")]
    InvalidTurn(i64),
}

/// Writes reconstructed turns as `<output_dir>/<game>/turn_NNNN.json`.
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, game: &str, turn: i64) -> Result<PathBuf, SnapshotError> {
        if turn < 1 {
            return Err(SnapshotError::InvalidTurn(turn));
        }
        Ok(self
            .output_dir
            .join(game)
            .join(format!("turn_{turn:04}.json")))
    }

    pub fn write(&self, frame: &TurnFrame) -> Result<PathBuf, SnapshotError> {
        let path = self.path_for(&frame.game, frame.turn)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(frame)?;
        fs::write(&path, json)?;
        info!(
            turn = frame.turn,
            planets = frame.planets.len(),
            path = %path.display(),
            "wrote snapshot"
        );
        Ok(path)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<TurnFrame, SnapshotError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn empty_frame(turn: i64) -> TurnFrame {
        TurnFrame {
            game: "alpha".into(),
            turn,
            generated_at: Utc::now(),
            planets: Vec::new(),
            unknown: Vec::new(),
            issues: Vec::new(),
        }
    }

    #[test]
    fn writes_padded_turn_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path());
        let frame = empty_frame(7);
        let path = writer.write(&frame).unwrap();
        assert_eq!(path, dir.path().join("alpha").join("turn_0007.json"));
        assert_eq!(SnapshotWriter::read(&path).unwrap(), frame);
    }

    #[test]
    fn rejects_non_positive_turn() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path());
        assert!(matches!(
            writer.write(&empty_frame(0)),
            Err(SnapshotError::InvalidTurn(0))
        ));
    }
}
