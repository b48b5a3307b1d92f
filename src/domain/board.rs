//! Board reconstruction by replaying a move path.

use std::fmt;

use crate::domain::entities::{Header, Position};
use crate::domain::error::{DomainError, DomainResult};

/// Mark placed on a cell; the first mover plays X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Mark played at `ply` (0-based index into a path) of a two-player game.
    pub fn for_ply(ply: usize) -> Self {
        if ply % 2 == 0 {
            Mark::X
        } else {
            Mark::O
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Occupancy of an `n x n` board after a sequence of moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    dimension: usize,
    cells: Vec<Option<Mark>>,
}

impl Board {
    /// Blank board; fails with `DataIntegrity` when the edge is too large to allocate.
    pub fn empty(dimension: usize) -> DomainResult<Self> {
        let size = Header::new(dimension, 2).cell_count().ok_or_else(|| {
            DomainError::integrity(&[], format!("board dimension {dimension} is too large"))
        })?;
        Ok(Self {
            dimension,
            cells: vec![None; size],
        })
    }

    /// Replay `path` on an empty board, alternating X and O.
    ///
    /// Fails with `DataIntegrity` if a position is off the board or played twice.
    pub fn from_path(dimension: usize, path: &[Position]) -> DomainResult<Self> {
        let mut board = Self::empty(dimension).map_err(|e| match e {
            DomainError::DataIntegrity { reason, .. } => DomainError::integrity(path, reason),
            other => other,
        })?;
        let size = board.cells.len();
        for (ply, &position) in path.iter().enumerate() {
            let cell = board.cells.get_mut(position).ok_or_else(|| {
                DomainError::integrity(
                    path,
                    format!("position {position} is outside the {size}-cell board"),
                )
            })?;
            if let Some(mark) = cell {
                return Err(DomainError::integrity(
                    path,
                    format!("position {position} is already occupied by {mark}"),
                ));
            }
            *cell = Some(Mark::for_ply(ply));
        }
        Ok(board)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn get(&self, position: Position) -> Option<Mark> {
        self.cells.get(position).copied().flatten()
    }

    pub fn contains(&self, position: Position) -> bool {
        position < self.cells.len()
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Cells grouped by row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Mark>]> + '_ {
        self.cells.chunks(self.dimension.max(1))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row
                .iter()
                .map(|cell| cell.map_or(".", Mark::symbol))
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_path_when_replayed_then_marks_alternate_by_parity() {
        let board = Board::from_path(3, &[4, 0, 8]).unwrap();
        assert_eq!(board.get(4), Some(Mark::X));
        assert_eq!(board.get(0), Some(Mark::O));
        assert_eq!(board.get(8), Some(Mark::X));
        assert_eq!(board.occupied(), 3);
        assert_eq!(board.to_string(), "O..\n.X.\n..X\n");
    }

    #[test]
    fn given_empty_path_when_replayed_then_board_is_blank() {
        let board = Board::from_path(4, &[]).unwrap();
        assert_eq!(board.rows().map(<[_]>::len).sum::<usize>(), 16);
        assert_eq!(board.occupied(), 0);
        assert_eq!(board.rows().count(), 4);
    }

    #[test]
    fn given_huge_dimension_when_replayed_then_integrity_error_without_allocating() {
        let result = Board::from_path(4_294_967_296, &[0]);
        match result {
            Err(DomainError::DataIntegrity { path, .. }) => assert_eq!(path, vec![0]),
            other => panic!("expected DataIntegrity, got {other:?}"),
        }
        assert!(Board::empty(usize::MAX).is_err());
    }

    #[rstest]
    #[case::out_of_range(&[9])]
    #[case::duplicate(&[4, 4])]
    #[case::duplicate_later(&[0, 1, 2, 1])]
    fn given_inconsistent_path_when_replayed_then_integrity_error(#[case] path: &[Position]) {
        let result = Board::from_path(3, path);
        match result {
            Err(DomainError::DataIntegrity { path: reported, .. }) => {
                assert_eq!(reported, path.to_vec())
            }
            other => panic!("expected DataIntegrity, got {other:?}"),
        }
    }
}
