//! Decodes the compact binary maze format (§6.1) into a freshly-walled
//! `CellStore`. Little-endian throughout: a 12-byte header of three i32s
//! (`width`, `height`, `solvable` — read but unused), followed by a flat
//! stream of cells packed 16-per-u32-word at 2 bits each, low bits first.
//! Per cell: bit 0 = EAST_WALL, bit 1 = SOUTH_WALL.

use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

use crate::cellstore::CellStore;
use crate::error::MazeError;
use crate::geometry::{Direction, Position};

const HEADER_LEN: usize = 12;
const CELLS_PER_WORD: usize = 16;

pub fn load_maze_file(path: impl AsRef<Path>) -> Result<CellStore, MazeError> {
    let bytes = std::fs::read(path)?;
    load_maze(&bytes)
}

pub fn load_maze(bytes: &[u8]) -> Result<CellStore, MazeError> {
    if bytes.len() < HEADER_LEN {
        return Err(invalid(format!("header too short: {} bytes, need {}", bytes.len(), HEADER_LEN)));
    }
    let width = LittleEndian::read_i32(&bytes[0..4]);
    let height = LittleEndian::read_i32(&bytes[4..8]);
    let _solvable = LittleEndian::read_i32(&bytes[8..12]);

    if width <= 0 || height <= 0 {
        return Err(invalid(format!("non-positive dimensions: {width}x{height}")));
    }

    let cells = width as usize * height as usize;
    let required_words = cells.div_ceil(CELLS_PER_WORD);
    let body = &bytes[HEADER_LEN..];
    let required_bytes = required_words * 4;
    if body.len() < required_bytes {
        let got = body.len();
        return Err(invalid(format!(
            "body truncated: {got} bytes, need {required_bytes} for {cells} cells",
        )));
    }

    let mut store = CellStore::new(width, height);
    for cell_index in 0..cells {
        let word_index = cell_index / CELLS_PER_WORD;
        let shift = (cell_index % CELLS_PER_WORD) * 2;
        let word = LittleEndian::read_u32(&body[word_index * 4..word_index * 4 + 4]);
        let bits = (word >> shift) & 0b11;
        let row = (cell_index / width as usize) as i32;
        let col = (cell_index % width as usize) as i32;
        let p = Position::new(row, col);
        if bits & 0b01 != 0 {
            store.set_wall(p, Direction::East);
        }
        if bits & 0b10 != 0 {
            store.set_wall(p, Direction::South);
        }
    }

    debug!(width, height, "loaded maze");
    Ok(store)
}

fn invalid(reason: String) -> MazeError {
    tracing::debug!(reason = %reason, "rejected malformed maze blob");
    MazeError::InvalidInput(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_bytes(words: &[u32]) -> Vec<u8> {
        let mut out = Vec::with_capacity(words.len() * 4);
        for w in words {
            let mut b = [0u8; 4];
            LittleEndian::write_u32(&mut b, *w);
            out.extend_from_slice(&b);
        }
        out
    }

    fn header(width: i32, height: i32, solvable: i32) -> Vec<u8> {
        let mut h = vec![0u8; 12];
        LittleEndian::write_i32(&mut h[0..4], width);
        LittleEndian::write_i32(&mut h[4..8], height);
        LittleEndian::write_i32(&mut h[8..12], solvable);
        h
    }

    #[test]
    fn rejects_short_header() {
        let bytes = vec![0u8; 4];
        assert!(matches!(load_maze(&bytes), Err(MazeError::InvalidInput(_))));
    }

    #[test]
    fn rejects_negative_dimensions() {
        let mut bytes = header(-1, 4, 1);
        bytes.extend(word_bytes(&[0u32]));
        assert!(matches!(load_maze(&bytes), Err(MazeError::InvalidInput(_))));
    }

    #[test]
    fn rejects_truncated_body() {
        // 4x4 = 16 cells = exactly one word, but we supply none.
        let bytes = header(4, 4, 1);
        assert!(matches!(load_maze(&bytes), Err(MazeError::InvalidInput(_))));
    }

    #[test]
    fn decodes_wall_bits_in_row_major_order() {
        // 4x4 grid, one word. Cell 0 gets EAST_WALL+SOUTH_WALL (bits 0b11),
        // cell 1 gets only EAST_WALL (0b01), rest clear.
        let mut word = 0u32;
        word |= 0b11; // cell 0, bits 0-1
        word |= 0b01 << 2; // cell 1, bits 2-3
        let mut bytes = header(4, 4, 1);
        bytes.extend(word_bytes(&[word]));
        let store = load_maze(&bytes).unwrap();
        assert!(!store.can_move(Position::new(0, 0), Direction::East));
        assert!(!store.can_move(Position::new(0, 0), Direction::South));
        assert!(!store.can_move(Position::new(0, 1), Direction::East));
        assert!(store.can_move(Position::new(0, 1), Direction::South));
    }

    #[test]
    fn open_grid_is_fully_walkable_internally() {
        let bytes_header = header(4, 4, 1);
        let words = vec![0u32; 1]; // 16 cells, all bits clear
        let mut bytes = bytes_header;
        bytes.extend(word_bytes(&words));
        let store = load_maze(&bytes).unwrap();
        assert!(store.can_move(Position::new(1, 1), Direction::North));
        assert!(store.can_move(Position::new(1, 1), Direction::South));
    }
}
