//! Enemy data file decoder for Guardian's Crusade.
//!
//! Each file of the `ENE` category starts with eight pointers. The seventh
//! points at a metadata block holding the enemy's display name followed by
//! its move list.

mod error;
mod file;

pub use error::{Error, Result};
pub use file::{EnemyFile, MoveEntry, ENEMY_HEADER_SIZE, MAX_NAME_LEN};
