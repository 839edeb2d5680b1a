//! Sequential player-name assignment from a finite pool.
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("no more names available")]
    Exhausted,

    #[error("name pool must not be empty")]
    EmptyPool,
}

/// Hands out names from a configured pool in order.
///
/// Shared between the engine front (player creation) and tests, so the
/// cursor sits behind a mutex.
#[derive(Debug)]
pub struct NameGenerator {
    names: Vec<String>,
    next: Mutex<usize>,
}

impl NameGenerator {
    pub fn new(names: Vec<String>) -> Result<Self, NameError> {
        if names.is_empty() {
            return Err(NameError::EmptyPool);
        }
        Ok(Self {
            names,
            next: Mutex::new(0),
        })
    }

    /// The next unused name, or [`NameError::Exhausted`] once the pool runs
    /// dry.
    pub fn next(&self) -> Result<String, NameError> {
        let mut cursor = self.next.lock().expect("name cursor poisoned");
        if *cursor >= self.names.len() {
            return Err(NameError::Exhausted);
        }
        let name = self.names[*cursor].clone();
        *cursor += 1;
        Ok(name)
    }

    /// Unused names left in the pool.
    pub fn remaining(&self) -> usize {
        let cursor = self.next.lock().expect("name cursor poisoned");
        self.names.len() - *cursor
    }

    /// Rewinds the cursor so names can be reused. For tests.
    pub fn reset(&self) {
        let mut cursor = self.next.lock().expect("name cursor poisoned");
        *cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(names: &[&str]) -> NameGenerator {
        NameGenerator::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn empty_pool_rejected() {
        assert_eq!(NameGenerator::new(vec![]).unwrap_err(), NameError::EmptyPool);
    }

    #[test]
    fn names_come_out_in_order() {
        let names = pool(&["Ada", "Basil"]);
        assert_eq!(names.next().unwrap(), "Ada");
        assert_eq!(names.next().unwrap(), "Basil");
        assert_eq!(names.next().unwrap_err(), NameError::Exhausted);
    }

    #[test]
    fn remaining_tracks_cursor() {
        let names = pool(&["Ada", "Basil", "Clara"]);
        assert_eq!(names.remaining(), 3);
        names.next().unwrap();
        assert_eq!(names.remaining(), 2);
    }

    #[test]
    fn reset_reuses_pool() {
        let names = pool(&["Ada"]);
        names.next().unwrap();
        assert_eq!(names.next().unwrap_err(), NameError::Exhausted);
        names.reset();
        assert_eq!(names.next().unwrap(), "Ada");
    }
}
