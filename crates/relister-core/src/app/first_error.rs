//! FirstError - 最初のエラーだけを保持する single-assignment cell

use std::sync::OnceLock;

/// FirstError は最初に記録されたエラーだけを保持し、以降のエラーは捨てる
///
/// `record` は `&self` を取るので、共有参照のまま fan-in に使えます。
#[derive(Debug)]
pub struct FirstError<E> {
    cell: OnceLock<E>,
}

impl<E> FirstError<E> {
    pub fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// `err` が保持されたら `true`、捨てられたら `false`
    pub fn record(&self, err: E) -> bool {
        self.cell.set(err).is_ok()
    }

    pub fn into_result(self) -> Result<(), E> {
        match self.cell.into_inner() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<E> Default for FirstError<E> {
    fn default() -> Self {
        Self::new()
    }
}
