use std::io;

/// How a paced read call ended
#[derive(Debug)]
pub enum ReadStatus {
    /// The caller's buffer was filled
    Complete,
    /// The underlying stream reported end-of-data during this call
    EndOfData,
    /// The underlying stream failed; the error is passed through verbatim
    Failed(io::Error),
}

/// Result of one top-level paced read: bytes delivered plus the end signal
///
/// `count` is always meaningful and should be consumed before inspecting `status`.
/// End-of-data is reported on the same call in which the underlying stream ended, even
/// when `count > 0`; a following call then reports `count == 0` with
/// [`ReadStatus::EndOfData`].
#[derive(Debug)]
pub struct ReadOutcome {
    pub count: usize,
    pub status: ReadStatus,
}

impl ReadOutcome {
    pub(crate) fn complete(count: usize) -> Self {
        Self { count, status: ReadStatus::Complete }
    }

    pub(crate) fn end_of_data(count: usize) -> Self {
        Self { count, status: ReadStatus::EndOfData }
    }

    pub(crate) fn failed(count: usize, err: io::Error) -> Self {
        Self { count, status: ReadStatus::Failed(err) }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, ReadStatus::Complete)
    }

    pub fn is_end_of_data(&self) -> bool {
        matches!(self.status, ReadStatus::EndOfData)
    }

    pub fn error(&self) -> Option<&io::Error> {
        match &self.status {
            ReadStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Split into the `std::io::Read` result and an error to surface on the next call
    ///
    /// A failure after a non-zero partial count yields `Ok(count)` and defers the error.
    pub(crate) fn into_io(self) -> (io::Result<usize>, Option<io::Error>) {
        match self.status {
            ReadStatus::Failed(err) if self.count == 0 => (Err(err), None),
            ReadStatus::Failed(err) => (Ok(self.count), Some(err)),
            ReadStatus::Complete | ReadStatus::EndOfData => (Ok(self.count), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_without_bytes_is_immediate() {
        let outcome = ReadOutcome::failed(0, io::Error::other("boom"));
        let (result, pending) = outcome.into_io();
        assert_eq!(result.unwrap_err().to_string(), "boom");
        assert!(pending.is_none());
    }

    #[test]
    fn test_failure_after_partial_is_deferred() {
        let outcome = ReadOutcome::failed(12, io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert_eq!(outcome.error().map(io::Error::kind), Some(io::ErrorKind::ConnectionReset));

        let (result, pending) = outcome.into_io();
        assert_eq!(result.unwrap(), 12);
        assert_eq!(pending.unwrap().kind(), io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn test_end_of_data_maps_to_count() {
        let outcome = ReadOutcome::end_of_data(5);
        assert!(outcome.is_end_of_data());
        assert!(!outcome.is_complete());
        assert_eq!(outcome.into_io().0.unwrap(), 5);
    }
}
