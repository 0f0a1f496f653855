//! # Reply Data
//!
//! The server never builds a reply itself; it asks a [`DataSource`] through
//! [`process_data`]. Tests substitute their own source to observe exactly
//! how often the server asks and what it sends back.

/// Produces the bytes of a reply.
pub trait DataSource {
    fn get_data(&self) -> Vec<u8>;
}

impl<T: DataSource + ?Sized> DataSource for &T {
    fn get_data(&self) -> Vec<u8> {
        (**self).get_data()
    }
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn get_data(&self) -> Vec<u8> {
        (**self).get_data()
    }
}

/// The built-in source: a single element, `4`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultData;

impl DataSource for DefaultData {
    fn get_data(&self) -> Vec<u8> {
        vec![4]
    }
}

/// Replies with a fixed message, usually `server.response_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticResponse {
    message: String,
}

impl StaticResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl DataSource for StaticResponse {
    fn get_data(&self) -> Vec<u8> {
        self.message.as_bytes().to_vec()
    }
}

/// Fetch one reply from `source`, unchanged.
///
/// Calls [`DataSource::get_data`] exactly once.
pub fn process_data<S: DataSource + ?Sized>(source: &S) -> Vec<u8> {
    source.get_data()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Stand-in source that records how often it was asked.
    struct CountingSource {
        data: Vec<u8>,
        calls: Cell<usize>,
    }

    impl CountingSource {
        fn returning(data: Vec<u8>) -> Self {
            Self {
                data,
                calls: Cell::new(0),
            }
        }
    }

    impl DataSource for CountingSource {
        fn get_data(&self) -> Vec<u8> {
            self.calls.set(self.calls.get() + 1);
            self.data.clone()
        }
    }

    #[test]
    fn default_data_is_single_four() {
        assert_eq!(DefaultData.get_data(), vec![4]);
        assert_eq!(process_data(&DefaultData), vec![4]);
    }

    #[test]
    fn process_data_returns_substituted_data() {
        let source = CountingSource::returning(vec![1, 2, 3]);

        let result = process_data(&source);

        assert_eq!(result, vec![1, 2, 3]);
        assert_eq!(source.calls.get(), 1);
        assert_ne!(process_data(&source), vec![1, 2, 3, 4]);
    }

    #[test]
    fn each_call_asks_the_source_again() {
        let source = CountingSource::returning(vec![9]);
        let _ = process_data(&source);
        let _ = process_data(&source);
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn static_response_yields_message_bytes() {
        let source = StaticResponse::new("Message received");
        assert_eq!(process_data(&source), b"Message received".to_vec());
        assert_eq!(source.message(), "Message received");
    }

    #[test]
    fn boxed_sources_dispatch_dynamically() {
        let source: Box<dyn DataSource> = Box::new(StaticResponse::new("ok"));
        assert_eq!(process_data(&source), b"ok".to_vec());
        assert_eq!(process_data(source.as_ref()), b"ok".to_vec());
    }
}
