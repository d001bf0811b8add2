//! Reporting sink: leveled, human-readable status messages.
//!
//! Components report through a `&dyn Reporter` handed to them. The binary
//! uses [`LogReporter`]; tests use [`mock::CapturingReporter`].

/// Receives status messages from a run.
pub trait Reporter {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Forwards every message to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn info(&self, msg: &str) {
        log::info!("{msg}");
    }

    fn warn(&self, msg: &str) {
        log::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        log::error!("{msg}");
    }
}

/// In-memory reporter for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use std::cell::RefCell;

    use log::Level;

    use super::Reporter;

    /// Records every message with its level, in order.
    #[derive(Debug, Default)]
    pub struct CapturingReporter {
        pub messages: RefCell<Vec<(Level, String)>>,
    }

    impl CapturingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Messages recorded at `level`, in order.
        pub fn at(&self, level: Level) -> Vec<String> {
            self.messages
                .borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m.clone())
                .collect()
        }

        fn push(&self, level: Level, msg: &str) {
            self.messages.borrow_mut().push((level, msg.to_string()));
        }
    }

    impl Reporter for CapturingReporter {
        fn info(&self, msg: &str) {
            self.push(Level::Info, msg);
        }

        fn warn(&self, msg: &str) {
            self.push(Level::Warn, msg);
        }

        fn error(&self, msg: &str) {
            self.push(Level::Error, msg);
        }
    }
}
