//! Blocking user notifications.
//!
//! Actions report failures through a [`Notifier`] so the caller decides how a
//! message reaches the user (a browser `alert`, a log line, a test recorder).

/// Something that can put a message in front of the user.
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<F: Fn(&str)> Notifier for F {
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Notifier that only logs; used where no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(%message, "user notification");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::Notifier;

    /// Records every message for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        pub messages: RefCell<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }

    impl RecordingNotifier {
        pub fn taken(&self) -> Vec<String> {
            self.messages.take()
        }
    }
}
