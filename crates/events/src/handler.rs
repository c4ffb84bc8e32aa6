//! The callback capability stored by a [`Hub`](crate::Hub).

/// Error returned by a handler to signal that it could not process a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self(message.to_owned())
    }
}

pub type HandlerResult = Result<(), HandlerError>;

/// A unit of code that receives payloads for one or more event names.
///
/// Implemented for every `Fn(&P) -> HandlerResult + Send + Sync + 'static`
/// closure, so most callers never implement it by hand. Implement it
/// directly to give a handler a stable [`name`](Handler::name) in logs and
/// dispatch reports.
///
/// Handlers run synchronously on the thread that called
/// [`Hub::emit`](crate::Hub::emit). Panics are caught by the hub and treated
/// like an `Err`.
pub trait Handler<P>: Send + Sync + 'static {
    /// Process one payload.
    fn handle(&self, payload: &P) -> HandlerResult;

    /// Name used in logs and in [`HandlerFailure`](crate::HandlerFailure).
    ///
    /// The default uses `type_name::<Self>()`, which is verbose for
    /// closures; override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<P, F> Handler<P> for F
where
    F: Fn(&P) -> HandlerResult + Send + Sync + 'static,
{
    fn handle(&self, payload: &P) -> HandlerResult {
        self(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named;

    impl Handler<u32> for Named {
        fn handle(&self, payload: &u32) -> HandlerResult {
            if *payload == 0 {
                return Err("zero".into());
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "named"
        }
    }

    #[test]
    fn closures_are_handlers() {
        let handler = |n: &u32| -> HandlerResult {
            if *n > 10 {
                Err(HandlerError::new("too big"))
            } else {
                Ok(())
            }
        };
        assert!(Handler::<u32>::handle(&handler, &3).is_ok());
        assert_eq!(
            Handler::<u32>::handle(&handler, &11)
                .unwrap_err()
                .message(),
            "too big"
        );
    }

    #[test]
    fn custom_handler_reports_its_name() {
        assert_eq!(Handler::<u32>::name(&Named), "named");
        assert_eq!(Handler::<u32>::handle(&Named, &0), Err(HandlerError::from("zero")));
    }

    #[test]
    fn error_displays_message() {
        assert_eq!(HandlerError::from(String::from("boom")).to_string(), "boom");
    }
}
