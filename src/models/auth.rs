//! Bearer-token accessor supplied by the surrounding auth context.

/// Read-only view of the current bearer token.
///
/// The controller never persists or refreshes tokens. `None` means the user
/// is not authenticated and no request is attempted.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

impl<F> TokenSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn bearer_token(&self) -> Option<String> {
        self()
    }
}

/// Fixed token, used by the probe binary and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self(Some(token).filter(|t| !t.trim().is_empty()))
    }

    pub fn missing() -> Self {
        Self(None)
    }
}

impl TokenSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}
