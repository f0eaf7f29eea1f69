use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    FetchFailed,
    GenerateFailed,
    EnrollFailed,
    MissingSelection,
    NotPermitted,
    Info,
}

/// One-shot, user-facing message raised by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    kind: NoticeKind,
    message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            NoticeKind::FetchFailed | NoticeKind::GenerateFailed | NoticeKind::EnrollFailed
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
