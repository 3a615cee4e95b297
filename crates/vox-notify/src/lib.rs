use time::{Duration, OffsetDateTime};

/// How long a notice stays visible unless dismissed.
pub const DEFAULT_TTL: Duration = Duration::seconds(3);

// ── Notices ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    pub fn label(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "ok",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: String,
    pub level: Level,
    pub message: String,
    pub expires_at: OffsetDateTime,
}

impl Notice {
    pub fn new(level: Level, message: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            id: format!("ntc_{}", ulid::Ulid::new().to_string().to_lowercase()),
            level,
            message: message.into(),
            expires_at: now + DEFAULT_TTL,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message, OffsetDateTime::now_utc())
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message, OffsetDateTime::now_utc())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message, OffsetDateTime::now_utc())
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// The visible stack of notices. Oldest first.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a notice for [`DEFAULT_TTL`]. Returns its id.
    pub fn push(&mut self, level: Level, message: impl Into<String>) -> String {
        self.push_at(level, message, OffsetDateTime::now_utc())
    }

    pub fn push_at(
        &mut self,
        level: Level,
        message: impl Into<String>,
        now: OffsetDateTime,
    ) -> String {
        let notice = Notice::new(level, message, now);
        let id = notice.id.clone();
        self.notices.push(notice);
        id
    }

    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Drop expired notices.
    pub fn prune(&mut self, now: OffsetDateTime) {
        self.notices.retain(|n| !n.is_expired(now));
    }

    pub fn active(&self, now: OffsetDateTime) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(move |n| !n.is_expired(now))
    }

    pub fn latest(&self, now: OffsetDateTime) -> Option<&Notice> {
        self.active(now).last()
    }
}

// ── Sinks ──

/// Where notices go when there is no board on screen.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &Notice);
}

/// Prints to stderr so stdout stays machine-readable.
pub struct StderrNotifier;

#[async_trait::async_trait]
impl Notifier for StderrNotifier {
    async fn notify(&self, notice: &Notice) {
        eprintln!("[vox] {}: {}", notice.level.label(), notice.message);
    }
}

/// Collects notices in memory (for testing).
#[derive(Default)]
pub struct CollectNotifier {
    notices: std::sync::Mutex<Vec<Notice>>,
}

impl CollectNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn levels(&self) -> Vec<Level> {
        self.notices
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(|n| n.level)
            .collect()
    }
}

#[async_trait::async_trait]
impl Notifier for CollectNotifier {
    async fn notify(&self, notice: &Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(notice.clone());
    }
}
