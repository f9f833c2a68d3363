pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS usage_entries (
    id TEXT PRIMARY KEY,
    user_id TEXT,
    subject_type TEXT NOT NULL,
    request_kind TEXT NOT NULL,
    model_id TEXT NOT NULL,
    provider TEXT NOT NULL,
    cost_usd REAL NOT NULL DEFAULT 0.0,
    response_time_ms INTEGER NOT NULL DEFAULT 0,
    success INTEGER NOT NULL,
    error_message TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_usage_created ON usage_entries(created_at);
CREATE INDEX IF NOT EXISTS idx_usage_user ON usage_entries(user_id);
";
