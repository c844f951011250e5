pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS Feedback (
    id TEXT PRIMARY KEY,
    name TEXT,
    email TEXT,
    message TEXT NOT NULL CHECK (length(message) > 0),
    -- no declared type: integers and reals are stored as given
    rating,
    createdAt TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_feedback_created_at ON Feedback(createdAt);
"#;
