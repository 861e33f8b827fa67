//! Database schema and migrations for massmail.
//!
//! Migrations are applied in order; `schema_version` records how many ran.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and permission grants
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL,
    password    TEXT NOT NULL,           -- Argon2 hash
    email       TEXT,
    role        TEXT NOT NULL DEFAULT 'user',  -- 'user', 'manager', 'admin'
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    last_login  TEXT
);

CREATE UNIQUE INDEX idx_users_username_nocase ON users(username COLLATE NOCASE);

CREATE TABLE user_permissions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    codename    TEXT NOT NULL,
    UNIQUE(user_id, codename)
);
"#,
    // v2: messages and recipients
    r#"
CREATE TABLE messages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    subject     TEXT NOT NULL,
    body        TEXT NOT NULL,
    owner_id    INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_messages_subject ON messages(subject);

CREATE TABLE recipients (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL,
    full_name   TEXT NOT NULL,
    comment     TEXT NOT NULL DEFAULT '',
    owner_id    INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_recipients_full_name ON recipients(full_name);
"#,
    // v3: mailings and their recipient set
    r#"
CREATE TABLE mailings (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    start_at    TEXT NOT NULL,
    end_at      TEXT,
    status      TEXT NOT NULL DEFAULT 'created',  -- 'created', 'started', 'completed'
    message_id  INTEGER NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
    owner_id    INTEGER REFERENCES users(id) ON DELETE SET NULL,
    is_blocked  INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_mailings_status ON mailings(status);

CREATE TABLE mailing_recipients (
    mailing_id    INTEGER NOT NULL REFERENCES mailings(id) ON DELETE CASCADE,
    recipient_id  INTEGER NOT NULL REFERENCES recipients(id) ON DELETE CASCADE,
    PRIMARY KEY (mailing_id, recipient_id)
);
"#,
    // v4: send attempts and per-user statistics
    r#"
CREATE TABLE mailing_attempts (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    mailing_id       INTEGER NOT NULL REFERENCES mailings(id) ON DELETE CASCADE,
    attempt_at       TEXT NOT NULL DEFAULT (datetime('now')),
    status           TEXT NOT NULL,       -- 'success', 'failure'
    server_response  TEXT NOT NULL DEFAULT ''
);

CREATE INDEX idx_mailing_attempts_mailing_id ON mailing_attempts(mailing_id);

CREATE TABLE user_mailing_statistics (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id              INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    total_attempts       INTEGER NOT NULL DEFAULT 0,
    successful_attempts  INTEGER NOT NULL DEFAULT 0,
    failed_attempts      INTEGER NOT NULL DEFAULT 0,
    messages_sent        INTEGER NOT NULL DEFAULT 0
);
"#,
];
