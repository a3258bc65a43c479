//! Per-user storage keys.

pub fn stats(user: &str) -> String {
    format!("stats:{user}")
}

pub fn history(user: &str) -> String {
    format!("history:{user}")
}

pub fn pairs(user: &str) -> String {
    format!("pairs:{user}")
}

pub fn undo(user: &str) -> String {
    format!("undo:{user}")
}

pub fn battles(user: &str) -> String {
    format!("battles:{user}")
}

pub fn pairing(user: &str) -> String {
    format!("pairing:{user}")
}

pub fn current(user: &str) -> String {
    format!("current:{user}")
}

/// Every key owned by `user`.
pub fn all(user: &str) -> [String; 7] {
    [
        stats(user),
        history(user),
        pairs(user),
        undo(user),
        battles(user),
        pairing(user),
        current(user),
    ]
}
