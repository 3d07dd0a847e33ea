/// Like toggling
///
/// Each `(post, username)` pair is a two-state machine, absent or present.
/// A toggle flips it; there is no terminal state.
use chrono::{DateTime, Utc};

use crate::models::Like;

/// Result of a toggle for the acting username
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Absent,
    Present,
}

pub fn is_liked_by(likes: &[Like], username: &str) -> bool {
    likes.iter().any(|like| like.username == username)
}

/// Flip `username`'s like on the given like set.
///
/// An existing entry is removed (unlike); otherwise a new entry stamped with
/// `now` is appended (like).
pub fn toggle(likes: &[Like], username: &str, now: DateTime<Utc>) -> Vec<Like> {
    if is_liked_by(likes, username) {
        likes
            .iter()
            .filter(|like| like.username != username)
            .cloned()
            .collect()
    } else {
        let mut next = likes.to_vec();
        next.push(Like {
            username: username.to_string(),
            created_at: now,
        });
        next
    }
}

pub fn state_of(likes: &[Like], username: &str) -> LikeState {
    if is_liked_by(likes, username) {
        LikeState::Present
    } else {
        LikeState::Absent
    }
}
