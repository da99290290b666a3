#![forbid(unsafe_code)]

//! What Beau says.

/// First message of every session.
pub const WELCOME: &str = "Hi! I'm Beau, your relationship coach. I'm here to help you navigate \
your relationships with wisdom and empathy. What's on your mind today? 💚";

/// Reply to every user message.
pub const REPLY: &str = "Thanks for your message! I'm here to help with your relationship \
questions. What's on your mind?";

/// Composer placeholder.
pub const PLACEHOLDER: &str = "Type a message...";

/// Longest message the composer accepts, in grapheme clusters.
pub const MAX_MESSAGE_LEN: usize = 500;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_continuations_keep_single_spaces() {
        assert!(WELCOME.contains("navigate your relationships"));
        assert!(REPLY.contains("relationship questions"));
        assert!(!WELCOME.contains("  "));
        assert!(!REPLY.contains("  "));
        assert!(WELCOME.ends_with('💚'));
    }
}
