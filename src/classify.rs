//! Maps an inbound text message to the reply it should produce.

/// Longest reply text LINE will accept in one message.
pub const MAX_REPLY_CHARS: usize = 5000;

const STICKER_PACKAGE_ID: &str = "1070";
const STICKER_ID: &str = "17843";

const IMAGE_URL: &str = "https://image1.gamme.com.tw/news2/2020/40/12/qJeZpqWbkKWcqqQ.jpg";

const VIDEO_URL: &str =
    "https://videos.pexels.com/video-files/31532164/13439846_1920_1080_25fps.mp4";
const VIDEO_PREVIEW_URL: &str =
    "https://i0.wp.com/travelfinder.blog/wp-content/uploads/2023/12/img_3643949441866512.jpg?fit=1000%2C667&ssl=1";

/// What to send back for one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The sender's own id echoed back. Not logged to history.
    Echo(String),
    Sticker {
        package_id: &'static str,
        sticker_id: &'static str,
    },
    Image {
        original_url: &'static str,
        preview_url: &'static str,
    },
    Video {
        original_url: &'static str,
        preview_url: &'static str,
    },
    Location {
        title: &'static str,
        address: &'static str,
        latitude: f64,
        longitude: f64,
    },
    /// Free text to forward to the completion API as a prompt.
    Chat(String),
}

/// Decide the reply for a message. Exactly one arm matches; anything that
/// is not a literal command falls through to the completion prompt.
pub fn classify(text: &str, sender_id: &str) -> Reply {
    match text {
        "id" => Reply::Echo(sender_id.to_string()),
        "sticker" => Reply::Sticker {
            package_id: STICKER_PACKAGE_ID,
            sticker_id: STICKER_ID,
        },
        "image" => Reply::Image {
            original_url: IMAGE_URL,
            preview_url: IMAGE_URL,
        },
        "video" => Reply::Video {
            original_url: VIDEO_URL,
            preview_url: VIDEO_PREVIEW_URL,
        },
        "location" => Reply::Location {
            title: "Taipei 101",
            address: "Taipei",
            latitude: 25.03363,
            longitude: 121.56481,
        },
        _ => Reply::Chat(text.to_string()),
    }
}

/// Cap a string at `max_chars` characters, ending the cut with "...".
///
/// Counts chars, not bytes, so multibyte text is never split mid-sequence.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_echoes_sender() {
        assert_eq!(
            classify("id", "U4af4980629"),
            Reply::Echo("U4af4980629".to_string())
        );
    }

    #[test]
    fn test_sticker() {
        assert_eq!(
            classify("sticker", "U1"),
            Reply::Sticker {
                package_id: "1070",
                sticker_id: "17843",
            }
        );
    }

    #[test]
    fn test_image_uses_same_url_for_preview() {
        let Reply::Image {
            original_url,
            preview_url,
        } = classify("image", "U1")
        else {
            panic!("expected image reply");
        };
        assert_eq!(original_url, preview_url);
    }

    #[test]
    fn test_video_has_distinct_preview() {
        let Reply::Video {
            original_url,
            preview_url,
        } = classify("video", "U1")
        else {
            panic!("expected video reply");
        };
        assert!(original_url.ends_with(".mp4"));
        assert_ne!(original_url, preview_url);
    }

    #[test]
    fn test_location() {
        assert_eq!(
            classify("location", "U1"),
            Reply::Location {
                title: "Taipei 101",
                address: "Taipei",
                latitude: 25.03363,
                longitude: 121.56481,
            }
        );
    }

    #[test]
    fn test_free_text_becomes_chat_prompt() {
        assert_eq!(
            classify("what's the weather?", "U1"),
            Reply::Chat("what's the weather?".to_string())
        );
    }

    #[test]
    fn test_commands_are_case_sensitive() {
        assert_eq!(classify("Sticker", "U1"), Reply::Chat("Sticker".to_string()));
        assert_eq!(classify("ID", "U1"), Reply::Chat("ID".to_string()));
    }

    #[test]
    fn test_command_with_whitespace_is_chat() {
        assert_eq!(classify("id ", "U1"), Reply::Chat("id ".to_string()));
    }

    #[test]
    fn test_empty_text_is_chat() {
        assert_eq!(classify("", "U1"), Reply::Chat(String::new()));
    }

    #[test]
    fn test_truncate_short_is_identity() {
        assert_eq!(truncate("hello", 5000), "hello");
        let exact = "x".repeat(5000);
        assert_eq!(truncate(&exact, 5000), exact);
    }

    #[test]
    fn test_truncate_long_caps_at_limit() {
        let long = "x".repeat(6000);
        let cut = truncate(&long, 5000);
        assert_eq!(cut.chars().count(), 5000);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        // 10 chars, 30 bytes
        let wide = "好".repeat(10);
        let cut = truncate(&wide, 8);
        assert_eq!(cut.chars().count(), 8);
        assert!(cut.ends_with("..."));
        assert!(cut.starts_with("好好好好好"));
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let long = "y".repeat(7000);
        let once = truncate(&long, 5000);
        assert_eq!(truncate(&once, 5000), once);
    }
}
