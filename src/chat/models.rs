//! Chat data models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    SongShare,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::SongShare => "song_share",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(MessageKind::Text),
            "song_share" => Some(MessageKind::SongShare),
            _ => None,
        }
    }
}

/// Structured payload for song_share messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongData {
    pub spotify_id: String,
    pub track_name: String,
    pub artist: String,
    #[serde(default)]
    pub album: String,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
}

/// A message inside a match conversation, ordered by creation time
/// ascending. The read flag is scoped to the non-sender.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: usize,
    pub match_id: usize,
    pub sender_id: usize,
    pub content: String,
    pub kind: MessageKind,
    pub song_data: Option<SongData>,
    pub is_read: bool,
    /// Unix timestamp.
    pub created_at: i64,
}
