//! Video catalog collaborator backing the `/api/videos` route group.
//!
//! In-memory only. The catalog exists so the JSON group has something real
//! to list and accept; nothing persists across restarts.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub duration_secs: u64,
}

/// Payload accepted when registering a new video.
#[derive(Debug, Deserialize)]
pub struct NewVideo {
    pub title: String,
    #[serde(default)]
    pub duration_secs: u64,
}

#[derive(Debug)]
pub struct VideoCatalog {
    videos: RwLock<Vec<Video>>,
}

impl VideoCatalog {
    pub fn seeded() -> Self {
        let videos = vec![
            Video {
                id: Uuid::new_v4(),
                title: "Getting started".to_string(),
                duration_secs: 312,
            },
            Video {
                id: Uuid::new_v4(),
                title: "Composing the pipeline".to_string(),
                duration_secs: 504,
            },
        ];
        Self {
            videos: RwLock::new(videos),
        }
    }

    pub fn list(&self) -> Vec<Video> {
        self.videos
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn find(&self, id: Uuid) -> Option<Video> {
        self.videos
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .find(|video| video.id == id)
            .cloned()
    }

    pub fn add(&self, new: NewVideo) -> Video {
        let video = Video {
            id: Uuid::new_v4(),
            title: new.title,
            duration_secs: new.duration_secs,
        };
        self.videos
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(video.clone());
        video
    }
}
