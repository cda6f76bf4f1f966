use serde::{Deserialize, Serialize};

/// Snapshot of `GET /api/videos/limits`. A zero max means unlimited.
///
/// Usage can change between runs, so a snapshot is fetched per invocation and
/// never cached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    #[serde(default)]
    pub max_videos_per_month: i64,
    #[serde(default)]
    pub videos_used_this_month: i64,
    #[serde(default, rename = "maxVideoDurationSeconds")]
    pub max_duration_seconds: i64,
}

impl Quota {
    pub fn is_unlimited(&self) -> bool {
        self.max_videos_per_month == 0
    }

    /// Uploads left this month, or `None` when the plan is unlimited. May be negative.
    pub fn remaining(&self) -> Option<i64> {
        if self.is_unlimited() {
            None
        } else {
            Some(self.max_videos_per_month - self.videos_used_this_month)
        }
    }
}
