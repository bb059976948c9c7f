use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tsdb_core::{Descriptor, Tier};
use tsdb_engine::{StatsSnapshot, SweepSummary};

/// Wire representation of a [`Descriptor`], used for both the create
/// response and the metadata endpoint.
#[derive(Debug, Serialize)]
pub struct BlobResponse {
    pub file_id: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub created_at: String,
    pub last_accessed: String,
    pub tier: Tier,
    pub checksum: String,
}

impl From<Descriptor> for BlobResponse {
    fn from(d: Descriptor) -> Self {
        Self {
            file_id: d.id.to_string(),
            filename: d.filename,
            content_type: d.content_type,
            size: d.size,
            created_at: iso_millis(d.created_at),
            last_accessed: iso_millis(d.last_accessed),
            tier: d.tier,
            checksum: d.checksum,
        }
    }
}

pub fn iso_millis(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_files: u64,
    pub total_size: u64,
    pub tiers: TierBuckets,
    pub thresholds: Thresholds,
}

#[derive(Debug, Serialize)]
pub struct TierBuckets {
    #[serde(rename = "HOT")]
    pub hot: Bucket,
    #[serde(rename = "WARM")]
    pub warm: Bucket,
    #[serde(rename = "COLD")]
    pub cold: Bucket,
}

#[derive(Debug, Serialize)]
pub struct Bucket {
    pub count: u64,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct Thresholds {
    pub hot_max_age_days: i64,
    pub warm_max_age_days: i64,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(s: StatsSnapshot) -> Self {
        Self {
            total_files: s.total_files,
            total_size: s.total_size,
            tiers: TierBuckets {
                hot: Bucket {
                    count: s.hot.count,
                    size: s.hot.size,
                },
                warm: Bucket {
                    count: s.warm.count,
                    size: s.warm.size,
                },
                cold: Bucket {
                    count: s.cold.count,
                    size: s.cold.size,
                },
            },
            thresholds: Thresholds {
                hot_max_age_days: s.thresholds.hot_max_age_days,
                warm_max_age_days: s.thresholds.warm_max_age_days,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub scanned: u64,
    pub transitions: tsdb_engine::TransitionCounts,
    pub duration_ms: u64,
}

impl From<SweepSummary> for SweepResponse {
    fn from(s: SweepSummary) -> Self {
        Self {
            scanned: s.scanned,
            transitions: s.transitions,
            duration_ms: s.duration_ms,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct UpdateLastAccessedRequest {
    pub days_ago: u64,
}
