use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use rand::Rng;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use tracing::instrument;

use crate::auth::services::AdminUser;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

use super::repo::{self, Metrics, SocialAccount};

pub const INSTAGRAM: &str = "instagram";
pub const YOUTUBE: &str = "youtube";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialStats {
    pub platform: String,
    pub followers: i64,
    pub posts: i64,
    pub engagement: i64,
    pub views: i64,
    pub likes: i64,
    pub last_updated: String,
}

impl SocialStats {
    fn from_row(row: SocialAccount) -> Self {
        Self {
            platform: row.platform,
            followers: row.followers,
            posts: row.posts,
            engagement: row.engagement,
            views: row.views,
            likes: row.likes,
            last_updated: row
                .last_updated
                .format(&Rfc3339)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Suggestion {
    pub platform: &'static str,
    pub r#type: &'static str,
    pub message: &'static str,
    pub priority: &'static str,
}

/// Placeholder metrics until real platform API credentials are wired in.
fn sample_instagram_metrics() -> Metrics {
    let mut rng = rand::thread_rng();
    Metrics {
        followers: rng.gen_range(5000..15000),
        posts: rng.gen_range(50..150),
        engagement: rng.gen_range(2..7),
        views: 0,
        likes: rng.gen_range(500..1500),
    }
}

fn sample_youtube_metrics() -> Metrics {
    let mut rng = rand::thread_rng();
    Metrics {
        followers: rng.gen_range(1000..6000),
        posts: rng.gen_range(20..70),
        engagement: rng.gen_range(1..4),
        views: rng.gen_range(10000..60000),
        likes: 0,
    }
}

pub fn suggestions_for(
    instagram: Option<&SocialAccount>,
    youtube: Option<&SocialAccount>,
) -> Vec<Suggestion> {
    let mut out = Vec::new();

    if let Some(ig) = instagram {
        if ig.engagement < 3 {
            out.push(Suggestion {
                platform: "instagram",
                r#type: "engagement",
                message: "Your Instagram engagement is low. Consider posting more interactive content like polls and questions.",
                priority: "high",
            });
        }
        if ig.posts < 30 {
            out.push(Suggestion {
                platform: "instagram",
                r#type: "content",
                message: "Increase your posting frequency. Aim for at least 3-4 posts per week.",
                priority: "medium",
            });
        }
    }

    if let Some(yt) = youtube {
        if yt.engagement < 2 {
            out.push(Suggestion {
                platform: "youtube",
                r#type: "engagement",
                message: "YouTube engagement could be improved. Try adding call-to-actions in your videos.",
                priority: "high",
            });
        }
    }

    out.push(Suggestion {
        platform: "general",
        r#type: "trend",
        message: "Beauty tutorials and before/after transformations perform well. Consider creating more of this content.",
        priority: "medium",
    });

    out
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/social/stats", get(stats))
        .route("/social/instagram/update", post(update_instagram))
        .route("/social/youtube/update", post(update_youtube))
        .route("/social/suggestions", get(suggestions))
}

#[instrument(skip(state))]
async fn stats(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SocialStats>>>, ApiError> {
    let rows = repo::list(&state.db).await?;
    let stats = rows.into_iter().map(SocialStats::from_row).collect();
    Ok(ApiResponse::data(stats))
}

#[instrument(skip(state))]
async fn update_instagram(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SocialStats>>, ApiError> {
    let row = repo::upsert(&state.db, INSTAGRAM, &sample_instagram_metrics()).await?;
    Ok(ApiResponse::data(SocialStats::from_row(row)))
}

#[instrument(skip(state))]
async fn update_youtube(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SocialStats>>, ApiError> {
    let row = repo::upsert(&state.db, YOUTUBE, &sample_youtube_metrics()).await?;
    Ok(ApiResponse::data(SocialStats::from_row(row)))
}

#[instrument(skip(state))]
async fn suggestions(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Suggestion>>>, ApiError> {
    let instagram = repo::find(&state.db, INSTAGRAM).await?;
    let youtube = repo::find(&state.db, YOUTUBE).await?;
    Ok(ApiResponse::data(suggestions_for(
        instagram.as_ref(),
        youtube.as_ref(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn account(platform: &str, engagement: i64, posts: i64) -> SocialAccount {
        SocialAccount {
            platform: platform.to_string(),
            followers: 8000,
            posts,
            engagement,
            views: 0,
            likes: 900,
            last_updated: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn general_trend_suggestion_always_present() {
        let out = suggestions_for(None, None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].platform, "general");
    }

    #[test]
    fn low_instagram_engagement_flags_high_priority() {
        let ig = account(INSTAGRAM, 2, 80);
        let out = suggestions_for(Some(&ig), None);
        assert_eq!(out[0].r#type, "engagement");
        assert_eq!(out[0].priority, "high");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn sparse_instagram_posting_flags_content() {
        let ig = account(INSTAGRAM, 5, 10);
        let out = suggestions_for(Some(&ig), None);
        assert!(out.iter().any(|s| s.r#type == "content"));
    }

    #[test]
    fn healthy_accounts_get_only_the_trend_tip() {
        let ig = account(INSTAGRAM, 5, 80);
        let yt = account(YOUTUBE, 3, 40);
        let out = suggestions_for(Some(&ig), Some(&yt));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].r#type, "trend");
    }

    #[test]
    fn sample_metrics_stay_in_expected_bands() {
        for _ in 0..20 {
            let ig = sample_instagram_metrics();
            assert!((5000..15000).contains(&ig.followers));
            assert!((2..7).contains(&ig.engagement));
            let yt = sample_youtube_metrics();
            assert!((10000..60000).contains(&yt.views));
            assert!((1..4).contains(&yt.engagement));
        }
    }
}
