//! Renders a [`SyncReport`] through `tracing`.

use tracing::{error, info, warn};

use crate::error::SyncError;
use crate::models::SyncOutcome;
use crate::sync::{SyncEvent, SyncReport, MIN_TRACK_URI_LEN};

pub fn render(report: &SyncReport) {
    info!("sync run against {}", report.service);
    for event in &report.events {
        render_event(event);
    }
    match report.outcome {
        SyncOutcome::Changed { count } => info!("sync complete: playlist updated with {} tracks", count),
        SyncOutcome::Unchanged { count } => info!("sync complete: playlist already matches {} liked tracks", count),
        SyncOutcome::EmptyLikes => info!("sync complete: nothing to sync"),
        SyncOutcome::Failed(stage) => error!("sync failed during {}", stage),
    }
}

fn render_event(event: &SyncEvent) {
    match event {
        SyncEvent::TokenFailed(e) => error!("could not acquire access token: {}", describe(e)),
        SyncEvent::LikesFetched { count } => info!("fetched {} liked tracks", count),
        SyncEvent::LikesFailed(e) => {
            error!("could not fetch liked tracks: {}; leaving playlist untouched", describe(e))
        }
        SyncEvent::InvalidTracks(e) => error!(
            "liked tracks failed validation (minimum length {}): {}; aborting",
            MIN_TRACK_URI_LEN,
            describe(e)
        ),
        SyncEvent::EmptyLikes => {
            warn!("no liked tracks returned; skipping playlist update so it is not cleared")
        }
        SyncEvent::PlaylistUnknown => {
            warn!("current playlist contents unknown; assuming they changed")
        }
        SyncEvent::PlaylistUnchanged { count } => {
            info!("playlist already holds the same {} tracks; skipping replace", count)
        }
        SyncEvent::PlaylistReplaced { count } => info!("replaced playlist contents with {} tracks", count),
        SyncEvent::PlaylistWriteFailed { count } => {
            error!("failed to replace playlist contents with {} tracks", count)
        }
        SyncEvent::MetadataUpdated { name } => info!("playlist details updated (name: {})", name),
        SyncEvent::MetadataFailed => warn!("playlist details not updated; continuing"),
    }
}

fn describe(e: &SyncError) -> String {
    match e {
        SyncError::Api { status, detail } => format!("status {} ({})", status, detail),
        other => other.to_string(),
    }
}
