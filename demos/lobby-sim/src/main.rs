//! Simulates a host driving a lobby through a few settings updates,
//! showing change detection, wire round trips, and the diagnostic
//! rendering (note the masked password in the log output).
//!
//! Run with `RUST_LOG=debug cargo run -p lobby-sim` to also see the
//! skipped no-op updates.

use matchforge_protocol::{MatchType, Mod, ModValue, RoomId, RoomSettings};
use matchforge_room::Lobby;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut lobby = Lobby::new(RoomId(1));
    let mut events = lobby.subscribe();

    // Watcher task: what a connected client would do with change
    // notifications.
    let watcher = tokio::spawn(async move {
        while let Ok(change) = events.recv().await {
            tracing::info!(room = %change.room_id, "client saw update: {}", change.new);
        }
    });

    // The host names the room and picks a map.
    let mut settings = RoomSettings {
        name: "Friday tourney".into(),
        beatmap_id: 1957659,
        beatmap_checksum: "2b8d4f1c9a7e3f60".into(),
        playlist_item_id: 1,
        password: "hunter2".into(),
        ..RoomSettings::default()
    };
    lobby.apply(settings.clone());

    // A re-send of identical settings: detected as a no-op.
    lobby.apply(settings.clone());

    // Force DT, allow HD, switch to teams. Sent over the wire as an
    // atomic unit and replaced wholesale on receipt.
    settings.required_mods = vec![Mod::new("DT").with_param("speed_change", ModValue::Float(1.5))];
    settings.allowed_mods = vec![Mod::new("HD")];
    settings.match_type = MatchType::TeamVersus;
    let encoded = settings.to_bytes();
    tracing::info!(bytes = encoded.len(), "host transmits settings update");
    lobby
        .apply_encoded(&encoded)
        .expect("freshly encoded settings always decode");

    // A corrupted update is rejected and the lobby keeps its state.
    let mut corrupted = encoded.clone();
    corrupted.truncate(corrupted.len() / 2);
    if let Err(err) = lobby.apply_encoded(&corrupted) {
        tracing::error!(%err, "update rejected, keeping previous settings");
    }
    tracing::info!("current settings: {}", lobby.settings());

    drop(lobby);
    let _ = watcher.await;
}
