use crate::{
    CaptureState, ClipEntry, DEFAULT_CATALOG_KEY, KeyValueStore, MemoError, MemoScreen,
    MemoryStore, PERMISSION_REQUIRED_MESSAGE, PLAY_FAILED_MESSAGE, SAVE_FAILED_MESSAGE,
    START_FAILED_MESSAGE,
    tests::fakes::{FakeMicrophone, FakePlayer},
};

use std::sync::{Arc, atomic::Ordering};

type TestScreen = MemoScreen<FakeMicrophone, FakePlayer, Arc<MemoryStore>>;

struct Rig {
    screen: TestScreen,
    mic: FakeMicrophone,
    player: FakePlayer,
    store: Arc<MemoryStore>,
}

async fn rig_with_store(store: Arc<MemoryStore>) -> Rig {
    let mic = FakeMicrophone::default();
    let player = FakePlayer::default();
    let mut screen = MemoScreen::new(
        mic.clone(),
        player.clone(),
        Arc::clone(&store),
        DEFAULT_CATALOG_KEY,
    );
    screen.load().await;
    Rig {
        screen,
        mic,
        player,
        store,
    }
}

async fn rig() -> Rig {
    rig_with_store(Arc::new(MemoryStore::new())).await
}

#[allow(clippy::unwrap_used)]
async fn record(screen: &mut TestScreen, name: &str) {
    screen.set_name(name);
    screen.start_capture().await.unwrap();
    screen.stop_capture().await.unwrap();
}

/// WHAT: Start, stop, and the clip is listed and persisted
/// WHY: End-to-end recording flow
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_granted_permission_when_recording_memo_then_single_entry_saved() {
    // Given: A freshly loaded screen
    let Rig {
        mut screen, store, ..
    } = rig().await;

    // When: Recording "memo1"
    screen.set_name("memo1");
    screen.start_capture().await.unwrap();
    assert!(screen.snapshot().capture.is_capturing());
    screen.stop_capture().await.unwrap();

    // Then: One entry with name, label and source; name field cleared
    let state = screen.snapshot();
    assert_eq!(state.capture, CaptureState::Idle);
    assert_eq!(state.clips.len(), 1);
    assert_eq!(state.clips[0].name, "memo1");
    assert!(!state.clips[0].duration_label.is_empty());
    assert!(!state.clips[0].source.as_str().is_empty());
    assert_eq!(state.name_input, "");
    assert_eq!(state.message, "");

    // And: Storage holds exactly that entry
    let document = store.get(DEFAULT_CATALOG_KEY).await.unwrap().unwrap();
    let saved: Vec<ClipEntry> = serde_json::from_str(&document).unwrap();
    assert_eq!(saved, state.clips);
}

/// WHAT: Denied permission shows a message and stays idle
/// WHY: Denial is reported to the user, never thrown
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_denied_permission_when_starting_then_message_shown() {
    // Given: A screen over a denying microphone
    let mut screen = MemoScreen::new(
        FakeMicrophone::denying(),
        FakePlayer::default(),
        MemoryStore::new(),
        DEFAULT_CATALOG_KEY,
    );

    // When: Starting
    screen.start_capture().await.unwrap();

    // Then: Permission message, idle
    let state = screen.snapshot();
    assert_eq!(state.message, PERMISSION_REQUIRED_MESSAGE);
    assert_eq!(state.capture, CaptureState::Idle);
}

/// WHAT: Capture start failure is absorbed with a message
/// WHY: No I/O failure crosses into the presentation layer
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_microphone_when_starting_then_message_and_idle() {
    let Rig {
        mut screen, mic, ..
    } = rig().await;
    mic.script.fail_begin.store(true, Ordering::SeqCst);

    screen.start_capture().await.unwrap();

    let state = screen.snapshot();
    assert_eq!(state.message, START_FAILED_MESSAGE);
    assert_eq!(state.capture, CaptureState::Idle);
}

/// WHAT: Stop with nothing recording faults through the facade
/// WHY: Programming errors still reach the caller
#[tokio::test]
async fn given_idle_screen_when_stopping_then_invalid_transition() {
    let Rig { mut screen, .. } = rig().await;

    let result = screen.stop_capture().await;

    assert!(matches!(
        result,
        Err(MemoError::InvalidStateTransition { .. })
    ));
}

/// WHAT: Blank names fall back to the clip's position
/// WHY: Every clip has a readable name
#[tokio::test]
async fn given_blank_name_when_recording_then_named_by_position() {
    let Rig { mut screen, .. } = rig().await;

    record(&mut screen, "").await;
    record(&mut screen, "   ").await;

    let names: Vec<String> = screen.snapshot().clips.into_iter().map(|c| c.name).collect();
    assert_eq!(names, ["Recording 1", "Recording 2"]);
}

/// WHAT: A typed name is stored exactly as entered
/// WHY: Names are user-owned display strings, spacing included
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_padded_name_when_recording_then_name_kept_verbatim() {
    let Rig {
        mut screen, store, ..
    } = rig().await;

    record(&mut screen, "  memo1 ").await;

    let clips = screen.snapshot().clips;
    assert_eq!(clips[0].name, "  memo1 ");
    let document = store.get(DEFAULT_CATALOG_KEY).await.unwrap().unwrap();
    assert!(document.contains("\"  memo1 \""));
}

/// WHAT: Storage write failure keeps the clip and shows a message
/// WHY: Persistence failures are recoverable
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_store_when_recording_then_clip_listed_and_message_shown() {
    // Given: Writes fail
    let Rig {
        mut screen, store, ..
    } = rig().await;
    store.set_fail_writes(true);

    // When: Recording
    screen.set_name("memo");
    screen.start_capture().await.unwrap();
    let result = screen.stop_capture().await;

    // Then: No error surfaces, clip is in memory, message set
    assert!(result.is_ok());
    let state = screen.snapshot();
    assert_eq!(state.clips.len(), 1);
    assert_eq!(state.message, SAVE_FAILED_MESSAGE);
    assert_eq!(store.get(DEFAULT_CATALOG_KEY).await.unwrap(), None);
}

/// WHAT: Editing and capturing can overlap
/// WHY: They touch disjoint state
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_clip_in_edit_when_recording_then_both_states_coexist() {
    // Given: One clip, in edit
    let Rig { mut screen, .. } = rig().await;
    record(&mut screen, "first").await;
    screen.begin_edit(0).unwrap();

    // When: Starting a capture
    screen.start_capture().await.unwrap();

    // Then: Capturing and editing at once
    let state = screen.snapshot();
    assert!(state.capture.is_capturing());
    assert_eq!(state.editing, Some(0));

    // When: Saving the edit, then stopping
    screen.save_edit("renamed".to_string()).await.unwrap();
    screen.stop_capture().await.unwrap();

    // Then: Rename applied, cursor cleared, second clip appended
    let state = screen.snapshot();
    assert_eq!(state.editing, None);
    assert_eq!(state.clips[0].name, "renamed");
    assert_eq!(state.clips.len(), 2);
}

/// WHAT: Save with no clip in edit does nothing
/// WHY: A stale save intent must not rename anything
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_cursor_when_saving_edit_then_catalog_unchanged() {
    let Rig { mut screen, .. } = rig().await;
    record(&mut screen, "first").await;
    let before = screen.snapshot();

    screen.save_edit("other".to_string()).await.unwrap();

    assert_eq!(screen.snapshot(), before);
}

/// WHAT: Playing a fresh clip uses the live handle
/// WHY: The capture's handle is playable immediately
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_fresh_clip_when_playing_then_live_handle_played() {
    // Given: A clip recorded this session
    let Rig {
        mut screen, player, ..
    } = rig().await;
    record(&mut screen, "memo").await;
    let handle_id = screen.snapshot().clips[0]
        .playable
        .as_ref()
        .map(|h| h.id())
        .unwrap();

    // When: Playing it
    screen.play(0).unwrap();

    // Then: That handle was played, nothing rehydrated
    let log = player.log.lock().unwrap();
    assert_eq!(log.played, vec![handle_id]);
    assert!(log.rehydrated.is_empty());
}

/// WHAT: Clips loaded after restart are rehydrated once, then cached
/// WHY: Playback after restart works from the source locator
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_reloaded_clip_when_playing_twice_then_rehydrated_once() {
    // Given: A clip recorded, then a restart over the same store
    let Rig {
        mut screen, store, ..
    } = rig().await;
    record(&mut screen, "memo").await;
    let source = screen.snapshot().clips[0].source.clone();
    drop(screen);

    let Rig {
        mut screen, player, ..
    } = rig_with_store(store).await;
    assert!(screen.snapshot().clips[0].playable.is_none());

    // When: Playing twice
    screen.play(0).unwrap();
    screen.play(0).unwrap();

    // Then: One rehydration, two plays of the same handle
    let log = player.log.lock().unwrap();
    assert_eq!(log.rehydrated, vec![source]);
    assert_eq!(log.played.len(), 2);
    assert_eq!(log.played[0], log.played[1]);
}

/// WHAT: Rehydration failure is absorbed with a message
/// WHY: A missing audio file must not crash the screen
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_missing_audio_when_playing_reloaded_clip_then_message_shown() {
    // Given: A reloaded clip whose audio cannot be found
    let Rig {
        mut screen, store, ..
    } = rig().await;
    record(&mut screen, "memo").await;
    drop(screen);
    let Rig {
        mut screen, player, ..
    } = rig_with_store(store).await;
    player.log.lock().unwrap().fail_rehydrate = true;

    // When: Playing
    let result = screen.play(0);

    // Then: No error, message shown, nothing played
    assert!(result.is_ok());
    assert_eq!(screen.snapshot().message, PLAY_FAILED_MESSAGE);
    assert!(player.log.lock().unwrap().played.is_empty());
}

/// WHAT: Out-of-range play and delete fault through the facade
/// WHY: Index contract violations must be detectable
#[tokio::test]
async fn given_empty_catalog_when_playing_or_deleting_then_index_out_of_range() {
    let Rig { mut screen, .. } = rig().await;

    assert!(matches!(
        screen.play(0),
        Err(MemoError::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        screen.delete(0).await,
        Err(MemoError::IndexOutOfRange { .. })
    ));
}

/// WHAT: Watchers wake on prompt, capture and catalog changes
/// WHY: The presentation layer re-renders from notifications only
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_watcher_when_screen_changes_then_snapshot_is_current() {
    // Given: A watcher
    let Rig { mut screen, .. } = rig().await;
    let mut watcher = screen.subscribe();

    // When: Typing a name
    screen.set_name("draft");

    // Then: Watcher wakes with the new name
    watcher.changed().await.unwrap();
    assert_eq!(watcher.snapshot().name_input, "draft");

    // When: Recording a clip
    screen.start_capture().await.unwrap();
    screen.stop_capture().await.unwrap();

    // Then: Watcher snapshot matches the screen
    watcher.changed().await.unwrap();
    assert_eq!(watcher.snapshot(), screen.snapshot());
}

/// WHAT: Watcher reports a closed screen
/// WHY: Render loops need a clean exit
#[tokio::test]
async fn given_dropped_screen_when_waiting_then_channel_closed() {
    let Rig { screen, .. } = rig().await;
    let mut watcher = screen.subscribe();
    drop(screen);

    let result = watcher.changed().await;

    assert!(matches!(result, Err(MemoError::ChannelClosed { .. })));
}
