//! Editor session integration tests.

use std::sync::Arc;

use clipdeck_models::{decode_share_query, Clip, ClipId, TimeRange};
use clipdeck_timeline::headless::{HeadlessFactory, HeadlessMedia, HeadlessWaveform, MediaCall};
use clipdeck_timeline::{
    ClipTimeline, Command, EditorSession, MediaErrorKind, MediaEvent, MediaSession,
    MemoryClipboard, Outcome, Recovery, RegionId, RegionPhase, StreamConfig, TimelineConfig,
    TimelineError, WaveformEvent,
};

fn seeded() -> ClipTimeline<HeadlessMedia, HeadlessWaveform> {
    ClipTimeline::new(
        TimelineConfig::default(),
        vec![
            Clip::new(1, "Kickoff", 10.0, 30.0),
            Clip::new(2, "Goal", 600.0, 650.0),
        ],
        HeadlessMedia::new(),
        HeadlessWaveform::new(4000.0, 800.0),
    )
}

fn region(id: u64, start: f64, end: f64, phase: RegionPhase) -> Command {
    Command::Waveform {
        event: WaveformEvent::Region {
            id: RegionId::clip(ClipId(id)),
            start,
            end,
            phase,
        },
    }
}

/// Test a full editing pass: load, create, select, drag, highlight, share.
#[tokio::test]
async fn test_editing_session_end_to_end() {
    let clipboard = MemoryClipboard::new();
    let (editor, _task) = EditorSession::spawn(seeded(), Arc::new(clipboard.clone()));

    editor.send(Command::Load).await.unwrap();
    editor
        .send(Command::Media { event: MediaEvent::Ready { duration: 1000.0 } })
        .await
        .unwrap();
    editor
        .send(Command::Waveform { event: WaveformEvent::Ready { duration: 1000.0 } })
        .await
        .unwrap();

    let created = editor
        .send(Command::CreateClip {
            label: "Save".into(),
            from: "12:00".into(),
            to: "13:30".into(),
        })
        .await
        .unwrap();
    assert_eq!(created, Outcome::Clip { clip: Clip::new(3, "Save", 720.0, 810.0) });

    editor.send(Command::SelectClip { id: ClipId(3) }).await.unwrap();
    editor.send(region(3, 720.0, 810.0, RegionPhase::Start)).await.unwrap();
    editor.send(region(3, 730.0, 820.0, RegionPhase::Drag)).await.unwrap();
    editor.send(Command::FrameTick).await.unwrap();
    editor.send(region(3, 730.0, 820.0, RegionPhase::End)).await.unwrap();

    editor.send(Command::SetChecked { ids: vec![ClipId(3), ClipId(1)] }).await.unwrap();
    editor.send(Command::CreateHighlight).await.unwrap();

    editor.send(Command::OpenShare { id: Some(ClipId(2)) }).await.unwrap();
    let shared = editor.send(Command::Share).await.unwrap();

    let snapshot = editor.snapshot();
    assert_eq!(snapshot.clips[2], Clip::new(3, "Updated Clip", 730.0, 820.0));
    assert_eq!(snapshot.current_time, 730.0);
    assert!(snapshot.waveform_ready);
    assert!(snapshot.checked.is_empty());

    let highlight = &snapshot.highlights[0];
    assert_eq!(highlight.video_name, "하이라이트 1");
    assert_eq!(highlight.clips, vec![TimeRange::new(10.0, 30.0), TimeRange::new(730.0, 820.0)]);
    assert_eq!(highlight.meta, vec!["Kickoff".to_string(), "Updated Clip".to_string()]);

    let Outcome::Shared { share } = shared else {
        panic!("expected share outcome");
    };
    let payload = decode_share_query(&share.url).unwrap();
    assert_eq!((payload.from, payload.to), (600.0, 650.0));
    assert_eq!(payload.clip_name.as_deref(), Some("Goal"));
    assert_eq!(clipboard.entries(), vec![share.url]);
}

/// Test that a rejected edit leaves prior state untouched.
#[tokio::test]
async fn test_rejected_edits_do_not_commit() {
    let (editor, _task) = EditorSession::spawn(seeded(), Arc::new(MemoryClipboard::new()));
    editor
        .send(Command::Media { event: MediaEvent::Ready { duration: 700.0 } })
        .await
        .unwrap();

    let before = editor.snapshot().clips;

    let err = editor
        .send(Command::UpdateClip { id: ClipId(2), from: "10:00".into(), to: "10:20".into() })
        .await
        .unwrap_err();
    assert!(err.is_user_correctable());

    editor.send(Command::SelectClip { id: ClipId(2) }).await.unwrap();
    editor.send(region(2, 600.0, 650.0, RegionPhase::Start)).await.unwrap();
    editor.send(region(2, 650.0, 750.0, RegionPhase::Drag)).await.unwrap();
    let err = editor.send(region(2, 650.0, 750.0, RegionPhase::End)).await.unwrap_err();
    assert!(matches!(err, TimelineError::Validation(_)));

    assert_eq!(editor.snapshot().clips, before);
}

/// Test that switching selection never leaves a stale clip region.
#[test]
fn test_single_clip_region_across_selections() {
    let mut timeline = seeded();
    timeline.dispatch(Command::Load).unwrap();
    timeline
        .dispatch(Command::Media { event: MediaEvent::Ready { duration: 1000.0 } })
        .unwrap();

    for id in [1, 2, 1, 2] {
        timeline.dispatch(Command::SelectClip { id: ClipId(id) }).unwrap();
    }

    let regions = timeline.sync().waveform().state().regions;
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].id, RegionId::clip(ClipId(2)));
    assert_eq!((regions[0].start, regions[0].end), (600.0, 650.0));
}

fn fatal(kind: MediaErrorKind) -> Command {
    Command::Media {
        event: MediaEvent::Error { kind, fatal: true, details: None },
    }
}

/// Test that the editor runs the media recovery policy on its stream.
#[test]
fn test_editor_media_recovery() {
    let factory = HeadlessFactory::default();
    let log = factory.log();
    let mut timeline = ClipTimeline::new(
        TimelineConfig::default(),
        vec![Clip::new(2, "Goal", 600.0, 650.0)],
        MediaSession::new(factory, StreamConfig::default()),
        HeadlessWaveform::new(4000.0, 800.0),
    );
    timeline.dispatch(Command::Load).unwrap();
    timeline
        .dispatch(Command::Media { event: MediaEvent::Ready { duration: 1000.0 } })
        .unwrap();
    timeline.dispatch(Command::SelectClip { id: ClipId(2) }).unwrap();

    assert_eq!(
        timeline.dispatch(fatal(MediaErrorKind::Network)).unwrap(),
        Outcome::Recovery { recovery: Recovery::ReloadedSegments }
    );
    assert_eq!(
        timeline.dispatch(fatal(MediaErrorKind::Network)).unwrap(),
        Outcome::Recovery { recovery: Recovery::Recreated }
    );
    assert_eq!(log.live_sessions(), 1);
    assert!(log
        .calls()
        .contains(&MediaCall::Create { generation: 2, start_position: Some(600.0) }));
    assert_eq!(timeline.sync().media().generation(), 2);

    // A parsed manifest makes the next failure recoverable in place again.
    timeline
        .dispatch(Command::Media { event: MediaEvent::Ready { duration: 1000.0 } })
        .unwrap();
    assert_eq!(
        timeline.dispatch(fatal(MediaErrorKind::Network)).unwrap(),
        Outcome::Recovery { recovery: Recovery::ReloadedSegments }
    );
    assert_eq!(
        timeline.dispatch(fatal(MediaErrorKind::Other)).unwrap(),
        Outcome::Recovery { recovery: Recovery::Recreated }
    );
    assert_eq!(log.live_sessions(), 1);
}
