use super::*;
use serde_json::json;

fn job(dir: &Path, extra_options: serde_json::Value) -> RenderJob {
    let value = json!({
        "game": "maimai",
        "owner": "player",
        "output_dir": dir,
        "intro": [{"title": "Intro", "duration": 3.0, "text": "hello"}],
        "content": [
            {"title": "Best: 1", "start": 0, "end": 10},
            {"title": "Best 2", "start": 0, "end": 10}
        ],
        "ending": [{"title": "Bye", "duration": 2.0}],
        "options": extra_options,
    });
    serde_json::from_value(value).unwrap()
}

#[test]
fn paths_use_consecutive_indices() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(dir.path(), json!({}));
    let ex = Exporter::new(&job).unwrap();

    assert_eq!(ex.sources().len(), 4);
    assert_eq!(ex.segment_path(0), Some(dir.path().join("0_Intro.mp4")));
    assert_eq!(ex.segment_path(1), Some(dir.path().join("1_Best 1.mp4")));
    assert_eq!(ex.segment_path(3), Some(dir.path().join("3_Bye.mp4")));
    assert_eq!(ex.segment_path(4), None);
    let full = dir.path().join("player_FULL_VIDEO.mp4");
    assert_eq!(ex.full_video_path(), full);
}

#[test]
fn existing_segment_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(dir.path(), json!({}));
    let existing = dir.path().join("1_Best 1.mp4");
    std::fs::write(&existing, b"already rendered").unwrap();

    let ex = Exporter::new(&job).unwrap();
    let first = ex.export_segment(1, false);
    let second = ex.export_segment(1, false);
    for r in [&first, &second] {
        assert_eq!(r.status, RenderStatus::Skipped);
        assert_eq!(r.output.as_deref(), Some(existing.as_path()));
    }
    assert_eq!(std::fs::read(&existing).unwrap(), b"already rendered");
}

#[test]
fn batch_with_all_outputs_present_does_no_work() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(dir.path(), json!({}));
    let ex = Exporter::new(&job).unwrap();
    for i in 0..job.segment_count() {
        std::fs::write(ex.segment_path(i).unwrap(), b"x").unwrap();
    }
    let results = ex.export_all_segments(false);
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.status == RenderStatus::Skipped));
}

#[test]
fn out_of_range_index_is_an_error_result() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(dir.path(), json!({}));
    let r = Exporter::new(&job).unwrap().export_segment(9, false);
    assert_eq!(r.status, RenderStatus::Error);
    assert!(r.output.is_none());
    assert!(r.message.contains("out of range"));
}

#[test]
fn info_only_timeline_appends_when_merge_is_infeasible() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = job(dir.path(), json!({"tail_merge": true}));
    job.content.clear();
    let tl = Exporter::new(&job).unwrap().build_full_timeline().unwrap();

    assert_eq!(tl.entries.len(), 2);
    assert!(tl.merge_fallback.is_some());
    assert!((tl.duration - 4.0).abs() < 1e-9);
}

#[test]
fn concat_requires_segment_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(FINAL_OUTPUT_NAME), b"old").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
    assert!(matches!(
        concat_existing(dir.path()),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn result_serializes_lowercase_status() {
    let r = RenderResult::skipped(PathBuf::from("a.mp4"));
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v["status"], "skipped");
}

#[test]
fn failed_write_leaves_no_output_behind() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("segments").join("0_Intro.mp4");

    let err = write_atomically(&out, |partial| {
        std::fs::write(partial, b"half an encode").unwrap();
        Err(EngineError::encode("ffmpeg exited with status 1"))
    })
    .unwrap_err();
    assert!(matches!(err, EngineError::Encode(_)), "{err:?}");
    assert!(!out.exists());
    let leftovers = std::fs::read_dir(out.parent().unwrap()).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[test]
fn successful_write_lands_at_final_name() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("1_Best 1.mp4");
    std::fs::write(&out, b"stale").unwrap();

    write_atomically(&out, |partial| {
        assert_ne!(partial, out.as_path());
        assert_eq!(partial.extension().unwrap(), "mp4");
        std::fs::write(partial, b"fresh").map_err(|e| EngineError::Other(e.into()))
    })
    .unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), b"fresh");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
