use super::*;

const JOB: &str = r#"{
    "game": "maimai",
    "owner": "player",
    "output_dir": "out",
    "intro": [{"title": "Intro", "duration": 3, "text": "hi"}],
    "content": [{"title": "Best 1", "video": "v.mp4", "start": 10, "end": 20, "text": "nice"}],
    "ending": [{"title": "Bye", "duration": 2}]
}"#;

#[test]
fn job_parses_with_default_options() {
    let job = RenderJob::from_reader(JOB.as_bytes()).unwrap();
    assert_eq!(job.game, GameKind::Maimai);
    assert_eq!(job.segment_count(), 3);
    assert_eq!(job.options, RenderOptions::default());
    assert_eq!(job.options.effective_transition(), 1.0);
    assert_eq!(job.options.segment_encode().preset, "ultrafast");
    assert_eq!(job.options.full_encode().threads, 12);
}

#[test]
fn disabled_transition_schedules_zero() {
    let opts = RenderOptions {
        auto_transition: false,
        ..RenderOptions::default()
    };
    assert_eq!(opts.effective_transition(), 0.0);
}

#[test]
fn invalid_jobs_are_rejected() {
    let bad_duration = JOB.replace("\"duration\": 2", "\"duration\": 0");
    assert!(matches!(
        RenderJob::from_reader(bad_duration.as_bytes()),
        Err(EngineError::Validation(_))
    ));

    let odd = JOB.replace(
        "\"output_dir\": \"out\"",
        "\"output_dir\": \"out\", \"options\": {\"width\": 1921}",
    );
    assert!(RenderJob::from_reader(odd.as_bytes()).is_err());

    assert!(matches!(
        RenderJob::from_reader("{".as_bytes()),
        Err(EngineError::Serde(_))
    ));
}

#[test]
fn from_path_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("job.json");
    std::fs::write(&p, JOB).unwrap();
    let job = RenderJob::from_path(&p).unwrap();
    assert_eq!(job.owner, "player");
    assert!(RenderJob::from_path(dir.path().join("missing.json")).is_err());
}
