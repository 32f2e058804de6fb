use super::*;
use crate::render::sink::InMemorySink;

fn session(id: &str, opts: RenderSessionOpts) -> RenderSession {
    let registry = Registry::with_builtin_catalog().unwrap();
    RenderSession::from_registry(&registry, id, None, opts).unwrap()
}

fn parallel(threads: usize, chunk_size: usize) -> RenderSessionOpts {
    RenderSessionOpts {
        parallel: true,
        chunk_size,
        threads: Some(threads),
        channel_capacity: 2,
    }
}

#[test]
fn sequential_render_delivers_every_frame_in_order() {
    let s = session("JustMessage", RenderSessionOpts::default());
    let mut sink = InMemorySink::new();
    let stats = s.render_all(&mut sink).unwrap();

    assert_eq!(stats.frames_total, 240);
    assert_eq!(stats.boundary_warnings, 0);
    assert!(sink.is_finished());
    let cfg = sink.config().unwrap();
    assert_eq!(cfg.composition_id, "JustMessage");
    assert_eq!(cfg.total_frames, 240);

    let idx: Vec<u64> = sink.frames.iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (0..240).collect::<Vec<_>>());
}

#[test]
fn parallel_render_matches_sequential() {
    let seq = session("Slides", RenderSessionOpts::default());
    let mut a = InMemorySink::new();
    seq.render_all(&mut a).unwrap();

    let par = session("Slides", parallel(3, 7));
    let mut b = InMemorySink::new();
    let stats = par.render_all(&mut b).unwrap();

    assert_eq!(stats.frames_total, 384);
    assert_eq!(a.frames, b.frames);
}

#[test]
fn chunk_size_zero_is_treated_as_one() {
    let s = session("ImageSlideshow", parallel(2, 0));
    let mut sink = InMemorySink::new();
    let stats = s
        .render_range(FrameRange::from_len(10, 5), &mut sink)
        .unwrap();
    assert_eq!(stats.frames_total, 5);
    assert_eq!(sink.frames.first().map(|(i, _)| i.0), Some(10));
}

#[test]
fn range_past_the_end_is_clamped_and_counted() {
    let s = session("JustMessage", RenderSessionOpts::default());
    let mut sink = InMemorySink::new();
    let stats = s
        .render_range(FrameRange::from_len(236, 8), &mut sink)
        .unwrap();
    assert_eq!(stats.frames_total, 8);
    assert_eq!(stats.boundary_warnings, 4);
    let (idx, last) = sink.frames.last().unwrap();
    assert_eq!(*idx, FrameIndex(243));
    assert_eq!(last.frame, FrameIndex(239));
}

#[test]
fn invalid_ranges_and_threads_are_rejected() {
    let s = session("JustMessage", RenderSessionOpts::default());
    let mut sink = InMemorySink::new();

    let err = s
        .render_range(FrameRange::from_len(5, 0), &mut sink)
        .unwrap_err();
    assert!(matches!(err, ReelError::Evaluation(_)));

    let err = s
        .render_range(FrameRange::from_len(240, 3), &mut sink)
        .unwrap_err();
    assert!(matches!(err, ReelError::Evaluation(_)));

    let s = session("JustMessage", parallel(0, 8));
    let err = s.render_all(&mut sink).unwrap_err();
    assert_eq!(err.field(), Some("threads"));
}

struct FailingSink {
    fail_at: u64,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> ReelResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameState) -> ReelResult<()> {
        if idx.0 == self.fail_at {
            return Err(ReelError::encode("disk full"));
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        Ok(())
    }
}

#[test]
fn sink_errors_surface_from_both_paths() {
    for opts in [RenderSessionOpts::default(), parallel(4, 16)] {
        let s = session("Slides", opts);
        let err = s.render_all(&mut FailingSink { fail_at: 50 }).unwrap_err();
        assert!(err.to_string().contains("disk full"), "{err}");
    }
}

#[test]
fn render_writes_a_jsonl_frame_plan() {
    let path = std::env::temp_dir().join(format!(
        "reelcast-session-{}-render.jsonl",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let registry = Registry::with_builtin_catalog().unwrap();
    let mut request = RenderRequest {
        composition_id: "JustMessage".to_string(),
        inputs: None,
        output_path: path.clone(),
        overwrite: false,
    };
    let stats = render(&registry, &request, RenderSessionOpts::default()).unwrap();
    assert_eq!(stats.frames_total, 240);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 241);
    let header: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(header["composition_id"], "JustMessage");
    assert_eq!(header["total_frames"], 240);
    let frame: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(frame["frame"], 0);

    let err = render(&registry, &request, RenderSessionOpts::default()).unwrap_err();
    assert!(matches!(err, ReelError::Encode(_)));

    request.overwrite = true;
    request.composition_id = "Nope".to_string();
    let err = render(&registry, &request, RenderSessionOpts::default()).unwrap_err();
    assert_eq!(err.field(), Some("composition_id"));

    std::fs::remove_file(&path).unwrap();
}
