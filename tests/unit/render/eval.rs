use super::*;
use crate::composition::build::build;
use crate::composition::descriptor::Registry;

fn slides() -> Timeline {
    let registry = Registry::with_builtin_catalog().unwrap();
    let d = registry.get("Slides").unwrap();
    build(d, &d.default_inputs).unwrap()
}

fn ids(state: &FrameState) -> Vec<&str> {
    state.nodes.iter().map(|n| n.id.as_str()).collect()
}

#[test]
fn nodes_are_ordered_back_to_front() {
    let t = slides();
    let s = Evaluator::eval_frame(&t, FrameIndex(0));
    assert_eq!(s.frame, FrameIndex(0));
    assert!(s.warning.is_none());
    assert_eq!(ids(&s), vec!["clip-0", "caption-0", "flash-0"]);
    assert!(s.nodes.windows(2).all(|w| w[0].z <= w[1].z));
}

#[test]
fn transition_window_overlaps_both_clips() {
    let t = slides();
    let s = Evaluator::eval_frame(&t, FrameIndex(122));
    let clips: Vec<&str> = s
        .nodes
        .iter()
        .filter(|n| n.kind == ElementKind::Video)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(clips, vec!["clip-0", "clip-1"]);

    let x = s.crossfade.unwrap();
    assert_eq!((x.outgoing, x.incoming), (0, 1));
    assert!((x.progress - 0.4).abs() < 1e-12);

    assert!(Evaluator::eval_frame(&t, FrameIndex(119)).crossfade.is_none());
    assert!(Evaluator::eval_frame(&t, FrameIndex(126)).crossfade.is_none());
}

#[test]
fn past_the_end_clamps_with_warning() {
    let t = slides();
    assert_eq!(t.total_frames, 384);

    let last = Evaluator::eval_frame(&t, FrameIndex(383));
    let past_end = Evaluator::eval_frame(&t, FrameIndex(384));
    assert_eq!(
        past_end.warning,
        Some(BoundaryWarning {
            requested: FrameIndex(384),
            clamped_to: FrameIndex(383),
        })
    );
    assert_eq!(past_end.frame, FrameIndex(383));
    assert_eq!(past_end.nodes, last.nodes);
    assert_eq!(past_end.audio, last.audio);

    let far = Evaluator::eval_frame(&t, FrameIndex(u64::MAX));
    assert_eq!(far.frame, FrameIndex(383));
}

#[test]
fn evaluation_order_does_not_matter() {
    let t = slides();
    let forward: Vec<FrameState> = (0..t.total_frames)
        .map(|f| Evaluator::eval_frame(&t, FrameIndex(f)))
        .collect();
    for f in (0..t.total_frames).rev().step_by(7) {
        assert_eq!(Evaluator::eval_frame(&t, FrameIndex(f)), forward[f as usize]);
    }
}

#[test]
fn audio_cues_follow_call_to_action() {
    let t = slides();
    let s = Evaluator::eval_frame(&t, FrameIndex(280));
    let audio: Vec<(&str, u64)> = s
        .audio
        .iter()
        .map(|a| (a.id.as_str(), a.local_frame))
        .collect();
    assert_eq!(audio, vec![("track", 280), ("cta-instagram-0-sfx", 4)]);
    assert!(s.nodes.iter().any(|n| n.id == "cta-instagram-0"));
}

#[test]
fn frame_state_serializes_without_empty_fields() {
    let t = slides();
    let v = serde_json::to_value(Evaluator::eval_frame(&t, FrameIndex(0))).unwrap();
    assert!(v.get("warning").is_none());
    assert!(v.get("crossfade").is_none());
    assert_eq!(v["nodes"][0]["kind"], "video");
    assert!(v["nodes"][0].get("text").is_none());
}
