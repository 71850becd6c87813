use super::*;

fn layer(frames: &[(u32, u32)]) -> Layer {
    Layer {
        keyframes: frames
            .iter()
            .map(|&(index, duration)| Keyframe {
                index,
                duration,
                elements: Vec::new(),
            })
            .collect(),
        ..Layer::default()
    }
}

#[test]
fn finds_keyframe_and_offset() {
    let l = layer(&[(0, 2), (2, 3), (10, 1)]);
    assert_eq!(active_keyframe(&l, 0).map(|(k, o)| (k.index, o)), Some((0, 0)));
    assert_eq!(active_keyframe(&l, 1).map(|(k, o)| (k.index, o)), Some((0, 1)));
    assert_eq!(active_keyframe(&l, 4).map(|(k, o)| (k.index, o)), Some((2, 2)));
    assert_eq!(active_keyframe(&l, 10).map(|(k, o)| (k.index, o)), Some((10, 0)));
}

#[test]
fn gaps_and_out_of_range_frames_show_nothing() {
    let l = layer(&[(3, 2), (10, 1)]);
    assert!(active_keyframe(&l, 0).is_none());
    assert!(active_keyframe(&l, 5).is_none());
    assert!(active_keyframe(&l, 11).is_none());
    assert!(active_keyframe(&layer(&[]), 0).is_none());
}

#[test]
fn loop_frame_modes() {
    assert_eq!(loop_frame(&LoopMode::SingleFrame, 4, 9, 7).unwrap(), 4);
    assert_eq!(loop_frame(&LoopMode::Loop, 2, 4, 6).unwrap(), 2);
    assert_eq!(loop_frame(&LoopMode::Loop, 0, 9, 5).unwrap(), 5);
    assert_eq!(loop_frame(&LoopMode::PlayOnce, 0, 9, 5).unwrap(), 5);
    assert_eq!(loop_frame(&LoopMode::PlayOnce, 3, 5, 10).unwrap(), 5);
}

#[test]
fn loop_frame_errors() {
    assert!(matches!(
        loop_frame(&LoopMode::Loop, 5, 2, 0),
        Err(XflError::InvalidLoop { first: 5, last: 2 })
    ));
    assert!(matches!(
        loop_frame(&LoopMode::Other("bounce".into()), 0, 1, 0),
        Err(XflError::UnknownLoopMode(m)) if m == "bounce"
    ));
}
