use super::*;

fn layer(kind: LayerKind, parent: Option<usize>) -> Layer {
    Layer {
        name: String::new(),
        kind,
        parent_layer_index: parent,
        keyframes: Vec::new(),
    }
}

fn keyframe(index: u32, duration: u32) -> Keyframe {
    Keyframe {
        index,
        duration,
        elements: Vec::new(),
    }
}

#[test]
fn timeline_length_is_furthest_keyframe_end() {
    let mut a = layer(LayerKind::Normal, None);
    a.keyframes = vec![keyframe(0, 3), keyframe(3, 2)];
    let mut b = layer(LayerKind::Normal, None);
    b.keyframes = vec![keyframe(0, 7)];
    let empty = layer(LayerKind::Normal, None);

    let t = Timeline::new("t", vec![a, empty, b]);
    assert_eq!(t.len_frames(), 7);
    assert_eq!(t.last_frame(), 6);

    let none = Timeline::new("none", Vec::new());
    assert_eq!(none.len_frames(), 0);
    assert_eq!(none.last_frame(), 0);
}

#[test]
fn mask_start_marks_bottom_most_child() {
    // 0: mask, 1..=2: masked, 3: plain, 4: mask, 5: masked
    let t = Timeline::new(
        "t",
        vec![
            layer(LayerKind::Mask, None),
            layer(LayerKind::Normal, Some(0)),
            layer(LayerKind::Normal, Some(0)),
            layer(LayerKind::Normal, None),
            layer(LayerKind::Mask, None),
            layer(LayerKind::Normal, Some(4)),
        ],
    );
    assert_eq!(
        t.mask_starts(),
        &[None, None, Some(0), None, None, Some(4)]
    );
}

#[test]
fn mask_without_children_marks_nothing() {
    let t = Timeline::new(
        "t",
        vec![
            layer(LayerKind::Mask, None),
            layer(LayerKind::Normal, None),
            layer(LayerKind::Normal, None),
        ],
    );
    assert_eq!(t.mask_starts(), &[None, None, None]);
}

#[test]
fn mask_group_includes_nested_folder_children() {
    let t = Timeline::new(
        "t",
        vec![
            layer(LayerKind::Mask, None),
            layer(LayerKind::Folder, Some(0)),
            layer(LayerKind::Normal, Some(1)),
            layer(LayerKind::Normal, None),
        ],
    );
    assert_eq!(t.mask_starts(), &[None, None, Some(0), None]);
}

#[test]
fn fingerprint_ignores_matrix_but_tracks_styles() {
    let edges = vec![EdgeRecord {
        fill_left: Some(1),
        fill_right: None,
        stroke: None,
        edges: "!0 0|200 0|200 200|0 0".to_string(),
    }];
    let red = Shape::new(edges.clone()).with_fill(1, FillStyle::Solid(SolidColor::new("#FF0000")));
    let moved = Shape::new(edges.clone())
        .with_fill(1, FillStyle::Solid(SolidColor::new("#FF0000")))
        .with_matrix(Affine::translate((5.0, 5.0)));
    let blue = Shape::new(edges).with_fill(1, FillStyle::Solid(SolidColor::new("#0000FF")));

    assert_eq!(red.fingerprint(), moved.fingerprint());
    assert_ne!(red.fingerprint(), blue.fingerprint());
}

#[test]
fn xfl_attribute_mappings() {
    assert_eq!(LayerKind::from_xfl(None), LayerKind::Normal);
    assert_eq!(LayerKind::from_xfl(Some("guide")), LayerKind::Guide);
    assert_eq!(
        LayerKind::from_xfl(Some("camera")),
        LayerKind::Other("camera".to_string())
    );
    assert_eq!(LoopMode::from_xfl(Some("play once")), LoopMode::PlayOnce);
    assert_eq!(LoopMode::from_xfl(None), LoopMode::SingleFrame);
    assert_eq!(SymbolType::from_xfl(Some("movie clip")), SymbolType::MovieClip);
    assert_eq!(SpreadMethod::from_xfl(Some("extend")), SpreadMethod::Pad);
    assert_eq!(SpreadMethod::from_xfl(Some("reflect")).as_svg(), "reflect");
}

#[test]
fn json_project_roundtrip_preserves_structure() {
    let shape = Shape::new(vec![EdgeRecord {
        fill_left: Some(1),
        fill_right: None,
        stroke: None,
        edges: "!0 0|20 0|20 20|0 0".to_string(),
    }])
    .with_fill(1, FillStyle::Solid(SolidColor::new("#336699")));
    let mut l = layer(LayerKind::Normal, None);
    l.keyframes = vec![Keyframe {
        index: 0,
        duration: 2,
        elements: vec![Element::Shape(shape), Element::Unsupported("DOMBitmapInstance".into())],
    }];
    let project = Project {
        stage: Stage::default(),
        scenes: vec![Timeline::new("Scene 1", vec![l])],
        symbols: BTreeMap::new(),
    };

    let json = project.to_json().unwrap();
    let back = Project::from_json_reader(json.as_bytes()).unwrap();
    assert_eq!(back.stage, project.stage);
    assert_eq!(back.scenes[0].name, "Scene 1");
    assert_eq!(back.scenes[0].len_frames(), 2);
    let fingerprint = |e: &Element| match e {
        Element::Shape(s) => s.fingerprint(),
        other => panic!("expected shape, got {other:?}"),
    };
    let elements = &back.scenes[0].layers[0].keyframes[0].elements;
    assert_eq!(
        fingerprint(&elements[0]),
        fingerprint(&project.scenes[0].layers[0].keyframes[0].elements[0])
    );
    assert!(matches!(&elements[1], Element::Unsupported(tag) if tag == "DOMBitmapInstance"));
}

#[test]
fn json_defaults_fill_missing_fields() {
    let json = r#"{
        "stage": {"width": 100.0, "height": 50.0},
        "scenes": [{"name": "s", "layers": [{"keyframes": [{"index": 0}]}]}],
        "symbols": {}
    }"#;
    let p = Project::from_json_reader(json.as_bytes()).unwrap();
    assert_eq!(p.stage.background, "#FFFFFF");
    assert_eq!(p.scenes[0].layers[0].kind, LayerKind::Normal);
    assert_eq!(p.scenes[0].layers[0].keyframes[0].duration, 1);

    assert!(matches!(
        Project::from_json_reader("{".as_bytes()),
        Err(XflError::Project(_))
    ));
}

#[test]
fn json_keyframes_are_sorted_by_index() {
    let json = r#"{
        "stage": {"width": 100.0, "height": 50.0},
        "scenes": [{"name": "s", "layers": [{"keyframes": [
            {"index": 4, "duration": 2},
            {"index": 0, "duration": 1},
            {"index": 1, "duration": 3}
        ]}]}],
        "symbols": {}
    }"#;
    let p = Project::from_json_reader(json.as_bytes()).unwrap();
    let layer = &p.scenes[0].layers[0];
    let starts: Vec<u32> = layer.keyframes.iter().map(|k| k.index).collect();
    assert_eq!(starts, [0, 1, 4]);

    let (active, offset) = crate::render::playback::active_keyframe(layer, 5).unwrap();
    assert_eq!((active.index, offset), (4, 1));
    let (active, offset) = crate::render::playback::active_keyframe(layer, 2).unwrap();
    assert_eq!((active.index, offset), (1, 1));
}

#[test]
fn builders_refresh_a_cached_fingerprint() {
    let edges = vec![EdgeRecord {
        fill_left: Some(1),
        fill_right: None,
        stroke: None,
        edges: "!0 0|200 0|200 200|0 0".to_string(),
    }];
    let shape = Shape::new(edges);
    let bare = shape.fingerprint();
    let filled = shape.with_fill(1, FillStyle::Solid(SolidColor::new("#FF0000")));
    assert_ne!(filled.fingerprint(), bare);
    assert_eq!(filled.fills().len(), 1);
    assert_eq!(filled.edges().len(), 1);
    assert!(filled.strokes().is_empty());
}
