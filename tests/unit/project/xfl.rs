use super::*;

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "xflsvg_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

const DOM: &str = r##"<DOMDocument xmlns="http://ns.adobe.com/xfl/2008/" width="320" height="240">
  <symbols>
    <Include href="Ball&amp;Chain.xml"/>
    <Include href="Missing.xml"/>
  </symbols>
  <timelines>
    <DOMTimeline name="Scene&amp;#32;1">
      <layers>
        <DOMLayer name="Mask" layerType="mask">
          <frames><DOMFrame index="0"><elements/></DOMFrame></frames>
        </DOMLayer>
        <DOMLayer name="Art" parentLayerIndex="0">
          <frames>
            <DOMFrame index="2" duration="3">
              <elements>
                <DOMSymbolInstance libraryItemName="Ball&amp;Chain" loop="play once" firstFrame="1">
                  <matrix><Matrix tx="10" ty="-4"/></matrix>
                  <color><Color brightness="0.5"/></color>
                </DOMSymbolInstance>
                <DOMBitmapInstance libraryItemName="photo.png"/>
              </elements>
            </DOMFrame>
            <DOMFrame index="0" duration="2"><elements/></DOMFrame>
          </frames>
        </DOMLayer>
      </layers>
    </DOMTimeline>
  </timelines>
</DOMDocument>"##;

const SYMBOL: &str = r##"<DOMSymbolItem xmlns="http://ns.adobe.com/xfl/2008/" name="Ball&amp;Chain">
  <timeline>
    <DOMTimeline name="Ball&amp;Chain">
      <layers>
        <DOMLayer name="Layer 1">
          <frames>
            <DOMFrame index="0" duration="4">
              <elements>
                <DOMGroup>
                  <matrix><Matrix a="2" d="2"/></matrix>
                  <members>
                    <DOMShape>
                      <fills>
                        <FillStyle index="1"><SolidColor color="#FF0000" alpha="0.5"/></FillStyle>
                        <FillStyle index="2">
                          <LinearGradient spreadMethod="reflect">
                            <matrix><Matrix a="0.1" tx="5"/></matrix>
                            <GradientEntry color="#000000" ratio="0"/>
                            <GradientEntry color="#FFFFFF" ratio="1" alpha="0.25"/>
                          </LinearGradient>
                        </FillStyle>
                      </fills>
                      <strokes>
                        <StrokeStyle index="1">
                          <SolidStroke scaleMode="normal" weight="3" caps="none" solidStyle="hairline">
                            <fill><SolidColor color="#00FF00"/></fill>
                          </SolidStroke>
                        </StrokeStyle>
                        <StrokeStyle index="2"><DashedStroke/></StrokeStyle>
                      </strokes>
                      <edges>
                        <Edge fillStyle1="1" strokeStyle="1" edges="!0 0|200 0|200 200|0 0"/>
                        <Edge cubics="!0 0(;1,2 3,4 5,6);"/>
                        <Edge fillStyle0="2" edges="  "/>
                      </edges>
                    </DOMShape>
                  </members>
                </DOMGroup>
              </elements>
            </DOMFrame>
          </frames>
        </DOMLayer>
      </layers>
    </DOMTimeline>
  </timeline>
</DOMSymbolItem>"##;

fn write_fixture(name: &str) -> std::path::PathBuf {
    let tmp = temp_dir(name);
    std::fs::create_dir_all(tmp.join("LIBRARY")).unwrap();
    std::fs::write(tmp.join("DOMDocument.xml"), DOM).unwrap();
    // Stored under the `&` -> `_` fallback name.
    std::fs::write(tmp.join("LIBRARY").join("Ball_Chain.xml"), SYMBOL).unwrap();
    tmp
}

#[test]
fn unescape_decodes_numeric_references() {
    assert_eq!(unescape_entities("plain"), "plain");
    assert_eq!(unescape_entities("a&#32;b&#38c"), "a b&c");
    assert_eq!(unescape_entities("a&#32b"), "a b");
    assert_eq!(unescape_entities("&#x20"), "&#x20");
    assert_eq!(unescape_entities("trailing&#"), "trailing&#");
}

#[test]
fn reads_stage_scenes_and_symbols() {
    let tmp = write_fixture("reads_stage");
    let mut warnings = Warnings::new();
    let project = read_xfl_dir_with(&tmp, &mut warnings).unwrap();

    assert_eq!(project.stage.width, 320.0);
    assert_eq!(project.stage.height, 240.0);
    assert_eq!(project.stage.background, "#FFFFFF");

    assert_eq!(project.scenes.len(), 1);
    let scene = &project.scenes[0];
    assert_eq!(scene.name, "Scene 1");
    assert_eq!(scene.layers[0].kind, LayerKind::Mask);
    assert_eq!(scene.layers[1].parent_layer_index, Some(0));
    assert_eq!(scene.len_frames(), 5);
    // Keyframes are sorted by start index.
    assert_eq!(scene.layers[1].keyframes[0].index, 0);

    let elements = &scene.layers[1].keyframes[1].elements;
    match &elements[0] {
        Element::SymbolInstance(inst) => {
            assert_eq!(inst.library_item_name, "Ball&Chain");
            assert_eq!(inst.loop_mode, LoopMode::PlayOnce);
            assert_eq!(inst.first_frame, 1);
            assert_eq!(inst.last_frame, None);
            assert_eq!(inst.matrix, Affine::translate((10.0, -4.0)));
            assert_eq!(
                inst.color.as_ref().and_then(|c| c.get("brightness")),
                Some("0.5")
            );
        }
        other => panic!("expected symbol instance, got {other:?}"),
    }
    assert!(matches!(&elements[1], Element::Unsupported(tag) if tag == "DOMBitmapInstance"));

    // Missing.xml is skipped with a warning.
    assert_eq!(project.symbols.len(), 1);
    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings.as_slice()[0], Warning::Project(_)));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn reads_shape_styles_and_edges() {
    let tmp = write_fixture("reads_shape");
    let project = read_xfl_dir(&tmp).unwrap();
    let symbol = &project.symbols["Ball&Chain"];
    let group = &symbol.layers[0].keyframes[0].elements[0];
    let Element::Group(members) = group else {
        panic!("expected group, got {group:?}");
    };
    let Element::Shape(shape) = &members[0] else {
        panic!("expected shape");
    };

    assert_eq!(shape.edges().len(), 1);
    assert_eq!(shape.edges()[0].fill_right, Some(1));
    assert_eq!(shape.edges()[0].fill_left, None);
    assert_eq!(shape.edges()[0].stroke, Some(1));

    assert_eq!(
        shape.fill_style(1),
        Some(&FillStyle::Solid(SolidColor {
            color: "#FF0000".to_string(),
            alpha: Some(0.5),
        }))
    );
    match shape.fill_style(2) {
        Some(FillStyle::LinearGradient(g)) => {
            assert_eq!(g.spread, SpreadMethod::Reflect);
            assert_eq!(g.matrix, Affine::new([0.1, 0.0, 0.0, 1.0, 5.0, 0.0]));
            assert_eq!(g.stops.len(), 2);
            assert_eq!(g.stops[1].alpha, Some(0.25));
        }
        other => panic!("expected linear gradient, got {other:?}"),
    }
    match shape.stroke_style(1) {
        Some(StrokeStyle::Solid(s)) => {
            assert!(s.hairline);
            assert_eq!(s.weight, Some(3.0));
            assert_eq!(s.caps.as_deref(), Some("none"));
            assert_eq!(s.fill, FillStyle::Solid(SolidColor::new("#00FF00")));
        }
        other => panic!("expected solid stroke, got {other:?}"),
    }
    assert_eq!(
        shape.stroke_style(2),
        Some(&StrokeStyle::Unsupported("DashedStroke".to_string()))
    );

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_document_and_archives_are_project_errors() {
    let tmp = temp_dir("missing_document");
    std::fs::create_dir_all(&tmp).unwrap();
    assert!(matches!(read_xfl_dir(&tmp), Err(XflError::Project(_))));

    let fla = tmp.join("anim.fla");
    std::fs::write(&fla, b"PK").unwrap();
    assert!(matches!(read_xfl_dir(&fla), Err(XflError::Project(_))));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn bad_numeric_attribute_is_reported() {
    let tmp = temp_dir("bad_numeric");
    std::fs::create_dir_all(&tmp).unwrap();
    std::fs::write(
        tmp.join("DOMDocument.xml"),
        r#"<DOMDocument width="wide"/>"#,
    )
    .unwrap();
    let err = read_xfl_dir(&tmp).unwrap_err();
    assert!(err.to_string().contains("width"), "{err}");

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn non_finite_numeric_attribute_is_reported() {
    for value in ["NaN", "inf", "-infinity"] {
        let tmp = temp_dir("non_finite");
        std::fs::create_dir_all(&tmp).unwrap();
        std::fs::write(
            tmp.join("DOMDocument.xml"),
            format!(r#"<DOMDocument height="{value}"/>"#),
        )
        .unwrap();
        let err = read_xfl_dir(&tmp).unwrap_err();
        assert!(matches!(err, XflError::Project(_)), "{value}: {err}");
        assert!(err.to_string().contains("height"), "{err}");

        std::fs::remove_dir_all(&tmp).ok();
    }
}
