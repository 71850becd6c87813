use super::*;

#[test]
fn sanitize_replaces_forbidden_characters() {
    assert_eq!(sanitize_filename("a/b:c*d", ".svg"), "a_b_c_d.svg");
    assert_eq!(sanitize_filename("tab\there\u{7f}", ""), "tabhere");
}

#[test]
fn sanitize_guards_leading_dot_and_dash() {
    assert_eq!(sanitize_filename(".hidden", ".svg"), "_.hidden.svg");
    assert_eq!(sanitize_filename("-flag", ""), "_-flag");
    assert_eq!(sanitize_filename("__-x", ""), "___-x");
    assert_eq!(sanitize_filename("_ok", ""), "_ok");
}

#[test]
fn sanitize_caps_utf8_length() {
    let name = "é".repeat(200);
    let out = sanitize_filename(&name, "_001.svg");
    assert!(out.len() <= 255);
    assert!(out.ends_with("_001.svg"));
    assert_eq!(out.len(), 246 + "_001.svg".len());
}

#[test]
fn frame_digits_has_minimum_three() {
    assert_eq!(frame_digits(9), 3);
    assert_eq!(frame_digits(1000), 4);
}

#[test]
fn cli_parses_flags() {
    let cli = Cli::try_parse_from([
        "xflsvg",
        "proj",
        "Scene 1",
        "out",
        "--timeline-type",
        "symbol",
        "--first-frame",
        "2",
        "--no-background",
        "--png",
    ])
    .unwrap();
    assert_eq!(cli.timeline.as_deref(), Some("Scene 1"));
    assert_eq!(cli.timeline_type, Some(TimelineType::Symbol));
    assert_eq!(cli.first_frame, 2);
    assert!(cli.no_background && cli.png && !cli.parallel);
}

#[test]
fn print_flags_need_no_timeline() {
    let cli = Cli::try_parse_from(["xflsvg", "proj", "--print-scenes"]).unwrap();
    assert!(cli.print_scenes);
    assert!(cli.timeline.is_none());
    assert!(Cli::try_parse_from(["xflsvg", "proj"]).is_err());
}
