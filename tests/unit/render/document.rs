use super::*;

#[test]
fn element_writes_escaped_attributes_in_order() {
    let el = Element::new("path")
        .with_attr("d", "M 0 0")
        .with_attr("data-name", "a<b & \"c\"")
        .with_attr("d", "M 1 1");
    assert_eq!(
        el.to_xml(),
        r#"<path d="M 1 1" data-name="a&lt;b &amp; &quot;c&quot;"/>"#
    );
    assert_eq!(el.attr("d"), Some("M 1 1"));
    assert_eq!(el.attr("fill"), None);
}

#[test]
fn nested_elements_close_properly() {
    let el = Element::new("g")
        .with_attr("id", "outer")
        .with_child(Element::new("use").with_attr("xlink:href", "#a"));
    assert_eq!(el.to_xml(), r##"<g id="outer"><use xlink:href="#a"/></g>"##);
}

#[test]
fn defs_keep_first_insertion_and_order() {
    let mut defs = Defs::new();
    defs.insert("b", Element::new("filter"));
    defs.insert("a", Element::new("mask"));
    defs.insert("b", Element::new("linearGradient"));

    let mut other = Defs::new();
    other.insert("c", Element::new("g"));
    other.insert("a", Element::new("radialGradient"));
    defs.extend(&other);

    assert_eq!(defs.ids().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    assert_eq!(defs.get("b").map(|e| e.name()), Some("filter"));
    assert_eq!(defs.get("a").map(|e| e.name()), Some("mask"));
    assert_eq!(defs.len(), 3);
}

#[test]
fn fragment_append_and_wrap() {
    let mut a = Fragment::new();
    a.body.push(Arc::new(Element::new("use").with_attr("id", "1")));
    let mut b = Fragment::new();
    b.defs.insert("x", Element::new("g"));
    b.body.push(Arc::new(Element::new("use").with_attr("id", "2")));

    a.append(&b);
    a.wrap_body(Element::new("g").with_attr("transform", "matrix(2, 0, 0, 2, 0, 0)"));

    assert_eq!(a.body.len(), 1);
    assert_eq!(a.body[0].children().len(), 2);
    assert!(a.defs.contains("x"));
}

#[test]
fn document_root_attributes() {
    let mut frag = Fragment::new();
    frag.defs.insert("F", Element::new("g").with_attr("id", "F"));
    frag.body.push(Arc::new(Element::new("use").with_attr("xlink:href", "#F")));
    let doc = Document::new(550.0, 400.0, frag);

    let root = doc.to_element();
    assert_eq!(root.name(), "svg");
    assert_eq!(root.attr("width"), Some("550px"));
    assert_eq!(root.attr("height"), Some("400px"));
    assert_eq!(root.attr("viewBox"), Some("0 0 550 400"));
    assert_eq!(root.attr("preserveAspectRatio"), Some("none"));
    assert_eq!(root.attr("version"), Some("1.1"));
    assert_eq!(root.children()[0].name(), "defs");
    assert_eq!(root.children()[0].children().len(), 1);
    assert_eq!(root.children()[1].name(), "use");

    let text = doc.to_svg_string();
    assert!(text.starts_with("<?xml"));
    assert!(text.contains(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#));
}

#[test]
fn centered_then_background_puts_rect_first() {
    let mut frag = Fragment::new();
    frag.body.push(Arc::new(Element::new("use")));
    let doc = Document::new(100.0, 50.0, frag)
        .centered()
        .with_background("#FFFFFF");

    let body = doc.body();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0].name(), "rect");
    assert_eq!(body[0].attr("fill"), Some("#FFFFFF"));
    assert_eq!(body[1].attr("transform"), Some("matrix(1, 0, 0, 1, 50, 25)"));
    assert_eq!(body[1].children().len(), 1);
}
