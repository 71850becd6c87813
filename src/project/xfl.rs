//! Reader for uncompressed XFL project directories.
//!
//! Layout of an XFL directory:
//!
//! ```text
//! DOMDocument.xml        stage settings, scene timelines, <symbols>/<Include href=...>
//! LIBRARY/<href>         one DOMSymbolItem per library symbol
//! ```
//!
//! Only the parts the renderer consumes are read; everything else in the XML is ignored.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use roxmltree::Node;

use crate::foundation::core::Affine;
use crate::foundation::error::{XflError, XflResult};
use crate::foundation::warning::{Warning, Warnings};
use crate::project::model::{
    ColorDescriptor, EdgeRecord, Element, FillStyle, Gradient, GradientStop, Keyframe, Layer,
    LayerKind, LoopMode, Project, Shape, SolidColor, SolidStroke, SpreadMethod, Stage,
    StrokeStyle, SymbolInstance, SymbolType, Timeline,
};

const DOM_DOCUMENT: &str = "DOMDocument.xml";
const LIBRARY_DIR: &str = "LIBRARY";

/// Read an uncompressed XFL directory into a [`Project`].
///
/// Warnings (unreadable symbol files, ...) are logged and dropped; use
/// [`read_xfl_dir_with`] to collect them.
pub fn read_xfl_dir(path: impl AsRef<Path>) -> XflResult<Project> {
    read_xfl_dir_with(path, &mut Warnings::new())
}

/// Read an uncompressed XFL directory, recording non-fatal problems in `warnings`.
///
/// A symbol whose file is missing or malformed is skipped with a warning; rendering it later
/// fails with [`XflError::NotFound`].
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_xfl_dir_with(path: impl AsRef<Path>, warnings: &mut Warnings) -> XflResult<Project> {
    let root = path.as_ref();
    if root.is_file() {
        return Err(XflError::project(format!(
            "expected an extracted XFL directory, got a file: {}",
            root.display()
        )));
    }

    let text = read_text(&root.join(DOM_DOCUMENT))?;
    let doc = roxmltree::Document::parse(&text)
        .map_err(|e| XflError::project(format!("parse {DOM_DOCUMENT}: {e}")))?;
    let dom = doc.root_element();

    let stage = Stage {
        width: attr_f64(dom, "width")?.unwrap_or(550.0),
        height: attr_f64(dom, "height")?.unwrap_or(400.0),
        background: dom
            .attribute("backgroundColor")
            .unwrap_or("#FFFFFF")
            .to_string(),
    };

    let mut scenes: Vec<Timeline> = Vec::new();
    for node in dom.descendants().filter(|n| is(*n, "DOMTimeline")) {
        let timeline = parse_timeline(node)?;
        if scenes.iter().any(|s| s.name == timeline.name) {
            return Err(XflError::project(format!(
                "duplicate scene name: {}",
                timeline.name
            )));
        }
        scenes.push(timeline);
    }

    let library = root.join(LIBRARY_DIR);
    let mut symbols = BTreeMap::new();
    let includes = dom
        .children()
        .filter(|n| is(*n, "symbols"))
        .flat_map(|n| n.children().filter(|c| is(*c, "Include")));
    for include in includes {
        let Some(href) = include.attribute("href") else {
            continue;
        };
        let name = unescape_entities(href.strip_suffix(".xml").unwrap_or(href)).into_owned();
        if symbols.contains_key(&name) {
            return Err(XflError::project(format!("duplicate symbol name: {name}")));
        }
        match read_symbol(&library, href, &name) {
            Ok(timeline) => {
                symbols.insert(name, timeline);
            }
            Err(e) => warnings.push(Warning::Project(format!("skipping symbol {name}: {e}"))),
        }
    }

    tracing::debug!(
        scenes = scenes.len(),
        symbols = symbols.len(),
        "xfl project loaded"
    );
    Ok(Project {
        stage,
        scenes,
        symbols,
    })
}

fn read_symbol(library: &Path, href: &str, name: &str) -> XflResult<Timeline> {
    let mut file = library.join(href);
    if !file.exists() {
        // The authoring tool sometimes writes `&` as `_` in file names.
        file = library.join(href.replace('&', "_"));
    }
    let text = read_text(&file)?;
    let doc = roxmltree::Document::parse(&text)
        .map_err(|e| XflError::project(format!("parse {}: {e}", file.display())))?;
    let node = doc
        .descendants()
        .find(|n| is(*n, "DOMTimeline"))
        .ok_or_else(|| XflError::project(format!("no timeline in {}", file.display())))?;
    let mut timeline = parse_timeline(node)?;
    timeline.name = name.to_string();
    Ok(timeline)
}

fn read_text(path: &Path) -> XflResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| XflError::project(format!("read {}: {e}", path.display())))
}

/// Replace numeric character references (`&#38`, `&#38;`) that survived XML unescaping.
pub fn unescape_entities(s: &str) -> Cow<'_, str> {
    if !s.contains("&#") {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("&#") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        let digits = after.len() - after.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let decoded = after[..digits]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                out.push(c);
                let tail = &after[digits..];
                rest = tail.strip_prefix(';').unwrap_or(tail);
            }
            None => {
                out.push_str("&#");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn is(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|c| is(*c, name))
}

fn children<'a, 'i: 'a>(
    node: Node<'a, 'i>,
    container: &'a str,
) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    child(node, container)
        .into_iter()
        .flat_map(|c| c.children().filter(Node::is_element))
}

fn attr_f64(node: Node<'_, '_>, name: &str) -> XflResult<Option<f64>> {
    node.attribute(name)
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| {
                    XflError::project(format!(
                        "<{}> attribute {name}={v:?} is not a finite number",
                        node.tag_name().name()
                    ))
                })
        })
        .transpose()
}

fn attr_u32(node: Node<'_, '_>, name: &str) -> XflResult<Option<u32>> {
    node.attribute(name)
        .map(|v| {
            v.trim().parse::<u32>().map_err(|_| {
                XflError::project(format!(
                    "<{}> attribute {name}={v:?} is not an index",
                    node.tag_name().name()
                ))
            })
        })
        .transpose()
}

/// `<matrix><Matrix a=.. b=.. c=.. d=.. tx=.. ty=../></matrix>` as a direct child of `node`.
fn parse_matrix(node: Node<'_, '_>) -> XflResult<Affine> {
    let Some(m) = child(node, "matrix").and_then(|c| child(c, "Matrix")) else {
        return Ok(Affine::IDENTITY);
    };
    Ok(Affine::new([
        attr_f64(m, "a")?.unwrap_or(1.0),
        attr_f64(m, "b")?.unwrap_or(0.0),
        attr_f64(m, "c")?.unwrap_or(0.0),
        attr_f64(m, "d")?.unwrap_or(1.0),
        attr_f64(m, "tx")?.unwrap_or(0.0),
        attr_f64(m, "ty")?.unwrap_or(0.0),
    ]))
}

fn parse_timeline(node: Node<'_, '_>) -> XflResult<Timeline> {
    let name = unescape_entities(node.attribute("name").unwrap_or_default()).into_owned();
    let layers = children(node, "layers")
        .filter(|n| is(*n, "DOMLayer"))
        .map(parse_layer)
        .collect::<XflResult<Vec<_>>>()?;
    Ok(Timeline::new(name, layers))
}

fn parse_layer(node: Node<'_, '_>) -> XflResult<Layer> {
    let mut keyframes = Vec::new();
    for frame in children(node, "frames").filter(|n| is(*n, "DOMFrame")) {
        let index = attr_u32(frame, "index")?.unwrap_or(0);
        let duration = attr_u32(frame, "duration")?.unwrap_or(1);
        let elements = children(frame, "elements")
            .map(parse_element)
            .collect::<XflResult<Vec<_>>>()?;
        keyframes.push(Keyframe {
            index,
            duration,
            elements,
        });
    }
    keyframes.sort_by_key(|k| k.index);

    Ok(Layer {
        name: node.attribute("name").unwrap_or_default().to_string(),
        kind: LayerKind::from_xfl(node.attribute("layerType")),
        parent_layer_index: attr_u32(node, "parentLayerIndex")?.map(|i| i as usize),
        keyframes,
    })
}

fn parse_element(node: Node<'_, '_>) -> XflResult<Element> {
    match node.tag_name().name() {
        "DOMShape" => parse_shape(node).map(Element::Shape),
        "DOMGroup" => children(node, "members")
            .map(parse_element)
            .collect::<XflResult<Vec<_>>>()
            .map(Element::Group),
        "DOMSymbolInstance" => parse_symbol_instance(node).map(Element::SymbolInstance),
        other => Ok(Element::Unsupported(other.to_string())),
    }
}

fn parse_symbol_instance(node: Node<'_, '_>) -> XflResult<SymbolInstance> {
    let name = node.attribute("libraryItemName").ok_or_else(|| {
        XflError::project("<DOMSymbolInstance> is missing libraryItemName")
    })?;
    let color = child(node, "color")
        .and_then(|c| child(c, "Color"))
        .map(|c| {
            ColorDescriptor::from_pairs(c.attributes().map(|a| (a.name(), a.value())))
        });
    Ok(SymbolInstance {
        library_item_name: unescape_entities(name).into_owned(),
        symbol_type: SymbolType::from_xfl(node.attribute("symbolType")),
        matrix: parse_matrix(node)?,
        color,
        loop_mode: LoopMode::from_xfl(node.attribute("loop")),
        first_frame: attr_u32(node, "firstFrame")?.unwrap_or(0),
        last_frame: attr_u32(node, "lastFrame")?,
    })
}

fn parse_shape(node: Node<'_, '_>) -> XflResult<Shape> {
    let mut edges = Vec::new();
    for edge in children(node, "edges").filter(|n| is(*n, "Edge")) {
        // Records carrying only `cubics`, or an empty `edges`, have no renderable path.
        let Some(data) = edge.attribute("edges").filter(|d| !d.trim().is_empty()) else {
            continue;
        };
        edges.push(EdgeRecord {
            fill_left: attr_u32(edge, "fillStyle0")?,
            fill_right: attr_u32(edge, "fillStyle1")?,
            stroke: attr_u32(edge, "strokeStyle")?,
            edges: data.to_string(),
        });
    }

    let mut shape = Shape::new(edges).with_matrix(parse_matrix(node)?);
    for style in children(node, "fills").filter(|n| is(*n, "FillStyle")) {
        let index = attr_u32(style, "index")?.unwrap_or(0);
        let Some(paint) = style.children().find(Node::is_element) else {
            continue;
        };
        shape = shape.with_fill(index, parse_fill(paint)?);
    }
    for style in children(node, "strokes").filter(|n| is(*n, "StrokeStyle")) {
        let index = attr_u32(style, "index")?.unwrap_or(0);
        let Some(stroke) = style.children().find(Node::is_element) else {
            continue;
        };
        shape = shape.with_stroke(index, parse_stroke(stroke)?);
    }
    Ok(shape)
}

fn parse_solid_color(node: Node<'_, '_>) -> XflResult<SolidColor> {
    Ok(SolidColor {
        color: node.attribute("color").unwrap_or("#000000").to_string(),
        alpha: attr_f64(node, "alpha")?,
    })
}

fn parse_fill(node: Node<'_, '_>) -> XflResult<FillStyle> {
    Ok(match node.tag_name().name() {
        "SolidColor" => FillStyle::Solid(parse_solid_color(node)?),
        "LinearGradient" => FillStyle::LinearGradient(parse_gradient(node)?),
        "RadialGradient" => FillStyle::RadialGradient(parse_gradient(node)?),
        other => FillStyle::Unsupported(other.to_string()),
    })
}

fn parse_gradient(node: Node<'_, '_>) -> XflResult<Gradient> {
    let stops = node
        .children()
        .filter(|n| is(*n, "GradientEntry"))
        .map(|e| {
            Ok(GradientStop {
                ratio: attr_f64(e, "ratio")?.unwrap_or(0.0),
                color: e.attribute("color").unwrap_or("#000000").to_string(),
                alpha: attr_f64(e, "alpha")?,
            })
        })
        .collect::<XflResult<Vec<_>>>()?;
    Ok(Gradient {
        matrix: parse_matrix(node)?,
        stops,
        spread: SpreadMethod::from_xfl(node.attribute("spreadMethod")),
    })
}

fn parse_stroke(node: Node<'_, '_>) -> XflResult<StrokeStyle> {
    if node.tag_name().name() != "SolidStroke" {
        return Ok(StrokeStyle::Unsupported(node.tag_name().name().to_string()));
    }
    let fill = child(node, "fill")
        .and_then(|f| f.children().find(Node::is_element))
        .map(parse_fill)
        .transpose()?
        .unwrap_or_else(|| FillStyle::Solid(SolidColor::default()));
    Ok(StrokeStyle::Solid(SolidStroke {
        weight: attr_f64(node, "weight")?,
        caps: node.attribute("caps").map(str::to_string),
        joints: node.attribute("joints").map(str::to_string),
        miter_limit: attr_f64(node, "miterLimit")?,
        scale_mode: node.attribute("scaleMode").map(str::to_string),
        hairline: node.attribute("solidStyle") == Some("hairline"),
        fill,
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/project/xfl.rs"]
mod tests;
