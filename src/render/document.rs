use std::collections::HashSet;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::core::fmt_num;

/// Attribute list; most output elements carry four attributes or fewer.
pub type Attrs = SmallVec<[(&'static str, String); 4]>;

/// Output SVG element.
///
/// Children are shared through `Arc` so cached fragments can be placed in many documents
/// without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: &'static str,
    attrs: Attrs,
    children: Vec<Arc<Element>>,
}

impl Element {
    /// Element with no attributes or children.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    /// Tag name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builder-style attribute.
    pub fn with_attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style attributes, in order.
    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = (&'static str, String)>) -> Self {
        for (k, v) in attrs {
            self.set_attr(k, v);
        }
        self
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Attribute value by name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in insertion order.
    pub fn attrs(&self) -> &[(&'static str, String)] {
        &self.attrs
    }

    /// Builder-style child.
    pub fn with_child(mut self, child: impl Into<Arc<Element>>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder-style children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Arc<Element>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a child.
    pub fn push_child(&mut self, child: impl Into<Arc<Element>>) {
        self.children.push(child.into());
    }

    /// Children in order.
    pub fn children(&self) -> &[Arc<Element>] {
        &self.children
    }

    /// Serialize as XML into `out`.
    pub fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.name);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            escape_attr(v, out);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for c in &self.children {
            c.write_xml(out);
        }
        out.push_str("</");
        out.push_str(self.name);
        out.push('>');
    }

    /// Serialize as an XML string.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }
}

fn escape_attr(v: &str, out: &mut String) {
    for ch in v.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Reusable fragments keyed by id, deduplicated, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defs {
    order: Vec<(String, Arc<Element>)>,
    ids: HashSet<String>,
}

impl Defs {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `element` under `id` unless the id is already present.
    pub fn insert(&mut self, id: impl Into<String>, element: impl Into<Arc<Element>>) {
        let id = id.into();
        if self.ids.insert(id.clone()) {
            self.order.push((id, element.into()));
        }
    }

    /// Insert every fragment of `other` that is not present yet.
    pub fn extend(&mut self, other: &Defs) {
        for (id, el) in &other.order {
            if !self.ids.contains(id) {
                self.ids.insert(id.clone());
                self.order.push((id.clone(), Arc::clone(el)));
            }
        }
    }

    /// Return `true` when `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Fragment by id.
    pub fn get(&self, id: &str) -> Option<&Arc<Element>> {
        self.order.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|(k, _)| k.as_str())
    }

    /// Fragments in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Arc<Element>> {
        self.order.iter().map(|(_, v)| v)
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Return `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Rendered piece of a document: reusable fragments plus ordered body elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    /// Fragments referenced from the body.
    pub defs: Defs,
    /// Body elements, back-most first.
    pub body: Vec<Arc<Element>>,
}

impl Fragment {
    /// Empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another fragment: its defs are merged and its body follows ours.
    pub fn append(&mut self, other: &Fragment) {
        self.defs.extend(&other.defs);
        self.body.extend(other.body.iter().cloned());
    }

    /// Move the body into a single wrapper element, keeping the defs.
    pub fn wrap_body(&mut self, wrapper: Element) {
        let body = std::mem::take(&mut self.body);
        self.body.push(Arc::new(wrapper.with_children(body)));
    }
}

/// Complete SVG output of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    width: f64,
    height: f64,
    defs: Defs,
    body: Vec<Arc<Element>>,
}

impl Document {
    /// Document of the given size from a rendered fragment.
    pub fn new(width: f64, height: f64, fragment: Fragment) -> Self {
        Self {
            width,
            height,
            defs: fragment.defs,
            body: fragment.body,
        }
    }

    /// Width in px.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height in px.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Reusable fragments.
    pub fn defs(&self) -> &Defs {
        &self.defs
    }

    /// Body elements, back-most first.
    pub fn body(&self) -> &[Arc<Element>] {
        &self.body
    }

    /// Put a full-size background rectangle behind everything else.
    pub fn with_background(mut self, color: &str) -> Self {
        let rect = Element::new("rect")
            .with_attr("width", fmt_num(self.width))
            .with_attr("height", fmt_num(self.height))
            .with_attr("fill", color);
        self.body.insert(0, Arc::new(rect));
        self
    }

    /// Move the origin to the center of the document.
    ///
    /// Symbol timelines are authored around their registration point at `(0, 0)`; centering
    /// makes them visible when rendered on their own.
    pub fn centered(mut self) -> Self {
        let transform = format!(
            "matrix(1, 0, 0, 1, {}, {})",
            fmt_num(self.width / 2.0),
            fmt_num(self.height / 2.0)
        );
        let body = std::mem::take(&mut self.body);
        self.body
            .push(Arc::new(Element::new("g").with_attr("transform", transform).with_children(body)));
        self
    }

    /// Root `<svg>` element.
    pub fn to_element(&self) -> Element {
        let w = fmt_num(self.width);
        let h = fmt_num(self.height);
        let mut defs = Element::new("defs");
        for el in self.defs.elements() {
            defs.push_child(Arc::clone(el));
        }
        Element::new("svg")
            .with_attr("xmlns", "http://www.w3.org/2000/svg")
            .with_attr("xmlns:xlink", "http://www.w3.org/1999/xlink")
            .with_attr("version", "1.1")
            .with_attr("preserveAspectRatio", "none")
            .with_attr("x", "0px")
            .with_attr("y", "0px")
            .with_attr("width", format!("{w}px"))
            .with_attr("height", format!("{h}px"))
            .with_attr("viewBox", format!("0 0 {w} {h}"))
            .with_child(defs)
            .with_children(self.body.iter().cloned())
    }

    /// Serialize the document as SVG text.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        self.to_element().write_xml(&mut out);
        out.push('\n');
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/document.rs"]
mod tests;
