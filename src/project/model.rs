use std::collections::BTreeMap;
use std::io::Read;
use std::sync::OnceLock;

use crate::foundation::core::Affine;
use crate::foundation::error::{XflError, XflResult};
use crate::foundation::math::StableHasher;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A fully parsed animation project.
///
/// A project is a pure data tree that can be:
/// - read from an uncompressed XFL directory (see [`crate::read_xfl_dir`])
/// - serialized/deserialized via Serde (JSON)
/// - built programmatically (tests, other front-ends)
///
/// Rendering goes through [`crate::Renderer`], which only reads the tree.
pub struct Project {
    /// Stage dimensions and background.
    pub stage: Stage,
    /// Scene timelines in document order.
    pub scenes: Vec<Timeline>,
    /// Library symbols keyed by library item name.
    pub symbols: BTreeMap<String, Timeline>,
}

impl Project {
    /// Parse a JSON project.
    pub fn from_json_reader(reader: impl Read) -> XflResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| XflError::project(format!("invalid project json: {e}")))
    }

    /// Serialize the project as pretty JSON.
    pub fn to_json(&self) -> XflResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| XflError::project(format!("project json encode failed: {e}")))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Document-level stage settings.
pub struct Stage {
    /// Stage width in px.
    pub width: f64,
    /// Stage height in px.
    pub height: f64,
    /// Background color (`#RRGGBB`).
    #[serde(default = "default_background")]
    pub background: String,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            width: 550.0,
            height: 400.0,
            background: default_background(),
        }
    }
}

fn default_background() -> String {
    "#FFFFFF".to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Whether a timeline name refers to a scene or a library symbol.
pub enum TimelineKind {
    /// Top-level scene timeline.
    Scene,
    /// Library symbol timeline.
    Symbol,
}

impl TimelineKind {
    /// Lowercase name used in messages and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scene => "scene",
            Self::Symbol => "symbol",
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Ordered layers of a scene or symbol. Layer 0 is the top-most layer.
pub struct Timeline {
    /// Scene or symbol name.
    pub name: String,
    /// Layers, top-most first.
    pub layers: Vec<Layer>,
    #[serde(skip)]
    mask_starts: OnceLock<Vec<Option<usize>>>,
}

impl Timeline {
    /// Create a timeline.
    pub fn new(name: impl Into<String>, layers: Vec<Layer>) -> Self {
        Self {
            name: name.into(),
            layers,
            mask_starts: OnceLock::new(),
        }
    }

    /// Number of frames: the furthest keyframe end over all layers (0 when empty).
    pub fn len_frames(&self) -> u32 {
        self.layers
            .iter()
            .filter_map(|l| l.keyframes.last())
            .map(|k| k.index.saturating_add(k.duration))
            .max()
            .unwrap_or(0)
    }

    /// Index of the last frame (0 for an empty timeline).
    pub fn last_frame(&self) -> u32 {
        self.len_frames().saturating_sub(1)
    }

    /// Mask-start markers, one slot per layer.
    ///
    /// Slot `i` holds the index of a mask layer when layer `i` is the bottom-most child of that
    /// mask, i.e. the first layer met while drawing back to front. Computed on first use.
    pub fn mask_starts(&self) -> &[Option<usize>] {
        self.mask_starts
            .get_or_init(|| compute_mask_starts(&self.layers))
    }
}

/// A layer belongs to the mask at `mask_idx` when its parent sits at or below the mask layer.
fn belongs_to_mask(layer: &Layer, mask_idx: usize) -> bool {
    layer.parent_layer_index.is_some_and(|p| p >= mask_idx)
}

fn compute_mask_starts(layers: &[Layer]) -> Vec<Option<usize>> {
    let mut starts = vec![None; layers.len()];
    let mut open: Option<usize> = None;

    for (i, layer) in layers.iter().enumerate() {
        if let Some(mask_idx) = open {
            if belongs_to_mask(layer, mask_idx) {
                let next_belongs = layers
                    .get(i + 1)
                    .is_some_and(|next| belongs_to_mask(next, mask_idx));
                if !next_belongs {
                    starts[i] = Some(mask_idx);
                    open = None;
                }
                continue;
            }
            // Mask without children.
            open = None;
        }
        if layer.kind == LayerKind::Mask {
            open = Some(i);
        }
    }

    starts
}

#[derive(Clone, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Role of a layer in its timeline.
pub enum LayerKind {
    /// Regular content layer.
    #[default]
    Normal,
    /// Authoring guide; never rendered.
    Guide,
    /// Stencil for the layers parented to it.
    Mask,
    /// Folder; rendered like a normal layer.
    Folder,
    /// Anything else, rendered like a normal layer.
    Other(String),
}

impl LayerKind {
    /// Map an XFL `layerType` attribute.
    pub fn from_xfl(raw: Option<&str>) -> Self {
        match raw {
            None | Some("normal") => Self::Normal,
            Some("guide") => Self::Guide,
            Some("mask") => Self::Mask,
            Some("folder") => Self::Folder,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
/// One layer of a timeline.
pub struct Layer {
    /// Layer name.
    #[serde(default)]
    pub name: String,
    /// Layer role.
    #[serde(default)]
    pub kind: LayerKind,
    /// Index of the parent layer (mask or folder), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_layer_index: Option<usize>,
    /// Keyframes sorted by start index.
    #[serde(default, deserialize_with = "sorted_keyframes")]
    pub keyframes: Vec<Keyframe>,
}

fn sorted_keyframes<'de, D>(deserializer: D) -> Result<Vec<Keyframe>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut keyframes = <Vec<Keyframe> as serde::Deserialize>::deserialize(deserializer)?;
    keyframes.sort_by_key(|k| k.index);
    Ok(keyframes)
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Static content held for `duration` frames starting at `index`.
pub struct Keyframe {
    /// First frame of the keyframe.
    pub index: u32,
    /// Number of frames the content is shown.
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// Elements, back-most first.
    #[serde(default)]
    pub elements: Vec<Element>,
}

fn default_duration() -> u32 {
    1
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
/// Renderable element of a keyframe.
pub enum Element {
    /// Vector shape.
    Shape(Shape),
    /// Group of elements; the group's own matrix is not applied.
    Group(Vec<Element>),
    /// Placed library symbol.
    SymbolInstance(SymbolInstance),
    /// Element kind that is not rendered (bitmaps, text, ...), with its tag.
    Unsupported(String),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Vector shape: styles plus edge records.
pub struct Shape {
    /// Placement matrix.
    #[serde(default)]
    pub matrix: Affine,
    // `fingerprint` caches a hash of these three fields.
    #[serde(default)]
    fills: Vec<FillEntry>,
    #[serde(default)]
    strokes: Vec<StrokeEntry>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
    #[serde(skip)]
    fingerprint: OnceLock<u64>,
}

impl Shape {
    /// Shape with the given edges and no styles.
    pub fn new(edges: Vec<EdgeRecord>) -> Self {
        Self {
            matrix: Affine::IDENTITY,
            fills: Vec::new(),
            strokes: Vec::new(),
            edges,
            fingerprint: OnceLock::new(),
        }
    }

    /// Builder-style placement matrix.
    pub fn with_matrix(mut self, matrix: Affine) -> Self {
        self.matrix = matrix;
        self
    }

    /// Builder-style fill style.
    pub fn with_fill(mut self, index: u32, style: FillStyle) -> Self {
        self.fills.push(FillEntry { index, style });
        self.fingerprint = OnceLock::new();
        self
    }

    /// Builder-style stroke style.
    pub fn with_stroke(mut self, index: u32, style: StrokeStyle) -> Self {
        self.strokes.push(StrokeEntry { index, style });
        self.fingerprint = OnceLock::new();
        self
    }

    /// Fill styles in declaration order.
    pub fn fills(&self) -> &[FillEntry] {
        &self.fills
    }

    /// Stroke styles in declaration order.
    pub fn strokes(&self) -> &[StrokeEntry] {
        &self.strokes
    }

    /// Edge records in document order.
    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    /// Look up a fill style by index.
    pub fn fill_style(&self, index: u32) -> Option<&FillStyle> {
        self.fills.iter().find(|f| f.index == index).map(|f| &f.style)
    }

    /// Look up a stroke style by index.
    pub fn stroke_style(&self, index: u32) -> Option<&StrokeStyle> {
        self.strokes
            .iter()
            .find(|s| s.index == index)
            .map(|s| &s.style)
    }

    /// Content hash of styles and edges.
    ///
    /// The placement matrix is excluded: it is applied outside the converted shape, so two
    /// placements of equal geometry share one conversion.
    pub fn fingerprint(&self) -> u64 {
        *self.fingerprint.get_or_init(|| {
            let mut h = StableHasher::new();
            h.write_u32(self.fills.len() as u32);
            for f in &self.fills {
                h.write_u32(f.index);
                hash_fill(&mut h, &f.style);
            }
            h.write_u32(self.strokes.len() as u32);
            for s in &self.strokes {
                h.write_u32(s.index);
                hash_stroke(&mut h, &s.style);
            }
            h.write_u32(self.edges.len() as u32);
            for e in &self.edges {
                hash_opt_u32(&mut h, e.fill_left);
                hash_opt_u32(&mut h, e.fill_right);
                hash_opt_u32(&mut h, e.stroke);
                h.write_str(&e.edges);
            }
            h.finish()
        })
    }
}

fn hash_opt_u32(h: &mut StableHasher, v: Option<u32>) {
    match v {
        Some(v) => {
            h.write_u8(1);
            h.write_u32(v);
        }
        None => h.write_u8(0),
    }
}

fn hash_opt_str(h: &mut StableHasher, v: Option<&str>) {
    match v {
        Some(v) => {
            h.write_u8(1);
            h.write_str(v);
        }
        None => h.write_u8(0),
    }
}

fn hash_fill(h: &mut StableHasher, style: &FillStyle) {
    match style {
        FillStyle::Solid(c) => {
            h.write_u8(0);
            h.write_str(&c.color);
            h.write_opt_f64(c.alpha);
        }
        FillStyle::LinearGradient(g) | FillStyle::RadialGradient(g) => {
            h.write_u8(if matches!(style, FillStyle::LinearGradient(_)) {
                1
            } else {
                2
            });
            hash_gradient(h, g);
        }
        FillStyle::Unsupported(raw) => {
            h.write_u8(3);
            h.write_str(raw);
        }
    }
}

fn hash_gradient(h: &mut StableHasher, g: &Gradient) {
    for c in g.matrix.as_coeffs() {
        h.write_f64(c);
    }
    h.write_u8(g.spread as u8);
    h.write_u32(g.stops.len() as u32);
    for s in &g.stops {
        h.write_f64(s.ratio);
        h.write_str(&s.color);
        h.write_opt_f64(s.alpha);
    }
}

fn hash_stroke(h: &mut StableHasher, style: &StrokeStyle) {
    match style {
        StrokeStyle::Solid(s) => {
            h.write_u8(0);
            h.write_opt_f64(s.weight);
            hash_opt_str(h, s.caps.as_deref());
            hash_opt_str(h, s.joints.as_deref());
            h.write_opt_f64(s.miter_limit);
            hash_opt_str(h, s.scale_mode.as_deref());
            h.write_bool(s.hairline);
            hash_fill(h, &s.fill);
        }
        StrokeStyle::Unsupported(raw) => {
            h.write_u8(1);
            h.write_str(raw);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One `Edge` element: path data plus the styles on either side.
pub struct EdgeRecord {
    /// Fill on the left of the path (`fillStyle0`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_left: Option<u32>,
    /// Fill on the right of the path (`fillStyle1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_right: Option<u32>,
    /// Stroke drawn along the path (`strokeStyle`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<u32>,
    /// Encoded path (`edges` attribute).
    #[serde(default)]
    pub edges: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Indexed fill style of a shape.
pub struct FillEntry {
    /// Index referenced by edge records.
    pub index: u32,
    /// Style.
    pub style: FillStyle,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Indexed stroke style of a shape.
pub struct StrokeEntry {
    /// Index referenced by edge records.
    pub index: u32,
    /// Style.
    pub style: StrokeStyle,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
/// Fill paint descriptor.
pub enum FillStyle {
    /// Flat color.
    Solid(SolidColor),
    /// Linear gradient.
    LinearGradient(Gradient),
    /// Radial gradient.
    RadialGradient(Gradient),
    /// Anything else (bitmap fills, ...), with its tag.
    Unsupported(String),
}

impl Default for FillStyle {
    fn default() -> Self {
        Self::Solid(SolidColor::default())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Flat color with optional opacity.
pub struct SolidColor {
    /// `#RRGGBB` color.
    #[serde(default = "default_color")]
    pub color: String,
    /// Opacity in `[0, 1]`; absent means opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

impl SolidColor {
    /// Opaque color.
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            alpha: None,
        }
    }
}

impl Default for SolidColor {
    fn default() -> Self {
        Self::new(default_color())
    }
}

fn default_color() -> String {
    "#000000".to_string()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Behavior outside the gradient's `[0, 1]` range.
pub enum SpreadMethod {
    /// Extend the end colors.
    #[default]
    Pad,
    /// Mirror the gradient.
    Reflect,
    /// Repeat the gradient.
    Repeat,
}

impl SpreadMethod {
    /// Map an XFL `spreadMethod` attribute (`extend` is the authoring tool's name for pad).
    pub fn from_xfl(raw: Option<&str>) -> Self {
        match raw {
            Some("reflect") => Self::Reflect,
            Some("repeat") => Self::Repeat,
            _ => Self::Pad,
        }
    }

    /// SVG `spreadMethod` value.
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Pad => "pad",
            Self::Reflect => "reflect",
            Self::Repeat => "repeat",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Gradient definition shared by linear and radial fills.
pub struct Gradient {
    /// Maps the gradient square onto the shape.
    #[serde(default)]
    pub matrix: Affine,
    /// Color stops in document order.
    pub stops: Vec<GradientStop>,
    /// Spread method.
    #[serde(default)]
    pub spread: SpreadMethod,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Gradient color stop.
pub struct GradientStop {
    /// Position in `[0, 1]`.
    pub ratio: f64,
    /// `#RRGGBB` color.
    #[serde(default = "default_color")]
    pub color: String,
    /// Opacity; absent means opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
/// Stroke descriptor.
pub enum StrokeStyle {
    /// Solid stroke.
    Solid(SolidStroke),
    /// Dashed, dotted, ragged and other strokes, with their tag.
    Unsupported(String),
}

#[derive(Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
/// Solid stroke attributes as written in XFL; defaults are applied when painting.
pub struct SolidStroke {
    /// Width in px.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// `round`, `square` or `none`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caps: Option<String>,
    /// `round`, `bevel` or `miter`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joints: Option<String>,
    /// Miter limit for miter joins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miter_limit: Option<f64>,
    /// `normal`, `none`, `horizontal` or `vertical`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_mode: Option<String>,
    /// `solidStyle="hairline"`.
    #[serde(default)]
    pub hairline: bool,
    /// Stroke paint.
    pub fill: FillStyle,
}

#[derive(Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
/// Raw attributes of a `Color` transform element.
pub struct ColorDescriptor(pub BTreeMap<String, String>);

impl ColorDescriptor {
    /// Build from attribute pairs.
    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Attribute value by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Return `true` when the attribute is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

impl std::fmt::Display for ColorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<Color")?;
        for (k, v) in &self.0 {
            write!(f, " {k}=\"{v}\"")?;
        }
        f.write_str("/>")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// How a symbol instance maps parent frames onto symbol frames.
pub enum LoopMode {
    /// Always show `first_frame`.
    #[default]
    SingleFrame,
    /// Cycle through `first_frame..=last_frame`.
    Loop,
    /// Advance from `first_frame` and hold `last_frame`.
    PlayOnce,
    /// Anything else; rendering it fails.
    Other(String),
}

impl LoopMode {
    /// Map an XFL `loop` attribute.
    pub fn from_xfl(raw: Option<&str>) -> Self {
        match raw {
            None | Some("single frame") => Self::SingleFrame,
            Some("loop") => Self::Loop,
            Some("play once") => Self::PlayOnce,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Library symbol behavior.
pub enum SymbolType {
    /// Graphic symbol; follows the parent timeline.
    #[default]
    Graphic,
    /// Movie clip; rendered like a graphic.
    MovieClip,
    /// Button; rendered like a graphic.
    Button,
    /// Anything else; rendered like a graphic.
    Other(String),
}

impl SymbolType {
    /// Map an XFL `symbolType` attribute.
    pub fn from_xfl(raw: Option<&str>) -> Self {
        match raw {
            None | Some("graphic") => Self::Graphic,
            Some("movie clip") => Self::MovieClip,
            Some("button") => Self::Button,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Placement of a library symbol.
pub struct SymbolInstance {
    /// Library item name of the symbol.
    pub library_item_name: String,
    /// Symbol behavior.
    #[serde(default)]
    pub symbol_type: SymbolType,
    /// Placement matrix.
    #[serde(default)]
    pub matrix: Affine,
    /// Color transform, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorDescriptor>,
    /// Frame mapping.
    #[serde(default)]
    pub loop_mode: LoopMode,
    /// First symbol frame shown.
    #[serde(default)]
    pub first_frame: u32,
    /// Last symbol frame; defaults to the symbol's last frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_frame: Option<u32>,
}

impl SymbolInstance {
    /// Single-frame graphic instance at the identity matrix.
    pub fn new(library_item_name: impl Into<String>) -> Self {
        Self {
            library_item_name: library_item_name.into(),
            symbol_type: SymbolType::Graphic,
            matrix: Affine::IDENTITY,
            color: None,
            loop_mode: LoopMode::SingleFrame,
            first_frame: 0,
            last_frame: None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/model.rs"]
mod tests;
