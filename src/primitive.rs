// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The filter primitive node value types (part of C4's data model).
//!
//! These are plain value types the caller builds once (from whatever graph
//! representation it parses SVG into) and hands to the engine; no parsing,
//! defaulting-from-attributes, or XML binding happens here — that is out of
//! scope per spec.md §1.

use crate::geom::Rect;

/// `filterUnits`/`primitiveUnits`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Units {
    UserSpaceOnUse,
    ObjectBoundingBox,
}

/// A filter element: a region plus an ordered list of primitives.
#[derive(Clone, Debug)]
pub struct Filter {
    pub region: Rect,
    pub filter_units: Units,
    pub primitive_units: Units,
    pub primitives: Vec<Primitive>,
}

/// One filter primitive node.
#[derive(Clone, Debug)]
pub struct Primitive {
    /// Primitive subregion, in `primitive_units`. `None` on a side means
    /// "expand to the current viewbox" per spec.md §4.2.
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,

    /// The name this primitive's result is cached under. Empty means
    /// "don't cache" (the result is still available as the next
    /// primitive's implicit last-result).
    pub result: String,

    pub kind: Kind,
}

impl Primitive {
    /// Whether any subregion side was specified, per spec.md §4.2's "primitive
    /// has any x/y/w/h" condition.
    pub fn has_subregion(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.width.is_some() || self.height.is_some()
    }
}

/// Identifies the `in`/`in2` of a filter primitive.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Input {
    /// `""` or `"none"`.
    LastResult,
    SourceGraphic,
    SourceAlpha,
    BackgroundImage,
    BackgroundAlpha,
    Reference(String),
}

/// One algorithm per variant (C8-C22).
#[derive(Clone, Debug)]
pub enum Kind {
    Blend(Blend),
    ColorMatrix(ColorMatrix),
    ComponentTransfer(ComponentTransfer),
    Composite(Composite),
    ConvolveMatrix(ConvolveMatrix),
    DiffuseLighting(DiffuseLighting),
    DisplacementMap(DisplacementMap),
    Flood(Flood),
    GaussianBlur(GaussianBlur),
    Image(Image),
    Merge(Merge),
    Morphology(Morphology),
    Offset(Offset),
    SpecularLighting(SpecularLighting),
    Tile(Tile),
    Turbulence(Turbulence),
}

impl Kind {
    /// Whether this primitive reads the given input, used by callers that
    /// validate the "no cycles, only references to earlier names" invariant
    /// before handing the graph to the engine.
    pub fn has_input(&self, input: &Input) -> bool {
        match self {
            Kind::Blend(k) => k.input1 == *input || k.input2 == *input,
            Kind::ColorMatrix(k) => k.input == *input,
            Kind::ComponentTransfer(k) => k.input == *input,
            Kind::Composite(k) => k.input1 == *input || k.input2 == *input,
            Kind::ConvolveMatrix(k) => k.input == *input,
            Kind::DiffuseLighting(k) => k.input == *input,
            Kind::DisplacementMap(k) => k.input1 == *input || k.input2 == *input,
            Kind::Flood(_) => false,
            Kind::GaussianBlur(k) => k.input == *input,
            Kind::Image(_) => false,
            Kind::Merge(k) => k.inputs.iter().any(|i| i == input),
            Kind::Morphology(k) => k.input == *input,
            Kind::Offset(k) => k.input == *input,
            Kind::SpecularLighting(k) => k.input == *input,
            Kind::Tile(k) => k.input == *input,
            Kind::Turbulence(_) => false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Darken,
    Lighten,
    SoftLight,
    HardLight,
    ColorDodge,
    ColorBurn,
    Overlay,
    Exclusion,
    Difference,
}

#[derive(Clone, Debug)]
pub struct Blend {
    pub input1: Input,
    pub input2: Input,
    pub mode: BlendMode,
}

#[derive(Clone, Debug)]
pub struct ColorMatrix {
    pub input: Input,
    pub kind: ColorMatrixKind,
}

#[derive(Clone, Debug)]
pub enum ColorMatrixKind {
    Matrix(Box<[f64; 20]>),
    Saturate(f64),
    HueRotate(f64),
    LuminanceToAlpha,
}

impl Default for ColorMatrixKind {
    fn default() -> Self {
        #[rustfmt::skip]
        let identity = [
            1.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ];
        ColorMatrixKind::Matrix(Box::new(identity))
    }
}

#[derive(Clone, Debug)]
pub struct ComponentTransfer {
    pub input: Input,
    pub func_r: TransferFunction,
    pub func_g: TransferFunction,
    pub func_b: TransferFunction,
    pub func_a: TransferFunction,
}

#[derive(Clone, Debug)]
pub enum TransferFunction {
    Identity,
    Table(Vec<f64>),
    Discrete(Vec<f64>),
    Linear { slope: f64, intercept: f64 },
    Gamma { amplitude: f64, exponent: f64, offset: f64 },
}

#[derive(Clone, Debug)]
pub struct Composite {
    pub input1: Input,
    pub input2: Input,
    pub operator: CompositeOperator,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CompositeOperator {
    Over,
    In,
    Out,
    Atop,
    Xor,
    Arithmetic { k1: f64, k2: f64, k3: f64, k4: f64 },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EdgeMode {
    None,
    Duplicate,
    Wrap,
}

#[derive(Clone, Debug)]
pub struct ConvolveMatrixData {
    pub target_x: u32,
    pub target_y: u32,
    pub columns: u32,
    pub rows: u32,
    pub data: Vec<f64>,
}

impl ConvolveMatrixData {
    /// `None` when `columns * rows != data.len()` or a target index is
    /// out of bounds. Per spec.md §4.24, a malformed kernel degrades the
    /// primitive to identity rather than being rejected outright, so
    /// callers typically treat `None` here as "build the identity kernel"
    /// rather than propagating an error.
    pub fn new(target_x: u32, target_y: u32, columns: u32, rows: u32, data: Vec<f64>) -> Option<Self> {
        if (columns * rows) as usize != data.len() || target_x >= columns || target_y >= rows {
            return None;
        }
        Some(ConvolveMatrixData { target_x, target_y, columns, rows, data })
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.data[(y * self.columns + x) as usize]
    }
}

#[derive(Clone, Debug)]
pub struct ConvolveMatrix {
    pub input: Input,
    pub matrix: ConvolveMatrixData,
    pub divisor: f64,
    pub bias: f64,
    pub edge_mode: EdgeMode,
    pub preserve_alpha: bool,
    /// `kernelUnitLength`: accepted for API completeness but not consulted
    /// by `primitives::convolve_matrix` — like the teacher, this crate
    /// always convolves at one device pixel per kernel cell (see
    /// `DESIGN.md`'s OQ-4).
    pub kernel_unit_length: Option<(f64, f64)>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColorChannel {
    R,
    G,
    B,
    A,
}

#[derive(Clone, Debug)]
pub struct DisplacementMap {
    pub input1: Input,
    pub input2: Input,
    pub scale: f64,
    pub x_channel_selector: ColorChannel,
    pub y_channel_selector: ColorChannel,
}

/// sRGB color, unpremultiplied, plus a separate opacity per spec.md §4.15.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct Flood {
    pub color: Color,
    pub opacity: f64,
}

#[derive(Clone, Debug)]
pub struct GaussianBlur {
    pub input: Input,
    pub std_dev_x: f64,
    pub std_dev_y: f64,
}

/// An `feImage` referencing an external resource. In-document node
/// references are out of scope per spec.md §1 ("the engine receives a
/// built graph"); the caller resolves `href` through
/// [`crate::context::ImageLoader`].
#[derive(Clone, Debug)]
pub struct Image {
    pub href: String,
}

#[derive(Clone, Debug)]
pub struct Merge {
    pub inputs: Vec<Input>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MorphologyOperator {
    Erode,
    Dilate,
}

#[derive(Clone, Debug)]
pub struct Morphology {
    pub input: Input,
    pub operator: MorphologyOperator,
    pub radius_x: f64,
    pub radius_y: f64,
}

#[derive(Clone, Debug)]
pub struct Offset {
    pub input: Input,
    pub dx: f64,
    pub dy: f64,
}

#[derive(Clone, Debug)]
pub struct SpecularLighting {
    pub input: Input,
    pub surface_scale: f64,
    pub specular_constant: f64,
    pub specular_exponent: f64,
    pub lighting_color: Color,
    pub light_source: LightSource,
}

#[derive(Clone, Debug)]
pub struct DiffuseLighting {
    pub input: Input,
    pub surface_scale: f64,
    pub diffuse_constant: f64,
    pub lighting_color: Color,
    pub light_source: LightSource,
}

/// Tagged union of the three light-source kinds (C23). Validation enforcing
/// "at most one light source per lighting primitive" happens before
/// construction; there is no representation for zero-or-many here by
/// design (see the "light source lookup" design note).
#[derive(Clone, Copy, Debug)]
pub enum LightSource {
    Distant { azimuth: f64, elevation: f64 },
    Point { x: f64, y: f64, z: f64 },
    Spot {
        x: f64,
        y: f64,
        z: f64,
        points_at_x: f64,
        points_at_y: f64,
        points_at_z: f64,
        specular_exponent: f64,
        limiting_cone_angle: Option<f64>,
    },
}

#[derive(Clone, Debug)]
pub struct Tile {
    pub input: Input,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurbulenceKind {
    FractalNoise,
    Turbulence,
}

#[derive(Clone, Copy, Debug)]
pub struct Turbulence {
    pub base_frequency_x: f64,
    pub base_frequency_y: f64,
    pub num_octaves: u32,
    pub seed: i32,
    pub stitch_tiles: bool,
    pub kind: TurbulenceKind,
}
