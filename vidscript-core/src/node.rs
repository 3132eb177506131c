use serde::Serialize;

use crate::formats::ContainerFormat;

/// Typed representation of one successfully matched directive.
///
/// `OptimizedCrop` and `Comment` are produced by the pipeline itself; no
/// pattern creates them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum CommandNode {
    Trim(TrimParams),
    Convert(ConvertParams),
    Compress(CompressParams),
    Scale(ScaleParams),
    Crop(CropParams),
    OptimizedCrop(OptimizedCropParams),
    Fade(FadeParams),
    ContentOverlay(ContentOverlayParams),
    TextOverlay(TextOverlayParams),
    Deduplicate(DeduplicateParams),
    Input(InputParams),
    Comment(CommentParams),
}

impl CommandNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            CommandNode::Trim(_) => "trim",
            CommandNode::Convert(_) => "convert",
            CommandNode::Compress(_) => "compress",
            CommandNode::Scale(_) => "scale",
            CommandNode::Crop(_) => "crop",
            CommandNode::OptimizedCrop(_) => "optimized_crop",
            CommandNode::Fade(_) => "fade",
            CommandNode::ContentOverlay(_) => "content_overlay",
            CommandNode::TextOverlay(_) => "text_overlay",
            CommandNode::Deduplicate(_) => "deduplicate",
            CommandNode::Input(_) => "input",
            CommandNode::Comment(_) => "comment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrimParams {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertParams {
    pub format: ContainerFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressTarget {
    Video,
    Audio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressParams {
    pub target: CompressTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// Fit inside the box, keeping the source aspect
    Preserve,
    /// Force the exact size
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleParams {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CropSide {
    Top,
    Bottom,
    Left,
    Right,
    /// Left and right
    Width,
    /// Top and bottom
    Height,
    /// All four edges
    Each,
}

impl CropSide {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(CropSide::Top),
            "bottom" => Some(CropSide::Bottom),
            "left" => Some(CropSide::Left),
            "right" => Some(CropSide::Right),
            "width" => Some(CropSide::Width),
            "height" => Some(CropSide::Height),
            "each" => Some(CropSide::Each),
            _ => None,
        }
    }
}

/// A single `crop` directive. A `size` of 0 requests automatic border detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropParams {
    pub size: u32,
    pub side: CropSide,
}

/// Net crop of every edge after all `crop` directives were merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedCropParams {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
    /// At least one merged crop had size 0
    pub detect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeDirection {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FadeParams {
    pub direction: FadeDirection,
    /// Seconds
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    Text,
    Image,
    Subtitles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Position {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top-left" => Some(Position::TopLeft),
            "top-right" => Some(Position::TopRight),
            "bottom-left" => Some(Position::BottomLeft),
            "bottom-right" => Some(Position::BottomRight),
            "center" => Some(Position::Center),
            _ => None,
        }
    }
}

/// `burn` directive. `content` is stored without its surrounding quotes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentOverlayParams {
    pub kind: OverlayKind,
    pub content: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOverlayParams {
    pub text: String,
    pub position: Position,
    pub alignment: TextAlignment,
    /// Distance from the frame edge in pixels
    pub margin: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeduplicateParams {
    pub cycle: u32,
}

/// `path` is `None` for `input /`, which means no file was chosen yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputParams {
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentParams {
    pub text: String,
}
