//! Style utility tokens (`p-4`, `bg-blue-500`, `rounded-lg`, ...)
//!
//! Tokens are parsed once on load and rendered back to canonical text, so
//! fix passes can rewrite them and the tree still serializes as strings.
//! Unrecognised tokens are kept verbatim as `StyleToken::Unknown`.

use forma_core::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixels per spacing unit (`p-4` = 16px)
pub const SPACING_UNIT: f64 = 4.0;

/// Which edges a padding token applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    All,
    X,
    Y,
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    fn prefix(&self) -> &'static str {
        match self {
            Side::All => "p",
            Side::X => "px",
            Side::Y => "py",
            Side::Top => "pt",
            Side::Right => "pr",
            Side::Bottom => "pb",
            Side::Left => "pl",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "p" => Side::All,
            "px" => Side::X,
            "py" => Side::Y,
            "pt" => Side::Top,
            "pr" => Side::Right,
            "pb" => Side::Bottom,
            "pl" => Side::Left,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowSize {
    None,
    Small,
    Medium,
    Large,
}

impl ShadowSize {
    /// Blur radius and y-offset for the drop shadow
    pub fn geometry(&self) -> (f64, f64) {
        match self {
            ShadowSize::None => (0.0, 0.0),
            ShadowSize::Small => (2.0, 1.0),
            ShadowSize::Medium => (6.0, 4.0),
            ShadowSize::Large => (15.0, 10.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    Regular,
    Medium,
    Semibold,
    Bold,
}

impl FontWeight {
    /// Font style name as exposed by font providers
    pub fn style_name(&self) -> &'static str {
        match self {
            FontWeight::Light => "Light",
            FontWeight::Regular => "Regular",
            FontWeight::Medium => "Medium",
            FontWeight::Semibold => "Semi Bold",
            FontWeight::Bold => "Bold",
        }
    }

    fn token_suffix(&self) -> &'static str {
        match self {
            FontWeight::Light => "light",
            FontWeight::Regular => "normal",
            FontWeight::Medium => "medium",
            FontWeight::Semibold => "semibold",
            FontWeight::Bold => "bold",
        }
    }
}

/// An explicit width or height
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Fixed(f64),
    Full,
}

/// A single parsed style utility token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StyleToken {
    Padding { side: Side, value: f64 },
    Gap(f64),
    Radius(f64),
    Fill(Color),
    TextColor(Color),
    StrokeColor(Color),
    StrokeWeight(f64),
    Shadow(ShadowSize),
    FontSize(f64),
    FontWeight(FontWeight),
    Width(Dimension),
    Height(Dimension),
    Unknown(String),
}

impl StyleToken {
    /// Parse a token; never fails, unrecognised input becomes `Unknown`
    pub fn parse(raw: &str) -> Self {
        let token = raw.trim();
        parse_known(token).unwrap_or_else(|| StyleToken::Unknown(token.to_string()))
    }

    pub fn is_spacing(&self) -> bool {
        matches!(self, StyleToken::Padding { .. } | StyleToken::Gap(_))
    }

    pub fn is_padding(&self) -> bool {
        matches!(self, StyleToken::Padding { .. })
    }
}

impl From<StyleToken> for String {
    fn from(token: StyleToken) -> Self {
        token.to_string()
    }
}

impl TryFrom<String> for StyleToken {
    type Error = std::convert::Infallible;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(StyleToken::parse(&value))
    }
}

impl From<&str> for StyleToken {
    fn from(value: &str) -> Self {
        StyleToken::parse(value)
    }
}

impl fmt::Display for StyleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleToken::Padding { side, value } => {
                write!(f, "{}-{}", side.prefix(), spacing_suffix(*value))
            }
            StyleToken::Gap(value) => write!(f, "gap-{}", spacing_suffix(*value)),
            StyleToken::Radius(value) => match radius_name(*value) {
                Some("") => f.write_str("rounded"),
                Some(name) => write!(f, "rounded-{}", name),
                None => write!(f, "rounded-[{}]", fmt_num(*value)),
            },
            StyleToken::Fill(color) => write!(f, "bg-[{}]", color.to_hex()),
            StyleToken::TextColor(color) => write!(f, "text-[{}]", color.to_hex()),
            StyleToken::StrokeColor(color) => write!(f, "border-[{}]", color.to_hex()),
            StyleToken::StrokeWeight(weight) => {
                if *weight == 1.0 {
                    f.write_str("border")
                } else {
                    write!(f, "border-[{}]", fmt_num(*weight))
                }
            }
            StyleToken::Shadow(size) => match size {
                ShadowSize::None => f.write_str("shadow-none"),
                ShadowSize::Small => f.write_str("shadow-sm"),
                ShadowSize::Medium => f.write_str("shadow"),
                ShadowSize::Large => f.write_str("shadow-lg"),
            },
            StyleToken::FontSize(size) => match font_size_name(*size) {
                Some(name) => write!(f, "text-{}", name),
                None => write!(f, "text-[{}]", fmt_num(*size)),
            },
            StyleToken::FontWeight(weight) => write!(f, "font-{}", weight.token_suffix()),
            StyleToken::Width(dim) => write!(f, "w-{}", dimension_suffix(*dim)),
            StyleToken::Height(dim) => write!(f, "h-{}", dimension_suffix(*dim)),
            StyleToken::Unknown(raw) => f.write_str(raw),
        }
    }
}

fn parse_known(token: &str) -> Option<StyleToken> {
    match token {
        "rounded" => return Some(StyleToken::Radius(4.0)),
        "border" => return Some(StyleToken::StrokeWeight(1.0)),
        "shadow" => return Some(StyleToken::Shadow(ShadowSize::Medium)),
        _ => {}
    }

    let (prefix, rest) = token.split_once('-')?;
    match prefix {
        "p" | "px" | "py" | "pt" | "pr" | "pb" | "pl" => {
            let side = Side::from_prefix(prefix)?;
            parse_spacing(rest).map(|value| StyleToken::Padding { side, value })
        }
        "gap" => parse_spacing(rest).map(StyleToken::Gap),
        "rounded" => parse_radius(rest).map(StyleToken::Radius),
        "bg" => parse_color(rest).map(StyleToken::Fill),
        "border" => {
            if let Some(color) = parse_color(rest) {
                Some(StyleToken::StrokeColor(color))
            } else {
                parse_number_or_bracket(rest).map(StyleToken::StrokeWeight)
            }
        }
        "shadow" => match rest {
            "none" => Some(StyleToken::Shadow(ShadowSize::None)),
            "sm" => Some(StyleToken::Shadow(ShadowSize::Small)),
            "md" => Some(StyleToken::Shadow(ShadowSize::Medium)),
            "lg" | "xl" | "2xl" => Some(StyleToken::Shadow(ShadowSize::Large)),
            _ => None,
        },
        "text" => {
            if let Some(size) = parse_font_size(rest) {
                Some(StyleToken::FontSize(size))
            } else {
                parse_color(rest).map(StyleToken::TextColor)
            }
        }
        "font" => parse_font_weight(rest).map(StyleToken::FontWeight),
        "w" => parse_dimension(rest).map(StyleToken::Width),
        "h" => parse_dimension(rest).map(StyleToken::Height),
        _ => None,
    }
}

fn bracketed(s: &str) -> Option<&str> {
    s.strip_prefix('[')?.strip_suffix(']')
}

fn parse_px(s: &str) -> Option<f64> {
    let value: f64 = s.trim_end_matches("px").parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn parse_spacing(s: &str) -> Option<f64> {
    if s == "px" {
        return Some(1.0);
    }
    if let Some(inner) = bracketed(s) {
        return parse_px(inner);
    }
    let units: f64 = s.parse().ok()?;
    (units.is_finite() && units >= 0.0).then_some(units * SPACING_UNIT)
}

fn parse_number_or_bracket(s: &str) -> Option<f64> {
    match bracketed(s) {
        Some(inner) => parse_px(inner),
        None => parse_px(s),
    }
}

const RADIUS_NAMES: &[(&str, f64)] = &[
    ("none", 0.0),
    ("sm", 2.0),
    ("", 4.0),
    ("md", 6.0),
    ("lg", 8.0),
    ("xl", 12.0),
    ("2xl", 16.0),
    ("3xl", 24.0),
    ("full", 9999.0),
];

fn parse_radius(s: &str) -> Option<f64> {
    if let Some(inner) = bracketed(s) {
        return parse_px(inner);
    }
    RADIUS_NAMES
        .iter()
        .find(|(name, _)| !name.is_empty() && *name == s)
        .map(|(_, value)| *value)
}

fn radius_name(value: f64) -> Option<&'static str> {
    RADIUS_NAMES
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(name, _)| *name)
}

const FONT_SIZE_NAMES: &[(&str, f64)] = &[
    ("xs", 12.0),
    ("sm", 14.0),
    ("base", 16.0),
    ("lg", 18.0),
    ("xl", 20.0),
    ("2xl", 24.0),
    ("3xl", 30.0),
    ("4xl", 36.0),
    ("5xl", 48.0),
];

fn parse_font_size(s: &str) -> Option<f64> {
    if let Some(inner) = bracketed(s) {
        if inner.starts_with('#') {
            return None;
        }
        return parse_px(inner);
    }
    FONT_SIZE_NAMES
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, value)| *value)
}

fn font_size_name(value: f64) -> Option<&'static str> {
    FONT_SIZE_NAMES
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(name, _)| *name)
}

fn parse_font_weight(s: &str) -> Option<FontWeight> {
    Some(match s {
        "light" => FontWeight::Light,
        "normal" | "regular" => FontWeight::Regular,
        "medium" => FontWeight::Medium,
        "semibold" => FontWeight::Semibold,
        "bold" => FontWeight::Bold,
        _ => return None,
    })
}

fn parse_dimension(s: &str) -> Option<Dimension> {
    if s == "full" {
        return Some(Dimension::Full);
    }
    parse_spacing(s).map(Dimension::Fixed)
}

fn parse_color(s: &str) -> Option<Color> {
    if let Some(inner) = bracketed(s) {
        return Color::parse_hex(inner);
    }
    if s.starts_with('#') {
        return Color::parse_hex(s);
    }
    match s {
        "white" => return Some(Color::WHITE),
        "black" => return Some(Color::BLACK),
        _ => {}
    }
    let (hue, shade) = s.rsplit_once('-')?;
    palette_color(hue, shade.parse().ok()?)
}

/// Compact utility palette: hue -> (100, 300, 500, 600, 700, 900)
const PALETTE: &[(&str, [u32; 6])] = &[
    ("gray", [0xF3F4F6, 0xD1D5DB, 0x6B7280, 0x4B5563, 0x374151, 0x111827]),
    ("slate", [0xF1F5F9, 0xCBD5E1, 0x64748B, 0x475569, 0x334155, 0x0F172A]),
    ("red", [0xFEE2E2, 0xFCA5A5, 0xEF4444, 0xDC2626, 0xB91C1C, 0x7F1D1D]),
    ("orange", [0xFFEDD5, 0xFDBA74, 0xF97316, 0xEA580C, 0xC2410C, 0x7C2D12]),
    ("yellow", [0xFEF9C3, 0xFDE047, 0xEAB308, 0xCA8A04, 0xA16207, 0x713F12]),
    ("green", [0xDCFCE7, 0x86EFAC, 0x22C55E, 0x16A34A, 0x15803D, 0x14532D]),
    ("blue", [0xDBEAFE, 0x93C5FD, 0x3B82F6, 0x2563EB, 0x1D4ED8, 0x1E3A8A]),
    ("indigo", [0xE0E7FF, 0xA5B4FC, 0x6366F1, 0x4F46E5, 0x4338CA, 0x312E81]),
    ("purple", [0xF3E8FF, 0xD8B4FE, 0xA855F7, 0x9333EA, 0x7E22CE, 0x581C87]),
];

const PALETTE_SHADES: [u32; 6] = [100, 300, 500, 600, 700, 900];

fn palette_color(hue: &str, shade: u32) -> Option<Color> {
    let (_, shades) = PALETTE.iter().find(|(name, _)| *name == hue)?;
    let index = PALETTE_SHADES.iter().position(|s| *s == shade)?;
    Some(Color::from_hex(shades[index]))
}

fn spacing_suffix(value: f64) -> String {
    let units = value / SPACING_UNIT;
    if units.fract() == 0.0 {
        fmt_num(units)
    } else {
        format!("[{}]", fmt_num(value))
    }
}

fn dimension_suffix(dim: Dimension) -> String {
    match dim {
        Dimension::Full => "full".to_string(),
        Dimension::Fixed(value) => format!("[{}]", fmt_num(value)),
    }
}

/// Format a number without a trailing `.0`
pub fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Edge insets in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }

    fn apply(&mut self, side: Side, value: f64) {
        match side {
            Side::All => *self = Edges::uniform(value),
            Side::X => {
                self.left = value;
                self.right = value;
            }
            Side::Y => {
                self.top = value;
                self.bottom = value;
            }
            Side::Top => self.top = value,
            Side::Right => self.right = value,
            Side::Bottom => self.bottom = value,
            Side::Left => self.left = value,
        }
    }
}

/// The combined effect of a node's style tokens; later tokens win
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    pub padding: Edges,
    pub gap: Option<f64>,
    pub radius: Option<f64>,
    pub fill: Option<Color>,
    pub text_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_weight: Option<f64>,
    pub shadow: Option<ShadowSize>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub unknown: Vec<String>,
}

impl ComputedStyle {
    pub fn from_tokens(tokens: &[StyleToken]) -> Self {
        let mut style = ComputedStyle::default();
        for token in tokens {
            match token {
                StyleToken::Padding { side, value } => style.padding.apply(*side, *value),
                StyleToken::Gap(value) => style.gap = Some(*value),
                StyleToken::Radius(value) => style.radius = Some(*value),
                StyleToken::Fill(color) => style.fill = Some(*color),
                StyleToken::TextColor(color) => style.text_color = Some(*color),
                StyleToken::StrokeColor(color) => style.stroke_color = Some(*color),
                StyleToken::StrokeWeight(weight) => style.stroke_weight = Some(*weight),
                StyleToken::Shadow(size) => style.shadow = Some(*size),
                StyleToken::FontSize(size) => style.font_size = Some(*size),
                StyleToken::FontWeight(weight) => style.font_weight = Some(*weight),
                StyleToken::Width(dim) => style.width = Some(*dim),
                StyleToken::Height(dim) => style.height = Some(*dim),
                StyleToken::Unknown(raw) => style.unknown.push(raw.clone()),
            }
        }
        style
    }

    /// Whether a stroke should be drawn at all
    pub fn has_stroke(&self) -> bool {
        self.stroke_color.is_some() || self.stroke_weight.map(|w| w > 0.0).unwrap_or(false)
    }
}
