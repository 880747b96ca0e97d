//! SVG path data and point lists.
//!
//! Path data is stored as a string on [`Geometry::Path`](crate::model::Geometry)
//! and parsed into a [`PathData`] command list whenever it has to be
//! measured or moved.

use crate::error::{EditorError, EditorResult};
use kurbo::{BezPath, Point, Rect, Shape as _};
use std::fmt;

/// One path command with its flat parameter list.
///
/// `params.len()` is always a multiple of the command's arity; repeated
/// parameter groups (`L 1 2 3 4`) stay on the same command.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCommand {
    pub letter: char,
    pub params: Vec<f64>,
}

impl PathCommand {
    pub fn new(letter: char, params: Vec<f64>) -> Self {
        Self { letter, params }
    }

    pub fn is_absolute(&self) -> bool {
        self.letter.is_ascii_uppercase()
    }

    /// Number of parameters consumed per repetition.
    pub fn arity(&self) -> usize {
        arity(self.letter).unwrap_or(0)
    }

    /// Shift the coordinate parameters by `(dx, dy)`. Relative commands are untouched.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if !self.is_absolute() {
            return;
        }
        let arity = self.arity();
        if arity == 0 {
            return;
        }
        for group in self.params.chunks_mut(arity) {
            match self.letter {
                'H' => group[0] += dx,
                'V' => group[0] += dy,
                // rx ry rotation large-arc sweep x y
                'A' => {
                    group[5] += dx;
                    group[6] += dy;
                }
                _ => {
                    for (i, value) in group.iter_mut().enumerate() {
                        *value += if i % 2 == 0 { dx } else { dy };
                    }
                }
            }
        }
    }
}

fn arity(letter: char) -> Option<usize> {
    match letter.to_ascii_uppercase() {
        'M' | 'L' | 'T' => Some(2),
        'S' | 'Q' => Some(4),
        'C' => Some(6),
        'H' | 'V' => Some(1),
        'A' => Some(7),
        'Z' => Some(0),
        _ => None,
    }
}

/// Parsed path data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData {
    pub commands: Vec<PathCommand>,
}

impl PathData {
    /// Tokenize path data into commands and numeric parameters.
    pub fn parse(d: &str) -> EditorResult<Self> {
        let mut lexer = Lexer::new(d);
        let mut commands: Vec<PathCommand> = Vec::new();

        while let Some(c) = lexer.peek_significant() {
            if c.is_ascii_alphabetic() {
                lexer.bump();
                let arity = arity(c).ok_or_else(|| {
                    EditorError::ParseFailure(format!("unknown path command '{c}'"))
                })?;
                let mut params = Vec::new();
                let is_arc = c.eq_ignore_ascii_case(&'a');
                while arity > 0 {
                    match lexer.peek_significant() {
                        Some(n) if is_number_start(n) => {
                            let slot = params.len() % arity;
                            let value = if is_arc && (slot == 3 || slot == 4) {
                                lexer.flag()?
                            } else {
                                lexer.number()?
                            };
                            params.push(value);
                        }
                        _ => break,
                    }
                }
                if arity > 0 && (params.is_empty() || params.len() % arity != 0) {
                    return Err(EditorError::ParseFailure(format!(
                        "command '{c}' expects groups of {arity} parameters, got {}",
                        params.len()
                    )));
                }
                commands.push(PathCommand::new(c, params));
            } else {
                return Err(EditorError::ParseFailure(format!(
                    "unexpected '{c}' at offset {}",
                    lexer.pos
                )));
            }
        }

        Ok(Self { commands })
    }

    /// Build `M x0 y0 L x1 y1 ...` from sampled points. Needs two points.
    pub fn from_points(points: &[Point]) -> EditorResult<Self> {
        if points.len() < 2 {
            return Err(EditorError::InsufficientInput {
                required: 2,
                got: points.len(),
            });
        }
        let mut commands = Vec::with_capacity(points.len());
        commands.push(PathCommand::new('M', vec![points[0].x, points[0].y]));
        for p in &points[1..] {
            commands.push(PathCommand::new('L', vec![p.x, p.y]));
        }
        Ok(Self { commands })
    }

    /// Shift every absolute command by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for command in &mut self.commands {
            command.translate(dx, dy);
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let mut copy = self.clone();
        copy.translate(dx, dy);
        copy
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn to_bez_path(&self) -> EditorResult<BezPath> {
        BezPath::from_svg(&self.to_string())
            .map_err(|e| EditorError::ParseFailure(format!("path geometry: {e:?}")))
    }

    /// Tight bounds of the path geometry, `None` for empty or unmeasurable paths.
    pub fn bounds(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        let path = self.to_bez_path().ok()?;
        if path.elements().is_empty() {
            return None;
        }
        Some(path.bounding_box())
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", command.letter)?;
            for value in &command.params {
                write!(f, " {value}")?;
            }
        }
        Ok(())
    }
}

/// Bounds of raw path data; parse failures yield `None`.
pub fn path_bounds(d: &str) -> Option<Rect> {
    match PathData::parse(d) {
        Ok(data) => data.bounds(),
        Err(err) => {
            log::debug!("Skipping unmeasurable path: {err}");
            None
        }
    }
}

fn is_number_start(c: char) -> bool {
    c.is_ascii_digit() || c == '-' || c == '+' || c == '.'
}

struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    /// Skip separators and peek at the next character.
    fn peek_significant(&mut self) -> Option<char> {
        while let Some(&b) = self.src.get(self.pos) {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                return Some(b as char);
            }
        }
        None
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn flag(&mut self) -> EditorResult<f64> {
        match self.src.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(0.0)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(1.0)
            }
            _ => Err(EditorError::ParseFailure(format!(
                "expected arc flag at offset {}",
                self.pos
            ))),
        }
    }

    fn number(&mut self) -> EditorResult<f64> {
        let start = self.pos;
        if matches!(self.src.get(self.pos), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let mut seen_dot = false;
        let mut seen_digit = false;
        while let Some(&b) = self.src.get(self.pos) {
            match b {
                b'0'..=b'9' => seen_digit = true,
                b'.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            self.pos += 1;
        }
        if seen_digit && matches!(self.src.get(self.pos), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.src.get(self.pos), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            let exp_start = self.pos;
            while matches!(self.src.get(self.pos), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
            if self.pos == exp_start {
                self.pos = mark;
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|e| EditorError::ParseFailure(e.to_string()))?;
        if !seen_digit {
            return Err(EditorError::ParseFailure(format!(
                "malformed number '{text}' at offset {start}"
            )));
        }
        text.parse::<f64>()
            .map_err(|e| EditorError::ParseFailure(format!("'{text}': {e}")))
    }
}

/// Point list as stored on polygons and polylines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointList(pub Vec<Point>);

impl PointList {
    /// Strict parse: every whitespace-separated entry must be an `x,y` pair.
    pub fn parse(points: &str) -> EditorResult<Self> {
        points
            .split_whitespace()
            .map(|pair| {
                parse_pair(pair).ok_or_else(|| {
                    EditorError::ParseFailure(format!("malformed point '{pair}'"))
                })
            })
            .collect::<EditorResult<Vec<_>>>()
            .map(PointList)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        PointList(
            self.0
                .iter()
                .map(|p| Point::new(p.x + dx, p.y + dy))
                .collect(),
        )
    }

    pub fn bounds(&self) -> Option<Rect> {
        let first = self.0.first()?;
        let init = Rect::from_points(*first, *first);
        Some(self.0.iter().fold(init, |acc, p| acc.union_pt(*p)))
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

impl fmt::Display for PointList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{},{}", p.x, p.y)?;
        }
        Ok(())
    }
}

fn parse_pair(pair: &str) -> Option<Point> {
    let mut parts = pair.split(',');
    let x = parts.next()?.trim().parse::<f64>().ok()?;
    let y = parts.next()?.trim().parse::<f64>().ok()?;
    if parts.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Point::new(x, y))
}
