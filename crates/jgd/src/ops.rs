//
// ops.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The operation record model (spec §3) and the graphics-context/line-type
//! encoding rules that go with it.

use crate::color;
use crate::json::Writer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    Round,
    Butt,
    Square,
}

impl LineEnd {
    fn as_str(&self) -> &'static str {
        match self {
            LineEnd::Round => "round",
            LineEnd::Butt => "butt",
            LineEnd::Square => "square",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Round,
    Miter,
    Bevel,
}

impl LineJoin {
    fn as_str(&self) -> &'static str {
        match self {
            LineJoin::Round => "round",
            LineJoin::Miter => "miter",
            LineJoin::Bevel => "bevel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    NonZero,
    EvenOdd,
}

impl Winding {
    fn as_str(&self) -> &'static str {
        match self {
            Winding::NonZero => "nonzero",
            Winding::EvenOdd => "evenodd",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Font {
    pub family: String,
    /// 1=plain, 2=bold, 3=italic, 4=bold-italic, 5=symbol.
    pub face: u8,
    /// Points, already multiplied by `cex`.
    pub size: f64,
    pub lineheight: f64,
}

#[derive(Debug, Clone)]
pub struct GraphicsContext {
    pub col: Option<u32>,
    pub fill: Option<u32>,
    pub lwd: f64,
    /// The engine's nibble-packed dash pattern; 0 means solid.
    pub lty: i32,
    pub lend: LineEnd,
    pub ljoin: LineJoin,
    pub lmitre: f64,
    pub font: Font,
}

impl GraphicsContext {
    /// Expand `lty` into successive on/off run lengths, in device pixels.
    /// Each of up to 8 nibbles (least-significant first) is a run length in
    /// line-width units; a zero nibble terminates the pattern. An empty
    /// result means a solid line.
    pub fn dashes(&self) -> Vec<f64> {
        let mut out = Vec::new();
        let mut remaining = self.lty;
        for _ in 0..8 {
            let nibble = remaining & 0xF;
            if nibble == 0 {
                break;
            }
            out.push(nibble as f64 * self.lwd);
            remaining >>= 4;
        }
        out
    }

    pub fn write_json(&self, w: &mut Writer) {
        w.raw_char('{');
        w.key("col").opt_string(color::to_wire(self.col).as_deref());
        w.raw_char(',');
        w.key("fill").opt_string(color::to_wire(self.fill).as_deref());
        w.raw_char(',');
        w.key("lwd").number(self.lwd);
        w.raw_char(',');
        w.key("lty").raw_char('[');
        for (i, dash) in self.dashes().iter().enumerate() {
            if i > 0 {
                w.raw_char(',');
            }
            w.number(*dash);
        }
        w.raw_char(']');
        w.raw_char(',');
        w.key("lend").string(self.lend.as_str());
        w.raw_char(',');
        w.key("ljoin").string(self.ljoin.as_str());
        w.raw_char(',');
        w.key("lmitre").number(self.lmitre);
        w.raw_char(',');
        w.key("font").raw_char('{');
        w.key("family").string(&self.font.family);
        w.raw_char(',');
        w.key("face").int(self.font.face as i64);
        w.raw_char(',');
        w.key("size").number(self.font.size);
        w.raw_char(',');
        w.key("lineheight").number(self.font.lineheight);
        w.raw_char('}');
        w.raw_char('}');
    }
}

fn write_xy_array(w: &mut Writer, key: &str, values: &[f64]) {
    w.key(key).raw_char('[');
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            w.raw_char(',');
        }
        w.number(*v);
    }
    w.raw_char(']');
}

#[derive(Debug, Clone)]
pub enum Op {
    Clip {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        gc: GraphicsContext,
    },
    Polyline {
        x: Vec<f64>,
        y: Vec<f64>,
        gc: GraphicsContext,
    },
    Polygon {
        x: Vec<f64>,
        y: Vec<f64>,
        gc: GraphicsContext,
    },
    Rect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        gc: GraphicsContext,
    },
    Circle {
        x: f64,
        y: f64,
        r: f64,
        gc: GraphicsContext,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        rot: f64,
        hadj: f64,
        gc: GraphicsContext,
    },
    Path {
        subpaths: Vec<Vec<(f64, f64)>>,
        winding: Winding,
        gc: GraphicsContext,
    },
    Raster {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        rot: f64,
        interpolate: bool,
        pw: u32,
        ph: u32,
        data_uri: String,
    },
}

impl Op {
    pub fn write_json(&self, out: &mut Writer) {
        out.raw_char('{');
        match self {
            Op::Clip { x0, y0, x1, y1 } => {
                out.key("type").string("clip");
                out.raw_char(',');
                out.key("x0").number(*x0);
                out.raw_char(',');
                out.key("y0").number(*y0);
                out.raw_char(',');
                out.key("x1").number(*x1);
                out.raw_char(',');
                out.key("y1").number(*y1);
            },
            Op::Line { x1, y1, x2, y2, gc } => {
                out.key("type").string("line");
                out.raw_char(',');
                out.key("x1").number(*x1);
                out.raw_char(',');
                out.key("y1").number(*y1);
                out.raw_char(',');
                out.key("x2").number(*x2);
                out.raw_char(',');
                out.key("y2").number(*y2);
                out.raw_char(',');
                out.key("gc");
                gc.write_json(out);
            },
            Op::Polyline { x, y, gc } => {
                out.key("type").string("polyline");
                out.raw_char(',');
                write_xy_array(out, "x", x);
                out.raw_char(',');
                write_xy_array(out, "y", y);
                out.raw_char(',');
                out.key("gc");
                gc.write_json(out);
            },
            Op::Polygon { x, y, gc } => {
                out.key("type").string("polygon");
                out.raw_char(',');
                write_xy_array(out, "x", x);
                out.raw_char(',');
                write_xy_array(out, "y", y);
                out.raw_char(',');
                out.key("gc");
                gc.write_json(out);
            },
            Op::Rect { x0, y0, x1, y1, gc } => {
                out.key("type").string("rect");
                out.raw_char(',');
                out.key("x0").number(*x0);
                out.raw_char(',');
                out.key("y0").number(*y0);
                out.raw_char(',');
                out.key("x1").number(*x1);
                out.raw_char(',');
                out.key("y1").number(*y1);
                out.raw_char(',');
                out.key("gc");
                gc.write_json(out);
            },
            Op::Circle { x, y, r, gc } => {
                out.key("type").string("circle");
                out.raw_char(',');
                out.key("x").number(*x);
                out.raw_char(',');
                out.key("y").number(*y);
                out.raw_char(',');
                out.key("r").number(*r);
                out.raw_char(',');
                out.key("gc");
                gc.write_json(out);
            },
            Op::Text { x, y, text, rot, hadj, gc } => {
                out.key("type").string("text");
                out.raw_char(',');
                out.key("x").number(*x);
                out.raw_char(',');
                out.key("y").number(*y);
                out.raw_char(',');
                out.key("str").string(text);
                out.raw_char(',');
                out.key("rot").number(*rot);
                out.raw_char(',');
                out.key("hadj").number(*hadj);
                out.raw_char(',');
                out.key("gc");
                gc.write_json(out);
            },
            Op::Path { subpaths, winding, gc } => {
                out.key("type").string("path");
                out.raw_char(',');
                out.key("subpaths").raw_char('[');
                for (i, sub) in subpaths.iter().enumerate() {
                    if i > 0 {
                        out.raw_char(',');
                    }
                    out.raw_char('[');
                    for (j, (x, y)) in sub.iter().enumerate() {
                        if j > 0 {
                            out.raw_char(',');
                        }
                        out.raw_char('[');
                        out.number(*x);
                        out.raw_char(',');
                        out.number(*y);
                        out.raw_char(']');
                    }
                    out.raw_char(']');
                }
                out.raw_char(']');
                out.raw_char(',');
                out.key("winding").string(winding.as_str());
                out.raw_char(',');
                out.key("gc");
                gc.write_json(out);
            },
            Op::Raster { x, y, w, h, rot, interpolate, pw, ph, data_uri } => {
                out.key("type").string("raster");
                out.raw_char(',');
                out.key("x").number(*x);
                out.raw_char(',');
                out.key("y").number(*y);
                out.raw_char(',');
                out.key("w").number(*w);
                out.raw_char(',');
                out.key("h").number(*h);
                out.raw_char(',');
                out.key("rot").number(*rot);
                out.raw_char(',');
                out.key("interpolate").bool(*interpolate);
                out.raw_char(',');
                out.key("pw").int(*pw as i64);
                out.raw_char(',');
                out.key("ph").int(*ph as i64);
                out.raw_char(',');
                out.key("data").string(data_uri);
            },
        }
        out.raw_char('}');
    }
}
