use crate::scene::model::{BlobDef, ClockDef, GradientDef, SceneDef, TitleDef};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Index(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaError {
    pub(crate) path: Vec<SchemaPathElem>,
    pub(crate) message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaErrors {
    pub(crate) errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

/// Small helper that keeps the current JSON path while walking the document.
struct Checker {
    path: Vec<SchemaPathElem>,
    errors: Vec<SchemaError>,
}

impl Checker {
    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(SchemaError::at(&self.path, message));
    }

    fn field(&mut self, name: &'static str, f: impl FnOnce(&mut Self)) {
        self.path.push(SchemaPathElem::Field(name));
        f(self);
        self.path.pop();
    }

    fn index(&mut self, i: usize, f: impl FnOnce(&mut Self)) {
        self.path.push(SchemaPathElem::Index(i));
        f(self);
        self.path.pop();
    }

    fn non_negative(&mut self, name: &'static str, v: f64) {
        self.field(name, |c| {
            if !v.is_finite() || v < 0.0 {
                c.push("must be finite and >= 0");
            }
        });
    }

    fn positive(&mut self, name: &'static str, v: f64) {
        self.field(name, |c| {
            if !v.is_finite() || v <= 0.0 {
                c.push("must be finite and > 0");
            }
        });
    }

    fn unit(&mut self, name: &'static str, v: f64) {
        self.field(name, |c| {
            if !(0.0..=1.0).contains(&v) {
                c.push("must be within [0, 1]");
            }
        });
    }

    fn finite(&mut self, name: &'static str, v: f64) {
        self.field(name, |c| {
            if !v.is_finite() {
                c.push("must be finite");
            }
        });
    }

    fn color(&mut self, name: &'static str, color: crate::foundation::color::Color) {
        self.field(name, |c| {
            if !color.is_finite() {
                c.push("color channels must be finite");
            }
        });
    }
}

pub(crate) fn validate_scene(def: &SceneDef) -> Result<(), SchemaErrors> {
    let mut c = Checker {
        path: Vec::new(),
        errors: Vec::new(),
    };

    c.field("canvas", |c| {
        for (name, v) in [("width", def.canvas.width), ("height", def.canvas.height)] {
            c.field(name, |c| {
                if v == 0 || v > u32::from(u16::MAX) {
                    c.push(format!("must be within 1..={}", u16::MAX));
                }
            });
        }
    });

    c.field("fps", |c| {
        if def.fps.num == 0 || def.fps.den == 0 {
            c.push("num and den must be > 0");
        }
    });

    c.color("background", def.background);

    c.field("clocks", |c| {
        c.field("orbit", |c| check_clock(c, &def.clocks.orbit));
        c.field("sweep", |c| check_clock(c, &def.clocks.sweep));
    });

    c.field("blobs", |c| {
        let mut seen = HashSet::<&str>::new();
        for (i, blob) in def.blobs.iter().enumerate() {
            c.index(i, |c| {
                check_blob(c, blob);
                if !blob.id.trim().is_empty() && !seen.insert(blob.id.as_str()) {
                    c.field("id", |c| c.push(format!("duplicate blob id '{}'", blob.id)));
                }
            });
        }
    });

    c.field("blob_fill", |c| {
        c.unit("inner_alpha", def.blob_fill.inner_alpha);
        c.unit("outer_alpha", def.blob_fill.outer_alpha);
    });

    c.field("title", |c| check_title(c, &def.title));

    if c.errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors: c.errors })
    }
}

fn check_clock(c: &mut Checker, clock: &ClockDef) {
    c.field("cycle_ms", |c| {
        if clock.cycle_ms == 0 {
            c.push("must be > 0");
        }
    });
    c.positive("ceiling", clock.ceiling);
}

fn check_blob(c: &mut Checker, blob: &BlobDef) {
    c.field("id", |c| {
        if blob.id.trim().is_empty() {
            c.push("must be non-empty");
        }
    });
    c.color("color", blob.color);
    c.non_negative("amp_x", blob.amp_x);
    c.non_negative("amp_y", blob.amp_y);
    c.non_negative("base_r", blob.base_r);
    c.non_negative("var_r", blob.var_r);
    c.finite("speed", blob.speed);
    c.finite("phase", blob.phase);
    c.unit("opacity", blob.opacity);
}

fn check_title(c: &mut Checker, title: &TitleDef) {
    c.positive("size_frac", title.size_frac);
    c.positive("size_max", title.size_max);
    c.field("weight", |c| {
        if !(1.0..=1000.0).contains(&title.weight) {
            c.push("must be within [1, 1000]");
        }
    });
    c.finite("letter_spacing", f64::from(title.letter_spacing));
    c.positive("box_width_frac", title.box_width_frac);
    c.positive("box_width_max", title.box_width_max);
    c.positive("box_height", title.box_height);
    // The sweep layer is a square as wide as the mask box diagonal.
    let diagonal = title.box_width_max.hypot(title.box_height);
    if diagonal.is_finite() && diagonal > f64::from(u16::MAX) {
        c.field("box_height", |c| {
            c.push(format!(
                "mask box diagonal ({diagonal:.0} px from box_width_max and box_height) must be <= {}",
                u16::MAX
            ));
        });
    }
    c.field("sweep", |c| check_gradient(c, &title.sweep));
    c.field("glow", |c| {
        c.color("color", title.glow.color);
        c.unit("opacity", title.glow.opacity);
        c.field("blur_radius", |c| {
            if title.glow.blur_radius > 256 {
                c.push("must be <= 256");
            }
        });
    });
}

fn check_gradient(c: &mut Checker, g: &GradientDef) {
    c.field("stops", |c| {
        if g.stops.len() < 2 {
            c.push("needs at least 2 stops");
        }
        let mut prev = 0.0f64;
        for (i, stop) in g.stops.iter().enumerate() {
            c.index(i, |c| {
                c.unit("offset", stop.offset);
                if stop.offset < prev {
                    c.field("offset", |c| c.push("offsets must be ascending"));
                }
                c.color("color", stop.color);
            });
            if stop.offset.is_finite() {
                prev = prev.max(stop.offset);
            }
        }
    });
    let finite = g.start.iter().chain(g.end.iter()).all(|v| v.is_finite());
    if !finite {
        c.push("gradient start/end must be finite");
    } else if g.start == g.end {
        c.field("end", |c| c.push("must differ from start"));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/validate.rs"]
mod tests;
