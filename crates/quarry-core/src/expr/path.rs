use crate::model::{Kind, RecordModel};
use std::fmt;

///
/// Step
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Step {
    Field(&'static str),
    Index(usize),
}

///
/// Segment
/// One step of a path together with the static kind it reaches.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Segment {
    step: Step,
    kind: Kind,
}

impl Segment {
    #[must_use]
    pub const fn step(&self) -> &Step {
        &self.step
    }

    #[must_use]
    pub const fn kind(&self) -> &Kind {
        &self.kind
    }
}

///
/// PathRoot
///
/// A path starts either at a record or at "the current element" inside
/// collection sub-criteria.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PathRoot {
    Record(&'static RecordModel),
    Element(Kind),
}

///
/// Path
///
/// Typed attribute reference from a root through nested fields and list
/// indexes. Paths are value-equal.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Path {
    root: PathRoot,
    segments: Vec<Segment>,
}

impl Path {
    #[must_use]
    pub const fn root(model: &'static RecordModel) -> Self {
        Self {
            root: PathRoot::Record(model),
            segments: Vec::new(),
        }
    }

    #[must_use]
    pub const fn element(kind: Kind) -> Self {
        Self {
            root: PathRoot::Element(kind),
            segments: Vec::new(),
        }
    }

    /// Extend with a named attribute.
    #[must_use]
    pub fn child(&self, name: &'static str, kind: Kind) -> Self {
        self.extend(Step::Field(name), kind)
    }

    /// Extend with a list position.
    #[must_use]
    pub fn index(&self, index: usize, kind: Kind) -> Self {
        self.extend(Step::Index(index), kind)
    }

    fn extend(&self, step: Step, kind: Kind) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment { step, kind });

        Self {
            root: self.root.clone(),
            segments,
        }
    }

    #[must_use]
    pub const fn path_root(&self) -> &PathRoot {
        &self.root
    }

    #[must_use]
    pub const fn root_model(&self) -> Option<&'static RecordModel> {
        match self.root {
            PathRoot::Record(model) => Some(model),
            PathRoot::Element(_) => None,
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Kind reached by the full path.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match (self.segments.last(), &self.root) {
            (Some(segment), _) => segment.kind.clone(),
            (None, PathRoot::Record(model)) => Kind::Record(model),
            (None, PathRoot::Element(kind)) => kind.clone(),
        }
    }

    /// Dotted attribute names, without the root; indexes render as `[i]`.
    #[must_use]
    pub fn dotted(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment.step {
                Step::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                Step::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }

        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            PathRoot::Record(model) => f.write_str(model.name)?,
            PathRoot::Element(_) => f.write_str("$")?,
        }

        for segment in &self.segments {
            match segment.step {
                Step::Field(name) => write!(f, ".{name}")?,
                Step::Index(index) => write!(f, "[{index}]")?,
            }
        }

        Ok(())
    }
}
