//! Variable stack.
//!
//! The search pushes a [`Binding`] whenever a variable edge consumes a token
//! and unwinds it when that branch is left, so at any point the stack holds
//! exactly the captures of the current path. Completed matches take an
//! immutable [`Bindings`] snapshot.
//!
//! ```text
//! path:  my ── name ── is ── $name ── and ── $name
//! stack:                     [name=ann]      [name=ann, name=bob]
//! value_of("name") == "bob"   (latest frame shadows earlier ones)
//! ```
//!
//! Lookups go through the snapshot: [`Bindings::value_of`] is the only read
//! surface, so expansion never sees a stack that is still changing.

/// One captured variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: String,
    /// Match weight of the edge that captured the value.
    pub weight: f32,
    /// Tree depth of the variable node (1 for the first word of a rule).
    pub depth: usize,
}

/// Immutable copy of the variable stack taken when a match completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    frames: Vec<Binding>,
}

impl Bindings {
    /// Value of the most recently bound frame named `name`.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.frames.iter().rev().find(|b| b.name == name).map(|b| b.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Rename frames to the names a specific rule input used.
    ///
    /// Variable edges merge regardless of name, so the frame carries the name
    /// of whichever rule created the node. `variables` holds `(depth, name)`
    /// pairs of the rule whose output is being expanded.
    pub(crate) fn renamed(&self, variables: &[(usize, String)]) -> Bindings {
        let frames = self
            .frames
            .iter()
            .map(|frame| {
                let mut frame = frame.clone();
                if let Some((_, name)) = variables.iter().find(|(depth, _)| *depth == frame.depth) {
                    frame.name = name.clone();
                }
                frame
            })
            .collect();
        Bindings { frames }
    }
}

impl FromIterator<Binding> for Bindings {
    fn from_iter<I: IntoIterator<Item = Binding>>(iter: I) -> Self {
        Bindings { frames: iter.into_iter().collect() }
    }
}

/// Scoped name -> value stack owned by a single search.
#[derive(Debug, Default)]
pub(crate) struct VarStack {
    frames: Vec<Binding>,
}

impl VarStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>, weight: f32, depth: usize) {
        self.frames.push(Binding { name: name.into(), value: value.into(), weight, depth });
    }

    /// Drop every frame above `len`: the search unwinds to the height the
    /// stack had when a branch was entered.
    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn snapshot(&self) -> Bindings {
        Bindings { frames: self.frames.clone() }
    }
}
