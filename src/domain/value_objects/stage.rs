//! Pipeline stages of a single package task

use std::fmt;

/// Where a package task currently is.
///
/// Tasks move strictly forward:
/// `Resolving → Emitting → Bundling → Projecting → Reconciling → Done`.
/// A failure is reported together with the stage it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Resolving,
    Emitting,
    Bundling,
    Projecting,
    Reconciling,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Resolving => "resolve",
            Stage::Emitting => "emit",
            Stage::Bundling => "bundle",
            Stage::Projecting => "project",
            Stage::Reconciling => "reconcile",
            Stage::Done => "done",
        }
    }

    /// The stage that follows this one, `None` once done
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Resolving => Some(Stage::Emitting),
            Stage::Emitting => Some(Stage::Bundling),
            Stage::Bundling => Some(Stage::Projecting),
            Stage::Projecting => Some(Stage::Reconciling),
            Stage::Reconciling => Some(Stage::Done),
            Stage::Done => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
