//! Field-level enablement for the permit form.
//!
//! The form is a tree of groups and fields. Disabling a group disables every
//! control beneath it and enabling a group enables every control beneath it,
//! so restricting a form to a few fields means enabling their parent group
//! first and then disabling the siblings one by one.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::permission::EditMode;

/// Path of the actual end date field.
pub const ACTUAL_END_DATE: &str = "timings.actualEndDate";

/// Path of the actual end time field.
pub const ACTUAL_END_TIME: &str = "timings.actualEndTime";

/// Worker slots shown on a permit.
pub const WORKER_SLOTS: usize = 6;

/// Most security requirements a permit can list.
pub const MAX_SECURITY_REQUIREMENTS: usize = 8;

#[derive(Clone, Debug)]
enum Node {
    Field { enabled: bool },
    Group(Vec<(String, Node)>),
}

impl Node {
    fn set_all(&mut self, on: bool) {
        match self {
            Node::Field { enabled } => *enabled = on,
            Node::Group(children) => {
                for (_, child) in children {
                    child.set_all(on);
                }
            }
        }
    }

    fn is_enabled(&self) -> bool {
        match self {
            Node::Field { enabled } => *enabled,
            Node::Group(children) => children.iter().any(|(_, c)| c.is_enabled()),
        }
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self {
            Node::Group(children) => children.iter_mut().find(|(n, _)| n == name).map(|(_, c)| c),
            Node::Field { .. } => None,
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Group(children) => children.iter().find(|(n, _)| n == name).map(|(_, c)| c),
            Node::Field { .. } => None,
        }
    }

    fn collect(&self, prefix: &str, on_only: bool, out: &mut BTreeSet<String>) {
        match self {
            Node::Field { enabled } => {
                if *enabled || !on_only {
                    out.insert(prefix.to_string());
                }
            }
            Node::Group(children) => {
                for (name, child) in children {
                    let path = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}.{name}")
                    };
                    child.collect(&path, on_only, out);
                }
            }
        }
    }
}

fn field() -> Node {
    Node::Field { enabled: true }
}

fn group<const N: usize>(children: [(&str, Node); N]) -> Node {
    Node::Group(
        children
            .into_iter()
            .map(|(name, node)| (name.to_string(), node))
            .collect(),
    )
}

fn slots(count: usize) -> Node {
    Node::Group((0..count).map(|i| (i.to_string(), field())).collect())
}

fn check_group() -> Node {
    group([("required", field()), ("notRequired", field())])
}

/// A tree of form controls with enabled/disabled state.
#[derive(Clone, Debug)]
pub struct Form {
    root: Node,
}

impl Form {
    /// The work permit form with the default six worker slots and one
    /// security requirement slot.
    pub fn permit() -> Self {
        Self::permit_with(WORKER_SLOTS, 1)
    }

    /// The work permit form with explicit repeated-slot counts.
    ///
    /// Security requirements are clamped to `1..=8`.
    pub fn permit_with(workers: usize, security_requirements: usize) -> Self {
        let security_requirements = security_requirements.clamp(1, MAX_SECURITY_REQUIREMENTS);
        let root = group([
            (
                "location",
                group([
                    ("entrance", field()),
                    ("airfield", field()),
                    ("buildings", field()),
                ]),
            ),
            ("nature", group([("routine", field()), ("nonRoutine", field())])),
            ("department", field()),
            ("supervisor", field()),
            ("workers", slots(workers)),
            (
                "timings",
                group([
                    ("date", field()),
                    ("time", field()),
                    ("expectedEndDate", field()),
                    ("expectedEndTime", field()),
                    ("actualEndDate", field()),
                    ("actualEndTime", field()),
                    ("dailyWorkStart", field()),
                    ("dailyWorkEnd", field()),
                ]),
            ),
            ("workDescription", field()),
            ("workLocation", field()),
            ("equipment", field()),
            (
                "hotWork",
                group([("welding", field()), ("cutting", field()), ("other", field())]),
            ),
            (
                "heights",
                group([("maxHeight", field()), ("scaffoldingDesc", field())]),
            ),
            (
                "confinedSpaces",
                group([("description", field()), ("ventilation", field())]),
            ),
            ("hazards", field()),
            (
                "safetyRequirements",
                group([
                    (
                        "ppe",
                        group([
                            ("helmet", check_group()),
                            ("mask", check_group()),
                            ("gloves", check_group()),
                            ("goggles", check_group()),
                            ("harness", check_group()),
                            ("faceShield", check_group()),
                            ("earPlugs", check_group()),
                            ("other", check_group()),
                        ]),
                    ),
                    ("securityRequirements", slots(security_requirements)),
                    ("fireRisk", field()),
                    (
                        "fireSafety",
                        group([
                            ("extinguisher", check_group()),
                            ("waterSand", check_group()),
                            ("ventilation", check_group()),
                            ("fireman", check_group()),
                            ("other", check_group()),
                        ]),
                    ),
                ]),
            ),
            (
                "signatures",
                group([
                    ("engineer", field()),
                    ("contractor", field()),
                    ("phone", field()),
                    ("signature", field()),
                    ("safetyOfficer", field()),
                ]),
            ),
        ]);
        Self { root }
    }

    fn node(&self, path: &str) -> Result<&Node> {
        path.split('.')
            .try_fold(&self.root, |node, name| node.child(name))
            .ok_or_else(|| Error::BadRequest(format!("Unknown form control: {path}")))
    }

    fn node_mut(&mut self, path: &str) -> Result<&mut Node> {
        let mut node = &mut self.root;
        for name in path.split('.') {
            node = node
                .child_mut(name)
                .ok_or_else(|| Error::BadRequest(format!("Unknown form control: {path}")))?;
        }
        Ok(node)
    }

    /// Enable a control and everything beneath it.
    pub fn enable(&mut self, path: &str) -> Result<()> {
        self.node_mut(path)?.set_all(true);
        Ok(())
    }

    /// Disable a control and everything beneath it.
    pub fn disable(&mut self, path: &str) -> Result<()> {
        self.node_mut(path)?.set_all(false);
        Ok(())
    }

    pub fn enable_all(&mut self) {
        self.root.set_all(true);
    }

    pub fn disable_all(&mut self) {
        self.root.set_all(false);
    }

    /// A group counts as enabled while any control beneath it is.
    pub fn is_enabled(&self, path: &str) -> Result<bool> {
        Ok(self.node(path)?.is_enabled())
    }

    /// Whether every control is disabled.
    pub fn is_disabled(&self) -> bool {
        !self.root.is_enabled()
    }

    /// Paths of enabled fields.
    pub fn enabled_fields(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.root.collect("", true, &mut out);
        out
    }

    /// Paths of every field.
    pub fn fields(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.root.collect("", false, &mut out);
        out
    }

    /// Restrict the form to what `mode` allows.
    pub fn apply(&mut self, mode: EditMode) {
        match mode {
            EditMode::Full => self.enable_all(),
            EditMode::ReadOnly => self.disable_all(),
            EditMode::Limited => self.restrict_to_actual_end(),
        }
    }

    fn restrict_to_actual_end(&mut self) {
        self.disable_all();
        let Ok(timings) = self.node_mut("timings") else {
            return;
        };
        timings.set_all(true);
        if let Node::Group(children) = timings {
            for (name, child) in children.iter_mut() {
                if name != "actualEndDate" && name != "actualEndTime" {
                    child.set_all(false);
                }
            }
        }
    }
}

/// The permit form restricted to `mode`.
pub fn for_mode(mode: EditMode) -> Form {
    let mut form = Form::permit();
    form.apply(mode);
    form
}
