//! Behavior tree
//!
//! The stateful decision engine for rotations with multi-step structure.
//! Nodes return [`Status::Running`] to suspend their parent mid-traversal;
//! the next tick resumes at the suspended child rather than re-walking the
//! whole tree. At most one cast request is placed per tick: the first
//! [`CastAction`] to issue claims the tick's decision slot and later cast
//! leaves wait their turn.

use crate::abilities::AbilityInfo;
use crate::host::Decision;

use super::{gate, resolve, PolicyCtx, Pred};

/// Outcome of ticking a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    Running,
}

/// Per-tick scratch shared by a traversal: the policy context plus the
/// single decision slot.
pub struct TreeCtx<'a, 'b> {
    pub policy: &'a PolicyCtx<'b>,
    pub decision: Option<Decision>,
}

impl<'a, 'b> TreeCtx<'a, 'b> {
    pub fn new(policy: &'a PolicyCtx<'b>) -> Self {
        Self {
            policy,
            decision: None,
        }
    }
}

/// A behavior tree node. Composites own their children as trait objects.
pub trait Node {
    fn name(&self) -> &str;
    fn tick(&mut self, ctx: &mut TreeCtx) -> Status;
    /// Abandon any in-progress state.
    fn reset(&mut self);
}

// ============================================================================
// Composites
// ============================================================================

/// Runs children in order; fails on the first failure.
pub struct Sequence {
    name: String,
    children: Vec<Box<dyn Node>>,
    current: usize,
}

impl Node for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TreeCtx) -> Status {
        while self.current < self.children.len() {
            match self.children[self.current].tick(ctx) {
                Status::Running => return Status::Running,
                Status::Failure => {
                    self.reset();
                    return Status::Failure;
                }
                Status::Success => self.current += 1,
            }
        }
        self.reset();
        Status::Success
    }

    fn reset(&mut self) {
        self.current = 0;
        for child in &mut self.children {
            child.reset();
        }
    }
}

/// Runs children in order; succeeds on the first success.
pub struct Selector {
    name: String,
    children: Vec<Box<dyn Node>>,
    current: usize,
}

impl Node for Selector {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TreeCtx) -> Status {
        while self.current < self.children.len() {
            match self.children[self.current].tick(ctx) {
                Status::Running => return Status::Running,
                Status::Success => {
                    self.reset();
                    return Status::Success;
                }
                Status::Failure => self.current += 1,
            }
        }
        self.reset();
        Status::Failure
    }

    fn reset(&mut self) {
        self.current = 0;
        for child in &mut self.children {
            child.reset();
        }
    }
}

/// How a [`Parallel`] settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelPolicy {
    /// Succeed when every child has succeeded; fail on any failure.
    RequireAll,
    /// Succeed on any success; fail when every child has failed.
    RequireOne,
}

/// Ticks all children every tick until its policy is met. Children that
/// already settled keep their result and are not re-ticked.
pub struct Parallel {
    name: String,
    policy: ParallelPolicy,
    children: Vec<Box<dyn Node>>,
    settled: Vec<Option<Status>>,
}

impl Node for Parallel {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TreeCtx) -> Status {
        for (i, child) in self.children.iter_mut().enumerate() {
            if self.settled[i].is_some() {
                continue;
            }
            match child.tick(ctx) {
                Status::Running => {}
                done => self.settled[i] = Some(done),
            }
        }
        let successes = self
            .settled
            .iter()
            .filter(|s| **s == Some(Status::Success))
            .count();
        let failures = self
            .settled
            .iter()
            .filter(|s| **s == Some(Status::Failure))
            .count();
        let verdict = match self.policy {
            ParallelPolicy::RequireAll => {
                if failures > 0 {
                    Some(Status::Failure)
                } else if successes == self.children.len() {
                    Some(Status::Success)
                } else {
                    None
                }
            }
            ParallelPolicy::RequireOne => {
                if successes > 0 {
                    Some(Status::Success)
                } else if failures == self.children.len() {
                    Some(Status::Failure)
                } else {
                    None
                }
            }
        };
        match verdict {
            Some(status) => {
                self.reset();
                status
            }
            None => Status::Running,
        }
    }

    fn reset(&mut self) {
        for slot in &mut self.settled {
            *slot = None;
        }
        for child in &mut self.children {
            child.reset();
        }
    }
}

// ============================================================================
// Decorators
// ============================================================================

/// Flips Success and Failure; Running passes through.
pub struct Inverter {
    child: Box<dyn Node>,
}

impl Node for Inverter {
    fn name(&self) -> &str {
        self.child.name()
    }

    fn tick(&mut self, ctx: &mut TreeCtx) -> Status {
        match self.child.tick(ctx) {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            Status::Running => Status::Running,
        }
    }

    fn reset(&mut self) {
        self.child.reset();
    }
}

/// Re-runs its child until it has succeeded `times` times. Each child
/// success consumes the tick, so N repetitions span at least N ticks.
pub struct Repeater {
    child: Box<dyn Node>,
    times: u32,
    completed: u32,
}

impl Node for Repeater {
    fn name(&self) -> &str {
        self.child.name()
    }

    fn tick(&mut self, ctx: &mut TreeCtx) -> Status {
        if self.times == 0 {
            return Status::Success;
        }
        match self.child.tick(ctx) {
            Status::Running => Status::Running,
            Status::Failure => {
                self.reset();
                Status::Failure
            }
            Status::Success => {
                self.completed += 1;
                self.child.reset();
                if self.completed >= self.times {
                    self.completed = 0;
                    Status::Success
                } else {
                    Status::Running
                }
            }
        }
    }

    fn reset(&mut self) {
        self.completed = 0;
        self.child.reset();
    }
}

/// Condition gate: the child only runs while the predicate holds. A gate
/// closing mid-run abandons the child's progress.
pub struct Gate {
    name: String,
    pred: Pred,
    child: Box<dyn Node>,
}

impl Node for Gate {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TreeCtx) -> Status {
        if !(self.pred)(ctx.policy) {
            self.child.reset();
            return Status::Failure;
        }
        self.child.tick(ctx)
    }

    fn reset(&mut self) {
        self.child.reset();
    }
}

// ============================================================================
// Leaves
// ============================================================================

/// Pure condition leaf.
pub struct Check {
    name: String,
    pred: Pred,
}

impl Node for Check {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &mut TreeCtx) -> Status {
        if (self.pred)(ctx.policy) {
            Status::Success
        } else {
            Status::Failure
        }
    }

    fn reset(&mut self) {}
}

#[derive(Debug, Clone, Copy)]
enum CastState {
    Idle,
    Pending { issued_at: u64, seen_casting: bool },
}

/// Cast leaf. Issues the cast request through the shared gate, then tracks
/// completion by observation: casts are fire-and-forget, so success means
/// we saw our own cast start and then finish, and a request the host never
/// picked up fails after the action timeout. Instants succeed on issue.
pub struct CastAction {
    info: &'static AbilityInfo,
    state: CastState,
}

impl Node for CastAction {
    fn name(&self) -> &str {
        self.info.name
    }

    fn tick(&mut self, ctx: &mut TreeCtx) -> Status {
        match self.state {
            CastState::Idle => self.try_issue(ctx),
            CastState::Pending {
                issued_at,
                seen_casting,
            } => self.track(ctx, issued_at, seen_casting),
        }
    }

    fn reset(&mut self) {
        self.state = CastState::Idle;
    }
}

impl CastAction {
    fn try_issue(&mut self, ctx: &mut TreeCtx) -> Status {
        if !gate::can_cast(ctx.policy, self.info) {
            return Status::Failure;
        }
        if ctx.decision.is_some() {
            // Someone else claimed this tick; wait for ours.
            return Status::Running;
        }
        let Some(decision) = resolve(ctx.policy, self.info) else {
            return Status::Failure;
        };
        ctx.decision = Some(decision);
        if self.info.cast_ms == 0 {
            return Status::Success;
        }
        self.state = CastState::Pending {
            issued_at: ctx.policy.now_ms,
            seen_casting: false,
        };
        Status::Running
    }

    fn track(&mut self, ctx: &mut TreeCtx, issued_at: u64, seen_casting: bool) -> Status {
        let casting_now = ctx
            .policy
            .me
            .casting
            .as_ref()
            .map(|c| c.spell == self.info.id)
            .unwrap_or(false);
        if casting_now {
            self.state = CastState::Pending {
                issued_at,
                seen_casting: true,
            };
            return Status::Running;
        }
        if seen_casting {
            self.state = CastState::Idle;
            return Status::Success;
        }
        if ctx.policy.now_ms >= issued_at + ctx.policy.config.action_timeout_ms {
            self.state = CastState::Idle;
            return Status::Failure;
        }
        Status::Running
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn seq(name: &str, children: Vec<Box<dyn Node>>) -> Box<dyn Node> {
    Box::new(Sequence {
        name: name.to_string(),
        children,
        current: 0,
    })
}

pub fn sel(name: &str, children: Vec<Box<dyn Node>>) -> Box<dyn Node> {
    Box::new(Selector {
        name: name.to_string(),
        children,
        current: 0,
    })
}

pub fn parallel(name: &str, policy: ParallelPolicy, children: Vec<Box<dyn Node>>) -> Box<dyn Node> {
    let settled = vec![None; children.len()];
    Box::new(Parallel {
        name: name.to_string(),
        policy,
        children,
        settled,
    })
}

pub fn invert(child: Box<dyn Node>) -> Box<dyn Node> {
    Box::new(Inverter { child })
}

pub fn repeat(times: u32, child: Box<dyn Node>) -> Box<dyn Node> {
    Box::new(Repeater {
        child,
        times,
        completed: 0,
    })
}

pub fn gated(name: &str, pred: Pred, child: Box<dyn Node>) -> Box<dyn Node> {
    Box::new(Gate {
        name: name.to_string(),
        pred,
        child,
    })
}

pub fn check(name: &str, pred: Pred) -> Box<dyn Node> {
    Box::new(Check {
        name: name.to_string(),
        pred,
    })
}

pub fn cast(info: &'static AbilityInfo) -> Box<dyn Node> {
    Box::new(CastAction {
        info,
        state: CastState::Idle,
    })
}
