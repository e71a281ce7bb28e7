//! Pattern-match dispatch over the runtime shape of a scrutinee.
//!
//! A [`Match`] tries its cases in declaration order. Each case either
//! declines or accepts; the first to accept yields a [`BranchSignal`] naming
//! its branch function and the arguments bound from the scrutinee, and no
//! later case is consulted. The fallback is a separate field, so it always
//! runs last, and a match compiled without a user fallback gets
//! [`Fallback::Inexhaustive`].
//!
//! In tail position the selected branch becomes a tail call of the
//! enclosing body. Elsewhere it runs to completion through the case's own
//! trampoline.

use std::sync::Arc;

use smallvec::smallvec;

use crate::context::CallContext;
use crate::errors::{inexhaustive_match, EvalError, EvalResult};
use crate::exec::{eval_function, eval_value, Frame};
use crate::expr::Expr;
use crate::function::Function;
use crate::span::MatchSite;
use crate::step::{Arguments, Step};
use crate::trampoline::Trampoline;
use crate::value::{Constructor, Value};

/// A pattern-match expression.
#[derive(Debug)]
pub struct Match {
    site: MatchSite,
    scrutinee: Expr,
    cases: Vec<Case>,
    fallback: Fallback,
}

/// The runtime shape a case accepts, and what it binds.
#[derive(Debug)]
pub enum CasePattern {
    /// An atom of this exact constructor. Binds the atom's fields.
    Constructor(Arc<Constructor>),
    /// Any function. Binds the function.
    Callable,
    /// Any number. Binds the number.
    Number,
}

/// One case: a pattern and an expression producing its branch function.
#[derive(Debug)]
pub struct Case {
    pattern: CasePattern,
    branch: Expr,
    trampoline: Trampoline,
}

/// What happens when no case accepts.
#[derive(Debug)]
pub enum Fallback {
    /// A user-written catch-all. Its branch is called with no arguments.
    User { branch: Expr, trampoline: Trampoline },
    /// Fail, naming the match site.
    Inexhaustive,
}

/// Result of offering the scrutinee to one case.
pub(crate) enum CaseOutcome<'a> {
    Declined,
    Selected(BranchSignal<'a>),
}

/// The branch a match selected, ready to be called.
pub(crate) struct BranchSignal<'a> {
    /// Index of the selected case; the fallback is `cases.len()`.
    case: usize,
    branch: Function,
    arguments: Arguments,
    trampoline: &'a Trampoline,
}

impl Match {
    pub fn new(site: MatchSite, scrutinee: Expr, cases: Vec<Case>, fallback: Fallback) -> Self {
        Match {
            site,
            scrutinee,
            cases,
            fallback,
        }
    }

    /// A match without a user fallback.
    pub fn inexhaustive(site: MatchSite, scrutinee: Expr, cases: Vec<Case>) -> Self {
        Self::new(site, scrutinee, cases, Fallback::Inexhaustive)
    }

    pub fn site(&self) -> &MatchSite {
        &self.site
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub(crate) fn dispatch_tail(
        &self,
        ctx: &CallContext,
        frame: &mut Frame<'_>,
    ) -> Result<Step, EvalError> {
        let signal = self.select(ctx, frame)?;
        Ok(Step::tail_call(signal.branch, signal.arguments))
    }

    pub(crate) fn dispatch_value(&self, ctx: &CallContext, frame: &mut Frame<'_>) -> EvalResult {
        let signal = self.select(ctx, frame)?;
        signal.trampoline.run(ctx, &signal.branch, &signal.arguments)
    }

    fn select(&self, ctx: &CallContext, frame: &mut Frame<'_>) -> Result<BranchSignal<'_>, EvalError> {
        let scrutinee = eval_value(ctx, frame, &self.scrutinee)?;
        for (index, case) in self.cases.iter().enumerate() {
            if let CaseOutcome::Selected(signal) = case.offer(ctx, frame, &scrutinee, index)? {
                tracing::trace!(site = %self.site, case = signal.case, "case selected");
                return Ok(signal);
            }
        }
        self.fallback
            .select(ctx, frame, &self.site, self.cases.len())
    }
}

impl Case {
    pub fn new(pattern: CasePattern, branch: Expr) -> Self {
        Case {
            pattern,
            branch,
            trampoline: Trampoline::new(),
        }
    }

    pub fn constructor(constructor: &Arc<Constructor>, branch: Expr) -> Self {
        Self::new(CasePattern::Constructor(Arc::clone(constructor)), branch)
    }

    pub fn callable(branch: Expr) -> Self {
        Self::new(CasePattern::Callable, branch)
    }

    pub fn number(branch: Expr) -> Self {
        Self::new(CasePattern::Number, branch)
    }

    pub fn pattern(&self) -> &CasePattern {
        &self.pattern
    }

    /// Arguments for the branch when the pattern accepts `scrutinee`.
    fn bind(&self, scrutinee: &Value) -> Option<Arguments> {
        match (&self.pattern, scrutinee) {
            (CasePattern::Constructor(constructor), Value::Atom(atom))
                if atom.is_instance_of(constructor) =>
            {
                Some(atom.fields().iter().cloned().collect())
            }
            (CasePattern::Callable, Value::Function(_)) | (CasePattern::Number, Value::Number(_)) => {
                Some(smallvec![scrutinee.clone()])
            }
            _ => None,
        }
    }

    /// The branch expression is only evaluated when the pattern accepts.
    fn offer<'a>(
        &'a self,
        ctx: &CallContext,
        frame: &mut Frame<'_>,
        scrutinee: &Value,
        index: usize,
    ) -> Result<CaseOutcome<'a>, EvalError> {
        let Some(arguments) = self.bind(scrutinee) else {
            return Ok(CaseOutcome::Declined);
        };
        let branch = eval_function(ctx, frame, &self.branch)?;
        Ok(CaseOutcome::Selected(BranchSignal {
            case: index,
            branch,
            arguments,
            trampoline: &self.trampoline,
        }))
    }
}

impl Fallback {
    pub fn user(branch: Expr) -> Self {
        Fallback::User {
            branch,
            trampoline: Trampoline::new(),
        }
    }

    fn select<'a>(
        &'a self,
        ctx: &CallContext,
        frame: &mut Frame<'_>,
        site: &MatchSite,
        index: usize,
    ) -> Result<BranchSignal<'a>, EvalError> {
        match self {
            Fallback::User { branch, trampoline } => {
                tracing::trace!(site = %site, "fallback selected");
                Ok(BranchSignal {
                    case: index,
                    branch: eval_function(ctx, frame, branch)?,
                    arguments: Arguments::new(),
                    trampoline,
                })
            }
            Fallback::Inexhaustive => Err(inexhaustive_match(site)),
        }
    }
}
