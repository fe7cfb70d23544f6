//! Ordered choice between two subtrees.
use anyhow::Result;

use super::{Context, Operation, Plan};
use crate::error::OperationError;

/// Branch chosen by a validated [`Fallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// The primary validated.
    Primary,
    /// The primary was rejected; the alternative runs instead.
    Alternative,
}

/// Runs the primary when it validates, the alternative otherwise.
///
/// The choice is made during validation and remembered for execution.
/// Effects the rejected primary scheduled are discarded before the
/// alternative is validated.
#[derive(Debug, Clone)]
pub struct Fallback {
    primary: Box<Operation>,
    alternative: Box<Operation>,
    selected: Option<Branch>,
}

impl Fallback {
    /// Pair `primary` with `alternative`.
    #[must_use]
    pub fn new(primary: Operation, alternative: Operation) -> Self {
        Self {
            primary: Box::new(primary),
            alternative: Box::new(alternative),
            selected: None,
        }
    }

    /// The preferred subtree.
    #[must_use]
    pub fn primary(&self) -> &Operation {
        &self.primary
    }

    /// The subtree used when the primary is rejected.
    #[must_use]
    pub fn alternative(&self) -> &Operation {
        &self.alternative
    }

    /// The branch chosen by the last validation.
    #[must_use]
    pub const fn selected(&self) -> Option<Branch> {
        self.selected
    }

    pub(super) fn validate(
        &mut self,
        ctx: &Context<'_>,
        plan: &mut Plan,
    ) -> Result<(), OperationError> {
        let snapshot = plan.clone();
        match self.primary.validate_in(ctx, plan) {
            Ok(()) => {
                self.selected = Some(Branch::Primary);
                Ok(())
            }
            Err(err) => {
                ctx.log
                    .debug(&format!("falling back, '{}' rejected: {err}", err.node()));
                *plan = snapshot;
                self.selected = Some(Branch::Alternative);
                self.alternative.validate_in(ctx, plan)
            }
        }
    }

    pub(super) fn execute(&self, ctx: &Context<'_>) -> Result<()> {
        match self.selected {
            Some(Branch::Primary) => self.primary.execute(ctx),
            Some(Branch::Alternative) => self.alternative.execute(ctx),
            None => anyhow::bail!("fallback executed before validation"),
        }
    }
}
