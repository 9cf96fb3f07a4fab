//! Configurable policies for the order state machine and the inventory ledger.
//!
//! The store's historical behaviour is permissive in two places: a status update may move an order
//! between any two statuses, and an approval whose stock cannot cover a line item leaves the short
//! counter untouched rather than failing. Both behaviours are kept as the defaults here, with the
//! stricter alternatives available as configuration rather than hard-coded.

use std::collections::HashSet;

use crate::db_types::OrderStatus;

//--------------------------------------  StockShortfallPolicy  ------------------------------------------------------
/// What the inventory ledger does when a stock counter cannot cover an ordered quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StockShortfallPolicy {
    /// Leave the short counter unchanged and continue. The store's historical behaviour.
    #[default]
    Skip,
    /// Fail the approval; the status transition and any decrements already applied roll back.
    Reject,
    /// Take the short counter to zero.
    Clamp,
}

//--------------------------------------    TransitionPolicy    ------------------------------------------------------
/// The adjacency table consulted by generic status updates.
///
/// The default is a full mesh: any status may move to any status, including itself. This mirrors
/// the store's unconstrained update endpoint. [`TransitionPolicy::linear_pipeline`] is the strict
/// alternative: `PENDING → APPROVED → SHIPPED → DELIVERED`, with `CANCELLED` reachable from any
/// non-terminal status.
///
/// The approval transition is not governed by this table; approving is only ever legal from
/// `PENDING`, no matter how permissive the policy is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPolicy {
    allowed: HashSet<(OrderStatus, OrderStatus)>,
}

impl TransitionPolicy {
    pub fn full_mesh() -> Self {
        let mut allowed = HashSet::new();
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                allowed.insert((from, to));
            }
        }
        Self { allowed }
    }

    pub fn linear_pipeline() -> Self {
        use OrderStatus::*;
        let mut policy = Self { allowed: HashSet::new() };
        policy = policy.allow(Pending, Approved).allow(Approved, Shipped).allow(Shipped, Delivered);
        for from in OrderStatus::ALL {
            if !from.is_terminal() {
                policy = policy.allow(from, Cancelled);
            }
        }
        policy
    }

    pub fn allow(mut self, from: OrderStatus, to: OrderStatus) -> Self {
        self.allowed.insert((from, to));
        self
    }

    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        self.allowed.contains(&(from, to))
    }
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self::full_mesh()
    }
}
