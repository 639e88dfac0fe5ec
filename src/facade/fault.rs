//! Fault injection policies.
//!
//! A policy decides, per call, whether the call settles with a simulated
//! transport failure. Any `Fn(&OperationContext) -> bool` is a policy.

use crate::config::FaultConfig;
use crate::facade::operation::OperationContext;

/// Message carried by injected failures.
pub const SIMULATED_FAILURE_MESSAGE: &str = "Something went wrong!";

pub trait FaultPolicy: Send + Sync {
    /// `true` to fail this call.
    fn should_fail(&self, ctx: &OperationContext) -> bool;
}

impl<F> FaultPolicy for F
where
    F: Fn(&OperationContext) -> bool + Send + Sync,
{
    fn should_fail(&self, ctx: &OperationContext) -> bool {
        self(ctx)
    }
}

/// Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaults;

impl FaultPolicy for NoFaults {
    fn should_fail(&self, _ctx: &OperationContext) -> bool {
        false
    }
}

/// Fails each call with the probability configured for its entity/operation.
#[derive(Debug, Clone, Default)]
pub struct ProbabilisticFaults {
    config: FaultConfig,
}

impl ProbabilisticFaults {
    pub fn new(config: FaultConfig) -> Self {
        Self { config }
    }

    pub fn probability(&self, ctx: &OperationContext) -> f64 {
        self.config
            .for_entity(ctx.entity)
            .probability(ctx.operation)
            .clamp(0.0, 1.0)
    }
}

impl FaultPolicy for ProbabilisticFaults {
    fn should_fail(&self, ctx: &OperationContext) -> bool {
        let p = self.probability(ctx);
        p > 0.0 && fastrand::f64() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::Operation;
    use crate::model::EntityKind;

    #[test]
    fn test_default_only_fails_user_delete() {
        let policy = ProbabilisticFaults::default();
        for entity in [EntityKind::User, EntityKind::Product, EntityKind::Order] {
            for op in Operation::ALL {
                let ctx = OperationContext::new(entity, op, Some(1));
                let expected = if entity == EntityKind::User && op == Operation::Delete {
                    0.3
                } else {
                    0.0
                };
                assert_eq!(policy.probability(&ctx), expected, "{entity} {op:?}");
            }
        }
    }

    #[test]
    fn test_certain_failure() {
        let mut config = FaultConfig::default();
        config.products.create = 1.0;
        let policy = ProbabilisticFaults::new(config);
        let ctx = OperationContext::new(EntityKind::Product, Operation::Create, None);
        assert!((0..100).all(|_| policy.should_fail(&ctx)));
    }

    #[test]
    fn test_closure_policy() {
        let policy = |ctx: &OperationContext| ctx.target == Some(13);
        let unlucky = OperationContext::new(EntityKind::Order, Operation::GetById, Some(13));
        let fine = OperationContext::new(EntityKind::Order, Operation::GetById, Some(12));
        assert!(policy.should_fail(&unlucky));
        assert!(!policy.should_fail(&fine));
        assert!(!NoFaults.should_fail(&unlucky));
    }
}
