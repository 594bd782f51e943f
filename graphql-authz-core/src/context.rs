//! Carrying the request's ability in the execution context.

use std::sync::Arc;

use graphql_authz_engine::Context;

use crate::ability::Ability;

/// Context key under which the request's [`RequestAbility`] is stored.
pub const ABILITY_KEY: &str = "ability";

/// What a request is allowed to do.
#[derive(Debug, Clone)]
pub enum RequestAbility {
    /// Bypass every authorization check.
    Root,
    /// Check every field against this ability.
    Scoped(Arc<Ability>),
}

/// Attach and read the request ability on an engine [`Context`].
///
/// ```rust
/// use graphql_authz_core::{ContextAbilityExt, RequestAbility};
/// use graphql_authz_engine::Context;
///
/// let ctx = Context::new().with_root_access();
/// assert!(matches!(ctx.request_ability(), Some(RequestAbility::Root)));
/// ```
pub trait ContextAbilityExt {
    fn with_ability(self, ability: Ability) -> Self;

    fn with_shared_ability(self, ability: Arc<Ability>) -> Self;

    /// Mark the request as trusted. No checks run.
    fn with_root_access(self) -> Self;

    fn request_ability(&self) -> Option<&RequestAbility>;
}

impl ContextAbilityExt for Context {
    fn with_ability(self, ability: Ability) -> Self {
        self.with_shared_ability(Arc::new(ability))
    }

    fn with_shared_ability(self, ability: Arc<Ability>) -> Self {
        self.with(ABILITY_KEY, RequestAbility::Scoped(ability))
    }

    fn with_root_access(self) -> Self {
        self.with(ABILITY_KEY, RequestAbility::Root)
    }

    fn request_ability(&self) -> Option<&RequestAbility> {
        self.get::<RequestAbility>(ABILITY_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{Policy, Rules};
    use crate::error::PolicyError;

    struct Empty;

    impl Policy for Empty {
        type Identity = ();

        fn define_policy(&self, _rules: &mut Rules, _: &()) -> Result<(), PolicyError> {
            Ok(())
        }
    }

    #[test]
    fn test_no_ability_by_default() {
        assert!(Context::new().request_ability().is_none());
    }

    #[test]
    fn test_scoped_ability_roundtrip() {
        let ability = Arc::new(Ability::new(&Empty, &()).unwrap());
        let ctx = Context::new().with_shared_ability(ability.clone());
        match ctx.request_ability() {
            Some(RequestAbility::Scoped(stored)) => assert!(Arc::ptr_eq(stored, &ability)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_root_replaces_scoped() {
        let ability = Ability::new(&Empty, &()).unwrap();
        let ctx = Context::new().with_ability(ability).with_root_access();
        assert!(matches!(ctx.request_ability(), Some(RequestAbility::Root)));
    }

    #[test]
    fn test_wrong_type_under_key_is_ignored() {
        let ctx = Context::new().with(ABILITY_KEY, "root");
        assert!(ctx.request_ability().is_none());
    }
}
