//! Suites compiled into the binary.

use anyhow::Result;
use lisa_suite::{FrozenRegistry, Registry};

mod hello_world;
mod selftest;

pub fn register_all(registry: &mut Registry) -> Result<()> {
    hello_world::register(registry)?;
    selftest::register(registry)?;
    Ok(())
}

/// Builds and freezes the registry of every built-in suite.
pub fn load() -> Result<FrozenRegistry> {
    let mut registry = Registry::new();
    register_all(&mut registry)?;
    Ok(registry.freeze()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_is_consistent() {
        let registry = load().unwrap();
        assert_eq!(registry.suites().len(), 2);
        for case in registry.cases() {
            assert!(case.suite().is_some(), "{} is orphaned", case.full_name());
        }
        assert!(registry.case("HelloWorld.hello").is_some());
        assert!(registry.case("Selftest.flaky").is_some());
    }

    #[test]
    fn registering_twice_fails() {
        let mut registry = Registry::new();
        register_all(&mut registry).unwrap();
        assert!(register_all(&mut registry).is_err());
    }
}
