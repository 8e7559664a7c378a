//! # Hooks
//!
//! Host-supplied callbacks. Every invocation is isolated: an `Err` or a panic
//! from one hook is logged and reported, never propagated into the caller's
//! control flow.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::choice::ConsentChoice;
use crate::error::{ConsentError, ConsentResult};

/// A side-effecting callback with no arguments.
#[derive(Clone)]
pub struct Hook(Rc<dyn Fn() -> anyhow::Result<()>>);

impl Hook {
    pub fn new(f: impl Fn() -> anyhow::Result<()> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Wrap a callback that cannot report failure.
    pub fn infallible(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(move || {
            f();
            Ok(())
        }))
    }

    pub fn run(&self, name: &str) -> ConsentResult<()> {
        isolate(name, || (self.0)())
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// A callback receiving a finalized choice; used for the save/apply overrides.
#[derive(Clone)]
pub struct ChoiceHook(Rc<dyn Fn(&ConsentChoice) -> anyhow::Result<()>>);

impl ChoiceHook {
    pub fn new(f: impl Fn(&ConsentChoice) -> anyhow::Result<()> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn run(&self, name: &str, choice: &ConsentChoice) -> ConsentResult<()> {
        isolate(name, || (self.0)(choice))
    }
}

impl fmt::Debug for ChoiceHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChoiceHook(..)")
    }
}

/// Run an optional hook; absence is success.
pub fn fire(hook: &Option<Hook>, name: &str) {
    if let Some(hook) = hook {
        let _ = hook.run(name);
    }
}

/// Run untrusted code, converting errors and panics into `ConsentError::Callback`.
pub fn isolate<F>(name: &str, f: F) -> ConsentResult<()>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => {
            log::warn!("Error running {}: {:#}", name, err);
            Err(ConsentError::Callback {
                name: name.to_string(),
                message: format!("{:#}", err),
            })
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::warn!("Panic running {}: {}", name, message);
            Err(ConsentError::Callback {
                name: name.to_string(),
                message,
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_contained() {
        let hook = Hook::new(|| anyhow::bail!("tag not loaded"));
        let err = hook.run("on_accept for analytical").unwrap_err();
        match err {
            ConsentError::Callback { name, message } => {
                assert_eq!(name, "on_accept for analytical");
                assert!(message.contains("tag not loaded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_panic_is_contained() {
        let hook = Hook::infallible(|| panic!("boom"));
        assert!(hook.run("on_reject for advertising").is_err());
    }

    #[test]
    fn test_fire_absent_hook() {
        fire(&None, "on_banner_open");
    }
}
