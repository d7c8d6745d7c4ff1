//! # Lifecycle hook pipeline.
//!
//! Hooks let callers intercept the lifecycle of a fired call without touching
//! the queue or the call logic. Each hook name holds **one** callback (last
//! write wins, no chaining) and is resolved through a two-level lookup:
//! the handler's own table first, then the gate's global table.
//!
//! ## Hook points
//! ```text
//! fire()
//!   ├─► UpdateConfig(config) -> config      transform, replaces the bound config
//!   │     [await admission]
//!   ├─► BeforeFire(&options)                side effect
//!   │     [invoke client]
//!   ├─ success ─► AfterSuccess(&out, &opts) side effect
//!   │             BeforeResolve(out) -> out transform, settles Ok(out)
//!   └─ failure ─► AfterFail(&err, &opts)    side effect
//!                 BeforeReject(err) -> err  transform, settles Err(err)
//! ```
//!
//! A hook absent at both levels is a no-op for side-effect hooks and identity
//! for transforms. The gate installs explicit identity defaults for
//! `UpdateConfig`, `BeforeResolve`, and `BeforeReject` at construction.
//!
//! ## Example
//! ```
//! use callgate::{ClientFn, Hook};
//!
//! type Fetch = ClientFn<String, String, std::convert::Infallible>;
//!
//! let hook: Hook<Fetch> = Hook::update_config(|url| format!("{url}?token=abc"));
//! assert_eq!(hook.name(), "update_config");
//! ```

use std::sync::Arc;

use crate::client::Client;
use crate::config::FireOptions;
use crate::error::FireError;

/// Transform applied to the bound call config before admission.
pub type UpdateConfigFn<C> =
    Arc<dyn Fn(<C as Client>::Config) -> <C as Client>::Config + Send + Sync>;

/// Side effect run after admission, right before the client is invoked.
pub type BeforeFireFn = Arc<dyn Fn(&FireOptions) + Send + Sync>;

/// Side effect run on a validated successful result.
pub type AfterSuccessFn<C> = Arc<dyn Fn(&<C as Client>::Output, &FireOptions) + Send + Sync>;

/// Transform applied to a successful result before it settles the call.
pub type BeforeResolveFn<C> =
    Arc<dyn Fn(<C as Client>::Output, &FireOptions) -> <C as Client>::Output + Send + Sync>;

/// Side effect run on any failure (client error or rejected validation).
pub type AfterFailFn<C> = Arc<dyn Fn(&FireError<C>, &FireOptions) + Send + Sync>;

/// Transform applied to a failure before it settles the call.
pub type BeforeRejectFn<C> =
    Arc<dyn Fn(FireError<C>, &FireOptions) -> FireError<C> + Send + Sync>;

/// Predicate deciding whether a successful client result resolves the call.
pub type ValidateFn<C> = Arc<dyn Fn(&<C as Client>::Output) -> bool + Send + Sync>;

/// A named lifecycle callback, one typed variant per hook point.
///
/// Constructed with the convenience constructors and installed via
/// [`CallGate::set_hook`](crate::CallGate::set_hook) (global scope) or
/// [`CallHandler::set_hook`](crate::CallHandler::set_hook) (instance scope).
pub enum Hook<C: Client> {
    /// Transforms the bound call config (`update_config`).
    UpdateConfig(UpdateConfigFn<C>),
    /// Observes the fire options right before invocation (`before_fire`).
    BeforeFire(BeforeFireFn),
    /// Observes a validated successful result (`after_success`).
    AfterSuccess(AfterSuccessFn<C>),
    /// Transforms the result that settles a successful call (`before_resolve`).
    BeforeResolve(BeforeResolveFn<C>),
    /// Observes a failure before it settles (`after_fail`).
    AfterFail(AfterFailFn<C>),
    /// Transforms the failure that settles a failed call (`before_reject`).
    BeforeReject(BeforeRejectFn<C>),
}

impl<C: Client> Hook<C> {
    /// Builds an [`Hook::UpdateConfig`] from a plain closure.
    pub fn update_config(f: impl Fn(C::Config) -> C::Config + Send + Sync + 'static) -> Self {
        Hook::UpdateConfig(Arc::new(f))
    }

    /// Builds a [`Hook::BeforeFire`] from a plain closure.
    pub fn before_fire(f: impl Fn(&FireOptions) + Send + Sync + 'static) -> Self {
        Hook::BeforeFire(Arc::new(f))
    }

    /// Builds an [`Hook::AfterSuccess`] from a plain closure.
    pub fn after_success(f: impl Fn(&C::Output, &FireOptions) + Send + Sync + 'static) -> Self {
        Hook::AfterSuccess(Arc::new(f))
    }

    /// Builds a [`Hook::BeforeResolve`] from a plain closure.
    pub fn before_resolve(
        f: impl Fn(C::Output, &FireOptions) -> C::Output + Send + Sync + 'static,
    ) -> Self {
        Hook::BeforeResolve(Arc::new(f))
    }

    /// Builds an [`Hook::AfterFail`] from a plain closure.
    pub fn after_fail(f: impl Fn(&FireError<C>, &FireOptions) + Send + Sync + 'static) -> Self {
        Hook::AfterFail(Arc::new(f))
    }

    /// Builds a [`Hook::BeforeReject`] from a plain closure.
    pub fn before_reject(
        f: impl Fn(FireError<C>, &FireOptions) -> FireError<C> + Send + Sync + 'static,
    ) -> Self {
        Hook::BeforeReject(Arc::new(f))
    }

    /// Returns a short stable name (snake_case) for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Hook::UpdateConfig(_) => "update_config",
            Hook::BeforeFire(_) => "before_fire",
            Hook::AfterSuccess(_) => "after_success",
            Hook::BeforeResolve(_) => "before_resolve",
            Hook::AfterFail(_) => "after_fail",
            Hook::BeforeReject(_) => "before_reject",
        }
    }
}

/// One optional callback slot per hook point.
///
/// Every [`CallGate`](crate::CallGate) owns a global table and every
/// [`CallHandler`](crate::CallHandler) owns an override table consulted
/// first. [`HookTable::set`] replaces the previous callback for that name.
pub struct HookTable<C: Client> {
    update_config: Option<UpdateConfigFn<C>>,
    before_fire: Option<BeforeFireFn>,
    after_success: Option<AfterSuccessFn<C>>,
    before_resolve: Option<BeforeResolveFn<C>>,
    after_fail: Option<AfterFailFn<C>>,
    before_reject: Option<BeforeRejectFn<C>>,
}

impl<C: Client> Default for HookTable<C> {
    fn default() -> Self {
        Self {
            update_config: None,
            before_fire: None,
            after_success: None,
            before_resolve: None,
            after_fail: None,
            before_reject: None,
        }
    }
}

impl<C: Client> Clone for HookTable<C> {
    fn clone(&self) -> Self {
        Self {
            update_config: self.update_config.clone(),
            before_fire: self.before_fire.clone(),
            after_success: self.after_success.clone(),
            before_resolve: self.before_resolve.clone(),
            after_fail: self.after_fail.clone(),
            before_reject: self.before_reject.clone(),
        }
    }
}

impl<C: Client> HookTable<C> {
    /// Table with identity transforms installed for `UpdateConfig`,
    /// `BeforeResolve`, and `BeforeReject` (the gate's process-start
    /// defaults).
    pub fn with_identity_defaults() -> Self {
        Self {
            update_config: Some(Arc::new(|config| config)),
            before_resolve: Some(Arc::new(|output, _: &FireOptions| output)),
            before_reject: Some(Arc::new(|err, _: &FireOptions| err)),
            ..Self::default()
        }
    }

    /// Installs a callback, replacing any previous one under the same name.
    pub fn set(&mut self, hook: Hook<C>) {
        match hook {
            Hook::UpdateConfig(f) => self.update_config = Some(f),
            Hook::BeforeFire(f) => self.before_fire = Some(f),
            Hook::AfterSuccess(f) => self.after_success = Some(f),
            Hook::BeforeResolve(f) => self.before_resolve = Some(f),
            Hook::AfterFail(f) => self.after_fail = Some(f),
            Hook::BeforeReject(f) => self.before_reject = Some(f),
        }
    }

    pub(crate) fn update_config(&self) -> Option<UpdateConfigFn<C>> {
        self.update_config.clone()
    }

    pub(crate) fn before_fire(&self) -> Option<BeforeFireFn> {
        self.before_fire.clone()
    }

    pub(crate) fn after_success(&self) -> Option<AfterSuccessFn<C>> {
        self.after_success.clone()
    }

    pub(crate) fn before_resolve(&self) -> Option<BeforeResolveFn<C>> {
        self.before_resolve.clone()
    }

    pub(crate) fn after_fail(&self) -> Option<AfterFailFn<C>> {
        self.after_fail.clone()
    }

    pub(crate) fn before_reject(&self) -> Option<BeforeRejectFn<C>> {
        self.before_reject.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientFn;

    type Echo = ClientFn<u32, u32, std::io::Error>;

    #[test]
    fn test_empty_table_has_no_callbacks() {
        let table: HookTable<Echo> = HookTable::default();
        assert!(table.update_config().is_none());
        assert!(table.before_fire().is_none());
        assert!(table.after_success().is_none());
        assert!(table.before_resolve().is_none());
        assert!(table.after_fail().is_none());
        assert!(table.before_reject().is_none());
    }

    #[test]
    fn test_identity_defaults_pass_values_through() {
        let table: HookTable<Echo> = HookTable::with_identity_defaults();
        let opts = FireOptions::default();

        let update = table.update_config().unwrap();
        assert_eq!(update(7), 7);

        let resolve = table.before_resolve().unwrap();
        assert_eq!(resolve(7, &opts), 7);

        let reject = table.before_reject().unwrap();
        let rejected = reject(FireError::<Echo>::Rejected(7), &opts);
        assert!(matches!(rejected, crate::CallError::Rejected(7)));

        assert!(table.before_fire().is_none());
        assert!(table.after_success().is_none());
        assert!(table.after_fail().is_none());
    }

    #[test]
    fn test_set_is_last_write_wins() {
        let mut table: HookTable<Echo> = HookTable::default();
        table.set(Hook::before_resolve(|out, _| out + 1));
        table.set(Hook::before_resolve(|out, _| out * 10));

        let resolve = table.before_resolve().unwrap();
        assert_eq!(resolve(4, &FireOptions::default()), 40);
    }

    #[test]
    fn test_hook_names_are_stable() {
        let names = [
            Hook::<Echo>::update_config(|c| c).name(),
            Hook::<Echo>::before_fire(|_| {}).name(),
            Hook::<Echo>::after_success(|_, _| {}).name(),
            Hook::<Echo>::before_resolve(|o, _| o).name(),
            Hook::<Echo>::after_fail(|_, _| {}).name(),
            Hook::<Echo>::before_reject(|e, _| e).name(),
        ];
        assert_eq!(
            names,
            [
                "update_config",
                "before_fire",
                "after_success",
                "before_resolve",
                "after_fail",
                "before_reject",
            ]
        );
    }
}
