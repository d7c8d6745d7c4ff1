//! # Client abstraction and function-backed client implementation.
//!
//! This module defines the [`Client`] trait (the opaque async callable the
//! gate sequences) and a convenient function-backed implementation
//! [`ClientFn`].
//!
//! The gate never inspects what a client does; it only decides *when* the
//! call may start and pipes the config/result through the hook pipeline.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

/// # Asynchronous callable sequenced by the gate.
///
/// A `Client` takes a caller-supplied config (an HTTP request, a message, any
/// `Send` value) and produces a result or an error. The gate treats both as
/// opaque: success routing is decided by the resolve-validation predicate,
/// not by the client.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use callgate::Client;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Client for Echo {
///     type Config = String;
///     type Output = String;
///     type Error = std::convert::Infallible;
///
///     async fn call(&self, config: String) -> Result<String, Self::Error> {
///         Ok(config)
///     }
/// }
/// ```
#[async_trait]
pub trait Client: Send + Sync + 'static {
    /// Call configuration consumed by one invocation.
    type Config: Send + 'static;

    /// Successful call result.
    type Output: fmt::Debug + Send + 'static;

    /// Client-side failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Performs one invocation with the (possibly hook-transformed) config.
    async fn call(&self, config: Self::Config) -> Result<Self::Output, Self::Error>;
}

type BoxCallFn<Cfg, Out, Err> =
    Box<dyn Fn(Cfg) -> BoxFuture<'static, Result<Out, Err>> + Send + Sync>;

/// Function-backed client implementation.
///
/// Wraps a closure that creates a new future per call, so each invocation
/// owns its own state.
///
/// ## Example
/// ```
/// use callgate::{Client, ClientFn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let fetch = ClientFn::new(|url: String| async move {
///     Ok::<_, std::convert::Infallible>(format!("GET {url}"))
/// });
///
/// assert_eq!(fetch.call("/users".into()).await.unwrap(), "GET /users");
/// # }
/// ```
pub struct ClientFn<Cfg, Out, Err> {
    f: BoxCallFn<Cfg, Out, Err>,
}

impl<Cfg, Out, Err> ClientFn<Cfg, Out, Err>
where
    Cfg: Send + 'static,
    Out: fmt::Debug + Send + 'static,
    Err: std::error::Error + Send + Sync + 'static,
{
    /// Creates a new function-backed client.
    ///
    /// Prefer [`ClientFn::arc`] when you immediately need a shared handle.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Cfg) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Out, Err>> + Send + 'static,
    {
        Self {
            f: Box::new(move |config| f(config).boxed()),
        }
    }

    /// Creates the client and returns it as a shared handle.
    pub fn arc<F, Fut>(f: F) -> Arc<Self>
    where
        F: Fn(Cfg) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Out, Err>> + Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<Cfg, Out, Err> Client for ClientFn<Cfg, Out, Err>
where
    Cfg: Send + 'static,
    Out: fmt::Debug + Send + 'static,
    Err: std::error::Error + Send + Sync + 'static,
{
    type Config = Cfg;
    type Output = Out;
    type Error = Err;

    async fn call(&self, config: Cfg) -> Result<Out, Err> {
        (self.f)(config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_fn_invokes_closure_per_call() {
        let double = ClientFn::new(|n: u32| async move { Ok::<_, std::io::Error>(n * 2) });
        assert_eq!(double.call(2).await.unwrap(), 4);
        assert_eq!(double.call(21).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_client_fn_propagates_errors() {
        let broken = ClientFn::new(|_: ()| async move {
            Err::<u32, _>(std::io::Error::other("unreachable host"))
        });
        let err = broken.call(()).await.unwrap_err();
        assert_eq!(err.to_string(), "unreachable host");
    }
}
