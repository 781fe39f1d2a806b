//! Side effect descriptions.
//!
//! Effects are NOT executed by reducers. They are values describing what
//! should happen (wait, run async work, cancel earlier work), returned from
//! reducers and executed by the Store runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Identifier used to cancel in-flight effects
///
/// Effects wrapped in [`Effect::Cancellable`] are registered under their id;
/// a later [`Effect::Cancel`] with the same id aborts every one of them that
/// has not finished yet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectId(String);

impl EffectId {
    /// Creates a new effect id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Effect type - describes a side effect to be executed
///
/// # Type Parameters
///
/// - `Action`: The action type that effects can produce (feedback loop)
pub enum Effect<Action> {
    /// No-op effect
    None,

    /// Run effects in parallel
    Parallel(Vec<Effect<Action>>),

    /// Run effects sequentially
    Sequential(Vec<Effect<Action>>),

    /// Delayed action (timer ticks, timeouts)
    Delay {
        /// How long to wait
        duration: Duration,
        /// Action to dispatch after delay
        action: Box<Action>,
    },

    /// Arbitrary async computation
    ///
    /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
    Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

    /// Run an effect that can later be aborted with [`Effect::Cancel`]
    Cancellable {
        /// Registration key
        id: EffectId,
        /// The wrapped effect
        effect: Box<Effect<Action>>,
    },

    /// Abort every pending effect registered under the id
    ///
    /// Cancelling an id with nothing registered is a no-op.
    Cancel(EffectId),
}

// Manual Debug implementation since Future doesn't implement Debug
impl<Action> fmt::Debug for Effect<Action>
where
    Action: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Parallel(effects) => f.debug_tuple("Effect::Parallel").field(effects).finish(),
            Effect::Sequential(effects) => {
                f.debug_tuple("Effect::Sequential").field(effects).finish()
            },
            Effect::Delay { duration, action } => f
                .debug_struct("Effect::Delay")
                .field("duration", duration)
                .field("action", action)
                .finish(),
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            Effect::Cancellable { id, effect } => f
                .debug_struct("Effect::Cancellable")
                .field("id", id)
                .field("effect", effect)
                .finish(),
            Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
        }
    }
}

impl<Action> Effect<Action> {
    /// Combine effects to run in parallel
    #[must_use]
    pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Parallel(effects)
    }

    /// Chain effects to run sequentially
    #[must_use]
    pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Sequential(effects)
    }

    /// Register this effect under `id` so it can be cancelled later
    #[must_use]
    pub fn cancellable(self, id: EffectId) -> Effect<Action> {
        Effect::Cancellable {
            id,
            effect: Box::new(self),
        }
    }

    /// Returns `true` for [`Effect::None`]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Effect::None)
    }

    /// Transform the actions this effect produces
    ///
    /// Used to embed a child reducer's effects into a parent reducer whose
    /// action type wraps the child's.
    #[must_use]
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        F: Fn(Action) -> B + Send + Sync + 'static,
        Action: Send + 'static,
        B: Send + 'static,
    {
        self.map_shared(&Arc::new(f))
    }

    fn map_shared<B, F>(self, f: &Arc<F>) -> Effect<B>
    where
        F: Fn(Action) -> B + Send + Sync + 'static,
        Action: Send + 'static,
        B: Send + 'static,
    {
        match self {
            Effect::None => Effect::None,
            Effect::Parallel(effects) => {
                Effect::Parallel(effects.into_iter().map(|e| e.map_shared(f)).collect())
            },
            Effect::Sequential(effects) => {
                Effect::Sequential(effects.into_iter().map(|e| e.map_shared(f)).collect())
            },
            Effect::Delay { duration, action } => Effect::Delay {
                duration,
                action: Box::new(f(*action)),
            },
            Effect::Future(fut) => {
                let f = Arc::clone(f);
                Effect::Future(Box::pin(async move { fut.await.map(&*f) }))
            },
            Effect::Cancellable { id, effect } => Effect::Cancellable {
                id,
                effect: Box::new(effect.map_shared(f)),
            },
            Effect::Cancel(id) => Effect::Cancel(id),
        }
    }
}
