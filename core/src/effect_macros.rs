//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use freshcart_core::async_effect;
///
/// async_effect! {
///     match store.save_rating(rating.clone()).await {
///         Ok(()) => Some(RatingAction::RatingSaved { rating }),
///         Err(error) => Some(RatingAction::RatingSaveFailed { key, error }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use freshcart_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(5),
///     action: TrackingAction::Tick { order_id, generation }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create an `Effect::Delay` registered under a cancellation id
///
/// # Example
///
/// ```rust,ignore
/// use freshcart_core::cancellable_delay;
///
/// cancellable_delay! {
///     id: EffectId::new("tracking-order-1"),
///     duration: config.tick,
///     action: TrackingAction::Tick { order_id, generation }
/// }
/// ```
#[macro_export]
macro_rules! cancellable_delay {
    (
        id: $id:expr,
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($crate::delay! {
                duration: $duration,
                action: $action
            }),
        }
    };
}
