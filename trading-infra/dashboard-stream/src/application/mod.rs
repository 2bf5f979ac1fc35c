//! Application Layer - connection control and consumer fan-out

pub mod controller;
pub mod invalidation;
pub mod listeners;
pub mod subscription;

pub use controller::ConnectionController;
pub use invalidation::{QueryKey, invalidation_keys};
pub use listeners::{ListenerHandle, ListenerHub, ListenerSet};
pub use subscription::{
    StreamClient, Subscription, SubscriptionHandler, SubscriptionRequest, deliver,
};
