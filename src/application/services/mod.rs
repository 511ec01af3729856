//! # Application Services
//!
//! The aggregation core:
//! - [`FanOutSubmitter`]: concurrent dispatch of one application to all providers
//! - [`ReconciliationLoop`]: re-polls providers for non-final offers
//! - [`SubscriberNotifier`]: pushes offer updates to live observers
//! - [`ApplicationService`]: facade used by the HTTP layer

pub mod application_service;
pub mod fan_out;
pub mod notifier;
pub mod reconciliation;
pub mod task_supervisor;

pub use application_service::ApplicationService;
pub use fan_out::FanOutSubmitter;
pub use notifier::{ObserverHandle, OfferUpdate, PublishReport, SubscriberId, SubscriberNotifier};
pub use reconciliation::{ReconciliationLoop, TickReport};
pub use task_supervisor::{TaskLabel, TaskOutcome, TaskReport, TaskSupervisor};
