//! Ready-made scenarios for the tipping application.

pub mod mocks;
pub mod notifications;
pub mod onboarding;
pub mod tipping;

pub use notifications::SystemNotification;
pub use tipping::{ModalEntry, TippingWizard};
