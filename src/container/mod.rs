//! The bean container: conditional registration, dependency wiring, and
//! lifecycle management for application-scoped singletons.

pub mod args;
pub mod bean;
pub mod condition;
pub mod core;
pub mod wiring;

pub use bean::{BeanBuilder, BeanDefinition, BeanStatus, ExportSlot, LazyBean, Selector};
pub use condition::Condition;
pub use core::{BeanContainer, BeanView, ContainerStatus};
pub use wiring::Wireable;
