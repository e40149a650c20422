pub mod average;
pub mod binder;
pub mod controller;
pub mod event;
pub mod instance;
pub mod mode;
pub mod pending;
pub mod reactor;
pub mod series;
pub mod state;
pub mod strategy;
