//! Partner Signup: a multi-step registration wizard for national clients,
//! plus batch registration of employees.

pub mod config;
pub mod employees;
pub mod error;
pub mod flow;
pub mod forms;
pub mod services;
pub mod terminal;
