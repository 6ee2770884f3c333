pub mod command;
pub mod evaluate;
pub mod http;
pub mod mask;
pub mod rules;
pub mod runner;
