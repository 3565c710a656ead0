// JSON API handlers, one module per route.

pub mod predict;
pub mod recommend;
pub mod titles;
