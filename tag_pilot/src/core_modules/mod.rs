pub mod action;
pub mod decision;
pub mod detector;
pub mod frame;
pub mod geometry;
pub mod marker;
pub mod store;
