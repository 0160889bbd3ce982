//! Common utilities for echelle.

pub use common::buffer2::Buffer2;
