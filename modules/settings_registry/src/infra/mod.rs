//! Infrastructure layer - concrete backing stores

pub mod storage;
