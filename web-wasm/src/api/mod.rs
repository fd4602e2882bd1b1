//! ホストページとの連携

pub mod host;
