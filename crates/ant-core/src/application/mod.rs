//! ユースケースとポート (外部との境界)。

pub mod collect;
pub mod create_role;
pub mod destination;
pub mod lint;
pub mod port;
