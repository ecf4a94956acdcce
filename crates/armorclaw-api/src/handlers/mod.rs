pub mod analysis;
pub mod audits;
pub mod chats;
pub mod market;
pub mod upload;
