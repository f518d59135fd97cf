//! DingTalk alert relay — config, DingTalk channel, and the webhook server
//! used by the `dingrelay` binary.

pub mod channels;
pub mod config;
pub mod init;
pub mod relay;
